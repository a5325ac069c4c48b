use crate::cli::Cli;
use chrono::{FixedOffset, Offset, Utc};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("config file validation error: {0}")]
    Validation(String),
}

// for default value in serde
pub mod serde_defaults {
    pub fn r#true() -> bool { true }

    pub mod site {
        pub fn url() -> String { "https://www.make-awesome.com".into() }
        pub fn root() -> String { "/".into() }
        pub fn language() -> String { "en".into() }
        pub fn timezone() -> String { "+00:00".into() }
    }

    pub mod feed {
        pub fn path() -> String { "feed.xml".into() }
        pub fn limit() -> usize { 20 }
        pub fn content_limit() -> usize { 140 }
    }

    pub mod sitemap {
        pub fn site_root() -> String { "https://www.make-awesome.com".into() }
        pub fn path() -> String { "sitemap.xml".into() }
    }

    pub mod assets {
        use std::path::PathBuf;

        pub fn dir() -> PathBuf { "images".into() }
    }
}

// `[site]` in toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct SiteSection {
    pub title: String,

    pub subtitle: String,

    pub author: String,

    // e.g., "en", "zh-CN"
    #[serde(default = "serde_defaults::site::language")]
    #[educe(Default = serde_defaults::site::language())]
    pub language: String,

    // absolute site url, e.g., "https://www.make-awesome.com"
    #[serde(default = "serde_defaults::site::url")]
    #[educe(Default = serde_defaults::site::url())]
    pub url: String,

    // path the site is served under, e.g., "/" or "/blog/"
    #[serde(default = "serde_defaults::site::root")]
    #[educe(Default = serde_defaults::site::root())]
    pub root: String,

    // UTC offset used whenever a timestamp is written out, e.g., "+00:00"
    #[serde(default = "serde_defaults::site::timezone")]
    #[educe(Default = serde_defaults::site::timezone())]
    pub timezone: String,
}

// `[feed]` in toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct FeedConfig {
    // output path of the feed, relative to the output directory
    #[serde(default = "serde_defaults::feed::path")]
    #[educe(Default = serde_defaults::feed::path())]
    pub path: String,

    // maximum number of entries, 0 means unlimited
    #[serde(default = "serde_defaults::feed::limit")]
    #[educe(Default = serde_defaults::feed::limit())]
    pub limit: usize,

    // include the full post content in entries
    #[serde(default = "serde_defaults::r#true")]
    #[educe(Default = true)]
    pub content: bool,

    // length of the generated summary, in characters
    #[serde(default = "serde_defaults::feed::content_limit")]
    #[educe(Default = serde_defaults::feed::content_limit())]
    pub content_limit: usize,

    // cut point inside the first `content_limit` chars, last occurrence wins, never appended
    pub content_limit_delim: String,
}

// `[sitemap]` in toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct SitemapConfig {
    // `loc` of the homepage entry
    #[serde(default = "serde_defaults::sitemap::site_root")]
    #[educe(Default = serde_defaults::sitemap::site_root())]
    pub site_root: String,

    #[serde(default = "serde_defaults::sitemap::path")]
    #[educe(Default = serde_defaults::sitemap::path())]
    pub path: String,
}

// `[assets]` in toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default, deny_unknown_fields)]
pub struct AssetsConfig {
    // directory republished verbatim, related to `root`
    #[serde(default = "serde_defaults::assets::dir")]
    #[educe(Default = serde_defaults::assets::dir())]
    pub dir: PathBuf,
}

// paths given on the command line, never read from toml
#[derive(Debug, Clone, Educe)]
#[educe(Default)]
pub struct BuildPaths {
    #[educe(Default = PathBuf::from("./"))]
    pub root: PathBuf,

    #[educe(Default = PathBuf::from("public"))]
    pub output: PathBuf,

    #[educe(Default = PathBuf::from("content.json"))]
    pub content: PathBuf,

    #[educe(Default = PathBuf::from("theme"))]
    pub theme: PathBuf,
}

// top-level toml
#[derive(Debug, Clone, Educe, Serialize, Deserialize)]
#[educe(Default)]
#[serde(deny_unknown_fields)]
pub struct SiteConfig {
    #[serde(default)]
    pub site: SiteSection,

    #[serde(default)]
    pub feed: FeedConfig,

    #[serde(default)]
    pub sitemap: SitemapConfig,

    #[serde(default)]
    pub assets: AssetsConfig,

    #[serde(skip)]
    pub paths: BuildPaths,
}

impl SiteConfig {
    pub fn from_str(content: &str) -> Result<Self, ConfigError> {
        let config: SiteConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;
        Self::from_str(&content)
    }

    /// Config for a CLI invocation. A missing config file means in-code defaults.
    pub fn load(cli: &Cli) -> Result<Self, ConfigError> {
        let config_file = cli.root.join(&cli.config);
        let mut config = match config_file.exists() {
            true => Self::from_path(&config_file)?,
            false => Self::default(),
        };
        config.update_with_cli(cli);
        Ok(config)
    }

    pub fn update_with_cli(&mut self, cli: &Cli) {
        let root = cli.root.clone();
        self.paths = BuildPaths {
            output: root.join(&cli.output),
            content: root.join(&cli.content),
            theme: root.join(&cli.theme),
            root,
        };
    }

    /// Directory republished by the image generator, resolved against the root.
    pub fn assets_dir(&self) -> PathBuf {
        self.paths.root.join(&self.assets.dir)
    }

    /// Offset every timestamp is rendered in.
    ///
    /// Falls back to UTC; `validate` rejects unparsable values up front.
    pub fn offset(&self) -> FixedOffset {
        parse_offset(&self.site.timezone).unwrap_or_else(utc)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.site.url.starts_with("http") {
            return Err(ConfigError::Validation(
                "`site.url` should start with `http://` or `https://`".into(),
            ));
        }

        if !self.site.root.starts_with('/') {
            return Err(ConfigError::Validation("`site.root` should start with `/`".into()));
        }

        if parse_offset(&self.site.timezone).is_none() {
            return Err(ConfigError::Validation(format!(
                "`site.timezone` should be an offset like `+00:00`, got `{}`",
                self.site.timezone
            )));
        }

        if self.feed.path.is_empty() || self.sitemap.path.is_empty() {
            return Err(ConfigError::Validation("output paths of `feed` and `sitemap` must not be empty".into()));
        }

        Ok(())
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

fn parse_offset(timezone: &str) -> Option<FixedOffset> {
    match timezone.trim() {
        "Z" | "UTC" | "utc" => Some(utc()),
        offset => offset.parse::<FixedOffset>().ok(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    const SAMPLE_CONFIG: &str = r#"
        [site]
        title = "Make Awesome"
        subtitle = "notes on building things"
        author = "Jane Doe"
        url = "https://example.com"
        root = "/blog/"
        timezone = "+02:00"

        [feed]
        limit = 5
        content = false

        [sitemap]
        site_root = "https://example.com/blog/"
    "#;

    #[test]
    fn parse_config() {
        let config = SiteConfig::from_str(SAMPLE_CONFIG).unwrap();

        assert_eq!(config.site.title, "Make Awesome");
        assert_eq!(config.site.root, "/blog/");
        assert_eq!(config.feed.limit, 5);
        assert!(!config.feed.content);
        assert_eq!(config.feed.path, "feed.xml");
        assert_eq!(config.sitemap.site_root, "https://example.com/blog/");
        assert_eq!(config.offset().local_minus_utc(), 2 * 3600);
    }

    #[test]
    fn default_values() {
        let config = SiteConfig::from_str("").unwrap();

        assert_eq!(config.feed.path, "feed.xml");
        assert_eq!(config.feed.limit, 20);
        assert!(config.feed.content);
        assert_eq!(config.feed.content_limit, 140);
        assert_eq!(config.feed.content_limit_delim, "");
        assert_eq!(config.sitemap.site_root, "https://www.make-awesome.com");
        assert_eq!(config.sitemap.path, "sitemap.xml");
        assert_eq!(config.assets.dir, PathBuf::from("images"));
        assert_eq!(config.offset().local_minus_utc(), 0);
    }

    #[test]
    fn config_validation() {
        let invalid_url = r#"
            [site]
            url = "example.com"
        "#;
        assert!(SiteConfig::from_str(invalid_url).is_err());

        let invalid_timezone = r#"
            [site]
            timezone = "Europe/Nowhere"
        "#;
        assert!(matches!(
            SiteConfig::from_str(invalid_timezone),
            Err(ConfigError::Validation(_))
        ));

        let unknown_field = r#"
            [feed]
            limitt = 3
        "#;
        assert!(matches!(SiteConfig::from_str(unknown_field), Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_without_config_file() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().to_str().unwrap();
        let cli = Cli::parse_from(["clean-blog", "--root", root, "build"]);

        let config = SiteConfig::load(&cli).unwrap();
        assert_eq!(config.feed.path, "feed.xml");
        assert_eq!(config.sitemap.site_root, "https://www.make-awesome.com");
        assert_eq!(config.paths.output, temp.path().join("public"));
    }

    #[test]
    fn load_with_config_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("clean-blog.toml"), SAMPLE_CONFIG).unwrap();
        let root = temp.path().to_str().unwrap();
        let cli = Cli::parse_from(["clean-blog", "--root", root, "build"]);

        let config = SiteConfig::load(&cli).unwrap();
        assert_eq!(config.feed.limit, 5);
        assert_eq!(config.paths.content, temp.path().join("content.json"));

        fs::write(temp.path().join("clean-blog.toml"), "[feed]\nlimitt = 3\n").unwrap();
        assert!(SiteConfig::load(&cli).is_err());
    }
}

use crate::{
    config::SiteConfig,
    content::Collection,
    generator::{Artifact, ArtifactData, Site},
    log,
    utils::{
        assets::StaticAssetPublisher, feed::FeedBuilder, permalink::PermalinkRewriter,
        sitemap::SitemapBuilder,
    },
};
use anyhow::{Context, Result, bail};
use rayon::prelude::*;
use std::{
    fs::{self, File},
    io::{self, BufWriter, Write},
    path::{Path, PathBuf},
};

/// Outcome of writing one generation pass to disk.
#[derive(Debug, Default)]
pub struct BuildReport {
    pub written: Vec<PathBuf>,
    pub failed: Vec<(PathBuf, anyhow::Error)>,
}

impl BuildReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Register the theme's filter and generators.
///
/// Loading the feed template happens here, so a missing or broken template
/// stops the build before anything is generated.
pub fn theme_site(config: SiteConfig, collection: Collection) -> Result<Site> {
    let feed = FeedBuilder::new(&config.paths.theme).context("Failed to load the feed template")?;

    let mut site = Site::new(config, collection);
    site.register_filter(Box::new(PermalinkRewriter))
        .register_generator(Box::new(feed))
        .register_generator(Box::new(SitemapBuilder))
        .register_generator(Box::new(StaticAssetPublisher));

    Ok(site)
}

fn write_artifact(output: &Path, artifact: &Artifact) -> Result<PathBuf> {
    let path = output.join(&artifact.path);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).with_context(|| format!("Failed to create {}", parent.display()))?;
    }

    match &artifact.data {
        ArtifactData::Text(text) => {
            fs::write(&path, text).with_context(|| format!("Failed to write {}", path.display()))?;
        }
        ArtifactData::File(source) => {
            let mut reader = source
                .open()
                .with_context(|| format!("Failed to open {}", source.path().display()))?;
            let mut writer = BufWriter::new(
                File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?,
            );
            io::copy(&mut reader, &mut writer)
                .and_then(|_| writer.flush())
                .with_context(|| format!("Failed to copy {} to {}", source.path().display(), path.display()))?;
        }
    }

    log!("write"; "{}", artifact.path);
    Ok(path)
}

/// Write every artifact below `output`.
///
/// Artifacts are independent: one failing does not stop the others, failures
/// are collected in the report.
pub fn write_artifacts(output: &Path, artifacts: &[Artifact]) -> BuildReport {
    let results: Vec<_> = artifacts
        .par_iter()
        .map(|artifact| (output.join(&artifact.path), write_artifact(output, artifact)))
        .collect();

    let mut report = BuildReport::default();
    for (path, result) in results {
        match result {
            Ok(path) => report.written.push(path),
            Err(err) => report.failed.push((path, err)),
        }
    }
    report
}

#[rustfmt::skip]
pub fn build_site(config: SiteConfig) -> Result<BuildReport> {
    let collection = Collection::from_path(&config.paths.content)
        .context("Failed to load the content manifest")?;
    let output = config.paths.output.clone();

    let site = theme_site(config, collection)?;
    let artifacts = site.generate()?;

    fs::create_dir_all(&output)
        .with_context(|| format!("[build] Failed to create output directory: {}", output.display()))?;

    let report = write_artifacts(&output, &artifacts);
    for (path, err) in &report.failed {
        log!(true; "error"; "{}: {:#}", path.display(), err);
    }

    if !report.is_success() {
        bail!("{} of {} artifact(s) failed to write", report.failed.len(), artifacts.len());
    }

    log!(true; "build"; "successfully generated {} file(s) in: {}", report.written.len(), output.display());
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::SourceFile;
    use tempfile::TempDir;

    const MANIFEST: &str = r#"
    {
        "posts": [
            {
                "title": "Hello",
                "date": "2021-03-15T09:00:00Z",
                "updated": "2021-03-16T09:00:00Z",
                "permalink": "https://www.make-awesome.com/2021/03/15/hello/",
                "content": "<p>hi</p>"
            },
            {
                "title": "Unfinished",
                "date": "2021-04-01T09:00:00Z",
                "permalink": "https://www.make-awesome.com/2021/04/01/unfinished/",
                "draft": true
            }
        ],
        "pages": [
            {
                "updated": "2021-01-01T00:00:00Z",
                "permalink": "https://www.make-awesome.com/about/",
                "layout": "page"
            }
        ]
    }
    "#;

    fn site_dir() -> TempDir {
        let temp = TempDir::new().unwrap();
        let root = temp.path();

        fs::write(root.join("content.json"), MANIFEST).unwrap();
        fs::create_dir_all(root.join("images/sub")).unwrap();
        fs::write(root.join("images/a.png"), b"aaa").unwrap();
        fs::write(root.join("images/sub/b.png"), b"bbb").unwrap();

        let layout = Path::new(env!("CARGO_MANIFEST_DIR")).join("theme/layout/atom.xml");
        fs::create_dir_all(root.join("theme/layout")).unwrap();
        fs::copy(layout, root.join("theme/layout/atom.xml")).unwrap();

        temp
    }

    fn config_for(root: &Path) -> SiteConfig {
        let mut config = SiteConfig::default();
        config.paths.root = root.to_path_buf();
        config.paths.content = root.join("content.json");
        config.paths.output = root.join("public");
        config.paths.theme = root.join("theme");
        config
    }

    #[test]
    fn test_build_site() {
        let temp = site_dir();
        let root = temp.path();

        let report = build_site(config_for(root)).unwrap();
        assert_eq!(report.written.len(), 4);

        let public = root.join("public");
        assert_eq!(fs::read(public.join("images/a.png")).unwrap(), b"aaa");
        assert_eq!(fs::read(public.join("images/sub/b.png")).unwrap(), b"bbb");

        let feed = fs::read_to_string(public.join("feed.xml")).unwrap();
        assert!(feed.contains("https://www.make-awesome.com/2021/03/hello/"));
        assert!(!feed.contains("Unfinished"));

        let sitemap = fs::read_to_string(public.join("sitemap.xml")).unwrap();
        assert!(sitemap.contains("<loc>https://www.make-awesome.com/2021/03/hello/</loc>"));
        assert!(sitemap.contains("<loc>https://www.make-awesome.com/2021/04/unfinished/</loc>"));
        assert!(sitemap.contains("<loc>https://www.make-awesome.com/about/</loc>"));
    }

    #[test]
    fn test_missing_template_is_fatal() {
        let temp = site_dir();
        let root = temp.path();
        fs::remove_file(root.join("theme/layout/atom.xml")).unwrap();

        assert!(build_site(config_for(root)).is_err());
        assert!(!root.join("public").exists());
    }

    #[test]
    fn test_failed_artifact_does_not_stop_others() {
        let temp = TempDir::new().unwrap();
        let artifacts = vec![
            Artifact::file("images/missing.png", SourceFile::new(temp.path().join("missing.png"))),
            Artifact::text("sitemap.xml", "<urlset/>"),
        ];

        let report = write_artifacts(&temp.path().join("public"), &artifacts);
        assert_eq!(report.written, vec![temp.path().join("public/sitemap.xml")]);
        assert_eq!(report.failed.len(), 1);
        assert_eq!(report.failed[0].0, temp.path().join("public/images/missing.png"));
        assert!(!report.is_success());
    }
}

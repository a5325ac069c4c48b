//! Generator and filter registry.
//!
//! A [`Site`] owns the configuration and the content collection. Filters
//! registered on it rewrite values before generation (currently the
//! `post_permalink` event), generators turn the filtered [`Context`] into
//! [`Artifact`]s keyed by output path.

use crate::{
    config::SiteConfig,
    content::{Collection, ContentEntry},
    log,
};
use anyhow::{Context as _, Result};
use std::{
    fs::File,
    io::{self, BufReader},
    path::{Path, PathBuf},
};

/// Event fired for every post permalink before generation.
pub const POST_PERMALINK: &str = "post_permalink";

/// Lazily opened source file.
///
/// Nothing touches the disk until [`SourceFile::open`]; the handle is closed
/// when the returned reader is dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    path: PathBuf,
}

impl SourceFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn open(&self) -> io::Result<BufReader<File>> {
        File::open(&self.path).map(BufReader::new)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactData {
    Text(String),
    File(SourceFile),
}

/// One output file, `path` relative to the output directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub path: String,
    pub data: ArtifactData,
}

impl Artifact {
    pub fn text(path: impl Into<String>, data: impl Into<String>) -> Self {
        Self { path: path.into(), data: ArtifactData::Text(data.into()) }
    }

    pub fn file(path: impl Into<String>, source: SourceFile) -> Self {
        Self { path: path.into(), data: ArtifactData::File(source) }
    }
}

/// Read-only input of one generation pass.
pub struct Context<'a> {
    pub config: &'a SiteConfig,
    pub posts: Vec<ContentEntry>,
    pub pages: &'a [ContentEntry],
}

pub trait Generator: Send + Sync {
    fn name(&self) -> &'static str;

    fn run(&self, ctx: &Context<'_>) -> Result<Vec<Artifact>>;
}

pub trait Filter: Send + Sync {
    /// Event this filter listens on, e.g. [`POST_PERMALINK`].
    fn event(&self) -> &'static str;

    fn apply(&self, value: String) -> String;
}

pub struct Site {
    config: SiteConfig,
    collection: Collection,
    generators: Vec<Box<dyn Generator>>,
    filters: Vec<Box<dyn Filter>>,
}

impl Site {
    pub fn new(config: SiteConfig, collection: Collection) -> Self {
        Self {
            config,
            collection,
            generators: Vec::new(),
            filters: Vec::new(),
        }
    }

    pub fn config(&self) -> &SiteConfig {
        &self.config
    }

    pub fn register_generator(&mut self, generator: Box<dyn Generator>) -> &mut Self {
        self.generators.push(generator);
        self
    }

    pub fn register_filter(&mut self, filter: Box<dyn Filter>) -> &mut Self {
        self.filters.push(filter);
        self
    }

    /// Run every filter registered on `event`, in registration order.
    pub fn apply_filters(&self, event: &str, value: String) -> String {
        self.filters
            .iter()
            .filter(|filter| filter.event() == event)
            .fold(value, |value, filter| filter.apply(value))
    }

    /// Build the context the generators see.
    ///
    /// Posts are copied with filtered permalinks; the collection itself is
    /// left untouched.
    pub fn context(&self) -> Context<'_> {
        let posts = self
            .collection
            .posts
            .iter()
            .map(|post| ContentEntry {
                permalink: self.apply_filters(POST_PERMALINK, post.permalink.clone()),
                ..post.clone()
            })
            .collect();

        Context {
            config: &self.config,
            posts,
            pages: &self.collection.pages,
        }
    }

    /// Run every generator once and collect their artifacts.
    pub fn generate(&self) -> Result<Vec<Artifact>> {
        let ctx = self.context();
        let mut artifacts = Vec::new();

        for generator in &self.generators {
            let generated = generator
                .run(&ctx)
                .with_context(|| format!("generator `{}` failed", generator.name()))?;
            log!("build"; "{} produced {} artifact(s)", generator.name(), generated.len());
            artifacts.extend(generated);
        }

        Ok(artifacts)
    }
}

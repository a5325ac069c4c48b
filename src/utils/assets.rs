//! Raw file publishing.
//!
//! Every file under the assets directory (`images/` by default) is
//! republished at the same relative path. Contents are not read here, only
//! when the artifact gets written.

use crate::{
    config::SiteConfig,
    generator::{Artifact, Context, Generator, SourceFile},
    log,
};
use anyhow::{Context as _, Result, anyhow};
use std::{
    fs,
    path::{Component, Path, PathBuf},
};

fn collect_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for entry in fs::read_dir(dir).with_context(|| format!("[images] Failed to read directory {}", dir.display()))? {
        let entry = entry.context("[images] Invalid directory entry")?;
        let path = entry.path();
        if path.is_dir() {
            files.extend(collect_files(&path)?);
        } else if path.is_file() {
            files.push(path);
        }
    }

    Ok(files)
}

/// `a\b.png` -> `a/b.png`, whatever the platform separator.
fn to_url_path(relative: &Path) -> Result<String> {
    let mut segments = Vec::new();

    for component in relative.components() {
        match component {
            Component::CurDir => continue,
            Component::Normal(segment) => segments.push(
                segment
                    .to_str()
                    .ok_or_else(|| anyhow!("Invalid path {}", relative.display()))?,
            ),
            _ => return Err(anyhow!("Unexpected path component in {}", relative.display())),
        }
    }

    Ok(segments.join("/"))
}

/// Artifacts for every file below the configured assets directory.
pub fn publish_dir(config: &SiteConfig) -> Result<Vec<Artifact>> {
    let dir = config.assets_dir();
    if !dir.is_dir() {
        log!("images"; "{} does not exist, nothing to publish", dir.display());
        return Ok(Vec::new());
    }

    let prefix = to_url_path(&config.assets.dir)?;
    let mut files = collect_files(&dir)?;
    files.sort();

    let artifacts = files
        .into_iter()
        .filter_map(|path| {
            let relative = path
                .strip_prefix(&dir)
                .map_err(anyhow::Error::from)
                .and_then(to_url_path);
            match relative {
                Ok(relative) => Some(Artifact::file(format!("{prefix}/{relative}"), SourceFile::new(path))),
                Err(err) => {
                    log!(true; "images"; "skipping {}: {err}", path.display());
                    None
                }
            }
        })
        .collect();

    Ok(artifacts)
}

pub struct StaticAssetPublisher;

impl Generator for StaticAssetPublisher {
    fn name(&self) -> &'static str {
        "images"
    }

    fn run(&self, ctx: &Context<'_>) -> Result<Vec<Artifact>> {
        publish_dir(ctx.config)
    }
}

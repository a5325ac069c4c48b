//! Atom feed generation.
//!
//! Posts are sorted newest first, drafts dropped and the list cut to
//! `feed.limit` before being handed to the `layout/atom.xml` template.

use crate::{
    config::{FeedConfig, SiteConfig},
    content::{ContentEntry, Timestamp, newest_first},
    generator::{Artifact, Context, Generator},
    log,
    utils::{
        date::format_timestamp,
        template::{Layout, TemplateError},
    },
};
use anyhow::Result;
use chrono::{FixedOffset, Utc};
use rayon::prelude::*;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Location of the feed template inside a theme.
pub fn template_path(theme: &Path) -> PathBuf {
    theme.join("layout").join("atom.xml")
}

/// A post as the template sees it, timestamps already formatted.
#[derive(Debug, Serialize)]
struct FeedPost<'a> {
    title: &'a str,
    permalink: &'a str,
    date: Option<String>,
    updated: Option<String>,
    content: Option<&'a str>,
    excerpt: Option<&'a str>,
    description: Option<&'a str>,
    summary: String,
    tags: &'a [String],
    categories: &'a [String],
}

impl<'a> FeedPost<'a> {
    fn new(post: &'a ContentEntry, feed: &FeedConfig, offset: &FixedOffset) -> Self {
        let date = post.date.as_ref().map(|date| format_timestamp(date, offset));
        let updated = post
            .updated
            .as_ref()
            .map(|updated| format_timestamp(updated, offset))
            .or_else(|| date.clone());

        Self {
            title: post.title.as_deref().unwrap_or_default(),
            permalink: &post.permalink,
            date,
            updated,
            content: post.content.as_deref(),
            excerpt: post.excerpt.as_deref(),
            description: post.description.as_deref(),
            summary: summarize(post, feed),
            tags: &post.tags,
            categories: &post.categories,
        }
    }
}

/// Description, else excerpt, else the first `content_limit` chars of the
/// content, cut again at the last `content_limit_delim` inside them.
fn summarize(post: &ContentEntry, feed: &FeedConfig) -> String {
    let non_empty = |text: &Option<String>| text.as_deref().filter(|text| !text.trim().is_empty()).map(str::to_owned);

    if let Some(summary) = non_empty(&post.description).or_else(|| non_empty(&post.excerpt)) {
        return summary;
    }

    let content = post.content.as_deref().unwrap_or_default();
    let prefix = match content.char_indices().nth(feed.content_limit) {
        Some((cut, _)) => &content[..cut],
        None => content,
    };

    let delim = feed.content_limit_delim.as_str();
    match prefix.rfind(delim).filter(|_| !delim.is_empty()) {
        Some(cut) => prefix[..cut].to_owned(),
        None => prefix.to_owned(),
    }
}

/// Drafts out, newest first, cut to `limit` (0 keeps everything).
fn select_posts<'a>(posts: &'a [ContentEntry], limit: usize) -> Vec<&'a ContentEntry> {
    let mut selected: Vec<_> = posts.iter().collect();
    selected.sort_by(|a, b| newest_first(a.date.as_ref(), b.date.as_ref()));
    selected.retain(|post| !post.draft);

    if limit > 0 {
        selected.truncate(limit);
    }
    selected
}

fn with_trailing_slash(url: &str) -> String {
    match url.ends_with('/') {
        true => url.to_owned(),
        false => format!("{url}/"),
    }
}

pub struct FeedBuilder {
    layout: Layout,
}

impl FeedBuilder {
    /// Load the feed template of a theme. Fails if it is missing or does not compile.
    pub fn new(theme: &Path) -> Result<Self, TemplateError> {
        Ok(Self { layout: Layout::from_path(&template_path(theme))? })
    }

    pub fn from_source(source: &str) -> Result<Self, TemplateError> {
        Ok(Self { layout: Layout::from_source("atom.xml", source)? })
    }

    /// Render the feed document.
    pub fn render(&self, config: &SiteConfig, posts: &[ContentEntry]) -> Result<String, TemplateError> {
        let feed = &config.feed;
        let offset = config.offset();

        let posts: Vec<FeedPost> = select_posts(posts, feed.limit)
            .into_par_iter()
            .map(|post| FeedPost::new(post, feed, &offset))
            .collect();

        // feed-level `<updated>` is mandatory, an empty feed gets the build time
        let updated = match posts.first().and_then(|post| post.updated.clone()) {
            Some(updated) => updated,
            None => format_timestamp(&Timestamp::At(Utc::now().fixed_offset()), &offset),
        };

        let mut context = tera::Context::new();
        context.insert("config", &config.site);
        context.insert("updated", &updated);
        context.insert("feedConfig", feed);
        context.insert("url", &with_trailing_slash(&config.site.url));
        context.insert("posts", &posts);
        context.insert("feed_url", &format!("{}{}", config.site.root, feed.path));

        self.layout.render(&context)
    }
}

impl Generator for FeedBuilder {
    fn name(&self) -> &'static str {
        "feed"
    }

    fn run(&self, ctx: &Context<'_>) -> Result<Vec<Artifact>> {
        log!("feed"; "generating atom feed started");
        let xml = self.render(ctx.config, &ctx.posts)?;
        Ok(vec![Artifact::text(ctx.config.feed.path.clone(), xml)])
    }
}

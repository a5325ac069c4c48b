//! Sitemap generation.
//!
//! Generates sitemap.xml for SEO and search engine indexing: the homepage,
//! then posts, then pages, each list ordered by `updated` newest first.
//!
//! Values are written as they are, without XML escaping. Permalinks and
//! timestamps are expected to be URL-safe already.

use crate::{
    config::SiteConfig,
    content::{ContentEntry, newest_first},
    generator::{Artifact, Context, Generator},
    log,
    utils::date::format_timestamp,
};
use anyhow::{Result, anyhow};
use chrono::FixedOffset;
use quick_xml::{
    Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};
use std::io::Cursor;
use thiserror::Error;

const SITEMAP_NS: &str = "http://www.sitemaps.org/schemas/sitemap/0.9";

#[derive(Debug, Error)]
pub enum SitemapError {
    #[error("page `{0}` has no `updated` timestamp")]
    MissingUpdated(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ChangeFreq {
    Weekly,
    Monthly,
}

impl ChangeFreq {
    fn as_str(self) -> &'static str {
        match self {
            ChangeFreq::Weekly => "weekly",
            ChangeFreq::Monthly => "monthly",
        }
    }
}

/// Represents a URL entry in the sitemap
#[derive(Debug, Clone, PartialEq)]
struct SitemapUrl {
    loc: String,
    lastmod: Option<String>,
    changefreq: ChangeFreq,
    priority: f32,
}

impl SitemapUrl {
    fn homepage(site_root: &str) -> Self {
        Self {
            loc: site_root.to_owned(),
            lastmod: None,
            changefreq: ChangeFreq::Weekly,
            priority: 0.8,
        }
    }

    fn post(post: &ContentEntry, offset: &FixedOffset) -> Self {
        Self {
            loc: post.permalink.clone(),
            lastmod: post
                .last_updated
                .as_ref()
                .or(post.date.as_ref())
                .map(|lastmod| format_timestamp(lastmod, offset)),
            changefreq: ChangeFreq::Monthly,
            priority: 0.6,
        }
    }

    fn page(page: &ContentEntry, offset: &FixedOffset) -> Result<Self, SitemapError> {
        let updated = page
            .updated
            .as_ref()
            .ok_or_else(|| SitemapError::MissingUpdated(page.permalink.clone()))?;

        Ok(Self {
            loc: page.permalink.clone(),
            lastmod: Some(format_timestamp(updated, offset)),
            changefreq: ChangeFreq::Weekly,
            priority: 0.8,
        })
    }
}

/// Sitemap structure for generating sitemap.xml
pub struct Sitemap {
    urls: Vec<SitemapUrl>,
}

impl Sitemap {
    /// Collect the homepage, every listed post and every listed page.
    pub fn new(config: &SiteConfig, posts: &[ContentEntry], pages: &[ContentEntry]) -> Result<Self, SitemapError> {
        let offset = config.offset();

        let mut posts: Vec<_> = posts.iter().filter(|post| post.sitemap).collect();
        posts.sort_by(|a, b| newest_first(a.updated.as_ref(), b.updated.as_ref()));

        let mut pages: Vec<_> = pages.iter().filter(|page| page.sitemap && page.has_layout()).collect();
        pages.sort_by(|a, b| newest_first(a.updated.as_ref(), b.updated.as_ref()));

        let mut urls = Vec::with_capacity(1 + posts.len() + pages.len());
        urls.push(SitemapUrl::homepage(&config.sitemap.site_root));
        urls.extend(posts.into_iter().map(|post| SitemapUrl::post(post, &offset)));
        for page in pages {
            urls.push(SitemapUrl::page(page, &offset)?);
        }

        Ok(Self { urls })
    }

    /// Convert sitemap to XML string
    pub fn to_xml(&self) -> Result<String> {
        let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 1);

        // XML declaration
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;

        // urlset element with namespace
        let mut urlset = BytesStart::new("urlset");
        urlset.push_attribute(("xmlns", SITEMAP_NS));
        writer.write_event(Event::Start(urlset))?;

        // Write each URL entry
        for url in &self.urls {
            writer.write_event(Event::Start(BytesStart::new("url")))?;

            write_element(&mut writer, "loc", &url.loc)?;
            if let Some(lastmod) = &url.lastmod {
                write_element(&mut writer, "lastmod", lastmod)?;
            }
            write_element(&mut writer, "changefreq", url.changefreq.as_str())?;
            write_element(&mut writer, "priority", &url.priority.to_string())?;

            writer.write_event(Event::End(BytesEnd::new("url")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("urlset")))?;

        let xml_bytes = writer.into_inner().into_inner();
        let xml_string = String::from_utf8(xml_bytes)
            .map_err(|e| anyhow!("Failed to convert sitemap to string: {}", e))?;

        Ok(xml_string)
    }
}

// written raw on purpose, see the module docs
fn write_element(writer: &mut Writer<Cursor<Vec<u8>>>, name: &str, value: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    writer.write_event(Event::Text(BytesText::from_escaped(value)))?;
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

pub struct SitemapBuilder;

impl Generator for SitemapBuilder {
    fn name(&self) -> &'static str {
        "sitemap"
    }

    fn run(&self, ctx: &Context<'_>) -> Result<Vec<Artifact>> {
        log!("sitemap"; "generating sitemap started");
        let sitemap = Sitemap::new(ctx.config, &ctx.posts, ctx.pages)?;
        let xml = sitemap.to_xml()?;
        Ok(vec![Artifact::text(ctx.config.sitemap.path.clone(), xml)])
    }
}

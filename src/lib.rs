//! Theme generators for a static blog.
//!
//! Given the site configuration and the resolved posts and pages, produce the
//! Atom feed, the sitemap and verbatim copies of the theme images, with post
//! permalinks collapsed from `year/month/day/` to `year/month/`.

pub mod build;
pub mod cli;
pub mod config;
pub mod content;
pub mod generator;
pub mod utils;

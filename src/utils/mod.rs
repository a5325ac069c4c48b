//! Utility modules for the theme generators.

pub mod assets;
pub mod date;
pub mod feed;
pub mod log;
pub mod permalink;
pub mod sitemap;
pub mod template;

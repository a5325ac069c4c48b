use crate::generator::{Filter, POST_PERMALINK};
use regex::Regex;
use std::sync::LazyLock;

// `<year>/<month>/<day>/<rest>`, leftmost match only
static RE_DATED_PATH: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(\d+/\d+)/\d+(/.*)").unwrap());

/// Collapse `<year>/<month>/<day>/<rest>` into `<year>/<month>/<rest>`.
///
/// Posts stay grouped by day on disk but the day never shows up in the URL.
/// Strings without the pattern are returned as they are.
pub fn collapse_day(permalink: &str) -> String {
    RE_DATED_PATH.replace(permalink, "$1$2").into_owned()
}

/// [`collapse_day`] as a `post_permalink` filter.
pub struct PermalinkRewriter;

impl Filter for PermalinkRewriter {
    fn event(&self) -> &'static str {
        POST_PERMALINK
    }

    fn apply(&self, value: String) -> String {
        collapse_day(&value)
    }
}

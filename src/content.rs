//! Content entries handed over by the host.
//!
//! Posts and pages arrive fully resolved in a JSON manifest; nothing here
//! parses markdown or front matter.

use chrono::{DateTime, FixedOffset};
use educe::Educe;
use serde::{Deserialize, Serialize};
use std::{
    cmp::Ordering,
    fs,
    path::{Path, PathBuf},
};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ContentError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("content manifest `{0}` is malformed")]
    Json(PathBuf, #[source] serde_json::Error),
}

/// A date-like value, or a string the host already formatted.
///
/// RFC 3339 strings become [`Timestamp::At`]; anything else is kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Timestamp {
    At(DateTime<FixedOffset>),
    Raw(String),
}

impl Timestamp {
    pub fn instant(&self) -> Option<&DateTime<FixedOffset>> {
        match self {
            Timestamp::At(at) => Some(at),
            Timestamp::Raw(_) => None,
        }
    }
}

/// `layout` is a string, or `false` when the host disables the layout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Layout {
    Name(String),
    Flag(bool),
}

/// One post or page.
#[derive(Debug, Clone, Educe, PartialEq, Eq, Serialize, Deserialize)]
#[educe(Default)]
#[serde(default)]
pub struct ContentEntry {
    pub title: Option<String>,
    pub date: Option<Timestamp>,
    pub updated: Option<Timestamp>,
    #[serde(rename = "lastUpdated")]
    pub last_updated: Option<Timestamp>,
    pub permalink: String,
    pub draft: bool,
    // opt-out flag, only an explicit `false` hides the entry
    #[educe(Default = true)]
    pub sitemap: bool,
    pub layout: Option<Layout>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub description: Option<String>,
    pub tags: Vec<String>,
    pub categories: Vec<String>,
}

impl ContentEntry {
    /// Whether the entry has a usable layout.
    ///
    /// Missing, `false`, empty and the literal string `"false"` all count as none.
    pub fn has_layout(&self) -> bool {
        match &self.layout {
            Some(Layout::Name(name)) => !name.is_empty() && name != "false",
            Some(Layout::Flag(flag)) => *flag,
            None => false,
        }
    }
}

/// Newest first by the given key; entries without an instant go last.
///
/// Use with a stable sort so ties keep collection order.
pub fn newest_first(a: Option<&Timestamp>, b: Option<&Timestamp>) -> Ordering {
    let a = a.and_then(Timestamp::instant);
    let b = b.and_then(Timestamp::instant);
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Every post and page of one build.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Collection {
    pub posts: Vec<ContentEntry>,
    pub pages: Vec<ContentEntry>,
}

impl Collection {
    pub fn from_str(path: &Path, content: &str) -> Result<Self, ContentError> {
        serde_json::from_str(content).map_err(|err| ContentError::Json(path.to_path_buf(), err))
    }

    pub fn from_path(path: &Path) -> Result<Self, ContentError> {
        let content = fs::read_to_string(path).map_err(|err| ContentError::Io(path.to_path_buf(), err))?;
        Self::from_str(path, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"
    {
        "posts": [
            {
                "title": "Hello",
                "date": "2023-05-01T12:00:00+02:00",
                "lastUpdated": "2023-06-01T08:00:00Z",
                "permalink": "https://example.com/2023/05/01/hello/",
                "tags": ["rust"]
            },
            {
                "title": "Draft",
                "date": "last tuesday",
                "permalink": "https://example.com/draft/",
                "draft": true,
                "sitemap": false
            }
        ],
        "pages": [
            { "permalink": "https://example.com/about/", "layout": "page" },
            { "permalink": "https://example.com/raw/", "layout": false }
        ]
    }
    "#;

    #[test]
    fn parse_manifest() {
        let collection = Collection::from_str(Path::new("content.json"), MANIFEST).unwrap();

        let hello = &collection.posts[0];
        assert!(matches!(hello.date, Some(Timestamp::At(_))));
        assert!(matches!(hello.last_updated, Some(Timestamp::At(_))));
        assert!(hello.sitemap);
        assert!(!hello.draft);
        assert_eq!(hello.tags, vec!["rust".to_string()]);

        let draft = &collection.posts[1];
        assert_eq!(draft.date, Some(Timestamp::Raw("last tuesday".into())));
        assert!(draft.draft);
        assert!(!draft.sitemap);

        assert!(collection.pages[0].has_layout());
        assert!(!collection.pages[1].has_layout());
    }

    #[test]
    fn layout_sentinels() {
        let with = |layout| ContentEntry { layout, ..Default::default() };

        assert!(!with(None).has_layout());
        assert!(!with(Some(Layout::Flag(false))).has_layout());
        assert!(!with(Some(Layout::Name(String::new()))).has_layout());
        assert!(!with(Some(Layout::Name("false".into()))).has_layout());
        assert!(with(Some(Layout::Name("post".into()))).has_layout());
    }

    #[test]
    fn newest_first_puts_missing_last() {
        let at = |s: &str| Some(Timestamp::At(DateTime::parse_from_rfc3339(s).unwrap()));
        let old = at("2020-01-01T00:00:00Z");
        let new = at("2021-01-01T00:00:00Z");
        let raw = Some(Timestamp::Raw("soon".into()));

        assert_eq!(newest_first(new.as_ref(), old.as_ref()), Ordering::Less);
        assert_eq!(newest_first(old.as_ref(), new.as_ref()), Ordering::Greater);
        assert_eq!(newest_first(None, old.as_ref()), Ordering::Greater);
        assert_eq!(newest_first(raw.as_ref(), None), Ordering::Equal);
    }

    #[test]
    fn missing_manifest_is_io_error() {
        let err = Collection::from_path(Path::new("/nonexistent/content.json")).unwrap_err();
        assert!(matches!(err, ContentError::Io(..)));
    }
}

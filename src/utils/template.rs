//! Template environment for theme layouts.
//!
//! Wraps a [`tera::Tera`] instance with the two filters the layouts rely on:
//! `uriencode` and `noControlChars`. Autoescaping is off, layouts escape
//! explicitly with tera's `escape_xml`.

use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use regex::Regex;
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    sync::LazyLock,
};
use tera::{Context, Tera, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("IO error when reading template `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("template `{0}` failed to compile")]
    Compile(String, #[source] tera::Error),

    #[error("template `{0}` failed to render")]
    Render(String, #[source] tera::Error),
}

/// Characters `encodeURI` leaves alone besides ASCII alphanumerics.
#[rustfmt::skip]
const URI: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b';').remove(b',').remove(b'/').remove(b'?').remove(b':')
    .remove(b'@').remove(b'&').remove(b'=').remove(b'+').remove(b'$')
    .remove(b'-').remove(b'_').remove(b'.').remove(b'!').remove(b'~')
    .remove(b'*').remove(b'\'').remove(b'(').remove(b')').remove(b'#');

static RE_CONTROL_CHARS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\x00-\x1F\x7F]").unwrap());

/// Percent-encode a URI, keeping its reserved characters.
pub fn uri_encode(text: &str) -> String {
    utf8_percent_encode(text, URI).to_string()
}

/// Strip ASCII control characters.
pub fn strip_control_chars(text: &str) -> String {
    RE_CONTROL_CHARS.replace_all(text, "").into_owned()
}

fn string_filter(name: &'static str, f: fn(&str) -> String) -> impl tera::Filter {
    move |value: &Value, _: &HashMap<String, Value>| -> tera::Result<Value> {
        let text = tera::try_get_value!(name, "value", String, value);
        Ok(Value::String(f(&text)))
    }
}

/// A single compiled layout.
pub struct Layout {
    name: String,
    tera: Tera,
}

impl Layout {
    /// Compile a layout from source.
    pub fn from_source(name: &str, source: &str) -> Result<Self, TemplateError> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.register_filter("uriencode", string_filter("uriencode", uri_encode));
        tera.register_filter("noControlChars", string_filter("noControlChars", strip_control_chars));
        tera.add_raw_template(name, source)
            .map_err(|err| TemplateError::Compile(name.to_owned(), err))?;

        Ok(Self { name: name.to_owned(), tera })
    }

    /// Read and compile a layout file.
    pub fn from_path(path: &Path) -> Result<Self, TemplateError> {
        let source = fs::read_to_string(path).map_err(|err| TemplateError::Io(path.to_path_buf(), err))?;
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self::from_source(&name, &source)
    }

    pub fn render(&self, context: &Context) -> Result<String, TemplateError> {
        self.tera
            .render(&self.name, context)
            .map_err(|err| TemplateError::Render(self.name.clone(), err))
    }
}

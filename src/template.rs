//! Template resolution
//!
//! Rendering views is the application's business; this module only defines
//! the seam ([`TemplateEngine`]) plus a small in-memory engine that is handy
//! for CLIs and tests.

use crate::{Error, Result};
use regex::{Captures, Regex};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Turns a template name plus data into HTML
pub trait TemplateEngine: Send + Sync {
    /// Whether a template with this name is registered
    fn exists(&self, name: &str) -> bool;

    /// Render the named template with `data` (usually a JSON object, or `Null`)
    fn render(&self, name: &str, data: &Value) -> Result<String>;
}

/// A prepared template handle: a name bound to its own data.
///
/// Passing a `View` as content resolves it with exactly this data; the
/// caller's extra data is not merged in.
#[derive(Debug, Clone, PartialEq)]
pub struct View {
    pub name: String,
    pub data: Value,
}

impl View {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data: Value::Null,
        }
    }

    pub fn with_data(mut self, data: Value) -> Self {
        self.data = data;
        self
    }

    /// Render this view through `engine`
    pub fn render(&self, engine: &dyn TemplateEngine) -> Result<String> {
        engine.render(&self.name, &self.data)
    }
}

/// In-memory templates with `{{ key }}` placeholders
///
/// Placeholders are looked up in the top-level keys of a JSON object. String
/// values are inserted verbatim, other values as their JSON text, and missing
/// keys as an empty string.
#[derive(Debug, Clone, Default)]
pub struct StaticTemplates {
    templates: HashMap<String, String>,
}

impl StaticTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a template
    pub fn insert(&mut self, name: impl Into<String>, source: impl Into<String>) -> &mut Self {
        self.templates.insert(name.into(), source.into());
        self
    }

    pub fn with(mut self, name: impl Into<String>, source: impl Into<String>) -> Self {
        self.insert(name, source);
        self
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PLACEHOLDER: OnceLock<Regex> = OnceLock::new();
    PLACEHOLDER.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z0-9_.-]+)\s*\}\}").unwrap())
}

impl TemplateEngine for StaticTemplates {
    fn exists(&self, name: &str) -> bool {
        self.templates.contains_key(name)
    }

    fn render(&self, name: &str, data: &Value) -> Result<String> {
        let source = self
            .templates
            .get(name)
            .ok_or_else(|| Error::TemplateNotFound(name.to_string()))?;

        let fields = match data {
            Value::Object(map) => Some(map),
            Value::Null => None,
            other => {
                return Err(Error::Template(format!(
                    "data for '{}' must be an object, got {}",
                    name, other
                )))
            }
        };

        let rendered = placeholder_pattern().replace_all(source, |caps: &Captures| {
            match fields.and_then(|f| f.get(&caps[1])) {
                Some(Value::String(s)) => s.clone(),
                Some(Value::Null) | None => String::new(),
                Some(v) => v.to_string(),
            }
        });

        Ok(rendered.into_owned())
    }
}

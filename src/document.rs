//! HTML document normalization
//!
//! Callers hand us anything from a bare text snippet to a complete page. The
//! renderer always wants a complete document, so [`wrap_document`] inspects
//! which structural tags are already present and supplies only the missing
//! ones. A document that already has an `<html>` start tag is returned as-is,
//! which makes wrapping idempotent.
//!
//! Tags are matched on a tag boundary: `<body` must be followed by
//! whitespace, `>`, `/` or the end of the input, so `<bodyguard>` or
//! `<header>` never count as a `<body>` or `<head>`.

use crate::Viewport;
use regex::Regex;
use std::sync::OnceLock;

/// Document language used when no locale is configured
pub const DEFAULT_LANG: &str = "en";

/// Structural tags the normalizer cares about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tag {
    Html,
    Head,
    Body,
}

impl Tag {
    fn start_pattern(self) -> &'static Regex {
        static HTML: OnceLock<Regex> = OnceLock::new();
        static HEAD: OnceLock<Regex> = OnceLock::new();
        static BODY: OnceLock<Regex> = OnceLock::new();

        match self {
            Tag::Html => HTML.get_or_init(|| Regex::new(r"(?i)<html(?:[\s>/]|$)").unwrap()),
            Tag::Head => HEAD.get_or_init(|| Regex::new(r"(?i)<head(?:[\s>/]|$)").unwrap()),
            Tag::Body => BODY.get_or_init(|| Regex::new(r"(?i)<body(?:[\s>/]|$)").unwrap()),
        }
    }
}

fn head_close_pattern() -> &'static Regex {
    static HEAD_CLOSE: OnceLock<Regex> = OnceLock::new();
    HEAD_CLOSE.get_or_init(|| Regex::new(r"(?i)</head\s*>").unwrap())
}

/// Returns true when `html` contains a start tag for `tag`
pub fn has_tag(html: &str, tag: Tag) -> bool {
    tag.start_pattern().is_match(html)
}

/// Number of `tag` start tags in `html`
pub fn count_tag(html: &str, tag: Tag) -> usize {
    tag.start_pattern().find_iter(html).count()
}

/// How much document structure a piece of content already carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// Has an `<html>` tag; used verbatim
    Document,
    /// Has both `<head>` and `<body>` but no `<html>`
    HeadAndBody,
    /// Has a `<body>` only
    BodyOnly,
    /// Has a `<head>` only
    HeadOnly,
    /// No structural tags at all
    Fragment,
}

/// Classify already-trimmed content by the structural tags it contains
pub fn classify(html: &str) -> Shape {
    if has_tag(html, Tag::Html) {
        return Shape::Document;
    }

    match (has_tag(html, Tag::Head), has_tag(html, Tag::Body)) {
        (true, true) => Shape::HeadAndBody,
        (false, true) => Shape::BodyOnly,
        (true, false) => Shape::HeadOnly,
        (false, false) => Shape::Fragment,
    }
}

/// Convert a locale identifier (`pt_BR`) into a document language tag (`pt-BR`).
///
/// Only ASCII letters, digits and `-` survive, so the result is always safe
/// inside a quoted attribute. Falls back to [`DEFAULT_LANG`] when nothing is
/// left.
pub fn lang_from_locale(locale: &str) -> String {
    let lang: String = locale
        .trim()
        .chars()
        .map(|c| if c == '_' { '-' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-')
        .collect();

    if lang.is_empty() {
        DEFAULT_LANG.to_string()
    } else {
        lang
    }
}

/// Wrap `content` into a complete HTML document.
///
/// `viewport` sizes the synthesized `<body>` when the content brings none of
/// its own, so a bare snippet renders at the configured window size instead
/// of shrink-wrapping. `lang` is passed through [`lang_from_locale`] before it
/// lands in the `<html lang>` attribute.
pub fn wrap_document(content: &str, viewport: Viewport, lang: &str) -> String {
    let html = content.trim();
    let lang = lang_from_locale(lang);

    match classify(html) {
        Shape::Document => html.to_string(),
        Shape::HeadAndBody => format!("<!DOCTYPE html>\n<html lang=\"{lang}\">\n{html}\n</html>"),
        Shape::BodyOnly => format!(
            "<!DOCTYPE html>\n\
             <html lang=\"{lang}\">\n\
             <head>\n    \
             <meta charset=\"UTF-8\">\n    \
             <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
             </head>\n\
             {html}\n\
             </html>"
        ),
        Shape::HeadOnly => {
            let (head, rest) = match head_close_pattern().find(html) {
                Some(m) => (html[..m.end()].to_string(), html[m.end()..].trim()),
                // Unterminated head: everything belongs to it
                None => (format!("{html}\n</head>"), ""),
            };
            format!(
                "<!DOCTYPE html>\n<html lang=\"{lang}\">\n{head}\n{body}\n</html>",
                body = sized_body(rest, viewport)
            )
        }
        Shape::Fragment => format!(
            "<!DOCTYPE html>\n\
             <html lang=\"{lang}\">\n\
             <head>\n    \
             <meta charset=\"UTF-8\">\n\
             </head>\n\
             {body}\n\
             </html>",
            body = sized_body(html, viewport)
        ),
    }
}

fn sized_body(inner: &str, viewport: Viewport) -> String {
    format!(
        "<body style=\"width: {}px; height: {}px;\">\n{}\n</body>",
        viewport.width, viewport.height, inner
    )
}

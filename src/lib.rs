//! htmlshot
//!
//! Turn HTML fragments, templates or URLs into screenshots and PDFs.
//!
//! The crate does not drive a browser itself. It normalizes whatever content
//! the caller supplies into a complete HTML document, derives the viewport,
//! and hands a single [`RenderJob`] to a [`Renderer`]. The rendered bytes can
//! then be returned, offered as a download, saved to a storage disk or
//! base64-encoded.
//!
//! # Features
//!
//! - **fetch** (default): URL-valued content is fetched with a blocking HTTP client
//! - **cdp**: a [`Renderer`] backed by headless Chrome over the DevTools Protocol
//!
//! # Example
//!
//! ```no_run
//! # #[cfg(feature = "cdp")]
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use htmlshot::{cdp::CdpRenderer, Config, Shooter};
//!
//! let shooter = Shooter::new(CdpRenderer::new(), Config::default());
//! let png = shooter
//!     .make("<h1>Hello</h1>")?
//!     .proportion(16, 9, Some(1200))
//!     .scale(2)
//!     .generate()?;
//! std::fs::write("hello.png", png)?;
//! # Ok(())
//! # }
//! # #[cfg(not(feature = "cdp"))]
//! # fn main() {}
//! ```

use std::path::PathBuf;

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::Config;

pub mod document;

pub mod template;
pub use template::{StaticTemplates, TemplateEngine, View};

pub mod fetch;
pub use fetch::Fetcher;

pub mod storage;
pub use storage::{LocalDisks, Storage};

pub mod request;
pub use request::{Content, Download, RenderRequest, Shooter};

// Headless Chrome renderer
#[cfg(feature = "cdp")]
pub mod cdp;

/// Viewport dimensions in CSS pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
        }
    }
}

/// What the renderer should produce
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    /// A PDF document
    Pdf,
    /// A raster image in the named format (`png`, `jpeg`, `webp`, ...)
    Image(String),
}

impl Output {
    /// Pick the output kind for a lower-cased format name
    pub fn for_format(format: &str) -> Self {
        if format == "pdf" {
            Output::Pdf
        } else {
            Output::Image(format.to_string())
        }
    }
}

/// A single render invocation
///
/// This is everything a [`Renderer`] needs to turn HTML into bytes. It is
/// built fresh by [`RenderRequest::generate`] on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderJob {
    /// Complete HTML document
    pub html: String,
    /// Browser window size
    pub viewport: Viewport,
    /// Device scale factor (pixel density multiplier)
    pub scale_factor: u32,
    /// Browser executable to launch, if not the renderer's default
    pub chrome_path: Option<PathBuf>,
    /// Disable the browser's process sandbox
    pub no_sandbox: bool,
    /// Requested artifact
    pub output: Output,
}

/// The rendering capability: converts a [`RenderJob`] into image or PDF bytes.
///
/// Implementations own any browser process they need. Failures are returned
/// as-is to the caller; nothing in this crate retries.
pub trait Renderer: Send + Sync {
    fn render(&self, job: &RenderJob) -> Result<Vec<u8>>;
}

impl<R: Renderer + ?Sized> Renderer for std::sync::Arc<R> {
    fn render(&self, job: &RenderJob) -> Result<Vec<u8>> {
        (**self).render(job)
    }
}

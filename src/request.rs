//! Render requests and the factory that creates them
//!
//! A [`Shooter`] holds the collaborators (renderer, templates, fetcher,
//! storage) and the [`Config`]. Each call to [`Shooter::make`] resolves the
//! supplied content into an HTML string and returns a fresh
//! [`RenderRequest`], which is configured through chained setters and then
//! consumed by `generate`, `download`, `save` or `to_base64`.
//!
//! Terminal operations take `&self` and render from scratch every time;
//! rendered bytes are never cached.

use crate::document;
use crate::fetch::{self, Fetcher, NoFetcher};
use crate::storage::{LocalDisks, Storage};
use crate::template::{StaticTemplates, TemplateEngine, View};
use crate::{Config, Output, RenderJob, Renderer, Result, Viewport};
use base64::Engine as Base64Engine;
use log::{debug, warn};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Prefix of synthesized download filenames
pub const DOWNLOAD_PREFIX: &str = "file-";

/// Content handed to [`Shooter::make`]
#[derive(Debug, Clone, PartialEq)]
pub enum Content {
    /// A prepared template handle, rendered with its own data
    View(View),
    /// A template name, an absolute URL or raw HTML, tried in that order
    Text(String),
}

impl From<View> for Content {
    fn from(view: View) -> Self {
        Content::View(view)
    }
}

impl From<String> for Content {
    fn from(text: String) -> Self {
        Content::Text(text)
    }
}

impl From<&str> for Content {
    fn from(text: &str) -> Self {
        Content::Text(text.to_string())
    }
}

/// Entry point: creates one [`RenderRequest`] per render job
#[derive(Clone)]
pub struct Shooter {
    renderer: Arc<dyn Renderer>,
    templates: Arc<dyn TemplateEngine>,
    fetcher: Arc<dyn Fetcher>,
    storage: Arc<dyn Storage>,
    config: Arc<Config>,
}

impl Shooter {
    /// Create a shooter with an empty template set, the default fetcher and
    /// a `local` disk rooted at `./storage`.
    pub fn new<R>(renderer: R, config: Config) -> Self
    where
        R: Renderer + 'static,
    {
        Self {
            renderer: Arc::new(renderer),
            templates: Arc::new(StaticTemplates::new()),
            fetcher: default_fetcher(),
            storage: Arc::new(LocalDisks::default()),
            config: Arc::new(config),
        }
    }

    pub fn with_templates<T>(mut self, templates: T) -> Self
    where
        T: TemplateEngine + 'static,
    {
        self.templates = Arc::new(templates);
        self
    }

    pub fn with_fetcher<F>(mut self, fetcher: F) -> Self
    where
        F: Fetcher + 'static,
    {
        self.fetcher = Arc::new(fetcher);
        self
    }

    pub fn with_storage<S>(mut self, storage: S) -> Self
    where
        S: Storage + 'static,
    {
        self.storage = Arc::new(storage);
        self
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Resolve `content` with no template data. See [`Shooter::make_with`].
    pub fn make(&self, content: impl Into<Content>) -> Result<RenderRequest> {
        self.make_with(content, Value::Null)
    }

    /// Resolve `content` into HTML and start a new request.
    ///
    /// - a [`View`] is rendered with its own data
    /// - text naming a registered template is rendered with `data`
    /// - text that is an absolute URL is fetched; a failed fetch is an error
    /// - anything else is taken as raw HTML
    pub fn make_with(&self, content: impl Into<Content>, data: Value) -> Result<RenderRequest> {
        let html = match content.into() {
            Content::View(view) => view.render(self.templates.as_ref())?,
            Content::Text(text) => {
                if self.templates.exists(&text) {
                    debug!("resolving template '{}'", text);
                    self.templates.render(&text, &data)?
                } else if fetch::is_absolute_url(&text) {
                    self.fetcher.fetch(text.trim())?
                } else {
                    text
                }
            }
        };

        Ok(self.from_html(html))
    }

    /// Narrow entry point: a [`View`] is rendered, any text is raw HTML.
    /// No template-name lookup and no URL fetch.
    pub fn from_view_or_html(&self, content: impl Into<Content>) -> Result<RenderRequest> {
        let html = match content.into() {
            Content::View(view) => view.render(self.templates.as_ref())?,
            Content::Text(text) => text,
        };
        Ok(self.from_html(html))
    }

    /// Start a request from raw HTML
    pub fn from_html(&self, html: impl Into<String>) -> RenderRequest {
        RenderRequest {
            content: html.into(),
            viewport: Viewport::default(),
            scale_factor: 1,
            format: "png".to_string(),
            sandboxed: true,
            renderer: Arc::clone(&self.renderer),
            storage: Arc::clone(&self.storage),
            config: Arc::clone(&self.config),
        }
    }
}

#[cfg(feature = "fetch")]
fn default_fetcher() -> Arc<dyn Fetcher> {
    match fetch::HttpFetcher::new() {
        Ok(fetcher) => Arc::new(fetcher),
        Err(e) => {
            warn!("HTTP fetcher unavailable, URL content will fail: {}", e);
            Arc::new(NoFetcher)
        }
    }
}

#[cfg(not(feature = "fetch"))]
fn default_fetcher() -> Arc<dyn Fetcher> {
    Arc::new(NoFetcher)
}

/// A configured render job
///
/// Created by [`Shooter`]. Setters consume and return the request so they
/// chain; terminal operations borrow it and may be called repeatedly.
#[derive(Clone)]
pub struct RenderRequest {
    content: String,
    viewport: Viewport,
    scale_factor: u32,
    format: String,
    sandboxed: bool,
    renderer: Arc<dyn Renderer>,
    storage: Arc<dyn Storage>,
    config: Arc<Config>,
}

impl fmt::Debug for RenderRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderRequest")
            .field("content_len", &self.content.len())
            .field("viewport", &self.viewport)
            .field("scale_factor", &self.scale_factor)
            .field("format", &self.format)
            .field("sandboxed", &self.sandboxed)
            .finish_non_exhaustive()
    }
}

impl RenderRequest {
    /// Set the browser window size
    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.viewport = Viewport { width, height };
        self
    }

    /// Size the window from an aspect ratio such as 16:9.
    ///
    /// Both sides are scaled so that the smaller ratio term maps to
    /// `base_width` pixels (the current width when `None`): 16:9 at 1600
    /// gives 2844x1600, 9:16 at 900 gives 900x1600. A zero ratio term leaves
    /// the viewport unchanged.
    pub fn proportion(self, width_part: u32, height_part: u32, base_width: Option<u32>) -> Self {
        let min = width_part.min(height_part);
        if min == 0 {
            warn!(
                "ignoring proportion {}:{}, ratio terms must be positive",
                width_part, height_part
            );
            return self;
        }

        let base = u64::from(base_width.unwrap_or(self.viewport.width));
        let scaled = |part: u32| {
            let px = u64::from(part) * base / u64::from(min);
            u32::try_from(px).unwrap_or(u32::MAX)
        };

        let (width, height) = (scaled(width_part), scaled(height_part));
        self.viewport(width, height)
    }

    /// Set the device scale factor
    pub fn scale(mut self, scale_factor: u32) -> Self {
        self.scale_factor = scale_factor;
        self
    }

    /// Set the output format (`png`, `jpeg`, `pdf`, ...); stored lower-cased
    pub fn format(mut self, format: &str) -> Self {
        self.format = format.to_lowercase();
        self
    }

    /// Enable or disable the browser sandbox (enabled by default)
    pub fn sandbox(mut self, enabled: bool) -> Self {
        self.sandboxed = enabled;
        self
    }

    pub fn no_sandbox(self) -> Self {
        self.sandbox(false)
    }

    /// Current window size as `(width, height)`
    pub fn window_size(&self) -> (u32, u32) {
        (self.viewport.width, self.viewport.height)
    }

    pub fn scale_factor(&self) -> u32 {
        self.scale_factor
    }

    pub fn output_format(&self) -> &str {
        &self.format
    }

    pub fn is_sandboxed(&self) -> bool {
        self.sandboxed
    }

    /// The resolved content exactly as supplied
    pub fn content(&self) -> &str {
        &self.content
    }

    /// The content wrapped into a complete HTML document
    pub fn normalized_html(&self) -> String {
        document::wrap_document(&self.content, self.viewport, &self.config.lang())
    }

    /// The job that `generate` hands to the renderer
    pub fn render_job(&self) -> RenderJob {
        RenderJob {
            html: self.normalized_html(),
            viewport: self.viewport,
            scale_factor: self.scale_factor,
            chrome_path: self.config.chrome_path.clone(),
            no_sandbox: !self.sandboxed,
            output: Output::for_format(&self.format),
        }
    }

    /// Render and return the raw bytes. Every call renders again.
    pub fn generate(&self) -> Result<Vec<u8>> {
        let job = self.render_job();
        debug!(
            "rendering {:?} at {}x{} (scale {}, sandbox {})",
            job.output, job.viewport.width, job.viewport.height, job.scale_factor, self.sandboxed
        );
        self.renderer.render(&job)
    }

    /// Render and package the bytes as a file download.
    ///
    /// Without a filename one is synthesized from [`DOWNLOAD_PREFIX`], the
    /// local time and the format. A filename that does not end with the
    /// format gets `.{format}` appended.
    pub fn download(&self, filename: Option<&str>) -> Result<Download> {
        let filename = self.download_filename(filename);
        let bytes = self.generate()?;
        Ok(Download {
            filename,
            content_type: content_type_for(&self.format),
            bytes,
        })
    }

    /// The filename `download` would use
    pub fn download_filename(&self, requested: Option<&str>) -> String {
        let timestamp = chrono::Local::now().format("%Y-%m-%d-%H%M%S").to_string();
        resolve_filename(requested, &self.format, &timestamp)
    }

    /// Render and write the bytes to `path` on `disk` (the configured default
    /// disk when `None`).
    ///
    /// Render errors are returned; a storage failure yields `Ok(false)`.
    pub fn save(&self, path: &str, disk: Option<&str>) -> Result<bool> {
        let disk = disk.unwrap_or(&self.config.default_disk);
        let bytes = self.generate()?;
        Ok(self.storage.put(disk, path, &bytes))
    }

    /// Render and return the bytes base64-encoded
    pub fn to_base64(&self) -> Result<String> {
        let bytes = self.generate()?;
        Ok(Base64Engine::encode(&base64::engine::general_purpose::STANDARD, bytes))
    }
}

fn resolve_filename(requested: Option<&str>, format: &str, timestamp: &str) -> String {
    match requested.filter(|name| !name.is_empty()) {
        None => format!("{DOWNLOAD_PREFIX}{timestamp}.{format}"),
        Some(name) if name.ends_with(format) => name.to_string(),
        Some(name) => format!("{name}.{format}"),
    }
}

/// MIME type for an output format
pub fn content_type_for(format: &str) -> &'static str {
    match format {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Rendered bytes packaged as an attachment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Download {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

impl Download {
    /// Value for a `Content-Disposition` header
    pub fn content_disposition(&self) -> String {
        let escaped = self.filename.replace('\\', "\\\\").replace('"', "\\\"");
        format!("attachment; filename=\"{}\"", escaped)
    }

    /// Stream the bytes into `out`
    pub fn write_to<W: std::io::Write>(&self, mut out: W) -> std::io::Result<()> {
        out.write_all(&self.bytes)?;
        out.flush()
    }
}

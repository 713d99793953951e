//! Chrome DevTools Protocol renderer

use crate::{Error, Output, RenderJob, Renderer, Result};
use base64::Engine as Base64Engine;
use headless_chrome::protocol::cdp::Page;
use headless_chrome::{Browser, LaunchOptions};
use log::debug;
use std::time::Duration;

/// Renderer that launches headless Chrome (via the `headless_chrome` crate)
/// for each job.
///
/// The document is loaded through a base64 `data:` URL, so it never touches
/// the filesystem. PNG, JPEG (`jpg`/`jpeg`) and WebP screenshots are
/// supported, plus PDF.
#[derive(Debug, Clone)]
pub struct CdpRenderer {
    /// Time to let the page settle after navigation (fonts, images)
    pub settle_ms: u64,
    /// JPEG/WebP quality (0-100); ignored for PNG
    pub quality: Option<u32>,
}

impl Default for CdpRenderer {
    fn default() -> Self {
        Self {
            settle_ms: 500,
            quality: None,
        }
    }
}

impl CdpRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    fn launch(&self, job: &RenderJob) -> Result<Browser> {
        let launch_options = LaunchOptions::default_builder()
            .headless(true)
            .sandbox(!job.no_sandbox)
            .window_size(Some((job.viewport.width, job.viewport.height)))
            .path(job.chrome_path.clone())
            .build()
            .map_err(|e| Error::Render(format!("Failed to build launch options: {}", e)))?;

        Browser::new(launch_options)
            .map_err(|e| Error::Render(format!("Failed to launch browser: {}", e)))
    }
}

fn screenshot_format(format: &str) -> Result<Page::CaptureScreenshotFormatOption> {
    match format {
        "png" => Ok(Page::CaptureScreenshotFormatOption::Png),
        "jpg" | "jpeg" => Ok(Page::CaptureScreenshotFormatOption::Jpeg),
        "webp" => Ok(Page::CaptureScreenshotFormatOption::Webp),
        other => Err(Error::Render(format!("Unsupported image format: {}", other))),
    }
}

impl Renderer for CdpRenderer {
    fn render(&self, job: &RenderJob) -> Result<Vec<u8>> {
        // Resolve the format first so a bad one never launches a browser
        let image_format = match &job.output {
            Output::Image(format) => Some(screenshot_format(format)?),
            Output::Pdf => None,
        };

        let browser = self.launch(job)?;
        let tab = browser
            .new_tab()
            .map_err(|e| Error::Render(format!("Failed to create tab: {}", e)))?;

        let b64 = Base64Engine::encode(&base64::engine::general_purpose::STANDARD, &job.html);
        tab.navigate_to(&format!("data:text/html;charset=utf-8;base64,{}", b64))
            .map_err(|e| Error::Render(format!("Navigation failed: {}", e)))?;
        tab.wait_until_navigated()
            .map_err(|e| Error::Render(format!("Wait for navigation failed: {}", e)))?;

        std::thread::sleep(Duration::from_millis(self.settle_ms));

        let bytes = match image_format {
            None => tab
                .print_to_pdf(None)
                .map_err(|e| Error::Render(format!("PDF printing failed: {}", e)))?,
            Some(format) => {
                // Clip to the viewport; the clip scale multiplies the pixel density
                let clip = Page::Viewport {
                    x: 0.0,
                    y: 0.0,
                    width: f64::from(job.viewport.width),
                    height: f64::from(job.viewport.height),
                    scale: f64::from(job.scale_factor.max(1)),
                };
                tab.capture_screenshot(format, self.quality, Some(clip), true)
                    .map_err(|e| Error::Render(format!("Screenshot failed: {}", e)))?
            }
        };

        debug!("chrome produced {} bytes", bytes.len());
        drop(tab);
        drop(browser);
        Ok(bytes)
    }
}

use anyhow::{bail, Context};
use clap::Parser;
use htmlshot::{Config, RenderRequest, Renderer, Shooter};
use log::info;
use std::path::PathBuf;

/// Render an HTML file, URL or inline snippet to an image or PDF
#[derive(Parser, Debug)]
#[command(name = "htmlshot", version, about)]
struct Cli {
    /// Path to an HTML file, an absolute URL, or inline HTML
    input: String,

    /// Output file (defaults to a timestamped name in the current directory)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Window width in pixels
    #[arg(long)]
    width: Option<u32>,

    /// Window height in pixels
    #[arg(long)]
    height: Option<u32>,

    /// Aspect ratio such as 16:9. Takes precedence over --height; the
    /// smaller term is scaled to --width (or the default width)
    #[arg(long, value_parser = parse_ratio)]
    ratio: Option<Ratio>,

    /// Device scale factor
    #[arg(long, default_value_t = 1)]
    scale: u32,

    /// Output format: png, jpeg, webp or pdf
    #[arg(short, long, default_value = "png")]
    format: String,

    /// Disable the browser sandbox (needed in some containers)
    #[arg(long)]
    no_sandbox: bool,

    /// Chrome/Chromium executable
    #[arg(long)]
    chrome_path: Option<PathBuf>,

    /// Locale used for the document language, e.g. pt_BR
    #[arg(long)]
    locale: Option<String>,

    /// Print the output base64-encoded instead of writing a file
    #[arg(long)]
    base64: bool,

    /// Print the normalized HTML document and exit without rendering
    #[arg(long)]
    print_html: bool,
}

#[derive(Debug, Clone, Copy)]
struct Ratio {
    width: u32,
    height: u32,
}

fn parse_ratio(s: &str) -> Result<Ratio, String> {
    let (w, h) = s
        .split_once(':')
        .ok_or_else(|| format!("expected W:H, got '{}'", s))?;
    let width: u32 = w.trim().parse().map_err(|e| format!("bad ratio width: {}", e))?;
    let height: u32 = h.trim().parse().map_err(|e| format!("bad ratio height: {}", e))?;
    if width == 0 || height == 0 {
        return Err("ratio terms must be positive".to_string());
    }
    Ok(Ratio { width, height })
}

#[cfg(feature = "cdp")]
fn renderer() -> impl Renderer {
    htmlshot::cdp::CdpRenderer::new()
}

#[cfg(not(feature = "cdp"))]
fn renderer() -> impl Renderer {
    struct Unavailable;

    impl Renderer for Unavailable {
        fn render(&self, _job: &htmlshot::RenderJob) -> htmlshot::Result<Vec<u8>> {
            Err(htmlshot::Error::Render(
                "no renderer available: rebuild with `--features cdp`".into(),
            ))
        }
    }

    Unavailable
}

fn build_request(cli: &Cli, shooter: &Shooter) -> anyhow::Result<RenderRequest> {
    let path = PathBuf::from(&cli.input);
    let mut request = if path.is_file() {
        let html = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        shooter.from_html(html)
    } else {
        shooter.make(cli.input.as_str())?
    };

    let (width, height) = request.window_size();
    request = request.viewport(cli.width.unwrap_or(width), cli.height.unwrap_or(height));
    if let Some(ratio) = cli.ratio {
        request = request.proportion(ratio.width, ratio.height, cli.width);
    }

    Ok(request
        .scale(cli.scale)
        .format(&cli.format)
        .sandbox(!cli.no_sandbox))
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::from_env()?;
    if let Some(locale) = &cli.locale {
        config.locale = locale.clone();
    }
    if let Some(path) = &cli.chrome_path {
        config.chrome_path = Some(path.clone());
    }

    let shooter = Shooter::new(renderer(), config);
    let request = build_request(&cli, &shooter)?;

    if cli.print_html {
        println!("{}", request.normalized_html());
        return Ok(());
    }

    if cli.base64 {
        println!("{}", request.to_base64()?);
        return Ok(());
    }

    let requested = match &cli.output {
        Some(path) => match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => Some(name.to_string()),
            None => bail!("output path {} has no file name", path.display()),
        },
        None => None,
    };
    let download = request.download(requested.as_deref())?;

    let dir = cli
        .output
        .as_ref()
        .and_then(|p| p.parent())
        .map(PathBuf::from)
        .unwrap_or_default();
    let target = dir.join(&download.filename);
    let file = std::fs::File::create(&target)
        .with_context(|| format!("failed to create {}", target.display()))?;
    download.write_to(std::io::BufWriter::new(file))?;

    let (width, height) = request.window_size();
    info!(
        "wrote {} ({} bytes, {}x{} @{}x)",
        target.display(),
        download.bytes.len(),
        width,
        height,
        request.scale_factor()
    );
    println!("{}", target.display());
    Ok(())
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("htmlshot: {:#}", e);
        std::process::exit(1);
    }
}

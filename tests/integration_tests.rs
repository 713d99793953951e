//! Integration tests for render requests, driven through a recording renderer

use htmlshot::document::{count_tag, Tag};
use htmlshot::{
    Config, Error, Fetcher, LocalDisks, Output, RenderJob, Renderer, Shooter, StaticTemplates,
    View,
};
use regex::Regex;
use serde_json::json;
use std::sync::{Arc, Mutex};

/// Renderer double that records every job it receives
#[derive(Default)]
struct Recorder {
    jobs: Mutex<Vec<RenderJob>>,
    fail: bool,
}

impl Recorder {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    fn jobs(&self) -> Vec<RenderJob> {
        self.jobs.lock().unwrap().clone()
    }
}

impl Renderer for Recorder {
    fn render(&self, job: &RenderJob) -> htmlshot::Result<Vec<u8>> {
        self.jobs.lock().unwrap().push(job.clone());
        if self.fail {
            return Err(Error::Render("browser crashed".into()));
        }
        Ok(match &job.output {
            Output::Pdf => b"%PDF-1.7".to_vec(),
            Output::Image(format) => format!("IMG:{}", format).into_bytes(),
        })
    }
}

struct BrokenFetcher;

impl Fetcher for BrokenFetcher {
    fn fetch(&self, url: &str) -> htmlshot::Result<String> {
        Err(Error::Fetch(format!("{} unreachable", url)))
    }
}

fn shooter_with(recorder: &Arc<Recorder>, config: Config) -> Shooter {
    Shooter::new(recorder.clone(), config).with_templates(
        StaticTemplates::new()
            .with("invoice", "<body><h1>Invoice {{ number }}</h1></body>")
            .with("card", "<div class=\"card\">{{title}}</div>"),
    )
}

fn shooter(recorder: &Arc<Recorder>) -> Shooter {
    shooter_with(recorder, Config::default())
}

#[test]
fn raw_html_is_kept_verbatim() {
    let rec = Arc::new(Recorder::default());
    let req = shooter(&rec).make("  <p>raw</p>  ").unwrap();
    assert_eq!(req.content(), "  <p>raw</p>  ");
}

#[test]
fn template_name_is_resolved_with_data() {
    let rec = Arc::new(Recorder::default());
    let req = shooter(&rec)
        .make_with("invoice", json!({"number": 42}))
        .unwrap();
    assert_eq!(req.content(), "<body><h1>Invoice 42</h1></body>");
}

#[test]
fn view_handle_uses_its_own_data() {
    let rec = Arc::new(Recorder::default());
    let view = View::new("card").with_data(json!({"title": "Mine"}));
    let req = shooter(&rec)
        .make_with(view, json!({"title": "Ignored"}))
        .unwrap();
    assert_eq!(req.content(), "<div class=\"card\">Mine</div>");
}

#[test]
fn missing_view_is_fatal() {
    let rec = Arc::new(Recorder::default());
    let err = shooter(&rec).make(View::new("nope")).unwrap_err();
    assert!(matches!(err, Error::TemplateNotFound(_)));
}

#[test]
fn fetch_failure_is_fatal() {
    let rec = Arc::new(Recorder::default());
    let err = shooter(&rec)
        .with_fetcher(BrokenFetcher)
        .make("https://example.invalid/page")
        .unwrap_err();
    assert!(matches!(err, Error::Fetch(_)));
    assert!(rec.jobs().is_empty());
}

#[cfg(feature = "fetch")]
#[test]
fn url_content_is_fetched() {
    let server = tiny_http::Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr();

    std::thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let response = tiny_http::Response::from_string("<h1>Remote</h1>").with_header(
                "Content-Type: text/html; charset=utf-8"
                    .parse::<tiny_http::Header>()
                    .unwrap(),
            );
            let _ = request.respond(response);
        }
    });

    let rec = Arc::new(Recorder::default());
    let req = shooter(&rec).make(format!("http://{}/", addr)).unwrap();
    assert_eq!(req.content(), "<h1>Remote</h1>");
}

#[test]
fn generate_dispatches_pdf_and_images() {
    let rec = Arc::new(Recorder::default());
    let s = shooter(&rec);

    let pdf = s.make("<p>x</p>").unwrap().format("PDF").generate().unwrap();
    assert_eq!(pdf, b"%PDF-1.7");

    let jpg = s.make("<p>x</p>").unwrap().format("jpg").generate().unwrap();
    assert_eq!(jpg, b"IMG:jpg");

    let jobs = rec.jobs();
    assert_eq!(jobs[0].output, Output::Pdf);
    assert_eq!(jobs[1].output, Output::Image("jpg".into()));
}

#[test]
fn job_carries_viewport_scale_and_document() {
    let rec = Arc::new(Recorder::default());
    let config = Config {
        locale: "pt_BR".into(),
        chrome_path: Some("/opt/chrome/chrome".into()),
        ..Default::default()
    };
    shooter_with(&rec, config)
        .make("<p>Olá</p>")
        .unwrap()
        .proportion(16, 9, Some(1600))
        .scale(3)
        .generate()
        .unwrap();

    let job = &rec.jobs()[0];
    assert_eq!((job.viewport.width, job.viewport.height), (2844, 1600));
    assert_eq!(job.scale_factor, 3);
    assert_eq!(job.chrome_path.as_deref(), Some(std::path::Path::new("/opt/chrome/chrome")));
    assert!(job.html.contains("<html lang=\"pt-BR\">"));
    assert!(job.html.contains("width: 2844px; height: 1600px;"));
    assert_eq!(count_tag(&job.html, Tag::Body), 1);
}

#[test]
fn sandbox_is_on_unless_disabled() {
    let rec = Arc::new(Recorder::default());
    let s = shooter(&rec);

    s.make("x").unwrap().generate().unwrap();
    s.make("x").unwrap().sandbox(false).generate().unwrap();
    s.make("x").unwrap().no_sandbox().sandbox(true).generate().unwrap();

    let flags: Vec<bool> = rec.jobs().iter().map(|j| j.no_sandbox).collect();
    assert_eq!(flags, vec![false, true, false]);
}

#[test]
fn every_generate_renders_again() {
    let rec = Arc::new(Recorder::default());
    let req = shooter(&rec).make("<p>x</p>").unwrap();

    let first = req.generate().unwrap();
    let second = req.generate().unwrap();
    assert_eq!(first, second);
    assert_eq!(rec.jobs().len(), 2);

    req.to_base64().unwrap();
    req.download(None).unwrap();
    assert_eq!(rec.jobs().len(), 4);
}

#[test]
fn window_size_does_not_render() {
    let rec = Arc::new(Recorder::default());
    let req = shooter(&rec).make("x").unwrap().viewport(300, 200);
    assert_eq!(req.window_size(), (300, 200));
    assert!(rec.jobs().is_empty());
}

#[test]
fn renderer_errors_propagate() {
    let rec = Arc::new(Recorder::failing());
    let req = shooter(&rec).make("x").unwrap();

    assert!(matches!(req.generate(), Err(Error::Render(_))));
    assert!(matches!(req.to_base64(), Err(Error::Render(_))));
    assert!(matches!(req.download(Some("a")), Err(Error::Render(_))));
    assert!(matches!(req.save("a.png", None), Err(Error::Render(_))));
}

#[test]
fn download_names() {
    let rec = Arc::new(Recorder::default());
    let s = shooter(&rec);

    let png = s.make("x").unwrap().download(None).unwrap();
    let pattern = Regex::new(r"^file-\d{4}-\d{2}-\d{2}-\d{6}\.png$").unwrap();
    assert!(pattern.is_match(&png.filename), "got {}", png.filename);
    assert_eq!(png.content_type, "image/png");
    assert_eq!(png.bytes, b"IMG:png");

    let pdf = s.make("x").unwrap().format("pdf");
    assert_eq!(pdf.download(Some("report")).unwrap().filename, "report.pdf");
    let named = pdf.download(Some("report.pdf")).unwrap();
    assert_eq!(named.filename, "report.pdf");
    assert_eq!(named.content_type, "application/pdf");
    assert_eq!(named.content_disposition(), "attachment; filename=\"report.pdf\"");
}

#[test]
fn download_streams_bytes() {
    let rec = Arc::new(Recorder::default());
    let download = shooter(&rec).make("x").unwrap().download(None).unwrap();

    let mut sink = Vec::new();
    download.write_to(&mut sink).unwrap();
    assert_eq!(sink, b"IMG:png");
}

#[test]
fn save_writes_to_default_and_named_disks() {
    let local = tempfile::tempdir().unwrap();
    let archive = tempfile::tempdir().unwrap();
    let disks = LocalDisks::new()
        .with_disk("local", local.path())
        .with_disk("archive", archive.path());

    let rec = Arc::new(Recorder::default());
    let req = shooter(&rec).with_storage(disks).make("x").unwrap();

    assert!(req.save("shots/one.png", None).unwrap());
    assert!(req.save("two.png", Some("archive")).unwrap());
    assert!(!req.save("three.png", Some("missing")).unwrap());

    assert_eq!(std::fs::read(local.path().join("shots/one.png")).unwrap(), b"IMG:png");
    assert_eq!(std::fs::read(archive.path().join("two.png")).unwrap(), b"IMG:png");
}

#[test]
fn save_uses_configured_default_disk() {
    let dir = tempfile::tempdir().unwrap();
    let rec = Arc::new(Recorder::default());
    let config = Config {
        default_disk: "reports".into(),
        ..Default::default()
    };
    let req = shooter_with(&rec, config)
        .with_storage(LocalDisks::new().with_disk("reports", dir.path()))
        .make("x")
        .unwrap()
        .format("pdf");

    assert!(req.save("q1.pdf", None).unwrap());
    assert_eq!(std::fs::read(dir.path().join("q1.pdf")).unwrap(), b"%PDF-1.7");
}

#[test]
fn base64_encodes_rendered_bytes() {
    let rec = Arc::new(Recorder::default());
    let encoded = shooter(&rec).make("x").unwrap().format("pdf").to_base64().unwrap();
    assert_eq!(encoded, "JVBERi0xLjc=");
}

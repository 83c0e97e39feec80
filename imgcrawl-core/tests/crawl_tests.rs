// Tests for crawl orchestration

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use imgcrawl_core::config::CrawlConfig;
use imgcrawl_core::crawl::{CrawlOptions, describe_event, execute_crawl, extract_url_path};
use imgcrawl_scanner::model::output_file_name;
use imgcrawl_scanner::{CancelFlag, CrawlEvent, TransformKind};
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use url::Url;

fn write_png(path: &Path, color: [u8; 3]) {
    let mut pixels = RgbImage::new(3, 2);
    for pixel in pixels.pixels_mut() {
        *pixel = Rgb(color);
    }
    DynamicImage::ImageRgb8(pixels)
        .save_with_format(path, ImageFormat::Png)
        .unwrap();
}

/// index -> gallery -> deeper, with one image shared between index and gallery
fn build_site(root: &Path) -> Url {
    let site = root.join("site");
    fs::create_dir_all(site.join("img")).unwrap();
    write_png(&site.join("img/red.png"), [255, 0, 0]);
    write_png(&site.join("img/blue.png"), [0, 0, 255]);
    write_png(&site.join("img/green.png"), [0, 255, 0]);

    fs::write(
        site.join("index.html"),
        r#"<html><body>
            <img src="img/red.png">
            <a href="gallery.html">Gallery</a>
            <a href="index.html">Home</a>
        </body></html>"#,
    )
    .unwrap();
    fs::write(
        site.join("gallery.html"),
        r#"<html><body>
            <img src="img/red.png">
            <img src="img/blue.png">
            <img src="img/missing.png">
            <a href="deeper.html">Deeper</a>
        </body></html>"#,
    )
    .unwrap();
    fs::write(
        site.join("deeper.html"),
        r#"<html><body><img src="img/green.png"></body></html>"#,
    )
    .unwrap();

    Url::from_file_path(site.join("index.html")).unwrap()
}

fn config_for(out: &Path) -> CrawlConfig {
    CrawlConfig {
        max_depth: 1,
        transforms: vec![TransformKind::Grayscale, TransformKind::Mirror],
        output_dir: out.to_path_buf(),
        ..Default::default()
    }
}

// ============================================================================
// End-to-end crawl over a local site
// ============================================================================

#[tokio::test]
async fn test_local_crawl_transforms_each_image_once() {
    let dir = tempfile::tempdir().unwrap();
    let root = build_site(dir.path());
    let out = dir.path().join("out");

    let options = CrawlOptions {
        root: root.to_string(),
        config: config_for(&out),
        show_progress_bars: false,
    };
    let summary = execute_crawl(options, CancelFlag::new(), None).await.unwrap();

    // red (2) on index, blue (2) on gallery; deeper.html is past max depth
    assert_eq!(summary.images_transformed, 4);
    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.image_failures, 1);
    assert_eq!(summary.transform_failures, 0);

    let image_dir = root.join("img/").unwrap();
    for name in ["red.png", "blue.png"] {
        let file_name = output_file_name(image_dir.join(name).unwrap().as_str());
        for kind in ["grayscale", "mirror"] {
            let path = out.join(kind).join(&file_name);
            assert!(path.exists(), "missing output {}", path.display());
            image::open(&path).unwrap();
        }
    }

    let green = output_file_name(image_dir.join("green.png").unwrap().as_str());
    assert!(!out.join("grayscale").join(green).exists());
}

#[tokio::test]
async fn test_links_to_image_files_are_not_page_failures() {
    let dir = tempfile::tempdir().unwrap();
    let site = dir.path().join("thumbs");
    fs::create_dir_all(&site).unwrap();
    write_png(&site.join("small.png"), [10, 20, 30]);
    write_png(&site.join("large.png"), [30, 20, 10]);
    fs::write(
        site.join("index.html"),
        r#"<img src="small.png"><a href="large.png">Full size</a>"#,
    )
    .unwrap();

    let out = dir.path().join("out");
    let options = CrawlOptions {
        root: Url::from_file_path(site.join("index.html")).unwrap().to_string(),
        config: CrawlConfig {
            transforms: vec![TransformKind::Sepia],
            ..config_for(&out)
        },
        show_progress_bars: false,
    };
    let summary = execute_crawl(options, CancelFlag::new(), None).await.unwrap();

    assert_eq!(summary.images_transformed, 1);
    assert_eq!(summary.pages_visited, 2);
    assert_eq!(summary.page_failures, 0);
}

#[tokio::test]
async fn test_progress_callback_receives_notices() {
    let dir = tempfile::tempdir().unwrap();
    let root = build_site(dir.path());

    let notices = Arc::new(Mutex::new(Vec::new()));
    let sink = notices.clone();
    let options = CrawlOptions {
        root: root.to_string(),
        config: config_for(&dir.path().join("out")),
        show_progress_bars: false,
    };
    execute_crawl(
        options,
        CancelFlag::new(),
        Some(Arc::new(move |msg: String| sink.lock().unwrap().push(msg))),
    )
    .await
    .unwrap();

    let notices = notices.lock().unwrap();
    assert!(notices.iter().any(|n| n.starts_with(">> Depth: 0")));
    assert!(notices.iter().any(|n| n.starts_with("Already processed")));
    assert!(notices.iter().any(|n| n.starts_with("Exceeded max depth")));
    assert!(notices.iter().any(|n| n.starts_with("[!] Image")));
}

#[tokio::test]
async fn test_cancelled_crawl_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let root = build_site(dir.path());
    let out = dir.path().join("out");

    let cancel = CancelFlag::new();
    cancel.cancel();
    let options = CrawlOptions {
        root: root.to_string(),
        config: config_for(&out),
        show_progress_bars: false,
    };
    let err = execute_crawl(options, cancel, None).await.unwrap_err();

    assert!(err.is_cancelled());
    assert!(!out.exists());
}

#[tokio::test]
async fn test_invalid_config_is_rejected_before_crawling() {
    let dir = tempfile::tempdir().unwrap();
    let root = build_site(dir.path());
    let out = dir.path().join("out");

    let options = CrawlOptions {
        root: root.to_string(),
        config: CrawlConfig {
            transforms: Vec::new(),
            ..config_for(&out)
        },
        show_progress_bars: false,
    };
    assert!(execute_crawl(options, CancelFlag::new(), None).await.is_err());
    assert!(!out.exists());
}

// ============================================================================
// Helper Tests
// ============================================================================

#[test]
fn test_extract_url_path() {
    assert_eq!(extract_url_path("http://example.com/"), "/");
    assert_eq!(extract_url_path("http://example.com"), "/");
    assert_eq!(extract_url_path("http://example.com/img/a.png?x=1"), "/img/a.png");
    assert_eq!(extract_url_path("not a valid url"), "not a valid url");
}

#[test]
fn test_describe_event() {
    let entered = CrawlEvent::PageEntered {
        uri: "http://example.com/".to_string(),
        depth: 2,
    };
    assert_eq!(describe_event(&entered), ">> Depth: 2 [http://example.com/]");

    let applied = CrawlEvent::TransformApplied {
        url: "http://example.com/a.png".to_string(),
        kind: TransformKind::Sepia,
    };
    assert_eq!(describe_event(&applied), "sepia http://example.com/a.png");

    let visited = CrawlEvent::AlreadyVisited {
        uri: "http://example.com/".to_string(),
    };
    assert_eq!(describe_event(&visited), "Already processed http://example.com/");
}

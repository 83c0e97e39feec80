use crate::config::CrawlConfig;
use imgcrawl_scanner::error::{Result, ScanError};
use imgcrawl_scanner::{
    CachingImageFetcher, CancelFlag, CrawlEvent, CrawlSummary, Crawler, DirectoryStore,
    FileFetcher, HttpFetcher, ImageFetcher, PixelTransformer, ProgressCallback, SchemeFetcher,
};
use indicatif::{ProgressBar, ProgressStyle};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tracing::info;
use url::Url;

/// Options for configuring a crawl operation
pub struct CrawlOptions {
    pub root: String,
    pub config: CrawlConfig,
    pub show_progress_bars: bool,
}

/// Callback for reporting crawl progress as human-readable notices
pub type CrawlProgressCallback = Arc<dyn Fn(String) + Send + Sync>;

/// Extract the path component from a URL, or the input if it isn't one
pub fn extract_url_path(url: &str) -> String {
    Url::parse(url)
        .ok()
        .map(|u| {
            let path = u.path().to_string();
            if path.is_empty() || path == "/" {
                "/".to_string()
            } else {
                path
            }
        })
        .unwrap_or_else(|| url.to_string())
}

/// One-line description of a crawl event
pub fn describe_event(event: &CrawlEvent) -> String {
    match event {
        CrawlEvent::PageEntered { uri, depth } => {
            format!(">> Depth: {} [{}]", depth, uri)
        }
        CrawlEvent::DepthExceeded { uri, depth } => {
            format!("Exceeded max depth at {} (depth {})", uri, depth)
        }
        CrawlEvent::AlreadyVisited { uri } => format!("Already processed {}", uri),
        CrawlEvent::PageFailed { uri, error } => format!("[!] Page {}: {}", uri, error),
        CrawlEvent::ImageFailed { url, error } => format!("[!] Image {}: {}", url, error),
        CrawlEvent::TransformApplied { url, kind } => format!("{} {}", kind, url),
        CrawlEvent::TransformFailed { url, kind, error } => {
            format!("[!] {} {}: {}", kind, url, error)
        }
    }
}

/// Wire the production collaborators for `config` into a fresh crawler
pub fn build_crawler(config: &CrawlConfig, cancel: CancelFlag) -> Result<Crawler> {
    config.validate()?;

    let fetcher = SchemeFetcher::new(
        HttpFetcher::new(config.timeout_secs, &config.user_agent)?,
        FileFetcher::new(),
    );
    let images: Arc<dyn ImageFetcher> = if config.cache_images {
        Arc::new(CachingImageFetcher::new(fetcher.clone()))
    } else {
        Arc::new(fetcher.clone())
    };

    Ok(Crawler::new(
        Arc::new(fetcher),
        images,
        Arc::new(PixelTransformer::new()),
        Arc::new(DirectoryStore::new(&config.output_dir)),
    )
    .with_max_depth(config.max_depth)
    .with_transforms(config.transforms.clone())
    .with_cancel_flag(cancel))
}

/// Execute a crawl with the given options
/// Returns the crawl summary, or `ScanError::Cancelled` if the run was stopped
pub async fn execute_crawl(
    options: CrawlOptions,
    cancel: CancelFlag,
    progress_callback: Option<CrawlProgressCallback>,
) -> Result<CrawlSummary> {
    let CrawlOptions {
        root,
        config,
        show_progress_bars,
    } = options;

    // Set up single progress bar for overall crawl progress (only if enabled)
    let progress_bar = if show_progress_bars {
        let pb = ProgressBar::new_spinner();
        pb.set_style(
            ProgressStyle::default_spinner()
                .template("{spinner:.cyan} {msg}")
                .map_err(|e| ScanError::Other(e.to_string()))?,
        );
        pb.enable_steady_tick(Duration::from_millis(100));
        pb.set_message("Starting crawl...");
        Some(Arc::new(pb))
    } else {
        None
    };

    // Counter for transforms applied so far
    let applied_count = Arc::new(AtomicUsize::new(0));

    let pb_clone = progress_bar.clone();
    let count_clone = applied_count.clone();
    let internal_callback: ProgressCallback = Arc::new(move |event: CrawlEvent| {
        if matches!(event, CrawlEvent::TransformApplied { .. }) {
            count_clone.fetch_add(1, Ordering::Relaxed);
        }

        if let Some(ref pb) = pb_clone
            && let CrawlEvent::PageEntered { ref uri, depth } = event
        {
            pb.set_message(format!(
                "Crawling {} (depth {}) - {} transforms applied",
                extract_url_path(uri),
                depth,
                count_clone.load(Ordering::Relaxed)
            ));
        }

        if let Some(ref callback) = progress_callback {
            callback(describe_event(&event));
        }
    });

    info!(
        "Writing transformed images to {}",
        config.output_dir.display()
    );
    let crawler = build_crawler(&config, cancel)?.with_progress_callback(internal_callback);
    let outcome = crawler.run(&root).await;

    // Finish progress bar (only if enabled)
    if let Some(ref pb) = progress_bar {
        let total = applied_count.load(Ordering::Relaxed);
        match outcome {
            Ok(_) => {
                pb.finish_with_message(format!("Crawl complete! {} transforms applied", total))
            }
            Err(_) => pb.abandon_with_message(format!("Crawl stopped after {} transforms", total)),
        }
    }

    outcome
}

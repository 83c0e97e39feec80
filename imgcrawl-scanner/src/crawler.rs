use crate::cache::TransformCache;
use crate::cancel::CancelFlag;
use crate::error::{Result, ScanError};
use crate::fetch::{ImageFetcher, PageFetcher};
use crate::model::{Element, Image, TransformKind};
use crate::result::CrawlSummary;
use crate::store::ImageStore;
use crate::transform::ImageTransformer;
use crate::visited::VisitedSet;
use futures::FutureExt;
use futures::future::BoxFuture;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;
use tracing::{debug, info, warn};

pub const DEFAULT_MAX_DEPTH: usize = 3;

/// Progress notices emitted while crawling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CrawlEvent {
    PageEntered { uri: String, depth: usize },
    DepthExceeded { uri: String, depth: usize },
    AlreadyVisited { uri: String },
    PageFailed { uri: String, error: String },
    ImageFailed { url: String, error: String },
    TransformApplied { url: String, kind: TransformKind },
    TransformFailed { url: String, kind: TransformKind, error: String },
}

pub type ProgressCallback = Arc<dyn Fn(CrawlEvent) + Send + Sync>;

#[derive(Debug, Default)]
struct CrawlStats {
    page_failures: AtomicUsize,
    image_failures: AtomicUsize,
    transform_failures: AtomicUsize,
}

/// A single depth-first crawl run.
///
/// Each `Crawler` owns a fresh [`VisitedSet`] and [`TransformCache`], so
/// build a new one for every run.
pub struct Crawler {
    pages: Arc<dyn PageFetcher>,
    images: Arc<dyn ImageFetcher>,
    transformer: Arc<dyn ImageTransformer>,
    store: Arc<dyn ImageStore>,
    transforms: Vec<TransformKind>,
    max_depth: usize,
    cancel: CancelFlag,
    visited: VisitedSet,
    cache: TransformCache,
    stats: CrawlStats,
    progress_callback: Option<ProgressCallback>,
}

impl Crawler {
    pub fn new(
        pages: Arc<dyn PageFetcher>,
        images: Arc<dyn ImageFetcher>,
        transformer: Arc<dyn ImageTransformer>,
        store: Arc<dyn ImageStore>,
    ) -> Self {
        Self {
            pages,
            images,
            transformer,
            store,
            transforms: TransformKind::ALL.to_vec(),
            max_depth: DEFAULT_MAX_DEPTH,
            cancel: CancelFlag::new(),
            visited: VisitedSet::new(),
            cache: TransformCache::new(),
            stats: CrawlStats::default(),
            progress_callback: None,
        }
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = depth;
        self
    }

    /// Duplicate kinds are dropped, keeping first-seen order.
    pub fn with_transforms(mut self, transforms: Vec<TransformKind>) -> Self {
        let mut unique = Vec::with_capacity(transforms.len());
        for kind in transforms {
            if !unique.contains(&kind) {
                unique.push(kind);
            }
        }
        self.transforms = unique;
        self
    }

    pub fn with_cancel_flag(mut self, cancel: CancelFlag) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn transforms(&self) -> &[TransformKind] {
        &self.transforms
    }

    pub fn visited(&self) -> &VisitedSet {
        &self.visited
    }

    pub fn cache(&self) -> &TransformCache {
        &self.cache
    }

    /// Crawls from `root` at depth 0 and summarises the run.
    pub async fn run(&self, root: &str) -> Result<CrawlSummary> {
        info!(
            "Starting crawl of {} (max depth {}, transforms {:?})",
            root, self.max_depth, self.transforms
        );
        let start = Instant::now();

        let images_transformed = self.crawl(root, 0).await?;

        let summary = CrawlSummary {
            root: root.to_string(),
            max_depth: self.max_depth,
            transforms: self.transforms.clone(),
            images_transformed,
            pages_visited: self.visited.len(),
            reservations: self.cache.len(),
            page_failures: self.stats.page_failures.load(Ordering::Relaxed),
            image_failures: self.stats.image_failures.load(Ordering::Relaxed),
            transform_failures: self.stats.transform_failures.load(Ordering::Relaxed),
            elapsed_ms: u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        };
        info!(
            "Crawl complete. {} transforms applied across {} pages",
            summary.images_transformed, summary.pages_visited
        );
        Ok(summary)
    }

    /// Recursively crawls `page_uri` and returns the number of transforms
    /// newly applied in its subtree.
    ///
    /// Pages deeper than the maximum depth and pages already visited
    /// contribute 0. Fetch and transform failures are absorbed as 0; the
    /// only error returned is [`ScanError::Cancelled`].
    pub fn crawl<'a>(&'a self, page_uri: &'a str, depth: usize) -> BoxFuture<'a, Result<usize>> {
        async move {
            self.ensure_not_cancelled()?;

            debug!(">> Depth: {} [{}]", depth, page_uri);

            if depth > self.max_depth {
                debug!("Exceeded max depth of {}", self.max_depth);
                self.emit(CrawlEvent::DepthExceeded {
                    uri: page_uri.to_string(),
                    depth,
                });
                return Ok(0);
            }

            if !self.visited.try_mark_visited(page_uri) {
                debug!("Already processed {}", page_uri);
                self.emit(CrawlEvent::AlreadyVisited {
                    uri: page_uri.to_string(),
                });
                return Ok(0);
            }

            self.crawl_page(page_uri, depth).await
        }
        .boxed()
    }

    async fn crawl_page(&self, page_uri: &str, depth: usize) -> Result<usize> {
        info!("Crawling {} (depth {})", page_uri, depth);
        self.emit(CrawlEvent::PageEntered {
            uri: page_uri.to_string(),
            depth,
        });

        let elements = match self.pages.get_elements(page_uri).await {
            Ok(elements) => elements,
            Err(ScanError::Cancelled) => return Err(ScanError::Cancelled),
            Err(e) => {
                warn!("Failed to fetch page {}: {}", page_uri, e);
                self.stats.page_failures.fetch_add(1, Ordering::Relaxed);
                self.emit(CrawlEvent::PageFailed {
                    uri: page_uri.to_string(),
                    error: e.to_string(),
                });
                return Ok(0);
            }
        };

        let mut total = 0;
        for element in &elements {
            total += match element {
                Element::Image(url) => self.process_image(url).await?,
                Element::Page(url) => self.crawl(url, depth + 1).await?,
            };
        }
        Ok(total)
    }

    /// Applies every configured transform not yet reserved for the image at
    /// `url`, returning how many were newly applied. A failed download
    /// contributes 0.
    pub async fn process_image(&self, url: &str) -> Result<usize> {
        self.ensure_not_cancelled()?;

        let image = match self.images.fetch(url).await {
            Ok(image) => image,
            Err(ScanError::Cancelled) => return Err(ScanError::Cancelled),
            Err(e) => {
                warn!("Failed to download image {}: {}", url, e);
                self.stats.image_failures.fetch_add(1, Ordering::Relaxed);
                self.emit(CrawlEvent::ImageFailed {
                    url: url.to_string(),
                    error: e.to_string(),
                });
                return Ok(0);
            }
        };

        let mut applied = 0;
        for &kind in &self.transforms {
            self.ensure_not_cancelled()?;

            if !self.cache.try_reserve(&image, kind) {
                debug!("{} already applied to {}", kind, url);
                continue;
            }

            match self.transform_and_store(kind, &image) {
                Ok(()) => {
                    applied += 1;
                    self.emit(CrawlEvent::TransformApplied {
                        url: url.to_string(),
                        kind,
                    });
                }
                Err(e) => {
                    warn!("Failed to apply {} to {}: {}", kind, url, e);
                    self.stats.transform_failures.fetch_add(1, Ordering::Relaxed);
                    self.emit(CrawlEvent::TransformFailed {
                        url: url.to_string(),
                        kind,
                        error: e.to_string(),
                    });
                }
            }
        }
        Ok(applied)
    }

    fn transform_and_store(&self, kind: TransformKind, image: &Image) -> Result<()> {
        let transformed = self.transformer.apply(kind, image)?;
        self.store.persist(&transformed)
    }

    fn ensure_not_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            debug!("Cancellation observed");
            return Err(ScanError::Cancelled);
        }
        Ok(())
    }

    fn emit(&self, event: CrawlEvent) {
        if let Some(ref callback) = self.progress_callback {
            callback(event);
        }
    }
}

use crate::error::{Result, ScanError};
use crate::model::{Element, Image};
use async_trait::async_trait;
use reqwest::Client;
use reqwest::header::CONTENT_TYPE;
use scraper::{Html, Selector};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;
use tracing::debug;
use url::Url;

const ELEMENT_SELECTOR: &str = "img[src], a[href]";
const SKIPPED_SCHEMES: [&str; 4] = ["javascript:", "mailto:", "tel:", "data:"];
const PAGE_EXTENSIONS: [&str; 2] = ["html", "htm"];

/// Source of the typed elements found on a page.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn get_elements(&self, page_uri: &str) -> Result<Vec<Element>>;
}

/// Source of raw image content.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<Image>;
}

/// Extracts `<img src>` and `<a href>` references from `html` in document
/// order, resolved against `base`.
pub fn parse_elements(html: &str, base: &Url) -> Result<Vec<Element>> {
    let document = Html::parse_document(html);
    let selector = Selector::parse(ELEMENT_SELECTOR)
        .map_err(|e| ScanError::ParseError(format!("{:?}", e)))?;

    let mut elements = Vec::new();
    for element in document.select(&selector) {
        let node = element.value();
        let (reference, is_image) = match node.name() {
            "img" => (node.attr("src"), true),
            _ => (node.attr("href"), false),
        };

        if let Some(url) = reference.and_then(|r| resolve_reference(base, r)) {
            debug!("Found {} reference: {}", node.name(), url);
            elements.push(if is_image {
                Element::Image(url)
            } else {
                Element::Page(url)
            });
        }
    }

    Ok(elements)
}

fn resolve_reference(base: &Url, reference: &str) -> Option<String> {
    let reference = reference.trim();
    let lowered = reference.to_ascii_lowercase();
    if reference.is_empty()
        || reference.starts_with('#')
        || SKIPPED_SCHEMES.iter().any(|scheme| lowered.starts_with(scheme))
    {
        return None;
    }

    let mut url = base.join(reference).ok()?;
    url.set_fragment(None);
    Some(url.to_string())
}

fn parse_url(uri: &str) -> Result<Url> {
    Url::parse(uri).map_err(|e| ScanError::InvalidUrl(format!("{}: {}", uri, e)))
}

/// Fetches pages and images over HTTP(S).
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(timeout_secs.div_ceil(2)))
            .redirect(reqwest::redirect::Policy::limited(5))
            .build()?;

        Ok(Self { client })
    }

    async fn get(&self, url: &str) -> Result<reqwest::Response> {
        debug!("Fetching {}", url);
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(ScanError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        Ok(response)
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn get_elements(&self, page_uri: &str) -> Result<Vec<Element>> {
        let base = parse_url(page_uri)?;
        let response = self.get(page_uri).await?;

        let is_html = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.contains("html"))
            .unwrap_or(true);
        if !is_html {
            debug!("Not an HTML page, no elements: {}", page_uri);
            return Ok(Vec::new());
        }

        let body = response.text().await?;
        parse_elements(&body, &base)
    }
}

#[async_trait]
impl ImageFetcher for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<Image> {
        let bytes = self.get(url).await?.bytes().await?;
        Ok(Image::new(url, bytes.to_vec()))
    }
}

/// Fetches pages and images from `file://` URLs.
#[derive(Debug, Clone, Default)]
pub struct FileFetcher;

impl FileFetcher {
    pub fn new() -> Self {
        Self
    }

    fn to_path(url: &Url) -> Result<PathBuf> {
        url.to_file_path()
            .map_err(|_| ScanError::InvalidUrl(format!("not a local file URL: {}", url)))
    }

    fn is_page(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| PAGE_EXTENSIONS.iter().any(|p| ext.eq_ignore_ascii_case(p)))
            .unwrap_or(false)
    }
}

#[async_trait]
impl PageFetcher for FileFetcher {
    async fn get_elements(&self, page_uri: &str) -> Result<Vec<Element>> {
        let mut base = parse_url(page_uri)?;
        let mut path = Self::to_path(&base)?;

        if tokio::fs::metadata(&path).await?.is_dir() {
            path.push("index.html");
            base = Url::from_file_path(&path)
                .map_err(|_| ScanError::InvalidUrl(path.display().to_string()))?;
        } else if !Self::is_page(&path) {
            debug!("Not an HTML page, no elements: {}", page_uri);
            return Ok(Vec::new());
        }

        debug!("Reading {}", path.display());
        let html = tokio::fs::read_to_string(&path).await?;
        parse_elements(&html, &base)
    }
}

#[async_trait]
impl ImageFetcher for FileFetcher {
    async fn fetch(&self, url: &str) -> Result<Image> {
        let path = Self::to_path(&parse_url(url)?)?;
        let bytes = tokio::fs::read(&path).await?;
        Ok(Image::new(url, bytes))
    }
}

/// Routes `http`/`https` URLs to [`HttpFetcher`] and `file` URLs to
/// [`FileFetcher`].
#[derive(Debug, Clone)]
pub struct SchemeFetcher {
    http: HttpFetcher,
    file: FileFetcher,
}

enum Route {
    Http,
    File,
}

impl SchemeFetcher {
    pub fn new(http: HttpFetcher, file: FileFetcher) -> Self {
        Self { http, file }
    }

    fn route(uri: &str) -> Result<Route> {
        match parse_url(uri)?.scheme() {
            "http" | "https" => Ok(Route::Http),
            "file" => Ok(Route::File),
            other => Err(ScanError::InvalidUrl(format!(
                "unsupported scheme '{}' in {}",
                other, uri
            ))),
        }
    }
}

#[async_trait]
impl PageFetcher for SchemeFetcher {
    async fn get_elements(&self, page_uri: &str) -> Result<Vec<Element>> {
        match Self::route(page_uri)? {
            Route::Http => self.http.get_elements(page_uri).await,
            Route::File => self.file.get_elements(page_uri).await,
        }
    }
}

#[async_trait]
impl ImageFetcher for SchemeFetcher {
    async fn fetch(&self, url: &str) -> Result<Image> {
        match Self::route(url)? {
            Route::Http => self.http.fetch(url).await,
            Route::File => self.file.fetch(url).await,
        }
    }
}

/// Keeps the raw bytes of every successfully downloaded image so repeated
/// references to the same URL are served without another download.
/// Failed downloads are not remembered.
pub struct CachingImageFetcher<F> {
    inner: F,
    images: Mutex<HashMap<String, Image>>,
}

impl<F: ImageFetcher> CachingImageFetcher<F> {
    pub fn new(inner: F) -> Self {
        Self {
            inner,
            images: Mutex::new(HashMap::new()),
        }
    }

    pub fn cached_count(&self) -> usize {
        self.images
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

#[async_trait]
impl<F: ImageFetcher> ImageFetcher for CachingImageFetcher<F> {
    async fn fetch(&self, url: &str) -> Result<Image> {
        let cached = self
            .images
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned();
        if let Some(image) = cached {
            debug!("Image cache hit: {}", url);
            return Ok(image);
        }

        let image = self.inner.fetch(url).await?;
        self.images
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(url.to_string(), image.clone());
        Ok(image)
    }
}

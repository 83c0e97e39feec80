pub mod cache;
pub mod cancel;
pub mod crawler;
pub mod error;
pub mod fetch;
pub mod model;
pub mod result;
pub mod store;
pub mod transform;
pub mod visited;

pub use cache::TransformCache;
pub use cancel::CancelFlag;
pub use crawler::{CrawlEvent, Crawler, ProgressCallback};
pub use error::ScanError;
pub use fetch::{
    CachingImageFetcher, FileFetcher, HttpFetcher, ImageFetcher, PageFetcher, SchemeFetcher,
};
pub use model::{CacheKey, Element, Image, TransformKind, TransformedImage};
pub use result::CrawlSummary;
pub use store::{DirectoryStore, ImageStore};
pub use transform::{ImageTransformer, PixelTransformer};
pub use visited::VisitedSet;

use crate::model::TransformKind;
use serde::{Deserialize, Serialize};

/// Outcome of one crawl run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrawlSummary {
    pub root: String,
    pub max_depth: usize,
    pub transforms: Vec<TransformKind>,
    /// Transforms newly applied and stored across the whole run.
    pub images_transformed: usize,
    pub pages_visited: usize,
    pub reservations: usize,
    pub page_failures: usize,
    pub image_failures: usize,
    pub transform_failures: usize,
    pub elapsed_ms: u64,
}

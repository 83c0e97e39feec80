pub mod handlers;

// Re-export commonly used handler functions for convenience
pub use handlers::{
    CrawlOverrides, apply_overrides, exit_code_for, load_config, log_level, parse_transforms,
    resolve_root,
};

// Re-export crawl functionality from imgcrawl-core
pub use imgcrawl_core::crawl::{CrawlOptions, CrawlProgressCallback, execute_crawl};
pub use imgcrawl_core::report::{ReportFormat, generate_crawl_report};

use imgcrawl_scanner::crawler::DEFAULT_MAX_DEPTH;
use imgcrawl_scanner::error::{Result, ScanError};
use imgcrawl_scanner::TransformKind;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for one crawl run. Every field has a default, so a config file
/// only needs the keys it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct CrawlConfig {
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    #[serde(default = "default_transforms")]
    pub transforms: Vec<TransformKind>,

    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Keep downloaded bytes for the run so repeated references are not
    /// downloaded again.
    #[serde(default = "default_cache_images")]
    pub cache_images: bool,
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            transforms: default_transforms(),
            output_dir: default_output_dir(),
            timeout_secs: default_timeout_secs(),
            user_agent: default_user_agent(),
            cache_images: default_cache_images(),
        }
    }
}

impl CrawlConfig {
    /// Loads a JSON config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: CrawlConfig = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.transforms.is_empty() {
            return Err(ScanError::InvalidConfig(
                "at least one transform is required".to_string(),
            ));
        }
        if self.timeout_secs == 0 {
            return Err(ScanError::InvalidConfig(
                "timeout must be at least one second".to_string(),
            ));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ScanError::InvalidConfig("user agent is empty".to_string()));
        }
        Ok(())
    }
}

fn default_max_depth() -> usize {
    DEFAULT_MAX_DEPTH
}

fn default_transforms() -> Vec<TransformKind> {
    TransformKind::ALL.to_vec()
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("downloaded-images")
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_user_agent() -> String {
    format!("imgcrawl/{}", env!("CARGO_PKG_VERSION"))
}

fn default_cache_images() -> bool {
    true
}

use imgcrawl_core::config::CrawlConfig;
use imgcrawl_scanner::{ScanError, TransformKind};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::Level;
use url::Url;

/// Exit status used when the crawl was interrupted
pub const EXIT_CANCELLED: i32 = 130;

/// Command-line values that take precedence over the config file
#[derive(Debug, Default, Clone)]
pub struct CrawlOverrides {
    pub depth: Option<usize>,
    pub transforms: Vec<String>,
    pub output: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub no_image_cache: bool,
}

/// Turn the ROOT argument into a crawlable URL.
///
/// http(s) and file URLs pass through. Anything else is treated as a local
/// path. A directory, given either way, resolves to its `index.html` when
/// one exists.
pub fn resolve_root(input: &str) -> Result<String, String> {
    if let Ok(url) = Url::parse(input)
        && matches!(url.scheme(), "http" | "https" | "file")
    {
        if url.scheme() == "file"
            && let Ok(path) = url.to_file_path()
            && path.is_dir()
        {
            return file_url_for(&path);
        }
        return Ok(url.to_string());
    }

    let expanded = shellexpand::tilde(input);
    let path = fs::canonicalize(&*expanded)
        .map_err(|e| format!("Cannot resolve root '{}': {}", input, e))?;
    file_url_for(&path)
}

fn file_url_for(path: &Path) -> Result<String, String> {
    let url = if path.is_dir() {
        let index = path.join("index.html");
        if index.is_file() {
            Url::from_file_path(&index)
        } else {
            Url::from_directory_path(path)
        }
    } else {
        Url::from_file_path(path)
    };

    url.map(|u| u.to_string())
        .map_err(|_| format!("Cannot convert '{}' to a file URL", path.display()))
}

/// Load the config file if one was given, otherwise the defaults
pub fn load_config(path: Option<&PathBuf>) -> Result<CrawlConfig, String> {
    match path {
        Some(path) => {
            let expanded = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).as_ref());
            CrawlConfig::from_file(&expanded)
                .map_err(|e| format!("Failed to load config {}: {}", expanded.display(), e))
        }
        None => Ok(CrawlConfig::default()),
    }
}

/// Parse transform names, keeping their order
pub fn parse_transforms(values: &[String]) -> Result<Vec<TransformKind>, String> {
    values
        .iter()
        .map(|v| v.parse::<TransformKind>().map_err(|e| e.to_string()))
        .collect()
}

/// Layer command-line overrides on top of a loaded config
pub fn apply_overrides(
    mut config: CrawlConfig,
    overrides: CrawlOverrides,
) -> Result<CrawlConfig, String> {
    if let Some(depth) = overrides.depth {
        config.max_depth = depth;
    }
    if !overrides.transforms.is_empty() {
        config.transforms = parse_transforms(&overrides.transforms)?;
    }
    if let Some(output) = overrides.output {
        config.output_dir = PathBuf::from(shellexpand::tilde(&output.to_string_lossy()).as_ref());
    }
    if let Some(timeout) = overrides.timeout_secs {
        config.timeout_secs = timeout;
    }
    if overrides.no_image_cache {
        config.cache_images = false;
    }

    config.validate().map_err(|e| e.to_string())?;
    Ok(config)
}

/// Map the global verbosity flags to a log level
pub fn log_level(quiet: bool, verbose: u8) -> Level {
    match (quiet, verbose) {
        (true, _) => Level::ERROR,
        (false, 0) => Level::WARN,
        (false, 1) => Level::INFO,
        (false, _) => Level::DEBUG,
    }
}

pub fn exit_code_for(error: &ScanError) -> i32 {
    if error.is_cancelled() { EXIT_CANCELLED } else { 1 }
}

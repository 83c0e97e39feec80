// Report generation from a crawl summary

use imgcrawl_scanner::CrawlSummary;
use imgcrawl_scanner::error::Result;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use std::path::Path;

const DIVIDER: &str = "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReportFormat {
    Text,
    Json,
}

impl ReportFormat {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "text" | "txt" => Some(ReportFormat::Text),
            "json" => Some(ReportFormat::Json),
            _ => None,
        }
    }
}

/// Render a crawl summary in the requested format
pub fn generate_crawl_report(summary: &CrawlSummary, format: ReportFormat) -> Result<String> {
    match format {
        ReportFormat::Text => Ok(generate_text_report(summary)),
        ReportFormat::Json => Ok(serde_json::to_string_pretty(summary)?),
    }
}

fn generate_text_report(summary: &CrawlSummary) -> String {
    let transforms = summary
        .transforms
        .iter()
        .map(|kind| kind.to_string())
        .collect::<Vec<_>>()
        .join(", ");

    let mut report = String::new();
    report.push_str(DIVIDER);
    report.push_str("\n\n# Summary:\n");
    report.push_str(&format!("  Root: {}\n", summary.root));
    report.push_str(&format!("  Max depth: {}\n", summary.max_depth));
    report.push_str(&format!("  Transforms: {}\n", transforms));
    report.push_str(&format!("  Pages visited: {}\n", summary.pages_visited));
    report.push_str(&format!(
        "  Images transformed: {}\n",
        summary.images_transformed
    ));
    report.push_str(&format!("  Reservations: {}\n", summary.reservations));
    report.push_str(&format!(
        "  Elapsed: {:.3}s\n",
        summary.elapsed_ms as f64 / 1000.0
    ));

    let failures = summary.page_failures + summary.image_failures + summary.transform_failures;
    if failures > 0 {
        report.push_str("\n# Failures:\n");
        report.push_str(&format!("  Pages: {}\n", summary.page_failures));
        report.push_str(&format!("  Images: {}\n", summary.image_failures));
        report.push_str(&format!("  Transforms: {}\n", summary.transform_failures));
    }

    report.push('\n');
    report.push_str(DIVIDER);
    report.push('\n');
    report
}

/// Write a rendered report to `path`
pub fn save_report(report: &str, path: &Path) -> Result<()> {
    let mut file = File::create(path)?;
    file.write_all(report.as_bytes())?;
    Ok(())
}

// Tests for report generation functionality

use imgcrawl_core::report::{ReportFormat, generate_crawl_report, save_report};
use imgcrawl_scanner::{CrawlSummary, TransformKind};
use tempfile::NamedTempFile;

fn summary() -> CrawlSummary {
    CrawlSummary {
        root: "http://example.com/".to_string(),
        max_depth: 2,
        transforms: vec![TransformKind::Grayscale, TransformKind::Mirror],
        images_transformed: 6,
        pages_visited: 4,
        reservations: 7,
        page_failures: 0,
        image_failures: 0,
        transform_failures: 1,
        elapsed_ms: 1500,
    }
}

// ============================================================================
// Report Format Tests
// ============================================================================

#[test]
fn test_report_format_from_str() {
    assert_eq!(ReportFormat::from_str("text"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("txt"), Some(ReportFormat::Text));
    assert_eq!(ReportFormat::from_str("json"), Some(ReportFormat::Json));
}

#[test]
fn test_report_format_from_str_case_insensitive() {
    assert_eq!(ReportFormat::from_str("JSON"), Some(ReportFormat::Json));
    assert_eq!(ReportFormat::from_str("Text"), Some(ReportFormat::Text));
}

#[test]
fn test_report_format_from_str_invalid() {
    assert_eq!(ReportFormat::from_str("html"), None);
    assert_eq!(ReportFormat::from_str(""), None);
}

// ============================================================================
// Report Content Tests
// ============================================================================

#[test]
fn test_text_report_contains_summary() {
    let report = generate_crawl_report(&summary(), ReportFormat::Text).unwrap();

    assert!(report.contains("Root: http://example.com/"));
    assert!(report.contains("Max depth: 2"));
    assert!(report.contains("Transforms: grayscale, mirror"));
    assert!(report.contains("Pages visited: 4"));
    assert!(report.contains("Images transformed: 6"));
    assert!(report.contains("Elapsed: 1.500s"));
}

#[test]
fn test_text_report_lists_failures_only_when_present() {
    let report = generate_crawl_report(&summary(), ReportFormat::Text).unwrap();
    assert!(report.contains("# Failures:"));
    assert!(report.contains("Transforms: 1"));

    let clean = CrawlSummary {
        transform_failures: 0,
        ..summary()
    };
    let report = generate_crawl_report(&clean, ReportFormat::Text).unwrap();
    assert!(!report.contains("# Failures:"));
}

#[test]
fn test_json_report_parses_back() {
    let report = generate_crawl_report(&summary(), ReportFormat::Json).unwrap();
    let value: serde_json::Value = serde_json::from_str(&report).unwrap();

    assert_eq!(value["images_transformed"], 6);
    assert_eq!(value["transforms"][1], "mirror");

    let parsed: CrawlSummary = serde_json::from_str(&report).unwrap();
    assert_eq!(parsed, summary());
}

#[test]
fn test_save_report() {
    let file = NamedTempFile::new().unwrap();
    save_report("hello report", file.path()).unwrap();
    assert_eq!(std::fs::read_to_string(file.path()).unwrap(), "hello report");
}

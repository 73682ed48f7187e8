// src/report.rs
// =============================================================================
// This module turns the crawl's raw results into the final verdict.
//
// Output formats:
// - Text: counts, pass rate, then every broken image with where it was found
// - JSON: the same data, machine readable (--json)
//
// The verdict is the exit code: 0 when no image is broken, 1 otherwise. CI
// pipelines depend on that, so it lives in exactly one place: exit_code().
// =============================================================================

use crate::checker::{ImageCheckResult, ImageStatus};
use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CrawlReport {
    /// Pages fetched (successfully or not)
    pub pages_crawled: usize,
    /// Unique images checked
    pub images_checked: usize,
    pub working: usize,
    pub broken: usize,
    /// True when Ctrl+C stopped the crawl early
    pub interrupted: bool,
    pub passed: bool,
    /// Every broken image, in the order it was discovered
    pub broken_images: Vec<ImageCheckResult>,
}

impl CrawlReport {
    pub fn new(
        pages_crawled: usize,
        images_checked: usize,
        results: Vec<ImageCheckResult>,
        interrupted: bool,
    ) -> Self {
        let working = results
            .iter()
            .filter(|r| r.status == ImageStatus::Working)
            .count();
        let broken_images: Vec<ImageCheckResult> = results
            .into_iter()
            .filter(|r| r.status == ImageStatus::Broken)
            .collect();
        let broken = broken_images.len();

        Self {
            pages_crawled,
            images_checked,
            working,
            broken,
            interrupted,
            // A partial crawl never passes
            passed: broken == 0 && !interrupted,
            broken_images,
        }
    }

    pub fn passed(&self) -> bool {
        self.passed
    }

    pub fn exit_code(&self) -> i32 {
        if self.passed {
            0
        } else {
            1
        }
    }

    // Share of checked images that work, in percent (100 when none checked)
    pub fn pass_rate(&self) -> f64 {
        let total = self.working + self.broken;
        if total == 0 {
            100.0
        } else {
            self.working as f64 * 100.0 / total as f64
        }
    }
}

// Prints the report either as text or as JSON
pub fn print_report(report: &CrawlReport, json: bool) -> Result<()> {
    if json {
        let json_output = serde_json::to_string_pretty(report)?;
        println!("{}", json_output);
    } else {
        print!("{}", render_text(report));
    }
    Ok(())
}

// Builds the human-readable report
fn render_text(report: &CrawlReport) -> String {
    let mut out = String::new();
    let rule = "=".repeat(50);

    out.push_str(&format!("\n{}\n📊 Results\n\n", rule));
    out.push_str(&format!("Pages crawled: {}\n", report.pages_crawled));
    out.push_str(&format!("Images checked: {}\n", report.images_checked));
    out.push_str(&format!("Working images: {}\n", report.working));
    out.push_str(&format!("Broken images: {}\n", report.broken));
    out.push_str(&format!("Pass rate: {:.1}%\n", report.pass_rate()));

    if !report.broken_images.is_empty() {
        out.push_str("\n❌ Broken Images:\n\n");
        for image in &report.broken_images {
            out.push_str(&format!("  Image: {}\n", image.url));
            out.push_str(&format!("  Found on: {}\n", image.found_on));
            if let Some(status) = image.http_status {
                out.push_str(&format!("  Status: {}\n", status));
            }
            if let Some(message) = &image.message {
                out.push_str(&format!("  Error: {}\n", message));
            }
            out.push('\n');
        }
    }

    if report.interrupted {
        out.push_str("\n⚠️  INTERRUPTED: crawl stopped before every page was visited\n");
    }

    if report.passed {
        out.push_str("\n✅ PASSED: All images are working\n");
    } else if report.broken > 0 {
        out.push_str(&format!(
            "\n💥 FAILED: {} broken image(s) found\n",
            report.broken
        ));
    } else {
        out.push_str("\n💥 FAILED: crawl did not complete\n");
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image(url: &str, status: ImageStatus, http_status: Option<u16>) -> ImageCheckResult {
        ImageCheckResult {
            url: url.to_string(),
            found_on: "http://localhost:3000/".to_string(),
            status,
            http_status,
            message: match status {
                ImageStatus::Working => None,
                ImageStatus::Broken => Some("HTTP 404".to_string()),
            },
        }
    }

    #[test]
    fn test_all_working_passes() {
        let report = CrawlReport::new(
            3,
            2,
            vec![
                image("http://localhost:3000/a.png", ImageStatus::Working, Some(200)),
                image("http://localhost:3000/b.png", ImageStatus::Working, Some(200)),
            ],
            false,
        );
        assert!(report.passed());
        assert_eq!(report.exit_code(), 0);
        assert_eq!(report.pass_rate(), 100.0);
        assert!(render_text(&report).contains("PASSED"));
    }

    #[test]
    fn test_one_broken_fails() {
        let report = CrawlReport::new(
            1,
            2,
            vec![
                image("http://localhost:3000/a.png", ImageStatus::Working, Some(200)),
                image("http://localhost:3000/gone.png", ImageStatus::Broken, Some(404)),
            ],
            false,
        );
        assert_eq!(report.working, 1);
        assert_eq!(report.broken, 1);
        assert_eq!(report.exit_code(), 1);
        assert_eq!(report.pass_rate(), 50.0);

        let text = render_text(&report);
        assert!(text.contains("Image: http://localhost:3000/gone.png"));
        assert!(text.contains("Status: 404"));
        assert!(text.contains("FAILED: 1 broken image(s)"));
    }

    #[test]
    fn test_no_images_passes() {
        let report = CrawlReport::new(5, 0, Vec::new(), false);
        assert!(report.passed());
        assert_eq!(report.pass_rate(), 100.0);
    }

    #[test]
    fn test_interrupted_never_passes() {
        let report = CrawlReport::new(1, 0, Vec::new(), true);
        assert!(!report.passed());
        assert_eq!(report.exit_code(), 1);
        assert!(render_text(&report).contains("INTERRUPTED"));
    }

    #[test]
    fn test_json_shape() {
        let report = CrawlReport::new(
            1,
            1,
            vec![image("http://localhost:3000/gone.png", ImageStatus::Broken, Some(404))],
            false,
        );
        let value = serde_json::to_value(&report).unwrap();

        assert_eq!(value["passed"], false);
        assert_eq!(value["broken"], 1);
        assert_eq!(value["broken_images"][0]["status"], "broken");
        assert_eq!(value["broken_images"][0]["http_status"], 404);
        assert_eq!(value["broken_images"][0]["found_on"], "http://localhost:3000/");
    }
}

//! Static HTML report
//!
//! Renders an analyzed [`Report`] into one self-contained page. All report
//! text is escaped; the page pulls no external resources.

use crate::report::{Report, TestRecord, TestStatus};
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Clusters shown in the "Top Failures" section
const TOP_CLUSTERS: usize = 5;

#[derive(Error, Debug)]
pub enum RenderError {
    #[error("Failed to write report to {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

const STYLE: &str = r#"
:root { --pass: #22863a; --fail: #cb2431; --skip: #6a737d; --flaky: #b08800; --border: #e1e4e8; }
* { box-sizing: border-box; }
body { font-family: -apple-system, "Segoe UI", sans-serif; margin: 0; padding: 40px; color: #1a1a1a; }
.container { max-width: 1000px; margin: 0 auto; }
header { border-bottom: 2px solid #1a1a1a; padding-bottom: 16px; margin-bottom: 24px; display: flex; justify-content: space-between; }
.meta { font-family: monospace; font-size: 13px; color: #666; }
.stats { display: grid; grid-template-columns: repeat(5, 1fr); gap: 1px; background: var(--border); border: 1px solid var(--border); margin-bottom: 24px; }
.stat { background: #fff; padding: 16px; }
.stat .value { font-size: 28px; font-weight: 700; }
.passed { color: var(--pass); } .failed { color: var(--fail); } .skipped { color: var(--skip); } .flaky { color: var(--flaky); }
table { width: 100%; border-collapse: collapse; font-size: 14px; }
th, td { text-align: left; padding: 8px; border-bottom: 1px solid var(--border); vertical-align: top; }
pre { background: #f6f8fa; padding: 8px; white-space: pre-wrap; font-size: 12px; margin: 4px 0 0; }
"#;

/// Escape text for HTML element and attribute content.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

fn status_class(status: TestStatus) -> &'static str {
    match status {
        TestStatus::Passed => "passed",
        TestStatus::Failed => "failed",
        TestStatus::Skipped => "skipped",
        TestStatus::Flaky => "flaky",
    }
}

/// Render the full page.
pub fn render_html(report: &Report) -> String {
    let summary = &report.summary;
    let pass_rate = summary.pass_rate().unwrap_or(0.0);
    let framework = escape_html(&summary.framework);

    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"UTF-8\">\n\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1.0\">\n\
         <title>Test Report - {framework}</title>\n<style>{STYLE}</style>\n</head>\n<body>\n\
         <div class=\"container\">\n<header>\n<div><h1>Test Report</h1>\
         <div class=\"meta\">{framework} · {timestamp}{environment}</div></div>\n\
         <div class=\"meta\">pass rate {pass_rate:.1}% · {duration:.2}s</div>\n</header>\n",
        timestamp = summary.timestamp.to_rfc3339(),
        environment = summary
            .environment
            .as_deref()
            .map(|e| format!(" · {}", escape_html(e)))
            .unwrap_or_default(),
        duration = summary.duration as f64 / 1000.0,
    );

    html.push_str("<section class=\"stats\">\n");
    for (label, value, class) in [
        ("Total", summary.total, ""),
        ("Passed", summary.passed, "passed"),
        ("Failed", summary.failed, "failed"),
        ("Skipped", summary.skipped, "skipped"),
        ("Flaky", summary.flaky, "flaky"),
    ] {
        let _ = writeln!(
            html,
            "<div class=\"stat\"><div>{label}</div><div class=\"value {class}\">{value}</div></div>"
        );
    }
    html.push_str("</section>\n");

    if let Some(insights) = report.insights.as_ref().filter(|i| !i.is_empty()) {
        html.push_str("<section>\n<h2>Insights</h2>\n<ul>\n");
        for insight in insights {
            let _ = writeln!(html, "<li>{}</li>", escape_html(insight));
        }
        html.push_str("</ul>\n</section>\n");
    }

    if let Some(clusters) = report.clusters.as_ref().filter(|c| !c.is_empty()) {
        html.push_str("<section>\n<h2>Top Failures</h2>\n<table>\n<tr><th>Count</th><th>Signature</th></tr>\n");
        for cluster in clusters.iter().take(TOP_CLUSTERS) {
            let _ = writeln!(
                html,
                "<tr><td>{}</td><td><code>{}</code></td></tr>",
                cluster.count,
                escape_html(&cluster.message)
            );
        }
        html.push_str("</table>\n</section>\n");
    }

    html.push_str("<section>\n<h2>Results</h2>\n<table>\n<tr><th>Status</th><th>Test</th><th>Suite</th><th>Duration</th></tr>\n");
    for record in &report.results {
        render_row(&mut html, record);
    }
    html.push_str("</table>\n</section>\n</div>\n</body>\n</html>\n");
    html
}

fn render_row(html: &mut String, record: &TestRecord) {
    let detail = record
        .error
        .as_ref()
        .map(|e| {
            let body = e.stack.as_deref().unwrap_or(&e.message);
            format!("<pre>{}</pre>", escape_html(body))
        })
        .unwrap_or_default();
    let _ = writeln!(
        html,
        "<tr><td class=\"{class}\">{status}</td><td>{name}{detail}</td><td>{suite}</td><td>{duration}ms</td></tr>",
        class = status_class(record.status),
        status = record.status,
        name = escape_html(&record.name),
        suite = escape_html(&record.suite),
        duration = record.duration,
    );
}

/// Render and write to `path`, creating parent directories.
pub fn write_html(report: &Report, path: &Path) -> Result<(), RenderError> {
    let io_err = |source| RenderError::Io {
        path: path.to_path_buf(),
        source,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    std::fs::write(path, render_html(report)).map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{ErrorCluster, FailureDetail, RunSummary, StatusCounts};
    use chrono::Utc;

    fn sample() -> Report {
        let results = vec![
            TestRecord {
                id: "a".to_string(),
                name: "renders <App/>".to_string(),
                suite: "ui".to_string(),
                status: TestStatus::Failed,
                duration: 42,
                error: Some(FailureDetail::new("expected \"a\" & got 'b'")),
                retries: None,
                history: None,
            },
            TestRecord {
                id: "b".to_string(),
                name: "loads".to_string(),
                suite: "ui".to_string(),
                status: TestStatus::Passed,
                duration: 5,
                error: None,
                retries: None,
                history: None,
            },
        ];
        let summary = RunSummary::new(StatusCounts::tally(&results), 1500, "vitest", Utc::now());
        let mut report = Report::new(summary, results);
        report.insights = Some(vec!["⚠️ Stability Risk".to_string()]);
        report.clusters = Some(vec![ErrorCluster {
            message: "<script>".to_string(),
            count: 1,
            test_ids: vec!["a".to_string()],
        }]);
        report
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }

    #[test]
    fn test_render_escapes_report_text() {
        let html = render_html(&sample());
        assert!(html.contains("renders &lt;App/&gt;"));
        assert!(html.contains("&lt;script&gt;"));
        assert!(!html.contains("<script>"));
        assert!(html.contains("expected &quot;a&quot; &amp; got &#39;b&#39;"));
    }

    #[test]
    fn test_render_sections() {
        let html = render_html(&sample());
        assert!(html.contains("<title>Test Report - vitest</title>"));
        assert!(html.contains("pass rate 50.0%"));
        assert!(html.contains("<h2>Insights</h2>"));
        assert!(html.contains("<h2>Top Failures</h2>"));
        assert!(html.contains("<td class=\"failed\">failed</td>"));
    }

    #[test]
    fn test_unanalyzed_report_omits_analysis_sections() {
        let mut report = sample();
        report.insights = None;
        report.clusters = None;
        let html = render_html(&report);
        assert!(!html.contains("<h2>Insights</h2>"));
        assert!(!html.contains("<h2>Top Failures</h2>"));
    }

    #[test]
    fn test_write_html_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/report.html");
        write_html(&sample(), &path).unwrap();
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.starts_with("<!DOCTYPE html>"));
    }
}

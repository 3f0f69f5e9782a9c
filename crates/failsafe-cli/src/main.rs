//! failsafe-report: turn a test framework's JSON export into an analyzed
//! HTML report, optionally posting a summary to Slack or Teams.
//!
//! # Usage
//!
//! ```bash
//! failsafe-report generate results.json --output out/report.html
//! failsafe-report generate results.json --framework mocha --slack "$SLACK_URL" --ci
//! SMART_TEST_AI=true failsafe-report generate results.json
//! ```

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use failsafe_engine::{
    AdapterRegistry, AnalysisConfig, Analyzer, NotificationKind, NotificationTarget, Report,
    WebhookNotifier,
};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{info, warn};

/// Command-line arguments
#[derive(Parser, Debug)]
#[command(name = "failsafe-report", author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Normalize and analyze a JSON test report
    Generate(GenerateArgs),
    /// List supported frameworks in detection order
    Frameworks,
}

#[derive(Args, Debug)]
struct GenerateArgs {
    /// Path to the framework's JSON report
    path: PathBuf,

    /// Skip detection and use this adapter
    #[arg(short, long)]
    framework: Option<String>,

    /// HTML output path
    #[arg(short, long, default_value = "test-report.html")]
    output: PathBuf,

    /// Also write the analyzed report as JSON
    #[arg(long)]
    json: Option<PathBuf>,

    /// Slack incoming-webhook URL
    #[arg(long)]
    slack: Option<String>,

    /// Microsoft Teams incoming-webhook URL
    #[arg(long)]
    teams: Option<String>,

    /// Environment label (overrides FAILSAFE_ENVIRONMENT)
    #[arg(long = "env")]
    environment: Option<String>,

    /// Enable the summarization hook (overrides SMART_TEST_AI)
    #[arg(long, default_value_t = false)]
    ai: bool,

    /// Exit with status 1 when any test failed
    #[arg(long, default_value_t = false)]
    ci: bool,
}

#[tokio::main]
async fn main() -> Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Frameworks => {
            for name in AdapterRegistry::new().names() {
                println!("{name}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Generate(args) => generate(args).await,
    }
}

async fn generate(args: GenerateArgs) -> Result<ExitCode> {
    let report = load_report(&args.path, args.framework.as_deref())?;

    let mut config = AnalysisConfig::from_env();
    if args.ai {
        config = config.with_ai_summary(true);
    }
    if let Some(environment) = args.environment.as_deref() {
        config = config.with_environment(environment);
    }

    let analyzed = Analyzer::new(config).analyze(&report).await;

    failsafe_engine::write_html(&analyzed, &args.output)?;
    info!(path = %args.output.display(), "HTML report written");

    if let Some(json_path) = &args.json {
        let body = serde_json::to_string_pretty(&analyzed)?;
        std::fs::write(json_path, body)
            .with_context(|| format!("Failed to write JSON report to {}", json_path.display()))?;
        info!(path = %json_path.display(), "JSON report written");
    }

    let targets = [
        (NotificationKind::Slack, args.slack.as_deref()),
        (NotificationKind::Teams, args.teams.as_deref()),
    ]
    .into_iter()
    .filter_map(|(kind, url)| url.map(|u| NotificationTarget::new(kind, u)))
    .collect::<Vec<_>>();
    notify(&analyzed, &targets).await;

    print_summary(&analyzed);

    if args.ci && has_reported_failures(&analyzed) {
        warn!(failed = analyzed.summary.failed, "failures present, exiting with status 1");
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

/// CI gate on the summary's failed count
fn has_reported_failures(report: &Report) -> bool {
    report.summary.failed > 0
}

fn load_report(path: &Path, framework: Option<&str>) -> Result<Report> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read report file {}", path.display()))?;
    let raw: serde_json::Value = serde_json::from_str(&text)
        .with_context(|| format!("{} is not valid JSON", path.display()))?;
    let report = AdapterRegistry::new()
        .parse(&raw, framework)
        .with_context(|| format!("Failed to convert {}", path.display()))?;
    Ok(report)
}

/// Delivery failures are logged; they never fail the run.
async fn notify(report: &Report, targets: &[NotificationTarget]) {
    if targets.is_empty() {
        return;
    }
    let notifier = match WebhookNotifier::new() {
        Ok(n) => n,
        Err(e) => {
            warn!("Notifications disabled: {e}");
            return;
        }
    };
    for target in targets {
        if let Err(e) = notifier.send(report, target).await {
            warn!(kind = %target.kind, "Failed to send notification: {e}");
        }
    }
}

fn print_summary(report: &Report) {
    let summary = &report.summary;
    println!(
        "{}: {} total, {} passed, {} failed, {} skipped, {} flaky ({:.1}% pass rate)",
        summary.framework,
        summary.total,
        summary.passed,
        summary.failed,
        summary.skipped,
        summary.flaky,
        summary.pass_rate().unwrap_or(0.0),
    );
    for insight in report.insights.iter().flatten() {
        println!("  {insight}");
    }
}

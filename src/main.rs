//! msdetect - Microservice architecture detector CLI tool
//!
//! Reads repository lists, clones each repository, and writes one JSON
//! record per repository describing its services, dependency graphs and
//! infrastructure tags.

use anyhow::Context;
use clap::Parser;
use msdetect::analyzer::RepositoryAnalyzer;
use msdetect::cli::CliArgs;
use msdetect::config::AnalyzerConfig;
use msdetect::fetch::{GitHubFetcher, GithubLinguist};
use msdetect::logging::{self, LoggingConfig};
use msdetect::notify::{ConsoleNotifier, Notifier, RunSummary};
use msdetect::orchestrator::AnalysisOrchestrator;
use msdetect::run_log::RunLog;
use msdetect::store::ResultStore;
use msdetect::taxonomy::Taxonomy;
use std::process::ExitCode;
use std::sync::Arc;

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();
    logging::init(LoggingConfig::from_flags(args.verbose, args.log_json));

    let summary = match setup(&args) {
        Ok(orchestrator) => orchestrator.run().await,
        Err(e) => {
            tracing::error!(error = %format!("{:#}", e), "Startup failed");
            let analyzed = ResultStore::new(&args.results).count().unwrap_or(0);
            RunSummary::new(0, analyzed, 0).with_failure(format!("{:#}", e))
        }
    };

    if let Err(e) = ConsoleNotifier::default().notify(&summary) {
        eprintln!("Error: failed to print summary: {}", e);
    }

    if summary.is_completed() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}

/// Load configuration and build the orchestrator
fn setup(args: &CliArgs) -> anyhow::Result<Arc<AnalysisOrchestrator>> {
    let config = AnalyzerConfig::from_args(args)?;
    config.prepare_directories()?;

    let taxonomy = Taxonomy::load(&config.consts_dir)
        .with_context(|| format!("failed to load taxonomy from {}", config.consts_dir.display()))?;
    let run_log = RunLog::open(&config.logs_dir)?;
    let fetcher = GitHubFetcher::new()?.with_token(std::env::var("GITHUB_TOKEN").ok());

    tracing::info!(
        workers = config.workers,
        debug = config.debug,
        fix_errors = config.fix_errors,
        logs = %run_log.dir().display(),
        "Starting analysis"
    );

    Ok(Arc::new(AnalysisOrchestrator::new(
        config,
        Arc::new(fetcher),
        Arc::new(GithubLinguist::default()),
        RepositoryAnalyzer::new(Arc::new(taxonomy)),
        Arc::new(run_log),
    )))
}

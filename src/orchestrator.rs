//! Analysis orchestrator for driving repository lists through the pipeline
//!
//! This module provides:
//! - Per-repository workflow: lock → existence check → size guard → fetch → analyze → persist
//! - A fixed-size worker pool bounded by a semaphore
//! - Idempotent, resumable processing keyed on persisted results
//! - Error accounting through the run log and the shared counter

use crate::analyzer::RepositoryAnalyzer;
use crate::config::AnalyzerConfig;
use crate::domain::{RepoRef, RepositoryFacts};
use crate::fetch::{
    committer_count, content_size_kb, remove_workdir, workdir_for, LanguageDetector,
    RepositoryFetcher,
};
use crate::input::{list_sources, read_repo_list, InputOptions};
use crate::lock::RepoLock;
use crate::notify::RunSummary;
use crate::progress::Progress;
use crate::run_log::RunLog;
use crate::store::ResultStore;
use anyhow::Context;
use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};
use tracing::Instrument;

/// Terminal state of one repository
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepoOutcome {
    /// Another worker or run holds the repository lock
    Skipped,
    /// A result already exists
    AlreadyDone,
    /// The remote repository exceeds the size limit
    TooLarge,
    /// The repository could not be fetched
    Abandoned,
    /// A result was written
    Persisted,
    /// Analysis or persistence failed
    Errored,
}

impl fmt::Display for RepoOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RepoOutcome::Skipped => "skipped",
            RepoOutcome::AlreadyDone => "already done",
            RepoOutcome::TooLarge => "too large",
            RepoOutcome::Abandoned => "abandoned",
            RepoOutcome::Persisted => "persisted",
            RepoOutcome::Errored => "errored",
        };
        write!(f, "{}", label)
    }
}

/// Outcome counts of one or more batches
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub skipped: usize,
    pub already_done: usize,
    pub too_large: usize,
    pub abandoned: usize,
    pub persisted: usize,
    pub errored: usize,
}

impl BatchStats {
    /// Count one outcome
    pub fn record(&mut self, outcome: RepoOutcome) {
        match outcome {
            RepoOutcome::Skipped => self.skipped += 1,
            RepoOutcome::AlreadyDone => self.already_done += 1,
            RepoOutcome::TooLarge => self.too_large += 1,
            RepoOutcome::Abandoned => self.abandoned += 1,
            RepoOutcome::Persisted => self.persisted += 1,
            RepoOutcome::Errored => self.errored += 1,
        }
    }

    /// Add another batch's counts
    pub fn merge(&mut self, other: &BatchStats) {
        self.skipped += other.skipped;
        self.already_done += other.already_done;
        self.too_large += other.too_large;
        self.abandoned += other.abandoned;
        self.persisted += other.persisted;
        self.errored += other.errored;
    }

    /// Number of repositories counted
    pub fn total(&self) -> usize {
        self.skipped + self.already_done + self.too_large + self.abandoned + self.persisted + self.errored
    }
}

/// Orchestrator for concurrent, resumable repository analysis
pub struct AnalysisOrchestrator {
    config: AnalyzerConfig,
    fetcher: Arc<dyn RepositoryFetcher>,
    languages: Arc<dyn LanguageDetector>,
    analyzer: Arc<RepositoryAnalyzer>,
    store: ResultStore,
    run_log: Arc<RunLog>,
}

impl AnalysisOrchestrator {
    /// Create an orchestrator from its collaborators
    pub fn new(
        config: AnalyzerConfig,
        fetcher: Arc<dyn RepositoryFetcher>,
        languages: Arc<dyn LanguageDetector>,
        analyzer: RepositoryAnalyzer,
        run_log: Arc<RunLog>,
    ) -> Self {
        let store = ResultStore::new(&config.results_dir);
        Self {
            config,
            fetcher,
            languages,
            analyzer: Arc::new(analyzer),
            store,
            run_log,
        }
    }

    /// The result store
    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// The run log
    pub fn run_log(&self) -> &RunLog {
        &self.run_log
    }

    /// Process every repository list and summarize the run
    ///
    /// A fatal error stops scheduling; the summary then carries its cause.
    pub async fn run(self: &Arc<Self>) -> RunSummary {
        let mut total = 0;
        let result = self.run_lists(&mut total).await;

        let analyzed = self.store.count().unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Failed to count results");
            0
        });
        let summary = RunSummary::new(total, analyzed, self.run_log.error_count());

        match result {
            Ok(stats) => {
                tracing::info!(
                    persisted = stats.persisted,
                    already_done = stats.already_done,
                    skipped = stats.skipped,
                    too_large = stats.too_large,
                    abandoned = stats.abandoned,
                    errored = stats.errored,
                    "All lists processed"
                );
                summary
            }
            Err(e) => {
                tracing::error!(error = %format!("{:#}", e), "Run interrupted");
                self.run_log.log_generic_error("run", &e);
                summary.with_failure(format!("{:#}", e))
            }
        }
    }

    async fn run_lists(self: &Arc<Self>, total: &mut usize) -> anyhow::Result<BatchStats> {
        let completed: HashSet<String> = if self.config.fix_errors {
            self.store.completed_identifiers()?.into_iter().collect()
        } else {
            HashSet::new()
        };
        let options = InputOptions {
            debug: self.config.debug,
            completed,
        };

        let mut overall = BatchStats::default();
        for source in list_sources(&self.config.repos_dir)? {
            let list = read_repo_list(&source, &options)?;
            for (identifier, url) in &list.invalid_urls {
                self.run_log.log_invalid_url(identifier, url);
            }
            *total += list.total;

            let label = source
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            tracing::info!(list = %label, repositories = list.repos.len(), "Processing list");

            let mut progress = Progress::new(self.config.show_progress);
            progress.start(list.repos.len() as u64, &label);
            let stats = self.run_batch(list.repos, &progress).await;
            progress.finish_and_clear();

            tracing::info!(list = %label, persisted = stats.persisted, errored = stats.errored, "List processed");
            overall.merge(&stats);
        }
        Ok(overall)
    }

    /// Process repositories with at most `workers` in flight
    pub async fn run_batch(self: &Arc<Self>, repos: Vec<RepoRef>, progress: &Progress) -> BatchStats {
        let semaphore = Arc::new(Semaphore::new(self.config.workers));
        let mut tasks = JoinSet::new();
        let mut in_flight: HashMap<task::Id, RepoRef> = HashMap::new();
        let mut stats = BatchStats::default();

        for repo in repos {
            let permit = match Arc::clone(&semaphore).acquire_owned().await {
                Ok(permit) => permit,
                Err(_) => break,
            };
            let this = Arc::clone(self);
            let progress = progress.clone();
            let task_repo = repo.clone();
            let handle = tasks.spawn(async move {
                let _permit = permit;
                let outcome = this.process(&task_repo).await;
                progress.inc();
                outcome
            });
            in_flight.insert(handle.id(), repo);

            while let Some(joined) = tasks.try_join_next_with_id() {
                self.collect(joined, &mut in_flight, &mut stats);
            }
        }

        while let Some(joined) = tasks.join_next_with_id().await {
            self.collect(joined, &mut in_flight, &mut stats);
        }
        stats
    }

    fn collect(
        &self,
        joined: Result<(task::Id, RepoOutcome), task::JoinError>,
        in_flight: &mut HashMap<task::Id, RepoRef>,
        stats: &mut BatchStats,
    ) {
        match joined {
            Ok((id, outcome)) => {
                in_flight.remove(&id);
                stats.record(outcome);
            }
            Err(e) => {
                let identity = in_flight
                    .remove(&e.id())
                    .map(|repo| repo.url)
                    .unwrap_or_else(|| "unknown".to_string());
                tracing::error!(repo = %identity, error = %e, "Worker task failed");
                self.run_log
                    .log_generic_error(&identity, &anyhow::anyhow!("worker task failed: {}", e));
                self.run_log.increment_errors();
                stats.record(RepoOutcome::Errored);
            }
        }
    }

    /// Process one repository to its terminal state
    pub async fn process(&self, repo: &RepoRef) -> RepoOutcome {
        let span = tracing::info_span!("repo", name = %repo.name);
        async {
            let outcome = match self.try_process(repo).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    tracing::warn!(error = %format!("{:#}", e), "Repository errored");
                    self.run_log.log_generic_error(&repo.url, &e);
                    self.run_log.increment_errors();
                    RepoOutcome::Errored
                }
            };
            tracing::debug!(%outcome, "Repository finished");
            outcome
        }
        .instrument(span)
        .await
    }

    async fn try_process(&self, repo: &RepoRef) -> anyhow::Result<RepoOutcome> {
        let lock = RepoLock::acquire(&self.config.temp_dir, repo, self.config.lock_timeout)
            .await
            .with_context(|| format!("failed to open lock for {}", repo))?;
        let Some(_lock) = lock else {
            self.run_log.increment_errors();
            return Ok(RepoOutcome::Skipped);
        };

        if self.store.exists(repo) {
            return Ok(RepoOutcome::AlreadyDone);
        }

        let workdir = match workdir_for(&self.config.temp_dir, repo) {
            Ok(workdir) => workdir,
            Err(e) => return Ok(self.abandon(repo, &e)),
        };

        // A working copy left by an interrupted run is reused as is
        if !workdir.exists() {
            match self.fetcher.remote_size_kb(repo).await {
                Ok(Some(size)) if size >= self.config.max_size_kb => {
                    tracing::debug!(size_kb = size, "Repository too large");
                    return Ok(RepoOutcome::TooLarge);
                }
                Ok(_) => {}
                Err(e) => return Ok(self.abandon(repo, &e)),
            }
            if let Err(e) = self.fetcher.fetch(repo, &workdir).await {
                return Ok(self.abandon(repo, &e));
            }
        }

        let committers = committer_count(&workdir, self.config.committer_timeout).await;
        let languages = self
            .languages
            .detect(&workdir)
            .await
            .with_context(|| format!("failed to detect languages of {}", repo))?;

        let facts = RepositoryFacts {
            url: repo.url.clone(),
            name: repo.name.clone(),
            committers,
            size: 0,
            languages,
        };
        let analyzer = Arc::clone(&self.analyzer);
        let dir = workdir.clone();
        let record = tokio::task::spawn_blocking(move || {
            let facts = RepositoryFacts {
                size: content_size_kb(&dir),
                ..facts
            };
            analyzer.analyze(&dir, facts)
        })
        .await
        .context("analysis task failed")??;

        self.store
            .persist(repo, &record)
            .with_context(|| format!("failed to persist {}", repo))?;
        remove_workdir(&workdir);
        Ok(RepoOutcome::Persisted)
    }

    fn abandon(&self, repo: &RepoRef, error: &dyn fmt::Display) -> RepoOutcome {
        tracing::debug!(error = %error, "Fetch failed");
        self.run_log.log_clone_error(&repo.url, error);
        self.run_log.increment_errors();
        RepoOutcome::Abandoned
    }
}

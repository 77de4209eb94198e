//! High-level pipeline: discover → process each repository → report.
//!
//! This module provides the top-level driver used by the CLI and by
//! integration tests. It:
//!   - builds the shared request governor and endpoint set from config
//!   - obtains the source repositories (explicit list, or search discovery)
//!   - processes repositories strictly one at a time, sleeping a pacing delay
//!     between them; concurrency lives inside a single repository's walk
//!   - merges every per-file outcome into one [`MirrorReport`]
//!
//! # Error Handling
//! Only configuration problems are returned as errors. Network and API
//! failures are contained at file and directory level and show up as counters
//! in the report.

use tracing::{error, info};

use crate::api::ApiEndpoints;
use crate::config::{ConfigError, MirrorConfig};
use crate::contract::Transport;
use crate::discover::RepositorySearch;
use crate::fetch::Fetcher;
use crate::governor::Governor;
use crate::model::RepoId;
use crate::process::RepositoryProcessor;
use crate::report::MirrorReport;
use crate::upload::{RetryPolicy, Uploader};
use crate::walk::TreeWalker;

/// Entrypoint: mirror all source repositories according to `config`.
pub async fn synchronise<T>(transport: &T, config: &MirrorConfig) -> Result<MirrorReport, ConfigError>
where
    T: Transport + ?Sized,
{
    config.validate()?;
    let endpoints = ApiEndpoints::new(&config.api_base_url)?;
    let governor = Governor::new(config.pipeline.concurrency);
    let fetcher = Fetcher::new(transport, &governor);

    info!("[SYNC] Starting mirror pipeline");

    let repositories = if config.repositories.is_empty() {
        info!(query = %config.discovery.query, "[SYNC] Searching for repositories");
        RepositorySearch::new(
            fetcher,
            &endpoints,
            &config.discovery,
            config.pipeline.page_delay(),
        )
        .search()
        .await
    } else {
        config.repositories.clone()
    };
    info!(count = repositories.len(), "[SYNC] Repositories to process");

    let uploader = Uploader::new(
        fetcher,
        &endpoints,
        &config.destination,
        RetryPolicy::from(&config.pipeline),
    );
    let walker = TreeWalker::new(fetcher, uploader, &endpoints, &config.pipeline);
    let processor =
        RepositoryProcessor::new(fetcher, walker, &endpoints, &config.pipeline.fallback_branch);

    let report = drive(&processor, &repositories, config).await;

    if report.is_clean() {
        info!(summary = %report, "[SYNC] Finished");
    } else {
        error!(summary = %report, failures = report.failures(), "[SYNC] Finished with failures");
    }
    Ok(report)
}

async fn drive<T>(
    processor: &RepositoryProcessor<'_, T>,
    repositories: &[RepoId],
    config: &MirrorConfig,
) -> MirrorReport
where
    T: Transport + ?Sized,
{
    let mut report = MirrorReport::default();
    let delay = config.pipeline.repository_delay();
    for (idx, repo) in repositories.iter().enumerate() {
        info!(%repo, position = idx + 1, total = repositories.len(), "[SYNC] Processing repository");
        report.merge(processor.process(repo).await);
        if idx + 1 < repositories.len() && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
    report
}

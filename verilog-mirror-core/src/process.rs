//! Per-repository step: resolve the default branch, then walk it.

use tracing::{error, info};

use crate::api::ApiEndpoints;
use crate::contract::Transport;
use crate::fetch::Fetcher;
use crate::model::RepoId;
use crate::report::MirrorReport;
use crate::walk::TreeWalker;

pub struct RepositoryProcessor<'a, T: ?Sized> {
    fetcher: Fetcher<'a, T>,
    walker: TreeWalker<'a, T>,
    endpoints: &'a ApiEndpoints,
    fallback_branch: &'a str,
}

impl<'a, T> RepositoryProcessor<'a, T>
where
    T: Transport + ?Sized,
{
    pub fn new(
        fetcher: Fetcher<'a, T>,
        walker: TreeWalker<'a, T>,
        endpoints: &'a ApiEndpoints,
        fallback_branch: &'a str,
    ) -> Self {
        Self {
            fetcher,
            walker,
            endpoints,
            fallback_branch,
        }
    }

    pub async fn process(&self, repo: &RepoId) -> MirrorReport {
        let branch = self.default_branch(repo).await;
        info!(%repo, branch = %branch, "Processing repository");
        let mut report = self.walker.walk_repository(repo, &branch).await;
        report.repositories += 1;
        info!(%repo, summary = %report, "Finished repository");
        report
    }

    /// `default_branch` from the repository metadata, or the fallback when the
    /// metadata is unavailable.
    pub async fn default_branch(&self, repo: &RepoId) -> String {
        let url = self.endpoints.repository(repo);
        let branch = self.fetcher.fetch_json(&url).await.map(|meta| {
            meta.get("default_branch")
                .and_then(|b| b.as_str())
                .map(String::from)
        });
        match branch {
            Some(Some(branch)) => branch,
            Some(None) => self.fallback_branch.to_string(),
            None => {
                error!(%repo, fallback = self.fallback_branch, "Failed to get default branch");
                self.fallback_branch.to_string()
            }
        }
    }
}

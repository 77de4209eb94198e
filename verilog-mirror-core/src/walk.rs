//! Recursive, concurrent walk of one repository branch.
//!
//! Each directory level fans out all of its children at once (subdirectory
//! walks and file uploads) and joins them before returning, so a directory is
//! complete only when its whole subtree is. Sibling futures interleave on the
//! calling task; real parallelism on the wire is capped by the [`Governor`].
//!
//! [`Governor`]: crate::governor::Governor

use futures::future::{join_all, BoxFuture, FutureExt};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::api::ApiEndpoints;
use crate::config::PipelineConfig;
use crate::contract::Transport;
use crate::fetch::Fetcher;
use crate::model::{EntryKind, FileTask, Listing, RepoId, TreeEntry};
use crate::report::MirrorReport;
use crate::upload::Uploader;

pub struct TreeWalker<'a, T: ?Sized> {
    fetcher: Fetcher<'a, T>,
    uploader: Uploader<'a, T>,
    endpoints: &'a ApiEndpoints,
    pipeline: &'a PipelineConfig,
}

impl<'a, T> TreeWalker<'a, T>
where
    T: Transport + ?Sized,
{
    pub fn new(
        fetcher: Fetcher<'a, T>,
        uploader: Uploader<'a, T>,
        endpoints: &'a ApiEndpoints,
        pipeline: &'a PipelineConfig,
    ) -> Self {
        Self {
            fetcher,
            uploader,
            endpoints,
            pipeline,
        }
    }

    /// Walks `repo` at `branch` from the root.
    pub async fn walk_repository(&self, repo: &RepoId, branch: &str) -> MirrorReport {
        self.walk(repo, branch, String::new(), 0).await
    }

    /// Walks `path` and everything below it. Never fails: unreadable
    /// directories are counted as skipped and their siblings carry on.
    pub fn walk<'s>(
        &'s self,
        repo: &'s RepoId,
        branch: &'s str,
        path: String,
        depth: usize,
    ) -> BoxFuture<'s, MirrorReport> {
        async move {
            if depth > self.pipeline.max_depth {
                warn!(%repo, path = %path, depth, "Maximum directory depth exceeded, skipping");
                return MirrorReport::skipped_directory();
            }

            let url = self
                .endpoints
                .contents(&repo.owner, &repo.name, &path, Some(branch));
            let Some(entries) = self.list(&url).await else {
                warn!(%repo, path = %path, "Could not list directory, skipping subtree");
                return MirrorReport::skipped_directory();
            };
            debug!(%repo, path = %path, entries = entries.len(), "Listed directory");

            let children: Vec<BoxFuture<'s, MirrorReport>> = entries
                .into_iter()
                .filter_map(|entry| self.child(repo, branch, entry, depth))
                .collect();

            let report = if children.is_empty() {
                MirrorReport::default()
            } else {
                join_all(children).await.into_iter().collect()
            };

            let delay = self.pipeline.directory_delay();
            if delay > Duration::ZERO {
                tokio::time::sleep(delay).await;
            }
            report
        }
        .boxed()
    }

    fn child<'s>(
        &'s self,
        repo: &'s RepoId,
        branch: &'s str,
        entry: TreeEntry,
        depth: usize,
    ) -> Option<BoxFuture<'s, MirrorReport>> {
        match entry.kind {
            EntryKind::Dir => Some(self.walk(repo, branch, entry.path, depth + 1)),
            EntryKind::File if self.pipeline.is_verilog(&entry.name) => {
                let Some(download_url) = entry.download_url else {
                    warn!(%repo, path = %entry.path, "Verilog file without download_url, skipping");
                    return None;
                };
                let task = FileTask {
                    source_repo: repo.clone(),
                    source_branch: branch.to_string(),
                    source_path: entry.path,
                    file_name: entry.name,
                    download_url,
                };
                Some(
                    async move {
                        info!(repo = %task.source_repo, path = %task.source_path, "Found Verilog file");
                        MirrorReport::from_upload(&self.uploader.upload(&task).await)
                    }
                    .boxed(),
                )
            }
            _ => None,
        }
    }

    async fn list(&self, url: &str) -> Option<Vec<TreeEntry>> {
        let value = self.fetcher.fetch_json(url).await?;
        match serde_json::from_value::<Listing>(value) {
            Ok(listing) => Some(listing.into_entries()),
            Err(e) => {
                warn!(error = %e, url, "Unexpected directory listing shape");
                None
            }
        }
    }
}

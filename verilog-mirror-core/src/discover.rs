//! Candidate repository discovery through the search API.

use tracing::{info, warn};

use crate::api::ApiEndpoints;
use crate::config::DiscoveryConfig;
use crate::contract::Transport;
use crate::fetch::Fetcher;
use crate::model::RepoId;
use std::time::Duration;

pub struct RepositorySearch<'a, T: ?Sized> {
    fetcher: Fetcher<'a, T>,
    endpoints: &'a ApiEndpoints,
    config: &'a DiscoveryConfig,
    page_delay: Duration,
}

impl<'a, T> RepositorySearch<'a, T>
where
    T: Transport + ?Sized,
{
    pub fn new(
        fetcher: Fetcher<'a, T>,
        endpoints: &'a ApiEndpoints,
        config: &'a DiscoveryConfig,
        page_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            endpoints,
            config,
            page_delay,
        }
    }

    /// Full names of matching repositories, in result order.
    ///
    /// Pages are requested until `max_pages`, an unavailable page, or an empty
    /// `items` array, whichever comes first.
    pub async fn search(&self) -> Vec<RepoId> {
        let mut repos = Vec::new();
        for page in 1..=self.config.max_pages {
            let url = self
                .endpoints
                .search(&self.config.query, self.config.per_page, page);
            let Some(data) = self.fetcher.fetch_json(&url).await else {
                break;
            };
            let items = data
                .get("items")
                .and_then(|items| items.as_array())
                .cloned()
                .unwrap_or_default();
            if items.is_empty() {
                break;
            }
            info!(page, found = items.len(), "Search page fetched");
            for item in items {
                match item.get("full_name").and_then(|n| n.as_str()) {
                    Some(name) => match name.parse::<RepoId>() {
                        Ok(repo) => repos.push(repo),
                        Err(e) => warn!(error = %e, "Skipping search result"),
                    },
                    None => warn!("Search result without full_name"),
                }
            }
            if page < self.config.max_pages && self.page_delay > Duration::ZERO {
                tokio::time::sleep(self.page_delay).await;
            }
        }
        info!(total = repos.len(), query = %self.config.query, "Repository search complete");
        repos
    }
}

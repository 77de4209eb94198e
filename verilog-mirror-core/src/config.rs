use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info};

use crate::model::RepoId;

pub const DEFAULT_API_BASE_URL: &str = "https://api.github.com";

/// Full configuration of one mirroring run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MirrorConfig {
    pub destination: Destination,
    #[serde(default)]
    pub discovery: DiscoveryConfig,
    /// Explicit source repositories. When non-empty, discovery is skipped.
    #[serde(default)]
    pub repositories: Vec<RepoId>,
    #[serde(default)]
    pub pipeline: PipelineConfig,
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl MirrorConfig {
    pub fn new(destination: Destination) -> Self {
        Self {
            destination,
            discovery: DiscoveryConfig::default(),
            repositories: Vec::new(),
            pipeline: PipelineConfig::default(),
            api_base_url: default_api_base_url(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let dest = &self.destination;
        for (field, value) in [
            ("destination.owner", &dest.owner),
            ("destination.repo", &dest.repo),
            ("destination.branch", &dest.branch),
        ] {
            if value.trim().is_empty() {
                return Err(ConfigError::Empty(field));
            }
        }
        if self.pipeline.concurrency == 0 {
            return Err(ConfigError::Zero("pipeline.concurrency"));
        }
        if self.pipeline.max_attempts == 0 {
            return Err(ConfigError::Zero("pipeline.max_attempts"));
        }
        if self.pipeline.extensions.is_empty() {
            return Err(ConfigError::Empty("pipeline.extensions"));
        }
        if self.repositories.is_empty() && self.discovery.max_pages == 0 {
            return Err(ConfigError::Zero("discovery.max_pages"));
        }
        Ok(())
    }

    pub fn trace_loaded(&self) {
        info!(
            destination = %format!("{}/{}", self.destination.owner, self.destination.repo),
            branch = %self.destination.branch,
            repositories = self.repositories.len(),
            concurrency = self.pipeline.concurrency,
            "Loaded MirrorConfig"
        );
        debug!(?self, "MirrorConfig loaded (full debug)");
    }
}

/// Repository and branch receiving the mirrored files.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Destination {
    pub owner: String,
    pub repo: String,
    pub branch: String,
    /// Directory inside the destination repository holding all mirrored files.
    #[serde(default = "default_root")]
    pub root: String,
}

impl Destination {
    pub fn new(owner: impl Into<String>, repo: impl Into<String>, branch: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            repo: repo.into(),
            branch: branch.into(),
            root: default_root(),
        }
    }
}

/// Repository search parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiscoveryConfig {
    pub query: String,
    pub per_page: u32,
    pub max_pages: u32,
}

impl Default for DiscoveryConfig {
    fn default() -> Self {
        Self {
            query: "language:Verilog".to_string(),
            per_page: 30,
            max_pages: 10,
        }
    }
}

/// Concurrency, retry and pacing knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub concurrency: usize,
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub directory_delay_ms: u64,
    pub repository_delay_ms: u64,
    pub page_delay_ms: u64,
    pub max_depth: usize,
    pub fallback_branch: String,
    pub extensions: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            max_attempts: 3,
            initial_backoff_ms: 1000,
            directory_delay_ms: 500,
            repository_delay_ms: 2000,
            page_delay_ms: 2000,
            max_depth: 64,
            fallback_branch: "master".to_string(),
            extensions: vec![".v".to_string()],
        }
    }
}

impl PipelineConfig {
    pub fn initial_backoff(&self) -> Duration {
        Duration::from_millis(self.initial_backoff_ms)
    }

    pub fn directory_delay(&self) -> Duration {
        Duration::from_millis(self.directory_delay_ms)
    }

    pub fn repository_delay(&self) -> Duration {
        Duration::from_millis(self.repository_delay_ms)
    }

    pub fn page_delay(&self) -> Duration {
        Duration::from_millis(self.page_delay_ms)
    }

    /// Whether `name` carries one of the configured Verilog extensions.
    pub fn is_verilog(&self, name: &str) -> bool {
        self.extensions.iter().any(|ext| name.ends_with(ext.as_str()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("{0} must not be empty")]
    Empty(&'static str),

    #[error("{0} must be greater than zero")]
    Zero(&'static str),

    #[error("invalid api_base_url {url:?}: {message}")]
    BaseUrl { url: String, message: String },
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_root() -> String {
    "verilog_data".to_string()
}

//! Plain data flowing through the pipeline: repository identifiers, directory
//! listings, file tasks, destination lookups and upload outcomes.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// `owner/name` identifier of a GitHub repository.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RepoId {
    pub owner: String,
    pub name: String,
}

impl RepoId {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for RepoId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid repository name {0:?}, expected owner/name")]
pub struct InvalidRepoId(pub String);

impl FromStr for RepoId {
    type Err = InvalidRepoId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('/');
        match (parts.next(), parts.next(), parts.next()) {
            (Some(owner), Some(name), None) if !owner.is_empty() && !name.is_empty() => {
                Ok(RepoId::new(owner, name))
            }
            _ => Err(InvalidRepoId(s.to_string())),
        }
    }
}

impl TryFrom<String> for RepoId {
    type Error = InvalidRepoId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RepoId> for String {
    fn from(value: RepoId) -> Self {
        value.to_string()
    }
}

/// Kind of a directory listing entry. Symlinks and submodules land in `Other`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    File,
    Dir,
    #[serde(other)]
    Other,
}

/// One entry of a `contents` listing.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TreeEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,
    pub name: String,
    pub path: String,
    #[serde(default)]
    pub download_url: Option<String>,
}

/// A `contents` response: a list for directories, a single object when the
/// path names a file.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Listing {
    Many(Vec<TreeEntry>),
    One(TreeEntry),
}

impl Listing {
    pub fn into_entries(self) -> Vec<TreeEntry> {
        match self {
            Listing::Many(entries) => entries,
            Listing::One(entry) => vec![entry],
        }
    }
}

/// One Verilog file awaiting transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileTask {
    pub source_repo: RepoId,
    pub source_branch: String,
    pub source_path: String,
    pub file_name: String,
    pub download_url: String,
}

impl FileTask {
    /// Destination path of this file under `root`.
    pub fn destination_path(&self, root: &str) -> String {
        destination_path(root, &self.source_repo, &self.source_path, &self.file_name)
    }
}

/// Destination path of a mirrored file.
///
/// Layout is `{root}/{owner}/{repo}/{source directory}/{file name}`. Owner and
/// repository stay separate segments, so files from distinct repositories can
/// never map to the same path.
pub fn destination_path(root: &str, repo: &RepoId, source_path: &str, file_name: &str) -> String {
    let directory = match source_path.rfind('/') {
        Some(idx) => &source_path[..idx],
        None => "",
    };
    [root, &repo.owner, &repo.name, directory, file_name]
        .iter()
        .map(|segment| segment.trim_matches('/'))
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Lookup result for a destination path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DestinationRecord {
    /// The `sha` GitHub requires to accept an overwrite.
    pub version_token: Option<String>,
}

impl DestinationRecord {
    pub fn absent() -> Self {
        Self {
            version_token: None,
        }
    }

    pub fn exists(&self) -> bool {
        self.version_token.is_some()
    }
}

/// Terminal state of a [`FileTask`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadOutcome {
    Created,
    Updated,
    PermanentlyFailed,
    ConflictExhausted,
    /// The source bytes could not be downloaded.
    SourceUnavailable,
}

impl UploadOutcome {
    pub fn is_failure(&self) -> bool {
        !matches!(self, UploadOutcome::Created | UploadOutcome::Updated)
    }
}

impl fmt::Display for UploadOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            UploadOutcome::Created => "created",
            UploadOutcome::Updated => "updated",
            UploadOutcome::PermanentlyFailed => "permanently-failed",
            UploadOutcome::ConflictExhausted => "conflict-exhausted",
            UploadOutcome::SourceUnavailable => "source-unavailable",
        };
        f.write_str(label)
    }
}

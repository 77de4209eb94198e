//! Aggregate of per-file outcomes, merged up the directory tree and across
//! repositories so the caller can tell a clean run from a partial one.

use std::fmt;

use crate::model::UploadOutcome;
use crate::upload::UploadReport;

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct MirrorReport {
    pub repositories: usize,
    pub created: usize,
    pub updated: usize,
    pub permanently_failed: usize,
    pub conflict_exhausted: usize,
    pub source_unavailable: usize,
    /// Directories whose listing could not be fetched or that exceeded the depth cap.
    pub skipped_directories: usize,
    /// Destination paths of every failed file task.
    pub failed_paths: Vec<String>,
}

impl MirrorReport {
    pub fn record(&mut self, upload: &UploadReport) {
        match upload.outcome {
            UploadOutcome::Created => self.created += 1,
            UploadOutcome::Updated => self.updated += 1,
            UploadOutcome::PermanentlyFailed => self.permanently_failed += 1,
            UploadOutcome::ConflictExhausted => self.conflict_exhausted += 1,
            UploadOutcome::SourceUnavailable => self.source_unavailable += 1,
        }
        if upload.outcome.is_failure() {
            self.failed_paths.push(upload.destination_path.clone());
        }
    }

    pub fn from_upload(upload: &UploadReport) -> Self {
        let mut report = Self::default();
        report.record(upload);
        report
    }

    pub fn skipped_directory() -> Self {
        Self {
            skipped_directories: 1,
            ..Self::default()
        }
    }

    pub fn merge(&mut self, other: MirrorReport) {
        self.repositories += other.repositories;
        self.created += other.created;
        self.updated += other.updated;
        self.permanently_failed += other.permanently_failed;
        self.conflict_exhausted += other.conflict_exhausted;
        self.source_unavailable += other.source_unavailable;
        self.skipped_directories += other.skipped_directories;
        self.failed_paths.extend(other.failed_paths);
    }

    pub fn succeeded(&self) -> usize {
        self.created + self.updated
    }

    pub fn failures(&self) -> usize {
        self.permanently_failed + self.conflict_exhausted + self.source_unavailable
    }

    pub fn files(&self) -> usize {
        self.succeeded() + self.failures()
    }

    pub fn is_clean(&self) -> bool {
        self.failures() == 0
    }
}

impl FromIterator<MirrorReport> for MirrorReport {
    fn from_iter<I: IntoIterator<Item = MirrorReport>>(iter: I) -> Self {
        let mut total = MirrorReport::default();
        for report in iter {
            total.merge(report);
        }
        total
    }
}

impl fmt::Display for MirrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} repositories, {} files: {} created, {} updated, {} failed, {} conflict-exhausted, {} unreadable, {} directories skipped",
            self.repositories,
            self.files(),
            self.created,
            self.updated,
            self.permanently_failed,
            self.conflict_exhausted,
            self.source_unavailable,
            self.skipped_directories
        )
    }
}

//! Transcription batch jobs and status reporting.
//!
//! A batch is a flat list of files processed strictly in order by one
//! background worker. Status flows one way: pending -> processing ->
//! completed or failed.

pub mod worker;

use std::path::PathBuf;

/// One file queued for transcription.
#[derive(Debug, Clone)]
pub struct TranscriptionJob {
    /// Stable id used to correlate status updates
    pub id: u64,
    /// Audio file path
    pub path: PathBuf,
}

impl TranscriptionJob {
    /// File stem used for export filenames ("tal.wav" -> "tal").
    pub fn file_stem(&self) -> String {
        self.path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or("transkription")
            .to_string()
    }
}

/// Lifecycle of a job as shown in the UI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JobStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    /// Terminal states never change again.
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }

    /// Whether `next` is a legal forward transition from this status.
    ///
    /// A job can fail straight from pending: when the engine itself fails
    /// to load, the worker fails the whole batch without starting any job.
    pub fn can_advance_to(&self, next: JobStatus) -> bool {
        match (self, next) {
            (JobStatus::Pending, JobStatus::Processing) => true,
            (JobStatus::Pending, JobStatus::Failed) => true,
            (JobStatus::Processing, JobStatus::Completed) => true,
            (JobStatus::Processing, JobStatus::Failed) => true,
            _ => false,
        }
    }
}

/// Status updates sent from the worker to the UI or CLI.
#[derive(Debug, Clone)]
pub enum JobUpdate {
    /// A job entered processing
    Started { id: u64 },
    /// Transcription and export finished
    Completed {
        id: u64,
        text: String,
        exports: Vec<PathBuf>,
    },
    /// The job failed; the batch continues with the next file
    Failed { id: u64, error: String },
    /// All jobs reached a terminal state
    BatchFinished,
}

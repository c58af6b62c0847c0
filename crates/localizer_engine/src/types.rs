use std::fmt;
use std::path::PathBuf;

use localizer_core::TaskId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProgressEvent {
    /// Collection finished; `total` tasks will be processed in order.
    Collected { total: usize, invalid: usize },
    TaskStarted {
        task_id: TaskId,
        current: usize,
        total: usize,
        url: String,
    },
    Receiving { task_id: TaskId, bytes: u64 },
    AlreadyPresent { task_id: TaskId },
    Downloaded { task_id: TaskId, bytes: u64 },
    Failed { task_id: TaskId, error: FetchError },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchOutput {
    pub bytes: Vec<u8>,
    pub metadata: FetchMetadata,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchMetadata {
    pub original_url: String,
    pub final_url: String,
    pub redirect_count: usize,
    pub content_type: Option<String>,
    pub byte_len: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind}: {message}")]
pub struct FetchError {
    pub kind: FailureKind,
    pub message: String,
}

impl FetchError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    RedirectLimitExceeded,
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Network,
    /// The body arrived but could not be stored in the download folder.
    Write,
    /// The archive no longer matched the task when its outcome was applied.
    Rewrite,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::RedirectLimitExceeded => write!(f, "redirect limit exceeded"),
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "response too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Write => write!(f, "write error"),
            FailureKind::Rewrite => write!(f, "archive rewrite error"),
        }
    }
}

/// A task that did not reach `Satisfied`; its owners keep their remote URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailedTask {
    pub url: String,
    pub file_name: String,
    pub error: FetchError,
}

/// Everything a caller needs to report the end of a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub archive_path: PathBuf,
    pub download_folder: PathBuf,
    pub backup_created: bool,
    pub total: usize,
    pub downloaded: usize,
    pub already_present: usize,
    pub rewritten_elements: usize,
    pub failed: Vec<FailedTask>,
    pub invalid_urls: Vec<String>,
}

impl RunSummary {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

use crate::archive::OwnerRef;

pub type TaskId = usize;

/// One distinct remote URL and every archive element that carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadTask {
    pub id: TaskId,
    pub source_url: String,
    pub file_name: String,
    pub owners: Vec<OwnerRef>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Satisfaction {
    /// The target file existed before the run touched the network.
    AlreadyPresent,
    Downloaded,
}

/// Per-run lifecycle of a task.
///
/// `Pending -> Satisfied(AlreadyPresent)` or `Pending -> Fetching -> {Satisfied(Downloaded), Failed}`.
/// A failed task is retried by running the pipeline again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskState {
    #[default]
    Pending,
    Fetching,
    Satisfied(Satisfaction),
    Failed,
}

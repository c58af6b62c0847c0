use std::path::PathBuf;

use localizer_core::{apply, local_reference, Archive, DownloadTask, Satisfaction, TaskState};
use localizer_logging::{localizer_debug, localizer_error, localizer_info};

use crate::fetch::{Fetcher, ProgressSink};
use crate::persist::AtomicFileWriter;
use crate::{FailedTask, FailureKind, FetchError, ProgressEvent};

/// Outcome of one pass over the task queue.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DownloadReport {
    /// Final state per task, indexed like the input slice.
    pub states: Vec<TaskState>,
    pub rewritten_elements: usize,
    pub failed: Vec<FailedTask>,
}

impl DownloadReport {
    pub fn downloaded(&self) -> usize {
        self.count(Satisfaction::Downloaded)
    }

    pub fn already_present(&self) -> usize {
        self.count(Satisfaction::AlreadyPresent)
    }

    fn count(&self, satisfaction: Satisfaction) -> usize {
        self.states
            .iter()
            .filter(|state| **state == TaskState::Satisfied(satisfaction))
            .count()
    }
}

/// Fetches tasks one at a time into the download folder and points their
/// owners at the local copy as soon as each task is satisfied.
pub struct Downloader<'a> {
    fetcher: &'a dyn Fetcher,
    folder: PathBuf,
    folder_name: String,
}

impl<'a> Downloader<'a> {
    /// `folder_name` is the name used inside rewritten `file:` references;
    /// `folder` is where files are actually stored.
    pub fn new(fetcher: &'a dyn Fetcher, folder: PathBuf, folder_name: impl Into<String>) -> Self {
        Self {
            fetcher,
            folder,
            folder_name: folder_name.into(),
        }
    }

    pub async fn run(
        &self,
        archive: &mut Archive,
        tasks: &[DownloadTask],
        sink: &dyn ProgressSink,
    ) -> DownloadReport {
        let total = tasks.len();
        let mut report = DownloadReport {
            states: vec![TaskState::Pending; total],
            ..DownloadReport::default()
        };

        for (position, task) in tasks.iter().enumerate() {
            sink.emit(ProgressEvent::TaskStarted {
                task_id: task.id,
                current: position + 1,
                total,
                url: task.source_url.clone(),
            });

            let state = match self.satisfy(task, sink, &mut report.states[position]).await {
                Ok(satisfaction) => self.rewrite(archive, task, satisfaction, &mut report),
                Err(error) => Err(error),
            };

            match state {
                Ok(satisfaction) => {
                    report.states[position] = TaskState::Satisfied(satisfaction);
                    if satisfaction == Satisfaction::AlreadyPresent {
                        sink.emit(ProgressEvent::AlreadyPresent { task_id: task.id });
                    }
                }
                Err(error) => {
                    localizer_info!("Download failed for {}: {}", task.source_url, error);
                    report.states[position] = TaskState::Failed;
                    sink.emit(ProgressEvent::Failed {
                        task_id: task.id,
                        error: error.clone(),
                    });
                    report.failed.push(FailedTask {
                        url: task.source_url.clone(),
                        file_name: task.file_name.clone(),
                        error,
                    });
                }
            }
        }

        localizer_info!(
            "Processed {} task(s): {} downloaded, {} already present, {} failed",
            total,
            report.downloaded(),
            report.already_present(),
            report.failed.len()
        );
        report
    }

    async fn satisfy(
        &self,
        task: &DownloadTask,
        sink: &dyn ProgressSink,
        state: &mut TaskState,
    ) -> Result<Satisfaction, FetchError> {
        let target = self.folder.join(&task.file_name);
        if target.is_file() {
            localizer_debug!("{:?} already present, skipping fetch", target);
            return Ok(Satisfaction::AlreadyPresent);
        }

        *state = TaskState::Fetching;
        let output = self
            .fetcher
            .fetch(task.id, &task.source_url, sink)
            .await?;
        let metadata = &output.metadata;
        if metadata.redirect_count > 0 {
            localizer_debug!(
                "{} redirected {} time(s) to {}",
                metadata.original_url,
                metadata.redirect_count,
                metadata.final_url
            );
        }
        localizer_debug!(
            "{} returned {} byte(s) of {}",
            metadata.original_url,
            metadata.byte_len,
            metadata.content_type.as_deref().unwrap_or("unknown type")
        );

        AtomicFileWriter::new(self.folder.clone())
            .write(&task.file_name, &output.bytes)
            .map_err(|err| FetchError::new(FailureKind::Write, err.to_string()))?;
        sink.emit(ProgressEvent::Downloaded {
            task_id: task.id,
            bytes: output.metadata.byte_len,
        });
        Ok(Satisfaction::Downloaded)
    }

    fn rewrite(
        &self,
        archive: &mut Archive,
        task: &DownloadTask,
        satisfaction: Satisfaction,
        report: &mut DownloadReport,
    ) -> Result<Satisfaction, FetchError> {
        let local = local_reference(&self.folder_name, &task.file_name);
        match apply(archive, task, &local) {
            Ok(count) => {
                report.rewritten_elements += count;
                Ok(satisfaction)
            }
            Err(err) => {
                localizer_error!("Could not apply {} to the archive: {}", task.source_url, err);
                Err(FetchError::new(FailureKind::Rewrite, err.to_string()))
            }
        }
    }
}

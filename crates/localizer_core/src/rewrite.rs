use crate::archive::{Archive, OwnerRef, LOCAL_SCHEME};
use crate::task::DownloadTask;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RewriteError {
    #[error("{owner} no longer exists in the archive")]
    MissingOwner { owner: OwnerRef },
    #[error("{owner} now points at {found} instead of {expected}")]
    StaleOwner {
        owner: OwnerRef,
        expected: String,
        found: String,
    },
}

/// The archive-relative URL of a downloaded file.
pub fn local_reference(download_folder_name: &str, file_name: &str) -> String {
    format!("{LOCAL_SCHEME}./{download_folder_name}/{file_name}")
}

/// Points every owner of `task` at `local_url`.
///
/// All owners are checked before any is touched, so the task is applied to
/// all of them or to none. Returns the number of rewritten elements.
pub fn apply(archive: &mut Archive, task: &DownloadTask, local_url: &str) -> Result<usize, RewriteError> {
    for owner in &task.owners {
        match archive.url_of(owner) {
            None => {
                return Err(RewriteError::MissingOwner {
                    owner: owner.clone(),
                })
            }
            Some(found) if found != task.source_url => {
                return Err(RewriteError::StaleOwner {
                    owner: owner.clone(),
                    expected: task.source_url.clone(),
                    found: found.to_string(),
                })
            }
            Some(_) => {}
        }
    }

    for owner in &task.owners {
        archive.set_url(owner, local_url);
    }
    Ok(task.owners.len())
}

//! Localizer core: pure archive model, reference collection, naming and rewrite.
mod archive;
mod collect;
mod naming;
mod rewrite;
mod task;

pub use archive::{Archive, ArchiveError, ElementKind, OwnerRef, LOCAL_SCHEME};
pub use collect::{assign_names, collect, Collection, Plan, UrlGroup};
pub use naming::{candidate_name, DigitSource, NameError, NameResolver, RandomDigits, SequentialDigits};
pub use rewrite::{apply, local_reference, RewriteError};
pub use task::{DownloadTask, Satisfaction, TaskId, TaskState};

//! Localizer engine: archive IO, HTTP fetching and the download pipeline.
mod downloader;
mod fetch;
mod persist;
mod pipeline;
mod store;
mod types;

pub use downloader::{DownloadReport, Downloader};
pub use fetch::{FetchSettings, Fetcher, ProgressSink, ReqwestFetcher};
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use pipeline::{localize, localize_blocking, LocalizeError, LocalizeOptions, SuffixStrategy};
pub use store::{ArchiveStore, StoreError};
pub use types::{
    FailedTask, FailureKind, FetchError, FetchMetadata, FetchOutput, ProgressEvent, RunSummary,
};

use std::io;
use std::path::{Path, PathBuf};

use localizer_core::{assign_names, collect, ArchiveError, NameResolver, RandomDigits, SequentialDigits};
use localizer_logging::localizer_info;
use thiserror::Error;

use crate::downloader::Downloader;
use crate::fetch::{FetchSettings, Fetcher, ProgressSink, ReqwestFetcher};
use crate::persist::{ensure_output_dir, PersistError};
use crate::store::{ArchiveStore, StoreError};
use crate::{ProgressEvent, RunSummary};

const DOWNLOADS_SUFFIX: &str = ".downloads";

/// How name collisions pick their digit suffixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SuffixStrategy {
    #[default]
    Sequential,
    Random,
}

#[derive(Debug, Clone)]
pub struct LocalizeOptions {
    pub archive_path: PathBuf,
    /// Overrides `<archive file name>.downloads`.
    pub download_folder_name: Option<String>,
    pub fetch: FetchSettings,
    pub suffix: SuffixStrategy,
    /// Treat file names differing only in ASCII case as colliding.
    pub fold_case: bool,
}

impl LocalizeOptions {
    pub fn new(archive_path: impl Into<PathBuf>) -> Self {
        Self {
            archive_path: archive_path.into(),
            download_folder_name: None,
            fetch: FetchSettings::default(),
            suffix: SuffixStrategy::default(),
            fold_case: false,
        }
    }

    pub fn folder_name(&self) -> String {
        match self.download_folder_name.as_deref() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => {
                let base = self
                    .archive_path
                    .file_name()
                    .map(|name| name.to_string_lossy().into_owned())
                    .unwrap_or_default();
                format!("{base}{DOWNLOADS_SUFFIX}")
            }
        }
    }

    /// The download folder sits next to the archive file.
    pub fn download_folder(&self) -> PathBuf {
        archive_dir(&self.archive_path).join(self.folder_name())
    }

    fn resolver(&self) -> NameResolver {
        let resolver = match self.suffix {
            SuffixStrategy::Sequential => NameResolver::new(SequentialDigits::default()),
            SuffixStrategy::Random => NameResolver::new(RandomDigits::from_entropy()),
        };
        if self.fold_case {
            resolver.with_case_folding()
        } else {
            resolver
        }
    }
}

#[derive(Debug, Error)]
pub enum LocalizeError {
    #[error("could not create download folder {}: {source}", folder.display())]
    Setup {
        folder: PathBuf,
        #[source]
        source: PersistError,
    },
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("archive structure changed while collecting: {0}")]
    Collect(#[from] ArchiveError),
    #[error("could not start async runtime: {0}")]
    Runtime(#[source] io::Error),
}

/// Runs the whole pipeline: setup, load, backup, collect, fetch and rewrite,
/// then a single save. Per-task failures end up in the summary; anything
/// returned as `Err` happened before the archive file was replaced.
pub async fn localize(
    options: &LocalizeOptions,
    fetcher: &dyn Fetcher,
    sink: &dyn ProgressSink,
) -> Result<RunSummary, LocalizeError> {
    let folder = options.download_folder();
    let folder_name = options.folder_name();
    ensure_output_dir(&folder).map_err(|source| LocalizeError::Setup {
        folder: folder.clone(),
        source,
    })?;

    let store = ArchiveStore::new(&options.archive_path);
    let mut archive = store.load()?;
    let backup_created = store.backup()?;

    let collection = collect(&archive, &folder_name)?;
    let plan = assign_names(collection, &mut options.resolver());
    localizer_info!(
        "Identified {} attachment(s) and image embed(s) to download",
        plan.tasks.len()
    );
    sink.emit(ProgressEvent::Collected {
        total: plan.tasks.len(),
        invalid: plan.invalid_urls.len(),
    });

    let downloader = Downloader::new(fetcher, folder.clone(), folder_name);
    let report = downloader.run(&mut archive, &plan.tasks, sink).await;

    store.save(&archive)?;

    Ok(RunSummary {
        archive_path: options.archive_path.clone(),
        download_folder: folder,
        backup_created,
        total: plan.tasks.len(),
        downloaded: report.downloaded(),
        already_present: report.already_present(),
        rewritten_elements: report.rewritten_elements,
        failed: report.failed,
        invalid_urls: plan.invalid_urls,
    })
}

/// Runs [`localize`] with a [`ReqwestFetcher`] on a single-threaded runtime.
pub fn localize_blocking(
    options: &LocalizeOptions,
    sink: &dyn ProgressSink,
) -> Result<RunSummary, LocalizeError> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(LocalizeError::Runtime)?;
    let fetcher = ReqwestFetcher::new(options.fetch.clone());
    runtime.block_on(localize(options, &fetcher, sink))
}

fn archive_dir(archive_path: &Path) -> PathBuf {
    match archive_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_folder_is_named_after_archive() {
        let options = LocalizeOptions::new("/tmp/chats/dht.json");
        assert_eq!(options.folder_name(), "dht.json.downloads");
        assert_eq!(
            options.download_folder(),
            PathBuf::from("/tmp/chats/dht.json.downloads")
        );
    }

    #[test]
    fn folder_name_override_stays_next_to_archive() {
        let mut options = LocalizeOptions::new("dht.json");
        options.download_folder_name = Some("media".to_string());
        assert_eq!(options.folder_name(), "media");
        assert_eq!(options.download_folder(), PathBuf::from("./media"));
    }

    #[test]
    fn empty_override_falls_back_to_default() {
        let mut options = LocalizeOptions::new("a/b.txt");
        options.download_folder_name = Some(String::new());
        assert_eq!(options.folder_name(), "b.txt.downloads");
    }
}

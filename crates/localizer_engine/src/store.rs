use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use localizer_core::{Archive, ArchiveError};
use localizer_logging::{localizer_debug, localizer_info};
use thiserror::Error;

use crate::persist::{AtomicFileWriter, PersistError};

const BACKUP_EXTENSION: &str = ".bak";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("input archive file not found: {}", .0.display())]
    NotFound(PathBuf),
    #[error("input archive file has invalid format: {source}")]
    InvalidFormat {
        path: PathBuf,
        #[source]
        source: ArchiveError,
    },
    #[error("could not read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not back up archive to {}: {source}", path.display())]
    Backup {
        path: PathBuf,
        #[source]
        source: PersistError,
    },
    #[error("could not encode archive: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("could not save archive to {}: {source}", path.display())]
    Save {
        path: PathBuf,
        #[source]
        source: PersistError,
    },
}

/// Reads, backs up and rewrites one archive file.
#[derive(Debug, Clone)]
pub struct ArchiveStore {
    path: PathBuf,
}

impl ArchiveStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<archive path>.bak`, the extension appended to the full file name.
    pub fn backup_path(&self) -> PathBuf {
        let mut raw = OsString::from(self.path.as_os_str());
        raw.push(BACKUP_EXTENSION);
        PathBuf::from(raw)
    }

    pub fn load(&self) -> Result<Archive, StoreError> {
        let bytes = fs::read(&self.path).map_err(|source| {
            if source.kind() == io::ErrorKind::NotFound {
                StoreError::NotFound(self.path.clone())
            } else {
                StoreError::Read {
                    path: self.path.clone(),
                    source,
                }
            }
        })?;
        localizer_debug!("read {} bytes from {:?}", bytes.len(), self.path);

        Archive::from_slice(&bytes).map_err(|source| StoreError::InvalidFormat {
            path: self.path.clone(),
            source,
        })
    }

    /// Copies the archive verbatim to the backup path unless a backup exists.
    /// Returns whether a new backup was written.
    pub fn backup(&self) -> Result<bool, StoreError> {
        let backup = self.backup_path();
        let backup_err = |source| StoreError::Backup {
            path: backup.clone(),
            source,
        };

        if backup.exists() && !backup.is_file() {
            return Err(backup_err(PersistError::OutputDir(format!(
                "{} exists and is not a file",
                backup.display()
            ))));
        }

        let file_name = file_name_of(&backup).map_err(|e| backup_err(PersistError::Io(e)))?;
        let created = AtomicFileWriter::for_parent_of(&backup)
            .copy_new(&self.path, &file_name)
            .map_err(backup_err)?;
        if created {
            localizer_info!("Backed up archive to {:?}", backup);
        } else {
            localizer_debug!("Backup {:?} already exists; leaving it untouched", backup);
        }
        Ok(created)
    }

    /// Replaces the archive file with the compact encoding of `archive`.
    pub fn save(&self, archive: &Archive) -> Result<(), StoreError> {
        let bytes = archive.to_compact_bytes()?;
        let save_err = |source| StoreError::Save {
            path: self.path.clone(),
            source,
        };
        let file_name = file_name_of(&self.path).map_err(|e| save_err(PersistError::Io(e)))?;
        AtomicFileWriter::for_parent_of(&self.path)
            .write(&file_name, &bytes)
            .map_err(save_err)?;
        localizer_info!("Saved archive {:?} ({} bytes)", self.path, bytes.len());
        Ok(())
    }
}

fn file_name_of(path: &Path) -> Result<String, io::Error> {
    path.file_name()
        .and_then(|name| name.to_str())
        .map(str::to_string)
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("{} has no usable file name", path.display()),
            )
        })
}

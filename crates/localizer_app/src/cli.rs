//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use localizer_engine::{FetchSettings, LocalizeOptions, SuffixStrategy};
use localizer_logging::{level_for_verbosity, LevelFilter};

use crate::logging::LogDestination;

/// Downloads attachments and image embeds from a chat archive into one folder,
/// and updates URLs in the archive to point to the downloaded files.
///
/// The original archive is backed up with a '.bak' extension; an existing
/// backup file is never overwritten.
#[derive(Parser, Debug)]
#[command(name = "archive-localizer")]
#[command(author, version, about)]
pub struct Cli {
    /// Path to archive file
    #[arg(value_name = "INPUT_ARCHIVE")]
    pub input_archive: PathBuf,

    /// Name of folder with downloaded files (defaults to the archive name with '.downloads' appended)
    #[arg(short = 'd', long, value_name = "NAME")]
    pub download_folder_name: Option<String>,

    /// Seconds to wait for a connection or between reads of a response
    #[arg(short = 't', long, default_value_t = 2, value_parser = clap::value_parser!(u64).range(1..=600))]
    pub timeout: u64,

    /// Skip resources larger than this many bytes
    #[arg(long, value_name = "BYTES")]
    pub max_bytes: Option<u64>,

    /// Break file name collisions with random digits instead of a counter
    #[arg(long)]
    pub random_suffix: bool,

    /// Treat file names differing only in letter case as the same name
    #[arg(long)]
    pub fold_case: bool,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only print errors and the final summary
    #[arg(short, long)]
    pub quiet: bool,

    /// Also write log records to this file
    #[arg(long, value_name = "PATH")]
    pub log_file: Option<PathBuf>,
}

impl Cli {
    pub fn log_level(&self) -> LevelFilter {
        level_for_verbosity(self.verbose, self.quiet)
    }

    pub fn log_destination(&self) -> LogDestination {
        match &self.log_file {
            Some(path) => LogDestination::Both(path.clone()),
            None => LogDestination::Terminal,
        }
    }

    pub fn to_options(&self) -> LocalizeOptions {
        let timeout = Duration::from_secs(self.timeout);
        let mut options = LocalizeOptions::new(&self.input_archive);
        options.download_folder_name = self.download_folder_name.clone();
        options.fetch = FetchSettings {
            connect_timeout: timeout,
            read_timeout: timeout,
            max_bytes: self.max_bytes,
            ..FetchSettings::default()
        };
        options.suffix = if self.random_suffix {
            SuffixStrategy::Random
        } else {
            SuffixStrategy::Sequential
        };
        options.fold_case = self.fold_case;
        options
    }
}

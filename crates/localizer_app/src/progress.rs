//! Terminal rendering of pipeline progress and the end-of-run summary.

use localizer_engine::{ProgressEvent, ProgressSink, RunSummary};
use localizer_logging::localizer_debug;

/// Prints progress lines to stdout unless quiet.
pub struct TerminalProgress {
    quiet: bool,
}

impl TerminalProgress {
    pub fn new(quiet: bool) -> Self {
        Self { quiet }
    }
}

impl ProgressSink for TerminalProgress {
    fn emit(&self, event: ProgressEvent) {
        if let ProgressEvent::Downloaded { task_id, bytes } = &event {
            localizer_debug!("task {} wrote {} bytes", task_id, bytes);
        }
        if self.quiet {
            return;
        }
        for line in progress_lines(&event) {
            println!("{line}");
        }
    }
}

pub fn progress_lines(event: &ProgressEvent) -> Vec<String> {
    match event {
        ProgressEvent::Collected { total, invalid } => {
            let mut lines = vec![format!(
                "Identified {total} attachment(s) and image embed(s) to download."
            )];
            if *invalid > 0 {
                lines.push(format!("Skipped {invalid} URL(s) without a scheme."));
            }
            lines.push(String::new());
            lines
        }
        ProgressEvent::TaskStarted {
            current,
            total,
            url,
            ..
        } => {
            let width = total.to_string().len();
            vec![format!("[{current:>width$}/{total}] {url}")]
        }
        ProgressEvent::AlreadyPresent { .. } => vec!["Already downloaded, skipping...".to_string()],
        ProgressEvent::Failed { error, .. } => vec![format!("Download failed... {error}")],
        ProgressEvent::Receiving { .. } | ProgressEvent::Downloaded { .. } => Vec::new(),
    }
}

pub fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![String::new()];
    if summary.is_complete() {
        lines.push("Archive was updated.".to_string());
    } else {
        lines.push(format!(
            "Archive was updated, but {} out of {} request(s) failed. \
             You may re-run archive-localizer to try re-downloading failed requests again.",
            summary.failed.len(),
            summary.total
        ));
    }
    lines.push(
        "To view the archive with downloaded files, you must place the viewer in the same \
         folder as the archive file and download folder."
            .to_string(),
    );
    lines
}

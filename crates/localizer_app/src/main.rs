mod cli;
mod logging;
mod progress;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use localizer_engine::{localize_blocking, RunSummary};
use localizer_logging::localizer_info;

use crate::cli::Cli;
use crate::progress::{summary_lines, TerminalProgress};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::initialize(cli.log_destination(), cli.log_level());

    match run(&cli) {
        Ok(summary) => {
            for line in summary_lines(&summary) {
                println!("{line}");
            }
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("Error: {err:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<RunSummary> {
    let options = cli.to_options();
    localizer_info!(
        "Localizing {:?} into {:?}",
        options.archive_path,
        options.download_folder()
    );

    let sink = TerminalProgress::new(cli.quiet);
    let summary = localize_blocking(&options, &sink)
        .with_context(|| format!("could not process {}", options.archive_path.display()))?;

    for failed in &summary.failed {
        localizer_info!("{} -> {}: {}", failed.url, failed.file_name, failed.error);
    }
    localizer_info!(
        "{} downloaded, {} already present, {} element(s) rewritten, backup created: {}",
        summary.downloaded,
        summary.already_present,
        summary.rewritten_elements,
        summary.backup_created
    );
    Ok(summary)
}

use std::path::Path;

use itertools::Itertools;
use klei_ktex::{
    convert::{BatchProgress, BatchSummary},
    ConversionResult,
};
use miette::{miette, Result};
use owo_colors::{OwoColorize, Stream::Stdout};
use tracing::info;

pub mod extract;
pub mod info;
pub mod rebuild;

#[derive(clap::Subcommand)]
pub enum TexCommands {
    /// Convert a KTEX file, or every KTEX file in a directory, to PNG
    Extract(extract::ExtractArgs),
    /// Convert a PNG, or every PNG in a directory, to KTEX
    Rebuild(rebuild::RebuildArgs),
    /// Describe the header and mip table of a KTEX file
    Info(info::InfoArgs),
}

impl TexCommands {
    pub fn handle(&self) -> Result<()> {
        match self {
            TexCommands::Extract(extract) => extract.handle(),
            TexCommands::Rebuild(rebuild) => rebuild.handle(),
            TexCommands::Info(info) => info.handle(),
        }
    }
}

fn single(path: &Path, result: ConversionResult) -> Result<()> {
    match result {
        ConversionResult::Success { output } => {
            info!("{} -> {}", path.display(), output.display());
            Ok(())
        }
        ConversionResult::Failure { error } => {
            Err(miette::Report::new(error).wrap_err(format!("converting {}", path.display())))
        }
    }
}

fn progress(progress: BatchProgress<'_>) {
    let status = if progress.result.is_success() {
        "OK".if_supports_color(Stdout, |t| t.green()).to_string()
    } else {
        "FAIL".if_supports_color(Stdout, |t| t.red()).to_string()
    };

    println!(
        "[{}/{}] {} {}",
        progress.index + 1,
        progress.total,
        status,
        progress.path.display()
    );
}

fn report(summary: &BatchSummary) -> Result<()> {
    println!(
        "{} converted successfully",
        format!("{}/{}", summary.succeeded, summary.total).if_supports_color(Stdout, |t| t.bold())
    );

    if summary.failed() == 0 {
        return Ok(());
    }

    let failures = summary
        .results
        .iter()
        .filter_map(|(path, result)| {
            result
                .error()
                .map(|error| format!("  {}: {error}", path.display()))
        })
        .join("\n");

    Err(miette!(
        "{} of {} files failed\n{failures}",
        summary.failed(),
        summary.total
    ))
}

use clap::Args;
use klei_ktex::convert;
use miette::{Context, Result};
use std::path::PathBuf;

#[derive(Args)]
pub struct ExtractArgs {
    /// A KTEX file, or a directory whose KTEX files should all be converted
    #[arg(value_name = "PATH")]
    path: PathBuf,
}

impl ExtractArgs {
    pub fn handle(&self) -> Result<()> {
        if !self.path.is_dir() {
            return super::single(&self.path, convert::extract(&self.path));
        }

        let summary = convert::extract_directory(&self.path, super::progress)
            .context(format!("extracting {}", self.path.display()))?;
        super::report(&summary)
    }
}

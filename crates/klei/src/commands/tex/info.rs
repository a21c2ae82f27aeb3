use clap::Args;
use itertools::Itertools;
use klei_ktex::convert;
use miette::{Context, Result};
use owo_colors::{OwoColorize, Stream::Stdout};
use std::path::PathBuf;

#[derive(Args)]
pub struct InfoArgs {
    /// An input KTEX file
    #[arg(value_name = "FILE")]
    file: PathBuf,
}

impl InfoArgs {
    pub fn handle(&self) -> Result<()> {
        let texture =
            convert::inspect(&self.file).context(format!("reading {}", self.file.display()))?;

        println!(
            "{}",
            self.file.display().if_supports_color(Stdout, |t| t.bold())
        );
        println!("  layout:       {:?}", texture.layout);
        println!("  platform:     {}", texture.platform);
        println!("  pixel format: {}", texture.pixel_format);
        println!("  texture type: {}", texture.texture_type);
        println!("  flags:        {:#04b}", texture.flags);
        println!(
            "  mips:         {}",
            texture
                .mips
                .iter()
                .map(|m| format!("{}x{} ({} bytes)", m.width, m.height, m.byte_length()))
                .join(", ")
        );

        Ok(())
    }
}

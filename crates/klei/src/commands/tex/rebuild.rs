use clap::{Args, ValueEnum};
use klei_ktex::{
    convert::{self, RebuildOptions},
    types::{PLATFORM_DEFAULT, PLATFORM_PC, PLATFORM_PS3, PLATFORM_XBOX360},
    HeaderLayout, PixelFormat, Quality,
};
use miette::{Context, Result};
use std::path::PathBuf;

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Format {
    Dxt1,
    Dxt3,
    Dxt5,
    Rgba,
    Rgb,
}

impl From<Format> for PixelFormat {
    fn from(value: Format) -> Self {
        match value {
            Format::Dxt1 => PixelFormat::Dxt1,
            Format::Dxt3 => PixelFormat::Dxt3,
            Format::Dxt5 => PixelFormat::Dxt5,
            Format::Rgba => PixelFormat::Rgba,
            Format::Rgb => PixelFormat::Rgb,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Layout {
    /// Narrow header fields, as written by the older tools
    Legacy,
    Current,
}

impl From<Layout> for HeaderLayout {
    fn from(value: Layout) -> Self {
        match value {
            Layout::Legacy => HeaderLayout::Legacy,
            Layout::Current => HeaderLayout::Current,
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Platform {
    Default,
    Pc,
    Xbox360,
    Ps3,
}

impl From<Platform> for u8 {
    fn from(value: Platform) -> Self {
        match value {
            Platform::Default => PLATFORM_DEFAULT,
            Platform::Pc => PLATFORM_PC,
            Platform::Xbox360 => PLATFORM_XBOX360,
            Platform::Ps3 => PLATFORM_PS3,
        }
    }
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, ValueEnum)]
enum Compression {
    Fast,
    #[default]
    Normal,
    Best,
}

impl From<Compression> for Quality {
    fn from(value: Compression) -> Self {
        match value {
            Compression::Fast => Quality::Fast,
            Compression::Normal => Quality::Normal,
            Compression::Best => Quality::Best,
        }
    }
}

#[derive(Args)]
pub struct RebuildArgs {
    /// A PNG file, or a directory whose PNG files should all be converted
    #[arg(value_name = "PATH")]
    path: PathBuf,

    /// Pixel format to encode to [default: the existing texture's, or dxt5]
    #[arg(short, long)]
    format: Option<Format>,

    /// Number of mip levels to generate [default: the existing texture's, or a full chain]
    #[arg(short, long)]
    mips: Option<usize>,

    /// Header layout to write [default: the existing texture's, or current]
    #[arg(long)]
    layout: Option<Layout>,

    /// Platform to record in the header [default: the existing texture's, or pc with the current layout and default with the legacy one]
    #[arg(long)]
    platform: Option<Platform>,

    /// Block compression effort
    #[arg(short, long, value_enum, default_value_t)]
    quality: Compression,

    /// Ignore any existing KTEX file next to the image
    #[arg(long, default_value_t = false)]
    no_template: bool,
}

impl RebuildArgs {
    fn options(&self) -> RebuildOptions {
        RebuildOptions::builder()
            .maybe_pixel_format(self.format.map(Into::into))
            .maybe_mip_count(self.mips)
            .maybe_layout(self.layout.map(Into::into))
            .maybe_platform(self.platform.map(Into::into))
            .quality(self.quality.into())
            .use_template(!self.no_template)
            .build()
    }

    pub fn handle(&self) -> Result<()> {
        let options = self.options();

        if !self.path.is_dir() {
            return super::single(&self.path, convert::rebuild_with(&self.path, &options));
        }

        let summary = convert::rebuild_directory(&self.path, &options, super::progress)
            .context(format!("rebuilding {}", self.path.display()))?;
        super::report(&summary)
    }
}

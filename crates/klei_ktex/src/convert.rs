//! Whole-file conversion between KTEX and PNG
//!
//! Both directions build their output completely in memory and only then persist it next to the
//! input, so a failed conversion never leaves a partial file behind. Every failure is reported
//! through [`ConversionResult`].

use bon::Builder;
use std::{
    ffi::OsStr,
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, info, instrument, warn};
use walkdir::WalkDir;

use crate::{
    container::TextureContainer,
    error::{Error, Result},
    mipmap,
    pixel::{self, PixelFormat, Quality},
    raster::RasterBuffer,
    types::HeaderLayout,
    write::{KtexWriter, KtexWriterOptions},
};

/// Extension of KTEX files
pub const TEXTURE_EXTENSION: &str = "tex";

/// Extension of the images KTEX files are converted to
pub const IMAGE_EXTENSION: &str = "png";

/// Outcome of converting a single file
#[derive(Debug)]
pub enum ConversionResult {
    /// The output was written to `output`
    Success { output: PathBuf },

    /// Nothing was written
    Failure { error: Error },
}

impl ConversionResult {
    pub fn is_success(&self) -> bool {
        matches!(self, ConversionResult::Success { .. })
    }

    /// The written file, if the conversion succeeded
    pub fn output_path(&self) -> Option<&Path> {
        match self {
            ConversionResult::Success { output } => Some(output),
            ConversionResult::Failure { .. } => None,
        }
    }

    /// The reason the conversion failed, if it did
    pub fn error(&self) -> Option<&Error> {
        match self {
            ConversionResult::Success { .. } => None,
            ConversionResult::Failure { error } => Some(error),
        }
    }
}

impl From<Result<PathBuf>> for ConversionResult {
    fn from(value: Result<PathBuf>) -> Self {
        match value {
            Ok(output) => ConversionResult::Success { output },
            Err(error) => ConversionResult::Failure { error },
        }
    }
}

/// Options for turning a PNG back into a KTEX file
///
/// Settings left unset are taken from the existing KTEX file next to the image when there is one
/// (and `use_template` is set), otherwise from [`KtexWriterOptions::default`] with a full mip
/// chain. An unset platform that does not fit the chosen layout becomes
/// [`HeaderLayout::default_platform`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct RebuildOptions {
    /// The pixel format to encode to
    pub pixel_format: Option<PixelFormat>,

    /// The number of mip levels to generate
    pub mip_count: Option<usize>,

    /// The header layout to write
    pub layout: Option<HeaderLayout>,

    /// The platform to record in the header
    pub platform: Option<u8>,

    /// Block compression effort
    #[builder(default)]
    pub quality: Quality,

    /// Whether an existing KTEX file next to the image supplies the unset settings
    #[builder(default = true)]
    pub use_template: bool,
}

impl Default for RebuildOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Convert a KTEX file to a PNG next to it
///
/// ```no_run
/// use klei_ktex::convert::{extract, ConversionResult};
///
/// match extract("textures/hero.tex".as_ref()) {
///     ConversionResult::Success { output } => println!("wrote {}", output.display()),
///     ConversionResult::Failure { error } => eprintln!("{error}"),
/// }
/// ```
#[instrument(fields(path = %path.display()))]
pub fn extract(path: &Path) -> ConversionResult {
    try_extract(path).into()
}

fn try_extract(path: &Path) -> Result<PathBuf> {
    let texture = TextureContainer::from_bytes(&fs::read(path)?)?;
    debug!(
        width = texture.width(),
        height = texture.height(),
        mips = texture.mip_count(),
        format = %texture.pixel_format,
        "read texture"
    );

    let decoded = texture
        .mips
        .iter()
        .map(|mip| pixel::decode(texture.pixel_format, &mip.data, mip.width, mip.height))
        .collect::<Result<Vec<_>>>()?;
    let raster = mipmap::flatten(&texture, decoded)?;

    let output = path.with_extension(IMAGE_EXTENSION);
    persist(&output, &raster.to_png()?)?;

    Ok(output)
}

/// Convert a PNG to a KTEX file next to it using [`RebuildOptions::default`]
pub fn rebuild(path: &Path) -> ConversionResult {
    rebuild_with(path, &RebuildOptions::default())
}

/// Convert a PNG to a KTEX file next to it
#[instrument(skip(options), fields(path = %path.display()))]
pub fn rebuild_with(path: &Path, options: &RebuildOptions) -> ConversionResult {
    try_rebuild(path, options).into()
}

fn try_rebuild(path: &Path, options: &RebuildOptions) -> Result<PathBuf> {
    let raster = RasterBuffer::from_png(&fs::read(path)?)?;
    let output = path.with_extension(TEXTURE_EXTENSION);

    let template = if options.use_template {
        load_template(&output)
    } else {
        None
    };

    let defaults = template
        .as_ref()
        .map(KtexWriterOptions::from)
        .unwrap_or_default();
    let layout = options.layout.unwrap_or(defaults.layout);
    let platform = options.platform.unwrap_or_else(|| {
        template
            .as_ref()
            .map(|t| t.platform)
            .filter(|&p| layout.fits_platform(p))
            .unwrap_or_else(|| layout.default_platform())
    });
    let writer_options = KtexWriterOptions {
        layout,
        platform,
        pixel_format: options.pixel_format.unwrap_or(defaults.pixel_format),
        ..defaults
    };
    let mip_count = options
        .mip_count
        .or(template.as_ref().map(TextureContainer::mip_count));

    let chain = mipmap::generate_chain(raster, mip_count);
    debug!(?writer_options, mips = chain.len(), "encoding");

    let mut ktex = KtexWriter::new(Vec::new(), writer_options);
    for level in &chain {
        let data = pixel::encode_with(writer_options.pixel_format, level, options.quality);
        ktex.push_level(level.width(), level.height(), &data)?;
    }

    persist(&output, &ktex.finish()?)?;

    Ok(output)
}

fn load_template(path: &Path) -> Option<TextureContainer> {
    if !path.is_file() {
        return None;
    }

    match fs::read(path)
        .map_err(Error::from)
        .and_then(|bytes| TextureContainer::from_bytes(&bytes))
    {
        Ok(template) => {
            debug!(path = %path.display(), "using existing texture as template");
            Some(template)
        }
        Err(error) => {
            warn!(path = %path.display(), %error, "ignoring unreadable template");
            None
        }
    }
}

/// Read a KTEX file without decoding any of its levels
#[instrument(fields(path = %path.display()), err)]
pub fn inspect(path: &Path) -> Result<TextureContainer> {
    TextureContainer::from_bytes(&fs::read(path)?)
}

fn persist(path: &Path, bytes: &[u8]) -> Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut file = NamedTempFile::new_in(directory)?;
    file.write_all(bytes)?;
    file.persist(path)?;

    info!("wrote {}", path.display());
    Ok(())
}

/// Progress report handed to the batch callback after every file
#[derive(Debug)]
pub struct BatchProgress<'a> {
    /// Zero based position of this file in the batch
    pub index: usize,
    /// Number of files in the batch
    pub total: usize,
    /// The input file
    pub path: &'a Path,
    /// What happened to it
    pub result: &'a ConversionResult,
}

/// Outcome of converting every matching file in a directory
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// Number of files that were attempted
    pub total: usize,
    /// Number of files that converted successfully
    pub succeeded: usize,
    /// Every input file with its result, in processing order
    pub results: Vec<(PathBuf, ConversionResult)>,
}

impl BatchSummary {
    /// Number of files that failed to convert
    pub fn failed(&self) -> usize {
        self.total - self.succeeded
    }
}

/// Extract every KTEX file at the top level of `directory`
pub fn extract_directory(
    directory: &Path,
    progress: impl FnMut(BatchProgress<'_>),
) -> Result<BatchSummary> {
    run_batch(directory, TEXTURE_EXTENSION, progress, extract)
}

/// Rebuild every PNG at the top level of `directory`
pub fn rebuild_directory(
    directory: &Path,
    options: &RebuildOptions,
    progress: impl FnMut(BatchProgress<'_>),
) -> Result<BatchSummary> {
    run_batch(directory, IMAGE_EXTENSION, progress, |path| {
        rebuild_with(path, options)
    })
}

/// List the files at the top level of `directory` with the given extension, sorted by name
///
/// Subdirectories are not searched. Finding nothing is an error.
pub fn find_files(directory: &Path, extension: &'static str) -> Result<Vec<PathBuf>> {
    if !fs::metadata(directory)?.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("{} is not a directory", directory.display()),
        )
        .into());
    }

    let files = WalkDir::new(directory)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .map(|e| e.into_path())
        .filter(|p| p.is_file() && has_extension(p, extension))
        .collect::<Vec<_>>();

    if files.is_empty() {
        return Err(Error::NoMatchingFiles {
            directory: directory.to_path_buf(),
            extension,
        });
    }

    Ok(files)
}

fn has_extension(path: &Path, extension: &str) -> bool {
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|e| e.eq_ignore_ascii_case(extension))
}

#[instrument(skip(progress, convert), fields(directory = %directory.display()), err)]
fn run_batch(
    directory: &Path,
    extension: &'static str,
    mut progress: impl FnMut(BatchProgress<'_>),
    mut convert: impl FnMut(&Path) -> ConversionResult,
) -> Result<BatchSummary> {
    let files = find_files(directory, extension)?;
    let total = files.len();
    info!("found {total} .{extension} files");

    let mut summary = BatchSummary {
        total,
        results: Vec::with_capacity(total),
        ..Default::default()
    };

    for (index, path) in files.into_iter().enumerate() {
        let result = convert(&path);
        match &result {
            ConversionResult::Success { .. } => {
                summary.succeeded += 1;
                info!("OK: {}", path.display());
            }
            ConversionResult::Failure { error } => {
                warn!("FAIL: {}: {error}", path.display());
            }
        }

        progress(BatchProgress {
            index,
            total,
            path: &path,
            result: &result,
        });
        summary.results.push((path, result));
    }

    info!("completed: {}/{}", summary.succeeded, summary.total);
    Ok(summary)
}

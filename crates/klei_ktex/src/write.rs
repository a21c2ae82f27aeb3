//! Types for writing KTEX files
//!

use binrw::BinWrite;
use bon::Builder;
use std::io::{Cursor, Write};
use tracing::{debug, instrument};

use crate::{
    container::TextureContainer,
    error::{CorruptDataError, FormatError, Result},
    mipmap::{level_dimensions, max_mip_count},
    pixel::PixelFormat,
    types::{HeaderFields, HeaderLayout, KtexHeader, MipEntry, PLATFORM_PC, TEXTURE_TYPE_2D},
};

/// Options for how the KTEX file should be written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Builder)]
pub struct KtexWriterOptions {
    /// The header layout to write
    #[builder(default)]
    pub layout: HeaderLayout,

    /// The platform to record in the header
    #[builder(default = PLATFORM_PC)]
    pub platform: u8,

    /// The pixel format every level is stored in
    #[builder(default)]
    pub pixel_format: PixelFormat,

    /// The texture type to record in the header
    #[builder(default = TEXTURE_TYPE_2D)]
    pub texture_type: u8,

    /// The flags to record in the header
    #[builder(default)]
    pub flags: u8,
}

impl Default for KtexWriterOptions {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl From<&TextureContainer> for KtexWriterOptions {
    fn from(value: &TextureContainer) -> Self {
        KtexWriterOptions {
            layout: value.layout,
            platform: value.platform,
            pixel_format: value.pixel_format,
            texture_type: value.texture_type,
            flags: value.flags,
        }
    }
}

/// KTEX file generator
///
/// Levels are collected in memory and nothing reaches the inner writer until
/// [`KtexWriter::finish`] has checked the whole chain.
///
/// ```
/// # fn doit() -> klei_ktex::error::Result<()>
/// # {
/// use klei_ktex::{KtexWriter, PixelFormat};
/// use klei_ktex::write::KtexWriterOptions;
///
/// let mut ktex = KtexWriter::new(Vec::new(), KtexWriterOptions::builder()
///            .pixel_format(PixelFormat::Rgba)
///            .build());
///
/// ktex.push_level(2, 1, &[0xFF; 8])?;
/// ktex.push_level(1, 1, &[0xFF; 4])?;
///
/// let bytes = ktex.finish()?;
/// assert_eq!(bytes.len(), 8 + 2 * 10 + 12);
///
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
pub struct KtexWriter<W: Write> {
    inner: W,
    options: KtexWriterOptions,
    base: Option<(u32, u32)>,
    entries: Vec<MipEntry>,
    payload: Vec<u8>,
}

impl<W: Write> KtexWriter<W> {
    /// Initializes the file.
    ///
    /// Levels must be pushed in index order starting with the full resolution level.
    pub fn new(inner: W, options: KtexWriterOptions) -> KtexWriter<W> {
        KtexWriter {
            inner,
            options,
            base: None,
            entries: Vec::new(),
            payload: Vec::new(),
        }
    }

    /// Number of levels pushed so far
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no level has been pushed yet
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Append the next mip level.
    ///
    /// The dimensions must be the base dimensions halved once per level already pushed and the
    /// data must be exactly the size the pixel format needs for them. The table entry is
    /// computed from those rather than taken from the caller.
    #[instrument(skip(self, data), fields(size = data.len()), err)]
    pub fn push_level(&mut self, width: u32, height: u32, data: &[u8]) -> Result<()> {
        let index = self.entries.len();
        let (base_width, base_height) = match self.base {
            Some(base) => base,
            None => {
                if width == 0 || height == 0 {
                    return Err(CorruptDataError::ZeroDimension { width, height }.into());
                }
                self.base = Some((width, height));
                (width, height)
            }
        };

        let max = max_mip_count(base_width, base_height);
        if index >= max {
            return Err(CorruptDataError::MipCount {
                count: index + 1,
                max,
            }
            .into());
        }

        let expected = level_dimensions(base_width, base_height, index);
        if (width, height) != expected {
            return Err(CorruptDataError::MipDimensions {
                index,
                actual: (width, height),
                expected,
            }
            .into());
        }

        let format = self.options.pixel_format;
        let expected = format.level_size(width, height);
        if data.len() != expected {
            return Err(CorruptDataError::MipSize {
                index,
                actual: data.len(),
                expected,
            }
            .into());
        }

        let too_large = || FormatError::DimensionsTooLarge { width, height };
        let entry = MipEntry {
            width: u16::try_from(width).map_err(|_| too_large())?,
            height: u16::try_from(height).map_err(|_| too_large())?,
            pitch: u16::try_from(format.pitch(width)).map_err(|_| too_large())?,
            data_size: u32::try_from(data.len()).map_err(|_| too_large())?,
        };
        debug!(index, ?entry, "adding level");

        self.payload.extend_from_slice(data);
        self.entries.push(entry);

        Ok(())
    }

    /// Write the header, the mip table and the payload
    ///
    /// This will return the writer, but one should normally not append any data to the end of the file.
    #[instrument(skip(self), err)]
    pub fn finish(mut self) -> Result<W> {
        if self.entries.is_empty() {
            return Err(CorruptDataError::NoLevels.into());
        }

        let mip_count = self.entries.len();
        let fields = HeaderFields {
            platform: self.options.platform,
            pixel_format: self.options.pixel_format.code(),
            texture_type: self.options.texture_type,
            mip_count: u8::try_from(mip_count).map_err(|_| FormatError::FieldOverflow {
                field: "mip count",
                value: mip_count as u32,
                bits: 8,
            })?,
            flags: self.options.flags,
        };
        let header = KtexHeader {
            packed: self.options.layout.pack(&fields)?,
        };

        let mut table = Cursor::new(Vec::new());
        header.write(&mut table)?;
        for entry in &self.entries {
            entry.write(&mut table)?;
        }

        self.inner.write_all(table.get_ref())?;
        self.inner.write_all(&self.payload)?;

        Ok(self.inner)
    }
}

impl TextureContainer {
    /// Serialize this texture, recomputing every size field from the mip data
    #[instrument(skip_all, fields(width = self.width(), height = self.height()), err)]
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        self.write(Vec::new())
    }

    /// Serialize this texture into `writer`
    pub fn write<W: Write>(&self, writer: W) -> Result<W> {
        let mut ktex = KtexWriter::new(writer, self.into());
        for mip in &self.mips {
            ktex.push_level(mip.width, mip.height, &mip.data)?;
        }
        ktex.finish()
    }
}

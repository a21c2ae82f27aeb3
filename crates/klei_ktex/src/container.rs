//! The in-memory form of a KTEX file
//!

use crate::{
    error::{CorruptDataError, Result},
    mipmap::{level_dimensions, max_mip_count},
    pixel::PixelFormat,
    types::HeaderLayout,
};

/// One resolution tier of a texture, level 0 being full resolution
#[derive(Clone, PartialEq, Eq)]
pub struct MipLevel {
    /// Width of this level in texels
    pub width: u32,
    /// Height of this level in texels
    pub height: u32,
    /// The stored bytes, compressed or raw depending on the pixel format
    pub data: Vec<u8>,
}

impl std::fmt::Debug for MipLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "MipLevel({}x{}, {} bytes)",
            self.width,
            self.height,
            self.data.len()
        )
    }
}

impl MipLevel {
    /// Size of the stored bytes
    pub fn byte_length(&self) -> usize {
        self.data.len()
    }
}

/// A parsed KTEX file
///
/// The base dimensions and the mip count are not stored separately in the file, they come from
/// the mip table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureContainer {
    /// Which header layout the file uses
    pub layout: HeaderLayout,
    /// Platform the texture was built for
    pub platform: u8,
    /// How the texels of every level are stored
    pub pixel_format: PixelFormat,
    /// 1D, 2D, 3D or cube
    pub texture_type: u8,
    /// Flags with no known meaning, kept as they were
    pub flags: u8,
    /// Mip levels in index order
    pub mips: Vec<MipLevel>,
}

impl TextureContainer {
    /// Width of level 0
    pub fn width(&self) -> u32 {
        self.mips.first().map_or(0, |m| m.width)
    }

    /// Height of level 0
    pub fn height(&self) -> u32 {
        self.mips.first().map_or(0, |m| m.height)
    }

    /// Number of mip levels
    pub fn mip_count(&self) -> usize {
        self.mips.len()
    }

    /// Check that the mip chain is consistent with the base size and the pixel format.
    pub fn validate(&self) -> Result<()> {
        let Some(base) = self.mips.first() else {
            return Err(CorruptDataError::NoLevels.into());
        };

        if base.width == 0 || base.height == 0 {
            return Err(CorruptDataError::ZeroDimension {
                width: base.width,
                height: base.height,
            }
            .into());
        }

        let max = max_mip_count(base.width, base.height);
        if self.mips.len() > max {
            return Err(CorruptDataError::MipCount {
                count: self.mips.len(),
                max,
            }
            .into());
        }

        for (index, mip) in self.mips.iter().enumerate() {
            let expected = level_dimensions(base.width, base.height, index);
            if (mip.width, mip.height) != expected {
                return Err(CorruptDataError::MipDimensions {
                    index,
                    actual: (mip.width, mip.height),
                    expected,
                }
                .into());
            }

            let expected = self.pixel_format.level_size(mip.width, mip.height);
            if mip.data.len() != expected {
                return Err(CorruptDataError::MipSize {
                    index,
                    actual: mip.data.len(),
                    expected,
                }
                .into());
            }
        }

        Ok(())
    }
}

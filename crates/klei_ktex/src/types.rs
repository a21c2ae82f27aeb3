//! Base types for structure of KTEX file.

use binrw::{BinRead, BinWrite};

use crate::error::{FormatError, Result};

/// Platform value written by the PC builds of the games
pub const PLATFORM_PC: u8 = 12;
/// Platform value written by the Xbox 360 builds of the games
pub const PLATFORM_XBOX360: u8 = 11;
/// Platform value written by the PS3 builds of the games
pub const PLATFORM_PS3: u8 = 10;
/// Platform value used when no platform has been specified
pub const PLATFORM_DEFAULT: u8 = 0;

/// Texture type for a plain two dimensional texture
pub const TEXTURE_TYPE_2D: u8 = 2;

/// KTEX file header
///
/// Defines the header of the KTEX file which always starts with "KTEX" and then a packed
/// 32 bit word describing the texture. All data is stored in little endian format
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(magic = b"KTEX", little)]
pub struct KtexHeader {
    /// Bitfield holding platform, pixel format, texture type, mip count and flags
    pub packed: u32,
}

/// KTEX mip table entry
///
/// One entry per mip level follows the header, in mip index order
#[derive(BinRead, BinWrite, Debug, Default, Copy, Clone, PartialEq)]
#[brw(little)]
pub struct MipEntry {
    /// Width of this level in texels
    pub width: u16,

    /// Height of this level in texels
    pub height: u16,

    /// Bytes per row of blocks
    pub pitch: u16,

    /// Size of this level's data in the payload
    pub data_size: u32,
}

/// Size in bytes of a [`MipEntry`] in the file
pub const MIP_ENTRY_SIZE: u64 = 10;

/// Size in bytes of the magic and header word
pub const HEADER_SIZE: u64 = 8;

/// The bit layout of the header word
///
/// Both layouts pack the same fields in the same order and pad the unused high bits with ones,
/// they differ only in how wide each field is.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum HeaderLayout {
    /// Layout written by the older tools (Shank era)
    ///
    /// platform: 3, pixel format: 3, texture type: 3, mip count: 4, flags: 1
    Legacy,

    /// Layout written by the current tools
    ///
    /// platform: 4, pixel format: 5, texture type: 4, mip count: 5, flags: 2
    #[default]
    Current,
}

const FIELD_NAMES: [&str; 5] = [
    "platform",
    "pixel format",
    "texture type",
    "mip count",
    "flags",
];

impl HeaderLayout {
    const fn widths(self) -> [u32; 5] {
        match self {
            HeaderLayout::Legacy => [3, 3, 3, 4, 1],
            HeaderLayout::Current => [4, 5, 4, 5, 2],
        }
    }

    const fn fill_shift(self) -> u32 {
        match self {
            HeaderLayout::Legacy => 14,
            HeaderLayout::Current => 20,
        }
    }

    fn fill(self) -> u32 {
        u32::MAX << self.fill_shift()
    }

    /// Determine which layout a header word was written with.
    ///
    /// A current header can never have bits 14..=19 all set since that would mean a mip count of
    /// at least 30, so the legacy check goes first.
    pub fn detect(packed: u32) -> Result<HeaderLayout> {
        for layout in [HeaderLayout::Legacy, HeaderLayout::Current] {
            if packed & layout.fill() == layout.fill() {
                return Ok(layout);
            }
        }
        Err(FormatError::UnsupportedVersion(packed).into())
    }

    /// The largest mip count this layout can store
    pub fn max_mip_count(self) -> usize {
        (1usize << self.widths()[3]) - 1
    }

    /// Whether `platform` fits this layout's platform field
    pub fn fits_platform(self, platform: u8) -> bool {
        (platform as u32) >> self.widths()[0] == 0
    }

    /// The platform written when none is given
    ///
    /// [`PLATFORM_PC`] does not fit the legacy platform field.
    pub fn default_platform(self) -> u8 {
        match self {
            HeaderLayout::Legacy => PLATFORM_DEFAULT,
            HeaderLayout::Current => PLATFORM_PC,
        }
    }

    /// Split a header word into its fields
    pub fn unpack(self, packed: u32) -> HeaderFields {
        let mut values = [0u32; 5];
        let mut shift = 0;
        for (value, width) in values.iter_mut().zip(self.widths()) {
            *value = (packed >> shift) & ((1 << width) - 1);
            shift += width;
        }

        HeaderFields {
            platform: values[0] as u8,
            pixel_format: values[1],
            texture_type: values[2] as u8,
            mip_count: values[3] as u8,
            flags: values[4] as u8,
        }
    }

    /// Build a header word from its fields
    pub fn pack(self, fields: &HeaderFields) -> Result<u32> {
        let values = [
            fields.platform as u32,
            fields.pixel_format,
            fields.texture_type as u32,
            fields.mip_count as u32,
            fields.flags as u32,
        ];

        let mut packed = self.fill();
        let mut shift = 0;
        for ((value, width), field) in values.into_iter().zip(self.widths()).zip(FIELD_NAMES) {
            if value >> width != 0 {
                return Err(FormatError::FieldOverflow {
                    field,
                    value,
                    bits: width,
                }
                .into());
            }
            packed |= value << shift;
            shift += width;
        }

        Ok(packed)
    }
}

/// The fields stored in the packed header word
#[derive(Debug, Default, Copy, Clone, PartialEq, Eq)]
pub struct HeaderFields {
    pub platform: u8,
    /// Raw pixel format code, see [`crate::pixel::PixelFormat`]
    pub pixel_format: u32,
    pub texture_type: u8,
    pub mip_count: u8,
    pub flags: u8,
}

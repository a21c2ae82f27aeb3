//! This library handles reading, writing and converting **KTEX** textures used by games from *Klei
//! Entertainment*.
//!
//! # KTEX Texture Format Documentation
//!
//! KTEX files (usually with the `.tex` extension) hold a single texture together with its mip
//! chain. Each level is stored either block compressed (DXT1/3/5) or as raw RGB/RGBA texels.
//!
//! ## File Structure
//!
//! A KTEX file consists of a header, followed by a table with one entry per mip level, followed by
//! the data of every level in table order.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: 0x4B544558 ("KTEX")                               |
//! | 0x0004         | Header word            | 4 bytes: Bit packed texture description                    |
//! | 0x0008         | Mip table              | 10 bytes per mip level                                     |
//! | ...            | Mip data               | Concatenated level data, level 0 first                     |
//!
//! ### Header Word
//!
//! The header word packs several fields starting at the least significant bit. Two layouts exist,
//! older files use narrower fields. The unused high bits are always set which is what tells the
//! layouts apart.
//!
//! | Field          | Legacy bits | Current bits |
//! |----------------|-------------|--------------|
//! | Platform       | 0..3        | 0..4         |
//! | Pixel format   | 3..6        | 4..9         |
//! | Texture type   | 6..9        | 9..13        |
//! | Mip count      | 9..13       | 13..18       |
//! | Flags          | 13..14      | 18..20       |
//! | Fill (all 1s)  | 14..32      | 20..32       |
//!
//! - **Platform**: `0` default, `10` PS3, `11` Xbox 360, `12` PC
//! - **Pixel format**:
//!   - `0`: DXT1, 8 bytes per 4x4 block
//!   - `1`: DXT3, 16 bytes per 4x4 block
//!   - `2`: DXT5, 16 bytes per 4x4 block
//!   - `4`: RGBA, 4 bytes per texel
//!   - `5`: RGB, 3 bytes per texel
//! - **Texture type**: `1` 1D, `2` 2D, `3` 3D, `4` cube map
//!
//! ### Mip Table
//!
//! | Offset (bytes) | Field                  | Description                                             |
//! |----------------|------------------------|---------------------------------------------------------|
//! | 0x0000         | Width                  | 2 bytes: Width of the level in texels                   |
//! | 0x0002         | Height                 | 2 bytes: Height of the level in texels                  |
//! | 0x0004         | Pitch                  | 2 bytes: Bytes per row of texels or blocks              |
//! | 0x0006         | Data size              | 4 bytes: Size of the level data                         |
//!
//! Every level halves the previous one in both directions, never going below 1. Rows are stored
//! top to bottom.
//!
//! ## Additional Information
//!
//! - **File Extension**: `.tex`
//! - **Endianness**: Little-endian for all multi-byte integers
//!

pub mod container;
pub mod convert;
pub mod error;
pub mod mipmap;
pub mod pixel;
pub mod raster;
pub mod read;
pub mod types;
pub mod write;

pub use container::{MipLevel, TextureContainer};
pub use convert::{extract, rebuild, rebuild_with, ConversionResult, RebuildOptions};
pub use pixel::{PixelFormat, Quality};
pub use raster::RasterBuffer;
pub use types::HeaderLayout;
pub use write::KtexWriter;

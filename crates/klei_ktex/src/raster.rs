//! Canonical RGBA8 rasters and their PNG representation

use image::{codecs::png::PngEncoder, ImageFormat, RgbaImage};
use tracing::instrument;

use crate::error::{CorruptDataError, Result};

/// A decoded image, four interleaved bytes per texel in row-major order
#[derive(Clone, PartialEq, Eq)]
pub struct RasterBuffer {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl std::fmt::Debug for RasterBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "RasterBuffer({}x{})", self.width, self.height)
    }
}

impl RasterBuffer {
    /// Wrap RGBA8 data, which must hold exactly `width * height * 4` bytes
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Result<RasterBuffer> {
        let expected = Self::byte_len(width, height);
        if pixels.len() != expected {
            return Err(CorruptDataError::RasterSize {
                width,
                height,
                actual: pixels.len(),
                expected,
            }
            .into());
        }

        Ok(RasterBuffer {
            width,
            height,
            pixels,
        })
    }

    /// A raster with every texel set to `rgba`
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> RasterBuffer {
        RasterBuffer {
            width,
            height,
            pixels: rgba.repeat(width as usize * height as usize),
        }
    }

    pub(crate) fn from_parts(width: u32, height: u32, pixels: Vec<u8>) -> RasterBuffer {
        debug_assert_eq!(pixels.len(), Self::byte_len(width, height));
        RasterBuffer {
            width,
            height,
            pixels,
        }
    }

    pub(crate) fn byte_len(width: u32, height: u32) -> usize {
        width as usize * height as usize * 4
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// The raw RGBA8 bytes
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// The texel at (x, y)
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.pixels[i],
            self.pixels[i + 1],
            self.pixels[i + 2],
            self.pixels[i + 3],
        ]
    }

    /// Unwrap and return the RGBA8 bytes
    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    /// Encode as a lossless 8 bit RGBA PNG
    #[instrument(skip(self), fields(width = self.width, height = self.height), err)]
    pub fn to_png(&self) -> Result<Vec<u8>> {
        let image = RgbaImage::from_raw(self.width, self.height, self.pixels.clone()).ok_or(
            CorruptDataError::RasterSize {
                width: self.width,
                height: self.height,
                actual: self.pixels.len(),
                expected: Self::byte_len(self.width, self.height),
            },
        )?;

        let mut png = Vec::new();
        image.write_with_encoder(PngEncoder::new(&mut png))?;

        Ok(png)
    }

    /// Decode a PNG of any colour type and depth, normalizing to RGBA8
    ///
    /// Images without an alpha channel come back fully opaque.
    #[instrument(skip_all, fields(size = bytes.len()), err)]
    pub fn from_png(bytes: &[u8]) -> Result<RasterBuffer> {
        let image = image::load_from_memory_with_format(bytes, ImageFormat::Png)?.into_rgba8();

        Ok(RasterBuffer {
            width: image.width(),
            height: image.height(),
            pixels: image.into_raw(),
        })
    }
}

//! Pixel formats and their conversion to and from RGBA8

use tracing::instrument;

use crate::{
    error::{CorruptDataError, Error, Result},
    raster::RasterBuffer,
};

/// Identifies how the texels of every mip level are stored
///
/// The block compressed formats store 4x4 texel blocks, the raw formats store texels one at a
/// time in row-major order.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum PixelFormat {
    /// BC1, 8 bytes per block with 1 bit alpha
    Dxt1 = 0,

    /// BC2, 16 bytes per block with explicit 4 bit alpha
    Dxt3 = 1,

    /// BC3, 16 bytes per block with interpolated alpha
    #[default]
    Dxt5 = 2,

    /// Uncompressed bytes in R, G, B, A order
    Rgba = 4,

    /// Uncompressed bytes in R, G, B order
    Rgb = 5,
}

impl TryFrom<u32> for PixelFormat {
    type Error = Error;

    fn try_from(value: u32) -> Result<Self> {
        Ok(match value {
            0 => PixelFormat::Dxt1,
            1 => PixelFormat::Dxt3,
            2 => PixelFormat::Dxt5,
            4 => PixelFormat::Rgba,
            5 => PixelFormat::Rgb,
            _ => return Err(Error::UnsupportedPixelFormat(value)),
        })
    }
}

/// How hard the block compressor should search for good endpoints
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Quality {
    /// Range fit
    Fast,
    /// Cluster fit
    #[default]
    Normal,
    /// Iterative cluster fit
    Best,
}

impl Quality {
    fn params(self) -> texpresso::Params {
        texpresso::Params {
            algorithm: match self {
                Quality::Fast => texpresso::Algorithm::RangeFit,
                Quality::Normal => texpresso::Algorithm::ClusterFit,
                Quality::Best => texpresso::Algorithm::IterativeClusterFit,
            },
            weights: texpresso::COLOUR_WEIGHTS_PERCEPTUAL,
            weigh_colour_by_alpha: true,
        }
    }
}

impl PixelFormat {
    /// The numeric code stored in the header
    pub fn code(self) -> u32 {
        self as u32
    }

    /// Whether this is one of the lossy block formats
    pub fn is_compressed(self) -> bool {
        self.block_codec().is_some()
    }

    /// Width and height of one block in texels
    pub fn block_dimensions(self) -> (u32, u32) {
        if self.is_compressed() {
            (4, 4)
        } else {
            (1, 1)
        }
    }

    /// Size of one block in bytes
    pub fn bytes_per_block(self) -> usize {
        match self {
            PixelFormat::Dxt1 => 8,
            PixelFormat::Dxt3 | PixelFormat::Dxt5 => 16,
            PixelFormat::Rgba => 4,
            PixelFormat::Rgb => 3,
        }
    }

    /// Number of blocks covering a `width` x `height` level
    pub fn block_count(self, width: u32, height: u32) -> (usize, usize) {
        let (block_width, block_height) = self.block_dimensions();
        (
            width.div_ceil(block_width) as usize,
            height.div_ceil(block_height) as usize,
        )
    }

    /// Bytes in one row of blocks
    pub fn pitch(self, width: u32) -> usize {
        self.block_count(width, 1).0 * self.bytes_per_block()
    }

    /// Bytes needed to store a `width` x `height` level
    pub fn level_size(self, width: u32, height: u32) -> usize {
        let (columns, rows) = self.block_count(width, height);
        columns * rows * self.bytes_per_block()
    }

    fn block_codec(self) -> Option<texpresso::Format> {
        match self {
            PixelFormat::Dxt1 => Some(texpresso::Format::Bc1),
            PixelFormat::Dxt3 => Some(texpresso::Format::Bc2),
            PixelFormat::Dxt5 => Some(texpresso::Format::Bc3),
            PixelFormat::Rgba | PixelFormat::Rgb => None,
        }
    }
}

impl std::fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            PixelFormat::Dxt1 => "DXT1",
            PixelFormat::Dxt3 => "DXT3",
            PixelFormat::Dxt5 => "DXT5",
            PixelFormat::Rgba => "RGBA",
            PixelFormat::Rgb => "RGB",
        })
    }
}

/// Decode one level stored as `format` into RGBA8
#[instrument(skip(data), fields(size = data.len()), err)]
pub fn decode(format: PixelFormat, data: &[u8], width: u32, height: u32) -> Result<RasterBuffer> {
    let expected = format.level_size(width, height);
    if data.len() != expected {
        return Err(CorruptDataError::LevelSize {
            width,
            height,
            actual: data.len(),
            expected,
        }
        .into());
    }

    let pixels = match format.block_codec() {
        Some(codec) => {
            let mut output = vec![0u8; RasterBuffer::byte_len(width, height)];
            codec.decompress(data, width as usize, height as usize, &mut output);
            output
        }
        None if format == PixelFormat::Rgb => data
            .chunks_exact(3)
            .flat_map(|px| [px[0], px[1], px[2], 0xFF])
            .collect(),
        None => data.to_vec(),
    };

    RasterBuffer::new(width, height, pixels)
}

/// Encode a raster as `format` with the default [`Quality`]
pub fn encode(format: PixelFormat, raster: &RasterBuffer) -> Vec<u8> {
    encode_with(format, raster, Quality::default())
}

/// Encode a raster as `format`
///
/// The block formats are lossy, only the dimensions survive a round trip exactly.
#[instrument(skip(raster), fields(width = raster.width(), height = raster.height()))]
pub fn encode_with(format: PixelFormat, raster: &RasterBuffer, quality: Quality) -> Vec<u8> {
    let (width, height) = (raster.width(), raster.height());

    match format.block_codec() {
        Some(codec) => {
            let mut output = vec![0u8; format.level_size(width, height)];
            codec.compress(
                raster.pixels(),
                width as usize,
                height as usize,
                quality.params(),
                &mut output,
            );
            output
        }
        None if format == PixelFormat::Rgb => raster
            .pixels()
            .chunks_exact(4)
            .flat_map(|px| [px[0], px[1], px[2]])
            .collect(),
        None => raster.pixels().to_vec(),
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::error::{CorruptDataError, Error, ErrorKind, Result};
    use crate::pixel::{decode, encode, encode_with, PixelFormat, Quality};
    use crate::raster::RasterBuffer;

    fn checker(width: u32, height: u32) -> RasterBuffer {
        let pixels = (0..height)
            .flat_map(|y| {
                (0..width).flat_map(move |x| {
                    if (x / 4 + y / 4) % 2 == 0 {
                        [200, 40, 16, 255]
                    } else {
                        [8, 120, 232, 136]
                    }
                })
            })
            .collect();
        RasterBuffer::new(width, height, pixels).unwrap()
    }

    fn max_error(a: &RasterBuffer, b: &RasterBuffer) -> u8 {
        a.pixels()
            .iter()
            .zip(b.pixels())
            .map(|(x, y)| x.abs_diff(*y))
            .max()
            .unwrap_or(0)
    }

    #[test]
    fn codes() -> Result<()> {
        for format in [
            PixelFormat::Dxt1,
            PixelFormat::Dxt3,
            PixelFormat::Dxt5,
            PixelFormat::Rgba,
            PixelFormat::Rgb,
        ] {
            assert_eq!(PixelFormat::try_from(format.code())?, format);
        }

        assert!(matches!(
            PixelFormat::try_from(3),
            Err(Error::UnsupportedPixelFormat(3))
        ));
        assert_eq!(
            PixelFormat::try_from(31).unwrap_err().kind(),
            ErrorKind::UnsupportedPixelFormat
        );

        Ok(())
    }

    #[test]
    fn sizes() {
        assert_eq!(PixelFormat::Dxt1.level_size(256, 256), 32768);
        assert_eq!(PixelFormat::Dxt5.level_size(256, 256), 65536);
        assert_eq!(PixelFormat::Dxt5.level_size(1, 1), 16);
        assert_eq!(PixelFormat::Dxt3.level_size(6, 5), 64);
        assert_eq!(PixelFormat::Rgba.level_size(3, 2), 24);
        assert_eq!(PixelFormat::Rgb.level_size(3, 2), 18);

        assert_eq!(PixelFormat::Dxt5.pitch(256), 1024);
        assert_eq!(PixelFormat::Dxt1.pitch(2), 8);
        assert_eq!(PixelFormat::Rgba.pitch(10), 40);
    }

    #[traced_test]
    #[test]
    fn rgba_is_lossless() -> Result<()> {
        let raster = checker(7, 3);
        let data = encode(PixelFormat::Rgba, &raster);
        assert_eq!(data.len(), 7 * 3 * 4);
        assert_eq!(decode(PixelFormat::Rgba, &data, 7, 3)?, raster);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn rgb_drops_alpha() -> Result<()> {
        let raster = RasterBuffer::filled(2, 2, [1, 2, 3, 4]);
        let data = encode(PixelFormat::Rgb, &raster);
        assert_eq!(data, vec![1, 2, 3, 1, 2, 3, 1, 2, 3, 1, 2, 3]);
        assert_eq!(
            decode(PixelFormat::Rgb, &data, 2, 2)?,
            RasterBuffer::filled(2, 2, [1, 2, 3, 255])
        );

        Ok(())
    }

    #[traced_test]
    #[test]
    fn block_formats_stay_close() -> Result<()> {
        let raster = checker(16, 8);

        for format in [PixelFormat::Dxt3, PixelFormat::Dxt5] {
            let data = encode(format, &raster);
            assert_eq!(data.len(), format.level_size(16, 8));

            let decoded = decode(format, &data, 16, 8)?;
            assert_eq!(decoded.width(), 16);
            assert_eq!(decoded.height(), 8);
            assert!(max_error(&raster, &decoded) <= 8, "{format} drifted");
        }

        Ok(())
    }

    #[traced_test]
    #[test]
    fn dxt1_keeps_opaque_colour() -> Result<()> {
        let raster = RasterBuffer::filled(8, 8, [248, 128, 0, 255]);
        let data = encode_with(PixelFormat::Dxt1, &raster, Quality::Fast);
        let decoded = decode(PixelFormat::Dxt1, &data, 8, 8)?;

        for y in 0..8 {
            for x in 0..8 {
                let [r, g, b, a] = decoded.pixel(x, y);
                assert_eq!(a, 255);
                assert!(r.abs_diff(248) <= 8 && g.abs_diff(128) <= 8 && b <= 8);
            }
        }

        Ok(())
    }

    #[traced_test]
    #[test]
    fn partial_blocks() -> Result<()> {
        let raster = RasterBuffer::filled(5, 3, [64, 64, 64, 255]);
        let data = encode(PixelFormat::Dxt5, &raster);
        assert_eq!(data.len(), 2 * 16);

        let decoded = decode(PixelFormat::Dxt5, &data, 5, 3)?;
        assert_eq!(decoded.width(), 5);
        assert_eq!(decoded.height(), 3);
        assert!(max_error(&raster, &decoded) <= 4);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn wrong_length_is_corrupt() {
        let result = decode(PixelFormat::Dxt1, &[0; 7], 4, 4);
        assert!(matches!(
            result,
            Err(Error::CorruptData(CorruptDataError::LevelSize {
                width: 4,
                height: 4,
                actual: 7,
                expected: 8,
            }))
        ));
    }
}

//! Flattening and regenerating mip chains

use tracing::{debug, instrument};

use crate::{
    container::TextureContainer,
    error::{CorruptDataError, Result},
    raster::RasterBuffer,
};

/// Length of the full chain for a base size, down to and including 1x1
pub fn max_mip_count(width: u32, height: u32) -> usize {
    match width.max(height) {
        0 => 0,
        largest => largest.ilog2() as usize + 1,
    }
}

/// Dimensions of mip `index` for a base size
pub fn level_dimensions(width: u32, height: u32, index: usize) -> (u32, u32) {
    let shift = index.min(31) as u32;
    ((width >> shift).max(1), (height >> shift).max(1))
}

/// Pick the raster that represents a decoded texture as a flat image.
///
/// PNG has no notion of mip levels so only level 0 is kept.
pub fn flatten(container: &TextureContainer, decoded: Vec<RasterBuffer>) -> Result<RasterBuffer> {
    let base = decoded
        .into_iter()
        .next()
        .ok_or(CorruptDataError::NoLevels)?;

    if (base.width(), base.height()) != (container.width(), container.height()) {
        return Err(CorruptDataError::MipDimensions {
            index: 0,
            actual: (base.width(), base.height()),
            expected: (container.width(), container.height()),
        }
        .into());
    }

    Ok(base)
}

/// Build a mip chain starting at `base`
///
/// With `None` the chain runs down to 1x1. A requested count is clamped to `1..=max`.
#[instrument(skip(base), fields(width = base.width(), height = base.height()))]
pub fn generate_chain(base: RasterBuffer, mip_count: Option<usize>) -> Vec<RasterBuffer> {
    let max = max_mip_count(base.width(), base.height());
    let count = mip_count.unwrap_or(max).clamp(1, max.max(1));
    debug!(count, "generating mip chain");

    let mut chain = Vec::with_capacity(count);
    chain.push(base);
    while chain.len() < count {
        let next = downsample(&chain[chain.len() - 1]);
        chain.push(next);
    }

    chain
}

/// Halve a raster in both directions (to a minimum of 1) using a 2x2 box filter
///
/// Texels past the edge of odd sized rasters are clamped to the last row or column.
pub fn downsample(source: &RasterBuffer) -> RasterBuffer {
    let (width, height) = level_dimensions(source.width(), source.height(), 1);
    let max_x = source.width() - 1;
    let max_y = source.height() - 1;

    let mut pixels = Vec::with_capacity(RasterBuffer::byte_len(width, height));
    for y in 0..height {
        let (y0, y1) = ((y * 2).min(max_y), (y * 2 + 1).min(max_y));
        for x in 0..width {
            let (x0, x1) = ((x * 2).min(max_x), (x * 2 + 1).min(max_x));
            let quad = [
                source.pixel(x0, y0),
                source.pixel(x1, y0),
                source.pixel(x0, y1),
                source.pixel(x1, y1),
            ];

            for channel in 0..4 {
                let sum: u32 = quad.iter().map(|p| p[channel] as u32).sum();
                pixels.push(((sum + 2) / 4) as u8);
            }
        }
    }

    RasterBuffer::from_parts(width, height, pixels)
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use tracing_test::traced_test;

    use crate::container::{MipLevel, TextureContainer};
    use crate::error::{CorruptDataError, Error, Result};
    use crate::mipmap::{downsample, flatten, generate_chain, level_dimensions, max_mip_count};
    use crate::pixel::PixelFormat;
    use crate::raster::RasterBuffer;
    use crate::types::HeaderLayout;

    #[test]
    fn mip_counts() {
        assert_eq!(max_mip_count(256, 256), 9);
        assert_eq!(max_mip_count(256, 64), 9);
        assert_eq!(max_mip_count(300, 17), 9);
        assert_eq!(max_mip_count(1, 1), 1);
        assert_eq!(max_mip_count(0, 0), 0);
    }

    #[test]
    fn dimensions() {
        assert_eq!(level_dimensions(256, 64, 0), (256, 64));
        assert_eq!(level_dimensions(256, 64, 3), (32, 8));
        assert_eq!(level_dimensions(256, 64, 8), (1, 1));
        assert_eq!(level_dimensions(5, 3, 1), (2, 1));
    }

    #[test]
    fn box_filter() -> Result<()> {
        #[rustfmt::skip]
        let source = RasterBuffer::new(2, 2, vec![
            0, 10, 100, 255,   4, 20, 100, 255,
            8, 30, 100, 0,     12, 41, 100, 0,
        ])?;

        let half = downsample(&source);
        assert_eq!(half.width(), 1);
        assert_eq!(half.height(), 1);
        assert_eq!(half.pixel(0, 0), [6, 25, 100, 128]);

        Ok(())
    }

    #[test]
    fn odd_edges_clamp() -> Result<()> {
        #[rustfmt::skip]
        let source = RasterBuffer::new(3, 1, vec![
            0, 0, 0, 0,   100, 100, 100, 100,   200, 200, 200, 200,
        ])?;

        let half = downsample(&source);
        assert_eq!((half.width(), half.height()), (1, 1));
        assert_eq!(half.pixel(0, 0), [50, 50, 50, 50]);

        Ok(())
    }

    #[traced_test]
    #[test]
    fn full_chain() {
        let chain = generate_chain(RasterBuffer::filled(256, 256, [9, 8, 7, 6]), None);
        assert_eq!(chain.len(), 9);

        for (index, level) in chain.iter().enumerate() {
            assert_eq!(
                (level.width(), level.height()),
                level_dimensions(256, 256, index)
            );
            assert_eq!(level.pixel(0, 0), [9, 8, 7, 6]);
        }
    }

    #[traced_test]
    #[test]
    fn requested_chain_is_clamped() {
        let base = RasterBuffer::filled(8, 2, [0; 4]);
        assert_eq!(generate_chain(base.clone(), Some(2)).len(), 2);
        assert_eq!(generate_chain(base.clone(), Some(0)).len(), 1);
        assert_eq!(generate_chain(base, Some(40)).len(), 4);
    }

    #[test]
    fn flatten_takes_base_level() -> Result<()> {
        let container = TextureContainer {
            layout: HeaderLayout::Current,
            platform: 12,
            pixel_format: PixelFormat::Rgba,
            texture_type: 2,
            flags: 0,
            mips: vec![
                MipLevel {
                    width: 2,
                    height: 2,
                    data: vec![1; 16],
                },
                MipLevel {
                    width: 1,
                    height: 1,
                    data: vec![2; 4],
                },
            ],
        };

        let decoded = vec![
            RasterBuffer::filled(2, 2, [1; 4]),
            RasterBuffer::filled(1, 1, [2; 4]),
        ];
        assert_eq!(
            flatten(&container, decoded)?,
            RasterBuffer::filled(2, 2, [1; 4])
        );

        assert!(matches!(
            flatten(&container, vec![]),
            Err(Error::CorruptData(CorruptDataError::NoLevels))
        ));

        Ok(())
    }
}

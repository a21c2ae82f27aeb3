//! Types for reading KTEX files
//!

use binrw::BinRead;
use std::io::{Cursor, Read, Seek, SeekFrom};
use tracing::{debug, instrument, warn};

use crate::{
    container::{MipLevel, TextureContainer},
    error::{CorruptDataError, Error, Result},
    pixel::PixelFormat,
    types::{HeaderLayout, KtexHeader, MipEntry},
};

impl TextureContainer {
    /// Parse a KTEX file held in memory
    ///
    /// ```no_run
    /// fn describe(path: &std::path::Path) -> klei_ktex::error::Result<()> {
    ///     let texture = klei_ktex::TextureContainer::from_bytes(&std::fs::read(path)?)?;
    ///
    ///     println!("{}x{} {}", texture.width(), texture.height(), texture.pixel_format);
    ///     for mip in &texture.mips {
    ///         println!("  {:?}", mip);
    ///     }
    ///
    ///     Ok(())
    /// }
    /// ```
    #[instrument(skip_all, fields(size = bytes.len()), err)]
    pub fn from_bytes(bytes: &[u8]) -> Result<TextureContainer> {
        Self::read(Cursor::new(bytes))
    }

    /// Read a KTEX file, collecting every mip level it contains.
    pub fn read<R: Read + Seek>(mut reader: R) -> Result<TextureContainer> {
        let header = KtexHeader::read(&mut reader)?;
        let layout = HeaderLayout::detect(header.packed)?;
        let fields = layout.unpack(header.packed);
        let pixel_format = PixelFormat::try_from(fields.pixel_format)?;

        debug!(?layout, ?fields, "read header");

        let entries = (0..fields.mip_count)
            .map(|_| MipEntry::read(&mut reader).map_err(Error::from))
            .collect::<Result<Vec<_>>>()?;

        let mips = Self::read_payload(&mut reader, &entries)?;

        for (index, (entry, mip)) in entries.iter().zip(&mips).enumerate() {
            let expected = pixel_format.pitch(mip.width);
            if entry.pitch as usize != expected {
                warn!(index, pitch = entry.pitch, expected, "unexpected pitch");
            }
        }

        let texture = TextureContainer {
            layout,
            platform: fields.platform,
            pixel_format,
            texture_type: fields.texture_type,
            flags: fields.flags,
            mips,
        };
        texture.validate()?;

        Ok(texture)
    }

    fn read_payload<R: Read + Seek>(reader: &mut R, entries: &[MipEntry]) -> Result<Vec<MipLevel>> {
        let start = reader.stream_position()?;
        let end = reader.seek(SeekFrom::End(0))?;
        reader.seek(SeekFrom::Start(start))?;

        let available = end.saturating_sub(start);
        let declared: u64 = entries.iter().map(|e| e.data_size as u64).sum();
        if declared > available {
            return Err(CorruptDataError::PayloadTruncated {
                declared,
                available,
            }
            .into());
        }
        if declared < available {
            debug!(trailing = available - declared, "ignoring trailing bytes");
        }

        entries
            .iter()
            .map(|entry| {
                let mut data = vec![0u8; entry.data_size as usize];
                reader.read_exact(&mut data)?;
                Ok(MipLevel {
                    width: entry.width as u32,
                    height: entry.height as u32,
                    data,
                })
            })
            .collect()
    }
}

//! Error types that can be emitted from this library

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// file is not a ktex file this library understands
    #[error("file is an invalid ktex file")]
    #[diagnostic(code(klei_ktex::format))]
    Format(#[from] FormatError),

    /// pixel format code {0} is not supported
    #[error("pixel format code {0} is not supported")]
    #[diagnostic(
        code(klei_ktex::unsupported_pixel_format),
        help("supported codes are 0 (DXT1), 1 (DXT3), 2 (DXT5), 4 (RGBA) and 5 (RGB)")
    )]
    UnsupportedPixelFormat(u32),

    /// declared sizes are inconsistent with the data
    #[error("texture data is corrupt")]
    #[diagnostic(code(klei_ktex::corrupt_data))]
    CorruptData(#[from] CorruptDataError),

    /// Transparent warpper for [`image::ImageError`]
    #[error(transparent)]
    #[diagnostic(code(klei_ktex::encoding))]
    EncodingError(#[from] image::ImageError),

    /// no file with the extension was found in the directory
    #[error("no .{extension} files found in {}", directory.display())]
    #[diagnostic(code(klei_ktex::no_matching_files))]
    NoMatchingFiles {
        directory: PathBuf,
        extension: &'static str,
    },

    /// Transparent warpper for [`tempfile::PersistError`]
    #[error(transparent)]
    #[diagnostic(code(klei_ktex::persist))]
    PersistError(#[from] tempfile::PersistError),
}

/// Error type to provide further information when a file is structurally invalid
#[derive(Error, Diagnostic, Debug)]
pub enum FormatError {
    /// magic bytes did not read "KTEX"
    #[error("bad magic, expected \"KTEX\"")]
    BadMagic,

    /// header word {0:#010X} does not match a known layout
    #[error("header word {0:#010X} does not match a known layout")]
    UnsupportedVersion(u32),

    /// the buffer ended inside the header or the mip table
    #[error("file ends inside the header or mip table")]
    Truncated,

    /// a header field does not fit in the bits the layout has for it
    #[error("{field} value {value} does not fit in {bits} bits")]
    FieldOverflow {
        field: &'static str,
        value: u32,
        bits: u32,
    },

    /// the image is too large to be described by the mip table
    #[error("{width}x{height} exceeds the largest size a ktex file can describe")]
    DimensionsTooLarge { width: u32, height: u32 },

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(binrw::Error),
}

/// Error type to provide further information when sizes do not add up
#[derive(Error, Diagnostic, Debug)]
pub enum CorruptDataError {
    /// width or height is zero
    #[error("texture has a zero dimension ({width}x{height})")]
    ZeroDimension { width: u32, height: u32 },

    /// mip count is zero or over the maximum for the base size
    #[error("mip count {count} is outside 1..={max}")]
    MipCount { count: usize, max: usize },

    /// a mip level has the wrong dimensions for its index
    #[error("mip {index} is {actual:?}, expected {expected:?}")]
    MipDimensions {
        index: usize,
        actual: (u32, u32),
        expected: (u32, u32),
    },

    /// a mip level has the wrong amount of data for its dimensions
    #[error("mip {index} holds {actual} bytes, expected {expected}")]
    MipSize {
        index: usize,
        actual: usize,
        expected: usize,
    },

    /// level data handed to the pixel codec has the wrong size for its dimensions
    #[error("{width}x{height} level holds {actual} bytes, expected {expected}")]
    LevelSize {
        width: u32,
        height: u32,
        actual: usize,
        expected: usize,
    },

    /// declared mip sizes run past the end of the buffer
    #[error("mip data needs {declared} bytes but only {available} remain")]
    PayloadTruncated { declared: u64, available: u64 },

    /// a raster buffer does not hold width * height * 4 bytes
    #[error("raster of {width}x{height} holds {actual} bytes, expected {expected}")]
    RasterSize {
        width: u32,
        height: u32,
        actual: usize,
        expected: usize,
    },

    /// there was no decoded mip level to work with
    #[error("no mip levels")]
    NoLevels,
}

/// Coarse classification of [`Error`]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// the path could not be read or written
    Io,
    /// bad magic, version or structure
    Format,
    /// pixel format code outside the supported set
    UnsupportedPixelFormat,
    /// declared sizes inconsistent with the actual buffer
    CorruptData,
    /// PNG encode or decode failure
    Encoding,
}

impl Error {
    /// Classify this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::IOError(_) | Error::NoMatchingFiles { .. } | Error::PersistError(_) => {
                ErrorKind::Io
            }
            Error::Format(_) => ErrorKind::Format,
            Error::UnsupportedPixelFormat(_) => ErrorKind::UnsupportedPixelFormat,
            Error::CorruptData(_) => ErrorKind::CorruptData,
            Error::EncodingError(_) => ErrorKind::Encoding,
        }
    }
}

impl From<binrw::Error> for Error {
    fn from(value: binrw::Error) -> Self {
        match value {
            binrw::Error::Backtrace(backtrace) => Error::from(*backtrace.error),
            binrw::Error::BadMagic { .. } => FormatError::BadMagic.into(),
            binrw::Error::Io(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                FormatError::Truncated.into()
            }
            binrw::Error::Io(e) => Error::IOError(e),
            other => FormatError::BinRWError(other).into(),
        }
    }
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;

#[cfg(test)]
mod test {
    use std::{io::Cursor, path::PathBuf};

    use binrw::BinRead;
    use miette::Diagnostic;

    use crate::error::{Error, ErrorKind, FormatError};
    use crate::types::KtexHeader;

    #[test]
    fn bad_magic_is_format_error() {
        let err: Error = KtexHeader::read(&mut Cursor::new(b"KTEY\0\0\0\0"))
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Format(FormatError::BadMagic)));
        assert_eq!(err.kind(), ErrorKind::Format);
    }

    #[test]
    fn short_header_is_truncated() {
        let err: Error = KtexHeader::read(&mut Cursor::new(b"KTEX\0\0"))
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Format(FormatError::Truncated)));
    }

    #[test]
    fn kinds() {
        assert_eq!(
            Error::UnsupportedPixelFormat(3).kind(),
            ErrorKind::UnsupportedPixelFormat
        );
        assert_eq!(
            Error::IOError(std::io::Error::other("gone")).kind(),
            ErrorKind::Io
        );
    }

    #[test]
    fn directory_errors_have_codes() {
        let err = Error::NoMatchingFiles {
            directory: PathBuf::from("textures"),
            extension: "tex",
        };
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("klei_ktex::no_matching_files".to_string())
        );

        let dir = tempfile::tempdir().unwrap();
        let persist = tempfile::NamedTempFile::new_in(dir.path())
            .unwrap()
            .persist(dir.path().join("missing").join("out.tex"))
            .unwrap_err();
        let err = Error::from(persist);
        assert_eq!(
            err.code().map(|c| c.to_string()),
            Some("klei_ktex::persist".to_string())
        );
        assert_eq!(err.kind(), ErrorKind::Io);
    }
}

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Every way classifying or decoding a binary can fail.
///
/// Each failure point of the decoders maps to its own variant so callers can
/// tell a truncated file from a corrupt signature without matching on text.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("file not found: {}", path.display())]
    FileNotFound { path: PathBuf },

    #[error("cannot read {}: {source}", path.display())]
    FileUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("truncated {what}: need {needed} bytes at offset {offset:#x}, file has {available}")]
    TruncatedRead {
        what: &'static str,
        offset: u64,
        needed: u64,
        available: u64,
    },

    #[error("invalid magic bytes")]
    InvalidMagic,

    #[error("invalid NT signature {found:#010x}")]
    InvalidNtSignature { found: u32 },

    #[error("section name string table index {index} out of range ({count} sections)")]
    InvalidStringTableIndex { index: u16, count: u16 },

    #[error("section name offset {offset:#x} outside string table of {len} bytes")]
    StringTableOutOfRange { offset: u32, len: usize },

    #[error("optional header declares {declared} bytes, PE32+ needs at least {required}")]
    OptionalHeaderTooSmall { declared: u16, required: u16 },

    #[error("{what} of {value} exceeds limit of {max}")]
    LimitExceeded {
        what: &'static str,
        value: u64,
        max: u64,
    },

    #[error("unsupported format: {0}")]
    UnsupportedFormat(&'static str),
}

impl DecodeError {
    /// Maps an error from opening `path` onto the not-found / unreadable split.
    pub(crate) fn open(path: impl Into<PathBuf>, source: io::Error) -> Self {
        let path = path.into();
        if source.kind() == io::ErrorKind::NotFound {
            DecodeError::FileNotFound { path }
        } else {
            DecodeError::FileUnreadable { path, source }
        }
    }
}

pub type Result<T> = std::result::Result<T, DecodeError>;

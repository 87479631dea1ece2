use std::fmt;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;

use goblin::elf::header::{ELFMAG, SELFMAG};
use goblin::pe::header::DOS_MAGIC;

use crate::error::{DecodeError, Result};

/// Number of leading bytes inspected by [`classify`].
pub const SNIFF_LEN: usize = 4;

/// Executable format family, decided from the first bytes of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryKind {
    Elf,
    Pe,
    Unknown,
}

impl BinaryKind {
    pub fn name(self) -> &'static str {
        match self {
            BinaryKind::Elf => "ELF",
            BinaryKind::Pe => "PE",
            BinaryKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for BinaryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Classifies the file at `path`.
///
/// A file that cannot be opened is reported as `Unknown`, same as one with an
/// unrecognised prefix. Use [`sniff`] if the two must be told apart.
pub fn classify<P: AsRef<Path>>(path: P) -> BinaryKind {
    match File::open(path.as_ref()) {
        Ok(file) => classify_reader(file),
        Err(err) => {
            log::debug!("cannot open {}: {err}", path.as_ref().display());
            BinaryKind::Unknown
        }
    }
}

/// Like [`classify`], but open and read failures are errors instead of `Unknown`.
///
/// Only a file shorter than [`SNIFF_LEN`] bytes still classifies as `Unknown`.
pub fn sniff<P: AsRef<Path>>(path: P) -> Result<BinaryKind> {
    let path = path.as_ref();
    let mut file = File::open(path).map_err(|e| DecodeError::open(path, e))?;
    sniff_reader(&mut file).map_err(|source| DecodeError::FileUnreadable {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the magic bytes from `reader`. Running out of input is `Unknown`,
/// any other read failure is returned.
pub fn sniff_reader<R: Read>(mut reader: R) -> io::Result<BinaryKind> {
    let mut magic = [0u8; SNIFF_LEN];
    match reader.read_exact(&mut magic) {
        Ok(()) => Ok(classify_bytes(&magic)),
        Err(err) if err.kind() == io::ErrorKind::UnexpectedEof => Ok(BinaryKind::Unknown),
        Err(err) => Err(err),
    }
}

/// Classifies whatever `reader` yields first. Fewer than [`SNIFF_LEN`] bytes is `Unknown`.
pub fn classify_reader<R: Read>(reader: R) -> BinaryKind {
    sniff_reader(reader).unwrap_or(BinaryKind::Unknown)
}

pub fn classify_bytes(bytes: &[u8]) -> BinaryKind {
    if bytes.len() < SNIFF_LEN {
        return BinaryKind::Unknown;
    }
    if bytes[..SELFMAG] == ELFMAG[..] {
        BinaryKind::Elf
    } else if bytes[..2] == DOS_MAGIC.to_le_bytes() {
        BinaryKind::Pe
    } else {
        BinaryKind::Unknown
    }
}

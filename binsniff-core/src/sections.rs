use crate::error::{DecodeError, Result};

/// One row of a section header table, in on-disk order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionRecord {
    pub name: String,
    /// Name bytes as stored: the NUL-delimited string table slice for ELF,
    /// the whole fixed 8-byte field for PE.
    pub raw_name: Vec<u8>,
    /// Virtual address (ELF) or RVA (PE).
    pub address: u64,
    /// `sh_size` for ELF, `VirtualSize` for PE.
    pub size: u64,
    pub file_offset: u64,
    /// Raw size on disk. Equal to `size` for ELF.
    pub file_size: u64,
    /// `sh_flags` for ELF, `Characteristics` for PE.
    pub flags: u64,
}

/// Resolves the NUL-terminated string starting at `offset` in `strtab`.
///
/// A string missing its terminator runs to the end of the table. An offset
/// equal to the table length names the empty string.
pub fn name_from_strtab(strtab: &[u8], offset: u32) -> Result<&[u8]> {
    let start = offset as usize;
    if start > strtab.len() {
        return Err(DecodeError::StringTableOutOfRange {
            offset,
            len: strtab.len(),
        });
    }
    let tail = &strtab[start..];
    match tail.iter().position(|&b| b == 0) {
        Some(end) => Ok(&tail[..end]),
        None => {
            if !tail.is_empty() {
                log::warn!("section name at {offset:#x} is not NUL-terminated");
            }
            Ok(tail)
        }
    }
}

/// Renders name bytes as text, trimming the NUL padding of fixed-width fields.
pub fn display_name(raw: &[u8]) -> String {
    let end = raw
        .iter()
        .rposition(|&b| b != 0)
        .map(|pos| pos + 1)
        .unwrap_or(0);
    String::from_utf8_lossy(&raw[..end]).into_owned()
}

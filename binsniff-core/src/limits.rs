use crate::error::{DecodeError, Result};

/// Resource caps applied while decoding untrusted input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    /// Largest section header count accepted from a file header.
    pub max_sections: u16,
    /// Largest ELF section name string table read into memory, in bytes.
    pub max_string_table: u64,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            // 0xff00 is SHN_LORESERVE; counts at or above it mean extended numbering in ELF
            max_sections: 0xff00,
            max_string_table: 16 * 1024 * 1024,
        }
    }
}

impl Limits {
    pub(crate) fn check_sections(&self, count: u16) -> Result<()> {
        if count > self.max_sections {
            return Err(DecodeError::LimitExceeded {
                what: "section count",
                value: count.into(),
                max: self.max_sections.into(),
            });
        }
        Ok(())
    }

    pub(crate) fn check_string_table(&self, size: u64) -> Result<()> {
        if size > self.max_string_table {
            return Err(DecodeError::LimitExceeded {
                what: "string table size",
                value: size,
                max: self.max_string_table,
            });
        }
        Ok(())
    }
}

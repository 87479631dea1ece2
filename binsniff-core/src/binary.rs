use crate::elf::{decode_elf_with, ElfReport};
use crate::error::{DecodeError, Result};
use crate::header::Header;
use crate::kind::{sniff, BinaryKind};
use crate::limits::Limits;
use crate::pe::{decode_pe_with, PeReport};
use crate::sections::SectionRecord;
use std::path::Path;

/// A classified and fully decoded executable.
#[derive(Debug, Clone)]
pub enum Binary {
    Elf(ElfReport),
    Pe(PeReport),
}

impl Binary {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with(path, &Limits::default())
    }

    /// Classifies `path` and runs the matching decoder.
    pub fn open_with<P: AsRef<Path>>(path: P, limits: &Limits) -> Result<Self> {
        let path = path.as_ref();
        let kind = sniff(path)?;
        log::info!("{} classified as {kind}", path.display());

        match kind {
            BinaryKind::Elf => Ok(Binary::Elf(decode_elf_with(path, limits)?)),
            BinaryKind::Pe => Ok(Binary::Pe(decode_pe_with(path, limits)?)),
            BinaryKind::Unknown => Err(DecodeError::UnsupportedFormat(
                "not an ELF or PE executable",
            )),
        }
    }

    pub fn kind(&self) -> BinaryKind {
        match self {
            Binary::Elf(_) => BinaryKind::Elf,
            Binary::Pe(_) => BinaryKind::Pe,
        }
    }

    pub fn header(&self) -> &dyn Header {
        match self {
            Binary::Elf(elf) => &elf.header,
            Binary::Pe(pe) => &pe.headers,
        }
    }

    pub fn sections(&self) -> &[SectionRecord] {
        match self {
            Binary::Elf(elf) => &elf.sections,
            Binary::Pe(pe) => &pe.sections,
        }
    }
}

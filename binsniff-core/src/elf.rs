use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use byteorder::{ByteOrder, BE, LE};
use goblin::elf::header::{
    EI_CLASS, EI_DATA, ELFCLASS64, ELFDATA2LSB, ELFDATA2MSB, ELFMAG, SELFMAG,
};

use crate::error::{DecodeError, Result};
use crate::header::elf::{Elf64Ehdr, Elf64Shdr, EHDR_SIZE, SHDR_SIZE};
use crate::limits::Limits;
use crate::sections::{display_name, name_from_strtab, SectionRecord};
use crate::source::Source;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Little,
    Big,
}

/// Decoded ELF64 file header and section table.
#[derive(Debug, Clone)]
pub struct ElfReport {
    pub header: Elf64Ehdr,
    pub endian: Endian,
    /// Raw section headers, parallel to `sections`.
    pub section_headers: Vec<Elf64Shdr>,
    pub sections: Vec<SectionRecord>,
}

impl ElfReport {
    pub fn entry_point(&self) -> u64 {
        self.header.e_entry
    }

    pub fn program_header_count(&self) -> u16 {
        self.header.e_phnum
    }

    pub fn section_header_count(&self) -> u16 {
        self.header.e_shnum
    }
}

pub fn decode_elf<P: AsRef<Path>>(path: P) -> Result<ElfReport> {
    decode_elf_with(path, &Limits::default())
}

pub fn decode_elf_with<P: AsRef<Path>>(path: P, limits: &Limits) -> Result<ElfReport> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| DecodeError::open(path, e))?;
    log::debug!("decoding {} as ELF", path.display());
    decode_elf_from(BufReader::new(file), limits)
}

/// Decodes an ELF64 image from any seekable source.
pub fn decode_elf_from<R: Read + Seek>(reader: R, limits: &Limits) -> Result<ElfReport> {
    let mut src = Source::new(reader)?;

    let mut e_ident = [0u8; 16];
    src.at(0, e_ident.len() as u64, "ELF identification")?
        .read_exact(&mut e_ident)?;
    if e_ident[..SELFMAG] != ELFMAG[..] {
        return Err(DecodeError::InvalidMagic);
    }
    if e_ident[EI_CLASS] != ELFCLASS64 {
        return Err(DecodeError::UnsupportedFormat("only 64-bit ELF is supported"));
    }

    match e_ident[EI_DATA] {
        ELFDATA2LSB => decode_tables::<R, LE>(&mut src, e_ident, Endian::Little, limits),
        ELFDATA2MSB => decode_tables::<R, BE>(&mut src, e_ident, Endian::Big, limits),
        _ => Err(DecodeError::UnsupportedFormat("unknown ELF data encoding")),
    }
}

fn decode_tables<R: Read + Seek, E: ByteOrder>(
    src: &mut Source<R>,
    e_ident: [u8; 16],
    endian: Endian,
    limits: &Limits,
) -> Result<ElfReport> {
    let body = src.at(e_ident.len() as u64, EHDR_SIZE - e_ident.len() as u64, "ELF header")?;
    let header = Elf64Ehdr::from_reader::<_, E>(e_ident, body)?;
    log::debug!(
        "entry {:#x}, {} program headers, {} section headers at {:#x}, shstrndx {}",
        header.e_entry,
        header.e_phnum,
        header.e_shnum,
        header.e_shoff,
        header.e_shstrndx
    );

    if header.e_shstrndx >= header.e_shnum {
        return Err(DecodeError::InvalidStringTableIndex {
            index: header.e_shstrndx,
            count: header.e_shnum,
        });
    }
    limits.check_sections(header.e_shnum)?;

    let table_len = u64::from(header.e_shnum) * SHDR_SIZE;
    let table = src.at(header.e_shoff, table_len, "section header table")?;
    let mut section_headers = Vec::with_capacity(header.e_shnum.into());
    for _ in 0..header.e_shnum {
        section_headers.push(Elf64Shdr::from_reader::<_, E>(table)?);
    }

    let shstrtab = section_headers[usize::from(header.e_shstrndx)];
    limits.check_string_table(shstrtab.sh_size)?;
    let strtab = src.read_vec(
        shstrtab.sh_offset,
        shstrtab.sh_size,
        "section name string table",
    )?;

    let sections = section_headers
        .iter()
        .map(|sh| {
            let raw = name_from_strtab(&strtab, sh.sh_name)?;
            Ok(SectionRecord {
                name: display_name(raw),
                raw_name: raw.to_vec(),
                address: sh.sh_addr,
                size: sh.sh_size,
                file_offset: sh.sh_offset,
                file_size: sh.sh_size,
                flags: sh.sh_flags,
            })
        })
        .collect::<Result<Vec<_>>>()?;

    log::info!("decoded {} ELF sections", sections.len());
    Ok(ElfReport {
        header,
        endian,
        section_headers,
        sections,
    })
}

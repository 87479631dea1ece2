use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;

use byteorder::{ReadBytesExt, LE};
use goblin::pe::header::PE_MAGIC;
use goblin::pe::optional_header::MAGIC_64;

use crate::error::{DecodeError, Result};
use crate::header::pe::{
    CoffHeader, DosHeader, OptionalHeader64, PeHeaders, PeSectionHeader, COFF_HEADER_SIZE,
    DOS_HEADER_SIZE, NT_SIGNATURE_SIZE, OPTIONAL_HEADER64_SIZE, SECTION_HEADER_SIZE,
};
use crate::limits::Limits;
use crate::sections::{display_name, SectionRecord};
use crate::source::Source;

/// Decoded PE32+ headers and section table.
#[derive(Debug, Clone)]
pub struct PeReport {
    pub headers: PeHeaders,
    pub section_headers: Vec<PeSectionHeader>,
    pub sections: Vec<SectionRecord>,
}

impl PeReport {
    pub fn machine(&self) -> u16 {
        self.headers.coff.machine
    }

    pub fn section_count(&self) -> u16 {
        self.headers.coff.number_of_sections
    }

    pub fn entry_point_rva(&self) -> u32 {
        self.headers.optional.address_of_entry_point
    }

    pub fn image_base(&self) -> u64 {
        self.headers.optional.image_base
    }

    pub fn subsystem(&self) -> u16 {
        self.headers.optional.subsystem
    }

    pub fn image_size(&self) -> u32 {
        self.headers.optional.size_of_image
    }

    pub fn section_table_offset(&self) -> u64 {
        self.headers.section_table_offset()
    }
}

pub fn decode_pe<P: AsRef<Path>>(path: P) -> Result<PeReport> {
    decode_pe_with(path, &Limits::default())
}

pub fn decode_pe_with<P: AsRef<Path>>(path: P, limits: &Limits) -> Result<PeReport> {
    let path = path.as_ref();
    let file = File::open(path).map_err(|e| DecodeError::open(path, e))?;
    log::debug!("decoding {} as PE", path.display());
    decode_pe_from(BufReader::new(file), limits)
}

/// Decodes a PE32+ image from any seekable source.
pub fn decode_pe_from<R: Read + Seek>(reader: R, limits: &Limits) -> Result<PeReport> {
    let mut src = Source::new(reader)?;

    let dos = DosHeader::from_reader(src.at(0, DOS_HEADER_SIZE, "DOS header")?)?;
    if !dos.has_magic() {
        return Err(DecodeError::InvalidMagic);
    }

    let nt_offset = u64::from(dos.e_lfanew);
    let signature = src
        .at(nt_offset, NT_SIGNATURE_SIZE, "NT signature")?
        .read_u32::<LE>()?;
    if signature != PE_MAGIC {
        return Err(DecodeError::InvalidNtSignature { found: signature });
    }

    let coff_offset = nt_offset + NT_SIGNATURE_SIZE;
    let coff = CoffHeader::from_reader(src.at(coff_offset, COFF_HEADER_SIZE, "COFF header")?)?;
    log::debug!(
        "machine {:#x}, {} sections, optional header {} bytes",
        coff.machine,
        coff.number_of_sections,
        coff.size_of_optional_header
    );

    let opt_offset = coff_offset + COFF_HEADER_SIZE;
    let opt = src.at(opt_offset, 2, "optional header")?;
    let magic = opt.read_u16::<LE>()?;
    if magic != MAGIC_64 {
        return Err(DecodeError::UnsupportedFormat("only PE32+ images are supported"));
    }
    if coff.size_of_optional_header < OPTIONAL_HEADER64_SIZE {
        return Err(DecodeError::OptionalHeaderTooSmall {
            declared: coff.size_of_optional_header,
            required: OPTIONAL_HEADER64_SIZE,
        });
    }
    let rest = src.at(
        opt_offset + 2,
        u64::from(OPTIONAL_HEADER64_SIZE) - 2,
        "optional header",
    )?;
    let optional = OptionalHeader64::from_reader(magic, rest)?;

    let headers = PeHeaders {
        dos,
        coff,
        optional,
    };

    limits.check_sections(coff.number_of_sections)?;
    let table_offset = headers.section_table_offset();
    let table_len = u64::from(coff.number_of_sections) * SECTION_HEADER_SIZE;
    let table = src.at(table_offset, table_len, "section table")?;
    let mut section_headers = Vec::with_capacity(coff.number_of_sections.into());
    for _ in 0..coff.number_of_sections {
        section_headers.push(PeSectionHeader::from_reader(table)?);
    }
    if section_headers.is_empty() {
        log::warn!("PE image declares no sections");
    }

    let sections = section_headers
        .iter()
        .map(|sh| SectionRecord {
            name: display_name(&sh.name),
            raw_name: sh.name.to_vec(),
            address: sh.virtual_address.into(),
            size: sh.virtual_size.into(),
            file_offset: sh.pointer_to_raw_data.into(),
            file_size: sh.size_of_raw_data.into(),
            flags: sh.characteristics.into(),
        })
        .collect::<Vec<_>>();

    log::info!(
        "decoded {} PE sections from table at {:#x}",
        sections.len(),
        table_offset
    );
    Ok(PeReport {
        headers,
        section_headers,
        sections,
    })
}

use std::fmt::{self, Write};
use std::path::Path;

use anyhow::Result;
use binsniff_core::{Binary, BinaryKind, ElfReport, Endian, Header, PeReport, SectionRecord};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

pub fn header_text(bin: &Binary) -> String {
    let mut out = String::new();
    let header = bin.header();
    let role = if header.is_executable() {
        "executable"
    } else {
        "not executable"
    };
    // writing into a String cannot fail
    let _ = writeln!(out, "Format: {} ({role})", header.format_name());
    let _ = match bin {
        Binary::Elf(elf) => write_elf_header(&mut out, elf),
        Binary::Pe(pe) => write_pe_header(&mut out, pe),
    };
    out
}

fn write_elf_header(out: &mut String, elf: &ElfReport) -> fmt::Result {
    writeln!(out, "ELF Metadata:")?;
    writeln!(out, "- Machine: {}", elf.header.machine_name())?;
    writeln!(out, "- Entry point: 0x{:x}", elf.entry_point())?;
    writeln!(out, "- Number of program headers: {}", elf.program_header_count())?;
    writeln!(out, "- Number of section headers: {}", elf.section_header_count())
}

fn write_pe_header(out: &mut String, pe: &PeReport) -> fmt::Result {
    writeln!(out, "PE Metadata:")?;
    writeln!(out, "- Machine: 0x{:x} ({})", pe.machine(), pe.headers.machine_name())?;
    writeln!(out, "- Sections: {}", pe.section_count())?;
    writeln!(out, "- Entry point RVA: 0x{:x}", pe.entry_point_rva())?;
    writeln!(out, "- Image base: 0x{:x}", pe.image_base())?;
    writeln!(out, "- Subsystem: {}", pe.subsystem())?;
    writeln!(out, "- Size of image: 0x{:x}", pe.image_size())
}

#[derive(Tabled)]
struct SectionRow {
    #[tabled(rename = "Section")]
    name: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Address")]
    address: String,
    #[tabled(rename = "Size")]
    size: String,
    #[tabled(rename = "Offset")]
    offset: String,
    #[tabled(rename = "Flags")]
    flags: String,
}

fn section_rows(bin: &Binary) -> Vec<SectionRow> {
    let kinds: Vec<String> = match bin {
        Binary::Elf(elf) => elf
            .section_headers
            .iter()
            .map(|sh| sh.type_name().to_string())
            .collect(),
        Binary::Pe(pe) => vec![String::new(); pe.sections.len()],
    };
    bin.sections()
        .iter()
        .zip(kinds)
        .map(|(s, kind)| SectionRow {
            name: s.name.clone(),
            kind,
            address: format!("0x{:x}", s.address),
            size: format!("0x{:x}", s.size),
            offset: format!("0x{:x}", s.file_offset),
            flags: format!("0x{:x}", s.flags),
        })
        .collect()
}

pub fn sections_text(bin: &Binary) -> String {
    if bin.sections().is_empty() {
        return "No sections found (possibly stripped binary).\n".to_string();
    }
    let mut table = Table::new(section_rows(bin));
    table.with(Style::psql());
    format!("Sections:\n{table}\n")
}

#[derive(Serialize)]
struct KindJson<'a> {
    path: &'a Path,
    format: &'static str,
}

pub fn kind_json(path: &Path, kind: BinaryKind) -> Result<String> {
    Ok(serde_json::to_string_pretty(&KindJson {
        path,
        format: kind.name(),
    })?)
}

#[derive(Serialize)]
#[serde(tag = "format")]
enum SummaryJson {
    #[serde(rename = "ELF")]
    Elf {
        entry_point: u64,
        machine: u16,
        endian: &'static str,
        program_headers: u16,
        section_headers: u16,
    },
    #[serde(rename = "PE")]
    Pe {
        machine: u16,
        sections: u16,
        entry_point_rva: u32,
        image_base: u64,
        subsystem: u16,
        size_of_image: u32,
    },
}

#[derive(Serialize)]
struct SectionJson<'a> {
    name: &'a str,
    address: u64,
    size: u64,
    file_offset: u64,
    file_size: u64,
    flags: u64,
}

impl<'a> From<&'a SectionRecord> for SectionJson<'a> {
    fn from(s: &'a SectionRecord) -> Self {
        Self {
            name: &s.name,
            address: s.address,
            size: s.size,
            file_offset: s.file_offset,
            file_size: s.file_size,
            flags: s.flags,
        }
    }
}

#[derive(Serialize)]
struct BinaryJson<'a> {
    path: &'a Path,
    #[serde(flatten)]
    summary: SummaryJson,
    executable: bool,
    sections: Vec<SectionJson<'a>>,
}

fn summary(bin: &Binary) -> SummaryJson {
    match bin {
        Binary::Elf(elf) => SummaryJson::Elf {
            entry_point: elf.entry_point(),
            machine: elf.header.e_machine,
            endian: match elf.endian {
                Endian::Little => "little",
                Endian::Big => "big",
            },
            program_headers: elf.program_header_count(),
            section_headers: elf.section_header_count(),
        },
        Binary::Pe(pe) => SummaryJson::Pe {
            machine: pe.machine(),
            sections: pe.section_count(),
            entry_point_rva: pe.entry_point_rva(),
            image_base: pe.image_base(),
            subsystem: pe.subsystem(),
            size_of_image: pe.image_size(),
        },
    }
}

pub fn binary_json(path: &Path, bin: &Binary) -> Result<String> {
    let report = BinaryJson {
        path,
        summary: summary(bin),
        executable: bin.header().is_executable(),
        sections: bin.sections().iter().map(SectionJson::from).collect(),
    };
    Ok(serde_json::to_string_pretty(&report)?)
}

//! PE/COFF header layouts, decoded little-endian field by field.
//!
//! Only the PE32+ optional header is understood.

use crate::header::Header;
use byteorder::{ReadBytesExt, LE};
use goblin::pe::header::{COFF_MACHINE_X86, COFF_MACHINE_X86_64, DOS_MAGIC, PE_POINTER_OFFSET};
use std::io;

/// The DOS stub header occupies the first 64 bytes of every PE image.
pub const DOS_HEADER_SIZE: u64 = 64;

pub const COFF_HEADER_SIZE: u64 = goblin::pe::header::SIZEOF_COFF_HEADER as u64;

/// `PE\0\0` signature preceding the COFF header.
pub const NT_SIGNATURE_SIZE: u64 = 4;

/// Bytes of the PE32+ optional header up to and including `NumberOfRvaAndSizes`.
/// Data directories follow and are not decoded.
pub const OPTIONAL_HEADER64_SIZE: u16 = 112;

pub const SECTION_HEADER_SIZE: u64 = goblin::pe::section_table::SIZEOF_SECTION_TABLE as u64;

const IMAGE_FILE_EXECUTABLE_IMAGE: u16 = 0x0002;
const IMAGE_FILE_DLL: u16 = 0x2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DosHeader {
    /// `MZ`, read as a little-endian u16.
    pub e_magic: u16,
    /// File offset of the `PE\0\0` signature.
    pub e_lfanew: u32,
}

impl DosHeader {
    /// Reads `e_magic` and `e_lfanew` from a reader positioned at the start of
    /// the DOS header, consuming all [`DOS_HEADER_SIZE`] bytes.
    pub fn from_reader<R: io::Read>(cur: &mut R) -> io::Result<DosHeader> {
        let mut raw = [0u8; DOS_HEADER_SIZE as usize];
        cur.read_exact(&mut raw)?;
        let lfanew_at = PE_POINTER_OFFSET as usize;
        let mut lfanew = &raw[lfanew_at..lfanew_at + 4];
        Ok(DosHeader {
            e_magic: u16::from_le_bytes([raw[0], raw[1]]),
            e_lfanew: lfanew.read_u32::<LE>()?,
        })
    }

    pub fn has_magic(&self) -> bool {
        self.e_magic == DOS_MAGIC
    }
}

/// `IMAGE_FILE_HEADER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CoffHeader {
    pub machine: u16,
    pub number_of_sections: u16,
    pub time_date_stamp: u32,
    pub pointer_to_symbol_table: u32,
    pub number_of_symbols: u32,
    /// Declared size of the optional header. The section table starts this many
    /// bytes after the end of the COFF header, padding included.
    pub size_of_optional_header: u16,
    pub characteristics: u16,
}

impl CoffHeader {
    pub fn from_reader<R: io::Read>(cur: &mut R) -> io::Result<CoffHeader> {
        Ok(CoffHeader {
            machine: cur.read_u16::<LE>()?,
            number_of_sections: cur.read_u16::<LE>()?,
            time_date_stamp: cur.read_u32::<LE>()?,
            pointer_to_symbol_table: cur.read_u32::<LE>()?,
            number_of_symbols: cur.read_u32::<LE>()?,
            size_of_optional_header: cur.read_u16::<LE>()?,
            characteristics: cur.read_u16::<LE>()?,
        })
    }
}

/// `IMAGE_OPTIONAL_HEADER64` without its data directory array.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OptionalHeader64 {
    /// `0x20b` for PE32+.
    pub magic: u16,
    pub major_linker_version: u8,
    pub minor_linker_version: u8,
    pub size_of_code: u32,
    pub size_of_initialized_data: u32,
    pub size_of_uninitialized_data: u32,
    pub address_of_entry_point: u32,
    pub base_of_code: u32,
    pub image_base: u64,
    pub section_alignment: u32,
    pub file_alignment: u32,
    pub major_operating_system_version: u16,
    pub minor_operating_system_version: u16,
    pub major_image_version: u16,
    pub minor_image_version: u16,
    pub major_subsystem_version: u16,
    pub minor_subsystem_version: u16,
    pub win32_version_value: u32,
    pub size_of_image: u32,
    pub size_of_headers: u32,
    pub check_sum: u32,
    pub subsystem: u16,
    pub dll_characteristics: u16,
    pub size_of_stack_reserve: u64,
    pub size_of_stack_commit: u64,
    pub size_of_heap_reserve: u64,
    pub size_of_heap_commit: u64,
    pub loader_flags: u32,
    pub number_of_rva_and_sizes: u32,
}

impl OptionalHeader64 {
    /// Decodes the fields after `magic`, which the caller reads first to reject PE32.
    pub fn from_reader<R: io::Read>(magic: u16, cur: &mut R) -> io::Result<OptionalHeader64> {
        Ok(OptionalHeader64 {
            magic,
            major_linker_version: cur.read_u8()?,
            minor_linker_version: cur.read_u8()?,
            size_of_code: cur.read_u32::<LE>()?,
            size_of_initialized_data: cur.read_u32::<LE>()?,
            size_of_uninitialized_data: cur.read_u32::<LE>()?,
            address_of_entry_point: cur.read_u32::<LE>()?,
            base_of_code: cur.read_u32::<LE>()?,
            image_base: cur.read_u64::<LE>()?,
            section_alignment: cur.read_u32::<LE>()?,
            file_alignment: cur.read_u32::<LE>()?,
            major_operating_system_version: cur.read_u16::<LE>()?,
            minor_operating_system_version: cur.read_u16::<LE>()?,
            major_image_version: cur.read_u16::<LE>()?,
            minor_image_version: cur.read_u16::<LE>()?,
            major_subsystem_version: cur.read_u16::<LE>()?,
            minor_subsystem_version: cur.read_u16::<LE>()?,
            win32_version_value: cur.read_u32::<LE>()?,
            size_of_image: cur.read_u32::<LE>()?,
            size_of_headers: cur.read_u32::<LE>()?,
            check_sum: cur.read_u32::<LE>()?,
            subsystem: cur.read_u16::<LE>()?,
            dll_characteristics: cur.read_u16::<LE>()?,
            size_of_stack_reserve: cur.read_u64::<LE>()?,
            size_of_stack_commit: cur.read_u64::<LE>()?,
            size_of_heap_reserve: cur.read_u64::<LE>()?,
            size_of_heap_commit: cur.read_u64::<LE>()?,
            loader_flags: cur.read_u32::<LE>()?,
            number_of_rva_and_sizes: cur.read_u32::<LE>()?,
        })
    }
}

/// `IMAGE_SECTION_HEADER`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeSectionHeader {
    /// Fixed 8-byte name, NUL padded. A name of exactly 8 bytes has no terminator.
    pub name: [u8; 8],
    /// `Misc.VirtualSize`.
    pub virtual_size: u32,
    pub virtual_address: u32,
    pub size_of_raw_data: u32,
    pub pointer_to_raw_data: u32,
    pub pointer_to_relocations: u32,
    pub pointer_to_linenumbers: u32,
    pub number_of_relocations: u16,
    pub number_of_linenumbers: u16,
    pub characteristics: u32,
}

impl PeSectionHeader {
    pub fn from_reader<R: io::Read>(cur: &mut R) -> io::Result<PeSectionHeader> {
        let mut name = [0u8; 8];
        cur.read_exact(&mut name)?;
        Ok(PeSectionHeader {
            name,
            virtual_size: cur.read_u32::<LE>()?,
            virtual_address: cur.read_u32::<LE>()?,
            size_of_raw_data: cur.read_u32::<LE>()?,
            pointer_to_raw_data: cur.read_u32::<LE>()?,
            pointer_to_relocations: cur.read_u32::<LE>()?,
            pointer_to_linenumbers: cur.read_u32::<LE>()?,
            number_of_relocations: cur.read_u16::<LE>()?,
            number_of_linenumbers: cur.read_u16::<LE>()?,
            characteristics: cur.read_u32::<LE>()?,
        })
    }
}

/// The decoded NT headers plus where they were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeHeaders {
    pub dos: DosHeader,
    pub coff: CoffHeader,
    pub optional: OptionalHeader64,
}

impl PeHeaders {
    /// File offset of the first section header: the end of the COFF header plus
    /// the *declared* optional header size.
    pub fn section_table_offset(&self) -> u64 {
        u64::from(self.dos.e_lfanew)
            + NT_SIGNATURE_SIZE
            + COFF_HEADER_SIZE
            + u64::from(self.coff.size_of_optional_header)
    }
}

impl Header for PeHeaders {
    fn entry_point(&self) -> u64 {
        u64::from(self.optional.address_of_entry_point)
    }

    fn machine(&self) -> u16 {
        self.coff.machine
    }

    fn machine_name(&self) -> &'static str {
        match self.coff.machine {
            COFF_MACHINE_X86_64 => "X86_64",
            COFF_MACHINE_X86 => "X86",
            0xaa64 => "ARM64",
            0x01c4 => "ARMNT",
            0x5064 => "RISCV64",
            _ => "UNKNOWN",
        }
    }

    fn format_name(&self) -> &'static str {
        "PE"
    }

    fn is_executable(&self) -> bool {
        self.coff.characteristics & IMAGE_FILE_EXECUTABLE_IMAGE != 0
            && self.coff.characteristics & IMAGE_FILE_DLL == 0
    }
}

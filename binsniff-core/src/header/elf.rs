use crate::header::Header;
use byteorder::{ByteOrder, ReadBytesExt};
use goblin::elf::header::{machine_to_str, ELFMAG, ET_DYN, ET_EXEC, SELFMAG};
use goblin::elf::section_header::sht_to_str;
use std::io;

/// Size in bytes of an encoded `Elf64_Ehdr`.
pub const EHDR_SIZE: u64 = goblin::elf64::header::SIZEOF_EHDR as u64;

/// Size in bytes of an encoded `Elf64_Shdr`.
pub const SHDR_SIZE: u64 = goblin::elf64::section_header::SIZEOF_SHDR as u64;

/// Represents the ELF (Executable and Linkable Format) header for a 64-bit object file.
///
/// This structure corresponds to the standard `Elf64_Ehdr` defined in the ELF specification.
/// It appears at the very beginning of every ELF file and describes where the
/// program and section header tables live.
///
/// Reference: [ELF Specification v1.2](https://refspecs.linuxfoundation.org/elf/elf.pdf)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elf64Ehdr {
    /// ELF identification bytes.
    ///
    /// The first 4 bytes should be `0x7F`, `'E'`, `'L'`, `'F'`.
    /// `e_ident[EI_CLASS]` selects 32/64-bit, `e_ident[EI_DATA]` the byte order.
    pub e_ident: [u8; 16],

    /// Object file type.
    ///
    /// Common values:
    /// - `ET_REL` (1): Relocatable file
    /// - `ET_EXEC` (2): Executable file
    /// - `ET_DYN` (3): Shared object or PIE
    /// - `ET_CORE` (4): Core dump
    pub e_type: u16,

    /// Target architecture, e.g. `EM_X86_64` (62) or `EM_AARCH64` (183).
    pub e_machine: u16,

    pub e_version: u32,

    /// Virtual address of the program entry point.
    pub e_entry: u64,

    /// File offset of the program header table.
    pub e_phoff: u64,

    /// File offset of the section header table.
    pub e_shoff: u64,

    pub e_flags: u32,
    pub e_ehsize: u16,
    pub e_phentsize: u16,

    /// Number of entries in the program header table.
    pub e_phnum: u16,

    pub e_shentsize: u16,

    /// Number of entries in the section header table.
    pub e_shnum: u16,

    /// Index of the section header string table.
    ///
    /// This section contains the names of all other sections.
    pub e_shstrndx: u16,
}

impl Elf64Ehdr {
    pub fn has_magic(&self) -> bool {
        self.e_ident[..SELFMAG] == ELFMAG[..]
    }

    /// Decodes the fields following `e_ident`, which the caller has already read
    /// to learn the byte order.
    pub fn from_reader<R: io::Read, E: ByteOrder>(
        e_ident: [u8; 16],
        cur: &mut R,
    ) -> io::Result<Elf64Ehdr> {
        Ok(Elf64Ehdr {
            e_ident,
            e_type: cur.read_u16::<E>()?,
            e_machine: cur.read_u16::<E>()?,
            e_version: cur.read_u32::<E>()?,
            e_entry: cur.read_u64::<E>()?,
            e_phoff: cur.read_u64::<E>()?,
            e_shoff: cur.read_u64::<E>()?,
            e_flags: cur.read_u32::<E>()?,
            e_ehsize: cur.read_u16::<E>()?,
            e_phentsize: cur.read_u16::<E>()?,
            e_phnum: cur.read_u16::<E>()?,
            e_shentsize: cur.read_u16::<E>()?,
            e_shnum: cur.read_u16::<E>()?,
            e_shstrndx: cur.read_u16::<E>()?,
        })
    }
}

impl Header for Elf64Ehdr {
    fn entry_point(&self) -> u64 {
        self.e_entry
    }

    fn machine(&self) -> u16 {
        self.e_machine
    }

    fn machine_name(&self) -> &'static str {
        machine_to_str(self.e_machine)
    }

    fn format_name(&self) -> &'static str {
        "ELF"
    }

    fn is_executable(&self) -> bool {
        // PIE executables are ET_DYN with a non-zero entry
        self.e_type == ET_EXEC || (self.e_type == ET_DYN && self.e_entry != 0)
    }
}

/// One `Elf64_Shdr` entry of the section header table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elf64Shdr {
    /// Offset of the section name within the section name string table.
    pub sh_name: u32,
    pub sh_type: u32,
    pub sh_flags: u64,
    /// Virtual address of the section in memory, or 0 if it is not loaded.
    pub sh_addr: u64,
    /// File offset of the section contents.
    pub sh_offset: u64,
    pub sh_size: u64,
    pub sh_link: u32,
    pub sh_info: u32,
    pub sh_addralign: u64,
    pub sh_entsize: u64,
}

impl Elf64Shdr {
    /// `SHT_*` name without its prefix, e.g. `PROGBITS`.
    pub fn type_name(&self) -> &'static str {
        sht_to_str(self.sh_type).trim_start_matches("SHT_")
    }

    pub fn from_reader<R: io::Read, E: ByteOrder>(cur: &mut R) -> io::Result<Elf64Shdr> {
        Ok(Elf64Shdr {
            sh_name: cur.read_u32::<E>()?,
            sh_type: cur.read_u32::<E>()?,
            sh_flags: cur.read_u64::<E>()?,
            sh_addr: cur.read_u64::<E>()?,
            sh_offset: cur.read_u64::<E>()?,
            sh_size: cur.read_u64::<E>()?,
            sh_link: cur.read_u32::<E>()?,
            sh_info: cur.read_u32::<E>()?,
            sh_addralign: cur.read_u64::<E>()?,
            sh_entsize: cur.read_u64::<E>()?,
        })
    }
}

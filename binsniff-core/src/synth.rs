//! Builders for minimal synthetic ELF64 and PE32+ images used by the tests.

use crate::elf::Endian;

pub struct ElfSection {
    pub name: &'static str,
    pub addr: u64,
    pub size: u64,
}

pub struct ElfImage {
    pub endian: Endian,
    pub entry: u64,
    pub phnum: u16,
    pub sections: Vec<ElfSection>,
}

/// Offset of `e_shoff` within the ELF header.
pub const E_SHOFF: usize = 40;
/// Offset of `e_shnum` within the ELF header.
pub const E_SHNUM: usize = 60;
/// Offset of `e_shstrndx` within the ELF header.
pub const E_SHSTRNDX: usize = 62;

impl Default for ElfImage {
    fn default() -> Self {
        Self {
            endian: Endian::Little,
            entry: 0x40_1000,
            phnum: 2,
            sections: vec![
                ElfSection {
                    name: "",
                    addr: 0,
                    size: 0,
                },
                ElfSection {
                    name: ".text",
                    addr: 0x40_1000,
                    size: 0x1a4,
                },
                ElfSection {
                    name: ".data",
                    addr: 0x40_3000,
                    size: 0x40,
                },
            ],
        }
    }
}

struct Writer {
    buf: Vec<u8>,
    big: bool,
}

impl Writer {
    fn u16(&mut self, v: u16) {
        let b = if self.big { v.to_be_bytes() } else { v.to_le_bytes() };
        self.buf.extend_from_slice(&b);
    }
    fn u32(&mut self, v: u32) {
        let b = if self.big { v.to_be_bytes() } else { v.to_le_bytes() };
        self.buf.extend_from_slice(&b);
    }
    fn u64(&mut self, v: u64) {
        let b = if self.big { v.to_be_bytes() } else { v.to_le_bytes() };
        self.buf.extend_from_slice(&b);
    }
}

impl ElfImage {
    /// Index `.shstrtab` will occupy: it is appended after the listed sections.
    pub fn shstrndx(&self) -> u16 {
        self.sections.len() as u16
    }

    /// Byte layout: header, string table, padding to 8, section header table.
    pub fn build(&self) -> Vec<u8> {
        let mut strtab = vec![0u8];
        let mut name_offsets = Vec::new();
        for s in &self.sections {
            if s.name.is_empty() {
                name_offsets.push(0u32);
            } else {
                name_offsets.push(strtab.len() as u32);
                strtab.extend_from_slice(s.name.as_bytes());
                strtab.push(0);
            }
        }
        let shstrtab_name = strtab.len() as u32;
        strtab.extend_from_slice(b".shstrtab\0");

        let strtab_off = 64u64;
        let shoff = (strtab_off + strtab.len() as u64 + 7) & !7;
        let shnum = self.sections.len() as u16 + 1;

        let mut w = Writer {
            buf: Vec::new(),
            big: self.endian == Endian::Big,
        };
        w.buf.extend_from_slice(b"\x7fELF");
        w.buf.push(2); // ELFCLASS64
        w.buf.push(if w.big { 2 } else { 1 });
        w.buf.push(1);
        w.buf.resize(16, 0);
        w.u16(2); // ET_EXEC
        w.u16(62); // EM_X86_64
        w.u32(1);
        w.u64(self.entry);
        w.u64(if self.phnum > 0 { 64 } else { 0 });
        w.u64(shoff);
        w.u32(0);
        w.u16(64);
        w.u16(56);
        w.u16(self.phnum);
        w.u16(64);
        w.u16(shnum);
        w.u16(self.shstrndx());
        assert_eq!(w.buf.len(), 64);

        w.buf.extend_from_slice(&strtab);
        w.buf.resize(shoff as usize, 0);

        let mut file_off = 0x1000u64;
        for (s, name) in self.sections.iter().zip(&name_offsets) {
            w.u32(*name);
            w.u32(if s.name.is_empty() { 0 } else { 1 });
            w.u64(if s.addr != 0 { 0x6 } else { 0 });
            w.u64(s.addr);
            w.u64(if s.size > 0 { file_off } else { 0 });
            w.u64(s.size);
            w.u32(0);
            w.u32(0);
            w.u64(if s.size > 0 { 16 } else { 0 });
            w.u64(0);
            file_off += s.size;
        }
        // .shstrtab
        w.u32(shstrtab_name);
        w.u32(3); // SHT_STRTAB
        w.u64(0);
        w.u64(0);
        w.u64(strtab_off);
        w.u64(strtab.len() as u64);
        w.u32(0);
        w.u32(0);
        w.u64(1);
        w.u64(0);
        w.buf
    }
}

pub struct PeSection {
    pub name: [u8; 8],
    pub rva: u32,
    pub virtual_size: u32,
}

pub struct PeImage {
    pub lfanew: u32,
    pub machine: u16,
    pub entry: u32,
    pub image_base: u64,
    pub subsystem: u16,
    pub size_of_image: u32,
    /// Written into `SizeOfOptionalHeader`; bytes past the decoded fields are zero.
    pub optional_size: u16,
    pub sections: Vec<PeSection>,
}

/// Offset of `NumberOfSections` relative to `e_lfanew`.
pub const NUMBER_OF_SECTIONS: usize = 4 + 2;
/// Offset of the optional header magic relative to `e_lfanew`.
pub const OPTIONAL_MAGIC: usize = 4 + 20;

pub fn pe_name(name: &str) -> [u8; 8] {
    let mut raw = [0u8; 8];
    raw[..name.len()].copy_from_slice(name.as_bytes());
    raw
}

impl Default for PeImage {
    fn default() -> Self {
        Self {
            lfanew: 0x80,
            machine: 0x8664,
            entry: 0x1400,
            image_base: 0x1_4000_0000,
            subsystem: 3,
            size_of_image: 0x6000,
            optional_size: 240,
            sections: vec![
                PeSection {
                    name: pe_name(".text"),
                    rva: 0x1000,
                    virtual_size: 0x1e34,
                },
                PeSection {
                    name: pe_name(".rdata"),
                    rva: 0x3000,
                    virtual_size: 0x9a0,
                },
                PeSection {
                    name: pe_name(".textbss"),
                    rva: 0x4000,
                    virtual_size: 0x1000,
                },
            ],
        }
    }
}

impl PeImage {
    pub fn section_table_offset(&self) -> usize {
        self.lfanew as usize + 4 + 20 + self.optional_size as usize
    }

    pub fn build(&self) -> Vec<u8> {
        let mut buf = vec![0u8; self.lfanew as usize];
        buf[..2].copy_from_slice(b"MZ");
        buf[0x3c..0x40].copy_from_slice(&self.lfanew.to_le_bytes());

        buf.extend_from_slice(b"PE\0\0");
        buf.extend_from_slice(&self.machine.to_le_bytes());
        buf.extend_from_slice(&(self.sections.len() as u16).to_le_bytes());
        buf.extend_from_slice(&0x5f00_0000u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&0u32.to_le_bytes());
        buf.extend_from_slice(&self.optional_size.to_le_bytes());
        buf.extend_from_slice(&0x0022u16.to_le_bytes());

        let opt_start = buf.len();
        let mut opt = vec![0u8; (self.optional_size as usize).max(112)];
        opt[0..2].copy_from_slice(&0x20bu16.to_le_bytes());
        opt[2] = 14;
        opt[16..20].copy_from_slice(&self.entry.to_le_bytes());
        opt[20..24].copy_from_slice(&0x1000u32.to_le_bytes());
        opt[24..32].copy_from_slice(&self.image_base.to_le_bytes());
        opt[32..36].copy_from_slice(&0x1000u32.to_le_bytes());
        opt[36..40].copy_from_slice(&0x200u32.to_le_bytes());
        opt[56..60].copy_from_slice(&self.size_of_image.to_le_bytes());
        opt[60..64].copy_from_slice(&0x400u32.to_le_bytes());
        opt[68..70].copy_from_slice(&self.subsystem.to_le_bytes());
        opt[108..112].copy_from_slice(&16u32.to_le_bytes());
        opt.truncate(self.optional_size as usize);
        buf.extend_from_slice(&opt);
        assert_eq!(buf.len(), opt_start + self.optional_size as usize);

        let mut raw_ptr = 0x400u32;
        for s in &self.sections {
            buf.extend_from_slice(&s.name);
            buf.extend_from_slice(&s.virtual_size.to_le_bytes());
            buf.extend_from_slice(&s.rva.to_le_bytes());
            let raw_size = (s.virtual_size + 0x1ff) & !0x1ff;
            buf.extend_from_slice(&raw_size.to_le_bytes());
            buf.extend_from_slice(&raw_ptr.to_le_bytes());
            buf.extend_from_slice(&[0u8; 12]);
            buf.extend_from_slice(&0x6000_0020u32.to_le_bytes());
            raw_ptr += raw_size;
        }
        buf
    }
}

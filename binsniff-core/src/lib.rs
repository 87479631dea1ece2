pub mod binary;
pub mod elf;
pub mod error;
pub mod header;
pub mod kind;
mod limits;
pub mod pe;
pub mod sections;
mod source;

#[cfg(test)]
mod synth;

pub use binary::*;
pub use elf::{decode_elf, decode_elf_from, decode_elf_with, ElfReport, Endian};
pub use error::{DecodeError, Result};
pub use header::Header;
pub use kind::*;
pub use limits::Limits;
pub use pe::{decode_pe, decode_pe_from, decode_pe_with, PeReport};
pub use sections::*;

pub mod elf;
pub mod pe;

pub trait Header: std::fmt::Debug + Send + Sync {
    /// Returns the entry point: a virtual address for ELF, an RVA for PE.
    fn entry_point(&self) -> u64;

    /// Returns the machine architecture identifier.
    fn machine(&self) -> u16;

    /// Returns a readable name for [`Header::machine`].
    fn machine_name(&self) -> &'static str;

    /// Returns a short human-readable name, e.g. "ELF" or "PE".
    fn format_name(&self) -> &'static str;

    /// Returns true if the binary represents an executable (vs object/lib).
    fn is_executable(&self) -> bool;
}

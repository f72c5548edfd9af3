//! # Register Descriptor Table
//!
//! Static, per-architecture catalog of every register the debugger knows:
//! identifier, display name, width, category, display format, and where the
//! register's bytes live inside the OS register block for its category.
//!
//! The catalog is built once on first use into a process-wide immutable
//! index ([`once_cell::sync::Lazy`]) and is read-only afterwards, so lookups
//! need no synchronization. Every lookup is total: unknown ids and names come
//! back as `None` / [`RegisterId::UNKNOWN`], never as a panic, because callers
//! probe values that arrived over the wire.
//!
//! ## Sub-registers
//!
//! Some names refer to a slice of another register (`w0` is the low half of
//! `x0`, `ah` is bits 8..16 of `rax`, `xmm3` is the low 128 bits of `zmm3`).
//! Those entries carry the id of their *canonical* register plus a bit shift
//! and width. Only canonical registers have a block offset and are returned by
//! [`crate::provider::ArchProvider::read_registers`].
//!
//! ## Architectures
//!
//! - [`arm64`] - X0-X30, SP, PC, CPSR, NEON V0-V31, DBGBCR/DBGBVR/DBGWCR/DBGWVR
//! - [`x64`] - RAX-R15, RIP, RFLAGS, x87 ST0-ST7, ZMM0-ZMM31, DR0-DR7

pub mod arm64;
pub mod x64;

use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::types::{Architecture, RegisterCategory, RegisterId};

/// How a register's value is best presented
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RegisterFormat
{
    /// Plain integer
    Integer,
    /// Holds an address (PC, SP, breakpoint value registers)
    Address,
    /// Floating-point value (x87 stack)
    Float,
    /// SIMD vector of lanes
    Vector,
    /// Flags or control bits that only make sense decoded field by field
    Special,
}

/// Description of one register
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterInfo
{
    pub id: RegisterId,
    /// Display name, lowercase (`"rax"`, `"x0"`, `"dbgbcr3_el1"`)
    pub name: &'static str,
    pub arch: Architecture,
    pub category: RegisterCategory,
    /// Width of the value record in bytes
    pub size: usize,
    pub format: RegisterFormat,
    /// Register whose storage holds this one (itself for canonical registers)
    pub canonical: RegisterId,
    /// Width in bits of this register inside the canonical one
    pub bits: u32,
    /// Bit offset of this register inside the canonical one
    pub shift: u32,
    /// Byte offset inside the OS register block for `category`, `None` for
    /// sub-registers
    pub block_offset: Option<usize>,
    /// DWARF register number, where the ABI defines one
    pub dwarf: Option<u32>,
}

impl RegisterInfo
{
    /// Whether this register has its own storage (as opposed to being a
    /// slice of another register).
    #[must_use]
    pub fn is_canonical(&self) -> bool
    {
        self.canonical == self.id
    }
}

/// Result of [`describe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterDescription
{
    pub name: &'static str,
    pub arch: Architecture,
}

/// Registers with a role the unwinder and the formatter look up by meaning
/// rather than by name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SpecialRegister
{
    /// Instruction pointer / program counter
    Ip,
    /// Stack pointer
    Sp,
    /// Thread pointer (TLS base)
    Tp,
}

/// One contiguous id range owned by a single (architecture, category) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterIdRange
{
    pub arch: Architecture,
    pub category: RegisterCategory,
    pub first: u32,
    pub last: u32,
}

impl RegisterIdRange
{
    const fn new(arch: Architecture, category: RegisterCategory, first: u32, last: u32) -> Self
    {
        Self {
            arch,
            category,
            first,
            last,
        }
    }

    #[must_use]
    pub const fn contains(&self, id: RegisterId) -> bool
    {
        id.raw() >= self.first && id.raw() <= self.last
    }
}

/// Every id range, ordered by `first`. Ranges never overlap.
pub const ID_RANGES: [RegisterIdRange; 7] = [
    RegisterIdRange::new(Architecture::Arm64, RegisterCategory::General, 1000, 1099),
    RegisterIdRange::new(Architecture::Arm64, RegisterCategory::Vector, 1100, 1199),
    RegisterIdRange::new(Architecture::Arm64, RegisterCategory::Debug, 1200, 1299),
    RegisterIdRange::new(Architecture::X64, RegisterCategory::General, 2000, 2099),
    RegisterIdRange::new(Architecture::X64, RegisterCategory::FloatingPoint, 2100, 2199),
    RegisterIdRange::new(Architecture::X64, RegisterCategory::Vector, 2200, 2399),
    RegisterIdRange::new(Architecture::X64, RegisterCategory::Debug, 2400, 2499),
];

struct RegisterTable
{
    infos: Vec<RegisterInfo>,
    by_id: HashMap<RegisterId, usize>,
    by_name: HashMap<(Architecture, &'static str), usize>,
    by_dwarf: HashMap<(Architecture, u32), RegisterId>,
}

impl RegisterTable
{
    fn build() -> Self
    {
        let infos: Vec<RegisterInfo> = arm64::catalog().into_iter().chain(x64::catalog()).collect();

        let mut by_id = HashMap::with_capacity(infos.len());
        let mut by_name = HashMap::with_capacity(infos.len());
        let mut by_dwarf = HashMap::new();
        for (index, info) in infos.iter().enumerate() {
            by_id.insert(info.id, index);
            by_name.insert((info.arch, info.name), index);
            if let Some(dwarf) = info.dwarf {
                by_dwarf.insert((info.arch, dwarf), info.id);
            }
        }

        Self {
            infos,
            by_id,
            by_name,
            by_dwarf,
        }
    }
}

static TABLE: Lazy<RegisterTable> = Lazy::new(RegisterTable::build);

/// Full catalog record for `id`, `None` if the id is not defined.
#[must_use]
pub fn register_info(id: RegisterId) -> Option<&'static RegisterInfo>
{
    let table = &*TABLE;
    table.by_id.get(&id).map(|&index| &table.infos[index])
}

/// Name and architecture of `id`, `None` if the id is not defined.
///
/// ```rust
/// use hwdebug_core::registers::{describe, x64};
/// use hwdebug_core::types::{Architecture, RegisterId};
///
/// let desc = describe(x64::RIP).unwrap();
/// assert_eq!(desc.name, "rip");
/// assert_eq!(desc.arch, Architecture::X64);
/// assert!(describe(RegisterId::from_raw(7)).is_none());
/// ```
#[must_use]
pub fn describe(id: RegisterId) -> Option<RegisterDescription>
{
    register_info(id).map(|info| RegisterDescription {
        name: info.name,
        arch: info.arch,
    })
}

/// Look up a register by name within one architecture.
///
/// Names are matched case-insensitively. Returns [`RegisterId::UNKNOWN`] when
/// nothing matches.
#[must_use]
pub fn resolve(arch: Architecture, name: &str) -> RegisterId
{
    let lowered = name.to_ascii_lowercase();
    let table = &*TABLE;
    table
        .by_name
        .get(&(arch, lowered.as_str()))
        .map_or(RegisterId::UNKNOWN, |&index| table.infos[index].id)
}

/// Look up a register by name across every architecture.
///
/// Names such as `"sp"` exist on several architectures; all matches are
/// returned in architecture order.
#[must_use]
pub fn resolve_any(name: &str) -> Vec<RegisterId>
{
    [Architecture::Arm64, Architecture::X64]
        .into_iter()
        .map(|arch| resolve(arch, name))
        .filter(|id| !id.is_unknown())
        .collect()
}

/// Category of `id` derived only from which numeric range it falls in.
///
/// Returns `None` outside every known range. This does not require the id to
/// be defined, which makes it usable as a cheap sanity check on wire data.
#[must_use]
pub fn category_of(id: RegisterId) -> Option<RegisterCategory>
{
    ID_RANGES.iter().find(|range| range.contains(id)).map(|range| range.category)
}

/// Architecture owning `id`'s numeric range.
#[must_use]
pub fn architecture_of(id: RegisterId) -> Option<Architecture>
{
    ID_RANGES.iter().find(|range| range.contains(id)).map(|range| range.arch)
}

/// Canonical registers of one category in catalog order.
///
/// Sub-registers are excluded; an architecture without the category yields
/// an empty list.
#[must_use]
pub fn registers_in(arch: Architecture, category: RegisterCategory) -> Vec<&'static RegisterInfo>
{
    TABLE
        .infos
        .iter()
        .filter(|info| info.arch == arch && info.category == category && info.is_canonical())
        .collect()
}

/// Every catalog entry for `arch`, sub-registers included.
#[must_use]
pub fn all_registers(arch: Architecture) -> Vec<&'static RegisterInfo>
{
    TABLE.infos.iter().filter(|info| info.arch == arch).collect()
}

/// Register playing `special`'s role on `arch`.
#[must_use]
pub fn special_register_id(arch: Architecture, special: SpecialRegister) -> RegisterId
{
    match (arch, special) {
        (Architecture::Arm64, SpecialRegister::Ip) => arm64::PC,
        (Architecture::Arm64, SpecialRegister::Sp) => arm64::SP,
        (Architecture::Arm64, SpecialRegister::Tp) => arm64::TPIDR,
        (Architecture::X64, SpecialRegister::Ip) => x64::RIP,
        (Architecture::X64, SpecialRegister::Sp) => x64::RSP,
        (Architecture::X64, SpecialRegister::Tp) => x64::FS_BASE,
        (Architecture::Unknown(_), _) => RegisterId::UNKNOWN,
    }
}

/// Register id for a DWARF register number on `arch`.
#[must_use]
pub fn register_id_for_dwarf(arch: Architecture, dwarf: u32) -> RegisterId
{
    TABLE.by_dwarf.get(&(arch, dwarf)).copied().unwrap_or(RegisterId::UNKNOWN)
}

/// DWARF register number of `id`, if the ABI defines one.
#[must_use]
pub fn dwarf_number(id: RegisterId) -> Option<u32>
{
    register_info(id).and_then(|info| info.dwarf)
}

/// Size in bytes of the OS register block for (`arch`, `category`).
///
/// `None` when the architecture has no such block (ARM64 floating point).
#[must_use]
pub const fn block_size(arch: Architecture, category: RegisterCategory) -> Option<usize>
{
    match arch {
        Architecture::Arm64 => arm64::block_size(category),
        Architecture::X64 => x64::block_size(category),
        Architecture::Unknown(_) => None,
    }
}

/// Builder used by the per-architecture catalogs.
pub(crate) struct CatalogBuilder
{
    arch: Architecture,
    category: RegisterCategory,
    infos: Vec<RegisterInfo>,
}

impl CatalogBuilder
{
    pub(crate) fn new(arch: Architecture) -> Self
    {
        Self {
            arch,
            category: RegisterCategory::General,
            infos: Vec::new(),
        }
    }

    pub(crate) fn category(&mut self, category: RegisterCategory) -> &mut Self
    {
        self.category = category;
        self
    }

    /// A register with its own storage at `offset` in the category block.
    pub(crate) fn canonical(
        &mut self,
        id: RegisterId,
        name: &'static str,
        size: usize,
        format: RegisterFormat,
        offset: usize,
        dwarf: Option<u32>,
    ) -> &mut Self
    {
        self.infos.push(RegisterInfo {
            id,
            name,
            arch: self.arch,
            category: self.category,
            size,
            format,
            canonical: id,
            bits: (size * 8) as u32,
            shift: 0,
            block_offset: Some(offset),
            dwarf,
        });
        self
    }

    /// A slice of `canonical`'s storage.
    pub(crate) fn sub(
        &mut self,
        id: RegisterId,
        name: &'static str,
        canonical: RegisterId,
        bits: u32,
        shift: u32,
        format: RegisterFormat,
    ) -> &mut Self
    {
        self.infos.push(RegisterInfo {
            id,
            name,
            arch: self.arch,
            category: self.category,
            size: (bits / 8) as usize,
            format,
            canonical,
            bits,
            shift,
            block_offset: None,
            dwarf: None,
        });
        self
    }

    /// Attach a DWARF number to the most recently added entry.
    pub(crate) fn dwarf(&mut self, dwarf: u32) -> &mut Self
    {
        if let Some(last) = self.infos.last_mut() {
            last.dwarf = Some(dwarf);
        }
        self
    }

    pub(crate) fn finish(&mut self) -> Vec<RegisterInfo>
    {
        std::mem::take(&mut self.infos)
    }
}

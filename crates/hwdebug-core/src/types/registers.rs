//! Register identifiers, categories and value records.

use std::fmt;

use smallvec::SmallVec;

use crate::error::{HwDebugError, HwDebugResult};
use crate::registers::{self, RegisterInfo};

/// Architecture-scoped register identifier
///
/// Identifiers are partitioned into disjoint numeric ranges, one block per
/// architecture and, inside it, one sub-range per [`RegisterCategory`]:
///
/// | Architecture | General   | Floating point | Vector    | Debug     |
/// |--------------|-----------|----------------|-----------|-----------|
/// | ARM64        | 1000-1099 | (none)         | 1100-1199 | 1200-1299 |
/// | x86-64       | 2000-2099 | 2100-2199      | 2200-2399 | 2400-2499 |
///
/// The numeric value is what crosses the wire between debug agent and client,
/// so it is stable and never reused. `RegisterId::UNKNOWN` (0) is the sentinel
/// returned when a name or wire value does not resolve.
///
/// The named constants live next to each architecture's catalog:
/// [`crate::registers::arm64`] and [`crate::registers::x64`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct RegisterId(u32);

impl RegisterId
{
    /// Sentinel for "no such register".
    pub const UNKNOWN: Self = RegisterId(0);

    /// Wrap a raw wire value. No validation happens here; use
    /// [`crate::registers::describe`] to check that the id is defined.
    #[must_use]
    pub const fn from_raw(value: u32) -> Self
    {
        RegisterId(value)
    }

    #[must_use]
    pub const fn raw(self) -> u32
    {
        self.0
    }

    #[must_use]
    pub const fn is_unknown(self) -> bool
    {
        self.0 == 0
    }

    /// Positional category of this id, `None` outside every known range.
    #[must_use]
    pub fn category(self) -> Option<RegisterCategory>
    {
        registers::category_of(self)
    }
}

impl fmt::Display for RegisterId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        match registers::register_info(*self) {
            Some(info) => f.write_str(info.name),
            None => write!(f, "<register {}>", self.0),
        }
    }
}

/// Grouping of an architecture's registers for selective access and display
///
/// Each category is also the unit in which the OS exposes register state: one
/// fixed-layout block per category per thread.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RegisterCategory
{
    /// Integer registers, program counter, stack pointer and flags
    General,
    /// x87 floating-point stack and its control/status words
    FloatingPoint,
    /// SIMD registers (NEON / SSE / AVX / AVX-512) and their control registers
    Vector,
    /// Hardware breakpoint and watchpoint programming registers
    Debug,
}

impl RegisterCategory
{
    /// All categories in display order.
    pub const ALL: [RegisterCategory; 4] = [
        RegisterCategory::General,
        RegisterCategory::FloatingPoint,
        RegisterCategory::Vector,
        RegisterCategory::Debug,
    ];

    #[must_use]
    pub const fn name(self) -> &'static str
    {
        match self {
            RegisterCategory::General => "General Purpose",
            RegisterCategory::FloatingPoint => "Floating Point",
            RegisterCategory::Vector => "Vector",
            RegisterCategory::Debug => "Debug",
        }
    }
}

impl fmt::Display for RegisterCategory
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

/// A sampled register value
///
/// Holds the raw bytes of one register in machine-native (little-endian)
/// order. The byte length always equals the width the catalog defines for the
/// id; the constructors reject anything else. Records are created fresh on
/// every sample and only mutated when a client patches a value to write back.
///
/// ## Example
///
/// ```rust
/// use hwdebug_core::registers::x64;
/// use hwdebug_core::types::Register;
///
/// let rax = Register::from_u64(x64::RAX, 0x1234).unwrap();
/// assert_eq!(rax.data().len(), 8);
/// assert_eq!(rax.value_u64(), Some(0x1234));
///
/// // Wrong width for a 64-bit register.
/// assert!(Register::new(x64::RAX, &[0u8; 4]).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Register
{
    id: RegisterId,
    data: SmallVec<[u8; 16]>,
}

impl Register
{
    /// Build a record from raw bytes, validating the id and the byte length.
    ///
    /// ## Errors
    ///
    /// - `UnknownRegister` if the id is not in the catalog
    /// - `RegisterSizeMismatch` if `data.len()` differs from the register width
    pub fn new(id: RegisterId, data: &[u8]) -> HwDebugResult<Self>
    {
        let info = registers::register_info(id).ok_or(HwDebugError::UnknownRegister(id))?;
        if data.len() != info.size {
            return Err(HwDebugError::RegisterSizeMismatch {
                id,
                expected: info.size,
                actual: data.len(),
            });
        }
        Ok(Self {
            id,
            data: SmallVec::from_slice(data),
        })
    }

    /// Build a record from an integer, zero-extended or truncated to the
    /// register width.
    ///
    /// ## Errors
    ///
    /// `UnknownRegister` if the id is not in the catalog.
    pub fn from_u64(id: RegisterId, value: u64) -> HwDebugResult<Self>
    {
        let info = registers::register_info(id).ok_or(HwDebugError::UnknownRegister(id))?;
        let mut data: SmallVec<[u8; 16]> = SmallVec::from_elem(0, info.size);
        let bytes = value.to_le_bytes();
        let n = info.size.min(bytes.len());
        data[..n].copy_from_slice(&bytes[..n]);
        Ok(Self { id, data })
    }

    #[must_use]
    pub const fn id(&self) -> RegisterId
    {
        self.id
    }

    #[must_use]
    pub fn data(&self) -> &[u8]
    {
        &self.data
    }

    /// Mutable access to the bytes. The length cannot change.
    pub fn data_mut(&mut self) -> &mut [u8]
    {
        &mut self.data
    }

    /// Value as an integer for registers of at most 8 bytes.
    #[must_use]
    pub fn value_u64(&self) -> Option<u64>
    {
        if self.data.len() > 8 {
            return None;
        }
        let mut bytes = [0u8; 8];
        bytes[..self.data.len()].copy_from_slice(&self.data);
        Some(u64::from_le_bytes(bytes))
    }

    /// Value as a 128-bit integer for registers of at most 16 bytes.
    #[must_use]
    pub fn value_u128(&self) -> Option<u128>
    {
        if self.data.len() > 16 {
            return None;
        }
        let mut bytes = [0u8; 16];
        bytes[..self.data.len()].copy_from_slice(&self.data);
        Some(u128::from_le_bytes(bytes))
    }

    /// Read a sub-register (e.g. `eax` out of `rax`, `w3` out of `x3`).
    ///
    /// Returns `None` when `sub` is not a slice of this record's register.
    #[must_use]
    pub fn extract(&self, sub: &RegisterInfo) -> Option<Register>
    {
        if sub.canonical != self.id || sub.shift % 8 != 0 || sub.bits % 8 != 0 {
            return None;
        }
        let start = (sub.shift / 8) as usize;
        let end = start + (sub.bits / 8) as usize;
        let bytes = self.data.get(start..end)?;
        Some(Register {
            id: sub.id,
            data: SmallVec::from_slice(bytes),
        })
    }
}

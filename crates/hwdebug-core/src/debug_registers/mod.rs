//! # Debug Register Codec
//!
//! Pure bit-level access to the fields of debug control and status registers.
//!
//! Every register is described by a declarative [`RegisterLayout`]: a table of
//! named [`BitField`]s, each a `(shift, width)` pair. A single generic
//! `get`/`set` drives every field, so there is no per-field code to get wrong
//! and the laws
//!
//! - `field.with(raw, field.get(raw)) == raw`
//! - `field.get(field.with(raw, v)) == v` for every `v <= field.max_value()`
//!
//! hold for every field of every register by construction (and are property
//! tested in `tests/codec.rs`).
//!
//! Nothing here touches live thread state. The typed snapshots
//! [`x64::X64DebugBlock`] and [`arm64::Arm64DebugBlock`] convert between the
//! OS debug block bytes and plain structs; the providers combine the two.
//!
//! ## See Also
//!
//! - [`crate::provider`] - installs breakpoints/watchpoints using these codecs

pub mod arm64;
pub mod x64;

use crate::error::{HwDebugError, HwDebugResult};
use crate::types::RegisterCategory;

/// One named bit-field of a register
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BitField
{
    pub name: &'static str,
    /// Position of the least significant bit
    pub shift: u32,
    /// Number of bits (1..=64)
    pub width: u32,
}

impl BitField
{
    #[must_use]
    pub const fn new(name: &'static str, shift: u32, width: u32) -> Self
    {
        assert!(width > 0 && shift + width <= 64);
        Self { name, shift, width }
    }

    /// Largest value the field can hold.
    #[must_use]
    pub const fn max_value(self) -> u64
    {
        if self.width >= 64 {
            u64::MAX
        } else {
            (1u64 << self.width) - 1
        }
    }

    /// Mask of the field's bits in place.
    #[must_use]
    pub const fn mask(self) -> u64
    {
        self.max_value() << self.shift
    }

    /// Extract the field from `raw`.
    #[must_use]
    pub const fn get(self, raw: u64) -> u64
    {
        (raw >> self.shift) & self.max_value()
    }

    /// `raw` with the field replaced by `value`.
    ///
    /// Bits of `value` above the field width are dropped.
    #[must_use]
    pub const fn with(self, raw: u64, value: u64) -> u64
    {
        (raw & !self.mask()) | ((value & self.max_value()) << self.shift)
    }

    /// Replace the field in `raw` with `value`.
    pub fn set(self, raw: &mut u64, value: u64)
    {
        *raw = self.with(*raw, value);
    }

    /// Convenience for single-bit fields.
    #[must_use]
    pub const fn is_set(self, raw: u64) -> bool
    {
        self.get(raw) != 0
    }
}

/// Declarative description of one register's fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterLayout
{
    pub name: &'static str,
    /// Architectural register width in bits
    pub bits: u32,
    pub fields: &'static [BitField],
}

impl RegisterLayout
{
    /// Look up a field by name (case-insensitive).
    #[must_use]
    pub fn field(&self, name: &str) -> Option<BitField>
    {
        self.fields.iter().copied().find(|field| field.name.eq_ignore_ascii_case(name))
    }

    /// Read a named field, `None` if the layout has no such field.
    #[must_use]
    pub fn get(&self, raw: u64, name: &str) -> Option<u64>
    {
        self.field(name).map(|field| field.get(raw))
    }

    /// Write a named field.
    ///
    /// ## Errors
    ///
    /// `InvalidArgument` for an unknown field name or a value wider than the
    /// field.
    pub fn set(&self, raw: &mut u64, name: &str, value: u64) -> HwDebugResult<()>
    {
        let field = self
            .field(name)
            .ok_or_else(|| HwDebugError::InvalidArgument(format!("{} has no field {name}", self.name)))?;
        if value > field.max_value() {
            return Err(HwDebugError::InvalidArgument(format!(
                "{:#x} does not fit in {}.{} ({} bits)",
                value, self.name, field.name, field.width
            )));
        }
        field.set(raw, value);
        Ok(())
    }

    /// Every field with its current value, in table order.
    #[must_use]
    pub fn decode(&self, raw: u64) -> Vec<(&'static str, u64)>
    {
        self.fields.iter().map(|field| (field.name, field.get(raw))).collect()
    }
}

/// Check that an OS block has exactly the size its layout defines.
pub(crate) fn check_block_size(kind: RegisterCategory, bytes: &[u8], expected: usize) -> HwDebugResult<()>
{
    if bytes.len() == expected {
        Ok(())
    } else {
        Err(HwDebugError::BlockSizeMismatch {
            kind,
            expected,
            actual: bytes.len(),
        })
    }
}

pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> u32
{
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[offset..offset + 4]);
    u32::from_le_bytes(buf)
}

pub(crate) fn read_u64(bytes: &[u8], offset: usize) -> u64
{
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&bytes[offset..offset + 8]);
    u64::from_le_bytes(buf)
}

pub(crate) fn write_u32(bytes: &mut [u8], offset: usize, value: u32)
{
    bytes[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

pub(crate) fn write_u64(bytes: &mut [u8], offset: usize, value: u64)
{
    bytes[offset..offset + 8].copy_from_slice(&value.to_le_bytes());
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_bit_field_get_and_with()
    {
        let field = BitField::new("rw", 16, 2);
        assert_eq!(field.mask(), 0x3_0000);
        assert_eq!(field.get(0x0003_0000), 3);
        assert_eq!(field.with(0xffff_ffff, 0), 0xfffc_ffff);
        assert_eq!(field.with(0, 0b1_01), 0x1_0000);
    }

    #[test]
    fn test_full_width_field()
    {
        let field = BitField::new("all", 0, 64);
        assert_eq!(field.max_value(), u64::MAX);
        assert_eq!(field.get(0xdead_beef), 0xdead_beef);
        assert_eq!(field.with(1, 7), 7);
    }

    #[test]
    fn test_layout_set_rejects_wide_values()
    {
        let layout = x64::DR7;
        let mut raw = 0;
        assert!(layout.set(&mut raw, "len0", 4).is_err());
        assert!(layout.set(&mut raw, "bogus", 0).is_err());
        layout.set(&mut raw, "LEN0", 3).unwrap();
        assert_eq!(raw, 0xc_0000);
    }
}

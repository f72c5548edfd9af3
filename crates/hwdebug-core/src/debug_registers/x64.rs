//! # x86-64 Debug Registers
//!
//! DR0-DR3 hold linear addresses; DR7 enables and configures them; DR6
//! reports which condition caused the last debug exception.
//!
//! ```text
//! DR7:  31..30 29..28 | 27..26 25..24 | 23..22 21..20 | 19..18 17..16 | 13 | 9  8 | 7  6  5  4  3  2  1  0
//!       LEN3   RW3    | LEN2   RW2    | LEN1   RW1    | LEN0   RW0    | GD | GE LE| G3 L3 G2 L2 G1 L1 G0 L0
//!
//! DR6:  15 14 13 | 3  2  1  0
//!       BT BS BD | B3 B2 B1 B0
//! ```
//!
//! ## References
//!
//! - Intel SDM Vol. 3B, 17.2.3 "Debug Status Register (DR6)"
//! - Intel SDM Vol. 3B, 17.2.4 "Debug Control Register (DR7)"

use super::{check_block_size, read_u64, write_u64, BitField, RegisterLayout};
use crate::error::HwDebugResult;
use crate::registers::x64::{debug_offsets, DEBUG_BLOCK_SIZE, HW_SLOTS};
use crate::types::RegisterCategory;

pub const DR6_B0: BitField = BitField::new("b0", 0, 1);
pub const DR6_B1: BitField = BitField::new("b1", 1, 1);
pub const DR6_B2: BitField = BitField::new("b2", 2, 1);
pub const DR6_B3: BitField = BitField::new("b3", 3, 1);
pub const DR6_BLD: BitField = BitField::new("bld", 11, 1);
pub const DR6_BD: BitField = BitField::new("bd", 13, 1);
pub const DR6_BS: BitField = BitField::new("bs", 14, 1);
pub const DR6_BT: BitField = BitField::new("bt", 15, 1);
pub const DR6_RTM: BitField = BitField::new("rtm", 16, 1);

pub const DR6: RegisterLayout = RegisterLayout {
    name: "dr6",
    bits: 64,
    fields: &[DR6_B0, DR6_B1, DR6_B2, DR6_B3, DR6_BLD, DR6_BD, DR6_BS, DR6_BT, DR6_RTM],
};

pub const DR7_LE: BitField = BitField::new("le", 8, 1);
pub const DR7_GE: BitField = BitField::new("ge", 9, 1);
pub const DR7_RTM: BitField = BitField::new("rtm", 11, 1);
pub const DR7_GD: BitField = BitField::new("gd", 13, 1);

pub const DR7: RegisterLayout = RegisterLayout {
    name: "dr7",
    bits: 64,
    fields: &[
        BitField::new("l0", 0, 1),
        BitField::new("g0", 1, 1),
        BitField::new("l1", 2, 1),
        BitField::new("g1", 3, 1),
        BitField::new("l2", 4, 1),
        BitField::new("g2", 5, 1),
        BitField::new("l3", 6, 1),
        BitField::new("g3", 7, 1),
        DR7_LE,
        DR7_GE,
        DR7_RTM,
        DR7_GD,
        BitField::new("rw0", 16, 2),
        BitField::new("len0", 18, 2),
        BitField::new("rw1", 20, 2),
        BitField::new("len1", 22, 2),
        BitField::new("rw2", 24, 2),
        BitField::new("len2", 26, 2),
        BitField::new("rw3", 28, 2),
        BitField::new("len3", 30, 2),
    ],
};

/// DR7 local enable bit `L<slot>`.
#[must_use]
pub const fn local_enable(slot: usize) -> BitField
{
    BitField::new("l", slot as u32 * 2, 1)
}

/// DR7 global enable bit `G<slot>`.
#[must_use]
pub const fn global_enable(slot: usize) -> BitField
{
    BitField::new("g", slot as u32 * 2 + 1, 1)
}

/// DR7 access-type field `RW<slot>`.
#[must_use]
pub const fn rw(slot: usize) -> BitField
{
    BitField::new("rw", 16 + slot as u32 * 4, 2)
}

/// DR7 length field `LEN<slot>`.
#[must_use]
pub const fn len(slot: usize) -> BitField
{
    BitField::new("len", 18 + slot as u32 * 4, 2)
}

/// DR6 hit bit `B<slot>`.
#[must_use]
pub const fn hit(slot: usize) -> BitField
{
    BitField::new("b", slot as u32, 1)
}

/// Values of the DR7 `RW` field.
pub mod rw_values
{
    pub const EXECUTE: u64 = 0b00;
    pub const WRITE: u64 = 0b01;
    pub const IO: u64 = 0b10;
    pub const READ_WRITE: u64 = 0b11;
}

/// Encode a watch length (1, 2, 4 or 8 bytes) as a DR7 `LEN` value.
#[must_use]
pub const fn encode_len(size: u64) -> Option<u64>
{
    match size {
        1 => Some(0b00),
        2 => Some(0b01),
        8 => Some(0b10),
        4 => Some(0b11),
        _ => None,
    }
}

/// Decode a DR7 `LEN` value into a byte length.
#[must_use]
pub const fn decode_len(value: u64) -> u64
{
    match value & 0b11 {
        0b00 => 1,
        0b01 => 2,
        0b10 => 8,
        _ => 4,
    }
}

/// Snapshot of the x86-64 debug register block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct X64DebugBlock
{
    /// DR0-DR3
    pub dr: [u64; HW_SLOTS],
    pub dr6: u64,
    pub dr7: u64,
}

impl X64DebugBlock
{
    /// Decode the OS debug block.
    ///
    /// ## Errors
    ///
    /// `BlockSizeMismatch` if `bytes` is not exactly the debug block size.
    pub fn from_bytes(bytes: &[u8]) -> HwDebugResult<Self>
    {
        check_block_size(RegisterCategory::Debug, bytes, DEBUG_BLOCK_SIZE)?;
        let mut block = Self::default();
        for (slot, dr) in block.dr.iter_mut().enumerate() {
            *dr = read_u64(bytes, debug_offsets::DR0 + slot * 8);
        }
        block.dr6 = read_u64(bytes, debug_offsets::DR6);
        block.dr7 = read_u64(bytes, debug_offsets::DR7);
        Ok(block)
    }

    /// Write the snapshot back into `bytes` (which must be a debug block).
    ///
    /// ## Errors
    ///
    /// `BlockSizeMismatch` if `bytes` is not exactly the debug block size.
    pub fn write_to(&self, bytes: &mut [u8]) -> HwDebugResult<()>
    {
        check_block_size(RegisterCategory::Debug, bytes, DEBUG_BLOCK_SIZE)?;
        for (slot, dr) in self.dr.iter().enumerate() {
            write_u64(bytes, debug_offsets::DR0 + slot * 8, *dr);
        }
        write_u64(bytes, debug_offsets::DR6, self.dr6);
        write_u64(bytes, debug_offsets::DR7, self.dr7);
        Ok(())
    }

    /// Encode into a fresh debug block.
    #[must_use]
    pub fn to_bytes(&self) -> Vec<u8>
    {
        let mut bytes = vec![0u8; DEBUG_BLOCK_SIZE];
        // The buffer has the right size by construction.
        let _ = self.write_to(&mut bytes);
        bytes
    }

    /// Whether `slot` is enabled locally or globally.
    #[must_use]
    pub const fn is_enabled(&self, slot: usize) -> bool
    {
        local_enable(slot).is_set(self.dr7) || global_enable(slot).is_set(self.dr7)
    }

    /// Whether `slot` is configured as a data watchpoint (`RW != 00`).
    #[must_use]
    pub const fn is_watchpoint(&self, slot: usize) -> bool
    {
        rw(slot).get(self.dr7) != rw_values::EXECUTE
    }

    /// Watched length of `slot` in bytes.
    #[must_use]
    pub const fn watch_len(&self, slot: usize) -> u64
    {
        decode_len(len(slot).get(self.dr7))
    }

    /// Disable `slot` and clear its address and RW/LEN fields.
    pub fn clear_slot(&mut self, slot: usize)
    {
        self.dr[slot] = 0;
        local_enable(slot).set(&mut self.dr7, 0);
        global_enable(slot).set(&mut self.dr7, 0);
        rw(slot).set(&mut self.dr7, 0);
        len(slot).set(&mut self.dr7, 0);
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_per_slot_fields_match_layout()
    {
        for slot in 0..HW_SLOTS {
            let l = DR7.field(&format!("l{slot}")).unwrap();
            let g = DR7.field(&format!("g{slot}")).unwrap();
            let r = DR7.field(&format!("rw{slot}")).unwrap();
            let n = DR7.field(&format!("len{slot}")).unwrap();
            assert_eq!((l.shift, l.width), (local_enable(slot).shift, 1));
            assert_eq!((g.shift, g.width), (global_enable(slot).shift, 1));
            assert_eq!((r.shift, r.width), (rw(slot).shift, 2));
            assert_eq!((n.shift, n.width), (len(slot).shift, 2));
            assert_eq!(DR6.field(&format!("b{slot}")).unwrap().shift, hit(slot).shift);
        }
    }

    #[test]
    fn test_len_encoding()
    {
        for size in [1, 2, 4, 8] {
            assert_eq!(decode_len(encode_len(size).unwrap()), size);
        }
        assert_eq!(encode_len(3), None);
    }

    #[test]
    fn test_block_bytes()
    {
        let block = X64DebugBlock {
            dr: [0x1000, 0x2000, 0, 0],
            dr6: 0x4001,
            dr7: 0x1,
        };
        let bytes = block.to_bytes();
        assert_eq!(bytes.len(), DEBUG_BLOCK_SIZE);
        assert_eq!(&bytes[0..8], &0x1000u64.to_le_bytes());
        assert_eq!(X64DebugBlock::from_bytes(&bytes).unwrap(), block);
        assert!(X64DebugBlock::from_bytes(&bytes[..40]).is_err());
    }
}

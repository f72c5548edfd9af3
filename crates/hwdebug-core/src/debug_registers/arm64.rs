//! # ARM64 Debug Registers
//!
//! Breakpoints are programmed through DBGBVR<n>_EL1 (address) and
//! DBGBCR<n>_EL1 (control); watchpoints through DBGWVR<n>_EL1 and
//! DBGWCR<n>_EL1. The number of implemented pairs is reported by
//! ID_AA64DFR0_EL1, and the cause of a debug exception by the exception class
//! of ESR_EL1.
//!
//! ```text
//! DBGBCR:  23..20 BT | 19..16 LBN | 15..14 SSC | 13 HMC | 8..5 BAS | 2..1 PMC | 0 E
//! DBGWCR:  28..24 MASK | 20 WT | 19..16 LBN | 15..14 SSC | 13 HMC | 12..5 BAS | 4..3 LSC | 2..1 PAC | 0 E
//! ESR_EL1: 31..26 EC | 25 IL | 24..0 ISS
//! ```
//!
//! ## References
//!
//! - Arm ARM D13.3.2 "DBGBCR<n>_EL1", D13.3.11 "DBGWCR<n>_EL1"
//! - Arm ARM D13.2.59 "ID_AA64DFR0_EL1"
//! - Arm ARM D13.2.37 "ESR_EL1"

use super::{check_block_size, read_u32, read_u64, write_u32, write_u64, BitField, RegisterLayout};
use crate::error::HwDebugResult;
use crate::registers::arm64::{debug_offsets, DEBUG_BLOCK_SIZE, MAX_HW_SLOTS};
use crate::types::RegisterCategory;

pub const DBGBCR_E: BitField = BitField::new("e", 0, 1);
pub const DBGBCR_PMC: BitField = BitField::new("pmc", 1, 2);
pub const DBGBCR_BAS: BitField = BitField::new("bas", 5, 4);
pub const DBGBCR_HMC: BitField = BitField::new("hmc", 13, 1);
pub const DBGBCR_SSC: BitField = BitField::new("ssc", 14, 2);
pub const DBGBCR_LBN: BitField = BitField::new("lbn", 16, 4);
pub const DBGBCR_BT: BitField = BitField::new("bt", 20, 4);

pub const DBGBCR: RegisterLayout = RegisterLayout {
    name: "dbgbcr",
    bits: 32,
    fields: &[DBGBCR_E, DBGBCR_PMC, DBGBCR_BAS, DBGBCR_HMC, DBGBCR_SSC, DBGBCR_LBN, DBGBCR_BT],
};

pub const DBGWCR_E: BitField = BitField::new("e", 0, 1);
pub const DBGWCR_PAC: BitField = BitField::new("pac", 1, 2);
pub const DBGWCR_LSC: BitField = BitField::new("lsc", 3, 2);
pub const DBGWCR_BAS: BitField = BitField::new("bas", 5, 8);
pub const DBGWCR_HMC: BitField = BitField::new("hmc", 13, 1);
pub const DBGWCR_SSC: BitField = BitField::new("ssc", 14, 2);
pub const DBGWCR_LBN: BitField = BitField::new("lbn", 16, 4);
pub const DBGWCR_WT: BitField = BitField::new("wt", 20, 1);
pub const DBGWCR_MASK: BitField = BitField::new("mask", 24, 5);

pub const DBGWCR: RegisterLayout = RegisterLayout {
    name: "dbgwcr",
    bits: 32,
    fields: &[
        DBGWCR_E,
        DBGWCR_PAC,
        DBGWCR_LSC,
        DBGWCR_BAS,
        DBGWCR_HMC,
        DBGWCR_SSC,
        DBGWCR_LBN,
        DBGWCR_WT,
        DBGWCR_MASK,
    ],
};

pub const ESR_ISS: BitField = BitField::new("iss", 0, 25);
pub const ESR_IL: BitField = BitField::new("il", 25, 1);
pub const ESR_EC: BitField = BitField::new("ec", 26, 6);

pub const ESR: RegisterLayout = RegisterLayout {
    name: "esr_el1",
    bits: 64,
    fields: &[ESR_ISS, ESR_IL, ESR_EC],
};

pub const ID_AA64DFR0_DEBUGVER: BitField = BitField::new("debugver", 0, 4);
pub const ID_AA64DFR0_TRACEVER: BitField = BitField::new("tracever", 4, 4);
pub const ID_AA64DFR0_PMUVER: BitField = BitField::new("pmuver", 8, 4);
pub const ID_AA64DFR0_BRPS: BitField = BitField::new("brps", 12, 4);
pub const ID_AA64DFR0_WRPS: BitField = BitField::new("wrps", 20, 4);
pub const ID_AA64DFR0_CTX_CMPS: BitField = BitField::new("ctx_cmps", 28, 4);
pub const ID_AA64DFR0_PMSVER: BitField = BitField::new("pmsver", 32, 4);
pub const ID_AA64DFR0_DOUBLELOCK: BitField = BitField::new("doublelock", 36, 4);

pub const ID_AA64DFR0: RegisterLayout = RegisterLayout {
    name: "id_aa64dfr0_el1",
    bits: 64,
    fields: &[
        ID_AA64DFR0_DEBUGVER,
        ID_AA64DFR0_TRACEVER,
        ID_AA64DFR0_PMUVER,
        ID_AA64DFR0_BRPS,
        ID_AA64DFR0_WRPS,
        ID_AA64DFR0_CTX_CMPS,
        ID_AA64DFR0_PMSVER,
        ID_AA64DFR0_DOUBLELOCK,
    ],
};

pub const MDSCR_SS: BitField = BitField::new("ss", 0, 1);
pub const MDSCR_ERR: BitField = BitField::new("err", 6, 1);
pub const MDSCR_TDCC: BitField = BitField::new("tdcc", 12, 1);
pub const MDSCR_KDE: BitField = BitField::new("kde", 13, 1);
pub const MDSCR_HDE: BitField = BitField::new("hde", 14, 1);
pub const MDSCR_MDE: BitField = BitField::new("mde", 15, 1);
pub const MDSCR_TDA: BitField = BitField::new("tda", 21, 1);
pub const MDSCR_INTDIS: BitField = BitField::new("intdis", 22, 2);
pub const MDSCR_TXU: BitField = BitField::new("txu", 26, 1);
pub const MDSCR_RXO: BitField = BitField::new("rxo", 27, 1);
pub const MDSCR_TXFULL: BitField = BitField::new("txfull", 29, 1);
pub const MDSCR_RXFULL: BitField = BitField::new("rxfull", 30, 1);

pub const MDSCR: RegisterLayout = RegisterLayout {
    name: "mdscr_el1",
    bits: 64,
    fields: &[
        MDSCR_SS,
        MDSCR_ERR,
        MDSCR_TDCC,
        MDSCR_KDE,
        MDSCR_HDE,
        MDSCR_MDE,
        MDSCR_TDA,
        MDSCR_INTDIS,
        MDSCR_TXU,
        MDSCR_RXO,
        MDSCR_TXFULL,
        MDSCR_RXFULL,
    ],
};

/// `PMC`/`PAC` value matching EL0 (user space) only.
pub const PRIVILEGE_EL0: u64 = 0b10;

/// Values of the DBGWCR `LSC` field.
pub mod lsc_values
{
    pub const LOAD: u64 = 0b01;
    pub const STORE: u64 = 0b10;
    pub const LOAD_STORE: u64 = 0b11;
}

/// ESR_EL1 exception classes the classifier knows about.
pub mod exception_class
{
    pub const HW_BREAKPOINT_LOWER_EL: u64 = 0x30;
    pub const HW_BREAKPOINT_SAME_EL: u64 = 0x31;
    pub const SOFTWARE_STEP_LOWER_EL: u64 = 0x32;
    pub const SOFTWARE_STEP_SAME_EL: u64 = 0x33;
    pub const WATCHPOINT_LOWER_EL: u64 = 0x34;
    pub const WATCHPOINT_SAME_EL: u64 = 0x35;
    pub const BRK_INSTRUCTION: u64 = 0x3c;
}

/// Snapshot of the ARM64 debug register block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Arm64DebugBlock
{
    pub dbgbcr: [u32; MAX_HW_SLOTS],
    pub dbgbvr: [u64; MAX_HW_SLOTS],
    pub dbgwcr: [u32; MAX_HW_SLOTS],
    pub dbgwvr: [u64; MAX_HW_SLOTS],
    pub id_aa64dfr0: u64,
    pub mdscr: u64,
    pub esr: u32,
    pub far: u64,
}

impl Arm64DebugBlock
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
        for slot in 0..MAX_HW_SLOTS {
            let bp = debug_offsets::BREAKPOINTS + slot * debug_offsets::PAIR_STRIDE;
            let wp = debug_offsets::WATCHPOINTS + slot * debug_offsets::PAIR_STRIDE;
            block.dbgbcr[slot] = read_u32(bytes, bp);
            block.dbgbvr[slot] = read_u64(bytes, bp + 8);
            block.dbgwcr[slot] = read_u32(bytes, wp);
            block.dbgwvr[slot] = read_u64(bytes, wp + 8);
        }
        block.id_aa64dfr0 = read_u64(bytes, debug_offsets::ID_AA64DFR0);
        block.mdscr = read_u64(bytes, debug_offsets::MDSCR);
        block.esr = read_u32(bytes, debug_offsets::ESR);
        block.far = read_u64(bytes, debug_offsets::FAR);
        Ok(block)
    }

    /// Write the snapshot back into `bytes`, leaving padding untouched.
    ///
    /// ## Errors
    ///
    /// `BlockSizeMismatch` if `bytes` is not exactly the debug block size.
    pub fn write_to(&self, bytes: &mut [u8]) -> HwDebugResult<()>
    {
        check_block_size(RegisterCategory::Debug, bytes, DEBUG_BLOCK_SIZE)?;
        for slot in 0..MAX_HW_SLOTS {
            let bp = debug_offsets::BREAKPOINTS + slot * debug_offsets::PAIR_STRIDE;
            let wp = debug_offsets::WATCHPOINTS + slot * debug_offsets::PAIR_STRIDE;
            write_u32(bytes, bp, self.dbgbcr[slot]);
            write_u64(bytes, bp + 8, self.dbgbvr[slot]);
            write_u32(bytes, wp, self.dbgwcr[slot]);
            write_u64(bytes, wp + 8, self.dbgwvr[slot]);
        }
        write_u64(bytes, debug_offsets::ID_AA64DFR0, self.id_aa64dfr0);
        write_u64(bytes, debug_offsets::MDSCR, self.mdscr);
        write_u32(bytes, debug_offsets::ESR, self.esr);
        write_u64(bytes, debug_offsets::FAR, self.far);
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

    /// Implemented breakpoint pairs (`BRPs + 1`), capped at the block size.
    #[must_use]
    pub fn breakpoint_slots(&self) -> usize
    {
        slots_from_field(ID_AA64DFR0_BRPS.get(self.id_aa64dfr0))
    }

    /// Implemented watchpoint pairs (`WRPs + 1`), capped at the block size.
    #[must_use]
    pub fn watchpoint_slots(&self) -> usize
    {
        slots_from_field(ID_AA64DFR0_WRPS.get(self.id_aa64dfr0))
    }

    #[must_use]
    pub fn breakpoint_enabled(&self, slot: usize) -> bool
    {
        DBGBCR_E.is_set(u64::from(self.dbgbcr[slot]))
    }

    #[must_use]
    pub fn watchpoint_enabled(&self, slot: usize) -> bool
    {
        DBGWCR_E.is_set(u64::from(self.dbgwcr[slot]))
    }

    /// Build an ID_AA64DFR0_EL1 value advertising the given slot counts
    /// (both 1..=16).
    #[must_use]
    pub fn id_aa64dfr0_for(breakpoints: usize, watchpoints: usize) -> u64
    {
        let raw = ID_AA64DFR0_DEBUGVER.with(0, 0x6);
        let raw = ID_AA64DFR0_BRPS.with(raw, breakpoints.saturating_sub(1) as u64);
        ID_AA64DFR0_WRPS.with(raw, watchpoints.saturating_sub(1) as u64)
    }
}

fn slots_from_field(field: u64) -> usize
{
    (field as usize + 1).min(MAX_HW_SLOTS)
}

/// Truncate a control register value to its architectural 32 bits.
pub(crate) fn to_control(raw: u64) -> u32
{
    (raw & u64::from(u32::MAX)) as u32
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_slot_discovery()
    {
        let block = Arm64DebugBlock {
            id_aa64dfr0: Arm64DebugBlock::id_aa64dfr0_for(6, 4),
            ..Default::default()
        };
        assert_eq!(block.breakpoint_slots(), 6);
        assert_eq!(block.watchpoint_slots(), 4);
        assert_eq!(ID_AA64DFR0.get(block.id_aa64dfr0, "brps"), Some(5));
    }

    #[test]
    fn test_block_bytes_preserve_padding()
    {
        let mut bytes = vec![0xaau8; DEBUG_BLOCK_SIZE];
        let mut block = Arm64DebugBlock::from_bytes(&bytes).unwrap();
        block.dbgbcr[3] = 0x1e5;
        block.write_to(&mut bytes).unwrap();
        // Padding between dbgbcr3 and dbgbvr3 keeps its original content.
        let pair = debug_offsets::BREAKPOINTS + 3 * debug_offsets::PAIR_STRIDE;
        assert_eq!(&bytes[pair..pair + 4], &0x1e5u32.to_le_bytes());
        assert_eq!(&bytes[pair + 4..pair + 8], &[0xaa; 4]);
    }

    #[test]
    fn test_user_exec_breakpoint_control_value()
    {
        let raw = DBGBCR_E.with(0, 1);
        let raw = DBGBCR_PMC.with(raw, PRIVILEGE_EL0);
        let raw = DBGBCR_BAS.with(raw, 0b1111);
        assert_eq!(raw, 0x1e5);
    }
}

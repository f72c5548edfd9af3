//! # ARM64 Register Catalog
//!
//! Register ids, names and OS block layouts for AArch64.
//!
//! ## Block Layouts
//!
//! All blocks are little-endian and fixed-size.
//!
//! ```text
//! General (280 bytes)      Vector (520 bytes)      Debug (544 bytes)
//! 0x000 x0 .. x29          0x000 fpcr (u32)        0x000 16 x { dbgbcr u32, pad u32, dbgbvr u64 }
//! 0x0f0 lr (x30)           0x004 fpsr (u32)        0x100 16 x { dbgwcr u32, pad u32, dbgwvr u64 }
//! 0x0f8 sp                 0x008 v0 .. v31 (u128)  0x200 id_aa64dfr0_el1
//! 0x100 pc                                         0x208 mdscr_el1
//! 0x108 cpsr                                       0x210 esr_el1 (u32), pad
//! 0x110 tpidr                                      0x218 far_el1
//! ```
//!
//! There is no floating-point block: AArch64 keeps scalar floating point in
//! the NEON registers, so FPCR/FPSR live in the vector block.
//!
//! ## References
//!
//! - [AArch64 general-purpose registers](https://developer.arm.com/documentation/102374/0101/Registers-in-AArch64---general-purpose-registers)
//! - [DWARF for the Arm 64-bit Architecture](https://github.com/ARM-software/abi-aa/blob/main/aadwarf64/aadwarf64.rst)

use super::{CatalogBuilder, RegisterFormat, RegisterInfo};
use crate::types::{Architecture, RegisterCategory, RegisterId};

/// Number of breakpoint and watchpoint pairs the debug block stores.
pub const MAX_HW_SLOTS: usize = 16;

pub const GENERAL_BLOCK_SIZE: usize = 280;
pub const VECTOR_BLOCK_SIZE: usize = 520;
pub const DEBUG_BLOCK_SIZE: usize = 544;

/// Byte offsets inside the debug block.
pub mod debug_offsets
{
    /// Stride of one `{ control, value }` pair.
    pub const PAIR_STRIDE: usize = 16;
    pub const BREAKPOINTS: usize = 0x000;
    pub const WATCHPOINTS: usize = 0x100;
    pub const ID_AA64DFR0: usize = 0x200;
    pub const MDSCR: usize = 0x208;
    pub const ESR: usize = 0x210;
    pub const FAR: usize = 0x218;
}

// General purpose: 1000-1099
pub const X0: RegisterId = RegisterId::from_raw(1000);
pub const X29: RegisterId = RegisterId::from_raw(1029);
pub const LR: RegisterId = RegisterId::from_raw(1030);
pub const SP: RegisterId = RegisterId::from_raw(1031);
pub const PC: RegisterId = RegisterId::from_raw(1032);
pub const CPSR: RegisterId = RegisterId::from_raw(1033);
pub const TPIDR: RegisterId = RegisterId::from_raw(1034);
pub const W0: RegisterId = RegisterId::from_raw(1040);

// Vector: 1100-1199
pub const FPCR: RegisterId = RegisterId::from_raw(1100);
pub const FPSR: RegisterId = RegisterId::from_raw(1101);
pub const V0: RegisterId = RegisterId::from_raw(1110);

// Debug: 1200-1299
pub const ID_AA64DFR0_EL1: RegisterId = RegisterId::from_raw(1200);
pub const MDSCR_EL1: RegisterId = RegisterId::from_raw(1201);
pub const DBGBCR0_EL1: RegisterId = RegisterId::from_raw(1210);
pub const DBGBVR0_EL1: RegisterId = RegisterId::from_raw(1230);
pub const DBGWCR0_EL1: RegisterId = RegisterId::from_raw(1250);
pub const DBGWVR0_EL1: RegisterId = RegisterId::from_raw(1270);

/// `x0`..`x29`; `x30` is [`LR`].
#[must_use]
pub const fn x(n: u32) -> RegisterId
{
    assert!(n < 30, "x30 is lr");
    RegisterId::from_raw(X0.raw() + n)
}

/// `w0`..`w30`, the low 32 bits of `x0`..`x30`.
#[must_use]
pub const fn w(n: u32) -> RegisterId
{
    assert!(n <= 30);
    RegisterId::from_raw(W0.raw() + n)
}

/// NEON `v0`..`v31`.
#[must_use]
pub const fn v(n: u32) -> RegisterId
{
    assert!(n < 32);
    RegisterId::from_raw(V0.raw() + n)
}

#[must_use]
pub const fn dbgbcr(slot: u32) -> RegisterId
{
    assert!(slot < MAX_HW_SLOTS as u32);
    RegisterId::from_raw(DBGBCR0_EL1.raw() + slot)
}

#[must_use]
pub const fn dbgbvr(slot: u32) -> RegisterId
{
    assert!(slot < MAX_HW_SLOTS as u32);
    RegisterId::from_raw(DBGBVR0_EL1.raw() + slot)
}

#[must_use]
pub const fn dbgwcr(slot: u32) -> RegisterId
{
    assert!(slot < MAX_HW_SLOTS as u32);
    RegisterId::from_raw(DBGWCR0_EL1.raw() + slot)
}

#[must_use]
pub const fn dbgwvr(slot: u32) -> RegisterId
{
    assert!(slot < MAX_HW_SLOTS as u32);
    RegisterId::from_raw(DBGWVR0_EL1.raw() + slot)
}

pub(super) const fn block_size(category: RegisterCategory) -> Option<usize>
{
    match category {
        RegisterCategory::General => Some(GENERAL_BLOCK_SIZE),
        RegisterCategory::FloatingPoint => None,
        RegisterCategory::Vector => Some(VECTOR_BLOCK_SIZE),
        RegisterCategory::Debug => Some(DEBUG_BLOCK_SIZE),
    }
}

const X_NAMES: [&str; 30] = [
    "x0", "x1", "x2", "x3", "x4", "x5", "x6", "x7", "x8", "x9", "x10", "x11", "x12", "x13", "x14", "x15", "x16", "x17",
    "x18", "x19", "x20", "x21", "x22", "x23", "x24", "x25", "x26", "x27", "x28", "x29",
];

const W_NAMES: [&str; 31] = [
    "w0", "w1", "w2", "w3", "w4", "w5", "w6", "w7", "w8", "w9", "w10", "w11", "w12", "w13", "w14", "w15", "w16", "w17",
    "w18", "w19", "w20", "w21", "w22", "w23", "w24", "w25", "w26", "w27", "w28", "w29", "w30",
];

const V_NAMES: [&str; 32] = [
    "v0", "v1", "v2", "v3", "v4", "v5", "v6", "v7", "v8", "v9", "v10", "v11", "v12", "v13", "v14", "v15", "v16", "v17",
    "v18", "v19", "v20", "v21", "v22", "v23", "v24", "v25", "v26", "v27", "v28", "v29", "v30", "v31",
];

const DBGBCR_NAMES: [&str; MAX_HW_SLOTS] = [
    "dbgbcr0_el1", "dbgbcr1_el1", "dbgbcr2_el1", "dbgbcr3_el1", "dbgbcr4_el1", "dbgbcr5_el1", "dbgbcr6_el1",
    "dbgbcr7_el1", "dbgbcr8_el1", "dbgbcr9_el1", "dbgbcr10_el1", "dbgbcr11_el1", "dbgbcr12_el1", "dbgbcr13_el1",
    "dbgbcr14_el1", "dbgbcr15_el1",
];

const DBGBVR_NAMES: [&str; MAX_HW_SLOTS] = [
    "dbgbvr0_el1", "dbgbvr1_el1", "dbgbvr2_el1", "dbgbvr3_el1", "dbgbvr4_el1", "dbgbvr5_el1", "dbgbvr6_el1",
    "dbgbvr7_el1", "dbgbvr8_el1", "dbgbvr9_el1", "dbgbvr10_el1", "dbgbvr11_el1", "dbgbvr12_el1", "dbgbvr13_el1",
    "dbgbvr14_el1", "dbgbvr15_el1",
];

const DBGWCR_NAMES: [&str; MAX_HW_SLOTS] = [
    "dbgwcr0_el1", "dbgwcr1_el1", "dbgwcr2_el1", "dbgwcr3_el1", "dbgwcr4_el1", "dbgwcr5_el1", "dbgwcr6_el1",
    "dbgwcr7_el1", "dbgwcr8_el1", "dbgwcr9_el1", "dbgwcr10_el1", "dbgwcr11_el1", "dbgwcr12_el1", "dbgwcr13_el1",
    "dbgwcr14_el1", "dbgwcr15_el1",
];

const DBGWVR_NAMES: [&str; MAX_HW_SLOTS] = [
    "dbgwvr0_el1", "dbgwvr1_el1", "dbgwvr2_el1", "dbgwvr3_el1", "dbgwvr4_el1", "dbgwvr5_el1", "dbgwvr6_el1",
    "dbgwvr7_el1", "dbgwvr8_el1", "dbgwvr9_el1", "dbgwvr10_el1", "dbgwvr11_el1", "dbgwvr12_el1", "dbgwvr13_el1",
    "dbgwvr14_el1", "dbgwvr15_el1",
];

/// Build the ARM64 part of the descriptor table.
pub(super) fn catalog() -> Vec<RegisterInfo>
{
    use RegisterFormat::{Address, Integer, Special, Vector};

    let mut b = CatalogBuilder::new(Architecture::Arm64);

    b.category(RegisterCategory::General);
    for (n, name) in (0u32..).zip(X_NAMES) {
        let format = if n == 29 { Address } else { Integer };
        b.canonical(RegisterId::from_raw(X0.raw() + n), name, 8, format, n as usize * 8, Some(n));
    }
    b.canonical(LR, "lr", 8, Address, 0xf0, Some(30))
        .canonical(SP, "sp", 8, Address, 0xf8, Some(31))
        .canonical(PC, "pc", 8, Address, 0x100, None)
        .canonical(CPSR, "cpsr", 8, Special, 0x108, None)
        .canonical(TPIDR, "tpidr", 8, Address, 0x110, None);
    for (n, name) in (0u32..).zip(W_NAMES) {
        let canonical = if n == 30 { LR } else { RegisterId::from_raw(X0.raw() + n) };
        b.sub(w(n), name, canonical, 32, 0, Integer);
    }

    b.category(RegisterCategory::Vector);
    b.canonical(FPCR, "fpcr", 4, Special, 0x000, None)
        .canonical(FPSR, "fpsr", 4, Special, 0x004, None);
    for (n, name) in (0u32..).zip(V_NAMES) {
        b.canonical(v(n), name, 16, Vector, 0x008 + n as usize * 16, Some(64 + n));
    }

    b.category(RegisterCategory::Debug);
    b.canonical(ID_AA64DFR0_EL1, "id_aa64dfr0_el1", 8, Special, debug_offsets::ID_AA64DFR0, None)
        .canonical(MDSCR_EL1, "mdscr_el1", 8, Special, debug_offsets::MDSCR, None);
    for slot in 0..MAX_HW_SLOTS {
        let pair = debug_offsets::BREAKPOINTS + slot * debug_offsets::PAIR_STRIDE;
        b.canonical(dbgbcr(slot as u32), DBGBCR_NAMES[slot], 4, Special, pair, None);
    }
    for slot in 0..MAX_HW_SLOTS {
        let pair = debug_offsets::BREAKPOINTS + slot * debug_offsets::PAIR_STRIDE;
        b.canonical(dbgbvr(slot as u32), DBGBVR_NAMES[slot], 8, Address, pair + 8, None);
    }
    for slot in 0..MAX_HW_SLOTS {
        let pair = debug_offsets::WATCHPOINTS + slot * debug_offsets::PAIR_STRIDE;
        b.canonical(dbgwcr(slot as u32), DBGWCR_NAMES[slot], 4, Special, pair, None);
    }
    for slot in 0..MAX_HW_SLOTS {
        let pair = debug_offsets::WATCHPOINTS + slot * debug_offsets::PAIR_STRIDE;
        b.canonical(dbgwvr(slot as u32), DBGWVR_NAMES[slot], 8, Address, pair + 8, None);
    }

    b.finish()
}

//! # x86-64 Register Catalog
//!
//! Register ids, names and OS block layouts for x86-64.
//!
//! ## Block Layouts
//!
//! ```text
//! General (160 bytes)   Floating point (160 bytes)   Vector (2120 bytes)      Debug (48 bytes)
//! 0x00 rax              0x00 fcw (u16)               0x000 zmm0 .. zmm31      0x00 dr0
//! 0x08 rbx              0x02 fsw (u16)                     (64 bytes each)    0x08 dr1
//! 0x10 rcx              0x04 ftw (u8), reserved      0x800 k0 .. k7           0x10 dr2
//! 0x18 rdx              0x06 fop (u16)               0x840 mxcsr (u32), pad   0x18 dr3
//! 0x20 rsi              0x08 fip                                              0x20 dr6
//! 0x28 rdi              0x10 fdp                                              0x28 dr7
//! 0x30 rbp              0x18 padding
//! 0x38 rsp              0x20 st0 .. st7 (16-byte slots, 10 bytes used)
//! 0x40 r8 .. r15
//! 0x80 rip
//! 0x88 rflags
//! 0x90 fs_base
//! 0x98 gs_base
//! ```
//!
//! `xmm`/`ymm` registers are the low 128/256 bits of the matching `zmm`.
//! DR4/DR5 are aliases of DR6/DR7 and are not stored.
//!
//! ## References
//!
//! - [System V AMD64 psABI, DWARF register numbers](https://gitlab.com/x86-psABIs/x86-64-ABI)

use super::{CatalogBuilder, RegisterFormat, RegisterInfo};
use crate::types::{Architecture, RegisterCategory, RegisterId};

/// Number of DR0-DR3 address slots.
pub const HW_SLOTS: usize = 4;

pub const GENERAL_BLOCK_SIZE: usize = 160;
pub const FP_BLOCK_SIZE: usize = 160;
pub const VECTOR_BLOCK_SIZE: usize = 2120;
pub const DEBUG_BLOCK_SIZE: usize = 48;

/// Byte offsets inside the debug block.
pub mod debug_offsets
{
    pub const DR0: usize = 0x00;
    pub const DR6: usize = 0x20;
    pub const DR7: usize = 0x28;
}

// General purpose: 2000-2099
pub const RAX: RegisterId = RegisterId::from_raw(2000);
pub const RBX: RegisterId = RegisterId::from_raw(2001);
pub const RCX: RegisterId = RegisterId::from_raw(2002);
pub const RDX: RegisterId = RegisterId::from_raw(2003);
pub const RSI: RegisterId = RegisterId::from_raw(2004);
pub const RDI: RegisterId = RegisterId::from_raw(2005);
pub const RBP: RegisterId = RegisterId::from_raw(2006);
pub const RSP: RegisterId = RegisterId::from_raw(2007);
pub const R8: RegisterId = RegisterId::from_raw(2008);
pub const R15: RegisterId = RegisterId::from_raw(2015);
pub const RIP: RegisterId = RegisterId::from_raw(2016);
pub const RFLAGS: RegisterId = RegisterId::from_raw(2017);
pub const FS_BASE: RegisterId = RegisterId::from_raw(2018);
pub const GS_BASE: RegisterId = RegisterId::from_raw(2019);
pub const EAX: RegisterId = RegisterId::from_raw(2030);
pub const AX: RegisterId = RegisterId::from_raw(2050);
pub const AL: RegisterId = RegisterId::from_raw(2070);
pub const AH: RegisterId = RegisterId::from_raw(2086);

// Floating point: 2100-2199
pub const FCW: RegisterId = RegisterId::from_raw(2100);
pub const FSW: RegisterId = RegisterId::from_raw(2101);
pub const FTW: RegisterId = RegisterId::from_raw(2102);
pub const FOP: RegisterId = RegisterId::from_raw(2103);
pub const FIP: RegisterId = RegisterId::from_raw(2104);
pub const FDP: RegisterId = RegisterId::from_raw(2105);
pub const ST0: RegisterId = RegisterId::from_raw(2110);

// Vector: 2200-2399
pub const MXCSR: RegisterId = RegisterId::from_raw(2200);
pub const XMM0: RegisterId = RegisterId::from_raw(2210);
pub const YMM0: RegisterId = RegisterId::from_raw(2230);
pub const K0: RegisterId = RegisterId::from_raw(2260);
pub const ZMM0: RegisterId = RegisterId::from_raw(2300);

// Debug: 2400-2499
pub const DR0: RegisterId = RegisterId::from_raw(2400);
pub const DR1: RegisterId = RegisterId::from_raw(2401);
pub const DR2: RegisterId = RegisterId::from_raw(2402);
pub const DR3: RegisterId = RegisterId::from_raw(2403);
pub const DR6: RegisterId = RegisterId::from_raw(2406);
pub const DR7: RegisterId = RegisterId::from_raw(2407);

#[must_use]
pub const fn st(n: u32) -> RegisterId
{
    assert!(n < 8);
    RegisterId::from_raw(ST0.raw() + n)
}

#[must_use]
pub const fn xmm(n: u32) -> RegisterId
{
    assert!(n < 16);
    RegisterId::from_raw(XMM0.raw() + n)
}

#[must_use]
pub const fn ymm(n: u32) -> RegisterId
{
    assert!(n < 16);
    RegisterId::from_raw(YMM0.raw() + n)
}

#[must_use]
pub const fn zmm(n: u32) -> RegisterId
{
    assert!(n < 32);
    RegisterId::from_raw(ZMM0.raw() + n)
}

#[must_use]
pub const fn k(n: u32) -> RegisterId
{
    assert!(n < 8);
    RegisterId::from_raw(K0.raw() + n)
}

pub(super) const fn block_size(category: RegisterCategory) -> Option<usize>
{
    match category {
        RegisterCategory::General => Some(GENERAL_BLOCK_SIZE),
        RegisterCategory::FloatingPoint => Some(FP_BLOCK_SIZE),
        RegisterCategory::Vector => Some(VECTOR_BLOCK_SIZE),
        RegisterCategory::Debug => Some(DEBUG_BLOCK_SIZE),
    }
}

/// The sixteen integer registers in block order with their DWARF numbers.
const GPRS: [(&str, u32); 16] = [
    ("rax", 0),
    ("rbx", 3),
    ("rcx", 2),
    ("rdx", 1),
    ("rsi", 4),
    ("rdi", 5),
    ("rbp", 6),
    ("rsp", 7),
    ("r8", 8),
    ("r9", 9),
    ("r10", 10),
    ("r11", 11),
    ("r12", 12),
    ("r13", 13),
    ("r14", 14),
    ("r15", 15),
];

const GPR32_NAMES: [&str; 16] = [
    "eax", "ebx", "ecx", "edx", "esi", "edi", "ebp", "esp", "r8d", "r9d", "r10d", "r11d", "r12d", "r13d", "r14d", "r15d",
];

const GPR16_NAMES: [&str; 16] = [
    "ax", "bx", "cx", "dx", "si", "di", "bp", "sp", "r8w", "r9w", "r10w", "r11w", "r12w", "r13w", "r14w", "r15w",
];

const GPR8_NAMES: [&str; 16] = [
    "al", "bl", "cl", "dl", "sil", "dil", "bpl", "spl", "r8b", "r9b", "r10b", "r11b", "r12b", "r13b", "r14b", "r15b",
];

const GPR8_HIGH_NAMES: [&str; 4] = ["ah", "bh", "ch", "dh"];

const ST_NAMES: [&str; 8] = ["st0", "st1", "st2", "st3", "st4", "st5", "st6", "st7"];

const XMM_NAMES: [&str; 16] = [
    "xmm0", "xmm1", "xmm2", "xmm3", "xmm4", "xmm5", "xmm6", "xmm7", "xmm8", "xmm9", "xmm10", "xmm11", "xmm12", "xmm13",
    "xmm14", "xmm15",
];

const YMM_NAMES: [&str; 16] = [
    "ymm0", "ymm1", "ymm2", "ymm3", "ymm4", "ymm5", "ymm6", "ymm7", "ymm8", "ymm9", "ymm10", "ymm11", "ymm12", "ymm13",
    "ymm14", "ymm15",
];

const ZMM_NAMES: [&str; 32] = [
    "zmm0", "zmm1", "zmm2", "zmm3", "zmm4", "zmm5", "zmm6", "zmm7", "zmm8", "zmm9", "zmm10", "zmm11", "zmm12", "zmm13",
    "zmm14", "zmm15", "zmm16", "zmm17", "zmm18", "zmm19", "zmm20", "zmm21", "zmm22", "zmm23", "zmm24", "zmm25",
    "zmm26", "zmm27", "zmm28", "zmm29", "zmm30", "zmm31",
];

const K_NAMES: [&str; 8] = ["k0", "k1", "k2", "k3", "k4", "k5", "k6", "k7"];

/// Build the x86-64 part of the descriptor table.
pub(super) fn catalog() -> Vec<RegisterInfo>
{
    use RegisterFormat::{Address, Float, Integer, Special, Vector};

    let mut b = CatalogBuilder::new(Architecture::X64);

    b.category(RegisterCategory::General);
    for (n, (name, dwarf)) in (0u32..).zip(GPRS) {
        let format = if matches!(name, "rbp" | "rsp") { Address } else { Integer };
        b.canonical(RegisterId::from_raw(RAX.raw() + n), name, 8, format, n as usize * 8, Some(dwarf));
    }
    b.canonical(RIP, "rip", 8, Address, 0x80, Some(16))
        .canonical(RFLAGS, "rflags", 8, Special, 0x88, Some(49))
        .canonical(FS_BASE, "fs_base", 8, Address, 0x90, Some(58))
        .canonical(GS_BASE, "gs_base", 8, Address, 0x98, Some(59));
    for n in 0u32..16 {
        let canonical = RegisterId::from_raw(RAX.raw() + n);
        b.sub(RegisterId::from_raw(EAX.raw() + n), GPR32_NAMES[n as usize], canonical, 32, 0, Integer)
            .sub(RegisterId::from_raw(AX.raw() + n), GPR16_NAMES[n as usize], canonical, 16, 0, Integer)
            .sub(RegisterId::from_raw(AL.raw() + n), GPR8_NAMES[n as usize], canonical, 8, 0, Integer);
    }
    for (n, name) in (0u32..).zip(GPR8_HIGH_NAMES) {
        b.sub(RegisterId::from_raw(AH.raw() + n), name, RegisterId::from_raw(RAX.raw() + n), 8, 8, Integer);
    }

    b.category(RegisterCategory::FloatingPoint);
    b.canonical(FCW, "fcw", 2, Special, 0x00, Some(65))
        .canonical(FSW, "fsw", 2, Special, 0x02, Some(66))
        .canonical(FTW, "ftw", 1, Special, 0x04, None)
        .canonical(FOP, "fop", 2, Integer, 0x06, None)
        .canonical(FIP, "fip", 8, Address, 0x08, None)
        .canonical(FDP, "fdp", 8, Address, 0x10, None);
    for (n, name) in (0u32..).zip(ST_NAMES) {
        b.canonical(st(n), name, 10, Float, 0x20 + n as usize * 16, Some(33 + n));
    }

    b.category(RegisterCategory::Vector);
    b.canonical(MXCSR, "mxcsr", 4, Special, 0x840, Some(64));
    for (n, name) in (0u32..).zip(ZMM_NAMES) {
        b.canonical(zmm(n), name, 64, Vector, n as usize * 64, None);
    }
    for (n, name) in (0u32..).zip(K_NAMES) {
        b.canonical(k(n), name, 8, Integer, 0x800 + n as usize * 8, Some(118 + n));
    }
    for (n, name) in (0u32..).zip(XMM_NAMES) {
        b.sub(xmm(n), name, zmm(n), 128, 0, Vector).dwarf(17 + n);
    }
    for (n, name) in (0u32..).zip(YMM_NAMES) {
        b.sub(ymm(n), name, zmm(n), 256, 0, Vector);
    }

    b.category(RegisterCategory::Debug);
    b.canonical(DR0, "dr0", 8, Address, 0x00, None)
        .canonical(DR1, "dr1", 8, Address, 0x08, None)
        .canonical(DR2, "dr2", 8, Address, 0x10, None)
        .canonical(DR3, "dr3", 8, Address, 0x18, None)
        .canonical(DR6, "dr6", 8, Special, debug_offsets::DR6, None)
        .canonical(DR7, "dr7", 8, Special, debug_offsets::DR7, None);

    b.finish()
}

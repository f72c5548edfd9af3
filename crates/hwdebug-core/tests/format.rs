//! Tests for register filtering and table rendering

use hwdebug_core::format::{format_register_table, RegisterFilter};
use hwdebug_core::platform::SnapshotThread;
use hwdebug_core::provider::ArchProvider;
use hwdebug_core::registers::{arm64, x64};
use hwdebug_core::types::{Architecture, Register, RegisterCategory};

#[test]
fn test_table_groups_by_category()
{
    let registers = vec![
        Register::from_u64(x64::DR7, 0x1).unwrap(),
        Register::from_u64(x64::RAX, 0x2a).unwrap(),
        Register::from_u64(x64::RIP, 0x40_1000).unwrap(),
    ];
    let table = format_register_table(Architecture::X64, &registers, &RegisterFilter::all());
    let expected = "\
General Purpose
  rax  0x000000000000002a
  rip  0x0000000000401000

Debug
  dr7  0x0000000000000001
";
    assert_eq!(table, expected);
}

#[test]
fn test_name_pattern_is_case_insensitive()
{
    let registers = vec![
        Register::from_u64(x64::RAX, 1).unwrap(),
        Register::from_u64(x64::RBX, 2).unwrap(),
        Register::from_u64(x64::RSI, 3).unwrap(),
    ];
    let filter = RegisterFilter::all().with_name_pattern("^R[AB]X$").unwrap();
    let table = format_register_table(Architecture::X64, &registers, &filter);
    assert!(table.contains("rax"));
    assert!(table.contains("rbx"));
    assert!(!table.contains("rsi"));
}

#[test]
fn test_category_filter_and_foreign_registers()
{
    let registers = vec![
        Register::from_u64(x64::RAX, 1).unwrap(),
        Register::from_u64(x64::MXCSR, 0x1f80).unwrap(),
        Register::from_u64(arm64::PC, 0x1000).unwrap(),
    ];
    let filter = RegisterFilter::all().with_categories(&[RegisterCategory::Vector]);
    let table = format_register_table(Architecture::X64, &registers, &filter);
    assert_eq!(table, "Vector\n  mxcsr  0x00001f80\n");

    let none = RegisterFilter::all().with_categories(&[]);
    assert!(format_register_table(Architecture::X64, &registers, &none).is_empty());
}

#[test]
fn test_wide_registers_render_as_lanes()
{
    let mut bytes = [0u8; 16];
    bytes[0] = 0x01;
    bytes[15] = 0xff;
    let v0 = Register::new(arm64::V0, &bytes).unwrap();
    let table = format_register_table(Architecture::Arm64, &[v0], &RegisterFilter::all());
    assert!(table.contains("v0  0xff00000000000000 0000000000000001"));
}

#[test]
fn test_formats_a_full_provider_read()
{
    let thread = SnapshotThread::new(Architecture::Arm64);
    let registers = ArchProvider::Arm64
        .read_registers(&thread, RegisterCategory::General)
        .unwrap();
    let table = format_register_table(Architecture::Arm64, &registers, &RegisterFilter::default());
    assert_eq!(table.lines().count(), 1 + registers.len());
    assert!(table.starts_with("General Purpose\n"));
    assert!(table.contains("  tpidr  0x0000000000000000"));
}

#[test]
fn test_invalid_pattern()
{
    assert!(RegisterFilter::all().with_name_pattern("[unclosed").is_err());
}

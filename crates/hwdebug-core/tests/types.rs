//! Tests for the shared value types

use hwdebug_core::provider::ArchProvider;
use hwdebug_core::types::{Address, AddressRange, Architecture};
use hwdebug_core::HwDebugError;

#[test]
fn test_address_arithmetic()
{
    let address = Address::new(0x1013);
    assert_eq!(address.align_down(8), Address::new(0x1010));
    assert!(Address::new(0x1010).is_aligned(8));
    assert!(!address.is_aligned(2));
    assert_eq!((address + 0x10).value(), 0x1023);
    assert_eq!((address - 0x13).value(), 0x1000);
    assert_eq!(Address::new(u64::MAX).checked_add(1), None);
    assert_eq!(format!("{address}"), "0x0000000000001013");
}

#[test]
fn test_address_range_requires_end_after_begin()
{
    assert!(AddressRange::new(0x10, 0x10).is_none());
    assert!(AddressRange::new(0x11, 0x10).is_none());
    assert!(AddressRange::with_size(0x10, 0).is_none());
    assert!(AddressRange::with_size(u64::MAX, 2).is_none());

    let range = AddressRange::with_size(0x10, 4).unwrap();
    assert_eq!(range.size(), 4);
    assert!(range.contains(Address::new(0x13)));
    assert!(!range.contains(Address::new(0x14)));
    assert!(range.contains_range(&AddressRange::new(0x11, 0x13).unwrap()));
    assert!(!range.contains_range(&AddressRange::new(0x12, 0x15).unwrap()));
    assert_eq!(range.to_string(), "[0x10, 0x14)");
}

#[test]
fn test_architecture_selection()
{
    assert_eq!(Architecture::Arm64.name(), "arm64");
    assert_eq!(Architecture::X64.to_string(), "x64");
    assert!(!Architecture::Unknown("riscv64").is_supported());

    assert_eq!(ArchProvider::for_arch(Architecture::X64).unwrap().arch(), Architecture::X64);
    assert!(matches!(
        ArchProvider::for_arch(Architecture::Unknown("riscv64")),
        Err(HwDebugError::InvalidArgument(_))
    ));

    let current = Architecture::current();
    assert_eq!(ArchProvider::current().is_ok(), current.is_supported());
}

//! Tests for error handling

use hwdebug_core::error::{HwDebugError, HwDebugResult, OsError};
use hwdebug_core::registers::x64;
use hwdebug_core::types::{Address, AddressRange, RegisterCategory};
use hwdebug_core::watchpoint::WatchpointType;

#[test]
fn test_os_error_from_status()
{
    assert_eq!(OsError::from(-2), OsError::NotSupported);
    assert_eq!(OsError::from(-11), OsError::BadHandle);
    assert_eq!(OsError::from(-20), OsError::BadState);
    assert_eq!(OsError::from(-30), OsError::AccessDenied);
    assert_eq!(OsError::from(-999), OsError::Unknown(-999));
    for error in [OsError::NotSupported, OsError::BadHandle, OsError::BadState, OsError::AccessDenied] {
        assert_eq!(OsError::from(error.status()), error);
    }
}

#[test]
fn test_os_error_converts_verbatim()
{
    let error: HwDebugError = OsError::AccessDenied.into();
    assert!(matches!(error, HwDebugError::Os(OsError::AccessDenied)));
    assert!(error.to_string().contains("Access denied"));
}

#[test]
fn test_error_messages()
{
    let error = HwDebugError::RegisterSizeMismatch {
        id: x64::RAX,
        expected: 8,
        actual: 4,
    };
    let message = error.to_string();
    assert!(message.contains("rax"));
    assert!(message.contains('8') && message.contains('4'));

    let error = HwDebugError::UnrepresentableRange(AddressRange::new(0x14, 0x19).unwrap());
    assert!(error.to_string().contains("[0x14, 0x19)"));

    let error = HwDebugError::BlockSizeMismatch {
        kind: RegisterCategory::Debug,
        expected: 48,
        actual: 40,
    };
    assert!(error.to_string().starts_with("Debug register block"));

    let error = HwDebugError::UnsupportedWatchpoint(WatchpointType::Read);
    assert!(error.to_string().contains("Read"));
}

#[test]
fn test_error_classes()
{
    assert!(HwDebugError::AlreadyInstalled(Address::new(0x1000)).is_soft());
    assert!(HwDebugError::NotFound(Address::new(0x1000)).is_soft());
    assert!(!HwDebugError::ResourceExhausted("slots".into()).is_soft());
    assert!(HwDebugError::InvariantViolation("bad EC".into()).is_fatal());
    assert!(!HwDebugError::Os(OsError::BadState).is_fatal());
}

#[test]
fn test_result_alias()
{
    fn fails() -> HwDebugResult<()>
    {
        Err(HwDebugError::InvalidArgument("test".into()))
    }
    assert!(fails().is_err());
}

//! Tests for the exception classifier

use hwdebug_core::error::OsError;
use hwdebug_core::exception::{arm64_kind_for_class, classify, classify_arm64, classify_x64, ExceptionKind, TrapCode};
use hwdebug_core::platform::{FaultState, SnapshotThread};
use hwdebug_core::provider::ArchProvider;
use hwdebug_core::types::{Address, Architecture};
use hwdebug_core::HwDebugError;

fn arm64_thread(ec: u64) -> SnapshotThread
{
    let mut thread = SnapshotThread::new(Architecture::Arm64);
    thread.set_fault_state(Ok(FaultState::Arm64 {
        esr: (ec << 26) | (1 << 25),
        far: 0,
    }));
    thread
}

fn x64_thread(dr6: u64, dr: [u64; 4]) -> SnapshotThread
{
    let mut thread = SnapshotThread::new(Architecture::X64);
    thread.set_fault_state(Ok(FaultState::X64 { dr6, dr }));
    thread
}

#[test]
fn test_direct_trap_codes()
{
    let thread = SnapshotThread::new(Architecture::X64);
    let cases = [
        (TrapCode::SW_BREAKPOINT, ExceptionKind::SoftwareBreakpoint),
        (TrapCode::THREAD_STARTING, ExceptionKind::ThreadStart),
        (TrapCode::THREAD_EXITING, ExceptionKind::ThreadExit),
        (TrapCode::PROCESS_STARTING, ExceptionKind::ProcessStart),
        (TrapCode::GENERAL, ExceptionKind::GeneralFault),
        (TrapCode::FATAL_PAGE_FAULT, ExceptionKind::GeneralFault),
        (TrapCode::UNDEFINED_INSTRUCTION, ExceptionKind::GeneralFault),
        (TrapCode::UNALIGNED_ACCESS, ExceptionKind::GeneralFault),
        (TrapCode::POLICY_ERROR, ExceptionKind::GeneralFault),
        (TrapCode(0xdead), ExceptionKind::GeneralFault),
    ];
    for arch in [Architecture::Arm64, Architecture::X64] {
        for (trap, kind) in cases {
            assert_eq!(classify(arch, trap, &thread).unwrap(), kind, "{arch} {trap}");
        }
    }
}

#[test]
fn test_software_breakpoint_ignores_fault_state()
{
    // Fault state claims a hardware breakpoint / DR0 hit.
    let arm = arm64_thread(0x30);
    assert_eq!(
        classify_arm64(TrapCode::SW_BREAKPOINT, &arm).unwrap(),
        ExceptionKind::SoftwareBreakpoint
    );
    let x64 = x64_thread(0x1, [0x1000, 0, 0, 0]);
    assert_eq!(
        classify_x64(TrapCode::SW_BREAKPOINT, &x64).unwrap(),
        ExceptionKind::SoftwareBreakpoint
    );
}

#[test]
fn test_arm64_exception_classes()
{
    let cases = [
        (0x30, ExceptionKind::HardwareBreakpoint),
        (0x31, ExceptionKind::HardwareBreakpoint),
        (0x32, ExceptionKind::SingleStep),
        (0x33, ExceptionKind::SingleStep),
        (0x34, ExceptionKind::Watchpoint),
        (0x35, ExceptionKind::Watchpoint),
        (0x3c, ExceptionKind::SoftwareBreakpoint),
    ];
    for (ec, kind) in cases {
        let thread = arm64_thread(ec);
        assert_eq!(classify_arm64(TrapCode::HW_BREAKPOINT, &thread).unwrap(), kind, "EC {ec:#x}");
        assert_eq!(arm64_kind_for_class(ec), Some(kind));
    }
}

#[test]
fn test_arm64_unknown_class_is_fatal()
{
    // EC 0x15 is an SVC, never a debug exception.
    let thread = arm64_thread(0x15);
    let err = classify_arm64(TrapCode::HW_BREAKPOINT, &thread).unwrap_err();
    assert!(err.is_fatal());
    assert!(matches!(err, HwDebugError::InvariantViolation(message) if message.contains("0x15")));
}

#[test]
fn test_arm64_fetch_failure_degrades_to_single_step()
{
    let mut thread = SnapshotThread::new(Architecture::Arm64);
    thread.set_fault_state(Err(OsError::BadState));
    assert_eq!(
        classify_arm64(TrapCode::HW_BREAKPOINT, &thread).unwrap(),
        ExceptionKind::SingleStep
    );
}

#[test]
fn test_x64_lowest_slot_wins()
{
    // B1, B3 and BS all set.
    let thread = x64_thread(0x4000 | 0b1010, [0x1000, 0x2000, 0x3000, 0x4000]);
    assert_eq!(
        classify_x64(TrapCode::HW_BREAKPOINT, &thread).unwrap(),
        ExceptionKind::HardwareBreakpoint
    );

    // DR1 is a watchpoint; DR3 (also hit) is not consulted.
    let mut thread = x64_thread(0b1010, [0x1000, 0x2000, 0x3000, 0x4000]);
    thread.add_configured_watchpoint(Address::new(0x2000));
    assert_eq!(
        classify_x64(TrapCode::HW_BREAKPOINT, &thread).unwrap(),
        ExceptionKind::Watchpoint
    );

    let mut thread = x64_thread(0b1010, [0x1000, 0x2000, 0x3000, 0x4000]);
    thread.add_configured_watchpoint(Address::new(0x4000));
    assert_eq!(
        classify_x64(TrapCode::HW_BREAKPOINT, &thread).unwrap(),
        ExceptionKind::HardwareBreakpoint
    );
}

#[test]
fn test_x64_single_step_and_empty_status()
{
    let thread = x64_thread(0x4000, [0; 4]);
    assert_eq!(
        classify_x64(TrapCode::HW_BREAKPOINT, &thread).unwrap(),
        ExceptionKind::SingleStep
    );

    let thread = x64_thread(0, [0; 4]);
    assert_eq!(
        classify_x64(TrapCode::HW_BREAKPOINT, &thread).unwrap(),
        ExceptionKind::GeneralFault
    );
}

#[test]
fn test_x64_fetch_failure_degrades_to_general_fault()
{
    let mut thread = SnapshotThread::new(Architecture::X64);
    thread.set_fault_state(Err(OsError::BadHandle));
    assert_eq!(
        classify_x64(TrapCode::HW_BREAKPOINT, &thread).unwrap(),
        ExceptionKind::GeneralFault
    );
}

#[test]
fn test_foreign_fault_state_is_fatal()
{
    let thread = arm64_thread(0x30);
    assert!(classify_x64(TrapCode::HW_BREAKPOINT, &thread).unwrap_err().is_fatal());
    let thread = x64_thread(0x1, [0; 4]);
    assert!(classify_arm64(TrapCode::HW_BREAKPOINT, &thread).unwrap_err().is_fatal());
}

#[test]
fn test_provider_delegates_to_classifier()
{
    let thread = arm64_thread(0x34);
    assert_eq!(
        ArchProvider::Arm64
            .decode_exception(TrapCode::HW_BREAKPOINT, &thread)
            .unwrap(),
        ExceptionKind::Watchpoint
    );
    assert!(matches!(
        classify(Architecture::Unknown("riscv64"), TrapCode::HW_BREAKPOINT, &thread),
        Err(HwDebugError::InvalidArgument(_))
    ));
}

#[test]
fn test_kind_helpers()
{
    assert!(ExceptionKind::Watchpoint.is_debug_trap());
    assert!(!ExceptionKind::ThreadExit.is_debug_trap());
    assert_eq!(ExceptionKind::SingleStep.to_string(), "single step");
    assert!(TrapCode::HW_BREAKPOINT.is_architectural());
    assert!(!TrapCode::THREAD_STARTING.is_architectural());
}

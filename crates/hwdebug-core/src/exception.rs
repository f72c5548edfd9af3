//! # Exception Classifier
//!
//! Turns a raw kernel trap code into one portable [`ExceptionKind`].
//!
//! Most trap codes are unambiguous and map directly. The hardware
//! breakpoint trap is shared by several debug events, so the classifier asks
//! the stopped thread for auxiliary state:
//!
//! - **ARM64**: the exception class (`EC`, bits 31..26) of `ESR_EL1` names the
//!   event. A class outside the debug classes means the tables here are out of
//!   date with the hardware, which is reported as
//!   [`HwDebugError::InvariantViolation`] rather than guessed at.
//! - **x86-64**: DR6 carries one hit bit per slot plus `BS` for single-step.
//!   The lowest-numbered hit slot wins over `BS`. A hit slot whose address the
//!   debugger configured as a watchpoint is reported as a watchpoint.
//!
//! Only one trap bit is honored per exception; simultaneous hits on several
//! slots report the lowest one.
//!
//! If the auxiliary state cannot be fetched the classifier degrades to the
//! most specific kind the trap code alone implies (single-step on ARM64,
//! general fault on x86-64) and logs a warning.

use std::fmt;

use tracing::{debug, error, trace, warn};

use crate::debug_registers::arm64::{exception_class, ESR_EC};
use crate::debug_registers::x64::{hit, DR6_BS};
use crate::error::{HwDebugError, HwDebugResult};
use crate::platform::{ExceptionContext, FaultState};
use crate::registers::x64::HW_SLOTS;
use crate::types::{Address, Architecture};

/// Debugger-level classification of a trap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExceptionKind
{
    SoftwareBreakpoint,
    HardwareBreakpoint,
    Watchpoint,
    SingleStep,
    GeneralFault,
    ThreadStart,
    ThreadExit,
    ProcessStart,
}

impl ExceptionKind
{
    #[must_use]
    pub const fn name(self) -> &'static str
    {
        match self {
            ExceptionKind::SoftwareBreakpoint => "software breakpoint",
            ExceptionKind::HardwareBreakpoint => "hardware breakpoint",
            ExceptionKind::Watchpoint => "watchpoint",
            ExceptionKind::SingleStep => "single step",
            ExceptionKind::GeneralFault => "general fault",
            ExceptionKind::ThreadStart => "thread start",
            ExceptionKind::ThreadExit => "thread exit",
            ExceptionKind::ProcessStart => "process start",
        }
    }

    /// Whether the thread stopped because of a debugger-installed trap.
    #[must_use]
    pub const fn is_debug_trap(self) -> bool
    {
        matches!(
            self,
            ExceptionKind::SoftwareBreakpoint
                | ExceptionKind::HardwareBreakpoint
                | ExceptionKind::Watchpoint
                | ExceptionKind::SingleStep
        )
    }
}

impl fmt::Display for ExceptionKind
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

/// Raw exception type reported by the kernel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrapCode(pub u32);

impl TrapCode
{
    pub const GENERAL: Self = TrapCode(0x008);
    pub const FATAL_PAGE_FAULT: Self = TrapCode(0x108);
    pub const UNDEFINED_INSTRUCTION: Self = TrapCode(0x208);
    pub const SW_BREAKPOINT: Self = TrapCode(0x308);
    pub const HW_BREAKPOINT: Self = TrapCode(0x408);
    pub const UNALIGNED_ACCESS: Self = TrapCode(0x508);
    pub const THREAD_STARTING: Self = TrapCode(0x8008);
    pub const THREAD_EXITING: Self = TrapCode(0x8108);
    pub const POLICY_ERROR: Self = TrapCode(0x8208);
    pub const PROCESS_STARTING: Self = TrapCode(0x8308);

    #[must_use]
    pub const fn raw(self) -> u32
    {
        self.0
    }

    /// Synchronous exceptions (as opposed to thread/process lifecycle
    /// notifications) have bit 15 clear.
    #[must_use]
    pub const fn is_architectural(self) -> bool
    {
        self.0 & 0x8000 == 0
    }
}

impl fmt::Display for TrapCode
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{:#x}", self.0)
    }
}

/// Kind for every trap code that needs no auxiliary state.
///
/// Returns `None` for the hardware breakpoint trap, which must be decoded
/// per architecture. Unknown codes are general faults.
///
/// ```rust
/// use hwdebug_core::exception::{direct_kind, ExceptionKind, TrapCode};
///
/// assert_eq!(direct_kind(TrapCode::SW_BREAKPOINT), Some(ExceptionKind::SoftwareBreakpoint));
/// assert_eq!(direct_kind(TrapCode(0x1234)), Some(ExceptionKind::GeneralFault));
/// assert_eq!(direct_kind(TrapCode::HW_BREAKPOINT), None);
/// ```
#[must_use]
pub fn direct_kind(trap: TrapCode) -> Option<ExceptionKind>
{
    match trap {
        TrapCode::SW_BREAKPOINT => Some(ExceptionKind::SoftwareBreakpoint),
        TrapCode::HW_BREAKPOINT => None,
        TrapCode::THREAD_STARTING => Some(ExceptionKind::ThreadStart),
        TrapCode::THREAD_EXITING => Some(ExceptionKind::ThreadExit),
        TrapCode::PROCESS_STARTING => Some(ExceptionKind::ProcessStart),
        _ => Some(ExceptionKind::GeneralFault),
    }
}

/// Classify a trap on `arch`.
///
/// ## Errors
///
/// - `InvalidArgument` for an architecture without a decoder
/// - `InvariantViolation` when the hardware reports a debug event the tables
///   do not cover
pub fn classify(arch: Architecture, trap: TrapCode, ctx: &impl ExceptionContext) -> HwDebugResult<ExceptionKind>
{
    match arch {
        Architecture::Arm64 => classify_arm64(trap, ctx),
        Architecture::X64 => classify_x64(trap, ctx),
        Architecture::Unknown(name) => Err(HwDebugError::InvalidArgument(format!(
            "no exception decoder for architecture {name}"
        ))),
    }
}

/// Classify a trap on ARM64 using the `ESR_EL1` exception class.
///
/// ## Errors
///
/// `InvariantViolation` for an exception class outside the debug classes, or
/// fault state belonging to another architecture.
pub fn classify_arm64(trap: TrapCode, ctx: &impl ExceptionContext) -> HwDebugResult<ExceptionKind>
{
    if let Some(kind) = direct_kind(trap) {
        trace!("trap {trap} -> {kind}");
        return Ok(kind);
    }

    let esr = match ctx.fault_state() {
        Ok(FaultState::Arm64 { esr, .. }) => esr,
        Ok(other) => return Err(foreign_fault_state(Architecture::Arm64, other)),
        Err(err) => {
            warn!("Could not fetch ESR for hardware trap, assuming single step: {err}");
            return Ok(ExceptionKind::SingleStep);
        }
    };

    let kind = arm64_kind_for_class(ESR_EC.get(esr)).ok_or_else(|| {
        let message = format!("unrecognized ARM64 exception class {:#x} (ESR {esr:#x})", ESR_EC.get(esr));
        error!("{message}");
        HwDebugError::InvariantViolation(message)
    })?;
    debug!("ARM64 debug exception decoded as {kind} (ESR {esr:#x})");
    Ok(kind)
}

/// Exception kind for an ARM64 debug exception class, `None` if unknown.
#[must_use]
pub const fn arm64_kind_for_class(ec: u64) -> Option<ExceptionKind>
{
    match ec {
        exception_class::HW_BREAKPOINT_LOWER_EL | exception_class::HW_BREAKPOINT_SAME_EL => {
            Some(ExceptionKind::HardwareBreakpoint)
        }
        exception_class::SOFTWARE_STEP_LOWER_EL | exception_class::SOFTWARE_STEP_SAME_EL => {
            Some(ExceptionKind::SingleStep)
        }
        exception_class::WATCHPOINT_LOWER_EL | exception_class::WATCHPOINT_SAME_EL => Some(ExceptionKind::Watchpoint),
        exception_class::BRK_INSTRUCTION => Some(ExceptionKind::SoftwareBreakpoint),
        _ => None,
    }
}

/// Classify a trap on x86-64 using DR6.
///
/// ## Errors
///
/// `InvariantViolation` for fault state belonging to another architecture.
pub fn classify_x64(trap: TrapCode, ctx: &impl ExceptionContext) -> HwDebugResult<ExceptionKind>
{
    if let Some(kind) = direct_kind(trap) {
        trace!("trap {trap} -> {kind}");
        return Ok(kind);
    }

    let (dr6, dr) = match ctx.fault_state() {
        Ok(FaultState::X64 { dr6, dr }) => (dr6, dr),
        Ok(other) => return Err(foreign_fault_state(Architecture::X64, other)),
        Err(err) => {
            warn!("Could not fetch DR6 for hardware trap, reporting general fault: {err}");
            return Ok(ExceptionKind::GeneralFault);
        }
    };

    if let Some(slot) = (0..HW_SLOTS).find(|&slot| hit(slot).is_set(dr6)) {
        let address = Address::new(dr[slot]);
        let kind = if ctx.is_configured_watchpoint(address) {
            ExceptionKind::Watchpoint
        } else {
            ExceptionKind::HardwareBreakpoint
        };
        debug!(slot, "x64 debug exception at {address} decoded as {kind} (DR6 {dr6:#x})");
        return Ok(kind);
    }

    if DR6_BS.is_set(dr6) {
        debug!("x64 debug exception decoded as single step (DR6 {dr6:#x})");
        return Ok(ExceptionKind::SingleStep);
    }

    warn!("Hardware trap with no DR6 status bit set (DR6 {dr6:#x}), reporting general fault");
    Ok(ExceptionKind::GeneralFault)
}

fn foreign_fault_state(arch: Architecture, state: FaultState) -> HwDebugError
{
    let message = format!("{arch} exception context returned {state:?}");
    error!("{message}");
    HwDebugError::InvariantViolation(message)
}

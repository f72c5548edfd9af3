//! # Error Types
//!
//! Error handling for the architecture layer.
//!
//! We use `thiserror` to generate the `Error` trait implementations and the
//! messages. Nothing in this crate retries or logs-and-swallows an error: every
//! failure is returned to the caller, which decides whether to retry, surface
//! or abandon the attach.

use thiserror::Error;

use crate::types::{Address, AddressRange, RegisterCategory, RegisterId};
use crate::watchpoint::WatchpointType;

/// Main error type for register and debug-register operations
///
/// ## Error Categories
///
/// 1. **Invalid argument** (caller-correctable, nothing was mutated):
///    `InvalidArgument`, `UnknownRegister`, `RegisterSizeMismatch`,
///    `UnrepresentableRange`, `UnsupportedWatchpoint`, `BlockSizeMismatch`
/// 2. **Resource exhausted** (expected, recoverable): `ResourceExhausted`
/// 3. **Soft conditions**: `AlreadyInstalled`, `NotFound`
/// 4. **OS failures** (propagated verbatim): `Os`
/// 5. **Internal invariant violations** (fatal): `InvariantViolation`
#[derive(Error, Debug)]
pub enum HwDebugError
{
    /// Invalid argument passed to an operation
    ///
    /// Examples:
    /// - Requesting a provider for an architecture without a catalog
    /// - Writing a register that belongs to a different category
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// A register id that is not in the descriptor table
    #[error("Unknown register id {}", .0.raw())]
    UnknownRegister(RegisterId),

    /// A register value whose byte length differs from the register width
    #[error("Register {id} expects {expected} bytes, got {actual}")]
    RegisterSizeMismatch
    {
        id: RegisterId, expected: usize, actual: usize
    },

    /// A register block from the OS with an unexpected length
    ///
    /// The block layouts are fixed per architecture; a mismatch means the
    /// OS collaborator and this crate disagree about the ABI.
    #[error("{kind} register block expects {expected} bytes, got {actual}")]
    BlockSizeMismatch
    {
        kind: RegisterCategory,
        expected: usize,
        actual: usize,
    },

    /// The watchpoint range cannot be covered by one hardware slot
    #[error("Range {0} cannot be represented by a hardware watchpoint")]
    UnrepresentableRange(AddressRange),

    /// The CPU cannot trap on this kind of access
    ///
    /// x86-64 debug registers have no read-only mode.
    #[error("{0:?} watchpoints are not supported on this architecture")]
    UnsupportedWatchpoint(WatchpointType),

    /// Every hardware slot is in use
    #[error("Resource exhausted: {0}")]
    ResourceExhausted(String),

    /// A breakpoint or watchpoint is already installed at this location
    ///
    /// Nothing was written; the existing installation is untouched.
    #[error("Already installed at {0}")]
    AlreadyInstalled(Address),

    /// No installed breakpoint or watchpoint matches the request
    #[error("No hardware breakpoint or watchpoint at {0}")]
    NotFound(Address),

    /// The OS collaborator failed to read or write a register block
    ///
    /// Retrying cannot help (thread gone, permission denied), so the error
    /// is handed back unchanged.
    #[error("OS error: {0}")]
    Os(#[from] OsError),

    /// The hardware reported a value the decoder tables do not cover
    ///
    /// This is fatal for the debugging session: continuing would silently
    /// misclassify traps.
    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),
}

impl HwDebugError
{
    /// `AlreadyInstalled` / `NotFound`: the request was a no-op.
    #[must_use]
    pub const fn is_soft(&self) -> bool
    {
        matches!(self, HwDebugError::AlreadyInstalled(_) | HwDebugError::NotFound(_))
    }

    /// `InvariantViolation`: the session must be abandoned.
    #[must_use]
    pub const fn is_fatal(&self) -> bool
    {
        matches!(self, HwDebugError::InvariantViolation(_))
    }
}

/// Failure reported by the OS register I/O collaborator
///
/// Kernel calls return integer status codes. Common values:
///
/// - `-2`: not supported (the CPU lacks the requested register set)
/// - `-11`: bad handle (the thread is gone)
/// - `-20`: bad state (the thread is not suspended)
/// - `-30`: access denied
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OsError
{
    /// The register set does not exist on this CPU
    #[error("Not supported by this CPU or kernel")]
    NotSupported,

    /// The thread handle is invalid, usually because the thread exited
    #[error("Bad handle: thread is gone")]
    BadHandle,

    /// The thread is not in a state where its registers can be accessed
    #[error("Bad state: thread is not suspended")]
    BadState,

    /// The debugger lacks the rights to access the thread
    #[error("Access denied")]
    AccessDenied,

    /// A status code we don't recognize
    ///
    /// The integer value is preserved so you can look it up.
    #[error("Unknown OS status: {0}")]
    Unknown(i32),
}

impl OsError
{
    pub const STATUS_NOT_SUPPORTED: i32 = -2;
    pub const STATUS_BAD_HANDLE: i32 = -11;
    pub const STATUS_BAD_STATE: i32 = -20;
    pub const STATUS_ACCESS_DENIED: i32 = -30;

    /// The raw status code this error corresponds to.
    #[must_use]
    pub const fn status(self) -> i32
    {
        match self {
            OsError::NotSupported => Self::STATUS_NOT_SUPPORTED,
            OsError::BadHandle => Self::STATUS_BAD_HANDLE,
            OsError::BadState => Self::STATUS_BAD_STATE,
            OsError::AccessDenied => Self::STATUS_ACCESS_DENIED,
            OsError::Unknown(code) => code,
        }
    }
}

/// Convert a raw kernel status to an `OsError`
///
/// ```rust
/// use hwdebug_core::error::OsError;
///
/// assert_eq!(OsError::from(-30), OsError::AccessDenied);
/// assert_eq!(OsError::from(-999), OsError::Unknown(-999));
/// ```
impl From<i32> for OsError
{
    fn from(code: i32) -> Self
    {
        match code {
            Self::STATUS_NOT_SUPPORTED => OsError::NotSupported,
            Self::STATUS_BAD_HANDLE => OsError::BadHandle,
            Self::STATUS_BAD_STATE => OsError::BadState,
            Self::STATUS_ACCESS_DENIED => OsError::AccessDenied,
            _ => OsError::Unknown(code),
        }
    }
}

/// Convenience type alias for `Result<T, HwDebugError>`
///
/// ```rust
/// use hwdebug_core::error::HwDebugResult;
/// fn foo() -> HwDebugResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type HwDebugResult<T> = std::result::Result<T, HwDebugError>;

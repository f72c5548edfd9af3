//! # Platform Seam
//!
//! The OS-facing capabilities this crate consumes. Attaching, thread
//! enumeration and the actual kernel calls live in the debug agent; it hands
//! the providers an implementation of these traits for one suspended thread.
//!
//! ## Register blocks
//!
//! [`ThreadRegisterIo`] moves whole register blocks as raw little-endian
//! bytes. Each (architecture, category) block has a fixed size documented in
//! [`crate::registers::arm64`] and [`crate::registers::x64`]; a block of the
//! wrong size is rejected by the consumer, never truncated.
//!
//! ## Fault state
//!
//! [`ExceptionContext`] gives the exception classifier access to the CPU
//! state that explains a breakpoint-class trap.
//!
//! ## Testing
//!
//! [`SnapshotThread`] implements both traits over in-memory blocks and counts
//! reads and writes, so the providers can be exercised for either
//! architecture on any host.

mod snapshot;

pub use snapshot::SnapshotThread;

use crate::error::OsError;
use crate::types::{Address, RegisterCategory};

/// Raw register block access for one thread
///
/// The thread must be suspended for the duration of a provider call. Calls on
/// the same thread must be serialized by the caller: a read-modify-write is
/// not atomic with respect to another writer.
pub trait ThreadRegisterIo
{
    /// Read the whole block for `kind`.
    ///
    /// ## Errors
    ///
    /// Any [`OsError`] reported by the kernel.
    fn read_block(&self, kind: RegisterCategory) -> Result<Vec<u8>, OsError>;

    /// Replace the whole block for `kind`.
    ///
    /// ## Errors
    ///
    /// Any [`OsError`] reported by the kernel.
    fn write_block(&mut self, kind: RegisterCategory, bytes: &[u8]) -> Result<(), OsError>;
}

/// Auxiliary CPU state captured when a thread stopped on an exception
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultState
{
    /// ARM64 syndrome: `ESR_EL1` and the faulting address
    Arm64
    {
        esr: u64, far: u64
    },
    /// x86-64 debug status: DR6 and the DR0-DR3 addresses
    X64
    {
        dr6: u64, dr: [u64; 4]
    },
}

/// Capabilities the exception classifier needs for a stopped thread
pub trait ExceptionContext
{
    /// Fetch the fault-status register (ARM64) or the debug-status snapshot
    /// (x86-64).
    ///
    /// ## Errors
    ///
    /// Any [`OsError`]. The classifier degrades instead of failing.
    fn fault_state(&self) -> Result<FaultState, OsError>;

    /// Whether the debugger has a watchpoint configured at `address`.
    fn is_configured_watchpoint(&self, address: Address) -> bool;
}

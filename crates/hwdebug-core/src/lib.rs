//! # hwdebug-core
//!
//! Architecture abstraction for the hwdebug remote debugger.
//!
//! This crate gives the debug agent and the console frontend one register and
//! debug-register model for every supported CPU:
//! - A static catalog of every register (id, name, width, category, block
//!   layout) with O(1) lookups by id, name and DWARF number
//! - Bit-exact codecs for the debug control and status registers
//! - Hardware breakpoint and watchpoint installation over a scarce set of
//!   slots, with range alignment for watchpoints
//! - Classification of raw kernel traps into portable exception kinds
//! - Register filtering and plain-text table rendering
//!
//! ## Architecture Support
//!
//! - **ARM64**: X0-X30/SP/PC/CPSR, NEON, up to 16 DBGB*/DBGW* pairs
//! - **x86-64**: RAX-R15/RIP/RFLAGS, x87, AVX-512, DR0-DR3/DR6/DR7
//!
//! ## OS access
//!
//! The crate never talks to the kernel. The debug agent implements
//! [`platform::ThreadRegisterIo`] and [`platform::ExceptionContext`] for a
//! suspended thread and passes it to the [`provider::ArchProvider`]. Every
//! operation is synchronous: read a block, compute, write it back at most
//! once. Callers serialize operations on the same thread.
//!
//! ## Example
//!
//! ```rust
//! use hwdebug_core::prelude::*;
//!
//! let provider = ArchProvider::for_arch(Architecture::Arm64)?;
//! let mut thread = SnapshotThread::new(Architecture::Arm64);
//!
//! let range = AddressRange::new(0x1011, 0x1013).unwrap();
//! let installed = provider.install_watchpoint(&mut thread, WatchpointType::Write, range)?;
//! assert_eq!(installed.range, AddressRange::new(0x1010, 0x1014).unwrap());
//! # Ok::<(), HwDebugError>(())
//! ```

pub mod debug_registers;
pub mod error;
pub mod exception;
pub mod format;
pub mod platform;
pub mod prelude;
pub mod provider;
pub mod registers;
pub mod types;
pub mod watchpoint;

pub use error::{HwDebugError, HwDebugResult, OsError};
pub use exception::{ExceptionKind, TrapCode};
pub use provider::ArchProvider;
pub use types::{Address, AddressRange, Architecture, Register, RegisterCategory, RegisterId};

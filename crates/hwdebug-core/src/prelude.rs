//! Common module for library exports

pub use crate::error::{HwDebugError, HwDebugResult, OsError};
pub use crate::exception::{ExceptionKind, TrapCode};
pub use crate::format::{format_register_table, RegisterFilter};
pub use crate::platform::{ExceptionContext, FaultState, SnapshotThread, ThreadRegisterIo};
pub use crate::provider::{ArchProvider, DebugCapabilities, HardwareSlot, WatchpointInstallation};
pub use crate::registers::{describe, resolve, RegisterInfo};
pub use crate::types::{Address, AddressRange, Architecture, Register, RegisterCategory, RegisterId};
pub use crate::watchpoint::{align_range, WatchpointType};

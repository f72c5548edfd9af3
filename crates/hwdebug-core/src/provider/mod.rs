//! # Architecture Provider
//!
//! One facade per supported architecture, selected once per process as a
//! tagged variant ([`ArchProvider::current`] or [`ArchProvider::for_arch`]).
//! Every operation takes the thread's [`ThreadRegisterIo`] and follows the
//! same shape: read the OS block, compute in memory, write back at most once.
//!
//! ## Operations
//!
//! - [`ArchProvider::read_registers`] / [`ArchProvider::write_registers`]:
//!   canonical register records for one category
//! - [`ArchProvider::install_hardware_breakpoint`] /
//!   [`ArchProvider::uninstall_hardware_breakpoint`]
//! - [`ArchProvider::install_watchpoint`] /
//!   [`ArchProvider::uninstall_watchpoint`]
//! - [`ArchProvider::decode_exception`]
//! - [`ArchProvider::capabilities`]: discovered slot counts
//!
//! Install and uninstall perform exactly one block read and, on success,
//! exactly one block write. Soft failures (`AlreadyInstalled`, `NotFound`)
//! and `ResourceExhausted` write nothing.
//!
//! ## Example
//!
//! ```rust
//! use hwdebug_core::platform::SnapshotThread;
//! use hwdebug_core::provider::ArchProvider;
//! use hwdebug_core::types::{Address, Architecture};
//!
//! let provider = ArchProvider::for_arch(Architecture::X64).unwrap();
//! let mut thread = SnapshotThread::new(Architecture::X64);
//!
//! let slot = provider.install_hardware_breakpoint(&mut thread, Address::new(0x401000)).unwrap();
//! assert_eq!(slot.index(), 0);
//! assert!(provider.install_hardware_breakpoint(&mut thread, Address::new(0x401000)).is_err());
//! ```

mod arm64;
mod x64;

use std::fmt;

use tracing::{debug, trace};

use crate::debug_registers::check_block_size;
use crate::error::{HwDebugError, HwDebugResult};
use crate::exception::{self, ExceptionKind, TrapCode};
use crate::platform::{ExceptionContext, ThreadRegisterIo};
use crate::registers::{self, RegisterInfo};
use crate::types::{Address, AddressRange, Architecture, Register, RegisterCategory, RegisterId};
use crate::watchpoint::WatchpointType;

/// Index of one hardware breakpoint or watchpoint channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct HardwareSlot(usize);

impl HardwareSlot
{
    #[must_use]
    pub const fn new(index: usize) -> Self
    {
        HardwareSlot(index)
    }

    #[must_use]
    pub const fn index(self) -> usize
    {
        self.0
    }
}

impl fmt::Display for HardwareSlot
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "slot {}", self.0)
    }
}

/// Result of a successful watchpoint install
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchpointInstallation
{
    /// The aligned range the hardware actually watches
    pub range: AddressRange,
    pub slot: HardwareSlot,
}

/// Number of usable hardware channels on a thread
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DebugCapabilities
{
    pub breakpoint_slots: usize,
    pub watchpoint_slots: usize,
}

/// Register and debug-register access for one architecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArchProvider
{
    Arm64,
    X64,
}

impl ArchProvider
{
    /// Provider for the architecture this process runs on.
    ///
    /// ## Errors
    ///
    /// `InvalidArgument` when the host architecture has no provider.
    pub fn current() -> HwDebugResult<Self>
    {
        Self::for_arch(Architecture::current())
    }

    /// Provider for `arch`, e.g. when inspecting a recorded snapshot from
    /// another machine.
    ///
    /// ## Errors
    ///
    /// `InvalidArgument` for an unsupported architecture.
    pub fn for_arch(arch: Architecture) -> HwDebugResult<Self>
    {
        match arch {
            Architecture::Arm64 => Ok(ArchProvider::Arm64),
            Architecture::X64 => Ok(ArchProvider::X64),
            Architecture::Unknown(name) => Err(HwDebugError::InvalidArgument(format!(
                "no architecture provider for {name}"
            ))),
        }
    }

    #[must_use]
    pub const fn arch(self) -> Architecture
    {
        match self {
            ArchProvider::Arm64 => Architecture::Arm64,
            ArchProvider::X64 => Architecture::X64,
        }
    }

    /// Read every canonical register of `category`.
    ///
    /// A category the architecture does not have yields an empty list
    /// without touching the OS.
    ///
    /// ## Errors
    ///
    /// - `Os` if the block read fails
    /// - `BlockSizeMismatch` if the OS returned a block of the wrong size
    pub fn read_registers(self, thread: &impl ThreadRegisterIo, category: RegisterCategory) -> HwDebugResult<Vec<Register>>
    {
        let Some(size) = registers::block_size(self.arch(), category) else {
            trace!("{} has no {category} block", self.arch());
            return Ok(Vec::new());
        };

        let bytes = thread.read_block(category)?;
        check_block_size(category, &bytes, size)?;

        registers::registers_in(self.arch(), category)
            .into_iter()
            .map(|info| {
                let (start, end) = byte_span(info)?;
                Register::new(info.id, &bytes[start..end])
            })
            .collect()
    }

    /// Read one register, canonical or sub-register.
    ///
    /// ## Errors
    ///
    /// - `UnknownRegister` if `id` is not defined for this architecture
    /// - any error of [`ArchProvider::read_registers`]
    pub fn read_register(self, thread: &impl ThreadRegisterIo, id: RegisterId) -> HwDebugResult<Register>
    {
        let info = self.info_for(id)?;
        let size = registers::block_size(self.arch(), info.category).ok_or(HwDebugError::UnknownRegister(id))?;

        let bytes = thread.read_block(info.category)?;
        check_block_size(info.category, &bytes, size)?;

        let (start, end) = byte_span(info)?;
        Register::new(id, &bytes[start..end])
    }

    /// Patch registers of `category` and write the block back.
    ///
    /// Every record is validated before anything is read or written; one bad
    /// record rejects the whole batch. Sub-registers patch only their slice of
    /// the canonical register.
    ///
    /// ## Errors
    ///
    /// - `UnknownRegister` for an id not defined on this architecture
    /// - `InvalidArgument` for a register of a different category
    /// - `RegisterSizeMismatch` for a record of the wrong width
    /// - `Os` / `BlockSizeMismatch` from the block I/O
    pub fn write_registers(
        self,
        thread: &mut impl ThreadRegisterIo,
        category: RegisterCategory,
        values: &[Register],
    ) -> HwDebugResult<()>
    {
        let mut patches = Vec::with_capacity(values.len());
        for value in values {
            let info = self.info_for(value.id())?;
            if info.category != category {
                return Err(HwDebugError::InvalidArgument(format!(
                    "{} is a {} register, not {category}",
                    info.name, info.category
                )));
            }
            if value.data().len() != info.size {
                return Err(HwDebugError::RegisterSizeMismatch {
                    id: info.id,
                    expected: info.size,
                    actual: value.data().len(),
                });
            }
            patches.push((byte_span(info)?, value.data()));
        }

        if patches.is_empty() {
            return Ok(());
        }
        let size = registers::block_size(self.arch(), category).ok_or_else(|| {
            HwDebugError::InvalidArgument(format!("{} has no {category} registers", self.arch()))
        })?;

        let mut bytes = thread.read_block(category)?;
        check_block_size(category, &bytes, size)?;
        for ((start, end), data) in patches {
            bytes[start..end].copy_from_slice(data);
        }
        thread.write_block(category, &bytes)?;
        debug!("Wrote {} {category} register(s) on {}", values.len(), self.arch());
        Ok(())
    }

    /// Slot counts available on `thread`.
    ///
    /// ## Errors
    ///
    /// `Os` / `BlockSizeMismatch` when the ARM64 capability register cannot be
    /// read.
    pub fn capabilities(self, thread: &impl ThreadRegisterIo) -> HwDebugResult<DebugCapabilities>
    {
        match self {
            ArchProvider::Arm64 => arm64::capabilities(thread),
            ArchProvider::X64 => Ok(x64::capabilities()),
        }
    }

    /// Enable a hardware execution breakpoint at `address`.
    ///
    /// ## Errors
    ///
    /// - `AlreadyInstalled` if a slot already breaks at `address`
    /// - `ResourceExhausted` if every slot is in use
    /// - `InvalidArgument` for an address the hardware cannot match
    /// - `Os` / `BlockSizeMismatch` from the block I/O
    pub fn install_hardware_breakpoint(
        self,
        thread: &mut impl ThreadRegisterIo,
        address: Address,
    ) -> HwDebugResult<HardwareSlot>
    {
        match self {
            ArchProvider::Arm64 => arm64::install_hardware_breakpoint(thread, address),
            ArchProvider::X64 => x64::install_hardware_breakpoint(thread, address),
        }
    }

    /// Disable the hardware breakpoint at `address`.
    ///
    /// ## Errors
    ///
    /// - `NotFound` if no enabled breakpoint slot holds `address`
    /// - `Os` / `BlockSizeMismatch` from the block I/O
    pub fn uninstall_hardware_breakpoint(
        self,
        thread: &mut impl ThreadRegisterIo,
        address: Address,
    ) -> HwDebugResult<HardwareSlot>
    {
        match self {
            ArchProvider::Arm64 => arm64::uninstall_hardware_breakpoint(thread, address),
            ArchProvider::X64 => x64::uninstall_hardware_breakpoint(thread, address),
        }
    }

    /// Watch `range` for `kind` accesses.
    ///
    /// The range is first widened to the smallest aligned window the hardware
    /// supports; the returned installation reports that window.
    ///
    /// ## Errors
    ///
    /// - `UnrepresentableRange` if no single slot can cover `range`
    /// - `UnsupportedWatchpoint` for an access kind the CPU cannot trap
    /// - `AlreadyInstalled` if the same window is already watched
    /// - `ResourceExhausted` if every watchpoint slot is in use
    /// - `Os` / `BlockSizeMismatch` from the block I/O
    pub fn install_watchpoint(
        self,
        thread: &mut impl ThreadRegisterIo,
        kind: WatchpointType,
        range: AddressRange,
    ) -> HwDebugResult<WatchpointInstallation>
    {
        match self {
            ArchProvider::Arm64 => arm64::install_watchpoint(thread, kind, range),
            ArchProvider::X64 => x64::install_watchpoint(thread, kind, range),
        }
    }

    /// Remove the watchpoint covering `range`.
    ///
    /// `range` may be either the originally requested range or the installed
    /// window; both align to the same window.
    ///
    /// ## Errors
    ///
    /// - `UnrepresentableRange` if `range` could never have been installed
    /// - `NotFound` if no enabled watchpoint matches
    /// - `Os` / `BlockSizeMismatch` from the block I/O
    pub fn uninstall_watchpoint(self, thread: &mut impl ThreadRegisterIo, range: AddressRange) -> HwDebugResult<HardwareSlot>
    {
        match self {
            ArchProvider::Arm64 => arm64::uninstall_watchpoint(thread, range),
            ArchProvider::X64 => x64::uninstall_watchpoint(thread, range),
        }
    }

    /// Classify a trap reported for a thread of this architecture.
    ///
    /// ## Errors
    ///
    /// `InvariantViolation` when the hardware reports an event the decoder
    /// does not know.
    pub fn decode_exception(self, trap: TrapCode, ctx: &impl ExceptionContext) -> HwDebugResult<ExceptionKind>
    {
        exception::classify(self.arch(), trap, ctx)
    }

    fn info_for(self, id: RegisterId) -> HwDebugResult<&'static RegisterInfo>
    {
        registers::register_info(id)
            .filter(|info| info.arch == self.arch())
            .ok_or(HwDebugError::UnknownRegister(id))
    }
}

/// Byte range a register occupies inside its category block.
fn byte_span(info: &RegisterInfo) -> HwDebugResult<(usize, usize)>
{
    let canonical = if info.is_canonical() {
        info
    } else {
        registers::register_info(info.canonical).ok_or(HwDebugError::UnknownRegister(info.canonical))?
    };
    let offset = canonical.block_offset.ok_or_else(|| {
        HwDebugError::InvariantViolation(format!("{} has no block offset", canonical.name))
    })?;
    let start = offset + (info.shift / 8) as usize;
    Ok((start, start + info.size))
}

/// Which enabled slot (if any) already matches, and the first free one.
pub(crate) struct SlotScan
{
    pub(crate) existing: Option<usize>,
    pub(crate) free: Option<usize>,
}

impl SlotScan
{
    pub(crate) fn run(count: usize, enabled: impl Fn(usize) -> bool, matches: impl Fn(usize) -> bool) -> Self
    {
        let mut scan = SlotScan {
            existing: None,
            free: None,
        };
        for slot in 0..count {
            if enabled(slot) {
                if scan.existing.is_none() && matches(slot) {
                    scan.existing = Some(slot);
                }
            } else if scan.free.is_none() {
                scan.free = Some(slot);
            }
        }
        trace!(existing = ?scan.existing, free = ?scan.free, "Scanned {count} hardware slots");
        scan
    }
}

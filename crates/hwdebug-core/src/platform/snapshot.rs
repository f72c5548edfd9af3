use std::cell::Cell;
use std::collections::{HashMap, HashSet};

use super::{ExceptionContext, FaultState, ThreadRegisterIo};
use crate::error::OsError;
use crate::registers::block_size;
use crate::types::{Address, Architecture, RegisterCategory};

/// In-memory thread state
///
/// Holds one zero-initialized block per category the architecture defines,
/// counts every block read and write, and can be told to fail the next calls
/// with a given [`OsError`].
///
/// ```rust
/// use hwdebug_core::platform::{SnapshotThread, ThreadRegisterIo};
/// use hwdebug_core::types::{Architecture, RegisterCategory};
///
/// let thread = SnapshotThread::new(Architecture::X64);
/// assert_eq!(thread.read_block(RegisterCategory::Debug).unwrap().len(), 48);
/// assert_eq!(thread.reads(), 1);
/// ```
#[derive(Debug, Clone)]
pub struct SnapshotThread
{
    arch: Architecture,
    blocks: HashMap<RegisterCategory, Vec<u8>>,
    reads: Cell<usize>,
    writes: usize,
    fail_reads: Option<OsError>,
    fail_writes: Option<OsError>,
    fault_state: Result<FaultState, OsError>,
    watchpoints: HashSet<Address>,
}

impl SnapshotThread
{
    #[must_use]
    pub fn new(arch: Architecture) -> Self
    {
        let blocks = RegisterCategory::ALL
            .into_iter()
            .filter_map(|kind| block_size(arch, kind).map(|size| (kind, vec![0u8; size])))
            .collect();
        Self {
            arch,
            blocks,
            reads: Cell::new(0),
            writes: 0,
            fail_reads: None,
            fail_writes: None,
            fault_state: Err(OsError::NotSupported),
            watchpoints: HashSet::new(),
        }
    }

    #[must_use]
    pub const fn arch(&self) -> Architecture
    {
        self.arch
    }

    /// Number of successful and failed block reads so far.
    #[must_use]
    pub fn reads(&self) -> usize
    {
        self.reads.get()
    }

    /// Number of successful block writes so far.
    #[must_use]
    pub const fn writes(&self) -> usize
    {
        self.writes
    }

    pub fn reset_counters(&mut self)
    {
        self.reads.set(0);
        self.writes = 0;
    }

    /// Current bytes of a block, bypassing the counters.
    #[must_use]
    pub fn block(&self, kind: RegisterCategory) -> Option<&[u8]>
    {
        self.blocks.get(&kind).map(Vec::as_slice)
    }

    /// Replace a block directly, bypassing the counters.
    ///
    /// The size is not checked so tests can feed malformed blocks.
    pub fn set_block(&mut self, kind: RegisterCategory, bytes: Vec<u8>)
    {
        self.blocks.insert(kind, bytes);
    }

    pub fn fail_reads_with(&mut self, error: Option<OsError>)
    {
        self.fail_reads = error;
    }

    pub fn fail_writes_with(&mut self, error: Option<OsError>)
    {
        self.fail_writes = error;
    }

    /// Result returned by [`ExceptionContext::fault_state`].
    pub fn set_fault_state(&mut self, state: Result<FaultState, OsError>)
    {
        self.fault_state = state;
    }

    /// Register an address the debugger treats as a watchpoint.
    pub fn add_configured_watchpoint(&mut self, address: Address)
    {
        self.watchpoints.insert(address);
    }
}

impl ThreadRegisterIo for SnapshotThread
{
    fn read_block(&self, kind: RegisterCategory) -> Result<Vec<u8>, OsError>
    {
        self.reads.set(self.reads.get() + 1);
        if let Some(err) = self.fail_reads {
            return Err(err);
        }
        self.blocks.get(&kind).cloned().ok_or(OsError::NotSupported)
    }

    fn write_block(&mut self, kind: RegisterCategory, bytes: &[u8]) -> Result<(), OsError>
    {
        if let Some(err) = self.fail_writes {
            return Err(err);
        }
        let block = self.blocks.get_mut(&kind).ok_or(OsError::NotSupported)?;
        block.clear();
        block.extend_from_slice(bytes);
        self.writes += 1;
        Ok(())
    }
}

impl ExceptionContext for SnapshotThread
{
    fn fault_state(&self) -> Result<FaultState, OsError>
    {
        self.fault_state
    }

    fn is_configured_watchpoint(&self, address: Address) -> bool
    {
        self.watchpoints.contains(&address)
    }
}

//! # Watchpoint Range Aligner
//!
//! Hardware watchpoints can only watch a naturally aligned window of 1, 2, 4
//! or 8 bytes. [`align_range`] maps an arbitrary requested range to the
//! smallest such window that fully contains it.
//!
//! ## Algorithm
//!
//! Starting from the smallest supported size that is at least the requested
//! length, round `begin` down to that size and check whether the window
//! reaches `end`. If it doesn't, try the next size. A range that does not fit
//! an 8-byte window is unrepresentable.
//!
//! ```text
//! [0x10, 0x11) -> [0x10, 0x11)   already aligned
//! [0x11, 0x13) -> [0x10, 0x14)   2 bytes straddle a 2-byte boundary, use 4
//! [0x14, 0x19) -> error          crosses the 8-byte boundary at 0x18
//! [0x18, 0x20) -> [0x18, 0x20)   already aligned
//! ```

use std::fmt;

use crate::error::{HwDebugError, HwDebugResult};
use crate::types::{Address, AddressRange};

/// Window sizes a hardware watchpoint can cover, smallest first.
pub const SUPPORTED_SIZES: [u64; 4] = [1, 2, 4, 8];

/// Largest window a single hardware slot can watch.
pub const MAX_WATCH_SIZE: u64 = SUPPORTED_SIZES[SUPPORTED_SIZES.len() - 1];

/// Kind of memory access a watchpoint traps on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WatchpointType
{
    Read,
    Write,
    ReadWrite,
}

impl WatchpointType
{
    #[must_use]
    pub const fn name(self) -> &'static str
    {
        match self {
            WatchpointType::Read => "read",
            WatchpointType::Write => "write",
            WatchpointType::ReadWrite => "read-write",
        }
    }

    #[must_use]
    pub const fn traps_reads(self) -> bool
    {
        matches!(self, WatchpointType::Read | WatchpointType::ReadWrite)
    }

    #[must_use]
    pub const fn traps_writes(self) -> bool
    {
        matches!(self, WatchpointType::Write | WatchpointType::ReadWrite)
    }
}

impl fmt::Display for WatchpointType
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

/// Smallest hardware-representable window containing `range`.
///
/// ## Errors
///
/// `UnrepresentableRange` when no aligned window of at most 8 bytes covers
/// the whole range.
///
/// ## Example
///
/// ```rust
/// use hwdebug_core::types::AddressRange;
/// use hwdebug_core::watchpoint::align_range;
///
/// let aligned = align_range(AddressRange::new(0x11, 0x13).unwrap()).unwrap();
/// assert_eq!(aligned, AddressRange::new(0x10, 0x14).unwrap());
///
/// assert!(align_range(AddressRange::new(0x14, 0x19).unwrap()).is_err());
/// ```
pub fn align_range(range: AddressRange) -> HwDebugResult<AddressRange>
{
    let len = range.size();
    let begin = range.begin().value();
    let end = range.end().value();

    for size in SUPPORTED_SIZES.into_iter().filter(|&size| size >= len) {
        let base = begin & !(size - 1);
        let Some(window_end) = base.checked_add(size) else {
            continue;
        };
        if window_end >= end {
            if let Some(aligned) = AddressRange::new(Address::new(base), Address::new(window_end)) {
                return Ok(aligned);
            }
        }
    }

    Err(HwDebugError::UnrepresentableRange(range))
}

/// Whether `range` is already a naturally aligned supported window.
#[must_use]
pub fn is_hardware_aligned(range: &AddressRange) -> bool
{
    let size = range.size();
    SUPPORTED_SIZES.contains(&size) && range.begin().is_aligned(size)
}

//! Memory address and address range types.

use std::fmt;
use std::ops::{Add, Sub};

/// Strongly typed memory address in the debuggee's address space
///
/// This wrapper around `u64` keeps addresses from being mixed up with sizes,
/// slot indices, or raw register contents when they travel through the
/// breakpoint and watchpoint code.
///
/// ## Example
///
/// ```rust
/// use hwdebug_core::types::Address;
///
/// let addr = Address::from(0x1000);
/// let next_addr = addr + 0x100;
/// assert_eq!(next_addr.value(), 0x1100);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Address(u64);

impl Address
{
    /// The null address (0x0)
    pub const ZERO: Self = Address(0);

    /// Create a new address from a `u64` value (usable in const contexts)
    #[must_use]
    pub const fn new(value: u64) -> Self
    {
        Address(value)
    }

    /// Get the raw `u64` value of this address
    #[must_use]
    pub const fn value(self) -> u64
    {
        self.0
    }

    /// Round this address down to a multiple of `alignment`.
    ///
    /// `alignment` must be a power of two.
    #[must_use]
    pub const fn align_down(self, alignment: u64) -> Self
    {
        Address(self.0 & !(alignment - 1))
    }

    /// Whether this address is a multiple of `alignment` (a power of two).
    #[must_use]
    pub const fn is_aligned(self, alignment: u64) -> bool
    {
        self.0 & (alignment - 1) == 0
    }

    /// Add an offset to this address, checking for overflow
    ///
    /// ```rust
    /// use hwdebug_core::types::Address;
    ///
    /// let addr = Address::from(0x1000);
    /// assert_eq!(addr.checked_add(0x100), Some(Address::from(0x1100)));
    /// assert_eq!(addr.checked_add(u64::MAX), None);
    /// ```
    #[must_use]
    pub fn checked_add(self, offset: u64) -> Option<Self>
    {
        self.0.checked_add(offset).map(Address)
    }
}

impl From<u64> for Address
{
    fn from(value: u64) -> Self
    {
        Address(value)
    }
}

impl From<Address> for u64
{
    fn from(address: Address) -> Self
    {
        address.0
    }
}

impl fmt::Display for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "0x{:016x}", self.0)
    }
}

impl fmt::LowerHex for Address
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        fmt::LowerHex::fmt(&self.0, f)
    }
}

impl Add<u64> for Address
{
    type Output = Address;

    fn add(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_add(rhs))
    }
}

impl Sub<u64> for Address
{
    type Output = Address;

    fn sub(self, rhs: u64) -> Self::Output
    {
        Address(self.0.wrapping_sub(rhs))
    }
}

/// Half-open address range `[begin, end)`
///
/// Watchpoints are requested and reported as ranges. A range is only
/// constructible with `end > begin`, so an empty or inverted range never
/// reaches the aligner or the providers.
///
/// ## Example
///
/// ```rust
/// use hwdebug_core::types::AddressRange;
///
/// let range = AddressRange::new(0x10, 0x14).unwrap();
/// assert_eq!(range.size(), 4);
/// assert!(range.contains_range(&AddressRange::new(0x11, 0x13).unwrap()));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressRange
{
    begin: Address,
    end: Address,
}

impl AddressRange
{
    /// Create a range, returning `None` unless `end > begin`.
    #[must_use]
    pub fn new(begin: impl Into<Address>, end: impl Into<Address>) -> Option<Self>
    {
        let (begin, end) = (begin.into(), end.into());
        (end > begin).then_some(Self { begin, end })
    }

    /// Create a range from a start address and a non-zero length.
    #[must_use]
    pub fn with_size(begin: impl Into<Address>, size: u64) -> Option<Self>
    {
        let begin = begin.into();
        let end = begin.checked_add(size)?;
        Self::new(begin, end)
    }

    #[must_use]
    pub const fn begin(&self) -> Address
    {
        self.begin
    }

    #[must_use]
    pub const fn end(&self) -> Address
    {
        self.end
    }

    /// Number of bytes covered by the range (always > 0).
    #[must_use]
    pub const fn size(&self) -> u64
    {
        self.end.value() - self.begin.value()
    }

    #[must_use]
    pub fn contains(&self, address: Address) -> bool
    {
        address >= self.begin && address < self.end
    }

    /// Whether `other` lies entirely inside this range.
    #[must_use]
    pub fn contains_range(&self, other: &AddressRange) -> bool
    {
        other.begin >= self.begin && other.end <= self.end
    }
}

impl fmt::Display for AddressRange
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "[{:#x}, {:#x})", self.begin.value(), self.end.value())
    }
}

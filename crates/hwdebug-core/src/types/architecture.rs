//! CPU architecture identification.

use std::fmt;

/// CPU architecture of the debuggee
///
/// The running architecture is fixed for the lifetime of the process, so the
/// provider for it is selected once (see [`crate::provider::ArchProvider`]).
/// Both variants are always compiled in: the register catalog and the
/// decoders are pure data and arithmetic, which lets a frontend on one
/// architecture interpret register records shipped from the other.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Architecture
{
    /// 64-bit ARM (ARMv8-A, AArch64)
    ///
    /// See: [Arm Architecture Reference Manual for A-profile](https://developer.arm.com/documentation/ddi0487/latest)
    Arm64,
    /// 64-bit x86 (Intel/AMD)
    ///
    /// See: [Intel 64 and IA-32 Architectures Software Developer's Manual](https://www.intel.com/content/www/us/en/developer/articles/technical/intel-sdm.html)
    X64,
    /// Any other architecture
    ///
    /// The `&'static str` contains the architecture name (e.g., "riscv64").
    /// No register catalog or provider exists for these.
    Unknown(&'static str),
}

impl Architecture
{
    /// Architecture of the currently running binary, resolved at compile time.
    ///
    /// ```rust
    /// use hwdebug_core::types::Architecture;
    ///
    /// let arch = Architecture::current();
    /// assert!(!arch.name().is_empty());
    /// ```
    #[must_use]
    pub const fn current() -> Self
    {
        #[cfg(target_arch = "aarch64")]
        {
            Architecture::Arm64
        }
        #[cfg(target_arch = "x86_64")]
        {
            Architecture::X64
        }
        #[cfg(not(any(target_arch = "aarch64", target_arch = "x86_64")))]
        {
            Architecture::Unknown(std::env::consts::ARCH)
        }
    }

    /// Short lowercase name used in logs and tables.
    #[must_use]
    pub const fn name(self) -> &'static str
    {
        match self {
            Architecture::Arm64 => "arm64",
            Architecture::X64 => "x64",
            Architecture::Unknown(name) => name,
        }
    }

    /// Whether a register catalog and provider exist for this architecture.
    #[must_use]
    pub const fn is_supported(self) -> bool
    {
        matches!(self, Architecture::Arm64 | Architecture::X64)
    }
}

impl fmt::Display for Architecture
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        f.write_str(self.name())
    }
}

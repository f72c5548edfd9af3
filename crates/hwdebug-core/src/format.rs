//! # Register Formatting
//!
//! Selects registers by category and name and renders them as a plain-text
//! table, grouped by category in [`RegisterCategory::ALL`] order:
//!
//! ```text
//! General Purpose
//!   rax     0x0000000000000001
//!   rip     0x0000000000401000
//!
//! Vector
//!   mxcsr   0x00001f80
//!   zmm0    0x0000000000000000 0000000000000000 ... 0000000000000003
//! ```
//!
//! Values up to 8 bytes print as one zero-padded hex number. Wider values
//! print as 64-bit lanes, most significant lane first. Decoding flags and
//! floating-point values is left to the frontend.

use std::fmt::Write as _;

use regex::{Regex, RegexBuilder};

use crate::error::{HwDebugError, HwDebugResult};
use crate::registers::{register_info, RegisterInfo};
use crate::types::{Architecture, Register, RegisterCategory};

/// Which registers a table shows
#[derive(Debug, Clone)]
pub struct RegisterFilter
{
    categories: Vec<RegisterCategory>,
    name_pattern: Option<Regex>,
}

impl Default for RegisterFilter
{
    fn default() -> Self
    {
        Self::all()
    }
}

impl RegisterFilter
{
    /// Every category, any name.
    #[must_use]
    pub fn all() -> Self
    {
        Self {
            categories: RegisterCategory::ALL.to_vec(),
            name_pattern: None,
        }
    }

    /// Restrict to `categories`.
    #[must_use]
    pub fn with_categories(mut self, categories: &[RegisterCategory]) -> Self
    {
        self.categories = categories.to_vec();
        self
    }

    /// Restrict to names matching `pattern` (case-insensitive regex, not
    /// anchored).
    ///
    /// ## Errors
    ///
    /// `InvalidArgument` if `pattern` is not a valid regex.
    ///
    /// ## Example
    ///
    /// ```rust
    /// use hwdebug_core::format::RegisterFilter;
    ///
    /// let filter = RegisterFilter::all().with_name_pattern("^R[A-D]X$").unwrap();
    /// assert!(filter.matches_name("rax"));
    /// assert!(!filter.matches_name("rsi"));
    /// assert!(RegisterFilter::all().with_name_pattern("(").is_err());
    /// ```
    pub fn with_name_pattern(mut self, pattern: &str) -> HwDebugResult<Self>
    {
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(true)
            .build()
            .map_err(|err| HwDebugError::InvalidArgument(format!("invalid register name pattern: {err}")))?;
        self.name_pattern = Some(regex);
        Ok(self)
    }

    #[must_use]
    pub fn categories(&self) -> &[RegisterCategory]
    {
        &self.categories
    }

    #[must_use]
    pub fn matches_name(&self, name: &str) -> bool
    {
        self.name_pattern.as_ref().map_or(true, |regex| regex.is_match(name))
    }

    #[must_use]
    pub fn matches(&self, info: &RegisterInfo) -> bool
    {
        self.categories.contains(&info.category) && self.matches_name(info.name)
    }
}

/// Render `registers` of `arch` as a table.
///
/// Records of another architecture, unknown ids and registers rejected by
/// `filter` are skipped. Categories with no remaining register are omitted;
/// an empty selection renders an empty string.
#[must_use]
pub fn format_register_table(arch: Architecture, registers: &[Register], filter: &RegisterFilter) -> String
{
    let selected: Vec<(&'static RegisterInfo, &Register)> = registers
        .iter()
        .filter_map(|register| register_info(register.id()).map(|info| (info, register)))
        .filter(|(info, _)| info.arch == arch && filter.matches(info))
        .collect();

    let mut out = String::new();
    for category in RegisterCategory::ALL {
        let rows: Vec<_> = selected.iter().filter(|(info, _)| info.category == category).collect();
        if rows.is_empty() {
            continue;
        }
        let width = rows.iter().map(|(info, _)| info.name.len()).max().unwrap_or(0);

        if !out.is_empty() {
            out.push('\n');
        }
        let _ = writeln!(out, "{category}");
        for (info, register) in rows {
            let _ = writeln!(out, "  {:<width$}  {}", info.name, format_value(register.data()));
        }
    }
    out
}

/// Hex rendering of a little-endian register value.
///
/// ```rust
/// use hwdebug_core::format::format_value;
///
/// assert_eq!(format_value(&[0x34, 0x12]), "0x1234");
/// let mut wide = [0u8; 16];
/// wide[0] = 1;
/// wide[8] = 2;
/// assert_eq!(format_value(&wide), "0x0000000000000002 0000000000000001");
/// ```
#[must_use]
pub fn format_value(data: &[u8]) -> String
{
    let mut out = String::from("0x");
    for (index, lane) in data.chunks(8).rev().enumerate() {
        if index > 0 {
            out.push(' ');
        }
        for byte in lane.iter().rev() {
            let _ = write!(out, "{byte:02x}");
        }
    }
    out
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_format_value_widths()
    {
        assert_eq!(format_value(&[0xff]), "0xff");
        assert_eq!(format_value(&1u64.to_le_bytes()), "0x0000000000000001");
        // x87 registers are 10 bytes: the top lane is 2 bytes wide.
        let mut st = [0u8; 10];
        st[9] = 0x40;
        assert_eq!(format_value(&st), "0x4000 0000000000000000");
    }

    #[test]
    fn test_filter_categories()
    {
        let filter = RegisterFilter::all().with_categories(&[RegisterCategory::Debug]);
        assert_eq!(filter.categories(), &[RegisterCategory::Debug]);
        assert!(filter.matches_name("anything"));
    }
}

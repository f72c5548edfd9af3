//! # Types
//!
//! Architecture-independent value types shared by every component: addresses
//! and ranges, the architecture tag, register identifiers and register value
//! records.

pub mod address;
pub mod architecture;
pub mod registers;

pub use address::{Address, AddressRange};
pub use architecture::Architecture;
pub use registers::{Register, RegisterCategory, RegisterId};

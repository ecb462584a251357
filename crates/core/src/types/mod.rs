//! Core types for Tee Studio.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod money;
pub mod serial;
pub mod status;
pub mod variant;

pub use id::*;
pub use money::{Money, MoneyError};
pub use serial::{OrderSerial, SerialError};
pub use status::*;
pub use variant::{Variant, VariantError};

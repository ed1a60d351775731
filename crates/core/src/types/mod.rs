//! Core types for Storedash.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod id;
pub mod kind;
pub mod price;
pub mod status;

pub use id::*;
pub use kind::{EntityKind, Operation, UnknownEntityKind};
pub use price::{Price, PriceError};
pub use status::ErrorKind;

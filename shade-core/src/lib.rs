//! # Shade Core
//!
//! Core types, errors, and traits for the Shade stealth address protocol.
//!
//! This crate provides the foundational building blocks used by all other Shade crates:
//!
//! - **Types**: Domain models for keys, addresses, meta-addresses and announcements
//! - **Errors**: The `ShadeError` hierarchy with classification helpers
//! - **Constants**: Curve sizes, encodings and tuning defaults
//! - **Traits**: The announcement registry interface
//!
//! ## Example
//!
//! ```rust
//! use shade_core::{Address, ShadeError};
//!
//! let addr = Address::from_hex("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
//! assert_eq!(addr.to_checksum_string(), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms, clippy::all)]

pub mod constants;
pub mod error;
pub mod traits;
pub mod types;

// Re-export commonly used items at crate root
pub use constants::*;
pub use error::{Result, ShadeError};
pub use traits::*;
pub use types::*;

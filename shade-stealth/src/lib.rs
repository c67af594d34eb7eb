//! # Shade Stealth Addresses
//!
//! High-level API for paying to and discovering stealth addresses.
//!
//! This crate provides:
//!
//! - **Meta-Addresses**: Generate the spend and viewing key pairs a recipient publishes
//! - **Stealth Address Creation**: Derive one-time addresses for payments
//! - **Key Recovery**: Rebuild the private key controlling a stealth address
//! - **Payment Discovery**: Scan announcements to find incoming payments
//!
//! ## Quick Start
//!
//! ```rust
//! use shade_stealth::{
//!     create_stealth_payment, generate_meta_address, scan_announcement, ScanKeys,
//! };
//!
//! // Recipient: generate keys and publish the meta-address
//! let meta = generate_meta_address().unwrap();
//! let published = meta.public();
//!
//! // Sender: derive a one-time address and an announcement
//! let payment = create_stealth_payment(&published).unwrap();
//!
//! // Recipient: scan the announcement and recover the key
//! let result = scan_announcement(&payment.announcement, &ScanKeys::from_meta_address(&meta));
//! let found = result.into_payment().unwrap();
//! assert_eq!(found.stealth_address, payment.stealth_address);
//! assert!(found.private_key.is_some());
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

pub mod config;
pub mod discovery;
pub mod meta;
pub mod ownership;
pub mod payment;
pub mod recover;
pub mod service;

pub use config::{SchemeKind, StealthConfig};
pub use discovery::{
    scan_announcement, scan_announcements, DiscoveredPayment, ScanKeys, ScanResult, ScanStats,
};
pub use meta::{
    generate_meta_address, generate_meta_address_with_rng, meta_address_from_private_keys,
    parse_public_meta_address, validate_public_meta_address,
};
pub use ownership::check_payment_ownership;
pub use payment::{
    create_stealth_payment, derive_stealth_address, PaymentMetadata, StealthAddressResult,
    StealthPayment, StealthPaymentBuilder,
};
pub use recover::{derive_stealth_private_key, recover_stealth_private_key, verify_stealth_key};
pub use service::StealthService;

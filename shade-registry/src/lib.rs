//! # Shade Registry
//!
//! Announcement storage and retrieval.
//!
//! [`MemoryRegistry`] keeps the announcement log in memory, indexed by view
//! hint so scanners can fetch one bucket instead of the whole log. It can be
//! exported to and imported from JSON for hand-off between processes.
//!
//! ## Example
//!
//! ```rust
//! use shade_core::{Address, Announcement, PublicKey};
//! use shade_registry::{MemoryRegistry, Registry};
//!
//! # tokio_test::block_on(async {
//! let registry = MemoryRegistry::new();
//! let ephemeral = PublicKey::from_array([0x02; 33]).unwrap();
//! let announcement = Announcement::new(ephemeral, Address::from_array([0x11; 20]), 0x42);
//!
//! let id = registry.publish(announcement).await.unwrap();
//! let matching = registry.get_by_view_hint(0x42).await.unwrap();
//! assert_eq!(matching[0].id, id);
//! # });
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod memory;

pub use memory::MemoryRegistry;

// Re-export the trait from core
pub use shade_core::traits::AnnouncementRegistry as Registry;

// src/lib.rs

#![no_std] // Specify no_std at the crate root

extern crate alloc;

#[cfg(feature = "std")]
extern crate std;

pub mod common;
pub mod controller;
pub mod link;
pub mod station;
pub mod store;

// Re-export key types for convenience
pub use common::{ProtocolEvent, StationError, StatusSnapshot};
pub use controller::{StationObserver, TestStation};
pub use link::{LinkStatus, SerialLink};
pub use station::{Station, UnitPassed};
pub use store::StationStore;

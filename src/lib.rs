//! Umbrella crate re-exporting the hotel stay core domains.
//!
//! Most consumers depend on the individual crates directly; this crate
//! exists so the cross-domain integration tests in `tests/` have a single
//! anchor package at the workspace root.

pub use core_kernel;
pub use domain_folio;
pub use domain_stay;

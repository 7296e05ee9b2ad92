//! Canonical outlet and critic identities.
//!
//! The same review reaches us from BroadwayWorld roundups, DTLI, Show-Score,
//! direct outlet pages and manual entry, each spelling the outlet and critic
//! its own way. This module maps all of those spellings onto one outlet id
//! and decides when two critic bylines are the same person.
//!
//! # Submodules
//!
//! - [`outlets`]: alias tables, registry merge, URL-domain lookup
//! - [`critics`]: byline normalization and fuzzy critic matching

pub mod critics;
pub mod outlets;

pub use critics::{critic_names_match, review_file_key, tidy_critic_display};
pub use outlets::{OutletResolution, OutletResolver};

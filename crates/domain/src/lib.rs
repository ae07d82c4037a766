//! # flashboard-domain
//!
//! Pure domain model for the flashboard compact-layout toggle.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, the view identity newtype
//! - Define the persisted **toggle config** record
//! - Define the **style profile** (regions, locators, paired original/updated rules)
//! - Define the two-state **toggle** machine and the control it renders
//! - Contain all invariant enforcement (profile validation, identity extraction)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod identity;
pub mod style;
pub mod toggle;
pub mod toggle_config;

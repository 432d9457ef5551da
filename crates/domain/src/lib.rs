//! # wakelamp-domain
//!
//! Pure domain model for the wake-up lamp scheduler.
//!
//! ## Responsibilities
//! - Foundational types: error conventions, wall-clock helpers, times of day
//! - Define **event definitions** (scheduled fades) and their **recurrence**
//! - Define **group state** reported by the gateway and partial **commands**
//! - Encode leg durations in the gateway's unit, clamped to one hour
//! - Derive **occurrences** (wrap-corrected windows) and their current phase
//! - Assess **drift** between expected and reported state
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod time;

pub mod color;
pub mod drift;
pub mod event;
pub mod group;
pub mod occurrence;
pub mod recurrence;
pub mod transition;

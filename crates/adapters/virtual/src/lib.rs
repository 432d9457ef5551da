//! # wakelamp-adapter-virtual
//!
//! A simulated lamp group implementing the
//! [`Gateway`](wakelamp_app::ports::Gateway) port.
//!
//! Every command starts a linear animation of the properties it sets, from
//! their current value to the commanded one over the command's transition
//! time. Reads interpolate against the injected
//! [`TimeSource`](wakelamp_app::ports::TimeSource), so with a manual clock a
//! whole fade can be inspected at any instant.
//!
//! ## Dependency rule
//!
//! Depends on `wakelamp-app` (port traits) and `wakelamp-domain` only.

mod group;

pub use group::{VirtualError, VirtualGroup};

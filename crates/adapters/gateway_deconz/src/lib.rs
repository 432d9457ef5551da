//! # wakelamp-adapter-deconz
//!
//! [`Gateway`](wakelamp_app::ports::Gateway) implementation for the deCONZ
//! REST API.
//!
//! | Operation | Request |
//! |-----------|---------|
//! | read state | `GET http://{host}/api/{api_key}/groups/{group_id}` → `action` object |
//! | command | `PUT http://{host}/api/{api_key}/groups/{group_id}/action` with a partial state |
//!
//! deCONZ answers a `PUT` with an array of `success` / `error` entries even on
//! HTTP 200; any `error` entry makes the call fail.
//!
//! ## Dependency rule
//!
//! Depends on `wakelamp-app` (port traits) and `wakelamp-domain` only.

mod client;
mod error;

pub use client::{DeconzConfig, DeconzGateway};
pub use error::GatewayError;

//! Gateway port: the lamp group behind the lighting gateway.
//!
//! The gateway is an eventually-applied external state store: commands set
//! a target and a duration, and the gateway animates towards it on its own.

use std::future::Future;

use wakelamp_domain::error::WakeLampError;
use wakelamp_domain::group::{GroupCommand, GroupState};

/// Reads and writes the state of one lamp group.
pub trait Gateway: Send + Sync {
    /// Fetch the group's current state.
    fn group_state(&self) -> impl Future<Output = Result<GroupState, WakeLampError>> + Send;

    /// Apply a partial state, animated over the command's transition time.
    fn apply(&self, command: &GroupCommand)
    -> impl Future<Output = Result<(), WakeLampError>> + Send;
}

impl<T: Gateway> Gateway for std::sync::Arc<T> {
    fn group_state(&self) -> impl Future<Output = Result<GroupState, WakeLampError>> + Send {
        (**self).group_state()
    }

    fn apply(
        &self,
        command: &GroupCommand,
    ) -> impl Future<Output = Result<(), WakeLampError>> + Send {
        (**self).apply(command)
    }
}

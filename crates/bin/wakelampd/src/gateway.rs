//! Gateway selection for the configured backend.

use std::future::Future;

use wakelamp_adapter_deconz::DeconzGateway;
use wakelamp_adapter_virtual::VirtualGroup;
use wakelamp_app::ports::Gateway;
use wakelamp_app::time::SystemClock;
use wakelamp_domain::error::WakeLampError;
use wakelamp_domain::group::{GroupCommand, GroupState};

use crate::config::{Backend, Config};

/// Either a real deCONZ group or an in-memory one for dry runs.
pub enum AnyGateway {
    Deconz(DeconzGateway),
    Virtual(VirtualGroup<SystemClock>),
}

impl AnyGateway {
    /// Build the gateway the configuration asks for.
    ///
    /// # Errors
    ///
    /// Returns an error if the deCONZ settings are incomplete or the HTTP
    /// client cannot be built.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        match config.gateway.backend {
            Backend::Deconz => {
                let settings = config.deconz()?;
                tracing::info!(
                    host = %settings.host,
                    group_id = %settings.group_id,
                    "using deCONZ gateway"
                );
                Ok(Self::Deconz(DeconzGateway::new(&settings)?))
            }
            Backend::Virtual => {
                tracing::info!("using virtual gateway, no lamp will change");
                Ok(Self::Virtual(VirtualGroup::new(SystemClock)))
            }
        }
    }
}

impl Gateway for AnyGateway {
    fn group_state(&self) -> impl Future<Output = Result<GroupState, WakeLampError>> + Send {
        async move {
            match self {
                Self::Deconz(gateway) => gateway.group_state().await,
                Self::Virtual(gateway) => gateway.group_state().await,
            }
        }
    }

    fn apply(
        &self,
        command: &GroupCommand,
    ) -> impl Future<Output = Result<(), WakeLampError>> + Send {
        async move {
            match self {
                Self::Deconz(gateway) => gateway.apply(command).await,
                Self::Virtual(gateway) => gateway.apply(command).await,
            }
        }
    }
}

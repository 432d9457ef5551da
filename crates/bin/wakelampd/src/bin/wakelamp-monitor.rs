//! Logs how far active fades have drifted from their schedule.

use wakelamp_adapter_storage_toml::TomlEventStore;
use wakelamp_app::services::DriftMonitor;
use wakelamp_app::time::SystemClock;
use wakelampd::{AnyGateway, bootstrap, run_until_shutdown};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = bootstrap()?;

    let store = TomlEventStore::new(&config.store.path);
    let gateway = AnyGateway::from_config(&config)?;
    let monitor =
        DriftMonitor::new(store, gateway, SystemClock).with_interval(config.monitor_interval());

    run_until_shutdown("monitor", monitor.run()).await
}

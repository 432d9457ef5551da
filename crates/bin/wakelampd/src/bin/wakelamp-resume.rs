//! Re-issues the remaining legs of fades that drifted or were interrupted.

use wakelamp_adapter_storage_toml::TomlEventStore;
use wakelamp_app::services::Resynchronizer;
use wakelamp_app::time::SystemClock;
use wakelampd::{AnyGateway, bootstrap, run_until_shutdown};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = bootstrap()?;

    let store = TomlEventStore::new(&config.store.path);
    let gateway = AnyGateway::from_config(&config)?;
    let resync =
        Resynchronizer::new(store, gateway, SystemClock).with_interval(config.resume_interval());

    run_until_shutdown("resume", resync.run()).await
}

//! Fires due events at their start minute and drives their fades.

use wakelamp_adapter_storage_toml::{StoreWatcher, TomlEventStore};
use wakelamp_app::change_feed::InProcessChangeFeed;
use wakelamp_app::services::{Clock, TransitionExecutor};
use wakelamp_app::time::SystemClock;
use wakelampd::{AnyGateway, bootstrap, run_until_shutdown};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = bootstrap()?;

    let store = TomlEventStore::new(&config.store.path);
    let gateway = AnyGateway::from_config(&config)?;

    let feed = InProcessChangeFeed::new(16);
    let changes = feed.subscribe();
    let watcher = StoreWatcher::new(store.path(), feed)
        .with_interval(config.watch_interval())
        .spawn();

    let executor = TransitionExecutor::new(gateway, SystemClock);
    let clock = Clock::new(store, executor, changes).with_tick(config.tick());

    run_until_shutdown("clock", clock.run()).await?;
    watcher.abort();
    Ok(())
}

//! End-to-end scenarios across the TOML store, the virtual group and the
//! three services, all driven by a manual clock.
//!
//! The clock's executor jumps the manual clock to each deadline it waits
//! for, so a test can run a whole fade and then rewind to inspect any
//! instant of it.

use std::fs;
use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::TempDir;
use wakelamp_adapter_storage_toml::{StoreWatcher, TomlEventStore};
use wakelamp_adapter_virtual::VirtualGroup;
use wakelamp_app::change_feed::InProcessChangeFeed;
use wakelamp_app::ports::EventStore;
use wakelamp_app::services::{
    Clock, DriftMonitor, LegAction, ResumeOutcome, Resynchronizer, TransitionExecutor,
};
use wakelamp_app::time::ManualClock;
use wakelamp_domain::color::Xy;
use wakelamp_domain::group::GroupState;

type Group = Arc<VirtualGroup<ManualClock>>;

const SUNRISE: &str = r#"
[sunrise]
direction = "ON"
start_time = "07:00"
completion_time = "07:30"
recurrence = "everyday"
last_executed = ""
color_change = false
color_transition_time = 0
brightness_transition_time = 1800
"#;

const WARM_TO_COOL: &str = r#"
[warm_to_cool]
direction = "ON"
start_time = "07:00"
completion_time = "07:40"
recurrence = "weekdays"
last_executed = ""
color_change = true
color_direction = "WARM_TO_COOL"
start_color = [0.526, 0.413]
end_color = [0.33, 0.34]
color_transition_time = 600
brightness_transition_time = 1800
"#;

fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
    // 2024-03-04 is a Monday.
    NaiveDate::from_ymd_opt(2024, 3, 4)
        .unwrap()
        .and_hms_opt(h, m, s)
        .unwrap()
}

struct Rig {
    _dir: TempDir,
    time: ManualClock,
    store: TomlEventStore,
    group: Group,
}

impl Rig {
    fn new(events: &str, now: NaiveDateTime) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("events.toml");
        fs::write(&path, events).unwrap();
        let time = ManualClock::new(now);
        let group = Arc::new(VirtualGroup::new(time.clone()));
        Self {
            _dir: dir,
            store: TomlEventStore::new(path),
            time,
            group,
        }
    }

    fn clock(&self, feed: &InProcessChangeFeed) -> Clock<TomlEventStore, Group, ManualClock> {
        let executor = TransitionExecutor::new(Arc::clone(&self.group), self.time.clone());
        Clock::new(self.store.clone(), executor, feed.subscribe())
    }

    fn monitor(&self) -> DriftMonitor<TomlEventStore, Group, ManualClock> {
        DriftMonitor::new(
            self.store.clone(),
            Arc::clone(&self.group),
            self.time.clone(),
        )
    }

    fn resync(&self) -> Resynchronizer<TomlEventStore, Group, ManualClock> {
        Resynchronizer::new(
            self.store.clone(),
            Arc::clone(&self.group),
            self.time.clone(),
        )
    }
}

#[tokio::test]
async fn should_fire_sunrise_and_track_it_halfway() {
    let rig = Rig::new(SUNRISE, at(7, 0, 0));
    let feed = InProcessChangeFeed::new(8);
    let mut clock = rig.clock(&feed);
    clock.reload().await;

    assert_eq!(clock.tick().await, vec!["sunrise".to_string()]);

    let commands = rig.group.commands();
    assert_eq!(commands.len(), 1);
    assert_eq!(commands[0].1.bri, Some(254));
    assert_eq!(commands[0].1.transition.unwrap().units(), 18000);

    let raw = fs::read_to_string(rig.store.path()).unwrap();
    assert!(raw.contains("last_executed = \"2024-03-04\""));

    rig.time.set(at(7, 15, 0));
    let reports = rig.monitor().scan().await.unwrap();
    assert_eq!(reports.len(), 1);
    let bri = reports[0].1.brightness.unwrap();
    assert!((bri.expected - 127.0).abs() < 1e-9);
    assert_eq!(bri.actual, 127);
    assert!(!reports[0].1.is_drifting());
}

#[tokio::test]
async fn should_not_refire_after_reloading_persisted_marker() {
    let rig = Rig::new(SUNRISE, at(7, 0, 0));
    let feed = InProcessChangeFeed::new(8);
    let mut clock = rig.clock(&feed);
    clock.reload().await;
    clock.tick().await;

    let mut restarted = rig.clock(&feed);
    restarted.reload().await;
    rig.time.set(at(7, 0, 30));

    assert!(restarted.tick().await.is_empty());
    assert_eq!(rig.group.commands().len(), 1);
}

#[tokio::test]
async fn should_follow_color_leg_with_expected_interpolation() {
    let rig = Rig::new(WARM_TO_COOL, at(7, 0, 0));
    rig.group.set_state(&GroupState {
        on: false,
        bri: 0,
        xy: Some(Xy::new(0.526, 0.413)),
    });
    let feed = InProcessChangeFeed::new(8);
    let mut clock = rig.clock(&feed);
    clock.reload().await;
    clock.tick().await;

    rig.time.set(at(7, 5, 0));
    let reports = rig.monitor().scan().await.unwrap();

    let color = reports[0].1.color.unwrap();
    assert!(color.expected.approx_eq(Xy::new(0.428, 0.3765), 1e-9));
    assert!(color.matches);
    assert!(reports[0].1.brightness.is_none());
}

#[tokio::test]
async fn should_resume_interrupted_color_leg_over_remaining_time() {
    let rig = Rig::new(WARM_TO_COOL, at(7, 6, 40));
    rig.group.set_state(&GroupState {
        on: true,
        bri: 0,
        xy: Some(Xy::new(0.526, 0.413)),
    });

    let outcomes = rig.resync().scan().await.unwrap();

    assert_eq!(outcomes.len(), 1);
    let ResumeOutcome::Resumed(summary) = outcomes[0].1 else {
        panic!("expected a resumption, got {:?}", outcomes[0].1);
    };
    assert!(matches!(summary.color, LegAction::Reissued { .. }));

    let commands = rig.group.commands();
    assert_eq!(commands[0].0, at(7, 6, 40));
    assert_eq!(commands[0].1.xy, Some(Xy::new(0.33, 0.34)));
    assert_eq!(commands[0].1.transition.unwrap().units(), 2000);
    assert_eq!(commands[1].0, at(7, 10, 0));
    assert_eq!(commands[1].1.bri, Some(254));

    rig.time.set(at(7, 25, 0));
    let reports = rig.monitor().scan().await.unwrap();
    assert!(!reports[0].1.is_drifting());
}

#[tokio::test]
async fn should_recover_brightness_after_interruption() {
    let rig = Rig::new(SUNRISE, at(7, 0, 0));
    let feed = InProcessChangeFeed::new(8);
    let mut clock = rig.clock(&feed);
    clock.reload().await;
    clock.tick().await;

    rig.time.set(at(7, 10, 0));
    rig.group.interrupt();
    rig.time.set(at(7, 20, 0));
    let reports = rig.monitor().scan().await.unwrap();
    assert!(reports[0].1.brightness_drifting());

    let outcomes = rig.resync().scan().await.unwrap();
    assert!(matches!(
        outcomes[0].1,
        ResumeOutcome::Resumed(summary) if summary.brightness == LegAction::Reissued {
            remaining: std::time::Duration::from_secs(600)
        }
    ));

    rig.time.set(at(7, 30, 0));
    assert_eq!(rig.group.state().bri, 254);
}

#[tokio::test]
async fn should_leave_on_track_fade_alone() {
    let rig = Rig::new(SUNRISE, at(7, 0, 0));
    let feed = InProcessChangeFeed::new(8);
    let mut clock = rig.clock(&feed);
    clock.reload().await;
    clock.tick().await;

    rig.time.set(at(7, 15, 0));
    assert!(rig.resync().scan().await.unwrap().is_empty());
    assert_eq!(rig.group.commands().len(), 1);
}

#[tokio::test]
async fn should_pick_up_event_added_while_running() {
    let rig = Rig::new(SUNRISE, at(6, 59, 0));
    let feed = InProcessChangeFeed::new(8);
    let mut clock = rig.clock(&feed);
    clock.reload().await;
    let mut watcher = StoreWatcher::new(rig.store.path(), feed.clone());

    let edited = format!("{SUNRISE}\n{WARM_TO_COOL}");
    fs::write(rig.store.path(), edited).unwrap();
    assert!(watcher.poll().await.unwrap());

    assert!(clock.sync_changes().await);
    assert_eq!(clock.events().len(), 2);

    rig.time.set(at(7, 0, 0));
    let fired = clock.tick().await;
    assert_eq!(fired, vec!["sunrise".to_string(), "warm_to_cool".to_string()]);

    let events = rig.store.load().await.unwrap();
    assert!(events.values().all(|e| e.last_executed.is_some()));
}

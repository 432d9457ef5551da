//! Drift monitor: compares active fades with what the gateway reports.
//!
//! Read-only: never writes to the gateway or the store.

use std::time::Duration;

use wakelamp_domain::drift::DriftReport;
use wakelamp_domain::error::WakeLampError;
use wakelamp_domain::event::{EventDefinition, EventSet};
use wakelamp_domain::occurrence::Occurrence;
use wakelamp_domain::time::{Timestamp, after};

use crate::ports::{EventStore, Gateway, TimeSource};

/// Default pause between two scans.
pub const DEFAULT_SCAN_INTERVAL: Duration = Duration::from_secs(30);

/// Events of `events` with an occurrence active at `now`.
pub(crate) fn active_occurrences(
    events: &EventSet,
    now: Timestamp,
) -> Vec<(&str, &EventDefinition, Occurrence)> {
    events
        .iter()
        .filter_map(|(name, event)| {
            Occurrence::active_at(event, now).map(|occ| (name.as_str(), event, occ))
        })
        .collect()
}

/// Log a report: `info` when on track, `warn` when drifting.
pub(crate) fn log_report(name: &str, report: &DriftReport) {
    let color_expected = report.color.map(|c| c.expected.to_string());
    let color_actual = report.color.and_then(|c| c.actual).map(|xy| xy.to_string());
    let bri_expected = report.brightness.map(|b| b.expected.round());
    let bri_actual = report.brightness.map(|b| b.actual);
    if report.is_drifting() {
        tracing::warn!(
            event = name,
            phase = %report.phase,
            elapsed_secs = report.elapsed.as_secs(),
            ?color_expected,
            ?color_actual,
            ?bri_expected,
            ?bri_actual,
            "group drifted from expected state"
        );
    } else {
        tracing::info!(
            event = name,
            phase = %report.phase,
            elapsed_secs = report.elapsed.as_secs(),
            ?color_expected,
            ?bri_expected,
            "group on track"
        );
    }
}

pub struct DriftMonitor<S, G, T> {
    store: S,
    gateway: G,
    time: T,
    interval: Duration,
}

impl<S: EventStore, G: Gateway, T: TimeSource> DriftMonitor<S, G, T> {
    pub fn new(store: S, gateway: G, time: T) -> Self {
        Self {
            store,
            gateway,
            time,
            interval: DEFAULT_SCAN_INTERVAL,
        }
    }

    #[must_use]
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Assess every active event against a fresh store read.
    ///
    /// The gateway is only queried when at least one event is active.
    ///
    /// # Errors
    ///
    /// Returns a storage error when the events cannot be loaded, or a
    /// gateway error when the group state cannot be fetched.
    pub async fn scan(&self) -> Result<Vec<(String, DriftReport)>, WakeLampError> {
        let events = self.store.load().await?;
        let now = self.time.now();
        let active = active_occurrences(&events, now);
        if active.is_empty() {
            tracing::debug!("no active events");
            return Ok(Vec::new());
        }

        let state = self.gateway.group_state().await?;
        let reports = active
            .into_iter()
            .map(|(name, event, occ)| {
                let report = DriftReport::assess(event, &occ, now, &state);
                log_report(name, &report);
                (name.to_string(), report)
            })
            .collect();
        Ok(reports)
    }

    /// Scan forever, one pass per interval.
    pub async fn run(self) {
        loop {
            if let Err(err) = self.scan().await {
                tracing::warn!(%err, "drift scan failed, retrying next interval");
            }
            let next = after(self.time.now(), self.interval);
            self.time.sleep_until(next).await;
        }
    }
}

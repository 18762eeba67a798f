//! Countdown Module - Event reconciliation and live countdown
//!
//! Owns the displayed event set and the time-remaining value:
//! - One fetch per activation through the [`EventSource`] port
//! - Fetch failure falls back to the fixed generic schedule, silently
//! - Target selection picks the earliest strictly-future remote record,
//!   or the next weekly anchor occurrence when none qualifies
//! - A 1-second ticker keeps the remaining value current
//!
//! The ticker follows the shared-clock pattern: a background thread
//! recomputes the remaining seconds into an atomic, and the signal is
//! synced on read on the owner thread. Re-arming stops the previous
//! ticker before starting the next, so two tickers never compete.
//!
//! # Example
//!
//! ```ignore
//! use faithconnect_core::state::countdown::CountdownEngine;
//!
//! let mut engine = CountdownEngine::new();
//! engine.activate(&remote_source);
//!
//! let cards = engine.events();          // renderable set
//! let left = engine.time_remaining();   // live countdown value
//!
//! engine.teardown();
//! ```

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::Duration as StdDuration;

use chrono::{DateTime, Datelike, Duration, Local, NaiveDate, NaiveTime, TimeZone, Utc, Weekday};
use spark_signals::{Signal, signal};
use tracing::warn;

use crate::service::events::EventSource;
use crate::types::{CountdownTarget, EventRecord, TimeRemaining};

// =============================================================================
// CONSTANTS
// =============================================================================

/// Weekday of the fallback countdown anchor.
pub const ANCHOR_WEEKDAY: Weekday = Weekday::Sun;

/// Local hour (24h) of the fallback countdown anchor.
pub const ANCHOR_HOUR: u32 = 10;

/// Day offsets of the fixed fallback schedule, from activation time.
pub const FALLBACK_OFFSET_DAYS: [i64; 4] = [7, 14, 21, 28];

/// Countdown tick period.
const TICK_INTERVAL: StdDuration = StdDuration::from_secs(1);

// =============================================================================
// WEEKLY ANCHOR
// =============================================================================

/// Next occurrence of the weekly anchor time, strictly after `now`.
///
/// Computed in `now`'s timezone: the host reads the anchor as local
/// wall-clock time. A same-weekday instant before the anchor hour
/// resolves to today; at or after it, to next week.
pub fn next_weekly_anchor<Tz: TimeZone>(now: DateTime<Tz>) -> DateTime<Tz> {
    let today = now.date_naive();
    let days_ahead = (ANCHOR_WEEKDAY.num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);

    let candidate = anchor_on(&now.timezone(), today + Duration::days(days_ahead));
    if candidate > now {
        candidate
    } else {
        anchor_on(&now.timezone(), today + Duration::days(days_ahead + 7))
    }
}

fn anchor_on<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> DateTime<Tz> {
    let time = NaiveTime::from_hms_opt(ANCHOR_HOUR, 0, 0).unwrap_or(NaiveTime::MIN);
    let naive = date.and_time(time);
    match tz.from_local_datetime(&naive).earliest() {
        Some(at) => at,
        // DST gap: read the wall-clock value as UTC
        None => tz.from_utc_datetime(&naive),
    }
}

// =============================================================================
// TARGET SELECTION
// =============================================================================

/// Select the countdown target from an event set: the record with the
/// smallest start instant strictly after `now`.
///
/// Past-dated and unparseable records are skipped (they still render).
/// Returns `None` when nothing qualifies; the caller falls back to the
/// weekly anchor.
pub fn select_countdown_target(
    records: &[EventRecord],
    now: DateTime<Utc>,
) -> Option<CountdownTarget> {
    records
        .iter()
        .filter_map(|record| record.starts_at().map(|at| (record, at)))
        .filter(|(_, at)| *at > now)
        .min_by_key(|(_, at)| *at)
        .map(|(record, at)| CountdownTarget::Event {
            id: record.id.clone(),
            starts_at: at,
        })
}

// =============================================================================
// FALLBACK SCHEDULE
// =============================================================================

/// The fixed generic schedule shown when the remote source is
/// unavailable: four events dated 7/14/21/28 days from activation.
///
/// Never used for target selection; the fallback countdown anchors to
/// the weekly anchor instead.
pub fn fallback_events(now: DateTime<Utc>) -> Vec<EventRecord> {
    let cards = [
        (
            "sunday-service",
            "Sunday Service",
            "Join us for our weekly service at 10 AM",
            "Main Sanctuary",
            "https://images.unsplash.com/photo-1515943073294-77dfc14c7a7b?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
        ),
        (
            "community-outreach",
            "Community Outreach",
            "Serving our community with love and compassion",
            "Community Center",
            "https://images.unsplash.com/photo-1559027615-cd4628192c4e?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
        ),
        (
            "youth-ministry",
            "Youth Ministry",
            "Engaging activities for young people",
            "Youth Hall",
            "https://images.unsplash.com/photo-1529156069898-49953e39b3fa?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
        ),
        (
            "volunteer-day",
            "Volunteer Day",
            "Help us make a difference",
            "City Park",
            "https://images.unsplash.com/photo-1488590528505-98d2b5aba04b?ixlib=rb-4.0.3&auto=format&fit=crop&w=800&q=80",
        ),
    ];

    cards
        .iter()
        .zip(FALLBACK_OFFSET_DAYS)
        .map(|((id, title, description, location, image_url), offset)| EventRecord {
            id: (*id).to_string(),
            title: (*title).to_string(),
            description: (*description).to_string(),
            date: (now + Duration::days(offset)).to_rfc3339(),
            location: (*location).to_string(),
            image_url: (*image_url).to_string(),
        })
        .collect()
}

// =============================================================================
// TICKER
// =============================================================================

/// Background 1-second clock pinned to one target instant.
struct Ticker {
    running: Arc<AtomicBool>,
    _handle: Option<JoinHandle<()>>,
}

impl Ticker {
    fn start(target: DateTime<Utc>, remaining_secs: Arc<AtomicI64>) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let target_ts = target.timestamp();

        let handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                let now_ts = Utc::now().timestamp();
                remaining_secs.store((target_ts - now_ts).max(0), Ordering::SeqCst);
                thread::sleep(TICK_INTERVAL);
            }
        });

        Self {
            running,
            _handle: Some(handle),
        }
    }

    fn stop(&self) {
        // Thread exits on its next loop check; no join to avoid blocking
        self.running.store(false, Ordering::SeqCst);
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

// =============================================================================
// COUNTDOWN ENGINE
// =============================================================================

/// Displayed event set plus live countdown toward the selected target.
///
/// Fetches once per activation; the event set is replaced wholesale and
/// the target re-selected from it. Tick, teardown, and re-arm are all
/// deterministic: at most one ticker exists at any time.
pub struct CountdownEngine {
    events: Signal<Vec<EventRecord>>,
    target: Signal<Option<CountdownTarget>>,
    remaining: Signal<TimeRemaining>,
    /// Thread-safe remaining seconds, written by the ticker thread.
    remaining_secs: Arc<AtomicI64>,
    ticker: Option<Ticker>,
}

impl CountdownEngine {
    /// Create an idle engine: empty set, no target, zero remaining.
    pub fn new() -> Self {
        Self {
            events: signal(Vec::new()),
            target: signal(None),
            remaining: signal(TimeRemaining::ZERO),
            remaining_secs: Arc::new(AtomicI64::new(0)),
            ticker: None,
        }
    }

    /// Fetch once through `source` and reconcile.
    ///
    /// Success keeps the remote records (in remote order) as the
    /// displayed set and targets the earliest strictly-future record;
    /// with no qualifying record the countdown anchors to the weekly
    /// anchor instead. Failure swaps in the fixed fallback schedule and
    /// anchors to the weekly anchor (logged, never surfaced).
    ///
    /// Calling again re-fetches, replaces the set wholesale, and re-arms.
    pub fn activate(&mut self, source: &dyn EventSource) {
        let now = Utc::now();

        let target = match source.fetch_events() {
            Ok(records) => {
                let target = select_countdown_target(&records, now);
                self.events.set(records);
                target
            }
            Err(err) => {
                warn!(error = %err, "event fetch failed, using fallback schedule");
                self.events.set(fallback_events(now));
                None
            }
        };

        let target = target.unwrap_or_else(|| {
            CountdownTarget::WeeklyAnchor(next_weekly_anchor(Local::now()).with_timezone(&Utc))
        });
        self.arm(target, now);
    }

    /// Pin the ticker to a new target. Stops the previous ticker first.
    fn arm(&mut self, target: CountdownTarget, now: DateTime<Utc>) {
        self.stop_ticker();

        // Immediate first computation, before the first tick lands
        let instant = target.instant();
        let secs = (instant - now).num_seconds().max(0);
        self.remaining_secs.store(secs, Ordering::SeqCst);
        self.remaining.set(TimeRemaining::from_secs(secs as u64));

        self.target.set(Some(target));
        self.ticker = Some(Ticker::start(instant, self.remaining_secs.clone()));
    }

    fn stop_ticker(&mut self) {
        if let Some(ticker) = self.ticker.take() {
            ticker.stop();
        }
    }

    /// The displayed event set, in source-supplied order.
    pub fn events(&self) -> Vec<EventRecord> {
        self.events.get()
    }

    /// The event set signal, for reactive consumers.
    pub fn events_signal(&self) -> Signal<Vec<EventRecord>> {
        self.events.clone()
    }

    /// The selected countdown target (`None` before activation).
    pub fn target(&self) -> Option<CountdownTarget> {
        self.target.get()
    }

    /// Current remaining time. Syncs the ticker's value into the signal
    /// on read.
    pub fn time_remaining(&self) -> TimeRemaining {
        let secs = self.remaining_secs.load(Ordering::SeqCst).max(0);
        let value = TimeRemaining::from_secs(secs as u64);
        if self.remaining.get() != value {
            self.remaining.set(value);
        }
        value
    }

    /// The remaining-time signal, for reactive consumers.
    pub fn remaining_signal(&self) -> Signal<TimeRemaining> {
        self.remaining.clone()
    }

    /// Whether the ticker is currently running.
    pub fn is_ticking(&self) -> bool {
        self.ticker.as_ref().map(Ticker::is_running).unwrap_or(false)
    }

    /// Stop the ticker. Safe to call more than once, or before any
    /// activation.
    pub fn teardown(&mut self) {
        self.stop_ticker();
    }
}

impl Default for CountdownEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for CountdownEngine {
    fn drop(&mut self) {
        self.stop_ticker();
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::events::{EventSourceError, StaticEventSource};
    use chrono::TimeZone;

    fn record(id: &str, date: &str) -> EventRecord {
        EventRecord {
            id: id.to_string(),
            title: "Event".to_string(),
            description: String::new(),
            date: date.to_string(),
            location: String::new(),
            image_url: String::new(),
        }
    }

    struct FailingSource;

    impl EventSource for FailingSource {
        fn fetch_events(&self) -> Result<Vec<EventRecord>, EventSourceError> {
            Err(EventSourceError::Unavailable("connection refused".to_string()))
        }
    }

    #[test]
    fn test_anchor_lands_on_weekday_in_future() {
        // Tuesday 2026-03-03 12:00 UTC
        let now = Utc.with_ymd_and_hms(2026, 3, 3, 12, 0, 0).unwrap();
        let anchor = next_weekly_anchor(now);

        assert_eq!(anchor.weekday(), ANCHOR_WEEKDAY);
        assert_eq!(anchor, Utc.with_ymd_and_hms(2026, 3, 8, 10, 0, 0).unwrap());
        assert!(anchor > now);
        assert!(anchor - now <= Duration::days(7));
    }

    #[test]
    fn test_anchor_same_day_before_hour_is_today() {
        // Sunday 2026-03-01 09:00
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap();
        let anchor = next_weekly_anchor(now);
        assert_eq!(anchor, Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_anchor_same_day_at_hour_rolls_a_week() {
        // Exactly at the anchor instant: next occurrence is strictly future
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        let anchor = next_weekly_anchor(now);
        assert_eq!(anchor, Utc.with_ymd_and_hms(2026, 3, 8, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_anchor_same_day_after_hour_rolls_a_week() {
        let now = Utc.with_ymd_and_hms(2026, 3, 1, 11, 30, 0).unwrap();
        let anchor = next_weekly_anchor(now);
        assert_eq!(anchor, Utc.with_ymd_and_hms(2026, 3, 8, 10, 0, 0).unwrap());
    }

    #[test]
    fn test_select_nearest_future_record() {
        let now = Utc.with_ymd_and_hms(2026, 3, 3, 12, 0, 0).unwrap();
        let records = vec![
            record("plus1d", "2026-03-04T12:00:00Z"),
            record("minus1d", "2026-03-02T12:00:00Z"),
            record("plus3d", "2026-03-06T12:00:00Z"),
        ];

        let target = select_countdown_target(&records, now).unwrap();
        assert_eq!(
            target,
            CountdownTarget::Event {
                id: "plus1d".to_string(),
                starts_at: Utc.with_ymd_and_hms(2026, 3, 4, 12, 0, 0).unwrap(),
            }
        );
    }

    #[test]
    fn test_select_skips_unparseable_dates() {
        let now = Utc.with_ymd_and_hms(2026, 3, 3, 12, 0, 0).unwrap();
        let records = vec![
            record("broken", "soon, promise"),
            record("ok", "2026-03-05T12:00:00Z"),
        ];

        let target = select_countdown_target(&records, now).unwrap();
        assert!(matches!(target, CountdownTarget::Event { id, .. } if id == "ok"));
    }

    #[test]
    fn test_select_none_when_all_past_or_empty() {
        let now = Utc.with_ymd_and_hms(2026, 3, 3, 12, 0, 0).unwrap();

        assert_eq!(select_countdown_target(&[], now), None);

        let past = vec![record("old", "2026-03-01T12:00:00Z")];
        assert_eq!(select_countdown_target(&past, now), None);
    }

    #[test]
    fn test_select_is_strict_about_now() {
        let now = Utc.with_ymd_and_hms(2026, 3, 3, 12, 0, 0).unwrap();
        // Starts exactly now: not strictly future
        let records = vec![record("exact", "2026-03-03T12:00:00Z")];
        assert_eq!(select_countdown_target(&records, now), None);
    }

    #[test]
    fn test_fallback_schedule_shape() {
        let now = Utc.with_ymd_and_hms(2026, 3, 3, 12, 0, 0).unwrap();
        let records = fallback_events(now);

        assert_eq!(records.len(), 4);
        assert_eq!(records[0].title, "Sunday Service");
        assert_eq!(records[3].title, "Volunteer Day");

        for (record, offset) in records.iter().zip(FALLBACK_OFFSET_DAYS) {
            let at = record.starts_at().expect("fallback dates must parse");
            assert_eq!(at, now + Duration::days(offset));
        }
    }

    #[test]
    fn test_activate_success_targets_remote_record() {
        let future = (Utc::now() + Duration::days(1)).to_rfc3339();
        let past = (Utc::now() - Duration::days(1)).to_rfc3339();
        let source = StaticEventSource::new(vec![
            record("next", &future),
            record("gone", &past),
        ]);

        let mut engine = CountdownEngine::new();
        engine.activate(&source);

        // Remote records displayed, remote order, past ones included
        let events = engine.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "next");

        let target = engine.target().expect("target selected");
        assert!(matches!(target, CountdownTarget::Event { ref id, .. } if id == "next"));
        assert!(engine.is_ticking());

        // Immediate computation: roughly one day out
        let left = engine.time_remaining();
        assert!(left.days == 0 && left.hours == 23 || left.days == 1);

        engine.teardown();
        assert!(!engine.is_ticking());
    }

    #[test]
    fn test_activate_failure_falls_back() {
        let mut engine = CountdownEngine::new();
        engine.activate(&FailingSource);

        // Fixed fallback count, weekly anchor target
        assert_eq!(engine.events().len(), 4);
        let target = engine.target().expect("fallback target");
        assert!(target.is_fallback());
        assert_eq!(target.instant().with_timezone(&Local).weekday(), ANCHOR_WEEKDAY);
        assert!(engine.is_ticking());

        engine.teardown();
    }

    #[test]
    fn test_activate_success_without_future_records_anchors() {
        let past = (Utc::now() - Duration::days(2)).to_rfc3339();
        let source = StaticEventSource::new(vec![record("gone", &past)]);

        let mut engine = CountdownEngine::new();
        engine.activate(&source);

        // Displayed set stays remote; only the target falls back
        assert_eq!(engine.events().len(), 1);
        assert!(engine.target().expect("target").is_fallback());

        engine.teardown();
    }

    #[test]
    fn test_reactivation_rearms_single_ticker() {
        let future = (Utc::now() + Duration::days(2)).to_rfc3339();
        let source = StaticEventSource::new(vec![record("e1", &future)]);

        let mut engine = CountdownEngine::new();
        engine.activate(&source);
        assert!(engine.is_ticking());

        // Second activation replaces the set wholesale and re-arms
        engine.activate(&FailingSource);
        assert_eq!(engine.events().len(), 4);
        assert!(engine.is_ticking());

        engine.teardown();
        assert!(!engine.is_ticking());

        // Teardown twice is safe
        engine.teardown();
    }

    #[test]
    fn test_ticker_advances_remaining() {
        let future = (Utc::now() + Duration::days(3)).to_rfc3339();
        let source = StaticEventSource::new(vec![record("e1", &future)]);

        let mut engine = CountdownEngine::new();
        engine.activate(&source);

        let before = engine.time_remaining();
        let total = |t: TimeRemaining| {
            t.days * 86_400 + t.hours * 3_600 + t.minutes * 60 + t.seconds
        };

        std::thread::sleep(StdDuration::from_millis(2_300));

        let after = engine.time_remaining();
        assert!(total(after) < total(before));

        engine.teardown();
    }

    #[test]
    fn test_idle_engine_is_inert() {
        let mut engine = CountdownEngine::new();
        assert!(engine.events().is_empty());
        assert_eq!(engine.target(), None);
        assert_eq!(engine.time_remaining(), TimeRemaining::ZERO);
        assert!(!engine.is_ticking());

        // Teardown before any activation is safe
        engine.teardown();
    }
}

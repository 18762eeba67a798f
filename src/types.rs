//! Core types for faithconnect-core.
//!
//! These types define the foundation the state components build on.
//! They flow out of the reactive layer and define what the downstream
//! renderer understands: event cards, a countdown value, an identity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// =============================================================================
// EventRecord
// =============================================================================

/// One community event, remote-sourced or fallback-sourced.
///
/// The `date` field is kept exactly as supplied (RFC 3339 expected).
/// Records whose date does not parse are excluded from countdown
/// eligibility but still render as cards.
///
/// Records are replaced wholesale on refetch, never patched field-by-field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventRecord {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Start instant as supplied by the source (RFC 3339 expected).
    pub date: String,
    pub location: String,
    pub image_url: String,
}

impl EventRecord {
    /// Parse the start instant. `None` means the record is not
    /// countdown-eligible (it still renders).
    pub fn starts_at(&self) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(&self.date)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

// =============================================================================
// CountdownTarget
// =============================================================================

/// The single future instant the countdown is measured against.
///
/// Derived at selection time from the current event set, never patched
/// incrementally: re-selection happens whenever the set is replaced.
#[derive(Debug, Clone, PartialEq)]
pub enum CountdownTarget {
    /// The remote record with the smallest start instant strictly in the
    /// future at selection time.
    Event {
        id: String,
        starts_at: DateTime<Utc>,
    },
    /// Next occurrence of the fixed weekly anchor time. Used when the
    /// remote fetch failed or yielded no future-dated record.
    WeeklyAnchor(DateTime<Utc>),
}

impl CountdownTarget {
    /// The instant the countdown runs toward.
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            CountdownTarget::Event { starts_at, .. } => *starts_at,
            CountdownTarget::WeeklyAnchor(at) => *at,
        }
    }

    /// True when the target is the synthesized weekly anchor rather than
    /// a remote record.
    pub fn is_fallback(&self) -> bool {
        matches!(self, CountdownTarget::WeeklyAnchor(_))
    }
}

// =============================================================================
// TimeRemaining
// =============================================================================

/// Floor decomposition of `max(0, target - now)` in 24/60/60 radix.
///
/// Unsigned fields encode the invariant: once the target has passed, every
/// field is 0 and stays 0 on subsequent ticks. Never negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeRemaining {
    pub days: u64,
    pub hours: u64,
    pub minutes: u64,
    pub seconds: u64,
}

impl TimeRemaining {
    /// All-zero value (target reached or passed).
    pub const ZERO: Self = Self {
        days: 0,
        hours: 0,
        minutes: 0,
        seconds: 0,
    };

    /// Decompose a non-negative number of whole seconds.
    pub fn from_secs(total: u64) -> Self {
        Self {
            days: total / 86_400,
            hours: total % 86_400 / 3_600,
            minutes: total % 3_600 / 60,
            seconds: total % 60,
        }
    }

    /// Remaining time from `now` until `target`, clamped at zero.
    pub fn until(target: DateTime<Utc>, now: DateTime<Utc>) -> Self {
        let secs = (target - now).num_seconds().max(0) as u64;
        Self::from_secs(secs)
    }

    /// True once the target has been reached or passed.
    pub fn is_elapsed(&self) -> bool {
        *self == Self::ZERO
    }

    /// Render one field as a zero-padded two-digit decimal string.
    ///
    /// Values >= 100 are not expected but render in full: padding only
    /// ever extends on the left, digits are never truncated.
    pub fn pad(value: u64) -> String {
        format!("{value:02}")
    }
}

// =============================================================================
// SessionIdentity
// =============================================================================

/// The authenticated identity, as last reported by the session service.
///
/// Replaced wholesale on every session-change notification. Absence
/// (`Option::None` at the manager level) means unauthenticated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionIdentity {
    pub user_id: String,
    pub email: Option<String>,
    pub display_name: Option<String>,
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_starts_at_parses_rfc3339() {
        let record = EventRecord {
            id: "e1".to_string(),
            title: "Sunday Service".to_string(),
            description: "Weekly service".to_string(),
            date: "2026-03-01T10:00:00Z".to_string(),
            location: "Main Hall".to_string(),
            image_url: String::new(),
        };

        let expected = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();
        assert_eq!(record.starts_at(), Some(expected));
    }

    #[test]
    fn test_starts_at_honors_offsets() {
        let record = EventRecord {
            id: "e1".to_string(),
            title: "Evening Prayer".to_string(),
            description: String::new(),
            date: "2026-03-01T10:00:00-05:00".to_string(),
            location: String::new(),
            image_url: String::new(),
        };

        let expected = Utc.with_ymd_and_hms(2026, 3, 1, 15, 0, 0).unwrap();
        assert_eq!(record.starts_at(), Some(expected));
    }

    #[test]
    fn test_starts_at_rejects_garbage() {
        let record = EventRecord {
            id: "e2".to_string(),
            title: "Broken".to_string(),
            description: String::new(),
            date: "next sunday-ish".to_string(),
            location: String::new(),
            image_url: String::new(),
        };

        assert_eq!(record.starts_at(), None);
    }

    #[test]
    fn test_from_secs_decomposition() {
        // 1 day, 1 hour, 1 minute, 1 second
        let value = TimeRemaining::from_secs(90_061);
        assert_eq!(
            value,
            TimeRemaining {
                days: 1,
                hours: 1,
                minutes: 1,
                seconds: 1,
            }
        );
    }

    #[test]
    fn test_from_secs_zero() {
        assert_eq!(TimeRemaining::from_secs(0), TimeRemaining::ZERO);
        assert!(TimeRemaining::from_secs(0).is_elapsed());
    }

    #[test]
    fn test_until_clamps_past_targets() {
        let target = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let now = Utc.with_ymd_and_hms(2026, 6, 1, 0, 0, 0).unwrap();

        let value = TimeRemaining::until(target, now);
        assert_eq!(value, TimeRemaining::ZERO);

        // Stays zero on a later tick
        let later = now + chrono::Duration::seconds(5);
        assert_eq!(TimeRemaining::until(target, later), TimeRemaining::ZERO);
    }

    #[test]
    fn test_until_future_target() {
        let now = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let target = now + chrono::Duration::seconds(3_725); // 1h 2m 5s

        let value = TimeRemaining::until(target, now);
        assert_eq!(
            value,
            TimeRemaining {
                days: 0,
                hours: 1,
                minutes: 2,
                seconds: 5,
            }
        );
    }

    #[test]
    fn test_pad_two_digits() {
        assert_eq!(TimeRemaining::pad(0), "00");
        assert_eq!(TimeRemaining::pad(7), "07");
        assert_eq!(TimeRemaining::pad(59), "59");
    }

    #[test]
    fn test_pad_never_truncates() {
        assert_eq!(TimeRemaining::pad(100), "100");
        assert_eq!(TimeRemaining::pad(365), "365");
    }

    #[test]
    fn test_target_instant() {
        let at = Utc.with_ymd_and_hms(2026, 3, 1, 10, 0, 0).unwrap();

        let event = CountdownTarget::Event {
            id: "e1".to_string(),
            starts_at: at,
        };
        assert_eq!(event.instant(), at);
        assert!(!event.is_fallback());

        let anchor = CountdownTarget::WeeklyAnchor(at);
        assert_eq!(anchor.instant(), at);
        assert!(anchor.is_fallback());
    }

    #[test]
    fn test_event_record_json_round_trip() {
        let json = r#"{
            "id": "e1",
            "title": "Community Outreach",
            "description": "Serving our community",
            "date": "2026-03-08T10:00:00Z",
            "location": "Downtown",
            "imageUrl": "https://example.org/outreach.jpg"
        }"#;

        let record: EventRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.title, "Community Outreach");
        assert_eq!(record.image_url, "https://example.org/outreach.jpg");
        assert!(record.starts_at().is_some());
    }
}

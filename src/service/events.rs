//! Remote event source port.
//!
//! Defines the [`EventSource`] trait the countdown engine fetches through.
//! Host adapters implement it over whatever transport the site actually
//! uses; the engine only sees an ordered collection of records or an
//! error. A fetch error is recovered locally by the engine (fallback
//! schedule) and is never surfaced to the user.

use thiserror::Error;

use crate::types::EventRecord;

// =============================================================================
// EventSourceError
// =============================================================================

/// Errors an event source can report.
#[derive(Debug, Clone, Error)]
pub enum EventSourceError {
    /// The source could not be reached or answered with a failure.
    #[error("event source unavailable: {0}")]
    Unavailable(String),

    /// The source answered, but the payload could not be decoded.
    #[error("malformed event payload: {0}")]
    Malformed(String),
}

// =============================================================================
// EventSource trait
// =============================================================================

/// Port for querying the remote event collection.
///
/// One query per engine activation; the engine never retries on its own.
/// Implementations may block, poll a completed future, or return a cached
/// collection; the engine's reconciliation runs when the call returns.
///
/// Records are expected in source-supplied order; the engine preserves
/// that order for display.
pub trait EventSource {
    /// Fetch the current event collection.
    ///
    /// # Errors
    ///
    /// Returns an [`EventSourceError`] when the source is unreachable or
    /// the payload cannot be decoded.
    fn fetch_events(&self) -> Result<Vec<EventRecord>, EventSourceError>;
}

// =============================================================================
// StaticEventSource
// =============================================================================

/// In-memory event source for hosts that ship a fixed schedule, and for
/// tests.
pub struct StaticEventSource {
    records: Vec<EventRecord>,
}

impl StaticEventSource {
    pub fn new(records: Vec<EventRecord>) -> Self {
        Self { records }
    }
}

impl EventSource for StaticEventSource {
    fn fetch_events(&self) -> Result<Vec<EventRecord>, EventSourceError> {
        Ok(self.records.clone())
    }
}

// =============================================================================
// Payload decoding
// =============================================================================

/// Decode a JSON array payload into event records.
///
/// Convenience for host adapters whose transport hands back raw JSON.
///
/// # Errors
///
/// Returns [`EventSourceError::Malformed`] when the payload is not a
/// JSON array of records.
pub fn parse_events(payload: &str) -> Result<Vec<EventRecord>, EventSourceError> {
    serde_json::from_str(payload).map_err(|err| EventSourceError::Malformed(err.to_string()))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, date: &str) -> EventRecord {
        EventRecord {
            id: id.to_string(),
            title: "Sunday Service".to_string(),
            description: "Weekly service".to_string(),
            date: date.to_string(),
            location: "Main Hall".to_string(),
            image_url: String::new(),
        }
    }

    #[test]
    fn test_static_source_returns_records_in_order() {
        let source = StaticEventSource::new(vec![
            record("e2", "2026-03-08T10:00:00Z"),
            record("e1", "2026-03-01T10:00:00Z"),
        ]);

        let records = source.fetch_events().unwrap();
        assert_eq!(records.len(), 2);
        // Source-supplied order, not date order
        assert_eq!(records[0].id, "e2");
        assert_eq!(records[1].id, "e1");
    }

    #[test]
    fn test_parse_events_array() {
        let payload = r#"[
            {
                "id": "e1",
                "title": "Youth Ministry",
                "description": "Engaging activities for young people",
                "date": "2026-03-15T18:30:00Z",
                "location": "Youth Hall",
                "imageUrl": "https://example.org/youth.jpg"
            }
        ]"#;

        let records = parse_events(payload).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "e1");
    }

    #[test]
    fn test_parse_events_rejects_non_array() {
        let err = parse_events("{\"oops\": true}").unwrap_err();
        assert!(matches!(err, EventSourceError::Malformed(_)));
    }

    #[test]
    fn test_error_display() {
        let err = EventSourceError::Unavailable("connection refused".to_string());
        assert!(format!("{err}").contains("connection refused"));

        let err = EventSourceError::Malformed("expected array".to_string());
        assert!(format!("{err}").contains("expected array"));
    }
}

//! # faithconnect-core
//!
//! Reactive view-state core for the FaithConnect community site.
//!
//! Built on [spark-signals](https://github.com/RLabs-Inc/spark-signals)
//! for fine-grained reactivity.
//!
//! ## Architecture
//!
//! Three independent, leaf-level components each own their own state and
//! lifecycle; the presentation layer composes them without coupling them
//! to each other:
//!
//! ```text
//! host scroll stream → ScrollTracker    → visible / scrolled / scrolling
//! event source       → CountdownEngine  → event cards + TimeRemaining
//! session service    → SessionManager   → SessionIdentity | None
//! ```
//!
//! External collaborators (the remote event source, the identity/session
//! service, the host scroll source) are consumed through the [`service`]
//! ports. Rendering is out of scope: the downstream renderer reads the
//! signals this crate owns.
//!
//! ## Modules
//!
//! - [`types`] - Core types (EventRecord, TimeRemaining, SessionIdentity)
//! - [`service`] - External collaborator contracts (events, auth)
//! - [`state`] - The reactive components and the scroll sample stream

pub mod service;
pub mod state;
pub mod types;

// Re-export commonly used items
pub use types::*;

pub use service::{
    AuthError, AuthService, Cancel, EventSource, EventSourceError, SessionCallback,
    StaticEventSource, SubscribeObject, SubscribePayload, SubscribeResponse, Subscription,
    parse_events, resolve_cancel,
};

pub use state::{
    // Scroll stream
    ScrollHandler, ScrollSample, dispatch as dispatch_scroll, last_position, last_sample,
    on as on_scroll, reset_scroll_state,
    // Visibility
    HIDE_THRESHOLD, MenuState, SCROLLED_THRESHOLD, SETTLE_MS, ScrollTracker, visibility_after,
    // Countdown
    ANCHOR_HOUR, ANCHOR_WEEKDAY, CountdownEngine, FALLBACK_OFFSET_DAYS, fallback_events,
    next_weekly_anchor, select_countdown_target,
    // Session
    SessionManager,
};

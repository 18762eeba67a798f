//! Identity/session service port.
//!
//! Defines the [`AuthService`] trait the session manager consumes:
//! a point-in-time session query, a change subscription, and sign-out.
//!
//! The subscription registration returns a [`SubscribeResponse`] whose
//! cancellation capability has no single guaranteed shape across service
//! implementations. [`resolve_cancel`] is the ordered shape probe that
//! normalizes it into an `Option<Cancel>`, run exactly once at
//! registration time.

use thiserror::Error;

use crate::types::SessionIdentity;

// =============================================================================
// Cancel capability
// =============================================================================

/// An opaque "stop receiving notifications" action. Invoked at most once.
pub type Cancel = Box<dyn FnOnce()>;

/// Callback invoked on every session-change notification. The payload
/// wholesale-replaces the stored identity; `None` means signed out.
pub type SessionCallback = Box<dyn Fn(Option<SessionIdentity>)>;

// =============================================================================
// AuthError
// =============================================================================

/// Errors the session service can report.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// The service could not be reached.
    #[error("session service unavailable: {0}")]
    Unavailable(String),

    /// The service rejected the operation.
    #[error("session operation rejected: {0}")]
    Rejected(String),
}

// =============================================================================
// Subscription response shapes
// =============================================================================

/// Registration response for a session-change subscription.
///
/// The payload's cancellation shape varies between service
/// implementations; every part below is optional on purpose.
pub struct SubscribeResponse {
    pub data: Option<SubscribePayload>,
}

/// The response payload: either a structured object or itself callable.
pub enum SubscribePayload {
    Object(SubscribeObject),
    /// The payload itself is the cancellation action.
    Callable(Cancel),
}

/// Structured payload carrying zero or more cancellation shapes.
#[derive(Default)]
pub struct SubscribeObject {
    /// Nested subscription object (`data.subscription.unsubscribe`).
    pub subscription: Option<Subscription>,
    /// Cancellation directly on the payload (`data.unsubscribe`).
    pub unsubscribe: Option<Cancel>,
}

/// Nested subscription handle.
pub struct Subscription {
    pub unsubscribe: Option<Cancel>,
}

impl SubscribeResponse {
    /// A response with no payload at all.
    pub fn empty() -> Self {
        Self { data: None }
    }

    /// The nested shape: `data.subscription.unsubscribe`.
    pub fn nested(cancel: Cancel) -> Self {
        Self {
            data: Some(SubscribePayload::Object(SubscribeObject {
                subscription: Some(Subscription {
                    unsubscribe: Some(cancel),
                }),
                unsubscribe: None,
            })),
        }
    }

    /// The direct shape: `data.unsubscribe`.
    pub fn direct(cancel: Cancel) -> Self {
        Self {
            data: Some(SubscribePayload::Object(SubscribeObject {
                subscription: None,
                unsubscribe: Some(cancel),
            })),
        }
    }

    /// The bare shape: `data` itself is callable.
    pub fn callable(cancel: Cancel) -> Self {
        Self {
            data: Some(SubscribePayload::Callable(cancel)),
        }
    }
}

// =============================================================================
// Cancel probe
// =============================================================================

/// Probe a registration response for its cancellation capability.
///
/// Shape matchers run in strict priority order; the first match wins and
/// the rest are treated as absent:
///
/// 1. nested `data.subscription.unsubscribe`
/// 2. direct `data.unsubscribe`
/// 3. `data` itself callable
/// 4. none: teardown degrades to a log-only no-op
///
/// Runs exactly once, at registration time.
pub fn resolve_cancel(response: SubscribeResponse) -> Option<Cancel> {
    let payload = response.data?;

    match payload {
        SubscribePayload::Object(SubscribeObject {
            subscription:
                Some(Subscription {
                    unsubscribe: Some(cancel),
                }),
            ..
        }) => Some(cancel),
        SubscribePayload::Object(SubscribeObject {
            unsubscribe: Some(cancel),
            ..
        }) => Some(cancel),
        SubscribePayload::Callable(cancel) => Some(cancel),
        SubscribePayload::Object(_) => None,
    }
}

// =============================================================================
// AuthService trait
// =============================================================================

/// Port for the external identity/session service.
///
/// The crate consumes this contract; it never implements the session
/// protocol itself.
pub trait AuthService {
    /// Point-in-time query for the current session.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] when the service cannot answer. The
    /// manager treats a failed query as "no session", not as fatal.
    fn current_session(&self) -> Result<Option<SessionIdentity>, AuthError>;

    /// Register for session-change notifications.
    ///
    /// The returned response carries the cancellation capability in one
    /// of the shapes [`resolve_cancel`] understands, or none at all.
    fn on_session_change(&self, callback: SessionCallback) -> SubscribeResponse;

    /// Sign the current user out.
    ///
    /// # Errors
    ///
    /// Failures propagate to the caller; the manager leaves local state
    /// unchanged on error.
    fn sign_out(&self) -> Result<(), AuthError>;
}

// =============================================================================
// TESTS
// =============================================================================

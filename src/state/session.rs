//! Session Module - Identity awareness and subscription teardown
//!
//! Keeps the current authenticated identity in sync with the external
//! session service:
//! - One point-in-time query at activation (failure means "no session")
//! - A long-lived change subscription; every notification replaces the
//!   identity wholesale
//! - The subscription's cancel capability is probed once at registration
//!   (the service's contract has no single fixed shape) and invoked at
//!   most once at teardown
//!
//! # Example
//!
//! ```ignore
//! use faithconnect_core::state::session::SessionManager;
//!
//! let mut manager = SessionManager::new();
//! manager.activate(&auth_service);
//!
//! if let Some(user) = manager.identity() {
//!     println!("Signed in as {}", user.user_id);
//! }
//!
//! manager.sign_out(&auth_service)?;
//! manager.teardown();
//! ```

use spark_signals::{Signal, signal};
use tracing::{debug, warn};

use crate::service::auth::{AuthError, AuthService, Cancel, resolve_cancel};
use crate::types::SessionIdentity;

// =============================================================================
// SESSION MANAGER
// =============================================================================

/// Nullable identity state plus the lifecycle of one service
/// subscription. `None` means unauthenticated.
pub struct SessionManager {
    identity: Signal<Option<SessionIdentity>>,
    /// Resolved cancel capability; consumed exactly once at teardown.
    cancel: Option<Cancel>,
    attached: bool,
}

impl SessionManager {
    /// Create a manager with no session and no subscription.
    pub fn new() -> Self {
        Self {
            identity: signal(None),
            cancel: None,
            attached: false,
        }
    }

    /// Query the current session and register for change notifications.
    ///
    /// A failed query leaves the identity `None` (treated as signed out,
    /// logged, never fatal). The registration response is probed once for
    /// its cancel capability. Calling again while attached is a no-op:
    /// no double registration.
    pub fn activate(&mut self, service: &dyn AuthService) {
        if self.attached {
            return;
        }
        self.attached = true;

        match service.current_session() {
            Ok(session) => {
                self.identity.set(session);
            }
            Err(err) => {
                warn!(error = %err, "session query failed, treating as signed out");
            }
        }

        let identity = self.identity.clone();
        let response = service.on_session_change(Box::new(move |session| {
            // Wholesale replacement, notification order preserved
            identity.set(session);
        }));
        self.cancel = resolve_cancel(response);
    }

    /// The current identity (`None` when unauthenticated).
    pub fn identity(&self) -> Option<SessionIdentity> {
        self.identity.get()
    }

    /// The identity signal, for reactive consumers.
    pub fn identity_signal(&self) -> Signal<Option<SessionIdentity>> {
        self.identity.clone()
    }

    /// Whether someone is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.identity.get().is_some()
    }

    /// Sign the current user out through the service.
    ///
    /// On success the identity clears immediately (a latency hint; the
    /// service's own notification later overwrites it wholesale). On
    /// failure the error propagates and local state is left unchanged.
    ///
    /// # Errors
    ///
    /// Whatever the service reports.
    pub fn sign_out(&self, service: &dyn AuthService) -> Result<(), AuthError> {
        service.sign_out()?;
        self.identity.set(None);
        Ok(())
    }

    /// Invoke the resolved cancel capability, at most once.
    ///
    /// With no capability resolved this is a log-only no-op. Safe to call
    /// more than once, or before activation.
    pub fn teardown(&mut self) {
        match self.cancel.take() {
            Some(cancel) => cancel(),
            None => {
                if self.attached {
                    debug!("no cancel capability resolved, subscription teardown is a no-op");
                }
            }
        }
        self.attached = false;
    }
}

impl Default for SessionManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for SessionManager {
    fn drop(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            cancel();
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

//! External collaborator contracts.
//!
//! The core consumes these services, it never implements them:
//!
//! - **Events** - remote event collection query (countdown engine)
//! - **Auth** - session query, change subscription, sign-out (session manager)

pub mod auth;
pub mod events;

pub use auth::*;
pub use events::*;

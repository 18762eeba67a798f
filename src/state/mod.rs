//! State Module - Reactive view-state components
//!
//! This module contains the reactive systems that keep transient view
//! state consistent with external signals:
//!
//! - **Scroll** - Host sample stream, dispatch, handler registry
//! - **Visibility** - Navigation bar show/hide heuristic, settle flag
//! - **Countdown** - Event reconciliation, fallback schedule, live tick
//! - **Session** - Identity awareness, subscription teardown
//!
//! The components are independent: none reads or mutates another's
//! state. The presentation layer composes them.

pub mod countdown;
pub mod scroll;
pub mod session;
pub mod visibility;

pub use countdown::*;
pub use scroll::*;
pub use session::*;
pub use visibility::*;

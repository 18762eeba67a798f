//! Scroll Stream Module - Scroll sample state and handler registry
//!
//! State and handler registry for host scroll-position notifications.
//! Does NOT own the host scroll source (the embedding environment pushes
//! samples in). Does NOT decide visibility (that is the visibility module).
//!
//! Samples are dispatched in delivery order, one at a time, to handlers
//! in registration order.
//!
//! # API
//!
//! - `last_sample` - Get last scroll sample
//! - `last_position` - Get last scroll position
//! - `dispatch(sample)` - Push a sample from the host
//! - `on(handler)` - Subscribe to all scroll samples
//!
//! # Example
//!
//! ```ignore
//! use faithconnect_core::state::scroll;
//!
//! // Subscribe to scroll samples
//! let cleanup = scroll::on(|sample| {
//!     println!("Position: {}", sample.position);
//! });
//!
//! // Host pushes a sample
//! scroll::dispatch(scroll::ScrollSample::new(120));
//!
//! // Cleanup when done
//! cleanup();
//! ```

use std::cell::RefCell;

use spark_signals::{Signal, signal};

// =============================================================================
// TYPES
// =============================================================================

/// One scroll-position notification from the host environment.
///
/// `position` is pixels from the top. Nominally non-negative; negative
/// values occur on rubber-band overscroll and are tolerated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScrollSample {
    pub position: i32,
}

impl ScrollSample {
    /// Create a sample at the given position.
    pub fn new(position: i32) -> Self {
        Self { position }
    }
}

/// Handler for scroll samples.
pub type ScrollHandler = Box<dyn Fn(&ScrollSample)>;

// =============================================================================
// STATE
// =============================================================================

thread_local! {
    static LAST_SAMPLE: Signal<Option<ScrollSample>> = signal(None);
}

/// Get the last dispatched sample.
pub fn last_sample() -> Option<ScrollSample> {
    LAST_SAMPLE.with(|s| s.get())
}

/// Get the last dispatched position (0 if none yet).
pub fn last_position() -> i32 {
    last_sample().map(|s| s.position).unwrap_or(0)
}

// =============================================================================
// HANDLER REGISTRY
// =============================================================================

struct HandlerRegistry {
    handlers: Vec<(usize, ScrollHandler)>,
    next_id: usize,
}

impl HandlerRegistry {
    fn new() -> Self {
        Self {
            handlers: Vec::new(),
            next_id: 0,
        }
    }

    fn next_id(&mut self) -> usize {
        let id = self.next_id;
        self.next_id += 1;
        id
    }
}

thread_local! {
    static REGISTRY: RefCell<HandlerRegistry> = RefCell::new(HandlerRegistry::new());
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Dispatch a scroll sample to all registered handlers.
///
/// Samples are processed in delivery order; each handler runs to
/// completion before the next sample can be dispatched.
pub fn dispatch(sample: ScrollSample) {
    // Always update reactive state
    LAST_SAMPLE.with(|s| s.set(Some(sample)));

    REGISTRY.with(|reg| {
        let reg = reg.borrow();
        for (_, handler) in &reg.handlers {
            handler(&sample);
        }
    });
}

// =============================================================================
// PUBLIC API
// =============================================================================

/// Subscribe to all scroll samples.
/// Returns cleanup function.
pub fn on<F>(handler: F) -> impl FnOnce()
where
    F: Fn(&ScrollSample) + 'static,
{
    let id = REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        let id = reg.next_id();
        reg.handlers.push((id, Box::new(handler)));
        id
    });

    move || {
        REGISTRY.with(|reg| {
            let mut reg = reg.borrow_mut();
            reg.handlers.retain(|(handler_id, _)| *handler_id != id);
        });
    }
}

/// Number of registered handlers (for testing/diagnostics).
pub fn handler_count() -> usize {
    REGISTRY.with(|reg| reg.borrow().handlers.len())
}

/// Reset all scroll stream state (for testing).
pub fn reset_scroll_state() {
    LAST_SAMPLE.with(|s| s.set(None));
    REGISTRY.with(|reg| {
        let mut reg = reg.borrow_mut();
        reg.handlers.clear();
        reg.next_id = 0;
    });
}

// =============================================================================
// TESTS
// =============================================================================

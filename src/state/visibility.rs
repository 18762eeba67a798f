//! Visibility Module - Navigation bar show/hide heuristic
//!
//! Derives the fixed navigation bar's visibility from the scroll sample
//! stream:
//! - At the very top of the page the bar is always shown
//! - Scrolling down past a dead-zone hides it
//! - Any upward movement re-shows it immediately
//! - A cosmetic `scrolled` flag trips past a small threshold
//! - A cosmetic `scrolling` flag settles 150 ms after the last sample
//!
//! The settle timer follows the shared-clock pattern: a watcher thread
//! flips an atomic, and the signal is synced on read on the owner thread.
//!
//! # Example
//!
//! ```ignore
//! use faithconnect_core::state::visibility::ScrollTracker;
//!
//! let mut tracker = ScrollTracker::new();
//! tracker.attach(); // subscribe to the scroll stream
//!
//! // ... host dispatches samples ...
//! if tracker.visible() {
//!     // render the bar
//! }
//!
//! tracker.teardown();
//! ```

use std::cell::Cell;
use std::rc::Rc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use spark_signals::{Signal, signal};

use super::scroll;

// =============================================================================
// CONSTANTS
// =============================================================================

/// Position past which the `scrolled` flag trips (cosmetic, independent
/// of visibility).
pub const SCROLLED_THRESHOLD: i32 = 10;

/// Dead-zone below which downward scrolling never hides the bar.
/// Strictly greater-than: a position exactly at the threshold is "not
/// yet past".
pub const HIDE_THRESHOLD: i32 = 50;

/// Quiet time after the last sample before `scrolling` resets.
pub const SETTLE_MS: u64 = 150;

/// Settle watcher poll interval.
const SETTLE_POLL_MS: u64 = 25;

// =============================================================================
// TRANSITION RULE
// =============================================================================

/// Next visibility value for a sample, given the previous sample's
/// position.
///
/// Evaluated on every sample:
/// - `position <= 0` forces visible (top of page, covers overscroll)
/// - downward past the dead-zone hides
/// - any upward movement shows
/// - otherwise unchanged (duplicate samples are idempotent)
pub fn visibility_after(visible: bool, position: i32, previous: i32) -> bool {
    if position <= 0 {
        true
    } else if position > previous && position > HIDE_THRESHOLD {
        false
    } else if position < previous {
        true
    } else {
        visible
    }
}

// =============================================================================
// TRACKER STATE
// =============================================================================

fn now_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

struct TrackerState {
    visible: Signal<bool>,
    scrolled: Signal<bool>,
    scrolling: Signal<bool>,
    last_position: Cell<i32>,
    /// Thread-safe scrolling flag, flipped by the settle watcher.
    scrolling_flag: Arc<AtomicBool>,
    /// Wall-clock stamp of the last sample, for the settle watcher.
    last_sample_ms: Arc<AtomicU64>,
}

impl TrackerState {
    fn apply(&self, position: i32) {
        // Mark scrolling and stamp the settle clock
        self.last_sample_ms.store(now_millis(), Ordering::SeqCst);
        self.scrolling_flag.store(true, Ordering::SeqCst);
        if !self.scrolling.get() {
            self.scrolling.set(true);
        }

        let previous = self.last_position.get();
        let next = visibility_after(self.visible.get(), position, previous);
        if self.visible.get() != next {
            self.visible.set(next);
        }

        // Previous position updates unconditionally, after evaluation
        self.last_position.set(position);

        let scrolled = position > SCROLLED_THRESHOLD;
        if self.scrolled.get() != scrolled {
            self.scrolled.set(scrolled);
        }
    }
}

// =============================================================================
// SETTLE WATCHER
// =============================================================================

/// Background watcher that resets the scrolling flag once no sample has
/// arrived for [`SETTLE_MS`].
struct SettleWatcher {
    running: Arc<AtomicBool>,
    _handle: Option<JoinHandle<()>>,
}

impl SettleWatcher {
    fn start(flag: Arc<AtomicBool>, last_sample_ms: Arc<AtomicU64>) -> Self {
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        let handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                thread::sleep(Duration::from_millis(SETTLE_POLL_MS));
                if !running_clone.load(Ordering::SeqCst) {
                    break;
                }
                let quiet = now_millis().saturating_sub(last_sample_ms.load(Ordering::SeqCst));
                if flag.load(Ordering::SeqCst) && quiet >= SETTLE_MS {
                    flag.store(false, Ordering::SeqCst);
                }
            }
        });

        Self {
            running,
            _handle: Some(handle),
        }
    }

    fn stop(&self) {
        // Thread exits on its next poll; no join to avoid blocking
        self.running.store(false, Ordering::SeqCst);
    }
}

// =============================================================================
// SCROLL TRACKER
// =============================================================================

/// Show/hide state for the fixed navigation bar.
///
/// Owns its visibility state and settle timer exclusively; resets to
/// visible on construction and dies with the instance. No failure states:
/// a pure function of an always-available sample stream.
pub struct ScrollTracker {
    state: Rc<TrackerState>,
    stream_cleanup: Option<Box<dyn FnOnce()>>,
    settle: Option<SettleWatcher>,
}

impl ScrollTracker {
    /// Create a tracker. The bar starts visible; the settle watcher
    /// starts immediately and runs until teardown.
    pub fn new() -> Self {
        let state = Rc::new(TrackerState {
            visible: signal(true),
            scrolled: signal(false),
            scrolling: signal(false),
            last_position: Cell::new(0),
            scrolling_flag: Arc::new(AtomicBool::new(false)),
            last_sample_ms: Arc::new(AtomicU64::new(0)),
        });

        let settle = SettleWatcher::start(
            state.scrolling_flag.clone(),
            state.last_sample_ms.clone(),
        );

        Self {
            state,
            stream_cleanup: None,
            settle: Some(settle),
        }
    }

    /// Subscribe to the scroll sample stream. No-op if already attached.
    pub fn attach(&mut self) {
        if self.stream_cleanup.is_some() {
            return;
        }
        let state = self.state.clone();
        let cleanup = scroll::on(move |sample| state.apply(sample.position));
        self.stream_cleanup = Some(Box::new(cleanup));
    }

    /// Feed one sample directly (hosts that do not use the stream).
    pub fn on_scroll(&self, position: i32) {
        self.state.apply(position);
    }

    /// Whether the bar is currently shown.
    pub fn visible(&self) -> bool {
        self.state.visible.get()
    }

    /// The visibility signal, for reactive consumers.
    pub fn visible_signal(&self) -> Signal<bool> {
        self.state.visible.clone()
    }

    /// Whether the page is scrolled past the cosmetic threshold.
    pub fn scrolled(&self) -> bool {
        self.state.scrolled.get()
    }

    /// Whether a scroll is in progress (settles 150 ms after the last
    /// sample). Syncs the watcher's flag into the signal on read.
    pub fn scrolling(&self) -> bool {
        let flag = self.state.scrolling_flag.load(Ordering::SeqCst);
        if self.state.scrolling.get() != flag {
            self.state.scrolling.set(flag);
        }
        flag
    }

    /// The previous sample's position.
    pub fn last_position(&self) -> i32 {
        self.state.last_position.get()
    }

    /// Unsubscribe from the stream and stop the settle watcher.
    /// Safe to call more than once, or before `attach`.
    pub fn teardown(&mut self) {
        if let Some(cleanup) = self.stream_cleanup.take() {
            cleanup();
        }
        if let Some(settle) = self.settle.take() {
            settle.stop();
        }
    }
}

impl Default for ScrollTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for ScrollTracker {
    fn drop(&mut self) {
        self.teardown();
    }
}

// =============================================================================
// MENU STATE
// =============================================================================

/// Open/closed state for the collapsible navigation menu.
#[derive(Clone)]
pub struct MenuState {
    open: Signal<bool>,
}

impl MenuState {
    /// Create a closed menu.
    pub fn new() -> Self {
        Self { open: signal(false) }
    }

    /// Whether the menu is open.
    pub fn is_open(&self) -> bool {
        self.open.get()
    }

    /// Flip the menu.
    pub fn toggle(&self) {
        self.open.set(!self.open.get());
    }

    /// Close the menu (navigation away, escape).
    pub fn close(&self) {
        if self.open.get() {
            self.open.set(false);
        }
    }

    /// The open signal, for reactive consumers.
    pub fn open_signal(&self) -> Signal<bool> {
        self.open.clone()
    }
}

impl Default for MenuState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TESTS
// =============================================================================

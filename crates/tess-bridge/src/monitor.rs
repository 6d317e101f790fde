//! Progress and cancellation bridging for the long-running recognition call.
//!
//! The engine invokes callbacks synchronously from inside the blocking
//! recognition call. Cancellation, however, is requested from a different
//! thread (that is the entire point of `stop`), so the cancel flag and the
//! callback-validity state are shared mutable state written from one thread
//! and read from another. Both go through acquire/release atomics and a
//! mutex; an unsynchronized flag would risk the blocked thread never
//! observing the stop request.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

use parking_lot::Mutex;

use crate::image::{LineBounds, TextBoundary};

/// One progress notification forwarded to the caller.
///
/// `left`/`right`/`top`/`bottom` are the engine-reported deltas for the
/// current line, relative to the text boundary; `line` is the absolute box
/// of the boundary itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressEvent {
    pub percent: i32,
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
    pub line: LineBounds,
}

/// Caller-side destination for progress notifications.
///
/// A sink is installed for the duration of exactly one long-running call
/// and cleared when that call ends or is stopped; a stray late callback
/// finds no sink and is dropped.
pub trait ProgressSink: Send + Sync {
    fn on_progress(&self, event: ProgressEvent);
}

/// State shared between the session, the in-call monitor, and any thread
/// holding a [`StopHandle`].
pub struct MonitorShared {
    cancel: AtomicBool,
    last_progress: AtomicI32,
    sink: Mutex<Option<Arc<dyn ProgressSink>>>,
    boundary: Mutex<TextBoundary>,
}

impl MonitorShared {
    pub fn new() -> Self {
        Self {
            cancel: AtomicBool::new(false),
            last_progress: AtomicI32::new(0),
            sink: Mutex::new(None),
            boundary: Mutex::new(TextBoundary::default()),
        }
    }

    /// Record the current text boundary for progress coordinate
    /// translation.
    pub fn set_boundary(&self, boundary: TextBoundary) {
        *self.boundary.lock() = boundary;
    }

    pub fn boundary(&self) -> TextBoundary {
        *self.boundary.lock()
    }

    /// Install the callback target before a long-running call: clears the
    /// cancel flag and resets the last reported progress.
    pub fn install(&self, sink: Arc<dyn ProgressSink>) {
        self.cancel.store(false, Ordering::Release);
        self.last_progress.store(0, Ordering::Release);
        *self.sink.lock() = Some(sink);
    }

    /// Tear down after the call returns, normally or via cancellation:
    /// clears the callback target and all bookkeeping so a stray late
    /// callback cannot be delivered.
    pub fn reset(&self) {
        self.cancel.store(false, Ordering::Release);
        self.last_progress.store(0, Ordering::Release);
        *self.sink.lock() = None;
        *self.boundary.lock() = TextBoundary::default();
    }

    /// Request cooperative cancellation. Clears the callback target and
    /// bookkeeping first, then raises the flag the engine polls; the
    /// engine stops when it next observes it.
    pub fn request_stop(&self) {
        self.last_progress.store(0, Ordering::Release);
        *self.sink.lock() = None;
        *self.boundary.lock() = TextBoundary::default();
        self.cancel.store(true, Ordering::Release);
    }

    pub fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Forward an engine progress callback to the installed sink.
    ///
    /// Delivery happens only while the session is valid for it (not
    /// cancelled, sink installed) and only when the callback carries new
    /// information: a percent strictly above the last reported one, or a
    /// non-zero sub-region delta. Repeated identical percentages with no
    /// geometry are suppressed.
    pub fn report_progress(&self, percent: i32, left: i32, right: i32, top: i32, bottom: i32) {
        if self.cancelled() {
            tracing::debug!("progress callback dropped: cancellation requested");
            return;
        }
        let sink = self.sink.lock().clone();
        let Some(sink) = sink else {
            tracing::debug!("progress callback dropped: no callback target installed");
            return;
        };
        if percent > self.last_progress.load(Ordering::Acquire) || left != 0 || right != 0 || top != 0 || bottom != 0 {
            let line = self.boundary.lock().bounds();
            sink.on_progress(ProgressEvent {
                percent,
                left,
                right,
                top,
                bottom,
                line,
            });
            self.last_progress.store(percent, Ordering::Release);
        }
    }
}

impl Default for MonitorShared {
    fn default() -> Self {
        Self::new()
    }
}

/// The context object handed to the engine for one long-running call.
///
/// Exposes exactly the two operations the engine needs: a cancellation
/// poll and a progress report.
pub struct RecognitionMonitor {
    shared: Arc<MonitorShared>,
}

impl RecognitionMonitor {
    pub(crate) fn new(shared: Arc<MonitorShared>) -> Self {
        Self { shared }
    }

    /// Polled periodically by the engine; true once a stop was requested.
    pub fn cancelled(&self) -> bool {
        self.shared.cancelled()
    }

    /// Called by the engine zero or more times during recognition.
    pub fn report_progress(&self, percent: i32, left: i32, right: i32, top: i32, bottom: i32) {
        self.shared.report_progress(percent, left, right, top, bottom);
    }
}

/// Cross-thread handle for interrupting a recognition call in progress.
///
/// This is the only part of a session meant to be touched from a thread
/// other than the one blocked in the call.
#[derive(Clone)]
pub struct StopHandle {
    shared: Arc<MonitorShared>,
}

impl StopHandle {
    pub(crate) fn new(shared: Arc<MonitorShared>) -> Self {
        Self { shared }
    }

    /// Request a best-effort stop of the running recognition call. No
    /// further progress notifications are delivered after this returns.
    pub fn stop(&self) {
        self.shared.request_stop();
    }
}

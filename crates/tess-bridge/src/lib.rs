//! tess-bridge - Session bridge for a native, stateful OCR engine
//!
//! This crate is the call-and-response layer between a managed caller and
//! a Tesseract-style recognition engine. It does three jobs:
//!
//! - Manage the lifetime of per-session native resources (the engine
//!   handle, the loaded image, the progress/cancel channel) so they
//!   outlive individual boundary calls without leaking or double-freeing.
//! - Run long, engine-driven recognition while relaying progress to the
//!   caller and honoring cooperative cancellation requested from another
//!   thread.
//! - Serialize the hierarchical recognition result (block ⊃ paragraph ⊃
//!   line ⊃ word ⊃ symbol) into an annotated markup document.
//!
//! The recognition engine itself is a black box behind the
//! [`OcrEngine`] trait; image decoding and the caller-side UI live
//! elsewhere.
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tess_bridge::{ProgressEvent, ProgressSink, Session};
//!
//! struct PrintSink;
//! impl ProgressSink for PrintSink {
//!     fn on_progress(&self, event: ProgressEvent) {
//!         println!("{}%", event.percent);
//!     }
//! }
//!
//! let mut session = Session::new(engine);
//! if session.initialize("/usr/share/tessdata", "eng") {
//!     session.set_image_from_decoded(image);
//!     let markup = session.marked_up_document(0, Arc::new(PrintSink));
//!     println!("{markup}");
//! }
//! session.end_session();
//! ```
//!
//! # Error model
//!
//! Boundary calls never panic and never return `Err` to the caller:
//! failures resolve to sentinels (`false`, empty string, empty sequence)
//! and are logged through `tracing`. See [`error`] for the internal
//! error type.

#![deny(unsafe_code)]

pub mod arena;
pub mod cursor;
pub mod engine;
pub mod error;
pub mod image;
pub mod markup;
pub mod monitor;
pub mod session;

pub use cursor::{FontAttributes, PageIteratorLevel, ResultCursor};
pub use engine::{EngineMode, OcrEngine, PageSegMode};
pub use error::{BridgeError, Result};
pub use image::{DecodedImage, ImageBacking, LineBounds, RawImage, SharedImage, TextBoundary};
pub use markup::{DEFAULT_CONFIDENCE_THRESHOLD, write_annotated_markup};
pub use monitor::{ProgressEvent, ProgressSink, RecognitionMonitor, StopHandle};
pub use session::Session;

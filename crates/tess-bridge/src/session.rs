//! Session lifecycle and the boundary operation surface.
//!
//! A session owns one engine handle, the image backing currently loaded
//! into it, and the shared progress/cancel state. Boundary operations are
//! non-throwing: failures resolve to sentinels (`false`, an empty string,
//! an empty sequence) and are logged, never propagated to the caller as
//! panics or errors.
//!
//! Lifecycle: `Fresh` (engine allocated, not initialized) → `Ready`
//! (initialized, no image) → `ImageLoaded` → `Running` (a long-running
//! recognition call in progress) → back to `Ready`/`ImageLoaded` on
//! completion, cancellation, or error. `end_session` releases the engine
//! handle exactly once; subsequent calls fail as invalid-state no-ops.

use std::sync::Arc;

use crate::arena::{self, ImageSetToken, ImageToken};
use crate::engine::{EngineMode, OcrEngine, PageSegMode};
use crate::error::{BridgeError, Result};
use crate::image::{ImageBacking, RawImage, SharedImage, TextBoundary};
use crate::markup::{DEFAULT_CONFIDENCE_THRESHOLD, write_annotated_markup};
use crate::monitor::{MonitorShared, ProgressSink, RecognitionMonitor, StopHandle};

use crate::cursor::ResultCursor;

/// Where the session is in its lifecycle. Ended sessions are represented
/// by the engine slot being empty, not by a phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Fresh,
    Ready,
    ImageLoaded,
    Running,
}

/// A stateful bridge session over one native engine instance.
pub struct Session<E: OcrEngine> {
    engine: Option<E>,
    backing: ImageBacking,
    monitor: Arc<MonitorShared>,
    phase: Phase,
    debug: bool,
}

impl<E: OcrEngine> Session<E> {
    /// Construct a session around a freshly allocated engine. The engine
    /// is not initialized and no image is loaded.
    pub fn new(engine: E) -> Self {
        Self {
            engine: Some(engine),
            backing: ImageBacking::None,
            monitor: Arc::new(MonitorShared::new()),
            phase: Phase::Fresh,
            debug: false,
        }
    }

    /// Handle for requesting a stop from another thread while a
    /// recognition call is blocking this one.
    pub fn stop_handle(&self) -> StopHandle {
        StopHandle::new(Arc::clone(&self.monitor))
    }

    /// Check that the session can service an engine operation: the engine
    /// handle has not been released and initialization has succeeded.
    /// Operations invoked before initialization or after `end_session`
    /// are invalid-state calls and must fail, not reach the engine.
    fn check_operable(&self) -> Result<()> {
        if self.engine.is_none() {
            return Err(BridgeError::invalid_state("session has ended"));
        }
        if self.phase == Phase::Fresh {
            return Err(BridgeError::invalid_state("engine not initialized"));
        }
        Ok(())
    }

    fn require_engine(&mut self) -> Result<&mut E> {
        self.check_operable()?;
        self.engine
            .as_mut()
            .ok_or_else(|| BridgeError::invalid_state("session has ended"))
    }

    /// Initialize the engine with the default mode. Returns false when the
    /// engine rejects the data path or language; the session stays usable
    /// but uninitialized.
    pub fn initialize(&mut self, data_path: &str, language: &str) -> bool {
        self.initialize_with_mode(data_path, language, EngineMode::Default)
    }

    /// Initialize the engine with an explicit mode.
    pub fn initialize_with_mode(&mut self, data_path: &str, language: &str, mode: EngineMode) -> bool {
        match self.try_initialize(data_path, language, mode) {
            Ok(()) => {
                tracing::debug!(language, "engine initialized");
                true
            }
            Err(err) => {
                tracing::warn!(language, error = %err, "engine initialization failed");
                false
            }
        }
    }

    fn try_initialize(&mut self, data_path: &str, language: &str, mode: EngineMode) -> Result<()> {
        // Initialization is the one engine call allowed on a fresh
        // session; only an ended session is off limits here.
        let engine = self
            .engine
            .as_mut()
            .ok_or_else(|| BridgeError::invalid_state("session has ended"))?;
        if !engine.init(data_path, language, mode) {
            return Err(BridgeError::engine_rejected(
                "initialization",
                format!("data_path={data_path} language={language}"),
            ));
        }
        self.phase = Phase::Ready;
        Ok(())
    }

    /// Languages the engine was initialized with; empty on failure.
    pub fn initialized_languages(&mut self) -> String {
        match self.require_engine() {
            Ok(engine) => engine.init_languages(),
            Err(err) => {
                tracing::warn!(error = %err, "initialized_languages unavailable");
                String::new()
            }
        }
    }

    /// Load a caller-supplied raw pixel buffer as the image to recognize.
    ///
    /// The buffer is copied before it is stored, decoupling the session
    /// from the caller's memory. The previous backing, whichever form it
    /// had, is released first. The text boundary is not touched; raw
    /// buffers come with a caller-supplied region.
    pub fn set_image_from_bytes(&mut self, bytes: &[u8], width: i32, height: i32, bits_per_pixel: i32, bytes_per_line: i32) {
        if let Err(err) = self.check_operable() {
            tracing::warn!(error = %err, "set_image_from_bytes on invalid session");
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let raw = RawImage::from_caller(bytes, width, height, bits_per_pixel, bytes_per_line);
        engine.set_image_raw(&raw);
        self.backing.replace(ImageBacking::Raw(raw));
        self.phase = Phase::ImageLoaded;
    }

    /// Load a decoded image shared with the caller.
    ///
    /// Takes a new reference to the handle (the caller may keep its own),
    /// releases the previous backing, and resets the text boundary to the
    /// image's full extent.
    pub fn set_image_from_decoded(&mut self, image: SharedImage) {
        if let Err(err) = self.check_operable() {
            tracing::warn!(error = %err, "set_image_from_decoded on invalid session");
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let boundary = TextBoundary::full_extent(image.width(), image.height());
        tracing::debug!(width = boundary.width, height = boundary.height, "text boundary reset to image extent");
        self.monitor.set_boundary(boundary);
        engine.set_image_decoded(&image);
        self.backing.replace(ImageBacking::Decoded(image));
        self.phase = Phase::ImageLoaded;
    }

    /// Restrict recognition to a sub-rectangle of the loaded image and
    /// record it as the current text boundary.
    pub fn set_region(&mut self, left: i32, top: i32, width: i32, height: i32) {
        if let Err(err) = self.check_operable() {
            tracing::warn!(error = %err, "set_region on invalid session");
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        let region = TextBoundary::new(left, top, width, height);
        self.monitor.set_boundary(region);
        engine.set_rectangle(region);
    }

    /// Plain recognized text; empty when the engine produced none.
    pub fn plain_text(&mut self) -> String {
        match self.require_engine() {
            Ok(engine) => engine.utf8_text().unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, "plain_text unavailable");
                String::new()
            }
        }
    }

    /// Annotated markup built from the engine's result cursor with the
    /// default confidence threshold.
    pub fn annotated_markup(&mut self) -> String {
        match self.require_engine() {
            Ok(engine) => match engine.result_cursor() {
                Some(mut cursor) => write_annotated_markup(cursor.as_mut(), DEFAULT_CONFIDENCE_THRESHOLD),
                None => String::new(),
            },
            Err(err) => {
                tracing::warn!(error = %err, "annotated_markup unavailable");
                String::new()
            }
        }
    }

    /// Full-document recognition with progress and cancellation active.
    ///
    /// Installs `sink` as the callback target for the duration of this
    /// call; the engine reports progress and polls for cancellation
    /// through the bridge, synchronously, while this call blocks. On
    /// return (normal or cancelled) the target and bookkeeping are
    /// cleared, so a stray late callback cannot be delivered. A stopped
    /// call returns whatever partial or empty result the engine yields.
    pub fn marked_up_document(&mut self, page: i32, sink: Arc<dyn ProgressSink>) -> String {
        if let Err(err) = self.check_operable() {
            tracing::warn!(error = %err, "marked_up_document on invalid session");
            return String::new();
        }
        let Some(engine) = self.engine.as_mut() else {
            return String::new();
        };
        self.monitor.install(sink);
        self.phase = Phase::Running;

        let monitor = RecognitionMonitor::new(Arc::clone(&self.monitor));
        let text = engine.hocr_text(page, &monitor).unwrap_or_default();

        self.monitor.reset();
        self.phase = if self.backing.is_none() { Phase::Ready } else { Phase::ImageLoaded };
        text
    }

    /// Box-annotated text for one page; empty when the engine has none.
    pub fn box_annotated_text(&mut self, page: i32) -> String {
        match self.require_engine() {
            Ok(engine) => engine.box_text(page).unwrap_or_default(),
            Err(err) => {
                tracing::warn!(error = %err, "box_annotated_text unavailable");
                String::new()
            }
        }
    }

    /// Request a best-effort stop of a running recognition call.
    ///
    /// Raises the cancellation flag the engine polls and clears the
    /// callback target, regardless of whether the engine has observed the
    /// flag yet. Cancellation is cooperative, not instantaneous. For
    /// stopping from another thread, use [`Session::stop_handle`].
    pub fn stop(&self) {
        tracing::debug!("stop requested");
        self.monitor.request_stop();
    }

    /// Mean recognition confidence, 0-100.
    pub fn mean_confidence(&mut self) -> i32 {
        match self.require_engine() {
            Ok(engine) => engine.mean_confidence(),
            Err(err) => {
                tracing::warn!(error = %err, "mean_confidence unavailable");
                0
            }
        }
    }

    /// Per-word confidences in reading order; empty when none available.
    pub fn word_confidences(&mut self) -> Vec<i32> {
        match self.require_engine() {
            Ok(engine) => engine.word_confidences(),
            Err(err) => {
                tracing::warn!(error = %err, "word_confidences unavailable");
                Vec::new()
            }
        }
    }

    /// Set an engine variable. False when the engine rejects the name or
    /// value, or when the session has ended.
    pub fn set_engine_variable(&mut self, name: &str, value: &str) -> bool {
        match self.require_engine() {
            Ok(engine) => {
                let accepted = engine.set_variable(name, value);
                if !accepted {
                    tracing::warn!(name, value, "engine rejected variable");
                }
                accepted
            }
            Err(err) => {
                tracing::warn!(error = %err, name, "set_engine_variable on invalid session");
                false
            }
        }
    }

    /// Free recognition results and adaptive data between pages or
    /// documents, and release the image backing.
    pub fn clear_results(&mut self) {
        if let Err(err) = self.check_operable() {
            tracing::warn!(error = %err, "clear_results on invalid session");
            return;
        }
        let Some(engine) = self.engine.as_mut() else {
            return;
        };
        engine.clear();
        self.backing.replace(ImageBacking::None);
        if self.phase == Phase::ImageLoaded {
            self.phase = Phase::Ready;
        }
    }

    /// Release the image backing and the engine handle. Idempotent: a
    /// second call is a no-op, and every later boundary call fails as an
    /// invalid-state sentinel instead of touching a released engine.
    pub fn end_session(&mut self) {
        let Some(mut engine) = self.engine.take() else {
            tracing::debug!("end_session on already ended session");
            return;
        };
        engine.end();
        self.backing.replace(ImageBacking::None);
        self.phase = Phase::Fresh;
        tracing::debug!("session ended");
    }

    /// Record the debug flag. Session bookkeeping only; the engine is not
    /// consulted.
    pub fn set_debug_mode(&mut self, debug: bool) {
        self.debug = debug;
    }

    pub fn debug_mode(&self) -> bool {
        self.debug
    }

    pub fn set_page_segmentation_mode(&mut self, mode: PageSegMode) {
        if let Ok(engine) = self.require_engine() {
            engine.set_page_seg_mode(mode);
        }
    }

    /// The engine's thresholded version of the loaded image, registered in
    /// the handle arena; ownership of the token transfers to the caller.
    pub fn thresholded_image_handle(&mut self) -> Option<ImageToken> {
        match self.require_engine() {
            Ok(engine) => engine.thresholded_image().map(arena::register_image),
            Err(err) => {
                tracing::warn!(error = %err, "thresholded_image_handle unavailable");
                None
            }
        }
    }

    /// Detected page regions as an arena-registered image collection.
    pub fn region_handles(&mut self) -> Option<ImageSetToken> {
        self.image_set(|engine| engine.regions(), "region_handles")
    }

    /// Detected text lines as an arena-registered image collection.
    pub fn line_handles(&mut self) -> Option<ImageSetToken> {
        self.image_set(|engine| engine.textlines(), "line_handles")
    }

    /// Detected strips as an arena-registered image collection.
    pub fn strip_handles(&mut self) -> Option<ImageSetToken> {
        self.image_set(|engine| engine.strips(), "strip_handles")
    }

    /// Detected words as an arena-registered image collection.
    pub fn word_handles(&mut self) -> Option<ImageSetToken> {
        self.image_set(|engine| engine.words(), "word_handles")
    }

    fn image_set(&mut self, produce: impl FnOnce(&mut E) -> Vec<SharedImage>, operation: &str) -> Option<ImageSetToken> {
        match self.require_engine() {
            Ok(engine) => Some(arena::register_image_set(produce(engine))),
            Err(err) => {
                tracing::warn!(error = %err, operation, "image handles unavailable");
                None
            }
        }
    }

    /// Cursor over the most recent recognition result. Valid until the
    /// next recognition call invalidates it.
    pub fn result_cursor(&mut self) -> Option<Box<dyn ResultCursor + '_>> {
        match self.require_engine() {
            Ok(engine) => engine.result_cursor(),
            Err(err) => {
                tracing::warn!(error = %err, "result_cursor unavailable");
                None
            }
        }
    }

    pub fn set_input_label(&mut self, name: &str) {
        if let Ok(engine) = self.require_engine() {
            engine.set_input_name(name);
        }
    }

    pub fn set_output_label(&mut self, name: &str) {
        if let Ok(engine) = self.require_engine() {
            engine.set_output_name(name);
        }
    }

    /// Ask the engine to read a config file; behavior on a missing file is
    /// engine-defined.
    pub fn load_config_file(&mut self, path: &str) {
        if let Ok(engine) = self.require_engine() {
            engine.read_config_file(path);
        }
    }
}

impl<E: OcrEngine> Drop for Session<E> {
    fn drop(&mut self) {
        // Destroying a session releases the engine and backing exactly
        // once; end_session is already idempotent.
        self.end_session();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::monitor::ProgressEvent;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[derive(Default)]
    struct FakeEngine {
        reject_init: bool,
        initialized: bool,
        languages: String,
        raw_images: u32,
        decoded_images: u32,
        rectangle: Option<TextBoundary>,
        variables: Vec<(String, String)>,
        reject_variables: bool,
        cleared: u32,
        ended: Arc<AtomicU32>,
        progress_script: Vec<(i32, i32, i32, i32, i32)>,
        config_files: Vec<String>,
    }

    impl OcrEngine for FakeEngine {
        fn init(&mut self, _data_path: &str, language: &str, _mode: EngineMode) -> bool {
            if self.reject_init {
                return false;
            }
            self.initialized = true;
            self.languages = language.to_string();
            true
        }

        fn init_languages(&self) -> String {
            self.languages.clone()
        }

        fn set_image_raw(&mut self, _image: &RawImage) {
            self.raw_images += 1;
        }

        fn set_image_decoded(&mut self, _image: &SharedImage) {
            self.decoded_images += 1;
        }

        fn set_rectangle(&mut self, region: TextBoundary) {
            self.rectangle = Some(region);
        }

        fn set_variable(&mut self, name: &str, value: &str) -> bool {
            if self.reject_variables {
                return false;
            }
            self.variables.push((name.to_string(), value.to_string()));
            true
        }

        fn set_page_seg_mode(&mut self, _mode: PageSegMode) {}
        fn set_input_name(&mut self, _name: &str) {}
        fn set_output_name(&mut self, _name: &str) {}

        fn read_config_file(&mut self, path: &str) {
            self.config_files.push(path.to_string());
        }

        fn utf8_text(&mut self) -> Option<String> {
            self.initialized.then(|| "recognized".to_string())
        }

        fn hocr_text(&mut self, _page: i32, monitor: &RecognitionMonitor) -> Option<String> {
            for (percent, left, right, top, bottom) in self.progress_script.clone() {
                if monitor.cancelled() {
                    return Some("partial".to_string());
                }
                monitor.report_progress(percent, left, right, top, bottom);
            }
            Some("<div class='ocr_page'>done</div>".to_string())
        }

        fn box_text(&mut self, _page: i32) -> Option<String> {
            None
        }

        fn mean_confidence(&mut self) -> i32 {
            87
        }

        fn word_confidences(&mut self) -> Vec<i32> {
            vec![90, 80, 70]
        }

        fn thresholded_image(&mut self) -> Option<SharedImage> {
            None
        }

        fn regions(&mut self) -> Vec<SharedImage> {
            Vec::new()
        }

        fn textlines(&mut self) -> Vec<SharedImage> {
            Vec::new()
        }

        fn strips(&mut self) -> Vec<SharedImage> {
            Vec::new()
        }

        fn words(&mut self) -> Vec<SharedImage> {
            Vec::new()
        }

        fn result_cursor(&mut self) -> Option<Box<dyn ResultCursor + '_>> {
            None
        }

        fn clear(&mut self) {
            self.cleared += 1;
        }

        fn end(&mut self) {
            self.ended.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        events: Mutex<Vec<ProgressEvent>>,
    }

    impl ProgressSink for RecordingSink {
        fn on_progress(&self, event: ProgressEvent) {
            self.events.lock().push(event);
        }
    }

    struct StoppingSink {
        handle: StopHandle,
        delivered: AtomicU32,
    }

    impl ProgressSink for StoppingSink {
        fn on_progress(&self, _event: ProgressEvent) {
            self.delivered.fetch_add(1, Ordering::SeqCst);
            self.handle.stop();
        }
    }

    struct StubImage(i32, i32);

    impl crate::image::DecodedImage for StubImage {
        fn width(&self) -> i32 {
            self.0
        }
        fn height(&self) -> i32 {
            self.1
        }
    }

    #[test]
    fn test_initialize_success() {
        let mut session = Session::new(FakeEngine::default());
        assert!(session.initialize("/tessdata", "eng"));
        assert_eq!(session.initialized_languages(), "eng");
    }

    #[test]
    fn test_initialize_failure_leaves_session_usable() {
        let mut session = Session::new(FakeEngine {
            reject_init: true,
            ..FakeEngine::default()
        });
        assert!(!session.initialize("/tessdata", "xyz"));
        // The session is still alive; a later attempt may succeed and
        // other calls do not crash.
        assert_eq!(session.initialized_languages(), "");
    }

    #[test]
    fn test_set_region_informs_engine_and_boundary() {
        let mut session = Session::new(FakeEngine::default());
        session.initialize("/tessdata", "eng");
        session.set_region(5, 6, 70, 80);
        assert_eq!(session.monitor.boundary(), TextBoundary::new(5, 6, 70, 80));
        assert_eq!(
            session.engine.as_ref().unwrap().rectangle,
            Some(TextBoundary::new(5, 6, 70, 80))
        );
    }

    #[test]
    fn test_decoded_image_resets_boundary_to_full_extent() {
        let mut session = Session::new(FakeEngine::default());
        session.initialize("/tessdata", "eng");
        session.set_region(5, 6, 70, 80);
        session.set_image_from_decoded(Arc::new(StubImage(640, 480)));
        assert_eq!(session.monitor.boundary(), TextBoundary::full_extent(640, 480));
    }

    #[test]
    fn test_raw_image_does_not_touch_boundary() {
        let mut session = Session::new(FakeEngine::default());
        session.initialize("/tessdata", "eng");
        session.set_region(1, 2, 3, 4);
        session.set_image_from_bytes(&[0u8; 12], 4, 3, 8, 4);
        assert_eq!(session.monitor.boundary(), TextBoundary::new(1, 2, 3, 4));
        assert_eq!(session.engine.as_ref().unwrap().raw_images, 1);
    }

    #[test]
    fn test_backing_swapped_between_forms() {
        let mut session = Session::new(FakeEngine::default());
        session.initialize("/tessdata", "eng");
        session.set_image_from_bytes(&[0u8; 4], 2, 2, 8, 2);
        assert!(matches!(session.backing, ImageBacking::Raw(_)));
        session.set_image_from_decoded(Arc::new(StubImage(2, 2)));
        assert!(matches!(session.backing, ImageBacking::Decoded(_)));
        assert_eq!(session.engine.as_ref().unwrap().decoded_images, 1);
        session.clear_results();
        assert!(session.backing.is_none());
    }

    #[test]
    fn test_marked_up_document_forwards_progress() {
        let mut session = Session::new(FakeEngine {
            progress_script: vec![(10, 0, 0, 0, 0), (10, 0, 0, 0, 0), (25, 0, 0, 0, 0)],
            ..FakeEngine::default()
        });
        session.initialize("/tessdata", "eng");
        session.set_image_from_decoded(Arc::new(StubImage(100, 100)));

        let sink = Arc::new(RecordingSink::default());
        let text = session.marked_up_document(0, Arc::clone(&sink) as Arc<dyn ProgressSink>);

        assert!(text.contains("done"));
        let events = sink.events.lock();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].percent, 10);
        assert_eq!(events[1].percent, 25);
        assert_eq!(events[0].line.right, 100);
    }

    #[test]
    fn test_marked_up_document_teardown_clears_target() {
        let mut session = Session::new(FakeEngine {
            progress_script: vec![(10, 0, 0, 0, 0)],
            ..FakeEngine::default()
        });
        session.initialize("/tessdata", "eng");
        let sink = Arc::new(RecordingSink::default());
        session.marked_up_document(0, Arc::clone(&sink) as Arc<dyn ProgressSink>);

        // A stray callback after the call returns finds no target.
        session.monitor.report_progress(90, 0, 0, 0, 0);
        assert_eq!(sink.events.lock().len(), 1);
    }

    #[test]
    fn test_stop_during_recognition_suppresses_remaining_callbacks() {
        let mut session = Session::new(FakeEngine {
            progress_script: vec![(10, 0, 0, 0, 0), (20, 0, 0, 0, 0), (30, 0, 0, 0, 0)],
            ..FakeEngine::default()
        });
        session.initialize("/tessdata", "eng");

        let sink = Arc::new(StoppingSink {
            handle: session.stop_handle(),
            delivered: AtomicU32::new(0),
        });
        let text = session.marked_up_document(0, Arc::clone(&sink) as Arc<dyn ProgressSink>);

        assert_eq!(text, "partial");
        assert_eq!(sink.delivered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_set_engine_variable_sentinels() {
        let mut session = Session::new(FakeEngine::default());
        session.initialize("/tessdata", "eng");
        assert!(session.set_engine_variable("tessedit_char_blacklist", "xyz"));
        let mut rejecting = Session::new(FakeEngine {
            reject_variables: true,
            ..FakeEngine::default()
        });
        rejecting.initialize("/tessdata", "eng");
        assert!(!rejecting.set_engine_variable("bogus", "value"));
    }

    #[test]
    fn test_calls_before_initialization_are_sentinel_noops() {
        let mut session = Session::new(FakeEngine::default());

        assert!(!session.set_engine_variable("tessedit_char_blacklist", "xyz"));
        assert_eq!(session.plain_text(), "");
        assert_eq!(session.initialized_languages(), "");
        assert_eq!(session.annotated_markup(), "");
        assert_eq!(session.box_annotated_text(0), "");
        assert_eq!(session.mean_confidence(), 0);
        assert!(session.word_confidences().is_empty());
        assert!(session.thresholded_image_handle().is_none());
        assert!(session.region_handles().is_none());
        assert!(session.result_cursor().is_none());
        session.set_image_from_bytes(&[0u8; 1], 1, 1, 8, 1);
        session.set_region(1, 2, 3, 4);
        let sink = Arc::new(RecordingSink::default());
        assert_eq!(session.marked_up_document(0, sink as Arc<dyn ProgressSink>), "");

        // Nothing reached the engine.
        let engine = session.engine.as_ref().unwrap();
        assert!(engine.variables.is_empty());
        assert_eq!(engine.raw_images, 0);
        assert_eq!(engine.rectangle, None);
        assert!(session.backing.is_none());

        // The session stays usable; initialization can still happen.
        assert!(session.initialize("/tessdata", "eng"));
        assert!(session.set_engine_variable("tessedit_char_blacklist", "xyz"));
    }

    #[test]
    fn test_debug_mode_is_session_bookkeeping() {
        let mut session = Session::new(FakeEngine::default());
        assert!(!session.debug_mode());
        session.set_debug_mode(true);
        assert!(session.debug_mode());
        session.set_debug_mode(false);
        assert!(!session.debug_mode());
    }

    #[test]
    fn test_end_session_is_idempotent() {
        let ended = Arc::new(AtomicU32::new(0));
        let mut session = Session::new(FakeEngine {
            ended: Arc::clone(&ended),
            ..FakeEngine::default()
        });
        session.initialize("/tessdata", "eng");
        session.end_session();
        session.end_session();
        assert_eq!(ended.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_drop_releases_engine_once() {
        let ended = Arc::new(AtomicU32::new(0));
        {
            let mut session = Session::new(FakeEngine {
                ended: Arc::clone(&ended),
                ..FakeEngine::default()
            });
            session.initialize("/tessdata", "eng");
            session.end_session();
        }
        assert_eq!(ended.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_calls_after_end_are_sentinel_noops() {
        let mut session = Session::new(FakeEngine::default());
        session.initialize("/tessdata", "eng");
        session.end_session();

        assert!(!session.initialize("/tessdata", "eng"));
        assert_eq!(session.plain_text(), "");
        assert_eq!(session.annotated_markup(), "");
        assert_eq!(session.box_annotated_text(0), "");
        assert_eq!(session.mean_confidence(), 0);
        assert!(session.word_confidences().is_empty());
        assert!(!session.set_engine_variable("a", "b"));
        assert!(session.thresholded_image_handle().is_none());
        assert!(session.region_handles().is_none());
        assert!(session.result_cursor().is_none());
        let sink = Arc::new(RecordingSink::default());
        assert_eq!(session.marked_up_document(0, sink as Arc<dyn ProgressSink>), "");
        session.set_image_from_bytes(&[0u8; 1], 1, 1, 8, 1);
        assert!(session.backing.is_none());
    }

    #[test]
    fn test_clear_results_resets_engine_and_backing() {
        let mut session = Session::new(FakeEngine::default());
        session.initialize("/tessdata", "eng");
        session.set_image_from_bytes(&[0u8; 4], 2, 2, 8, 2);
        session.clear_results();
        assert_eq!(session.engine.as_ref().unwrap().cleared, 1);
        assert!(session.backing.is_none());
        assert_eq!(session.phase, Phase::Ready);
    }

    #[test]
    fn test_load_config_file_forwarded() {
        let mut session = Session::new(FakeEngine::default());
        session.initialize("/tessdata", "eng");
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("batch.nochop");
        std::fs::write(&path, "tessedit_char_blacklist xyz\n").unwrap();
        session.load_config_file(path.to_str().unwrap());
        assert_eq!(session.engine.as_ref().unwrap().config_files.len(), 1);
    }

    #[test]
    fn test_image_set_handles_registered_in_arena() {
        let mut session = Session::new(FakeEngine::default());
        session.initialize("/tessdata", "eng");
        let token = session.word_handles().expect("engine alive");
        let set = arena::take_image_set(token).expect("registered");
        assert!(set.is_empty());
    }
}

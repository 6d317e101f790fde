//! The black-box contract of the native recognition engine.
//!
//! The bridge treats the engine as an external collaborator: it drives
//! initialization, image loading, and recognition through this trait and
//! never looks inside. Long-running recognition receives a
//! [`RecognitionMonitor`] through which the engine reports progress and
//! polls for cooperative cancellation.

use serde::{Deserialize, Serialize};

use crate::cursor::ResultCursor;
use crate::image::{RawImage, SharedImage, TextBoundary};
use crate::monitor::RecognitionMonitor;

/// Which recognition engine variant to initialize.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum EngineMode {
    TesseractOnly = 0,
    LstmOnly = 1,
    TesseractAndLstm = 2,
    #[default]
    Default = 3,
}

impl EngineMode {
    pub fn from_u8(value: u8) -> Result<Self, String> {
        match value {
            0 => Ok(EngineMode::TesseractOnly),
            1 => Ok(EngineMode::LstmOnly),
            2 => Ok(EngineMode::TesseractAndLstm),
            3 => Ok(EngineMode::Default),
            _ => Err(format!("Invalid engine mode value: {}", value)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// Page segmentation mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PageSegMode {
    OsdOnly = 0,
    AutoOsd = 1,
    AutoOnly = 2,
    Auto = 3,
    SingleColumn = 4,
    SingleBlockVertical = 5,
    SingleBlock = 6,
    SingleLine = 7,
    SingleWord = 8,
    CircleWord = 9,
    SingleChar = 10,
    SparseText = 11,
    SparseTextOsd = 12,
    RawLine = 13,
}

impl PageSegMode {
    pub fn from_u8(value: u8) -> Result<Self, String> {
        match value {
            0 => Ok(PageSegMode::OsdOnly),
            1 => Ok(PageSegMode::AutoOsd),
            2 => Ok(PageSegMode::AutoOnly),
            3 => Ok(PageSegMode::Auto),
            4 => Ok(PageSegMode::SingleColumn),
            5 => Ok(PageSegMode::SingleBlockVertical),
            6 => Ok(PageSegMode::SingleBlock),
            7 => Ok(PageSegMode::SingleLine),
            8 => Ok(PageSegMode::SingleWord),
            9 => Ok(PageSegMode::CircleWord),
            10 => Ok(PageSegMode::SingleChar),
            11 => Ok(PageSegMode::SparseText),
            12 => Ok(PageSegMode::SparseTextOsd),
            13 => Ok(PageSegMode::RawLine),
            _ => Err(format!("Invalid page segmentation mode value: {}", value)),
        }
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

/// Operations the bridge consumes from the native engine.
///
/// The engine never takes ownership of image memory; it borrows whatever
/// the session keeps loaded. Strings returned by the engine are owned
/// `String`s, collapsing the C-side "engine allocates, bridge frees after
/// copy" contract into the return value.
pub trait OcrEngine: Send {
    /// Initialize with a language-data path and language code. Returns
    /// false when the engine rejects the pair.
    fn init(&mut self, data_path: &str, language: &str, mode: EngineMode) -> bool;

    /// Languages the engine was initialized with, engine-formatted.
    fn init_languages(&self) -> String;

    fn set_image_raw(&mut self, image: &RawImage);
    fn set_image_decoded(&mut self, image: &SharedImage);

    /// Restrict recognition to a sub-rectangle of the loaded image.
    fn set_rectangle(&mut self, region: TextBoundary);

    fn set_variable(&mut self, name: &str, value: &str) -> bool;
    fn set_page_seg_mode(&mut self, mode: PageSegMode);
    fn set_input_name(&mut self, name: &str);
    fn set_output_name(&mut self, name: &str);
    fn read_config_file(&mut self, path: &str);

    /// Plain recognized text, or `None` when the engine produced nothing.
    fn utf8_text(&mut self) -> Option<String>;

    /// Full-document recognition producing marked-up output. The engine
    /// calls `monitor` zero or more times, synchronously, from inside this
    /// call, and is expected to poll [`RecognitionMonitor::cancelled`]
    /// periodically; stopping early is best-effort.
    fn hocr_text(&mut self, page: i32, monitor: &RecognitionMonitor) -> Option<String>;

    /// Box-annotated text for one page.
    fn box_text(&mut self, page: i32) -> Option<String>;

    fn mean_confidence(&mut self) -> i32;
    fn word_confidences(&mut self) -> Vec<i32>;

    fn thresholded_image(&mut self) -> Option<SharedImage>;
    fn regions(&mut self) -> Vec<SharedImage>;
    fn textlines(&mut self) -> Vec<SharedImage>;
    fn strips(&mut self) -> Vec<SharedImage>;
    fn words(&mut self) -> Vec<SharedImage>;

    /// Cursor over the most recent recognition result; `None` before any
    /// recognition. Invalidated by the next recognition call.
    fn result_cursor(&mut self) -> Option<Box<dyn ResultCursor + '_>>;

    /// Free recognition results and forget adaptive data.
    fn clear(&mut self);

    /// Release the engine's internal resources. Called exactly once, at
    /// session teardown.
    fn end(&mut self);
}

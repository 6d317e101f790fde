//! Image backing ownership and text-region geometry.
//!
//! A session holds at most one image at a time, in one of two forms: a raw
//! pixel buffer copied out of caller memory, or a decoded image handle
//! shared with the caller. The engine borrows whichever form is loaded and
//! never takes ownership, so the session must keep the resource alive until
//! the next swap, clear, or teardown releases it.

use std::sync::Arc;

/// A raw pixel buffer plus the geometry the engine needs to interpret it.
///
/// The bytes are copied out of the caller's slice at the boundary, which
/// decouples the session from caller-side memory lifetime rules.
#[derive(Debug, Clone)]
pub struct RawImage {
    pub bytes: Vec<u8>,
    pub width: i32,
    pub height: i32,
    pub bits_per_pixel: i32,
    pub bytes_per_line: i32,
}

impl RawImage {
    /// Copy a caller-supplied buffer into an owned backing.
    pub fn from_caller(bytes: &[u8], width: i32, height: i32, bits_per_pixel: i32, bytes_per_line: i32) -> Self {
        Self {
            bytes: bytes.to_vec(),
            width,
            height,
            bits_per_pixel,
            bytes_per_line,
        }
    }
}

/// A decoded image that may still be referenced by the caller.
///
/// Implementations are opaque to the bridge; only the extent is consulted
/// (to reset the text boundary when a decoded image is loaded).
pub trait DecodedImage: Send + Sync {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
}

/// Shared-ownership handle to a decoded image. Cloning increments the
/// reference count; dropping decrements it, and the image is freed when the
/// last reference goes away. The caller may keep its own clone alive past
/// the session.
pub type SharedImage = Arc<dyn DecodedImage>;

/// The image currently loaded into the engine, if any.
///
/// Invariant: exactly one variant is live per session at any time, and
/// [`ImageBacking::replace`] is the only path by which it changes, so the
/// previous resource is always released before a new one is installed.
#[derive(Default)]
pub enum ImageBacking {
    Raw(RawImage),
    Decoded(SharedImage),
    #[default]
    None,
}

impl ImageBacking {
    /// Release the current backing and install `new` in its place.
    ///
    /// Dropping the previous variant is the release: a raw buffer is freed,
    /// a decoded handle gives up its reference (freeing the image only if
    /// this was the last one).
    pub fn replace(&mut self, new: ImageBacking) {
        let _previous = std::mem::replace(self, new);
    }

    pub fn is_none(&self) -> bool {
        matches!(self, ImageBacking::None)
    }
}

impl std::fmt::Debug for ImageBacking {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ImageBacking::Raw(raw) => f.debug_tuple("Raw").field(raw).finish(),
            ImageBacking::Decoded(img) => f
                .debug_struct("Decoded")
                .field("width", &img.width())
                .field("height", &img.height())
                .finish(),
            ImageBacking::None => f.write_str("None"),
        }
    }
}

/// The current text-region rectangle, in absolute pixel coordinates.
///
/// Defaults to a zero extent; set to the full extent of the most recently
/// loaded decoded image, or to a caller-supplied sub-rectangle. Progress
/// callbacks use it to translate relative line coordinates into absolute
/// ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TextBoundary {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl TextBoundary {
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self { x, y, width, height }
    }

    /// The full extent of an image placed at the origin.
    pub fn full_extent(width: i32, height: i32) -> Self {
        Self {
            x: 0,
            y: 0,
            width,
            height,
        }
    }

    /// Absolute edges of this boundary.
    pub fn bounds(&self) -> LineBounds {
        LineBounds {
            left: self.x,
            right: self.x + self.width,
            top: self.y,
            bottom: self.y + self.height,
        }
    }
}

/// Absolute edges of the text line currently being recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LineBounds {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

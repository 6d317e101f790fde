//! Process-wide registry for image resources handed across the boundary.
//!
//! Operations like `thresholded_image_handle` transfer ownership of
//! engine-produced images to the caller. Rather than exposing raw
//! addresses, the images live in a lazily-initialized arena and the caller
//! receives an opaque token; the arena owns the resource until the caller
//! takes or releases it.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use once_cell::sync::Lazy;
use parking_lot::Mutex;

use crate::image::SharedImage;

struct HandleArena<T> {
    next: AtomicU64,
    entries: Mutex<HashMap<u64, T>>,
}

impl<T> HandleArena<T> {
    fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn insert(&self, value: T) -> u64 {
        let id = self.next.fetch_add(1, Ordering::Relaxed);
        self.entries.lock().insert(id, value);
        id
    }

    fn take(&self, id: u64) -> Option<T> {
        self.entries.lock().remove(&id)
    }
}

static IMAGES: Lazy<HandleArena<SharedImage>> = Lazy::new(HandleArena::new);
static IMAGE_SETS: Lazy<HandleArena<Vec<SharedImage>>> = Lazy::new(HandleArena::new);

/// Opaque token for a single image owned by the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageToken(u64);

/// Opaque token for an ordered collection of images owned by the arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageSetToken(u64);

/// Register a single image; ownership moves to the arena.
pub fn register_image(image: SharedImage) -> ImageToken {
    ImageToken(IMAGES.insert(image))
}

/// Take ownership of a registered image. Returns `None` if the token was
/// already taken or released.
pub fn take_image(token: ImageToken) -> Option<SharedImage> {
    IMAGES.take(token.0)
}

/// Release a registered image without taking it.
pub fn release_image(token: ImageToken) {
    if IMAGES.take(token.0).is_none() {
        tracing::debug!(token = token.0, "release of unknown image token");
    }
}

/// Register an image collection; ownership moves to the arena.
pub fn register_image_set(images: Vec<SharedImage>) -> ImageSetToken {
    ImageSetToken(IMAGE_SETS.insert(images))
}

/// Take ownership of a registered image collection.
pub fn take_image_set(token: ImageSetToken) -> Option<Vec<SharedImage>> {
    IMAGE_SETS.take(token.0)
}

/// Release a registered image collection without taking it.
pub fn release_image_set(token: ImageSetToken) {
    if IMAGE_SETS.take(token.0).is_none() {
        tracing::debug!(token = token.0, "release of unknown image-set token");
    }
}

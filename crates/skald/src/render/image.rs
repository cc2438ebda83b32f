//! # Image Cache
//!
//! Sprites and camera backgrounds refer to images by path. The cache turns a
//! path into a stable [`ImageHandle`] on first request and decodes the file
//! on the next [`ImageCache::poll`]. Until then (or forever, if decoding
//! fails) the handle is not ready and the renderer simply skips the blit.
//!
//! Handles are indices into a `Vec`; they never move or get invalidated.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use image::RgbaImage;

/// Stable reference to an image slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ImageHandle(u32);

impl ImageHandle {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
pub enum ImageState {
    /// Requested but not decoded yet.
    Pending,
    Ready(RgbaImage),
    /// Decoding failed; the path is not retried.
    Failed,
}

#[derive(Debug)]
struct Slot {
    path: String,
    state: ImageState,
}

#[derive(Debug)]
pub struct ImageCache {
    root: PathBuf,
    slots: Vec<Slot>,
    by_path: HashMap<String, ImageHandle>,
}

impl ImageCache {
    /// Paths are resolved relative to `root` (absolute paths are used as-is).
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            slots: Vec::new(),
            by_path: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Handle for `path`, allocating a pending slot on first request.
    pub fn request(&mut self, path: &str) -> ImageHandle {
        if let Some(&handle) = self.by_path.get(path) {
            return handle;
        }
        let handle = ImageHandle(self.slots.len() as u32);
        self.slots.push(Slot {
            path: path.to_string(),
            state: ImageState::Pending,
        });
        self.by_path.insert(path.to_string(), handle);
        handle
    }

    /// Handle for `path` if it was requested before.
    pub fn lookup(&self, path: &str) -> Option<ImageHandle> {
        self.by_path.get(path).copied()
    }

    /// Register already-decoded pixels under `path`, replacing any slot state.
    pub fn insert(&mut self, path: &str, image: RgbaImage) -> ImageHandle {
        let handle = self.request(path);
        self.slots[handle.index()].state = ImageState::Ready(image);
        handle
    }

    /// Decode every pending image. Returns how many became ready.
    pub fn poll(&mut self) -> usize {
        let mut loaded = 0;
        for slot in self.slots.iter_mut() {
            if !matches!(slot.state, ImageState::Pending) {
                continue;
            }
            let full = self.root.join(&slot.path);
            slot.state = match image::open(&full) {
                Ok(decoded) => {
                    loaded += 1;
                    log::debug!("loaded image {}", full.display());
                    ImageState::Ready(decoded.to_rgba8())
                }
                Err(err) => {
                    log::warn!("failed to load image {}: {err}", full.display());
                    ImageState::Failed
                }
            };
        }
        loaded
    }

    pub fn state(&self, handle: ImageHandle) -> Option<&ImageState> {
        self.slots.get(handle.index()).map(|s| &s.state)
    }

    pub fn path(&self, handle: ImageHandle) -> Option<&str> {
        self.slots.get(handle.index()).map(|s| s.path.as_str())
    }

    /// Decoded pixels, once ready.
    pub fn get(&self, handle: ImageHandle) -> Option<&RgbaImage> {
        match self.state(handle)? {
            ImageState::Ready(image) => Some(image),
            _ => None,
        }
    }

    pub fn is_ready(&self, handle: ImageHandle) -> bool {
        self.get(handle).is_some()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

impl Default for ImageCache {
    fn default() -> Self {
        Self::new(".")
    }
}

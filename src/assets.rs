//! Texture loading with placeholder slots.
//!
//! Every texture the scene references is a [`TextureSlot`] that starts out
//! holding a single fallback texel. [`AssetLoader::load`] decodes the real
//! image on a background thread; [`AssetLoader::poll`] swaps it in once it
//! arrives. Renderers compare [`TextureSlot::version`] against the version they
//! last uploaded to notice the change, so a frame drawn before the image is
//! ready simply shows the fallback.
//!
//! Failed loads are logged and never retried. The slot keeps its fallback.
//!
//! Images larger than [`MAX_TEXTURE_DIMENSION`] on either side are scaled down
//! to fit while decoding, keeping their aspect ratio.

use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::time::{Duration, Instant};

use image::imageops::FilterType;
use thiserror::Error;

/// Largest texture side the renderer requests from the device.
pub const MAX_TEXTURE_DIMENSION: u32 = 8192;

/// Opaque identifier for a texture slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TextureHandle(pub(crate) usize);

/// Errors raised while reading or decoding a texture.
#[derive(Debug, Error)]
pub enum AssetError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {path}: {source}")]
    Image {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Decoded RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TextureData {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl TextureData {
    /// A 1×1 texture of one color.
    pub fn solid(rgba: [u8; 4]) -> Self {
        Self {
            width: 1,
            height: 1,
            pixels: rgba.to_vec(),
        }
    }
}

/// Decode an encoded image (PNG, JPEG, ...) into RGBA8.
///
/// The result never exceeds [`MAX_TEXTURE_DIMENSION`] on either side.
pub fn texture_from_bytes(bytes: &[u8]) -> Result<TextureData, image::ImageError> {
    let mut decoded = image::load_from_memory(bytes)?;
    if decoded.width() > MAX_TEXTURE_DIMENSION || decoded.height() > MAX_TEXTURE_DIMENSION {
        log::info!(
            "Scaling {}x{} texture down to fit {MAX_TEXTURE_DIMENSION}",
            decoded.width(),
            decoded.height()
        );
        decoded = decoded.resize(MAX_TEXTURE_DIMENSION, MAX_TEXTURE_DIMENSION, FilterType::Triangle);
    }
    let img = decoded.to_rgba8();
    let (width, height) = img.dimensions();
    Ok(TextureData {
        width,
        height,
        pixels: img.into_raw(),
    })
}

fn decode_file(path: &Path) -> Result<TextureData, AssetError> {
    let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    texture_from_bytes(&bytes).map_err(|source| AssetError::Image {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolution state of a texture slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SlotState {
    /// No source was given; the fallback is final.
    Fallback,
    /// A load is in flight.
    Pending,
    Ready,
    /// The load failed; the fallback stays.
    Failed,
}

/// A texture that may not be loaded yet.
#[derive(Debug)]
pub struct TextureSlot {
    label: String,
    state: SlotState,
    data: TextureData,
    version: u64,
}

impl TextureSlot {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn state(&self) -> SlotState {
        self.state
    }

    /// The pixels to draw with right now: decoded data or the fallback.
    pub fn data(&self) -> &TextureData {
        &self.data
    }

    /// Bumped every time [`data`](Self::data) changes.
    pub fn version(&self) -> u64 {
        self.version
    }
}

type LoadResult = (usize, Result<TextureData, AssetError>);

/// Owns all texture slots and the channel background loads report through.
pub struct AssetLoader {
    slots: Vec<TextureSlot>,
    tx: Sender<LoadResult>,
    rx: Receiver<LoadResult>,
    in_flight: usize,
}

impl Default for AssetLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for AssetLoader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AssetLoader")
            .field("slots", &self.slots)
            .field("in_flight", &self.in_flight)
            .finish()
    }
}

impl AssetLoader {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            slots: Vec::new(),
            tx,
            rx,
            in_flight: 0,
        }
    }

    fn push_slot(&mut self, label: String, state: SlotState, fallback: [u8; 4]) -> TextureHandle {
        let handle = TextureHandle(self.slots.len());
        self.slots.push(TextureSlot {
            label,
            state,
            data: TextureData::solid(fallback),
            version: 0,
        });
        handle
    }

    /// A slot that only ever holds `rgba`.
    pub fn fallback(&mut self, label: impl Into<String>, rgba: [u8; 4]) -> TextureHandle {
        self.push_slot(label.into(), SlotState::Fallback, rgba)
    }

    /// Starts decoding `path` in the background.
    ///
    /// The returned slot holds `fallback` until [`poll`](Self::poll) observes
    /// the finished load.
    pub fn load(&mut self, path: impl AsRef<Path>, fallback: [u8; 4]) -> TextureHandle {
        let path = path.as_ref().to_path_buf();
        let handle = self.push_slot(path.display().to_string(), SlotState::Pending, fallback);
        let index = handle.0;
        let tx = self.tx.clone();

        log::info!("Loading texture {}", path.display());
        let spawned = std::thread::Builder::new()
            .name(format!("texture-load-{index}"))
            .spawn(move || {
                // The loader may be gone by the time the decode finishes.
                let _ = tx.send((index, decode_file(&path)));
            });

        match spawned {
            Ok(_) => self.in_flight += 1,
            Err(err) => {
                log::warn!("Could not start texture load for {}: {err}", self.slots[index].label);
                self.slots[index].state = SlotState::Failed;
            }
        }
        handle
    }

    /// Decodes embedded image bytes immediately.
    ///
    /// Decode errors are logged and the slot keeps `fallback`.
    pub fn from_bytes(
        &mut self,
        label: impl Into<String>,
        bytes: &[u8],
        fallback: [u8; 4],
    ) -> TextureHandle {
        let handle = self.push_slot(label.into(), SlotState::Pending, fallback);
        let result = texture_from_bytes(bytes).map_err(|source| AssetError::Image {
            path: PathBuf::from(&self.slots[handle.0].label),
            source,
        });
        self.resolve(handle.0, result);
        handle
    }

    fn resolve(&mut self, index: usize, result: Result<TextureData, AssetError>) {
        let Some(slot) = self.slots.get_mut(index) else {
            return;
        };
        match result {
            Ok(data) => {
                log::info!("Texture {} ready ({}x{})", slot.label, data.width, data.height);
                slot.data = data;
                slot.state = SlotState::Ready;
                slot.version += 1;
            }
            Err(err) => {
                log::warn!("{err}; keeping fallback for {}", slot.label);
                slot.state = SlotState::Failed;
            }
        }
    }

    /// Applies every load that has finished since the last call.
    ///
    /// Never blocks. Returns how many slots were resolved.
    pub fn poll(&mut self) -> usize {
        let mut resolved = 0;
        while let Ok((index, result)) = self.rx.try_recv() {
            self.resolve(index, result);
            self.in_flight = self.in_flight.saturating_sub(1);
            resolved += 1;
        }
        resolved
    }

    /// Blocks until all in-flight loads resolve or `timeout` passes.
    ///
    /// Intended for tools and tests; the render loop only uses [`poll`](Self::poll).
    pub fn wait(&mut self, timeout: Duration) -> usize {
        let deadline = Instant::now() + timeout;
        let mut resolved = self.poll();
        while self.in_flight > 0 {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.rx.recv_timeout(remaining) {
                Ok((index, result)) => {
                    self.resolve(index, result);
                    self.in_flight -= 1;
                    resolved += 1;
                }
                Err(_) => break,
            }
        }
        resolved
    }

    /// Returns true while any background load has not been polled yet.
    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn slot(&self, handle: TextureHandle) -> Option<&TextureSlot> {
        self.slots.get(handle.0)
    }

    pub fn slots(&self) -> impl Iterator<Item = (TextureHandle, &TextureSlot)> {
        self.slots
            .iter()
            .enumerate()
            .map(|(i, slot)| (TextureHandle(i), slot))
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        let img = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));
        let mut bytes = Cursor::new(Vec::new());
        img.write_to(&mut bytes, image::ImageFormat::Png).unwrap();
        bytes.into_inner()
    }

    #[test]
    fn fallback_slot_is_final() {
        let mut assets = AssetLoader::new();
        let handle = assets.fallback("blank", [1, 2, 3, 4]);
        let slot = assets.slot(handle).unwrap();
        assert_eq!(slot.state(), SlotState::Fallback);
        assert_eq!(slot.data(), &TextureData::solid([1, 2, 3, 4]));
        assert_eq!(slot.version(), 0);
        assert!(!assets.is_loading());
    }

    #[test]
    fn decodes_embedded_png() {
        let mut assets = AssetLoader::new();
        let handle = assets.from_bytes("embedded", &png_bytes(2, 3, [10, 20, 30, 255]), [0; 4]);
        let slot = assets.slot(handle).unwrap();
        assert_eq!(slot.state(), SlotState::Ready);
        assert_eq!((slot.data().width, slot.data().height), (2, 3));
        assert_eq!(&slot.data().pixels[..4], &[10, 20, 30, 255]);
        assert_eq!(slot.version(), 1);
    }

    #[test]
    fn bad_bytes_keep_fallback() {
        let mut assets = AssetLoader::new();
        let handle = assets.from_bytes("garbage", b"not an image", [9, 9, 9, 9]);
        let slot = assets.slot(handle).unwrap();
        assert_eq!(slot.state(), SlotState::Failed);
        assert_eq!(slot.data(), &TextureData::solid([9, 9, 9, 9]));
        assert_eq!(slot.version(), 0);
    }

    #[test]
    fn missing_file_fails_without_retry() {
        let mut assets = AssetLoader::new();
        let handle = assets.load("definitely/not/here.png", [40, 90, 160, 255]);
        assert_eq!(assets.slot(handle).unwrap().state(), SlotState::Pending);

        assert_eq!(assets.wait(Duration::from_secs(5)), 1);
        let slot = assets.slot(handle).unwrap();
        assert_eq!(slot.state(), SlotState::Failed);
        assert_eq!(slot.data(), &TextureData::solid([40, 90, 160, 255]));
        assert!(!assets.is_loading());
        assert_eq!(assets.poll(), 0);
    }

    #[test]
    fn loads_file_in_background() {
        let path = std::env::temp_dir().join(format!("globe-assets-{}.png", std::process::id()));
        std::fs::write(&path, png_bytes(4, 4, [0, 255, 0, 255])).unwrap();

        let mut assets = AssetLoader::new();
        let handle = assets.load(&path, [0; 4]);
        assets.wait(Duration::from_secs(5));
        let _ = std::fs::remove_file(&path);

        let slot = assets.slot(handle).unwrap();
        assert_eq!(slot.state(), SlotState::Ready);
        assert_eq!(slot.data().width, 4);
        assert_eq!(slot.version(), 1);
    }

    #[test]
    fn oversized_image_is_scaled_to_device_limit() {
        let mut assets = AssetLoader::new();
        let wide = png_bytes(MAX_TEXTURE_DIMENSION + 1, 1, [200, 100, 50, 255]);
        let handle = assets.from_bytes("wide", &wide, [0; 4]);

        let slot = assets.slot(handle).unwrap();
        let data = slot.data();
        assert_eq!(slot.state(), SlotState::Ready);
        assert!(data.width <= MAX_TEXTURE_DIMENSION);
        assert!(data.height <= MAX_TEXTURE_DIMENSION);
        assert_eq!((data.width, data.height), (MAX_TEXTURE_DIMENSION, 1));
        assert_eq!(data.pixels.len(), (data.width * data.height * 4) as usize);
    }

    #[test]
    fn tall_image_keeps_aspect_when_scaled() {
        let tall = png_bytes(2, MAX_TEXTURE_DIMENSION * 2, [1, 2, 3, 255]);
        let data = texture_from_bytes(&tall).unwrap();
        assert_eq!((data.width, data.height), (1, MAX_TEXTURE_DIMENSION));
    }
}

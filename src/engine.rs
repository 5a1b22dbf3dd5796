//! Animation engine: owns the uploaded frames and the playback position.

use std::fs;
use std::path::Path;

use image::ImageFormat;
use tracing::{debug, info};

use crate::animation::{
    decode, decode_with_hint, AnimatedImage, DecodedAnimation, Frame, PlaybackState,
};
use crate::error::LoadError;
use crate::texture::{TextureBackend, TextureHandle};

/// Holds at most one [`AnimatedImage`] and the index of the frame on
/// screen. Loading replaces the image wholesale; a failed load leaves the
/// current image untouched.
pub struct AnimationEngine<B: TextureBackend> {
    backend: B,
    current: Option<AnimatedImage>,
    playback: PlaybackState,
}

impl<B: TextureBackend> AnimationEngine<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            current: None,
            playback: PlaybackState::default(),
        }
    }

    /// Read, decode and upload the image at `path`. The extension picks the
    /// decoder when the contents carry no signature.
    pub fn load_animation(&mut self, path: &Path) -> Result<&AnimatedImage, LoadError> {
        let bytes = fs::read(path).map_err(|source| LoadError::FileRead {
            path: path.to_path_buf(),
            source,
        })?;
        let decoded = decode_with_hint(&bytes, ImageFormat::from_path(path).ok())?;
        let image = self.install(&decoded)?;
        info!(
            "loaded {} ({}x{}, {} frames, {:?} per frame)",
            path.display(),
            image.width(),
            image.height(),
            image.frame_count(),
            image.delay()
        );
        Ok(image)
    }

    pub fn load_bytes(&mut self, bytes: &[u8]) -> Result<&AnimatedImage, LoadError> {
        self.install(&decode(bytes)?)
    }

    /// Upload `decoded` and make it current, releasing the previous set.
    fn install(&mut self, decoded: &DecodedAnimation) -> Result<&AnimatedImage, LoadError> {
        let frames = self.upload(decoded)?;
        let next = AnimatedImage {
            frames,
            width: decoded.width,
            height: decoded.height,
            layout: decoded.layout,
        };

        if let Some(previous) = self.current.take() {
            self.backend.release(&previous.textures());
        }
        self.playback.reset();
        Ok(self.current.insert(next))
    }

    /// Upload every frame, releasing the ones already uploaded if any
    /// upload fails.
    fn upload(&mut self, decoded: &DecodedAnimation) -> Result<Vec<Frame>, LoadError> {
        let mut frames = Vec::with_capacity(decoded.frame_count());
        for index in 0..decoded.frame_count() {
            let Some(pixels) = decoded.frame(index) else {
                break;
            };
            match self.backend.upload(&pixels) {
                Ok(texture) => frames.push(Frame {
                    texture,
                    delay: decoded.delay,
                }),
                Err(err) => {
                    let uploaded: Vec<TextureHandle> =
                        frames.iter().map(|frame| frame.texture).collect();
                    self.backend.release(&uploaded);
                    debug!("released {} partially uploaded frames", uploaded.len());
                    return Err(err);
                }
            }
        }
        if frames.is_empty() {
            return Err(LoadError::NoFrames);
        }
        Ok(frames)
    }

    /// Advance to the next frame and return its index. Stays at 0 while
    /// nothing is loaded.
    pub fn tick(&mut self) -> usize {
        let frame_count = self.frame_count();
        self.playback.advance(frame_count)
    }

    pub fn current_texture(&self) -> Option<TextureHandle> {
        self.current
            .as_ref()
            .and_then(|image| image.frames.get(self.playback.index()))
            .map(|frame| frame.texture)
    }

    #[cfg(test)]
    pub fn frame_index(&self) -> usize {
        self.playback.index()
    }

    pub fn frame_count(&self) -> usize {
        self.current.as_ref().map_or(0, AnimatedImage::frame_count)
    }

    #[cfg(test)]
    pub fn animation(&self) -> Option<&AnimatedImage> {
        self.current.as_ref()
    }

    #[cfg(test)]
    pub fn is_loaded(&self) -> bool {
        self.current.is_some()
    }

    /// Release the current texture set and go back to idle.
    pub fn unload(&mut self) {
        if let Some(image) = self.current.take() {
            self.backend.release(&image.textures());
        }
        self.playback.reset();
    }

    #[cfg(test)]
    pub fn backend(&self) -> &B {
        &self.backend
    }
}

impl<B: TextureBackend> Drop for AnimationEngine<B> {
    fn drop(&mut self) {
        self.unload();
    }
}

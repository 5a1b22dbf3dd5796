//! GPU texture seam used by the animation engine.

use crate::animation::ChannelLayout;
use crate::error::LoadError;

/// Opaque reference to a texture living on the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TextureHandle(u32);

impl TextureHandle {
    pub fn new(name: u32) -> Self {
        Self(name)
    }

    /// The backend's name for the texture (a GL texture name on Windows).
    pub fn raw(self) -> u32 {
        self.0
    }
}

/// Tightly packed 8-bit pixel rows for one frame, bottom row first.
#[derive(Debug, Clone, Copy)]
pub struct PixelFrame<'a> {
    pub width: u32,
    pub height: u32,
    pub layout: ChannelLayout,
    pub pixels: &'a [u8],
}

/// Allocates and frees textures. Implementations may require a graphics
/// context to be current on the calling thread.
pub trait TextureBackend {
    fn upload(&mut self, frame: &PixelFrame<'_>) -> Result<TextureHandle, LoadError>;

    fn release(&mut self, textures: &[TextureHandle]);
}

#[cfg(test)]
pub(crate) mod fake {
    use std::collections::BTreeSet;

    use super::*;

    /// In-memory backend that tracks live textures and keeps a copy of
    /// every upload.
    #[derive(Debug, Default)]
    pub struct FakeTextures {
        next_name: u32,
        pub live: BTreeSet<TextureHandle>,
        pub uploads: Vec<(TextureHandle, ChannelLayout, Vec<u8>)>,
        /// Fail the upload once this many uploads have succeeded.
        pub fail_after: Option<usize>,
    }

    impl FakeTextures {
        pub fn failing_after(successful_uploads: usize) -> Self {
            Self {
                fail_after: Some(successful_uploads),
                ..Self::default()
            }
        }

        pub fn pixels(&self, handle: TextureHandle) -> Option<&[u8]> {
            self.uploads
                .iter()
                .find(|(h, _, _)| *h == handle)
                .map(|(_, _, pixels)| pixels.as_slice())
        }
    }

    impl TextureBackend for FakeTextures {
        fn upload(&mut self, frame: &PixelFrame<'_>) -> Result<TextureHandle, LoadError> {
            if let Some(remaining) = self.fail_after.as_mut() {
                if *remaining == 0 {
                    return Err(LoadError::texture_allocation("out of texture memory"));
                }
                *remaining -= 1;
            }
            self.next_name += 1;
            let handle = TextureHandle::new(self.next_name);
            self.live.insert(handle);
            self.uploads
                .push((handle, frame.layout, frame.pixels.to_vec()));
            Ok(handle)
        }

        fn release(&mut self, textures: &[TextureHandle]) {
            for texture in textures {
                assert!(self.live.remove(texture), "double release of {texture:?}");
            }
        }
    }
}

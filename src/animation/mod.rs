//! Animated image model and playback position.

mod decode;

use std::time::Duration;

pub use decode::{decode, decode_with_hint, DecodedAnimation, DEFAULT_FRAME_DELAY};
#[cfg(test)]
pub(crate) use decode::fixtures;

use crate::error::LoadError;
use crate::texture::TextureHandle;

/// Pixel layout of uploaded frames.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelLayout {
    Luma,
    Rgb,
    Rgba,
}

impl ChannelLayout {
    pub fn from_channel_count(channels: u8) -> Result<Self, LoadError> {
        match channels {
            1 => Ok(ChannelLayout::Luma),
            3 => Ok(ChannelLayout::Rgb),
            4 => Ok(ChannelLayout::Rgba),
            other => Err(LoadError::UnsupportedChannelLayout(other)),
        }
    }

    pub fn channels(self) -> usize {
        match self {
            ChannelLayout::Luma => 1,
            ChannelLayout::Rgb => 3,
            ChannelLayout::Rgba => 4,
        }
    }
}

/// One uploaded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub texture: TextureHandle,
    pub delay: Duration,
}

/// A decoded image whose frames live on the GPU.
#[derive(Debug)]
pub struct AnimatedImage {
    pub(crate) frames: Vec<Frame>,
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) layout: ChannelLayout,
}

impl AnimatedImage {
    #[cfg(test)]
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Shared frame delay. Every frame carries the first frame's delay.
    pub fn delay(&self) -> Duration {
        self.frames
            .first()
            .map(|frame| frame.delay)
            .unwrap_or(DEFAULT_FRAME_DELAY)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[cfg(test)]
    pub fn layout(&self) -> ChannelLayout {
        self.layout
    }

    pub(crate) fn textures(&self) -> Vec<TextureHandle> {
        self.frames.iter().map(|frame| frame.texture).collect()
    }
}

/// Index of the frame currently on screen.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PlaybackState {
    index: usize,
}

impl PlaybackState {
    pub fn index(&self) -> usize {
        self.index
    }

    /// Step to the next frame, wrapping at `frame_count`.
    pub fn advance(&mut self, frame_count: usize) -> usize {
        self.index = if frame_count == 0 {
            0
        } else {
            (self.index + 1) % frame_count
        };
        self.index
    }

    pub fn reset(&mut self) {
        self.index = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_counts_map_to_layouts() {
        assert_eq!(ChannelLayout::from_channel_count(1).unwrap(), ChannelLayout::Luma);
        assert_eq!(ChannelLayout::from_channel_count(3).unwrap(), ChannelLayout::Rgb);
        assert_eq!(ChannelLayout::from_channel_count(4).unwrap(), ChannelLayout::Rgba);
        for channels in [0, 2, 5] {
            assert!(matches!(
                ChannelLayout::from_channel_count(channels),
                Err(LoadError::UnsupportedChannelLayout(c)) if c == channels
            ));
        }
    }

    #[test]
    fn advance_wraps_after_frame_count_steps() {
        let mut state = PlaybackState::default();
        let seen: Vec<usize> = (0..7).map(|_| state.advance(3)).collect();
        assert_eq!(seen, vec![1, 2, 0, 1, 2, 0, 1]);
    }

    #[test]
    fn advance_without_frames_stays_at_zero() {
        let mut state = PlaybackState::default();
        assert_eq!(state.advance(0), 0);
        assert_eq!(state.index(), 0);
    }
}

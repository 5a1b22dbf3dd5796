//! Errors reported by the animation engine.

use std::io;
use std::path::PathBuf;

/// Reasons a wallpaper load can fail. A failed load never disturbs the
/// animation that is already playing.
#[derive(thiserror::Error, Debug)]
pub enum LoadError {
    #[error("failed to read {}: {source}", path.display())]
    FileRead {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("image contains no frames")]
    NoFrames,

    /// Only 1, 3 and 4 channel images can be uploaded.
    #[error("unsupported channel layout: {0} channels")]
    UnsupportedChannelLayout(u8),

    #[error("texture allocation failed: {0}")]
    TextureAllocation(String),
}

impl LoadError {
    pub fn texture_allocation(msg: impl Into<String>) -> Self {
        LoadError::TextureAllocation(msg.into())
    }
}

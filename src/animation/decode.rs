//! Turns file bytes into tightly packed, bottom-up frame pixels.

use std::io::Cursor;
use std::time::Duration;

use image::codecs::gif::GifDecoder;
use image::codecs::webp::WebPDecoder;
use image::imageops::flip_vertical;
use image::{AnimationDecoder, DynamicImage, Frames, ImageFormat};

use super::ChannelLayout;
use crate::error::LoadError;
use crate::texture::PixelFrame;

/// Used for static images and for animations whose first frame has no delay.
pub const DEFAULT_FRAME_DELAY: Duration = Duration::from_millis(100);

/// CPU-side result of decoding, ready for upload.
#[derive(Debug, Clone)]
pub struct DecodedAnimation {
    pub width: u32,
    pub height: u32,
    pub layout: ChannelLayout,
    pub frames: Vec<Vec<u8>>,
    pub delay: Duration,
}

impl DecodedAnimation {
    pub fn frame(&self, index: usize) -> Option<PixelFrame<'_>> {
        self.frames.get(index).map(|pixels| PixelFrame {
            width: self.width,
            height: self.height,
            layout: self.layout,
            pixels,
        })
    }

    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }
}

/// Decode an image file's bytes. GIF and animated WebP yield every frame
/// as RGBA; everything else is a single frame in its own channel layout.
pub fn decode(bytes: &[u8]) -> Result<DecodedAnimation, LoadError> {
    decode_with_hint(bytes, None)
}

/// Like [`decode`], falling back to `hint` (usually taken from the file
/// extension) for formats without a recognisable signature, such as TGA.
pub fn decode_with_hint(
    bytes: &[u8],
    hint: Option<ImageFormat>,
) -> Result<DecodedAnimation, LoadError> {
    let format = match (image::guess_format(bytes), hint) {
        (Ok(format), _) => format,
        (Err(_), Some(format)) => format,
        (Err(err), None) => return Err(err.into()),
    };
    match format {
        ImageFormat::Gif => {
            let decoder = GifDecoder::new(Cursor::new(bytes))?;
            decode_frames(decoder.into_frames())
        }
        ImageFormat::WebP => {
            let decoder = WebPDecoder::new(Cursor::new(bytes))?;
            if decoder.has_animation() {
                decode_frames(decoder.into_frames())
            } else {
                decode_still(image::load_from_memory_with_format(bytes, format)?)
            }
        }
        _ => decode_still(image::load_from_memory_with_format(bytes, format)?),
    }
}

fn decode_frames(frames: Frames<'_>) -> Result<DecodedAnimation, LoadError> {
    let frames = frames.collect_frames()?;
    let first = frames.first().ok_or(LoadError::NoFrames)?;
    let (width, height) = first.buffer().dimensions();
    let delay = effective_delay(Duration::from(first.delay()));

    let frames = frames
        .iter()
        .map(|frame| flip_vertical(frame.buffer()).into_raw())
        .collect();

    Ok(DecodedAnimation {
        width,
        height,
        layout: ChannelLayout::Rgba,
        frames,
        delay,
    })
}

fn decode_still(img: DynamicImage) -> Result<DecodedAnimation, LoadError> {
    let layout = ChannelLayout::from_channel_count(img.color().channel_count())?;
    let (width, height) = (img.width(), img.height());
    // Higher bit depths are narrowed to 8 bits per channel.
    let pixels = match layout {
        ChannelLayout::Luma => flip_vertical(&img.to_luma8()).into_raw(),
        ChannelLayout::Rgb => flip_vertical(&img.to_rgb8()).into_raw(),
        ChannelLayout::Rgba => flip_vertical(&img.to_rgba8()).into_raw(),
    };

    Ok(DecodedAnimation {
        width,
        height,
        layout,
        frames: vec![pixels],
        delay: DEFAULT_FRAME_DELAY,
    })
}

fn effective_delay(delay: Duration) -> Duration {
    if delay.is_zero() {
        DEFAULT_FRAME_DELAY
    } else {
        delay
    }
}


#[cfg(test)]
mod tests {
    use image::{DynamicImage, GrayImage, ImageBuffer, LumaA, Rgb, RgbImage, Rgba, RgbaImage};

    use super::fixtures::{encoded, gif, png, solid};
    use super::*;

    /// 2x2 animated WebP: a red frame for 80 ms, then a blue one for 160 ms.
    const TWO_FRAME_WEBP: &[u8] = include_bytes!("testdata/two_frames.webp");

    fn two_tone(top: [u8; 4], bottom: [u8; 4]) -> RgbaImage {
        RgbaImage::from_fn(2, 2, |_, y| if y == 0 { Rgba(top) } else { Rgba(bottom) })
    }

    #[test]
    fn gif_frames_round_trip_with_vertical_flip() {
        let first = two_tone([255, 0, 0, 255], [0, 0, 255, 255]);
        let second = two_tone([0, 255, 0, 255], [255, 255, 255, 255]);
        let bytes = gif(&[first.clone(), second.clone()], 80);

        let decoded = decode(&bytes).unwrap();
        assert_eq!(decoded.frame_count(), 2);
        assert_eq!((decoded.width, decoded.height), (2, 2));
        assert_eq!(decoded.layout, ChannelLayout::Rgba);
        assert_eq!(decoded.delay, Duration::from_millis(80));
        assert_eq!(decoded.frames[0], flip_vertical(&first).into_raw());
        assert_eq!(decoded.frames[1], flip_vertical(&second).into_raw());
    }

    #[test]
    fn bottom_row_comes_first() {
        let bytes = gif(&[two_tone([255, 0, 0, 255], [0, 0, 255, 255])], 100);
        let decoded = decode(&bytes).unwrap();
        assert_eq!(&decoded.frames[0][..4], &[0, 0, 255, 255]);
    }

    #[test]
    fn zero_gif_delay_falls_back_to_default() {
        let bytes = gif(&[solid(1, 1, [9, 9, 9, 255])], 0);
        assert_eq!(decode(&bytes).unwrap().delay, DEFAULT_FRAME_DELAY);
    }

    #[test]
    fn static_rgb_png_keeps_three_channels() {
        let img = RgbImage::from_pixel(3, 2, Rgb([1, 2, 3]));
        let decoded = decode(&png(&DynamicImage::ImageRgb8(img))).unwrap();
        assert_eq!(decoded.layout, ChannelLayout::Rgb);
        assert_eq!(decoded.frame_count(), 1);
        assert_eq!(decoded.frames[0].len(), 3 * 2 * 3);
        assert_eq!(decoded.delay, DEFAULT_FRAME_DELAY);
    }

    #[test]
    fn static_gray_png_is_single_channel() {
        let img = GrayImage::from_pixel(4, 4, image::Luma([128]));
        let decoded = decode(&png(&DynamicImage::ImageLuma8(img))).unwrap();
        assert_eq!(decoded.layout, ChannelLayout::Luma);
        assert_eq!(decoded.frames[0], vec![128; 16]);
    }

    #[test]
    fn sixteen_bit_png_is_narrowed() {
        let img: ImageBuffer<Rgba<u16>, Vec<u16>> =
            ImageBuffer::from_pixel(1, 1, Rgba([65535, 0, 65535, 65535]));
        let decoded = decode(&png(&DynamicImage::ImageRgba16(img))).unwrap();
        assert_eq!(decoded.layout, ChannelLayout::Rgba);
        assert_eq!(decoded.frames[0], vec![255, 0, 255, 255]);
    }

    #[test]
    fn two_channel_png_is_rejected() {
        let img: ImageBuffer<LumaA<u8>, Vec<u8>> = ImageBuffer::from_pixel(2, 2, LumaA([10, 200]));
        let err = decode(&png(&DynamicImage::ImageLumaA8(img))).unwrap_err();
        assert!(matches!(err, LoadError::UnsupportedChannelLayout(2)));
    }

    #[test]
    fn garbage_is_a_decode_error() {
        let err = decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, LoadError::Decode(_)));
    }

    #[test]
    fn truncated_gif_is_a_decode_error() {
        let bytes = gif(&[solid(8, 8, [1, 2, 3, 255])], 50);
        let err = decode(&bytes[..bytes.len() / 2]).unwrap_err();
        assert!(matches!(err, LoadError::Decode(_) | LoadError::NoFrames));
    }

    #[test]
    fn animated_webp_decodes_every_frame_as_rgba() {
        let decoded = decode(TWO_FRAME_WEBP).unwrap();
        assert_eq!(decoded.frame_count(), 2);
        assert_eq!((decoded.width, decoded.height), (2, 2));
        assert_eq!(decoded.layout, ChannelLayout::Rgba);
        assert_eq!(decoded.delay, Duration::from_millis(80));
        assert_eq!(decoded.frames[0], [255, 0, 0, 255].repeat(4));
        assert_eq!(decoded.frames[1], [0, 0, 255, 255].repeat(4));
    }

    #[test]
    fn static_webp_is_a_single_still() {
        let img = two_tone([255, 0, 0, 255], [0, 0, 255, 255]);
        let decoded = decode(&encoded(&DynamicImage::ImageRgba8(img), ImageFormat::WebP)).unwrap();
        assert_eq!(decoded.frame_count(), 1);
        assert_eq!(decoded.layout, ChannelLayout::Rgba);
        assert_eq!(decoded.delay, DEFAULT_FRAME_DELAY);
        assert_eq!(&decoded.frames[0][..4], &[0, 0, 255, 255]);
    }

    #[test]
    fn tga_needs_the_format_hint() {
        let img = two_tone([255, 0, 0, 255], [0, 0, 255, 255]);
        let bytes = encoded(&DynamicImage::ImageRgba8(img), ImageFormat::Tga);

        assert!(matches!(decode(&bytes).unwrap_err(), LoadError::Decode(_)));

        let decoded = decode_with_hint(&bytes, Some(ImageFormat::Tga)).unwrap();
        assert_eq!(decoded.frame_count(), 1);
        assert_eq!(decoded.layout, ChannelLayout::Rgba);
        assert_eq!(&decoded.frames[0][..4], &[0, 0, 255, 255]);
    }

    #[test]
    fn hint_does_not_override_a_recognised_signature() {
        let bytes = gif(&[solid(1, 1, [9, 9, 9, 255])], 30);
        let decoded = decode_with_hint(&bytes, Some(ImageFormat::Png)).unwrap();
        assert_eq!(decoded.delay, Duration::from_millis(30));
    }
}

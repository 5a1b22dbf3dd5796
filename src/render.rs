//! Wallpaper quad geometry and the renderer seam.

use crate::texture::TextureHandle;

/// Background shown behind transparent pixels and while nothing is loaded.
pub const CLEAR_COLOR: [f32; 4] = [0.0, 0.5, 0.5, 1.0];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuadVertex {
    pub uv: [f32; 2],
    pub position: [f32; 2],
}

const fn vertex(u: f32, v: f32, x: f32, y: f32) -> QuadVertex {
    QuadVertex {
        uv: [u, v],
        position: [x, y],
    }
}

/// Two side-by-side quads in clip space, each mapping the whole texture.
/// Counter-clockwise from the bottom-left corner.
pub const WALLPAPER_QUADS: [[QuadVertex; 4]; 2] = [
    [
        vertex(0.0, 0.0, -1.0, -1.0),
        vertex(1.0, 0.0, 0.0, -1.0),
        vertex(1.0, 1.0, 0.0, 1.0),
        vertex(0.0, 1.0, -1.0, 1.0),
    ],
    [
        vertex(0.0, 0.0, 0.0, -1.0),
        vertex(1.0, 0.0, 1.0, -1.0),
        vertex(1.0, 1.0, 1.0, 1.0),
        vertex(0.0, 1.0, 0.0, 1.0),
    ],
];

/// Draws one frame and presents it. Failures of the underlying graphics
/// calls are not reported.
pub trait Renderer {
    fn render(&mut self, texture: Option<TextureHandle>);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quads_cover_clip_space_without_overlap() {
        let [left, right] = WALLPAPER_QUADS;
        let xs = |quad: &[QuadVertex; 4]| {
            let min = quad.iter().map(|v| v.position[0]).fold(f32::MAX, f32::min);
            let max = quad.iter().map(|v| v.position[0]).fold(f32::MIN, f32::max);
            (min, max)
        };
        assert_eq!(xs(&left), (-1.0, 0.0));
        assert_eq!(xs(&right), (0.0, 1.0));
        for quad in WALLPAPER_QUADS {
            let ys: Vec<f32> = quad.iter().map(|v| v.position[1]).collect();
            assert!(ys.contains(&-1.0) && ys.contains(&1.0));
        }
    }

    #[test]
    fn every_quad_maps_the_full_texture() {
        for quad in WALLPAPER_QUADS {
            let uvs: Vec<[f32; 2]> = quad.iter().map(|v| v.uv).collect();
            assert_eq!(uvs, vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]]);
        }
    }
}

//! Desktop integration: monitor extent, the behind-icons window layer, and
//! the OpenGL wallpaper window.

#[cfg(windows)]
mod gl;
#[cfg(windows)]
mod shell;
#[cfg(windows)]
mod window;

#[cfg(windows)]
pub use shell::display_bounds;
#[cfg(windows)]
pub use window::{SharedWallpaper, Wallpaper};

/// Screen rectangle in desktop pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Grow to reach the far corner of `monitor`. The origin stays put, so
    /// monitors left of or above the primary one do not widen the result.
    pub fn extend_to(&mut self, monitor: &Rect) {
        self.right = self.right.max(monitor.right);
        self.bottom = self.bottom.max(monitor.bottom);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rect(left: i32, top: i32, right: i32, bottom: i32) -> Rect {
        Rect {
            left,
            top,
            right,
            bottom,
        }
    }

    #[test]
    fn extent_takes_max_right_and_bottom() {
        let mut bounds = Rect::default();
        bounds.extend_to(&rect(0, 0, 1920, 1080));
        bounds.extend_to(&rect(1920, -200, 3360, 1240));
        assert_eq!(bounds, rect(0, 0, 3360, 1240));
        assert_eq!((bounds.width(), bounds.height()), (3360, 1240));
    }

    #[test]
    fn monitors_left_of_primary_do_not_grow_extent() {
        let mut bounds = Rect::default();
        bounds.extend_to(&rect(-1280, 0, 0, 1024));
        bounds.extend_to(&rect(0, 0, 1920, 1080));
        assert_eq!(bounds, rect(0, 0, 1920, 1080));
    }
}

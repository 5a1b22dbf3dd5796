//! The wallpaper window and the message procedure that drives playback.

use std::cell::RefCell;
use std::path::Path;
use std::rc::{Rc, Weak};
use std::time::Duration;

use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{HINSTANCE, HWND, LPARAM, LRESULT, WPARAM};
use windows::Win32::Graphics::Gdi::{
    BeginPaint, EndPaint, GetStockObject, InvalidateRect, UpdateWindow, BLACK_BRUSH, HBRUSH,
    PAINTSTRUCT,
};
use windows::Win32::System::LibraryLoader::GetModuleHandleW;
use windows::Win32::UI::WindowsAndMessaging::{
    CreateWindowExW, DefWindowProcW, DestroyWindow, KillTimer, LoadCursorW, RegisterClassW,
    SetParent, SetTimer, SetWindowPos, ShowWindow, CS_OWNDC, HWND_BOTTOM, IDC_ARROW,
    SWP_NOACTIVATE, SWP_NOMOVE, SWP_NOSIZE, SW_SHOWNOACTIVATE, WM_DESTROY, WM_ERASEBKGND,
    WM_PAINT, WM_SIZE, WM_TIMER, WNDCLASSW, WS_EX_TOOLWINDOW, WS_POPUP,
};

use super::gl::{GlContext, GlRenderer, GlTextures};
use super::{shell, Rect};
use crate::engine::AnimationEngine;
use crate::error::LoadError;
use crate::render::Renderer;
use crate::scheduler::{FrameScheduler, FrameTimer};

const CLASS_NAME: PCWSTR = w!("GifWallpaperBackground");
const FRAME_TIMER_ID: usize = 1;
/// `SetTimer` clamps shorter periods to this anyway.
const MIN_TIMER_MS: u32 = 10;

pub type SharedWallpaper = Rc<RefCell<Wallpaper>>;

thread_local! {
    /// The wallpaper whose window lives on this thread, for the message
    /// procedure.
    static ACTIVE: RefCell<Weak<RefCell<Wallpaper>>> = RefCell::new(Weak::new());
}

/// OS timer posting `WM_TIMER` to the wallpaper window.
struct WindowTimer {
    hwnd: HWND,
}

impl FrameTimer for WindowTimer {
    fn arm(&mut self, period: Duration) {
        let ms = u32::try_from(period.as_millis())
            .unwrap_or(u32::MAX)
            .max(MIN_TIMER_MS);
        if unsafe { SetTimer(self.hwnd, FRAME_TIMER_ID, ms, None) } == 0 {
            warn!("SetTimer({ms} ms) failed; animation will not advance");
        }
    }

    fn disarm(&mut self) {
        let _ = unsafe { KillTimer(self.hwnd, FRAME_TIMER_ID) };
    }
}

/// Owns the window handle; destroyed after the GL context is gone.
struct OwnedWindow(HWND);

impl Drop for OwnedWindow {
    fn drop(&mut self) {
        let _ = unsafe { DestroyWindow(self.0) };
    }
}

/// Background window playing an animation behind the desktop icons.
// Field order is teardown order: textures, timer, then context, then window.
pub struct Wallpaper {
    engine: AnimationEngine<GlTextures>,
    scheduler: FrameScheduler<WindowTimer>,
    renderer: GlRenderer,
    gl: GlContext,
    window: OwnedWindow,
}

impl Wallpaper {
    /// Create the window over `bounds`, move it behind the desktop icons
    /// and set up OpenGL. Playback starts with the first successful load.
    pub fn create(bounds: Rect) -> Result<SharedWallpaper> {
        let window = OwnedWindow(create_window(bounds)?);
        let hwnd = window.0;

        match shell::find_behind_icons_host() {
            Some(host) => {
                if !place_behind_icons(hwnd, host) {
                    warn!("could not move the wallpaper window behind the desktop icons");
                }
            }
            None => warn!("desktop icon layer not found; wallpaper window stays top-level"),
        }
        unsafe {
            let _ = ShowWindow(hwnd, SW_SHOWNOACTIVATE);
            let _ = UpdateWindow(hwnd);
        }

        let gl = GlContext::create(hwnd)?;
        gl.resize(bounds.width(), bounds.height());
        let wallpaper = Wallpaper {
            engine: AnimationEngine::new(GlTextures::new()),
            scheduler: FrameScheduler::new(WindowTimer { hwnd }),
            renderer: GlRenderer::new(gl.hdc()),
            gl,
            window,
        };
        info!(
            "wallpaper window ready ({}x{})",
            bounds.width(),
            bounds.height()
        );

        let shared = Rc::new(RefCell::new(wallpaper));
        ACTIVE.with(|active| *active.borrow_mut() = Rc::downgrade(&shared));
        Ok(shared)
    }

    /// Replace the playing animation with the image at `path`. On failure
    /// the current animation keeps playing.
    pub fn load(&mut self, path: &Path) -> Result<(), LoadError> {
        self.gl.make_current();
        let delay = self.engine.load_animation(path)?.delay();
        self.scheduler.on_loaded(delay);
        self.request_repaint();
        Ok(())
    }

    pub fn frame_count(&self) -> usize {
        self.engine.frame_count()
    }

    fn on_tick(&mut self) {
        if self.scheduler.on_tick(&mut self.engine).is_some() {
            self.request_repaint();
        }
    }

    fn paint(&mut self) {
        self.gl.make_current();
        self.renderer.render(self.engine.current_texture());
    }

    fn request_repaint(&self) {
        unsafe {
            let _ = InvalidateRect(self.window.0, None, false);
        }
    }
}

impl Drop for Wallpaper {
    fn drop(&mut self) {
        self.scheduler.stop();
        self.gl.make_current();
        self.engine.unload();
    }
}

fn create_window(bounds: Rect) -> Result<HWND> {
    let hinstance: HINSTANCE = unsafe { GetModuleHandleW(None) }
        .context("GetModuleHandleW failed")?
        .into();

    let class = WNDCLASSW {
        style: CS_OWNDC,
        lpfnWndProc: Some(wallpaper_proc),
        hInstance: hinstance,
        hCursor: unsafe { LoadCursorW(None, IDC_ARROW) }.unwrap_or_default(),
        hbrBackground: HBRUSH(unsafe { GetStockObject(BLACK_BRUSH) }.0),
        lpszClassName: CLASS_NAME,
        ..Default::default()
    };
    if unsafe { RegisterClassW(&class) } == 0 {
        bail!("RegisterClassW failed for the wallpaper window");
    }

    let hwnd = unsafe {
        CreateWindowExW(
            WS_EX_TOOLWINDOW,
            CLASS_NAME,
            w!("Behind Desktop Icons"),
            WS_POPUP,
            bounds.left,
            bounds.top,
            bounds.width(),
            bounds.height(),
            None,
            None,
            hinstance,
            None,
        )
    };
    if hwnd.0 == 0 {
        bail!("CreateWindowExW failed for the wallpaper window");
    }
    Ok(hwnd)
}

/// Reparent `hwnd` under the icon host and put it at the bottom of the
/// z-order. Returns false if the window could not be lowered.
fn place_behind_icons(hwnd: HWND, host: HWND) -> bool {
    unsafe {
        let _ = SetParent(hwnd, host);
        SetWindowPos(
            hwnd,
            HWND_BOTTOM,
            0,
            0,
            0,
            0,
            SWP_NOMOVE | SWP_NOSIZE | SWP_NOACTIVATE,
        )
        .is_ok()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Dispatch {
    Handled,
    /// The host has been dropped.
    Gone,
    /// The host is borrowed further up the stack.
    Busy,
}

fn dispatch<T>(host: &Weak<RefCell<T>>, f: impl FnOnce(&mut T)) -> Dispatch {
    let Some(shared) = host.upgrade() else {
        return Dispatch::Gone;
    };
    match shared.try_borrow_mut() {
        Ok(mut host) => {
            f(&mut *host);
            Dispatch::Handled
        }
        Err(_) => Dispatch::Busy,
    }
}

fn with_active(f: impl FnOnce(&mut Wallpaper)) -> Dispatch {
    let host = ACTIVE.with(|active| active.borrow().clone());
    dispatch(&host, f)
}

unsafe extern "system" fn wallpaper_proc(
    hwnd: HWND,
    msg: u32,
    wparam: WPARAM,
    lparam: LPARAM,
) -> LRESULT {
    match msg {
        WM_TIMER if wparam.0 == FRAME_TIMER_ID => {
            let _ = with_active(Wallpaper::on_tick);
            LRESULT(0)
        }
        WM_PAINT => {
            let mut ps = PAINTSTRUCT::default();
            unsafe { BeginPaint(hwnd, &mut ps) };
            let outcome = with_active(Wallpaper::paint);
            let _ = unsafe { EndPaint(hwnd, &ps) };
            // BeginPaint validated the region; ask again so the frame is
            // drawn once the host is free.
            if outcome == Dispatch::Busy {
                let _ = unsafe { InvalidateRect(hwnd, None, false) };
            }
            LRESULT(0)
        }
        WM_SIZE => {
            let width = (lparam.0 & 0xFFFF) as i32;
            let height = ((lparam.0 >> 16) & 0xFFFF) as i32;
            let _ = with_active(|wallpaper| wallpaper.gl.resize(width, height));
            LRESULT(0)
        }
        // The whole client area is redrawn on paint.
        WM_ERASEBKGND => LRESULT(1),
        WM_DESTROY => {
            info!("wallpaper window destroyed");
            LRESULT(0)
        }
        _ => unsafe { DefWindowProcW(hwnd, msg, wparam, lparam) },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_runs_on_a_free_host() {
        let host = Rc::new(RefCell::new(0u32));
        assert_eq!(dispatch(&Rc::downgrade(&host), |n| *n += 1), Dispatch::Handled);
        assert_eq!(*host.borrow(), 1);
    }

    #[test]
    fn dispatch_reports_a_borrowed_host_as_busy() {
        let host = Rc::new(RefCell::new(0u32));
        let held = host.borrow_mut();
        assert_eq!(dispatch(&Rc::downgrade(&host), |n| *n += 1), Dispatch::Busy);
        drop(held);
        assert_eq!(*host.borrow(), 0);
    }

    #[test]
    fn dispatch_after_drop_is_gone() {
        let weak = Rc::downgrade(&Rc::new(RefCell::new(0u32)));
        assert_eq!(dispatch(&weak, |_| unreachable!()), Dispatch::Gone);
    }

    #[test]
    fn failed_placement_is_reported_not_raised() {
        assert!(!place_behind_icons(HWND::default(), HWND::default()));
    }
}

use windows::core::{w, PCWSTR};
use windows::Win32::Foundation::{BOOL, HWND, LPARAM, RECT, TRUE, WPARAM};
use windows::Win32::Graphics::Gdi::{EnumDisplayMonitors, HDC, HMONITOR};
use windows::Win32::UI::WindowsAndMessaging::{
    EnumWindows, FindWindowExW, FindWindowW, SendMessageTimeoutW, SMTO_NORMAL,
};

use super::Rect;

/// Undocumented Progman message that makes Explorer create the WorkerW
/// window sitting between the icons and the system wallpaper.
const SPAWN_WORKER_W: u32 = 0x052C;

/// Combined extent of all monitors, anchored at the desktop origin.
pub fn display_bounds() -> Rect {
    let mut bounds = Rect::default();
    unsafe {
        let _ = EnumDisplayMonitors(
            HDC::default(),
            None,
            Some(accumulate_monitor),
            LPARAM(&mut bounds as *mut Rect as isize),
        );
    }
    bounds
}

unsafe extern "system" fn accumulate_monitor(
    _monitor: HMONITOR,
    _hdc: HDC,
    rect: *mut RECT,
    data: LPARAM,
) -> BOOL {
    // SAFETY: `data` is the `Rect` borrowed by `display_bounds` for the
    // duration of the enumeration, and `rect` is supplied by the system.
    let (bounds, monitor) = unsafe { (&mut *(data.0 as *mut Rect), &*rect) };
    bounds.extend_to(&Rect {
        left: monitor.left,
        top: monitor.top,
        right: monitor.right,
        bottom: monitor.bottom,
    });
    TRUE
}

/// Find the WorkerW window that draws beneath the desktop icons.
pub fn find_behind_icons_host() -> Option<HWND> {
    let progman = unsafe { FindWindowW(w!("Progman"), PCWSTR::null()) };
    if progman.0 == 0 {
        return None;
    }

    let mut worker = HWND::default();
    unsafe {
        let _ = SendMessageTimeoutW(
            progman,
            SPAWN_WORKER_W,
            WPARAM(0),
            LPARAM(0),
            SMTO_NORMAL,
            1000,
            None,
        );
        let _ = EnumWindows(
            Some(find_worker_w),
            LPARAM(&mut worker as *mut HWND as isize),
        );
    }
    (worker.0 != 0).then_some(worker)
}

unsafe extern "system" fn find_worker_w(hwnd: HWND, data: LPARAM) -> BOOL {
    // The icons live in SHELLDLL_DefView; the WorkerW we want is the next
    // top-level sibling after its parent.
    let def_view =
        unsafe { FindWindowExW(hwnd, HWND::default(), w!("SHELLDLL_DefView"), PCWSTR::null()) };
    if def_view.0 != 0 {
        // SAFETY: `data` is the `HWND` borrowed by `find_behind_icons_host`.
        unsafe {
            *(data.0 as *mut HWND) =
                FindWindowExW(HWND::default(), hwnd, w!("WorkerW"), PCWSTR::null());
        }
    }
    TRUE
}

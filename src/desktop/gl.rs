//! Legacy WGL context, texture uploads and the fixed-function quad renderer.

use std::mem;

use anyhow::{bail, Context, Result};
use tracing::{debug, warn};
use windows::Win32::Foundation::HWND;
use windows::Win32::Graphics::Gdi::{GetDC, ReleaseDC, HDC};
use windows::Win32::Graphics::OpenGL::{
    glBegin, glBindTexture, glClear, glClearColor, glDeleteTextures, glEnable, glEnd,
    glGenTextures, glGetError, glGetIntegerv, glPixelStorei, glTexCoord2f, glTexImage2D,
    glTexParameteri, glVertex2f, glViewport, wglCreateContext, wglDeleteContext, wglMakeCurrent,
    ChoosePixelFormat, SetPixelFormat, SwapBuffers, GL_COLOR_BUFFER_BIT, GL_DEPTH_BUFFER_BIT,
    GL_LINEAR, GL_LUMINANCE, GL_MAX_TEXTURE_SIZE, GL_NO_ERROR, GL_QUADS, GL_REPEAT, GL_RGB,
    GL_RGBA, GL_TEXTURE_2D, GL_TEXTURE_MAG_FILTER, GL_TEXTURE_MIN_FILTER, GL_TEXTURE_WRAP_S,
    GL_TEXTURE_WRAP_T, GL_UNPACK_ALIGNMENT, GL_UNSIGNED_BYTE, HGLRC, PFD_DOUBLEBUFFER,
    PFD_DRAW_TO_WINDOW, PFD_SUPPORT_OPENGL, PFD_TYPE_RGBA, PIXELFORMATDESCRIPTOR,
};

use crate::animation::ChannelLayout;
use crate::error::LoadError;
use crate::render::{Renderer, CLEAR_COLOR, WALLPAPER_QUADS};
use crate::texture::{PixelFrame, TextureBackend, TextureHandle};

/// WGL context bound to a window's device context.
pub struct GlContext {
    hwnd: HWND,
    hdc: HDC,
    hglrc: HGLRC,
}

impl GlContext {
    /// Pick a double-buffered RGBA pixel format for `hwnd`, create a
    /// context and make it current.
    pub fn create(hwnd: HWND) -> Result<Self> {
        let hdc = unsafe { GetDC(hwnd) };
        if hdc.is_invalid() {
            bail!("GetDC failed for the wallpaper window");
        }

        let pfd = PIXELFORMATDESCRIPTOR {
            nSize: mem::size_of::<PIXELFORMATDESCRIPTOR>() as u16,
            nVersion: 1,
            dwFlags: PFD_DRAW_TO_WINDOW | PFD_SUPPORT_OPENGL | PFD_DOUBLEBUFFER,
            iPixelType: PFD_TYPE_RGBA,
            cColorBits: 32,
            cDepthBits: 24,
            ..Default::default()
        };

        let setup = || -> Result<HGLRC> {
            unsafe {
                let format = ChoosePixelFormat(hdc, &pfd);
                if format == 0 {
                    bail!("no matching pixel format");
                }
                SetPixelFormat(hdc, format, &pfd).context("SetPixelFormat failed")?;
                let hglrc = wglCreateContext(hdc).context("wglCreateContext failed")?;
                if let Err(err) = wglMakeCurrent(hdc, hglrc) {
                    let _ = wglDeleteContext(hglrc);
                    return Err(err).context("wglMakeCurrent failed");
                }
                Ok(hglrc)
            }
        };
        let hglrc = match setup() {
            Ok(hglrc) => hglrc,
            Err(err) => {
                unsafe { ReleaseDC(hwnd, hdc) };
                return Err(err);
            }
        };

        unsafe { glEnable(GL_TEXTURE_2D) };
        debug!("OpenGL context ready");
        Ok(Self { hwnd, hdc, hglrc })
    }

    /// Bind this context to the calling thread. Other GL users on the same
    /// thread may have replaced it since the last call.
    pub fn make_current(&self) {
        if let Err(err) = unsafe { wglMakeCurrent(self.hdc, self.hglrc) } {
            warn!("wglMakeCurrent failed: {err}");
        }
    }

    pub fn hdc(&self) -> HDC {
        self.hdc
    }

    pub fn resize(&self, width: i32, height: i32) {
        self.make_current();
        unsafe { glViewport(0, 0, width, height) };
    }
}

impl Drop for GlContext {
    fn drop(&mut self) {
        unsafe {
            let _ = wglMakeCurrent(HDC::default(), HGLRC::default());
            let _ = wglDeleteContext(self.hglrc);
            ReleaseDC(self.hwnd, self.hdc);
        }
    }
}

/// Textures created in the current GL context.
pub struct GlTextures {
    max_size: u32,
}

impl GlTextures {
    /// Requires the context to be current.
    pub fn new() -> Self {
        let mut max_size = 0i32;
        unsafe { glGetIntegerv(GL_MAX_TEXTURE_SIZE, &mut max_size) };
        debug!("GL_MAX_TEXTURE_SIZE = {max_size}");
        Self {
            max_size: u32::try_from(max_size).unwrap_or(0),
        }
    }
}

fn gl_format(layout: ChannelLayout) -> u32 {
    match layout {
        ChannelLayout::Luma => GL_LUMINANCE,
        ChannelLayout::Rgb => GL_RGB,
        ChannelLayout::Rgba => GL_RGBA,
    }
}

impl TextureBackend for GlTextures {
    fn upload(&mut self, frame: &PixelFrame<'_>) -> Result<TextureHandle, LoadError> {
        if self.max_size > 0 && (frame.width > self.max_size || frame.height > self.max_size) {
            return Err(LoadError::texture_allocation(format!(
                "{}x{} exceeds the {} pixel texture limit",
                frame.width, frame.height, self.max_size
            )));
        }

        let expected = frame.width as usize * frame.height as usize * frame.layout.channels();
        if frame.pixels.len() < expected {
            return Err(LoadError::texture_allocation(format!(
                "frame holds {} bytes, {expected} needed",
                frame.pixels.len()
            )));
        }

        let format = gl_format(frame.layout);
        unsafe {
            // Drop errors left over from earlier calls so the check below
            // only sees this upload.
            while glGetError() != GL_NO_ERROR {}

            let mut name = 0u32;
            glGenTextures(1, &mut name);
            if name == 0 {
                return Err(LoadError::texture_allocation("glGenTextures returned no name"));
            }

            glBindTexture(GL_TEXTURE_2D, name);
            glPixelStorei(GL_UNPACK_ALIGNMENT, 1);
            glTexImage2D(
                GL_TEXTURE_2D,
                0,
                format as i32,
                frame.width as i32,
                frame.height as i32,
                0,
                format,
                GL_UNSIGNED_BYTE,
                frame.pixels.as_ptr().cast(),
            );
            glTexParameteri(GL_TEXTURE_2D, GL_TEXTURE_WRAP_S, GL_REPEAT as i32);
            glTexParameteri(GL_TEXTURE_2D, GL_TEXTURE_WRAP_T, GL_REPEAT as i32);
            glTexParameteri(GL_TEXTURE_2D, GL_TEXTURE_MIN_FILTER, GL_LINEAR as i32);
            glTexParameteri(GL_TEXTURE_2D, GL_TEXTURE_MAG_FILTER, GL_LINEAR as i32);

            let err = glGetError();
            if err != GL_NO_ERROR {
                glDeleteTextures(1, &name);
                return Err(LoadError::texture_allocation(format!(
                    "glTexImage2D failed with 0x{err:04x}"
                )));
            }
            Ok(TextureHandle::new(name))
        }
    }

    fn release(&mut self, textures: &[TextureHandle]) {
        if textures.is_empty() {
            return;
        }
        let names: Vec<u32> = textures.iter().map(|texture| texture.raw()).collect();
        unsafe { glDeleteTextures(names.len() as i32, names.as_ptr()) };
        debug!("released {} textures", names.len());
    }
}

/// Immediate-mode renderer presenting through the window's device context.
pub struct GlRenderer {
    hdc: HDC,
}

impl GlRenderer {
    pub fn new(hdc: HDC) -> Self {
        Self { hdc }
    }
}

impl Renderer for GlRenderer {
    fn render(&mut self, texture: Option<TextureHandle>) {
        let [r, g, b, a] = CLEAR_COLOR;
        unsafe {
            glClearColor(r, g, b, a);
            glClear(GL_COLOR_BUFFER_BIT | GL_DEPTH_BUFFER_BIT);

            if let Some(texture) = texture {
                glBindTexture(GL_TEXTURE_2D, texture.raw());
                glBegin(GL_QUADS);
                for quad in WALLPAPER_QUADS {
                    for vertex in quad {
                        glTexCoord2f(vertex.uv[0], vertex.uv[1]);
                        glVertex2f(vertex.position[0], vertex.position[1]);
                    }
                }
                glEnd();
            }

            let _ = SwapBuffers(self.hdc);
        }
    }
}

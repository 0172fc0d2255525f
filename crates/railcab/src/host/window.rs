use pixels::{Error as PixelsError, Pixels, SurfaceTexture};
use tracing::{info, warn};
use winit::window::{CursorGrabMode, Fullscreen, Window};

use crate::session::{FrameView, Frontend};

use super::hud::{draw_hud, hud_title};

/// Pixel-buffer frontend bound to the host window.
pub(crate) struct WindowFrontend {
    window: &'static Window,
    pixels: Pixels<'static>,
    width: u32,
    height: u32,
    base_title: String,
    last_title: Option<String>,
    cursor_grabbed: bool,
    render_error: Option<PixelsError>,
}

impl WindowFrontend {
    pub(crate) fn new(window: &'static Window, base_title: String) -> Result<Self, PixelsError> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(window, size.width, size.height)?;
        Ok(Self {
            window,
            pixels,
            width: size.width,
            height: size.height,
            base_title,
            last_title: None,
            cursor_grabbed: false,
            render_error: None,
        })
    }

    pub(crate) fn resize(&mut self, width: u32, height: u32) -> Result<(), PixelsError> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(self.window, width, height)?;
        self.width = width;
        self.height = height;
        Ok(())
    }

    fn build_pixels(
        window: &'static Window,
        width: u32,
        height: u32,
    ) -> Result<Pixels<'static>, PixelsError> {
        let surface = SurfaceTexture::new(width.max(1), height.max(1), window);
        Pixels::new(width.max(1), height.max(1), surface)
    }

    pub(crate) fn take_render_error(&mut self) -> Option<PixelsError> {
        self.render_error.take()
    }

    /// Confines and hides the cursor while mouse grab is on.
    pub(crate) fn sync_cursor_grab(&mut self, enabled: bool) {
        if enabled == self.cursor_grabbed {
            return;
        }
        self.cursor_grabbed = enabled;
        let result = if enabled {
            self.window
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Locked))
        } else {
            self.window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(error) = result {
            warn!(error = %error, enabled, "cursor_grab_failed");
        }
        self.window.set_cursor_visible(!enabled);
    }
}

impl Frontend for WindowFrontend {
    fn render_scene(&mut self, view: &FrameView<'_>) {
        if self.width == 0 || self.height == 0 {
            return;
        }
        draw_hud(self.pixels.frame_mut(), self.width, self.height, view);
        if let Err(error) = self.pixels.render() {
            self.render_error = Some(error);
        }

        let title = hud_title(&self.base_title, view);
        if self.last_title.as_deref() != Some(title.as_str()) {
            self.window.set_title(&title);
            self.last_title = Some(title);
        }
    }

    fn toggle_fullscreen(&mut self) {
        let fullscreen = self.window.fullscreen().is_none();
        self.window
            .set_fullscreen(fullscreen.then_some(Fullscreen::Borderless(None)));
        info!(fullscreen, "fullscreen_toggled");
    }

    fn set_muted(&mut self, muted: bool) {
        info!(muted, "audio_mute_changed");
    }
}

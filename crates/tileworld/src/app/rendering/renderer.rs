use std::sync::Arc;

use pixels::{Error, Pixels, SurfaceTexture};
use winit::window::Window;

use crate::geometry::Vec2;

use super::draw_list::{fill_rect_clipped, outline_rect_clipped, DrawCommand, DrawList};

/// Fixed-size framebuffer scaled onto the window surface.
pub struct Renderer {
    window: Arc<Window>,
    pixels: Pixels<'static>,
    buffer_width: u32,
    buffer_height: u32,
}

impl Renderer {
    pub fn new(window: Arc<Window>, buffer_width: u32, buffer_height: u32) -> Result<Self, Error> {
        let size = window.inner_size();
        let pixels = Self::build_pixels(
            Arc::clone(&window),
            size.width,
            size.height,
            buffer_width,
            buffer_height,
        )?;
        Ok(Self {
            window,
            pixels,
            buffer_width,
            buffer_height,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) -> Result<(), Error> {
        if width == 0 || height == 0 {
            return Ok(());
        }
        self.pixels = Self::build_pixels(
            Arc::clone(&self.window),
            width,
            height,
            self.buffer_width,
            self.buffer_height,
        )?;
        Ok(())
    }

    fn build_pixels(
        window: Arc<Window>,
        surface_width: u32,
        surface_height: u32,
        buffer_width: u32,
        buffer_height: u32,
    ) -> Result<Pixels<'static>, Error> {
        let surface = SurfaceTexture::new(surface_width, surface_height, window);
        Pixels::new(buffer_width, buffer_height, surface)
    }

    /// Maps a window-space cursor position into framebuffer pixels.
    pub fn window_to_buffer_px(&self, x: f32, y: f32) -> Option<Vec2> {
        self.pixels
            .window_pos_to_pixel((x, y))
            .ok()
            .map(|(px, py)| Vec2::new(px as f32, py as f32))
    }

    pub fn render(&mut self, draw_list: &DrawList) -> Result<(), Error> {
        let width = self.buffer_width;
        let height = self.buffer_height;
        let frame = self.pixels.frame_mut();
        let clear = draw_list.clear_color();
        for pixel in frame.chunks_exact_mut(4) {
            pixel.copy_from_slice(&clear);
        }
        for command in draw_list.commands() {
            match command {
                DrawCommand::Fill { rect, color } => {
                    fill_rect_clipped(frame, width, height, rect, *color)
                }
                DrawCommand::Outline { rect, color } => {
                    outline_rect_clipped(frame, width, height, rect, *color)
                }
            }
        }
        self.pixels.render()
    }
}

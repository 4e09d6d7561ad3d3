use pixels::{Pixels, SurfaceTexture};
use winit::window::Window;

use crate::color::{Color, PALETTE};
use crate::sketchpad::Sketchpad;

pub const TOOLBAR_HEIGHT: u32 = 28;
const TOOLBAR_BACKGROUND: [u8; 4] = [32, 32, 32, 255];
const SWATCH_SIZE: u32 = 18;
const SWATCH_GAP: u32 = 5;
const HIGHLIGHT: [u8; 4] = [255, 215, 0, 255];

/// Presents the sketchpad surface with a swatch toolbar underneath.
pub struct GraphicsRenderer {
    pixels: Pixels,
    width: u32,
    canvas_height: u32,
}

impl GraphicsRenderer {
    pub fn new(window: &Window, width: u32, canvas_height: u32) -> Result<Self, pixels::Error> {
        let window_size = window.inner_size();
        let surface_texture = SurfaceTexture::new(window_size.width, window_size.height, window);
        let pixels = Pixels::new(width, canvas_height + TOOLBAR_HEIGHT, surface_texture)?;

        Ok(Self {
            pixels,
            width,
            canvas_height,
        })
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if let Err(err) = self.pixels.resize_surface(width, height) {
            log::error!("Failed to resize surface: {}", err);
        }
    }

    /// Map a physical window position to buffer pixel coordinates. Positions
    /// outside the buffer keep their out-of-range values so painting there
    /// is ignored.
    pub fn window_to_buffer(&self, x: f64, y: f64) -> (f64, f64) {
        match self.pixels.window_pos_to_pixel((x as f32, y as f32)) {
            Ok((px, py)) => (px as f64, py as f64),
            Err((px, py)) => (px as f64, py as f64),
        }
    }

    /// Index of the palette swatch under a buffer position, if any.
    pub fn swatch_at(&self, x: f64, y: f64) -> Option<usize> {
        if x < 0.0 || y < self.canvas_height as f64 {
            return None;
        }
        let (x, y) = (x as u32, y as u32 - self.canvas_height);
        (0..PALETTE.len()).find(|&i| {
            let (sx, sy) = Self::swatch_origin(i);
            x >= sx && x < sx + SWATCH_SIZE && y >= sy && y < sy + SWATCH_SIZE
        })
    }

    fn swatch_origin(index: usize) -> (u32, u32) {
        let x = SWATCH_GAP + index as u32 * (SWATCH_SIZE + SWATCH_GAP);
        let y = (TOOLBAR_HEIGHT - SWATCH_SIZE) / 2;
        (x, y)
    }

    pub fn render(&mut self, pad: &Sketchpad) {
        let width = self.width;
        let canvas_height = self.canvas_height;
        let frame = self.pixels.frame_mut();

        // Canvas rows are copied straight from the surface buffer.
        let canvas_bytes = (width * canvas_height * 4) as usize;
        let source = pad.surface().as_raw();
        let copy_len = canvas_bytes.min(source.len());
        frame[..copy_len].copy_from_slice(&source[..copy_len]);

        let toolbar = &mut frame[canvas_bytes..];
        for pixel in toolbar.chunks_exact_mut(4) {
            pixel.copy_from_slice(&TOOLBAR_BACKGROUND);
        }

        let current = pad.state().color;
        for (i, swatch) in PALETTE.iter().enumerate() {
            let (x, y) = Self::swatch_origin(i);
            Self::draw_square_static(toolbar, x, y, SWATCH_SIZE, swatch.to_rgba(), width, TOOLBAR_HEIGHT);
            if *swatch == current {
                Self::draw_outline_static(toolbar, x - 2, y - 2, SWATCH_SIZE + 4, HIGHLIGHT, width, TOOLBAR_HEIGHT);
            }
        }

        // Current color preview, then a bar as long as the cell size.
        let (after_x, y) = Self::swatch_origin(PALETTE.len());
        let preview_x = after_x + SWATCH_GAP;
        Self::draw_square_static(toolbar, preview_x, y, SWATCH_SIZE, current.to_rgba(), width, TOOLBAR_HEIGHT);
        Self::draw_outline_static(toolbar, preview_x, y, SWATCH_SIZE, HIGHLIGHT, width, TOOLBAR_HEIGHT);

        let bar_x = preview_x + SWATCH_SIZE + SWATCH_GAP;
        let bar = Color::rgb(0xcc, 0xcc, 0xcc).to_rgba();
        for dx in 0..pad.state().cell_size {
            put_pixel(toolbar, bar_x + dx, y + SWATCH_SIZE / 2 - 2, bar, width, TOOLBAR_HEIGHT);
            put_pixel(toolbar, bar_x + dx, y + SWATCH_SIZE / 2, bar, width, TOOLBAR_HEIGHT);
        }
    }

    fn draw_square_static(frame: &mut [u8], x: u32, y: u32, size: u32, color: [u8; 4], width: u32, height: u32) {
        for dy in 0..size {
            for dx in 0..size {
                put_pixel(frame, x + dx, y + dy, color, width, height);
            }
        }
    }

    fn draw_outline_static(frame: &mut [u8], x: u32, y: u32, size: u32, color: [u8; 4], width: u32, height: u32) {
        let far = size.saturating_sub(1);
        for d in 0..size {
            put_pixel(frame, x + d, y, color, width, height);
            put_pixel(frame, x + d, y + far, color, width, height);
            put_pixel(frame, x, y + d, color, width, height);
            put_pixel(frame, x + far, y + d, color, width, height);
        }
    }

    pub fn present(&mut self) -> Result<(), pixels::Error> {
        self.pixels.render()
    }
}

/// Write one RGBA pixel into a frame of `width` x `height`, ignoring
/// positions outside it.
fn put_pixel(frame: &mut [u8], x: u32, y: u32, color: [u8; 4], width: u32, height: u32) {
    if x >= width || y >= height {
        return;
    }
    let index = ((y * width + x) * 4) as usize;
    if let Some(pixel) = frame.get_mut(index..index + 4) {
        pixel.copy_from_slice(&color);
    }
}

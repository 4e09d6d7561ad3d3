use image::{Rgba, RgbaImage};
use std::sync::Arc;

use crate::color::Color;

/// A fully rendered, immutable copy of the surface.
///
/// Cloning only bumps a reference count, so the history can hand the same
/// snapshot out repeatedly without copying pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot(Arc<RgbaImage>);

impl Snapshot {
    pub fn width(&self) -> u32 {
        self.0.width()
    }

    pub fn height(&self) -> u32 {
        self.0.height()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.width() && y < self.height() {
            Some(Color::from_rgba(self.0.get_pixel(x, y).0))
        } else {
            None
        }
    }

    pub fn image(&self) -> &RgbaImage {
        &self.0
    }
}

/// Mutable RGBA drawing target. All primitives clip to the surface bounds.
pub struct Surface {
    buffer: RgbaImage,
}

impl Surface {
    pub fn new(width: u32, height: u32, background: Color) -> Self {
        Self {
            buffer: RgbaImage::from_pixel(width, height, Rgba(background.to_rgba())),
        }
    }

    pub fn width(&self) -> u32 {
        self.buffer.width()
    }

    pub fn height(&self) -> u32 {
        self.buffer.height()
    }

    pub fn as_raw(&self) -> &[u8] {
        self.buffer.as_raw()
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Color> {
        if x < self.width() && y < self.height() {
            Some(Color::from_rgba(self.buffer.get_pixel(x, y).0))
        } else {
            None
        }
    }

    pub fn clear(&mut self, color: Color) {
        let rgba = Rgba(color.to_rgba());
        for pixel in self.buffer.pixels_mut() {
            *pixel = rgba;
        }
    }

    fn put(&mut self, x: u32, y: u32, color: Color) {
        if x < self.width() && y < self.height() {
            self.buffer.put_pixel(x, y, Rgba(color.to_rgba()));
        }
    }

    pub fn fill_rect(&mut self, x: u32, y: u32, size_w: u32, size_h: u32, color: Color) {
        let x_end = x.saturating_add(size_w).min(self.width());
        let y_end = y.saturating_add(size_h).min(self.height());
        for py in y..y_end {
            for px in x..x_end {
                self.put(px, py, color);
            }
        }
    }

    /// One pixel wide vertical line spanning the full height.
    pub fn vertical_line(&mut self, x: u32, color: Color) {
        for y in 0..self.height() {
            self.put(x, y, color);
        }
    }

    /// One pixel wide horizontal line spanning the full width.
    pub fn horizontal_line(&mut self, y: u32, color: Color) {
        for x in 0..self.width() {
            self.put(x, y, color);
        }
    }

    /// One pixel outline with inclusive corners `(x0, y0)` and `(x1, y1)`.
    pub fn outline_rect(&mut self, x0: u32, y0: u32, x1: u32, y1: u32, color: Color) {
        for px in x0..=x1 {
            self.put(px, y0, color);
            self.put(px, y1, color);
        }
        for py in y0..=y1 {
            self.put(x0, py, color);
            self.put(x1, py, color);
        }
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot(Arc::new(self.buffer.clone()))
    }

    /// Replace the whole surface with a snapshot's pixels. A snapshot of a
    /// different size is drawn at the origin over the given background.
    pub fn set_content(&mut self, snapshot: &Snapshot, background: Color) {
        if snapshot.width() == self.width() && snapshot.height() == self.height() {
            self.buffer.clone_from(snapshot.image());
            return;
        }

        log::warn!(
            "Restoring {}x{} snapshot onto {}x{} surface",
            snapshot.width(),
            snapshot.height(),
            self.width(),
            self.height()
        );
        self.clear(background);
        let w = snapshot.width().min(self.width());
        let h = snapshot.height().min(self.height());
        for y in 0..h {
            for x in 0..w {
                let px = *snapshot.image().get_pixel(x, y);
                self.buffer.put_pixel(x, y, px);
            }
        }
    }
}

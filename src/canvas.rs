use crate::color::{Color, BACKGROUND, GRID_LINE};
use crate::export::{self, ExportError};
use crate::surface::{Snapshot, Surface};

/// Grid-aligned cell coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub col: u32,
    pub row: u32,
}

/// The drawing surface divided into square cells.
pub struct GridCanvas {
    surface: Surface,
    width: u32,
    height: u32,
    cell_size: u32,
}

impl GridCanvas {
    /// Build a blank canvas. Call [`GridCanvas::initialize`] to get the
    /// first snapshot.
    pub fn new(width: u32, height: u32, cell_size: u32) -> Self {
        Self {
            surface: Surface::new(width, height, BACKGROUND),
            width,
            height,
            cell_size: cell_size.max(1),
        }
    }

    pub fn cell_size(&self) -> u32 {
        self.cell_size
    }

    pub fn columns(&self) -> u32 {
        self.width.div_ceil(self.cell_size)
    }

    pub fn rows(&self) -> u32 {
        self.height.div_ceil(self.cell_size)
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    /// Reset to a blank grid with the given dimensions and return the
    /// snapshot that should seed a fresh history.
    pub fn initialize(&mut self, width: u32, height: u32, cell_size: u32) -> Snapshot {
        self.width = width;
        self.height = height;
        self.cell_size = cell_size.max(1);

        if self.surface.width() != width || self.surface.height() != height {
            self.surface = Surface::new(width, height, BACKGROUND);
        } else {
            self.surface.clear(BACKGROUND);
        }
        self.draw_grid();

        log::info!(
            "Canvas initialized: {}x{} px, cell {} px, {}x{} cells",
            width,
            height,
            self.cell_size,
            self.columns(),
            self.rows()
        );
        self.surface.snapshot()
    }

    /// Map surface-local pointer coordinates to a cell. A coordinate on a
    /// boundary belongs to the cell that starts there.
    pub fn cell_at(&self, px: f64, py: f64) -> Option<Cell> {
        if !(px >= 0.0 && py >= 0.0 && px < self.width as f64 && py < self.height as f64) {
            return None;
        }
        let size = self.cell_size as f64;
        Some(Cell {
            col: (px / size).floor() as u32,
            row: (py / size).floor() as u32,
        })
    }

    /// Fill the cell under the pointer and redraw its border. Out of bounds
    /// coordinates are ignored. Returns the painted cell, if any.
    pub fn paint_cell(&mut self, px: f64, py: f64, color: Color) -> Option<Cell> {
        let cell = self.cell_at(px, py)?;
        self.fill_cell(cell, color);
        Some(cell)
    }

    fn fill_cell(&mut self, cell: Cell, color: Color) {
        if cell.col >= self.columns() || cell.row >= self.rows() {
            return;
        }
        let x = cell.col * self.cell_size;
        let y = cell.row * self.cell_size;
        self.surface.fill_rect(x, y, self.cell_size, self.cell_size, color);

        // Far edges land on the last pixel at the surface border, same as draw_grid.
        let (last_x, last_y) = self.last_pixel();
        let far_x = (x + self.cell_size).min(last_x);
        let far_y = (y + self.cell_size).min(last_y);
        self.surface.outline_rect(x, y, far_x, far_y, GRID_LINE);
    }

    /// Color currently shown inside a cell, sampled just inside its border.
    #[cfg(test)]
    pub(crate) fn cell_color(&self, cell: Cell) -> Option<Color> {
        if cell.col >= self.columns() || cell.row >= self.rows() {
            return None;
        }
        let inset = if self.cell_size > 1 { 1 } else { 0 };
        self.surface.pixel(
            cell.col * self.cell_size + inset,
            cell.row * self.cell_size + inset,
        )
    }

    /// Replace the surface with `snapshot` and reapply the grid overlay.
    /// Both steps happen before returning, so callers only ever present the
    /// finished result.
    pub fn restore(&mut self, snapshot: &Snapshot) {
        self.surface.set_content(snapshot, BACKGROUND);
        self.draw_grid();
    }

    pub fn snapshot(&self) -> Snapshot {
        self.surface.snapshot()
    }

    /// Current surface encoded as PNG.
    pub fn export_image(&self) -> Result<Vec<u8>, ExportError> {
        export::encode_png(&self.surface)
    }

    fn last_pixel(&self) -> (u32, u32) {
        (self.width.saturating_sub(1), self.height.saturating_sub(1))
    }

    /// Lines at every multiple of the cell size, plus the closing line on
    /// the last column and row.
    fn draw_grid(&mut self) {
        let (last_x, last_y) = self.last_pixel();

        for x in (0..self.width).step_by(self.cell_size as usize) {
            self.surface.vertical_line(x, GRID_LINE);
        }
        self.surface.vertical_line(last_x, GRID_LINE);

        for y in (0..self.height).step_by(self.cell_size as usize) {
            self.surface.horizontal_line(y, GRID_LINE);
        }
        self.surface.horizontal_line(last_y, GRID_LINE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn canvas() -> (GridCanvas, Snapshot) {
        let mut canvas = GridCanvas::new(320, 320, 20);
        let initial = canvas.initialize(320, 320, 20);
        (canvas, initial)
    }

    #[test]
    fn default_dimensions_give_sixteen_by_sixteen() {
        let (canvas, _) = canvas();
        assert_eq!(canvas.columns(), 16);
        assert_eq!(canvas.rows(), 16);
    }

    #[test]
    fn initialize_draws_background_and_grid() {
        let (canvas, initial) = canvas();
        assert_eq!(initial.pixel(10, 10), Some(BACKGROUND));
        assert_eq!(initial.pixel(20, 10), Some(GRID_LINE));
        assert_eq!(initial.pixel(10, 40), Some(GRID_LINE));
        assert_eq!(initial.pixel(319, 5), Some(GRID_LINE));
        assert_eq!(canvas.snapshot(), initial);
    }

    #[test]
    fn paint_targets_expected_cells() {
        let (mut canvas, _) = canvas();
        let black = Color::rgb(0, 0, 0);

        assert_eq!(canvas.paint_cell(5.0, 5.0, black), Some(Cell { col: 0, row: 0 }));
        assert_eq!(canvas.paint_cell(20.0, 0.0, black), Some(Cell { col: 1, row: 0 }));
        assert_eq!(canvas.cell_color(Cell { col: 0, row: 0 }), Some(black));
        assert_eq!(canvas.cell_color(Cell { col: 1, row: 0 }), Some(black));
        assert_eq!(canvas.cell_color(Cell { col: 2, row: 0 }), Some(BACKGROUND));
    }

    #[test]
    fn boundary_coordinate_selects_next_cell() {
        let (canvas, _) = canvas();
        assert_eq!(canvas.cell_at(19.999, 0.0), Some(Cell { col: 0, row: 0 }));
        assert_eq!(canvas.cell_at(20.0, 40.0), Some(Cell { col: 1, row: 2 }));
    }

    #[test]
    fn every_in_bounds_coordinate_maps_to_a_cell() {
        let (mut canvas, _) = canvas();
        for py in (0..320).step_by(7) {
            for px in (0..320).step_by(7) {
                let cell = canvas.paint_cell(px as f64, py as f64, GRID_LINE);
                let cell = cell.expect("in-bounds paint");
                assert!(cell.col < canvas.columns() && cell.row < canvas.rows());
            }
        }
    }

    #[test]
    fn out_of_bounds_paint_is_a_no_op() {
        let (mut canvas, initial) = canvas();
        let red = Color::rgb(255, 0, 0);
        assert_eq!(canvas.paint_cell(-1.0, 5.0, red), None);
        assert_eq!(canvas.paint_cell(320.0, 5.0, red), None);
        assert_eq!(canvas.paint_cell(5.0, 320.0, red), None);
        assert_eq!(canvas.paint_cell(f64::NAN, 5.0, red), None);
        assert_eq!(canvas.snapshot(), initial);
    }

    #[test]
    fn painted_cell_keeps_its_border() {
        let (mut canvas, _) = canvas();
        let red = Color::rgb(255, 0, 0);
        canvas.paint_cell(25.0, 25.0, red);
        let surface = canvas.surface();
        assert_eq!(surface.pixel(20, 25), Some(GRID_LINE));
        assert_eq!(surface.pixel(40, 25), Some(GRID_LINE));
        assert_eq!(surface.pixel(30, 20), Some(GRID_LINE));
        assert_eq!(surface.pixel(30, 30), Some(red));
    }

    #[test]
    fn restore_brings_back_snapshot_with_grid() {
        let (mut canvas, initial) = canvas();
        canvas.paint_cell(100.0, 100.0, Color::rgb(0, 0, 255));
        canvas.restore(&initial);
        assert_eq!(canvas.snapshot(), initial);
    }

    #[test]
    fn edge_cells_survive_restore_unchanged() {
        for size in [20, 30] {
            let mut canvas = GridCanvas::new(320, 320, size);
            canvas.initialize(320, 320, size);
            let red = Color::rgb(255, 0, 0);
            canvas.paint_cell(310.0, 5.0, red);
            canvas.paint_cell(5.0, 310.0, red);
            canvas.paint_cell(315.0, 315.0, red);
            assert_eq!(canvas.surface().pixel(319, 5), Some(GRID_LINE));
            assert_eq!(canvas.surface().pixel(5, 319), Some(GRID_LINE));

            let painted = canvas.snapshot();
            canvas.restore(&painted);
            assert_eq!(canvas.snapshot(), painted, "cell size {}", size);
        }
    }

    #[test]
    fn partial_trailing_cell_is_paintable() {
        let mut canvas = GridCanvas::new(320, 320, 30);
        canvas.initialize(320, 320, 30);
        assert_eq!(canvas.columns(), 11);
        let red = Color::rgb(255, 0, 0);
        assert_eq!(canvas.paint_cell(315.0, 0.0, red), Some(Cell { col: 10, row: 0 }));
        assert_eq!(canvas.surface().pixel(315, 10), Some(red));
    }

    #[test]
    fn export_produces_png_of_surface() {
        let (mut canvas, _) = canvas();
        canvas.paint_cell(5.0, 5.0, Color::rgb(255, 0, 0));
        let png = canvas.export_image().unwrap();
        assert_eq!(&png[0..8], b"\x89PNG\r\n\x1a\n");

        let decoded = image::load_from_memory_with_format(&png, image::ImageFormat::Png)
            .unwrap()
            .to_rgba8();
        assert_eq!(decoded.dimensions(), (320, 320));
        assert_eq!(decoded.get_pixel(5, 5).0, [255, 0, 0, 255]);
    }
}

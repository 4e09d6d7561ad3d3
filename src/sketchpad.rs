use crate::canvas::GridCanvas;
use crate::color::{Color, ColorError};
use crate::config::{clamp_cell_size, ConfigError, SketchConfig};
use crate::export::ExportError;
use crate::history::History;
use crate::surface::{Snapshot, Surface};

/// Transient drawing state owned by the stroke controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeState {
    pub color: Color,
    pub cell_size: u32,
    pub stroke_active: bool,
    /// Touch that owns the active stroke, `None` for mouse strokes.
    pub touch_id: Option<u64>,
}

/// The widget: grid canvas, its snapshot history, and the stroke state
/// that drives painting.
///
/// Every method returns whether the visible surface changed so the host
/// knows when to redraw.
pub struct Sketchpad {
    config: SketchConfig,
    canvas: GridCanvas,
    history: History<Snapshot>,
    state: StrokeState,
}

impl Sketchpad {
    pub fn new(config: SketchConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut canvas = GridCanvas::new(config.width, config.height, config.cell_size);
        let initial = canvas.initialize(config.width, config.height, config.cell_size);

        Ok(Self {
            config,
            canvas,
            history: History::new(initial),
            state: StrokeState {
                color: config.color,
                cell_size: config.cell_size,
                stroke_active: false,
                touch_id: None,
            },
        })
    }

    pub fn state(&self) -> &StrokeState {
        &self.state
    }

    pub fn canvas(&self) -> &GridCanvas {
        &self.canvas
    }

    pub fn surface(&self) -> &Surface {
        self.canvas.surface()
    }

    pub fn history(&self) -> &History<Snapshot> {
        &self.history
    }

    pub fn pointer_down(&mut self, px: f64, py: f64) -> bool {
        self.state.stroke_active = true;
        self.state.touch_id = None;
        log::debug!("Stroke started at ({:.1}, {:.1})", px, py);
        self.paint(px, py)
    }

    /// Moves outside a stroke are dropped.
    pub fn pointer_move(&mut self, px: f64, py: f64) -> bool {
        if !self.state.stroke_active {
            return false;
        }
        self.paint(px, py)
    }

    /// Finish the stroke and record it. Does nothing if no stroke is active.
    pub fn pointer_up(&mut self) -> bool {
        if !self.state.stroke_active {
            return false;
        }
        self.state.stroke_active = false;
        self.state.touch_id = None;
        self.history.push(self.canvas.snapshot());
        log::debug!("Stroke committed ({} snapshots)", self.history.len());
        false
    }

    /// Only the first touch to go down drives the stroke.
    pub fn touch_start(&mut self, id: u64, px: f64, py: f64) -> bool {
        if self.state.stroke_active {
            return false;
        }
        let changed = self.pointer_down(px, py);
        self.state.touch_id = Some(id);
        changed
    }

    pub fn touch_move(&mut self, id: u64, px: f64, py: f64) -> bool {
        if self.state.touch_id != Some(id) {
            return false;
        }
        self.pointer_move(px, py)
    }

    pub fn touch_end(&mut self, id: u64) -> bool {
        if self.state.touch_id != Some(id) {
            return false;
        }
        self.pointer_up()
    }

    pub fn undo(&mut self) -> bool {
        self.pointer_up();
        match self.history.undo() {
            Some(snapshot) => {
                self.canvas.restore(&snapshot);
                true
            }
            None => false,
        }
    }

    pub fn redo(&mut self) -> bool {
        self.pointer_up();
        match self.history.redo() {
            Some(snapshot) => {
                self.canvas.restore(&snapshot);
                true
            }
            None => false,
        }
    }

    /// Wipe the canvas and start a new history.
    pub fn clear(&mut self) -> bool {
        log::info!("Clearing canvas");
        self.reinitialize();
        true
    }

    pub fn set_color(&mut self, color: Color) {
        self.state.color = color;
    }

    /// Parse and apply a color value; on error the current color is kept.
    pub fn set_color_value(&mut self, value: &str) -> Result<Color, ColorError> {
        let color = value.parse::<Color>().map_err(|err| {
            log::warn!("Rejected color {:?}: {}", value, err);
            err
        })?;
        self.set_color(color);
        Ok(color)
    }

    /// Clamp and apply a new cell size. A different size rebuilds the grid,
    /// discarding the drawing and its history.
    pub fn set_cell_size(&mut self, requested: i64) -> bool {
        let size = clamp_cell_size(requested);
        if size == self.state.cell_size {
            return false;
        }
        log::info!("Cell size {} -> {}", self.state.cell_size, size);
        self.state.cell_size = size;
        self.reinitialize();
        true
    }

    pub fn adjust_cell_size(&mut self, delta: i64) -> bool {
        self.set_cell_size(self.state.cell_size as i64 + delta)
    }

    pub fn export_image(&self) -> Result<Vec<u8>, ExportError> {
        self.canvas.export_image()
    }

    fn paint(&mut self, px: f64, py: f64) -> bool {
        self.canvas.paint_cell(px, py, self.state.color).is_some()
    }

    fn reinitialize(&mut self) {
        self.state.stroke_active = false;
        self.state.touch_id = None;
        let initial = self.canvas.initialize(self.config.width, self.config.height, self.state.cell_size);
        self.history.reset(initial);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::Cell;
    use crate::color::BACKGROUND;

    fn pad() -> Sketchpad {
        Sketchpad::new(SketchConfig::default()).unwrap()
    }

    fn stroke(pad: &mut Sketchpad, points: &[(f64, f64)]) {
        let (first, rest) = points.split_first().unwrap();
        pad.pointer_down(first.0, first.1);
        for &(x, y) in rest {
            pad.pointer_move(x, y);
        }
        pad.pointer_up();
    }

    #[test]
    fn rejects_invalid_config() {
        let config = SketchConfig { cell_size: 60, ..SketchConfig::default() };
        assert!(Sketchpad::new(config).is_err());
    }

    #[test]
    fn scenario_paint_then_undo() {
        let mut pad = pad();
        let initial = pad.canvas().snapshot();

        stroke(&mut pad, &[(5.0, 5.0), (20.0, 0.0)]);
        assert_eq!(pad.canvas().cell_color(Cell { col: 0, row: 0 }), Some(Color::rgb(0, 0, 0)));
        assert_eq!(pad.canvas().cell_color(Cell { col: 1, row: 0 }), Some(Color::rgb(0, 0, 0)));

        assert!(pad.undo());
        assert_eq!(pad.canvas().snapshot(), initial);
        assert_eq!(pad.canvas().cell_color(Cell { col: 0, row: 0 }), Some(BACKGROUND));
    }

    #[test]
    fn n_strokes_then_n_undos_returns_to_initial() {
        let mut pad = pad();
        let initial = pad.canvas().snapshot();
        for i in 0..6 {
            let p = 5.0 + 40.0 * i as f64;
            stroke(&mut pad, &[(p, p), (p + 20.0, p)]);
        }
        assert_eq!(pad.history().len(), 7);
        for _ in 0..6 {
            assert!(pad.undo());
        }
        assert!(!pad.undo());
        assert_eq!(pad.canvas().snapshot(), initial);
    }

    #[test]
    fn undo_then_redo_restores_state() {
        let mut pad = pad();
        stroke(&mut pad, &[(50.0, 50.0)]);
        stroke(&mut pad, &[(150.0, 150.0)]);
        let before = pad.canvas().snapshot();

        assert!(pad.undo());
        assert!(pad.redo());
        assert_eq!(pad.canvas().snapshot(), before);
        assert!(!pad.redo());
    }

    #[test]
    fn undo_then_redo_restores_last_column_and_row() {
        for point in [(310.0, 5.0), (5.0, 310.0), (319.0, 319.0)] {
            let mut pad = pad();
            stroke(&mut pad, &[point]);
            let before = pad.canvas().snapshot();

            assert!(pad.undo());
            assert!(pad.redo());
            assert_eq!(pad.canvas().snapshot(), before, "stroke at {:?}", point);
        }
    }

    #[test]
    fn new_stroke_after_undo_drops_redo_branch() {
        let mut pad = pad();
        stroke(&mut pad, &[(5.0, 5.0)]);
        stroke(&mut pad, &[(45.0, 5.0)]);
        pad.undo();
        stroke(&mut pad, &[(85.0, 5.0)]);

        assert_eq!(pad.history().len(), 3);
        assert_eq!(pad.history().cursor(), 2);
        assert!(!pad.redo());
        assert_eq!(pad.canvas().cell_color(Cell { col: 2, row: 0 }), Some(BACKGROUND));
        assert_eq!(pad.canvas().cell_color(Cell { col: 4, row: 0 }), Some(Color::rgb(0, 0, 0)));
    }

    #[test]
    fn moves_without_stroke_do_not_paint() {
        let mut pad = pad();
        let initial = pad.canvas().snapshot();
        assert!(!pad.pointer_move(5.0, 5.0));
        assert!(!pad.pointer_up());
        assert_eq!(pad.history().len(), 1);
        assert_eq!(pad.canvas().snapshot(), initial);
    }

    #[test]
    fn one_snapshot_per_stroke() {
        let mut pad = pad();
        stroke(&mut pad, &[(5.0, 5.0), (25.0, 5.0), (45.0, 5.0), (400.0, 5.0)]);
        assert_eq!(pad.history().len(), 2);
    }

    #[test]
    fn cell_size_change_resets_history() {
        let mut pad = pad();
        for _ in 0..4 {
            stroke(&mut pad, &[(5.0, 5.0)]);
        }
        pad.undo();

        assert!(pad.set_cell_size(10));
        assert_eq!(pad.history().len(), 1);
        assert_eq!(pad.history().cursor(), 0);
        assert_eq!(pad.canvas().columns(), 32);
        assert_eq!(pad.canvas().cell_color(Cell { col: 0, row: 0 }), Some(BACKGROUND));
    }

    #[test]
    fn cell_size_input_is_clamped() {
        let mut pad = pad();
        assert!(pad.set_cell_size(1000));
        assert_eq!(pad.state().cell_size, 50);
        assert!(!pad.adjust_cell_size(1));
        assert!(pad.set_cell_size(-4));
        assert_eq!(pad.state().cell_size, 5);
    }

    #[test]
    fn clear_resets_to_blank_grid() {
        let mut pad = pad();
        let initial = pad.canvas().snapshot();
        stroke(&mut pad, &[(5.0, 5.0)]);
        assert!(pad.clear());
        assert_eq!(pad.history().len(), 1);
        assert_eq!(pad.canvas().snapshot(), initial);
    }

    #[test]
    fn starts_with_configured_color() {
        let config = SketchConfig { color: Color::rgb(0, 0, 255), ..SketchConfig::default() };
        let mut pad = Sketchpad::new(config).unwrap();
        assert_eq!(pad.state().color, Color::rgb(0, 0, 255));
        stroke(&mut pad, &[(5.0, 5.0)]);
        assert_eq!(pad.canvas().cell_color(Cell { col: 0, row: 0 }), Some(Color::rgb(0, 0, 255)));
    }

    #[test]
    fn bad_color_keeps_previous() {
        let mut pad = pad();
        assert_eq!(pad.set_color_value("#ff0000"), Ok(Color::rgb(255, 0, 0)));
        assert!(pad.set_color_value("not-a-color").is_err());
        assert_eq!(pad.state().color, Color::rgb(255, 0, 0));
    }

    #[test]
    fn only_first_touch_paints() {
        let mut pad = pad();
        assert!(pad.touch_start(1, 5.0, 5.0));
        assert!(!pad.touch_start(2, 105.0, 5.0));
        assert!(!pad.touch_move(2, 125.0, 5.0));
        assert!(!pad.touch_end(2));
        assert!(pad.state().stroke_active);

        assert!(pad.touch_move(1, 25.0, 5.0));
        pad.touch_end(1);
        assert!(!pad.state().stroke_active);
        assert_eq!(pad.history().len(), 2);
        assert_eq!(pad.canvas().cell_color(Cell { col: 5, row: 0 }), Some(BACKGROUND));
    }

    #[test]
    fn undo_mid_stroke_commits_first() {
        let mut pad = pad();
        let initial = pad.canvas().snapshot();
        pad.pointer_down(5.0, 5.0);
        assert!(pad.undo());
        assert!(!pad.state().stroke_active);
        assert_eq!(pad.canvas().snapshot(), initial);
        assert!(pad.redo());
        assert_eq!(pad.canvas().cell_color(Cell { col: 0, row: 0 }), Some(Color::rgb(0, 0, 0)));
    }
}

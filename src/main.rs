mod canvas;
mod color;
mod config;
mod export;
mod graphics;
mod history;
mod input;
mod sketchpad;
mod surface;

use winit::{
    event::{Event, WindowEvent},
    event_loop::{ControlFlow, EventLoop},
    window::{Window, WindowBuilder},
};

use crate::color::PALETTE;
use crate::config::SketchConfig;
use crate::graphics::{GraphicsRenderer, TOOLBAR_HEIGHT};
use crate::input::{InputAction, InputHandler};
use crate::sketchpad::Sketchpad;

// Window pixels per surface pixel at startup.
const WINDOW_SCALE: u32 = 2;

const HOST_CONFIG: &str = include_str!("../sketchpad.json");

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = SketchConfig::from_json(HOST_CONFIG)?;
    let mut pad = Sketchpad::new(config)?;
    let runtime = tokio::runtime::Runtime::new()?;

    let event_loop = EventLoop::new();
    let window = WindowBuilder::new()
        .with_title("Pixel Sketchpad")
        .with_inner_size(winit::dpi::LogicalSize::new(
            config.width * WINDOW_SCALE,
            (config.height + TOOLBAR_HEIGHT) * WINDOW_SCALE,
        ))
        .with_resizable(true)
        .build(&event_loop)?;

    let mut graphics = GraphicsRenderer::new(&window, config.width, config.height)?;
    let mut input_handler = InputHandler::new();
    update_title(&window, &pad, None);

    event_loop.run(move |event, _, control_flow| {
        *control_flow = ControlFlow::Wait;

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => {
                    *control_flow = ControlFlow::Exit;
                }
                WindowEvent::Resized(size) => {
                    graphics.resize(size.width, size.height);
                    window.request_redraw();
                }
                event => {
                    let action = input_handler.handle_window_event(&event);
                    if apply_action(action, &mut pad, &graphics, runtime.handle()) {
                        update_title(&window, &pad, input_handler.color_entry());
                        window.request_redraw();
                    }
                }
            },
            Event::RedrawRequested(_) => {
                graphics.render(&pad);
                if let Err(err) = graphics.present() {
                    log::error!("Render error: {}", err);
                    *control_flow = ControlFlow::Exit;
                }
            }
            _ => {}
        }
    });
}

/// Apply one input action to the sketchpad. Returns whether anything
/// visible changed.
fn apply_action(
    action: InputAction,
    pad: &mut Sketchpad,
    graphics: &GraphicsRenderer,
    runtime: &tokio::runtime::Handle,
) -> bool {
    match action {
        InputAction::None => false,
        InputAction::PointerDown(x, y) => {
            let (bx, by) = graphics.window_to_buffer(x, y);
            if let Some(index) = graphics.swatch_at(bx, by) {
                pad.set_color(PALETTE[index]);
                true
            } else if pad.canvas().cell_at(bx, by).is_some() {
                pad.pointer_down(bx, by)
            } else {
                false
            }
        }
        InputAction::PointerMove(x, y) => {
            let (bx, by) = graphics.window_to_buffer(x, y);
            pad.pointer_move(bx, by)
        }
        // Ending a stroke commits history, which the title reflects.
        InputAction::PointerUp => {
            let was_active = pad.state().stroke_active;
            pad.pointer_up();
            was_active
        }
        InputAction::TouchStart(id, x, y) => {
            let (bx, by) = graphics.window_to_buffer(x, y);
            if let Some(index) = graphics.swatch_at(bx, by) {
                pad.set_color(PALETTE[index]);
                true
            } else if pad.canvas().cell_at(bx, by).is_some() {
                pad.touch_start(id, bx, by)
            } else {
                false
            }
        }
        InputAction::TouchMove(id, x, y) => {
            let (bx, by) = graphics.window_to_buffer(x, y);
            pad.touch_move(id, bx, by)
        }
        InputAction::TouchEnd(id) => {
            let owned = pad.state().touch_id == Some(id);
            pad.touch_end(id);
            owned
        }
        InputAction::Undo => pad.undo(),
        InputAction::Redo => pad.redo(),
        InputAction::Clear => pad.clear(),
        InputAction::SelectSwatch(index) => match PALETTE.get(index) {
            Some(color) => {
                pad.set_color(*color);
                true
            }
            None => false,
        },
        InputAction::AdjustCellSize(delta) => pad.adjust_cell_size(delta),
        // The title shows the text being typed.
        InputAction::UpdateColorEntry(_) | InputAction::CancelColorEntry => true,
        // A rejected value is logged and the entry closes either way.
        InputAction::ApplyColor(value) => {
            if let Ok(color) = pad.set_color_value(&value) {
                log::debug!("Color set to {}", color);
            }
            true
        }
        InputAction::Download => {
            download(pad, runtime);
            false
        }
    }
}

/// Encode now so the file matches what is on screen, then write in the
/// background.
fn download(pad: &Sketchpad, runtime: &tokio::runtime::Handle) {
    let bytes = match pad.export_image() {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!("Export failed: {}", err);
            return;
        }
    };
    match export::choose_download_path() {
        Some(path) => export::spawn_download(runtime, path, bytes),
        None => log::debug!("Download cancelled"),
    }
}

fn update_title(window: &Window, pad: &Sketchpad, color_entry: Option<&str>) {
    if let Some(entry) = color_entry {
        window.set_title(&format!("Pixel Sketchpad (color: {}_)", entry));
        return;
    }
    let canvas = pad.canvas();
    let history = pad.history();
    window.set_title(&format!(
        "Pixel Sketchpad ({}x{} cells, {} / {}, {})",
        canvas.columns(),
        canvas.rows(),
        history.cursor() + 1,
        history.len(),
        pad.state().color
    ));
}

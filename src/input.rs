use winit::event::{
    ElementState, KeyboardInput, ModifiersState, MouseButton, Touch, TouchPhase, VirtualKeyCode,
    WindowEvent,
};

/// Translates raw window events into sketchpad actions. Pointer positions
/// are reported in physical window coordinates; the renderer maps them onto
/// the canvas.
pub struct InputHandler {
    modifiers: ModifiersState,
    cursor: (f64, f64),
    /// Typed color value while color entry is open.
    color_entry: Option<String>,
}

const MAX_COLOR_ENTRY: usize = 32;

#[derive(Debug, Clone, PartialEq)]
pub enum InputAction {
    None,
    PointerDown(f64, f64),
    PointerMove(f64, f64),
    PointerUp,
    TouchStart(u64, f64, f64),
    TouchMove(u64, f64, f64),
    TouchEnd(u64),
    Undo,
    Redo,
    Clear,
    Download,
    SelectSwatch(usize),
    AdjustCellSize(i64),
    UpdateColorEntry(String),
    ApplyColor(String),
    CancelColorEntry,
}

impl InputHandler {
    pub fn new() -> Self {
        Self {
            modifiers: ModifiersState::empty(),
            cursor: (0.0, 0.0),
            color_entry: None,
        }
    }

    /// Text typed so far, if color entry is open.
    pub fn color_entry(&self) -> Option<&str> {
        self.color_entry.as_deref()
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent<'_>) -> InputAction {
        match event {
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = *modifiers;
                InputAction::None
            }
            WindowEvent::CursorMoved { position, .. } => {
                self.cursor = (position.x, position.y);
                InputAction::PointerMove(position.x, position.y)
            }
            WindowEvent::MouseInput {
                state,
                button: MouseButton::Left,
                ..
            } => match state {
                ElementState::Pressed => InputAction::PointerDown(self.cursor.0, self.cursor.1),
                ElementState::Released => InputAction::PointerUp,
            },
            WindowEvent::Touch(touch) => Self::handle_touch(touch),
            WindowEvent::ReceivedCharacter(ch) => self.handle_character(*ch),
            WindowEvent::KeyboardInput { input, .. } => self.handle_keyboard_input(input),
            _ => InputAction::None,
        }
    }

    fn handle_touch(touch: &Touch) -> InputAction {
        let (x, y) = (touch.location.x, touch.location.y);
        match touch.phase {
            TouchPhase::Started => InputAction::TouchStart(touch.id, x, y),
            TouchPhase::Moved => InputAction::TouchMove(touch.id, x, y),
            TouchPhase::Ended | TouchPhase::Cancelled => InputAction::TouchEnd(touch.id),
        }
    }

    pub fn handle_keyboard_input(&mut self, input: &KeyboardInput) -> InputAction {
        match (input.state, input.virtual_keycode) {
            (ElementState::Pressed, Some(key_code)) if self.color_entry.is_some() => {
                self.handle_color_entry_key(key_code)
            }
            (ElementState::Pressed, Some(VirtualKeyCode::Return)) => {
                self.color_entry = Some(String::new());
                InputAction::UpdateColorEntry(String::new())
            }
            (ElementState::Pressed, Some(key_code)) => self.handle_key_press(key_code),
            _ => InputAction::None,
        }
    }

    /// Printable characters only reach the sketchpad while color entry is
    /// open; shortcuts come through key presses instead.
    fn handle_character(&mut self, ch: char) -> InputAction {
        match self.color_entry.as_mut() {
            Some(entry) if !ch.is_control() && entry.len() < MAX_COLOR_ENTRY => {
                entry.push(ch);
                InputAction::UpdateColorEntry(entry.clone())
            }
            _ => InputAction::None,
        }
    }

    fn handle_color_entry_key(&mut self, key_code: VirtualKeyCode) -> InputAction {
        match key_code {
            VirtualKeyCode::Return | VirtualKeyCode::NumpadEnter => match self.color_entry.take() {
                Some(entry) if !entry.trim().is_empty() => InputAction::ApplyColor(entry),
                _ => InputAction::CancelColorEntry,
            },
            VirtualKeyCode::Escape => {
                self.color_entry = None;
                InputAction::CancelColorEntry
            }
            VirtualKeyCode::Back => match self.color_entry.as_mut() {
                Some(entry) => {
                    entry.pop();
                    InputAction::UpdateColorEntry(entry.clone())
                }
                None => InputAction::None,
            },
            _ => InputAction::None,
        }
    }

    fn handle_key_press(&self, key_code: VirtualKeyCode) -> InputAction {
        // Cmd on macOS, Ctrl elsewhere
        let command = self.modifiers.ctrl() || self.modifiers.logo();
        let shift = self.modifiers.shift();

        match key_code {
            VirtualKeyCode::Z if command && shift => InputAction::Redo,
            VirtualKeyCode::Z if command => InputAction::Undo,
            VirtualKeyCode::Y if command => InputAction::Redo,
            VirtualKeyCode::S if command => InputAction::Download,
            VirtualKeyCode::Delete | VirtualKeyCode::Back => InputAction::Clear,

            VirtualKeyCode::Equals | VirtualKeyCode::Plus | VirtualKeyCode::NumpadAdd => {
                InputAction::AdjustCellSize(1)
            }
            VirtualKeyCode::Minus | VirtualKeyCode::NumpadSubtract => InputAction::AdjustCellSize(-1),
            VirtualKeyCode::RBracket => InputAction::AdjustCellSize(5),
            VirtualKeyCode::LBracket => InputAction::AdjustCellSize(-5),

            _ => match Self::swatch_key(key_code) {
                Some(index) => InputAction::SelectSwatch(index),
                None => InputAction::None,
            },
        }
    }

    fn swatch_key(key_code: VirtualKeyCode) -> Option<usize> {
        let index = match key_code {
            VirtualKeyCode::Key1 => 0,
            VirtualKeyCode::Key2 => 1,
            VirtualKeyCode::Key3 => 2,
            VirtualKeyCode::Key4 => 3,
            VirtualKeyCode::Key5 => 4,
            VirtualKeyCode::Key6 => 5,
            VirtualKeyCode::Key7 => 6,
            VirtualKeyCode::Key8 => 7,
            VirtualKeyCode::Key9 => 8,
            VirtualKeyCode::Key0 => 9,
            _ => return None,
        };
        Some(index)
    }
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

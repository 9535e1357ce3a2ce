//! Input line editing.
//!
//! Owns the text buffer and cursor. The cursor counts characters, not bytes,
//! so multi-byte input edits cleanly. Command parsing happens on submit.

/// Key input events from the terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyInput {
    /// Character input.
    Char(char),
    /// Enter/Return key.
    Enter,
    /// Backspace key.
    Backspace,
    /// Delete key.
    Delete,
    /// Tab key.
    Tab,
    /// Escape key.
    Esc,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page up.
    PageUp,
    /// Page down.
    PageDown,
}

/// Text input buffer with a cursor.
#[derive(Debug, Default)]
pub struct InputState {
    buffer: String,
    /// Cursor position in characters.
    cursor: usize,
}

impl InputState {
    /// Create a new empty input state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Current text in the input buffer.
    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    /// Cursor position in characters.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    fn len(&self) -> usize {
        self.buffer.chars().count()
    }

    fn byte_index(&self, cursor: usize) -> usize {
        self.buffer.char_indices().nth(cursor).map_or(self.buffer.len(), |(i, _)| i)
    }

    /// Apply an editing key.
    ///
    /// Returns the submitted line on Enter, if it was not blank. Keys that do
    /// not edit text are ignored.
    pub fn handle_key(&mut self, key: KeyInput) -> Option<String> {
        match key {
            KeyInput::Char(c) => {
                let at = self.byte_index(self.cursor);
                self.buffer.insert(at, c);
                self.cursor += 1;
            },
            KeyInput::Backspace => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                    let at = self.byte_index(self.cursor);
                    self.buffer.remove(at);
                }
            },
            KeyInput::Delete => {
                if self.cursor < self.len() {
                    let at = self.byte_index(self.cursor);
                    self.buffer.remove(at);
                }
            },
            KeyInput::Left => self.cursor = self.cursor.saturating_sub(1),
            KeyInput::Right => self.cursor = (self.cursor + 1).min(self.len()),
            KeyInput::Home => self.cursor = 0,
            KeyInput::End => self.cursor = self.len(),
            KeyInput::Enter => {
                let text = std::mem::take(&mut self.buffer);
                self.cursor = 0;
                let text = text.trim();
                return (!text.is_empty()).then(|| text.to_string());
            },
            KeyInput::Tab
            | KeyInput::Esc
            | KeyInput::Up
            | KeyInput::Down
            | KeyInput::PageUp
            | KeyInput::PageDown => {},
        }
        None
    }
}

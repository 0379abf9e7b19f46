// src/engine/stream.rs
//! The per-runtime output buffer consumed by the REPL between solutions.

/// Append-only text buffer with a read cursor. `write`/`nl`/`tab`
/// append; the reader drains everything produced since the previous
/// read. Not thread-safe, not required to be.
#[derive(Debug, Default)]
pub struct OutputStream {
    buffer: String,
    cursor: usize,
}

impl OutputStream {
    pub fn new() -> Self {
        OutputStream::default()
    }

    pub fn write(&mut self, text: &str) {
        self.buffer.push_str(text);
    }

    /// Returns the text appended since the previous read and advances
    /// the cursor past it.
    pub fn read(&mut self) -> String {
        let output = self.buffer[self.cursor..].to_string();
        self.cursor = self.buffer.len();
        output
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.cursor = 0;
    }
}

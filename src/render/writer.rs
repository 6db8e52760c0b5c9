//! Indentation-aware line writer for generated source.

/// Indentation unit used throughout generated code.
pub const INDENT: &str = "    ";

/// Accumulates generated source line by line.
#[derive(Debug, Default)]
pub struct SourceWriter {
    out: String,
    depth: usize,
}

impl SourceWriter {
    /// Empty writer at depth zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Write one line at the current depth. Empty text writes a bare newline.
    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.depth {
                self.out.push_str(INDENT);
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    /// Write an empty line.
    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    /// Run `body` one level deeper.
    pub fn indented(&mut self, body: impl FnOnce(&mut Self)) {
        self.depth += 1;
        body(self);
        self.depth -= 1;
    }

    /// Write `open`, the indented `body`, then `close`.
    pub fn block(&mut self, open: impl AsRef<str>, close: &str, body: impl FnOnce(&mut Self)) {
        self.line(open);
        self.indented(body);
        self.line(close);
    }

    /// Write pre-formatted text, re-indenting every line to the current depth.
    pub fn text(&mut self, text: &str) {
        for line in text.lines() {
            self.line(line.trim_end());
        }
    }

    /// Consume the writer and return the source.
    pub fn finish(self) -> String {
        self.out
    }
}

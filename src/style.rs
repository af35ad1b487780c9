use owo_colors::OwoColorize;

/// Color roles used by the board when composing a frame.
///
/// Styling is cosmetic: swap in [`PlainStyle`] to get byte-for-byte
/// predictable output in tests or on dumb terminals.
pub trait Style: Send {
    /// A task still in flight (spinner glyph).
    fn active(&self, text: &str) -> String;
    /// A fulfilled task or the filled bar segment.
    fn success(&self, text: &str) -> String;
    /// A rejected task.
    fn failure(&self, text: &str) -> String;
    /// A buffered error line.
    fn error(&self, text: &str) -> String;
    /// The unfilled bar segment.
    fn dim(&self, text: &str) -> String;
}

/// ANSI colors via `owo-colors`. The default.
pub struct AnsiStyle;

impl Style for AnsiStyle {
    fn active(&self, text: &str) -> String {
        text.blue().to_string()
    }

    fn success(&self, text: &str) -> String {
        text.green().to_string()
    }

    fn failure(&self, text: &str) -> String {
        text.red().to_string()
    }

    fn error(&self, text: &str) -> String {
        text.red().to_string()
    }

    fn dim(&self, text: &str) -> String {
        text.dimmed().to_string()
    }
}

/// Pass-through styling: every role returns the text unchanged.
pub struct PlainStyle;

impl Style for PlainStyle {
    fn active(&self, text: &str) -> String {
        text.to_string()
    }

    fn success(&self, text: &str) -> String {
        text.to_string()
    }

    fn failure(&self, text: &str) -> String {
        text.to_string()
    }

    fn error(&self, text: &str) -> String {
        text.to_string()
    }

    fn dim(&self, text: &str) -> String {
        text.to_string()
    }
}

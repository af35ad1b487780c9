/// A frame-based spinner animation.
///
/// The board calls [`Spinner::tick`] once per repaint and [`Spinner::frame`]
/// for the glyph to put in front of every pending task, so all tasks animate
/// in lockstep.
///
/// ```rust,ignore
/// let board = TaskBoard::new().spinner(Spinner::dots());
/// ```
pub struct Spinner {
    frames: &'static [&'static str],
    index: usize,
}

impl Spinner {
    /// Classic line spinner, the default.
    pub fn line() -> Self {
        Self {
            frames: &["-", "\\", "|", "/"],
            index: 0,
        }
    }

    /// Braille dot spinner.
    pub fn dots() -> Self {
        Self {
            frames: &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
            index: 0,
        }
    }

    /// Arrow spinner.
    pub fn arrow() -> Self {
        Self {
            frames: &["←", "↖", "↑", "↗", "→", "↘", "↓", "↙"],
            index: 0,
        }
    }

    /// Custom frames.
    pub fn custom(frames: &'static [&'static str]) -> Self {
        Self { frames, index: 0 }
    }

    /// Advance to the next frame, wrapping at the end of the glyph set.
    pub fn tick(&mut self) {
        self.index = (self.index + 1) % self.frames.len();
    }

    /// Current frame string.
    pub fn frame(&self) -> &'static str {
        self.frames[self.index]
    }
}

impl Default for Spinner {
    fn default() -> Self {
        Self::line()
    }
}

impl std::fmt::Display for Spinner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.frame())
    }
}

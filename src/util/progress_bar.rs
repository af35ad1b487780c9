use crate::style::Style;

/// A progress bar sized against a live terminal column count.
///
/// The trailing info text (` 45.00% (45 / 100)`, plus any extra text) is laid
/// out first; the bar fills whatever width remains after the info text and a
/// four-column margin. On terminals too narrow for any bar, only the info
/// text is rendered.
///
/// ```rust,ignore
/// let bar = ProgressBar::new(45.0, 100.0).columns(60);
/// writeln!(frame, " {}", bar.render(style.as_ref()))?;
/// // => ██████████████░░░░░░░░░░░░░░░░░░  45.00% (45 / 100)
/// ```
pub struct ProgressBar {
    progress: f64,
    total: f64,
    columns: u16,
    filled: char,
    empty: char,
    text: Option<String>,
}

impl ProgressBar {
    pub fn new(progress: f64, total: f64) -> Self {
        Self {
            progress,
            total,
            columns: 80,
            filled: '█',
            empty: '░',
            text: None,
        }
    }

    /// Set the terminal width the bar is laid out against.
    pub fn columns(mut self, columns: u16) -> Self {
        self.columns = columns;
        self
    }

    /// Custom fill characters.
    pub fn chars(mut self, filled: char, empty: char) -> Self {
        self.filled = filled;
        self.empty = empty;
        self
    }

    /// Extra text appended after the percentage and fraction.
    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Completed percentage, clamped to `[0, 100]`.
    pub fn percent(&self) -> f64 {
        if self.total <= 0.0 {
            return 0.0;
        }
        (100.0 * self.progress / self.total).clamp(0.0, 100.0)
    }

    pub fn render(&self, style: &dyn Style) -> String {
        let percent = self.percent();
        let mut info = format!(" {:5.2}% ({} / {})", percent, self.progress, self.total);
        if let Some(text) = &self.text {
            info.push(' ');
            info.push_str(text);
        }

        let width = (self.columns as usize).saturating_sub(info.len() + 4);
        let filled = ((percent * width as f64 / 100.0).floor() as usize).min(width);
        let empty = width - filled;

        format!(
            "{}{}{}",
            style.success(&self.filled.to_string().repeat(filled)),
            style.dim(&self.empty.to_string().repeat(empty)),
            info,
        )
    }
}

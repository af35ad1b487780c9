use std::time::{Duration, Instant};

use crate::style::Style;
use crate::util::{ProgressBar, elapsed_secs, format_time, time_remaining};

/// Identifies a task within its board.
///
/// Names are display labels and may collide; ids never do.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(pub(crate) u64);

/// Display state of a task.
///
/// `Fulfilled` and `Rejected` are terminal: once reached, neither the state
/// nor the recorded completion time ever changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Pending,
    Fulfilled,
    Rejected,
}

impl TaskState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskState::Pending)
    }
}

/// A caller contract violation in [`Update`] values.
///
/// These fail fast instead of rendering garbage: a zero total makes the
/// percentage undefined, and a non-finite progress value would poison every
/// derived number (ETA, bar width) from then on.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum UpdateError {
    #[error("progress total must be greater than zero")]
    ZeroTotal,
    #[error("progress value must be finite, got {0}")]
    NonFiniteProgress(f64),
}

/// Options for registering a task on a board.
///
/// ```rust,ignore
/// board.log_task(
///     TaskOptions::new("upload")
///         .progress(0.0, 2048.0)
///         .status("connecting")
///         .remove_when_complete(Duration::from_secs(2)),
/// );
/// ```
pub struct TaskOptions {
    pub(crate) name: String,
    pub(crate) status: String,
    pub(crate) progress: Option<f64>,
    pub(crate) total: Option<f64>,
    pub(crate) remove_when_complete: Option<Duration>,
}

impl TaskOptions {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: String::new(),
            progress: None,
            total: None,
            remove_when_complete: None,
        }
    }

    /// Initial free-text annotation shown after the task name.
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = status.into();
        self
    }

    /// Initial progress and total; enables the progress bar.
    pub fn progress(mut self, progress: f64, total: f64) -> Self {
        self.progress = Some(progress);
        self.total = Some(total);
        self
    }

    /// Schedule the task for removal `delay` after it reaches a terminal
    /// state. The purge happens on the first tick past the deadline.
    pub fn remove_when_complete(mut self, delay: Duration) -> Self {
        self.remove_when_complete = Some(delay);
        self
    }
}

/// A progress mutation applied through [`TaskHandle::update`].
///
/// [`TaskHandle::update`]: crate::TaskHandle::update
pub struct Update {
    pub(crate) progress: f64,
    pub(crate) total: Option<f64>,
    pub(crate) status: Option<String>,
}

impl Update {
    pub fn progress(progress: f64) -> Self {
        Self {
            progress,
            total: None,
            status: None,
        }
    }

    /// Replace the total alongside the progress value.
    pub fn total(mut self, total: f64) -> Self {
        self.total = Some(total);
        self
    }

    /// Replace the status text alongside the progress value.
    pub fn status(mut self, status: impl Into<String>) -> Self {
        self.status = Some(status.into());
        self
    }
}

pub(crate) struct Task {
    pub(crate) name: String,
    pub(crate) state: TaskState,
    pub(crate) status: String,
    pub(crate) progress: Option<f64>,
    pub(crate) total: Option<f64>,
    pub(crate) started_at: Instant,
    pub(crate) completed: Option<Duration>,
    pub(crate) remove_when_complete: Option<Duration>,
    pub(crate) remove_at: Option<Instant>,
}

impl Task {
    pub(crate) fn new(options: TaskOptions) -> Self {
        Self {
            name: options.name,
            state: TaskState::Pending,
            status: options.status,
            progress: options.progress,
            total: options.total,
            started_at: Instant::now(),
            completed: None,
            remove_when_complete: options.remove_when_complete,
            remove_at: None,
        }
    }

    /// Apply an [`Update`]: progress always, total/status when given.
    ///
    /// While pending, reaching the total fulfills the task. Once terminal,
    /// progress and status still update for display but the state and
    /// completion time are frozen.
    pub(crate) fn apply(&mut self, update: Update) -> Result<(), UpdateError> {
        if !update.progress.is_finite() {
            return Err(UpdateError::NonFiniteProgress(update.progress));
        }
        if let Some(total) = update.total.or(self.total)
            && total <= 0.0
        {
            return Err(UpdateError::ZeroTotal);
        }

        self.progress = Some(update.progress);
        if let Some(total) = update.total {
            self.total = Some(total);
        }
        if let Some(status) = update.status {
            self.status = status;
        }

        if self.state == TaskState::Pending
            && let Some(total) = self.total
            && update.progress >= total
        {
            self.transition(TaskState::Fulfilled);
        }
        Ok(())
    }

    /// Move to a terminal state, stamping the completion time exactly once.
    /// A no-op when already terminal.
    pub(crate) fn transition(&mut self, state: TaskState) {
        if self.state.is_terminal() {
            return;
        }
        self.state = state;
        self.completed = Some(self.started_at.elapsed());
        if let Some(delay) = self.remove_when_complete {
            self.remove_at = Some(Instant::now() + delay);
        }
    }

    pub(crate) fn expired(&self, now: Instant) -> bool {
        self.remove_at.is_some_and(|at| now >= at)
    }

    /// Produce the display line(s) for the current animation frame.
    ///
    /// One line for the mark, name, duration, ETA and status; a second line
    /// with the progress bar while a total is known and the task has not
    /// fulfilled (a rejected task keeps its bar so the failure point stays
    /// visible).
    pub(crate) fn render(&self, glyph: &str, style: &dyn Style, columns: u16) -> String {
        let elapsed = elapsed_secs(self.started_at);

        let mut line = match self.state {
            TaskState::Fulfilled => style.success(&format!("✓ {}", self.name)),
            TaskState::Rejected => style.failure(&format!("✗ {}", self.name)),
            TaskState::Pending => format!("{} {}", style.active(glyph), self.name),
        };

        let shown = self.completed.map_or(elapsed, |d| d.as_secs_f64());
        line.push_str(&format!(" ({})", format_time(shown)));

        if self.state == TaskState::Pending
            && let (Some(progress), Some(total)) = (self.progress, self.total)
        {
            let eta = time_remaining(elapsed, progress, total);
            line.push_str(&format!(" eta: {}", format_time(eta)));
        }

        if !self.status.is_empty() {
            line.push(' ');
            line.push_str(&self.status);
        }

        if self.state != TaskState::Fulfilled
            && let (Some(progress), Some(total)) = (self.progress, self.total)
        {
            let bar = ProgressBar::new(progress, total).columns(columns);
            line.push_str("\n ");
            line.push_str(&bar.render(style));
        }

        line
    }
}

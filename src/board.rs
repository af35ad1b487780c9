use std::io::Write;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Weak};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use indexmap::IndexMap;

use crate::style::{AnsiStyle, Style};
use crate::task::{Task, TaskId, TaskOptions, TaskState, Update, UpdateError};
use crate::util::Spinner;
use crate::writer::FrameWriter;

/// Classification of a buffered log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogKind {
    Info,
    Error,
}

pub(crate) struct LogLine {
    kind: LogKind,
    text: String,
}

/// Everything a tick touches sits behind one mutex: the ticker thread and
/// caller-side mutation must never interleave mid-frame.
pub(crate) struct BoardInner {
    tasks: IndexMap<TaskId, Task>,
    next_id: u64,
    logs: Vec<LogLine>,
    spinner: Spinner,
    style: Box<dyn Style>,
    columns: Box<dyn Fn() -> u16 + Send>,
    target: Box<dyn Write + Send>,
    frame_lines: usize,
}

impl BoardInner {
    fn register(&mut self, options: TaskOptions) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.insert(id, Task::new(options));
        id
    }

    /// First task with this name, in insertion order.
    fn find(&self, name: &str) -> Option<TaskId> {
        self.tasks
            .iter()
            .find(|(_, task)| task.name == name)
            .map(|(id, _)| *id)
    }

    pub(crate) fn push_log(&mut self, kind: LogKind, text: String) {
        self.logs.push(LogLine { kind, text });
    }

    /// One render cycle: advance the spinner, purge expired tasks, emit
    /// drained log lines into scrollback, then repaint the task block.
    fn tick(&mut self) -> Result<(), std::io::Error> {
        self.spinner.tick();

        let now = Instant::now();
        self.tasks.retain(|_, task| !task.expired(now));

        // Width is probed fresh every tick; the terminal may have resized.
        let columns = (self.columns)();

        let mut frame = FrameWriter::new(&mut self.target, self.frame_lines);
        frame.clear_frame()?;

        // Buffered logs land above the live frame and are never repainted.
        for line in self.logs.drain(..) {
            match line.kind {
                LogKind::Error => writeln!(frame, "{}", self.style.error(&line.text))?,
                LogKind::Info => writeln!(frame, "{}", line.text)?,
            }
        }

        let mut frame = FrameWriter::new(&mut self.target, 0);
        let glyph = self.spinner.frame();
        for task in self.tasks.values() {
            writeln!(frame, "{}", task.render(glyph, self.style.as_ref(), columns))?;
        }
        self.frame_lines = frame.frame_lines();
        frame.flush()
    }
}

/// A live-updating terminal display of named tasks plus buffered log output.
///
/// Repainting happens on a fixed cadence, decoupled from mutation: callers
/// may update progress at arbitrary, bursty rates and the ticker batches it
/// all into one coherent frame per interval.
///
/// ```rust,ignore
/// let mut board = TaskBoard::new();
/// board.start();
///
/// let task = board.log_progress("download", 100.0, 0.0);
/// task.update(Update::progress(40.0))?;
/// board.log("cache warm");
///
/// board.stop();
/// ```
pub struct TaskBoard {
    inner: Arc<Mutex<BoardInner>>,
    running: Arc<AtomicBool>,
    ticker: Option<JoinHandle<()>>,
    interval: Duration,
}

impl TaskBoard {
    pub fn new() -> Self {
        let inner = BoardInner {
            tasks: IndexMap::new(),
            next_id: 0,
            logs: Vec::new(),
            spinner: Spinner::default(),
            style: Box::new(AnsiStyle),
            columns: Box::new(|| crossterm::terminal::size().map(|(c, _)| c).unwrap_or(80)),
            target: Box::new(std::io::stderr()),
            frame_lines: 0,
        };
        Self {
            inner: Arc::new(Mutex::new(inner)),
            running: Arc::new(AtomicBool::new(false)),
            ticker: None,
            interval: Duration::from_millis(80),
        }
    }

    /// Set the repaint interval (default 80 ms).
    pub fn interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Set the write target (default stderr).
    pub fn writer(self, target: impl Write + Send + 'static) -> Self {
        self.inner.lock().unwrap().target = Box::new(target);
        self
    }

    /// Set the styling implementation (default [`AnsiStyle`]).
    pub fn style(self, style: impl Style + 'static) -> Self {
        self.inner.lock().unwrap().style = Box::new(style);
        self
    }

    /// Set the terminal-width probe (default `crossterm::terminal::size`,
    /// falling back to 80 columns).
    pub fn columns(self, columns: impl Fn() -> u16 + Send + 'static) -> Self {
        self.inner.lock().unwrap().columns = Box::new(columns);
        self
    }

    /// Set the spinner glyph set (default [`Spinner::line`]).
    pub fn spinner(self, spinner: Spinner) -> Self {
        self.inner.lock().unwrap().spinner = spinner;
        self
    }

    /// Register an initial batch of tasks.
    pub fn with_tasks(self, tasks: impl IntoIterator<Item = TaskOptions>) -> Self {
        {
            let mut inner = self.inner.lock().unwrap();
            for options in tasks {
                inner.register(options);
            }
        }
        self
    }

    /// Start the ticker thread. A second call while running is a no-op.
    pub fn start(&mut self) {
        if self.ticker.is_some() {
            return;
        }
        self.running.store(true, Ordering::Relaxed);
        let inner = Arc::clone(&self.inner);
        let running = Arc::clone(&self.running);
        let interval = self.interval;
        self.ticker = Some(std::thread::spawn(move || {
            while running.load(Ordering::Relaxed) {
                std::thread::sleep(interval);
                // A dropped frame beats a panicking ticker.
                let _ = inner.lock().unwrap().tick();
            }
        }));
    }

    /// Stop the ticker and run one final tick to flush pending state.
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::Relaxed);
        if let Some(ticker) = self.ticker.take() {
            let _ = ticker.join();
        }
        let _ = self.tick();
    }

    /// Run a single render cycle. The ticker calls this on its own; it is
    /// public for tests and for driving the board without a thread.
    pub fn tick(&self) -> Result<(), std::io::Error> {
        self.inner.lock().unwrap().tick()
    }

    /// Construct and register a task; returns a handle for further mutation.
    pub fn log_task(&self, options: TaskOptions) -> TaskHandle {
        let id = self.inner.lock().unwrap().register(options);
        TaskHandle {
            id,
            board: Arc::downgrade(&self.inner),
        }
    }

    /// Register a pending task tied to a future.
    ///
    /// The returned future resolves to the inner future's output, fulfilling
    /// the task on `Ok` and rejecting it on `Err`. A rejection is captured as
    /// a state transition, never re-thrown. If the task was removed (or the
    /// board dropped) before resolution, the transition is a silent no-op.
    /// The board never cancels the future; an abandoned one simply leaves the
    /// task pending.
    pub fn log_promise<N: Into<String>, F, T, E>(
        &self, name: N, future: F,
    ) -> impl Future<Output = Result<T, E>> + use<N, F, T, E>
    where
        F: Future<Output = Result<T, E>>,
    {
        let task = self.log_task(TaskOptions::new(name));
        async move {
            match future.await {
                Ok(value) => {
                    task.fulfill();
                    Ok(value)
                }
                Err(error) => {
                    task.reject();
                    Err(error)
                }
            }
        }
    }

    /// Register a task with a progress bar.
    pub fn log_progress(&self, name: impl Into<String>, total: f64, progress: f64) -> TaskHandle {
        self.log_task(TaskOptions::new(name).progress(progress, total))
    }

    /// Handle to the first task with this name, in insertion order.
    pub fn task(&self, name: &str) -> Option<TaskHandle> {
        let id = self.inner.lock().unwrap().find(name)?;
        Some(TaskHandle {
            id,
            board: Arc::downgrade(&self.inner),
        })
    }

    /// Remove the first task with this name immediately, terminal or not.
    /// An absent name is a no-op.
    pub fn remove_task(&self, name: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(id) = inner.find(name) {
            inner.tasks.shift_remove(&id);
        }
    }

    /// Remove the task behind a handle immediately.
    pub fn remove(&self, handle: &TaskHandle) {
        self.inner.lock().unwrap().tasks.shift_remove(&handle.id);
    }

    /// Remove all tasks immediately.
    pub fn clear_tasks(&self) {
        self.inner.lock().unwrap().tasks.clear();
    }

    /// Buffer a log line for the next tick.
    ///
    /// This is the board's output sink: route application output through it
    /// (or through [`TaskBoard::layer`]) instead of printing directly, so
    /// lines never interleave with an in-progress repaint.
    pub fn write(&self, kind: LogKind, text: impl Into<String>) {
        self.inner.lock().unwrap().push_log(kind, text.into());
    }

    /// Buffer an informational line.
    pub fn log(&self, text: impl Into<String>) {
        self.write(LogKind::Info, text);
    }

    /// Buffer an error line, rendered in the error style.
    pub fn error(&self, text: impl Into<String>) {
        self.write(LogKind::Error, text);
    }

    /// A `tracing` layer that routes event messages into this board's log
    /// buffer. See [`BoardLayer`](crate::BoardLayer).
    #[cfg(feature = "tracing")]
    pub fn layer(&self) -> crate::BoardLayer {
        crate::BoardLayer::new(Arc::downgrade(&self.inner))
    }
}

impl Default for TaskBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TaskBoard {
    fn drop(&mut self) {
        if self.ticker.is_some() {
            self.stop();
        }
    }
}

/// Mutation handle for a single task.
///
/// Holds a weak reference to the board interior, so a handle may outlive its
/// task or the whole board: every operation on a detached handle is a silent
/// no-op and every getter returns `None`. This is what lets an in-flight
/// future resolve long after its task was removed without error.
#[derive(Clone)]
pub struct TaskHandle {
    id: TaskId,
    board: Weak<Mutex<BoardInner>>,
}

impl TaskHandle {
    fn with_task<T>(&self, f: impl FnOnce(&mut Task) -> T) -> Option<T> {
        let board = self.board.upgrade()?;
        let mut inner = board.lock().unwrap();
        let task = inner.tasks.get_mut(&self.id)?;
        Some(f(task))
    }

    /// Apply a progress [`Update`]. Detached handles report `Ok`.
    pub fn update(&self, update: Update) -> Result<(), UpdateError> {
        self.with_task(|task| task.apply(update)).unwrap_or(Ok(()))
    }

    /// Replace the status text.
    pub fn set_status(&self, status: impl Into<String>) {
        let status = status.into();
        let _ = self.with_task(|task| task.status = status);
    }

    /// Transition to `Fulfilled`. A no-op once terminal.
    pub fn fulfill(&self) {
        let _ = self.with_task(|task| task.transition(TaskState::Fulfilled));
    }

    /// Transition to `Rejected`. A no-op once terminal.
    pub fn reject(&self) {
        let _ = self.with_task(|task| task.transition(TaskState::Rejected));
    }

    /// Schedule removal at `delay` from now, regardless of display state.
    pub fn remove_in(&self, delay: Duration) {
        let _ = self.with_task(|task| task.remove_at = Some(Instant::now() + delay));
    }

    /// Current state, or `None` when detached.
    pub fn state(&self) -> Option<TaskState> {
        self.with_task(|task| task.state)
    }

    /// Current progress value, if any.
    pub fn progress(&self) -> Option<f64> {
        self.with_task(|task| task.progress).flatten()
    }

    /// Elapsed duration at the terminal transition, once reached.
    pub fn completed(&self) -> Option<Duration> {
        self.with_task(|task| task.completed).flatten()
    }
}

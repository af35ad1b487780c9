use std::io::Write;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::prelude::*;
use crate::util::{ProgressBar, Spinner, format_time, time_remaining};

/// Minimal in-memory terminal that understands the cursor-up / clear-line /
/// clear-below sequences emitted by the frame writer.
pub struct VirtualTerm {
    pub lines: Vec<String>,
    pub cursor_row: usize,
    buf: Vec<u8>,
}

impl VirtualTerm {
    pub fn new() -> Self {
        Self {
            lines: vec![String::new()],
            cursor_row: 0,
            buf: Vec::new(),
        }
    }

    pub fn render(&self) -> String {
        self.lines.join("\n")
    }

    fn ensure_row(&mut self, row: usize) {
        while self.lines.len() <= row {
            self.lines.push(String::new());
        }
    }

    fn process(&mut self, s: &str) {
        if s.contains("\x1b[") {
            if let Some(pos) = s.find('A') {
                let num_str = &s[s.find('[').unwrap() + 1..pos];
                if let Ok(n) = num_str.parse::<usize>() {
                    self.cursor_row = self.cursor_row.saturating_sub(n);
                }
            }
            if s.contains("\x1b[2K") {
                self.ensure_row(self.cursor_row);
                self.lines[self.cursor_row].clear();
            }
            if s.contains("\x1b[J") {
                self.lines.truncate(self.cursor_row + 1);
            }
        } else {
            for c in s.chars() {
                match c {
                    '\n' => {
                        self.cursor_row += 1;
                        self.ensure_row(self.cursor_row);
                    }
                    _ => {
                        self.ensure_row(self.cursor_row);
                        self.lines[self.cursor_row].push(c);
                    }
                }
            }
        }
    }
}

impl Write for VirtualTerm {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        if !self.buf.is_empty() {
            let s = String::from_utf8(std::mem::take(&mut self.buf)).unwrap();
            self.process(&s);
        }
        Ok(())
    }
}

/// Clonable handle so the test can read back what the board wrote.
#[derive(Clone)]
struct SharedTerm(Arc<Mutex<VirtualTerm>>);

impl SharedTerm {
    fn new() -> Self {
        Self(Arc::new(Mutex::new(VirtualTerm::new())))
    }
}

impl Write for SharedTerm {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.0.lock().unwrap().flush()
    }
}

struct TestEnv {
    term: SharedTerm,
    board: TaskBoard,
}

impl TestEnv {
    fn new() -> Self {
        Self::with_board(|board| board)
    }

    fn with_board(f: impl FnOnce(TaskBoard) -> TaskBoard) -> Self {
        let term = SharedTerm::new();
        let board = f(TaskBoard::new()
            .writer(term.clone())
            .style(PlainStyle)
            .columns(|| 40));
        Self { term, board }
    }

    fn screen(&self) -> String {
        self.term.0.lock().unwrap().render()
    }
}

// -- Time formatting ---------------------------------------------------------

#[test]
fn format_time_pads_minutes_and_seconds() {
    assert_eq!(format_time(0.0), "0:00:00");
    assert_eq!(format_time(59.9), "0:00:59");
    assert_eq!(format_time(61.0), "0:01:01");
    assert_eq!(format_time(3599.0), "0:59:59");
    assert_eq!(format_time(3600.0), "1:00:00");
    assert_eq!(format_time(359999.0), "99:59:59");
}

#[test]
fn format_time_collapses_out_of_range_values() {
    assert_eq!(format_time(360000.0), "--:--:--");
    assert_eq!(format_time(f64::INFINITY), "--:--:--");
    assert_eq!(format_time(f64::NAN), "--:--:--");
    assert_eq!(format_time(-1.0), "--:--:--");
}

#[test]
fn time_remaining_shrinks_as_progress_grows() {
    assert_eq!(time_remaining(10.0, 0.0, 100.0), f64::INFINITY);
    assert_eq!(time_remaining(10.0, 25.0, 100.0), 30.0);
    assert_eq!(time_remaining(10.0, 50.0, 100.0), 10.0);
    assert_eq!(time_remaining(10.0, 100.0, 100.0), 0.0);

    let mut last = f64::INFINITY;
    for progress in 1..=100 {
        let eta = time_remaining(60.0, progress as f64, 100.0);
        assert!(eta <= last, "eta grew at progress {progress}");
        last = eta;
    }
}

// -- Progress bar ------------------------------------------------------------

#[test]
fn bar_lays_out_against_the_column_count() {
    let bar = ProgressBar::new(50.0, 100.0).columns(40);
    assert_eq!(
        bar.render(&PlainStyle),
        "█████████░░░░░░░░░ 50.00% (50 / 100)"
    );
}

#[test]
fn bar_segments_fill_exactly_the_available_width() {
    for percent in [0.0, 1.0, 9.9, 25.0, 50.0, 99.9, 100.0] {
        for columns in [1u16, 10, 24, 40, 120] {
            let bar = ProgressBar::new(percent, 100.0).columns(columns);
            let rendered = bar.render(&PlainStyle);
            let filled = rendered.chars().filter(|&c| c == '█').count();
            let empty = rendered.chars().filter(|&c| c == '░').count();
            let info_len = rendered.chars().count() - filled - empty;
            let width = (columns as usize).saturating_sub(info_len + 4);
            assert_eq!(filled + empty, width, "at {percent}% in {columns} columns");
        }
    }
}

#[test]
fn bar_percentage_is_clamped() {
    assert_eq!(ProgressBar::new(150.0, 100.0).percent(), 100.0);
    assert_eq!(ProgressBar::new(-5.0, 100.0).percent(), 0.0);
    assert_eq!(ProgressBar::new(5.0, 0.0).percent(), 0.0);
}

#[test]
fn spinner_wraps_around_its_glyph_set() {
    let mut spinner = Spinner::line();
    assert_eq!(spinner.frame(), "-");
    for _ in 0..4 {
        spinner.tick();
    }
    assert_eq!(spinner.frame(), "-");
}

// -- Task state machine ------------------------------------------------------

#[test]
fn progress_reaching_total_fulfills_once() {
    let env = TestEnv::new();
    let task = env.board.log_progress("t", 100.0, 0.0);

    for progress in [0.0, 25.0, 50.0, 75.0] {
        task.update(Update::progress(progress)).unwrap();
        assert_eq!(task.state(), Some(TaskState::Pending));
        assert!(task.completed().is_none());
    }

    task.update(Update::progress(100.0)).unwrap();
    assert_eq!(task.state(), Some(TaskState::Fulfilled));
    let stamped = task.completed().unwrap();

    // Terminal state and completion time are frozen; display values are not.
    task.update(Update::progress(120.0).status("late")).unwrap();
    assert_eq!(task.state(), Some(TaskState::Fulfilled));
    assert_eq!(task.completed(), Some(stamped));
    assert_eq!(task.progress(), Some(120.0));
}

#[test]
fn update_rejects_contract_violations() {
    let env = TestEnv::new();
    let task = env.board.log_progress("t", 100.0, 0.0);

    assert!(matches!(
        task.update(Update::progress(f64::NAN)),
        Err(UpdateError::NonFiniteProgress(_))
    ));
    assert_eq!(
        task.update(Update::progress(1.0).total(0.0)),
        Err(UpdateError::ZeroTotal)
    );
    // Failed updates leave the task untouched.
    assert_eq!(task.progress(), Some(0.0));
}

#[test]
fn manual_rejection_is_terminal() {
    let env = TestEnv::new();
    let task = env.board.log_task(TaskOptions::new("flaky"));
    task.reject();
    assert_eq!(task.state(), Some(TaskState::Rejected));
    task.fulfill();
    assert_eq!(task.state(), Some(TaskState::Rejected));
}

// -- Board rendering ---------------------------------------------------------

#[test]
fn fulfilled_task_renders_check_mark_without_bar() {
    let env = TestEnv::new();
    let task = env.board.log_progress("build", 10.0, 0.0);
    task.update(Update::progress(10.0)).unwrap();
    env.board.tick().unwrap();
    assert_eq!(env.screen(), "✓ build (0:00:00)\n");
}

#[test]
fn pending_task_renders_spinner_eta_and_bar() {
    let env = TestEnv::new();
    env.board.log_progress("dl", 100.0, 25.0);
    env.board.tick().unwrap();
    assert_eq!(
        env.screen(),
        "\\ dl (0:00:00) eta: 0:00:00\n ████░░░░░░░░░░░░░░ 25.00% (25 / 100)\n"
    );
}

#[test]
fn zero_progress_renders_unknown_eta() {
    let env = TestEnv::new();
    env.board.log_progress("slow", 100.0, 0.0);
    env.board.tick().unwrap();
    assert!(env.screen().contains("eta: --:--:--"));
}

#[test]
fn rejected_task_keeps_its_bar() {
    let env = TestEnv::new();
    let task = env.board.log_progress("dl", 100.0, 25.0);
    task.reject();
    env.board.tick().unwrap();
    let screen = env.screen();
    assert!(screen.starts_with("✗ dl ("));
    assert!(screen.contains('█'));
}

#[test]
fn status_text_is_replaceable_between_ticks() {
    let env = TestEnv::new();
    let task = env.board.log_task(TaskOptions::new("deploy").status("connecting"));
    env.board.tick().unwrap();
    assert_eq!(env.screen(), "\\ deploy (0:00:00) connecting\n");

    task.set_status("verifying");
    env.board.tick().unwrap();
    assert_eq!(env.screen(), "| deploy (0:00:00) verifying\n");
}

#[test]
fn buffered_logs_land_above_the_task_frame() {
    let env = TestEnv::new();
    env.board.log("hello");
    env.board.error("boom");
    env.board.log_task(TaskOptions::new("work"));
    env.board.tick().unwrap();
    assert_eq!(env.screen(), "hello\nboom\n\\ work (0:00:00)\n");

    // Logs were drained: the next tick replaces the frame but keeps them.
    env.board.tick().unwrap();
    assert_eq!(env.screen(), "hello\nboom\n| work (0:00:00)\n");
}

#[test]
fn initial_tasks_render_in_registration_order() {
    let env = TestEnv::with_board(|board| {
        board.with_tasks([TaskOptions::new("first"), TaskOptions::new("second")])
    });
    env.board.tick().unwrap();
    assert_eq!(env.screen(), "\\ first (0:00:00)\n\\ second (0:00:00)\n");
}

// -- Removal -----------------------------------------------------------------

#[test]
fn removing_an_absent_name_is_a_no_op() {
    let env = TestEnv::new();
    env.board.log_task(TaskOptions::new("x"));
    env.board.remove_task("nope");
    assert!(env.board.task("x").is_some());
}

#[test]
fn lookup_returns_first_match_in_insertion_order() {
    let env = TestEnv::new();
    let _first = env.board.log_progress("dup", 10.0, 1.0);
    let _second = env.board.log_progress("dup", 10.0, 2.0);
    assert_eq!(env.board.task("dup").unwrap().progress(), Some(1.0));
}

#[test]
fn past_removal_deadline_purges_on_tick() {
    let env = TestEnv::new();
    let task = env.board.log_task(TaskOptions::new("tmp"));
    task.remove_in(Duration::ZERO);
    env.board.tick().unwrap();
    assert!(env.board.task("tmp").is_none());
    assert_eq!(env.screen(), "");
}

#[test]
fn remove_when_complete_schedules_from_the_terminal_transition() {
    let env = TestEnv::new();
    let task = env.board.log_task(
        TaskOptions::new("auto")
            .progress(0.0, 1.0)
            .remove_when_complete(Duration::ZERO),
    );
    env.board.tick().unwrap();
    assert!(env.board.task("auto").is_some());

    task.update(Update::progress(1.0)).unwrap();
    env.board.tick().unwrap();
    assert!(env.board.task("auto").is_none());
}

#[test]
fn clear_tasks_empties_the_frame() {
    let env = TestEnv::new();
    env.board.log_task(TaskOptions::new("a"));
    env.board.log_task(TaskOptions::new("b"));
    env.board.tick().unwrap();
    env.board.clear_tasks();
    env.board.tick().unwrap();
    assert_eq!(env.screen(), "");
}

// -- Handles outliving their task --------------------------------------------

#[test]
fn handle_to_removed_task_is_inert() {
    let env = TestEnv::new();
    let task = env.board.log_task(TaskOptions::new("gone"));
    env.board.remove(&task);
    task.fulfill();
    assert_eq!(task.state(), None);
    assert_eq!(task.update(Update::progress(1.0)), Ok(()));
}

#[test]
fn handle_outliving_the_board_is_inert() {
    let env = TestEnv::new();
    let task = env.board.log_task(TaskOptions::new("orphan"));
    drop(env);
    task.fulfill();
    assert_eq!(task.state(), None);
    assert_eq!(task.completed(), None);
}

// -- Futures -----------------------------------------------------------------

#[tokio::test]
async fn resolving_promise_fulfills_its_task() {
    let env = TestEnv::new();
    let fut = env.board.log_promise("fetch", async { Ok::<_, &str>(42) });
    let task = env.board.task("fetch").unwrap();
    assert_eq!(task.state(), Some(TaskState::Pending));

    assert_eq!(fut.await, Ok(42));
    assert_eq!(task.state(), Some(TaskState::Fulfilled));
    assert!(task.completed().is_some());
}

#[tokio::test]
async fn failing_promise_rejects_its_task() {
    let env = TestEnv::new();
    let fut = env
        .board
        .log_promise("flaky", async { Err::<(), _>("connection reset") });
    assert_eq!(fut.await, Err("connection reset"));
    assert_eq!(env.board.task("flaky").unwrap().state(), Some(TaskState::Rejected));
}

#[tokio::test]
async fn promise_resolving_after_removal_is_tolerated() {
    let env = TestEnv::new();
    let fut = env.board.log_promise("detached", async { Ok::<_, ()>(()) });
    env.board.remove_task("detached");
    assert_eq!(fut.await, Ok(()));
    assert!(env.board.task("detached").is_none());
}

// -- Ticker lifecycle --------------------------------------------------------

#[test]
fn ticker_repaints_until_stopped() {
    let mut env = TestEnv::with_board(|board| board.interval(Duration::from_millis(5)));
    env.board.log_task(TaskOptions::new("bg"));
    env.board.start();
    std::thread::sleep(Duration::from_millis(40));
    env.board.stop();
    assert!(env.screen().contains("bg"));
}

#[test]
fn stop_without_start_still_flushes_a_final_frame() {
    let mut env = TestEnv::new();
    env.board.log_task(TaskOptions::new("once"));
    env.board.stop();
    assert!(env.screen().contains("once"));
}

// -- Tracing integration -----------------------------------------------------

#[cfg(feature = "tracing")]
#[test]
fn tracing_events_land_in_the_log_buffer() {
    use tracing_subscriber::layer::SubscriberExt;

    let env = TestEnv::new();
    let subscriber = tracing_subscriber::registry().with(env.board.layer());
    tracing::subscriber::with_default(subscriber, || {
        tracing::info!("starting");
        tracing::error!("failed to bind port");
    });

    env.board.tick().unwrap();
    assert_eq!(env.screen(), "starting\nfailed to bind port\n");
}

use std::sync::{Mutex, Weak};

use tracing::{Level, Subscriber};
use tracing_subscriber::Layer;

use crate::board::{BoardInner, LogKind};

/// A `tracing` layer that routes event messages into a board's log buffer.
///
/// This is how application output reaches the display without corrupting the
/// in-place repaint: the board buffers every line and flushes the batch above
/// the task block at the next tick. `ERROR` events are buffered as error
/// lines; every other level as plain lines. Spans are ignored.
///
/// The layer holds a weak reference, so it can outlive its board; events
/// arriving after the board is dropped are discarded.
///
/// ```rust,ignore
/// use tracing_subscriber::layer::SubscriberExt;
/// use tracing_subscriber::util::SubscriberInitExt;
///
/// let mut board = TaskBoard::new();
/// tracing_subscriber::registry().with(board.layer()).init();
/// board.start();
///
/// tracing::info!("rendered above the task list");
/// tracing::error!("rendered in the error style");
/// ```
pub struct BoardLayer {
    board: Weak<Mutex<BoardInner>>,
}

impl BoardLayer {
    pub(crate) fn new(board: Weak<Mutex<BoardInner>>) -> Self {
        Self { board }
    }
}

impl<S: Subscriber> Layer<S> for BoardLayer {
    fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
        let Some(board) = self.board.upgrade() else {
            return;
        };
        let mut message = String::new();
        event.record(&mut MessageVisitor(&mut message));
        let kind = match *event.metadata().level() {
            Level::ERROR => LogKind::Error,
            _ => LogKind::Info,
        };
        board.lock().unwrap().push_log(kind, message);
    }
}

struct MessageVisitor<'a>(&'a mut String);

impl tracing::field::Visit for MessageVisitor<'_> {
    fn record_debug(&mut self, field: &tracing::field::Field, value: &dyn std::fmt::Debug) {
        if field.name() == "message" {
            *self.0 = format!("{:?}", value);
        }
    }
}

#![doc = include_str!("../README.md")]

pub(crate) mod board;
pub(crate) mod style;
pub(crate) mod task;
pub(crate) mod writer;

pub mod util;

#[cfg(feature = "tracing")]
pub(crate) mod tracing;

#[cfg(test)]
mod test;

/// Re-exports of all public types and traits.
pub mod prelude {
    pub use crate::board::{LogKind, TaskBoard, TaskHandle};
    pub use crate::style::{AnsiStyle, PlainStyle, Style};
    pub use crate::task::{TaskId, TaskOptions, TaskState, Update, UpdateError};
    #[cfg(feature = "tracing")]
    pub use crate::tracing::BoardLayer;
    pub use crate::util::Spinner;
}

pub use crate::prelude::*;

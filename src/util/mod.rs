//! Rendering utilities for task output.
//!
//! # Progress bar
//!
//! [`ProgressBar`] lays the info text out first and fills the remaining
//! terminal width:
//!
//! ```rust,ignore
//! let bar = ProgressBar::new(45.0, 100.0).columns(60);
//! // => ██████████████░░░░░░░░░░░░░░░░░░  45.00% (45 / 100)
//!
//! // Custom fill characters:
//! let bar = ProgressBar::new(3.0, 10.0).chars('#', '.');
//! ```
//!
//! # Spinner
//!
//! [`Spinner`] cycles through animation frames on each [`tick`](Spinner::tick):
//!
//! ```rust,ignore
//! let s = Spinner::line();  // - \ | /  (default)
//! let s = Spinner::dots();  // ⠋ ⠙ ⠹ ...
//! let s = Spinner::custom(&["🌑", "🌒", "🌓", "🌔", "🌕"]);
//! ```
//!
//! # Time
//!
//! [`format_time`] renders fractional seconds as `H:MM:SS`, guarding
//! non-finite and absurd values with `--:--:--`. [`time_remaining`]
//! extrapolates an ETA from elapsed time and progress.

mod progress_bar;
mod spinner;
mod time;

pub use progress_bar::*;
pub use spinner::*;
pub use time::*;

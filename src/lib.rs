//! PhotoSmith image filter engine.
//!
//! An [`Image`] is a plain RGB buffer. Filters live under [`ops`]; the
//! [`Filter`] catalog names every one of them and is what both the CLI and
//! [`Document`] dispatch through. Long-running filters honour a
//! [`CancelToken`] and report progress through a [`Job`].

#[macro_use]
pub mod logger;

pub mod canvas;
pub mod cli;
pub mod color;
pub mod components;
pub mod config;
pub mod error;
pub mod io;
pub mod ops;
pub mod project;

pub use canvas::Image;
pub use color::Rgb;
pub use components::history::HistoryManager;
pub use config::EngineConfig;
pub use error::FilterError;
pub use ops::catalog::Filter;
pub use ops::progress::{CancelToken, Job, LogSink, NoopSink, Outcome, ProgressSink, StatusSink};
pub use ops::transform::MergeMode;
pub use project::{Document, FilterStatus};

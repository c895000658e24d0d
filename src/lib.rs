//! Animated terminal spinners and progress bars
//!
//! Components draw a single line, redrawn on a timer:
//! - [`Spinner`] cycles through frame glyphs
//! - [`Progress`] draws a percentage bar
//!
//! Both write through a [`Sink`](sink::Sink) and are driven by a
//! [`Scheduler`](scheduler::Scheduler), so tests can swap in
//! [`CaptureSink`](sink::CaptureSink) and
//! [`ManualScheduler`](scheduler::ManualScheduler).

pub mod cli;
pub mod color;
pub mod component;
pub mod config;
pub mod error;
pub mod logging;
pub mod scheduler;
pub mod sink;

pub use color::{background_code, foreground_code, style_code, StyleFlags};
pub use component::{
    Animated, Appearance, Backend, BarStyle, Progress, ProgressOptions, RenderStrategy, Spinner,
    SpinnerOptions, SpinnerStyle, Status, Styled,
};
pub use error::{ConfigError, Result};
pub use scheduler::{ManualScheduler, Scheduler, ThreadScheduler, Timer};
pub use sink::{CaptureSink, Sink, StdoutSink};

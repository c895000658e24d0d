//! Animated single-line components
//!
//! [`Animated`] owns the lifecycle shared by every component:
//! - `start` renders once and registers a recurring render with the scheduler
//! - mutations re-render immediately while running
//! - `stop` and the status calls release the timer and finish the line
//!
//! What gets drawn is decided by a [`RenderStrategy`]. [`Spinner`] cycles
//! through frames, [`Progress`] draws a percentage bar.

mod progress;
mod spinner;

pub use progress::{render_bar, BarStyle, PercentBar, Progress, ProgressOptions, BAR_WIDTH};
pub use spinner::{Spinner, SpinnerFrames, SpinnerOptions, SpinnerStyle};

use crate::color::{self, StyleFlags, CLEAR_LINE, RESET};
use crate::scheduler::{Scheduler, ThreadScheduler, Timer};
use crate::sink::{Sink, StdoutSink};
use log::{debug, trace};
use std::fmt;
use std::ops::ControlFlow;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{Duration, Instant};

pub const DEFAULT_INTERVAL: Duration = Duration::from_millis(80);
/// Shorter intervals are raised to this; a zero interval would redraw in a busy loop.
pub const MIN_INTERVAL: Duration = Duration::from_millis(1);
pub const DEFAULT_COLOR: &str = "cyan";

/// Decides what a component draws in front of its text.
pub trait RenderStrategy: Send + 'static {
    /// Called every time the component starts.
    fn restart(&mut self) {}

    /// Content for the next render, or `None` to skip it.
    fn head(&mut self) -> Option<String>;
}

/// Colors, styles and pacing shared by every component.
#[derive(Debug, Clone, PartialEq)]
pub struct Appearance {
    pub color: String,
    pub background_color: Option<String>,
    pub show: bool,
    pub flags: StyleFlags,
    pub interval: Duration,
}

impl Default for Appearance {
    fn default() -> Self {
        Self {
            color: DEFAULT_COLOR.to_string(),
            background_color: None,
            show: true,
            flags: StyleFlags::default(),
            interval: DEFAULT_INTERVAL,
        }
    }
}

impl Appearance {
    /// Style, background and foreground codes in the order they are written.
    pub fn prefix(&self) -> String {
        let background = self
            .background_color
            .as_deref()
            .map(color::background_code)
            .unwrap_or_default();
        format!(
            "{}{}{}",
            color::style_code(self.flags),
            background,
            color::foreground_code(&self.color)
        )
    }
}

/// Builder methods for anything that carries an [`Appearance`].
pub trait Styled: Sized {
    fn appearance_mut(&mut self) -> &mut Appearance;

    fn color(mut self, spec: impl Into<String>) -> Self {
        self.appearance_mut().color = spec.into();
        self
    }

    fn background_color(mut self, spec: impl Into<String>) -> Self {
        self.appearance_mut().background_color = Some(spec.into());
        self
    }

    fn show(mut self, show: bool) -> Self {
        self.appearance_mut().show = show;
        self
    }

    fn bold(mut self, on: bool) -> Self {
        self.appearance_mut().flags.bold = on;
        self
    }

    fn italic(mut self, on: bool) -> Self {
        self.appearance_mut().flags.italic = on;
        self
    }

    fn underline(mut self, on: bool) -> Self {
        self.appearance_mut().flags.underline = on;
        self
    }

    fn interval(mut self, interval: Duration) -> Self {
        self.appearance_mut().interval = interval;
        self
    }
}

/// Where components write and who drives their timers.
#[derive(Clone)]
pub struct Backend {
    pub sink: Arc<dyn Sink>,
    pub scheduler: Arc<dyn Scheduler>,
}

impl Backend {
    pub fn new<K, S>(sink: K, scheduler: S) -> Self
    where
        K: Sink + 'static,
        S: Scheduler + 'static,
    {
        Self {
            sink: Arc::new(sink),
            scheduler: Arc::new(scheduler),
        }
    }
}

impl Default for Backend {
    fn default() -> Self {
        Self::new(StdoutSink::new(), ThreadScheduler::new())
    }
}

impl fmt::Debug for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Backend").finish_non_exhaustive()
    }
}

/// Final state a component can be finished with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
    Warning,
    Info,
}

impl Status {
    pub fn symbol(self) -> &'static str {
        match self {
            Status::Success => "✔",
            Status::Failure => "✖",
            Status::Warning => "⚠",
            Status::Info => "ℹ",
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            Status::Success => "green",
            Status::Failure => "red",
            Status::Warning => "yellow",
            Status::Info => "blue",
        }
    }

    /// Only the symbol is colored.
    pub fn line(self, message: &str) -> String {
        format!(
            "{}{}{} {}\n",
            color::foreground_code(self.color()),
            self.symbol(),
            RESET,
            message
        )
    }
}

struct Look {
    prefix: String,
    show: bool,
    interval: Duration,
    backend: Backend,
}

struct LineState<S> {
    text: String,
    running: bool,
    started_at: Option<Instant>,
    // Some iff running.
    timer: Option<Timer>,
    strategy: S,
}

/// A single terminal line redrawn on a timer.
pub struct Animated<S: RenderStrategy> {
    state: Arc<Mutex<LineState<S>>>,
    look: Arc<Look>,
}

impl<S: RenderStrategy> Animated<S> {
    pub fn with_strategy(
        text: impl Into<String>,
        strategy: S,
        appearance: &Appearance,
        backend: Backend,
    ) -> Self {
        Self {
            state: Arc::new(Mutex::new(LineState {
                text: text.into(),
                running: false,
                started_at: None,
                timer: None,
                strategy,
            })),
            look: Arc::new(Look {
                prefix: appearance.prefix(),
                show: appearance.show,
                interval: appearance.interval.max(MIN_INTERVAL),
                backend,
            }),
        }
    }

    /// Starts animating. Does nothing if already running.
    pub fn start(&self, text: Option<&str>) {
        let mut state = self.lock();
        if state.running {
            return;
        }
        if let Some(text) = text {
            state.text = text.to_string();
        }

        state.running = true;
        state.started_at = Some(Instant::now());
        state.strategy.restart();
        render(&mut state, &self.look);

        let task = tick_task(Arc::downgrade(&self.state), self.look.clone());
        state.timer = Some(self.look.backend.scheduler.every(self.look.interval, task));
        debug!("Started line '{}' every {:?}", state.text, self.look.interval);
    }

    /// Stops animating and clears the line. Does nothing if not running.
    pub fn stop(&self) {
        let timer = {
            let mut state = self.lock();
            if !state.running {
                return;
            }
            state.running = false;
            state.started_at = None;
            state.timer.take()
        };

        // Cancelled outside the lock: the tick task may be waiting on it.
        if let Some(timer) = timer {
            timer.cancel();
        }
        self.look.backend.sink.write(&format!("\r{CLEAR_LINE}"));
        debug!("Stopped line");
    }

    /// Stops and prints a status line with `text`, or the current text.
    pub fn finish(&self, status: Status, text: Option<&str>) {
        self.stop();
        let message = match text {
            Some(text) => text.to_string(),
            None => self.text(),
        };
        self.look.backend.sink.write(&status.line(&message));
        debug!("Finished line with {:?}", status);
    }

    pub fn succeed(&self, text: Option<&str>) {
        self.finish(Status::Success, text);
    }

    pub fn fail(&self, text: Option<&str>) {
        self.finish(Status::Failure, text);
    }

    pub fn warn(&self, text: Option<&str>) {
        self.finish(Status::Warning, text);
    }

    pub fn info(&self, text: Option<&str>) {
        self.finish(Status::Info, text);
    }

    /// Replaces the text, redrawing right away when running.
    pub fn update_text(&self, text: &str) {
        let mut state = self.lock();
        state.text = text.to_string();
        render(&mut state, &self.look);
    }

    pub fn is_running(&self) -> bool {
        self.lock().running
    }

    pub fn text(&self) -> String {
        self.lock().text.clone()
    }

    /// Time since the last `start`, `None` while idle.
    pub fn elapsed(&self) -> Option<Duration> {
        self.lock().started_at.map(|started| started.elapsed())
    }

    /// Applies `change` to the strategy and redraws when running.
    pub(crate) fn modify<T>(&self, change: impl FnOnce(&mut S) -> T) -> T {
        let mut state = self.lock();
        let result = change(&mut state.strategy);
        render(&mut state, &self.look);
        result
    }

    pub(crate) fn inspect<T>(&self, read: impl FnOnce(&S) -> T) -> T {
        read(&self.lock().strategy)
    }

    fn lock(&self) -> MutexGuard<'_, LineState<S>> {
        lock_state(&self.state)
    }
}

impl<S: RenderStrategy> Drop for Animated<S> {
    fn drop(&mut self) {
        let timer = {
            let mut state = self.lock();
            state.running = false;
            state.timer.take()
        };
        if let Some(timer) = timer {
            timer.cancel();
        }
    }
}

impl<S: RenderStrategy> fmt::Debug for Animated<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.lock();
        f.debug_struct("Animated")
            .field("text", &state.text)
            .field("running", &state.running)
            .finish_non_exhaustive()
    }
}

// A render that panicked on the timer thread poisons the lock; the state is
// still consistent, so keep going.
fn lock_state<S>(state: &Mutex<LineState<S>>) -> MutexGuard<'_, LineState<S>> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn tick_task<S: RenderStrategy>(
    state: Weak<Mutex<LineState<S>>>,
    look: Arc<Look>,
) -> crate::scheduler::Task {
    Box::new(move || {
        let Some(state) = state.upgrade() else {
            return ControlFlow::Break(());
        };
        let mut state = lock_state(&state);
        if !state.running {
            return ControlFlow::Break(());
        }
        trace!("Tick for line '{}'", state.text);
        render(&mut state, &look);
        ControlFlow::Continue(())
    })
}

fn render<S: RenderStrategy>(state: &mut LineState<S>, look: &Look) {
    if !state.running || !look.show {
        return;
    }
    let Some(head) = state.strategy.head() else {
        return;
    };
    look.backend.sink.write(&format!(
        "\r{CLEAR_LINE}{}{} {}{RESET}",
        look.prefix, head, state.text
    ));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use crate::sink::CaptureSink;
    use pretty_assertions::assert_eq;

    struct Counter(usize);

    impl RenderStrategy for Counter {
        fn restart(&mut self) {
            self.0 = 0;
        }

        fn head(&mut self) -> Option<String> {
            self.0 += 1;
            Some(self.0.to_string())
        }
    }

    fn counter_line(appearance: &Appearance) -> (Animated<Counter>, CaptureSink, ManualScheduler) {
        let sink = CaptureSink::new();
        let scheduler = ManualScheduler::new();
        let line = Animated::with_strategy(
            "working",
            Counter(7),
            appearance,
            Backend::new(sink.clone(), scheduler.clone()),
        );
        (line, sink, scheduler)
    }

    #[test]
    fn test_appearance_prefix_order() {
        let appearance = Appearance {
            color: "red".to_string(),
            background_color: Some("blue".to_string()),
            flags: StyleFlags {
                bold: true,
                ..StyleFlags::default()
            },
            ..Appearance::default()
        };
        assert_eq!(appearance.prefix(), "\x1b[1m\x1b[44m\x1b[31m");
        assert_eq!(Appearance::default().prefix(), "\x1b[36m");
    }

    #[test]
    fn test_status_lines_color_only_the_symbol() {
        assert_eq!(Status::Success.line("done"), "\x1b[32m✔\x1b[0m done\n");
        assert_eq!(Status::Failure.line("x"), "\x1b[31m✖\x1b[0m x\n");
        assert_eq!(Status::Warning.line("x"), "\x1b[33m⚠\x1b[0m x\n");
        assert_eq!(Status::Info.line("x"), "\x1b[34mℹ\x1b[0m x\n");
    }

    #[test]
    fn test_start_renders_immediately_and_on_each_tick() {
        let (line, sink, scheduler) = counter_line(&Appearance::default());

        line.start(None);
        assert_eq!(sink.writes(), vec!["\r\x1b[K\x1b[36m1 working\x1b[0m".to_string()]);
        assert_eq!(scheduler.intervals(), vec![DEFAULT_INTERVAL]);

        scheduler.advance(2);
        assert_eq!(sink.len(), 3);
        assert!(sink.writes()[2].contains("3 working"));
    }

    #[test]
    fn test_start_is_idempotent() {
        let (line, sink, scheduler) = counter_line(&Appearance::default());

        line.start(Some("first"));
        line.start(Some("second"));

        assert_eq!(scheduler.pending(), 1);
        assert_eq!(sink.len(), 1);
        assert_eq!(line.text(), "first");
    }

    #[test]
    fn test_stop_releases_timer_and_clears_line_once() {
        let (line, sink, scheduler) = counter_line(&Appearance::default());

        line.start(None);
        assert!(line.elapsed().is_some());
        line.stop();
        line.stop();

        assert!(!line.is_running());
        assert!(line.elapsed().is_none());
        assert_eq!(scheduler.pending(), 0);
        assert_eq!(sink.writes().last().map(String::as_str), Some("\r\x1b[K"));
        assert_eq!(sink.len(), 2);
    }

    #[test]
    fn test_hidden_line_never_draws_frames() {
        let appearance = Appearance {
            show: false,
            ..Appearance::default()
        };
        let (line, sink, scheduler) = counter_line(&appearance);

        line.start(None);
        scheduler.advance(3);
        line.update_text("still hidden");
        assert!(sink.is_empty());

        line.succeed(None);
        assert_eq!(
            sink.writes(),
            vec!["\r\x1b[K".to_string(), Status::Success.line("still hidden")]
        );
    }

    #[test]
    fn test_update_text_redraws_only_while_running() {
        let (line, sink, _scheduler) = counter_line(&Appearance::default());

        line.update_text("idle");
        assert!(sink.is_empty());

        line.start(None);
        line.update_text("busy");
        assert_eq!(sink.len(), 2);
        assert!(sink.writes()[1].ends_with("busy\x1b[0m"));
    }

    #[test]
    fn test_finish_without_start_still_prints_status() {
        let (line, sink, _scheduler) = counter_line(&Appearance::default());

        line.info(Some("nothing to do"));
        assert_eq!(sink.writes(), vec![Status::Info.line("nothing to do")]);
    }

    #[test]
    fn test_zero_interval_is_raised_to_minimum() {
        let appearance = Appearance {
            interval: Duration::ZERO,
            ..Appearance::default()
        };
        let (line, _sink, scheduler) = counter_line(&appearance);

        line.start(None);
        assert_eq!(scheduler.intervals(), vec![MIN_INTERVAL]);
    }

    #[test]
    fn test_dropping_running_line_releases_timer() {
        let (line, _sink, scheduler) = counter_line(&Appearance::default());

        line.start(None);
        assert_eq!(scheduler.pending(), 1);
        drop(line);
        assert_eq!(scheduler.pending(), 0);
    }
}

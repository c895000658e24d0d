use super::{Animated, Appearance, Backend, RenderStrategy, Styled};
use crate::error::ConfigError;
use log::warn;
use std::fmt;
use std::str::FromStr;

/// Named frame sequences.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SpinnerStyle {
    #[default]
    Dots,
    Line,
    Arc,
    Circle,
    Arrow,
    Bounce,
    Star,
}

impl SpinnerStyle {
    pub const ALL: [SpinnerStyle; 7] = [
        SpinnerStyle::Dots,
        SpinnerStyle::Line,
        SpinnerStyle::Arc,
        SpinnerStyle::Circle,
        SpinnerStyle::Arrow,
        SpinnerStyle::Bounce,
        SpinnerStyle::Star,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SpinnerStyle::Dots => "dots",
            SpinnerStyle::Line => "line",
            SpinnerStyle::Arc => "arc",
            SpinnerStyle::Circle => "circle",
            SpinnerStyle::Arrow => "arrow",
            SpinnerStyle::Bounce => "bounce",
            SpinnerStyle::Star => "star",
        }
    }

    pub fn frames(self) -> &'static [&'static str] {
        match self {
            SpinnerStyle::Dots => &["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"],
            SpinnerStyle::Line => &["-", "\\", "|", "/"],
            SpinnerStyle::Arc => &["◜", "◠", "◝", "◞", "◡", "◟"],
            SpinnerStyle::Circle => &["◐", "◓", "◑", "◒"],
            SpinnerStyle::Arrow => &["←", "↖", "↑", "↗", "→", "↘", "↓", "↙"],
            SpinnerStyle::Bounce => &["⠁", "⠂", "⠄", "⠂"],
            SpinnerStyle::Star => &["✶", "✸", "✹", "✺", "✹", "✷"],
        }
    }

    /// Like `from_str`, but unknown names fall back to the default style.
    pub fn lookup(name: &str) -> Self {
        name.parse().unwrap_or_else(|e| {
            warn!("{}; using '{}'", e, SpinnerStyle::default());
            SpinnerStyle::default()
        })
    }
}

impl fmt::Display for SpinnerStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SpinnerStyle {
    type Err = ConfigError;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        SpinnerStyle::ALL
            .into_iter()
            .find(|style| style.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ConfigError::UnknownStyle {
                name: name.to_string(),
                expected: SpinnerStyle::ALL.map(SpinnerStyle::name).join(", "),
            })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpinnerOptions {
    pub text: String,
    pub style: SpinnerStyle,
    /// Overrides the frames of `style` when set. May be empty.
    pub frames: Option<Vec<String>>,
    pub appearance: Appearance,
}

impl SpinnerOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn style(mut self, style: SpinnerStyle) -> Self {
        self.style = style;
        self
    }

    pub fn frames<I, T>(mut self, frames: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<String>,
    {
        self.frames = Some(frames.into_iter().map(Into::into).collect());
        self
    }

    fn resolved_frames(&self) -> Vec<String> {
        match &self.frames {
            Some(frames) => frames.clone(),
            None => self.style.frames().iter().map(|f| f.to_string()).collect(),
        }
    }
}

impl Styled for SpinnerOptions {
    fn appearance_mut(&mut self) -> &mut Appearance {
        &mut self.appearance
    }
}

/// Cycles through frames, one per render.
#[derive(Debug, Clone)]
pub struct SpinnerFrames {
    frames: Vec<String>,
    index: usize,
}

impl SpinnerFrames {
    pub fn new(frames: Vec<String>) -> Self {
        Self { frames, index: 0 }
    }
}

impl RenderStrategy for SpinnerFrames {
    fn restart(&mut self) {
        self.index = 0;
    }

    fn head(&mut self) -> Option<String> {
        if self.frames.is_empty() {
            return None;
        }
        let frame = self.frames[self.index % self.frames.len()].clone();
        self.index = self.index.wrapping_add(1);
        Some(frame)
    }
}

pub type Spinner = Animated<SpinnerFrames>;

impl Animated<SpinnerFrames> {
    /// Spinner drawing to stdout, animated on its own thread.
    pub fn new(options: SpinnerOptions) -> Self {
        Self::with_backend(options, Backend::default())
    }

    pub fn with_backend(options: SpinnerOptions, backend: Backend) -> Self {
        let frames = SpinnerFrames::new(options.resolved_frames());
        Self::with_strategy(options.text, frames, &options.appearance, backend)
    }

    /// Number of frames rendered since the last start.
    pub fn frame_index(&self) -> usize {
        self.inspect(|frames| frames.index)
    }

    pub fn frames(&self) -> Vec<String> {
        self.inspect(|frames| frames.frames.clone())
    }
}

impl Default for Animated<SpinnerFrames> {
    fn default() -> Self {
        Self::new(SpinnerOptions::default())
    }
}

use super::{Animated, Appearance, Backend, RenderStrategy, Styled};
use crate::error::{ConfigError, Result};
use log::{debug, warn};
use std::fmt;
use std::str::FromStr;

/// Cells in a rendered bar.
pub const BAR_WIDTH: usize = 20;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BarStyle {
    #[default]
    Bar,
    Blocks,
    Dots,
}

impl BarStyle {
    pub const ALL: [BarStyle; 3] = [BarStyle::Bar, BarStyle::Blocks, BarStyle::Dots];

    pub fn name(self) -> &'static str {
        match self {
            BarStyle::Bar => "bar",
            BarStyle::Blocks => "blocks",
            BarStyle::Dots => "dots",
        }
    }

    /// Filled and empty glyphs.
    pub fn glyphs(self) -> (char, char) {
        match self {
            BarStyle::Bar => ('█', '░'),
            BarStyle::Blocks => ('■', '□'),
            BarStyle::Dots => ('●', '○'),
        }
    }
}

impl fmt::Display for BarStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BarStyle {
    type Err = ConfigError;

    fn from_str(name: &str) -> std::result::Result<Self, Self::Err> {
        BarStyle::ALL
            .into_iter()
            .find(|style| style.name().eq_ignore_ascii_case(name.trim()))
            .ok_or_else(|| ConfigError::UnknownStyle {
                name: name.to_string(),
                expected: BarStyle::ALL.map(BarStyle::name).join(", "),
            })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressOptions {
    pub text: String,
    pub total: f64,
    pub current: Option<f64>,
    pub style: BarStyle,
    pub appearance: Appearance,
}

impl ProgressOptions {
    pub fn new(total: f64) -> Self {
        Self {
            text: String::new(),
            total,
            current: None,
            style: BarStyle::default(),
            appearance: Appearance::default(),
        }
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn current(mut self, current: f64) -> Self {
        self.current = Some(current);
        self
    }

    pub fn style(mut self, style: BarStyle) -> Self {
        self.style = style;
        self
    }

    /// Sets the style by name, rejecting anything but `bar`, `blocks` and `dots`.
    pub fn style_name(self, name: &str) -> Result<Self> {
        Ok(self.style(name.parse()?))
    }

    fn validate(&self) -> Result<PercentBar> {
        if !self.total.is_finite() || self.total <= 0.0 {
            return Err(ConfigError::InvalidTotal(self.total));
        }
        let current = match self.current {
            Some(current) if !current.is_finite() => {
                return Err(ConfigError::InvalidCurrent(current))
            }
            Some(current) => current.clamp(0.0, self.total),
            None => 0.0,
        };
        Ok(PercentBar {
            total: self.total,
            current,
            style: self.style,
        })
    }
}

impl Styled for ProgressOptions {
    fn appearance_mut(&mut self) -> &mut Appearance {
        &mut self.appearance
    }
}

/// Draws `current / total` as a fixed-width bar followed by the percentage.
#[derive(Debug, Clone, PartialEq)]
pub struct PercentBar {
    total: f64,
    current: f64,
    style: BarStyle,
}

impl PercentBar {
    pub fn percentage(&self) -> f64 {
        (self.current / self.total * 100.0).clamp(0.0, 100.0)
    }

    fn set(&mut self, value: f64) {
        self.current = value.clamp(0.0, self.total);
    }
}

impl RenderStrategy for PercentBar {
    fn head(&mut self) -> Option<String> {
        let percentage = self.percentage();
        // Ties round away from zero, so 0.25% reads 0.3%.
        let shown = (percentage * 10.0).round() / 10.0;
        Some(format!("{} {:.1}%", render_bar(percentage, self.style), shown))
    }
}

/// A `BAR_WIDTH` cell bar with `round(percentage / 100 * BAR_WIDTH)` cells filled.
pub fn render_bar(percentage: f64, style: BarStyle) -> String {
    let (filled_glyph, empty_glyph) = style.glyphs();
    let fraction = (percentage / 100.0).clamp(0.0, 1.0);
    let filled = ((fraction * BAR_WIDTH as f64).round() as usize).min(BAR_WIDTH);

    std::iter::repeat(filled_glyph)
        .take(filled)
        .chain(std::iter::repeat(empty_glyph).take(BAR_WIDTH - filled))
        .collect()
}

pub type Progress = Animated<PercentBar>;

impl Animated<PercentBar> {
    /// Progress bar drawing to stdout, animated on its own thread.
    pub fn new(options: ProgressOptions) -> Result<Self> {
        Self::with_backend(options, Backend::default())
    }

    pub fn with_backend(options: ProgressOptions, backend: Backend) -> Result<Self> {
        let bar = options.validate()?;
        debug!(
            "Created progress bar: total={}, current={}, style={}",
            bar.total, bar.current, bar.style
        );
        Ok(Self::with_strategy(
            options.text,
            bar,
            &options.appearance,
            backend,
        ))
    }

    /// Moves to `value`, clamped into `[0, total]`. Non-finite values are ignored.
    pub fn update(&self, value: f64) {
        if !value.is_finite() {
            warn!("Ignoring progress update to non-finite value {}", value);
            return;
        }
        self.modify(|bar| bar.set(value));
    }

    /// Moves by `amount`, which may be negative. Non-finite amounts are ignored.
    pub fn increment(&self, amount: f64) {
        if !amount.is_finite() {
            warn!("Ignoring progress increment by non-finite amount {}", amount);
            return;
        }
        self.modify(|bar| bar.set(bar.current + amount));
    }

    /// Fills the bar and finishes with a success line.
    pub fn complete(&self) {
        self.modify(|bar| bar.set(bar.total));
        self.succeed(None);
    }

    pub fn current(&self) -> f64 {
        self.inspect(|bar| bar.current)
    }

    pub fn total(&self) -> f64 {
        self.inspect(|bar| bar.total)
    }

    pub fn percentage(&self) -> f64 {
        self.inspect(PercentBar::percentage)
    }

    pub fn style(&self) -> BarStyle {
        self.inspect(|bar| bar.style)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bar_glyph_counts() {
        assert_eq!(render_bar(0.0, BarStyle::Bar), "░".repeat(20));
        assert_eq!(render_bar(100.0, BarStyle::Dots), "●".repeat(20));
        assert_eq!(
            render_bar(50.0, BarStyle::Blocks),
            format!("{}{}", "■".repeat(10), "□".repeat(10))
        );
        // 12.5% of 20 cells is 2.5, rounded away from zero.
        assert_eq!(render_bar(12.5, BarStyle::Bar).matches('█').count(), 3);
    }

    #[test]
    fn test_head_shows_one_decimal() {
        let mut bar = ProgressOptions::new(3.0).current(1.0).validate().unwrap();
        let head = bar.head().unwrap();
        assert!(head.ends_with(" 33.3%"), "head was {head}");
    }

    #[test]
    fn test_head_rounds_half_percent_up() {
        let mut bar = ProgressOptions::new(400.0).current(1.0).validate().unwrap();
        let head = bar.head().unwrap();
        assert!(head.ends_with(" 0.3%"), "head was {head}");

        let mut bar = ProgressOptions::new(400.0).current(3.0).validate().unwrap();
        let head = bar.head().unwrap();
        assert!(head.ends_with(" 0.8%"), "head was {head}");
    }

    #[test]
    fn test_validation() {
        assert_eq!(
            ProgressOptions::new(0.0).validate(),
            Err(ConfigError::InvalidTotal(0.0))
        );
        assert!(ProgressOptions::new(f64::INFINITY).validate().is_err());
        assert!(ProgressOptions::new(f64::NAN).validate().is_err());
        assert!(matches!(
            ProgressOptions::new(10.0).current(f64::NAN).validate(),
            Err(ConfigError::InvalidCurrent(_))
        ));

        let clamped = ProgressOptions::new(10.0).current(-3.0).validate().unwrap();
        assert_eq!(clamped.current, 0.0);
    }

    #[test]
    fn test_style_names() {
        assert_eq!("blocks".parse::<BarStyle>(), Ok(BarStyle::Blocks));
        assert!(ProgressOptions::new(1.0).style_name("stripes").is_err());
        assert_eq!(
            ProgressOptions::new(1.0).style_name("dots").unwrap().style,
            BarStyle::Dots
        );
    }
}

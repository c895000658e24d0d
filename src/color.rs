//! ANSI color and style encoding
//!
//! Translates a color specification into an SGR escape sequence. A spec is one of:
//! - a named color (`"cyan"`, `"brightRed"`, `"orange"`, ...)
//! - a hex code (`"#ff8800"`)
//! - an RGB triple (`"255,136,0"`)
//!
//! Nothing in here fails. Bad foreground specs fall back to cyan, bad
//! background specs produce an empty string.

use std::fmt::{self, Display, Formatter};

pub const CSI: &str = "\x1b[";
pub const RESET: &str = "\x1b[0m";
/// Erase from the cursor to the end of the line.
pub const CLEAR_LINE: &str = "\x1b[K";

/// Foreground used for names that are not in the table (cyan).
const FALLBACK_FOREGROUND: Paint = Paint::Basic(36);

/// Where a named color lives in the terminal palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paint {
    /// One of the 16 classic colors, stored as its foreground SGR number (30-37, 90-97).
    Basic(u8),
    /// Index into the 256-color palette.
    Indexed(u8),
    Rgb(u8, u8, u8),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SgrCode {
    Reset,
    Bold,
    Italic,
    Underline,
    Foreground(Paint),
    Background(Paint),
}

impl Display for SgrCode {
    #[rustfmt::skip]
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match *self {
            SgrCode::Reset                          => write!(f, "{CSI}0m"),
            SgrCode::Bold                           => write!(f, "{CSI}1m"),
            SgrCode::Italic                         => write!(f, "{CSI}3m"),
            SgrCode::Underline                      => write!(f, "{CSI}4m"),
            SgrCode::Foreground(Paint::Basic(n))    => write!(f, "{CSI}{n}m"),
            SgrCode::Background(Paint::Basic(n))    => write!(f, "{CSI}{}m", n + 10),
            SgrCode::Foreground(Paint::Indexed(i))  => write!(f, "{CSI}38;5;{i}m"),
            SgrCode::Background(Paint::Indexed(i))  => write!(f, "{CSI}48;5;{i}m"),
            SgrCode::Foreground(Paint::Rgb(r, g, b)) => write!(f, "{CSI}38;2;{r};{g};{b}m"),
            SgrCode::Background(Paint::Rgb(r, g, b)) => write!(f, "{CSI}48;2;{r};{g};{b}m"),
        }
    }
}

/// Every color name the encoder understands, in display order.
#[rustfmt::skip]
pub const NAMED_COLORS: [(&str, Paint); 25] = [
    // standard
    ("black",         Paint::Basic(30)),
    ("red",           Paint::Basic(31)),
    ("green",         Paint::Basic(32)),
    ("yellow",        Paint::Basic(33)),
    ("blue",          Paint::Basic(34)),
    ("magenta",       Paint::Basic(35)),
    ("cyan",          Paint::Basic(36)),
    ("white",         Paint::Basic(37)),
    ("gray",          Paint::Basic(90)),
    // bright
    ("brightBlack",   Paint::Basic(90)),
    ("brightRed",     Paint::Basic(91)),
    ("brightGreen",   Paint::Basic(92)),
    ("brightYellow",  Paint::Basic(93)),
    ("brightBlue",    Paint::Basic(94)),
    ("brightMagenta", Paint::Basic(95)),
    ("brightCyan",    Paint::Basic(96)),
    ("brightWhite",   Paint::Basic(97)),
    // extended
    ("orange",        Paint::Indexed(208)),
    ("pink",          Paint::Indexed(213)),
    ("purple",        Paint::Indexed(129)),
    ("brown",         Paint::Indexed(130)),
    ("lime",          Paint::Indexed(154)),
    ("teal",          Paint::Indexed(37)),
    ("navy",          Paint::Indexed(18)),
    ("gold",          Paint::Indexed(220)),
];

/// Bold, italic and underline toggles. Applied in that order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StyleFlags {
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
}

/// Case-insensitive, ignoring `_`, `-` and spaces.
pub fn lookup_named(name: &str) -> Option<Paint> {
    let wanted = normalize(name);
    NAMED_COLORS
        .iter()
        .find(|(candidate, _)| normalize(candidate) == wanted)
        .map(|(_, paint)| *paint)
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

/// Parses `#RRGGBB`. Anything else, including 3-digit shorthand, is rejected.
pub fn parse_hex(spec: &str) -> Option<(u8, u8, u8)> {
    let digits = spec.strip_prefix('#')?;
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let channel = |at: usize| u8::from_str_radix(&digits[at..at + 2], 16).ok();
    Some((channel(0)?, channel(2)?, channel(4)?))
}

/// Parses `"r,g,b"`. The whole spec is rejected when it does not split into
/// exactly three finite numbers; once split, each component is clamped on its own.
pub fn parse_rgb(spec: &str) -> Option<(u8, u8, u8)> {
    let parts = spec
        .split(',')
        .map(|part| part.trim().parse::<f64>().ok().filter(|v| v.is_finite()))
        .collect::<Option<Vec<f64>>>()?;

    match parts.as_slice() {
        [r, g, b] => Some((clamp_channel(*r), clamp_channel(*g), clamp_channel(*b))),
        _ => None,
    }
}

/// Rounds and clamps into `0..=255`. A value that rounds to NaN becomes 0.
pub fn clamp_channel(value: f64) -> u8 {
    let rounded = value.round();
    if rounded.is_nan() {
        return 0;
    }
    rounded.clamp(0.0, 255.0) as u8
}

fn resolve(spec: &str) -> Option<Paint> {
    if spec.starts_with('#') {
        return parse_hex(spec).map(|(r, g, b)| Paint::Rgb(r, g, b));
    }
    if spec.contains(',') {
        return parse_rgb(spec).map(|(r, g, b)| Paint::Rgb(r, g, b));
    }
    lookup_named(spec)
}

pub fn foreground_code(spec: &str) -> String {
    if spec.starts_with('#') || spec.contains(',') {
        return resolve(spec)
            .map(|paint| SgrCode::Foreground(paint).to_string())
            .unwrap_or_default();
    }

    let paint = lookup_named(spec).unwrap_or(FALLBACK_FOREGROUND);
    SgrCode::Foreground(paint).to_string()
}

pub fn background_code(spec: &str) -> String {
    resolve(spec)
        .map(|paint| SgrCode::Background(paint).to_string())
        .unwrap_or_default()
}

pub fn style_code(flags: StyleFlags) -> String {
    let mut code = String::new();
    if flags.bold {
        code.push_str(&SgrCode::Bold.to_string());
    }
    if flags.italic {
        code.push_str(&SgrCode::Italic.to_string());
    }
    if flags.underline {
        code.push_str(&SgrCode::Underline.to_string());
    }
    code
}

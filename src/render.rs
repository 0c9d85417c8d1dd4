//! Renderer boundary: what a renderer receives and a plain-text reference renderer.

use std::fmt::{self, Write};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{CalendarCell, WeekdayLabel, panels};

/// Draws mapped cells into some visual artifact.
///
/// Implementations group cells by month-year label, use the weekday as the
/// column (Monday first) and week of month as the row (row 1 on top), and
/// color by value on a scale centered at zero.
pub trait Renderer {
    type Output;
    type Error;

    /// Renders the full ordered cell sequence into one artifact.
    ///
    /// # Errors
    /// Implementation defined.
    fn render(&mut self, cells: &[CalendarCell], options: &RenderOptions) -> Result<Self::Output, Self::Error>;
}

/// Error type for color parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ColorError {
    #[error("Invalid hex color: {0} (expected #rrggbb)")]
    InvalidHex(String),

    #[error("Unknown color name: {0}")]
    UnknownName(String),
}

/// A 24-bit color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const RED: Self = Self::new(255, 0, 0);
    pub const WHITE: Self = Self::new(255, 255, 255);
    pub const GREEN: Self = Self::new(0, 255, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    fn named(name: &str) -> Option<Self> {
        let rgb = match name {
            "black" => Self::new(0, 0, 0),
            "white" => Self::WHITE,
            "red" => Self::RED,
            "green" => Self::GREEN,
            "blue" => Self::new(0, 0, 255),
            "yellow" => Self::new(255, 255, 0),
            "orange" => Self::new(255, 165, 0),
            "grey" | "gray" => Self::new(128, 128, 128),
            _ => return None,
        };
        Some(rgb)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl FromStr for Rgb {
    type Err = ColorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let Some(hex) = trimmed.strip_prefix('#') else {
            return Self::named(&trimmed.to_ascii_lowercase()).ok_or_else(|| ColorError::UnknownName(s.to_owned()));
        };

        if hex.len() != 6 || !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ColorError::InvalidHex(s.to_owned()));
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).map_err(|_| ColorError::InvalidHex(s.to_owned()));
        Ok(Self::new(channel(0)?, channel(2)?, channel(4)?))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(rgb: Rgb) -> Self {
        rgb.to_string()
    }
}

/// The three anchor colors of a diverging scale.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Palette {
    pub negative: Rgb,
    pub zero:     Rgb,
    pub positive: Rgb,
}

impl Palette {
    /// Color for `value` on a scale running from `-extent` to `extent`.
    ///
    /// Zero maps to `zero`, `±extent` and beyond map to the outer anchors, and
    /// values in between blend linearly. A non-positive `extent` gives `zero`.
    pub fn shade(&self, value: f64, extent: f64) -> Rgb {
        if extent.is_nan() || extent <= 0.0 || value == 0.0 {
            return self.zero;
        }
        let target = if value < 0.0 { self.negative } else { self.positive };
        let t = (value.abs() / extent).clamp(0.0, 1.0);
        Rgb::new(
            lerp(self.zero.r, target.r, t),
            lerp(self.zero.g, target.g, t),
            lerp(self.zero.b, target.b, t),
        )
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn lerp(from: u8, to: u8, t: f64) -> u8 {
    let (from, to) = (f64::from(from), f64::from(to));
    (from + (to - from) * t).round().clamp(0.0, 255.0) as u8
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            negative: Rgb::RED,
            zero:     Rgb::WHITE,
            positive: Rgb::GREEN,
        }
    }
}

/// Options passed through to every renderer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    pub title:   Option<String>,
    pub palette: Palette,
}

impl RenderOptions {
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub const fn with_palette(mut self, palette: Palette) -> Self {
        self.palette = palette;
        self
    }
}

/// Terminal renderer: one block per month, one glyph per day by sign.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextRenderer {
    /// Shade each day on the palette scale using 24-bit ANSI backgrounds
    pub ansi: bool,
}

const ROW_LABEL_WIDTH: usize = 3;
const COLUMN_WIDTH: usize = 4;

impl TextRenderer {
    pub const fn new(ansi: bool) -> Self {
        Self { ansi }
    }

    fn glyph(value: f64) -> char {
        if value < 0.0 {
            '-'
        } else if value > 0.0 {
            '+'
        } else {
            '0'
        }
    }

    fn write_cell(&self, out: &mut String, cell: Option<&CalendarCell>, palette: &Palette, extent: f64) -> fmt::Result {
        match cell {
            None => write!(out, "{:COLUMN_WIDTH$}", ""),
            Some(cell) if self.ansi => {
                let Rgb { r, g, b } = palette.shade(cell.value(), extent);
                write!(
                    out,
                    "\x1b[48;2;{r};{g};{b}m{:>COLUMN_WIDTH$}\x1b[0m",
                    Self::glyph(cell.value())
                )
            },
            Some(cell) => write!(out, "{:>COLUMN_WIDTH$}", Self::glyph(cell.value())),
        }
    }
}

impl Renderer for TextRenderer {
    type Error = fmt::Error;
    type Output = String;

    fn render(&mut self, cells: &[CalendarCell], options: &RenderOptions) -> Result<String, fmt::Error> {
        let mut lines: Vec<String> = Vec::new();
        if let Some(title) = &options.title {
            lines.push(title.clone());
            lines.push(String::new());
        }

        // One scale for the whole series so panels compare
        let extent = cells.iter().map(|c| c.value().abs()).fold(0.0, f64::max);

        for (i, panel) in panels(cells).iter().enumerate() {
            if i > 0 {
                lines.push(String::new());
            }
            lines.push(panel.label().to_owned());

            let mut header = format!("{:ROW_LABEL_WIDTH$}", "");
            for weekday in WeekdayLabel::ALL {
                write!(header, "{:>COLUMN_WIDTH$}", weekday.as_str())?;
            }
            lines.push(header);

            for (row, days) in panel.grid().iter().enumerate() {
                let mut line = format!("{:>ROW_LABEL_WIDTH$}", row + 1);
                for cell in days {
                    self.write_cell(&mut line, *cell, &options.palette, extent)?;
                }
                lines.push(line.trim_end().to_owned());
            }
        }

        let mut out = lines.join("\n");
        out.push('\n');
        Ok(out)
    }
}

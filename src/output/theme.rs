//! Injectable formatting configuration shared by the formatter and table renderer.

use clap::ValueEnum;
use colored::{Color, Colorize};
use serde::{Deserialize, Serialize};

use crate::config::DisplayConfig;

/// A two-point RGB gradient indexed by an intensity in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorScale {
    pub low: [u8; 3],
    pub high: [u8; 3],
}

impl ColorScale {
    pub const fn new(low: [u8; 3], high: [u8; 3]) -> Self {
        Self { low, high }
    }

    /// Interpolated color at `t`. Values outside `[0, 1]` are clamped.
    pub fn at(&self, t: f64) -> Color {
        let t = if t.is_finite() { t.clamp(0.0, 1.0) } else { 0.0 };
        let channel = |i: usize| {
            let low = f64::from(self.low[i]);
            let high = f64::from(self.high[i]);
            (low + (high - low) * t).round() as u8
        };
        Color::TrueColor {
            r: channel(0),
            g: channel(1),
            b: channel(2),
        }
    }
}

/// How durations are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum DurationStyle {
    /// `12.34 ms` below one second, `1.23 s` above.
    #[default]
    Short,
    /// Like `Short`, but sub-millisecond values use `µs`.
    Si,
}

/// Formatting options passed explicitly to the formatter and renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub color_enabled: bool,
    pub time_scale: ColorScale,
    pub error_scale: ColorScale,
    pub warning_scale: ColorScale,
    /// File identifiers longer than this are shortened.
    pub max_identifier_width: usize,
    pub duration_style: DurationStyle,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            color_enabled: true,
            time_scale: ColorScale::new([120, 200, 120], [255, 70, 70]),
            error_scale: ColorScale::new([230, 120, 120], [255, 40, 40]),
            warning_scale: ColorScale::new([230, 210, 120], [255, 180, 0]),
            max_identifier_width: 60,
            duration_style: DurationStyle::Short,
        }
    }
}

impl Theme {
    /// Build a theme from the `[display]` config section.
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self {
            color_enabled: config.color,
            time_scale: config.time_scale,
            error_scale: config.error_scale,
            warning_scale: config.warning_scale,
            max_identifier_width: config.max_identifier_width,
            duration_style: config.duration_style,
        }
    }

    /// The same theme with color output turned off.
    pub fn plain(&self) -> Self {
        Self {
            color_enabled: false,
            ..self.clone()
        }
    }

    pub fn paint(&self, text: &str, color: Color) -> String {
        if self.color_enabled {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    pub fn dim(&self, text: &str) -> String {
        if self.color_enabled {
            text.dimmed().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn bold(&self, text: &str) -> String {
        if self.color_enabled {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }
}

//! Static font-metric tables for the document service's font catalog.
//!
//! Character widths are in em units (relative to font size), taken from Roboto's
//! advance widths. The catalog ships four Roboto cuts that share glyph proportions,
//! so each cut is the regular table stretched by a per-weight factor. This is an
//! approximation of the collaborator's real rasterizer, good to a few percent,
//! which is all the on-screen fit needs.
//!
//! Tables cover ASCII 0x20..=0x7E (95 printable characters). Index = (char as usize) - 32.

use serde::{Deserialize, Serialize};

// ────────────────────────────────────────────────────────────────────────────
// Font catalog
// ────────────────────────────────────────────────────────────────────────────

/// Fonts available on the document service. Serialized as the service's file names.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontFamily {
    #[default]
    #[serde(rename = "Roboto-Bold.ttf")]
    RobotoBold,
    #[serde(rename = "Roboto-Regular.ttf")]
    RobotoRegular,
    #[serde(rename = "Roboto-Italic.ttf")]
    RobotoItalic,
    #[serde(rename = "Roboto-Medium.ttf")]
    RobotoMedium,
}

impl FontFamily {
    #[cfg(test)]
    pub const ALL: [FontFamily; 4] = [
        FontFamily::RobotoBold,
        FontFamily::RobotoRegular,
        FontFamily::RobotoItalic,
        FontFamily::RobotoMedium,
    ];

    /// File name of the font asset on the document service.
    pub fn file_name(self) -> &'static str {
        match self {
            FontFamily::RobotoBold => "Roboto-Bold.ttf",
            FontFamily::RobotoRegular => "Roboto-Regular.ttf",
            FontFamily::RobotoItalic => "Roboto-Italic.ttf",
            FontFamily::RobotoMedium => "Roboto-Medium.ttf",
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Measurement seam
// ────────────────────────────────────────────────────────────────────────────

/// Anything that can report the rendered width of a single line of text.
///
/// The fit engine only depends on this trait, so a real glyph rasterizer can
/// replace the static tables without touching the fitting logic.
pub trait TextMeasurer {
    /// Rendered width of `text` at `font_size`, in the same units as `font_size`.
    fn text_width(&self, text: &str, font: FontFamily, font_size: f32) -> f32;
}

/// Measures text with the static em tables below.
#[derive(Debug, Clone, Copy, Default)]
pub struct StaticMetrics;

impl TextMeasurer for StaticMetrics {
    fn text_width(&self, text: &str, font: FontFamily, font_size: f32) -> f32 {
        get_metrics(font).measure_str(text) * font_size
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Font metric table
// ────────────────────────────────────────────────────────────────────────────

/// Character-width table for one font of the catalog.
///
/// `widths[i]` is the width of ASCII character `(i + 32)` at 1em for the regular
/// cut; `stretch` widens it for heavier weights.
pub struct FontMetricTable {
    widths: &'static [f32; 95],
    stretch: f32,
    /// Fallback width for non-ASCII characters (codepoints > 0x7E).
    pub average_char_width: f32,
}

impl FontMetricTable {
    /// Measures the rendered width of a string in em units.
    ///
    /// Non-ASCII characters fall back to `average_char_width`.
    pub fn measure_str(&self, s: &str) -> f32 {
        s.chars()
            .map(|c| {
                let code = c as usize;
                if (32..=126).contains(&code) {
                    self.widths[code - 32] * self.stretch
                } else {
                    self.average_char_width
                }
            })
            .sum()
    }
}

/// Roboto Regular advance widths.
#[rustfmt::skip]
static ROBOTO_WIDTHS: [f32; 95] = [
    // sp     !      "      #      $      %      &      '      (      )      *      +      ,      -      .      /
    0.248, 0.258, 0.320, 0.616, 0.562, 0.733, 0.622, 0.174, 0.342, 0.348, 0.431, 0.567, 0.196, 0.276, 0.263, 0.412,
    // 0      1      2      3      4      5      6      7      8      9
    0.562, 0.562, 0.562, 0.562, 0.562, 0.562, 0.562, 0.562, 0.562, 0.562,
    // :      ;      <      =      >      ?      @
    0.242, 0.212, 0.508, 0.549, 0.522, 0.473, 0.898,
    // A      B      C      D      E      F      G      H      I      J      K      L      M
    0.653, 0.623, 0.651, 0.656, 0.568, 0.553, 0.681, 0.713, 0.272, 0.552, 0.627, 0.538, 0.873,
    // N      O      P      Q      R      S      T      U      V      W      X      Y      Z
    0.713, 0.688, 0.631, 0.688, 0.616, 0.593, 0.597, 0.648, 0.637, 0.887, 0.627, 0.601, 0.599,
    // [      \      ]      ^      _      `
    0.265, 0.410, 0.265, 0.418, 0.451, 0.309,
    // a      b      c      d      e      f      g      h      i      j      k      l      m
    0.544, 0.561, 0.523, 0.564, 0.530, 0.347, 0.561, 0.551, 0.243, 0.239, 0.507, 0.243, 0.876,
    // n      o      p      q      r      s      t      u      v      w      x      y      z
    0.552, 0.570, 0.561, 0.568, 0.338, 0.515, 0.327, 0.551, 0.484, 0.751, 0.496, 0.473, 0.496,
    // {      |      }      ~
    0.338, 0.244, 0.338, 0.680,
];

static ROBOTO_REGULAR_TABLE: FontMetricTable = FontMetricTable {
    widths: &ROBOTO_WIDTHS,
    stretch: 1.0,
    average_char_width: 0.54,
};

/// Italic advances track the upright cut within a percent.
static ROBOTO_ITALIC_TABLE: FontMetricTable = FontMetricTable {
    widths: &ROBOTO_WIDTHS,
    stretch: 0.99,
    average_char_width: 0.53,
};

static ROBOTO_MEDIUM_TABLE: FontMetricTable = FontMetricTable {
    widths: &ROBOTO_WIDTHS,
    stretch: 1.02,
    average_char_width: 0.55,
};

static ROBOTO_BOLD_TABLE: FontMetricTable = FontMetricTable {
    widths: &ROBOTO_WIDTHS,
    stretch: 1.04,
    average_char_width: 0.56,
};

/// Returns the static metric table for a given font.
pub fn get_metrics(font: FontFamily) -> &'static FontMetricTable {
    match font {
        FontFamily::RobotoBold => &ROBOTO_BOLD_TABLE,
        FontFamily::RobotoRegular => &ROBOTO_REGULAR_TABLE,
        FontFamily::RobotoItalic => &ROBOTO_ITALIC_TABLE,
        FontFamily::RobotoMedium => &ROBOTO_MEDIUM_TABLE,
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

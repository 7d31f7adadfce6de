use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::layout::font_metrics::FontFamily;
use crate::layout::scale::NativeRect;

/// Opaque placeholder id. Fresh v4 ids are never reused within or across sessions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlaceholderId(Uuid);

impl PlaceholderId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlaceholderId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<Uuid> for PlaceholderId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl fmt::Display for PlaceholderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Invalid color '{0}': expected #RGB or #RRGGBB")]
pub struct InvalidColor(pub String);

/// Hex RGB color as understood by the document service's renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Color(String);

impl Color {
    pub fn black() -> Self {
        Self("#000000".to_string())
    }

    #[cfg(test)]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

impl TryFrom<String> for Color {
    type Error = InvalidColor;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        let valid = value
            .strip_prefix('#')
            .is_some_and(|hex| matches!(hex.len(), 3 | 6) && hex.chars().all(|c| c.is_ascii_hexdigit()));
        if valid {
            Ok(Self(value))
        } else {
            Err(InvalidColor(value))
        }
    }
}

impl From<Color> for String {
    fn from(color: Color) -> Self {
        color.0
    }
}

/// A named, positioned, styled text box. All geometry is native pixel space.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Placeholder {
    pub id: PlaceholderId,
    /// Preview text and the spreadsheet column this box binds to.
    pub label: String,
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Base (native-space) font size.
    pub font_size: u32,
    pub font: FontFamily,
    pub color: Color,
}

impl Placeholder {
    pub fn rect(&self) -> NativeRect {
        NativeRect {
            x: self.x,
            y: self.y,
            width: self.width,
            height: self.height,
        }
    }

    /// Merges the supplied fields; anything left `None` is untouched.
    ///
    /// Sizes are kept at 1 or above.
    pub fn apply(&mut self, patch: &PlaceholderPatch) {
        if let Some(label) = &patch.label {
            self.label.clone_from(label);
        }
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width.max(1);
        }
        if let Some(height) = patch.height {
            self.height = height.max(1);
        }
        if let Some(font_size) = patch.font_size {
            self.font_size = font_size.max(1);
        }
        if let Some(font) = patch.font {
            self.font = font;
        }
        if let Some(color) = &patch.color {
            self.color = color.clone();
        }
    }
}

/// Partial update of a placeholder. Geometry must already be in native space.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaceholderPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub x: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub y: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font: Option<FontFamily>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
}

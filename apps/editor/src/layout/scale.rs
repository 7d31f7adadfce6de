//! Native ↔ display coordinate transform.
//!
//! Every placeholder coordinate is stored in the template's native pixel space.
//! Display space is a projection of it, recomputed from the viewport and never stored.
//! All rounding between the two spaces happens in this module and nowhere else.

use serde::{Deserialize, Serialize};

/// Horizontal gutter subtracted from the container before fitting the template.
const CONTAINER_GUTTER_PX: f64 = 20.0;
/// The template is never squeezed narrower than this, whatever the container reports.
const MIN_AVAILABLE_WIDTH_PX: f64 = 200.0;

/// Intrinsic pixel size of the loaded template image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeSize {
    pub width: u32,
    pub height: u32,
}

impl Default for NativeSize {
    /// Canvas size assumed until a template image has been decoded.
    fn default() -> Self {
        Self {
            width: 1000,
            height: 600,
        }
    }
}

/// A box in native pixel space. Always integral, always non-negative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NativeRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// A box in display space, as reported by (or rendered for) the pointer surface.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DisplayRect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Uniform downscale factor from native to display space, in `(0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisplayScale(f64);

impl Default for DisplayScale {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl DisplayScale {
    pub const IDENTITY: DisplayScale = DisplayScale(1.0);

    /// Computes the scale that fits `native_width` into the container.
    ///
    /// `None` means the container has not been measured yet, which yields 1.
    /// The result never exceeds 1: templates are only ever shrunk to fit.
    pub fn for_container(native_width: u32, container_width: Option<f64>) -> Self {
        let Some(container_width) = container_width.filter(|w| w.is_finite()) else {
            return Self::IDENTITY;
        };
        if native_width == 0 {
            return Self::IDENTITY;
        }
        let available = (container_width - CONTAINER_GUTTER_PX).max(MIN_AVAILABLE_WIDTH_PX);
        Self((available / f64::from(native_width)).min(1.0))
    }

    pub fn factor(self) -> f64 {
        self.0
    }

    /// `round(native * scale)`.
    pub fn to_display(self, native: u32) -> u32 {
        (f64::from(native) * self.0).round() as u32
    }

    /// `round(display / scale)`. Negative display values collapse to 0.
    pub fn to_native(self, display: f64) -> u32 {
        (display.max(0.0) / self.0).round() as u32
    }

    /// Projects a native box into display space (position and size per axis).
    pub fn project(self, rect: NativeRect) -> DisplayRect {
        DisplayRect {
            x: f64::from(self.to_display(rect.x)),
            y: f64::from(self.to_display(rect.y)),
            width: f64::from(self.to_display(rect.width)),
            height: f64::from(self.to_display(rect.height)),
        }
    }

    /// Converts a display box back into native space.
    pub fn unproject(self, rect: DisplayRect) -> NativeRect {
        NativeRect {
            x: self.to_native(rect.x),
            y: self.to_native(rect.y),
            width: self.to_native(rect.width),
            height: self.to_native(rect.height),
        }
    }

    /// Display-space size of the whole canvas.
    pub fn canvas(self, native: NativeSize) -> (f64, f64) {
        (
            f64::from(self.to_display(native.width)),
            f64::from(self.to_display(native.height)),
        )
    }
}

//! Auto-fit font sizing for on-canvas labels.
//!
//! Finds the largest size not above the candidate at which the label fits its box,
//! by repeated 6% shrink steps capped at 80 iterations. The result is advisory and
//! only drives display rendering; the persisted base font size is never touched here.

use serde::Serialize;

use crate::layout::font_metrics::{FontFamily, TextMeasurer};

/// Smallest size the fit will ever return.
pub const MIN_FONT_SIZE: f32 = 4.0;
/// Hard cap on shrink steps.
pub const MAX_FIT_ITERATIONS: u32 = 80;
/// Fraction of the current size removed per step (at least 1 unit).
const SHRINK_RATIO: f32 = 0.06;
/// Horizontal padding reserved inside a box when fitting its label.
pub const DEFAULT_FIT_PADDING: f32 = 8.0;

/// Inputs for a single fit.
#[derive(Debug, Clone, Copy)]
pub struct FitRequest<'a> {
    pub label: &'a str,
    pub candidate_size: f32,
    /// Target box width, display space.
    pub box_width: f32,
    pub font: FontFamily,
    pub padding: f32,
}

/// Outcome of a fit: the chosen size and how many shrink steps it took.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FontFit {
    pub size: f32,
    pub iterations: u32,
}

/// Shrinks `candidate_size` until the measured label fits `box_width - padding`.
///
/// The usable width never drops below `MIN_FONT_SIZE`, so degenerate boxes end at
/// the floor size once the iteration cap is hit instead of looping forever.
pub fn fit_font_to_width(measurer: &impl TextMeasurer, request: &FitRequest<'_>) -> FontFit {
    let usable_width = (request.box_width - request.padding).max(MIN_FONT_SIZE);
    let mut size = request.candidate_size;
    let mut iterations = 0;

    while iterations < MAX_FIT_ITERATIONS {
        let measured = measurer.text_width(request.label, request.font, size);
        if measured <= usable_width {
            break;
        }
        size = (size - (size * SHRINK_RATIO).max(1.0)).max(MIN_FONT_SIZE);
        iterations += 1;
    }

    FontFit { size, iterations }
}

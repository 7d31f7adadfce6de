//! Pointer commit → native-space update.
//!
//! Drag and resize gestures arrive once, on release, in display space. They are
//! clamped to the displayed canvas, converted through the scale transform and
//! merged into the store in one step. Intermediate pointer motion never reaches here.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::placeholder::{PlaceholderId, PlaceholderPatch};
use crate::layout::scale::{DisplayRect, DisplayScale, NativeSize};
use crate::layout::store::{base_font_size_for_height, PlaceholderStore};

/// Final geometry of a finished gesture, display space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum InteractionCommit {
    /// New top-left corner after a move.
    Drag { x: f64, y: f64 },
    /// New box after a resize (a resize from a left/top handle also moves the corner).
    Resize {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
}

/// What a commit did to the store.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InteractionOutcome {
    pub id: PlaceholderId,
    /// False when the id no longer exists; nothing was changed.
    pub applied: bool,
    pub update: Option<PlaceholderPatch>,
}

/// Applies a finished gesture to the placeholder `id`.
pub fn on_interaction_commit(
    store: &mut PlaceholderStore,
    id: PlaceholderId,
    commit: InteractionCommit,
    scale: DisplayScale,
    canvas: NativeSize,
) -> InteractionOutcome {
    let Some(current) = store.get(id) else {
        debug!(%id, "commit for unknown placeholder ignored");
        return InteractionOutcome {
            id,
            applied: false,
            update: None,
        };
    };

    let (canvas_w, canvas_h) = scale.canvas(canvas);
    let update = match commit {
        InteractionCommit::Drag { x, y } => {
            let shown = scale.project(current.rect());
            let box_w = shown.width.min(canvas_w);
            let box_h = shown.height.min(canvas_h);
            let x = scale.to_native(clamp_axis(x, canvas_w - box_w));
            let y = scale.to_native(clamp_axis(y, canvas_h - box_h));
            PlaceholderPatch {
                x: Some(fit_span(x, current.width, canvas.width).0),
                y: Some(fit_span(y, current.height, canvas.height).0),
                ..Default::default()
            }
        }
        InteractionCommit::Resize {
            x,
            y,
            width,
            height,
        } => {
            let clamped = clamp_box(
                DisplayRect {
                    x,
                    y,
                    width,
                    height,
                },
                canvas_w,
                canvas_h,
            );
            let native = scale.unproject(clamped);
            let (x, width) = fit_span(native.x, native.width, canvas.width);
            let (y, height) = fit_span(native.y, native.height, canvas.height);
            PlaceholderPatch {
                x: Some(x),
                y: Some(y),
                width: Some(width),
                height: Some(height),
                // Height alone drives the base size; width only changes display fitting.
                font_size: Some(base_font_size_for_height(height)),
                ..Default::default()
            }
        }
    };

    let applied = store.update(id, &update);
    InteractionOutcome {
        id,
        applied,
        update: Some(update),
    }
}

fn clamp_axis(value: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    value.clamp(0.0, max.max(0.0))
}

/// Keeps a display box inside `[0, canvas_w] × [0, canvas_h]`, shrinking it first if needed.
fn clamp_box(rect: DisplayRect, canvas_w: f64, canvas_h: f64) -> DisplayRect {
    let width = clamp_axis(rect.width, canvas_w);
    let height = clamp_axis(rect.height, canvas_h);
    DisplayRect {
        x: clamp_axis(rect.x, canvas_w - width),
        y: clamp_axis(rect.y, canvas_h - height),
        width,
        height,
    }
}

/// Re-clamps one native axis after rounding: `start + len` never passes `limit`.
fn fit_span(start: u32, len: u32, limit: u32) -> (u32, u32) {
    let limit = limit.max(1);
    let len = len.clamp(1, limit);
    (start.min(limit - len), len)
}

//! Ordered placeholder collection plus the single-item selection.
//!
//! Lookups by id are tolerant: an unknown id is a no-op, never an error. Ids
//! only ever come from the editor itself, so a miss means the item is already gone.

use tracing::debug;

use crate::layout::font_metrics::FontFamily;
use crate::layout::placeholder::{Color, Placeholder, PlaceholderId, PlaceholderPatch};
use crate::layout::scale::NativeSize;

const DEFAULT_WIDTH_RATIO: f64 = 0.5;
const DEFAULT_HEIGHT_RATIO: f64 = 0.08;
const MIN_DEFAULT_WIDTH: u32 = 120;
const MIN_DEFAULT_HEIGHT: u32 = 36;

/// Base font size as a fraction of box height.
pub const FONT_TO_HEIGHT_RATIO: f64 = 0.6;
pub const MIN_BASE_FONT_SIZE: u32 = 6;

/// `max(6, round(height * 0.6))`. The only rule that derives a base font size.
pub fn base_font_size_for_height(native_height: u32) -> u32 {
    ((f64::from(native_height) * FONT_TO_HEIGHT_RATIO).round() as u32).max(MIN_BASE_FONT_SIZE)
}

#[derive(Debug, Clone, Default)]
pub struct PlaceholderStore {
    items: Vec<Placeholder>,
    selected: Option<PlaceholderId>,
}

impl PlaceholderStore {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a default placeholder centred on the canvas and selects it.
    ///
    /// The label numbers from the current count, so deleting and re-adding can
    /// produce a label that already exists; export reports the clash.
    pub fn add(&mut self, canvas: NativeSize) -> PlaceholderId {
        let width = scaled_default(canvas.width, DEFAULT_WIDTH_RATIO, MIN_DEFAULT_WIDTH);
        let height = scaled_default(canvas.height, DEFAULT_HEIGHT_RATIO, MIN_DEFAULT_HEIGHT);

        let placeholder = Placeholder {
            id: PlaceholderId::new(),
            label: format!("field_{}", self.items.len() + 1),
            x: centred(canvas.width, width),
            y: centred(canvas.height, height),
            width,
            height,
            font_size: base_font_size_for_height(height),
            font: FontFamily::default(),
            color: Color::black(),
        };
        let id = placeholder.id;
        debug!(%id, label = %placeholder.label, "placeholder added");

        self.items.push(placeholder);
        self.selected = Some(id);
        id
    }

    /// Merges `patch` into the placeholder with `id`. Returns whether one matched.
    pub fn update(&mut self, id: PlaceholderId, patch: &PlaceholderPatch) -> bool {
        match self.items.iter_mut().find(|p| p.id == id) {
            Some(placeholder) => {
                placeholder.apply(patch);
                true
            }
            None => {
                debug!(%id, "update for unknown placeholder ignored");
                false
            }
        }
    }

    /// Removes the placeholder, clearing the selection if it pointed at it.
    pub fn delete(&mut self, id: PlaceholderId) -> bool {
        let before = self.items.len();
        self.items.retain(|p| p.id != id);
        if self.selected == Some(id) {
            self.selected = None;
        }
        before != self.items.len()
    }

    /// Sets the selection without checking that the id exists.
    pub fn select(&mut self, id: Option<PlaceholderId>) {
        self.selected = id;
    }

    pub fn selected_id(&self) -> Option<PlaceholderId> {
        self.selected
    }

    /// The selected placeholder, if the selection points at a live one.
    #[cfg(test)]
    pub fn selected(&self) -> Option<&Placeholder> {
        self.selected.and_then(|id| self.get(id))
    }

    pub fn get(&self, id: PlaceholderId) -> Option<&Placeholder> {
        self.items.iter().find(|p| p.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Placeholder> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Swaps in a whole new collection (layout load). The old selection is dropped.
    pub fn replace_all(&mut self, placeholders: Vec<Placeholder>) {
        self.items = placeholders;
        self.selected = None;
    }
}

fn scaled_default(canvas_extent: u32, ratio: f64, minimum: u32) -> u32 {
    let scaled = (f64::from(canvas_extent) * ratio).round() as u32;
    // Tiny templates: the minimum must not push the box past the canvas.
    scaled.max(minimum).min(canvas_extent.max(1))
}

fn centred(canvas_extent: u32, box_extent: u32) -> u32 {
    let slack = canvas_extent.saturating_sub(box_extent);
    // round(slack / 2), halves rounding up
    slack.div_ceil(2)
}

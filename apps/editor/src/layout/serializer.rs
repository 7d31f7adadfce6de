//! Label-keyed layout mapping exchanged with the document service.
//!
//! The wire shape is `{ "<label>": {x, y, width, height, font_size, font, color}, ... }`,
//! all geometry integral and in native space. Ids never leave the editor: labels
//! are the durable key, and an import builds fresh placeholders with new ids.

use std::fmt;
use std::marker::PhantomData;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::layout::font_metrics::FontFamily;
use crate::layout::placeholder::{Color, Placeholder, PlaceholderId};
use crate::layout::store::PlaceholderStore;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum LayoutError {
    #[error("No placeholders to save")]
    EmptyLayout,

    #[error("Placeholder {id} has an empty label")]
    EmptyLabel { id: PlaceholderId },

    #[error("Duplicate placeholder label '{label}'")]
    DuplicateLabel { label: String },

    #[error("Imported layout has an entry with a blank label")]
    BlankImportLabel,
}

// ────────────────────────────────────────────────────────────────────────────
// Ordered string-keyed map
// ────────────────────────────────────────────────────────────────────────────

/// A JSON object that keeps its key order (store order on export, document order on import).
///
/// A repeated key keeps its first position and its last value, matching how a
/// plain JSON object would resolve it.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelMap<V>(pub Vec<(String, V)>);

impl<V> Default for LabelMap<V> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<V> LabelMap<V> {
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn get(&self, label: &str) -> Option<&V> {
        self.0.iter().find(|(k, _)| k == label).map(|(_, v)| v)
    }

    #[cfg(test)]
    pub fn labels(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    fn insert_last_wins(&mut self, label: String, value: V) {
        match self.0.iter_mut().find(|(k, _)| *k == label) {
            Some(entry) => entry.1 = value,
            None => self.0.push((label, value)),
        }
    }
}

impl<V: Serialize> Serialize for LabelMap<V> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (label, value) in &self.0 {
            map.serialize_entry(label, value)?;
        }
        map.end()
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for LabelMap<V> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct LabelMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for LabelMapVisitor<V> {
            type Value = LabelMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of placeholder label to placeholder record")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Self::Value, A::Error> {
                let mut out = LabelMap(Vec::with_capacity(access.size_hint().unwrap_or(0)));
                while let Some((label, value)) = access.next_entry::<String, V>()? {
                    out.insert_last_wins(label, value);
                }
                Ok(out)
            }
        }

        deserializer.deserialize_map(LabelMapVisitor(PhantomData))
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Records
// ────────────────────────────────────────────────────────────────────────────

/// One exported placeholder.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceholderRecord {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    pub font_size: u32,
    pub font: FontFamily,
    pub color: Color,
}

/// One imported placeholder. Style fields are optional; geometry is not.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ImportRecord {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub font_size: Option<f64>,
    #[serde(default)]
    pub font: Option<FontFamily>,
    #[serde(default)]
    pub color: Option<Color>,
}

/// Body of the document service's `set-placeholders` call.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SetPlaceholdersRequest {
    pub placeholders: LabelMap<PlaceholderRecord>,
    pub default_font: Option<FontFamily>,
}

/// A layout as handed back for loading.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct LayoutImport {
    pub placeholders: LabelMap<ImportRecord>,
    #[serde(default)]
    pub default_font: Option<FontFamily>,
}

// ────────────────────────────────────────────────────────────────────────────
// Export / import
// ────────────────────────────────────────────────────────────────────────────

/// Builds the label-keyed mapping in store order.
///
/// Labels are trimmed before keying. Fails on an empty store, a blank label, or
/// two labels that trim to the same key, since the service would silently keep
/// only one of them.
pub fn export_layout(store: &PlaceholderStore) -> Result<LabelMap<PlaceholderRecord>, LayoutError> {
    if store.is_empty() {
        return Err(LayoutError::EmptyLayout);
    }

    let mut mapping = LabelMap(Vec::with_capacity(store.len()));
    for placeholder in store.iter() {
        let label = placeholder.label.trim();
        if label.is_empty() {
            return Err(LayoutError::EmptyLabel { id: placeholder.id });
        }
        if mapping.get(label).is_some() {
            return Err(LayoutError::DuplicateLabel {
                label: label.to_string(),
            });
        }
        mapping.0.push((label.to_string(), record_for(placeholder)));
    }
    Ok(mapping)
}

fn record_for(placeholder: &Placeholder) -> PlaceholderRecord {
    PlaceholderRecord {
        x: placeholder.x,
        y: placeholder.y,
        width: placeholder.width,
        height: placeholder.height,
        font_size: placeholder.font_size,
        font: placeholder.font,
        color: placeholder.color.clone(),
    }
}

/// Builds fresh placeholders (new ids) from an imported mapping, in mapping order.
///
/// Keys are trimmed into labels and held to the same rules as export. Missing
/// style fields take the renderer's defaults: font size `max(12, floor(height * 0.6))`
/// (40 for a zero height), `default_font` or the catalog default, and black.
pub fn import_layout(
    mapping: &LabelMap<ImportRecord>,
    default_font: Option<FontFamily>,
) -> Result<Vec<Placeholder>, LayoutError> {
    let mut placeholders: Vec<Placeholder> = Vec::with_capacity(mapping.len());
    for (key, record) in &mapping.0 {
        let label = key.trim();
        if label.is_empty() {
            return Err(LayoutError::BlankImportLabel);
        }
        if placeholders.iter().any(|p| p.label == label) {
            return Err(LayoutError::DuplicateLabel {
                label: label.to_string(),
            });
        }
        placeholders.push(placeholder_from(label, record, default_font));
    }
    Ok(placeholders)
}

fn placeholder_from(
    label: &str,
    record: &ImportRecord,
    default_font: Option<FontFamily>,
) -> Placeholder {
    let height = to_pixels(record.height).max(1);
    let font_size = match record.font_size {
        Some(size) => to_pixels(size),
        None => renderer_default_font_size(to_pixels(record.height)),
    };
    Placeholder {
        id: PlaceholderId::new(),
        label: label.to_string(),
        x: to_pixels(record.x),
        y: to_pixels(record.y),
        width: to_pixels(record.width).max(1),
        height,
        font_size: font_size.max(1),
        font: record.font.or(default_font).unwrap_or_default(),
        color: record.color.clone().unwrap_or_default(),
    }
}

fn to_pixels(value: f64) -> u32 {
    if value.is_finite() {
        value.max(0.0).round() as u32
    } else {
        0
    }
}

fn renderer_default_font_size(height: u32) -> u32 {
    if height == 0 {
        40
    } else {
        ((f64::from(height) * 0.6) as u32).max(12)
    }
}

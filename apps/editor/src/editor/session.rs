//! The editor session: one template, one placeholder store, one viewport.
//!
//! Owned by the service state for as long as the editor is open and discarded on
//! reset. Every method here is synchronous and runs to completion under the
//! session lock, so edits are applied strictly in arrival order.

use serde::Serialize;
use tracing::info;

use crate::layout::{
    export_layout, fit_font_to_width, import_layout, on_interaction_commit, DisplayRect,
    DisplayScale, FitRequest, FontFamily, FontFit, InteractionCommit, InteractionOutcome,
    LayoutError, LayoutImport, NativeSize, Placeholder, PlaceholderId, PlaceholderPatch,
    PlaceholderStore, SetPlaceholdersRequest, StaticMetrics, DEFAULT_FIT_PADDING,
};

/// The template the placeholders are laid over.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Template {
    /// Where the document service serves the image; `None` before any upload.
    pub url: Option<String>,
    pub size: NativeSize,
}

#[derive(Debug, Clone, Default)]
pub struct EditorSession {
    template: Template,
    container_width: Option<f64>,
    scale: DisplayScale,
    store: PlaceholderStore,
}

/// A placeholder as the editor shows it: stored geometry plus its display projection.
#[derive(Debug, Clone, Serialize)]
pub struct PlaceholderView {
    #[serde(flatten)]
    pub placeholder: Placeholder,
    pub display: DisplayRect,
    /// Label size after fitting to the display box. Never persisted.
    pub display_font_size: f32,
    pub selected: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionView {
    pub template: Template,
    pub container_width: Option<f64>,
    pub display_scale: DisplayScale,
    pub selected: Option<PlaceholderId>,
    pub placeholders: Vec<PlaceholderView>,
}

impl EditorSession {
    pub fn new(container_width: Option<f64>) -> Self {
        let mut session = Self::default();
        session.resize_viewport(container_width);
        session
    }

    pub fn template(&self) -> &Template {
        &self.template
    }

    pub fn scale(&self) -> DisplayScale {
        self.scale
    }

    pub fn store(&self) -> &PlaceholderStore {
        &self.store
    }

    /// Installs a freshly decoded template and refits the display scale to it.
    /// Placeholders keep their native geometry.
    pub fn load_template(&mut self, url: Option<String>, size: NativeSize) {
        info!(
            width = size.width,
            height = size.height,
            "template loaded"
        );
        self.template = Template { url, size };
        self.rescale();
    }

    /// Falls back to the default canvas when the service has no template.
    pub fn clear_template(&mut self) {
        self.template = Template::default();
        self.rescale();
    }

    /// Records the latest container width and recomputes the scale.
    pub fn resize_viewport(&mut self, container_width: Option<f64>) -> DisplayScale {
        self.container_width = container_width;
        self.rescale();
        self.scale
    }

    fn rescale(&mut self) {
        self.scale = DisplayScale::for_container(self.template.size.width, self.container_width);
    }

    pub fn add_placeholder(&mut self) -> PlaceholderId {
        self.store.add(self.template.size)
    }

    pub fn update_placeholder(&mut self, id: PlaceholderId, patch: &PlaceholderPatch) -> bool {
        self.store.update(id, patch)
    }

    pub fn delete_placeholder(&mut self, id: PlaceholderId) -> bool {
        self.store.delete(id)
    }

    pub fn select(&mut self, id: Option<PlaceholderId>) {
        self.store.select(id);
    }

    /// Applies a released drag or resize, given in display space.
    pub fn commit_interaction(
        &mut self,
        id: PlaceholderId,
        commit: InteractionCommit,
    ) -> InteractionOutcome {
        on_interaction_commit(&mut self.store, id, commit, self.scale, self.template.size)
    }

    /// Builds the `set-placeholders` body. Session state is not touched either way.
    pub fn export_layout(
        &self,
        default_font: Option<FontFamily>,
    ) -> Result<SetPlaceholdersRequest, LayoutError> {
        Ok(SetPlaceholdersRequest {
            placeholders: export_layout(&self.store)?,
            default_font,
        })
    }

    /// Replaces every placeholder with the imported layout. Returns how many were loaded.
    ///
    /// A rejected layout leaves the current placeholders in place.
    pub fn import_layout(&mut self, import: &LayoutImport) -> Result<usize, LayoutError> {
        let placeholders = import_layout(&import.placeholders, import.default_font)?;
        let count = placeholders.len();
        self.store.replace_all(placeholders);
        info!(count, "layout imported");
        Ok(count)
    }

    /// Display-space label size: the base size projected, then fitted to the box width.
    pub fn display_font_size(&self, placeholder: &Placeholder) -> FontFit {
        let box_width = self.scale.to_display(placeholder.width) as f32;
        let candidate = (f64::from(placeholder.font_size) * self.scale.factor()) as f32;
        fit_font_to_width(
            &StaticMetrics,
            &FitRequest {
                label: &placeholder.label,
                candidate_size: candidate,
                box_width,
                font: placeholder.font,
                padding: DEFAULT_FIT_PADDING,
            },
        )
    }

    pub fn view(&self) -> SessionView {
        let selected = self.store.selected_id();
        let placeholders = self
            .store
            .iter()
            .map(|p| PlaceholderView {
                placeholder: p.clone(),
                display: self.scale.project(p.rect()),
                display_font_size: self.display_font_size(p).size,
                selected: selected == Some(p.id),
            })
            .collect();

        SessionView {
            template: self.template.clone(),
            container_width: self.container_width,
            display_scale: self.scale,
            selected,
            placeholders,
        }
    }
}

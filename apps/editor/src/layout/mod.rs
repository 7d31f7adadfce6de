// Placeholder layout engine.
// Native-space placeholder model, the native/display transform, pointer commits,
// label auto-fit, and the label-keyed layout mapping. Everything here is synchronous.

pub mod font_fit;
pub mod font_metrics;
pub mod interaction;
pub mod placeholder;
pub mod scale;
pub mod serializer;
pub mod store;

// Re-export the public API consumed by the editor session and handlers.
pub use font_fit::{fit_font_to_width, FitRequest, FontFit, DEFAULT_FIT_PADDING};
pub use font_metrics::{FontFamily, StaticMetrics};
pub use interaction::{on_interaction_commit, InteractionCommit, InteractionOutcome};
pub use placeholder::{Placeholder, PlaceholderId, PlaceholderPatch};
pub use scale::{DisplayRect, DisplayScale, NativeSize};
pub use serializer::{
    export_layout, import_layout, LayoutError, LayoutImport, SetPlaceholdersRequest,
};
pub use store::PlaceholderStore;

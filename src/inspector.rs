mod fallback;
mod optimized;

pub use fallback::MISSING_SCRIPT_WARNING;
pub use optimized::OptimizedBlockState;

use crate::config::{EditMode, InspectorConfig};
use crate::handler::{DrawContext, HandlerRegistry, PropertyHandler};
use crate::property::{FieldView, InspectTarget, SerializedObject};
use egui::{Rect, Sense, Ui, UiBuilder};
use serde::Serialize;
use uuid::Uuid;

/// Counters for the work done by one inspector instance.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InspectorStats {
    pub height_scans: u64,
    pub draw_passes: u64,
    pub fields_drawn: u64,
    pub fields_culled: u64,
    pub fallback_passes: u64,
}

/// Property inspector for one selection of targets.
///
/// Create one per edited selection and keep it across frames: it owns the
/// serialized view and the optimized-block cache for that selection.
#[derive(Debug)]
pub struct GenericInspector {
    id: Uuid,
    config: InspectorConfig,
    serialized: Option<SerializedObject>,
    block_state: OptimizedBlockState,
    last_height: Option<f32>,
    cached_structure: Option<blake3::Hash>,
    cached_generation: Option<u64>,
    stats: InspectorStats,
}

impl GenericInspector {
    pub fn new(config: InspectorConfig) -> Self {
        Self {
            id: Uuid::new_v4(),
            config,
            serialized: None,
            block_state: OptimizedBlockState::Unknown,
            last_height: None,
            cached_structure: None,
            cached_generation: None,
            stats: InspectorStats::default(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &InspectorConfig {
        &self.config
    }

    pub fn stats(&self) -> InspectorStats {
        self.stats
    }

    pub fn serialized_object(&self) -> Option<&SerializedObject> {
        self.serialized.as_ref()
    }

    pub fn serialized_object_mut(&mut self) -> Option<&mut SerializedObject> {
        self.serialized.as_mut()
    }

    pub fn edit_mode(&self) -> EditMode {
        self.config.edit_mode
    }

    /// Switching modes changes which fields are visible, so the cache is dropped.
    pub fn set_edit_mode(&mut self, mode: EditMode) {
        if self.config.edit_mode == mode {
            return;
        }
        self.config.edit_mode = mode;
        self.reset_optimized_block(OptimizedBlockState::Unknown);
    }

    /// End of the editing session.
    pub fn on_disable(&mut self) {
        self.reset_optimized_block(OptimizedBlockState::Unknown);
        self.serialized = None;
    }

    /// One frame of inspector UI: the cached fast path when possible, the
    /// per-field fallback otherwise. Returns whether any target changed.
    pub fn show<T: InspectTarget>(
        &mut self,
        ui: &mut Ui,
        targets: &mut [T],
        handlers: &HandlerRegistry,
        is_dirty: bool,
    ) -> bool {
        match self.query_optimized_layout(targets, handlers, is_dirty, ui.is_visible()) {
            Some(height) => {
                let (content_rect, _) = ui.allocate_exact_size(egui::vec2(ui.available_width(), height), Sense::hover());
                if !ui.is_visible() {
                    return false;
                }
                let visible_rect = ui.clip_rect();
                self.on_optimized_inspector_gui(ui, targets, handlers, content_rect, visible_rect)
            }
            None => self.on_inspector_gui(ui, targets, handlers),
        }
    }

    fn id_base(&self) -> egui::Id {
        egui::Id::new(("kestrel_inspector", self.id))
    }
}

/// Lazily creates the view, then refreshes it in place.
fn refresh_view<'a, T: InspectTarget>(
    slot: &'a mut Option<SerializedObject>,
    mode: EditMode,
    targets: &[T],
) -> &'a mut SerializedObject {
    let view = slot.get_or_insert_with(SerializedObject::default);
    view.set_edit_mode(mode);
    view.update(targets);
    view
}

/// `parent_enabled` folds in the ui state and target editability. It can
/// only disable: a read-only field stays read-only whatever the target says.
/// A missing script lifts the identity lock so the reference can be reassigned.
fn field_enabled(parent_enabled: bool, field: &FieldView<'_>, config: &InspectorConfig, script_missing: bool) -> bool {
    parent_enabled
        && !field.is_read_only()
        && (script_missing || !config.identity.locks(field.path(), config.edit_mode))
}

/// Draws one field into `rect` in a child ui, leaving the parent's enabled
/// state untouched. Returns the handler's expanded answer.
fn draw_field(
    ui: &mut Ui,
    handler: &dyn PropertyHandler,
    rect: Rect,
    field: &FieldView<'_>,
    enabled: bool,
    cx: &mut DrawContext<'_>,
) -> bool {
    let mut child = ui.new_child(UiBuilder::new().max_rect(rect).id_salt(field.path()));
    if !enabled {
        child.disable();
    }
    handler.on_gui(&mut child, rect, field, cx)
}

impl Default for GenericInspector {
    fn default() -> Self {
        Self::new(InspectorConfig::default())
    }
}

use super::{draw_field, field_enabled, refresh_view, GenericInspector};
use crate::config::LayoutConfig;
use crate::handler::{DrawContext, HandlerRegistry};
use crate::property::{InspectTarget, PendingEdits, PropertyIterator, SerializedObject};
use egui::{Rect, Ui};
use serde::Serialize;

/// Whether the selection's field layout can be served from a cached height.
///
/// `Unknown` after construction, a dirty signal or a reset. Only a height pass
/// moves it to one of the other two values, and both stay put until the next
/// reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizedBlockState {
    #[default]
    Unknown,
    Cacheable,
    NotCacheable,
}

/// The field that failed a height pass.
#[derive(Debug)]
struct Poisoned {
    path: String,
    reason: &'static str,
}

impl GenericInspector {
    pub fn optimized_block_state(&self) -> OptimizedBlockState {
        self.block_state
    }

    /// Height of the last successful height pass or draw pass.
    pub fn last_height(&self) -> Option<f32> {
        self.last_height
    }

    /// Per-frame layout query. `Some(height)` means the fast path may be used
    /// with that much vertical space; `None` means fall back to
    /// [`GenericInspector::on_inspector_gui`].
    pub fn query_optimized_layout<T: InspectTarget>(
        &mut self,
        targets: &[T],
        handlers: &HandlerRegistry,
        is_dirty: bool,
        is_visible: bool,
    ) -> Option<f32> {
        let first = targets.first()?;
        if !self.config.optimized_blocks.enabled || first.type_info().excludes_optimized_block() {
            return None;
        }
        let stale_handlers = self.cached_generation.is_some_and(|generation| generation != handlers.generation());
        if is_dirty || stale_handlers {
            self.reset_optimized_block(OptimizedBlockState::Unknown);
        }
        if !is_visible {
            return Some(0.0);
        }
        match self.block_state {
            OptimizedBlockState::Cacheable => Some(self.last_height.unwrap_or(0.0)),
            OptimizedBlockState::NotCacheable => None,
            OptimizedBlockState::Unknown => self.precompute_height(targets, handlers),
        }
    }

    /// Clears the cached height and moves to `state`. Returns whether the new
    /// state is `Cacheable`.
    pub fn reset_optimized_block(&mut self, state: OptimizedBlockState) -> bool {
        self.last_height = None;
        self.block_state = state;
        state == OptimizedBlockState::Cacheable
    }

    fn precompute_height<T: InspectTarget>(&mut self, targets: &[T], handlers: &HandlerRegistry) -> Option<f32> {
        self.stats.height_scans += 1;
        let layout = self.config.layout;
        let view = refresh_view(&mut self.serialized, self.config.edit_mode, targets);
        let measured = measure_visible_fields(view, handlers, &layout);
        self.cached_structure = view.structure_hash();
        self.cached_generation = Some(handlers.generation());
        match measured {
            Ok(height) => {
                self.block_state = OptimizedBlockState::Cacheable;
                self.last_height = Some(height);
                tracing::debug!(inspector = %self.id, height, "optimized block cached");
                Some(height)
            }
            Err(poisoned) => {
                self.reset_optimized_block(OptimizedBlockState::NotCacheable);
                tracing::debug!(
                    inspector = %self.id,
                    path = %poisoned.path,
                    reason = poisoned.reason,
                    "optimized block not cacheable"
                );
                None
            }
        }
    }

    /// Fast path: draws the fields that intersect `visible_rect`, steps over
    /// the rest, then commits the collected edits. Returns whether any target
    /// changed.
    pub fn on_optimized_inspector_gui<T: InspectTarget>(
        &mut self,
        ui: &mut Ui,
        targets: &mut [T],
        handlers: &HandlerRegistry,
        content_rect: Rect,
        visible_rect: Rect,
    ) -> bool {
        if self.block_state != OptimizedBlockState::Cacheable {
            tracing::warn!(
                inspector = %self.id,
                state = ?self.block_state,
                "optimized draw requested without a cached layout"
            );
            return false;
        }
        self.stats.draw_passes += 1;
        let layout = self.config.layout;
        let id_base = self.id_base();
        let parent_enabled = ui.is_enabled() && targets.iter().all(|target| target.is_editable());
        let view = refresh_view(&mut self.serialized, self.config.edit_mode, targets);

        let left = content_rect.left() + layout.padding_left;
        let width = (content_rect.width() - layout.padding_left - layout.padding_right).max(0.0);
        let mut y = content_rect.top() + layout.control_spacing;
        let mut edits = PendingEdits::default();
        let mut iter = PropertyIterator::new();
        let mut enter_children = true;
        while iter.next_visible(view, enter_children) {
            let Some(index) = iter.index() else { break };
            let Some(field) = view.field(index) else { break };
            let Some(handler) = handlers.handler_for(&field) else {
                tracing::warn!(
                    inspector = %self.id,
                    path = field.path(),
                    "no handler in the draw pass; the registry differs from the one the layout was cached with"
                );
                enter_children = field.is_expanded() && field.has_visible_children();
                self.stats.fields_culled += 1;
                continue;
            };
            let height = handler.height(&field, &layout);
            let rect = Rect::from_min_size(egui::pos2(left, y), egui::vec2(width, height));
            if rect.intersects(visible_rect) {
                let enabled = field_enabled(parent_enabled, &field, &self.config, false);
                let has_children = field.has_visible_children();
                let mut cx = DrawContext { edits: &mut edits, layout: &layout, id: id_base.with(field.path()) };
                let expanded = draw_field(ui, handler, rect, &field, enabled, &mut cx);
                if has_children {
                    view.set_expanded(index, expanded);
                }
                enter_children = expanded && has_children;
                self.stats.fields_drawn += 1;
            } else {
                enter_children = field.is_expanded() && field.has_visible_children();
                self.stats.fields_culled += 1;
            }
            y += height + layout.control_spacing;
        }
        self.last_height = Some(y - content_rect.top());

        let changed = view.apply_modified_properties(targets, &mut edits);
        if view.structure_hash() != self.cached_structure {
            tracing::debug!(inspector = %self.id, "field structure changed, dropping cached layout");
            self.reset_optimized_block(OptimizedBlockState::Unknown);
        }
        changed
    }
}

/// Sums handler heights over the visible fields. Fails on the first field
/// whose handler is missing or cannot be cached.
fn measure_visible_fields(
    view: &SerializedObject,
    handlers: &HandlerRegistry,
    layout: &LayoutConfig,
) -> Result<f32, Poisoned> {
    let mut iter = PropertyIterator::new();
    let mut height = 0.0;
    let mut enter_children = true;
    while iter.next_visible(view, enter_children) {
        let Some(field) = iter.field(view) else { break };
        let Some(handler) = handlers.handler_for(&field) else {
            return Err(Poisoned { path: field.path().to_string(), reason: "no handler" });
        };
        if !handler.can_cache_inspector_gui(&field) {
            return Err(Poisoned { path: field.path().to_string(), reason: "handler is not cacheable" });
        }
        height += handler.height(&field, layout) + layout.control_spacing;
        enter_children = field.is_expanded() && field.has_visible_children();
    }
    if height > 0.0 {
        height += layout.control_spacing;
    }
    Ok(height)
}

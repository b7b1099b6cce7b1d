use super::{draw_field, field_enabled, refresh_view, GenericInspector};
use crate::config::InspectorConfig;
use crate::handler::{DrawContext, HandlerRegistry};
use crate::property::{FieldValue, InspectTarget, PendingEdits, PropertyIterator, SerializedObject};
use egui::{Rect, Sense, Ui};

pub const MISSING_SCRIPT_WARNING: &str =
    "The associated script can not be loaded. Fix any compile errors and assign a valid script.";

impl GenericInspector {
    /// Uncached path: lays every visible field out through egui's own cursor.
    /// Returns whether any target changed.
    pub fn on_inspector_gui<T: InspectTarget>(
        &mut self,
        ui: &mut Ui,
        targets: &mut [T],
        handlers: &HandlerRegistry,
    ) -> bool {
        self.stats.fallback_passes += 1;
        let layout = self.config.layout;
        let id_base = self.id_base();
        let parent_enabled = ui.is_enabled() && targets.iter().all(|target| target.is_editable());
        let view = refresh_view(&mut self.serialized, self.config.edit_mode, targets);

        let script_missing = missing_script(view, &self.config);
        if script_missing {
            ui.colored_label(egui::Color32::YELLOW, MISSING_SCRIPT_WARNING);
        }

        let saved_spacing = ui.spacing().item_spacing.y;
        ui.spacing_mut().item_spacing.y = layout.control_spacing;
        ui.add_space(layout.control_spacing);
        let width = ui.available_width();
        let mut edits = PendingEdits::default();
        let mut iter = PropertyIterator::new();
        let mut enter_children = true;
        while iter.next_visible(view, enter_children) {
            let Some(index) = iter.index() else { break };
            let Some(field) = view.field(index) else { break };
            let Some(handler) = handlers.handler_for(&field) else {
                ui.label(
                    egui::RichText::new(format!("{}: no drawer for {}", field.display_name(), field.kind().label()))
                        .weak(),
                );
                enter_children = field.is_expanded() && field.has_visible_children();
                continue;
            };
            let height = handler.height(&field, &layout);
            let (row, _) = ui.allocate_exact_size(egui::vec2(width, height), Sense::hover());
            let rect = Rect::from_min_max(
                egui::pos2(row.left() + layout.padding_left, row.top()),
                egui::pos2((row.right() - layout.padding_right).max(row.left() + layout.padding_left), row.bottom()),
            );
            let enabled = field_enabled(parent_enabled, &field, &self.config, script_missing);
            let has_children = field.has_visible_children();
            let mut cx = DrawContext { edits: &mut edits, layout: &layout, id: id_base.with(field.path()) };
            let expanded = draw_field(ui, handler, rect, &field, enabled, &mut cx);
            if has_children {
                view.set_expanded(index, expanded);
            }
            enter_children = expanded && has_children;
            self.stats.fields_drawn += 1;
        }
        ui.spacing_mut().item_spacing.y = saved_spacing;

        view.apply_modified_properties(targets, &mut edits)
    }
}

/// Base behaviour/asset targets whose identity field is absent or empty.
pub(super) fn missing_script(view: &SerializedObject, config: &InspectorConfig) -> bool {
    let Some(info) = view.type_info() else {
        return false;
    };
    if !info.expects_script() {
        return false;
    }
    match view.find(&config.identity.path) {
        Some(field) => matches!(field.value(), FieldValue::ObjectRef(None)),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{DeclaredKind, DocumentTarget, FieldNode, TargetTypeInfo};

    fn view_for(declared: DeclaredKind, script: Option<Option<&str>>) -> SerializedObject {
        let mut fields = vec![FieldNode::float("speed", 1.0)];
        if let Some(script) = script {
            fields.insert(0, FieldNode::script("script", script));
        }
        SerializedObject::new(&[DocumentTarget::new(TargetTypeInfo::derived("Mover").with_declared(declared), fields)])
    }

    #[test]
    fn missing_script_requires_base_type_and_empty_reference() {
        let config = InspectorConfig::default();
        assert!(missing_script(&view_for(DeclaredKind::BaseBehaviour, Some(None)), &config));
        assert!(missing_script(&view_for(DeclaredKind::BaseAsset, None), &config));
        assert!(!missing_script(&view_for(DeclaredKind::BaseBehaviour, Some(Some("Mover"))), &config));
        assert!(!missing_script(&view_for(DeclaredKind::Derived, Some(None)), &config));
        assert!(!missing_script(&SerializedObject::default(), &config));
    }
}

pub mod builtin;
pub mod custom;

pub use builtin::{FoldoutHandler, ScriptFieldHandler, ValueFieldHandler};
pub use custom::CustomDrawer;

use crate::config::LayoutConfig;
use crate::property::{FieldKind, FieldView, PendingEdits};
use egui::{Rect, Ui};
use std::collections::HashMap;

/// Per-draw state handed to a handler.
pub struct DrawContext<'a> {
    pub edits: &'a mut PendingEdits,
    pub layout: &'a LayoutConfig,
    pub id: egui::Id,
}

/// Draws one field kind (or one custom field type).
pub trait PropertyHandler {
    /// Whether the field's height can be computed once and reused across frames.
    fn can_cache_inspector_gui(&self, _field: &FieldView<'_>) -> bool {
        true
    }

    fn height(&self, field: &FieldView<'_>, layout: &LayoutConfig) -> f32;

    /// Draws `field` into `rect`. Returns whether the field's children stay expanded.
    fn on_gui(&self, ui: &mut Ui, rect: Rect, field: &FieldView<'_>, cx: &mut DrawContext<'_>) -> bool;
}

/// Handler lookup: custom drawers keyed by field type name, then defaults per kind.
pub struct HandlerRegistry {
    defaults: HashMap<FieldKind, Box<dyn PropertyHandler>>,
    drawers: HashMap<String, Box<dyn PropertyHandler>>,
    generation: u64,
}

impl HandlerRegistry {
    pub fn empty() -> Self {
        Self { defaults: HashMap::new(), drawers: HashMap::new(), generation: 0 }
    }

    pub fn with_builtin() -> Self {
        let mut registry = Self::empty();
        for kind in [
            FieldKind::Bool,
            FieldKind::Integer,
            FieldKind::Float,
            FieldKind::Text,
            FieldKind::Vector2,
            FieldKind::Vector3,
            FieldKind::Color,
            FieldKind::ObjectRef,
            FieldKind::Enum,
        ] {
            registry.register_kind(kind, ValueFieldHandler);
        }
        registry.register_kind(FieldKind::Array, FoldoutHandler);
        registry.register_kind(FieldKind::Struct, FoldoutHandler);
        registry.register_kind(FieldKind::ScriptRef, ScriptFieldHandler);
        registry
    }

    pub fn register_kind(&mut self, kind: FieldKind, handler: impl PropertyHandler + 'static) {
        self.defaults.insert(kind, Box::new(handler));
        self.generation += 1;
    }

    pub fn register_drawer(&mut self, type_name: impl Into<String>, handler: impl PropertyHandler + 'static) {
        self.drawers.insert(type_name.into(), Box::new(handler));
        self.generation += 1;
    }

    pub fn remove_drawer(&mut self, type_name: &str) -> bool {
        let removed = self.drawers.remove(type_name).is_some();
        if removed {
            self.generation += 1;
        }
        removed
    }

    /// Bumped on every registration change; cached layouts built against an
    /// older generation are stale.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn handler_for(&self, field: &FieldView<'_>) -> Option<&dyn PropertyHandler> {
        field
            .type_name()
            .and_then(|type_name| self.drawers.get(type_name))
            .or_else(|| self.defaults.get(&field.kind()))
            .map(|handler| &**handler)
    }
}

impl Default for HandlerRegistry {
    fn default() -> Self {
        Self::with_builtin()
    }
}

/// Splits a field row into the indented label column and the value column.
pub fn split_row(rect: Rect, depth: usize, layout: &LayoutConfig) -> (Rect, Rect) {
    let indent = depth as f32 * layout.indent_width;
    let label_width = (rect.width() * layout.label_width_fraction).max(layout.min_label_width).min(rect.width());
    let label = Rect::from_min_max(
        egui::pos2((rect.left() + indent).min(rect.left() + label_width), rect.top()),
        egui::pos2(rect.left() + label_width, rect.bottom()),
    );
    let value = Rect::from_min_max(egui::pos2(rect.left() + label_width, rect.top()), rect.max);
    (label, value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::{DocumentTarget, FieldNode, SerializedObject, TargetTypeInfo};

    fn view() -> SerializedObject {
        SerializedObject::new(&[DocumentTarget::new(
            TargetTypeInfo::derived("Curve"),
            vec![
                FieldNode::float("weight", 1.0),
                FieldNode::float("curve", 0.0).with_type_name("AnimationCurve"),
                FieldNode::structure("unknown", Vec::new()),
            ],
        )])
    }

    #[test]
    fn custom_drawer_wins_over_kind_default() {
        let view = view();
        let mut registry = HandlerRegistry::with_builtin();
        let layout = LayoutConfig::default();
        let curve = view.find("curve").expect("curve field");
        let default_height = registry.handler_for(&curve).map(|h| h.height(&curve, &layout));
        assert_eq!(default_height, Some(18.0));
        registry.register_drawer("AnimationCurve", CustomDrawer::new(60.0, |_, _, _, _| false));
        let custom_height = registry.handler_for(&curve).map(|h| h.height(&curve, &layout));
        assert_eq!(custom_height, Some(60.0));
    }

    #[test]
    fn generation_moves_on_registration_changes() {
        let mut registry = HandlerRegistry::with_builtin();
        let start = registry.generation();
        registry.register_drawer("AnimationCurve", CustomDrawer::new(40.0, |_, _, _, _| false));
        assert!(registry.generation() > start);
        let after_register = registry.generation();
        assert!(!registry.remove_drawer("Gradient"));
        assert_eq!(registry.generation(), after_register);
        assert!(registry.remove_drawer("AnimationCurve"));
        assert!(registry.generation() > after_register);
    }

    #[test]
    fn empty_registry_has_no_handlers() {
        let view = view();
        let registry = HandlerRegistry::empty();
        let field = view.find("weight").expect("weight field");
        assert!(registry.handler_for(&field).is_none());
    }

    #[test]
    fn split_row_indents_label_only() {
        let layout = LayoutConfig::default();
        let rect = Rect::from_min_size(egui::pos2(0.0, 10.0), egui::vec2(400.0, 18.0));
        let (label, value) = split_row(rect, 2, &layout);
        assert_eq!(label.left(), 30.0);
        assert_eq!(label.right(), 180.0);
        assert_eq!(value.left(), 180.0);
        assert_eq!(value.right(), 400.0);
    }
}

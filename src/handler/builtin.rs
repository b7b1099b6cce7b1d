use super::{split_row, DrawContext, PropertyHandler};
use crate::config::LayoutConfig;
use crate::property::{FieldValue, FieldView};
use egui::{Rect, Ui, UiBuilder};

const MIXED_VALUE_TEXT: &str = "\u{2014}";
const MISSING_SCRIPT_TEXT: &str = "Missing (Script)";

/// Single-line editor for scalar, vector, color, enum and reference fields.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueFieldHandler;

/// Header row for structs and arrays. Children are drawn as their own rows.
#[derive(Debug, Clone, Copy, Default)]
pub struct FoldoutHandler;

/// The target's script reference.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptFieldHandler;

impl PropertyHandler for ValueFieldHandler {
    fn height(&self, _field: &FieldView<'_>, layout: &LayoutConfig) -> f32 {
        layout.single_line_height
    }

    fn on_gui(&self, ui: &mut Ui, rect: Rect, field: &FieldView<'_>, cx: &mut DrawContext<'_>) -> bool {
        let (label_rect, value_rect) = split_row(rect, field.depth(), cx.layout);
        ui.put(label_rect, egui::Label::new(field.display_name()).truncate());
        if field.has_mixed_value() {
            ui.put(value_rect, egui::Label::new(MIXED_VALUE_TEXT));
            return false;
        }
        let path = field.path();
        match field.value() {
            FieldValue::Bool(value) => {
                let mut value = *value;
                if ui.put(value_rect, egui::Checkbox::without_text(&mut value)).changed() {
                    cx.edits.push(path, FieldValue::Bool(value));
                }
            }
            FieldValue::Integer(value) => {
                let mut value = *value;
                if ui.put(value_rect, egui::DragValue::new(&mut value)).changed() {
                    cx.edits.push(path, FieldValue::Integer(value));
                }
            }
            FieldValue::Float(value) => {
                let mut value = *value;
                if ui.put(value_rect, egui::DragValue::new(&mut value).speed(0.01)).changed() {
                    cx.edits.push(path, FieldValue::Float(value));
                }
            }
            FieldValue::Text(value) => {
                let mut value = value.clone();
                if ui.put(value_rect, egui::TextEdit::singleline(&mut value)).changed() {
                    cx.edits.push(path, FieldValue::Text(value));
                }
            }
            FieldValue::Vector2(value) => {
                let mut value = *value;
                if drag_components(ui, value_rect, &mut value) {
                    cx.edits.push(path, FieldValue::Vector2(value));
                }
            }
            FieldValue::Vector3(value) => {
                let mut value = *value;
                if drag_components(ui, value_rect, &mut value) {
                    cx.edits.push(path, FieldValue::Vector3(value));
                }
            }
            FieldValue::Color(value) => {
                let mut rgba = *value;
                let mut child = ui.new_child(UiBuilder::new().max_rect(value_rect));
                if child.color_edit_button_rgba_unmultiplied(&mut rgba).changed() {
                    cx.edits.push(path, FieldValue::Color(rgba));
                }
            }
            FieldValue::Enum { selected, options } => {
                let mut index = *selected;
                let mut child = ui.new_child(UiBuilder::new().max_rect(value_rect));
                let current = options.get(index).cloned().unwrap_or_default();
                let response = egui::ComboBox::from_id_salt(cx.id)
                    .selected_text(current)
                    .width(value_rect.width())
                    .show_index(&mut child, &mut index, options.len(), |i| options[i].clone());
                if response.changed() && index != *selected {
                    cx.edits.push(path, FieldValue::Enum { selected: index, options: options.clone() });
                }
            }
            FieldValue::ObjectRef(reference) => {
                let text = reference.clone().unwrap_or_else(|| "None (Object)".to_string());
                ui.put(value_rect, egui::Label::new(text).truncate());
            }
            FieldValue::ArraySize(len) => {
                ui.put(value_rect, egui::Label::new(format!("{len} elements")));
            }
            FieldValue::None => {
                ui.put(value_rect, egui::Label::new(egui::RichText::new("(no value)").weak()));
            }
        }
        false
    }
}

fn drag_components<const N: usize>(ui: &mut Ui, rect: Rect, values: &mut [f32; N]) -> bool {
    let width = rect.width() / N as f32;
    let mut changed = false;
    for (i, component) in values.iter_mut().enumerate() {
        let cell = Rect::from_min_size(
            egui::pos2(rect.left() + width * i as f32, rect.top()),
            egui::vec2(width, rect.height()),
        );
        changed |= ui.put(cell, egui::DragValue::new(component).speed(0.01)).changed();
    }
    changed
}

impl PropertyHandler for FoldoutHandler {
    fn height(&self, _field: &FieldView<'_>, layout: &LayoutConfig) -> f32 {
        layout.single_line_height
    }

    fn on_gui(&self, ui: &mut Ui, rect: Rect, field: &FieldView<'_>, cx: &mut DrawContext<'_>) -> bool {
        let (label_rect, value_rect) = split_row(rect, field.depth(), cx.layout);
        let mut expanded = field.is_expanded();
        let arrow = if expanded { "\u{25BC}" } else { "\u{25B6}" };
        let header = egui::Button::new(format!("{arrow} {}", field.display_name())).frame(false);
        if ui.put(label_rect, header).clicked() && field.has_visible_children() {
            expanded = !expanded;
        }
        if let FieldValue::ArraySize(len) = field.value() {
            let text = if field.has_mixed_value() { MIXED_VALUE_TEXT.to_string() } else { format!("{len} elements") };
            ui.put(value_rect, egui::Label::new(egui::RichText::new(text).weak()));
        }
        expanded
    }
}

impl PropertyHandler for ScriptFieldHandler {
    fn height(&self, _field: &FieldView<'_>, layout: &LayoutConfig) -> f32 {
        layout.single_line_height
    }

    fn on_gui(&self, ui: &mut Ui, rect: Rect, field: &FieldView<'_>, cx: &mut DrawContext<'_>) -> bool {
        let (label_rect, value_rect) = split_row(rect, field.depth(), cx.layout);
        ui.put(label_rect, egui::Label::new(field.display_name()));
        let current = match field.value() {
            FieldValue::ObjectRef(Some(script)) => Some(script.as_str()),
            _ => None,
        };
        if !ui.is_enabled() {
            let text = current.unwrap_or(MISSING_SCRIPT_TEXT);
            ui.put(value_rect, egui::Label::new(egui::RichText::new(text).monospace()).truncate());
            return false;
        }
        let mut text = current.unwrap_or_default().to_string();
        let editor = egui::TextEdit::singleline(&mut text)
            .hint_text(MISSING_SCRIPT_TEXT)
            .font(egui::TextStyle::Monospace);
        if ui.put(value_rect, editor).changed() {
            cx.edits.push(field.path(), script_reference(&text));
        }
        false
    }
}

/// Script reference typed into the identity field; blank clears it.
fn script_reference(text: &str) -> FieldValue {
    let name = text.trim();
    FieldValue::ObjectRef((!name.is_empty()).then(|| name.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn script_reference_trims_and_clears_on_blank() {
        assert_eq!(script_reference("  Mover "), FieldValue::ObjectRef(Some("Mover".to_string())));
        assert_eq!(script_reference("   "), FieldValue::ObjectRef(None));
        assert_eq!(script_reference(""), FieldValue::ObjectRef(None));
    }
}

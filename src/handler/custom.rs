use super::{DrawContext, PropertyHandler};
use crate::config::LayoutConfig;
use crate::property::FieldView;
use egui::{Rect, Ui};

/// Closure-backed drawer with a fixed height, registered per field type name.
pub struct CustomDrawer<F> {
    height: f32,
    cacheable: bool,
    draw: F,
}

impl<F> CustomDrawer<F>
where
    F: Fn(&mut Ui, Rect, &FieldView<'_>, &mut DrawContext<'_>) -> bool,
{
    pub fn new(height: f32, draw: F) -> Self {
        Self { height: height.max(0.0), cacheable: true, draw }
    }

    /// Marks the drawer as depending on per-frame state, which disables
    /// height caching for every target that shows it.
    pub fn dynamic(mut self) -> Self {
        self.cacheable = false;
        self
    }
}

impl<F> PropertyHandler for CustomDrawer<F>
where
    F: Fn(&mut Ui, Rect, &FieldView<'_>, &mut DrawContext<'_>) -> bool,
{
    fn can_cache_inspector_gui(&self, _field: &FieldView<'_>) -> bool {
        self.cacheable
    }

    fn height(&self, _field: &FieldView<'_>, _layout: &LayoutConfig) -> f32 {
        self.height
    }

    fn on_gui(&self, ui: &mut Ui, rect: Rect, field: &FieldView<'_>, cx: &mut DrawContext<'_>) -> bool {
        (self.draw)(ui, rect, field, cx)
    }
}

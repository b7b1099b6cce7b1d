use super::serialized::{FieldView, SerializedObject};

/// Cursor over the visible fields of a [`SerializedObject`].
///
/// The cursor borrows the view only for the duration of each call, so the
/// caller may update expansion state between steps. Create a fresh cursor
/// per pass.
#[derive(Debug, Clone, Default)]
pub struct PropertyIterator {
    current: Option<usize>,
    started: bool,
}

impl PropertyIterator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reset(&mut self) {
        self.current = None;
        self.started = false;
    }

    /// Advances to the next visible field. When `enter_children` is false the
    /// current field's subtree is skipped. The first step always lands on the
    /// first visible field.
    pub fn next_visible(&mut self, view: &SerializedObject, enter_children: bool) -> bool {
        let mut next = match (self.current, self.started) {
            (None, false) => 0,
            (None, true) => return false,
            (Some(index), _) => {
                let enter = enter_children && view.field(index).is_some_and(|field| field.has_visible_children());
                if enter {
                    index + 1
                } else {
                    view.subtree_end(index)
                }
            }
        };
        self.started = true;
        while next < view.len() && view.is_hidden(next) {
            next = view.subtree_end(next);
        }
        if next < view.len() {
            self.current = Some(next);
            true
        } else {
            self.current = None;
            false
        }
    }

    pub fn index(&self) -> Option<usize> {
        self.current
    }

    pub fn field<'a>(&self, view: &'a SerializedObject) -> Option<FieldView<'a>> {
        self.current.and_then(|index| view.field(index))
    }
}

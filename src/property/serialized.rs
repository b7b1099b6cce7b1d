use super::target::{InspectTarget, TargetTypeInfo};
use super::{display_name, join_path, FieldKind, FieldNode, FieldValue};
use crate::config::EditMode;
use bitflags::bitflags;
use smallvec::SmallVec;
use std::collections::HashMap;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct FieldFlags: u8 {
        const READ_ONLY = 1 << 0;
        const HIDDEN = 1 << 1;
        const DEBUG_ONLY = 1 << 2;
        const HAS_VISIBLE_CHILDREN = 1 << 3;
        const EXPANDED = 1 << 4;
        const MIXED_VALUE = 1 << 5;
    }
}

#[derive(Debug, Clone)]
struct FieldEntry {
    path: String,
    name: String,
    kind: FieldKind,
    type_name: Option<String>,
    value: FieldValue,
    depth: usize,
    flags: FieldFlags,
    /// Index one past the last descendant.
    subtree_end: usize,
}

/// Flattened, refreshable snapshot of the selected targets' fields.
///
/// Entries are stored depth-first. Expansion state is keyed by path and
/// survives refreshes; everything else is re-read from the first target.
#[derive(Debug, Default)]
pub struct SerializedObject {
    entries: Vec<FieldEntry>,
    expanded: HashMap<String, bool>,
    type_info: Option<TargetTypeInfo>,
    target_count: usize,
    edit_mode: EditMode,
    structure: Option<blake3::Hash>,
    refreshes: u64,
    scratch: Vec<(String, FieldValue)>,
}

/// Borrowed view of one entry.
#[derive(Debug, Clone, Copy)]
pub struct FieldView<'a> {
    index: usize,
    entry: &'a FieldEntry,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PendingEdit {
    pub path: String,
    pub value: FieldValue,
}

/// Edits collected during a draw pass, committed in one batch afterwards.
#[derive(Debug, Clone, Default)]
pub struct PendingEdits {
    edits: SmallVec<[PendingEdit; 2]>,
}

impl PendingEdits {
    /// Queues an edit; a later edit to the same path replaces the earlier one.
    pub fn push(&mut self, path: impl Into<String>, value: FieldValue) {
        let path = path.into();
        if let Some(existing) = self.edits.iter_mut().find(|edit| edit.path == path) {
            existing.value = value;
        } else {
            self.edits.push(PendingEdit { path, value });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }

    pub fn len(&self) -> usize {
        self.edits.len()
    }
}

impl SerializedObject {
    pub fn new<T: InspectTarget>(targets: &[T]) -> Self {
        let mut view = Self::default();
        view.update(targets);
        view
    }

    /// Re-reads the targets into the existing allocation.
    pub fn update<T: InspectTarget>(&mut self, targets: &[T]) {
        self.entries.clear();
        self.refreshes += 1;
        self.target_count = targets.len();
        let Some(first) = targets.first() else {
            self.type_info = None;
            self.structure = None;
            return;
        };
        self.type_info = Some(first.type_info());
        let fields = first.fields();
        let debug_visible = self.edit_mode != EditMode::Normal;
        for node in &fields {
            flatten_into(&mut self.entries, &self.expanded, node, "", 0, debug_visible);
        }
        for other in &targets[1..] {
            self.scratch.clear();
            for node in &other.fields() {
                collect_values(&mut self.scratch, node, "");
            }
            mark_mixed(&mut self.entries, &self.scratch);
        }
        self.structure = Some(self.hash_structure());
    }

    pub fn set_edit_mode(&mut self, mode: EditMode) {
        self.edit_mode = mode;
    }

    pub fn edit_mode(&self) -> EditMode {
        self.edit_mode
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn target_count(&self) -> usize {
        self.target_count
    }

    pub fn type_info(&self) -> Option<&TargetTypeInfo> {
        self.type_info.as_ref()
    }

    /// Number of times the view has been (re)built from its targets.
    pub fn refresh_count(&self) -> u64 {
        self.refreshes
    }

    pub fn structure_hash(&self) -> Option<blake3::Hash> {
        self.structure
    }

    pub fn field(&self, index: usize) -> Option<FieldView<'_>> {
        self.entries.get(index).map(|entry| FieldView { index, entry })
    }

    pub fn find(&self, path: &str) -> Option<FieldView<'_>> {
        self.entries.iter().position(|entry| entry.path == path).and_then(|index| self.field(index))
    }

    pub fn set_expanded(&mut self, index: usize, expanded: bool) {
        let Some(entry) = self.entries.get_mut(index) else {
            return;
        };
        entry.flags.set(FieldFlags::EXPANDED, expanded);
        self.expanded.insert(entry.path.clone(), expanded);
    }

    pub fn set_expanded_path(&mut self, path: &str, expanded: bool) {
        match self.entries.iter().position(|entry| entry.path == path) {
            Some(index) => self.set_expanded(index, expanded),
            None => {
                self.expanded.insert(path.to_string(), expanded);
            }
        }
    }

    pub(crate) fn subtree_end(&self, index: usize) -> usize {
        self.entries.get(index).map_or(self.entries.len(), |entry| entry.subtree_end)
    }

    pub(crate) fn is_hidden(&self, index: usize) -> bool {
        self.entries.get(index).is_some_and(|entry| entry.flags.contains(FieldFlags::HIDDEN))
    }

    /// Commits `edits` to every target. Returns whether any target changed.
    pub fn apply_modified_properties<T: InspectTarget>(&mut self, targets: &mut [T], edits: &mut PendingEdits) -> bool {
        if edits.is_empty() {
            return false;
        }
        let mut changed = false;
        for edit in edits.edits.drain(..) {
            for target in targets.iter_mut() {
                changed |= target.write_field(&edit.path, &edit.value);
            }
            if let Some(entry) = self.entries.iter_mut().find(|entry| entry.path == edit.path) {
                entry.value = edit.value;
                entry.flags.remove(FieldFlags::MIXED_VALUE);
            }
        }
        changed
    }

    fn hash_structure(&self) -> blake3::Hash {
        let mut hasher = blake3::Hasher::new();
        for entry in &self.entries {
            hasher.update(entry.path.as_bytes());
            hasher.update(&[0, entry.kind as u8, entry.flags.contains(FieldFlags::HIDDEN) as u8]);
            if let Some(type_name) = &entry.type_name {
                hasher.update(type_name.as_bytes());
            }
            hasher.update(&[0xff]);
        }
        hasher.finalize()
    }
}

fn flatten_into(
    entries: &mut Vec<FieldEntry>,
    expanded: &HashMap<String, bool>,
    node: &FieldNode,
    parent: &str,
    depth: usize,
    debug_visible: bool,
) {
    let path = join_path(parent, &node.name);
    let mut flags = FieldFlags::empty();
    flags.set(FieldFlags::READ_ONLY, node.read_only);
    flags.set(FieldFlags::DEBUG_ONLY, node.debug_only);
    flags.set(FieldFlags::HIDDEN, node.hidden || (node.debug_only && !debug_visible));
    flags.set(FieldFlags::EXPANDED, expanded.get(&path).copied().unwrap_or(false));
    let has_visible_children =
        node.children.iter().any(|child| !child.hidden && (debug_visible || !child.debug_only));
    flags.set(FieldFlags::HAS_VISIBLE_CHILDREN, has_visible_children);
    let index = entries.len();
    entries.push(FieldEntry {
        path: path.clone(),
        name: node.name.clone(),
        kind: node.kind,
        type_name: node.type_name.clone(),
        value: node.value.clone(),
        depth,
        flags,
        subtree_end: index + 1,
    });
    for child in &node.children {
        flatten_into(entries, expanded, child, &path, depth + 1, debug_visible);
    }
    let end = entries.len();
    entries[index].subtree_end = end;
}

fn collect_values(out: &mut Vec<(String, FieldValue)>, node: &FieldNode, parent: &str) {
    let path = join_path(parent, &node.name);
    out.push((path.clone(), node.value.clone()));
    for child in &node.children {
        collect_values(out, child, &path);
    }
}

fn mark_mixed(entries: &mut [FieldEntry], other: &[(String, FieldValue)]) {
    for (index, entry) in entries.iter_mut().enumerate() {
        let same = match other.get(index) {
            Some((path, value)) if *path == entry.path => *value == entry.value,
            _ => other.iter().any(|(path, value)| *path == entry.path && *value == entry.value),
        };
        if !same {
            entry.flags.insert(FieldFlags::MIXED_VALUE);
        }
    }
}

impl<'a> FieldView<'a> {
    pub fn index(&self) -> usize {
        self.index
    }

    pub fn path(&self) -> &'a str {
        &self.entry.path
    }

    pub fn name(&self) -> &'a str {
        &self.entry.name
    }

    pub fn display_name(&self) -> String {
        display_name(&self.entry.name)
    }

    pub fn depth(&self) -> usize {
        self.entry.depth
    }

    pub fn kind(&self) -> FieldKind {
        self.entry.kind
    }

    pub fn type_name(&self) -> Option<&'a str> {
        self.entry.type_name.as_deref()
    }

    pub fn value(&self) -> &'a FieldValue {
        &self.entry.value
    }

    pub fn flags(&self) -> FieldFlags {
        self.entry.flags
    }

    pub fn is_expanded(&self) -> bool {
        self.entry.flags.contains(FieldFlags::EXPANDED)
    }

    pub fn has_visible_children(&self) -> bool {
        self.entry.flags.contains(FieldFlags::HAS_VISIBLE_CHILDREN)
    }

    pub fn is_read_only(&self) -> bool {
        self.entry.flags.contains(FieldFlags::READ_ONLY)
    }

    pub fn has_mixed_value(&self) -> bool {
        self.entry.flags.contains(FieldFlags::MIXED_VALUE)
    }
}

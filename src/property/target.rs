use super::{join_path, FieldKind, FieldNode, FieldValue};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// How the target's type was declared relative to the engine's base types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclaredKind {
    /// Exactly the generic behaviour base type, no user subclass detected.
    BaseBehaviour,
    /// Exactly the generic asset base type, no user subclass detected.
    BaseAsset,
    #[default]
    Derived,
    Native,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFilter {
    #[default]
    None,
    /// The type declares an audio filter callback but it is not running.
    Declared,
    Active,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetTypeInfo {
    pub type_name: String,
    #[serde(default)]
    pub declared: DeclaredKind,
    #[serde(default)]
    pub audio_filter: AudioFilter,
}

impl TargetTypeInfo {
    pub fn derived(type_name: impl Into<String>) -> Self {
        Self { type_name: type_name.into(), declared: DeclaredKind::Derived, audio_filter: AudioFilter::None }
    }

    pub fn with_declared(mut self, declared: DeclaredKind) -> Self {
        self.declared = declared;
        self
    }

    pub fn with_audio_filter(mut self, audio_filter: AudioFilter) -> Self {
        self.audio_filter = audio_filter;
        self
    }

    /// Types that always go through the fallback path, whatever the cache state.
    pub fn excludes_optimized_block(&self) -> bool {
        self.audio_filter == AudioFilter::Active
            || matches!(self.declared, DeclaredKind::BaseBehaviour | DeclaredKind::BaseAsset)
    }

    /// Base types are the ones that end up bound to a script that failed to load.
    pub fn expects_script(&self) -> bool {
        matches!(self.declared, DeclaredKind::BaseBehaviour | DeclaredKind::BaseAsset)
    }
}

/// An object edited by the inspector. Multi-selection is a slice of the same type.
pub trait InspectTarget {
    fn type_info(&self) -> TargetTypeInfo;

    /// Current serialized field tree, in declaration order.
    fn fields(&self) -> Vec<FieldNode>;

    /// Writes `value` at `path`. Returns whether the stored value changed.
    fn write_field(&mut self, path: &str, value: &FieldValue) -> bool;

    fn is_editable(&self) -> bool {
        true
    }
}

/// A target backed by a plain field tree, loadable from JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentTarget {
    pub info: TargetTypeInfo,
    #[serde(default)]
    pub fields: Vec<FieldNode>,
    #[serde(default = "DocumentTarget::default_editable")]
    pub editable: bool,
}

impl DocumentTarget {
    const fn default_editable() -> bool {
        true
    }

    pub fn new(info: TargetTypeInfo, fields: Vec<FieldNode>) -> Self {
        Self { info, fields, editable: true }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read target document {}", path.display()))?;
        let doc = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse target document {}", path.display()))?;
        Ok(doc)
    }

    pub fn find(&self, path: &str) -> Option<&FieldNode> {
        fn walk<'a>(nodes: &'a [FieldNode], parent: &str, path: &str) -> Option<&'a FieldNode> {
            for node in nodes {
                let node_path = join_path(parent, &node.name);
                if node_path == path {
                    return Some(node);
                }
                if path.starts_with(node_path.as_str()) {
                    if let Some(found) = walk(&node.children, &node_path, path) {
                        return Some(found);
                    }
                }
            }
            None
        }
        walk(&self.fields, "", path)
    }

    fn find_mut(&mut self, path: &str) -> Option<&mut FieldNode> {
        fn walk<'a>(nodes: &'a mut [FieldNode], parent: &str, path: &str) -> Option<&'a mut FieldNode> {
            for node in nodes.iter_mut() {
                let node_path = join_path(parent, &node.name);
                if node_path == path {
                    return Some(node);
                }
                if path.starts_with(node_path.as_str()) {
                    if let Some(found) = walk(&mut node.children, &node_path, path) {
                        return Some(found);
                    }
                }
            }
            None
        }
        walk(&mut self.fields, "", path)
    }
}

impl InspectTarget for DocumentTarget {
    fn type_info(&self) -> TargetTypeInfo {
        self.info.clone()
    }

    fn fields(&self) -> Vec<FieldNode> {
        self.fields.clone()
    }

    fn write_field(&mut self, path: &str, value: &FieldValue) -> bool {
        if !self.editable {
            return false;
        }
        let Some(node) = self.find_mut(path) else {
            tracing::debug!(path, "write to unknown field ignored");
            return false;
        };
        if node.read_only || node.kind == FieldKind::Array || !node.kind.accepts(value) || node.value == *value {
            return false;
        }
        node.value = value.clone();
        true
    }

    fn is_editable(&self) -> bool {
        self.editable
    }
}

pub mod iterator;
pub mod serialized;
pub mod target;

pub use iterator::PropertyIterator;
pub use serialized::{FieldFlags, FieldView, PendingEdit, PendingEdits, SerializedObject};
pub use target::{AudioFilter, DeclaredKind, DocumentTarget, InspectTarget, TargetTypeInfo};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Bool,
    Integer,
    Float,
    Text,
    Vector2,
    Vector3,
    Color,
    ObjectRef,
    Enum,
    Array,
    Struct,
    ScriptRef,
}

impl FieldKind {
    pub fn label(self) -> &'static str {
        match self {
            FieldKind::Bool => "bool",
            FieldKind::Integer => "integer",
            FieldKind::Float => "float",
            FieldKind::Text => "text",
            FieldKind::Vector2 => "vector2",
            FieldKind::Vector3 => "vector3",
            FieldKind::Color => "color",
            FieldKind::ObjectRef => "object_ref",
            FieldKind::Enum => "enum",
            FieldKind::Array => "array",
            FieldKind::Struct => "struct",
            FieldKind::ScriptRef => "script_ref",
        }
    }

    /// Whether `value` is a legal payload for a field of this kind.
    pub fn accepts(self, value: &FieldValue) -> bool {
        matches!(
            (self, value),
            (FieldKind::Bool, FieldValue::Bool(_))
                | (FieldKind::Integer, FieldValue::Integer(_))
                | (FieldKind::Float, FieldValue::Float(_))
                | (FieldKind::Text, FieldValue::Text(_))
                | (FieldKind::Vector2, FieldValue::Vector2(_))
                | (FieldKind::Vector3, FieldValue::Vector3(_))
                | (FieldKind::Color, FieldValue::Color(_))
                | (FieldKind::ObjectRef, FieldValue::ObjectRef(_))
                | (FieldKind::ScriptRef, FieldValue::ObjectRef(_))
                | (FieldKind::Enum, FieldValue::Enum { .. })
                | (FieldKind::Array, FieldValue::ArraySize(_))
                | (FieldKind::Struct, FieldValue::None)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum FieldValue {
    #[default]
    None,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
    Vector2([f32; 2]),
    Vector3([f32; 3]),
    Color([f32; 4]),
    ObjectRef(Option<String>),
    Enum { selected: usize, options: Vec<String> },
    ArraySize(usize),
}

/// One node of a target's serialized field tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldNode {
    pub name: String,
    pub kind: FieldKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_name: Option<String>,
    #[serde(default)]
    pub value: FieldValue,
    #[serde(default)]
    pub read_only: bool,
    #[serde(default)]
    pub hidden: bool,
    #[serde(default)]
    pub debug_only: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FieldNode>,
}

impl FieldNode {
    pub fn new(name: impl Into<String>, kind: FieldKind, value: FieldValue) -> Self {
        Self {
            name: name.into(),
            kind,
            type_name: None,
            value,
            read_only: false,
            hidden: false,
            debug_only: false,
            children: Vec::new(),
        }
    }

    pub fn boolean(name: impl Into<String>, value: bool) -> Self {
        Self::new(name, FieldKind::Bool, FieldValue::Bool(value))
    }

    pub fn integer(name: impl Into<String>, value: i64) -> Self {
        Self::new(name, FieldKind::Integer, FieldValue::Integer(value))
    }

    pub fn float(name: impl Into<String>, value: f64) -> Self {
        Self::new(name, FieldKind::Float, FieldValue::Float(value))
    }

    pub fn text(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self::new(name, FieldKind::Text, FieldValue::Text(value.into()))
    }

    pub fn script(name: impl Into<String>, script: Option<&str>) -> Self {
        Self::new(name, FieldKind::ScriptRef, FieldValue::ObjectRef(script.map(str::to_string)))
    }

    pub fn structure(name: impl Into<String>, children: Vec<FieldNode>) -> Self {
        Self::new(name, FieldKind::Struct, FieldValue::None).with_children(children)
    }

    /// Array node whose elements are named `[0]`, `[1]`, ...
    pub fn array(name: impl Into<String>, elements: Vec<FieldNode>) -> Self {
        let elements = elements
            .into_iter()
            .enumerate()
            .map(|(index, mut element)| {
                element.name = format!("[{index}]");
                element
            })
            .collect::<Vec<_>>();
        let len = elements.len();
        Self::new(name, FieldKind::Array, FieldValue::ArraySize(len)).with_children(elements)
    }

    pub fn with_children(mut self, children: Vec<FieldNode>) -> Self {
        self.children = children;
        self
    }

    pub fn with_type_name(mut self, type_name: impl Into<String>) -> Self {
        self.type_name = Some(type_name.into());
        self
    }

    pub fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn debug_only(mut self) -> Self {
        self.debug_only = true;
        self
    }
}

/// Joins a parent path and a child name. Array elements append without a dot.
pub fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else if name.starts_with('[') {
        format!("{parent}{name}")
    } else {
        format!("{parent}.{name}")
    }
}

/// "move_speed" / "moveSpeed" -> "Move Speed". Element names are kept as is.
pub fn display_name(name: &str) -> String {
    if name.starts_with('[') {
        return format!("Element {}", name.trim_start_matches('[').trim_end_matches(']'));
    }
    let trimmed = name.trim_start_matches("m_").trim_start_matches('_');
    let mut out = String::with_capacity(trimmed.len() + 4);
    let mut prev_lower = false;
    let mut word_start = true;
    for ch in trimmed.chars() {
        if ch == '_' || ch == ' ' {
            if !out.ends_with(' ') && !out.is_empty() {
                out.push(' ');
            }
            word_start = true;
            prev_lower = false;
            continue;
        }
        if ch.is_uppercase() && prev_lower {
            out.push(' ');
            word_start = true;
        }
        if word_start {
            out.extend(ch.to_uppercase());
        } else {
            out.push(ch);
        }
        word_start = false;
        prev_lower = ch.is_lowercase() || ch.is_ascii_digit();
    }
    out
}

pub mod cli;
pub mod config;
pub mod handler;
pub mod inspector;
pub mod property;

pub use config::{EditMode, InspectorConfig};
pub use handler::{CustomDrawer, DrawContext, HandlerRegistry, PropertyHandler};
pub use inspector::{GenericInspector, InspectorStats, OptimizedBlockState};
pub use property::{DocumentTarget, FieldKind, FieldNode, FieldValue, InspectTarget, SerializedObject};

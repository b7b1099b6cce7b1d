use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Pixel metrics shared by the height pass and the draw pass.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LayoutConfig {
    #[serde(default = "LayoutConfig::default_control_spacing")]
    pub control_spacing: f32,
    #[serde(default = "LayoutConfig::default_single_line_height")]
    pub single_line_height: f32,
    #[serde(default = "LayoutConfig::default_padding_left")]
    pub padding_left: f32,
    #[serde(default = "LayoutConfig::default_padding_right")]
    pub padding_right: f32,
    #[serde(default = "LayoutConfig::default_indent_width")]
    pub indent_width: f32,
    #[serde(default = "LayoutConfig::default_label_width_fraction")]
    pub label_width_fraction: f32,
    #[serde(default = "LayoutConfig::default_min_label_width")]
    pub min_label_width: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EditMode {
    #[default]
    Normal,
    Debug,
    DebugInternal,
}

impl EditMode {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "normal" => Some(EditMode::Normal),
            "debug" => Some(EditMode::Debug),
            "debug_internal" | "debug-internal" | "internal" => Some(EditMode::DebugInternal),
            _ => None,
        }
    }
}

/// The target's identity field (its script reference) is drawn disabled in
/// normal mode. Other modes leave it to the regular read-only rules.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct IdentityFieldConfig {
    #[serde(default = "IdentityFieldConfig::default_path")]
    pub path: String,
    #[serde(default = "IdentityFieldConfig::default_lock_in_normal_mode")]
    pub lock_in_normal_mode: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct OptimizedBlockConfig {
    #[serde(default = "OptimizedBlockConfig::default_enabled")]
    pub enabled: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Default)]
pub struct InspectorConfig {
    #[serde(default)]
    pub layout: LayoutConfig,
    #[serde(default)]
    pub identity: IdentityFieldConfig,
    #[serde(default)]
    pub edit_mode: EditMode,
    #[serde(default)]
    pub optimized_blocks: OptimizedBlockConfig,
}

#[derive(Debug, Clone, Default)]
pub struct InspectorConfigOverrides {
    pub control_spacing: Option<f32>,
    pub single_line_height: Option<f32>,
    pub edit_mode: Option<EditMode>,
    pub optimized_blocks: Option<bool>,
}

impl LayoutConfig {
    const fn default_control_spacing() -> f32 {
        2.0
    }

    const fn default_single_line_height() -> f32 {
        18.0
    }

    const fn default_padding_left() -> f32 {
        15.0
    }

    const fn default_padding_right() -> f32 {
        4.0
    }

    const fn default_indent_width() -> f32 {
        15.0
    }

    const fn default_label_width_fraction() -> f32 {
        0.45
    }

    const fn default_min_label_width() -> f32 {
        120.0
    }
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            control_spacing: Self::default_control_spacing(),
            single_line_height: Self::default_single_line_height(),
            padding_left: Self::default_padding_left(),
            padding_right: Self::default_padding_right(),
            indent_width: Self::default_indent_width(),
            label_width_fraction: Self::default_label_width_fraction(),
            min_label_width: Self::default_min_label_width(),
        }
    }
}

impl IdentityFieldConfig {
    fn default_path() -> String {
        "script".to_string()
    }

    const fn default_lock_in_normal_mode() -> bool {
        true
    }

    pub fn locks(&self, path: &str, mode: EditMode) -> bool {
        self.lock_in_normal_mode && mode == EditMode::Normal && path == self.path
    }
}

impl Default for IdentityFieldConfig {
    fn default() -> Self {
        Self { path: Self::default_path(), lock_in_normal_mode: Self::default_lock_in_normal_mode() }
    }
}

impl OptimizedBlockConfig {
    const fn default_enabled() -> bool {
        true
    }
}

impl Default for OptimizedBlockConfig {
    fn default() -> Self {
        Self { enabled: Self::default_enabled() }
    }
}

impl InspectorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes =
            fs::read(path).with_context(|| format!("Failed to read config file {}", path.display()))?;
        let cfg = serde_json::from_slice(&bytes)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(cfg)
    }

    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(cfg) => cfg,
            Err(err) => {
                tracing::warn!(error = ?err, "inspector config load failed, falling back to defaults");
                Self::default()
            }
        }
    }

    pub fn apply_overrides(&mut self, overrides: &InspectorConfigOverrides) {
        if let Some(spacing) = overrides.control_spacing {
            self.layout.control_spacing = spacing.max(0.0);
        }
        if let Some(height) = overrides.single_line_height {
            self.layout.single_line_height = height.max(0.0);
        }
        if let Some(mode) = overrides.edit_mode {
            self.edit_mode = mode;
        }
        if let Some(enabled) = overrides.optimized_blocks {
            self.optimized_blocks.enabled = enabled;
        }
    }
}

impl InspectorConfigOverrides {
    pub fn is_empty(&self) -> bool {
        self.control_spacing.is_none()
            && self.single_line_height.is_none()
            && self.edit_mode.is_none()
            && self.optimized_blocks.is_none()
    }

    pub fn applied_fields(&self) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if self.control_spacing.is_some() {
            fields.push("control_spacing");
        }
        if self.single_line_height.is_some() {
            fields.push("single_line_height");
        }
        if self.edit_mode.is_some() {
            fields.push("edit_mode");
        }
        if self.optimized_blocks.is_some() {
            fields.push("optimized_blocks");
        }
        fields
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_config_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        write!(file, r#"{{ "layout": {{ "control_spacing": 4.0 }}, "edit_mode": "debug" }}"#).expect("write");
        let cfg = InspectorConfig::load(file.path()).expect("load config");
        assert_eq!(cfg.layout.control_spacing, 4.0);
        assert_eq!(cfg.layout.single_line_height, 18.0);
        assert_eq!(cfg.edit_mode, EditMode::Debug);
        assert_eq!(cfg.identity.path, "script");
        assert!(cfg.optimized_blocks.enabled);
    }

    #[test]
    fn missing_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().expect("temp dir");
        let cfg = InspectorConfig::load_or_default(dir.path().join("absent.json"));
        assert_eq!(cfg, InspectorConfig::default());
    }

    #[test]
    fn overrides_apply_and_report_fields() {
        let mut cfg = InspectorConfig::default();
        let overrides = InspectorConfigOverrides {
            control_spacing: Some(-3.0),
            optimized_blocks: Some(false),
            ..Default::default()
        };
        cfg.apply_overrides(&overrides);
        assert_eq!(cfg.layout.control_spacing, 0.0);
        assert!(!cfg.optimized_blocks.enabled);
        assert_eq!(overrides.applied_fields(), vec!["control_spacing", "optimized_blocks"]);
        assert!(InspectorConfigOverrides::default().is_empty());
    }

    #[test]
    fn identity_lock_only_applies_in_normal_mode() {
        let identity = IdentityFieldConfig::default();
        assert!(identity.locks("script", EditMode::Normal));
        assert!(!identity.locks("script", EditMode::Debug));
        assert!(!identity.locks("speed", EditMode::Normal));
        let relaxed = IdentityFieldConfig { lock_in_normal_mode: false, ..IdentityFieldConfig::default() };
        assert!(!relaxed.locks("script", EditMode::Normal));
    }
}

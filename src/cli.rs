use crate::config::{EditMode, InspectorConfigOverrides};
use anyhow::{anyhow, bail, Context, Result};
use std::env;
use std::path::PathBuf;

/// Arguments of the `inspector_probe` tool.
#[derive(Debug, Clone, PartialEq)]
pub struct ProbeArgs {
    pub document: PathBuf,
    pub config: Option<PathBuf>,
    pub width: f32,
    pub viewport_height: f32,
    pub scroll: f32,
    pub frames: u32,
    pub targets: usize,
    control_spacing: Option<f32>,
    single_line_height: Option<f32>,
    edit_mode: Option<EditMode>,
    optimized: Option<bool>,
}

impl ProbeArgs {
    pub fn parse_from_env() -> Result<Self> {
        Self::parse(env::args())
    }

    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut document: Option<PathBuf> = None;
        let mut parsed = ProbeArgs {
            document: PathBuf::new(),
            config: None,
            width: 400.0,
            viewport_height: 600.0,
            scroll: 0.0,
            frames: 2,
            targets: 1,
            control_spacing: None,
            single_line_height: None,
            edit_mode: None,
            optimized: None,
        };
        let mut iter = args.into_iter();
        let _ = iter.next(); // skip program name if present
        while let Some(raw) = iter.next() {
            let arg = raw.as_ref();
            let Some(key) = arg.strip_prefix("--") else {
                if document.replace(PathBuf::from(arg)).is_some() {
                    bail!("Unexpected argument '{arg}'. Only one target document may be given.");
                }
                continue;
            };
            let value = iter.next().ok_or_else(|| anyhow!("Expected a value after '{arg}'"))?.as_ref().to_string();
            match key {
                "config" => parsed.config = Some(PathBuf::from(value)),
                "width" => parsed.width = parse_f32("width", &value)?,
                "viewport-height" => parsed.viewport_height = parse_f32("viewport-height", &value)?,
                "scroll" => parsed.scroll = parse_f32("scroll", &value)?,
                "frames" => {
                    parsed.frames = value.parse::<u32>().with_context(|| format!("Invalid frames '{value}'"))?;
                }
                "targets" => {
                    parsed.targets = value.parse::<usize>().with_context(|| format!("Invalid targets '{value}'"))?;
                    if parsed.targets == 0 {
                        bail!("--targets must be at least 1");
                    }
                }
                "spacing" => parsed.control_spacing = Some(parse_f32("spacing", &value)?),
                "line-height" => parsed.single_line_height = Some(parse_f32("line-height", &value)?),
                "edit-mode" => {
                    parsed.edit_mode = Some(
                        EditMode::parse(&value)
                            .ok_or_else(|| anyhow!("Invalid edit-mode '{value}'. Use normal, debug or debug_internal."))?,
                    );
                }
                "optimized" => parsed.optimized = Some(parse_bool_flag("optimized", &value)?),
                _ => bail!(
                    "Unknown flag '{arg}'. Supported flags: --config, --width, --viewport-height, --scroll, \
                     --frames, --targets, --spacing, --line-height, --edit-mode, --optimized."
                ),
            }
        }
        parsed.document = document.ok_or_else(|| anyhow!("Missing target document path"))?;
        Ok(parsed)
    }

    pub fn config_overrides(&self) -> InspectorConfigOverrides {
        InspectorConfigOverrides {
            control_spacing: self.control_spacing,
            single_line_height: self.single_line_height,
            edit_mode: self.edit_mode,
            optimized_blocks: self.optimized,
        }
    }
}

fn parse_f32(flag: &str, value: &str) -> Result<f32> {
    let parsed = value.parse::<f32>().with_context(|| format!("Invalid {flag} '{value}'"))?;
    if !parsed.is_finite() {
        bail!("Invalid {flag} '{value}'. Expected a finite number.");
    }
    Ok(parsed)
}

fn parse_bool_flag(flag: &str, value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Ok(true),
        "0" | "false" | "off" | "no" => Ok(false),
        other => bail!("Invalid {flag} value '{other}'. Use on/off or true/false."),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_document_and_flags() {
        let args = ["probe", "target.json", "--width", "320", "--scroll", "40", "--edit-mode", "debug", "--optimized", "off"];
        let parsed = ProbeArgs::parse(args).expect("parse probe args");
        assert_eq!(parsed.document, PathBuf::from("target.json"));
        assert_eq!(parsed.width, 320.0);
        assert_eq!(parsed.scroll, 40.0);
        let overrides = parsed.config_overrides();
        assert_eq!(overrides.edit_mode, Some(EditMode::Debug));
        assert_eq!(overrides.optimized_blocks, Some(false));
        assert!(overrides.control_spacing.is_none());
    }

    #[test]
    fn latest_flag_wins() {
        let args = ["probe", "--frames", "1", "doc.json", "--frames", "5"];
        let parsed = ProbeArgs::parse(args).expect("parse probe args");
        assert_eq!(parsed.frames, 5);
    }

    #[test]
    fn missing_document_errors() {
        let err = ProbeArgs::parse(["probe", "--width", "100"]).unwrap_err();
        assert!(err.to_string().contains("Missing target document"), "error should mention the document");
    }

    #[test]
    fn missing_value_errors() {
        let err = ProbeArgs::parse(["probe", "doc.json", "--width"]).unwrap_err();
        assert!(err.to_string().contains("Expected a value"), "error should mention missing value");
    }

    #[test]
    fn rejects_unknown_flags_and_bad_values() {
        let err = ProbeArgs::parse(["probe", "doc.json", "--foo", "bar"]).unwrap_err();
        assert!(err.to_string().contains("Unknown flag"), "unknown flags should error");
        let err = ProbeArgs::parse(["probe", "doc.json", "--edit-mode", "wide"]).unwrap_err();
        assert!(err.to_string().contains("Invalid edit-mode"));
        assert!(ProbeArgs::parse(["probe", "doc.json", "--targets", "0"]).is_err());
    }
}

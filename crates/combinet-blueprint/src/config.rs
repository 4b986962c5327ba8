//! Compiler settings.
//!
//! Every field has a serde default, so a config file only needs the keys it
//! changes. Files are read as RON, TOML or JSON depending on their extension.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::BlueprintError;
use crate::layout::row_height;

/// Game version stamped into blueprints by default.
pub const DEFAULT_VERSION: u64 = 73_018_310_664;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlueprintConfig {
    /// Maximum wire span between two medium electric poles.
    pub pole_reach: u32,
    /// Maximum column gap bridged by a direct combinator-to-combinator wire.
    pub direct_wire_reach: u32,
    /// Spacing factor between consecutive pole rows of one color.
    pub row_step: u32,
    /// Columns past the last combinator where main outputs end.
    pub output_tap_offset: u32,
    pub version: u64,
    pub label: Option<String>,
    /// Ticks of value history allocated when the circuit is primed.
    pub history_len: usize,
}

impl Default for BlueprintConfig {
    fn default() -> Self {
        Self {
            pole_reach: 9,
            direct_wire_reach: 10,
            row_step: 5,
            output_tap_offset: 2,
            version: DEFAULT_VERSION,
            label: None,
            history_len: 60,
        }
    }
}

impl BlueprintConfig {
    /// Load settings from a `.ron`, `.toml` or `.json` file.
    pub fn load(path: &Path) -> Result<Self, BlueprintError> {
        let content = std::fs::read_to_string(path)?;
        Self::parse(path, &content)
    }

    /// Parse `content` in the format implied by `path`'s extension.
    pub fn parse(path: &Path, content: &str) -> Result<Self, BlueprintError> {
        let config_error = |detail: String| BlueprintError::Config {
            file: path.to_path_buf(),
            detail,
        };
        let config: Self = match path.extension().and_then(|e| e.to_str()) {
            Some("ron") => ron::from_str(content).map_err(|e| config_error(e.to_string()))?,
            Some("toml") => toml::from_str(content).map_err(|e| config_error(e.to_string()))?,
            Some("json") => {
                serde_json::from_str(content).map_err(|e| config_error(e.to_string()))?
            }
            _ => return Err(config_error("unsupported config format".to_string())),
        };
        config.validate().map_err(|e| match e {
            BlueprintError::InvalidConfig(detail) => config_error(detail),
            other => other,
        })?;
        Ok(config)
    }

    /// Check the settings before they reach the layout.
    ///
    /// Input stubs sit at `pole_reach - 1` and output stubs at `pole_reach`.
    /// A pole row at either height would share poles with other networks'
    /// stubs, so `row_step` values that produce one are rejected.
    pub fn validate(&self) -> Result<(), BlueprintError> {
        let invalid = |detail: String| Err(BlueprintError::InvalidConfig(detail));
        if self.pole_reach < 3 {
            return invalid("pole_reach must be at least 3".to_string());
        }
        if self.row_step == 0 {
            return invalid("row_step must be positive".to_string());
        }
        if self.history_len < 2 {
            return invalid("history_len must be at least 2".to_string());
        }
        let reach = i64::from(self.pole_reach);
        for n in 0.. {
            let row = row_height(n, self);
            if row > reach {
                break;
            }
            if row >= reach - 1 {
                return invalid(format!(
                    "row_step {} puts pole row {n} at stub height {row} for pole_reach {}",
                    self.row_step, self.pole_reach
                ));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BlueprintConfig::default();
        assert_eq!(config.pole_reach, 9);
        assert_eq!(config.direct_wire_reach, 10);
        assert_eq!(config.version, 73018310664);
        assert_eq!(config.history_len, 60);
    }

    #[test]
    fn partial_toml_keeps_defaults() {
        let config =
            BlueprintConfig::parse(Path::new("bp.toml"), "label = \"clock\"\nhistory_len = 8\n")
                .unwrap();
        assert_eq!(config.label.as_deref(), Some("clock"));
        assert_eq!(config.history_len, 8);
        assert_eq!(config.pole_reach, 9);
    }

    #[test]
    fn ron_and_json() {
        let ron = BlueprintConfig::parse(Path::new("bp.ron"), "(direct_wire_reach: 4)").unwrap();
        assert_eq!(ron.direct_wire_reach, 4);
        let json = BlueprintConfig::parse(Path::new("bp.json"), r#"{"row_step": 3}"#).unwrap();
        assert_eq!(json.row_step, 3);
    }

    #[test]
    fn rejects_unknown_extension_and_bad_values() {
        let err = BlueprintConfig::parse(Path::new("bp.yaml"), "").unwrap_err();
        assert!(matches!(err, BlueprintError::Config { .. }));
        let err = BlueprintConfig::parse(Path::new("bp.toml"), "history_len = 1").unwrap_err();
        assert!(err.to_string().contains("history_len"));
        let err = BlueprintConfig::parse(Path::new("bp.toml"), "row_step = 1").unwrap_err();
        assert!(matches!(err, BlueprintError::Config { .. }));
    }

    #[test]
    fn row_steps_reaching_stub_heights_are_rejected() {
        let with = |pole_reach, row_step| BlueprintConfig {
            pole_reach,
            row_step,
            ..BlueprintConfig::default()
        };
        assert!(BlueprintConfig::default().validate().is_ok());
        // reach 9: rows 3.. follow raw + 2 in the first band, so raw 6 and 7
        // land on the stubs at 8 and 9.
        for row_step in [1, 2, 3, 6, 7] {
            assert!(matches!(
                with(9, row_step).validate(),
                Err(BlueprintError::InvalidConfig(_))
            ));
        }
        for row_step in [4, 5, 8, 9, 13] {
            assert!(with(9, row_step).validate().is_ok(), "row_step {row_step}");
        }
        assert!(with(3, 1).validate().is_err());
        assert!(with(3, 2).validate().is_ok());
        assert!(with(2, 5).validate().is_err());
    }
}

//! Generator configuration.
//!
//! Handles loading, validating, and merging `mapcss.toml`. Stock defaults are
//! the base layer; a user file only needs the keys it wants to change.
//! Command-line flags are applied on top by the CLI after loading.
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! profile = "default"       # default | dense | custom
//!
//! [variables]               # Per-variable overrides on top of the profile
//! # segment_width_low = 2
//! # power_plant_color = "#01FFFF"
//!
//! # Voltage rules replace the profile's rules when present
//! # [[voltage_rules]]
//! # upper = 50000
//! # color = "#7c7c7c"
//! # halo = "#FFFFFF"
//!
//! [rewrite]
//! dialect = "grid"          # grid | legacy
//! z_index_base = 20         # z-index counter start for power-line rules
//!
//! [render]
//! strict = false            # fail on placeholders without a value
//! ```
//!
//! Unknown keys are rejected to catch typos early.

use crate::profile::ProfileName;
use crate::regions::{DEFAULT_Z_INDEX_BASE, Dialect, RewriteOptions};
use crate::render::Variables;
use crate::rules::RawVoltageRule;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "mapcss.toml";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
}

/// Generator configuration loaded from `mapcss.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneratorConfig {
    /// Base profile for variable values and voltage rules.
    pub profile: ProfileName,
    /// Per-variable overrides.
    pub variables: Variables,
    /// Replaces the profile's voltage rules when non-empty.
    pub voltage_rules: Vec<RawVoltageRule>,
    /// Region rewriting settings.
    pub rewrite: RewriteConfig,
    /// Placeholder rendering settings.
    pub render: RenderConfig,
}

impl GeneratorConfig {
    /// Validate config values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for (i, rule) in self.voltage_rules.iter().enumerate() {
            if rule.color.trim().is_empty() {
                return Err(ConfigError::Validation(format!(
                    "voltage_rules[{i}].color must not be empty"
                )));
            }
            if rule.halo.as_deref().is_some_and(|h| h.trim().is_empty()) {
                return Err(ConfigError::Validation(format!(
                    "voltage_rules[{i}].halo must not be empty"
                )));
            }
        }
        let catch_alls = self
            .voltage_rules
            .iter()
            .filter(|r| r.normalize().is_catch_all())
            .count();
        if catch_alls > 1 {
            return Err(ConfigError::Validation(
                "voltage_rules may contain at most one rule without bounds".into(),
            ));
        }
        Ok(())
    }
}

/// Region rewriting settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RewriteConfig {
    /// Template dialect, which selects the marker set.
    pub dialect: Dialect,
    /// Start of the power-line z-index counter.
    pub z_index_base: u32,
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self {
            dialect: Dialect::Grid,
            z_index_base: DEFAULT_Z_INDEX_BASE,
        }
    }
}

impl RewriteConfig {
    pub fn options(&self) -> RewriteOptions {
        RewriteOptions {
            dialect: self.dialect,
            z_index_base: self.z_index_base,
        }
    }
}

/// Placeholder rendering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderConfig {
    /// Fail when a placeholder has no value instead of rendering it empty.
    pub strict: bool,
}

// =============================================================================
// Config loading, merging, and validation
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    toml::Value::try_from(GeneratorConfig::default())
        .map_err(|e| ConfigError::Validation(format!("stock config does not serialize: {e}")))
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely, so a user
///   `[[voltage_rules]]` list replaces the stock list rather than extending it.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Load a config file as a raw TOML value.
///
/// Returns `Ok(None)` if the file does not exist.
pub fn load_raw_config(path: &Path) -> Result<Option<toml::Value>, ConfigError> {
    if !path.exists() {
        return Ok(None);
    }
    let content = fs::read_to_string(path)?;
    let value: toml::Value = toml::from_str(&content)?;
    Ok(Some(value))
}

/// Merge an optional overlay onto a base value, then deserialize and validate.
pub fn resolve_config(
    base: toml::Value,
    overlay: Option<toml::Value>,
) -> Result<GeneratorConfig, ConfigError> {
    let merged = match overlay {
        Some(ov) => merge_toml(base, ov),
        None => base,
    };
    let config: GeneratorConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Load `mapcss.toml` from a directory, falling back to stock defaults.
pub fn load_config(dir: &Path) -> Result<GeneratorConfig, ConfigError> {
    load_config_file(&dir.join(CONFIG_FILE))
}

/// Load a specific config file, falling back to stock defaults if absent.
pub fn load_config_file(path: &Path) -> Result<GeneratorConfig, ConfigError> {
    let base = stock_defaults_value()?;
    let overlay = load_raw_config(path)?;
    resolve_config(base, overlay)
}

/// Returns a fully-commented stock `mapcss.toml`.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# grid-mapcss Configuration
# =========================
# All settings are optional. Remove or comment out any you don't need.
# Values shown below are the defaults.
#
# Command-line flags (--profile, --set, --rule, --strict, --dialect)
# override the values in this file.
# Unknown keys will cause an error.

# Base profile for variable values and voltage rules.
#   default - optimized for normal grid density
#   dense   - thinner strokes for areas with many power features
#   custom  - default values, your overrides and your voltage rules
profile = "default"

# ---------------------------------------------------------------------------
# Variable overrides
# ---------------------------------------------------------------------------
# Any {{ variable }} used by the template. Integers, floats and strings are
# written to the style sheet as-is. Run `grid-mapcss vars <template>` to list
# the variables a template uses.
[variables]
# segment_width_low = 2
# power_plant_color = "#01FFFF"

# ---------------------------------------------------------------------------
# Voltage rules
# ---------------------------------------------------------------------------
# When present, these replace the profile's rules. Bounds are in volts; omit
# a bound (or use a negative value) for "no limit". A rule with neither bound
# styles lines without a voltage tag. Halo defaults to "#FFFFFF".
#
# [[voltage_rules]]
# color = "#FFFFFF"
# halo = "#000000"
#
# [[voltage_rules]]
# upper = 50000
# color = "#7c7c7c"
#
# [[voltage_rules]]
# lower = 50000
# color = "#00ced1"
# halo = "#000000"

# ---------------------------------------------------------------------------
# Region rewriting
# ---------------------------------------------------------------------------
[rewrite]
# Template family: "grid" (voltage classes, switchgear and power-line
# regions) or "legacy" (single line-coloring region).
dialect = "grid"

# Start of the power-line z-index counter. Every rule in voltage order takes
# the next value; the catch-all rule takes a slot but emits no z-index.
z_index_base = 20

# ---------------------------------------------------------------------------
# Rendering
# ---------------------------------------------------------------------------
[render]
# Fail instead of writing an empty value when a {{ variable }} is unknown.
strict = false
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::VariableValue;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = GeneratorConfig::default();
        assert_eq!(config.profile, ProfileName::Default);
        assert!(config.variables.is_empty());
        assert!(config.voltage_rules.is_empty());
        assert_eq!(config.rewrite.dialect, Dialect::Grid);
        assert_eq!(config.rewrite.z_index_base, 20);
        assert!(!config.render.strict);
    }

    #[test]
    fn parse_partial_config() {
        let toml = r##"
profile = "dense"

[variables]
circuit_color = "#000000"
segment_width_low = 2
"##;
        let config: GeneratorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.profile, ProfileName::Dense);
        assert_eq!(
            config.variables["circuit_color"],
            VariableValue::String("#000000".into())
        );
        assert_eq!(config.variables["segment_width_low"], VariableValue::Integer(2));
        // Default values preserved
        assert_eq!(config.rewrite.z_index_base, 20);
    }

    #[test]
    fn parse_voltage_rules() {
        let toml = r##"
[[voltage_rules]]
color = "#FFFFFF"
halo = "#000000"

[[voltage_rules]]
lower = 50000
upper = -1
color = "#00ced1"
"##;
        let config: GeneratorConfig = toml::from_str(toml).unwrap();
        assert_eq!(config.voltage_rules.len(), 2);
        assert!(config.voltage_rules[0].normalize().is_catch_all());
        assert_eq!(config.voltage_rules[1].normalize().upper, None);
    }

    #[test]
    fn rewrite_options_follow_config() {
        let toml = r#"
[rewrite]
dialect = "legacy"
z_index_base = 40
"#;
        let config: GeneratorConfig = toml::from_str(toml).unwrap();
        let options = config.rewrite.options();
        assert_eq!(options.dialect, Dialect::Legacy);
        assert_eq!(options.z_index_base, 40);
    }

    // =========================================================================
    // load_config tests
    // =========================================================================

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.profile, ProfileName::Default);
    }

    #[test]
    fn load_config_reads_file() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
profile = "custom"

[render]
strict = true
"#,
        )
        .unwrap();

        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.profile, ProfileName::Custom);
        assert!(config.render.strict);
        // Unspecified values should be defaults
        assert_eq!(config.rewrite.dialect, Dialect::Grid);
    }

    #[test]
    fn load_config_invalid_toml_is_error() {
        let tmp = TempDir::new().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "this is not valid toml [[[").unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn load_config_validates_values() {
        let tmp = TempDir::new().unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
[[voltage_rules]]
upper = 1000
color = ""
"#,
        )
        .unwrap();

        let result = load_config(tmp.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    // =========================================================================
    // Unknown key rejection tests
    // =========================================================================

    #[test]
    fn unknown_key_rejected() {
        let result: Result<GeneratorConfig, _> = toml::from_str("profil = \"dense\"");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("unknown field"));
    }

    #[test]
    fn unknown_profile_rejected() {
        let result: Result<GeneratorConfig, _> = toml::from_str("profile = \"sparse\"");
        assert!(result.is_err());
    }

    #[test]
    fn unknown_rule_key_rejected() {
        let toml = r##"
[[voltage_rules]]
lower = 0
colour = "#fff"
"##;
        let result: Result<GeneratorConfig, _> = toml::from_str(toml);
        assert!(result.is_err());
    }

    // =========================================================================
    // Validation tests
    // =========================================================================

    #[test]
    fn validate_default_config_passes() {
        assert!(GeneratorConfig::default().validate().is_ok());
    }

    #[test]
    fn validate_rejects_two_catch_all_rules() {
        let mut config = GeneratorConfig::default();
        config.voltage_rules = vec![
            RawVoltageRule::new(None, None, "#FFFFFF"),
            RawVoltageRule::new(Some(-1), Some(-1), "#000000"),
        ];
        let err = config.validate().unwrap_err();
        assert!(err.to_string().contains("at most one"));
    }

    #[test]
    fn validate_rejects_blank_halo() {
        let mut config = GeneratorConfig::default();
        config.voltage_rules = vec![RawVoltageRule::new(Some(0), Some(1), "#fff").with_halo(" ")];
        assert!(config.validate().is_err());
    }

    // =========================================================================
    // merge_toml tests
    // =========================================================================

    #[test]
    fn merge_toml_scalar_override() {
        let base: toml::Value = toml::from_str(r#"profile = "default""#).unwrap();
        let overlay: toml::Value = toml::from_str(r#"profile = "dense""#).unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged.get("profile").unwrap().as_str(), Some("dense"));
    }

    #[test]
    fn merge_toml_table_merge() {
        let base: toml::Value = toml::from_str(
            r#"
[rewrite]
dialect = "grid"
z_index_base = 20
"#,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[rewrite]
z_index_base = 30
"#,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let rewrite = merged.get("rewrite").unwrap();
        assert_eq!(rewrite.get("z_index_base").unwrap().as_integer(), Some(30));
        assert_eq!(rewrite.get("dialect").unwrap().as_str(), Some("grid"));
    }

    #[test]
    fn merge_toml_replaces_rule_lists() {
        let base: toml::Value = toml::from_str(
            r##"
[[voltage_rules]]
upper = 1
color = "#111111"

[[voltage_rules]]
lower = 1
color = "#222222"
"##,
        )
        .unwrap();
        let overlay: toml::Value = toml::from_str(
            r##"
[[voltage_rules]]
color = "#333333"
"##,
        )
        .unwrap();
        let merged = merge_toml(base, overlay);
        let rules = merged.get("voltage_rules").unwrap().as_array().unwrap();
        assert_eq!(rules.len(), 1);
    }

    // =========================================================================
    // resolve_config / load_raw_config tests
    // =========================================================================

    #[test]
    fn load_raw_config_returns_none_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let result = load_raw_config(&tmp.path().join(CONFIG_FILE)).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn resolve_config_with_overlay() {
        let base = stock_defaults_value().unwrap();
        let overlay: toml::Value = toml::from_str(
            r#"
[variables]
circuit_width = 6
"#,
        )
        .unwrap();
        let config = resolve_config(base, Some(overlay)).unwrap();
        assert_eq!(config.variables["circuit_width"], VariableValue::Integer(6));
        assert_eq!(config.profile, ProfileName::Default);
    }

    // =========================================================================
    // stock_config_toml tests
    // =========================================================================

    #[test]
    fn stock_config_toml_is_valid_toml() {
        let content = stock_config_toml();
        let _: toml::Value = toml::from_str(content).expect("stock config must be valid TOML");
    }

    #[test]
    fn stock_config_toml_roundtrips_to_defaults() {
        let config: GeneratorConfig = toml::from_str(stock_config_toml()).unwrap();
        assert_eq!(config.profile, ProfileName::Default);
        assert!(config.variables.is_empty());
        assert!(config.voltage_rules.is_empty());
        assert_eq!(config.rewrite.dialect, Dialect::Grid);
        assert_eq!(config.rewrite.z_index_base, 20);
        assert!(!config.render.strict);
    }

    #[test]
    fn stock_defaults_value_has_all_sections() {
        let val = stock_defaults_value().unwrap();
        assert!(val.is_table());
        assert!(val.get("profile").is_some());
        assert!(val.get("rewrite").is_some());
        assert!(val.get("render").is_some());
    }
}

//! Built-in style profiles.
//!
//! A profile is a complete preset: a value for every stock template variable
//! plus a voltage rule list. The `default` and `dense` presets ship as TOML
//! assets compiled into the binary; `custom` starts from `default` and layers
//! user overrides on top.
//!
//! ## Asset Format
//!
//! ```toml
//! [metadata]
//! name = "dense"
//! description = "Better for areas with many power features"
//!
//! [variables]
//! segment_width_low = 1
//! substation_area_width_low = 0.5
//! power_plant_color = "#01FFFF"
//!
//! [[voltage_rules]]
//! upper = 50000
//! color = "#7c7c7c"
//! halo = "#FFFFFF"
//! ```

use crate::render::Variables;
use crate::rules::RawVoltageRule;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use tracing::info;

const DEFAULT_ASSET: &str = include_str!("../profiles/default.toml");
const DENSE_ASSET: &str = include_str!("../profiles/dense.toml");

#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("profile asset `{name}` is invalid: {source}")]
    Asset {
        name: &'static str,
        #[source]
        source: toml::de::Error,
    },
    #[error("unknown profile `{0}` (expected default, dense or custom)")]
    UnknownProfile(String),
}

/// Profile selector as written in config files and on the command line.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProfileName {
    #[default]
    Default,
    Dense,
    Custom,
}

impl ProfileName {
    pub const ALL: [ProfileName; 3] = [Self::Default, Self::Dense, Self::Custom];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Dense => "dense",
            Self::Custom => "custom",
        }
    }
}

impl fmt::Display for ProfileName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProfileName {
    type Err = ProfileError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "default" => Ok(Self::Default),
            "dense" => Ok(Self::Dense),
            "custom" => Ok(Self::Custom),
            _ => Err(ProfileError::UnknownProfile(s.to_string())),
        }
    }
}

/// User-supplied values for the custom profile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CustomProfile {
    /// Per-key overrides on top of the default variables.
    pub variables: Variables,
    /// Replaces the default rules when non-empty.
    pub voltage_rules: Vec<RawVoltageRule>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Profile {
    Default,
    Dense,
    Custom(CustomProfile),
}

/// A resolved profile, ready for a generation run.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfileData {
    pub name: String,
    pub description: Option<String>,
    pub variables: Variables,
    pub voltage_rules: Vec<RawVoltageRule>,
}

impl ProfileData {
    /// Overwrite variables key by key; keys not in `overrides` keep their value.
    pub fn apply_overrides(&mut self, overrides: &Variables) {
        for (key, value) in overrides {
            self.variables.insert(key.clone(), value.clone());
        }
    }
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct ProfileAsset {
    metadata: Option<AssetMetadata>,
    #[serde(default)]
    variables: Variables,
    #[serde(default)]
    voltage_rules: Vec<RawVoltageRule>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct AssetMetadata {
    name: Option<String>,
    description: Option<String>,
}

fn load_asset(name: &'static str, content: &str) -> Result<ProfileData, ProfileError> {
    let asset: ProfileAsset =
        toml::from_str(content).map_err(|source| ProfileError::Asset { name, source })?;
    let metadata = asset.metadata;
    Ok(ProfileData {
        name: metadata
            .as_ref()
            .and_then(|m| m.name.clone())
            .unwrap_or_else(|| name.to_string()),
        description: metadata.and_then(|m| m.description),
        variables: asset.variables,
        voltage_rules: asset.voltage_rules,
    })
}

impl Profile {
    pub fn name(&self) -> ProfileName {
        match self {
            Profile::Default => ProfileName::Default,
            Profile::Dense => ProfileName::Dense,
            Profile::Custom(_) => ProfileName::Custom,
        }
    }

    /// Load the profile's variables and voltage rules.
    pub fn resolve(&self) -> Result<ProfileData, ProfileError> {
        match self {
            Profile::Default => load_asset("default", DEFAULT_ASSET),
            Profile::Dense => load_asset("dense", DENSE_ASSET),
            Profile::Custom(custom) => {
                let mut data = load_asset("default", DEFAULT_ASSET)?;
                data.name = "custom".to_string();
                data.description = Some("Default values with user overrides".to_string());
                data.apply_overrides(&custom.variables);
                if custom.voltage_rules.is_empty() {
                    info!("no custom voltage rules provided, using the default rules");
                } else {
                    data.voltage_rules = custom.voltage_rules.clone();
                }
                Ok(data)
            }
        }
    }
}

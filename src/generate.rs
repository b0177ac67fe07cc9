//! Style sheet generation.
//!
//! Ties the engine together for one run:
//!
//! ```text
//! config ─► profile ─► variables ──────────────────────┐
//!                  └─► raw rules ─► VoltageRuleSet ─┐   │
//! template ─────────────────────► rewrite regions ──┴─► render ─► style sheet
//! ```
//!
//! [`run`] is string-in/string-out and does no I/O. [`read_template`] and
//! [`write_output`] are the file boundary used by the CLI.

use crate::catalog::extract_variables;
use crate::config::{ConfigError, GeneratorConfig};
use crate::profile::{CustomProfile, Profile, ProfileData, ProfileError, ProfileName};
use crate::regions::rewrite_with;
use crate::render::{self, RenderError};
use crate::rules::{RangeWarning, VoltageRuleSet, build_rule_set};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("template not found: {}", .0.display())]
    TemplateNotFound(PathBuf),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Render(#[from] RenderError),
    #[error(transparent)]
    Profile(#[from] ProfileError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Everything produced by one generation run.
#[derive(Debug, Clone)]
pub struct Generation {
    /// The finished style sheet.
    pub output: String,
    /// Name of the resolved profile.
    pub profile: String,
    /// User variables referenced by the template, first occurrence first.
    pub variables: Vec<String>,
    /// Placeholders that rendered empty.
    pub unresolved: Vec<String>,
    pub rules: VoltageRuleSet,
    pub warnings: Vec<RangeWarning>,
    /// Regions found and regenerated.
    pub rewritten: Vec<&'static str>,
    /// Regions whose markers were not found.
    pub skipped: Vec<&'static str>,
}

/// Resolve the configured profile with variable and rule overrides applied.
pub fn resolve_profile(config: &GeneratorConfig) -> Result<ProfileData, ProfileError> {
    let preset = match config.profile {
        ProfileName::Default => Profile::Default,
        ProfileName::Dense => Profile::Dense,
        ProfileName::Custom => {
            // The custom profile applies the overrides itself.
            return Profile::Custom(CustomProfile {
                variables: config.variables.clone(),
                voltage_rules: config.voltage_rules.clone(),
            })
            .resolve();
        }
    };
    let mut data = preset.resolve()?;
    data.apply_overrides(&config.variables);
    if !config.voltage_rules.is_empty() {
        data.voltage_rules = config.voltage_rules.clone();
    }
    Ok(data)
}

/// Generate a style sheet from template text.
pub fn run(template: &str, config: &GeneratorConfig) -> Result<Generation, GenerateError> {
    let profile = resolve_profile(config)?;
    info!(profile = %profile.name, rules = profile.voltage_rules.len(), "resolved profile");

    let (rules, warnings) = build_rule_set(&profile.voltage_rules);
    for warning in &warnings {
        warn!("{warning}");
    }

    let rewrite = rewrite_with(template, &rules, &config.rewrite.options());
    let unresolved = render::unresolved(&rewrite.text, &profile.variables);
    let output = if config.render.strict {
        render::render_strict(&rewrite.text, &profile.variables)?
    } else {
        render::render(&rewrite.text, &profile.variables)
    };

    Ok(Generation {
        output,
        profile: profile.name,
        variables: extract_variables(template),
        unresolved,
        rules,
        warnings,
        rewritten: rewrite.rewritten,
        skipped: rewrite.skipped,
    })
}

/// Read a template file as UTF-8.
pub fn read_template(path: &Path) -> Result<String, GenerateError> {
    if !path.exists() {
        return Err(GenerateError::TemplateNotFound(path.to_path_buf()));
    }
    Ok(fs::read_to_string(path)?)
}

/// Write the finished style sheet, creating parent directories as needed.
pub fn write_output(path: &Path, output: &str) -> Result<(), GenerateError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, output)?;
    Ok(())
}

/// `output_<template file name>` in the current directory.
pub fn default_output_path(template: &Path) -> PathBuf {
    let name = template
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "style.mapcss".to_string());
    PathBuf::from(format!("output_{name}"))
}

//! Final placeholder substitution.
//!
//! Every `{{ name }}` in the rewritten template is replaced by the string
//! form of its value. Unknown names render as an empty string by default;
//! [`render_strict`] turns them into an error instead.

use crate::catalog::placeholder_pattern;
use regex::Captures;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RenderError {
    #[error("unresolved template variables: {}", .0.join(", "))]
    Unresolved(Vec<String>),
}

/// A scalar template value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum VariableValue {
    Integer(i64),
    Float(f64),
    String(String),
}

impl VariableValue {
    /// Infer a value from user input: integer, then float, then string.
    pub fn infer(input: &str) -> Self {
        let trimmed = input.trim();
        if let Ok(i) = trimmed.parse::<i64>() {
            VariableValue::Integer(i)
        } else if let Ok(f) = trimmed.parse::<f64>() {
            VariableValue::Float(f)
        } else {
            VariableValue::String(input.to_string())
        }
    }
}

impl fmt::Display for VariableValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VariableValue::Integer(i) => write!(f, "{i}"),
            // Integral floats keep their `.0`, as written in the profile.
            VariableValue::Float(x) if x.fract() == 0.0 && x.abs() < 1e15 => write!(f, "{x:.1}"),
            VariableValue::Float(x) => write!(f, "{x}"),
            VariableValue::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for VariableValue {
    fn from(value: i64) -> Self {
        VariableValue::Integer(value)
    }
}

impl From<f64> for VariableValue {
    fn from(value: f64) -> Self {
        VariableValue::Float(value)
    }
}

impl From<&str> for VariableValue {
    fn from(value: &str) -> Self {
        VariableValue::String(value.to_string())
    }
}

/// Variable name → value for one generation run.
pub type Variables = BTreeMap<String, VariableValue>;

/// Substitute placeholders; unknown names become the empty string.
pub fn render(template: &str, variables: &Variables) -> String {
    placeholder_pattern()
        .replace_all(template, |caps: &Captures| {
            let name = caps[1].trim();
            match variables.get(name) {
                Some(value) => value.to_string(),
                None => {
                    debug!(variable = name, "unresolved variable rendered as empty");
                    String::new()
                }
            }
        })
        .into_owned()
}

/// Substitute placeholders, failing if any name has no value.
pub fn render_strict(template: &str, variables: &Variables) -> Result<String, RenderError> {
    let missing = unresolved(template, variables);
    if !missing.is_empty() {
        return Err(RenderError::Unresolved(missing));
    }
    Ok(render(template, variables))
}

/// Names referenced by the template but absent from `variables`, in
/// first-occurrence order.
pub fn unresolved(template: &str, variables: &Variables) -> Vec<String> {
    let mut missing: Vec<String> = Vec::new();
    for caps in placeholder_pattern().captures_iter(template) {
        let name = caps[1].trim();
        if !variables.contains_key(name) && !missing.iter().any(|m| m == name) {
            missing.push(name.to_string());
        }
    }
    missing
}

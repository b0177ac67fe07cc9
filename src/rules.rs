//! Voltage rules: parsing, normalization, ordering and consistency checks.
//!
//! A rule binds a voltage band to a line color and a text halo color. Raw
//! rules come from a profile asset, the config file, `--rule` flags or a
//! rules file; [`build_rule_set`] turns them into a sorted [`VoltageRuleSet`]
//! that the region generators consume.
//!
//! ## Raw Input
//!
//! Bounds are signed on input: a negative value is the sentinel for "no
//! bound". When both bounds are given they may be in either order; the
//! smaller becomes the lower bound.
//!
//! ```text
//! 50000 132000 #deb887 #000000   → 50 kV to 132 kV, halo black
//! 132000 50000 #deb887           → same band, default white halo
//! -1 50000 #7c7c7c               → below 50 kV
//! -1 -1 #FFFFFF #000000          → catch-all (undefined voltage)
//! ```
//!
//! ## Consistency
//!
//! Overlapping bands are reported as [`RangeWarning`]s, never rejected. The
//! rule set keeps the rules exactly as given (after sorting).

use crate::naming;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Halo color used when a rule does not specify one.
pub const DEFAULT_HALO: &str = "#FFFFFF";

/// A rule line that could not be parsed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("expected `lower upper color [halo]`, got {found} field(s)")]
    Arity { found: usize },
    #[error("voltage bound `{value}` is not an integer")]
    InvalidBound { value: String },
}

/// A rule exactly as supplied, before normalization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RawVoltageRule {
    /// Lower bound in volts; absent or negative means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lower: Option<i64>,
    /// Upper bound in volts; absent or negative means unbounded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub upper: Option<i64>,
    /// Line color (hex).
    pub color: String,
    /// Text halo color (hex). Defaults to [`DEFAULT_HALO`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub halo: Option<String>,
}

impl RawVoltageRule {
    pub fn new(lower: Option<i64>, upper: Option<i64>, color: &str) -> Self {
        Self {
            lower,
            upper,
            color: color.to_string(),
            halo: None,
        }
    }

    pub fn with_halo(mut self, halo: &str) -> Self {
        self.halo = Some(halo.to_string());
        self
    }

    /// Normalize into a [`VoltageRule`]: negative sentinels become `None`,
    /// transposed bounds are swapped and the halo is defaulted.
    pub fn normalize(&self) -> VoltageRule {
        let lower = self.lower.and_then(unsigned_bound);
        let upper = self.upper.and_then(unsigned_bound);
        let (lower, upper) = match (lower, upper) {
            (Some(a), Some(b)) => (Some(a.min(b)), Some(a.max(b))),
            other => other,
        };
        VoltageRule {
            lower,
            upper,
            color: self.color.clone(),
            halo: self
                .halo
                .clone()
                .unwrap_or_else(|| DEFAULT_HALO.to_string()),
        }
    }
}

impl FromStr for RawVoltageRule {
    type Err = RuleError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_rule_line(s)
    }
}

fn unsigned_bound(value: i64) -> Option<u64> {
    u64::try_from(value).ok()
}

/// A normalized voltage rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoltageRule {
    pub lower: Option<u64>,
    pub upper: Option<u64>,
    pub color: String,
    pub halo: String,
}

impl VoltageRule {
    /// The catch-all rule has neither bound and styles undefined voltages.
    pub fn is_catch_all(&self) -> bool {
        self.lower.is_none() && self.upper.is_none()
    }

    /// Selector class slug, see [`naming::voltage_slug`].
    pub fn slug(&self) -> String {
        naming::voltage_slug(self.lower, self.upper)
    }

    pub fn label(&self) -> String {
        naming::range_label(self.lower, self.upper)
    }
}

/// A band that starts below the end of an earlier band.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeWarning {
    /// Position of the offending rule in the sorted set.
    pub index: usize,
    pub lower: u64,
    pub upper: Option<u64>,
    /// Upper bound of the most recent bounded rule before this one.
    pub watermark: u64,
}

impl fmt::Display for RangeWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "inconsistent range {} ({}): starts at {} V, overlapping lower ranges that reach {} V",
            naming::range_label(Some(self.lower), self.upper),
            naming::voltage_slug(Some(self.lower), self.upper),
            self.lower,
            self.watermark
        )
    }
}

/// Rules sorted ascending by lower bound, unbounded lower first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoltageRuleSet {
    rules: Vec<VoltageRule>,
}

impl VoltageRuleSet {
    pub fn rules(&self) -> &[VoltageRule] {
        &self.rules
    }

    pub fn iter(&self) -> std::slice::Iter<'_, VoltageRule> {
        self.rules.iter()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// The first catch-all rule, if any.
    pub fn catch_all(&self) -> Option<&VoltageRule> {
        self.rules.iter().find(|r| r.is_catch_all())
    }

    /// All rules with at least one bound, in sorted order.
    pub fn bounded(&self) -> impl Iterator<Item = &VoltageRule> {
        self.rules.iter().filter(|r| !r.is_catch_all())
    }
}

impl<'a> IntoIterator for &'a VoltageRuleSet {
    type Item = &'a VoltageRule;
    type IntoIter = std::slice::Iter<'a, VoltageRule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

/// Normalize, sort and check a sequence of raw rules.
///
/// Sorting is stable and puts `None` lower bounds first. The consistency walk
/// keeps a watermark starting at 0: a rule whose lower bound is below the
/// watermark produces a [`RangeWarning`]; the watermark then moves to the
/// rule's upper bound, or stays put when the rule has no upper bound.
pub fn build_rule_set(raw_rules: &[RawVoltageRule]) -> (VoltageRuleSet, Vec<RangeWarning>) {
    let mut rules: Vec<VoltageRule> = raw_rules.iter().map(RawVoltageRule::normalize).collect();
    // None sorts before Some.
    rules.sort_by_key(|r| r.lower);

    let mut warnings = Vec::new();
    let mut watermark = 0u64;
    for (index, rule) in rules.iter().enumerate() {
        if let Some(lower) = rule.lower {
            if lower < watermark {
                warnings.push(RangeWarning {
                    index,
                    lower,
                    upper: rule.upper,
                    watermark,
                });
            }
        }
        if let Some(upper) = rule.upper {
            watermark = upper;
        }
    }

    (VoltageRuleSet { rules }, warnings)
}

/// Parse one `lower upper color [halo]` line.
///
/// Fields are separated by whitespace. Bounds must be integers; negative
/// values mean "unbounded" and are resolved later by [`RawVoltageRule::normalize`].
pub fn parse_rule_line(text: &str) -> Result<RawVoltageRule, RuleError> {
    let parts: Vec<&str> = text.split_whitespace().collect();
    if parts.len() != 3 && parts.len() != 4 {
        return Err(RuleError::Arity { found: parts.len() });
    }
    let lower = parse_bound(parts[0])?;
    let upper = parse_bound(parts[1])?;
    Ok(RawVoltageRule {
        lower: Some(lower),
        upper: Some(upper),
        color: parts[2].to_string(),
        halo: parts.get(3).map(|h| h.to_string()),
    })
}

fn parse_bound(field: &str) -> Result<i64, RuleError> {
    field.parse::<i64>().map_err(|_| RuleError::InvalidBound {
        value: field.to_string(),
    })
}

/// A rules-file line that failed to parse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineError {
    /// 1-based line number.
    pub line: usize,
    pub error: RuleError,
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.error)
    }
}

/// Parse a rules file, one rule per line.
///
/// Blank lines and lines starting with `#` are skipped. A bad line is
/// reported and the remaining lines are still parsed.
pub fn parse_rule_lines(text: &str) -> (Vec<RawVoltageRule>, Vec<LineError>) {
    let mut rules = Vec::new();
    let mut errors = Vec::new();
    for (i, line) in text.lines().enumerate() {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            continue;
        }
        match parse_rule_line(trimmed) {
            Ok(rule) => rules.push(rule),
            Err(error) => errors.push(LineError { line: i + 1, error }),
        }
    }
    (rules, errors)
}

//! Marker-delimited template regions regenerated from a voltage rule set.
//!
//! A template marks each generated region with a begin comment and an end
//! comment. Rewriting replaces everything from the begin marker up to the end
//! marker with the begin marker itself followed by freshly generated rules;
//! the end marker is left in place.
//!
//! ```text
//! /* Switchgears voltage-based styles */          ← begin, re-emitted verbatim
//! area[power=switchgear][voltage<50000] {         ┐
//!     set .voltage_lt50;                          │ generated
//! }                                               ┘
//! /* End of switchgears voltage-based styles */   ← end, untouched
//! ```
//!
//! Because the header is always the begin marker, rewriting an already
//! rewritten template with the same rules gives byte-identical output.
//!
//! ## Regions
//!
//! Regions are plain descriptors ([`Region`]) pairing two markers with a
//! generator function, and are applied one after another with no shared
//! state. A missing region (either marker absent, or the end marker only
//! appearing before the begin marker) is skipped; partial templates are fine.
//!
//! ## Dialects
//!
//! Two template families exist:
//!
//! | Dialect | Regions |
//! |---------|---------|
//! | [`Dialect::Grid`] | voltage classes, switchgear, power lines |
//! | [`Dialect::Legacy`] | a single line-coloring region with circuit casings |

use crate::rules::{VoltageRule, VoltageRuleSet};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::Range;
use std::str::FromStr;
use tracing::debug;

/// Start of the power-line z-index counter in the grid dialect.
pub const DEFAULT_Z_INDEX_BASE: u32 = 20;

/// Z-index used by every rule in the legacy dialect.
const LEGACY_Z_INDEX: u32 = 5;

/// Which family of markers and generated rules a template uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    /// Class-based template: classes, switchgear and power-line regions.
    #[default]
    Grid,
    /// Older template that colors `power=line|minor_line|cable` directly.
    Legacy,
}

impl Dialect {
    pub fn regions(self) -> &'static [Region] {
        match self {
            Dialect::Grid => GRID_REGIONS,
            Dialect::Legacy => LEGACY_REGIONS,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::Grid => "grid",
            Dialect::Legacy => "legacy",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Dialect {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "grid" => Ok(Dialect::Grid),
            "legacy" => Ok(Dialect::Legacy),
            other => Err(format!("unknown dialect `{other}` (expected grid or legacy)")),
        }
    }
}

/// Settings that shape generated text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewriteOptions {
    pub dialect: Dialect,
    /// Z-index of the first bounded power-line rule.
    pub z_index_base: u32,
}

impl Default for RewriteOptions {
    fn default() -> Self {
        Self {
            dialect: Dialect::Grid,
            z_index_base: DEFAULT_Z_INDEX_BASE,
        }
    }
}

/// Generates the body of a region from the rule set.
pub type RegionGenerator = fn(&VoltageRuleSet, &RewriteOptions) -> String;

/// A named, marker-delimited template region.
#[derive(Clone, Copy)]
pub struct Region {
    pub name: &'static str,
    pub begin: &'static str,
    pub end: &'static str,
    pub generate: RegionGenerator,
}

impl fmt::Debug for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Region")
            .field("name", &self.name)
            .field("begin", &self.begin)
            .field("end", &self.end)
            .finish()
    }
}

impl Region {
    /// Byte span from the start of the begin marker to the start of the end
    /// marker, or `None` when the region is not present.
    pub fn locate(&self, template: &str) -> Option<Range<usize>> {
        let start = template.find(self.begin)?;
        let after_begin = start + self.begin.len();
        let end = after_begin + template[after_begin..].find(self.end)?;
        Some(start..end)
    }

    /// Replace the region in `template`, or return `None` if it is absent.
    pub fn apply(
        &self,
        template: &str,
        rules: &VoltageRuleSet,
        options: &RewriteOptions,
    ) -> Option<String> {
        let span = self.locate(template)?;
        let body = (self.generate)(rules, options);
        let mut out = String::with_capacity(template.len() + body.len());
        out.push_str(&template[..span.start]);
        out.push_str(self.begin);
        out.push('\n');
        out.push_str(&body);
        out.push_str(&template[span.end..]);
        Some(out)
    }
}

pub const VOLTAGE_CLASSES: Region = Region {
    name: "voltage-classes",
    begin: "/* Voltage-based classes */",
    end: "/* End of voltage-based classes */",
    generate: generate_voltage_classes,
};

pub const SWITCHGEAR: Region = Region {
    name: "switchgear",
    begin: "/* Switchgears voltage-based styles */",
    end: "/* End of switchgears voltage-based styles */",
    generate: generate_switchgear,
};

pub const POWER_LINES: Region = Region {
    name: "power-lines",
    begin: "/* Power lines voltage-based styles */",
    end: "/* End of power lines voltage-based styles */",
    generate: generate_power_lines,
};

pub const LEGACY_LINES: Region = Region {
    name: "legacy-lines",
    begin: "/* Voltage-based styling with voltage labels for all lines/cables */",
    end: "/* Proposed and construction power lines */",
    generate: generate_legacy_lines,
};

const GRID_REGIONS: &[Region] = &[VOLTAGE_CLASSES, SWITCHGEAR, POWER_LINES];
const LEGACY_REGIONS: &[Region] = &[LEGACY_LINES];

/// Result of a rewrite, with the names of regions found and skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rewrite {
    pub text: String,
    pub rewritten: Vec<&'static str>,
    pub skipped: Vec<&'static str>,
}

/// Rewrite all grid-dialect regions with the default z-index base.
pub fn rewrite_sections(template: &str, rules: &VoltageRuleSet) -> String {
    rewrite_with(template, rules, &RewriteOptions::default()).text
}

/// Rewrite the regions of the configured dialect.
pub fn rewrite_with(template: &str, rules: &VoltageRuleSet, options: &RewriteOptions) -> Rewrite {
    rewrite_regions(template, rules, options.dialect.regions(), options)
}

/// Apply an explicit list of regions in order.
pub fn rewrite_regions(
    template: &str,
    rules: &VoltageRuleSet,
    regions: &[Region],
    options: &RewriteOptions,
) -> Rewrite {
    let mut text = template.to_string();
    let mut rewritten = Vec::new();
    let mut skipped = Vec::new();
    for region in regions {
        match region.apply(&text, rules, options) {
            Some(next) => {
                debug!(region = region.name, "rewrote region");
                text = next;
                rewritten.push(region.name);
            }
            None => {
                debug!(region = region.name, "region markers not found, skipping");
                skipped.push(region.name);
            }
        }
    }
    Rewrite {
        text,
        rewritten,
        skipped,
    }
}

// ============================================================================
// Generators
// ============================================================================

fn block(out: &mut String, selector: &str, declarations: &[String]) {
    out.push_str(selector);
    out.push_str(" {\n");
    for declaration in declarations {
        out.push_str("    ");
        out.push_str(declaration);
        out.push('\n');
    }
    out.push_str("}\n");
}

fn generate_voltage_classes(rules: &VoltageRuleSet, _options: &RewriteOptions) -> String {
    let mut out = String::new();
    for rule in rules {
        let slug = rule.slug();
        let color = &rule.color;
        if rule.is_catch_all() {
            block(
                &mut out,
                &format!("way.voltage_{slug}, area.voltage_{slug}"),
                &[
                    format!("color: {color};"),
                    format!("fill-color: {color};"),
                    format!("text-color: {color};"),
                    format!("left-casing-color: {color};"),
                    format!("right-casing-color: {color};"),
                    format!("text-halo-color: {};", rule.halo),
                ],
            );
        } else {
            block(
                &mut out,
                &format!("way.voltage_{slug}, area.voltage_{slug}"),
                &[
                    format!("color: {color};"),
                    format!("fill-color: {color};"),
                    format!("text-color: {color};"),
                    format!("text-halo-color: {};", rule.halo),
                ],
            );
            block(
                &mut out,
                &format!("way.voltage_2nd_{slug}, area.voltage_2nd_{slug}"),
                &[
                    format!("left-casing-color: {color};"),
                    format!("right-casing-color: {color};"),
                ],
            );
        }
    }
    out
}

fn generate_switchgear(rules: &VoltageRuleSet, _options: &RewriteOptions) -> String {
    let mut out = String::new();
    for rule in rules.bounded() {
        let mut selector = "area[power=switchgear]".to_string();
        selector.push_str(&bound_tests(rule, "voltage"));
        block(&mut out, &selector, &[format!("set .voltage_{};", rule.slug())]);
    }
    out
}

/// First token of a `;`-separated voltage tag.
const PRIMARY_VOLTAGE: &str = r#"to_int(get(split(";",tag(voltage)),0))"#;

/// Second token when the tag has several, else the whole tag.
const SECONDARY_VOLTAGE: &str = r#"(count(split(";",tag(voltage)))>1 ? to_int(get(split(";",tag(voltage)),1)) : tag(voltage))"#;

fn generate_power_lines(rules: &VoltageRuleSet, options: &RewriteOptions) -> String {
    let mut out = String::new();
    let mut z_index = options.z_index_base;
    for rule in rules {
        let slug = rule.slug();
        if rule.is_catch_all() {
            block(
                &mut out,
                "way.power_segment_live[!voltage],\nway.power_segment_live[voltage=0]",
                &[format!("set .voltage_{slug};")],
            );
            // The catch-all carries no z-index but still takes a slot.
            z_index += 1;
            continue;
        }
        let primary = format!("way.power_segment_live{}", bound_tests(rule, PRIMARY_VOLTAGE));
        let secondary = format!("way.power_segment_live{}", bound_tests(rule, SECONDARY_VOLTAGE));
        block(
            &mut out,
            &primary,
            &[format!("set .voltage_{slug};"), format!("z-index: {z_index};")],
        );
        block(&mut out, &secondary, &[format!("set .voltage_2nd_{slug};")]);
        z_index += 1;
    }
    out
}

/// `[expr>=lower][expr<upper]`, each test omitted when its bound is absent.
fn bound_tests(rule: &VoltageRule, expr: &str) -> String {
    let mut tests = String::new();
    if let Some(lower) = rule.lower {
        tests.push_str(&format!("[{expr}>={lower}]"));
    }
    if let Some(upper) = rule.upper {
        tests.push_str(&format!("[{expr}<{upper}]"));
    }
    tests
}

/// `[voltage>lower][voltage<=upper]`, the legacy exclusive-lower form.
fn legacy_bound_tests(rule: &VoltageRule) -> String {
    let mut tests = String::new();
    if let Some(lower) = rule.lower {
        tests.push_str(&format!("[voltage>{lower}]"));
    }
    if let Some(upper) = rule.upper {
        tests.push_str(&format!("[voltage<={upper}]"));
    }
    tests
}

const LEGACY_FEATURES: [&str; 3] = ["line", "minor_line", "cable"];

fn generate_legacy_lines(rules: &VoltageRuleSet, _options: &RewriteOptions) -> String {
    let mut out = String::new();
    for rule in rules.bounded() {
        let tests = legacy_bound_tests(rule);
        for feature in LEGACY_FEATURES {
            out.push('\n');
            block(
                &mut out,
                &format!("way[power={feature}]{tests}"),
                &[
                    format!("color: {};", rule.color),
                    format!("z-index: {LEGACY_Z_INDEX};"),
                ],
            );
        }
        out.push('\n');
        block(
            &mut out,
            &format!("way|z18-[power=line]{tests}"),
            &[
                "text: \"voltage\";".to_string(),
                "text-color: black;".to_string(),
                "font-size: 10;".to_string(),
                "font-weight: bold;".to_string(),
                "text-allow-overlap: true;".to_string(),
                "text-opacity: 0.5;".to_string(),
                "text-position: line;".to_string(),
            ],
        );
    }

    out.push_str("\n/* Circuit voltage coloring */\n");
    for rule in rules.bounded() {
        let tests = legacy_bound_tests(rule);
        for feature in LEGACY_FEATURES {
            out.push('\n');
            block(
                &mut out,
                &format!("way[power={feature}][circuits>1]{tests}"),
                &[
                    format!("left-casing-color: {};", rule.color),
                    format!("right-casing-color: {};", rule.color),
                    format!("z-index: {LEGACY_Z_INDEX};"),
                ],
            );
        }
    }
    out.push('\n');
    out
}

//! CLI output formatting.
//!
//! Each report has a `format_*` function that returns lines (pure, testable)
//! and a `print_*` wrapper that writes them to stdout.
//!
//! # Output Format
//!
//! ## Variables
//!
//! ```text
//! Node styling
//!     basic_power_node_symbol_size_low = 3
//!         Size of power node symbols at low zoom levels
//!
//! Line styling
//!     segment_width_low = 4
//!         Width of power lines and cables at low zoom levels
//! ```
//!
//! ## Rules
//!
//! ```text
//! Voltage rules (default)
//! 001 no        undefined voltage    #FFFFFF halo #000000
//! 002 lt50      below 50 kV          #7c7c7c halo #FFFFFF
//! ```
//!
//! ## Generate
//!
//! ```text
//! Profile: default
//! Regions
//!     voltage-classes: rewritten
//!     switchgear: not found
//! Rules: 7, 0 warnings
//! Variables: 12 used, 0 unresolved
//! ```

use crate::catalog::{describe_variable, group_by_category};
use crate::generate::Generation;
use crate::render::Variables;
use crate::rules::{RangeWarning, VoltageRuleSet};
use std::path::Path;

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

// ============================================================================
// Variables
// ============================================================================

/// Format discovered variables grouped by category, with the profile value
/// when one exists.
pub fn format_variables_output(names: &[String], values: &Variables) -> Vec<String> {
    let mut lines = Vec::new();
    if names.is_empty() {
        lines.push("No template variables found".to_string());
        return lines;
    }
    for (i, (category, members)) in group_by_category(names).into_iter().enumerate() {
        if i > 0 {
            lines.push(String::new());
        }
        lines.push(category.title().to_string());
        for name in members {
            match values.get(name) {
                Some(value) => lines.push(format!("{}{} = {}", indent(1), name, value)),
                None => lines.push(format!("{}{} (no default)", indent(1), name)),
            }
            lines.push(format!("{}{}", indent(2), describe_variable(name)));
        }
    }
    lines
}

pub fn print_variables_output(names: &[String], values: &Variables) {
    for line in format_variables_output(names, values) {
        println!("{}", line);
    }
}

// ============================================================================
// Rules
// ============================================================================

/// Format a rule set as an indexed table, followed by any range warnings.
pub fn format_rules_output(
    profile: &str,
    rules: &VoltageRuleSet,
    warnings: &[RangeWarning],
) -> Vec<String> {
    let mut lines = vec![format!("Voltage rules ({})", profile)];
    let slug_width = rules.iter().map(|r| r.slug().len()).max().unwrap_or(0);
    let label_width = rules.iter().map(|r| r.label().len()).max().unwrap_or(0);
    for (i, rule) in rules.iter().enumerate() {
        lines.push(format!(
            "{} {:<sw$}  {:<lw$}  {} halo {}",
            format_index(i + 1),
            rule.slug(),
            rule.label(),
            rule.color,
            rule.halo,
            sw = slug_width,
            lw = label_width,
        ));
    }
    lines.extend(format_warnings(warnings));
    lines
}

fn format_warnings(warnings: &[RangeWarning]) -> Vec<String> {
    let mut lines = Vec::new();
    if warnings.is_empty() {
        return lines;
    }
    lines.push(String::new());
    lines.push("Warnings".to_string());
    for warning in warnings {
        lines.push(format!("{}{}", indent(1), warning));
    }
    lines
}

pub fn print_rules_output(profile: &str, rules: &VoltageRuleSet, warnings: &[RangeWarning]) {
    for line in format_rules_output(profile, rules, warnings) {
        println!("{}", line);
    }
}

// ============================================================================
// Generate
// ============================================================================

/// Summarize a generation run.
pub fn format_generate_output(generation: &Generation, output_path: &Path) -> Vec<String> {
    let mut lines = vec![format!("Profile: {}", generation.profile)];

    lines.push("Regions".to_string());
    for name in &generation.rewritten {
        lines.push(format!("{}{}: rewritten", indent(1), name));
    }
    for name in &generation.skipped {
        lines.push(format!("{}{}: not found", indent(1), name));
    }

    lines.push(format!(
        "Rules: {}, {} warning{}",
        generation.rules.len(),
        generation.warnings.len(),
        if generation.warnings.len() == 1 { "" } else { "s" }
    ));
    lines.push(format!(
        "Variables: {} used, {} unresolved",
        generation.variables.len(),
        generation.unresolved.len()
    ));
    if !generation.unresolved.is_empty() {
        lines.push(format!(
            "{}Unresolved (rendered empty): {}",
            indent(1),
            generation.unresolved.join(", ")
        ));
    }
    lines.extend(format_warnings(&generation.warnings));
    lines.push(format!("Wrote {}", output_path.display()));
    lines
}

pub fn print_generate_output(generation: &Generation, output_path: &Path) {
    for line in format_generate_output(generation, output_path) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GeneratorConfig;
    use crate::generate::run;
    use crate::rules::{RawVoltageRule, build_rule_set};
    use crate::test_helpers::*;

    #[test]
    fn format_index_pads() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
    }

    #[test]
    fn variables_grouped_with_values_and_descriptions() {
        let names = vec!["segment_width_low".to_string(), "halo_opacity".to_string()];
        let mut values = Variables::new();
        values.insert("segment_width_low".to_string(), 4i64.into());
        let lines = format_variables_output(&names, &values);
        assert_eq!(
            lines,
            vec![
                "Line styling",
                "    segment_width_low = 4",
                "        Width of power lines and cables at low zoom levels",
                "",
                "Other settings",
                "    halo_opacity (no default)",
                "        Halo Opacity",
            ]
        );
    }

    #[test]
    fn no_variables_message() {
        let lines = format_variables_output(&[], &Variables::new());
        assert_eq!(lines, vec!["No template variables found"]);
    }

    #[test]
    fn rules_table_aligns_columns() {
        let (rules, warnings) = build_rule_set(&[
            RawVoltageRule::new(None, None, "#FFFFFF").with_halo("#000000"),
            RawVoltageRule::new(None, Some(50000), "#7c7c7c"),
        ]);
        let lines = format_rules_output("custom", &rules, &warnings);
        assert_eq!(lines[0], "Voltage rules (custom)");
        assert_eq!(lines[1], "001 no    undefined voltage  #FFFFFF halo #000000");
        assert_eq!(lines[2], "002 lt50  below 50 kV        #7c7c7c halo #FFFFFF");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn rules_output_lists_warnings() {
        let (rules, warnings) = build_rule_set(&[
            RawVoltageRule::new(Some(0), Some(100), "#111111"),
            RawVoltageRule::new(Some(50), Some(200), "#222222"),
        ]);
        let lines = format_rules_output("custom", &rules, &warnings);
        assert!(lines.contains(&"Warnings".to_string()));
        assert!(lines.last().unwrap().starts_with("    inconsistent range"));
    }

    #[test]
    fn generate_summary() {
        let template = without_region(GRID_TEMPLATE, &crate::regions::SWITCHGEAR);
        let generation = run(&template, &GeneratorConfig::default()).unwrap();
        let lines = format_generate_output(&generation, Path::new("out.mapcss"));
        assert_eq!(lines[0], "Profile: default");
        assert!(lines.contains(&"    switchgear: not found".to_string()));
        assert!(lines.contains(&"    power-lines: rewritten".to_string()));
        assert!(lines.contains(&"Rules: 7, 0 warnings".to_string()));
        assert!(lines.contains(&"Variables: 2 used, 0 unresolved".to_string()));
        assert_eq!(lines.last().unwrap(), "Wrote out.mapcss");
    }
}

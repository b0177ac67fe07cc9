//! Shared test utilities for the grid-mapcss test suite.
//!
//! Provides the fixture templates, a stock rule set, and helpers for cutting
//! regions out of a template to exercise partial templates.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let template = without_region(GRID_TEMPLATE, &SWITCHGEAR);
//! let out = rewrite_sections(&template, &default_rules());
//! assert_eq!(region_body(&out, &VOLTAGE_CLASSES).matches("way.voltage_").count(), 13);
//! ```

use crate::profile::Profile;
use crate::regions::Region;
use crate::rules::{VoltageRuleSet, build_rule_set};

// =========================================================================
// Fixtures
// =========================================================================

/// Grid-dialect template with all three regions and two user variables.
pub const GRID_TEMPLATE: &str = include_str!("../fixtures/grid_template.mapcss");

/// Legacy-dialect template with its single line-coloring region.
pub const LEGACY_TEMPLATE: &str = include_str!("../fixtures/legacy_template.mapcss");

/// The default profile's rules, normalized and sorted.
pub fn default_rules() -> VoltageRuleSet {
    let data = Profile::Default.resolve().unwrap();
    build_rule_set(&data.voltage_rules).0
}

// =========================================================================
// Region surgery
// =========================================================================

/// Remove a region, markers included, from a template. Panics if absent.
pub fn without_region(template: &str, region: &Region) -> String {
    let span = region
        .locate(template)
        .unwrap_or_else(|| panic!("region '{}' not found in template", region.name));
    let mut end = span.end + region.end.len();
    if template[end..].starts_with('\n') {
        end += 1;
    }
    format!("{}{}", &template[..span.start], &template[end..])
}

/// Text between the begin-marker line and the end marker. Panics if absent.
pub fn region_body<'a>(template: &'a str, region: &Region) -> &'a str {
    let span = region
        .locate(template)
        .unwrap_or_else(|| panic!("region '{}' not found in template", region.name));
    let body_start = span.start + region.begin.len();
    template[body_start..span.end].trim_start_matches('\n')
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::regions::{SWITCHGEAR, VOLTAGE_CLASSES, rewrite_sections};

    #[test]
    fn without_region_removes_markers() {
        let template = without_region(GRID_TEMPLATE, &SWITCHGEAR);
        assert!(!template.contains(SWITCHGEAR.begin));
        assert!(!template.contains(SWITCHGEAR.end));
        assert!(template.contains(VOLTAGE_CLASSES.begin));
    }

    #[test]
    fn region_body_of_rewritten_classes() {
        let out = rewrite_sections(GRID_TEMPLATE, &default_rules());
        let body = region_body(&out, &VOLTAGE_CLASSES);
        // One combined catch-all block plus a pair per bounded rule.
        assert_eq!(body.matches("way.voltage_").count(), 13);
    }
}

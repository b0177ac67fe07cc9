//! Variable discovery for templates.
//!
//! Scans a template for `{{ name }}` placeholders and lists the distinct
//! names a user can customize. The list is advisory: it drives the CLI
//! reports and does not affect rewriting or rendering.
//!
//! Names used only inside generated regions (`lower_voltage`,
//! `upper_voltage`, `line_color`, `line`) are reserved and never listed.

use regex::Regex;
use std::sync::LazyLock;

/// Names that belong to region generation, not to the user.
pub const RESERVED_NAMES: &[&str] = &["lower_voltage", "upper_voltage", "line_color", "line"];

static PLACEHOLDER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{\{([^{}]+?)\}\}").expect("placeholder pattern is a valid regex")
});

/// The `{{ name }}` placeholder pattern; capture group 1 is the raw name.
pub(crate) fn placeholder_pattern() -> &'static Regex {
    &PLACEHOLDER
}

/// Distinct placeholder names in first-occurrence order, reserved names excluded.
pub fn extract_variables(template: &str) -> Vec<String> {
    let mut names: Vec<String> = Vec::new();
    for caps in PLACEHOLDER.captures_iter(template) {
        let name = caps[1].trim();
        if RESERVED_NAMES.contains(&name) || names.iter().any(|n| n == name) {
            continue;
        }
        names.push(name.to_string());
    }
    names
}

/// Built-in descriptions for the variables shipped in the stock templates.
const DESCRIPTIONS: &[(&str, &str)] = &[
    ("basic_power_node_symbol_size_low", "Size of power node symbols at low zoom levels"),
    ("basic_power_node_symbol_size_mid", "Size of power node symbols at medium zoom levels"),
    ("basic_power_node_symbol_size_high", "Size of power node symbols at high zoom levels"),
    ("substation_area_width_low", "Border width for substations at low zoom levels"),
    ("substation_area_width_mid", "Border width for substations at medium zoom levels"),
    ("substation_area_width_high", "Border width for substations at high zoom levels"),
    ("substation_default_color", "Default color for substations (hex code)"),
    ("substation_transmission_color", "Color for transmission substations (hex code)"),
    ("substation_distribution_color", "Color for distribution substations (hex code)"),
    ("substation_generation_color", "Color for generation substations (hex code)"),
    ("substation_industrial_color", "Color for industrial substations (hex code)"),
    ("power_plant_area_width_low", "Border width for power plants at low zoom levels"),
    ("power_plant_area_width_mid", "Border width for power plants at medium zoom levels"),
    ("power_plant_area_width_high", "Border width for power plants at high zoom levels"),
    ("power_plant_color", "Color for power plants (hex code)"),
    ("power_generator_area_width_low", "Border width for generators at low zoom levels"),
    ("power_generator_area_width_mid", "Border width for generators at medium zoom levels"),
    ("power_generator_area_width_high", "Border width for generators at high zoom levels"),
    ("power_generator_color", "Color for generators (hex code)"),
    ("industrial_area_width_low", "Border width for industrial areas at low zoom levels"),
    ("industrial_area_width_mid", "Border width for industrial areas at medium zoom levels"),
    ("industrial_area_width_high", "Border width for industrial areas at high zoom levels"),
    ("admin_boundaries_color", "Color for administrative boundaries lines"),
    ("admin_boundaries_width", "Width of administrative boundaries lines"),
    ("segment_width_low", "Width of power lines and cables at low zoom levels"),
    ("segment_width_mid", "Width of power lines and cables at medium zoom levels"),
    ("segment_width_high", "Width of power lines and cables at high zoom levels"),
    ("segment_disused_color", "Color of disused power lines and cables"),
    ("circuit_width", "Width of power circuits casing over lines and cables"),
    ("circuit_color", "Color of power circuits casing over lines and cables"),
    ("line_cable_width_low", "Width of power lines and cables at low zoom levels"),
    ("line_cable_width_mid", "Width of power lines and cables at medium zoom levels"),
    ("line_cable_width_high", "Width of power lines and cables at high zoom levels"),
    ("line_busbar_bay_casing_width_low", "Width of busbar and bay casings at low zoom levels"),
    ("line_busbar_bay_casing_width_mid", "Width of busbar and bay casings at medium zoom levels"),
    ("line_busbar_bay_casing_width_high", "Width of busbar and bay casings at high zoom levels"),
    ("segment_multi_circuit_casing_width_low", "Width of multi-circuit line casings at low zoom levels"),
    ("segment_multi_circuit_casing_width_mid", "Width of multi-circuit line casings at medium zoom levels"),
    ("segment_multi_circuit_casing_width_high", "Width of multi-circuit line casings at high zoom levels"),
    ("multi_circuit_line_left_casing_width_low", "Width of multi-circuit line casings at low zoom levels"),
    ("multi_circuit_line_left_casing_width_mid", "Width of multi-circuit line casings at medium zoom levels"),
    ("multi_circuit_line_left_casing_width_high", "Width of multi-circuit line casings at high zoom levels"),
];

/// A readable description of a variable.
///
/// Known names use the built-in table; anything else is title-cased from
/// its snake_case name (`halo_opacity` → `Halo Opacity`).
pub fn describe_variable(name: &str) -> String {
    DESCRIPTIONS
        .iter()
        .find(|(key, _)| *key == name)
        .map(|(_, desc)| desc.to_string())
        .unwrap_or_else(|| title_case(name))
}

fn title_case(name: &str) -> String {
    name.split('_')
        .filter(|w| !w.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Broad grouping of variables for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum VariableCategory {
    Node,
    Area,
    Line,
    Other,
}

impl VariableCategory {
    pub const ALL: [VariableCategory; 4] = [Self::Node, Self::Area, Self::Line, Self::Other];

    /// First category whose keywords appear in the name.
    pub fn of(name: &str) -> Self {
        const AREA: &[&str] = &["area", "substation", "power_plant", "power_generator", "industrial"];
        const LINE: &[&str] = &["line", "cable", "busbar", "casing", "segment", "circuit"];
        if name.contains("node") {
            Self::Node
        } else if AREA.iter().any(|k| name.contains(k)) {
            Self::Area
        } else if LINE.iter().any(|k| name.contains(k)) {
            Self::Line
        } else {
            Self::Other
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::Node => "Node styling",
            Self::Area => "Area styling",
            Self::Line => "Line styling",
            Self::Other => "Other settings",
        }
    }
}

/// Group names by category. Empty groups are omitted; order within a group
/// follows the input.
pub fn group_by_category(names: &[String]) -> Vec<(VariableCategory, Vec<&str>)> {
    VariableCategory::ALL
        .iter()
        .filter_map(|&category| {
            let members: Vec<&str> = names
                .iter()
                .filter(|n| VariableCategory::of(n) == category)
                .map(String::as_str)
                .collect();
            (!members.is_empty()).then_some((category, members))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_in_first_occurrence_order() {
        let template = "a {{ b_var }} {{a_var}} {{b_var}} {{ c_var }}";
        assert_eq!(extract_variables(template), vec!["b_var", "a_var", "c_var"]);
    }

    #[test]
    fn excludes_reserved_names() {
        let template = "{{line}} {{ lower_voltage }} {{upper_voltage}} {{line_color}} {{width}}";
        assert_eq!(extract_variables(template), vec!["width"]);
    }

    #[test]
    fn ignores_single_braces() {
        let template = "way[power=line] { width: {{segment_width_low}}; }";
        assert_eq!(extract_variables(template), vec!["segment_width_low"]);
    }

    #[test]
    fn empty_template_has_no_variables() {
        assert!(extract_variables("").is_empty());
        assert!(extract_variables("node { color: red; }").is_empty());
    }

    #[test]
    fn describe_known_variable() {
        assert_eq!(
            describe_variable("segment_width_low"),
            "Width of power lines and cables at low zoom levels"
        );
    }

    #[test]
    fn describe_unknown_variable_title_cases() {
        assert_eq!(describe_variable("halo_opacity"), "Halo Opacity");
        assert_eq!(describe_variable("x"), "X");
    }

    #[test]
    fn categories() {
        assert_eq!(VariableCategory::of("basic_power_node_symbol_size_low"), VariableCategory::Node);
        assert_eq!(VariableCategory::of("substation_default_color"), VariableCategory::Area);
        assert_eq!(VariableCategory::of("industrial_area_width_mid"), VariableCategory::Area);
        assert_eq!(VariableCategory::of("segment_width_high"), VariableCategory::Line);
        assert_eq!(VariableCategory::of("circuit_color"), VariableCategory::Line);
        assert_eq!(VariableCategory::of("admin_boundaries_color"), VariableCategory::Other);
    }

    #[test]
    fn grouping_omits_empty_and_keeps_order() {
        let names: Vec<String> = ["segment_width_low", "admin_boundaries_width", "circuit_width"]
            .iter()
            .map(|s| s.to_string())
            .collect();
        let groups = group_by_category(&names);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].0, VariableCategory::Line);
        assert_eq!(groups[0].1, vec!["segment_width_low", "circuit_width"]);
        assert_eq!(groups[1].0, VariableCategory::Other);
    }
}

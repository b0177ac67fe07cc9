//! # Grid MapCSS
//!
//! Generates MapCSS style sheets for rendering power-grid infrastructure
//! (lines, cables, substations, switchgear) colored by voltage class.
//!
//! A hand-maintained template carries `{{variable}}` placeholders and a few
//! marker-delimited regions. Given a style profile and a list of voltage
//! rules, the generator regenerates the regions and fills in the placeholders.
//!
//! # Architecture: Rewrite, Then Render
//!
//! ```text
//! 1. Rules     raw rules  →  VoltageRuleSet    (normalize, sort, check ranges)
//! 2. Rewrite   template   →  template'         (regenerate marked regions)
//! 3. Render    template'  →  style sheet       (substitute {{variables}})
//! ```
//!
//! Rewriting happens before rendering, so regenerated regions may themselves
//! contain placeholders. Every stage is string-in/string-out; only
//! [`generate::read_template`] and [`generate::write_output`] touch the disk.
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`catalog`] | Discovers template variables, describes and groups them |
//! | [`rules`] | Voltage rule parsing, normalization, ordering and range checks |
//! | [`naming`] | Voltage slugs (`lt50`, `50-132`, `gt550`) and human labels |
//! | [`regions`] | Marker-delimited region rewriting for the grid and legacy dialects |
//! | [`render`] | Placeholder substitution |
//! | [`profile`] | Built-in `default` and `dense` presets plus the `custom` profile |
//! | [`config`] | `mapcss.toml` loading, merging over stock defaults, validation |
//! | [`generate`] | One full run: profile → rules → rewrite → render |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Idempotent Regions
//!
//! A region is everything from its begin marker up to (not including) its end
//! marker. The begin marker is re-emitted verbatim and the end marker is left
//! in place, so a generated file is itself a valid template: rewriting it again
//! with the same rules yields the same text.
//!
//! ## Missing Markers Are Not Errors
//!
//! A template without a given region is left untouched for that region. Partial
//! templates are common, and [`generate::Generation::skipped`] reports which
//! regions were not found.
//!
//! ## Lenient Rendering
//!
//! Placeholders without a value render as empty text, matching how the
//! templates have always been filled. `[render] strict = true` turns them into
//! an error instead.
//!
//! ## Profiles As Data
//!
//! The presets are TOML files compiled into the binary. Adding a variable to a
//! preset is a data change, and the same file format is what users write in
//! `mapcss.toml`.

pub mod catalog;
pub mod config;
pub mod generate;
pub mod naming;
pub mod output;
pub mod profile;
pub mod regions;
pub mod render;
pub mod rules;

#[cfg(test)]
pub(crate) mod test_helpers;

pub use catalog::extract_variables;
pub use regions::rewrite_sections;
pub use render::{Variables, VariableValue, render};
pub use rules::{
    RangeWarning, RawVoltageRule, VoltageRule, VoltageRuleSet, build_rule_set, parse_rule_line,
};

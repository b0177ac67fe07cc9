//! Centralized naming for voltage ranges.
//!
//! Every generated selector class is keyed by a short slug derived from the
//! bounds of a voltage range. The slug is the only link between the class
//! definitions, the switchgear rules and the power-line rules, so all three
//! regions call into this module rather than formatting bounds themselves.
//!
//! ## Slug Format
//!
//! A single bound renders as:
//! - `l<value>` when the value is at most 1000 volts (`400` → `l400`)
//! - the value in kilovolts, rounded to the nearest integer, otherwise
//!   (`132000` → `132`, `2500` → `2`)
//!
//! Bounds are then composed:
//! - `(None, None)` → `no` (the catch-all rule)
//! - `(None, Some(50000))` → `lt50`
//! - `(Some(550000), None)` → `gt550`
//! - `(Some(50000), Some(132000))` → `50-132`

/// Values above this threshold are abbreviated to kilovolts.
const KILOVOLT_THRESHOLD: u64 = 1000;

/// Render one bound as a slug fragment.
///
/// Kilovolt rounding sends exact halves to the even neighbour, so `2500`
/// becomes `2` and `3500` becomes `4`.
pub fn bound_slug(value: u64) -> String {
    if value <= KILOVOLT_THRESHOLD {
        return format!("l{value}");
    }
    let quotient = value / 1000;
    let remainder = value % 1000;
    let rounded = match remainder.cmp(&500) {
        std::cmp::Ordering::Greater => quotient + 1,
        std::cmp::Ordering::Equal if quotient % 2 == 1 => quotient + 1,
        _ => quotient,
    };
    rounded.to_string()
}

/// Build the slug for a voltage range.
///
/// Pure: identical bounds always give the identical slug.
///
/// - `(None, None)` → `"no"`
/// - `(None, Some(50000))` → `"lt50"`
/// - `(Some(550000), None)` → `"gt550"`
/// - `(Some(0), Some(50000))` → `"l0-50"`
pub fn voltage_slug(lower: Option<u64>, upper: Option<u64>) -> String {
    match (lower, upper) {
        (None, None) => "no".to_string(),
        (None, Some(upper)) => format!("lt{}", bound_slug(upper)),
        (Some(lower), None) => format!("gt{}", bound_slug(lower)),
        (Some(lower), Some(upper)) => format!("{}-{}", bound_slug(lower), bound_slug(upper)),
    }
}

/// Human-readable description of a range for console reports.
///
/// ```text
/// (None, None)                 → undefined voltage
/// (None, Some(50000))          → below 50 kV
/// (Some(50000), Some(132000))  → 50 kV to 132 kV
/// (Some(550000), None)         → 550 kV and above
/// ```
pub fn range_label(lower: Option<u64>, upper: Option<u64>) -> String {
    match (lower, upper) {
        (None, None) => "undefined voltage".to_string(),
        (None, Some(upper)) => format!("below {}", volts(upper)),
        (Some(lower), None) => format!("{} and above", volts(lower)),
        (Some(lower), Some(upper)) => format!("{} to {}", volts(lower), volts(upper)),
    }
}

fn volts(value: u64) -> String {
    if value > KILOVOLT_THRESHOLD && value % 1000 == 0 {
        format!("{} kV", value / 1000)
    } else if value > KILOVOLT_THRESHOLD {
        format!("{:.1} kV", value as f64 / 1000.0)
    } else {
        format!("{value} V")
    }
}

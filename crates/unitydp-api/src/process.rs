// Value processors
//
// Small post-read derivations applied by the facade: translating the
// card's numeric source codes into labels, and deriving power factor
// when the hardware reports none. A processor sees the raw value plus
// the sibling readings already built for the same group, which is how
// pf reaches watts and VA from the same batch.

use indexmap::IndexMap;

use crate::subsystem::Reading;
use crate::wire::PLACEHOLDER;

/// A post-read transformation: raw value in, processed value out.
/// `siblings` holds the partially-built result group from the same read.
pub type Processor = fn(Option<&str>, &IndexMap<String, Reading>) -> Option<String>;

/// Named processor table for one subsystem.
pub type ProcessorTable = &'static [(&'static str, Processor)];

pub static SYSTEM_PROCESSORS: ProcessorTable = &[("ups_source", source_label)];
pub static OUTPUT_PROCESSORS: ProcessorTable = &[("pf", power_factor)];
pub static NO_PROCESSORS: ProcessorTable = &[];

/// The processor table for a subsystem, keyed by its registry name.
pub fn table_for(subsystem: &str) -> ProcessorTable {
    match subsystem {
        "system" => SYSTEM_PROCESSORS,
        "output" => OUTPUT_PROCESSORS,
        _ => NO_PROCESSORS,
    }
}

/// Translate a UPS source code to its label. Codes 3, 6, and 7 all mean
/// the UPS is feeding from mains; unrecognized codes are kept visible.
fn source_label(raw: Option<&str>, _siblings: &IndexMap<String, Reading>) -> Option<String> {
    let code = raw?;
    if code.is_empty() || code == PLACEHOLDER {
        return Some(code.to_owned());
    }
    let label = match code {
        "3" | "6" | "7" => "Normal",
        "4" => "Bypass",
        "5" => "Battery",
        "1" => "Other",
        other => return Some(format!("Unknown ({other})")),
    };
    Some(label.to_owned())
}

/// Derive power factor from watts / VA when the card does not report it.
/// A non-empty raw value passes through unchanged.
fn power_factor(raw: Option<&str>, siblings: &IndexMap<String, Reading>) -> Option<String> {
    if let Some(value) = raw {
        if !value.is_empty() && value != PLACEHOLDER {
            return Some(value.to_owned());
        }
    }
    if let (Some(watts), Some(va)) = (
        sibling_number(siblings, "watts"),
        sibling_number(siblings, "va"),
    ) {
        if va > 0.0 {
            return Some(format!("{:.2}", watts / va));
        }
    }
    raw.map(str::to_owned)
}

fn sibling_number(siblings: &IndexMap<String, Reading>, name: &str) -> Option<f64> {
    match siblings.get(name)? {
        Reading::Value(Some(value)) => value.parse().ok(),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn no_siblings() -> IndexMap<String, Reading> {
        IndexMap::new()
    }

    #[test]
    fn source_codes_map_to_labels() {
        for code in ["3", "6", "7"] {
            assert_eq!(
                source_label(Some(code), &no_siblings()).as_deref(),
                Some("Normal")
            );
        }
        assert_eq!(
            source_label(Some("4"), &no_siblings()).as_deref(),
            Some("Bypass")
        );
        assert_eq!(
            source_label(Some("5"), &no_siblings()).as_deref(),
            Some("Battery")
        );
        assert_eq!(
            source_label(Some("1"), &no_siblings()).as_deref(),
            Some("Other")
        );
    }

    #[test]
    fn unrecognized_source_code_stays_visible() {
        assert_eq!(
            source_label(Some("9"), &no_siblings()).as_deref(),
            Some("Unknown (9)")
        );
    }

    #[test]
    fn placeholder_and_missing_source_pass_through() {
        assert_eq!(
            source_label(Some("--"), &no_siblings()).as_deref(),
            Some("--")
        );
        assert_eq!(source_label(None, &no_siblings()), None);
    }

    #[test]
    fn power_factor_derived_from_watts_and_va() {
        let mut siblings = IndexMap::new();
        siblings.insert("watts".to_owned(), Reading::Value(Some("120".to_owned())));
        siblings.insert("va".to_owned(), Reading::Value(Some("150".to_owned())));

        assert_eq!(power_factor(None, &siblings).as_deref(), Some("0.80"));
        assert_eq!(power_factor(Some(""), &siblings).as_deref(), Some("0.80"));
        assert_eq!(power_factor(Some("--"), &siblings).as_deref(), Some("0.80"));
    }

    #[test]
    fn reported_power_factor_passes_through() {
        let mut siblings = IndexMap::new();
        siblings.insert("watts".to_owned(), Reading::Value(Some("120".to_owned())));
        siblings.insert("va".to_owned(), Reading::Value(Some("150".to_owned())));

        assert_eq!(power_factor(Some("0.95"), &siblings).as_deref(), Some("0.95"));
    }

    #[test]
    fn every_processor_key_names_a_point_in_its_subsystem() {
        use crate::points::{self, Resolved};

        for (name, group) in points::SUBSYSTEMS {
            for (key, _) in table_for(name) {
                assert!(
                    matches!(points::lookup(group, key), Resolved::Point(_)),
                    "{name}.{key}: processor without a matching point"
                );
            }
        }
    }

    #[test]
    fn power_factor_without_siblings_keeps_raw() {
        assert_eq!(power_factor(Some(""), &no_siblings()).as_deref(), Some(""));
        assert_eq!(power_factor(None, &no_siblings()), None);

        let mut zero_va = IndexMap::new();
        zero_va.insert("watts".to_owned(), Reading::Value(Some("120".to_owned())));
        zero_va.insert("va".to_owned(), Reading::Value(Some("0".to_owned())));
        assert_eq!(power_factor(None, &zero_va), None);
    }
}

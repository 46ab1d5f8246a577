// Point registry
//
// Static mapping from semantic attribute names to the card's point
// identifiers, one table per subsystem. Subsystems divide into
// status/event/settings categories where the card exposes them; bypass
// is flat. The tables are the single source of truth: the facade, the
// batched reads, and attribute lookup all walk them.

/// A node in the point registry: a leaf point identifier or a nested
/// category of further nodes.
#[derive(Debug, Clone, Copy)]
pub enum PointNode {
    Point(&'static str),
    Group(PointGroup),
}

/// A slice of named registry nodes in declared order.
pub type PointGroup = &'static [(&'static str, PointNode)];

/// Result of resolving an attribute name against a point group.
///
/// Replaces attribute-access fallback with an explicit tagged lookup:
/// a name is a readable/writable point, a nested category, or nothing.
#[derive(Debug, Clone, Copy)]
pub enum Resolved {
    Point(&'static str),
    Category(PointGroup),
    NotFound,
}

/// Resolve `name` within `group`.
///
/// Point resolution is flat: leaf entries at any depth match first, so
/// `"charge"` resolves on the battery subsystem without naming
/// `"status"`. Only when no leaf carries the name does a category entry
/// match. A name that is both (battery's `status`) reads as the point.
pub fn lookup(group: PointGroup, name: &str) -> Resolved {
    if let Some(point) = find_leaf(group, name) {
        return Resolved::Point(point);
    }
    for (key, node) in group {
        if *key == name {
            if let PointNode::Group(nested) = *node {
                return Resolved::Category(nested);
            }
        }
    }
    Resolved::NotFound
}

fn find_leaf(group: PointGroup, name: &str) -> Option<&'static str> {
    for (key, node) in group {
        match *node {
            PointNode::Point(point) if *key == name => return Some(point),
            _ => {}
        }
    }
    for (_, node) in group {
        if let PointNode::Group(nested) = *node {
            if let Some(point) = find_leaf(nested, name) {
                return Some(point);
            }
        }
    }
    None
}

/// All leaf point identifiers under `group`, in declared order.
pub fn leaf_points(group: PointGroup) -> Vec<&'static str> {
    let mut points = Vec::new();
    collect_leaves(group, &mut points);
    points
}

fn collect_leaves(group: PointGroup, out: &mut Vec<&'static str>) {
    for (_, node) in group {
        match *node {
            PointNode::Point(point) => out.push(point),
            PointNode::Group(nested) => collect_leaves(nested, out),
        }
    }
}

// ── System ───────────────────────────────────────────────────────────

static SYSTEM_STATUS: PointGroup = &[
    ("firmware_version", PointNode::Point("v4335")),
    ("manufacturer", PointNode::Point("v4333")),
    ("model_number", PointNode::Point("v4240")),
    ("serial_number", PointNode::Point("v4244")),
    ("manufacture_date", PointNode::Point("v6215")),
    ("inlet_temperature", PointNode::Point("v4291")),
    ("ups_topology", PointNode::Point("v6199")),
    ("ups_source", PointNode::Point("v4872")),
    ("black_out_count", PointNode::Point("v4120")),
    ("brown_out_count", PointNode::Point("v4119")),
    ("system_name", PointNode::Point("v4246")),
];

static SYSTEM_EVENT: PointGroup = &[("loss_of_redundancy", PointNode::Point("v4825"))];

static SYSTEM_SETTINGS: PointGroup = &[
    ("site_identifier", PointNode::Point("v4247")),
    ("auto_restart", PointNode::Point("v5831")),
    ("auto_restart_delay", PointNode::Point("v4710")),
    ("site_equipment_tag", PointNode::Point("v4248")),
    ("system_name", PointNode::Point("v4246")),
    ("audible_alarm_control", PointNode::Point("v5830")),
];

pub static SYSTEM: PointGroup = &[
    ("status", PointNode::Group(SYSTEM_STATUS)),
    ("event", PointNode::Group(SYSTEM_EVENT)),
    ("settings", PointNode::Group(SYSTEM_SETTINGS)),
];

// ── Battery ──────────────────────────────────────────────────────────

static BATTERY_STATUS: PointGroup = &[
    ("charge", PointNode::Point("v4153")),
    ("time_remaining", PointNode::Point("v4150")),
    ("charge_status", PointNode::Point("v5799")),
    ("dc_bus_voltage", PointNode::Point("v4148")),
    ("charger_state", PointNode::Point("v6192")),
    ("test_result", PointNode::Point("v6181")),
    ("status", PointNode::Point("v4871")),
];

static BATTERY_EVENT: PointGroup = &[("low", PointNode::Point("v4162"))];

static BATTERY_SETTINGS: PointGroup =
    &[("low_battery_warning_time", PointNode::Point("v5802"))];

pub static BATTERY: PointGroup = &[
    ("status", PointNode::Group(BATTERY_STATUS)),
    ("event", PointNode::Group(BATTERY_EVENT)),
    ("settings", PointNode::Group(BATTERY_SETTINGS)),
];

// ── Input ────────────────────────────────────────────────────────────

static INPUT_STATUS: PointGroup = &[
    ("voltage_ln", PointNode::Point("v4096")),
    ("current_amps", PointNode::Point("v4113")),
    ("frequency_hz", PointNode::Point("v4105")),
    ("max_voltage_ln", PointNode::Point("v4106")),
    ("min_voltage_ln", PointNode::Point("v4107")),
    ("nominal_voltage", PointNode::Point("v4102")),
];

static INPUT_EVENT: PointGroup = &[("undervoltage", PointNode::Point("v5568"))];

pub static INPUT: PointGroup = &[
    ("status", PointNode::Group(INPUT_STATUS)),
    ("event", PointNode::Group(INPUT_EVENT)),
];

// ── Output ───────────────────────────────────────────────────────────

static OUTPUT_STATUS: PointGroup = &[
    ("voltage_ln", PointNode::Point("v4385")),
    ("amps", PointNode::Point("v4204")),
    ("watts", PointNode::Point("v4208")),
    ("va", PointNode::Point("v4209")),
    ("load_percent", PointNode::Point("v5861")),
    ("pf", PointNode::Point("v4212")),
    ("frequency", PointNode::Point("v4207")),
];

static OUTPUT_EVENT: PointGroup = &[("overload", PointNode::Point("v4215"))];

pub static OUTPUT: PointGroup = &[
    ("status", PointNode::Group(OUTPUT_STATUS)),
    ("event", PointNode::Group(OUTPUT_EVENT)),
];

// ── Bypass ───────────────────────────────────────────────────────────

// The bypass subsystem has no categories on the card; its points sit flat.
pub static BYPASS: PointGroup = &[
    ("bypass_voltage", PointNode::Point("v4128")),
    ("bypass_current", PointNode::Point("v5570")),
    ("bypass_frequency", PointNode::Point("v4131")),
    ("bypass_nominal_voltage", PointNode::Point("v4259")),
    ("bypass_not_available", PointNode::Point("v4135")),
];

/// Every subsystem, in presentation order.
pub static SUBSYSTEMS: &[(&str, PointGroup)] = &[
    ("system", SYSTEM),
    ("battery", BATTERY),
    ("input", INPUT),
    ("output", OUTPUT),
    ("bypass", BYPASS),
];

#[cfg(test)]
mod tests {
    use super::*;

    fn leaf_names(group: PointGroup, out: &mut Vec<&'static str>) {
        for (name, node) in group {
            match *node {
                PointNode::Point(_) => out.push(*name),
                PointNode::Group(nested) => leaf_names(nested, out),
            }
        }
    }

    #[test]
    fn every_attribute_resolves_to_exactly_one_point() {
        for (subsystem, group) in SUBSYSTEMS {
            let mut names = Vec::new();
            leaf_names(group, &mut names);
            for name in names {
                match lookup(group, name) {
                    Resolved::Point(point) => {
                        // every point id looks like vNNNN
                        assert!(
                            point.starts_with('v')
                                && point[1..].chars().all(|c| c.is_ascii_digit()),
                            "{subsystem}.{name}: malformed point id {point}"
                        );
                    }
                    other => panic!("{subsystem}.{name}: resolved to {other:?}"),
                }
            }
        }
    }

    #[test]
    fn lookup_finds_nested_leaves_without_category() {
        match lookup(BATTERY, "charge") {
            Resolved::Point(point) => assert_eq!(point, "v4153"),
            other => panic!("expected point, got {other:?}"),
        }
    }

    #[test]
    fn lookup_returns_category_for_group_names() {
        match lookup(SYSTEM, "settings") {
            Resolved::Category(group) => {
                assert!(group.iter().any(|(name, _)| *name == "site_identifier"));
            }
            other => panic!("expected category, got {other:?}"),
        }
    }

    #[test]
    fn lookup_misses_are_tagged_not_found() {
        assert!(matches!(lookup(INPUT, "no_such_point"), Resolved::NotFound));
    }

    #[test]
    fn point_resolution_wins_over_category_names() {
        // "status" is both a battery category and a point inside it;
        // flat point resolution reads the point.
        match lookup(BATTERY, "status") {
            Resolved::Point(point) => assert_eq!(point, "v4871"),
            other => panic!("expected point, got {other:?}"),
        }
    }

    #[test]
    fn leaf_points_preserve_declared_order() {
        let points = leaf_points(OUTPUT);
        assert_eq!(
            points,
            vec!["v4385", "v4204", "v4208", "v4209", "v5861", "v4212", "v4207", "v4215"]
        );
    }
}

// Wire codec for the Unity-DP string protocol.
//
// The card speaks a flat text format on both directions: response bodies
// are semicolon-delimited `key=value` pairs with double-quoted values,
// point reads are requested through `vel~pnt~NNNN` descriptors, and
// writes are encoded into a single form field whose name carries the
// write kind (`strNNNN` for plain text, `commBtnNNNN` for commands).
// This module is pure string handling; request plumbing lives in the
// client.

use std::collections::HashMap;

/// Sentinel the card returns for points the hardware does not implement.
pub const NO_SUPPORT: &str = "No Support";

/// Placeholder substituted for [`NO_SUPPORT`] on read.
pub const PLACEHOLDER: &str = "--";

/// Separates a command argument from its label: `"30!~Reboot"`.
/// Presence of this delimiter marks a value as a command write.
pub const COMMAND_DELIMITER: &str = "!~";

/// Write-envelope markers sent with every POST.
pub const SET_BEGIN: &str = "http~set~begin";
pub const SET_END: &str = "http~set~end";

/// Query/body key carrying the session-actor token.
pub(crate) const SESSION_KEY: &str = "sessACT";

/// Strip the leading `v` from a point identifier (`"v4335"` → `"4335"`).
fn point_digits(point: &str) -> &str {
    point.strip_prefix('v').unwrap_or(point)
}

/// Query descriptor for reading a point: `"v4335"` → `"vel~pnt~4335"`.
pub fn point_query(point: &str) -> String {
    format!("vel~pnt~{}", point_digits(point))
}

/// Parse a semicolon-delimited `key=value` body into a map, stripping
/// the double quotes the card wraps values in. Parts without `=` are
/// skipped.
pub fn parse_fields(body: &str) -> HashMap<String, String> {
    body.split(';')
        .filter_map(|part| part.split_once('='))
        .map(|(k, v)| (k.to_owned(), v.trim_matches('"').to_owned()))
        .collect()
}

/// Extract the session-actor token from a response body, if present.
pub(crate) fn session_token(body: &str) -> Option<&str> {
    body.split(';')
        .find_map(|part| part.strip_prefix("sessACT="))
        .map(|token| token.trim_matches('"'))
}

/// A value to write to a point.
///
/// Booleans coerce to `0`/`1`. [`SetValue::Command`] renders as
/// `"{value}!~{label}"`; only the part before the delimiter goes on the
/// wire, the label exists for readability at call sites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SetValue {
    Text(String),
    Number(i64),
    Bool(bool),
    Command { value: String, label: String },
}

impl SetValue {
    /// Build a command value: `SetValue::command("30", "Reboot")`.
    pub fn command(value: impl Into<String>, label: impl Into<String>) -> Self {
        Self::Command {
            value: value.into(),
            label: label.into(),
        }
    }

    fn render(&self) -> String {
        match self {
            Self::Text(s) => s.clone(),
            Self::Number(n) => n.to_string(),
            Self::Bool(true) => "1".to_owned(),
            Self::Bool(false) => "0".to_owned(),
            Self::Command { value, label } => format!("{value}{COMMAND_DELIMITER}{label}"),
        }
    }

    fn is_text(&self) -> bool {
        matches!(self, Self::Text(_))
    }
}

impl From<&str> for SetValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_owned())
    }
}

impl From<String> for SetValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<i64> for SetValue {
    fn from(n: i64) -> Self {
        Self::Number(n)
    }
}

impl From<bool> for SetValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

/// Encode one point write into its form field.
///
/// Returns `(field_name, field_value)`. Command-shaped values (anything
/// containing [`COMMAND_DELIMITER`], and every non-text variant) become a
/// `commBtnNNNN` field carrying a numeric payload prefixed with `{0}`;
/// plain text becomes a `strNNNN` field.
pub fn encode_set_field(point: &str, value: &SetValue) -> (String, String) {
    let digits = point_digits(point);
    let rendered = value.render();
    let is_command = rendered.contains(COMMAND_DELIMITER) || !value.is_text();

    if is_command {
        let payload = rendered
            .split(COMMAND_DELIMITER)
            .next()
            .unwrap_or_default()
            .to_owned();
        (
            format!("commBtn{digits}"),
            format!("{{0}}vel~pnt~{digits}~0|val~num~{payload}"),
        )
    } else {
        (
            format!("str{digits}"),
            format!("vel~pnt~{digits}~0|val~str~{rendered}"),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parse_fields_strips_quotes_and_skips_junk() {
        let body = "v4096=\"230.1\";v4113=\"1.2\";sessACT=abc123;garbage;";
        let fields = parse_fields(body);
        assert_eq!(fields.get("v4096").map(String::as_str), Some("230.1"));
        assert_eq!(fields.get("v4113").map(String::as_str), Some("1.2"));
        assert_eq!(fields.get("sessACT").map(String::as_str), Some("abc123"));
        assert_eq!(fields.len(), 3);
    }

    #[test]
    fn session_token_found_anywhere_in_body() {
        assert_eq!(session_token("pw=admin;sessACT=tok42;x=y"), Some("tok42"));
        assert_eq!(session_token("pw=admin;x=y"), None);
        assert_eq!(session_token(""), None);
    }

    #[test]
    fn point_query_drops_v_prefix() {
        assert_eq!(point_query("v4335"), "vel~pnt~4335");
        assert_eq!(point_query("4335"), "vel~pnt~4335");
    }

    #[test]
    fn text_value_encodes_as_str_field() {
        let (name, value) = encode_set_field("v4246", &SetValue::from("Rack 12"));
        assert_eq!(name, "str4246");
        assert_eq!(value, "vel~pnt~4246~0|val~str~Rack 12");
    }

    #[test]
    fn command_value_encodes_as_comm_btn_field() {
        let (name, value) = encode_set_field("v5815", &SetValue::command("30", "Reboot"));
        assert_eq!(name, "commBtn5815");
        assert_eq!(value, "{0}vel~pnt~5815~0|val~num~30");
    }

    #[test]
    fn text_containing_delimiter_is_treated_as_command() {
        let (name, value) = encode_set_field("v6257", &SetValue::from("1!~Silence"));
        assert_eq!(name, "commBtn6257");
        assert_eq!(value, "{0}vel~pnt~6257~0|val~num~1");
    }

    #[test]
    fn bool_coerces_to_zero_or_one() {
        let (name, value) = encode_set_field("v5831", &SetValue::from(true));
        assert_eq!(name, "commBtn5831");
        assert_eq!(value, "{0}vel~pnt~5831~0|val~num~1");

        let (_, value) = encode_set_field("v5831", &SetValue::from(false));
        assert_eq!(value, "{0}vel~pnt~5831~0|val~num~0");
    }

    #[test]
    fn number_encodes_as_comm_btn_field() {
        let (name, value) = encode_set_field("v4710", &SetValue::from(120_i64));
        assert_eq!(name, "commBtn4710");
        assert_eq!(value, "{0}vel~pnt~4710~0|val~num~120");
    }
}

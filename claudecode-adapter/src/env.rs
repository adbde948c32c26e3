//! Parsing of the `KEY: value` custom environment blob.

use std::collections::BTreeMap;

/// Parses newline-delimited `KEY: value` pairs.
///
/// Blank lines, `#` comments and lines without a colon are skipped. Only the
/// first colon splits, so values may contain colons. Later duplicates win.
#[must_use]
pub fn parse_custom_env_vars(text: Option<&str>) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();

    let Some(text) = text else {
        return vars;
    };

    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let Some((key, value)) = line.split_once(':') else {
            continue;
        };

        let key = key.trim();
        if key.is_empty() {
            continue;
        }

        vars.insert(key.to_string(), value.trim().to_string());
    }

    vars
}

//! `${key}` / `${section:key}` reference expansion.

use crate::error::{ErrorKind, Result};
use crate::settings::Settings;
use regex::Regex;
use std::sync::LazyLock;

/// How many references may be followed from a single value before giving up.
const MAX_DEPTH: usize = 10;

/// `$$` (a literal dollar) or `${reference}`.
static REFERENCE_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$(?:\$|\{([^}]+)\})").unwrap());

/// Expands every reference of every value, returning new settings.
///
/// References always resolve against the raw (unexpanded) values, so the
/// result doesn't depend on section order.
pub(crate) fn interpolate(raw: &Settings) -> Result<Settings> {
    let mut expanded = Settings::new();
    for section in raw.sections() {
        let target = expanded.section_mut(section.name());
        for (key, value) in section.iter() {
            let origin = (section.name(), key);
            target.set(key, expand(raw, origin, section.name(), value, 0)?);
        }
    }
    Ok(expanded)
}

fn expand(raw: &Settings, origin: (&str, &str), section: &str, value: &str, depth: usize) -> Result<String> {
    if depth > MAX_DEPTH {
        exn::bail!(ErrorKind::InterpolationDepth { section: origin.0.to_string(), key: origin.1.to_string() });
    }
    let mut expanded = String::with_capacity(value.len());
    let mut last = 0;
    for captures in REFERENCE_REGEX.captures_iter(value) {
        let Some(whole) = captures.get(0) else { continue };
        expanded.push_str(&value[last..whole.start()]);
        last = whole.end();
        let Some(reference) = captures.get(1) else {
            expanded.push('$');
            continue;
        };
        let (target_section, target_key) = match reference.as_str().split_once(':') {
            Some((section, key)) => (section, key),
            None => (section, reference.as_str()),
        };
        let target = raw.lookup(target_section, target_key);
        let Some(target) = target else {
            exn::bail!(ErrorKind::Interpolation {
                section: origin.0.to_string(),
                key: origin.1.to_string(),
                reference: reference.as_str().to_string(),
            });
        };
        expanded.push_str(&expand(raw, origin, target_section, target, depth + 1)?);
    }
    expanded.push_str(&value[last..]);
    Ok(expanded)
}

#[cfg(test)]
mod tests {
    use crate::error::ErrorKind;
    use crate::settings::Settings;
    use rstest::rstest;

    #[rstest]
    #[case("[a]\nx = 1\ny = ${x}2\n", "a", "y", "12")]
    #[case("[a]\nx = ${b:z}/out\n[b]\nz = ${w}\nw = root\n", "a", "x", "root/out")]
    #[case("[a]\nprice = $$5\n", "a", "price", "$5")]
    #[case("[a]\ncost = 5$ each\n", "a", "cost", "5$ each")]
    #[case("[a]\nname = {user_name}_${suffix}\nsuffix = scan\n", "a", "name", "{user_name}_scan")]
    #[case("[DEFAULT]\nroot = /scans\n[a]\nx = ${b:root}/raw\n[b]\n", "a", "x", "/scans/raw")]
    fn test_expands(#[case] text: &str, #[case] section: &str, #[case] key: &str, #[case] expected: &str) {
        let settings = Settings::parse(text).unwrap();
        assert_eq!(settings.get(section, key).unwrap(), expected);
    }

    #[test]
    fn test_missing_reference() {
        let err = Settings::parse("[a]\nx = ${b:nope}\n").unwrap_err();
        assert_eq!(
            *err,
            ErrorKind::Interpolation { section: "a".into(), key: "x".into(), reference: "b:nope".into() }
        );
    }

    #[test]
    fn test_cycle_is_bounded() {
        let err = Settings::parse("[a]\nx = ${y}\ny = ${x}\n").unwrap_err();
        assert_eq!(*err, ErrorKind::InterpolationDepth { section: "a".into(), key: "x".into() });
    }
}

use crate::context::Context;
use crate::error::{Error, ErrorKind, Result};
use crate::placeholder::Placeholder;
use exn::OptionExt;
use regex::{Captures, Regex};
use std::sync::LazyLock;
use tracing::instrument;

/// Shortest `{...}` span; placeholders never nest.
static PLACEHOLDER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{(.+?)\}").unwrap());

/// A placeholder that was left in the output, and why.
#[derive(Debug)]
pub struct Failure {
    /// The placeholder exactly as it appears in the text, braces included.
    pub placeholder: String,
    pub error: Error,
}

/// The outcome of [`render`].
#[derive(Debug)]
pub struct Resolved {
    pub text: String,
    pub failures: Vec<Failure>,
}
impl Resolved {
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Substitutes every placeholder of `text`, left to right, collecting the ones
/// that could not be resolved instead of logging them.
///
/// Only the matched spans are replaced; failed spans stay verbatim and the
/// substituted values are never scanned again.
pub fn render(text: &str, context: &Context) -> Resolved {
    let mut failures = Vec::new();
    let text = PLACEHOLDER_REGEX
        .replace_all(text, |captures: &Captures<'_>| {
            match substitute(&captures[1], context) {
                Ok(value) => value,
                Err(error) => {
                    let placeholder = captures[0].to_string();
                    failures.push(Failure { placeholder: placeholder.clone(), error });
                    placeholder
                },
            }
        })
        .into_owned();
    Resolved { text, failures }
}

/// Substitutes every placeholder of `text` and returns the result. Each
/// placeholder that can't be resolved is logged as a warning and left as-is.
#[instrument(level = "trace", skip(context), ret)]
pub fn resolve(text: &str, context: &Context) -> String {
    let resolved = render(text, context);
    for Failure { placeholder, error } in &resolved.failures {
        tracing::warn!(%placeholder, %error, "Error converting template to value");
    }
    resolved.text
}

/// Resolves the inside of one placeholder. The key is looked up before the
/// format fields are parsed, so a missing key always reports as such.
fn substitute(inner: &str, context: &Context) -> Result<String> {
    let key = Placeholder::key_of(inner);
    let value = context.get(key).ok_or_raise(|| ErrorKind::UnknownTemplateKey(key.to_string()))?;
    let placeholder: Placeholder = inner.parse()?;
    Ok(placeholder.format(value))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn context() -> Context {
        let mut context = Context::new();
        context.insert("user_name", "alice").insert("scan_dpi", 600).insert("digitization_month", 3);
        context
    }

    #[rstest]
    #[case("scan_{user_name:10:>:_}.tif", "scan______alice.tif")]
    #[case("{user_name}/{scan_dpi}", "alice/600")]
    #[case("{digitization_month:2:>:0}", "03")]
    #[case("[{user_name:9:^}]", "[  alice  ]")]
    #[case("{user_name}{user_name:1}", "alicealice")]
    fn test_resolves(#[case] text: &str, #[case] expected: &str) {
        let resolved = render(text, &context());
        assert!(resolved.is_complete());
        assert_eq!(resolved.text, expected);
    }

    #[test]
    fn test_unknown_key_left_verbatim() {
        let resolved = render("{missing}_ok", &context());
        assert_eq!(resolved.text, "{missing}_ok");
        assert_eq!(resolved.failures.len(), 1);
        assert_eq!(resolved.failures[0].placeholder, "{missing}");
        assert_eq!(*resolved.failures[0].error, ErrorKind::UnknownTemplateKey("missing".to_string()));
    }

    #[test]
    fn test_format_error_left_verbatim() {
        let resolved = render("{user_name:wide}-{scan_dpi}", &context());
        assert_eq!(resolved.text, "{user_name:wide}-600");
        assert_eq!(*resolved.failures[0].error, ErrorKind::TemplateFormatError("user_name:wide".to_string()));
    }

    #[test]
    fn test_oversized_width_left_verbatim() {
        let resolved = render("{user_name:18446744073709551615}-{scan_dpi}", &context());
        assert_eq!(resolved.text, "{user_name:18446744073709551615}-600");
        assert_eq!(
            *resolved.failures[0].error,
            ErrorKind::TemplateFormatError("user_name:18446744073709551615".to_string())
        );
    }

    #[test]
    fn test_unknown_key_reported_before_format() {
        let resolved = render("{missing:wide}", &context());
        assert_eq!(*resolved.failures[0].error, ErrorKind::UnknownTemplateKey("missing".to_string()));
    }

    #[test]
    fn test_failures_do_not_stop_later_placeholders() {
        let resolved = render("{a}/{user_name}/{b:1}/{scan_dpi:4:>:0}", &context());
        assert_eq!(resolved.text, "{a}/alice/{b:1}/0600");
        assert_eq!(resolved.failures.len(), 2);
    }

    #[rstest]
    #[case("plain text")]
    #[case("")]
    #[case("{}")]
    #[case("C:\\Scans\\output")]
    fn test_text_without_placeholders_unchanged(#[case] text: &str) {
        assert_eq!(resolve(text, &context()), text);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let once = resolve("scan_{user_name:10:>:_}_{scan_dpi}.tif", &context());
        assert_eq!(resolve(&once, &context()), once);
    }

    #[test]
    fn test_values_are_not_rescanned() {
        let mut context = context();
        context.insert("tricky", "{user_name}");
        assert_eq!(resolve("{tricky}", &context), "{user_name}");
    }
}

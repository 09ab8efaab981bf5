//! Human-readable messages for parse failures.

use crate::config::FormatConfig;
use crate::result::{describe_expected, Failure};

/// Formats `failure` against the `input` it came from, with default settings.
///
/// ```text
/// expected one of 'c', 'b', 'a' at character 0, got 'd'
/// expected EOF at character 3, got 'a'
/// expected 'a' at character 0, got end of input
/// ```
pub fn format_error(input: &str, failure: &Failure) -> String {
    format_error_with(&FormatConfig::default(), input, failure)
}

pub fn format_error_with(config: &FormatConfig, input: &str, failure: &Failure) -> String {
    let rest = input.get(failure.index..).unwrap_or_default();
    let got = if rest.is_empty() {
        "end of input".to_string()
    } else {
        let excerpt: String = rest.chars().take(config.excerpt_length).collect();
        format!("'{excerpt}'")
    };
    format!(
        "expected {} at character {}, got {}",
        describe_expected(&failure.expected),
        failure.index,
        got
    )
}

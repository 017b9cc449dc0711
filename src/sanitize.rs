//! ASCII sanitization for text handed to the orchestrator.
//!
//! Model providers disagree on how they treat extended Unicode in prompts,
//! so every string that crosses the orchestrator boundary is restricted to
//! 7-bit ASCII first.

use unicode_normalization::UnicodeNormalization;

use crate::domain::{ConfigRecord, ConfigValue};

/// Replace every maximal run of non-ASCII characters with a single space.
///
/// ASCII-only input comes back unchanged, and `clean(clean(s)) == clean(s)`.
pub fn clean(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_run = false;

    for ch in text.chars() {
        if ch.is_ascii() {
            out.push(ch);
            in_run = false;
        } else if !in_run {
            out.push(' ');
            in_run = true;
        }
    }

    out
}

/// Fold to ASCII for environment-bound values.
///
/// Compatibility decomposition first, so accented letters keep their base
/// letter; whatever is still non-ASCII is dropped.
pub fn ascii_fold(text: &str) -> String {
    text.nfkd().filter(char::is_ascii).collect()
}

/// Clean every string value and every string element of list values.
///
/// Keys, entry order and all other values (numbers, booleans, nulls and
/// nested maps) are left as they are.
pub fn sanitize_record(record: ConfigRecord) -> ConfigRecord {
    record
        .into_iter()
        .map(|(key, value)| (key, sanitize_value(value)))
        .collect()
}

fn sanitize_value(value: ConfigValue) -> ConfigValue {
    match value {
        ConfigValue::Text(text) => ConfigValue::Text(clean(&text)),
        ConfigValue::List(items) => ConfigValue::List(
            items
                .into_iter()
                .map(|item| match item {
                    ConfigValue::Text(text) => ConfigValue::Text(clean(&text)),
                    other => other,
                })
                .collect(),
        ),
        other => other,
    }
}

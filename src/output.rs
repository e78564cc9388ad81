//! Extraction of the authoritative summary record from restic's
//! line-delimited JSON output.

use serde_json::Value;

use crate::error::{Error, Result};

/// Scans stdout for the one record that reports the operation outcome.
///
/// restic emits one JSON object per line (progress, status, summary) with
/// no terminal marker beyond content shape, and its JSON support differs
/// per operation. Two independent detection rules cover that:
///
/// 1. An object whose `message_type` field is `"summary"` wins immediately
///    and stops the scan (backup and restore tag their summary this way).
/// 2. Failing that, the last line carrying a tags marker wins — forget
///    never emits a typed discriminator, only tag-bearing group records,
///    and later records supersede earlier ones.
///
/// Unparseable lines are skipped. Empty input or no candidate is a
/// [`Error::NoSummary`] failure.
pub(crate) fn extract_summary(stdout: &str) -> Result<&str> {
    let mut tagged: Option<&str> = None;

    for line in stdout.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let Ok(value) = serde_json::from_str::<Value>(line) else {
            continue;
        };

        if value.get("message_type").and_then(Value::as_str) == Some("summary") {
            return Ok(line);
        }
        if has_tags_marker(&value) {
            tagged = Some(line);
        }
    }

    tagged.ok_or(Error::NoSummary)
}

/// Forget reports a single-line JSON array of tag-bearing group records;
/// a bare tag-bearing object also counts.
fn has_tags_marker(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.contains_key("tags"),
        Value::Array(items) => items.first().is_some_and(|item| item.get("tags").is_some()),
        _ => false,
    }
}

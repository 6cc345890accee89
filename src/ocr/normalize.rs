//! Result Normalizer
//!
//! The engine changed its output contract between major versions: older
//! releases emit, per page, a list of `[geometry, [text, score]]` detection
//! entries; newer ones a mapping with parallel `rec_texts` / `rec_scores`
//! arrays. Both shapes are accepted so an engine upgrade does not break
//! existing callers, and pages may even mix variants within one result.
//! Anything unrecognized is skipped, never raised.

use serde_json::Value;

use super::types::ExtractionRecord;

/// Per-page shape of the raw engine result, decided once before any field
/// access. The mapping check runs first; in the (theoretical) case where a
/// page could satisfy both checks, the newer record shape wins.
enum PageVariant<'a> {
    /// Parallel `rec_texts` / `rec_scores` arrays.
    Record {
        texts: &'a [Value],
        scores: &'a [Value],
    },
    /// Ordered detection entries of `[geometry, [text, score]]`.
    Legacy(&'a [Value]),
    Unrecognized,
}

fn classify(page: &Value) -> PageVariant<'_> {
    match page {
        Value::Object(map) => PageVariant::Record {
            texts: map
                .get("rec_texts")
                .and_then(Value::as_array)
                .map_or(&[][..], Vec::as_slice),
            scores: map
                .get("rec_scores")
                .and_then(Value::as_array)
                .map_or(&[][..], Vec::as_slice),
        },
        Value::Array(entries) => PageVariant::Legacy(entries),
        _ => PageVariant::Unrecognized,
    }
}

/// Flatten a raw engine result into extraction records.
///
/// Total over any JSON value. An empty or absent result yields no records;
/// malformed entries are dropped individually. Output order follows the
/// engine's emission order, and the record count never exceeds the number
/// of regions the engine reported.
pub fn normalize(raw: &Value) -> Vec<ExtractionRecord> {
    let Some(pages) = raw.as_array() else {
        return Vec::new();
    };

    let mut records = Vec::new();
    for page in pages {
        match classify(page) {
            PageVariant::Record { texts, scores } => {
                // Positional pairing up to the shorter array.
                for (text, score) in texts.iter().zip(scores) {
                    if let Some(confidence) = coerce_confidence(score) {
                        records.push(ExtractionRecord {
                            text: coerce_text(text),
                            confidence,
                        });
                    }
                }
            }
            PageVariant::Legacy(entries) => {
                for entry in entries {
                    // Entry is [geometry, [text, score], ...]; anything
                    // shorter contributes nothing.
                    let Some(text_info) = entry.as_array().and_then(|e| e.get(1)) else {
                        continue;
                    };
                    let Some(info) = text_info.as_array().filter(|info| info.len() >= 2) else {
                        continue;
                    };
                    if let Some(confidence) = coerce_confidence(&info[1]) {
                        records.push(ExtractionRecord {
                            text: coerce_text(&info[0]),
                            confidence,
                        });
                    }
                }
            }
            PageVariant::Unrecognized => {}
        }
    }

    records
}

/// Engine scores arrive as floats, integers, or numeric strings depending
/// on the backend version; all of them become `f64`. A score that cannot
/// be coerced drops its entry.
fn coerce_confidence(score: &Value) -> Option<f64> {
    match score {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Stringify a recognized text value. Strings pass through verbatim; other
/// scalars keep their JSON rendering rather than dropping the region.
fn coerce_text(text: &Value) -> String {
    match text {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn record(text: &str, confidence: f64) -> ExtractionRecord {
        ExtractionRecord {
            text: text.to_string(),
            confidence,
        }
    }

    #[test]
    fn empty_or_absent_results_yield_nothing() {
        assert!(normalize(&Value::Null).is_empty());
        assert!(normalize(&json!([])).is_empty());
        // A bare mapping is not a page sequence.
        assert!(normalize(&json!({"rec_texts": ["stray"]})).is_empty());
    }

    #[test]
    fn legacy_page_emits_text_and_score() {
        let raw = json!([[
            [[[0, 0], [1, 0], [1, 1], [0, 1]], ["Hello", 0.98]]
        ]]);

        assert_eq!(normalize(&raw), vec![record("Hello", 0.98)]);
    }

    #[test]
    fn record_page_pairs_parallel_arrays() {
        let raw = json!([{
            "rec_texts": ["Hi", "Bye"],
            "rec_scores": [0.9, 0.5],
        }]);

        assert_eq!(normalize(&raw), vec![record("Hi", 0.9), record("Bye", 0.5)]);
    }

    #[test]
    fn record_page_stops_at_the_shorter_array() {
        let raw = json!([{
            "rec_texts": ["a", "b", "c"],
            "rec_scores": [0.1, 0.2],
        }]);
        assert_eq!(normalize(&raw).len(), 2);

        let raw = json!([{
            "rec_texts": ["a"],
            "rec_scores": [0.1, 0.2, 0.3],
        }]);
        assert_eq!(normalize(&raw), vec![record("a", 0.1)]);

        // Missing arrays default to empty.
        assert!(normalize(&json!([{"rec_scores": [0.4]}])).is_empty());
        assert!(normalize(&json!([{}])).is_empty());
    }

    #[test]
    fn short_detection_entries_contribute_nothing() {
        let raw = json!([[
            [],
            [[[0, 0], [1, 1]]],
            "not an entry",
            [[[0, 0], [1, 1]], ["kept", 0.7]],
        ]]);

        assert_eq!(normalize(&raw), vec![record("kept", 0.7)]);
    }

    #[test]
    fn truncated_text_info_is_skipped() {
        let raw = json!([[
            [[[0, 0], [1, 1]], ["lonely"]],
            [[[0, 0], [1, 1]], "not a pair"],
        ]]);

        assert!(normalize(&raw).is_empty());
    }

    #[test]
    fn confidence_is_coerced_to_float() {
        let raw = json!([{
            "rec_texts": ["int", "string"],
            "rec_scores": [1, "0.5"],
        }]);

        assert_eq!(normalize(&raw), vec![record("int", 1.0), record("string", 0.5)]);

        let raw = json!([[
            [[[0, 0], [1, 1]], ["stringy", "0.75"]]
        ]]);
        assert_eq!(normalize(&raw), vec![record("stringy", 0.75)]);
    }

    #[test]
    fn non_coercible_scores_drop_their_pair() {
        let raw = json!([{
            "rec_texts": ["kept", "dropped", "also kept"],
            "rec_scores": [0.9, null, "0.3"],
        }]);

        assert_eq!(
            normalize(&raw),
            vec![record("kept", 0.9), record("also kept", 0.3)]
        );
    }

    #[test]
    fn non_string_texts_are_stringified() {
        let raw = json!([{
            "rec_texts": [123, true],
            "rec_scores": [0.1, 0.2],
        }]);

        assert_eq!(normalize(&raw), vec![record("123", 0.1), record("true", 0.2)]);
    }

    #[test]
    fn pages_may_mix_variants() {
        let raw = json!([
            [[[[0, 0], [1, 1]], ["first", 0.9]]],
            {"rec_texts": ["second"], "rec_scores": [0.8]},
            "unrecognized page",
            42,
        ]);

        assert_eq!(
            normalize(&raw),
            vec![record("first", 0.9), record("second", 0.8)]
        );
    }
}

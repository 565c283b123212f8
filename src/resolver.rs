//! Sequence resolution
//!
//! Maps raw events onto catalog actions and lays them out back-to-back on a
//! minute timeline.

use crate::error::ComputeError;
use crate::model::ActionCatalog;
use crate::types::{Event, ResolvedStep};
use serde_json::{Map, Value};

/// Parse the raw event array.
///
/// The input must be a JSON array; individual elements are parsed leniently
/// (see [`Event::from_value`]).
pub fn parse_events(input: &Value) -> Result<Vec<Event>, ComputeError> {
    let items = input
        .as_array()
        .ok_or_else(|| ComputeError::Validation("events must be an array".to_string()))?;
    Ok(items.iter().map(Event::from_value).collect())
}

/// Resolve events into a contiguous, non-overlapping timeline.
///
/// Events without a key, or whose key matches no catalog entry, are skipped.
/// Durations always come from the catalog.
pub fn resolve_sequence(events: &[Event], catalog: &ActionCatalog) -> Vec<ResolvedStep> {
    let mut steps = Vec::with_capacity(events.len());
    let mut cursor = 0.0;

    for (source_index, event) in events.iter().enumerate() {
        let Some(key) = event.key.as_deref() else {
            continue;
        };
        let Some(def) = catalog.lookup(&collapse_whitespace(key)) else {
            continue;
        };

        let dur = def.duration_min;
        let start = cursor;
        cursor = start + dur;

        steps.push(ResolvedStep {
            def: def.clone(),
            dur,
            start,
            meta: Map::new(),
            source_index,
        });
    }

    let skipped = events.len() - steps.len();
    if skipped > 0 {
        tracing::debug!(skipped, resolved = steps.len(), "dropped unrecognized events");
    }

    steps
}

/// Replace every whitespace run with a single space
fn collapse_whitespace(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut in_run = false;
    for ch in key.chars() {
        if ch.is_whitespace() {
            if !in_run {
                out.push(' ');
            }
            in_run = true;
        } else {
            out.push(ch);
            in_run = false;
        }
    }
    out
}

/// Total duration of a resolved sequence in minutes
pub fn total_duration(steps: &[ResolvedStep]) -> f64 {
    steps.iter().map(|s| s.dur).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ActionDefinition;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn action(id: &str, alias: Option<&str>, dur: f64) -> ActionDefinition {
        ActionDefinition {
            id: id.to_string(),
            alias: alias.map(str::to_string),
            scene: "kitchen".to_string(),
            duration_min: dur,
            tags: vec![],
            is_break: false,
            fixed_deltas: Default::default(),
        }
    }

    fn catalog() -> ActionCatalog {
        ActionCatalog::new(vec![
            action("make_coffee", Some("Make coffee"), 5.0),
            action("read_news", None, 15.0),
        ])
        .unwrap()
    }

    #[test]
    fn test_non_array_input_rejected() {
        let err = parse_events(&json!({ "key": "make_coffee" })).unwrap_err();
        assert!(matches!(err, ComputeError::Validation(_)));
    }

    #[test]
    fn test_resolve_assigns_contiguous_starts() {
        let events = parse_events(&json!([
            { "key": "make_coffee" },
            { "key": "read_news" },
            { "key": "make_coffee" }
        ]))
        .unwrap();
        let steps = resolve_sequence(&events, &catalog());

        let layout: Vec<(&str, f64, f64)> =
            steps.iter().map(|s| (s.id(), s.dur, s.start)).collect();
        assert_eq!(
            layout,
            vec![
                ("make_coffee", 5.0, 0.0),
                ("read_news", 15.0, 5.0),
                ("make_coffee", 5.0, 20.0),
            ]
        );
        assert_eq!(total_duration(&steps), 25.0);
    }

    #[test]
    fn test_malformed_and_unknown_events_skipped() {
        let events = parse_events(&json!([
            { "key": 7 },
            { "meta": {} },
            null,
            { "key": "unknown_action" },
            { "key": "read_news", "duration_min": 999 }
        ]))
        .unwrap();
        let steps = resolve_sequence(&events, &catalog());

        assert_eq!(steps.len(), 1);
        assert_eq!(steps[0].dur, 15.0);
        assert_eq!(steps[0].start, 0.0);
        assert_eq!(steps[0].source_index, 4);
    }

    #[test]
    fn test_whitespace_collapsed_before_lookup() {
        let events = vec![Event::new("Make \t  coffee"), Event::new("Make\ncoffee")];
        let steps = resolve_sequence(&events, &catalog());
        assert_eq!(steps.len(), 2);
        assert!(steps.iter().all(|s| s.id() == "make_coffee"));

        // Leading/trailing whitespace is collapsed, not trimmed
        let padded = vec![Event::new(" read_news")];
        assert!(resolve_sequence(&padded, &catalog()).is_empty());
    }

    #[test]
    fn test_collapse_whitespace() {
        assert_eq!(collapse_whitespace("a  b\t\tc"), "a b c");
        assert_eq!(collapse_whitespace("  a "), " a ");
        assert_eq!(collapse_whitespace(""), "");
    }

    #[test]
    fn test_steps_start_with_empty_meta() {
        let events = vec![Event::new("read_news").with_meta("gameDecision", json!("stop"))];
        let steps = resolve_sequence(&events, &catalog());
        assert!(steps[0].meta.is_empty());
    }
}

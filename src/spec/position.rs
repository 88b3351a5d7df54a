//! Source positions for components.
//!
//! `serde_yaml` does not expose node locations through `serde_json::Value`, so
//! positions are recovered by scanning the source text for `id:` keys and
//! pairing them, in order of appearance, with the component IDs.
//!
//! Flow-style entries such as `- {id: a.b, kind: usecase}` are found when `id`
//! is the first key of the mapping.

use regex::Regex;
use std::collections::{HashMap, VecDeque};

use crate::core::Position;

/// Locate each ID's `id:` key in `source`.
///
/// Returns one entry per element of `ids`, in the same order. Repeated IDs
/// consume successive occurrences, so duplicates point at their own
/// definitions. IDs that cannot be found get `None`.
#[must_use]
pub fn locate_components(source: &str, file: &str, ids: &[&str]) -> Vec<Option<Position>> {
    let mut occurrences: HashMap<String, VecDeque<Position>> = HashMap::new();

    if let Ok(id_regex) = Regex::new(r#"^(\s*(?:-\s+)?(?:\{\s*)?)["']?id["']?\s*:\s*["']?([^"'\s,#}]+)"#) {
        for (index, line) in source.lines().enumerate() {
            if let Some(caps) = id_regex.captures(line) {
                let indent = caps.get(1).map_or(0, |m| m.as_str().chars().count());
                if let Some(value) = caps.get(2) {
                    occurrences
                        .entry(value.as_str().to_string())
                        .or_default()
                        .push_back(Position::new(file, index + 1, indent + 1));
                }
            }
        }
    }

    ids.iter()
        .map(|id| occurrences.get_mut(*id).and_then(VecDeque::pop_front))
        .collect()
}

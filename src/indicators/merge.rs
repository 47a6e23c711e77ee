//! Reconciliation of two independently produced candidate lists.
//!
//! Candidates are keyed by their normalized name. When two share a key the
//! more complete record wins; completeness is a coarse score, so a richer
//! but numerically wrong record can beat a sparse correct one.

use crate::indicators::Candidate;
use indexmap::map::Entry;
use indexmap::IndexMap;

/// Merge key: lowercased name with whitespace collapsed.
///
/// # Examples
///
/// ```
/// use lab_oxide::indicators::merge_key;
///
/// assert_eq!(merge_key("  Общий   Белок "), "общий белок");
/// ```
pub fn merge_key(name: &str) -> String {
    name.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Completeness score: 3 for a value, 1 each for units, any reference bound and a comment.
pub fn completeness(candidate: &Candidate) -> u8 {
    let mut score = 0;
    if candidate.value.is_some() {
        score += 3;
    }
    if candidate.units.is_some() {
        score += 1;
    }
    if candidate.has_reference() {
        score += 1;
    }
    if candidate.comment.is_some() {
        score += 1;
    }
    score
}

/// Merge `primary` and `secondary`, keeping one candidate per merge key.
///
/// The output keeps first-seen key order (primary first). A later candidate
/// replaces an earlier one only with a strictly higher score, so exact ties
/// keep the earlier record.
pub fn merge_candidates(primary: Vec<Candidate>, secondary: Vec<Candidate>) -> Vec<Candidate> {
    let mut merged: IndexMap<String, Candidate> = IndexMap::new();

    for candidate in primary.into_iter().chain(secondary) {
        match merged.entry(merge_key(&candidate.test_name)) {
            Entry::Occupied(mut slot) => {
                if completeness(&candidate) > completeness(slot.get()) {
                    log::trace!(
                        "merge: '{}' replaced by richer record",
                        slot.get().test_name
                    );
                    slot.insert(candidate);
                }
            },
            Entry::Vacant(slot) => {
                slot.insert(candidate);
            },
        }
    }

    merged.into_values().collect()
}

/// Drop later duplicates within one list, first occurrence wins.
pub fn dedup_first(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen: IndexMap<String, Candidate> = IndexMap::new();
    for candidate in candidates {
        seen.entry(merge_key(&candidate.test_name))
            .or_insert(candidate);
    }
    seen.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completeness() {
        assert_eq!(completeness(&Candidate::new("ALT")), 0);
        assert_eq!(completeness(&Candidate::new("ALT").with_value(42.0)), 3);
        let full = Candidate::new("ALT")
            .with_value(42.0)
            .with_units("U/L")
            .with_range(0.0, 40.0)
            .with_comment("hemolysis");
        assert_eq!(completeness(&full), 6);
    }

    #[test]
    fn test_richer_record_wins() {
        let structural = vec![Candidate::new("ALT").with_value(42.0)];
        let ocr = vec![Candidate::new("ALT")
            .with_value(42.0)
            .with_units("U/L")
            .with_range(0.0, 40.0)];

        let merged = merge_candidates(structural, ocr);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].units.as_deref(), Some("U/L"));
        assert_eq!(merged[0].ref_max, Some(40.0));
    }

    #[test]
    fn test_tie_keeps_first() {
        let a = vec![Candidate::new("Glucose").with_value(5.6)];
        let b = vec![Candidate::new("glucose").with_value(6.1)];
        let merged = merge_candidates(a, b);
        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].value, Some(5.6));
        assert_eq!(merged[0].test_name, "Glucose");
    }

    #[test]
    fn test_merge_keeps_order_and_distinct_keys() {
        let a = vec![
            Candidate::new("Glucose").with_value(5.6),
            Candidate::new("ALT").with_value(42.0),
        ];
        let b = vec![
            Candidate::new("Cholesterol").with_value(190.0),
            Candidate::new("ALT").with_value(42.0).with_units("U/L"),
        ];
        let merged = merge_candidates(a, b);
        let names: Vec<&str> = merged.iter().map(|c| c.test_name.as_str()).collect();
        assert_eq!(names, vec!["Glucose", "ALT", "Cholesterol"]);
        assert_eq!(merged[1].units.as_deref(), Some("U/L"));
    }

    #[test]
    fn test_merge_with_itself_is_identity() {
        let list = vec![
            Candidate::new("Glucose").with_value(5.6).with_range(3.9, 5.5),
            Candidate::new("ALT").with_value(42.0),
        ];
        assert_eq!(merge_candidates(list.clone(), list.clone()), list);
    }

    #[test]
    fn test_dedup_first() {
        let list = vec![
            Candidate::new("Глюкоза").with_value(5.6),
            Candidate::new("ГЛЮКОЗА").with_value(7.0).with_units("ммоль/л"),
        ];
        let deduped = dedup_first(list);
        assert_eq!(deduped.len(), 1);
        assert_eq!(deduped[0].value, Some(5.6));
    }
}

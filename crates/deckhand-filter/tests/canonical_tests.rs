//! Integration tests for filter canonicalization.
//!
//! These pin down the properties other systems rely on when they use the
//! digest as a cache key or a persisted fingerprint.

use deckhand_core::{AssignmentStatus, DateRange, IndexedBy};
use deckhand_filter::{canonicalize, FieldDefaults, Filter, FilterFields, ParamKey, ParamValue};
use proptest::prelude::*;

fn tags(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

// =============================================================================
// Digest Stability
// =============================================================================

#[test]
fn test_digest_ignores_insertion_order() {
    let a = Filter::new(FilterFields {
        tag_ids: tags(&["design", "v2", "bug"]),
        assignee_ids: tags(&["ann", "jorge"]),
        ..Default::default()
    });
    let b = Filter::new(FilterFields {
        tag_ids: tags(&["bug", "design", "v2"]),
        assignee_ids: tags(&["jorge", "ann"]),
        ..Default::default()
    });

    assert_eq!(a.digest(), b.digest());
}

#[test]
fn test_default_equals_unset() {
    let unset = Filter::new(FilterFields::default());
    let defaulted = Filter::new(FilterFields {
        indexed_by: Some(IndexedBy::Latest),
        tag_ids: Vec::new(),
        ..Default::default()
    });

    assert_eq!(unset.digest(), defaulted.digest());
    assert!(defaulted.as_params().is_empty());
}

#[test]
fn test_different_semantics_different_digest() {
    let closed = Filter::new(FilterFields {
        indexed_by: Some(IndexedBy::Closed),
        ..Default::default()
    });
    let stalled = Filter::new(FilterFields {
        indexed_by: Some(IndexedBy::Stalled),
        ..Default::default()
    });

    assert_ne!(closed.digest(), stalled.digest());
}

#[test]
fn test_same_value_in_different_fields_differs() {
    let as_tag = Filter::new(FilterFields {
        tag_ids: tags(&["ann"]),
        ..Default::default()
    });
    let as_assignee = Filter::new(FilterFields {
        assignee_ids: tags(&["ann"]),
        ..Default::default()
    });

    assert_ne!(as_tag.digest(), as_assignee.digest());
}

#[test]
fn test_persistence_does_not_change_digest() {
    let fields = FilterFields {
        terms: tags(&["logo"]),
        ..Default::default()
    };
    let draft = Filter::new(fields.clone());
    let saved = Filter::persisted(17, fields);

    assert_eq!(draft.digest(), saved.digest());
}

#[test]
fn test_custom_defaults_elide_their_values() {
    let defaults = FieldDefaults::none().with(
        ParamKey::Assignments,
        ParamValue::One(AssignmentStatus::Unassigned.as_str().to_string()),
    );
    let fields = FilterFields {
        assignments: Some(AssignmentStatus::Unassigned),
        indexed_by: Some(IndexedBy::Latest),
        ..Default::default()
    };

    let params = canonicalize(&fields, &defaults);
    assert!(!params.contains(ParamKey::Assignments));
    // "latest" is not a default under these rules, so it stays.
    assert!(params.contains(ParamKey::IndexedBy));
}

// =============================================================================
// Allow-listed View
// =============================================================================

#[test]
fn test_view_contains_only_allowed_keys() {
    let mut filter = Filter::new(FilterFields {
        terms: tags(&["logo"]),
        tag_ids: tags(&["design"]),
        indexed_by: Some(IndexedBy::Newest),
        bucket_ids: tags(&["writebook"]),
        assignments: Some(AssignmentStatus::Unassigned),
        assignee_ids: tags(&["ann"]),
        assigner_ids: tags(&["jason"]),
        card_ids: vec![1, 2],
        creator_ids: tags(&["kevin"]),
        closer_ids: tags(&["jz"]),
        creation: Some(DateRange::ThisWeek),
        closure: Some(DateRange::LastMonth),
    });
    filter.mark_persisted(99);

    let allowed = [
        "indexed_by",
        "assignments",
        "bucket_ids",
        "assignee_ids",
        "assigner_ids",
        "tag_ids",
        "terms",
        "filter_id",
    ];
    let keys = filter.to_params().keys();
    assert_eq!(keys.len(), allowed.len());
    for key in keys {
        assert!(allowed.contains(&key), "unexpected key in view: {}", key);
    }
}

#[test]
fn test_params_without_removes_emptied_field() {
    let filter = Filter::new(FilterFields {
        tag_ids: tags(&["design"]),
        ..Default::default()
    });

    let view = filter.params_without("tag_ids", "design").unwrap();
    assert!(!view.contains(ParamKey::TagIds));
    assert!(view.keys().is_empty());
}

#[test]
fn test_params_without_keeps_remaining_values() {
    let filter = Filter::persisted(
        4,
        FilterFields {
            tag_ids: tags(&["design", "v2"]),
            ..Default::default()
        },
    );

    let view = filter.params_without("tag_ids", "design").unwrap();
    assert_eq!(view.get(ParamKey::TagIds).unwrap().values(), vec!["v2"]);
    assert_eq!(view.filter_id(), Some(4));
}

#[test]
fn test_query_pairs_round_trip_to_same_digest() {
    let filter = Filter::new(FilterFields {
        terms: tags(&["logo"]),
        tag_ids: tags(&["v2", "design"]),
        indexed_by: Some(IndexedBy::ClosingSoon),
        ..Default::default()
    });

    let rebuilt = FilterFields::from_query_pairs(filter.to_params().to_query_pairs()).unwrap();
    assert_eq!(Filter::new(rebuilt).digest(), filter.digest());
}

// =============================================================================
// Properties
// =============================================================================

proptest! {
    #[test]
    fn prop_digest_stable_under_reordering(
        ids in prop::collection::vec("[a-z0-9]{1,8}", 0..8),
        seed in any::<u64>(),
    ) {
        let mut shuffled = ids.clone();
        // Deterministic rotation plus reversal is enough to change order.
        if !shuffled.is_empty() {
            let len = shuffled.len();
            shuffled.rotate_left((seed as usize) % len);
            if seed % 2 == 0 {
                shuffled.reverse();
            }
        }

        let a = Filter::new(FilterFields { tag_ids: ids, ..Default::default() });
        let b = Filter::new(FilterFields { tag_ids: shuffled, ..Default::default() });
        prop_assert_eq!(a.digest(), b.digest());
    }

    #[test]
    fn prop_explicit_default_matches_unset(
        terms in prop::collection::vec("[a-z]{1,6}", 0..4),
    ) {
        let unset = Filter::new(FilterFields { terms: terms.clone(), ..Default::default() });
        let explicit = Filter::new(FilterFields {
            terms,
            indexed_by: Some(IndexedBy::Latest),
            ..Default::default()
        });
        prop_assert_eq!(unset.digest(), explicit.digest());
    }

    #[test]
    fn prop_duplicates_do_not_matter(
        ids in prop::collection::vec("[a-z]{1,6}", 1..6),
    ) {
        let mut doubled = ids.clone();
        doubled.extend(ids.iter().cloned());

        let a = Filter::new(FilterFields { assignee_ids: ids, ..Default::default() });
        let b = Filter::new(FilterFields { assignee_ids: doubled, ..Default::default() });
        prop_assert_eq!(a.digest(), b.digest());
    }
}

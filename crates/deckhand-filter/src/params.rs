//! Canonical parameter mappings and their allow-listed views
//!
//! [`canonicalize`] turns raw filter fields into [`CanonicalParams`]:
//! id collections are trimmed, sorted and deduplicated, `terms` keep the
//! order they were typed in, fields equal to their declared default are
//! elided, and blank fields are dropped. The digest is computed over that
//! mapping with keys in name order and every collection sorted, so it depends
//! only on what the filter means, never on insertion order or on fields added
//! later and left at their defaults.

use crate::fields::{FieldDefaults, FilterFields};
use deckhand_core::{DeckhandError, Digest, DigestBuilder};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use std::fmt;
use std::str::FromStr;

/// Digest domain; bump the version only when the canonical form itself changes.
const DIGEST_DOMAIN: &str = "deckhand.filter.v1";

/// Every field a filter can carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParamKey {
    IndexedBy,
    Assignments,
    BucketIds,
    AssigneeIds,
    AssignerIds,
    TagIds,
    Terms,
    CardIds,
    CreatorIds,
    CloserIds,
    Creation,
    Closure,
}

impl ParamKey {
    pub const ALL: [ParamKey; 12] = [
        ParamKey::IndexedBy,
        ParamKey::Assignments,
        ParamKey::BucketIds,
        ParamKey::AssigneeIds,
        ParamKey::AssignerIds,
        ParamKey::TagIds,
        ParamKey::Terms,
        ParamKey::CardIds,
        ParamKey::CreatorIds,
        ParamKey::CloserIds,
        ParamKey::Creation,
        ParamKey::Closure,
    ];

    /// Keys that may leave the process in a [`ParamView`].
    pub const EXPOSED: [ParamKey; 7] = [
        ParamKey::IndexedBy,
        ParamKey::Assignments,
        ParamKey::BucketIds,
        ParamKey::AssigneeIds,
        ParamKey::AssignerIds,
        ParamKey::TagIds,
        ParamKey::Terms,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ParamKey::IndexedBy => "indexed_by",
            ParamKey::Assignments => "assignments",
            ParamKey::BucketIds => "bucket_ids",
            ParamKey::AssigneeIds => "assignee_ids",
            ParamKey::AssignerIds => "assigner_ids",
            ParamKey::TagIds => "tag_ids",
            ParamKey::Terms => "terms",
            ParamKey::CardIds => "card_ids",
            ParamKey::CreatorIds => "creator_ids",
            ParamKey::CloserIds => "closer_ids",
            ParamKey::Creation => "creation",
            ParamKey::Closure => "closure",
        }
    }

    pub fn is_list(&self) -> bool {
        !matches!(
            self,
            ParamKey::IndexedBy | ParamKey::Assignments | ParamKey::Creation | ParamKey::Closure
        )
    }

    pub fn is_exposed(&self) -> bool {
        Self::EXPOSED.contains(self)
    }

    /// List fields whose order carries meaning.
    pub fn keeps_order(&self) -> bool {
        matches!(self, ParamKey::Terms)
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ParamKey {
    type Err = DeckhandError;

    /// Accepts both `tag_ids` and the query-string form `tag_ids[]`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.strip_suffix("[]").unwrap_or(s);
        Self::ALL
            .into_iter()
            .find(|k| k.as_str() == name)
            .ok_or_else(|| DeckhandError::contract(format!("unknown filter param {:?}", s)))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ParamValue {
    One(String),
    Many(Vec<String>),
}

impl ParamValue {
    pub fn is_blank(&self) -> bool {
        match self {
            ParamValue::One(s) => s.trim().is_empty(),
            ParamValue::Many(values) => values.is_empty(),
        }
    }

    pub fn values(&self) -> Vec<&str> {
        match self {
            ParamValue::One(s) => vec![s.as_str()],
            ParamValue::Many(values) => values.iter().map(String::as_str).collect(),
        }
    }

    /// Trim scalars; trim, drop blanks and deduplicate collections. Collections
    /// under `key` are sorted unless the key [keeps its order](ParamKey::keeps_order),
    /// in which case the first occurrence of each value stays where it was.
    pub(crate) fn normalized(self, key: ParamKey) -> Self {
        match self {
            ParamValue::One(s) => ParamValue::One(s.trim().to_string()),
            ParamValue::Many(values) => {
                let mut values: Vec<String> = values
                    .into_iter()
                    .map(|v| v.trim().to_string())
                    .filter(|v| !v.is_empty())
                    .collect();
                if key.keeps_order() {
                    let mut seen = HashSet::new();
                    values.retain(|v| seen.insert(v.clone()));
                } else {
                    values.sort();
                    values.dedup();
                }
                ParamValue::Many(values)
            }
        }
    }
}

/// The minimal, default-elided form of a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CanonicalParams(BTreeMap<ParamKey, ParamValue>);

impl CanonicalParams {
    pub fn get(&self, key: ParamKey) -> Option<&ParamValue> {
        self.0.get(&key)
    }

    pub fn contains(&self, key: ParamKey) -> bool {
        self.0.contains_key(&key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ParamKey, &ParamValue)> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn digest(&self) -> Digest {
        let mut entries: Vec<_> = self.0.iter().collect();
        entries.sort_by_key(|(key, _)| key.as_str());

        let mut builder = DigestBuilder::new(DIGEST_DOMAIN);
        for (key, value) in entries {
            let mut values = value.values();
            values.sort_unstable();
            builder.field(key.as_str(), values.as_slice());
        }
        builder.finish()
    }

    /// Allow-listed view, tagged with the filter id when there is one.
    pub fn to_view(&self, filter_id: Option<u64>) -> ParamView {
        let params = self
            .0
            .iter()
            .filter(|(key, _)| key.is_exposed())
            .map(|(key, value)| (*key, value.clone()))
            .collect();

        ParamView { params, filter_id }
    }
}

/// Build the canonical mapping for `fields`, eliding anything equal to `defaults`.
pub fn canonicalize(fields: &FilterFields, defaults: &FieldDefaults) -> CanonicalParams {
    let mut params = BTreeMap::new();

    for (key, value) in fields.raw_params() {
        let value = value.normalized(key);
        if defaults.get(key).is_some_and(|default| *default == value) {
            continue;
        }
        if value.is_blank() {
            continue;
        }
        params.insert(key, value);
    }

    CanonicalParams(params)
}

/// Parameters safe to hand outside (query strings, chip links).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ParamView {
    #[serde(flatten)]
    params: BTreeMap<ParamKey, ParamValue>,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter_id: Option<u64>,
}

impl ParamView {
    pub fn get(&self, key: ParamKey) -> Option<&ParamValue> {
        self.params.get(&key)
    }

    pub fn contains(&self, key: ParamKey) -> bool {
        self.params.contains_key(&key)
    }

    pub fn filter_id(&self) -> Option<u64> {
        self.filter_id
    }

    /// Key names present in the view, `filter_id` included.
    pub fn keys(&self) -> Vec<&'static str> {
        let mut keys: Vec<&'static str> = self.params.keys().map(ParamKey::as_str).collect();
        if self.filter_id.is_some() {
            keys.push("filter_id");
        }
        keys
    }

    /// The view minus one value of one field. A field left empty, or a scalar
    /// field equal to `value`, disappears entirely.
    pub fn without(&self, key: ParamKey, value: &str) -> ParamView {
        let mut view = self.clone();

        let emptied = match view.params.get_mut(&key) {
            Some(ParamValue::Many(values)) => {
                values.retain(|v| v != value);
                values.is_empty()
            }
            Some(ParamValue::One(current)) => current == value,
            None => false,
        };

        if emptied {
            view.params.remove(&key);
        }
        view
    }

    /// Query pairs, with `[]`-suffixed names for list fields.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        for (key, value) in &self.params {
            match value {
                ParamValue::One(s) => pairs.push((key.as_str().to_string(), s.clone())),
                ParamValue::Many(values) => {
                    for v in values {
                        pairs.push((format!("{}[]", key.as_str()), v.clone()));
                    }
                }
            }
        }
        if let Some(id) = self.filter_id {
            pairs.push(("filter_id".to_string(), id.to_string()));
        }
        pairs
    }

    pub fn to_query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.to_query_pairs())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckhand_core::IndexedBy;

    fn fields_with_tags(tags: &[&str]) -> FilterFields {
        FilterFields {
            tag_ids: tags.iter().map(|t| t.to_string()).collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_param_key_parsing() {
        assert_eq!("tag_ids".parse::<ParamKey>().unwrap(), ParamKey::TagIds);
        assert_eq!("tag_ids[]".parse::<ParamKey>().unwrap(), ParamKey::TagIds);
        assert!("sort".parse::<ParamKey>().is_err());
    }

    #[test]
    fn test_collections_sorted_and_deduplicated() {
        let params = canonicalize(&fields_with_tags(&["v2", " design", "v2", ""]), &FieldDefaults::default());
        assert_eq!(
            params.get(ParamKey::TagIds),
            Some(&ParamValue::Many(vec!["design".into(), "v2".into()]))
        );
    }

    #[test]
    fn test_terms_keep_typed_order() {
        let fields = FilterFields {
            terms: vec!["logo".into(), " brand".into(), "logo".into()],
            ..Default::default()
        };
        let params = canonicalize(&fields, &FieldDefaults::default());
        assert_eq!(
            params.get(ParamKey::Terms),
            Some(&ParamValue::Many(vec!["logo".into(), "brand".into()]))
        );

        let reordered = FilterFields {
            terms: vec!["brand".into(), "logo".into()],
            ..Default::default()
        };
        assert_eq!(params.digest(), canonicalize(&reordered, &FieldDefaults::default()).digest());
    }

    #[test]
    fn test_default_ordering_elided() {
        let fields = FilterFields {
            indexed_by: Some(IndexedBy::Latest),
            ..Default::default()
        };
        let params = canonicalize(&fields, &FieldDefaults::default());
        assert!(params.is_empty());
    }

    #[test]
    fn test_non_default_ordering_kept() {
        let fields = FilterFields {
            indexed_by: Some(IndexedBy::Stalled),
            ..Default::default()
        };
        let params = canonicalize(&fields, &FieldDefaults::default());
        assert_eq!(params.get(ParamKey::IndexedBy), Some(&ParamValue::One("stalled".into())));
    }

    #[test]
    fn test_view_excludes_internal_fields() {
        let fields = FilterFields {
            card_ids: vec![123],
            creator_ids: vec!["ann".into()],
            tag_ids: vec!["design".into()],
            ..Default::default()
        };
        let params = canonicalize(&fields, &FieldDefaults::default());
        assert!(params.contains(ParamKey::CardIds));

        let view = params.to_view(None);
        assert_eq!(view.keys(), vec!["tag_ids"]);
    }

    #[test]
    fn test_without_scalar_value() {
        let fields = FilterFields {
            indexed_by: Some(IndexedBy::Closed),
            ..Default::default()
        };
        let view = canonicalize(&fields, &FieldDefaults::default()).to_view(Some(7));

        let removed = view.without(ParamKey::IndexedBy, "closed");
        assert!(!removed.contains(ParamKey::IndexedBy));
        assert_eq!(removed.filter_id(), Some(7));

        let untouched = view.without(ParamKey::IndexedBy, "newest");
        assert!(untouched.contains(ParamKey::IndexedBy));
    }

    #[test]
    fn test_query_string() {
        let view = canonicalize(&fields_with_tags(&["design", "v2"]), &FieldDefaults::default()).to_view(Some(3));
        assert_eq!(
            view.to_query_pairs(),
            vec![
                ("tag_ids[]".to_string(), "design".to_string()),
                ("tag_ids[]".to_string(), "v2".to_string()),
                ("filter_id".to_string(), "3".to_string()),
            ]
        );
        assert_eq!(view.to_query_string(), "tag_ids%5B%5D=design&tag_ids%5B%5D=v2&filter_id=3");
    }

    #[test]
    fn test_view_serializes_flat() {
        let view = canonicalize(&fields_with_tags(&["design"]), &FieldDefaults::default()).to_view(Some(9));
        assert_eq!(
            serde_json::to_value(&view).unwrap(),
            serde_json::json!({ "tag_ids": ["design"], "filter_id": 9 })
        );
    }
}

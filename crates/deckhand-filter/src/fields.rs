//! Filter fields and their declared defaults

use crate::params::{ParamKey, ParamValue};
use deckhand_core::{AssignmentStatus, DateRange, DeckhandError, FilterContext, IndexedBy};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Current field values of a card filter.
///
/// The first seven fields are the ones users build filters from and the only
/// ones that ever appear in a shared view. The rest come in from translated
/// requests; they take part in the digest but stay internal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterFields {
    #[serde(default)]
    pub terms: Vec<String>,

    #[serde(default)]
    pub tag_ids: Vec<String>,

    #[serde(default)]
    pub indexed_by: Option<IndexedBy>,

    /// Collections (formerly "buckets")
    #[serde(default)]
    pub bucket_ids: Vec<String>,

    #[serde(default)]
    pub assignments: Option<AssignmentStatus>,

    #[serde(default)]
    pub assignee_ids: Vec<String>,

    /// People who made the assignments
    #[serde(default)]
    pub assigner_ids: Vec<String>,

    #[serde(default)]
    pub card_ids: Vec<u64>,

    #[serde(default)]
    pub creator_ids: Vec<String>,

    #[serde(default)]
    pub closer_ids: Vec<String>,

    #[serde(default)]
    pub creation: Option<DateRange>,

    #[serde(default)]
    pub closure: Option<DateRange>,
}

impl FilterFields {
    /// Fields described by a translated request.
    pub fn from_context(context: &FilterContext) -> Self {
        Self {
            terms: context.terms.clone(),
            tag_ids: context.tag_ids.clone(),
            indexed_by: context.indexed_by,
            bucket_ids: context.collection_ids.clone(),
            assignments: context.assignment_status,
            assignee_ids: context.assignee_ids.clone(),
            assigner_ids: Vec::new(),
            card_ids: context.card_ids.iter().map(|id| id.get()).collect(),
            creator_ids: context.creator_ids.clone(),
            closer_ids: context.closer_ids.clone(),
            creation: context.creation,
            closure: context.closure,
        }
    }

    /// Parse fields from a JSON object, e.g. a stored filter or a request body.
    pub fn from_json(value: serde_json::Value) -> Result<Self, DeckhandError> {
        serde_json::from_value(value).map_err(|e| DeckhandError::contract(e.to_string()))
    }

    /// Rebuild fields from query pairs as produced by
    /// [`ParamView::to_query_pairs`](crate::ParamView::to_query_pairs).
    ///
    /// List fields must use the `name[]` form and scalar fields the bare name;
    /// `filter_id` is an identity, not a field, and is skipped.
    pub fn from_query_pairs<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Result<Self, DeckhandError>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut fields = Self::default();

        for (name, value) in pairs {
            let (name, value) = (name.as_ref(), value.as_ref());
            if name == "filter_id" {
                continue;
            }

            let key: ParamKey = name.parse()?;
            if key.is_list() != name.ends_with("[]") {
                return Err(DeckhandError::contract(format!(
                    "{} must be sent as {}",
                    key,
                    if key.is_list() { "a list" } else { "a single value" }
                )));
            }

            fields.set(key, value)?;
        }

        Ok(fields)
    }

    fn set(&mut self, key: ParamKey, value: &str) -> Result<(), DeckhandError> {
        let invalid = || DeckhandError::contract(format!("invalid {} value {:?}", key, value));

        match key {
            ParamKey::Terms => self.terms.push(value.to_string()),
            ParamKey::TagIds => self.tag_ids.push(value.to_string()),
            ParamKey::BucketIds => self.bucket_ids.push(value.to_string()),
            ParamKey::AssigneeIds => self.assignee_ids.push(value.to_string()),
            ParamKey::AssignerIds => self.assigner_ids.push(value.to_string()),
            ParamKey::CreatorIds => self.creator_ids.push(value.to_string()),
            ParamKey::CloserIds => self.closer_ids.push(value.to_string()),
            ParamKey::CardIds => {
                let id = value.parse::<u64>().ok().filter(|id| *id > 0).ok_or_else(invalid)?;
                self.card_ids.push(id);
            }
            ParamKey::IndexedBy => self.indexed_by = Some(IndexedBy::parse(value).ok_or_else(invalid)?),
            ParamKey::Assignments => {
                self.assignments = Some(AssignmentStatus::parse(value).ok_or_else(invalid)?)
            }
            ParamKey::Creation => self.creation = Some(DateRange::parse(value).ok_or_else(invalid)?),
            ParamKey::Closure => self.closure = Some(DateRange::parse(value).ok_or_else(invalid)?),
        }

        Ok(())
    }

    /// Every recognized field with its current value, before any elision.
    pub(crate) fn raw_params(&self) -> Vec<(ParamKey, ParamValue)> {
        let one = |v: Option<&str>| ParamValue::One(v.unwrap_or_default().to_string());
        let many = |v: &[String]| ParamValue::Many(v.to_vec());

        vec![
            (ParamKey::Terms, many(&self.terms)),
            (ParamKey::TagIds, many(&self.tag_ids)),
            (ParamKey::IndexedBy, one(self.indexed_by.as_ref().map(IndexedBy::as_str))),
            (ParamKey::BucketIds, many(&self.bucket_ids)),
            (ParamKey::Assignments, one(self.assignments.as_ref().map(AssignmentStatus::as_str))),
            (ParamKey::AssigneeIds, many(&self.assignee_ids)),
            (ParamKey::AssignerIds, many(&self.assigner_ids)),
            (
                ParamKey::CardIds,
                ParamValue::Many(self.card_ids.iter().map(u64::to_string).collect()),
            ),
            (ParamKey::CreatorIds, many(&self.creator_ids)),
            (ParamKey::CloserIds, many(&self.closer_ids)),
            (ParamKey::Creation, one(self.creation.as_ref().map(DateRange::as_str))),
            (ParamKey::Closure, one(self.closure.as_ref().map(DateRange::as_str))),
        ]
    }
}

/// Declared default per field. A field equal to its default is elided from
/// the canonical form, so adding a new field with a default never changes the
/// digest of filters that leave it alone.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDefaults(BTreeMap<ParamKey, ParamValue>);

impl FieldDefaults {
    /// No defaults at all: only blank fields are elided.
    pub fn none() -> Self {
        Self(BTreeMap::new())
    }

    pub fn with(mut self, key: ParamKey, value: ParamValue) -> Self {
        self.0.insert(key, value.normalized(key));
        self
    }

    pub fn get(&self, key: ParamKey) -> Option<&ParamValue> {
        self.0.get(&key)
    }
}

impl Default for FieldDefaults {
    /// Card lists are ordered by latest activity unless told otherwise;
    /// every collection defaults to empty.
    fn default() -> Self {
        Self::none().with(
            ParamKey::IndexedBy,
            ParamValue::One(IndexedBy::Latest.as_str().to_string()),
        )
    }
}

//! A saved (or about to be saved) card filter

use crate::fields::{FieldDefaults, FilterFields};
use crate::params::{canonicalize, CanonicalParams, ParamKey, ParamView};
use crate::search::sanitize_query_syntax;
use deckhand_core::{DeckhandError, Digest};
use tracing::debug;

/// A card filter with its canonical form and digest.
///
/// Fields only change through [`Filter::update`], which recomputes the
/// canonical params and digest before returning, so the digest a caller reads
/// (and persists) always matches the fields next to it.
#[derive(Debug, Clone)]
pub struct Filter {
    id: Option<u64>,
    fields: FilterFields,
    defaults: FieldDefaults,
    canonical: CanonicalParams,
    digest: Digest,
}

impl Filter {
    pub fn new(fields: FilterFields) -> Self {
        Self::with_defaults(fields, FieldDefaults::default())
    }

    pub fn with_defaults(fields: FilterFields, defaults: FieldDefaults) -> Self {
        let canonical = canonicalize(&fields, &defaults);
        let digest = canonical.digest();
        Self {
            id: None,
            fields,
            defaults,
            canonical,
            digest,
        }
    }

    /// A filter loaded from storage under `id`.
    pub fn persisted(id: u64, fields: FilterFields) -> Self {
        Self::persisted_with_defaults(id, fields, FieldDefaults::default())
    }

    pub fn persisted_with_defaults(id: u64, fields: FilterFields, defaults: FieldDefaults) -> Self {
        let mut filter = Self::with_defaults(fields, defaults);
        filter.id = Some(id);
        filter
    }

    pub fn id(&self) -> Option<u64> {
        self.id
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    /// Record the id storage assigned on first save.
    pub fn mark_persisted(&mut self, id: u64) {
        self.id = Some(id);
    }

    pub fn fields(&self) -> &FilterFields {
        &self.fields
    }

    /// Edit the fields; the canonical form and digest are refreshed on return.
    pub fn update(&mut self, edit: impl FnOnce(&mut FilterFields)) {
        edit(&mut self.fields);
        self.refresh();
    }

    pub fn as_params(&self) -> &CanonicalParams {
        &self.canonical
    }

    pub fn digest(&self) -> &Digest {
        &self.digest
    }

    pub fn to_params(&self) -> ParamView {
        self.canonical.to_view(self.id)
    }

    /// The shared view minus `value` in field `key` ("remove this chip").
    pub fn params_without(&self, key: &str, value: &str) -> Result<ParamView, DeckhandError> {
        let key: ParamKey = key.parse()?;
        if !key.is_exposed() {
            return Err(DeckhandError::contract(format!("{} is not a shareable param", key)));
        }
        Ok(self.to_params().without(key, value))
    }

    /// Search text for the query store, if the terms leave anything searchable.
    pub fn search_query(&self) -> Option<String> {
        let terms = self
            .canonical
            .get(ParamKey::Terms)
            .map(|terms| terms.values().join(" "))?;
        sanitize_query_syntax(&terms)
    }

    fn refresh(&mut self) {
        self.canonical = canonicalize(&self.fields, &self.defaults);
        let digest = self.canonical.digest();
        if digest != self.digest {
            debug!(filter_id = ?self.id, from = self.digest.short(), to = digest.short(), "filter digest changed");
        }
        self.digest = digest;
    }
}

impl PartialEq for Filter {
    /// Filters are equal when they select the same cards.
    fn eq(&self, other: &Self) -> bool {
        self.digest == other.digest
    }
}

//! Data Model: FilterContext, TranslationResult
use serde::{Deserialize, Serialize};
use std::fmt;
use std::num::NonZeroU64;

/// Named ordering (or status view) of a card list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexedBy {
    Newest,
    Oldest,
    Latest,
    Stalled,
    Closed,
    ClosingSoon,
    FallingBackSoon,
}

impl IndexedBy {
    pub const ALL: [IndexedBy; 7] = [
        IndexedBy::Newest,
        IndexedBy::Oldest,
        IndexedBy::Latest,
        IndexedBy::Stalled,
        IndexedBy::Closed,
        IndexedBy::ClosingSoon,
        IndexedBy::FallingBackSoon,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IndexedBy::Newest => "newest",
            IndexedBy::Oldest => "oldest",
            IndexedBy::Latest => "latest",
            IndexedBy::Stalled => "stalled",
            IndexedBy::Closed => "closed",
            IndexedBy::ClosingSoon => "closing_soon",
            IndexedBy::FallingBackSoon => "falling_back_soon",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|i| i.as_str() == s)
    }
}

impl fmt::Display for IndexedBy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Unassigned,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Unassigned => "unassigned",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        (s == "unassigned").then_some(AssignmentStatus::Unassigned)
    }
}

/// Relative calendar window for creation/closure filters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DateRange {
    Today,
    Yesterday,
    ThisWeek,
    ThisMonth,
    ThisYear,
    LastWeek,
    LastMonth,
    LastYear,
}

impl DateRange {
    pub const ALL: [DateRange; 8] = [
        DateRange::Today,
        DateRange::Yesterday,
        DateRange::ThisWeek,
        DateRange::ThisMonth,
        DateRange::ThisYear,
        DateRange::LastWeek,
        DateRange::LastMonth,
        DateRange::LastYear,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DateRange::Today => "today",
            DateRange::Yesterday => "yesterday",
            DateRange::ThisWeek => "thisweek",
            DateRange::ThisMonth => "thismonth",
            DateRange::ThisYear => "thisyear",
            DateRange::LastWeek => "lastweek",
            DateRange::LastMonth => "lastmonth",
            DateRange::LastYear => "lastyear",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.as_str() == s)
    }
}

/// Structured criteria narrowing a set of cards.
///
/// Every field is either absent or non-empty: collections serialize only when
/// they hold something, and the translator strips blank values before a
/// response ever reaches this type.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FilterContext {
    /// Plain-text keywords
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub terms: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub indexed_by: Option<IndexedBy>,

    /// Person references: a simple name, an opaque id, or the acting user
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assignee_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_status: Option<AssignmentStatus>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub card_ids: Vec<NonZeroU64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub creator_ids: Vec<String>,

    /// People who closed the card
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub closer_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub collection_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tag_ids: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation: Option<DateRange>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub closure: Option<DateRange>,
}

impl FilterContext {
    pub fn is_empty(&self) -> bool {
        *self == FilterContext::default()
    }

    pub fn with_card_ids(mut self, ids: impl IntoIterator<Item = u64>) -> Self {
        self.card_ids = ids.into_iter().filter_map(NonZeroU64::new).collect();
        self
    }

    pub fn with_tag_ids<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.tag_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_assignee_ids<S: Into<String>>(mut self, ids: impl IntoIterator<Item = S>) -> Self {
        self.assignee_ids = ids.into_iter().map(Into::into).collect();
        self
    }

    pub fn indexed_by(mut self, indexed_by: IndexedBy) -> Self {
        self.indexed_by = Some(indexed_by);
        self
    }
}

/// Output of one translation: what to act on, and what to do.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TranslationResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<FilterContext>,

    /// Command strings of the form `/verb [argument]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commands: Option<Vec<String>>,
}

impl TranslationResult {
    /// The degraded result for a request nothing could be made of.
    pub fn search(query: &str) -> Self {
        let text = query.trim();
        let command = if text.is_empty() {
            "/search".to_string()
        } else {
            format!("/search {}", text)
        };

        Self {
            context: None,
            commands: Some(vec![command]),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.context.is_none() && self.commands.is_none()
    }

    pub fn commands(&self) -> &[String] {
        self.commands.as_deref().unwrap_or_default()
    }
}

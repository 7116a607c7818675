//! Deckhand Filter: canonical card filters
//!
//! A card filter is reduced to a minimal, order-independent parameter mapping
//! (defaults elided, blanks dropped, collections sorted) and fingerprinted with
//! a blake3 digest. The digest is the filter's identity for caching and
//! deduplication; two filters that select the same cards share it.
//!
//! # Example
//!
//! ```
//! use deckhand_filter::{Filter, FilterFields, ParamKey};
//!
//! let mut filter = Filter::new(FilterFields {
//!     tag_ids: vec!["v2".into(), "design".into()],
//!     ..Default::default()
//! });
//! let digest = filter.digest().clone();
//!
//! // Same tags, different order: same digest.
//! filter.update(|f| f.tag_ids = vec!["design".into(), "v2".into()]);
//! assert_eq!(filter.digest(), &digest);
//!
//! // "Remove this chip"
//! let view = filter.to_params().without(ParamKey::TagIds, "design");
//! assert_eq!(view.get(ParamKey::TagIds).unwrap().values(), vec!["v2"]);
//! ```
//!
//! # Pipeline
//!
//! ```text
//! FilterFields → raw params → normalize → elide defaults → drop blanks
//!                                                 ↓
//!                                         CanonicalParams → Digest
//!                                                 ↓
//!                                  allow-list → ParamView (+ filter_id)
//! ```

pub mod fields;
pub mod filter;
pub mod params;
pub mod search;

pub use fields::{FieldDefaults, FilterFields};
pub use filter::Filter;
pub use params::{canonicalize, CanonicalParams, ParamKey, ParamValue, ParamView};
pub use search::sanitize_query_syntax;

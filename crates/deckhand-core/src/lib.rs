//! Deckhand Core: data model, errors, request context and digests
//!
//! Shared vocabulary for the command translator (`deckhand-in`) and the filter
//! canonicalizer (`deckhand-filter`). Nothing in here talks to the network or
//! holds global state: the acting user always travels in a [`RequestContext`].

pub mod context;
pub mod data_model;
pub mod digest;
pub mod error;
pub mod session;

pub use context::{ActingUser, RequestContext, View};
pub use data_model::{
    AssignmentStatus, DateRange, FilterContext, IndexedBy, TranslationResult,
};
pub use digest::{Digest, DigestBuilder};
pub use error::DeckhandError;
pub use session::SessionSigner;

/// Token standing in for the acting user in cacheable prompt text.
pub const ME_REFERENCE: &str = "<deckhand:ME>";

//! Deckhand-IN: natural language to card filters and commands
//!
//! This crate turns a free-text request ("close cards assigned to mike and
//! assign them to roger") into a [`TranslationResult`]: a [`FilterContext`]
//! naming the cards to act on, plus command strings saying what to do.
//!
//! The heavy lifting is done by a text-generation backend; this crate owns the
//! instructions it receives, caching, acting-user substitution, and strict
//! validation of whatever comes back.
//!
//! # Example
//!
//! ```ignore
//! use deckhand_core::{ActingUser, RequestContext, View};
//! use deckhand_in::{AnthropicBackend, Translator};
//!
//! let translator = Translator::new(AnthropicBackend::from_env()?);
//! let context = RequestContext::new(ActingUser::new("u-42"), View::CardList);
//!
//! let result = translator.translate("my cards", &context).await?;
//! assert_eq!(result.context.unwrap().assignee_ids, vec!["u-42"]);
//! ```
//!
//! [`FilterContext`]: deckhand_core::FilterContext

pub mod backend;
pub mod cache;
pub mod command;
pub mod entities;
pub mod normalizer;
pub mod prompt;

pub use backend::{AnthropicBackend, BackendConfig, BackendError, CompletionRequest, TextBackend};
pub use cache::{CacheKey, MemoryCache, NoCache, ResponseCache};
pub use command::{parse_commands, Command, CommandParseError, Verb};
pub use entities::{resolve_mentionees, scan_mentions, scan_tags, Mentionable};

use deckhand_core::{DeckhandError, RequestContext, TranslationResult, ME_REFERENCE};
use tracing::{debug, info, warn};

/// Translates requests through a [`TextBackend`], remembering responses in a
/// [`ResponseCache`].
///
/// Holds no per-user state: the acting user arrives with every call.
pub struct Translator<B, C = MemoryCache> {
    backend: B,
    cache: C,
}

impl<B: TextBackend> Translator<B, MemoryCache> {
    pub fn new(backend: B) -> Self {
        Self::with_cache(backend, MemoryCache::new())
    }
}

impl<B: TextBackend, C: ResponseCache> Translator<B, C> {
    pub fn with_cache(backend: B, cache: C) -> Self {
        Self { backend, cache }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Translate `query` on behalf of the user in `context`.
    ///
    /// Every reference to the acting user in the result carries their real id;
    /// the substitution happens on parsed string values, never on raw text.
    /// When the backend produces nothing usable but valid JSON, the result
    /// falls back to searching for the query text. A blank query never reaches
    /// the backend and yields a bare `/search`.
    ///
    /// Responses are cached before substitution, and only once they parse.
    pub async fn translate(
        &self,
        query: &str,
        context: &RequestContext,
    ) -> Result<TranslationResult, DeckhandError> {
        if query.trim().is_empty() {
            return Ok(TranslationResult::search(query));
        }

        let view = context.view_description();
        let key = CacheKey::new(&context.user().id, query, view);

        let cached = self.cache.get(&key).await;
        let response = match &cached {
            Some(hit) => {
                debug!(key = %key, "translation cache hit");
                hit.clone()
            }
            None => {
                debug!(key = %key, "translation cache miss");
                self.ask_backend(query, view).await?
            }
        };
        info!("{} => {}", query, response);

        let result = normalizer::parse_json(&response)
            .and_then(|mut json| {
                normalizer::replace_in_strings(&mut json, ME_REFERENCE, &context.user().id);
                normalizer::normalize(json)
            })
            .map_err(|err| {
                warn!(query, response = %response, error = %err, "unparseable translation");
                err
            })?;

        if cached.is_none() {
            self.cache.put(key, response).await;
        }

        if result.is_empty() {
            debug!(query, "translation came back empty, searching instead");
            return Ok(TranslationResult::search(query));
        }
        Ok(result)
    }

    async fn ask_backend(&self, query: &str, view_description: &str) -> Result<String, DeckhandError> {
        let request = CompletionRequest {
            instructions: prompt::instructions_for(view_description),
            query: query.to_string(),
            temperature: prompt::TEMPERATURE,
        };

        self.backend.complete(&request).await.map_err(|err| {
            warn!(query, error = %err, "text backend failed");
            DeckhandError::from(err)
        })
    }
}

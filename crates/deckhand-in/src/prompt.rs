//! Instructions sent to the text backend.
//!
//! The static part lives in `grammars/command-translator.md` and is compiled
//! into the binary. The per-request part names the acting user only through
//! [`ME_REFERENCE`], so the backend never sees a real user id.

use deckhand_core::ME_REFERENCE;

/// Output schema, filter and command vocabulary, mapping rules and examples.
pub const INSTRUCTIONS: &str = include_str!("../grammars/command-translator.md");

/// Temperature for every translation call. Translations must be repeatable.
pub const TEMPERATURE: f32 = 0.0;

/// The per-request context block: who is asking and what they are looking at.
pub fn custom_context(view_description: &str) -> String {
    format!(
        "The user making requests is \"{}\".\n\n## Current view:\n\nThe user is currently {}.\n",
        ME_REFERENCE, view_description
    )
}

/// Full instructions for one request.
pub fn instructions_for(view_description: &str) -> String {
    format!("{}\n{}", INSTRUCTIONS, custom_context(view_description))
}

//! Unified Error Model
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DeckhandError {
    /// The text-generation backend could not produce a response.
    #[error("BACKEND/{0}")]
    BackendUnavailable(String),

    /// The backend answered with something that is not the declared JSON shape.
    #[error("PARSE/{0}")]
    TranslationParse(String),

    /// A canonicalization input did not match its declared field shape.
    #[error("CONTRACT/{0}")]
    ContractViolation(String),

    /// A session-establishment signature was malformed, forged or expired.
    #[error("AUTH/{0}")]
    Unauthorized(String),
}

impl DeckhandError {
    pub fn contract(msg: impl Into<String>) -> Self {
        Self::ContractViolation(msg.into())
    }

    /// Whether this error should be reported to the end user as "not allowed"
    /// rather than as an internal failure.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Unauthorized(_))
    }
}

use thiserror::Error;

/// Errors that can occur while turning microformats into wiki pages
#[derive(Error, Debug)]
pub enum SyndicationError {
    /// A review or entry lacks a field the wiki page cannot exist without
    #[error("Missing required field: {0}")]
    MissingRequiredField(String),

    /// Any network collaborator call failed (page fetch, geocode, wiki API)
    #[error("Upstream fetch failed: {0}")]
    UpstreamFetch(String),

    /// The aggregate-rating block could not be located after a splice
    #[error("Aggregate rating block not found")]
    AggregateBlockNotFound,

    /// The source had nothing of the requested kind to transform
    #[error("No matching item: {0}")]
    NoMatchingItem(String),

    #[error("Author is not a wiki user: {0}")]
    UnauthorizedAuthor(String),

    #[error("Invalid coordinates: {0}")]
    InvalidCoordinates(String),

    /// A collaborator answered, but not with what was expected
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<reqwest::Error> for SyndicationError {
    fn from(err: reqwest::Error) -> Self {
        SyndicationError::UpstreamFetch(err.to_string())
    }
}

impl From<serde_json::Error> for SyndicationError {
    fn from(err: serde_json::Error) -> Self {
        SyndicationError::InvalidResponse(err.to_string())
    }
}

impl From<url::ParseError> for SyndicationError {
    fn from(err: url::ParseError) -> Self {
        SyndicationError::InvalidResponse(format!("bad URL: {err}"))
    }
}

pub type SyndicationResult<T> = Result<T, SyndicationError>;

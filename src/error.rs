//! Error types for every failure class the engine distinguishes.

use thiserror::Error;

/// One resolver attempt failed. Always recoverable by retrying or moving on
/// to the next resolver in the chain.
#[derive(Debug, Error)]
pub enum AttemptError {
    #[error("no API key configured")]
    MissingCredential,

    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP status {0}")]
    HttpStatus(u16),

    #[error("provider status {0}")]
    ProviderStatus(String),

    #[error("no results")]
    NoResults,

    #[error("malformed response: {0}")]
    Malformed(String),
}

/// The geocoder gave up on an address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ResolutionFailure {
    #[error("address is empty")]
    EmptyAddress,

    #[error("fallback geocoder has no API key")]
    NoFallbackCredential,

    #[error("all geocoding providers exhausted")]
    AllProvidersExhausted,
}

/// The distance matrix could not be obtained. Fatal for a matrix-based run.
#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("no routing API key configured")]
    MissingCredential,

    #[error("distance matrix transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("distance matrix provider status {0}")]
    Status(String),
}

/// Sequencing could not complete normally. Absorbed into the fallback route.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("{destinations} destinations but {annotations} annotations")]
    Misaligned { destinations: usize, annotations: usize },

    #[error("matrix covers {actual} locations, need {expected}")]
    MatrixShape { expected: usize, actual: usize },

    #[error("sequence covers {visited} of {expected} destinations")]
    Incomplete { expected: usize, visited: usize },
}

/// Run-fatal errors surfaced to the caller.
#[derive(Debug, Error)]
pub enum OptimizeError {
    #[error(transparent)]
    Matrix(#[from] MatrixError),

    #[error("origin address {address:?} could not be geocoded: {reason}")]
    OriginUnresolved {
        address: String,
        reason: ResolutionFailure,
    },
}

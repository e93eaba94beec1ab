use thiserror::Error;

/// Persistence failures surfaced by the document store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{entity} {key} not found")]
    NotFound { entity: &'static str, key: String },

    /// A business identifier collided with the store's uniqueness constraint.
    #[error("{entity} with {field} '{value}' already exists")]
    Conflict {
        entity: &'static str,
        field: &'static str,
        value: String,
    },

    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Failures from the comparison oracle. All of these are recoverable at
/// the call site; none may crash the pipeline.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("oracle returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("oracle returned no content")]
    EmptyResponse,

    #[error("malformed oracle output: {0}")]
    Malformed(String),
}

/// Terminal failure of one matching run.
#[derive(Debug, Error)]
pub enum MatchRunError {
    #[error("Could not find related PO for invoice")]
    NoPoFound,

    #[error("match analysis failed: {0}")]
    Analysis(#[from] OracleError),

    #[error("store failure: {0}")]
    Store(#[from] StoreError),
}

use thiserror::Error;

use stockroom_core::DomainError;

/// Storage/orchestration error.
///
/// Domain failures pass through untouched so the HTTP layer can keep their
/// messages; everything else is an infrastructure failure.
#[derive(Debug, Error)]
pub enum InfraError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// A storage constraint rejected the write (e.g. a rename onto an existing name).
    #[error("integrity violation: {0}")]
    Integrity(String),

    #[error("backend failure: {0}")]
    Backend(String),
}

pub type InfraResult<T> = Result<T, InfraError>;

impl InfraError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    /// The domain error, if this is one.
    pub fn as_domain(&self) -> Option<&DomainError> {
        match self {
            InfraError::Domain(e) => Some(e),
            _ => None,
        }
    }
}

/// Map SQLx errors onto infrastructure errors.
///
/// | Postgres code | Meaning | InfraError |
/// |---|---|---|
/// | `23505` | unique violation | `Integrity` |
/// | `23503` | foreign key violation | `Integrity` |
/// | `23514` | check constraint violation | `Domain(Validation)` |
/// | other / non-database | | `Backend` |
pub(crate) fn map_sqlx_error(operation: &str, err: sqlx::Error) -> InfraError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("database error in {operation}: {}", db_err.message());
            match db_err.code().as_deref() {
                Some("23505") | Some("23503") => InfraError::Integrity(msg),
                Some("23514") => DomainError::validation("Please enter a valid value").into(),
                _ => InfraError::Backend(msg),
            }
        }
        sqlx::Error::PoolClosed => InfraError::Backend(format!("connection pool closed in {operation}")),
        other => InfraError::Backend(format!("sqlx error in {operation}: {other}")),
    }
}

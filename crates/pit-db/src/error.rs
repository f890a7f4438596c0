use pit_ledger::LedgerError;
use thiserror::Error;

/// Failure of a store operation, classified the way callers must react to it.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

impl From<LedgerError> for StoreError {
    fn from(e: LedgerError) -> Self {
        StoreError::Validation(e.to_string())
    }
}

impl StoreError {
    pub fn not_found(what: &str, id: i64) -> Self {
        StoreError::NotFound(format!("{what} {id} not found"))
    }

    pub fn kind(&self) -> &'static str {
        match self {
            StoreError::Validation(_) => "validation",
            StoreError::NotFound(_) => "not_found",
            StoreError::Conflict(_) => "conflict",
            StoreError::Database(_) => "internal",
        }
    }
}

/// Detect a Postgres unique constraint violation by name.
pub(crate) fn is_unique_violation(err: &sqlx::Error, constraint: &str) -> bool {
    match err {
        sqlx::Error::Database(db_err) => {
            db_err.code().as_deref() == Some("23505") && db_err.constraint() == Some(constraint)
        }
        _ => false,
    }
}

/// Map a unique violation on `constraint` to `Conflict(msg)`, pass anything else through.
pub(crate) fn conflict_on(constraint: &'static str, msg: String) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| {
        if is_unique_violation(&e, constraint) {
            StoreError::Conflict(msg)
        } else {
            StoreError::Database(e)
        }
    }
}

/// Map a foreign-key violation (23503) to `NotFound(msg)`.
pub(crate) fn missing_ref(msg: String) -> impl FnOnce(sqlx::Error) -> StoreError {
    move |e| match &e {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23503") => {
            StoreError::NotFound(msg)
        }
        _ => StoreError::Database(e),
    }
}

/// Map a numeric overflow (22003) to `Validation`.
pub(crate) fn out_of_range(e: sqlx::Error) -> StoreError {
    match &e {
        sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("22003") => {
            StoreError::Validation("running result exceeds the ledger money range".to_string())
        }
        _ => StoreError::Database(e),
    }
}

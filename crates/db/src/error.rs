/// Opaque I/O failure from the persistent store facade.
///
/// Write-path I/O errors are fatal per distilled §7 ("the process terminates rather than risk an
/// inconsistent chain"); this type exists so the chain crate can tell read failures (recoverable,
/// e.g. "key not found" is modeled as `Ok(None)`, not an error) apart from genuine I/O faults.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("sled error: {0}")]
    Sled(#[from] sled::Error),

    #[error("encode error: {0}")]
    Encode(#[from] Box<bincode::ErrorKind>),

    #[error("corrupt record in table {table:?}: {reason}")]
    Corrupt { table: crate::Table, reason: String },

    #[error("ancient segment error: {0}")]
    Ancient(String),
}

impl From<DbError> for chain_interfaces::error::chain_db_error::DbError {
    fn from(e: DbError) -> Self {
        chain_interfaces::error::chain_db_error::DbError(e.to_string())
    }
}

impl From<DbError> for chain_interfaces::Error {
    fn from(e: DbError) -> Self {
        chain_interfaces::Error::Database(e.into())
    }
}

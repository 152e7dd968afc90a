use std::path::PathBuf;

/// CLI-boundary error type; wraps the chain manager's own [`chain_interfaces::Error`] alongside
/// the binary's own I/O and decoding failures instead of reusing the library error directly,
/// since none of those describe "couldn't open the datadir" or "malformed import file".
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("failed to open database at {path}: {source}")]
    OpenDatabase { path: PathBuf, source: chain_db::DbError },

    #[error("failed to construct chain manager: {0}")]
    Manager(#[from] chain_interfaces::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to decode import file: {0}")]
    Decode(String),

    #[error("block rejected during import: {0}")]
    Insert(String),
}

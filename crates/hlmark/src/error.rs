//! CLI error types.

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("Error reading from stdin: {0}")]
    Read(#[source] std::io::Error),

    #[error("Error writing output: {0}")]
    Write(#[source] std::io::Error),
}

use thiserror::Error;

/// Errors that end a CLI invocation with a non-zero exit
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Memcat(#[from] memcat::MemcatError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("No memory text given; pass TEXT arguments or --stdin")]
    NoInput,

    #[error("Backend '{backend}' at {host} is not reachable")]
    Unavailable { backend: String, host: String },
}

pub type CliResult<T> = Result<T, CliError>;

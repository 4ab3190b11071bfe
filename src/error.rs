//! Error types for the footman-rl crate

use thiserror::Error;

/// Main error type for the footman-rl crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("weight file line {line}: '{value}' is not a floating-point number")]
    ParseWeight { line: usize, value: String },

    #[error("weight vector has {got} entries, expected {expected}")]
    WeightCountMismatch { expected: usize, got: usize },

    #[error("no weights stored at '{location}'")]
    MissingWeights { location: String },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("invalid reward attribution '{input}'. Expected one of: {expected}")]
    ParseRewardAttribution { input: String, expected: String },

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },

    #[error("simulator failure: {message}")]
    Simulator { message: String },

    #[error("observer failure: {message}")]
    Observer { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("plot has {points} points but there are {results} results")]
    Correspondence { results: usize, points: usize },

    #[error("trace field `{field}` has {actual} entries, expected {expected}")]
    ParallelArray {
        field: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("plot has no trace for {results} results")]
    MissingTrace { results: usize },

    #[error("invalid color: {0}")]
    InvalidColor(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShaleError>;

#[derive(Debug, Error)]
pub enum ShaleError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("yaml parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("config error: {0}")]
    Config(String),
    #[error("plan validation error: {0}")]
    Validation(String),
    #[error("unknown dialect: {name} (expected one of: {known})")]
    UnknownDialect { name: String, known: String },
    #[error("execution error: {0}")]
    Execution(String),
    #[cfg(feature = "duckdb")]
    #[error("duckdb error: {0}")]
    DuckDb(#[from] duckdb::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

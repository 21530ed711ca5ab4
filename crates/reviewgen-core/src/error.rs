use thiserror::Error;

#[derive(Debug, Error)]
pub enum ReviewgenError {
    #[error("not found: {0}")]
    NotFound(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("configuration error: {0}")]
    Config(String),
}

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CallError {
    #[error("connection failed: {0}")]
    Connection(String),
    #[error("disconnected: {0}")]
    Disconnected(String),
    #[error("authentication failed: {0}")]
    Auth(String),
    #[error("http error: {0}")]
    Http(String),
    #[error("invalid settings: {0}")]
    Settings(String),
}

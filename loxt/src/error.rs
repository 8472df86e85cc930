//! Error handling for the `loxt` CLI.
//!
//! This only covers host-side failures (bad config, unreadable files);
//! lex/parse/static/runtime errors are diagnostics rendered by
//! `lox-driver`, not `LoxtError` variants.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoxtError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Driver(#[from] lox_driver::DriverError),
}

pub type Result<T> = std::result::Result<T, LoxtError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let err = LoxtError::Config("missing field".to_string());
        assert_eq!(err.to_string(), "configuration error: missing field");
    }

    #[test]
    fn io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let loxt_err: LoxtError = io_err.into();
        assert!(matches!(loxt_err, LoxtError::Io(_)));
    }
}

use thiserror::Error;

/// traffictally error types
#[derive(Error, Debug)]
pub enum TallyError {
    /// Malformed date or range input
    #[error("parse error: {0}")]
    Parse(String),

    /// Period-vector length disagrees with the interval's period count
    #[error("shape mismatch: expected {expected} period columns, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    /// File I/O error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Management API request failed
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// Credential resolution failed
    #[error("auth error: {0}")]
    Auth(String),

    /// Cache operation failed
    #[error("cache error: {0}")]
    Cache(String),

    /// Configuration error
    #[error("config error: {0}")]
    Config(String),
}

/// Result type alias for traffictally
pub type Result<T> = std::result::Result<T, TallyError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = TallyError::Parse("bad compact date '2023'".into());
        assert_eq!(err.to_string(), "parse error: bad compact date '2023'");
    }

    #[test]
    fn test_shape_mismatch_display() {
        let err = TallyError::ShapeMismatch {
            expected: 12,
            actual: 10,
        };
        assert_eq!(
            err.to_string(),
            "shape mismatch: expected 12 period columns, got 10"
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: TallyError = io_err.into();
        assert!(err.to_string().contains("io error"));
    }
}

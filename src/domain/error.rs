use thiserror::Error;

/// The six error kinds the pipeline distinguishes, plus a catch-all for
/// failures that don't map cleanly onto an external boundary.
#[derive(Debug, Error)]
pub enum GraphError {
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("parse error: {0}")]
    ParseError(String),

    #[error("store error: {0}")]
    StoreError(String),

    #[error("provider error: {0}")]
    ProviderError(String),

    #[error("config error: {0}")]
    ConfigError(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl GraphError {
    pub fn parse(msg: impl Into<String>) -> Self {
        Self::ParseError(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::StoreError(msg.into())
    }

    pub fn provider(msg: impl Into<String>) -> Self {
        Self::ProviderError(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::Internal(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    pub fn is_store_error(&self) -> bool {
        matches!(self, Self::StoreError(_))
    }

    pub fn is_config_error(&self) -> bool {
        matches!(self, Self::ConfigError(_))
    }

    /// The exit code the CLI should use when this error reaches the top level (spec §7).
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::NotFound(_) => 1,
            _ => 1,
        }
    }

    /// The HTTP status the optional facade should use when this error reaches the boundary (spec §7).
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::ConfigError(_) => 400,
            Self::StoreError(_) => 503,
            _ => 500,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn predicates_match_constructors() {
        assert!(GraphError::not_found("node x").is_not_found());
        assert!(GraphError::store("conn refused").is_store_error());
        assert!(GraphError::config("missing key").is_config_error());
    }

    #[test]
    fn http_status_mapping() {
        assert_eq!(GraphError::not_found("x").http_status(), 404);
        assert_eq!(GraphError::store("x").http_status(), 503);
        assert_eq!(GraphError::config("x").http_status(), 400);
        assert_eq!(GraphError::internal("x").http_status(), 500);
    }
}

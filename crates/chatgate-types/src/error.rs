use thiserror::Error;

/// Errors from repository operations (used by trait definitions in chatgate-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,
}

/// Errors from connector operations.
#[derive(Debug, Error)]
pub enum ConnectorError {
    #[error("not connected to chat session")]
    NotConnected,

    #[error("connector call failed: {0}")]
    Upstream(String),
}

/// Errors from media caching and serving.
#[derive(Debug, Error)]
pub enum MediaError {
    #[error("media not found")]
    NotFound,

    #[error("media download failed: {0}")]
    Download(String),

    #[error("media storage error: {0}")]
    Storage(String),
}

impl From<ConnectorError> for MediaError {
    fn from(e: ConnectorError) -> Self {
        MediaError::Download(e.to_string())
    }
}

impl From<std::io::Error> for MediaError {
    fn from(e: std::io::Error) -> Self {
        MediaError::Storage(e.to_string())
    }
}

impl From<RepositoryError> for MediaError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::NotFound => MediaError::NotFound,
            other => MediaError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repository_error_display() {
        let err = RepositoryError::Query("syntax error".to_string());
        assert_eq!(err.to_string(), "query error: syntax error");
    }

    #[test]
    fn test_media_error_from_repository_not_found() {
        let err = MediaError::from(RepositoryError::NotFound);
        assert!(matches!(err, MediaError::NotFound));
    }

    #[test]
    fn test_media_error_from_connector() {
        let err = MediaError::from(ConnectorError::Upstream("timeout".to_string()));
        assert!(matches!(err, MediaError::Download(_)));
    }
}

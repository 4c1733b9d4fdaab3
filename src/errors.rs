use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("connection error: {0}")]
    ConnectionError(String),
    #[error("schema error: {0}")]
    SchemaError(String),
    #[error("query error: {0}")]
    QueryError(String),
    #[error("commit error: {0}")]
    CommitError(String),
    #[error("unresolved edge endpoint: {0}")]
    UnresolvedEdge(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

impl ExportError {
    pub fn connection<T: Into<String>>(msg: T) -> Self {
        ExportError::ConnectionError(msg.into())
    }

    pub fn schema<T: Into<String>>(msg: T) -> Self {
        ExportError::SchemaError(msg.into())
    }

    pub fn query<T: Into<String>>(msg: T) -> Self {
        ExportError::QueryError(msg.into())
    }

    pub fn commit<T: Into<String>>(msg: T) -> Self {
        ExportError::CommitError(msg.into())
    }

    pub fn unresolved<T: Into<String>>(msg: T) -> Self {
        ExportError::UnresolvedEdge(msg.into())
    }

    pub fn invalid_input<T: Into<String>>(msg: T) -> Self {
        ExportError::InvalidInput(msg.into())
    }
}

use crate::codec::{Category, ParseError};
use sea_orm::DbErr;
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorKind {
    Parse,
    Validation,
    Storage,
    Internal,
}

#[derive(thiserror::Error, Debug)]
pub enum ReadingError {
    #[error("invalid {category} entry {entry:?}: {source}")]
    InvalidEntry {
        category: Category,
        entry: String,
        source: ParseError,
    },
    #[error("unknown field: {0}")]
    UnknownField(String),
    #[error("invalid payload: {0}")]
    InvalidPayload(String),
    #[error("invalid date: {0:?}")]
    InvalidDate(String),
    #[error("limit must be a positive integer")]
    InvalidLimit,
    #[error("storage error: {0}")]
    Storage(#[from] DbErr),
    #[error("store operation timed out after {0:?}")]
    Timeout(Duration),
    #[error("cannot encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

impl ReadingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ReadingError::InvalidEntry { .. } => ErrorKind::Parse,
            ReadingError::UnknownField(_)
            | ReadingError::InvalidPayload(_)
            | ReadingError::InvalidDate(_)
            | ReadingError::InvalidLimit => ErrorKind::Validation,
            ReadingError::Storage(_) | ReadingError::Timeout(_) => ErrorKind::Storage,
            ReadingError::Encode(_) => ErrorKind::Internal,
        }
    }

    /// Errors caused by the request itself rather than the store.
    pub fn is_client_error(&self) -> bool {
        matches!(self.kind(), ErrorKind::Parse | ErrorKind::Validation)
    }

    pub fn payload(&self) -> ErrorPayload {
        ErrorPayload {
            error: self.to_string(),
            kind: self.kind(),
        }
    }
}

/// What the caller sees when a request fails.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorPayload {
    pub error: String,
    pub kind: ErrorKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_failures_are_client_errors() {
        let err = ReadingError::InvalidEntry {
            category: Category::Pressao,
            entry: "BMP180$abc$hPa$-1".to_string(),
            source: ParseError::NotAnInteger {
                field: "valor",
                value: "abc".to_string(),
            },
        };
        assert_eq!(err.kind(), ErrorKind::Parse);
        assert!(err.is_client_error());
        assert!(err.to_string().starts_with("invalid pressao entry"));
    }

    #[test]
    fn invalid_date_payload() {
        let payload = ReadingError::InvalidDate("ontem".to_string()).payload();
        assert_eq!(payload.kind, ErrorKind::Validation);
        assert_eq!(payload.error, "invalid date: \"ontem\"");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["kind"], "validation");
    }

    #[test]
    fn storage_failures_are_not_client_errors() {
        let err = ReadingError::from(DbErr::Custom("disk full".to_string()));
        assert_eq!(err.kind(), ErrorKind::Storage);
        assert!(!err.is_client_error());
        assert!(!ReadingError::Timeout(Duration::from_secs(8)).is_client_error());
    }

    #[test]
    fn encoding_failures_are_internal() {
        let cause = serde_json::from_str::<u8>("[]").unwrap_err();
        let err = ReadingError::from(cause);
        assert_eq!(err.kind(), ErrorKind::Internal);
        assert!(!err.is_client_error());
        let json = serde_json::to_value(err.payload()).unwrap();
        assert_eq!(json["kind"], "internal");
    }
}

use common::error::{DomainError, ErrorKind};
use thiserror::Error;

use crate::domain::types::WebhookEventId;

#[derive(Error, Debug)]
pub enum WebhookError {
    #[error("webhook event not found: {0}")]
    NotFound(WebhookEventId),
    #[error("invalid signature")]
    InvalidSignature,
    #[error("unknown provider: {0}")]
    UnknownProvider(String),
    #[error("unparseable webhook payload: {0}")]
    UnparseableBody(String),
    #[error("unknown gateway reference: {0}")]
    UnknownReference(String),
    #[error("settlement gateway call failed: {0}")]
    Settlement(String),
    #[error("repository error: {0}")]
    Repository(String),
}

impl DomainError for WebhookError {
    fn kind(&self) -> ErrorKind {
        match self {
            WebhookError::NotFound(_) => ErrorKind::NotFound,
            WebhookError::InvalidSignature => ErrorKind::Auth,
            WebhookError::UnknownProvider(_) => ErrorKind::NotFound,
            WebhookError::UnparseableBody(_) | WebhookError::UnknownReference(_) => {
                ErrorKind::Validation
            }
            WebhookError::Settlement(_) => ErrorKind::ProviderUnavailable,
            WebhookError::Repository(_) => ErrorKind::Internal,
        }
    }
}

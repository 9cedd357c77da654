use thiserror::Error;

use bank_types::primitives::RequestId;

#[derive(Error, Debug)]
pub enum RequestError {
    #[error("RequestError - Sqlx: {0}")]
    Sqlx(#[from] sqlx::Error),
    #[error("RequestError - NotFound: id '{0}' not found")]
    NotFound(RequestId),
    #[error("RequestError - AlreadyConsidered: request '{0}' has already been considered")]
    AlreadyConsidered(RequestId),
    #[error("RequestError - MissingPolicyColumn: request '{0}' has no '{1}'")]
    MissingPolicyColumn(RequestId, &'static str),
}

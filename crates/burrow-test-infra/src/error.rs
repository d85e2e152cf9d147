use std::result::Result as StdResult;
use thiserror::Error;

/// Errors raised while bringing up test containers.
#[derive(Debug, Error)]
pub enum TestInfraError {
    #[error("Container error: {0}")]
    Container(#[from] testcontainers::TestcontainersError),
    #[error("Server not ready after {attempts} attempts: {reason}")]
    NotReady { attempts: u32, reason: String },
}

pub type Result<T> = StdResult<T, TestInfraError>;

use crate::custody::CustodyError;
use core_types::ProtocolError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Rejected: {0}")]
    Protocol(#[from] ProtocolError),

    #[error("Asset custody error: {0}")]
    Custody(#[from] CustodyError),

    #[error("Storage error: {0}")]
    Storage(#[from] storage::StorageError),
}

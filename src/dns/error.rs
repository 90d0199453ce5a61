use thiserror::Error;

use crate::io::packet_buffer::BufferError;

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DnsError {
    #[error("No SOA record found for {name} (response code {rescode})")]
    NoRecordsFound { name: String, rescode: String },
    #[error("Network Error: {0}")]
    Network(String),
    #[error("Timeout waiting for response from {0}")]
    Timeout(String),
    #[error("Invalid Data: {0}")]
    InvalidData(String),
    #[error("Protocol Error: {0}")]
    ProtocolData(String),
}

impl From<BufferError> for DnsError {
    fn from(error: BufferError) -> Self {
        Self::ProtocolData(error.to_string())
    }
}

use thiserror::Error;

use crate::dns::error::DnsError;
use crate::io::config::ConfigError;
use crate::provider::ProviderError;

#[allow(clippy::module_name_repetitions)]
#[derive(Error, Debug)]
pub enum RdnsError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("{0}")]
    Auth(String),
    #[error("{0}")]
    Usage(String),
    #[error("Invalid IP address: {0}")]
    InvalidAddress(String),
    #[error("DNS resolution failed: {0}")]
    ResolutionFailed(DnsError),
    #[error("{0}")]
    NoSoaRecord(DnsError),
    #[error("Zone not found: {0}")]
    ZoneNotFound(String),
    #[error("{0}")]
    ProviderApi(String),
}

impl RdnsError {
    /// Failures while working out which provider zone owns the address.
    ///
    /// The provider not hosting a zone and DNS pointing nowhere usable are
    /// indistinguishable from here, so both share one headline.
    pub const fn is_zone_resolution(&self) -> bool {
        matches!(
            self,
            Self::InvalidAddress(_)
                | Self::ResolutionFailed(_)
                | Self::NoSoaRecord(_)
                | Self::ZoneNotFound(_)
        )
    }
}

impl From<DnsError> for RdnsError {
    fn from(error: DnsError) -> Self {
        match error {
            DnsError::NoRecordsFound { .. } => Self::NoSoaRecord(error),
            _ => Self::ResolutionFailed(error),
        }
    }
}

impl From<ProviderError> for RdnsError {
    fn from(error: ProviderError) -> Self {
        match error {
            ProviderError::ZoneNotFound(zone) => Self::ZoneNotFound(zone),
            ProviderError::Credentials(message) => Self::Auth(message),
            _ => Self::ProviderApi(error.to_string()),
        }
    }
}

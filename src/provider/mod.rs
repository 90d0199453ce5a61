pub mod cloudflare;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const PTR_RECORD_TYPE: &str = "PTR";

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Invalid API credentials: {0}")]
    Credentials(String),
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },
    #[error("No zone named {0} on this account")]
    ZoneNotFound(String),
    #[error("Unexpected API response: {0}")]
    InvalidResponse(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DnsRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub record_type: String,
    pub name: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserDetails {
    pub id: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default)]
    pub suspended: bool,
}

/// Zone and record operations of a DNS hosting provider.
pub trait ZoneApi {
    fn zone_id_by_name(&self, zone_name: &str) -> Result<String, ProviderError>;

    /// Records whose name matches `name` exactly, in the provider's order.
    fn list_records(&self, zone_id: &str, name: &str) -> Result<Vec<DnsRecord>, ProviderError>;

    fn create_record(
        &self,
        zone_id: &str,
        record_type: &str,
        name: &str,
        content: &str,
    ) -> Result<DnsRecord, ProviderError>;

    fn update_record(
        &self,
        zone_id: &str,
        record: &DnsRecord,
        content: &str,
    ) -> Result<DnsRecord, ProviderError>;

    fn user_details(&self) -> Result<UserDetails, ProviderError>;
}

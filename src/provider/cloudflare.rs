//! Cloudflare API v4 client.
//!
//! - List Zones: GET `/zones?name=...`
//! - List DNS Records: GET `/zones/:zone_id/dns_records?name=...`
//! - Create DNS Record: POST `/zones/:zone_id/dns_records`
//! - Update DNS Record: PATCH `/zones/:zone_id/dns_records/:record_id`
//! - User Details: GET `/user`

use reqwest::Method;
use reqwest::blocking::{Client, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;

use super::{DnsRecord, ProviderError, UserDetails, ZoneApi};

pub const CLOUDFLARE_API_BASE: &str = "https://api.cloudflare.com/client/v4";

// TTL of 1 means "automatic" to Cloudflare
const AUTO_TTL: u32 = 1;

#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    Token(String),
    GlobalKey { email: String, key: String },
}

impl Credentials {
    pub fn token(token: &str) -> Result<Self, ProviderError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(ProviderError::Credentials(
                "api_token is required when use_token is enabled".to_owned(),
            ));
        }
        Ok(Self::Token(token.to_owned()))
    }

    pub fn global_key(email: &str, key: &str) -> Result<Self, ProviderError> {
        let (email, key) = (email.trim(), key.trim());
        if email.is_empty() || key.is_empty() {
            return Err(ProviderError::Credentials(
                "email and key are both required when use_token is disabled".to_owned(),
            ));
        }
        Ok(Self::GlobalKey {
            email: email.to_owned(),
            key: key.to_owned(),
        })
    }

    fn apply(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Token(token) => request.bearer_auth(token),
            Self::GlobalKey { email, key } => request
                .header("X-Auth-Email", email)
                .header("X-Auth-Key", key),
        }
    }
}

// Never print secrets
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Token(_) => f.debug_tuple("Token").field(&"<REDACTED>").finish(),
            Self::GlobalKey { email, .. } => f
                .debug_struct("GlobalKey")
                .field("email", email)
                .field("key", &"<REDACTED>")
                .finish(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ApiResponse<T> {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    errors: Vec<ApiMessage>,
    result: Option<T>,
}

#[derive(Debug, Deserialize)]
struct ApiMessage {
    #[serde(default)]
    code: i64,
    message: String,
}

#[derive(Debug, Deserialize)]
struct Zone {
    id: String,
}

#[derive(Debug)]
pub struct CloudflareClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl CloudflareClient {
    pub fn new(credentials: Credentials) -> Result<Self, ProviderError> {
        Self::with_base_url(credentials, CLOUDFLARE_API_BASE)
    }

    pub fn with_base_url(
        credentials: Credentials,
        base_url: impl Into<String>,
    ) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_owned(),
            credentials,
        })
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let request = self
            .client
            .request(method, format!("{}{path}", self.base_url))
            .header("Content-Type", "application/json");
        self.credentials.apply(request)
    }

    fn send<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ProviderError> {
        let response = request.send()?;
        let status = response.status();
        let body = response.text()?;

        let envelope: ApiResponse<T> = match serde_json::from_str(&body) {
            Ok(envelope) => envelope,
            Err(_) if !status.is_success() => {
                return Err(ProviderError::Api {
                    status: status.as_u16(),
                    message: status
                        .canonical_reason()
                        .unwrap_or("Unknown error")
                        .to_owned(),
                });
            }
            Err(e) => return Err(ProviderError::InvalidResponse(e.to_string())),
        };

        if !status.is_success() || !envelope.success {
            let message = if envelope.errors.is_empty() {
                "Request was not successful".to_owned()
            } else {
                envelope
                    .errors
                    .iter()
                    .map(|e| format!("{}: {}", e.code, e.message))
                    .collect::<Vec<_>>()
                    .join("; ")
            };
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message,
            });
        }

        envelope
            .result
            .ok_or_else(|| ProviderError::InvalidResponse("Response has no result".to_owned()))
    }
}

impl ZoneApi for CloudflareClient {
    fn zone_id_by_name(&self, zone_name: &str) -> Result<String, ProviderError> {
        let request = self
            .request(Method::GET, "/zones")
            .query(&[("name", zone_name)]);
        let zones: Vec<Zone> = Self::send(request)?;

        zones
            .into_iter()
            .next()
            .map(|zone| zone.id)
            .ok_or_else(|| ProviderError::ZoneNotFound(zone_name.to_owned()))
    }

    fn list_records(&self, zone_id: &str, name: &str) -> Result<Vec<DnsRecord>, ProviderError> {
        let request = self
            .request(Method::GET, &format!("/zones/{zone_id}/dns_records"))
            .query(&[("name", name)]);
        Self::send(request)
    }

    fn create_record(
        &self,
        zone_id: &str,
        record_type: &str,
        name: &str,
        content: &str,
    ) -> Result<DnsRecord, ProviderError> {
        let request = self
            .request(Method::POST, &format!("/zones/{zone_id}/dns_records"))
            .json(&json!({
                "type": record_type,
                "name": name,
                "content": content,
                "ttl": AUTO_TTL,
            }));
        Self::send(request)
    }

    fn update_record(
        &self,
        zone_id: &str,
        record: &DnsRecord,
        content: &str,
    ) -> Result<DnsRecord, ProviderError> {
        let request = self
            .request(
                Method::PATCH,
                &format!("/zones/{zone_id}/dns_records/{}", record.id),
            )
            .json(&json!({
                "type": record.record_type,
                "content": content,
            }));
        Self::send(request)
    }

    fn user_details(&self) -> Result<UserDetails, ProviderError> {
        Self::send(self.request(Method::GET, "/user"))
    }
}

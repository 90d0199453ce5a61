use std::net::SocketAddr;
use std::time::Duration;

use super::{
    error::DnsError,
    protocol::{DnsPacket, QueryType},
    resolver::{self, DEFAULT_RESOLVER, DEFAULT_TIMEOUT},
};

/// Finds the zone of authority for a reverse lookup name.
pub trait ZoneLocator {
    fn locate_zone(&self, name: &str) -> Result<String, DnsError>;
}

/// Locates zones with a live SOA query against a recursive resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SoaLocator {
    pub resolver: SocketAddr,
    pub timeout: Duration,
}

impl SoaLocator {
    pub const fn new(resolver: SocketAddr, timeout: Duration) -> Self {
        Self { resolver, timeout }
    }
}

impl Default for SoaLocator {
    fn default() -> Self {
        Self::new(DEFAULT_RESOLVER, DEFAULT_TIMEOUT)
    }
}

impl ZoneLocator for SoaLocator {
    fn locate_zone(&self, name: &str) -> Result<String, DnsError> {
        let response = resolver::query(self.resolver, name, QueryType::SOA, self.timeout)?;
        zone_from_response(name, &response)
    }
}

/// Owner name of the first answer or authority record, of any type.
///
/// Resolvers answer a SOA query for a name inside a zone either with the SOA
/// in the authority section of a negative reply or, for the apex, in the
/// answer section, so the first owner name found is taken as the zone.
pub fn zone_from_response(name: &str, response: &DnsPacket) -> Result<String, DnsError> {
    let record = response
        .answers
        .iter()
        .chain(&response.authorities)
        .next()
        .ok_or_else(|| DnsError::NoRecordsFound {
            name: name.to_owned(),
            rescode: response.header.rescode.to_string(),
        })?;

    let zone = record.name.strip_suffix('.').unwrap_or(&record.name);
    Ok(zone.to_owned())
}

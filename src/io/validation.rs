use regex::Regex;
use std::net::{IpAddr, SocketAddr};
use std::sync::LazyLock;

use crate::dns::resolver::DNS_PORT;

static HOSTNAME_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    // Non-empty labels of at most 63 characters, optional trailing dot
    Regex::new(r"^[^.]{1,63}(?:\.[^.]{1,63})*\.?$").unwrap()
});

const MAX_HOSTNAME_LENGTH: usize = 253;

/// Checks a PTR target only for empty or over-long names and labels.
///
/// The trimmed value is passed on exactly as given, case included.
pub fn validate_hostname(input: &str) -> Result<String, String> {
    let input = input.trim();

    if input.is_empty() {
        return Err("Hostname cannot be empty".to_owned());
    }

    if input.trim_end_matches('.').len() > MAX_HOSTNAME_LENGTH {
        return Err(format!(
            "Hostname exceeds maximum length of {MAX_HOSTNAME_LENGTH} characters: {input}"
        ));
    }

    if !HOSTNAME_REGEX.is_match(input) {
        return Err(format!("Invalid hostname: {input}"));
    }

    Ok(input.to_owned())
}

/// Parses `IP` or `IP:PORT` (IPv6 with a port in brackets), defaulting to port 53.
pub fn validate_resolver(input: &str) -> Result<SocketAddr, String> {
    let input = input.trim();

    if let Ok(ip) = input.parse::<IpAddr>() {
        return Ok(SocketAddr::new(ip, DNS_PORT));
    }

    input
        .parse::<SocketAddr>()
        .map_err(|_| format!("Invalid DNS resolver address: {input}"))
}

/// Accepts a whole number of seconds greater than zero.
pub fn validate_timeout(input: &str) -> Result<u64, String> {
    match input.trim().parse::<u64>() {
        Ok(0) => Err("Timeout must be greater than zero".to_owned()),
        Ok(secs) => Ok(secs),
        Err(_) => Err(format!("Invalid timeout in seconds: {input}")),
    }
}

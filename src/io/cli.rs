use clap::Parser;
use std::net::SocketAddr;
use std::path::PathBuf;

use super::config::DEFAULT_CONFIG_PATH;
use super::output::OutputFormat;
use super::validation::{validate_hostname, validate_resolver, validate_timeout};
use crate::error::RdnsError;

/// What a run should do, derived from the parsed flags
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OperationMode {
    CheckApi,
    GetRdns { ip: String },
    SetRdns { ip: String, hostname: String },
}

/// Command-line arguments for the program
#[derive(Parser, Debug)]
#[command(
    name = "cloudflare-rdns",
    author = "Alex Ogden",
    version = env!("CARGO_PKG_VERSION"),
    about = "Read and update reverse DNS (PTR) records hosted on Cloudflare",
)]
pub struct CommandArgs {
    /// Path to the TOML configuration file holding API credentials
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, env = "CFRDNS_CONFIG")]
    pub config: PathBuf,

    /// Output format of the result
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Json, ignore_case = true, env = "CFRDNS_OUTPUT")]
    pub output: OutputFormat,

    /// The IPv4 or IPv6 address to read or set the PTR record for
    #[arg(short, long, required = false, env = "CFRDNS_IP")]
    pub ip: Option<String>,

    /// Verify the API credentials by fetching the account's user details
    #[arg(long, default_value_t = false, env = "CFRDNS_CHECK_API")]
    pub check_api: bool,

    /// Hostname to point the PTR record at. Without it the current record is printed
    #[arg(short, long, value_parser = validate_hostname, required = false, env = "CFRDNS_SET_RDNS")]
    pub set_rdns: Option<String>,

    /// DNS resolver used to find the reverse zone, IP or IP:PORT. Overrides the config file
    #[arg(short, long, value_parser = validate_resolver, required = false, env = "CFRDNS_RESOLVER")]
    pub resolver: Option<SocketAddr>,

    /// Timeout in seconds for the SOA query. Overrides the config file
    #[arg(short, long, value_parser = validate_timeout, required = false, env = "CFRDNS_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Print diagnostics to stderr
    #[arg(short, long, default_value_t = false, env = "CFRDNS_VERBOSE")]
    pub verbose: bool,
}

impl CommandArgs {
    /// `--check-api` wins over everything else; otherwise `--ip` is required.
    pub fn operation_mode(&self) -> Result<OperationMode, RdnsError> {
        if self.check_api {
            return Ok(OperationMode::CheckApi);
        }

        let ip = self.ip.clone().ok_or_else(|| {
            RdnsError::Usage(
                "The argument '--ip <IP>' is required unless '--check-api' is given".to_owned(),
            )
        })?;

        Ok(match &self.set_rdns {
            Some(hostname) => OperationMode::SetRdns {
                ip,
                hostname: hostname.clone(),
            },
            None => OperationMode::GetRdns { ip },
        })
    }
}

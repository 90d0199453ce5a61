mod dns;
mod error;
mod io;
mod modes;
mod provider;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use std::process::ExitCode;

use crate::dns::zone::SoaLocator;
use crate::error::RdnsError;
use crate::io::{
    cli::{CommandArgs, OperationMode},
    config::Config,
    output::{OutputData, OutputWriter},
};
use crate::modes::rdns::{LookupOutcome, Session, UpdateOutcome};
use crate::provider::UserDetails;

const NO_RECORD_DETAILS: &str = "No PTR record found for IP";

fn main() -> Result<ExitCode> {
    let args = CommandArgs::parse();
    let writer = OutputWriter::new(args.output);

    let output = run(&args).unwrap_or_else(|(mode, error)| {
        if args.verbose {
            log_error!("{error}");
        }
        failure_output(mode.as_ref(), &error)
    });

    writer
        .emit(&output, &mut std::io::stdout().lock())
        .context("Failed to write output")?;

    Ok(ExitCode::from(exit_status(&output)))
}

/// 0 for any successful document, "no record found" included; 1 otherwise.
const fn exit_status(output: &OutputData) -> u8 {
    if output.success { 0 } else { 1 }
}

type Failure = (Option<OperationMode>, RdnsError);

fn setup_failure(error: impl Into<RdnsError>) -> Failure {
    (None, error.into())
}

fn run(args: &CommandArgs) -> Result<OutputData, Failure> {
    let config = Config::load(&args.config).map_err(setup_failure)?;
    let api = config
        .build_client()
        .map_err(|e| setup_failure(RdnsError::Auth(e.to_string())))?;

    let mode = args.operation_mode().map_err(setup_failure)?;

    let locator = SoaLocator::new(
        args.resolver.unwrap_or_else(|| config.resolver()),
        args.timeout
            .map_or_else(|| config.timeout(), std::time::Duration::from_secs),
    );
    if args.verbose {
        log_info!("Using resolver {} with a {:?} timeout", locator.resolver, locator.timeout);
    }

    let session = Session::new(&api, &locator, args.verbose);
    let result = match &mode {
        OperationMode::CheckApi => session.check_api().map(|user| user_output(&user)),
        OperationMode::GetRdns { ip } => session.get_rdns(ip).map(lookup_output),
        OperationMode::SetRdns { ip, hostname } => session
            .set_rdns(ip, hostname)
            .map(|outcome| update_output(ip, hostname, &outcome)),
    };

    result.map_err(|e| (Some(mode), e))
}

fn failure_output(mode: Option<&OperationMode>, error: &RdnsError) -> OutputData {
    OutputData::failure(headline(mode, error), error.to_string())
}

fn headline(mode: Option<&OperationMode>, error: &RdnsError) -> &'static str {
    if error.is_zone_resolution() {
        return "Error resolving rDNS zone";
    }

    match (error, mode) {
        (RdnsError::Config(_), _) => "Error loading config",
        (RdnsError::Auth(_), _) => "Error creating Cloudflare API client",
        (RdnsError::Usage(_), _) => "Invalid arguments",
        (_, Some(OperationMode::CheckApi)) => "Error checking API access",
        (_, Some(OperationMode::SetRdns { .. })) => "Error updating rDNS",
        _ => "Error fetching rDNS",
    }
}

fn lookup_output(outcome: LookupOutcome) -> OutputData {
    match outcome {
        LookupOutcome::Found { name, content } => OutputData::success(
            Some(content.clone()),
            Some(json!({ "details": content, "name": name })),
        ),
        LookupOutcome::NotFound { name } => OutputData::success(
            None,
            Some(json!({ "details": NO_RECORD_DETAILS, "name": name })),
        ),
    }
}

fn update_output(ip: &str, hostname: &str, outcome: &UpdateOutcome) -> OutputData {
    let (details, records) = match outcome {
        UpdateOutcome::Created(record) => (format!("RDNS created for {ip}"), vec![record]),
        UpdateOutcome::Updated(records) => {
            (format!("RDNS updated for {ip}"), records.iter().collect())
        }
    };
    let record_ids: Vec<&str> = records.iter().map(|record| record.id.as_str()).collect();

    OutputData::success(
        Some(hostname.to_owned()),
        Some(json!({ "details": details, "records": record_ids })),
    )
}

fn user_output(user: &UserDetails) -> OutputData {
    OutputData::success(
        Some("API credentials are valid".to_owned()),
        Some(json!({
            "id": user.id,
            "email": user.email,
            "first_name": user.first_name,
            "last_name": user.last_name,
            "suspended": user.suspended,
        })),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dns::error::DnsError;
    use crate::io::config::ConfigError;
    use crate::provider::DnsRecord;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn args(argv: &[&str]) -> CommandArgs {
        CommandArgs::try_parse_from(std::iter::once("cloudflare-rdns").chain(argv.iter().copied()))
            .unwrap()
    }

    fn token_config() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"use_token = true\napi_token = \"abc123\"\n")
            .unwrap();
        file
    }

    #[test]
    fn test_missing_config_fails_before_anything_else() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("absent.toml");
        let missing = missing.to_str().unwrap();

        // Config errors win over the missing --ip usage error
        for argv in [vec!["-c", missing, "-i", "192.0.2.1"], vec!["-c", missing]] {
            let (mode, error) = run(&args(&argv)).unwrap_err();
            assert_eq!(mode, None);
            assert!(matches!(error, RdnsError::Config(ConfigError::FileRead(..))));

            let output = failure_output(mode.as_ref(), &error);
            assert_eq!(output.message.as_deref(), Some("Error loading config"));
            assert_eq!(exit_status(&output), 1);
        }
    }

    #[test]
    fn test_missing_ip_after_valid_config_is_usage_error() {
        let config = token_config();
        let (mode, error) = run(&args(&["-c", config.path().to_str().unwrap()])).unwrap_err();

        assert_eq!(mode, None);
        assert!(matches!(error, RdnsError::Usage(_)));
        assert_eq!(exit_status(&failure_output(None, &error)), 1);
    }

    #[test]
    fn test_invalid_ip_fails_without_network() {
        let config = token_config();
        let (mode, error) = run(&args(&[
            "-c",
            config.path().to_str().unwrap(),
            "-i",
            "not-an-ip",
        ]))
        .unwrap_err();

        assert!(matches!(mode, Some(OperationMode::GetRdns { .. })));
        assert!(matches!(error, RdnsError::InvalidAddress(_)));

        let output = failure_output(mode.as_ref(), &error);
        assert!(!output.success);
        assert_eq!(output.message.as_deref(), Some("Error resolving rDNS zone"));
        assert_eq!(exit_status(&output), 1);
    }

    #[test]
    fn test_exit_status() {
        let not_found = lookup_output(LookupOutcome::NotFound {
            name: "1.2.0.192.in-addr.arpa".to_owned(),
        });
        assert_eq!(exit_status(&not_found), 0);

        let found = lookup_output(LookupOutcome::Found {
            name: "1.2.0.192.in-addr.arpa".to_owned(),
            content: "host.example.com".to_owned(),
        });
        assert_eq!(exit_status(&found), 0);

        let failed = failure_output(None, &RdnsError::Auth("bad token".to_owned()));
        assert_eq!(exit_status(&failed), 1);
    }

    #[test]
    fn test_found_record_output() {
        let output = lookup_output(LookupOutcome::Found {
            name: "1.2.0.192.in-addr.arpa".to_owned(),
            content: "host.example.com".to_owned(),
        });

        assert!(output.success);
        assert_eq!(output.message.as_deref(), Some("host.example.com"));
        assert_eq!(output.data.unwrap()["details"], "host.example.com");
    }

    #[test]
    fn test_missing_record_is_success() {
        let output = lookup_output(LookupOutcome::NotFound {
            name: "1.2.0.192.in-addr.arpa".to_owned(),
        });

        assert!(output.success);
        assert_eq!(output.message, None);
        assert_eq!(output.data.unwrap()["details"], NO_RECORD_DETAILS);
    }

    #[test]
    fn test_update_output() {
        let record = DnsRecord {
            id: "rec1".to_owned(),
            record_type: "PTR".to_owned(),
            name: "1.2.0.192.in-addr.arpa".to_owned(),
            content: "host.example.com".to_owned(),
        };

        let created = update_output("192.0.2.1", "host.example.com", &UpdateOutcome::Created(record.clone()));
        assert_eq!(created.data.unwrap()["details"], "RDNS created for 192.0.2.1");

        let updated = update_output(
            "192.0.2.1",
            "host.example.com",
            &UpdateOutcome::Updated(vec![record.clone(), record]),
        );
        assert_eq!(updated.message.as_deref(), Some("host.example.com"));
        let data = updated.data.unwrap();
        assert_eq!(data["details"], "RDNS updated for 192.0.2.1");
        assert_eq!(data["records"], json!(["rec1", "rec1"]));
    }

    #[test]
    fn test_headlines() {
        let get = OperationMode::GetRdns {
            ip: "192.0.2.1".to_owned(),
        };
        let set = OperationMode::SetRdns {
            ip: "192.0.2.1".to_owned(),
            hostname: "host.example.com".to_owned(),
        };

        let timeout = RdnsError::from(DnsError::Timeout("1.1.1.1:53".to_owned()));
        assert_eq!(headline(Some(&set), &timeout), "Error resolving rDNS zone");
        assert_eq!(
            headline(Some(&get), &RdnsError::ZoneNotFound("2.0.192.in-addr.arpa".to_owned())),
            "Error resolving rDNS zone"
        );

        let api = RdnsError::ProviderApi("API error (HTTP 400): bad".to_owned());
        assert_eq!(headline(Some(&get), &api), "Error fetching rDNS");
        assert_eq!(headline(Some(&set), &api), "Error updating rDNS");
        assert_eq!(headline(Some(&OperationMode::CheckApi), &api), "Error checking API access");

        let config = RdnsError::from(ConfigError::Parse("bad".to_owned()));
        assert_eq!(headline(None, &config), "Error loading config");
        assert_eq!(headline(None, &RdnsError::Usage("x".to_owned())), "Invalid arguments");
    }
}

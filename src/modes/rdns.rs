use crate::{
    dns::{reverse::reverse_name, zone::ZoneLocator},
    error::RdnsError,
    log_info, log_success, log_warn,
    provider::{DnsRecord, PTR_RECORD_TYPE, UserDetails, ZoneApi},
};

/// Where the PTR record for an address lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Located {
    pub reverse_name: String,
    pub zone_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    Found { name: String, content: String },
    NotFound { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateOutcome {
    Created(DnsRecord),
    /// Every record at the reverse name, in listing order.
    Updated(Vec<DnsRecord>),
}

pub struct Session<'a> {
    api: &'a dyn ZoneApi,
    locator: &'a dyn ZoneLocator,
    verbose: bool,
}

impl<'a> Session<'a> {
    pub fn new(api: &'a dyn ZoneApi, locator: &'a dyn ZoneLocator, verbose: bool) -> Self {
        Self {
            api,
            locator,
            verbose,
        }
    }

    pub fn locate(&self, ip: &str) -> Result<Located, RdnsError> {
        let reverse_name = reverse_name(ip)?;
        if self.verbose {
            log_info!("Reverse name for {ip}: {reverse_name}");
        }

        let zone_name = self.locator.locate_zone(&reverse_name)?;
        if self.verbose {
            log_info!("Zone of authority: {zone_name}");
        }

        let zone_id = self.api.zone_id_by_name(&zone_name)?;
        if self.verbose {
            log_info!("Zone ID: {zone_id}");
        }

        Ok(Located {
            reverse_name,
            zone_id,
        })
    }

    /// Reads the PTR record for `ip`. Only the first listed record is reported.
    pub fn get_rdns(&self, ip: &str) -> Result<LookupOutcome, RdnsError> {
        let located = self.locate(ip)?;
        let records = self
            .api
            .list_records(&located.zone_id, &located.reverse_name)?;

        Ok(match records.into_iter().next() {
            Some(record) => LookupOutcome::Found {
                name: record.name,
                content: record.content,
            },
            None => LookupOutcome::NotFound {
                name: located.reverse_name,
            },
        })
    }

    /// Creates the PTR record, or points every existing record at `hostname`.
    ///
    /// Updates run in listing order and stop at the first failure; records
    /// already updated stay updated.
    pub fn set_rdns(&self, ip: &str, hostname: &str) -> Result<UpdateOutcome, RdnsError> {
        let located = self.locate(ip)?;
        let records = self
            .api
            .list_records(&located.zone_id, &located.reverse_name)?;

        if records.is_empty() {
            let record = self.api.create_record(
                &located.zone_id,
                PTR_RECORD_TYPE,
                &located.reverse_name,
                hostname,
            )?;
            if self.verbose {
                log_success!("Created {} -> {hostname}", record.name);
            }
            return Ok(UpdateOutcome::Created(record));
        }

        if self.verbose && records.len() > 1 {
            log_warn!("{} records share {}, updating all of them", records.len(), located.reverse_name);
        }

        let mut updated = Vec::with_capacity(records.len());
        for record in &records {
            let record = self.api.update_record(&located.zone_id, record, hostname)?;
            if self.verbose {
                log_success!("Updated record {} -> {hostname}", record.id);
            }
            updated.push(record);
        }

        Ok(UpdateOutcome::Updated(updated))
    }

    pub fn check_api(&self) -> Result<UserDetails, RdnsError> {
        let user = self.api.user_details()?;
        if self.verbose {
            log_success!("Authenticated as {}", user.email);
        }
        Ok(user)
    }
}

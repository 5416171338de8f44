//! Version-independent address resolution.
//!
//! Every declared address is resolved once during plugin load: from the
//! version table when the running release is known, otherwise by scanning the
//! module image for its signature.

use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{Error, Result};
use crate::process::{Pattern, ReadMemory, scan_first};
use crate::reloc::{AbstractAddress, RuntimeVersion, VersionTable};

/// How tables and signatures are combined.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScanPolicy {
    /// Use the table entry for the running version; scan only when absent.
    #[default]
    TableFirst,
    /// Scan every address that has a signature and log the derived RVA.
    /// Used to build tables for a new release.
    AlwaysScan,
}

/// Outcome of resolving every declared address.
#[derive(Debug, Clone, Default)]
pub struct ResolutionReport {
    pub resolved: Vec<(String, u64)>,
    pub unresolved: Vec<String>,
    pub elapsed: Duration,
}

impl ResolutionReport {
    pub fn is_complete(&self) -> bool {
        self.unresolved.is_empty()
    }
}

pub struct AddressResolver<R: ReadMemory> {
    image: R,
    policy: ScanPolicy,
    table: VersionTable,
    addresses: Vec<Arc<AbstractAddress>>,
}

impl<R: ReadMemory> AddressResolver<R> {
    pub fn new(image: R) -> Self {
        Self {
            image,
            policy: ScanPolicy::default(),
            table: VersionTable::new(),
            addresses: Vec::new(),
        }
    }

    pub fn with_policy(mut self, policy: ScanPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Extra RVAs consulted after each address's own table.
    pub fn with_table(mut self, table: VersionTable) -> Self {
        self.table.merge(table);
        self
    }

    pub fn image(&self) -> &R {
        &self.image
    }

    /// Register an address for `resolve_all` and hand back a shared handle.
    pub fn declare(&mut self, address: AbstractAddress) -> Arc<AbstractAddress> {
        let address = Arc::new(address);
        self.addresses.push(Arc::clone(&address));
        address
    }

    pub fn addresses(&self) -> &[Arc<AbstractAddress>] {
        &self.addresses
    }

    /// Resolve every declared address that is not yet resolved.
    pub fn resolve_all(&self, version: RuntimeVersion) -> ResolutionReport {
        let start = Instant::now();
        let mut report = ResolutionReport::default();

        for address in &self.addresses {
            match self.resolve(address, version) {
                Some(ea) => report.resolved.push((address.name().to_string(), ea)),
                None => report.unresolved.push(address.name().to_string()),
            }
        }

        report.elapsed = start.elapsed();
        info!(
            "Resolved {}/{} addresses for runtime {} in {} ms",
            report.resolved.len(),
            self.addresses.len(),
            version,
            report.elapsed.as_millis()
        );
        report
    }

    /// Resolve a single address. Idempotent: a resolved address is returned as is.
    ///
    /// Failures are logged and leave the address unresolved.
    pub fn resolve(&self, address: &AbstractAddress, version: RuntimeVersion) -> Option<u64> {
        if let Some(ea) = address.get() {
            return Some(ea);
        }

        match self.compute(address, version) {
            Ok(ea) => {
                address.set_effective(ea);
                address.get()
            }
            Err(e) => {
                warn!("{}", e);
                for (known, rva) in self.known_rvas(address) {
                    warn!("  Runtime version: {}\tAddress: {:#010x}", known, rva);
                }
                None
            }
        }
    }

    fn known_rvas(&self, address: &AbstractAddress) -> Vec<(RuntimeVersion, u64)> {
        let mut known: Vec<_> = address.table().collect();
        known.extend(self.table.versions_of(address.name()));
        known.sort_unstable();
        known.dedup_by_key(|(version, _)| *version);
        known
    }

    fn compute(&self, address: &AbstractAddress, version: RuntimeVersion) -> Result<u64> {
        let base = self.image.base_address();
        let rva = address
            .rva_for(version)
            .or_else(|| self.table.get(version, address.name()));

        let from_table = |rva: u64| {
            base.checked_add(rva).ok_or_else(|| {
                Error::resolution_failed(
                    address.name(),
                    format!("RVA {:#x} overflows image base {:#x}", rva, base),
                )
            })
        };

        match (self.policy, rva, address.signature()) {
            (ScanPolicy::TableFirst, Some(rva), _) => from_table(rva),
            (_, _, Some(signature)) => {
                let scanned = self.scan(address, signature);
                match (scanned, rva) {
                    (Ok(ea), _) => Ok(ea),
                    (Err(e), Some(rva)) => {
                        warn!("{}; falling back to table entry", e);
                        from_table(rva)
                    }
                    (Err(e), None) => Err(e),
                }
            }
            (_, Some(rva), None) => from_table(rva),
            (_, None, None) => Err(Error::resolution_failed(
                address.name(),
                format!("no signature and no address for runtime {}", version),
            )),
        }
    }

    fn scan(&self, address: &AbstractAddress, signature: &str) -> Result<u64> {
        let pattern = Pattern::parse(signature)
            .map_err(|e| Error::resolution_failed(address.name(), e.to_string()))?;
        let matched = scan_first(&self.image, &pattern)?.ok_or_else(|| {
            Error::resolution_failed(address.name(), format!("signature not found: {}", pattern))
        })?;

        let mut ea = matched.wrapping_add_signed(address.offset());
        if let Some(indirect) = address.indirect() {
            let disp_addr = ea.wrapping_add_signed(indirect.displacement_offset);
            let disp = self.image.read_i32(disp_addr)?;
            ea = ea
                .wrapping_add(indirect.instruction_length)
                .wrapping_add_signed(disp as i64);
        }

        debug!("---");
        debug!("sig: {}", pattern);
        debug!("effective address: {:#x}", ea);
        debug!("RVA: {:#010x}", ea.wrapping_sub(self.image.base_address()));
        debug!("---");
        Ok(ea)
    }
}

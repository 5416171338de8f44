use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::reloc::RuntimeVersion;

/// RIP-relative operand inside a matched instruction.
///
/// For `call rel32` (`E8 xx xx xx xx`) the displacement starts one byte into
/// the instruction and the instruction is five bytes long; for
/// `mov rcx, [rip+disp32]` (`48 8B 0D xx xx xx xx`) it is three and seven.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Indirect {
    pub displacement_offset: i64,
    pub instruction_length: u64,
}

/// One engine symbol whose address moves between releases.
///
/// The effective address is written once during load and never changes
/// afterwards, so reads after resolution need no locking.
#[derive(Debug)]
pub struct AbstractAddress {
    name: String,
    table: BTreeMap<RuntimeVersion, u64>,
    signature: Option<String>,
    offset: i64,
    indirect: Option<Indirect>,
    effective: OnceLock<u64>,
}

impl AbstractAddress {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            table: BTreeMap::new(),
            signature: None,
            offset: 0,
            indirect: None,
            effective: OnceLock::new(),
        }
    }

    /// Known RVA for a specific runtime
    pub fn with_rva(mut self, version: RuntimeVersion, rva: u64) -> Self {
        self.table.insert(version, rva);
        self
    }

    /// Version-independent signature, parsed when the address is resolved
    pub fn with_signature(mut self, pattern: &str) -> Self {
        self.signature = Some(pattern.to_string());
        self
    }

    /// Bytes added to the match address before any indirect resolution
    pub fn with_offset(mut self, offset: i64) -> Self {
        self.offset = offset;
        self
    }

    pub fn with_indirect(mut self, displacement_offset: i64, instruction_length: u64) -> Self {
        self.indirect = Some(Indirect {
            displacement_offset,
            instruction_length,
        });
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn signature(&self) -> Option<&str> {
        self.signature.as_deref()
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn indirect(&self) -> Option<Indirect> {
        self.indirect
    }

    pub fn rva_for(&self, version: RuntimeVersion) -> Option<u64> {
        self.table.get(&version).copied()
    }

    pub fn table(&self) -> impl Iterator<Item = (RuntimeVersion, u64)> + '_ {
        self.table.iter().map(|(version, rva)| (*version, *rva))
    }

    pub(crate) fn add_rva(&mut self, version: RuntimeVersion, rva: u64) {
        self.table.insert(version, rva);
    }

    /// The resolved address, if resolution succeeded.
    ///
    /// Callers that dereference engine memory must check this first; an
    /// unresolved address is never substituted with a default.
    pub fn get(&self) -> Option<u64> {
        self.effective.get().copied()
    }

    pub fn is_resolved(&self) -> bool {
        self.effective.get().is_some()
    }

    /// Record the effective address. Returns `false` if it was already set.
    pub fn set_effective(&self, address: u64) -> bool {
        self.effective.set(address).is_ok()
    }
}

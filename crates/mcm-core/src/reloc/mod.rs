//! Version-independent engine addresses.
//!
//! Each address is declared once with per-release RVAs and a byte signature,
//! then resolved exactly once during load.

mod address;
pub mod engine;
mod resolver;
mod table;
mod version;

pub use address::{AbstractAddress, Indirect};
pub use engine::EngineAddresses;
pub use resolver::{AddressResolver, ResolutionReport, ScanPolicy};
pub use table::VersionTable;
pub(crate) use table::parse_hex_value;
pub use version::RuntimeVersion;

pub mod pattern;
mod reader;

// Buffer-backed module image for tests and offline dumps
#[doc(hidden)]
pub mod mock;

pub use pattern::{Pattern, scan_all, scan_first};
pub use reader::{LoadedModule, ReadMemory};

#[doc(hidden)]
pub use mock::{MockMemoryBuilder, MockMemoryReader};

//! CLI command implementations.

pub mod catalog;
pub mod keybinds;
pub mod resolve;
pub mod scan;

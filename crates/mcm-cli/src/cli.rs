//! CLI argument definitions for mcm.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "mcm")]
#[command(about = "Mod configuration runtime diagnostics", version)]
pub struct Args {
    /// Path to config file
    #[arg(short, long, default_value = "mcm.toml", env = "MCM_CONFIG")]
    pub config: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Search a module dump for a byte signature
    Scan {
        /// Raw module image dump
        #[arg(long, value_name = "FILE")]
        image: PathBuf,
        /// Load address of the image (hex)
        #[arg(long, default_value = "0x140000000")]
        base: String,
        /// Signature, e.g. "48 8B 0D ? ? ? ?"
        #[arg(long)]
        pattern: String,
        /// Report every match instead of the first
        #[arg(long)]
        all: bool,
    },
    /// Resolve every engine address against a module dump
    Resolve {
        /// Raw module image dump
        #[arg(long, value_name = "FILE")]
        image: PathBuf,
        /// Load address of the image (hex)
        #[arg(long, default_value = "0x140000000")]
        base: String,
        /// Runtime version, e.g. 1.10.20 (default: config or latest known)
        #[arg(long)]
        runtime: Option<String>,
        /// Extra offsets file merged over the built-in tables
        #[arg(long, value_name = "FILE")]
        offsets: Option<PathBuf>,
        /// Ignore tables and scan every signature
        #[arg(long)]
        always_scan: bool,
        /// Write the resolved RVAs as an offsets file
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },
    /// Show the keybind definitions a mod ships
    Catalog {
        /// Data root (default: from config)
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
        /// Mod file name, e.g. ModA.esp
        #[arg(long = "mod", value_name = "NAME")]
        mod_name: String,
        /// Plugin list used to resolve form identifiers
        #[arg(long, value_name = "FILE")]
        load_order: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show persisted keybind registrations
    Keybinds {
        /// Registration file (default: <data root>/Settings/Keybinds.json)
        #[arg(long, value_name = "FILE")]
        file: Option<PathBuf>,
        /// Data root (default: from config)
        #[arg(long, value_name = "DIR")]
        root: Option<PathBuf>,
        /// Plugin list used to resolve form identifiers
        #[arg(long, value_name = "FILE")]
        load_order: Option<PathBuf>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

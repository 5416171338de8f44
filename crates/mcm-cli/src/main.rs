mod cli;
mod cli_utils;
mod commands;

use anyhow::Result;
use clap::Parser;
use cli::{Args, Command};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let args = Args::parse();

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mcm=info,mcm_core=info"));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    let config = cli_utils::load_config(&args.config);

    match args.command {
        Command::Scan {
            image,
            base,
            pattern,
            all,
        } => commands::scan::run(&image, &base, &pattern, all),
        Command::Resolve {
            image,
            base,
            runtime,
            offsets,
            always_scan,
            output,
        } => commands::resolve::run(
            &config,
            &image,
            &base,
            runtime.as_deref(),
            offsets.as_deref(),
            always_scan,
            output.as_deref(),
        ),
        Command::Catalog {
            root,
            mod_name,
            load_order,
            json,
        } => commands::catalog::run(
            &config,
            root.as_deref(),
            &mod_name,
            load_order.as_deref(),
            json,
        ),
        Command::Keybinds {
            file,
            root,
            load_order,
            json,
        } => commands::keybinds::run(
            &config,
            file.as_deref(),
            root.as_deref(),
            load_order.as_deref(),
            json,
        ),
    }
}

//! Notes CLI - device-side key and session tooling for encrypted notes
//!
//! Exposes the core library's device fingerprint, hot-wallet store and
//! envelope cipher from the command line.

mod app;
mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod helpers;
mod logging;

use clap::Parser;
use notes_core::{NotesError, VERSION};

use crate::app::AppContext;
use crate::cli::{Cli, Commands};
use crate::commands::{cipher, device, misc};
use crate::errors::CliError;

fn main() {
    let cli = Cli::parse();
    let ctx = AppContext::new(&cli);

    let configured = ctx.config().ok().map(|config| config.logging.filter.as_str());
    logging::init(configured);

    if let Err(e) = run(&ctx, &cli) {
        if let Some(cli_err) = e.downcast_ref::<CliError>() {
            cli_err.exit();
        }
        if let Some(cli_err) = e.downcast_ref::<NotesError>().and_then(CliError::from_core) {
            cli_err.exit();
        }
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(ctx: &AppContext, cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Some(Commands::Fingerprint) => {
            device::handle_fingerprint(ctx)?;
        }
        Some(Commands::HotWallet(args)) => {
            device::handle_hot_wallet(ctx, &args.command)?;
        }
        Some(Commands::Encrypt(args)) => {
            cipher::handle_encrypt(ctx, args)?;
        }
        Some(Commands::Decrypt(args)) => {
            cipher::handle_decrypt(ctx, args)?;
        }
        Some(Commands::Config) => {
            misc::handle_config(ctx)?;
        }
        Some(Commands::Completions { shell }) => {
            misc::handle_completions(*shell)?;
        }
        None => {
            println!("Notes v{}", VERSION);
            println!("\nQuickstart:");
            println!("  notes fingerprint");
            println!("  notes hot-wallet address --address 0x…");
            println!("  notes encrypt --address 0x… --text notes.txt");
            println!("\nRun `notes --help` for full usage.");
        }
    }

    Ok(())
}

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use notes_core::VERSION;

/// Notes - device-side key and session tooling for encrypted notes
#[derive(Parser)]
#[command(name = "notes")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to the config file
    #[arg(long, global = true, env = "NOTES_CONFIG")]
    pub config: Option<PathBuf>,

    /// Path to the local device store
    #[arg(long, global = true, env = "NOTES_STORE")]
    pub store: Option<PathBuf>,

    /// Wallet signature over the derivation message (base64)
    #[arg(long, global = true, env = "NOTES_SIGNATURE", hide_env_values = true)]
    pub signature: Option<String>,

    /// Disable interactive prompts
    #[arg(long, global = true)]
    pub no_input: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print this device's fingerprint
    Fingerprint,

    /// Inspect or manage the device hot wallet
    #[command(name = "hot-wallet")]
    HotWallet(HotWalletArgs),

    /// Encrypt a file or stdin with the content key
    Encrypt(CipherArgs),

    /// Decrypt a file or stdin with the content key
    Decrypt(CipherArgs),

    /// Show the effective configuration
    Config,

    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args)]
pub struct HotWalletArgs {
    #[command(subcommand)]
    pub command: HotWalletSubcommand,
}

#[derive(Subcommand)]
pub enum HotWalletSubcommand {
    /// Derive this device's hot wallet address
    Address {
        /// Primary wallet address
        #[arg(long, value_name = "0x…")]
        address: String,
    },

    /// Show the stored hot wallet's address and expiry
    Info {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Erase the stored hot wallet
    Clear,
}

/// Arguments shared by `encrypt` and `decrypt`
#[derive(Args)]
pub struct CipherArgs {
    /// Primary wallet address
    #[arg(long, value_name = "0x…")]
    pub address: String,

    /// Use the base64 text form instead of raw bytes
    #[arg(long)]
    pub text: bool,

    /// Input file (defaults to stdin)
    #[arg(value_name = "INPUT")]
    pub input: Option<PathBuf>,
}

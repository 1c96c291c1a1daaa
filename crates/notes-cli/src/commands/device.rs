use chrono::{TimeZone, Utc};
use notes_core::crypto::derive_hot_wallet_keypair;

use crate::app::AppContext;
use crate::cli::HotWalletSubcommand;
use crate::errors::CliError;
use crate::helpers::resolve_signature;

pub fn handle_fingerprint(ctx: &AppContext) -> anyhow::Result<()> {
    println!("{}", ctx.fingerprints()?.derive());
    Ok(())
}

pub fn handle_hot_wallet(ctx: &AppContext, command: &HotWalletSubcommand) -> anyhow::Result<()> {
    match command {
        HotWalletSubcommand::Address { address } => {
            let fingerprint = ctx.fingerprints()?.derive();
            let signature = resolve_signature(ctx.cli())?;
            let keypair = derive_hot_wallet_keypair(&signature, &fingerprint, address)?;
            println!("{}", keypair.address());
        }
        HotWalletSubcommand::Info { json } => {
            let fingerprint = ctx.fingerprints()?.derive();
            let Some(info) = ctx.hot_wallets()?.info(&fingerprint)? else {
                return Err(CliError::not_found(
                    "No live hot wallet stored on this device.",
                    "Hint: Authorize a session from the notes app to create one.",
                )
                .into());
            };
            let expires = Utc
                .timestamp_millis_opt(info.expires_at)
                .single()
                .map(|at| at.to_rfc3339())
                .unwrap_or_else(|| info.expires_at.to_string());

            if *json {
                let value = serde_json::json!({
                    "address": info.address,
                    "expires_at": expires,
                    "fingerprint": fingerprint.as_str(),
                });
                println!("{}", serde_json::to_string_pretty(&value)?);
            } else {
                println!("address:     {}", info.address);
                println!("expires:     {}", expires);
                println!("fingerprint: {}", fingerprint);
            }
        }
        HotWalletSubcommand::Clear => {
            let fingerprint = ctx.fingerprints()?.derive();
            ctx.hot_wallets()?.clear(&fingerprint)?;
            println!("Hot wallet cleared.");
        }
    }
    Ok(())
}

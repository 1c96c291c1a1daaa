use clap::CommandFactory;
use clap_complete::generate;

use crate::app::{resolve_config_path, AppContext};
use crate::cli::Cli;

pub fn handle_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    generate(shell, &mut cmd, "notes", &mut std::io::stdout());
    Ok(())
}

pub fn handle_config(ctx: &AppContext) -> anyhow::Result<()> {
    let config = ctx.config()?;
    println!("config:  {}", resolve_config_path(ctx.cli())?.display());
    println!("store:   {}", ctx.store_path()?.display());
    println!("logging: {}", config.logging.filter);

    match config.session.to_session_config() {
        Some(session) => {
            println!("session:");
            println!("  capability type:    {}", session.capability_type());
            println!("  funding coin:       {}", session.funding_coin_type);
            println!("  faucet:             {}", session.faucet_url);
            println!(
                "  poll:               {} attempts, {:?} to {:?}",
                session.poll.max_attempts, session.poll.base_delay, session.poll.max_delay
            );
            println!("  monitor interval:   {:?}", session.monitor_interval);
            println!("  warning threshold:  {:?}", session.warning_threshold);
        }
        None => println!("session: not configured (set package_id, funding_coin_type, faucet_url)"),
    }
    Ok(())
}

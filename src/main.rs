use clap::Parser;
use tracing_subscriber::EnvFilter;

use straddle_flow::{cli, run, schema};

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("straddle_flow=info")),
        )
        .with_target(false)
        .init();

    let cli = cli::Cli::parse();

    match cli.command {
        cli::Command::Schema => schema::run(),
        cli::Command::Boards { venue } => run::boards(&venue),
        cli::Command::Collateral {
            venue,
            strike,
            amount,
        } => run::collateral(&venue, strike, &amount),
        cli::Command::Quote {
            venue,
            strike,
            amount,
        } => run::quote(&venue, strike, &amount),
        cli::Command::Buy {
            venue,
            strike,
            amount,
            max_cost,
            slippage_bps,
            dry_run,
        } => run::buy(&venue, &run::BuyArgs {
            strike,
            amount,
            max_cost,
            slippage_bps,
            dry_run,
        }),
        cli::Command::Open {
            venue,
            strike,
            option_type,
            amount,
            max_total_cost,
        } => run::open(&venue, &run::OpenArgs {
            strike,
            option_type,
            amount,
            max_total_cost,
        }),
        cli::Command::Simulate { amount } => run::simulate(&amount),
    }
}

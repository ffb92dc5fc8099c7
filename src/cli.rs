use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Straddle execution and quoting against Lyra option markets: price,
/// dry-run and atomically buy long-call + long-put pairs.
#[derive(Parser)]
#[command(name = "straddle-flow", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

/// Where commands execute.
#[derive(Args, Debug, Clone)]
pub struct VenueArgs {
    /// Run against the in-process seeded market instead of a deployment
    #[arg(long)]
    pub simulate: bool,

    /// Deployment manifest (default: ~/.straddle-flow/deployment.json)
    #[arg(long)]
    pub deployment: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Output the JSON schema for the deployment manifest
    Schema,

    /// List live boards and their strikes
    Boards {
        #[command(flatten)]
        venue: VenueArgs,
    },

    /// Minimum collateral for each leg of a straddle
    Collateral {
        #[command(flatten)]
        venue: VenueArgs,

        /// Strike id
        #[arg(long)]
        strike: u64,

        /// Contracts per leg (decimal, 18 decimals)
        #[arg(long)]
        amount: String,
    },

    /// Dry-run a straddle purchase and report what it would cost
    Quote {
        #[command(flatten)]
        venue: VenueArgs,

        #[arg(long)]
        strike: u64,

        #[arg(long)]
        amount: String,
    },

    /// Buy a straddle: one long call and one long put of equal size
    Buy {
        #[command(flatten)]
        venue: VenueArgs,

        #[arg(long)]
        strike: u64,

        #[arg(long)]
        amount: String,

        /// Abort if the total cost exceeds this (decimal quote units)
        #[arg(long, conflicts_with = "slippage_bps")]
        max_cost: Option<String>,

        /// Quote first and bound the purchase at quote + slippage
        #[arg(long)]
        slippage_bps: Option<u32>,

        /// Quote only; send nothing
        #[arg(long)]
        dry_run: bool,
    },

    /// Open a single position directly on the market
    Open {
        #[command(flatten)]
        venue: VenueArgs,

        #[arg(long)]
        strike: u64,

        /// long-call, long-put, short-call-base, short-call-quote, short-put-quote
        #[arg(long)]
        option_type: String,

        #[arg(long)]
        amount: String,

        /// Revert if the market charges more than this
        #[arg(long)]
        max_total_cost: Option<String>,
    },

    /// Walk through quote, buy and custody checks on the seeded market
    Simulate {
        /// Contracts per leg
        #[arg(long, default_value = "1")]
        amount: String,
    },
}

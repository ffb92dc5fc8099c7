pub mod config;

use alloy::primitives::U256;
use anyhow::{Context, Result, bail};

use crate::cli::VenueArgs;
use crate::market::SettlementAsset;
use crate::model::amount::{format_amount, parse_amount};
use crate::model::{OptionType, StrikeId, TradeParams};
use crate::sim::seed::Seed;
use crate::strategy::{CostBound, StraddleError};
use crate::venues::evm::short_addr;
use crate::venues::lyra::LyraStraddle;
use crate::venues::simulated::SimulatedVenue;
use crate::venues::StraddleVenue;

use config::RuntimeConfig;

/// Build the venue a command runs against.
pub fn build_venue(args: &VenueArgs, dry_run: bool) -> Result<Box<dyn StraddleVenue>> {
    if args.simulate {
        return Ok(Box::new(SimulatedVenue::seeded(&Seed::default())?));
    }
    let config = RuntimeConfig::from_cli(args.deployment.as_deref(), dry_run)?;
    println!("Chain:    {}", config.deployment.chain);
    if let Some(wallet) = config.wallet_address {
        println!("Wallet:   {wallet:?}");
    }
    Ok(Box::new(LyraStraddle::new(&config)?))
}

fn block_on<F: std::future::Future<Output = Result<()>>>(fut: F) -> Result<()> {
    let rt = tokio::runtime::Runtime::new().context("creating tokio runtime")?;
    rt.block_on(fut)
}

// ── Read-only commands ─────────────────────────────────────────────

pub fn boards(args: &VenueArgs) -> Result<()> {
    let venue = build_venue(args, false)?;
    block_on(async move {
        let listings = venue.boards().await?;
        if listings.is_empty() {
            println!("No live boards.");
        }
        for listing in listings {
            let b = &listing.board;
            println!(
                "Board {} (expiry {}{})",
                b.id,
                b.expiry,
                if b.frozen { ", frozen" } else { "" }
            );
            for s in &listing.strikes {
                println!("  strike {:>4}  @ {}", s.id, format_amount(s.strike_price));
            }
        }
        Ok(())
    })
}

pub fn collateral(args: &VenueArgs, strike: u64, amount: &str) -> Result<()> {
    let amount = parse_amount(amount)?;
    let venue = build_venue(args, false)?;
    block_on(async move {
        let mc = venue.min_collateral(StrikeId(strike), amount).await?;
        println!("  CALL: {}", format_amount(mc.call_collateral));
        println!("  PUT: {}", format_amount(mc.put_collateral));
        println!("  TOTAL: {}", format_amount(mc.total()));
        Ok(())
    })
}

pub fn quote(args: &VenueArgs, strike: u64, amount: &str) -> Result<()> {
    let amount = parse_amount(amount)?;
    let mut venue = build_venue(args, false)?;
    block_on(async move {
        let q = venue.quote(StrikeId(strike), amount).await?;
        println!("  QUOTE: strike {} x {}", q.strike_id, format_amount(q.amount));
        println!("  CALL: {}", format_amount(q.call_cost));
        println!("  PUT: {}", format_amount(q.put_cost));
        println!("  ESTIMATED: {} (at {})", format_amount(q.estimated_cost), q.quoted_at);
        Ok(())
    })
}

// ── Trading commands ───────────────────────────────────────────────

pub struct BuyArgs {
    pub strike: u64,
    pub amount: String,
    pub max_cost: Option<String>,
    pub slippage_bps: Option<u32>,
    pub dry_run: bool,
}

pub fn buy(args: &VenueArgs, buy: &BuyArgs) -> Result<()> {
    let strike = StrikeId(buy.strike);
    let amount = parse_amount(&buy.amount)?;
    let max_cost = buy.max_cost.as_deref().map(parse_amount).transpose()?;
    let mut venue = build_venue(args, buy.dry_run)?;
    let dry_run = buy.dry_run;
    let slippage_bps = buy.slippage_bps;

    block_on(async move {
        let quote = venue.quote(strike, amount).await?;
        println!("  QUOTE: {}", format_amount(quote.estimated_cost));

        let bound = match (max_cost, slippage_bps) {
            (Some(max), _) => CostBound::MaxCost(max),
            (None, Some(bps)) => CostBound::MaxCost(quote.max_cost(u64::from(bps))),
            (None, None) => CostBound::Unbounded,
        };
        match bound.max_cost() {
            Some(max) => println!("  MAX COST: {}", format_amount(max)),
            None => println!("  MAX COST: unbounded"),
        }

        if dry_run {
            println!("  DRY RUN: nothing sent");
            return Ok(());
        }

        let trader = venue.trader();
        let before = venue.settlement_balance(trader).await?;
        let straddle = match venue.buy(strike, amount, bound).await {
            Ok(s) => s,
            Err(e) if slippage_bps.is_some() && max_cost.is_none() => {
                return Err(stale_if_exceeded(e, quote.estimated_cost));
            }
            Err(e) => return Err(e),
        };
        let after = venue.settlement_balance(trader).await?;

        println!(
            "  BOUGHT: call #{} + put #{} on strike {}",
            straddle.long_call.id, straddle.long_put.id, strike
        );
        println!("  COST: {}", format_amount(straddle.total_cost));
        println!("  BALANCE: {} -> {}", format_amount(before), format_amount(after));

        let custody = venue.custody().await?;
        println!(
            "  CUSTODY: {} straddles, {} idle in {}",
            custody.straddle_count(),
            format_amount(custody.settlement_balance),
            short_addr(&venue.strategy())
        );
        Ok(())
    })
}

/// A quote-derived bound that trips means the price moved past tolerance.
fn stale_if_exceeded(e: anyhow::Error, quoted: U256) -> anyhow::Error {
    match e.downcast::<StraddleError>() {
        Ok(StraddleError::CostExceeded { required, .. }) => StraddleError::StalePrice {
            quoted,
            actual: required,
        }
        .into(),
        Ok(other) => other.into(),
        Err(e) => e,
    }
}

pub struct OpenArgs {
    pub strike: u64,
    pub option_type: String,
    pub amount: String,
    pub max_total_cost: Option<String>,
}

pub fn open(args: &VenueArgs, open: &OpenArgs) -> Result<()> {
    let option_type: OptionType = open.option_type.parse().map_err(anyhow::Error::msg)?;
    let amount = parse_amount(&open.amount)?;
    let mut params = TradeParams::open_long(StrikeId(open.strike), option_type, amount);
    if let Some(max) = &open.max_total_cost {
        params = params.with_max_total_cost(parse_amount(max)?);
    }
    let mut venue = build_venue(args, false)?;

    block_on(async move {
        let result = venue.open_position(&params).await?;
        println!(
            "  OPENED: {} #{} x {}",
            result.position.option_type,
            result.position.id,
            format_amount(result.position.amount)
        );
        println!(
            "  COST: {} (fee {})",
            format_amount(result.total_cost),
            format_amount(result.total_fee)
        );
        Ok(())
    })
}

// ── End-to-end walkthrough ─────────────────────────────────────────

/// Quote, approve, buy and audit a straddle on every strike of the seeded
/// market, printing each check.
pub fn simulate(amount: &str) -> Result<()> {
    let amount = parse_amount(amount)?;
    let seed = Seed::default();
    let mut venue = SimulatedVenue::seeded(&seed)?;

    let symbol = venue.strategy_ref().asset().symbol().to_string();
    let funds = venue.strategy_ref().asset().balance_of(venue.trader());

    println!("=== straddle-flow simulate ===");
    println!(
        "Trader:   {} ({} {symbol})",
        short_addr(&venue.trader()),
        format_amount(funds)
    );
    println!("Strategy: {}", short_addr(&StraddleVenue::strategy(&venue)));
    println!();

    block_on(async move {
        let trader = venue.trader();
        let listings = venue.boards().await?;
        let strikes: Vec<StrikeId> = listings
            .iter()
            .flat_map(|l| l.strikes.iter().map(|s| s.id))
            .collect();

        for strike in strikes {
            let mc = venue.min_collateral(strike, amount).await?;
            let quote = venue.quote(strike, amount).await?;
            println!("Strike {strike}:");
            println!(
                "  COLLATERAL: call {} + put {} = {}",
                format_amount(mc.call_collateral),
                format_amount(mc.put_collateral),
                format_amount(mc.total())
            );
            println!("  QUOTE: {}", format_amount(quote.estimated_cost));

            let before = venue.settlement_balance(trader).await?;
            let straddle = venue
                .buy(strike, amount, CostBound::MaxCost(quote.estimated_cost))
                .await?;
            let after = venue.settlement_balance(trader).await?;
            let charged = before.saturating_sub(after);
            println!("  CHARGED: {}", format_amount(charged));

            check("quote matches charge", charged == quote.estimated_cost)?;
            check("same amount on both legs", straddle.long_call.amount == straddle.long_put.amount)?;

            let custody = venue.custody().await?;
            check("strategy holds no idle funds", custody.is_settled())?;
            check("every position is paired", custody.unpaired().is_empty())?;
            println!();
        }

        let custody = venue.custody().await?;
        println!(
            "Done: {} straddles held, {} positions",
            custody.straddle_count(),
            custody.positions.len()
        );
        Ok(())
    })
}

fn check(label: &str, ok: bool) -> Result<()> {
    if !ok {
        bail!("check failed: {label}");
    }
    println!("  OK: {label}");
    Ok(())
}

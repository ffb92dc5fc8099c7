use std::collections::HashSet;

use alloy::primitives::{Address, U256};
use alloy::sol;
use anyhow::{Context, Result, bail};
use async_trait::async_trait;
use tracing::info;

use super::evm::{self, IERC20};
use super::{BoardListing, StraddleVenue};
use crate::model::{
    Board, BoardId, OptionType, Position, PositionId, PositionState, Strike, StrikeId, TradeParams,
    TradeResult,
};
use crate::run::config::RuntimeConfig;
use crate::strategy::{CostBound, CustodyReport, MinCollateral, Quote, Straddle, StraddleError};

// ── Lyra market interfaces ─────────────────────────────────────────

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IOptionMarket {
        struct TradeInputParameters {
            uint256 strikeId;
            uint256 positionId;
            uint256 iterations;
            uint8 optionType;
            uint256 amount;
            uint256 setCollateralTo;
            uint256 minTotalCost;
            uint256 maxTotalCost;
            address referrer;
        }

        struct OpenResult {
            uint256 positionId;
            uint256 totalCost;
            uint256 totalFee;
        }

        struct StrikeInfo {
            uint256 id;
            uint256 strikePrice;
            uint256 skew;
            uint256 longCall;
            uint256 shortCallBase;
            uint256 shortCallQuote;
            uint256 longPut;
            uint256 shortPut;
            uint256 boardId;
        }

        struct OptionBoard {
            uint256 id;
            uint256 expiry;
            uint256 iv;
            bool frozen;
            uint256[] strikeIds;
        }

        function getLiveBoards() external view returns (uint256[] memory);
        function getBoardStrikes(uint256 boardId) external view returns (uint256[] memory);
        function getStrike(uint256 strikeId) external view returns (StrikeInfo memory);
        function getOptionBoard(uint256 boardId) external view returns (OptionBoard memory);
        function openPosition(TradeInputParameters memory params) external returns (OpenResult memory);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IOptionToken {
        struct OptionPosition {
            uint256 positionId;
            uint256 strikeId;
            uint8 optionType;
            uint256 amount;
            uint256 collateral;
            uint8 state;
        }

        function getOwnerPositions(address target) external view returns (OptionPosition[] memory);
        function balanceOf(address owner) external view returns (uint256);
    }
}

sol! {
    #[allow(missing_docs)]
    #[sol(rpc)]
    contract IStraddleStrategy {
        function getMinCollateral(uint256 strikeId, uint256 size) external view returns (uint256 callCollateral, uint256 putCollateral);
        function quoteBuyStraddle(uint256 strikeId, uint256 size) external returns (uint256 totalCost);
        function buyStraddle(uint256 strikeId, uint256 size, uint256 maxCost) external;
    }
}

// ── Live venue ──────────────────────────────────────────────────────

/// Straddle venue backed by a deployed `StraddleStrategy` contract.
///
/// Atomicity comes from the contract's single transaction; this client
/// approves the quote asset, submits, and reads the result back.
pub struct LyraStraddle {
    rpc_url: String,
    private_key: Option<String>,
    trader: Address,
    option_market: Address,
    option_token: Address,
    quote_asset: Address,
    strategy: Address,
    dry_run: bool,
}

impl LyraStraddle {
    pub fn new(config: &RuntimeConfig) -> Result<Self> {
        let addrs = config.deployment.addresses()?;
        let chain = config.deployment.chain.resolved();
        let rpc_url = chain
            .rpc_url()
            .with_context(|| format!("chain '{chain}' has no RPC URL"))?
            .to_string();

        Ok(LyraStraddle {
            rpc_url,
            private_key: config.private_key.clone(),
            trader: config.wallet_address.unwrap_or(Address::ZERO),
            option_market: addrs.option_market,
            option_token: addrs.option_token,
            quote_asset: addrs.quote_asset,
            strategy: addrs.straddle_strategy,
            dry_run: config.dry_run,
        })
    }

    fn private_key(&self) -> Result<&str> {
        if self.dry_run {
            bail!("dry run: refusing to send transactions");
        }
        self.private_key
            .as_deref()
            .context("this command sends transactions: set STRADDLE_FLOW_PRIVATE_KEY")
    }

    async fn owner_positions(&self, owner: Address) -> Result<Vec<Position>> {
        let rp = evm::read_provider(&self.rpc_url)?;
        let token = IOptionToken::new(self.option_token, &rp);
        let raw = token
            .getOwnerPositions(owner)
            .call()
            .await
            .context("optionToken.getOwnerPositions() failed")?;
        raw.into_iter().map(position_from_abi).collect()
    }

    async fn approve(&self, spender: Address, amount: U256) -> Result<()> {
        let provider = evm::signing_provider(self.private_key()?, &self.rpc_url)?;
        let erc20 = IERC20::new(self.quote_asset, &provider);
        let pending = erc20
            .approve(spender, amount)
            .send()
            .await
            .context("quote asset approve failed")?;
        let receipt = pending.get_receipt().await.context("approve receipt")?;
        evm::require_success(&receipt, "approve")?;
        println!(
            "  LYRA: approve {} -> {} tx: {:?}",
            amount,
            evm::short_addr(&spender),
            receipt.transaction_hash
        );
        Ok(())
    }
}

#[async_trait]
impl StraddleVenue for LyraStraddle {
    fn trader(&self) -> Address {
        self.trader
    }

    fn strategy(&self) -> Address {
        self.strategy
    }

    async fn boards(&self) -> Result<Vec<BoardListing>> {
        let rp = evm::read_provider(&self.rpc_url)?;
        let market = IOptionMarket::new(self.option_market, &rp);

        let board_ids = market
            .getLiveBoards()
            .call()
            .await
            .context("optionMarket.getLiveBoards() failed")?;

        let mut listings = Vec::with_capacity(board_ids.len());
        for raw_id in board_ids {
            let ob = market
                .getOptionBoard(raw_id)
                .call()
                .await
                .with_context(|| format!("optionMarket.getOptionBoard({raw_id}) failed"))?;

            let strike_ids = market
                .getBoardStrikes(raw_id)
                .call()
                .await
                .with_context(|| format!("optionMarket.getBoardStrikes({raw_id}) failed"))?;

            let mut strikes = Vec::with_capacity(strike_ids.len());
            for sid in &strike_ids {
                let s = market
                    .getStrike(*sid)
                    .call()
                    .await
                    .with_context(|| format!("optionMarket.getStrike({sid}) failed"))?;
                strikes.push(Strike {
                    id: StrikeId(evm::to_u64(s.id, "strike id")?),
                    board_id: BoardId(evm::to_u64(s.boardId, "board id")?),
                    strike_price: s.strikePrice,
                });
            }

            let board = Board {
                id: BoardId(evm::to_u64(ob.id, "board id")?),
                expiry: evm::to_u64(ob.expiry, "board expiry")?,
                frozen: ob.frozen,
                strike_ids: strikes.iter().map(|s| s.id).collect(),
            };
            listings.push(BoardListing { board, strikes });
        }
        Ok(listings)
    }

    async fn min_collateral(&self, strike: StrikeId, amount: U256) -> Result<MinCollateral> {
        if amount.is_zero() {
            return Err(StraddleError::InvalidAmount.into());
        }
        let rp = evm::read_provider(&self.rpc_url)?;
        let strategy = IStraddleStrategy::new(self.strategy, &rp);
        let ret = strategy
            .getMinCollateral(strike.into(), amount)
            .call()
            .await
            .with_context(|| format!("straddleStrategy.getMinCollateral({strike}) failed"))?;
        Ok(MinCollateral {
            call_collateral: ret.callCollateral,
            put_collateral: ret.putCollateral,
        })
    }

    async fn quote(&mut self, strike: StrikeId, amount: U256) -> Result<Quote> {
        let legs = self.min_collateral(strike, amount).await?;

        let rp = evm::read_provider(&self.rpc_url)?;
        let strategy = IStraddleStrategy::new(self.strategy, &rp);
        let estimated_cost = strategy
            .quoteBuyStraddle(strike.into(), amount)
            .call()
            .await
            .with_context(|| format!("straddleStrategy.quoteBuyStraddle({strike}) failed"))?;

        Ok(Quote {
            strike_id: strike,
            amount,
            call_cost: legs.call_collateral,
            put_cost: legs.put_collateral,
            estimated_cost,
            quoted_at: u64::try_from(chrono::Utc::now().timestamp()).unwrap_or_default(),
        })
    }

    async fn buy(&mut self, strike: StrikeId, amount: U256, bound: CostBound) -> Result<Straddle> {
        let legs = self.min_collateral(strike, amount).await?;
        let required = legs.total();
        if let Some(max_cost) = bound.max_cost() {
            if required > max_cost {
                return Err(StraddleError::CostExceeded { required, max_cost }.into());
            }
        }

        let rp = evm::read_provider(&self.rpc_url)?;
        let quote_asset = IERC20::new(self.quote_asset, &rp);
        let balance_before = quote_asset
            .balanceOf(self.trader)
            .call()
            .await
            .context("quoteAsset.balanceOf() failed")?;
        let held_before: HashSet<PositionId> = self
            .owner_positions(self.strategy)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();

        self.approve(self.strategy, bound.max_cost().unwrap_or(required))
            .await?;

        let provider = evm::signing_provider(self.private_key()?, &self.rpc_url)?;
        let strategy = IStraddleStrategy::new(self.strategy, &provider);
        let max_cost = bound.max_cost().unwrap_or(U256::MAX);
        let pending = strategy
            .buyStraddle(strike.into(), amount, max_cost)
            .send()
            .await
            .context("buyStraddle failed")?;
        let receipt = pending.get_receipt().await.context("buyStraddle receipt")?;
        evm::require_success(&receipt, "buyStraddle")?;
        println!("  LYRA: buyStraddle tx: {:?}", receipt.transaction_hash);

        let balance_after = quote_asset
            .balanceOf(self.trader)
            .call()
            .await
            .context("quoteAsset.balanceOf() failed")?;

        let new_positions: Vec<Position> = self
            .owner_positions(self.strategy)
            .await?
            .into_iter()
            .filter(|p| !held_before.contains(&p.id) && p.strike_id == strike && p.amount == amount)
            .collect();
        let pick = |ty: OptionType| {
            new_positions
                .iter()
                .find(|p| p.option_type == ty)
                .cloned()
                .with_context(|| format!("no new {ty} position found after buyStraddle"))
        };
        let long_call = pick(OptionType::LongCall)?;
        let long_put = pick(OptionType::LongPut)?;

        let total_cost = balance_before.saturating_sub(balance_after);
        info!(strike = %strike, cost = %total_cost, "live straddle bought");

        // The contract does not report per-leg costs; these are the pre-trade prices.
        Ok(Straddle {
            long_call,
            long_put,
            call_cost: legs.call_collateral,
            put_cost: legs.put_collateral,
            total_cost,
        })
    }

    async fn open_position(&mut self, params: &TradeParams) -> Result<TradeResult> {
        let abi_params = IOptionMarket::TradeInputParameters {
            strikeId: params.strike_id.into(),
            positionId: params.position_id.into(),
            iterations: U256::from(params.iterations),
            optionType: params.option_type.as_u8(),
            amount: params.amount,
            setCollateralTo: params.set_collateral_to,
            minTotalCost: params.min_total_cost,
            maxTotalCost: params.max_total_cost,
            referrer: params.referrer,
        };

        // openPosition pulls from msg.sender, so the allowance must exist
        // before the eth_call below.
        self.approve(self.option_market, params.max_total_cost).await?;

        // Simulate before sending: the receipt does not carry the return value.
        let rp = evm::read_provider(&self.rpc_url)?;
        let simulated = IOptionMarket::new(self.option_market, &rp)
            .openPosition(abi_params.clone())
            .from(self.trader)
            .call()
            .await
            .context("optionMarket.openPosition() simulation failed")?;

        let provider = evm::signing_provider(self.private_key()?, &self.rpc_url)?;
        let market = IOptionMarket::new(self.option_market, &provider);
        let pending = market
            .openPosition(abi_params)
            .send()
            .await
            .context("openPosition failed")?;
        let receipt = pending.get_receipt().await.context("openPosition receipt")?;
        evm::require_success(&receipt, "openPosition")?;
        println!("  LYRA: openPosition tx: {:?}", receipt.transaction_hash);

        let position_id = PositionId(evm::to_u64(simulated.positionId, "position id")?);
        let position = self
            .owner_positions(self.trader)
            .await?
            .into_iter()
            .find(|p| p.id == position_id);
        let Some(position) = position else {
            bail!("position {position_id} not owned by trader after openPosition");
        };

        Ok(TradeResult {
            position,
            total_cost: simulated.totalCost,
            total_fee: simulated.totalFee,
        })
    }

    async fn settlement_balance(&self, owner: Address) -> Result<U256> {
        let rp = evm::read_provider(&self.rpc_url)?;
        let erc20 = IERC20::new(self.quote_asset, &rp);
        erc20
            .balanceOf(owner)
            .call()
            .await
            .context("quoteAsset.balanceOf() failed")
    }

    async fn custody(&self) -> Result<CustodyReport> {
        Ok(CustodyReport {
            settlement_balance: self.settlement_balance(self.strategy).await?,
            positions: self.owner_positions(self.strategy).await?,
        })
    }
}

fn position_from_abi(raw: IOptionToken::OptionPosition) -> Result<Position> {
    let option_type = OptionType::try_from(raw.optionType)
        .map_err(|v| anyhow::anyhow!("unknown option type {v}"))?;
    let state = PositionState::try_from(raw.state)
        .map_err(|v| anyhow::anyhow!("unknown position state {v}"))?;
    Ok(Position {
        id: PositionId(evm::to_u64(raw.positionId, "position id")?),
        strike_id: StrikeId(evm::to_u64(raw.strikeId, "strike id")?),
        option_type,
        amount: raw.amount,
        collateral: raw.collateral,
        state,
    })
}

mod cli;
mod logging;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use cosmwasm_std::{Addr, Uint256};
use std::time::{SystemTime, UNIX_EPOCH};

use vault_core::epoch::{Vault, VaultConfig};
use vault_core::fixed::Fixed64x64;
use vault_core::time::UnixTimestamp;
use vault_sim::{MockCollateralToken, MockExchangeHelper, MockPool, MockPricer};

use cli::{Opt, Sub, SimulateOpt};
use output::EpochRow;

type SimVault = Vault<MockPool, MockPricer, MockExchangeHelper, MockCollateralToken>;

fn main() -> Result<()> {
    let opt = Opt::parse();
    logging::init_logger(opt.verbose)?;

    match opt.sub {
        Sub::Simulate(sim) => run_simulate(sim),
    }
}

fn run_simulate(opt: SimulateOpt) -> Result<()> {
    let keeper = Addr::unchecked("keeper");
    let alice = Addr::unchecked("alice");
    let buyer = Addr::unchecked("buyer");

    let config = VaultConfig {
        owner: Addr::unchecked("owner"),
        keeper: keeper.clone(),
        fee_recipient: Addr::unchecked("fee_recipient"),
        queue_address: Addr::unchecked("vault/queue"),
        is_call: opt.is_call,
        reserve_rate: parse_decimal(&opt.reserve_rate, "reserve-rate")?,
        performance_fee: parse_decimal(&opt.performance_fee, "performance-fee")?,
        withdrawal_fee: parse_decimal(&opt.withdrawal_fee, "withdrawal-fee")?,
        delta: parse_decimal(&opt.delta, "delta")?,
        delta_offset: parse_decimal(&opt.delta_offset, "delta-offset")?,
        start_offset: 0,
        end_offset: 3_600,
        min_order_size: Uint256::from(1u128),
        base_decimals: 18,
        underlying_decimals: 18,
    };

    let spot = parse_decimal(&opt.spot, "spot")?;
    let volatility = parse_decimal(&opt.volatility, "volatility")?;

    let mut vault: SimVault = Vault::new(
        Addr::unchecked("vault"),
        config,
        MockPool::new(18, 18),
        MockPricer::new(spot, volatility),
        MockExchangeHelper::new(),
        MockCollateralToken::new(18),
    );

    vault.collateral_token.mint(&alice, Uint256::from(opt.deposit_amount));
    vault.collateral_token.mint(&buyer, Uint256::from(opt.buyer_order_size) * Uint256::from(opt.weeks as u128 + 1));
    vault.deposit(&alice, Uint256::from(opt.deposit_amount)).context("initial deposit")?;

    let mut now = UnixTimestamp::from_seconds(opt.start_time.unwrap_or_else(wall_clock_seconds))
        .next_friday()?
        .checked_add_seconds(300)?;

    let mut rows = Vec::with_capacity(opt.weeks as usize);
    for _ in 0..opt.weeks {
        vault.initialize_epoch(&keeper, now).context("initialize_epoch")?;
        let epoch = vault.get_epoch();
        vault.initialize_auction(&keeper, now).context("initialize_auction")?;

        let mut clearing_price = Fixed64x64::ZERO;
        let mut sold = Uint256::zero();
        if vault.get_status(epoch) == Some(vault_core::auction::AuctionStatus::Initialized) {
            let (_, price, cost) = vault
                .add_market_order(&buyer, epoch, Uint256::from(opt.buyer_order_size), Uint256::MAX, now)
                .context("buyer market order")?;
            clearing_price = price;
            sold = vault.get_total_contracts_sold(epoch);
            tracing::info!(epoch, %price, %cost, "market order filled");
        } else {
            tracing::warn!(epoch, "auction was cancelled before any orders were placed");
        }

        vault.process_auction(&keeper, now).context("process_auction")?;

        rows.push(EpochRow {
            epoch,
            status: format!("{:?}", vault.get_status(epoch).unwrap_or(vault_core::auction::AuctionStatus::Uninitialized)),
            total_assets: vault.total_assets().context("total_assets")?.to_string(),
            total_contracts_sold: sold.to_string(),
            clearing_price: clearing_price.to_string(),
            withdrawal_lock_released: vault.auction_processed,
        });

        now = now.next_friday()?.checked_add_seconds(300)?;
    }

    let table = output::render_epoch_table(&rows);
    println!("{table}");
    Ok(())
}

fn wall_clock_seconds() -> i64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map(|d| d.as_secs() as i64).unwrap_or(0)
}

fn parse_decimal(raw: &str, field: &str) -> Result<Fixed64x64> {
    Fixed64x64::from_decimal_str(raw).with_context(|| format!("invalid decimal for --{field}: {raw}"))
}

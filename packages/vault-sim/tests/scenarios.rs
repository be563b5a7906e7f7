//! End-to-end scenarios driving the real `Vault` aggregate against the
//! in-memory collaborators in this crate.

use cosmwasm_std::{Addr, Uint256};
use vault_core::epoch::{Vault, VaultConfig};
use vault_core::fixed::Fixed64x64;
use vault_core::time::UnixTimestamp;
use vault_sim::{MockCollateralToken, MockExchangeHelper, MockPool, MockPricer};

fn dec(s: &str) -> Fixed64x64 {
    Fixed64x64::from_decimal_str(s).unwrap()
}

fn addr(s: &str) -> Addr {
    Addr::unchecked(s)
}

type TestVault = Vault<MockPool, MockPricer, MockExchangeHelper, MockCollateralToken>;

fn new_vault() -> TestVault {
    let config = VaultConfig {
        owner: addr("owner"),
        keeper: addr("keeper"),
        fee_recipient: addr("fee_recipient"),
        queue_address: addr("vault/queue"),
        is_call: true,
        reserve_rate: dec("0.1"),
        performance_fee: dec("0.1"),
        withdrawal_fee: dec("0.01"),
        delta: dec("0.3"),
        delta_offset: dec("0.05"),
        start_offset: 0,
        end_offset: 3_600,
        min_order_size: Uint256::from(1u128),
        base_decimals: 18,
        underlying_decimals: 18,
    };
    Vault::new(
        addr("vault"),
        config,
        MockPool::new(18, 18),
        MockPricer::new(dec("2000"), dec("0.6")),
        MockExchangeHelper::new(),
        MockCollateralToken::new(18),
    )
}

/// 2024-01-05 is a Friday; 08:05 UTC puts us just past that week's cutoff.
const FRIDAY_0805: i64 = 1_704_441_600 + 300;

#[test]
fn deposit_then_cancel_returns_the_full_amount() {
    let mut vault = new_vault();
    let alice = addr("alice");
    vault.collateral_token.mint(&alice, Uint256::from(10_000u128));

    vault.deposit(&alice, Uint256::from(5_000u128)).unwrap();
    assert_eq!(vault.collateral_token.balance_of(&alice), Uint256::from(5_000u128));

    vault.cancel_deposit(&alice, Uint256::from(5_000u128)).unwrap();
    assert_eq!(vault.collateral_token.balance_of(&alice), Uint256::from(10_000u128));
}

#[test]
fn first_epoch_deposit_mints_shares_one_to_one_after_initialize_epoch() {
    let mut vault = new_vault();
    let alice = addr("alice");
    vault.collateral_token.mint(&alice, Uint256::from(100_000u128));
    vault.deposit(&alice, Uint256::from(100_000u128)).unwrap();

    let now = UnixTimestamp::from_seconds(FRIDAY_0805);
    vault.initialize_epoch(&addr("keeper"), now).unwrap();

    assert_eq!(vault.get_epoch(), 1);
    assert_eq!(vault.shares.total_supply, Uint256::from(100_000u128));
    assert_eq!(vault.total_collateral().unwrap(), Uint256::from(90_000u128));
}

#[test]
fn full_weekly_cycle_runs_an_auction_and_releases_the_withdrawal_lock() {
    let mut vault = new_vault();
    vault.config.reserve_rate = Fixed64x64::ZERO;
    let alice = addr("alice");
    let buyer = addr("buyer");
    vault.collateral_token.mint(&alice, Uint256::from(1_000_000u128));
    vault.collateral_token.mint(&buyer, Uint256::from(1_000_000u128));

    vault.deposit(&alice, Uint256::from(1_000_000u128)).unwrap();

    let now = UnixTimestamp::from_seconds(FRIDAY_0805);
    vault.initialize_epoch(&addr("keeper"), now).unwrap();
    assert_eq!(vault.get_epoch(), 1);

    vault.initialize_auction(&addr("keeper"), now).unwrap();
    let auction_status = vault.get_status(1).unwrap();
    assert_eq!(auction_status, vault_core::auction::AuctionStatus::Initialized);

    let trade_time = now;
    let (_, price, cost) = vault
        .add_market_order(&buyer, 1, Uint256::from(1_000_000u128), Uint256::from(1_000_000u128), trade_time)
        .unwrap();
    assert!(cost > Uint256::zero());
    assert!(price.is_positive());
    assert!(vault.is_finalized(1));

    vault.process_auction(&addr("keeper"), trade_time).unwrap();
    assert!(vault.auction_processed);

    // Withdrawal lock has now been released for this cycle.
    let shares = vault.redeem_max(&alice, &alice, trade_time).unwrap();
    assert_eq!(shares, Uint256::zero(), "alice's shares were already minted by initialize_epoch, nothing left queued");

    let hold_release = trade_time.checked_add_seconds(vault_core::auction::WITHDRAW_HOLD_SECONDS).unwrap();
    let (refund, fill) = vault.withdraw(&buyer, 1, hold_release).unwrap();
    assert_eq!(fill, Uint256::from(1_000_000u128));
    assert_eq!(refund, Uint256::zero(), "buyer's single order fully cleared at the curve price it paid");
}

#[test]
fn bad_auction_prices_cancel_and_refund_in_full() {
    let mut vault = new_vault();
    let alice = addr("alice");
    vault.collateral_token.mint(&alice, Uint256::from(1_000_000u128));
    vault.deposit(&alice, Uint256::from(1_000_000u128)).unwrap();

    let now = UnixTimestamp::from_seconds(FRIDAY_0805);
    vault.initialize_epoch(&addr("keeper"), now).unwrap();
    vault.initialize_auction(&addr("keeper"), now).unwrap();

    // Force a cancellation by handing the auction an invalid price pair
    // directly (bypassing the pricer-derived max/min), exercising the
    // same state transition `initialize_auction`'s own derivation would
    // hit on a degenerate quote.
    {
        let auction = vault.auctions.get_mut(&1).unwrap();
        auction.set_auction_prices(1, dec("1"), dec("5")).unwrap();
    }
    assert!(vault.is_cancelled(1));

    vault.process_auction(&addr("keeper"), now).unwrap();
    assert!(vault.auction_processed);
}

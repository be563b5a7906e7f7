//! Share and collateral accounting: conversions between collateral,
//! short-option exposure and depositor shares, plus the fee computations
//! that run at epoch boundaries. These are pure functions over the
//! vault's balances so they can be tested without wiring a collaborator
//! stack.

use cosmwasm_std::{Addr, Uint256};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::VaultError;
use crate::fixed::Fixed64x64;

/// Fungible vault-share ledger. Deliberately minimal: the vault itself is
/// the only minter/burner, there is no allowance system, because nothing
/// in scope transfers shares between depositors directly.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShareLedger {
    balances: HashMap<Addr, Uint256>,
    pub total_supply: Uint256,
}

impl ShareLedger {
    pub fn balance_of(&self, holder: &Addr) -> Uint256 {
        self.balances.get(holder).copied().unwrap_or(Uint256::zero())
    }

    pub fn mint(&mut self, to: &Addr, amount: Uint256) {
        if amount.is_zero() {
            return;
        }
        *self.balances.entry(to.clone()).or_insert(Uint256::zero()) += amount;
        self.total_supply += amount;
    }

    pub fn burn(&mut self, from: &Addr, amount: Uint256) -> Result<(), VaultError> {
        let bal = self.balance_of(from);
        if amount > bal {
            return Err(VaultError::ValueExceedsMaximum);
        }
        *self.balances.get_mut(from).unwrap() -= amount;
        self.total_supply = self
            .total_supply
            .checked_sub(amount)
            .map_err(|_| VaultError::Overflow)?;
        Ok(())
    }

    /// Moves `amount` shares from `from` to `to` without touching
    /// `total_supply`. Used when the queue's pooled shares are handed out
    /// to individual depositors at redemption time.
    pub fn transfer(&mut self, from: &Addr, to: &Addr, amount: Uint256) -> Result<(), VaultError> {
        if amount.is_zero() {
            return Ok(());
        }
        let bal = self.balance_of(from);
        if amount > bal {
            return Err(VaultError::ValueExceedsMaximum);
        }
        *self.balances.get_mut(from).unwrap() -= amount;
        *self.balances.entry(to.clone()).or_insert(Uint256::zero()) += amount;
        Ok(())
    }
}

pub fn total_reserves(collateral_balance: Uint256, reserve_rate: Fixed64x64) -> Result<Uint256, VaultError> {
    reserve_rate.muli(collateral_balance)
}

pub fn total_collateral(collateral_balance: Uint256, reserve_rate: Fixed64x64) -> Result<Uint256, VaultError> {
    let reserves = total_reserves(collateral_balance, reserve_rate)?;
    collateral_balance
        .checked_sub(reserves)
        .map_err(|_| VaultError::Overflow)
}

pub fn total_short_as_collateral(
    short_contracts: Uint256,
    is_call: bool,
    underlying_decimals: u32,
    base_decimals: u32,
    strike: Fixed64x64,
) -> Result<Uint256, VaultError> {
    Fixed64x64::from_contracts_to_collateral(
        short_contracts,
        is_call,
        underlying_decimals,
        base_decimals,
        strike,
    )
}

pub fn total_assets(total_collateral: Uint256, total_short_as_collateral: Uint256) -> Result<Uint256, VaultError> {
    total_collateral
        .checked_add(total_short_as_collateral)
        .map_err(|_| VaultError::Overflow)
}

/// `shares = assets * totalSupply / totalAssets`, the standard
/// vault-share conversion; `assets` when supply is empty.
pub fn convert_to_shares(
    assets: Uint256,
    total_supply: Uint256,
    total_assets: Uint256,
) -> Result<Uint256, VaultError> {
    if total_supply.is_zero() {
        return Ok(assets);
    }
    if total_assets.is_zero() {
        return Err(VaultError::DivisionByZero);
    }
    assets
        .checked_mul(total_supply)
        .map_err(|_| VaultError::Overflow)?
        .checked_div(total_assets)
        .map_err(|_| VaultError::DivisionByZero)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WithdrawDistribution {
    pub collateral: Uint256,
    pub short_contracts: Uint256,
    pub withdrawal_fee_collateral: Uint256,
    pub withdrawal_fee_short_contracts: Uint256,
    pub shares_burned: Uint256,
}

/// Splits `asset_amount` proportionally between collateral and
/// short-option exposure, carves out the withdrawal fee from each leg,
/// and computes the shares that must be burned from `owner`.
#[allow(clippy::too_many_arguments)]
pub fn compute_withdraw_distribution(
    asset_amount: Uint256,
    total_collateral: Uint256,
    total_short_as_collateral: Uint256,
    total_assets: Uint256,
    total_share_supply: Uint256,
    withdrawal_fee: Fixed64x64,
    is_call: bool,
    base_decimals: u32,
    underlying_decimals: u32,
    strike: Fixed64x64,
) -> Result<WithdrawDistribution, VaultError> {
    if total_assets.is_zero() {
        return Err(VaultError::DivisionByZero);
    }
    let collateral_portion = total_collateral
        .checked_mul(asset_amount)
        .map_err(|_| VaultError::Overflow)?
        .checked_div(total_assets)
        .map_err(|_| VaultError::DivisionByZero)?;
    let short_collateral_portion = total_short_as_collateral
        .checked_mul(asset_amount)
        .map_err(|_| VaultError::Overflow)?
        .checked_div(total_assets)
        .map_err(|_| VaultError::DivisionByZero)?;
    let short_contracts = Fixed64x64::from_collateral_to_contracts(
        short_collateral_portion,
        is_call,
        base_decimals,
        underlying_decimals,
        strike,
    )?;

    let withdrawal_fee_collateral = withdrawal_fee.muli(collateral_portion)?;
    let withdrawal_fee_short_contracts = withdrawal_fee.muli(short_contracts)?;

    let shares_burned = convert_to_shares(asset_amount, total_share_supply, total_assets)?;

    Ok(WithdrawDistribution {
        collateral: collateral_portion
            .checked_sub(withdrawal_fee_collateral)
            .map_err(|_| VaultError::Overflow)?,
        short_contracts: short_contracts
            .checked_sub(withdrawal_fee_short_contracts)
            .map_err(|_| VaultError::Overflow)?,
        withdrawal_fee_collateral,
        withdrawal_fee_short_contracts,
        shares_burned,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PerformanceFeeOutcome {
    pub net_income: Uint256,
    pub fee: Uint256,
}

/// `adjustedTotal = totalAssets + totalWithdrawals`; a fee is owed only
/// if that exceeds the snapshot taken at the last `processAuction`.
pub fn collect_performance_fee(
    total_assets: Uint256,
    total_withdrawals: Uint256,
    last_total_assets: Uint256,
    performance_fee: Fixed64x64,
) -> Result<Option<PerformanceFeeOutcome>, VaultError> {
    let adjusted_total = total_assets
        .checked_add(total_withdrawals)
        .map_err(|_| VaultError::Overflow)?;
    if adjusted_total <= last_total_assets {
        return Ok(None);
    }
    let net_income = adjusted_total
        .checked_sub(last_total_assets)
        .map_err(|_| VaultError::Overflow)?;
    let fee = performance_fee.muli(net_income)?;
    Ok(Some(PerformanceFeeOutcome { net_income, fee }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Fixed64x64 {
        Fixed64x64::from_decimal_str(s).unwrap()
    }

    #[test]
    fn total_assets_equals_collateral_plus_short() {
        let collateral = total_collateral(Uint256::from(1_000u128), dec("0.1")).unwrap();
        assert_eq!(collateral, Uint256::from(900u128));
        let short = total_short_as_collateral(Uint256::from(10u128), true, 18, 18, dec("2000")).unwrap();
        assert_eq!(short, Uint256::from(10u128));
        assert_eq!(total_assets(collateral, short).unwrap(), Uint256::from(910u128));
    }

    #[test]
    fn no_performance_fee_when_assets_did_not_grow() {
        let outcome =
            collect_performance_fee(Uint256::from(1_000u128), Uint256::zero(), Uint256::from(1_000u128), dec("0.1"))
                .unwrap();
        assert!(outcome.is_none());
    }

    #[test]
    fn performance_fee_taken_on_net_income() {
        let outcome =
            collect_performance_fee(Uint256::from(1_100u128), Uint256::zero(), Uint256::from(1_000u128), dec("0.1"))
                .unwrap()
                .unwrap();
        assert_eq!(outcome.net_income, Uint256::from(100u128));
        assert_eq!(outcome.fee, Uint256::from(10u128));
    }

    #[test]
    fn share_ledger_mint_and_burn() {
        let mut ledger = ShareLedger::default();
        let alice = Addr::unchecked("alice");
        ledger.mint(&alice, Uint256::from(100u128));
        assert_eq!(ledger.balance_of(&alice), Uint256::from(100u128));
        ledger.burn(&alice, Uint256::from(40u128)).unwrap();
        assert_eq!(ledger.balance_of(&alice), Uint256::from(60u128));
        assert_eq!(ledger.total_supply, Uint256::from(60u128));
    }

    #[test]
    fn burning_more_than_balance_fails() {
        let mut ledger = ShareLedger::default();
        let alice = Addr::unchecked("alice");
        ledger.mint(&alice, Uint256::from(10u128));
        assert_eq!(
            ledger.burn(&alice, Uint256::from(20u128)).unwrap_err(),
            VaultError::ValueExceedsMaximum
        );
    }
}

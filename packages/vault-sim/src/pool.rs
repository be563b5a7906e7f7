//! Bare-bones options pool: a fungible token ledger keyed by `(holder,
//! token_id)`, plus the divestment-timestamp and post-expiry-spot
//! bookkeeping the vault engine reads back.

use std::collections::HashMap;

use cosmwasm_std::{Addr, Uint256};
use vault_core::collaborators::{make_token_id, Pool, PoolSettings, TokenType};
use vault_core::error::VaultError;
use vault_core::fixed::Fixed64x64;
use vault_core::time::UnixTimestamp;

#[derive(Debug, Clone)]
pub struct MockPool {
    settings: PoolSettings,
    balances: HashMap<(Addr, Uint256), Uint256>,
    divestment_timestamps: HashMap<(Addr, bool), UnixTimestamp>,
    settlement_spot: Option<Fixed64x64>,
}

impl MockPool {
    pub fn new(base_decimals: u32, underlying_decimals: u32) -> Self {
        MockPool {
            settings: PoolSettings {
                base_decimals,
                underlying_decimals,
            },
            balances: HashMap::new(),
            divestment_timestamps: HashMap::new(),
            settlement_spot: None,
        }
    }

    /// Test/ops hook: sets the spot observed after expiry, used to settle
    /// exercised options on withdraw.
    pub fn set_settlement_spot(&mut self, spot: Fixed64x64) {
        self.settlement_spot = Some(spot);
    }

    pub fn divestment_timestamp(&self, owner: &Addr, is_call: bool) -> Option<UnixTimestamp> {
        self.divestment_timestamps.get(&(owner.clone(), is_call)).copied()
    }
}

impl Pool for MockPool {
    fn get_pool_settings(&self) -> PoolSettings {
        self.settings
    }

    fn write_from(
        &mut self,
        from: &Addr,
        to: &Addr,
        expiry: UnixTimestamp,
        strike: Fixed64x64,
        size: Uint256,
        is_call: bool,
    ) -> Result<(), VaultError> {
        let long_id = make_token_id(TokenType::long(is_call), expiry, strike);
        let short_id = make_token_id(TokenType::short(is_call), expiry, strike);
        *self.balances.entry((to.clone(), long_id)).or_insert(Uint256::zero()) += size;
        *self.balances.entry((from.clone(), short_id)).or_insert(Uint256::zero()) += size;
        Ok(())
    }

    fn set_divestment_timestamp(
        &mut self,
        owner: &Addr,
        ts: UnixTimestamp,
        is_call: bool,
    ) -> Result<(), VaultError> {
        self.divestment_timestamps.insert((owner.clone(), is_call), ts);
        Ok(())
    }

    fn withdraw_reserved_liquidity(
        &mut self,
        _to: &Addr,
        _amount: Uint256,
        _is_call: bool,
    ) -> Result<(), VaultError> {
        // The reserved-liquidity bucket lives on the collateral token
        // ledger (see `total_reserves`); the pool side of the sweep has
        // nothing further to account for in this in-memory substrate.
        Ok(())
    }

    fn get_price_after(&self, _expiry: UnixTimestamp) -> Result<Fixed64x64, VaultError> {
        self.settlement_spot.ok_or(VaultError::InvalidArgument)
    }

    fn balance_of(&self, holder: &Addr, token_id: Uint256) -> Uint256 {
        self.balances.get(&(holder.clone(), token_id)).copied().unwrap_or(Uint256::zero())
    }

    fn safe_transfer_from(
        &mut self,
        from: &Addr,
        to: &Addr,
        token_id: Uint256,
        amount: Uint256,
    ) -> Result<(), VaultError> {
        let key = (from.clone(), token_id);
        let bal = self.balances.get(&key).copied().unwrap_or(Uint256::zero());
        if amount > bal {
            return Err(VaultError::ValueExceedsMaximum);
        }
        *self.balances.get_mut(&key).unwrap() -= amount;
        *self.balances.entry((to.clone(), token_id)).or_insert(Uint256::zero()) += amount;
        Ok(())
    }
}

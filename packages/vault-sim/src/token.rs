//! In-memory ERC20-like collateral token ledger.

use std::collections::HashMap;

use cosmwasm_std::{Addr, Uint256};
use vault_core::collaborators::CollateralToken;
use vault_core::error::VaultError;

#[derive(Debug, Clone)]
pub struct MockCollateralToken {
    decimals: u32,
    balances: HashMap<Addr, Uint256>,
}

impl MockCollateralToken {
    pub fn new(decimals: u32) -> Self {
        MockCollateralToken {
            decimals,
            balances: HashMap::new(),
        }
    }

    /// Test/ops hook: credits `holder` out of thin air (faucet), bypassing
    /// the `transfer` invariant that a sender must have the funds.
    pub fn mint(&mut self, holder: &Addr, amount: Uint256) {
        *self.balances.entry(holder.clone()).or_insert(Uint256::zero()) += amount;
    }
}

impl CollateralToken for MockCollateralToken {
    fn decimals(&self) -> u32 {
        self.decimals
    }

    fn balance_of(&self, holder: &Addr) -> Uint256 {
        self.balances.get(holder).copied().unwrap_or(Uint256::zero())
    }

    fn transfer(&mut self, from: &Addr, to: &Addr, amount: Uint256) -> Result<(), VaultError> {
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

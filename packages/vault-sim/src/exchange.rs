//! Flat-rate swap helper: exchanges an arbitrary named input token into
//! the vault's collateral token at a fixed, per-token rate.

use std::collections::HashMap;

use cosmwasm_std::{Addr, Uint256};
use vault_core::collaborators::ExchangeHelper;
use vault_core::error::VaultError;
use vault_core::fixed::Fixed64x64;

#[derive(Debug, Clone, Default)]
pub struct MockExchangeHelper {
    rates: HashMap<String, Fixed64x64>,
}

impl MockExchangeHelper {
    pub fn new() -> Self {
        MockExchangeHelper::default()
    }

    pub fn set_rate(&mut self, token_in: &str, collateral_per_unit: Fixed64x64) {
        self.rates.insert(token_in.to_string(), collateral_per_unit);
    }
}

impl ExchangeHelper for MockExchangeHelper {
    fn swap_with_token(
        &mut self,
        _caller: &Addr,
        token_in: &str,
        amount_in: Uint256,
        _min_amount_out: Uint256,
    ) -> Result<Uint256, VaultError> {
        let rate = self.rates.get(token_in).copied().ok_or(VaultError::InvalidArgument)?;
        rate.muli(amount_in)
    }
}

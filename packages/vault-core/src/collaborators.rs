//! Interfaces for the external collaborators this engine drives but does
//! not implement: the options pool, the pricer, the swap helper and the
//! fungible collateral token. Production callers wire these to whatever
//! chain or ledger actually holds the assets; `vault-sim` supplies
//! in-memory stand-ins for tests and the keeper CLI's dry-run mode.

use cosmwasm_std::{Addr, Uint256};
use serde::{Deserialize, Serialize};

use crate::error::VaultError;
use crate::fixed::Fixed64x64;
use crate::time::UnixTimestamp;

/// Upper-byte discriminant baked into option token ids, mirroring the
/// source's packing of token type into the top 8 bits of a 256-bit id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(u8)]
pub enum TokenType {
    LongCall = 0,
    ShortCall = 1,
    LongPut = 2,
    ShortPut = 3,
}

impl TokenType {
    pub fn long(is_call: bool) -> Self {
        if is_call {
            TokenType::LongCall
        } else {
            TokenType::LongPut
        }
    }

    pub fn short(is_call: bool) -> Self {
        if is_call {
            TokenType::ShortCall
        } else {
            TokenType::ShortPut
        }
    }
}

/// Packs `(tokenType, expiry, strike)` into a 256-bit fungible token id:
/// top byte is the type, next 8 bytes the expiry (unix seconds), next 16
/// bytes the strike's raw 64.64 bit pattern, the low 7 bytes reserved.
pub fn make_token_id(token_type: TokenType, expiry: UnixTimestamp, strike: Fixed64x64) -> Uint256 {
    let mut bytes = [0u8; 32];
    bytes[0] = token_type as u8;
    bytes[1..9].copy_from_slice(&(expiry.seconds() as u64).to_be_bytes());
    bytes[9..25].copy_from_slice(&(strike.raw() as u128).to_be_bytes());
    Uint256::new(bytes)
}

/// Free-liquidity and reserved-liquidity bucket ids the pool uses
/// internally; exposed here only so callers can request withdrawals from
/// the right bucket.
pub const UNDERLYING_FREE_LIQ: u8 = 0;
pub const BASE_FREE_LIQ: u8 = 1;
pub const UNDERLYING_RESERVED_LIQ: u8 = 2;
pub const BASE_RESERVED_LIQ: u8 = 3;

pub fn reserved_liquidity_id(is_call: bool) -> Uint256 {
    let marker = if is_call {
        UNDERLYING_RESERVED_LIQ
    } else {
        BASE_RESERVED_LIQ
    };
    Uint256::from(marker) << 248u32
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolSettings {
    pub base_decimals: u32,
    pub underlying_decimals: u32,
}

/// The options pool: issues long/short instruments against vault
/// collateral and reports the post-expiry settlement spot.
pub trait Pool {
    fn get_pool_settings(&self) -> PoolSettings;

    /// Mints `size` long tokens to `to` and `size` short tokens to
    /// `from`, consuming `from`'s approved collateral as backing.
    fn write_from(
        &mut self,
        from: &Addr,
        to: &Addr,
        expiry: UnixTimestamp,
        strike: Fixed64x64,
        size: Uint256,
        is_call: bool,
    ) -> Result<(), VaultError>;

    fn set_divestment_timestamp(
        &mut self,
        owner: &Addr,
        ts: UnixTimestamp,
        is_call: bool,
    ) -> Result<(), VaultError>;

    /// Sweeps the reserved-liquidity bucket back to `to`.
    fn withdraw_reserved_liquidity(
        &mut self,
        to: &Addr,
        amount: Uint256,
        is_call: bool,
    ) -> Result<(), VaultError>;

    /// Spot observed strictly after `expiry`, used to settle withdrawals
    /// on expired options.
    fn get_price_after(&self, expiry: UnixTimestamp) -> Result<Fixed64x64, VaultError>;

    fn balance_of(&self, holder: &Addr, token_id: Uint256) -> Uint256;

    fn safe_transfer_from(
        &mut self,
        from: &Addr,
        to: &Addr,
        token_id: Uint256,
        amount: Uint256,
    ) -> Result<(), VaultError>;
}

/// Spot/vol oracle and Black-Scholes pricer.
pub trait Pricer {
    fn latest_answer(&self) -> Fixed64x64;

    fn get_time_to_maturity(&self, expiry: UnixTimestamp, now: UnixTimestamp) -> Fixed64x64;

    fn get_delta_strike_price(
        &self,
        is_call: bool,
        expiry: UnixTimestamp,
        delta: Fixed64x64,
    ) -> Result<Fixed64x64, VaultError>;

    fn snap_to_grid(&self, is_call: bool, x: Fixed64x64) -> Fixed64x64;

    fn get_black_scholes_price(
        &self,
        spot: Fixed64x64,
        strike: Fixed64x64,
        tau: Fixed64x64,
        is_call: bool,
    ) -> Result<Fixed64x64, VaultError>;
}

/// Swaps an arbitrary input token into the vault's collateral token.
pub trait ExchangeHelper {
    fn swap_with_token(
        &mut self,
        caller: &Addr,
        token_in: &str,
        amount_in: Uint256,
        min_amount_out: Uint256,
    ) -> Result<Uint256, VaultError>;
}

/// The ERC20-like collateral token (or wrapped native) the vault and
/// queue hold balances of.
pub trait CollateralToken {
    fn decimals(&self) -> u32;
    fn balance_of(&self, holder: &Addr) -> Uint256;
    fn transfer(&mut self, from: &Addr, to: &Addr, amount: Uint256) -> Result<(), VaultError>;
}

//! Externally observable events. The engine never writes these anywhere
//! itself — each mutator returns a `Vec<VaultEvent>` in call order, and
//! the host (the CLI, a contract's `Response`, a test harness) decides how
//! to surface them.

use cosmwasm_std::{Addr, Uint256};
use serde::{Deserialize, Serialize};

use crate::auction::AuctionStatus;
use crate::fixed::Fixed64x64;
use crate::orderbook::OrderId;
use crate::time::UnixTimestamp;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum VaultEvent {
    AuctionStatusSet {
        epoch: u64,
        status: AuctionStatus,
    },
    OrderAdded {
        epoch: u64,
        id: OrderId,
        buyer: Addr,
        price: Fixed64x64,
        size: Uint256,
        is_limit: bool,
    },
    OrderCanceled {
        epoch: u64,
        id: OrderId,
        buyer: Addr,
    },
    OrderWithdrawn {
        epoch: u64,
        buyer: Addr,
        refund: Uint256,
        fill: Uint256,
    },
    AuctionPricesSet {
        epoch: u64,
        strike: Fixed64x64,
        offset_strike: Fixed64x64,
        spot: Fixed64x64,
        tau: Fixed64x64,
        max_price: Fixed64x64,
        min_price: Fixed64x64,
    },
    OptionParametersSet {
        epoch: u64,
        expiry: UnixTimestamp,
        strike: Fixed64x64,
        long_token_id: Uint256,
        short_token_id: Uint256,
    },
    AuctionProcessed {
        epoch: u64,
        collateral_used: Uint256,
        short_contracts: Uint256,
        premiums: Uint256,
    },
    PerformanceFeeCollected {
        epoch: u64,
        net_income: Uint256,
        fee_in_collateral: Uint256,
    },
    WithdrawalFeeCollected {
        epoch: u64,
        fee_in_collateral: Uint256,
        fee_in_short_contracts: Uint256,
    },
    ReservedLiquidityWithdrawn {
        epoch: u64,
        amount: Uint256,
    },
    DistributionSent {
        epoch: u64,
        collateral: Uint256,
        short_contracts: Uint256,
        receiver: Addr,
    },
    Withdraw {
        caller: Addr,
        receiver: Addr,
        owner: Addr,
        assets: Uint256,
        shares: Uint256,
    },
}

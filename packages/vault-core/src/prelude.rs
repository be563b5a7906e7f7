pub use crate::accounting::{
    collect_performance_fee, compute_withdraw_distribution, convert_to_shares, total_assets,
    total_collateral, total_reserves, total_short_as_collateral, PerformanceFeeOutcome,
    ShareLedger, WithdrawDistribution,
};
pub use crate::auction::{Auction, AuctionStatus, CollateralContext, InitAuctionParams, WithdrawOutcome};
pub use crate::collaborators::{
    make_token_id, reserved_liquidity_id, CollateralToken, ExchangeHelper, Pool, PoolSettings,
    Pricer, TokenType,
};
pub use crate::deposit_queue::{make_claim_token_id, parse_claim_token_id, DepositQueue};
pub use crate::epoch::{OptionParams, Vault, VaultConfig};
pub use crate::error::VaultError;
pub use crate::events::VaultEvent;
pub use crate::fixed::Fixed64x64;
pub use crate::orderbook::{Order, OrderBook, OrderId};
pub use crate::time::UnixTimestamp;

pub use cosmwasm_std::{Addr, Uint256};

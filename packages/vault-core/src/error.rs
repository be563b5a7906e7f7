//! Error taxonomy for the vault engine.
//!
//! Mirrors the market contract's error enum: one flat [thiserror] type,
//! grouped by the kind of failure rather than by which component raised it,
//! so callers can match on `VaultError::NotKeeper` without caring whether
//! the epoch controller or the auction engine produced it.

use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VaultError {
    // --- Access ---
    #[error("caller is not the vault owner")]
    NotOwner,
    #[error("caller is not the registered keeper")]
    NotKeeper,
    #[error("caller is not the vault itself")]
    NotVault,
    #[error("caller is not the deposit queue")]
    NotQueue,

    // --- State ---
    #[error("auction is not in the expected status for this operation")]
    BadStatus,
    #[error("auction has not finished processing")]
    AuctionNotProcessed,
    #[error("vault is paused")]
    Paused,
    #[error("hold period is still active")]
    HoldPeriodActive,
    #[error("premiums have not yet been transferred to the vault")]
    PremiumsNotTransferred,
    #[error("premiums have already been transferred to the vault")]
    PremiumsAlreadyTransferred,
    #[error("long tokens required to exercise are missing")]
    LongTokensMissing,

    // --- Argument ---
    #[error("address was not provided")]
    AddressNotProvided,
    #[error("address is unchanged from its current value")]
    AddressUnchanged,
    #[error("value is below the configured minimum")]
    ValueBelowMinimum,
    #[error("value exceeds the configured maximum")]
    ValueExceedsMaximum,
    #[error("deposit would exceed the vault's maximum TVL")]
    MaxTvlExceeded,
    #[error("order size is below the configured minimum")]
    SizeBelowMinimum,
    #[error("order cost exceeds the caller's maximum")]
    CostExceedsMax,
    #[error("order id does not exist")]
    InvalidOrderId,
    #[error("order was not found")]
    OrderNotFound,
    #[error("caller is not the buyer of record for this order")]
    BuyerMismatch,
    #[error("the current epoch's claim token is not yet redeemable")]
    CurrentClaimTokenNotRedeemable,
    #[error("token decimals do not match the configured collateral decimals")]
    DecimalsMismatch,
    #[error("argument is otherwise invalid")]
    InvalidArgument,

    // --- Numeric ---
    #[error("division by zero")]
    DivisionByZero,
    #[error("arithmetic overflow")]
    Overflow,

    // --- External ---
    #[error("wrapped native token does not match the configured collateral")]
    WrappedNativeMismatch,
    #[error("exchange helper returned less collateral than required")]
    SwapShortfall,

    // --- Rescue ---
    #[error("auction timed out waiting for keeper action")]
    AuctionTimedOut,
}

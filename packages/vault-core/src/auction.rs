//! The descending-price auction state machine: one instance per epoch,
//! each owning its own order book.

use cosmwasm_std::{Addr, Uint256};
use serde::{Deserialize, Serialize};

use crate::error::VaultError;
use crate::events::VaultEvent;
use crate::fixed::Fixed64x64;
use crate::orderbook::{Order, OrderBook, OrderId};
use crate::time::UnixTimestamp;

pub const AUCTION_TIMEOUT_SECONDS: i64 = 24 * 3600;
pub const WITHDRAW_HOLD_SECONDS: i64 = 24 * 3600;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionStatus {
    Uninitialized,
    Initialized,
    Finalized,
    Processed,
    Cancelled,
}

#[derive(Debug, Clone)]
pub struct InitAuctionParams {
    pub expiry: UnixTimestamp,
    pub strike: Fixed64x64,
    pub long_token_id: Uint256,
    pub start_time: UnixTimestamp,
    pub end_time: UnixTimestamp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WithdrawOutcome {
    pub fill: Uint256,
    pub refund: Uint256,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    pub status: AuctionStatus,
    pub expiry: UnixTimestamp,
    pub strike: Fixed64x64,
    pub max_price: Fixed64x64,
    pub min_price: Fixed64x64,
    pub last_price: Fixed64x64,
    pub start_time: UnixTimestamp,
    pub end_time: UnixTimestamp,
    pub processed_time: Option<UnixTimestamp>,
    pub total_contracts: Uint256,
    pub total_contracts_sold: Uint256,
    pub total_premiums: Uint256,
    /// Tracked independently of `total_premiums == 0` because a
    /// zero-fill auction legitimately transfers zero premium; relying on
    /// the value alone would let a second transfer through.
    premiums_transferred: bool,
    pub long_token_id: Uint256,
    pub book: OrderBook,
}

impl Default for Auction {
    fn default() -> Self {
        Auction {
            status: AuctionStatus::Uninitialized,
            expiry: UnixTimestamp::from_seconds(0),
            strike: Fixed64x64::ZERO,
            max_price: Fixed64x64::ZERO,
            min_price: Fixed64x64::ZERO,
            last_price: Fixed64x64::ZERO,
            start_time: UnixTimestamp::from_seconds(0),
            end_time: UnixTimestamp::from_seconds(0),
            processed_time: None,
            total_contracts: Uint256::zero(),
            total_contracts_sold: Uint256::zero(),
            total_premiums: Uint256::zero(),
            premiums_transferred: false,
            long_token_id: Uint256::zero(),
            book: OrderBook::new(),
        }
    }
}

/// Parameters the order/finalize-check paths need from the vault and
/// pool but don't own themselves.
#[derive(Debug, Clone, Copy)]
pub struct CollateralContext {
    pub vault_total_collateral: Uint256,
    pub is_call: bool,
    pub underlying_decimals: u32,
    pub base_decimals: u32,
}

impl Auction {
    pub fn new() -> Self {
        Auction::default()
    }

    fn set_cancelled(&mut self) {
        self.last_price = Fixed64x64::MAX;
        self.total_premiums = Uint256::zero();
        self.status = AuctionStatus::Cancelled;
    }

    pub fn initialize(
        &mut self,
        epoch: u64,
        params: InitAuctionParams,
        now: UnixTimestamp,
    ) -> Vec<VaultEvent> {
        let bad = params.start_time >= params.end_time
            || now.seconds() > params.start_time.seconds()
            || now.seconds() > params.expiry.seconds()
            || !params.strike.is_positive()
            || params.long_token_id.is_zero();

        if bad {
            self.set_cancelled();
            return vec![VaultEvent::AuctionStatusSet {
                epoch,
                status: AuctionStatus::Cancelled,
            }];
        }

        self.expiry = params.expiry;
        self.strike = params.strike;
        self.start_time = params.start_time;
        self.end_time = params.end_time;
        self.long_token_id = params.long_token_id;
        self.status = AuctionStatus::Initialized;
        vec![VaultEvent::AuctionStatusSet {
            epoch,
            status: AuctionStatus::Initialized,
        }]
    }

    pub fn set_auction_prices(
        &mut self,
        epoch: u64,
        max_price: Fixed64x64,
        min_price: Fixed64x64,
    ) -> Result<Vec<VaultEvent>, VaultError> {
        if self.status != AuctionStatus::Initialized {
            return Err(VaultError::BadStatus);
        }
        self.max_price = max_price;
        self.min_price = min_price;
        if !max_price.is_positive() || !min_price.is_positive() || max_price <= min_price {
            self.set_cancelled();
            return Ok(vec![VaultEvent::AuctionStatusSet {
                epoch,
                status: AuctionStatus::Cancelled,
            }]);
        }
        Ok(vec![])
    }

    pub fn price_curve(&self, now: UnixTimestamp) -> Result<Fixed64x64, VaultError> {
        if now.seconds() <= self.start_time.seconds() {
            return Ok(self.max_price);
        }
        if now.seconds() >= self.end_time.seconds() {
            return Ok(self.min_price);
        }
        let elapsed = now.checked_sub(self.start_time)?;
        let total = self.end_time.checked_sub(self.start_time)?;
        let frac = Fixed64x64::from_i64(elapsed).checked_div(Fixed64x64::from_i64(total))?;
        let spread = self.max_price.checked_sub(self.min_price)?;
        let drop = frac.checked_mul(spread)?;
        self.max_price.checked_sub(drop)
    }

    pub fn clearing_price(&self, now: UnixTimestamp) -> Result<Fixed64x64, VaultError> {
        match self.status {
            AuctionStatus::Finalized | AuctionStatus::Processed | AuctionStatus::Cancelled => {
                Ok(self.last_price)
            }
            _ => self.price_curve(now),
        }
    }

    fn ensure_total_contracts(&mut self, ctx: CollateralContext) -> Result<(), VaultError> {
        if !self.total_contracts.is_zero() {
            return Ok(());
        }
        self.total_contracts = Fixed64x64::from_collateral_to_contracts(
            ctx.vault_total_collateral,
            ctx.is_call,
            ctx.base_decimals,
            ctx.underlying_decimals,
            self.strike,
        )?;
        Ok(())
    }

    /// Re-evaluates the book against the current clearing price and
    /// decides whether the auction should auto-finalize. Called after
    /// every successful order add and (once trading has opened) cancel.
    fn finalize_check(
        &mut self,
        epoch: u64,
        now: UnixTimestamp,
        ctx: CollateralContext,
    ) -> Result<Vec<VaultEvent>, VaultError> {
        if self.status != AuctionStatus::Initialized {
            return Ok(vec![]);
        }
        self.ensure_total_contracts(ctx)?;

        let clearing = self.price_curve(now)?;
        let mut accumulated = Uint256::zero();
        let mut last_visited_price: Option<Fixed64x64> = None;

        for order in self.book.iter() {
            if order.price < clearing {
                break;
            }
            last_visited_price = Some(order.price);
            let candidate = accumulated
                .checked_add(order.size)
                .map_err(|_| VaultError::Overflow)?;
            if candidate >= self.total_contracts {
                self.last_price = order.price;
                self.total_contracts_sold = self.total_contracts;
                self.status = AuctionStatus::Finalized;
                return Ok(vec![VaultEvent::AuctionStatusSet {
                    epoch,
                    status: AuctionStatus::Finalized,
                }]);
            }
            accumulated = candidate;
        }

        if let Some(price) = last_visited_price {
            self.last_price = price;
        }
        self.total_contracts_sold = accumulated;

        if now.seconds() > self.end_time.seconds() {
            self.status = AuctionStatus::Finalized;
            return Ok(vec![VaultEvent::AuctionStatusSet {
                epoch,
                status: AuctionStatus::Finalized,
            }]);
        }
        Ok(vec![])
    }

    pub fn add_limit_order(
        &mut self,
        epoch: u64,
        buyer: Addr,
        price: Fixed64x64,
        size: Uint256,
        min_size: Uint256,
        now: UnixTimestamp,
        ctx: CollateralContext,
    ) -> Result<(OrderId, Uint256, Vec<VaultEvent>), VaultError> {
        if self.status != AuctionStatus::Initialized {
            return Err(VaultError::BadStatus);
        }
        if !price.is_positive() {
            return Err(VaultError::InvalidArgument);
        }
        if size < min_size {
            return Err(VaultError::SizeBelowMinimum);
        }
        if now.seconds() > self.end_time.seconds() {
            return Err(VaultError::BadStatus);
        }

        let cost = price.muli(size)?;
        let id = self.book.insert(buyer.clone(), price, size);
        let mut events = vec![VaultEvent::OrderAdded {
            epoch,
            id,
            buyer,
            price,
            size,
            is_limit: true,
        }];
        events.extend(self.finalize_check(epoch, now, ctx)?);
        Ok((id, cost, events))
    }

    pub fn add_market_order(
        &mut self,
        epoch: u64,
        buyer: Addr,
        size: Uint256,
        max_cost: Uint256,
        min_size: Uint256,
        now: UnixTimestamp,
        ctx: CollateralContext,
    ) -> Result<(OrderId, Fixed64x64, Uint256, Vec<VaultEvent>), VaultError> {
        if self.status != AuctionStatus::Initialized {
            return Err(VaultError::BadStatus);
        }
        if now.seconds() < self.start_time.seconds() || now.seconds() > self.end_time.seconds() {
            return Err(VaultError::BadStatus);
        }
        if size < min_size {
            return Err(VaultError::SizeBelowMinimum);
        }

        let price = self.price_curve(now)?;
        let cost = price.muli(size)?;
        if cost > max_cost {
            return Err(VaultError::CostExceedsMax);
        }

        let id = self.book.insert(buyer.clone(), price, size);
        let mut events = vec![VaultEvent::OrderAdded {
            epoch,
            id,
            buyer,
            price,
            size,
            is_limit: false,
        }];
        events.extend(self.finalize_check(epoch, now, ctx)?);
        Ok((id, price, cost, events))
    }

    pub fn cancel_limit_order(
        &mut self,
        epoch: u64,
        caller: &Addr,
        id: OrderId,
        now: UnixTimestamp,
        ctx: CollateralContext,
    ) -> Result<(Order, Vec<VaultEvent>), VaultError> {
        if self.status != AuctionStatus::Initialized {
            return Err(VaultError::BadStatus);
        }
        let order = self
            .book
            .get_order_by_id(id)
            .ok_or(VaultError::InvalidOrderId)?
            .clone();
        if order.buyer != *caller {
            return Err(VaultError::BuyerMismatch);
        }
        self.book.remove(id)?;
        let mut events = vec![VaultEvent::OrderCanceled {
            epoch,
            id,
            buyer: caller.clone(),
        }];
        if now.seconds() >= self.start_time.seconds() {
            events.extend(self.finalize_check(epoch, now, ctx)?);
        }
        Ok((order, events))
    }

    pub fn finalize_auction(
        &mut self,
        epoch: u64,
        now: UnixTimestamp,
        ctx: CollateralContext,
    ) -> Result<Vec<VaultEvent>, VaultError> {
        let timed_out = now.seconds() >= self.end_time.seconds() + AUCTION_TIMEOUT_SECONDS;
        if timed_out
            && matches!(
                self.status,
                AuctionStatus::Initialized | AuctionStatus::Finalized
            )
        {
            self.set_cancelled();
            return Ok(vec![VaultEvent::AuctionStatusSet {
                epoch,
                status: AuctionStatus::Cancelled,
            }]);
        }
        if self.status == AuctionStatus::Initialized && now.seconds() > self.start_time.seconds() {
            return self.finalize_check(epoch, now, ctx);
        }
        Ok(vec![])
    }

    pub fn transfer_premium(&mut self) -> Result<Uint256, VaultError> {
        if self.status != AuctionStatus::Finalized {
            return Err(VaultError::BadStatus);
        }
        if self.premiums_transferred {
            return Err(VaultError::PremiumsAlreadyTransferred);
        }
        let premium = self.last_price.muli(self.total_contracts_sold)?;
        self.total_premiums = premium;
        self.premiums_transferred = true;
        Ok(premium)
    }

    pub fn process_auction(
        &mut self,
        now: UnixTimestamp,
        long_token_balance: Uint256,
    ) -> Result<(), VaultError> {
        if self.status != AuctionStatus::Finalized {
            return Err(VaultError::BadStatus);
        }
        if !self.total_contracts_sold.is_zero() {
            if self.total_premiums.is_zero() {
                return Err(VaultError::PremiumsNotTransferred);
            }
            if long_token_balance < self.total_contracts_sold {
                return Err(VaultError::LongTokensMissing);
            }
        }
        self.status = AuctionStatus::Processed;
        self.processed_time = Some(now);
        Ok(())
    }

    fn require_withdrawable(&self, now: UnixTimestamp) -> Result<(), VaultError> {
        match self.status {
            AuctionStatus::Processed => {
                let processed = self.processed_time.ok_or(VaultError::BadStatus)?;
                if now.seconds() < processed.seconds() + WITHDRAW_HOLD_SECONDS {
                    return Err(VaultError::HoldPeriodActive);
                }
                Ok(())
            }
            AuctionStatus::Cancelled => Ok(()),
            _ => Err(VaultError::BadStatus),
        }
    }

    fn walk_withdraw(
        &self,
        caller: &Addr,
    ) -> Result<(WithdrawOutcome, Vec<OrderId>), VaultError> {
        let mut sold_so_far = Uint256::zero();
        let mut outcome = WithdrawOutcome::default();
        let mut to_remove = Vec::new();
        let sentinel_cancelled = self.last_price.raw() >= Fixed64x64::MAX.raw();

        for order in self.book.iter() {
            if order.buyer == *caller {
                if !sentinel_cancelled && order.price >= self.last_price {
                    let paid = order.price.muli(order.size)?;
                    let mut filled = order.size;
                    let prospective = sold_so_far
                        .checked_add(order.size)
                        .map_err(|_| VaultError::Overflow)?;
                    let mut cost = self.last_price.muli(order.size)?;
                    if prospective >= self.total_contracts {
                        let remainder = self
                            .total_contracts
                            .checked_sub(sold_so_far)
                            .unwrap_or(Uint256::zero());
                        cost = self.last_price.muli(remainder)?;
                        filled = remainder;
                    }
                    outcome.fill = outcome
                        .fill
                        .checked_add(filled)
                        .map_err(|_| VaultError::Overflow)?;
                    let refund_delta = paid.checked_sub(cost).map_err(|_| VaultError::Overflow)?;
                    outcome.refund = outcome
                        .refund
                        .checked_add(refund_delta)
                        .map_err(|_| VaultError::Overflow)?;
                } else {
                    let full = order.price.muli(order.size)?;
                    outcome.refund = outcome
                        .refund
                        .checked_add(full)
                        .map_err(|_| VaultError::Overflow)?;
                }
                to_remove.push(order.id);
            }
            sold_so_far = sold_so_far
                .checked_add(order.size)
                .map_err(|_| VaultError::Overflow)?;
        }

        Ok((outcome, to_remove))
    }

    pub fn preview_withdraw(
        &self,
        caller: &Addr,
        now: UnixTimestamp,
    ) -> Result<WithdrawOutcome, VaultError> {
        self.require_withdrawable(now)?;
        let (outcome, _) = self.walk_withdraw(caller)?;
        Ok(outcome)
    }

    pub fn withdraw(
        &mut self,
        caller: &Addr,
        now: UnixTimestamp,
    ) -> Result<WithdrawOutcome, VaultError> {
        self.require_withdrawable(now)?;
        let (outcome, to_remove) = self.walk_withdraw(caller)?;
        for id in to_remove {
            self.book.remove(id)?;
        }
        Ok(outcome)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Addr {
        Addr::unchecked(s)
    }

    fn dec(s: &str) -> Fixed64x64 {
        Fixed64x64::from_decimal_str(s).unwrap()
    }

    fn ctx(total_collateral: u128) -> CollateralContext {
        CollateralContext {
            vault_total_collateral: Uint256::from(total_collateral),
            is_call: true,
            underlying_decimals: 18,
            base_decimals: 18,
        }
    }

    fn init(now: i64, start: i64, end: i64) -> Auction {
        let mut a = Auction::new();
        a.initialize(
            0,
            InitAuctionParams {
                expiry: UnixTimestamp::from_seconds(end + 100_000),
                strike: dec("2000"),
                long_token_id: Uint256::from(7u128),
                start_time: UnixTimestamp::from_seconds(start),
                end_time: UnixTimestamp::from_seconds(end),
            },
            UnixTimestamp::from_seconds(now),
        );
        a.set_auction_prices(0, dec("0.1"), dec("0.01")).unwrap();
        a
    }

    #[test]
    fn bad_prices_cancel_the_auction() {
        let mut a = init(0, 100, 200);
        let events = a.set_auction_prices(0, dec("5"), dec("10")).unwrap();
        assert_eq!(a.status, AuctionStatus::Cancelled);
        assert_eq!(a.last_price.raw(), Fixed64x64::MAX.raw());
        assert!(matches!(
            events[0],
            VaultEvent::AuctionStatusSet {
                status: AuctionStatus::Cancelled,
                ..
            }
        ));
    }

    #[test]
    fn market_orders_fill_at_curve_price_and_auto_finalize() {
        let mut a = init(0, 100, 200);
        let c = ctx(1000);
        let (_, p1, _, _) = a
            .add_market_order(
                0,
                addr("b1"),
                Uint256::from(334u128),
                Uint256::from(1_000_000u128),
                Uint256::from(1u128),
                UnixTimestamp::from_seconds(200),
                c,
            )
            .unwrap();
        assert_eq!(a.status, AuctionStatus::Initialized);
        let (_, _, _, _) = a
            .add_market_order(
                0,
                addr("b2"),
                Uint256::from(334u128),
                Uint256::from(1_000_000u128),
                Uint256::from(1u128),
                UnixTimestamp::from_seconds(200),
                c,
            )
            .unwrap();
        assert_eq!(a.status, AuctionStatus::Initialized);
        let (_, p3, _, events) = a
            .add_market_order(
                0,
                addr("b3"),
                Uint256::from(334u128),
                Uint256::from(1_000_000u128),
                Uint256::from(1u128),
                UnixTimestamp::from_seconds(200),
                c,
            )
            .unwrap();
        assert_eq!(a.status, AuctionStatus::Finalized);
        assert_eq!(a.total_contracts_sold, Uint256::from(1000u128));
        assert_eq!(a.last_price, p3);
        assert_eq!(p1, p3, "all three orders land at the same curve instant");
        assert!(events
            .iter()
            .any(|e| matches!(e, VaultEvent::AuctionStatusSet { status: AuctionStatus::Finalized, .. })));
    }

    #[test]
    fn withdraw_refunds_unfilled_remainder_of_boundary_order() {
        let mut a = init(0, 100, 200);
        let c = ctx(1000);
        a.add_market_order(
            0,
            addr("b1"),
            Uint256::from(999u128),
            Uint256::from(10_000_000u128),
            Uint256::from(1u128),
            UnixTimestamp::from_seconds(150),
            c,
        )
        .unwrap();
        a.add_market_order(
            0,
            addr("b2"),
            Uint256::from(5u128),
            Uint256::from(10_000_000u128),
            Uint256::from(1u128),
            UnixTimestamp::from_seconds(150),
            c,
        )
        .unwrap();
        assert_eq!(a.status, AuctionStatus::Finalized);
        assert_eq!(a.total_contracts_sold, Uint256::from(1000u128));

        a.transfer_premium().unwrap();
        a.process_auction(UnixTimestamp::from_seconds(151), Uint256::from(1000u128))
            .unwrap();

        let later = UnixTimestamp::from_seconds(151 + WITHDRAW_HOLD_SECONDS);
        let out = a.withdraw(&addr("b2"), later).unwrap();
        assert_eq!(out.fill, Uint256::from(1u128));
        assert!(out.refund > Uint256::zero());
    }

    #[test]
    fn cancelled_auction_refunds_orders_in_full() {
        let mut a = init(0, 100, 200);
        let c = ctx(1000);
        a.add_limit_order(
            0,
            addr("b1"),
            dec("0.05"),
            Uint256::from(10u128),
            Uint256::from(1u128),
            UnixTimestamp::from_seconds(50),
            c,
        )
        .unwrap();
        a.set_auction_prices(0, dec("5"), dec("10")).unwrap();
        assert_eq!(a.status, AuctionStatus::Cancelled);

        let out = a
            .withdraw(&addr("b1"), UnixTimestamp::from_seconds(300))
            .unwrap();
        assert_eq!(out.fill, Uint256::zero());
        assert_eq!(out.refund, dec("0.05").muli(Uint256::from(10u128)).unwrap());
    }
}

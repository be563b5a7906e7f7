//! The aggregate `Vault`: the single struct the diamond's Admin/Base/View
//! facets collapse into (see the design notes on replacing function-selector
//! routing with plain methods). Owns one `Auction` + `Option` per epoch, a
//! `DepositQueue`, a `ShareLedger`, and the collaborator handles it drives.

use cosmwasm_std::{Addr, Uint256};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::accounting::{self, ShareLedger};
use crate::auction::{Auction, AuctionStatus, CollateralContext, InitAuctionParams, WithdrawOutcome};
use crate::collaborators::{make_token_id, CollateralToken, ExchangeHelper, Pool, Pricer, TokenType};
use crate::deposit_queue::DepositQueue;
use crate::error::VaultError;
use crate::events::VaultEvent;
use crate::fixed::Fixed64x64;
use crate::orderbook::OrderId;
use crate::time::UnixTimestamp;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionParams {
    pub expiry: UnixTimestamp,
    pub strike: Fixed64x64,
    pub long_token_id: Uint256,
    pub short_token_id: Uint256,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VaultConfig {
    pub owner: Addr,
    pub keeper: Addr,
    pub fee_recipient: Addr,
    pub queue_address: Addr,
    pub is_call: bool,
    pub reserve_rate: Fixed64x64,
    pub performance_fee: Fixed64x64,
    pub withdrawal_fee: Fixed64x64,
    pub delta: Fixed64x64,
    pub delta_offset: Fixed64x64,
    pub start_offset: i64,
    pub end_offset: i64,
    pub min_order_size: Uint256,
    pub base_decimals: u32,
    pub underlying_decimals: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vault<P, Pr, X, T> {
    pub address: Addr,
    pub config: VaultConfig,
    pub epoch: u64,
    pub last_total_assets: Uint256,
    pub total_withdrawals: Uint256,
    pub auction_processed: bool,
    pub start_time: UnixTimestamp,
    pub options: HashMap<u64, OptionParams>,
    pub auctions: HashMap<u64, Auction>,
    pub queue: DepositQueue,
    pub shares: ShareLedger,
    buyer_epochs: HashMap<Addr, BTreeSet<u64>>,
    pub pool: P,
    pub pricer: Pr,
    pub exchange: X,
    pub collateral_token: T,
}

impl<P: Pool, Pr: Pricer, X: ExchangeHelper, T: CollateralToken> Vault<P, Pr, X, T> {
    pub fn new(address: Addr, config: VaultConfig, pool: P, pricer: Pr, exchange: X, collateral_token: T) -> Self {
        let queue = DepositQueue::new(config.queue_address.clone(), Uint256::MAX);
        Vault {
            address,
            config,
            epoch: 0,
            last_total_assets: Uint256::zero(),
            total_withdrawals: Uint256::zero(),
            auction_processed: true,
            start_time: UnixTimestamp::from_seconds(0),
            options: HashMap::new(),
            auctions: HashMap::new(),
            queue,
            shares: ShareLedger::default(),
            buyer_epochs: HashMap::new(),
            pool,
            pricer,
            exchange,
            collateral_token,
        }
    }

    fn require_keeper(&self, caller: &Addr) -> Result<(), VaultError> {
        if *caller != self.config.keeper {
            return Err(VaultError::NotKeeper);
        }
        Ok(())
    }

    fn require_owner(&self, caller: &Addr) -> Result<(), VaultError> {
        if *caller != self.config.owner {
            return Err(VaultError::NotOwner);
        }
        Ok(())
    }

    fn check_withdrawal_lock(&self, now: UnixTimestamp) -> Result<(), VaultError> {
        if now.seconds() >= self.start_time.seconds() && !self.auction_processed {
            return Err(VaultError::AuctionNotProcessed);
        }
        Ok(())
    }

    fn auction_token_holder(&self, epoch: u64) -> Addr {
        Addr::unchecked(format!("{}/auction/{}", self.address, epoch))
    }

    // --- admin ---

    pub fn set_keeper(&mut self, caller: &Addr, new_keeper: Addr) -> Result<(), VaultError> {
        self.require_owner(caller)?;
        if new_keeper.as_str().is_empty() {
            return Err(VaultError::AddressNotProvided);
        }
        if new_keeper == self.config.keeper {
            return Err(VaultError::AddressUnchanged);
        }
        self.config.keeper = new_keeper;
        Ok(())
    }

    pub fn set_fee_recipient(&mut self, caller: &Addr, new_recipient: Addr) -> Result<(), VaultError> {
        self.require_owner(caller)?;
        if new_recipient.as_str().is_empty() {
            return Err(VaultError::AddressNotProvided);
        }
        if new_recipient == self.config.fee_recipient {
            return Err(VaultError::AddressUnchanged);
        }
        self.config.fee_recipient = new_recipient;
        Ok(())
    }

    pub fn set_max_tvl(&mut self, caller: &Addr, max_tvl: Uint256) -> Result<(), VaultError> {
        self.require_owner(caller)?;
        self.queue.max_tvl = max_tvl;
        Ok(())
    }

    pub fn set_paused(&mut self, caller: &Addr, paused: bool) -> Result<(), VaultError> {
        self.require_owner(caller)?;
        self.queue.paused = paused;
        Ok(())
    }

    // --- accounting views ---

    pub fn total_reserves(&self) -> Result<Uint256, VaultError> {
        accounting::total_reserves(self.collateral_token.balance_of(&self.address), self.config.reserve_rate)
    }

    pub fn total_collateral(&self) -> Result<Uint256, VaultError> {
        accounting::total_collateral(self.collateral_token.balance_of(&self.address), self.config.reserve_rate)
    }

    pub fn total_short_as_contracts(&self) -> Uint256 {
        match self.options.get(&self.epoch) {
            Some(opt) => self.pool.balance_of(&self.address, opt.short_token_id),
            None => Uint256::zero(),
        }
    }

    pub fn total_short_as_collateral(&self) -> Result<Uint256, VaultError> {
        let strike = self.options.get(&self.epoch).map(|o| o.strike).unwrap_or(Fixed64x64::ZERO);
        accounting::total_short_as_collateral(
            self.total_short_as_contracts(),
            self.config.is_call,
            self.config.underlying_decimals,
            self.config.base_decimals,
            strike,
        )
    }

    pub fn total_assets(&self) -> Result<Uint256, VaultError> {
        accounting::total_assets(self.total_collateral()?, self.total_short_as_collateral()?)
    }

    fn collateral_context(&self) -> Result<CollateralContext, VaultError> {
        Ok(CollateralContext {
            vault_total_collateral: self.total_collateral()?,
            is_call: self.config.is_call,
            underlying_decimals: self.config.underlying_decimals,
            base_decimals: self.config.base_decimals,
        })
    }

    // --- deposit queue ---

    pub fn deposit(&mut self, depositor: &Addr, amount: Uint256) -> Result<Uint256, VaultError> {
        self.collateral_token.transfer(depositor, &self.config.queue_address, amount)?;
        let auto_redeemed = self.queue.deposit(depositor, amount)?;
        if !auto_redeemed.is_zero() {
            self.shares.transfer(&self.config.queue_address, depositor, auto_redeemed)?;
        }
        Ok(auto_redeemed)
    }

    pub fn swap_and_deposit(
        &mut self,
        depositor: &Addr,
        token_in: &str,
        amount_in: Uint256,
        min_collateral_out: Uint256,
    ) -> Result<Uint256, VaultError> {
        let amount_out = self.exchange.swap_with_token(depositor, token_in, amount_in, min_collateral_out)?;
        if amount_out < min_collateral_out {
            return Err(VaultError::SwapShortfall);
        }
        self.deposit(depositor, amount_out)
    }

    pub fn cancel_deposit(&mut self, depositor: &Addr, amount: Uint256) -> Result<(), VaultError> {
        self.queue.cancel(depositor, amount)?;
        self.collateral_token.transfer(&self.config.queue_address, depositor, amount)?;
        Ok(())
    }

    pub fn redeem(
        &mut self,
        caller: &Addr,
        token_id: Uint256,
        receiver: &Addr,
        now: UnixTimestamp,
    ) -> Result<Uint256, VaultError> {
        self.check_withdrawal_lock(now)?;
        let shares = self.queue.redeem(token_id, caller)?;
        if !shares.is_zero() {
            self.shares.transfer(&self.config.queue_address, receiver, shares)?;
        }
        Ok(shares)
    }

    pub fn redeem_max(&mut self, caller: &Addr, receiver: &Addr, now: UnixTimestamp) -> Result<Uint256, VaultError> {
        self.check_withdrawal_lock(now)?;
        let shares = self.queue.redeem_max(caller)?;
        if !shares.is_zero() {
            self.shares.transfer(&self.config.queue_address, receiver, shares)?;
        }
        Ok(shares)
    }

    pub fn preview_unredeemed(&self, token_id: Uint256, holder: &Addr) -> Uint256 {
        self.queue.preview_unredeemed(token_id, holder)
    }

    // --- auction participation ---

    pub fn add_limit_order(
        &mut self,
        caller: &Addr,
        epoch: u64,
        price: Fixed64x64,
        size: Uint256,
        now: UnixTimestamp,
    ) -> Result<(OrderId, Uint256), VaultError> {
        let cost = price.muli(size)?;
        self.collateral_token.transfer(caller, &self.address, cost)?;
        let ctx = self.collateral_context()?;
        let auction = self.auctions.get_mut(&epoch).ok_or(VaultError::BadStatus)?;
        let (id, actual_cost, _events) =
            auction.add_limit_order(epoch, caller.clone(), price, size, self.config.min_order_size, now, ctx)?;
        self.buyer_epochs.entry(caller.clone()).or_default().insert(epoch);
        Ok((id, actual_cost))
    }

    pub fn swap_and_add_limit_order(
        &mut self,
        caller: &Addr,
        token_in: &str,
        epoch: u64,
        price: Fixed64x64,
        size: Uint256,
        now: UnixTimestamp,
    ) -> Result<(OrderId, Uint256), VaultError> {
        let cost = price.muli(size)?;
        let amount_out = self.exchange.swap_with_token(caller, token_in, cost, cost)?;
        if amount_out < cost {
            return Err(VaultError::SwapShortfall);
        }
        let ctx = self.collateral_context()?;
        let auction = self.auctions.get_mut(&epoch).ok_or(VaultError::BadStatus)?;
        let (id, actual_cost, _events) =
            auction.add_limit_order(epoch, caller.clone(), price, size, self.config.min_order_size, now, ctx)?;
        self.buyer_epochs.entry(caller.clone()).or_default().insert(epoch);
        Ok((id, actual_cost))
    }

    pub fn add_market_order(
        &mut self,
        caller: &Addr,
        epoch: u64,
        size: Uint256,
        max_cost: Uint256,
        now: UnixTimestamp,
    ) -> Result<(OrderId, Fixed64x64, Uint256), VaultError> {
        let ctx = self.collateral_context()?;
        let price = {
            let auction = self.auctions.get(&epoch).ok_or(VaultError::BadStatus)?;
            auction.price_curve(now)?
        };
        let cost = price.muli(size)?;
        if cost > max_cost {
            return Err(VaultError::CostExceedsMax);
        }
        self.collateral_token.transfer(caller, &self.address, cost)?;
        let auction = self.auctions.get_mut(&epoch).ok_or(VaultError::BadStatus)?;
        let (id, actual_price, actual_cost, _events) =
            auction.add_market_order(epoch, caller.clone(), size, max_cost, self.config.min_order_size, now, ctx)?;
        self.buyer_epochs.entry(caller.clone()).or_default().insert(epoch);
        Ok((id, actual_price, actual_cost))
    }

    pub fn cancel_limit_order(
        &mut self,
        caller: &Addr,
        epoch: u64,
        id: OrderId,
        now: UnixTimestamp,
    ) -> Result<(), VaultError> {
        let ctx = self.collateral_context()?;
        let auction = self.auctions.get_mut(&epoch).ok_or(VaultError::BadStatus)?;
        let (order, _events) = auction.cancel_limit_order(epoch, caller, id, now, ctx)?;
        let refund = order.price.muli(order.size)?;
        self.collateral_token.transfer(&self.address, caller, refund)?;
        Ok(())
    }

    pub fn finalize_auction(&mut self, epoch: u64, now: UnixTimestamp) -> Result<Vec<VaultEvent>, VaultError> {
        let ctx = self.collateral_context()?;
        let auction = self.auctions.get_mut(&epoch).ok_or(VaultError::BadStatus)?;
        auction.finalize_auction(epoch, now, ctx)
    }

    fn settle_exercise(
        &self,
        option: &OptionParams,
        fill: Uint256,
        now: UnixTimestamp,
    ) -> Result<(Uint256, Uint256), VaultError> {
        if now.seconds() < option.expiry.seconds() || fill.is_zero() {
            return Ok((fill, Uint256::zero()));
        }
        let spot = self.pool.get_price_after(option.expiry)?;
        let exercise_value = if self.config.is_call {
            if spot <= option.strike {
                Uint256::zero()
            } else {
                let diff = spot.checked_sub(option.strike)?;
                let ratio = diff.checked_div(spot)?;
                ratio.muli(fill)?
            }
        } else if option.strike <= spot {
            Uint256::zero()
        } else {
            let diff = option.strike.checked_sub(spot)?;
            let value = diff.muli(fill)?;
            Fixed64x64::to_base_token_amount(self.config.underlying_decimals, self.config.base_decimals, value)?
        };
        Ok((Uint256::zero(), exercise_value))
    }

    pub fn preview_withdraw(&self, caller: &Addr, epoch: u64, now: UnixTimestamp) -> Result<WithdrawOutcome, VaultError> {
        let option = self.options.get(&epoch).ok_or(VaultError::BadStatus)?;
        let auction = self.auctions.get(&epoch).ok_or(VaultError::BadStatus)?;
        let outcome = auction.preview_withdraw(caller, now)?;
        let (fill, extra_refund) = self.settle_exercise(option, outcome.fill, now)?;
        Ok(WithdrawOutcome {
            fill,
            refund: outcome.refund.checked_add(extra_refund).map_err(|_| VaultError::Overflow)?,
        })
    }

    pub fn withdraw(&mut self, caller: &Addr, epoch: u64, now: UnixTimestamp) -> Result<(Uint256, Uint256), VaultError> {
        self.check_withdrawal_lock(now)?;
        let option = self.options.get(&epoch).ok_or(VaultError::BadStatus)?.clone();
        let auction = self.auctions.get_mut(&epoch).ok_or(VaultError::BadStatus)?;
        let outcome = auction.withdraw(caller, now)?;

        let (fill, extra_refund) = self.settle_exercise(&option, outcome.fill, now)?;
        let refund = outcome.refund.checked_add(extra_refund).map_err(|_| VaultError::Overflow)?;

        if !fill.is_zero() {
            let holder = self.auction_token_holder(epoch);
            self.pool.safe_transfer_from(&holder, caller, option.long_token_id, fill)?;
        }
        if !refund.is_zero() {
            self.collateral_token.transfer(&self.address, caller, refund)?;
        }
        if let Some(set) = self.buyer_epochs.get_mut(caller) {
            set.remove(&epoch);
        }
        Ok((refund, fill))
    }

    // --- vault-level withdrawal (shares -> collateral + short exposure) ---

    pub fn withdraw_assets(
        &mut self,
        caller: &Addr,
        receiver: &Addr,
        owner: &Addr,
        asset_amount: Uint256,
        now: UnixTimestamp,
    ) -> Result<VaultEvent, VaultError> {
        self.check_withdrawal_lock(now)?;
        let total_collateral = self.total_collateral()?;
        let total_short_as_collateral = self.total_short_as_collateral()?;
        let total_assets = accounting::total_assets(total_collateral, total_short_as_collateral)?;
        let strike = self.options.get(&self.epoch).map(|o| o.strike).unwrap_or(Fixed64x64::ZERO);

        let dist = accounting::compute_withdraw_distribution(
            asset_amount,
            total_collateral,
            total_short_as_collateral,
            total_assets,
            self.shares.total_supply,
            self.config.withdrawal_fee,
            self.config.is_call,
            self.config.base_decimals,
            self.config.underlying_decimals,
            strike,
        )?;

        self.shares.burn(owner, dist.shares_burned)?;
        self.total_withdrawals = self
            .total_withdrawals
            .checked_add(asset_amount)
            .map_err(|_| VaultError::Overflow)?;

        if !dist.withdrawal_fee_collateral.is_zero() || !dist.withdrawal_fee_short_contracts.is_zero() {
            if !dist.withdrawal_fee_collateral.is_zero() {
                self.collateral_token
                    .transfer(&self.address, &self.config.fee_recipient, dist.withdrawal_fee_collateral)?;
            }
        }
        if !dist.collateral.is_zero() {
            self.collateral_token.transfer(&self.address, receiver, dist.collateral)?;
        }
        if !dist.short_contracts.is_zero() {
            let short_id = self.options.get(&self.epoch).map(|o| o.short_token_id).unwrap_or(Uint256::zero());
            self.pool.safe_transfer_from(&self.address, receiver, short_id, dist.short_contracts)?;
        }

        let _ = caller;
        Ok(VaultEvent::Withdraw {
            caller: caller.clone(),
            receiver: receiver.clone(),
            owner: owner.clone(),
            assets: asset_amount,
            shares: dist.shares_burned,
        })
    }

    // --- epoch controller ---

    fn derive_auction_prices(
        &self,
        expiry: UnixTimestamp,
        strike: Fixed64x64,
        now: UnixTimestamp,
    ) -> Result<(Fixed64x64, Fixed64x64, Fixed64x64, Fixed64x64, Fixed64x64), VaultError> {
        if !strike.is_positive() {
            return Err(VaultError::InvalidArgument);
        }
        let offset_delta = self.config.delta.checked_sub(self.config.delta_offset)?;
        let offset_strike = self.pricer.get_delta_strike_price(self.config.is_call, expiry, offset_delta)?;
        let spot = self.pricer.latest_answer();
        let tau = self.pricer.get_time_to_maturity(expiry, now);

        let price_at_strike = self.pricer.get_black_scholes_price(spot, strike, tau, self.config.is_call)?;
        let price_at_offset = self.pricer.get_black_scholes_price(spot, offset_strike, tau, self.config.is_call)?;

        let mut max_price = price_at_strike;
        let mut min_price = price_at_offset;
        if self.config.is_call {
            if spot.is_zero() {
                return Err(VaultError::DivisionByZero);
            }
            max_price = max_price.checked_div(spot)?;
            min_price = min_price.checked_div(spot)?;
        }
        Ok((max_price, min_price, offset_strike, spot, tau))
    }

    pub fn initialize_auction(&mut self, caller: &Addr, now: UnixTimestamp) -> Result<Vec<VaultEvent>, VaultError> {
        self.require_keeper(caller)?;
        let expiry = now.next_friday()?;
        let raw_strike = self.pricer.get_delta_strike_price(self.config.is_call, expiry, self.config.delta)?;
        let strike = self.pricer.snap_to_grid(self.config.is_call, raw_strike);
        let long_id = make_token_id(TokenType::long(self.config.is_call), expiry, strike);
        let short_id = make_token_id(TokenType::short(self.config.is_call), expiry, strike);

        let friday = now.friday()?;
        let start_time = friday.checked_add_seconds(self.config.start_offset)?;
        let end_time = friday.checked_add_seconds(self.config.end_offset)?;

        self.auction_processed = false;
        self.start_time = start_time;
        self.options.insert(
            self.epoch,
            OptionParams {
                expiry,
                strike,
                long_token_id: long_id,
                short_token_id: short_id,
            },
        );

        let epoch = self.epoch;
        let auction = self.auctions.entry(epoch).or_default();
        let mut events = auction.initialize(
            epoch,
            InitAuctionParams {
                expiry,
                strike,
                long_token_id: long_id,
                start_time,
                end_time,
            },
            now,
        );
        events.push(VaultEvent::OptionParametersSet {
            epoch,
            expiry,
            strike,
            long_token_id: long_id,
            short_token_id: short_id,
        });

        if self.auctions[&epoch].status == AuctionStatus::Initialized {
            let (max_price, min_price, offset_strike, spot, tau) = self.derive_auction_prices(expiry, strike, now)?;
            let auction = self.auctions.get_mut(&epoch).unwrap();
            events.extend(auction.set_auction_prices(epoch, max_price, min_price)?);
            events.push(VaultEvent::AuctionPricesSet {
                epoch,
                strike,
                offset_strike,
                spot,
                tau,
                max_price,
                min_price,
            });
        }
        Ok(events)
    }

    pub fn initialize_epoch(&mut self, caller: &Addr, now: UnixTimestamp) -> Result<Vec<VaultEvent>, VaultError> {
        self.require_keeper(caller)?;
        let mut events = Vec::new();

        if self.epoch > 0 {
            let reserved = self.total_reserves()?;
            if !reserved.is_zero() {
                self.pool.withdraw_reserved_liquidity(&self.address, reserved, self.config.is_call)?;
                events.push(VaultEvent::ReservedLiquidityWithdrawn {
                    epoch: self.epoch,
                    amount: reserved,
                });
            }
            let total_assets = self.total_assets()?;
            if let Some(outcome) = accounting::collect_performance_fee(
                total_assets,
                self.total_withdrawals,
                self.last_total_assets,
                self.config.performance_fee,
            )? {
                if !outcome.fee.is_zero() {
                    self.collateral_token.transfer(&self.address, &self.config.fee_recipient, outcome.fee)?;
                }
                events.push(VaultEvent::PerformanceFeeCollected {
                    epoch: self.epoch,
                    net_income: outcome.net_income,
                    fee_in_collateral: outcome.fee,
                });
            }
            self.total_withdrawals = Uint256::zero();
        }

        let assets_before = self.total_assets()?;
        let supply_before = self.shares.total_supply;
        let (collateral_transferred, shares_minted) =
            self.queue.process_deposits(assets_before, supply_before, self.epoch + 1)?;
        if !collateral_transferred.is_zero() {
            self.collateral_token
                .transfer(&self.config.queue_address, &self.address, collateral_transferred)?;
            self.shares.mint(&self.config.queue_address, shares_minted);
        }

        self.epoch += 1;
        Ok(events)
    }

    pub fn process_auction(&mut self, caller: &Addr, now: UnixTimestamp) -> Result<Vec<VaultEvent>, VaultError> {
        self.require_keeper(caller)?;
        let epoch = self.epoch;
        let option = self.options.get(&epoch).ok_or(VaultError::BadStatus)?.clone();
        self.last_total_assets = self.total_assets()?;

        let status = self.auctions.get(&epoch).ok_or(VaultError::BadStatus)?.status;
        if status != AuctionStatus::Finalized && status != AuctionStatus::Cancelled {
            return Err(VaultError::BadStatus);
        }

        let mut events = Vec::new();
        if status == AuctionStatus::Finalized {
            let premium = self.auctions.get_mut(&epoch).unwrap().transfer_premium()?;
            let sold = self.auctions[&epoch].total_contracts_sold;

            let collateral_used = if !sold.is_zero() {
                let collateral_used = Fixed64x64::from_contracts_to_collateral(
                    sold,
                    self.config.is_call,
                    self.config.underlying_decimals,
                    self.config.base_decimals,
                    option.strike,
                )?;
                let holder = self.auction_token_holder(epoch);
                self.pool
                    .write_from(&self.address, &holder, option.expiry, option.strike, sold, self.config.is_call)?;
                let divest_ts = now.checked_add_seconds(crate::auction::WITHDRAW_HOLD_SECONDS)?;
                self.pool.set_divestment_timestamp(&self.address, divest_ts, self.config.is_call)?;
                collateral_used
            } else {
                Uint256::zero()
            };
            events.push(VaultEvent::AuctionProcessed {
                epoch,
                collateral_used,
                short_contracts: sold,
                premiums: premium,
            });

            let long_balance = self.pool.balance_of(&self.auction_token_holder(epoch), option.long_token_id);
            self.auctions.get_mut(&epoch).unwrap().process_auction(now, long_balance)?;
            events.push(VaultEvent::AuctionStatusSet {
                epoch,
                status: AuctionStatus::Processed,
            });
        }

        self.auction_processed = true;
        Ok(events)
    }

    // --- views ---

    pub fn get_epoch(&self) -> u64 {
        self.epoch
    }

    pub fn get_option(&self, epoch: u64) -> Option<&OptionParams> {
        self.options.get(&epoch)
    }

    pub fn get_auction(&self, epoch: u64) -> Option<&Auction> {
        self.auctions.get(&epoch)
    }

    pub fn get_status(&self, epoch: u64) -> Option<AuctionStatus> {
        self.auctions.get(&epoch).map(|a| a.status)
    }

    pub fn is_cancelled(&self, epoch: u64) -> bool {
        matches!(self.get_status(epoch), Some(AuctionStatus::Cancelled))
    }

    pub fn is_finalized(&self, epoch: u64) -> bool {
        matches!(
            self.get_status(epoch),
            Some(AuctionStatus::Finalized) | Some(AuctionStatus::Processed)
        )
    }

    pub fn get_total_contracts(&self, epoch: u64) -> Uint256 {
        self.auctions.get(&epoch).map(|a| a.total_contracts).unwrap_or(Uint256::zero())
    }

    pub fn get_total_contracts_sold(&self, epoch: u64) -> Uint256 {
        self.auctions
            .get(&epoch)
            .map(|a| a.total_contracts_sold)
            .unwrap_or(Uint256::zero())
    }

    pub fn get_order_by_id(&self, epoch: u64, id: OrderId) -> Option<&crate::orderbook::Order> {
        self.auctions.get(&epoch).and_then(|a| a.book.get_order_by_id(id))
    }

    pub fn get_epochs_by_buyer(&self, buyer: &Addr) -> Vec<u64> {
        self.buyer_epochs.get(buyer).map(|s| s.iter().copied().collect()).unwrap_or_default()
    }
}

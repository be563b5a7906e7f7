//! Per-epoch deposit buffer. Collateral queued mid-epoch is converted
//! into vault shares only once, at `processDeposits`, via a fungible
//! claim token unique to that epoch; holders redeem at the epoch's
//! frozen price-per-share whenever they like afterwards.

use cosmwasm_std::{Addr, Uint256};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::VaultError;

fn wad() -> Uint256 {
    Uint256::from(1_000_000_000_000_000_000u128)
}

/// Packs `(queueAddress, epoch)` into a 256-bit claim-token id: the top
/// 20 bytes are the queue's address bytes, the next 8 the epoch, the
/// remaining 4 zero.
pub fn make_claim_token_id(queue_address: &Addr, epoch: u64) -> Uint256 {
    let mut bytes = [0u8; 32];
    let addr_bytes = queue_address.as_bytes();
    let n = addr_bytes.len().min(20);
    bytes[..n].copy_from_slice(&addr_bytes[..n]);
    bytes[20..28].copy_from_slice(&epoch.to_be_bytes());
    Uint256::new(bytes)
}

pub fn parse_claim_token_id(id: Uint256) -> ([u8; 20], u64) {
    let bytes = id.to_be_bytes();
    let mut addr_bytes = [0u8; 20];
    addr_bytes.copy_from_slice(&bytes[..20]);
    let mut epoch_bytes = [0u8; 8];
    epoch_bytes.copy_from_slice(&bytes[20..28]);
    (addr_bytes, u64::from_be_bytes(epoch_bytes))
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DepositQueue {
    queue_address: Addr,
    pub current_token_id: Uint256,
    pub max_tvl: Uint256,
    pub paused: bool,
    pub collateral_balance: Uint256,
    price_per_share: HashMap<Uint256, Uint256>,
    balances: HashMap<(Uint256, Addr), Uint256>,
    supply: HashMap<Uint256, Uint256>,
    holder_token_ids: HashMap<Addr, BTreeSet<Uint256>>,
}

impl DepositQueue {
    pub fn new(queue_address: Addr, max_tvl: Uint256) -> Self {
        DepositQueue {
            current_token_id: make_claim_token_id(&queue_address, 0),
            queue_address,
            max_tvl,
            paused: false,
            collateral_balance: Uint256::zero(),
            price_per_share: HashMap::new(),
            balances: HashMap::new(),
            supply: HashMap::new(),
            holder_token_ids: HashMap::new(),
        }
    }

    pub fn balance_of(&self, token_id: Uint256, holder: &Addr) -> Uint256 {
        self.balances
            .get(&(token_id, holder.clone()))
            .copied()
            .unwrap_or(Uint256::zero())
    }

    pub fn supply_of(&self, token_id: Uint256) -> Uint256 {
        self.supply.get(&token_id).copied().unwrap_or(Uint256::zero())
    }

    fn credit(&mut self, token_id: Uint256, holder: &Addr, amount: Uint256) {
        let entry = self.balances.entry((token_id, holder.clone())).or_insert(Uint256::zero());
        *entry += amount;
        let supply = self.supply.entry(token_id).or_insert(Uint256::zero());
        *supply += amount;
        self.holder_token_ids
            .entry(holder.clone())
            .or_default()
            .insert(token_id);
    }

    fn debit(&mut self, token_id: Uint256, holder: &Addr, amount: Uint256) {
        if let Some(bal) = self.balances.get_mut(&(token_id, holder.clone())) {
            *bal -= amount;
            if bal.is_zero() {
                if let Some(set) = self.holder_token_ids.get_mut(holder) {
                    set.remove(&token_id);
                }
            }
        }
        if let Some(supply) = self.supply.get_mut(&token_id) {
            *supply -= amount;
        }
    }

    /// Queues `amount` collateral, minting claim tokens of the current
    /// epoch's id. If the depositor is still holding claim tokens from an
    /// already-processed epoch, those are swept into vault shares first
    /// (the returned amount) so a depositor never holds claims against
    /// more than one unprocessed epoch at a time.
    pub fn deposit(
        &mut self,
        depositor: &Addr,
        amount: Uint256,
    ) -> Result<Uint256, VaultError> {
        if self.paused {
            return Err(VaultError::Paused);
        }
        if amount.is_zero() {
            return Err(VaultError::InvalidArgument);
        }
        let prospective = self
            .collateral_balance
            .checked_add(amount)
            .map_err(|_| VaultError::Overflow)?;
        if prospective > self.max_tvl {
            return Err(VaultError::MaxTvlExceeded);
        }
        let auto_redeemed_shares = self.redeem_max(depositor)?;
        self.collateral_balance = prospective;
        self.credit(self.current_token_id, depositor, amount);
        Ok(auto_redeemed_shares)
    }

    /// Same-epoch withdrawal: burns `amount` of the current claim token
    /// and returns the collateral to give back to the depositor.
    pub fn cancel(&mut self, depositor: &Addr, amount: Uint256) -> Result<(), VaultError> {
        if amount.is_zero() {
            return Err(VaultError::InvalidArgument);
        }
        let bal = self.balance_of(self.current_token_id, depositor);
        if amount > bal {
            return Err(VaultError::ValueExceedsMaximum);
        }
        self.debit(self.current_token_id, depositor, amount);
        self.collateral_balance = self
            .collateral_balance
            .checked_sub(amount)
            .map_err(|_| VaultError::Overflow)?;
        Ok(())
    }

    /// Sweeps all queued collateral into the vault, returning
    /// `(collateralTransferred, sharesMinted)`. `vault_total_assets_before`
    /// and `vault_total_share_supply` must be sampled before the transfer.
    /// Rolls `current_token_id` forward to `next_epoch`.
    pub fn process_deposits(
        &mut self,
        vault_total_assets_before: Uint256,
        vault_total_share_supply: Uint256,
        next_epoch: u64,
    ) -> Result<(Uint256, Uint256), VaultError> {
        let queued = self.collateral_balance;
        let processed_token_id = self.current_token_id;
        let current_supply = self.supply_of(processed_token_id);

        let shares_minted = if vault_total_share_supply.is_zero() {
            queued
        } else if vault_total_assets_before.is_zero() {
            return Err(VaultError::DivisionByZero);
        } else {
            queued
                .checked_mul(vault_total_share_supply)
                .map_err(|_| VaultError::Overflow)?
                .checked_div(vault_total_assets_before)
                .map_err(|_| VaultError::DivisionByZero)?
        };

        let price_per_share = if current_supply.is_zero() {
            Uint256::zero()
        } else {
            shares_minted
                .checked_mul(wad())
                .map_err(|_| VaultError::Overflow)?
                .checked_div(current_supply)
                .map_err(|_| VaultError::DivisionByZero)?
        };
        self.price_per_share.insert(processed_token_id, price_per_share);

        self.collateral_balance = Uint256::zero();
        self.current_token_id = make_claim_token_id(&self.queue_address, next_epoch);

        Ok((queued, shares_minted))
    }

    pub fn price_per_share_of(&self, token_id: Uint256) -> Uint256 {
        self.price_per_share.get(&token_id).copied().unwrap_or(Uint256::zero())
    }

    /// Burns `holder`'s entire balance of `token_id` and returns the
    /// vault shares that balance is worth. Fails if `token_id` is still
    /// the active (unprocessed) epoch's token.
    pub fn redeem(&mut self, token_id: Uint256, holder: &Addr) -> Result<Uint256, VaultError> {
        if token_id == self.current_token_id {
            return Err(VaultError::CurrentClaimTokenNotRedeemable);
        }
        let bal = self.balance_of(token_id, holder);
        if bal.is_zero() {
            return Ok(Uint256::zero());
        }
        let pps = self.price_per_share_of(token_id);
        let shares = bal
            .checked_mul(pps)
            .map_err(|_| VaultError::Overflow)?
            .checked_div(wad())
            .map_err(|_| VaultError::DivisionByZero)?;
        self.debit(token_id, holder, bal);
        Ok(shares)
    }

    /// Redeems every claim token `holder` owns except the current
    /// epoch's, returning the total vault shares produced.
    pub fn redeem_max(&mut self, holder: &Addr) -> Result<Uint256, VaultError> {
        let ids: Vec<Uint256> = self
            .holder_token_ids
            .get(holder)
            .cloned()
            .unwrap_or_default()
            .into_iter()
            .filter(|id| *id != self.current_token_id)
            .collect();
        let mut total = Uint256::zero();
        for id in ids {
            let shares = self.redeem(id, holder)?;
            total = total.checked_add(shares).map_err(|_| VaultError::Overflow)?;
        }
        Ok(total)
    }

    pub fn preview_unredeemed(&self, token_id: Uint256, holder: &Addr) -> Uint256 {
        if token_id == self.current_token_id {
            return Uint256::zero();
        }
        let bal = self.balance_of(token_id, holder);
        let pps = self.price_per_share_of(token_id);
        bal.checked_mul(pps)
            .ok()
            .and_then(|v| v.checked_div(wad()).ok())
            .unwrap_or(Uint256::zero())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(s: &str) -> Addr {
        Addr::unchecked(s)
    }

    #[test]
    fn deposit_then_cancel_round_trips_exactly() {
        let mut q = DepositQueue::new(addr("queue"), Uint256::from(1_000_000u128));
        let depositor = addr("alice");
        q.deposit(&depositor, Uint256::from(500u128)).unwrap();
        assert_eq!(q.balance_of(q.current_token_id, &depositor), Uint256::from(500u128));
        q.cancel(&depositor, Uint256::from(500u128)).unwrap();
        assert_eq!(q.balance_of(q.current_token_id, &depositor), Uint256::zero());
        assert_eq!(q.collateral_balance, Uint256::zero());
    }

    #[test]
    fn deposit_while_paused_fails() {
        let mut q = DepositQueue::new(addr("queue"), Uint256::from(1_000_000u128));
        q.paused = true;
        assert_eq!(
            q.deposit(&addr("alice"), Uint256::from(100u128)).unwrap_err(),
            VaultError::Paused
        );
    }

    #[test]
    fn deposit_exceeding_max_tvl_fails() {
        let mut q = DepositQueue::new(addr("queue"), Uint256::from(100u128));
        assert_eq!(
            q.deposit(&addr("alice"), Uint256::from(101u128)).unwrap_err(),
            VaultError::MaxTvlExceeded
        );
    }

    #[test]
    fn process_deposits_first_epoch_is_one_to_one() {
        let mut q = DepositQueue::new(addr("queue"), Uint256::from(1_000_000u128));
        let depositor = addr("alice");
        q.deposit(&depositor, Uint256::from(10_000u128)).unwrap();
        let (collateral, shares) = q
            .process_deposits(Uint256::zero(), Uint256::zero(), 1)
            .unwrap();
        assert_eq!(collateral, Uint256::from(10_000u128));
        assert_eq!(shares, Uint256::from(10_000u128));
    }

    #[test]
    fn redeem_yields_balance_times_price_per_share() {
        let mut q = DepositQueue::new(addr("queue"), Uint256::from(1_000_000u128));
        let depositor = addr("alice");
        let token0 = q.current_token_id;
        q.deposit(&depositor, Uint256::from(10_000u128)).unwrap();
        q.process_deposits(Uint256::zero(), Uint256::zero(), 1).unwrap();

        let shares = q.redeem(token0, &depositor).unwrap();
        assert_eq!(shares, Uint256::from(10_000u128));
        assert_eq!(q.balance_of(token0, &depositor), Uint256::zero());
    }

    #[test]
    fn current_epoch_token_is_never_redeemable() {
        let mut q = DepositQueue::new(addr("queue"), Uint256::from(1_000_000u128));
        let current = q.current_token_id;
        assert_eq!(
            q.redeem(current, &addr("alice")).unwrap_err(),
            VaultError::CurrentClaimTokenNotRedeemable
        );
    }

    #[test]
    fn depositing_again_sweeps_prior_processed_epoch_claims() {
        let mut q = DepositQueue::new(addr("queue"), Uint256::from(1_000_000u128));
        let depositor = addr("alice");
        q.deposit(&depositor, Uint256::from(10_000u128)).unwrap();
        q.process_deposits(Uint256::zero(), Uint256::zero(), 1).unwrap();

        // New epoch deposit should auto-sweep the epoch-0 claim.
        let auto_redeemed = q.deposit(&depositor, Uint256::from(5_000u128)).unwrap();
        assert_eq!(auto_redeemed, Uint256::from(10_000u128));
    }
}

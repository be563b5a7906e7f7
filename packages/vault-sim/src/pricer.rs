//! Black-Scholes pricer mock: a fixed spot/volatility pair driving delta
//! inversion and option pricing. f64-bridged throughout, see
//! `vault_core::fixed` for why that's acceptable here but nowhere else in
//! the engine.

use vault_core::error::VaultError;
use vault_core::fixed::Fixed64x64;
use vault_core::time::UnixTimestamp;

/// Time-to-maturity assumed for delta-strike selection: the vault always
/// calls `get_delta_strike_price` right at weekly auction initialization,
/// so a fixed one-week tenor stands in for `(expiry - now) / 365`.
const WEEKLY_TAU_NUM: i64 = 7;
const DAYS_PER_YEAR: i64 = 365;

#[derive(Debug, Clone, Copy)]
pub struct MockPricer {
    pub spot: Fixed64x64,
    pub volatility: Fixed64x64,
}

impl MockPricer {
    pub fn new(spot: Fixed64x64, volatility: Fixed64x64) -> Self {
        MockPricer { spot, volatility }
    }

    fn weekly_tau(&self) -> Result<Fixed64x64, VaultError> {
        Fixed64x64::from_i64(WEEKLY_TAU_NUM).checked_div(Fixed64x64::from_i64(DAYS_PER_YEAR))
    }

    fn d1_d2(&self, strike: Fixed64x64, tau: Fixed64x64) -> Result<(Fixed64x64, Fixed64x64), VaultError> {
        if !strike.is_positive() || !tau.is_positive() {
            return Err(VaultError::InvalidArgument);
        }
        let sigma_sqrt_tau = self.volatility.checked_mul(tau.sqrt()?)?;
        if sigma_sqrt_tau.is_zero() {
            return Err(VaultError::DivisionByZero);
        }
        let moneyness = self.spot.checked_div(strike)?.ln()?;
        let half_var_tau = self
            .volatility
            .checked_mul(self.volatility)?
            .checked_mul(tau)?
            .checked_div(Fixed64x64::from_i64(2))?;
        let d1 = moneyness.checked_add(half_var_tau)?.checked_div(sigma_sqrt_tau)?;
        let d2 = d1.checked_sub(sigma_sqrt_tau)?;
        Ok((d1, d2))
    }
}

impl vault_core::collaborators::Pricer for MockPricer {
    fn latest_answer(&self) -> Fixed64x64 {
        self.spot
    }

    fn get_time_to_maturity(&self, expiry: UnixTimestamp, now: UnixTimestamp) -> Fixed64x64 {
        let seconds = expiry.seconds().saturating_sub(now.seconds()).max(0);
        let days = seconds / vault_core::time::SECONDS_PER_DAY;
        Fixed64x64::from_i64(days)
            .checked_div(Fixed64x64::from_i64(DAYS_PER_YEAR))
            .unwrap_or(Fixed64x64::ZERO)
    }

    fn get_delta_strike_price(
        &self,
        is_call: bool,
        _expiry: UnixTimestamp,
        delta: Fixed64x64,
    ) -> Result<Fixed64x64, VaultError> {
        if !delta.is_positive() {
            return Err(VaultError::InvalidArgument);
        }
        let tau = self.weekly_tau()?;
        let sigma_sqrt_tau = self.volatility.checked_mul(tau.sqrt()?)?;
        // Call delta = N(d1); put delta magnitude = 1 - N(d1).
        let target = if is_call {
            delta
        } else {
            Fixed64x64::ONE.checked_sub(delta)?
        };
        let d1 = target.inv_normal_cdf()?;
        let half_var_tau = self
            .volatility
            .checked_mul(self.volatility)?
            .checked_mul(tau)?
            .checked_div(Fixed64x64::from_i64(2))?;
        let exponent = half_var_tau.checked_sub(d1.checked_mul(sigma_sqrt_tau)?)?;
        self.spot.checked_mul(exponent.exp()?)
    }

    fn snap_to_grid(&self, is_call: bool, x: Fixed64x64) -> Fixed64x64 {
        // Round strikes away from the money: calls round up, puts round
        // down, so the sold strike is never more aggressive than the one
        // the delta target actually implied.
        if is_call {
            x.ceil64x64().unwrap_or(x)
        } else {
            x.floor64x64().unwrap_or(x)
        }
    }

    fn get_black_scholes_price(
        &self,
        spot: Fixed64x64,
        strike: Fixed64x64,
        tau: Fixed64x64,
        is_call: bool,
    ) -> Result<Fixed64x64, VaultError> {
        let priced = MockPricer { spot, volatility: self.volatility };
        let (d1, d2) = priced.d1_d2(strike, tau)?;
        if is_call {
            let n_d1 = d1.normal_cdf()?;
            let n_d2 = d2.normal_cdf()?;
            spot.checked_mul(n_d1)?.checked_sub(strike.checked_mul(n_d2)?)
        } else {
            let n_neg_d2 = (-d2).normal_cdf()?;
            let n_neg_d1 = (-d1).normal_cdf()?;
            strike.checked_mul(n_neg_d2)?.checked_sub(spot.checked_mul(n_neg_d1)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vault_core::collaborators::Pricer;

    fn dec(s: &str) -> Fixed64x64 {
        Fixed64x64::from_decimal_str(s).unwrap()
    }

    #[test]
    fn atm_call_and_put_prices_satisfy_put_call_parity_at_zero_rate() {
        let pricer = MockPricer::new(dec("2000"), dec("0.6"));
        let tau = dec("0.1");
        let call = pricer.get_black_scholes_price(dec("2000"), dec("2000"), tau, true).unwrap();
        let put = pricer.get_black_scholes_price(dec("2000"), dec("2000"), tau, false).unwrap();
        // call - put = spot - strike (zero-rate parity)
        let lhs = call.checked_sub(put).unwrap();
        let rhs = dec("2000").checked_sub(dec("2000")).unwrap();
        assert!((lhs.raw() - rhs.raw()).abs() < (1i128 << 40));
    }

    #[test]
    fn delta_strike_is_below_spot_for_calls_above_for_puts() {
        let pricer = MockPricer::new(dec("2000"), dec("0.5"));
        let call_strike = pricer.get_delta_strike_price(true, UnixTimestamp::from_seconds(0), dec("0.3")).unwrap();
        let put_strike = pricer.get_delta_strike_price(false, UnixTimestamp::from_seconds(0), dec("0.3")).unwrap();
        assert!(call_strike > dec("2000"));
        assert!(put_strike < dec("2000"));
    }
}

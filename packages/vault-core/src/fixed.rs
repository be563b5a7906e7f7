//! Signed 64.64 fixed-point arithmetic.
//!
//! Values are stored as a raw [i128]: the high 64 bits carry the sign and
//! integer part, the low 64 bits carry the fraction. This mirrors the
//! ABDKMath64x64 representation the option-vault contracts this engine
//! reimplements were built on, so that strike/price literals translate
//! one-to-one with the values a keeper or auditor would recognize.

use cosmwasm_std::{Int256, Uint256};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::ops::Neg;

use crate::error::VaultError;

const FRACTIONAL_BITS: u32 = 64;

/// A signed 64.64 fixed-point number.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize, Hash)]
pub struct Fixed64x64(i128);

impl Fixed64x64 {
    pub const ZERO: Self = Fixed64x64(0);
    pub const ONE: Self = Fixed64x64(1i128 << FRACTIONAL_BITS);
    pub const TEN: Self = Fixed64x64(10i128 << FRACTIONAL_BITS);

    /// Sentinel written into `Auction::lastPrice` when an auction is
    /// cancelled. Load-bearing: withdraw() branches on `price < MAX`.
    pub const MAX: Self = Fixed64x64(i128::MAX);

    pub const fn from_raw(raw: i128) -> Self {
        Fixed64x64(raw)
    }

    pub const fn raw(self) -> i128 {
        self.0
    }

    pub const fn from_i64(n: i64) -> Self {
        Fixed64x64((n as i128) << FRACTIONAL_BITS)
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn is_positive(self) -> bool {
        self.0 > 0
    }

    /// Parses a plain decimal string such as `"24.55"` or `"-0.01"` into the
    /// nearest representable 64.64 value.
    pub fn from_decimal_str(s: &str) -> Result<Self, VaultError> {
        let (negative, s) = match s.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, s),
        };
        let (int_part, frac_part) = match s.split_once('.') {
            Some((i, f)) => (i, f),
            None => (s, ""),
        };
        let int_part: i128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().map_err(|_| VaultError::InvalidArgument)?
        };
        let mut raw = int_part
            .checked_shl(FRACTIONAL_BITS)
            .ok_or(VaultError::Overflow)?;

        if !frac_part.is_empty() {
            let numerator: i128 = frac_part.parse().map_err(|_| VaultError::InvalidArgument)?;
            let denominator = 10i128
                .checked_pow(frac_part.len() as u32)
                .ok_or(VaultError::Overflow)?;
            let scaled = Int256::from(numerator)
                .checked_mul(Int256::from(1i128 << FRACTIONAL_BITS))
                .map_err(|_| VaultError::Overflow)?
                .checked_div(Int256::from(denominator))
                .map_err(|_| VaultError::DivisionByZero)?;
            let scaled: i128 = scaled.try_into().map_err(|_| VaultError::Overflow)?;
            raw = raw.checked_add(scaled).ok_or(VaultError::Overflow)?;
        }

        if negative {
            raw = -raw;
        }
        Ok(Fixed64x64(raw))
    }

    pub fn checked_add(self, rhs: Self) -> Result<Self, VaultError> {
        self.0
            .checked_add(rhs.0)
            .map(Fixed64x64)
            .ok_or(VaultError::Overflow)
    }

    pub fn checked_sub(self, rhs: Self) -> Result<Self, VaultError> {
        self.0
            .checked_sub(rhs.0)
            .map(Fixed64x64)
            .ok_or(VaultError::Overflow)
    }

    fn widen(self) -> Int256 {
        Int256::from(self.0)
    }

    fn narrow(value: Int256) -> Result<i128, VaultError> {
        value.try_into().map_err(|_| VaultError::Overflow)
    }

    pub fn checked_mul(self, rhs: Self) -> Result<Self, VaultError> {
        let scale = Int256::from(1i128 << FRACTIONAL_BITS);
        let wide = self
            .widen()
            .checked_mul(rhs.widen())
            .map_err(|_| VaultError::Overflow)?
            .checked_div(scale)
            .map_err(|_| VaultError::DivisionByZero)?;
        Ok(Fixed64x64(Self::narrow(wide)?))
    }

    pub fn checked_div(self, rhs: Self) -> Result<Self, VaultError> {
        if rhs.is_zero() {
            return Err(VaultError::DivisionByZero);
        }
        let scale = Int256::from(1i128 << FRACTIONAL_BITS);
        let wide = self
            .widen()
            .checked_mul(scale)
            .map_err(|_| VaultError::Overflow)?
            .checked_div(rhs.widen())
            .map_err(|_| VaultError::DivisionByZero)?;
        Ok(Fixed64x64(Self::narrow(wide)?))
    }

    /// `price x size`, where `price` is a non-negative 64.64 value and
    /// `size` is an unsigned 256-bit contract count, yielding collateral
    /// units. Used throughout the auction engine to cost orders.
    pub fn muli(self, size: Uint256) -> Result<Uint256, VaultError> {
        if self.is_negative() {
            return Err(VaultError::InvalidArgument);
        }
        let scale = Uint256::from(1u128) << 64u32;
        let price = Uint256::from(self.0 as u128);
        price
            .checked_mul(size)
            .map_err(|_| VaultError::Overflow)?
            .checked_div(scale)
            .map_err(|_| VaultError::DivisionByZero)
    }

    /// Largest power of ten less than or equal to `self`. `self` must be
    /// strictly positive.
    fn largest_pow10_le(self) -> Result<Self, VaultError> {
        let mut p = Fixed64x64::ONE;
        if p.0 <= self.0 {
            loop {
                let next = p.checked_mul(Fixed64x64::TEN)?;
                if next.0 <= self.0 {
                    p = next;
                } else {
                    break;
                }
            }
        } else {
            loop {
                let prev = p.checked_div(Fixed64x64::TEN)?;
                if prev.0 == 0 {
                    return Err(VaultError::Overflow);
                }
                p = prev;
                if p.0 <= self.0 {
                    break;
                }
            }
        }
        Ok(p)
    }

    /// Rounds `x > 0` to two significant decimal digits, rounding the
    /// second digit up. Pinned behaviour, see module docs on the rounding
    /// scenarios this must reproduce exactly.
    pub fn ceil64x64(self) -> Result<Self, VaultError> {
        self.round_to_two_sig_figs(true)
    }

    /// As [Self::ceil64x64] but rounds down.
    pub fn floor64x64(self) -> Result<Self, VaultError> {
        self.round_to_two_sig_figs(false)
    }

    fn round_to_two_sig_figs(self, round_up: bool) -> Result<Self, VaultError> {
        if self.0 <= 0 {
            return Err(VaultError::InvalidArgument);
        }
        let target = self.checked_div(Fixed64x64::TEN)?;
        let p = target.largest_pow10_le()?;
        let q = self.checked_div(p)?;
        let int_part = q.0 >> FRACTIONAL_BITS;
        let has_fraction = (q.0 & ((1i128 << FRACTIONAL_BITS) - 1)) != 0;
        let rounded_int = if round_up && has_fraction {
            int_part + 1
        } else {
            int_part
        };
        let rounded = Fixed64x64::from_i64(
            i64::try_from(rounded_int).map_err(|_| VaultError::Overflow)?,
        );
        rounded.checked_mul(p)
    }

    /// Rescales a value by `10^(base_decimals - underlying_decimals)`,
    /// preserving sign. Used to move amounts between token decimal bases.
    pub fn to_base_token_amount(
        underlying_decimals: u32,
        base_decimals: u32,
        value: Uint256,
    ) -> Result<Uint256, VaultError> {
        if base_decimals >= underlying_decimals {
            let factor = Uint256::from(10u128)
                .checked_pow(base_decimals - underlying_decimals)
                .map_err(|_| VaultError::Overflow)?;
            value.checked_mul(factor).map_err(|_| VaultError::Overflow)
        } else {
            let factor = Uint256::from(10u128)
                .checked_pow(underlying_decimals - base_decimals)
                .map_err(|_| VaultError::Overflow)?;
            value
                .checked_div(factor)
                .map_err(|_| VaultError::DivisionByZero)
        }
    }

    /// Converts a contract count into the collateral units backing it. Call
    /// collateral is the underlying itself; put collateral is `size x
    /// strike` rescaled into base decimals.
    pub fn from_contracts_to_collateral(
        size: Uint256,
        is_call: bool,
        underlying_decimals: u32,
        base_decimals: u32,
        strike: Fixed64x64,
    ) -> Result<Uint256, VaultError> {
        if is_call {
            Ok(size)
        } else {
            let notional = strike.muli(size)?;
            Self::to_base_token_amount(underlying_decimals, base_decimals, notional)
        }
    }

    /// Inverse of [Self::from_contracts_to_collateral].
    pub fn from_collateral_to_contracts(
        collateral: Uint256,
        is_call: bool,
        base_decimals: u32,
        underlying_decimals: u32,
        strike: Fixed64x64,
    ) -> Result<Uint256, VaultError> {
        if is_call {
            Ok(collateral)
        } else {
            if strike.is_zero() {
                return Err(VaultError::DivisionByZero);
            }
            let rescaled =
                Self::to_base_token_amount(base_decimals, underlying_decimals, collateral)?;
            let scale = Uint256::from(1u128) << 64u32;
            rescaled
                .checked_mul(scale)
                .map_err(|_| VaultError::Overflow)?
                .checked_div(Uint256::from(strike.0 as u128))
                .map_err(|_| VaultError::DivisionByZero)
        }
    }

    /// Fixed-point square root via Newton's method, bridged through `f64`.
    /// Only ever consumed by the (out-of-scope) pricer's Black-Scholes
    /// implementation, so ULP-exactness is not load bearing here.
    pub fn sqrt(self) -> Result<Self, VaultError> {
        if self.is_negative() {
            return Err(VaultError::InvalidArgument);
        }
        Self::from_f64(self.to_f64().sqrt())
    }

    pub fn exp(self) -> Result<Self, VaultError> {
        Self::from_f64(self.to_f64().exp())
    }

    pub fn ln(self) -> Result<Self, VaultError> {
        if !self.is_positive() {
            return Err(VaultError::InvalidArgument);
        }
        Self::from_f64(self.to_f64().ln())
    }

    /// Acklam's rational approximation of the inverse standard normal CDF.
    pub fn inv_normal_cdf(self) -> Result<Self, VaultError> {
        let p = self.to_f64();
        if !(0.0..1.0).contains(&p) || p <= 0.0 {
            return Err(VaultError::InvalidArgument);
        }
        Self::from_f64(inv_normal_cdf_f64(p))
    }

    /// Abramowitz & Stegun 7.1.26 approximation of the standard normal CDF.
    /// Only consumed by the Black-Scholes pricer mock.
    pub fn normal_cdf(self) -> Result<Self, VaultError> {
        Self::from_f64(normal_cdf_f64(self.to_f64()))
    }

    fn to_f64(self) -> f64 {
        self.0 as f64 / (1u128 << FRACTIONAL_BITS) as f64
    }

    fn from_f64(v: f64) -> Result<Self, VaultError> {
        if !v.is_finite() {
            return Err(VaultError::Overflow);
        }
        let raw = v * (1u128 << FRACTIONAL_BITS) as f64;
        if raw >= i128::MAX as f64 || raw <= i128::MIN as f64 {
            return Err(VaultError::Overflow);
        }
        Ok(Fixed64x64(raw as i128))
    }
}

/// Acklam's algorithm (see P. J. Acklam, "An algorithm for computing the
/// inverse normal cumulative distribution function").
fn inv_normal_cdf_f64(p: f64) -> f64 {
    const A: [f64; 6] = [
        -3.969_683_028_665_376e+01,
        2.209_460_984_245_205e+02,
        -2.759_285_104_469_687e+02,
        1.383_577_518_672_690e+02,
        -3.066_479_806_614_716e+01,
        2.506_628_277_459_239,
    ];
    const B: [f64; 5] = [
        -5.447_609_879_822_406e+01,
        1.615_858_368_580_409e+02,
        -1.556_989_798_598_866e+02,
        6.680_131_188_771_972e+01,
        -1.328_068_155_288_572e+01,
    ];
    const C: [f64; 6] = [
        -7.784_894_002_430_293e-03,
        -3.223_964_580_411_365e-01,
        -2.400_758_277_161_838,
        -2.549_732_539_343_734,
        4.374_664_141_464_968,
        2.938_163_982_698_783,
    ];
    const D: [f64; 4] = [
        7.784_695_709_041_462e-03,
        3.224_671_290_700_398e-01,
        2.445_134_137_142_996,
        3.754_408_661_907_416,
    ];

    let p_low = 0.024_25;
    let p_high = 1.0 - p_low;

    if p < p_low {
        let q = (-2.0 * p.ln()).sqrt();
        (((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    } else if p <= p_high {
        let q = p - 0.5;
        let r = q * q;
        (((((A[0] * r + A[1]) * r + A[2]) * r + A[3]) * r + A[4]) * r + A[5]) * q
            / (((((B[0] * r + B[1]) * r + B[2]) * r + B[3]) * r + B[4]) * r + 1.0)
    } else {
        let q = (-2.0 * (1.0 - p).ln()).sqrt();
        -(((((C[0] * q + C[1]) * q + C[2]) * q + C[3]) * q + C[4]) * q + C[5])
            / ((((D[0] * q + D[1]) * q + D[2]) * q + D[3]) * q + 1.0)
    }
}

/// Abramowitz & Stegun formula 7.1.26, max error ~1.5e-7.
fn normal_cdf_f64(x: f64) -> f64 {
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs() / std::f64::consts::SQRT_2;
    let t = 1.0 / (1.0 + 0.327_591_1 * x);
    let y = 1.0
        - ((((1.061_405_429 * t - 1.453_152_027) * t + 1.421_413_741) * t - 0.284_496_736) * t
            + 0.254_829_592)
            * t
            * (-x * x).exp();
    0.5 * (1.0 + sign * y)
}

impl Neg for Fixed64x64 {
    type Output = Fixed64x64;

    fn neg(self) -> Self::Output {
        Fixed64x64(-self.0)
    }
}

impl fmt::Debug for Fixed64x64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self)
    }
}

impl fmt::Display for Fixed64x64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let negative = self.0 < 0;
        let magnitude = self.0.unsigned_abs();
        let int_part = magnitude >> FRACTIONAL_BITS;
        let frac_part = magnitude & ((1u128 << FRACTIONAL_BITS) - 1);
        let frac_decimal = (frac_part as f64) / (1u128 << FRACTIONAL_BITS) as f64;
        if negative {
            write!(f, "-")?;
        }
        write!(f, "{}", int_part)?;
        if frac_part != 0 {
            write!(f, "{}", format!("{:.18}", frac_decimal).trim_start_matches('0'))?;
        }
        Ok(())
    }
}

impl PartialEq<i64> for Fixed64x64 {
    fn eq(&self, other: &i64) -> bool {
        self.0 == Fixed64x64::from_i64(*other).0
    }
}

impl PartialOrd<i64> for Fixed64x64 {
    fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
        self.0.partial_cmp(&Fixed64x64::from_i64(*other).0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Fixed64x64 {
        Fixed64x64::from_decimal_str(s).unwrap()
    }

    #[test]
    fn ceil_pinned_scenarios() {
        let cases: &[(&str, &str)] = &[
            ("1.0", "1.0"),
            ("90", "90"),
            ("53510034427", "54000000000"),
            ("24450", "25000"),
            ("9999", "10000"),
            ("8863", "8900"),
            ("521", "530"),
            ("12.211", "13"),
            ("24.55", "25"),
            ("1.419", "1.5"),
            ("9.9994", "10"),
            ("0.07745", "0.078"),
            ("0.00994", "0.01"),
            ("0.0000068841", "0.0000069"),
            ("45", "45"),
        ];
        for (input, expected) in cases {
            let got = dec(input).ceil64x64().unwrap();
            let want = dec(expected);
            assert_eq!(got, want, "ceil({input}) = {got}, want {want}");
        }
    }

    #[test]
    fn floor_pinned_scenarios_symmetric() {
        let cases: &[(&str, &str)] = &[
            ("1.0", "1.0"),
            ("90", "90"),
            ("53510034427", "53000000000"),
            ("24450", "24000"),
            ("9999", "9900"),
            ("8863", "8800"),
            ("521", "520"),
            ("12.211", "12"),
            ("24.55", "24"),
            ("1.419", "1.4"),
            ("9.9994", "9.9"),
            ("45", "45"),
        ];
        for (input, expected) in cases {
            let got = dec(input).floor64x64().unwrap();
            let want = dec(expected);
            assert_eq!(got, want, "floor({input}) = {got}, want {want}");
        }
    }

    #[test]
    fn zero_input_is_invalid_argument() {
        assert_eq!(
            Fixed64x64::ZERO.ceil64x64().unwrap_err(),
            VaultError::InvalidArgument
        );
        assert_eq!(
            Fixed64x64::ZERO.floor64x64().unwrap_err(),
            VaultError::InvalidArgument
        );
    }

    #[test]
    fn ceil_and_floor_are_idempotent_on_rounded_inputs() {
        for v in ["90", "8900", "0.078", "0.01", "45", "530"] {
            let x = dec(v);
            assert_eq!(x.ceil64x64().unwrap(), x);
            assert_eq!(x.floor64x64().unwrap(), x);
        }
    }

    #[test]
    fn muli_computes_collateral_cost() {
        let price = dec("2.5");
        let size = Uint256::from(1000u128);
        assert_eq!(price.muli(size).unwrap(), Uint256::from(2500u128));
    }

    #[test]
    fn contracts_collateral_roundtrip_for_puts() {
        let strike = dec("2000");
        let size = Uint256::from(10u128);
        let collateral = Fixed64x64::from_contracts_to_collateral(size, false, 18, 18, strike)
            .unwrap();
        assert_eq!(collateral, Uint256::from(20000u128));
        let back =
            Fixed64x64::from_collateral_to_contracts(collateral, false, 18, 18, strike).unwrap();
        assert_eq!(back, size);
    }

    #[test]
    fn normal_cdf_of_zero_is_one_half() {
        let half = Fixed64x64::ZERO.normal_cdf().unwrap();
        assert!((half.to_f64() - 0.5).abs() < 1e-9);
    }

    #[test]
    fn normal_cdf_and_inverse_round_trip() {
        let p = dec("0.3");
        let x = p.inv_normal_cdf().unwrap();
        let back = x.normal_cdf().unwrap();
        assert!((back.to_f64() - p.to_f64()).abs() < 1e-6);
    }

    #[test]
    fn call_collateral_is_identity() {
        let size = Uint256::from(42u128);
        let collateral =
            Fixed64x64::from_contracts_to_collateral(size, true, 18, 18, dec("2000")).unwrap();
        assert_eq!(collateral, size);
    }
}

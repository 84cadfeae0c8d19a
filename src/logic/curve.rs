use super::error::SandwichError;
use crate::utils::constants::{BPS_DENOMINATOR, UNISWAP_V2_FEE_DENOMINATOR, UNISWAP_V2_FEE_NUMERATOR};
use alloy_primitives::ruint::UintTryFrom;
use alloy_primitives::{U256, U512};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use strum_macros::{Display as StrumDisplay, EnumString};

/// Fee multiplier applied to the input amount before the curve, as an exact
/// rational `numerator / denominator` in (0, 1].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FeeRate {
    numerator: u32,
    denominator: u32,
}

impl FeeRate {
    /// 0.3% fee, as charged by Uniswap V2 style pairs.
    pub const UNISWAP_V2: FeeRate = FeeRate { numerator: UNISWAP_V2_FEE_NUMERATOR, denominator: UNISWAP_V2_FEE_DENOMINATOR };

    pub const NO_FEE: FeeRate = FeeRate { numerator: 1, denominator: 1 };

    pub fn new(numerator: u32, denominator: u32) -> Result<Self, SandwichError> {
        if numerator == 0 || denominator == 0 || numerator > denominator {
            return Err(SandwichError::InvalidFeeRate { numerator, denominator });
        }
        Ok(Self { numerator, denominator })
    }

    /// Build from a fee expressed in basis points, e.g. 30 for 0.3%.
    pub fn from_bps(fee_bps: u32) -> Result<Self, SandwichError> {
        if fee_bps >= BPS_DENOMINATOR {
            return Err(SandwichError::InvalidArgument(format!(
                "fee_bps {} must be below {}",
                fee_bps, BPS_DENOMINATOR
            )));
        }
        Self::new(BPS_DENOMINATOR - fee_bps, BPS_DENOMINATOR)
    }

    pub fn numerator(&self) -> u32 {
        self.numerator
    }

    pub fn denominator(&self) -> u32 {
        self.denominator
    }
}

impl Default for FeeRate {
    fn default() -> Self {
        Self::UNISWAP_V2
    }
}

impl Display for FeeRate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.numerator, self.denominator)
    }
}

/// Which pool token the trader is selling.
#[derive(Copy, Clone, Debug, StrumDisplay, PartialEq, Eq, Hash, EnumString, Serialize, Deserialize)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SwapDirection {
    /// Sell token0, buy token1.
    ZeroForOne,
    /// Sell token1, buy token0.
    OneForZero,
}

impl SwapDirection {
    pub fn opposite(self) -> Self {
        match self {
            SwapDirection::ZeroForOne => SwapDirection::OneForZero,
            SwapDirection::OneForZero => SwapDirection::ZeroForOne,
        }
    }
}

/// Pool balances oriented for one trading direction, at one instant of ledger state.
///
/// Never mutated: every simulated trade yields a new value.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Reserves {
    pub reserve_in: U256,
    pub reserve_out: U256,
}

impl Reserves {
    pub fn new(reserve_in: U256, reserve_out: U256) -> Self {
        Self { reserve_in, reserve_out }
    }

    /// Orient raw pair reserves `(reserve0, reserve1)` for a trade in `direction`.
    pub fn from_pool(reserve0: U256, reserve1: U256, direction: SwapDirection) -> Self {
        match direction {
            SwapDirection::ZeroForOne => Self::new(reserve0, reserve1),
            SwapDirection::OneForZero => Self::new(reserve1, reserve0),
        }
    }

    pub fn validate(&self) -> Result<(), SandwichError> {
        if self.reserve_in.is_zero() || self.reserve_out.is_zero() {
            return Err(SandwichError::InvalidReserves { reserve_in: self.reserve_in, reserve_out: self.reserve_out });
        }
        Ok(())
    }

    /// Same pool seen from the opposite trading direction.
    pub fn reversed(&self) -> Self {
        Self::new(self.reserve_out, self.reserve_in)
    }

    /// Reserves after a swap that paid `amount_in` (fee included, it stays in the
    /// pool) and received `amount_out`.
    pub fn after_swap(&self, amount_in: U256, amount_out: U256) -> Result<Self, SandwichError> {
        let reserve_in = self.reserve_in.checked_add(amount_in).ok_or(SandwichError::Overflow)?;
        let reserve_out = self.reserve_out.checked_sub(amount_out).ok_or_else(|| {
            SandwichError::InvalidArgument(format!("amount_out {} exceeds reserve_out {}", amount_out, self.reserve_out))
        })?;
        Ok(Self::new(reserve_in, reserve_out))
    }

    /// Constant-product invariant `reserve_in * reserve_out`.
    pub fn product(&self) -> U512 {
        widen(self.reserve_in) * widen(self.reserve_out)
    }
}

impl Display for Reserves {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.reserve_in, self.reserve_out)
    }
}

pub(crate) fn widen(value: U256) -> U512 {
    U512::from(value)
}

pub(crate) fn narrow(value: U512) -> Result<U256, SandwichError> {
    U256::uint_try_from(value).map_err(|_| SandwichError::Overflow)
}

/// Output of selling `amount_in` into the pool.
///
/// `floor(amount_in * n * reserve_out / (reserve_in * d + amount_in * n))` for a
/// fee rate `n / d`. The fee is taken from the input before the curve applies,
/// so the result is strictly below `reserve_out` for any finite input.
pub fn quote_output(reserves: &Reserves, amount_in: U256, fee: FeeRate) -> Result<U256, SandwichError> {
    reserves.validate()?;
    if amount_in.is_zero() {
        return Ok(U256::ZERO);
    }

    let effective_in = widen(amount_in)
        .checked_mul(U512::from(fee.numerator))
        .ok_or(SandwichError::Overflow)?;
    let numerator = effective_in
        .checked_mul(widen(reserves.reserve_out))
        .ok_or(SandwichError::Overflow)?;
    let denominator = (widen(reserves.reserve_in) * U512::from(fee.denominator))
        .checked_add(effective_in)
        .ok_or(SandwichError::Overflow)?;

    narrow(numerator / denominator)
}

/// Smallest input that yields at least `amount_out`, rounded up by one unit
/// like an on-chain `getAmountIn`.
pub fn quote_input(reserves: &Reserves, amount_out: U256, fee: FeeRate) -> Result<U256, SandwichError> {
    reserves.validate()?;
    if amount_out.is_zero() {
        return Ok(U256::ZERO);
    }
    if amount_out >= reserves.reserve_out {
        return Err(SandwichError::InvalidArgument(format!(
            "amount_out {} drains reserve_out {}",
            amount_out, reserves.reserve_out
        )));
    }

    let numerator = widen(reserves.reserve_in)
        .checked_mul(widen(amount_out))
        .and_then(|v| v.checked_mul(U512::from(fee.denominator)))
        .ok_or(SandwichError::Overflow)?;
    let denominator = widen(reserves.reserve_out - amount_out)
        .checked_mul(U512::from(fee.numerator))
        .ok_or(SandwichError::Overflow)?;

    narrow(numerator / denominator + U512::from(1u8))
}

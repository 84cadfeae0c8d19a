use super::curve::{FeeRate, Reserves, widen};
use super::error::SandwichError;
use super::types::Trade;
use alloy_primitives::ruint::UintTryFrom;
use alloy_primitives::{U256, U512};

/// Closed-form front-run boundary
///
/// With fee `g = n / d` applied on both the front-run and the victim leg, the
/// victim's output after a front-run `x` against reserves `(R, S)` is
///
/// `v(x) = g*V*S*R / ((R + g*x) * (R + x + g*V))`
///
/// Setting `v(x) = m` and clearing denominators gives
///
/// `n*d*m*x^2 + m*(d^2*R + n*d*R + n^2*V)*x + m*d*R*(d*R + n*V) - n*d*V*S*R = 0`
///
/// whose positive root is the largest front-run keeping the victim at its floor.
/// The root is taken with a floor integer square root, so the result never
/// overshoots the continuous boundary.
///
/// Returns `U256::MAX` when the victim accepts any output (`m = 0`) and
/// `Infeasible` when the victim's own trade already misses its floor.
pub fn frontrun_boundary(reserves: &Reserves, victim: &Trade, fee: FeeRate) -> Result<U256, SandwichError> {
    reserves.validate()?;
    if victim.amount_in.is_zero() {
        return Err(SandwichError::Infeasible("victim trade has zero input".to_string()));
    }
    if victim.min_amount_out.is_zero() {
        return Ok(U256::MAX);
    }

    let n = U512::from(fee.numerator());
    let d = U512::from(fee.denominator());
    let r = widen(reserves.reserve_in);
    let s = widen(reserves.reserve_out);
    let v = widen(victim.amount_in);
    let m = widen(victim.min_amount_out);

    let dr = d * r;
    let nv = n * v;

    let a = n * d * m;
    let b = checked_mul(m, dr * d + dr * n + nv * n)?;
    let floor_term = checked_mul(checked_mul(m, dr)?, dr + nv)?;
    let victim_term = checked_mul(checked_mul(checked_mul(v, s)?, r)?, n * d)?;

    if victim_term < floor_term {
        return Err(SandwichError::Infeasible(format!(
            "victim output without front-run is below min_amount_out {}",
            victim.min_amount_out
        )));
    }

    let c = victim_term - floor_term;
    let discriminant = checked_mul(b, b)?
        .checked_add(checked_mul(a * U512::from(4u8), c)?)
        .ok_or(SandwichError::Overflow)?;
    let root = (isqrt(discriminant) - b) / (a * U512::from(2u8));

    Ok(U256::uint_try_from(root).unwrap_or(U256::MAX))
}

fn checked_mul(lhs: U512, rhs: U512) -> Result<U512, SandwichError> {
    lhs.checked_mul(rhs).ok_or(SandwichError::Overflow)
}

/// Integer square root using Newton's method, rounded down.
pub fn isqrt(n: U512) -> U512 {
    if n.is_zero() {
        return U512::ZERO;
    }

    let mut x = n;
    let mut y = (n >> 1u32) + (n & U512::from(1u8));

    while y < x {
        x = y;
        y = (x + n / x) >> 1u32;
    }

    x
}

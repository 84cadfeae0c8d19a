use crate::logic::curve::{narrow, widen};
use crate::logic::{SandwichError, SandwichPlan, SwapDirection};
use crate::utils::constants::BPS_DENOMINATOR;
use alloy_primitives::{U256, U512};
use async_trait::async_trait;
use strum_macros::{Display, EnumIter};

#[derive(Copy, Clone, Debug, Display, PartialEq, Eq, Hash, EnumIter)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum LegKind {
    Frontrun,
    Victim,
    Backrun,
}

/// One swap in the bundle. `nonce` is `None` for the victim's own transaction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct BundleLeg {
    pub kind: LegKind,
    pub direction: SwapDirection,
    pub nonce: Option<u64>,
    pub amount_in: U256,
    pub min_amount_out: U256,
}

/// Front-run, victim and back-run, in block order, for a single target block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SandwichBundle {
    pub target_block: u64,
    pub legs: [BundleLeg; 3],
}

impl SandwichBundle {
    /// Lay out a plan as three ordered legs.
    ///
    /// Our two legs use `base_nonce` and `base_nonce + 1`. Their `min_amount_out`
    /// is the quoted output reduced by `slippage_bps`.
    pub fn from_plan(
        plan: &SandwichPlan,
        direction: SwapDirection,
        base_nonce: u64,
        target_block: u64,
        slippage_bps: u32,
    ) -> Result<Self, SandwichError> {
        if slippage_bps >= BPS_DENOMINATOR {
            return Err(SandwichError::InvalidArgument(format!("slippage_bps {} out of range", slippage_bps)));
        }
        let backrun_nonce = base_nonce
            .checked_add(1)
            .ok_or_else(|| SandwichError::InvalidArgument("nonce overflow".to_string()))?;

        let frontrun = BundleLeg {
            kind: LegKind::Frontrun,
            direction,
            nonce: Some(base_nonce),
            amount_in: plan.frontrun_amount_in,
            min_amount_out: apply_slippage(plan.frontrun_amount_out, slippage_bps)?,
        };
        let victim = BundleLeg {
            kind: LegKind::Victim,
            direction,
            nonce: None,
            amount_in: plan.victim.amount_in,
            min_amount_out: plan.victim.min_amount_out,
        };
        let backrun = BundleLeg {
            kind: LegKind::Backrun,
            direction: direction.opposite(),
            nonce: Some(backrun_nonce),
            amount_in: plan.frontrun_amount_out,
            min_amount_out: apply_slippage(plan.backrun_amount_out, slippage_bps)?,
        };

        Ok(Self { target_block, legs: [frontrun, victim, backrun] })
    }

    pub fn leg(&self, kind: LegKind) -> &BundleLeg {
        match kind {
            LegKind::Frontrun => &self.legs[0],
            LegKind::Victim => &self.legs[1],
            LegKind::Backrun => &self.legs[2],
        }
    }
}

fn apply_slippage(amount: U256, slippage_bps: u32) -> Result<U256, SandwichError> {
    let kept = widen(amount) * U512::from(BPS_DENOMINATOR - slippage_bps);
    narrow(kept / U512::from(BPS_DENOMINATOR))
}

/// Hands a bundle to whatever signs and broadcasts it.
#[async_trait]
pub trait BundleSubmitter: Send + Sync {
    async fn submit_bundle(&self, bundle: &SandwichBundle) -> eyre::Result<()>;
}

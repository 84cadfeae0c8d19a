use super::curve::{Reserves, SwapDirection};
use super::error::SandwichError;
use alloy_primitives::{I256, U256};
use std::time::Instant;

/// A swap as declared by its sender: what goes in, and the least it accepts out.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Default)]
pub struct Trade {
    pub amount_in: U256,
    /// Slippage floor; a trade yielding less must not be treated as executable
    pub min_amount_out: U256,
}

impl Trade {
    pub fn new(amount_in: U256, min_amount_out: U256) -> Self {
        Self { amount_in, min_amount_out }
    }

    pub fn clears_floor(&self, amount_out: U256) -> bool {
        amount_out >= self.min_amount_out
    }
}

/// Interval the front-run size is searched in, both ends inclusive.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SearchBounds {
    pub lower: U256,
    pub upper: U256,
}

impl SearchBounds {
    pub fn new(lower: U256, upper: U256) -> Self {
        Self { lower, upper }
    }

    /// `[0, victim.amount_in * multiplier]`, saturating at `U256::MAX`.
    pub fn for_victim(victim: &Trade, multiplier: u32) -> Self {
        Self::new(U256::ZERO, victim.amount_in.saturating_mul(U256::from(multiplier)))
    }

    pub fn validate(&self) -> Result<(), SandwichError> {
        if self.upper <= self.lower {
            return Err(SandwichError::InvalidArgument(format!(
                "search upper bound {} must exceed lower bound {}",
                self.upper, self.lower
            )));
        }
        Ok(())
    }
}

/// Front-run / back-run sizing for one victim trade against one reserve snapshot.
///
/// Valid only for the exact ledger state the reserves were read from.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SandwichPlan {
    pub victim: Trade,
    pub frontrun_amount_in: U256,
    pub frontrun_amount_out: U256,
    pub victim_amount_out: U256,
    pub backrun_amount_out: U256,
    pub reserves_after_frontrun: Reserves,
    pub reserves_after_victim: Reserves,
}

impl SandwichPlan {
    /// Back-run output minus front-run input, in the asset the victim sells.
    pub fn expected_profit(&self) -> I256 {
        signed(self.backrun_amount_out) - signed(self.frontrun_amount_in)
    }
}

/// Result of replaying a plan leg by leg.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct SandwichOutcome {
    pub frontrun_amount_out: U256,
    pub victim_amount_out: U256,
    pub backrun_amount_out: U256,
    /// Net change of the attacker's balance in the asset the victim sells
    pub attacker_profit_in_asset: I256,
    /// Net change of the attacker's balance in the asset the victim buys
    pub attacker_profit_out_asset: I256,
    pub victim_floor_respected: bool,
    /// Pool after all three legs, oriented like the input reserves
    pub final_reserves: Reserves,
}

impl SandwichOutcome {
    pub fn is_profitable(&self, min_profit_wei: U256) -> bool {
        self.attacker_profit_in_asset > signed(min_profit_wei)
    }
}

/// Pair reserves `(reserve0, reserve1)` as read at `block_number`.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct ReserveSnapshot {
    pub block_number: u64,
    pub reserve0: U256,
    pub reserve1: U256,
}

impl ReserveSnapshot {
    pub fn new(block_number: u64, reserve0: U256, reserve1: U256) -> Self {
        Self { block_number, reserve0, reserve1 }
    }

    pub fn oriented(&self, direction: SwapDirection) -> Reserves {
        Reserves::from_pool(self.reserve0, self.reserve1, direction)
    }
}

/// A victim trade observed in the mempool together with its direction.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct PendingSwap {
    pub trade: Trade,
    pub direction: SwapDirection,
}

impl PendingSwap {
    pub fn new(trade: Trade, direction: SwapDirection) -> Self {
        Self { trade, direction }
    }
}

/// Outcome of sizing and replaying one pending swap.
#[derive(Clone, Debug)]
pub struct SandwichEvaluation {
    pub block_number: u64,
    pub pending: PendingSwap,
    pub result: Result<(SandwichPlan, SandwichOutcome), SandwichError>,
}

impl SandwichEvaluation {
    pub fn is_successful(&self) -> bool {
        self.result.is_ok()
    }

    pub fn to_opportunity(&self, min_profit_wei: U256) -> Option<SandwichOpportunity> {
        match &self.result {
            Ok((plan, outcome)) if outcome.is_profitable(min_profit_wei) => Some(SandwichOpportunity {
                block_number: self.block_number,
                direction: self.pending.direction,
                plan: *plan,
                outcome: *outcome,
                discovered_at: Instant::now(),
            }),
            _ => None,
        }
    }
}

/// A profitable sandwich ready to hand to the execution layer.
#[derive(Clone, Debug)]
pub struct SandwichOpportunity {
    pub block_number: u64,
    pub direction: SwapDirection,
    pub plan: SandwichPlan,
    pub outcome: SandwichOutcome,
    pub discovered_at: Instant,
}

impl SandwichOpportunity {
    pub fn net_profit(&self) -> I256 {
        self.outcome.attacker_profit_in_asset
    }
}

/// Reinterpret an amount as signed. Amounts above `I256::MAX` saturate.
pub(crate) fn signed(amount: U256) -> I256 {
    I256::try_from(amount).unwrap_or(I256::MAX)
}

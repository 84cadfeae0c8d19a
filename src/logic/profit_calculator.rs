use super::curve::{FeeRate, Reserves, quote_output};
use super::error::SandwichError;
use super::solver::SandwichSolver;
use super::types::{
    PendingSwap, ReserveSnapshot, SandwichEvaluation, SandwichOpportunity, SandwichOutcome, SandwichPlan, SearchBounds,
    signed,
};
use crate::config::SandwichConfig;
use alloy_primitives::U256;
use rayon::prelude::*;
use tracing::debug;

/// Replay front-run -> victim -> back-run through the curve and report the
/// attacker's net position change in both assets.
///
/// The back-run sells the amount the plan says the front-run bought; if the
/// replayed front-run buys a different amount, the difference shows up in
/// `attacker_profit_out_asset`.
pub fn simulate(reserves: &Reserves, plan: &SandwichPlan, fee: FeeRate) -> Result<SandwichOutcome, SandwichError> {
    let frontrun_out = quote_output(reserves, plan.frontrun_amount_in, fee)?;
    let after_frontrun = reserves.after_swap(plan.frontrun_amount_in, frontrun_out)?;

    let victim_out = quote_output(&after_frontrun, plan.victim.amount_in, fee)?;
    let after_victim = after_frontrun.after_swap(plan.victim.amount_in, victim_out)?;

    // back-run trades the other way round
    let sold = plan.frontrun_amount_out;
    let backrun_reserves = after_victim.reversed();
    let backrun_out = quote_output(&backrun_reserves, sold, fee)?;
    let final_reserves = backrun_reserves.after_swap(sold, backrun_out)?.reversed();

    Ok(SandwichOutcome {
        frontrun_amount_out: frontrun_out,
        victim_amount_out: victim_out,
        backrun_amount_out: backrun_out,
        attacker_profit_in_asset: signed(backrun_out) - signed(plan.frontrun_amount_in),
        attacker_profit_out_asset: signed(frontrun_out) - signed(sold),
        victim_floor_respected: plan.victim.clears_floor(victim_out),
        final_reserves,
    })
}

/// Sizes and replays sandwiches for many pending swaps at once.
///
/// Each input is independent, so evaluation fans out over rayon when enabled.
pub struct ProfitCalculator {
    solver: SandwichSolver,
    upper_bound_multiplier: u32,
    min_profit_wei: U256,
    enable_parallel_evaluation: bool,
}

impl ProfitCalculator {
    pub fn new(config: &SandwichConfig) -> Result<Self, SandwichError> {
        Ok(Self {
            solver: SandwichSolver::from_config(config)?,
            upper_bound_multiplier: config.upper_bound_multiplier,
            min_profit_wei: U256::from(config.min_profit_wei),
            enable_parallel_evaluation: config.enable_parallel_evaluation,
        })
    }

    pub fn solver(&self) -> &SandwichSolver {
        &self.solver
    }

    /// Size and replay a single pending swap against a reserve snapshot.
    pub fn evaluate(&self, snapshot: &ReserveSnapshot, pending: &PendingSwap) -> SandwichEvaluation {
        let result = self.plan_and_replay(snapshot, pending);
        SandwichEvaluation { block_number: snapshot.block_number, pending: *pending, result }
    }

    fn plan_and_replay(
        &self,
        snapshot: &ReserveSnapshot,
        pending: &PendingSwap,
    ) -> Result<(SandwichPlan, SandwichOutcome), SandwichError> {
        let reserves = snapshot.oriented(pending.direction);
        let bounds = SearchBounds::for_victim(&pending.trade, self.upper_bound_multiplier);
        let plan = self.solver.solve(&reserves, &pending.trade, bounds)?;
        let outcome = simulate(&reserves, &plan, self.solver.fee())?;
        Ok((plan, outcome))
    }

    /// Evaluate every `(snapshot, pending swap)` pair, preserving input order.
    pub fn evaluate_batch(&self, candidates: &[(ReserveSnapshot, PendingSwap)]) -> Vec<SandwichEvaluation> {
        if !self.enable_parallel_evaluation {
            return self.evaluate_batch_sequential(candidates);
        }

        debug!("evaluating {} sandwich candidates in parallel", candidates.len());

        let results: Vec<SandwichEvaluation> = candidates
            .par_iter()
            .map(|(snapshot, pending)| self.evaluate(snapshot, pending))
            .collect();

        debug!(
            "parallel evaluation done, {} of {} profitable",
            results.iter().filter(|r| r.to_opportunity(self.min_profit_wei).is_some()).count(),
            results.len()
        );

        results
    }

    fn evaluate_batch_sequential(&self, candidates: &[(ReserveSnapshot, PendingSwap)]) -> Vec<SandwichEvaluation> {
        debug!("evaluating {} sandwich candidates sequentially", candidates.len());

        candidates.iter().map(|(snapshot, pending)| self.evaluate(snapshot, pending)).collect()
    }

    /// Profitable opportunities from a batch, best first.
    pub fn find_opportunities(&self, candidates: &[(ReserveSnapshot, PendingSwap)]) -> Vec<SandwichOpportunity> {
        let mut opportunities: Vec<SandwichOpportunity> = self
            .evaluate_batch(candidates)
            .iter()
            .filter_map(|evaluation| evaluation.to_opportunity(self.min_profit_wei))
            .collect();
        opportunities.sort_by(|a, b| b.net_profit().cmp(&a.net_profit()));
        opportunities
    }
}

use super::closed_form::frontrun_boundary;
use super::curve::{FeeRate, Reserves, quote_output};
use super::error::SandwichError;
use super::types::{SandwichPlan, SearchBounds, Trade};
use crate::config::SandwichConfig;
use crate::utils::constants::{DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE_WEI};
use alloy_primitives::U256;
use tracing::{debug, warn};

/// Sizes the front-run and back-run around a victim trade.
///
/// The front-run is the largest input `x` for which the victim, trading right
/// after it, still receives at least its `min_amount_out`. The victim's output
/// is non-increasing in `x`, so the boundary is found by bisection; the search
/// is capped by an iteration limit as well as by `tolerance`.
#[derive(Clone, Debug)]
pub struct SandwichSolver {
    fee: FeeRate,
    tolerance: U256,
    max_iterations: u32,
    verify_closed_form: bool,
}

/// Final bisection interval. `lower` always keeps the victim at or above its
/// floor; `upper` is either infeasible or equal to `lower`.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Bracket {
    pub lower: U256,
    pub upper: U256,
    pub iterations: u32,
}

impl SandwichSolver {
    pub fn new(fee: FeeRate, tolerance: U256) -> Result<Self, SandwichError> {
        if tolerance.is_zero() {
            return Err(SandwichError::InvalidArgument("tolerance must be positive".to_string()));
        }
        Ok(Self { fee, tolerance, max_iterations: DEFAULT_MAX_ITERATIONS, verify_closed_form: true })
    }

    pub fn from_config(config: &SandwichConfig) -> Result<Self, SandwichError> {
        Ok(Self::new(config.fee_rate()?, config.tolerance())?
            .with_max_iterations(config.max_iterations)
            .with_closed_form_check(config.verify_closed_form))
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_closed_form_check(mut self, enabled: bool) -> Self {
        self.verify_closed_form = enabled;
        self
    }

    pub fn fee(&self) -> FeeRate {
        self.fee
    }

    pub fn tolerance(&self) -> U256 {
        self.tolerance
    }

    /// Victim output when the front-run `frontrun_in` executes first.
    pub fn victim_output(&self, reserves: &Reserves, victim: &Trade, frontrun_in: U256) -> Result<U256, SandwichError> {
        let frontrun_out = quote_output(reserves, frontrun_in, self.fee)?;
        let after_frontrun = reserves.after_swap(frontrun_in, frontrun_out)?;
        quote_output(&after_frontrun, victim.amount_in, self.fee)
    }

    /// Find the front-run boundary and build the full plan.
    pub fn solve(&self, reserves: &Reserves, victim: &Trade, bounds: SearchBounds) -> Result<SandwichPlan, SandwichError> {
        if victim.amount_in.is_zero() {
            return Err(SandwichError::Infeasible("victim trade has zero input".to_string()));
        }
        bounds.validate()?;
        reserves.validate()?;

        let bracket = self.bisect(reserves, victim, bounds)?;
        if bracket.lower.is_zero() {
            return Err(SandwichError::Infeasible("victim floor leaves no room for a front-run".to_string()));
        }

        if self.verify_closed_form {
            self.check_closed_form(reserves, victim, bounds, &bracket)?;
        }

        let plan = self.build_plan(reserves, victim, bracket.lower)?;
        debug!(
            "sandwich solved in {} iterations: frontrun_in={}, backrun_out={}, victim_out={}",
            bracket.iterations, plan.frontrun_amount_in, plan.backrun_amount_out, plan.victim_amount_out
        );
        Ok(plan)
    }

    /// Bisection over `[bounds.lower, bounds.upper]`.
    pub fn bisect(&self, reserves: &Reserves, victim: &Trade, bounds: SearchBounds) -> Result<Bracket, SandwichError> {
        let mut lower = bounds.lower;
        let mut upper = bounds.upper;

        if !self.clears_floor_at(reserves, victim, lower)? {
            return Err(SandwichError::Infeasible(format!(
                "victim floor {} not met at front-run {}",
                victim.min_amount_out, lower
            )));
        }
        if self.clears_floor_at(reserves, victim, upper)? {
            return Ok(Bracket { lower: upper, upper, iterations: 0 });
        }

        let mut iterations = 0;
        // Invariant: lower clears the victim's floor, upper does not.
        while upper - lower >= self.tolerance && upper - lower > U256::from(1u8) {
            if iterations >= self.max_iterations {
                warn!(
                    "bisection hit the iteration cap {} with interval [{}, {}]",
                    self.max_iterations, lower, upper
                );
                break;
            }

            let mid = lower + (upper - lower) / U256::from(2u8);
            if self.clears_floor_at(reserves, victim, mid)? {
                lower = mid;
            } else {
                upper = mid;
            }
            iterations += 1;
        }

        Ok(Bracket { lower, upper, iterations })
    }

    /// Whether the victim still clears its floor after a front-run of `frontrun_in`.
    ///
    /// A front-run too large for the pool to absorb in 256 bits leaves the victim
    /// nothing, so it counts as infeasible rather than as an error.
    fn clears_floor_at(&self, reserves: &Reserves, victim: &Trade, frontrun_in: U256) -> Result<bool, SandwichError> {
        match self.victim_output(reserves, victim, frontrun_in) {
            Ok(victim_out) => Ok(victim.clears_floor(victim_out)),
            Err(SandwichError::Overflow) => Ok(false),
            Err(e) => Err(e),
        }
    }

    fn check_closed_form(
        &self,
        reserves: &Reserves,
        victim: &Trade,
        bounds: SearchBounds,
        bracket: &Bracket,
    ) -> Result<(), SandwichError> {
        let closed_form = match frontrun_boundary(reserves, victim, self.fee) {
            Ok(root) => root.clamp(bounds.lower, bounds.upper),
            Err(SandwichError::Overflow) => {
                warn!("closed-form boundary overflowed, skipping cross-check");
                return Ok(());
            }
            Err(e) => return Err(e),
        };

        let below = closed_form.saturating_add(self.tolerance) < bracket.lower;
        let above = closed_form > bracket.upper.saturating_add(self.tolerance);
        if below || above {
            return Err(SandwichError::ConvergenceMismatch {
                lower: bracket.lower,
                upper: bracket.upper,
                closed_form,
                tolerance: self.tolerance,
            });
        }
        Ok(())
    }

    /// Replay the three legs for a chosen front-run size.
    ///
    /// The back-run sells everything the front-run bought, against the reserves
    /// left by the victim. Each leg pays the pool fee once.
    pub fn build_plan(&self, reserves: &Reserves, victim: &Trade, frontrun_in: U256) -> Result<SandwichPlan, SandwichError> {
        let frontrun_out = quote_output(reserves, frontrun_in, self.fee)?;
        let after_frontrun = reserves.after_swap(frontrun_in, frontrun_out)?;

        let victim_out = quote_output(&after_frontrun, victim.amount_in, self.fee)?;
        let after_victim = after_frontrun.after_swap(victim.amount_in, victim_out)?;

        let backrun_out = quote_output(&after_victim.reversed(), frontrun_out, self.fee)?;

        Ok(SandwichPlan {
            victim: *victim,
            frontrun_amount_in: frontrun_in,
            frontrun_amount_out: frontrun_out,
            victim_amount_out: victim_out,
            backrun_amount_out: backrun_out,
            reserves_after_frontrun: after_frontrun,
            reserves_after_victim: after_victim,
        })
    }
}

impl Default for SandwichSolver {
    fn default() -> Self {
        Self {
            fee: FeeRate::UNISWAP_V2,
            tolerance: U256::from(DEFAULT_TOLERANCE_WEI),
            max_iterations: DEFAULT_MAX_ITERATIONS,
            verify_closed_form: true,
        }
    }
}

/// One-shot solve with the closed-form cross-check enabled.
pub fn solve(
    reserves: &Reserves,
    victim: &Trade,
    fee: FeeRate,
    bounds: SearchBounds,
    tolerance: U256,
) -> Result<SandwichPlan, SandwichError> {
    SandwichSolver::new(fee, tolerance)?.solve(reserves, victim, bounds)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::constants::WEI_PER_ETHER;
    use proptest::prelude::*;

    fn ether(amount: u64) -> U256 {
        U256::from(amount) * U256::from(WEI_PER_ETHER)
    }

    fn tolerance() -> U256 {
        U256::from(DEFAULT_TOLERANCE_WEI)
    }

    fn reference_pool() -> Reserves {
        Reserves::new(ether(10), ether(10))
    }

    fn half_ether_floor_victim() -> Trade {
        Trade::new(ether(1), ether(1) / U256::from(2u8))
    }

    #[test]
    fn test_solve_reference_scenario() {
        let reserves = reference_pool();
        let victim = half_ether_floor_victim();
        let bounds = SearchBounds::new(U256::ZERO, ether(100));

        let plan = solve(&reserves, &victim, FeeRate::UNISWAP_V2, bounds, tolerance()).unwrap();

        assert!(plan.frontrun_amount_in > ether(3));
        assert!(plan.frontrun_amount_in < ether(4));
        assert!(plan.victim_amount_out >= victim.min_amount_out);
        // one more tolerance step would push the victim under its floor
        let solver = SandwichSolver::new(FeeRate::UNISWAP_V2, tolerance()).unwrap();
        let pushed = solver.victim_output(&reserves, &victim, plan.frontrun_amount_in + tolerance()).unwrap();
        assert!(pushed < victim.min_amount_out);

        assert!(plan.backrun_amount_out > plan.frontrun_amount_in);
        assert_eq!(plan.reserves_after_frontrun.reserve_in, reserves.reserve_in + plan.frontrun_amount_in);
        assert_eq!(plan.reserves_after_victim.reserve_out, plan.reserves_after_frontrun.reserve_out - plan.victim_amount_out);
    }

    #[test]
    fn test_unreachable_floor_is_infeasible() {
        // The victim asks for the whole out-side reserve.
        let reserves = reference_pool();
        let victim = Trade::new(ether(20), ether(10));
        let bounds = SearchBounds::for_victim(&victim, 100);

        let err = solve(&reserves, &victim, FeeRate::UNISWAP_V2, bounds, tolerance()).unwrap_err();
        assert!(err.is_infeasible());
    }

    #[test]
    fn test_zero_victim_input_is_infeasible() {
        let victim = Trade::new(U256::ZERO, U256::ZERO);
        let bounds = SearchBounds::new(U256::ZERO, ether(1));
        let err = solve(&reference_pool(), &victim, FeeRate::UNISWAP_V2, bounds, tolerance()).unwrap_err();
        assert!(err.is_infeasible());
    }

    #[test]
    fn test_invalid_arguments() {
        let victim = half_ether_floor_victim();

        let err = solve(&reference_pool(), &victim, FeeRate::UNISWAP_V2, SearchBounds::new(U256::ZERO, ether(1)), U256::ZERO)
            .unwrap_err();
        assert!(matches!(err, SandwichError::InvalidArgument(_)));

        let err = solve(&reference_pool(), &victim, FeeRate::UNISWAP_V2, SearchBounds::new(ether(2), ether(1)), tolerance())
            .unwrap_err();
        assert!(matches!(err, SandwichError::InvalidArgument(_)));

        let empty_pool = Reserves::new(U256::ZERO, ether(10));
        let err = solve(&empty_pool, &victim, FeeRate::UNISWAP_V2, SearchBounds::new(U256::ZERO, ether(1)), tolerance())
            .unwrap_err();
        assert!(matches!(err, SandwichError::InvalidReserves { .. }));
    }

    #[test]
    fn test_feasible_upper_bound_is_returned() {
        let victim = half_ether_floor_victim();
        let bounds = SearchBounds::new(U256::ZERO, ether(1));

        let plan = solve(&reference_pool(), &victim, FeeRate::UNISWAP_V2, bounds, tolerance()).unwrap();
        assert_eq!(plan.frontrun_amount_in, ether(1));
    }

    #[test]
    fn test_floor_at_unassisted_output_leaves_no_room() {
        let reserves = reference_pool();
        let unassisted = quote_output(&reserves, ether(1), FeeRate::UNISWAP_V2).unwrap();
        let victim = Trade::new(ether(1), unassisted);

        let err = solve(&reserves, &victim, FeeRate::UNISWAP_V2, SearchBounds::new(U256::ZERO, ether(100)), tolerance())
            .unwrap_err();
        assert!(err.is_infeasible());
    }

    #[test]
    fn test_huge_upper_bound_converges() {
        let victim = half_ether_floor_victim();
        let bounds = SearchBounds::new(U256::ZERO, U256::MAX >> 32);
        let solver = SandwichSolver::new(FeeRate::UNISWAP_V2, U256::from(1u8)).unwrap();

        let bracket = solver.bisect(&reference_pool(), &victim, bounds).unwrap();
        assert!(bracket.iterations <= DEFAULT_MAX_ITERATIONS);
        assert_eq!(bracket.upper - bracket.lower, U256::from(1u8));

        // At 1 wei resolution integer rounding alone moves the boundary by more than
        // the tolerance, so only the search itself is checked here.
        let plan = solver.with_closed_form_check(false).solve(&reference_pool(), &victim, bounds).unwrap();
        assert_eq!(plan.frontrun_amount_in, bracket.lower);
    }

    #[test]
    fn test_unbounded_upper_converges() {
        let reserves = reference_pool();
        let victim = half_ether_floor_victim();
        let bounded = solve(&reserves, &victim, FeeRate::UNISWAP_V2, SearchBounds::new(U256::ZERO, ether(100)), tolerance())
            .unwrap();

        let plan = solve(&reserves, &victim, FeeRate::UNISWAP_V2, SearchBounds::new(U256::ZERO, U256::MAX), tolerance())
            .unwrap();
        assert!(plan.victim_amount_out >= victim.min_amount_out);
        let gap = plan.frontrun_amount_in.max(bounded.frontrun_amount_in)
            - plan.frontrun_amount_in.min(bounded.frontrun_amount_in);
        assert!(gap < tolerance());
    }

    #[test]
    fn test_saturated_victim_bounds_converge() {
        let reserves = reference_pool();
        let whale = Trade::new(U256::MAX / U256::from(2u8), ether(1));
        let bounds = SearchBounds::for_victim(&whale, 100);
        assert_eq!(bounds.upper, U256::MAX);

        let plan = solve(&reserves, &whale, FeeRate::UNISWAP_V2, bounds, tolerance()).unwrap();
        assert!(plan.frontrun_amount_in > U256::ZERO);
        assert!(plan.victim_amount_out >= whale.min_amount_out);
    }

    #[test]
    fn test_iteration_cap_returns_feasible_lower() {
        let reserves = reference_pool();
        let victim = half_ether_floor_victim();
        let solver = SandwichSolver::new(FeeRate::UNISWAP_V2, U256::from(1u8))
            .unwrap()
            .with_max_iterations(3)
            .with_closed_form_check(false);

        let bracket = solver.bisect(&reserves, &victim, SearchBounds::new(U256::ZERO, ether(100))).unwrap();
        assert_eq!(bracket.iterations, 3);
        assert!(victim.clears_floor(solver.victim_output(&reserves, &victim, bracket.lower).unwrap()));
        assert!(!victim.clears_floor(solver.victim_output(&reserves, &victim, bracket.upper).unwrap()));
    }

    #[test]
    fn test_closed_form_mismatch_is_reported() {
        let solver = SandwichSolver::new(FeeRate::UNISWAP_V2, tolerance()).unwrap();
        let reserves = reference_pool();
        let victim = half_ether_floor_victim();
        let bounds = SearchBounds::new(U256::ZERO, ether(100));

        // The boundary sits near 3.637 ether, far outside this bracket.
        let wrong = Bracket { lower: ether(1), upper: ether(2), iterations: 0 };
        let err = solver.check_closed_form(&reserves, &victim, bounds, &wrong).unwrap_err();
        assert!(matches!(err, SandwichError::ConvergenceMismatch { .. }));

        let bracket = solver.bisect(&reserves, &victim, bounds).unwrap();
        assert!(solver.check_closed_form(&reserves, &victim, bounds, &bracket).is_ok());
    }

    #[test]
    fn test_invalid_fee_rate_rejected_before_solving() {
        assert!(matches!(FeeRate::new(0, 1000), Err(SandwichError::InvalidFeeRate { .. })));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_bisection_agrees_with_closed_form(
            reserve_in_eth in 1u64..1_000,
            reserve_out_eth in 1u64..1_000,
            victim_milli_eth in 100u64..100_000,
            floor_pct in 50u64..99,
        ) {
            let reserves = Reserves::new(ether(reserve_in_eth), ether(reserve_out_eth));
            let victim_in = U256::from(victim_milli_eth) * U256::from(WEI_PER_ETHER / 1000);
            let unassisted = quote_output(&reserves, victim_in, FeeRate::UNISWAP_V2).unwrap();
            let victim = Trade::new(victim_in, unassisted * U256::from(floor_pct) / U256::from(100u8));
            let bounds = SearchBounds::new(U256::ZERO, ether(1_000_000));

            let solver = SandwichSolver::new(FeeRate::UNISWAP_V2, tolerance()).unwrap();
            match solver.solve(&reserves, &victim, bounds) {
                Ok(plan) => {
                    prop_assert!(plan.victim_amount_out >= victim.min_amount_out);
                    let closed_form = frontrun_boundary(&reserves, &victim, FeeRate::UNISWAP_V2).unwrap();
                    let gap = if closed_form > plan.frontrun_amount_in {
                        closed_form - plan.frontrun_amount_in
                    } else {
                        plan.frontrun_amount_in - closed_form
                    };
                    prop_assert!(gap <= tolerance() * U256::from(2u8));
                }
                Err(e) => prop_assert!(e.is_infeasible(), "unexpected error {e}"),
            }
        }

        #[test]
        fn prop_victim_output_non_increasing(
            frontrun_milli_eth in 0u64..50_000,
            step_milli_eth in 1u64..50_000,
        ) {
            let solver = SandwichSolver::default();
            let reserves = reference_pool();
            let victim = half_ether_floor_victim();
            let milli = U256::from(WEI_PER_ETHER / 1000);

            let a = solver.victim_output(&reserves, &victim, U256::from(frontrun_milli_eth) * milli).unwrap();
            let b = solver
                .victim_output(&reserves, &victim, U256::from(frontrun_milli_eth + step_milli_eth) * milli)
                .unwrap();
            prop_assert!(b <= a);
        }
    }
}

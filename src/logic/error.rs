use alloy_primitives::U256;

/// Errors produced by the curve model, the sandwich solver and the replay.
///
/// Every failure is returned as a value; no numeric field of a plan or outcome
/// is meaningful unless the computation returned `Ok`.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SandwichError {
    #[error("invalid reserves: reserve_in={reserve_in}, reserve_out={reserve_out}")]
    InvalidReserves { reserve_in: U256, reserve_out: U256 },
    #[error("invalid fee rate {numerator}/{denominator}, must lie in (0, 1]")]
    InvalidFeeRate { numerator: u32, denominator: u32 },
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
    #[error("no feasible front-run: {0}")]
    Infeasible(String),
    #[error("bisection bracket [{lower}, {upper}] and closed-form root {closed_form} disagree beyond tolerance {tolerance}")]
    ConvergenceMismatch { lower: U256, upper: U256, closed_form: U256, tolerance: U256 },
    #[error("arithmetic overflow")]
    Overflow,
}

impl SandwichError {
    pub fn is_infeasible(&self) -> bool {
        matches!(self, SandwichError::Infeasible(_))
    }
}

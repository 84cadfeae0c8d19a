/// Logic Layer - Sandwich Optimizer
///
/// This layer is responsible for:
/// - The fee-adjusted constant-product curve, both directions
/// - Sizing the front-run by bisection against the victim's slippage floor
/// - The closed-form boundary used to cross-check the search
/// - Replaying a plan and evaluating batches of pending swaps
///
/// Everything here is a pure function of its inputs: reserves are a snapshot
/// and are never re-read.

pub mod closed_form;
pub mod curve;
pub mod error;
pub mod profit_calculator;
pub mod solver;
pub mod types;

// Re-export key components from the logic layer
pub use closed_form::{frontrun_boundary, isqrt};
pub use curve::{FeeRate, Reserves, SwapDirection, quote_input, quote_output};
pub use error::SandwichError;
pub use profit_calculator::{ProfitCalculator, simulate};
pub use solver::{Bracket, SandwichSolver, solve};
pub use types::{
    PendingSwap, ReserveSnapshot, SandwichEvaluation, SandwichOpportunity, SandwichOutcome, SandwichPlan, SearchBounds,
    Trade,
};

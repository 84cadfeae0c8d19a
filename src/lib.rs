// Two-Layer Architecture
pub mod config;
pub mod execution;  // Execution Layer: bundle ordering, submission interface
pub mod logic;      // Logic Layer: curve model, sandwich solver, profit evaluation

// Common utilities and constants
pub mod utils;

// Re-export key components from each layer
pub use config::SandwichConfig;
pub use execution::{BundleLeg, BundleSubmitter, LegKind, SandwichBundle};
pub use logic::{
    Bracket, FeeRate, PendingSwap, ProfitCalculator, ReserveSnapshot, Reserves, SandwichError, SandwichEvaluation,
    SandwichOpportunity, SandwichOutcome, SandwichPlan, SandwichSolver, SearchBounds, SwapDirection, Trade,
    frontrun_boundary, quote_input, quote_output, simulate, solve,
};
pub use utils::{ConfigLoader, ConfigLoaderSync, LoadConfigError};

/// One ether (or any 18-decimal token unit) in wei.
pub const WEI_PER_ETHER: u64 = 1_000_000_000_000_000_000;

pub const BPS_DENOMINATOR: u32 = 10_000;

// Uniswap V2 compatible 0.3% fee
pub const UNISWAP_V2_FEE_NUMERATOR: u32 = 997;
pub const UNISWAP_V2_FEE_DENOMINATOR: u32 = 1_000;

/// Default bisection resolution, 1e10 wei.
pub const DEFAULT_TOLERANCE_WEI: u64 = 10_000_000_000;

/// Enough halvings to shrink any U256 interval to a single wei.
pub const DEFAULT_MAX_ITERATIONS: u32 = 256;

/// Default search cap as a multiple of the victim's input.
pub const DEFAULT_UPPER_BOUND_MULTIPLIER: u32 = 100;

use crate::logic::{FeeRate, SandwichError, SearchBounds, Trade};
use crate::utils::config_loader::{ConfigLoader, ConfigLoaderSync, LoadConfigError, load_from_file, load_from_file_sync};
use crate::utils::constants::{
    DEFAULT_MAX_ITERATIONS, DEFAULT_TOLERANCE_WEI, DEFAULT_UPPER_BOUND_MULTIPLIER, UNISWAP_V2_FEE_DENOMINATOR,
    UNISWAP_V2_FEE_NUMERATOR,
};
use alloy_primitives::U256;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Optimizer configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SandwichConfig {
    /// Fee multiplier numerator, 997 for a 0.3% pool
    pub fee_numerator: u32,
    pub fee_denominator: u32,
    /// Bisection resolution in wei
    pub tolerance_wei: u64,
    /// Hard cap on bisection steps
    pub max_iterations: u32,
    /// Front-run search cap as a multiple of the victim's input
    pub upper_bound_multiplier: u32,
    /// Cross-check every bisection result against the closed-form root
    pub verify_closed_form: bool,
    /// Opportunities at or below this profit are dropped
    pub min_profit_wei: u64,
    pub enable_parallel_evaluation: bool,
    /// Haircut applied to the quoted outputs of our own legs
    pub slippage_bps: u32,
}

impl Default for SandwichConfig {
    fn default() -> Self {
        Self {
            fee_numerator: UNISWAP_V2_FEE_NUMERATOR,
            fee_denominator: UNISWAP_V2_FEE_DENOMINATOR,
            tolerance_wei: DEFAULT_TOLERANCE_WEI,
            max_iterations: DEFAULT_MAX_ITERATIONS,
            upper_bound_multiplier: DEFAULT_UPPER_BOUND_MULTIPLIER,
            verify_closed_form: true,
            min_profit_wei: 0,
            enable_parallel_evaluation: true,
            slippage_bps: 0,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
struct SandwichConfigFile {
    #[serde(default)]
    sandwich: SandwichConfig,
}

impl SandwichConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> eyre::Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_vars(|name| std::env::var(name).ok())
    }

    /// Same as [`Self::from_env`], reading `SANDWICH_*` values through `lookup`.
    pub fn from_vars<F>(lookup: F) -> eyre::Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        read_var(&lookup, "SANDWICH_FEE_NUMERATOR", &mut config.fee_numerator)?;
        read_var(&lookup, "SANDWICH_FEE_DENOMINATOR", &mut config.fee_denominator)?;
        read_var(&lookup, "SANDWICH_TOLERANCE_WEI", &mut config.tolerance_wei)?;
        read_var(&lookup, "SANDWICH_MAX_ITERATIONS", &mut config.max_iterations)?;
        read_var(&lookup, "SANDWICH_UPPER_BOUND_MULTIPLIER", &mut config.upper_bound_multiplier)?;
        read_var(&lookup, "SANDWICH_VERIFY_CLOSED_FORM", &mut config.verify_closed_form)?;
        read_var(&lookup, "SANDWICH_MIN_PROFIT_WEI", &mut config.min_profit_wei)?;
        read_var(&lookup, "SANDWICH_ENABLE_PARALLEL_EVALUATION", &mut config.enable_parallel_evaluation)?;
        read_var(&lookup, "SANDWICH_SLIPPAGE_BPS", &mut config.slippage_bps)?;

        config.fee_rate().map_err(|e| eyre::eyre!("Invalid SANDWICH_FEE_*: {}", e))?;
        Ok(config)
    }

    pub fn fee_rate(&self) -> Result<FeeRate, SandwichError> {
        FeeRate::new(self.fee_numerator, self.fee_denominator)
    }

    pub fn tolerance(&self) -> U256 {
        U256::from(self.tolerance_wei)
    }

    pub fn search_bounds(&self, victim: &Trade) -> SearchBounds {
        SearchBounds::for_victim(victim, self.upper_bound_multiplier)
    }
}

fn read_var<F, T>(lookup: &F, name: &str, target: &mut T) -> eyre::Result<()>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
    T::Err: std::fmt::Display,
{
    if let Some(value) = lookup(name) {
        *target = value.trim().parse().map_err(|e| eyre::eyre!("Invalid {}: {}", name, e))?;
    }
    Ok(())
}

#[async_trait]
impl ConfigLoader for SandwichConfig {
    type SectionType = SandwichConfig;

    async fn load_section_from_file(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let file: SandwichConfigFile = load_from_file(file_name).await?;
        Ok(file.sandwich)
    }
}

impl ConfigLoaderSync for SandwichConfig {
    type SectionType = SandwichConfig;

    fn load_section_from_file_sync(file_name: String) -> Result<Self::SectionType, LoadConfigError> {
        let file: SandwichConfigFile = load_from_file_sync(file_name)?;
        Ok(file.sandwich)
    }
}

//! Engine Configuration Module
//!
//! Loads the process-wide AMM parameters. Sources are layered in order:
//! built-in defaults, an optional TOML file, an optional environment file
//! (`config/environments/<env>.toml`) and finally `DEX_` prefixed
//! environment variables (`DEX_ENGINE__DEFAULT_FEE_BPS=25`).

use crate::constants::{
    BPS_DENOMINATOR, DEFAULT_FEE_BPS, DEFAULT_RATIO_TOLERANCE_BPS, ENV_PREFIX,
};
use anyhow::{bail, Context, Result};
use config_crate::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Top-level configuration document
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct DexConfig {
    /// AMM engine parameters
    #[serde(default)]
    pub engine: EngineConfig,

    /// Bootstrap deployment parameters
    #[serde(default)]
    pub seed: SeedConfig,
}

/// Parameters fixed at engine initialisation
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
pub struct EngineConfig {
    /// Fee applied to pools created without an explicit fee
    pub default_fee_bps: u32,

    /// Largest unused excess accepted on a deposit, in bps of the supplied amount
    pub ratio_tolerance_bps: u32,
}

/// Bootstrap settings for the `seed_pools` binary
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq, Eq)]
pub struct SeedConfig {
    /// Mint seed balances and deposit them as initial liquidity
    pub seed_liquidity: bool,

    /// Run the ETH -> USDT smoke swap after seeding
    pub smoke_swap: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_fee_bps: DEFAULT_FEE_BPS,
            ratio_tolerance_bps: DEFAULT_RATIO_TOLERANCE_BPS,
        }
    }
}

impl Default for SeedConfig {
    fn default() -> Self {
        Self {
            seed_liquidity: true,
            smoke_swap: true,
        }
    }
}

impl EngineConfig {
    pub fn with_default_fee(mut self, fee_bps: u32) -> Self {
        self.default_fee_bps = fee_bps;
        self
    }

    pub fn with_ratio_tolerance(mut self, tolerance_bps: u32) -> Self {
        self.ratio_tolerance_bps = tolerance_bps;
        self
    }

    /// Reject values the engine cannot honour
    pub fn validate(&self) -> Result<()> {
        if self.default_fee_bps >= BPS_DENOMINATOR {
            bail!(
                "default_fee_bps must be below {}, got {}",
                BPS_DENOMINATOR,
                self.default_fee_bps
            );
        }
        if self.ratio_tolerance_bps > BPS_DENOMINATOR {
            bail!(
                "ratio_tolerance_bps must be at most {}, got {}",
                BPS_DENOMINATOR,
                self.ratio_tolerance_bps
            );
        }
        Ok(())
    }
}

impl DexConfig {
    /// Load configuration with optional file and environment overrides
    pub fn load(base_path: Option<&Path>, environment: Option<&str>) -> Result<Self> {
        let defaults = EngineConfig::default();
        let seed = SeedConfig::default();

        let mut builder = Config::builder()
            .set_default("engine.default_fee_bps", defaults.default_fee_bps as i64)?
            .set_default("engine.ratio_tolerance_bps", defaults.ratio_tolerance_bps as i64)?
            .set_default("seed.seed_liquidity", seed.seed_liquidity)?
            .set_default("seed.smoke_swap", seed.smoke_swap)?;

        if let Some(base) = base_path {
            debug!("Loading base config: {:?}", base);
            builder = builder.add_source(File::from(base).required(true));
        }

        if let Some(env) = environment {
            let env_file = PathBuf::from("config/environments").join(format!("{}.toml", env));

            if env_file.exists() {
                info!("Loading environment config: {:?}", env_file);
                builder = builder.add_source(File::from(env_file));
            } else {
                warn!("Environment config not found: {:?}", env_file);
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: DexConfig = builder
            .build()
            .context("Failed to build configuration")?
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        config.engine.validate()?;
        Ok(config)
    }
}

/// Convenience function to load configuration with defaults
pub fn load_config(path: Option<&Path>, environment: Option<&str>) -> Result<DexConfig> {
    let config = DexConfig::load(path, environment)?;
    info!(
        default_fee_bps = config.engine.default_fee_bps,
        ratio_tolerance_bps = config.engine.ratio_tolerance_bps,
        "Engine configuration loaded"
    );
    Ok(config)
}

//! # SimpleDEX Configuration
//!
//! Centralized configuration and constants for the SimpleDEX engine.
//!
//! - **Constants**: basis-point denominator, default fee and tolerance, price scale
//! - **Engine configuration**: layered loading from defaults, TOML and `DEX_` env vars
//!
//! ## Usage
//!
//! ```rust,no_run
//! use dex_config::{load_config, constants};
//!
//! let config = load_config(None, None).unwrap();
//! assert!(config.engine.default_fee_bps < constants::BPS_DENOMINATOR);
//! ```

pub mod constants;
pub mod engine_config;

pub use constants::*;
pub use engine_config::{load_config, DexConfig, EngineConfig, SeedConfig};

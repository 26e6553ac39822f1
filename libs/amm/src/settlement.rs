//! Settlement layer
//!
//! [`Exchange`] binds the engine to an [`AssetLedger`] the way an in-process
//! caller would: funds are pulled into the vault before an engine mutation,
//! refunded if the engine rejects it, and paid out afterwards. No pool lock is
//! held while the ledger is called.
//!
//! Multi-hop routes run as independent swaps. They are not atomic: if a later
//! leg fails the trader is left holding the intermediate asset and receives a
//! [`SettlementError::PartialRoute`] describing what completed.
//!
//! Payouts happen after the engine has committed. A payout the ledger refuses
//! is not rolled back: the pool keeps its new state, the owed amounts stay in
//! the vault, and the caller gets [`SettlementError::Unsettled`] listing them
//! for reconciliation. Multi-asset payouts go through
//! [`AssetLedger::transfer_batch`], so an account is never paid one side only.

use crate::error::{AmmError, AmmResult};
use crate::ledger::{AssetLedger, LedgerError};
use crate::liquidity::{LiquidityReceipt, Withdrawal};
use crate::registry::PoolRegistry;
use crate::swap::SwapOutcome;
use dex_config::{EngineConfig, PRICE_SCALE};
use dex_types::{AccountId, Amount, AssetId, PoolKey};
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Failures surfaced by the settlement layer
#[derive(Debug, Error)]
pub enum SettlementError {
    #[error(transparent)]
    Amm(#[from] AmmError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("Invalid route: {0}")]
    InvalidRoute(String),

    #[error(
        "Route halted after {count} leg(s) holding {held_amount} of {held_asset}",
        count = .completed_legs.len()
    )]
    PartialRoute {
        completed_legs: Vec<SwapOutcome>,
        held_asset: AssetId,
        held_amount: Amount,
        #[source]
        source: Box<SettlementError>,
    },

    #[error("Pool {pool} committed but paying {account} failed; vault holds {owed:?}")]
    Unsettled {
        pool: PoolKey,
        account: AccountId,
        owed: Vec<(AssetId, Amount)>,
        #[source]
        source: LedgerError,
    },
}

/// Result type for settlement operations
pub type SettlementResult<T> = Result<T, SettlementError>;

/// Completed multi-hop swap
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteOutcome {
    pub legs: Vec<SwapOutcome>,
    pub amount_in: Amount,
    pub amount_out: Amount,
}

/// Engine plus ledger, with reserves held by a vault account
pub struct Exchange<L: AssetLedger> {
    registry: PoolRegistry,
    ledger: L,
    vault: AccountId,
}

impl<L: AssetLedger> Exchange<L> {
    pub fn new(config: EngineConfig, ledger: L, vault: AccountId) -> Self {
        Self {
            registry: PoolRegistry::new(config),
            ledger,
            vault,
        }
    }

    pub fn registry(&self) -> &PoolRegistry {
        &self.registry
    }

    pub fn ledger(&self) -> &L {
        &self.ledger
    }

    pub fn vault(&self) -> AccountId {
        self.vault
    }

    pub fn create_pool(&self, asset_x: AssetId, asset_y: AssetId) -> AmmResult<PoolKey> {
        self.registry.create_pool(asset_x, asset_y)
    }

    /// Price of `base` in `quote`, scaled by 10^18
    pub fn get_price(&self, base: AssetId, quote: AssetId) -> AmmResult<Amount> {
        let key = PoolKey::new(base, quote)?;
        self.registry.spot_price(&key, base)?.scaled(PRICE_SCALE)
    }

    /// Expected output for swapping `amount_in` of `token_in` into `token_out`
    pub fn quote(&self, token_in: AssetId, token_out: AssetId, amount_in: Amount) -> AmmResult<Amount> {
        let key = PoolKey::new(token_in, token_out)?;
        self.registry.quote_swap(&key, token_in, amount_in)
    }

    /// Deposit liquidity; amounts follow the argument order of the assets
    pub fn add_liquidity(
        &self,
        provider: AccountId,
        asset_x: AssetId,
        asset_y: AssetId,
        amount_x: Amount,
        amount_y: Amount,
    ) -> SettlementResult<LiquidityReceipt> {
        let key = PoolKey::new(asset_x, asset_y).map_err(AmmError::from)?;
        let (amount_a, amount_b) = if key.asset_a() == asset_x {
            (amount_x, amount_y)
        } else {
            (amount_y, amount_x)
        };

        self.pull(&provider, &asset_x, amount_x, &[])?;
        self.pull(&provider, &asset_y, amount_y, &[(asset_x, amount_x)])?;

        let receipt = match self.registry.add_liquidity(&key, provider, amount_a, amount_b) {
            Ok(receipt) => receipt,
            Err(err) => {
                self.refund(&provider, &[(asset_x, amount_x), (asset_y, amount_y)]);
                return Err(err.into());
            }
        };

        self.refund(
            &provider,
            &[
                (key.asset_a(), receipt.refund_a),
                (key.asset_b(), receipt.refund_b),
            ],
        );
        Ok(receipt)
    }

    /// Burn shares and pay the provider its share of reserves
    pub fn remove_liquidity(
        &self,
        provider: AccountId,
        asset_x: AssetId,
        asset_y: AssetId,
        shares: Amount,
    ) -> SettlementResult<Withdrawal> {
        let key = PoolKey::new(asset_x, asset_y).map_err(AmmError::from)?;
        let withdrawal = self.registry.remove_liquidity(&key, provider, shares)?;

        let owed = vec![
            (key.asset_a(), withdrawal.amount_a),
            (key.asset_b(), withdrawal.amount_b),
        ];
        self.pay_out(key, provider, owed)?;
        Ok(withdrawal)
    }

    /// Swap `amount_in` of `token_in` for at least `min_amount_out` of `token_out`
    pub fn swap(
        &self,
        trader: AccountId,
        token_in: AssetId,
        token_out: AssetId,
        amount_in: Amount,
        min_amount_out: Amount,
    ) -> SettlementResult<SwapOutcome> {
        let key = PoolKey::new(token_in, token_out).map_err(AmmError::from)?;
        if !self.registry.contains(&key) {
            return Err(AmmError::PoolNotFound(key).into());
        }

        self.pull(&trader, &token_in, amount_in, &[])?;

        let outcome = match self
            .registry
            .execute_swap(&key, token_in, amount_in, min_amount_out)
        {
            Ok(outcome) => outcome,
            Err(err) => {
                self.refund(&trader, &[(token_in, amount_in)]);
                return Err(err.into());
            }
        };

        self.pay_out(key, trader, vec![(token_out, outcome.amount_out)])?;

        info!(
            trader = %trader,
            token_in = %token_in,
            token_out = %token_out,
            amount_in,
            amount_out = outcome.amount_out,
            "Swap settled"
        );
        Ok(outcome)
    }

    /// Swap along `path` one pool at a time; only the final leg enforces `min_amount_out`
    pub fn swap_route(
        &self,
        trader: AccountId,
        path: &[AssetId],
        amount_in: Amount,
        min_amount_out: Amount,
    ) -> SettlementResult<RouteOutcome> {
        if path.len() < 2 {
            return Err(SettlementError::InvalidRoute(format!(
                "path needs at least two assets, got {}",
                path.len()
            )));
        }

        let hops = path.len() - 1;
        let mut legs = Vec::with_capacity(hops);
        let mut amount = amount_in;

        for (index, pair) in path.windows(2).enumerate() {
            let leg_min = if index + 1 == hops { min_amount_out } else { 1 };

            match self.swap(trader, pair[0], pair[1], amount, leg_min) {
                Ok(outcome) => {
                    amount = outcome.amount_out;
                    legs.push(outcome);
                }
                Err(err) if legs.is_empty() => return Err(err),
                Err(err) => {
                    warn!(
                        trader = %trader,
                        completed = legs.len(),
                        held_asset = %pair[0],
                        held_amount = amount,
                        error = %err,
                        "Route halted mid-way"
                    );
                    return Err(SettlementError::PartialRoute {
                        completed_legs: legs,
                        held_asset: pair[0],
                        held_amount: amount,
                        source: Box::new(err),
                    });
                }
            }
        }

        Ok(RouteOutcome {
            legs,
            amount_in,
            amount_out: amount,
        })
    }

    /// Move `amount` from `account` into the vault, returning `already_pulled` on failure
    fn pull(
        &self,
        account: &AccountId,
        asset: &AssetId,
        amount: Amount,
        already_pulled: &[(AssetId, Amount)],
    ) -> SettlementResult<()> {
        if let Err(err) = self.ledger.transfer(account, &self.vault, asset, amount) {
            self.refund(account, already_pulled);
            return Err(err.into());
        }
        Ok(())
    }

    /// Pay committed engine output from the vault to `account`
    fn pay_out(
        &self,
        pool: PoolKey,
        account: AccountId,
        owed: Vec<(AssetId, Amount)>,
    ) -> SettlementResult<()> {
        match self.ledger.transfer_batch(&self.vault, &account, &owed) {
            Ok(()) => Ok(()),
            Err(source) => {
                error!(
                    pool = %pool,
                    account = %account,
                    owed = ?owed,
                    error = %source,
                    "Payout failed after engine commit; left unsettled"
                );
                Err(SettlementError::Unsettled {
                    pool,
                    account,
                    owed,
                    source,
                })
            }
        }
    }

    /// Return vault-held funds to `account`
    fn refund(&self, account: &AccountId, amounts: &[(AssetId, Amount)]) {
        for (asset, amount) in amounts.iter().filter(|(_, amount)| *amount > 0) {
            match self.ledger.transfer(&self.vault, account, asset, *amount) {
                Ok(()) => debug!(account = %account, asset = %asset, amount, "Refunded"),
                Err(err) => error!(
                    account = %account,
                    asset = %asset,
                    amount,
                    error = %err,
                    "Refund failed"
                ),
            }
        }
    }
}

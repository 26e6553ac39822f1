//! Reserve & invariant engine: swap quoting and execution
//!
//! Quotes read a snapshot; execution re-derives the output under the pool's
//! write lock from the live reserves, never from an earlier quote.

use crate::error::{AmmError, AmmResult};
use crate::pool_traits::AmmPool;
use crate::registry::{Operation, PoolRegistry};
use dex_types::{Amount, AssetId, PoolKey};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Validated swap delta for the caller to settle on the asset ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SwapOutcome {
    pub key: PoolKey,
    pub token_in: AssetId,
    pub token_out: AssetId,
    pub amount_in: Amount,
    pub amount_out: Amount,
    /// Pool version after the swap was committed
    pub version: u64,
}

impl PoolRegistry {
    /// Output for swapping `amount_in` of `token_in` against current reserves
    pub fn quote_swap(
        &self,
        key: &PoolKey,
        token_in: AssetId,
        amount_in: Amount,
    ) -> AmmResult<Amount> {
        let pool = self.snapshot(key)?;
        let amount_out = pool.get_amount_out(token_in, amount_in)?;
        debug!(pool = %key, token_in = %token_in, amount_in, amount_out, "Quoted swap");
        Ok(amount_out)
    }

    /// Minimal input of `token_in` that yields at least `amount_out`
    pub fn quote_swap_exact_out(
        &self,
        key: &PoolKey,
        token_in: AssetId,
        amount_out: Amount,
    ) -> AmmResult<Amount> {
        self.snapshot(key)?.get_amount_in(token_in, amount_out)
    }

    /// Swap `amount_in` of `token_in`, failing if the output is below `min_amount_out`
    ///
    /// Only pool state changes; moving tokens is the caller's job.
    pub fn execute_swap(
        &self,
        key: &PoolKey,
        token_in: AssetId,
        amount_in: Amount,
        min_amount_out: Amount,
    ) -> AmmResult<SwapOutcome> {
        let handle = self.handle(key)?;

        let result = {
            let mut state = handle.write();
            Self::swap_locked(&mut state, token_in, amount_in, min_amount_out)
        };
        self.record(Operation::Swap, &result);

        match &result {
            Ok(outcome) => debug!(
                pool = %key,
                token_in = %token_in,
                amount_in,
                amount_out = outcome.amount_out,
                version = outcome.version,
                "Executed swap"
            ),
            Err(AmmError::SlippageExceeded { expected, actual }) => warn!(
                pool = %key,
                token_in = %token_in,
                amount_in,
                expected,
                actual,
                "Swap rejected: slippage exceeded"
            ),
            Err(err) => debug!(pool = %key, error = %err, "Swap rejected"),
        }
        result
    }

    fn swap_locked(
        state: &mut crate::pool::PoolState,
        token_in: AssetId,
        amount_in: Amount,
        min_amount_out: Amount,
    ) -> AmmResult<SwapOutcome> {
        let pool = state.pool();
        let side_in = pool.side_of(token_in)?;
        let amount_out = pool.get_amount_out(token_in, amount_in)?;

        if amount_out < min_amount_out {
            return Err(AmmError::SlippageExceeded {
                expected: min_amount_out,
                actual: amount_out,
            });
        }

        let key = pool.key;
        state.commit_swap(side_in, amount_in, amount_out)?;

        Ok(SwapOutcome {
            key,
            token_in,
            token_out: key.asset(side_in.opposite()),
            amount_in,
            amount_out,
            version: state.pool().version,
        })
    }
}

//! Asset ledger seam
//!
//! The engine never holds custody. Callers realise the deltas it validates
//! through an [`AssetLedger`]; [`InMemoryLedger`] is the in-process
//! implementation used by the bootstrap binary and the tests.

use dex_types::{AccountId, Amount, AssetId};
use parking_lot::RwLock;
use std::collections::HashMap;
use thiserror::Error;
use tracing::debug;

/// Ledger transfer failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("Insufficient balance of {asset} for {account}: required {required}, available {available}")]
    InsufficientBalance {
        account: AccountId,
        asset: AssetId,
        required: Amount,
        available: Amount,
    },

    #[error("Balance overflow crediting {asset} to {account}")]
    Overflow { account: AccountId, asset: AssetId },
}

/// Fungible balances per account per asset
pub trait AssetLedger: Send + Sync {
    fn balance_of(&self, account: &AccountId, asset: &AssetId) -> Amount;

    /// Move `amount` of `asset`; all-or-nothing
    fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<(), LedgerError>;

    /// Move several assets between the same two accounts; all legs or none
    fn transfer_batch(
        &self,
        from: &AccountId,
        to: &AccountId,
        legs: &[(AssetId, Amount)],
    ) -> Result<(), LedgerError>;
}

/// Balance table behind a single lock so transfers are atomic
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    balances: RwLock<HashMap<(AccountId, AssetId), Amount>>,
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Credit newly issued tokens to `account`
    pub fn mint(
        &self,
        account: &AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        let mut balances = self.balances.write();
        let balance = balances.entry((*account, *asset)).or_insert(0);
        *balance = balance.checked_add(amount).ok_or(LedgerError::Overflow {
            account: *account,
            asset: *asset,
        })?;
        debug!(account = %account, asset = %asset, amount, "Minted");
        Ok(())
    }

    /// Total of `asset` held across all accounts
    pub fn supply_of(&self, asset: &AssetId) -> Amount {
        self.balances
            .read()
            .iter()
            .filter(|((_, held), _)| held == asset)
            .map(|(_, amount)| *amount)
            .sum()
    }
}

impl AssetLedger for InMemoryLedger {
    fn balance_of(&self, account: &AccountId, asset: &AssetId) -> Amount {
        self.balances
            .read()
            .get(&(*account, *asset))
            .copied()
            .unwrap_or(0)
    }

    fn transfer(
        &self,
        from: &AccountId,
        to: &AccountId,
        asset: &AssetId,
        amount: Amount,
    ) -> Result<(), LedgerError> {
        self.transfer_batch(from, to, &[(*asset, amount)])
    }

    fn transfer_batch(
        &self,
        from: &AccountId,
        to: &AccountId,
        legs: &[(AssetId, Amount)],
    ) -> Result<(), LedgerError> {
        let mut balances = self.balances.write();
        // Every leg is validated against staged balances before any is applied
        let mut staged: HashMap<(AccountId, AssetId), Amount> = HashMap::new();

        for (asset, amount) in legs {
            let (asset, amount) = (*asset, *amount);
            let current = |staged: &HashMap<_, _>, account: AccountId| {
                staged
                    .get(&(account, asset))
                    .or_else(|| balances.get(&(account, asset)))
                    .copied()
                    .unwrap_or(0)
            };

            let available = current(&staged, *from);
            if available < amount {
                return Err(LedgerError::InsufficientBalance {
                    account: *from,
                    asset,
                    required: amount,
                    available,
                });
            }
            if amount == 0 || from == to {
                continue;
            }

            let credited = current(&staged, *to)
                .checked_add(amount)
                .ok_or(LedgerError::Overflow { account: *to, asset })?;

            staged.insert((*from, asset), available - amount);
            staged.insert((*to, asset), credited);
        }

        balances.extend(staged);
        Ok(())
    }
}

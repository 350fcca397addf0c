use async_trait::async_trait;
use core_types::{Address, Amount};
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::debug;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CustodyError {
    #[error("Insufficient funds in custody. Requested: {requested}, Available: {available}")]
    InsufficientFunds { requested: Amount, available: Amount },

    #[error("Custody balance would overflow")]
    Overflow,
}

/// A real asset movement the vault's bookkeeping implies.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustodyMove {
    Collect { from: Address, amount: Amount },
    Release { to: Address, amount: Amount },
}

impl CustodyMove {
    /// The movement that undoes this one.
    pub fn reversed(&self) -> Self {
        match *self {
            CustodyMove::Collect { from, amount } => CustodyMove::Release { to: from, amount },
            CustodyMove::Release { to, amount } => CustodyMove::Collect { from: to, amount },
        }
    }
}

/// Moves the underlying asset in and out of the vault.
///
/// The engine calls this after a command has been applied and before the new
/// state is committed. A failure here rejects the command.
#[async_trait]
pub trait AssetCustody: Send + Sync {
    /// Pulls `amount` from `from` into the vault.
    async fn collect(&self, from: Address, amount: Amount) -> Result<(), CustodyError>;

    /// Pays `amount` out of the vault to `to`.
    async fn release(&self, to: Address, amount: Amount) -> Result<(), CustodyError>;

    /// What the vault currently holds.
    async fn held(&self) -> Amount;

    async fn apply(&self, movement: CustodyMove) -> Result<(), CustodyError> {
        match movement {
            CustodyMove::Collect { from, amount } => self.collect(from, amount).await,
            CustodyMove::Release { to, amount } => self.release(to, amount).await,
        }
    }
}

/// Tracks the vault-held total without touching any real asset.
#[derive(Debug, Default)]
pub struct InMemoryCustody {
    held: Mutex<Amount>,
}

impl InMemoryCustody {
    pub fn new(held: Amount) -> Self {
        Self {
            held: Mutex::new(held),
        }
    }
}

#[async_trait]
impl AssetCustody for InMemoryCustody {
    async fn collect(&self, from: Address, amount: Amount) -> Result<(), CustodyError> {
        let mut held = self.held.lock().await;
        *held = held.checked_add(amount).ok_or(CustodyError::Overflow)?;
        debug!(%from, amount = %amount, held = %*held, "collected into custody");
        Ok(())
    }

    async fn release(&self, to: Address, amount: Amount) -> Result<(), CustodyError> {
        let mut held = self.held.lock().await;
        if amount > *held {
            return Err(CustodyError::InsufficientFunds {
                requested: amount,
                available: *held,
            });
        }
        *held -= amount;
        debug!(%to, amount = %amount, held = %*held, "released from custody");
        Ok(())
    }

    async fn held(&self) -> Amount {
        *self.held.lock().await
    }
}

use core_types::{Address, Amount, PlacementKind, ProtocolError, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// What the vault owes its depositors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapitalLedger {
    #[serde(with = "amount_map")]
    balances: BTreeMap<Address, Amount>,
    deposit_timestamps: BTreeMap<Address, Timestamp>,
    #[serde(with = "core_types::amount::string")]
    total_assets: Amount,
    #[serde(with = "core_types::amount::string")]
    total_shares: Amount,
}

impl CapitalLedger {
    /// Mints shares 1:1 and restarts the user's lock. Returns the shares minted.
    pub fn credit(&mut self, user: Address, amount: Amount, now: Timestamp) -> Result<Amount, ProtocolError> {
        let total_assets = self.total_assets.checked_add(amount).ok_or(ProtocolError::Overflow)?;
        let total_shares = self.total_shares.checked_add(amount).ok_or(ProtocolError::Overflow)?;
        // Bounded by total_assets, which did not overflow.
        let balance = self.balance_of(user) + amount;

        self.balances.insert(user, balance);
        self.deposit_timestamps.insert(user, now);
        self.total_assets = total_assets;
        self.total_shares = total_shares;
        Ok(amount)
    }

    /// Burns shares 1:1. Returns the amount owed back to the user.
    pub fn debit(&mut self, user: Address, shares: Amount) -> Result<Amount, ProtocolError> {
        let balance = self.balance_of(user);
        if shares > balance {
            return Err(ProtocolError::InsufficientBalance);
        }

        self.balances.insert(user, balance - shares);
        self.total_assets -= shares;
        self.total_shares -= shares;
        Ok(shares)
    }

    pub fn balance_of(&self, user: Address) -> Amount {
        self.balances.get(&user).copied().unwrap_or_default()
    }

    /// Zero for users who never deposited.
    pub fn deposit_timestamp(&self, user: Address) -> Timestamp {
        self.deposit_timestamps.get(&user).copied().unwrap_or_default()
    }

    pub fn total_assets(&self) -> Amount {
        self.total_assets
    }

    pub fn total_shares(&self) -> Amount {
        self.total_shares
    }

    pub fn depositors(&self) -> usize {
        self.balances.values().filter(|b| **b > 0).count()
    }

    /// `Σ balances`, for invariant checks.
    pub fn sum_of_balances(&self) -> Amount {
        self.balances.values().sum()
    }
}

/// One write to the placement ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementMovement {
    pub timestamp: Timestamp,
    pub strategy: Address,
    #[serde(with = "core_types::amount::string")]
    pub amount: Amount,
    pub kind: PlacementKind,
}

/// Where capital is notionally deployed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlacementLedger {
    #[serde(with = "amount_map")]
    positions: BTreeMap<Address, Amount>,
    movements: Vec<PlacementMovement>,
}

impl PlacementLedger {
    /// Strategy executions add to a position; rebalances set it.
    pub fn apply(&mut self, movement: PlacementMovement) -> Result<(), ProtocolError> {
        let position = self.positions.entry(movement.strategy).or_default();
        *position = if movement.kind.replaces_position() {
            movement.amount
        } else {
            position.checked_add(movement.amount).ok_or(ProtocolError::Overflow)?
        };
        self.movements.push(movement);
        Ok(())
    }

    pub fn position(&self, strategy: Address) -> Amount {
        self.positions.get(&strategy).copied().unwrap_or_default()
    }

    pub fn positions(&self) -> impl Iterator<Item = (Address, Amount)> + '_ {
        self.positions.iter().map(|(a, v)| (*a, *v))
    }

    pub fn movements(&self) -> &[PlacementMovement] {
        &self.movements
    }
}

/// `BTreeMap<Address, u128>` with the amounts as strings.
mod amount_map {
    use core_types::{Address, Amount};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::collections::BTreeMap;

    pub fn serialize<S: Serializer>(map: &BTreeMap<Address, Amount>, serializer: S) -> Result<S::Ok, S::Error> {
        map.iter()
            .map(|(a, v)| (*a, v.to_string()))
            .collect::<BTreeMap<Address, String>>()
            .serialize(serializer)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<BTreeMap<Address, Amount>, D::Error> {
        BTreeMap::<Address, String>::deserialize(deserializer)?
            .into_iter()
            .map(|(a, v)| v.parse::<Amount>().map(|v| (a, v)).map_err(serde::de::Error::custom))
            .collect()
    }
}

use core_types::{ProtocolError, RebalanceRecord};
use serde::{Deserialize, Serialize};

/// Append-only list of recorded rebalances. Ids are positions in the list and
/// restart from zero after a reset.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RebalanceHistory {
    records: Vec<RebalanceRecord>,
}

impl RebalanceHistory {
    /// The id the next appended record will get.
    pub fn next_id(&self) -> u64 {
        self.records.len() as u64
    }

    pub fn push(&mut self, record: RebalanceRecord) {
        self.records.push(record);
    }

    pub fn get(&self, id: u64) -> Result<&RebalanceRecord, ProtocolError> {
        usize::try_from(id)
            .ok()
            .and_then(|i| self.records.get(i))
            .ok_or(ProtocolError::InvalidRebalanceId)
    }

    /// Up to `limit` records, newest first.
    pub fn recent(&self, limit: usize) -> Vec<&RebalanceRecord> {
        self.records.iter().rev().take(limit).collect()
    }

    pub fn len(&self) -> u64 {
        self.records.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drops every record and returns how many there were.
    pub fn clear(&mut self) -> u64 {
        let cleared = self.len();
        self.records.clear();
        cleared
    }
}

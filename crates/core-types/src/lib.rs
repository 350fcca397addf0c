//! # AutoFi Core Types
//!
//! The shared vocabulary of the AutoFi workspace. Every other crate speaks in
//! these types: addresses, amounts, the rejection taxonomy, protocol events
//! and the records the three core components keep.
//!
//! As a Layer 0 crate it has no knowledge of the components themselves. The
//! `ports` module declares the narrow traits through which one component calls
//! into another inside a single transaction.

pub mod access;
pub mod address;
pub mod amount;
pub mod constants;
pub mod context;
pub mod enums;
pub mod error;
pub mod events;
pub mod ports;
pub mod structs;

// Re-export the core types to provide a clean public API.
pub use access::Ownership;
pub use address::Address;
pub use context::CallContext;
pub use enums::{PlacementKind, RebalanceTrigger};
pub use error::{CoreError, ErrorKind, ProtocolError};
pub use events::{ExecutorEvent, ProtocolEvent, StrategyEvent, VaultEvent};
pub use ports::{AllocationSource, RebalanceBook, StrategyBook};
pub use structs::{
    PerformanceAdvice, PerformanceMetrics, RebalanceConfig, RebalanceRecord, RebalanceStatus,
    StrategyRecord,
};

/// Token quantity in the asset's smallest unit.
pub type Amount = u128;
/// Basis points; 10_000 is 100%.
pub type Bps = u32;
/// Seconds since the Unix epoch.
pub type Timestamp = u64;

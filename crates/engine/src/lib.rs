//! # AutoFi Engine
//!
//! The orchestrator that owns the protocol state and serialises every
//! operation on it.
//!
//! ## Architectural Principles
//!
//! - **One lock, one transaction:** Each `Command` runs against a working copy
//!   of the `ProtocolState` under a single async mutex. The copy replaces the
//!   committed state only after custody and persistence have succeeded.
//! - **Ports at the edges:** Time comes from a `Clock`, asset movements go
//!   through `AssetCustody`, durability through the `storage` crate. Tests
//!   swap in `ManualClock` and `InMemoryCustody`.
//! - **Events after commit:** Components buffer events in the call context;
//!   the engine journals and broadcasts them only once the transaction has
//!   committed.
//!
//! ## Public API
//!
//! - `Engine`: The transaction executor.
//! - `Command` / `CommandOutput`: The operations it accepts.
//! - `ProtocolState`: The three components as one persisted unit.
//! - `AutoRebalancer`: The background auto-rebalance task.
//! - `load_or_bootstrap` / `initialise`: Startup helpers.

pub mod clock;
pub mod command;
pub mod custody;
pub mod engine;
pub mod error;
pub mod scheduler;
pub mod setup;
pub mod state;

pub use clock::{Clock, ManualClock, SystemClock};
pub use command::{Command, CommandOutput};
pub use custody::{AssetCustody, CustodyError, CustodyMove, InMemoryCustody};
pub use engine::Engine;
pub use error::EngineError;
pub use scheduler::AutoRebalancer;
pub use setup::{Startup, initialise, load_or_bootstrap};
pub use state::ProtocolState;

#[cfg(test)]
pub(crate) mod fixtures {
    use configuration::{
        Config, Deployment, LoggingSettings, RebalanceSettings, ServerSettings, StorageSettings,
        StrategySeed, VaultSettings,
    };
    use core_types::{Address, Amount, Timestamp};
    use std::path::PathBuf;

    pub const OWNER: Address = Address::new([0x01; 20]);
    pub const VAULT: Address = Address::new([0x02; 20]);
    pub const MANAGER: Address = Address::new([0x03; 20]);
    pub const EXECUTOR: Address = Address::new([0x04; 20]);
    pub const ALICE: Address = Address::new([0x0a; 20]);
    pub const BOB: Address = Address::new([0x0b; 20]);
    pub const AAVE: Address = Address::new([0xaa; 20]);
    pub const T0: Timestamp = 1_700_000_000;
    pub const WEEK: Timestamp = 7 * 24 * 3_600;
    /// One unit of a 6-decimal asset.
    pub const UNIT: Amount = 1_000_000;

    pub fn config(snapshot_path: Option<PathBuf>) -> Config {
        Config {
            deployment: Deployment {
                owner: OWNER,
                vault: VAULT,
                strategy_manager: MANAGER,
                rebalance_executor: EXECUTOR,
                asset_token: Address::repeat_byte(0x05),
                reward_token: Address::repeat_byte(0x06),
            },
            vault: VaultSettings::default(),
            rebalance: RebalanceSettings {
                threshold_bps: 1_000,
                max_rebalance_amount: 10_000 * UNIT,
                cooldown_secs: 3_600,
                auto_enabled: true,
                auto_interval_secs: 60,
            },
            server: ServerSettings::default(),
            storage: StorageSettings { snapshot_path },
            logging: LoggingSettings::default(),
            strategies: vec![StrategySeed {
                address: AAVE,
                name: "Aave USDC Lending".to_string(),
                max_allocation_bps: 5_000,
                activate: true,
                allocation_bps: 3_000,
            }],
        }
    }
}

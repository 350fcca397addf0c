use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Invalid input for {0}: {1}")]
    InvalidInput(String, String),
}

/// The coarse class a rejection belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorKind {
    Authorization,
    Validation,
    StateConflict,
    PolicyGating,
    Lookup,
}

/// A typed rejection of an attempted protocol operation.
///
/// A call that returns one of these has applied no state change. The messages
/// are the reasons the deployed contracts revert with, so existing clients can
/// keep matching on them.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolError {
    // --- Authorization ---
    #[error("Only vault can call")]
    OnlyVault,
    #[error("Only strategy manager")]
    OnlyStrategyManager,
    #[error("Only rebalance executor")]
    OnlyRebalanceExecutor,
    #[error("Ownable: caller is not the owner")]
    NotOwner,
    #[error("Unauthorized caller")]
    Unauthorized,

    // --- Validation ---
    #[error("Invalid strategy address")]
    InvalidAddress,
    #[error("Max allocation too high")]
    MaxAllocationTooHigh,
    #[error("Arrays length mismatch")]
    ArraysLengthMismatch,
    #[error("No strategies provided")]
    NoStrategiesProvided,
    #[error("Amount must be positive")]
    AmountMustBePositive,
    #[error("Performance score too high")]
    PerformanceScoreTooHigh,
    #[error("Threshold too high")]
    ThresholdTooHigh,
    #[error("Max amount must be positive")]
    MaxAmountMustBePositive,
    #[error("Cooldown too short")]
    CooldownTooShort,
    #[error("Invalid strategy")]
    InvalidStrategy,
    #[error("Arithmetic overflow")]
    Overflow,

    // --- State conflict ---
    #[error("Strategy already active")]
    StrategyAlreadyActive,
    #[error("Strategy not active")]
    StrategyNotActive,
    #[error("Strategy not registered")]
    StrategyNotRegistered,
    #[error("Strategy already registered")]
    StrategyAlreadyRegistered,

    // --- Policy gating ---
    #[error("Deposit too small")]
    DepositTooSmall,
    #[error("Funds are locked")]
    FundsLocked,
    #[error("Insufficient balance")]
    InsufficientBalance,
    #[error("Insufficient vault balance")]
    InsufficientVaultBalance,
    #[error("Allocation exceeds maximum")]
    AllocationExceedsMaximum,
    #[error("Total allocation exceeds 100%")]
    TotalAllocationExceeds100Percent,
    #[error("Amount exceeds max rebalance")]
    AmountExceedsMaxRebalance,
    #[error("Cooldown period not passed")]
    CooldownNotPassed,
    #[error("Auto rebalancing disabled")]
    AutoRebalancingDisabled,
    #[error("Pausable: paused")]
    Paused,
    #[error("Pausable: not paused")]
    NotPaused,

    // --- Lookup ---
    #[error("Invalid rebalance ID")]
    InvalidRebalanceId,
}

impl ProtocolError {
    pub fn kind(&self) -> ErrorKind {
        use ProtocolError::*;
        match self {
            OnlyVault | OnlyStrategyManager | OnlyRebalanceExecutor | NotOwner | Unauthorized => {
                ErrorKind::Authorization
            }
            InvalidAddress
            | MaxAllocationTooHigh
            | ArraysLengthMismatch
            | NoStrategiesProvided
            | AmountMustBePositive
            | PerformanceScoreTooHigh
            | ThresholdTooHigh
            | MaxAmountMustBePositive
            | CooldownTooShort
            | InvalidStrategy
            | Overflow => ErrorKind::Validation,
            StrategyAlreadyActive
            | StrategyNotActive
            | StrategyNotRegistered
            | StrategyAlreadyRegistered => ErrorKind::StateConflict,
            DepositTooSmall
            | FundsLocked
            | InsufficientBalance
            | InsufficientVaultBalance
            | AllocationExceedsMaximum
            | TotalAllocationExceeds100Percent
            | AmountExceedsMaxRebalance
            | CooldownNotPassed
            | AutoRebalancingDisabled
            | Paused
            | NotPaused => ErrorKind::PolicyGating,
            InvalidRebalanceId => ErrorKind::Lookup,
        }
    }

    /// Stable identifier used on the wire and in logs.
    pub fn name(&self) -> &'static str {
        use ProtocolError::*;
        match self {
            OnlyVault => "OnlyVault",
            OnlyStrategyManager => "OnlyStrategyManager",
            OnlyRebalanceExecutor => "OnlyRebalanceExecutor",
            NotOwner => "NotOwner",
            Unauthorized => "Unauthorized",
            InvalidAddress => "InvalidAddress",
            MaxAllocationTooHigh => "MaxAllocationTooHigh",
            ArraysLengthMismatch => "ArraysLengthMismatch",
            NoStrategiesProvided => "NoStrategiesProvided",
            AmountMustBePositive => "AmountMustBePositive",
            PerformanceScoreTooHigh => "PerformanceScoreTooHigh",
            ThresholdTooHigh => "ThresholdTooHigh",
            MaxAmountMustBePositive => "MaxAmountMustBePositive",
            CooldownTooShort => "CooldownTooShort",
            InvalidStrategy => "InvalidStrategy",
            Overflow => "Overflow",
            StrategyAlreadyActive => "StrategyAlreadyActive",
            StrategyNotActive => "StrategyNotActive",
            StrategyNotRegistered => "StrategyNotRegistered",
            StrategyAlreadyRegistered => "StrategyAlreadyRegistered",
            DepositTooSmall => "DepositTooSmall",
            FundsLocked => "FundsLocked",
            InsufficientBalance => "InsufficientBalance",
            InsufficientVaultBalance => "InsufficientVaultBalance",
            AllocationExceedsMaximum => "AllocationExceedsMaximum",
            TotalAllocationExceeds100Percent => "TotalAllocationExceeds100Percent",
            AmountExceedsMaxRebalance => "AmountExceedsMaxRebalance",
            CooldownNotPassed => "CooldownNotPassed",
            AutoRebalancingDisabled => "AutoRebalancingDisabled",
            Paused => "Paused",
            NotPaused => "NotPaused",
            InvalidRebalanceId => "InvalidRebalanceID",
        }
    }
}

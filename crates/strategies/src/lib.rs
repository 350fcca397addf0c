//! # AutoFi Strategy Manager
//!
//! The registry of yield strategies the vault may place capital into, together
//! with their allocation caps and performance bookkeeping.
//!
//! ## Architectural Principles
//!
//! - **Layer 1 Logic:** A pure state machine. It performs no I/O and has no
//!   knowledge of the vault or the executor beyond their addresses. Every
//!   mutation takes a `CallContext` and either applies fully or returns a
//!   `ProtocolError` having changed nothing.
//! - **Ports:** The vault reaches `execute_strategy` through the `StrategyBook`
//!   trait; the rebalance executor reads active allocations through
//!   `AllocationSource`.
//!
//! ## Invariants
//!
//! - The sum of all allocations equals `total_allocation` and never exceeds
//!   10 000 basis points.
//! - Records are never deleted. The active list holds each active strategy
//!   exactly once, in activation order.

pub mod manager;

pub use manager::StrategyManager;

//! Collateral Lending Contracts
//!
//! Single-pool collateralized lending: lenders supply a loan asset and earn
//! interest scaled by pool utilization, borrowers lock a collateral asset and
//! take one loan each, liquidators close loans that fall below threshold.
//!
//! ## Architecture
//!
//! - **LedgerCore**: Every state transition, over injected storage, token
//!   ports and clock
//! - **Router**: Name-based dispatch onto the core
//! - **LendingPool**: Odra contract backing the core with its own storage,
//!   CEP-18 token calls and block time
//! - **MockToken**: CEP-18 stand-in for the Odra test VM
//!
//! ## Atomicity
//!
//! Operations compute the next state before any transfer and persist it only
//! after all transfers succeed. Repay and liquidate move two assets; the
//! collateral leg is checked before the debt is pulled and a failed
//! collateral push refunds the debt.

#![cfg_attr(target_arch = "wasm32", no_std)]

extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod types;
pub mod errors;
pub mod interfaces;
pub mod interest;
pub mod ledger;
pub mod router;
pub mod store;

// Contract modules
pub mod events;
pub mod lending_pool;
pub mod token_adapter;
pub mod mock_token;

// Off-chain collaborators for tests and simulations
#[cfg(not(target_arch = "wasm32"))]
pub mod testing;

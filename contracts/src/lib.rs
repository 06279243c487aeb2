//! USDX Treasury Contracts
//!
//! Treasury management and stablecoin redemption protocol.
//!
//! ## Architecture
//!
//! - **Treasury**: Custody hub; keyed service operations, two-phase redemption
//! - **RedemptionExtension**: Pricing, validation, withdrawal planning,
//!   per-block rate limiting
//! - **Stablecoin (USDX)**: Protocol stablecoin with mint/burn access control
//! - **Connectors (Aave/Silo/Euler)**: Uniform adapters over the yield venues
//! - **Escrow**: Custody between redemption initiation and completion
//! - **OracleAdapter**: Chainlink-shaped price rounds with explicit status
//! - **RewardDistributor**: High-water-mark yield minted as USDX
//! - **AccessControl**: Role-based authorization root for every contract
//!
//! ## Oracle Fallback
//!
//! Pricing degrades, it never blocks: a missing, errored, or stale round
//! (older than the 24h heartbeat) selects a deterministic 1:1 conversion
//! instead of reverting the redemption.

#![cfg_attr(target_arch = "wasm32", no_std)]

#[cfg(target_arch = "wasm32")]
extern crate alloc;

// Re-export odra for downstream usage
pub use odra;

// Core module declarations
pub mod types;
pub mod errors;
pub mod events;

// Contract modules
pub mod access_control;
pub mod stablecoin;
pub mod oracle_adapter;
pub mod connector_aave;
pub mod connector_silo;
pub mod connector_euler;
pub mod escrow;
pub mod redemption_extension;
pub mod reward_distributor;
pub mod treasury;

//! Domain events emitted by the protocol contracts.
//!
//! Field order and names are part of the compatibility surface consumed by
//! downstream indexers; change them only with a migration plan.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::types::Protocol;

/// Asset moved out of the Treasury via a keyed service operation.
#[odra::event]
pub struct AssetTransferred {
    /// Asset token address
    pub asset: Address,
    /// Recipient
    pub to: Address,
    /// Amount transferred
    pub amount: U256,
    /// Idempotency key of the operation
    pub idempotency_key: String,
}

/// Allowance granted to an external spender.
#[odra::event]
pub struct SpenderApproved {
    /// Asset token address
    pub asset: Address,
    /// Approved spender
    pub spender: Address,
    /// Approved amount
    pub amount: U256,
    /// Idempotency key of the operation
    pub idempotency_key: String,
}

/// Treasury funds deployed into a yield venue.
#[odra::event]
pub struct ProtocolDeposited {
    /// Venue
    pub protocol: Protocol,
    /// Target vault
    pub vault: Address,
    /// Asset amount deposited
    pub amount: U256,
    /// Shares received by the connector
    pub shares: U256,
    /// Idempotency key of the operation
    pub idempotency_key: String,
}

/// Treasury funds pulled back from a yield venue.
#[odra::event]
pub struct ProtocolWithdrawn {
    /// Venue
    pub protocol: Protocol,
    /// Source vault
    pub vault: Address,
    /// Asset amount requested
    pub amount: U256,
    /// Asset amount actually withdrawn
    pub withdrawn: U256,
    /// Idempotency key of the operation
    pub idempotency_key: String,
}

/// Connector-level deposit record.
#[odra::event]
pub struct ConnectorDeposit {
    /// Underlying asset
    pub asset: Address,
    /// Target vault
    pub vault: Address,
    /// Amount pulled from the caller
    pub amount: U256,
    /// Shares minted to the connector
    pub shares: U256,
}

/// Connector-level withdrawal record.
#[odra::event]
pub struct ConnectorWithdrawal {
    /// Underlying asset
    pub asset: Address,
    /// Source vault
    pub vault: Address,
    /// Amount requested
    pub amount: U256,
    /// Shares the vault previewed for the withdrawal (informational)
    pub shares_previewed: U256,
    /// Amount actually withdrawn
    pub withdrawn: U256,
}

/// Euler collateral mode toggled for a vault.
#[odra::event]
pub struct CollateralModeChanged {
    /// Vault whose collateral mode changed
    pub vault: Address,
    /// New mode
    pub enabled: bool,
}

/// Two-phase redemption entered its cooldown.
#[odra::event]
pub struct RedemptionInitiated {
    /// Redeeming user
    pub user: Address,
    /// Redemption asset
    pub asset: Address,
    /// USDX burned from the user
    pub usdx_burned: U256,
    /// Asset amount owed after price adjustment
    pub asset_owed: U256,
    /// Cooldown start timestamp
    pub cooldown_start: u64,
}

/// Escrowed funds released to the beneficiary.
#[odra::event]
pub struct RedemptionCompleted {
    /// User whose pending record was settled
    pub user: Address,
    /// Payout recipient
    pub beneficiary: Address,
    /// Redemption asset
    pub asset: Address,
    /// Amount paid out
    pub amount: U256,
}

/// Price-adjusted quote computed on a state-mutating path.
#[odra::event]
pub struct RedemptionQuoteRecorded {
    /// Redemption asset
    pub asset: Address,
    /// USDX amount quoted
    pub usdx_amount: U256,
    /// Resulting asset amount
    pub asset_amount: U256,
    /// Price adjustment factor (1e18-scaled)
    pub price_adjustment: U256,
    /// Whether the 1:1 fallback branch was taken
    pub used_fallback: bool,
}

/// Accrued vault yield minted as USDX.
#[odra::event]
pub struct YieldDistributed {
    /// Total assets across active allocations at distribution time
    pub total_assets: U256,
    /// Yield above the previous high-water mark, in asset units
    pub yield_assets: U256,
    /// USDX minted to the stablecoin contract
    pub usdx_minted: U256,
}

/// New entry appended to the allocation arena.
#[odra::event]
pub struct VaultAllocationAdded {
    /// Arena id of the new entry
    pub allocation_id: u32,
    /// Underlying vault
    pub vault: Address,
    /// Mediating connector
    pub connector: Address,
    /// Venue
    pub protocol: Protocol,
    /// Allocation weight in basis points
    pub allocation_bps: u32,
}

/// Allocation entry activated or deactivated.
#[odra::event]
pub struct VaultAllocationUpdated {
    /// Arena id
    pub allocation_id: u32,
    /// New active flag
    pub active: bool,
}

/// Admin replaced a configuration value.
#[odra::event]
pub struct ConfigurationChanged {
    /// Name of the parameter that changed
    pub parameter: String,
}

/// Protocol paused.
#[odra::event]
pub struct Paused {
    /// Caller that paused
    pub by: Address,
}

/// Protocol unpaused.
#[odra::event]
pub struct Unpaused {
    /// Caller that unpaused
    pub by: Address,
}

/// Oracle feeder submitted a new price round.
#[odra::event]
pub struct PriceSubmitted {
    /// Asset priced
    pub asset: Address,
    /// Round id
    pub round_id: u64,
    /// Submitted price
    pub price: U256,
    /// Round timestamp
    pub updated_at: u64,
}

/// Escrow paid out to a beneficiary.
#[odra::event]
pub struct EscrowWithdrawal {
    /// Payout recipient
    pub beneficiary: Address,
    /// Asset paid
    pub asset: Address,
    /// Amount paid
    pub amount: U256,
}

/// Stray assets swept from the escrow back to the Treasury.
#[odra::event]
pub struct EscrowRecovered {
    /// Swept asset
    pub asset: Address,
    /// Swept amount
    pub amount: U256,
}

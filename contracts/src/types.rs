//! Common types used across the treasury protocol.

use odra::prelude::*;
use odra::casper_types::U256;

/// Idempotency domain for service operations dispatched through the Treasury.
#[odra::odra_type]
#[derive(Copy, PartialOrd, Ord)]
pub enum OperationKind {
    /// Direct asset transfer out of the Treasury
    TransferAsset,
    /// Allowance grant to an external spender
    ApproveSpender,
    /// Deposit into the Aave connector
    AaveDeposit,
    /// Withdrawal from the Aave connector
    AaveWithdraw,
    /// Deposit into a Silo vault
    SiloDeposit,
    /// Withdrawal from a Silo vault
    SiloWithdraw,
    /// Deposit into an Euler vault
    EulerDeposit,
    /// Withdrawal from an Euler vault
    EulerWithdraw,
    /// Admin-only transfer usable while paused
    EmergencyTransfer,
}

impl OperationKind {
    /// Stable wire code. Used as the idempotency-registry and limit-table key.
    pub const fn code(self) -> u8 {
        match self {
            OperationKind::TransferAsset => 0,
            OperationKind::ApproveSpender => 1,
            OperationKind::AaveDeposit => 2,
            OperationKind::AaveWithdraw => 3,
            OperationKind::SiloDeposit => 4,
            OperationKind::SiloWithdraw => 5,
            OperationKind::EulerDeposit => 6,
            OperationKind::EulerWithdraw => 7,
            OperationKind::EmergencyTransfer => 8,
        }
    }
}

/// External yield venue behind a connector.
#[odra::odra_type]
#[derive(Copy, PartialOrd, Ord)]
pub enum Protocol {
    /// Aave-style lending pool
    Aave,
    /// Silo-style isolated lending vault
    Silo,
    /// Euler-style vault (EVC collateral management)
    Euler,
}

impl Protocol {
    /// Human-readable label carried in events.
    pub const fn label(self) -> &'static str {
        match self {
            Protocol::Aave => "Aave",
            Protocol::Silo => "Silo",
            Protocol::Euler => "Euler",
        }
    }

    /// Withdrawal-planning priority tier. Lower is drained first.
    pub const fn priority(self) -> u8 {
        match self {
            Protocol::Silo => 0,
            Protocol::Euler => 1,
            Protocol::Aave => 2,
        }
    }
}

/// Oracle price status
#[odra::odra_type]
#[derive(Copy)]
pub enum OracleStatus {
    /// Price is valid
    Ok,
    /// No price data has been recorded for the asset
    Unavailable,
    /// Price data failed a sanity check (zero or out of bounds)
    InvalidPrice,
}

/// Price round reported by an oracle adapter.
///
/// Mirrors the Chainlink round shape. Consumers apply their own heartbeat
/// check against `updated_at`.
#[odra::odra_type]
pub struct PriceData {
    /// Monotonically increasing round identifier
    pub round_id: u64,
    /// Integer price value
    pub price: U256,
    /// Decimal places for `price`
    pub price_decimals: u8,
    /// Timestamp when the round started (seconds)
    pub started_at: u64,
    /// Timestamp when the round was last updated (seconds)
    pub updated_at: u64,
    /// Round in which the answer was computed
    pub answered_in_round: u64,
    /// Price status
    pub status: OracleStatus,
}

/// One connected yield venue in the allocation arena.
///
/// Entries are append-only; deactivation flips `active` but keeps the
/// identifier stable for components holding cached allocation ids.
#[odra::odra_type]
pub struct VaultAllocation {
    /// Underlying vault address
    pub vault: Address,
    /// Connector mediating all fund movement to the vault
    pub connector: Address,
    /// Allocation weight in basis points (informational for yield reporting)
    pub allocation_bps: u32,
    /// Whether the entry participates in planning and yield traversal
    pub active: bool,
    /// Venue behind the connector
    pub protocol: Protocol,
}

/// Outstanding redemption for a `(user, asset)` pair.
#[odra::odra_type]
#[derive(Default)]
pub struct PendingRedemption {
    /// Amount owed, in redemption-asset units
    pub amount: U256,
    /// Timestamp of the latest initiation (cooldown restarts on accumulation)
    pub cooldown_start: u64,
}

/// One selected venue in a withdrawal plan.
#[odra::odra_type]
pub struct WithdrawalPlanEntry {
    /// Allocation arena id
    pub allocation_id: u32,
    /// Underlying vault address
    pub vault: Address,
    /// Connector to route the withdrawal through
    pub connector: Address,
    /// Venue label
    pub protocol: Protocol,
    /// Partial-fill amount sourced from this entry
    pub amount: U256,
}

/// Ordered withdrawal plan. Transient, recomputed on every planning call.
#[odra::odra_type]
pub struct WithdrawalPlan {
    /// Entries actually used, in execution order
    pub entries: Vec<WithdrawalPlanEntry>,
    /// Total amount obtainable across the entries
    pub total_available: U256,
}

/// Redemption quote with its price provenance.
#[odra::odra_type]
pub struct RedemptionQuote {
    /// Redeemable amount in redemption-asset units
    pub asset_amount: U256,
    /// Price adjustment factor, 1e18-scaled (1e18 = no adjustment)
    pub price_adjustment: U256,
    /// Human-readable price source label
    pub price_source: String,
}

/// Outcome of `validate_redemption`: first failing reason, short-circuit.
#[odra::odra_type]
pub struct ValidationResult {
    /// Whether the redemption request passes every check
    pub is_valid: bool,
    /// First failing reason, empty when valid
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_kind_codes_are_stable() {
        assert_eq!(OperationKind::TransferAsset.code(), 0);
        assert_eq!(OperationKind::ApproveSpender.code(), 1);
        assert_eq!(OperationKind::AaveDeposit.code(), 2);
        assert_eq!(OperationKind::AaveWithdraw.code(), 3);
        assert_eq!(OperationKind::SiloDeposit.code(), 4);
        assert_eq!(OperationKind::SiloWithdraw.code(), 5);
        assert_eq!(OperationKind::EulerDeposit.code(), 6);
        assert_eq!(OperationKind::EulerWithdraw.code(), 7);
        assert_eq!(OperationKind::EmergencyTransfer.code(), 8);
    }

    #[test]
    fn test_protocol_priority_tiers() {
        // Silo drains first, then Euler, Aave last
        assert!(Protocol::Silo.priority() < Protocol::Euler.priority());
        assert!(Protocol::Euler.priority() < Protocol::Aave.priority());
    }

    #[test]
    fn test_protocol_labels() {
        assert_eq!(Protocol::Aave.label(), "Aave");
        assert_eq!(Protocol::Silo.label(), "Silo");
        assert_eq!(Protocol::Euler.label(), "Euler");
    }

    #[test]
    fn test_pending_redemption_default_is_empty() {
        let pending = PendingRedemption::default();
        assert!(pending.amount.is_zero());
        assert_eq!(pending.cooldown_start, 0);
    }
}

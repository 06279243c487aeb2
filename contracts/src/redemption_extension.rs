//! Redemption Extension Contract
//!
//! Stateful policy engine behind the Treasury's redemption flow. Owns the
//! pieces of state that exactly one component may own:
//! - the redeemable-asset flags (and each asset's decimals),
//! - the append-only vault allocation arena,
//! - the per-block redemption counter.
//!
//! Pricing, validation and withdrawal planning are computed here so policy
//! can evolve without touching custody code. The pure arithmetic lives in
//! free functions at the bottom of the module.
//!
//! Price adjustment: when the redemption asset trades above its $1 peg, the
//! redeemable amount scales down by `peg / price`, preserving
//! over-collateralization. At or below peg, conversion is exactly 1:1. A
//! failed or stale oracle read (older than the 24h heartbeat) is not an
//! error: it selects the 1:1 fallback deterministically.

use odra::prelude::*;
use odra::casper_types::{U256, runtime_args};
use odra::CallDef;
use crate::access_control::ROLE_ADMIN;
use crate::errors::ProtocolError;
use crate::events::{
    ConfigurationChanged, RedemptionQuoteRecorded, VaultAllocationAdded, VaultAllocationUpdated,
};
use crate::types::{
    OracleStatus, PriceData, Protocol, ValidationResult, VaultAllocation, RedemptionQuote,
    WithdrawalPlan, WithdrawalPlanEntry,
};

/// Unity scale for the price adjustment factor (1e18)
pub const UNITY: u128 = 1_000_000_000_000_000_000;

/// Maximum tolerated oracle price age: 24 hours.
///
/// Compared directly against `get_block_time()` values, which the protocol
/// treats as seconds; a deployment whose environment reports another unit
/// must rescale this constant.
pub const ORACLE_HEARTBEAT_SECONDS: u64 = 86_400;

/// USDX decimal precision
pub const USDX_DECIMALS: u8 = 18;

/// Basis points scale
const BPS_SCALE: u32 = 10_000;

/// Price source label when the oracle round was fresh
const PRICE_SOURCE_ORACLE: &str = "Chainlink Oracle";

/// Price source label when the 1:1 fallback branch was taken
const PRICE_SOURCE_FALLBACK: &str = "Fallback (1:1)";

/// Redemption Extension Contract
#[odra::module]
pub struct RedemptionExtension {
    /// Access control contract address
    access_control: Var<Address>,
    /// Treasury contract address (sole caller of mutating policy hooks)
    treasury: Var<Option<Address>>,
    /// Price feed adapter address
    oracle: Var<Option<Address>>,
    /// Redeemable asset flags
    redeemable_assets: Mapping<Address, bool>,
    /// Decimal precision per redemption asset
    asset_decimals: Mapping<Address, u8>,
    /// Allocation arena: id -> entry (append-only, stable ids)
    allocations: Mapping<u32, VaultAllocation>,
    /// Number of arena entries ever added
    allocation_count: Var<u32>,
    /// Cumulative USDX redeemed per block
    block_redemptions: Mapping<u64, U256>,
    /// Per-block redemption cap (0 = unlimited)
    max_redemption_per_block: Var<U256>,
}

#[odra::module]
impl RedemptionExtension {
    /// Initialize the extension
    pub fn init(&mut self, access_control: Address) {
        self.access_control.set(access_control);
        self.treasury.set(None);
        self.oracle.set(None);
        self.allocation_count.set(0);
        self.max_redemption_per_block.set(U256::zero());
    }

    // ========== Quote Functions ==========

    /// Price-adjusted redemption quote. Pure view: no event, no state change.
    ///
    /// Returns `(asset_amount, price_adjustment_factor)` with the factor
    /// 1e18-scaled.
    pub fn quote_redemption(&self, asset: Address, usdx_amount: U256) -> (U256, U256) {
        let (asset_amount, factor, _) = self.quote_internal(asset, usdx_amount);
        (asset_amount, factor)
    }

    /// Quote twin invoked from state-mutating callers (Treasury only).
    ///
    /// Same computation as `quote_redemption` plus the quote event for the
    /// audit trail.
    pub fn record_redemption_quote(&mut self, asset: Address, usdx_amount: U256) -> (U256, U256) {
        self.require_treasury();

        let (asset_amount, factor, used_fallback) = self.quote_internal(asset, usdx_amount);

        self.env().emit_event(RedemptionQuoteRecorded {
            asset,
            usdx_amount,
            asset_amount,
            price_adjustment: factor,
            used_fallback,
        });

        (asset_amount, factor)
    }

    /// Quote with its price provenance label.
    pub fn get_redemption_quote(&self, asset: Address, usdx_amount: U256) -> RedemptionQuote {
        let (asset_amount, factor, used_fallback) = self.quote_internal(asset, usdx_amount);

        let price_source = if used_fallback {
            String::from(PRICE_SOURCE_FALLBACK)
        } else {
            String::from(PRICE_SOURCE_ORACLE)
        };

        RedemptionQuote {
            asset_amount,
            price_adjustment: factor,
            price_source,
        }
    }

    // ========== Validation ==========

    /// Validate a redemption request without mutating state.
    ///
    /// Checks run in a fixed order and short-circuit on the first failure;
    /// the reason string never combines multiple failures.
    pub fn validate_redemption(
        &self,
        _user: Address,
        asset: Address,
        usdx_amount: U256,
        min_asset_amount: U256,
        block_number: u64,
    ) -> ValidationResult {
        if !self.is_redeemable(asset) {
            return self.invalid(ProtocolError::AssetNotRedeemable);
        }

        if usdx_amount.is_zero() {
            return self.invalid(ProtocolError::ZeroAmount);
        }

        let cap = self.max_redemption_per_block.get().unwrap_or(U256::zero());
        if cap > U256::zero() {
            let redeemed = self.block_redemptions.get(&block_number).unwrap_or(U256::zero());
            if redeemed + usdx_amount > cap {
                return self.invalid(ProtocolError::BlockRedemptionCapExceeded);
            }
        }

        let (asset_amount, _, _) = self.quote_internal(asset, usdx_amount);
        if asset_amount < min_asset_amount {
            return self.invalid(ProtocolError::SlippageExceeded);
        }

        let plan = self.calculate_withdrawal_plan(asset_amount);
        if plan.total_available < asset_amount {
            return self.invalid(ProtocolError::InsufficientLiquidity);
        }

        ValidationResult {
            is_valid: true,
            reason: String::new(),
        }
    }

    // ========== Withdrawal Planning ==========

    /// Build an ordered withdrawal plan for `required` asset units.
    ///
    /// Candidates are the active allocation entries, priority Silo then
    /// Euler then Aave, storage order within a tier, zero-balance entries
    /// dropped. Each candidate's capacity is the connector's previewed
    /// withdrawal against the full requirement; the greedy fill itself is
    /// `select_withdrawal_sources`, which partially fills the last source
    /// used and takes nothing from candidates past full coverage. The
    /// result holds only entries actually used.
    pub fn calculate_withdrawal_plan(&self, required: U256) -> WithdrawalPlan {
        let candidates = self.planning_candidates(required);

        let capacities: Vec<U256> = candidates.iter().map(|(_, _, c)| *c).collect();
        let (fills, total_available) = select_withdrawal_sources(required, &capacities);

        let mut entries: Vec<WithdrawalPlanEntry> = Vec::new();
        for (index, amount) in fills {
            let (id, alloc, _) = &candidates[index];
            entries.push(WithdrawalPlanEntry {
                allocation_id: *id,
                vault: alloc.vault,
                connector: alloc.connector,
                protocol: alloc.protocol,
                amount,
            });
        }

        WithdrawalPlan {
            entries,
            total_available,
        }
    }

    // ========== Per-Block Counter (Treasury Only) ==========

    /// Accumulate redeemed USDX for a block, enforcing the per-block cap.
    ///
    /// The check runs after provisional accumulation; an excess reverts the
    /// whole transaction, so no partial counter state survives.
    pub fn update_block_redemptions(&mut self, block_number: u64, amount: U256) {
        self.require_treasury();

        let redeemed = self.block_redemptions.get(&block_number).unwrap_or(U256::zero());
        let accumulated = redeemed + amount;
        self.block_redemptions.set(&block_number, accumulated);

        let cap = self.max_redemption_per_block.get().unwrap_or(U256::zero());
        if cap > U256::zero() && accumulated > cap {
            self.env().revert(ProtocolError::BlockRedemptionCapExceeded);
        }
    }

    /// Get the cumulative USDX redeemed in a block
    pub fn get_block_redemptions(&self, block_number: u64) -> U256 {
        self.block_redemptions.get(&block_number).unwrap_or(U256::zero())
    }

    // ========== Allocation Arena ==========

    /// Append a vault allocation entry (admin only). Returns its stable id.
    pub fn add_vault_allocation(
        &mut self,
        vault: Address,
        connector: Address,
        allocation_bps: u32,
        protocol: Protocol,
    ) -> u32 {
        self.require_admin();

        if !vault.is_contract() || !connector.is_contract() {
            self.env().revert(ProtocolError::NotAContract);
        }
        if allocation_bps > BPS_SCALE {
            self.env().revert(ProtocolError::InvalidConfig);
        }

        let id = self.allocation_count.get().unwrap_or(0);
        self.allocations.set(&id, VaultAllocation {
            vault,
            connector,
            allocation_bps,
            active: true,
            protocol,
        });
        self.allocation_count.set(id + 1);

        self.env().emit_event(VaultAllocationAdded {
            allocation_id: id,
            vault,
            connector,
            protocol,
            allocation_bps,
        });

        id
    }

    /// Activate or deactivate an allocation entry (admin only).
    ///
    /// Entries are never removed; deactivation keeps the id addressable for
    /// historical queries.
    pub fn set_vault_allocation_active(&mut self, allocation_id: u32, active: bool) {
        self.require_admin();

        let mut alloc = match self.allocations.get(&allocation_id) {
            Some(a) => a,
            None => self.env().revert(ProtocolError::AllocationNotFound),
        };
        alloc.active = active;
        self.allocations.set(&allocation_id, alloc);

        self.env().emit_event(VaultAllocationUpdated {
            allocation_id,
            active,
        });
    }

    /// Get an allocation entry by id
    pub fn get_vault_allocation(&self, allocation_id: u32) -> Option<VaultAllocation> {
        self.allocations.get(&allocation_id)
    }

    /// Get the number of arena entries ever added
    pub fn get_allocation_count(&self) -> u32 {
        self.allocation_count.get().unwrap_or(0)
    }

    // ========== Configuration ==========

    /// Check if an asset is flagged redeemable
    pub fn is_redeemable(&self, asset: Address) -> bool {
        self.redeemable_assets.get(&asset).unwrap_or(false)
    }

    /// Get the decimals configured for a redemption asset
    pub fn get_asset_decimals(&self, asset: Address) -> u8 {
        self.asset_decimals.get(&asset).unwrap_or(USDX_DECIMALS)
    }

    /// Flag an asset redeemable and record its decimals (admin only)
    pub fn set_redeemable_asset(&mut self, asset: Address, redeemable: bool, decimals: u8) {
        self.require_admin();
        if !asset.is_contract() {
            self.env().revert(ProtocolError::NotAContract);
        }
        self.redeemable_assets.set(&asset, redeemable);
        self.asset_decimals.set(&asset, decimals);
        self.env().emit_event(ConfigurationChanged {
            parameter: String::from("extension.redeemable_asset"),
        });
    }

    /// Set the per-block redemption cap, 0 for unlimited (admin only)
    pub fn set_max_redemption_per_block(&mut self, cap: U256) {
        self.require_admin();
        self.max_redemption_per_block.set(cap);
        self.env().emit_event(ConfigurationChanged {
            parameter: String::from("extension.max_redemption_per_block"),
        });
    }

    /// Get the per-block redemption cap
    pub fn get_max_redemption_per_block(&self) -> U256 {
        self.max_redemption_per_block.get().unwrap_or(U256::zero())
    }

    /// Set the Treasury address (admin only)
    pub fn set_treasury(&mut self, treasury: Address) {
        self.require_admin();
        if !treasury.is_contract() {
            self.env().revert(ProtocolError::NotAContract);
        }
        self.treasury.set(Some(treasury));
        self.env().emit_event(ConfigurationChanged {
            parameter: String::from("extension.treasury"),
        });
    }

    /// Set the price feed adapter address (admin only)
    pub fn set_oracle(&mut self, oracle: Address) {
        self.require_admin();
        if !oracle.is_contract() {
            self.env().revert(ProtocolError::NotAContract);
        }
        self.oracle.set(Some(oracle));
        self.env().emit_event(ConfigurationChanged {
            parameter: String::from("extension.oracle"),
        });
    }

    /// Get the Treasury address
    pub fn get_treasury(&self) -> Option<Address> {
        self.treasury.get().flatten()
    }

    /// Get the oracle address
    pub fn get_oracle(&self) -> Option<Address> {
        self.oracle.get().flatten()
    }

    // ========== Internal Functions ==========

    /// Quote core: `(asset_amount, factor, used_fallback)`.
    fn quote_internal(&self, asset: Address, usdx_amount: U256) -> (U256, U256, bool) {
        if !self.is_redeemable(asset) {
            self.env().revert(ProtocolError::AssetNotRedeemable);
        }
        if usdx_amount.is_zero() {
            self.env().revert(ProtocolError::ZeroAmount);
        }

        let now = self.env().get_block_time();
        let round = self.read_oracle(asset);

        let (adjusted, factor, used_fallback) = match round {
            Some(round) if is_fresh(&round, now) => {
                let peg_scale = U256::from(10u64).pow(U256::from(round.price_decimals));
                let (adjusted, factor) =
                    price_adjusted_redemption(usdx_amount, round.price, peg_scale);
                (adjusted, factor, false)
            }
            // Degraded or absent price feed: conservative nominal conversion
            _ => (usdx_amount, U256::from(UNITY), true),
        };

        let decimals = self.get_asset_decimals(asset);
        let asset_amount = rescale_amount(adjusted, USDX_DECIMALS, decimals);

        (asset_amount, factor, used_fallback)
    }

    fn read_oracle(&self, asset: Address) -> Option<PriceData> {
        let oracle = self.oracle.get().flatten()?;
        let args = runtime_args! {
            "asset" => asset
        };
        let call_def = CallDef::new("get_latest_round_data", false, args);
        Some(self.env().call_contract(oracle, call_def))
    }

    /// Active allocation entries in withdrawal priority order, each with
    /// the capacity the connector can contribute toward `required`.
    fn planning_candidates(&self, required: U256) -> Vec<(u32, VaultAllocation, U256)> {
        let mut candidates = Vec::new();
        let count = self.allocation_count.get().unwrap_or(0);
        let tiers = [Protocol::Silo, Protocol::Euler, Protocol::Aave];

        for tier in tiers {
            for id in 0..count {
                let alloc = match self.allocations.get(&id) {
                    Some(a) => a,
                    None => continue,
                };
                if !alloc.active || alloc.protocol.priority() != tier.priority() {
                    continue;
                }

                let balance = self.connector_vault_balance(alloc.connector, alloc.vault);
                if balance.is_zero() {
                    continue;
                }

                let capacity =
                    self.connector_preview_withdraw(alloc.connector, alloc.vault, required);
                candidates.push((id, alloc, capacity));
            }
        }

        candidates
    }

    fn connector_vault_balance(&self, connector: Address, vault: Address) -> U256 {
        let args = runtime_args! {
            "vault" => vault
        };
        let call_def = CallDef::new("get_vault_balance", false, args);
        self.env().call_contract(connector, call_def)
    }

    fn connector_preview_withdraw(&self, connector: Address, vault: Address, amount: U256) -> U256 {
        let args = runtime_args! {
            "vault" => vault,
            "amount" => amount
        };
        let call_def = CallDef::new("preview_withdraw", false, args);
        self.env().call_contract(connector, call_def)
    }

    fn invalid(&self, reason: ProtocolError) -> ValidationResult {
        ValidationResult {
            is_valid: false,
            reason: String::from(reason.message()),
        }
    }

    fn require_treasury(&self) {
        let treasury = match self.treasury.get().flatten() {
            Some(addr) => addr,
            None => self.env().revert(ProtocolError::InvalidConfig),
        };
        if self.env().caller() != treasury {
            self.env().revert(ProtocolError::Unauthorized);
        }
    }

    fn require_admin(&self) {
        let caller = self.env().caller();
        let acl = match self.access_control.get() {
            Some(addr) => addr,
            None => self.env().revert(ProtocolError::InvalidConfig),
        };

        let args = runtime_args! {
            "role_id" => ROLE_ADMIN,
            "account" => caller
        };
        let call_def = CallDef::new("has_role", false, args);
        let is_admin: bool = self.env().call_contract(acl, call_def);

        if !is_admin {
            self.env().revert(ProtocolError::Unauthorized);
        }
    }
}

// ========== Pure Policy Arithmetic ==========

/// Whether an oracle round may be used for pricing.
pub fn is_fresh(round: &PriceData, now: u64) -> bool {
    matches!(round.status, OracleStatus::Ok)
        && !round.price.is_zero()
        && now.saturating_sub(round.updated_at) <= ORACLE_HEARTBEAT_SECONDS
}

/// Price-adjust a USDX amount against the peg.
///
/// `peg_scale` is `10^price_decimals`. Above peg the redeemable amount
/// scales down by `peg / price`; at or below peg conversion is exactly 1:1.
/// Returns `(adjusted_amount, factor)` with the factor 1e18-scaled.
pub fn price_adjusted_redemption(
    usdx_amount: U256,
    price: U256,
    peg_scale: U256,
) -> (U256, U256) {
    if price > peg_scale {
        let adjusted = usdx_amount * peg_scale / price;
        let factor = U256::from(UNITY) * peg_scale / price;
        (adjusted, factor)
    } else {
        (usdx_amount, U256::from(UNITY))
    }
}

/// Rescale an integer amount between decimal precisions.
///
/// Scaling down truncates; it never rounds up.
pub fn rescale_amount(amount: U256, from_decimals: u8, to_decimals: u8) -> U256 {
    if from_decimals > to_decimals {
        let divisor = U256::from(10u64).pow(U256::from(from_decimals - to_decimals));
        amount / divisor
    } else if to_decimals > from_decimals {
        let multiplier = U256::from(10u64).pow(U256::from(to_decimals - from_decimals));
        amount * multiplier
    } else {
        amount
    }
}

/// Greedy source selection over capacities already in priority order.
///
/// Skips zero capacities, partially fills the last source, and stops once
/// the requirement is covered. Returns `(fills, total)` where each fill is
/// `(input index, amount)`.
pub fn select_withdrawal_sources(
    required: U256,
    capacities: &[U256],
) -> (Vec<(usize, U256)>, U256) {
    let mut fills = Vec::new();
    let mut total = U256::zero();
    let mut remaining = required;

    for (index, capacity) in capacities.iter().enumerate() {
        if remaining.is_zero() {
            break;
        }
        if capacity.is_zero() {
            continue;
        }
        let take = if *capacity > remaining { remaining } else { *capacity };
        fills.push((index, take));
        total = total + take;
        remaining = remaining - take;
    }

    (fills, total)
}

#[cfg(test)]
mod tests {
    use super::*;

    const E18: u128 = 1_000_000_000_000_000_000;

    fn u(v: u128) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_price_above_peg_scales_down() {
        // price $1.02, peg scale 1e18, 100 USDX
        let usdx = u(100 * E18);
        let price = u(1_020_000_000_000_000_000);
        let peg = u(E18);

        let (adjusted, factor) = price_adjusted_redemption(usdx, price, peg);

        assert!(adjusted < usdx);
        assert_eq!(adjusted, u(98_039_215_686_274_509_803));
        assert_eq!(factor, u(980_392_156_862_745_098));
    }

    #[test]
    fn test_price_at_or_below_peg_is_exact() {
        let usdx = u(100 * E18);
        let peg = u(E18);

        let (at_peg, factor_at) = price_adjusted_redemption(usdx, peg, peg);
        assert_eq!(at_peg, usdx);
        assert_eq!(factor_at, u(UNITY));

        let below = u(990_000_000_000_000_000); // $0.99
        let (below_peg, factor_below) = price_adjusted_redemption(usdx, below, peg);
        assert_eq!(below_peg, usdx);
        assert_eq!(factor_below, u(UNITY));
    }

    #[test]
    fn test_usdc_output_at_dollar_one_oh_two() {
        // price = 1.02e18 (18 decimals), usdx = 100e18 -> 98.039215e6 USDC
        let usdx = u(100 * E18);
        let price = u(1_020_000_000_000_000_000);
        let peg = u(E18);

        let (adjusted, factor) = price_adjusted_redemption(usdx, price, peg);
        let usdc = rescale_amount(adjusted, 18, 6);

        assert_eq!(usdc, u(98_039_215));
        assert_eq!(factor, u(980_392_156_862_745_098));
    }

    #[test]
    fn test_rescale_truncates_never_rounds_up() {
        // 1.9999999999995e18 down to 6 decimals truncates the tail
        let amount = u(1_999_999_999_999_500_000);
        assert_eq!(rescale_amount(amount, 18, 6), u(1_999_999));

        // scaling up is exact
        assert_eq!(rescale_amount(u(5), 6, 18), u(5_000_000_000_000));

        // same precision is identity
        assert_eq!(rescale_amount(u(42), 18, 18), u(42));
    }

    #[test]
    fn test_freshness_boundary() {
        let mut round = PriceData {
            round_id: 7,
            price: u(E18),
            price_decimals: 18,
            started_at: 1_000,
            updated_at: 1_000,
            answered_in_round: 7,
            status: OracleStatus::Ok,
        };

        // exactly at the heartbeat boundary is still fresh
        assert!(is_fresh(&round, 1_000 + ORACLE_HEARTBEAT_SECONDS));
        // one past the heartbeat is stale
        assert!(!is_fresh(&round, 1_000 + ORACLE_HEARTBEAT_SECONDS + 1));

        round.status = OracleStatus::Unavailable;
        assert!(!is_fresh(&round, 1_000));

        round.status = OracleStatus::Ok;
        round.price = U256::zero();
        assert!(!is_fresh(&round, 1_000));
    }

    #[test]
    fn test_select_sources_partial_fill() {
        // Silo vault with 40, Euler vault with 70, need 100 -> [40, 60]
        let capacities = [u(40_000_000), u(70_000_000)];
        let (fills, total) = select_withdrawal_sources(u(100_000_000), &capacities);

        assert_eq!(fills, vec![(0, u(40_000_000)), (1, u(60_000_000))]);
        assert_eq!(total, u(100_000_000));
    }

    #[test]
    fn test_select_sources_skips_zero_capacity() {
        let capacities = [U256::zero(), u(30), U256::zero(), u(50)];
        let (fills, total) = select_withdrawal_sources(u(60), &capacities);

        assert_eq!(fills, vec![(1, u(30)), (3, u(30))]);
        assert_eq!(total, u(60));
    }

    #[test]
    fn test_select_sources_stops_early() {
        let capacities = [u(100), u(100), u(100)];
        let (fills, total) = select_withdrawal_sources(u(100), &capacities);

        // first source covers everything; later ones are untouched
        assert_eq!(fills.len(), 1);
        assert_eq!(total, u(100));
    }

    #[test]
    fn test_select_sources_under_coverage() {
        let capacities = [u(10), u(20)];
        let (fills, total) = select_withdrawal_sources(u(100), &capacities);

        assert_eq!(fills.len(), 2);
        assert_eq!(total, u(30));
        assert!(total < u(100));
    }

    #[test]
    fn test_select_sources_with_preclamped_capacities() {
        // The plan builder previews each candidate against the full
        // requirement, so a large position arrives clamped to it; the fill
        // must behave the same as with the raw positions
        let required = u(100);
        let positions = [u(40), u(150), u(70)];
        let clamped: Vec<U256> = positions
            .iter()
            .map(|p| if *p > required { required } else { *p })
            .collect();

        let (fills, total) = select_withdrawal_sources(required, &clamped);
        assert_eq!(fills, vec![(0, u(40)), (1, u(60))]);
        assert_eq!(total, required);
    }

    #[test]
    fn test_select_sources_total_never_exceeds_capacity_sum() {
        let capacities = [u(7), u(13), u(29)];
        let sum: U256 = capacities.iter().fold(U256::zero(), |acc, c| acc + *c);

        for required in [u(1), u(20), u(49), u(1_000)] {
            let (_, total) = select_withdrawal_sources(required, &capacities);
            assert!(total <= sum);
            assert!(total <= required);
        }
    }
}

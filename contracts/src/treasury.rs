//! Treasury Contract
//!
//! Custody and orchestration hub of the protocol. The Treasury holds the
//! redemption asset, dispatches keyed service operations to the connectors,
//! and runs the two-phase redemption flow against the extension (policy),
//! the stablecoin (burn) and the escrow (payout custody).
//!
//! Every service operation is idempotency-keyed: the `(kind, key)` pair is
//! checked and marked before any state mutation or external call, so an
//! off-chain service can retry blindly. Per-kind amount limits and optional
//! recipient/spender whitelist contracts gate movement of funds; all checks
//! run before the first external call.
//!
//! Redemption is burn-first: the user's USDX is destroyed in the same
//! transaction that sources liquidity and funds the escrow, so a failure at
//! any step unwinds the burn along with everything else.

use odra::prelude::*;
use odra::casper_types::{U256, runtime_args};
use odra::CallDef;
use crate::access_control::{ROLE_ADMIN, ROLE_PAUSER, ROLE_SERVICE};
use crate::errors::ProtocolError;
use crate::events::{
    AssetTransferred, ConfigurationChanged, Paused, ProtocolDeposited, ProtocolWithdrawn,
    RedemptionCompleted, RedemptionInitiated, SpenderApproved, Unpaused,
};
use crate::types::{OperationKind, PendingRedemption, Protocol};

/// Treasury Contract
#[odra::module]
pub struct Treasury {
    /// Access control contract address
    access_control: Var<Address>,
    /// USDX stablecoin address
    stablecoin: Var<Option<Address>>,
    /// Redemption extension address (policy engine)
    extension: Var<Option<Address>>,
    /// Escrow address (redemption payout custody)
    escrow: Var<Option<Address>>,
    /// Connector addresses keyed by the venue's priority tier
    connectors: Mapping<u8, Address>,
    /// Asset paid out by redemptions
    redemption_asset: Var<Option<Address>>,
    /// Executed service operations, keyed `(kind code, key)`
    executed_operations: Mapping<(u8, String), bool>,
    /// Per-kind amount limits (0 = unlimited)
    operation_limits: Mapping<u8, U256>,
    /// Optional recipient whitelist contract
    recipient_whitelist: Var<Option<Address>>,
    /// Optional spender whitelist contract
    spender_whitelist: Var<Option<Address>>,
    /// Outstanding redemptions keyed `(user, asset)`
    pending_redemptions: Mapping<(Address, Address), PendingRedemption>,
    /// Cooldown between initiation and completion, in the unit of
    /// `get_block_time()` (treated as seconds by the protocol)
    cooldown_duration: Var<u64>,
    /// Pause flag
    paused: Var<bool>,
    /// Reentrancy lock for the redemption entry points
    locked: Var<bool>,
}

#[odra::module]
impl Treasury {
    /// Initialize the treasury
    pub fn init(&mut self, access_control: Address, cooldown_duration: u64) {
        self.access_control.set(access_control);
        self.stablecoin.set(None);
        self.extension.set(None);
        self.escrow.set(None);
        self.redemption_asset.set(None);
        self.recipient_whitelist.set(None);
        self.spender_whitelist.set(None);
        self.cooldown_duration.set(cooldown_duration);
        self.paused.set(false);
        self.locked.set(false);
    }

    // ========== Service Operations ==========

    /// Transfer assets out of the Treasury (service role, keyed).
    pub fn transfer_asset(&mut self, key: String, asset: Address, to: Address, amount: U256) {
        self.begin_operation(OperationKind::TransferAsset, &key, amount);
        self.require_recipient_whitelisted(to);

        self.token_transfer(asset, to, amount);

        self.env().emit_event(AssetTransferred {
            asset,
            to,
            amount,
            idempotency_key: key,
        });
    }

    /// Grant an allowance to an external spender (service role, keyed).
    pub fn approve_spender(&mut self, key: String, asset: Address, spender: Address, amount: U256) {
        self.begin_operation(OperationKind::ApproveSpender, &key, amount);
        self.require_spender_whitelisted(spender);

        self.token_approve(asset, spender, amount);

        self.env().emit_event(SpenderApproved {
            asset,
            spender,
            amount,
            idempotency_key: key,
        });
    }

    /// Deposit Treasury assets into an Aave vault (service role, keyed).
    pub fn deposit_to_aave(&mut self, key: String, asset: Address, vault: Address, amount: U256) -> U256 {
        self.deposit_to_protocol(Protocol::Aave, OperationKind::AaveDeposit, key, asset, vault, amount)
    }

    /// Withdraw Treasury assets from an Aave vault (service role, keyed).
    pub fn withdraw_from_aave(&mut self, key: String, asset: Address, vault: Address, amount: U256) -> U256 {
        self.withdraw_from_protocol(Protocol::Aave, OperationKind::AaveWithdraw, key, asset, vault, amount)
    }

    /// Deposit Treasury assets into a Silo vault (service role, keyed).
    pub fn deposit_to_silo(&mut self, key: String, asset: Address, vault: Address, amount: U256) -> U256 {
        self.deposit_to_protocol(Protocol::Silo, OperationKind::SiloDeposit, key, asset, vault, amount)
    }

    /// Withdraw Treasury assets from a Silo vault (service role, keyed).
    pub fn withdraw_from_silo(&mut self, key: String, asset: Address, vault: Address, amount: U256) -> U256 {
        self.withdraw_from_protocol(Protocol::Silo, OperationKind::SiloWithdraw, key, asset, vault, amount)
    }

    /// Deposit Treasury assets into an Euler vault (service role, keyed).
    pub fn deposit_to_euler(&mut self, key: String, asset: Address, vault: Address, amount: U256) -> U256 {
        self.deposit_to_protocol(Protocol::Euler, OperationKind::EulerDeposit, key, asset, vault, amount)
    }

    /// Withdraw Treasury assets from an Euler vault (service role, keyed).
    pub fn withdraw_from_euler(&mut self, key: String, asset: Address, vault: Address, amount: U256) -> U256 {
        self.withdraw_from_protocol(Protocol::Euler, OperationKind::EulerWithdraw, key, asset, vault, amount)
    }

    // ========== Redemption Flow ==========

    /// Burn the caller's USDX and move the price-adjusted asset amount into
    /// escrow, starting the cooldown. Returns `(usdx_burned, asset_owed)`.
    ///
    /// Re-initiating while a redemption is pending accumulates the owed
    /// amount and restarts the cooldown for the whole position.
    pub fn initiate_redemption(&mut self, usdx_amount: U256, min_asset_amount: U256) -> (U256, U256) {
        self.require_not_paused();
        self.acquire_lock();

        let user = self.env().caller();
        let asset = self.redemption_asset_address();
        let extension = self.extension_address();
        let now = self.env().get_block_time();

        // Redeemable flag and non-zero amount are enforced by the extension
        let (asset_amount, _factor) = self.extension_record_quote(extension, asset, usdx_amount);

        if asset_amount < min_asset_amount {
            self.env().revert(ProtocolError::SlippageExceeded);
        }

        // Per-block cap, accumulated inside the extension; excess reverts
        self.extension_update_block(extension, now, usdx_amount);

        let mut pending = self
            .pending_redemptions
            .get(&(user, asset))
            .unwrap_or_default();
        pending.amount = pending.amount + asset_amount;
        pending.cooldown_start = now;
        self.pending_redemptions.set(&(user, asset), pending);

        self.burn_usdx_from(user, usdx_amount);

        // Source any shortfall from the connectors before funding the escrow
        let balance = self.token_balance(asset, self.env().self_address());
        if balance < asset_amount {
            self.source_liquidity(extension, asset, asset_amount - balance);
        }

        let escrow = self.escrow_address();
        self.token_transfer(asset, escrow, asset_amount);

        self.env().emit_event(RedemptionInitiated {
            user,
            asset,
            usdx_burned: usdx_amount,
            asset_owed: asset_amount,
            cooldown_start: now,
        });

        self.release_lock();
        (usdx_amount, asset_amount)
    }

    /// Settle the caller's pending redemption after the cooldown, paying the
    /// escrowed assets to `beneficiary`. Returns the amount paid.
    pub fn complete_redemption(&mut self, beneficiary: Address) -> U256 {
        self.require_not_paused();
        self.acquire_lock();

        let user = self.env().caller();
        let asset = self.redemption_asset_address();

        let pending = self
            .pending_redemptions
            .get(&(user, asset))
            .unwrap_or_default();
        if pending.amount.is_zero() {
            self.env().revert(ProtocolError::NoPendingRedemption);
        }

        let now = self.env().get_block_time();
        let cooldown = self.cooldown_duration.get().unwrap_or(0);
        if !cooldown_elapsed(pending.cooldown_start, cooldown, now) {
            self.env().revert(ProtocolError::CooldownActive);
        }

        // Zero the record before the external payout call
        let amount = pending.amount;
        self.pending_redemptions
            .set(&(user, asset), PendingRedemption::default());

        let escrow = self.escrow_address();
        let args = runtime_args! {
            "beneficiary" => beneficiary,
            "asset" => asset,
            "amount" => amount
        };
        let call_def = CallDef::new("withdraw", true, args);
        self.env().call_contract::<()>(escrow, call_def);

        self.env().emit_event(RedemptionCompleted {
            user,
            beneficiary,
            asset,
            amount,
        });

        self.release_lock();
        amount
    }

    // ========== Emergency Operations ==========

    /// Admin transfer that works while paused. Still idempotency-keyed so a
    /// panicked operator cannot double-send.
    pub fn emergency_transfer_asset(&mut self, key: String, asset: Address, to: Address, amount: U256) {
        self.require_role(ROLE_ADMIN);

        if amount.is_zero() {
            self.env().revert(ProtocolError::ZeroAmount);
        }
        self.mark_executed(OperationKind::EmergencyTransfer, &key);

        self.token_transfer(asset, to, amount);

        self.env().emit_event(AssetTransferred {
            asset,
            to,
            amount,
            idempotency_key: key,
        });
    }

    /// Sweep stray tokens from the escrow back into the Treasury (admin only)
    pub fn recover_escrow(&mut self, asset: Address) {
        self.require_role(ROLE_ADMIN);

        let escrow = self.escrow_address();
        let args = runtime_args! {
            "asset" => asset
        };
        let call_def = CallDef::new("emergency_recover", true, args);
        self.env().call_contract::<()>(escrow, call_def);
    }

    /// Pause redemptions and service operations (pauser or admin)
    pub fn pause(&mut self) {
        self.require_pauser_or_admin();
        self.paused.set(true);
        self.env().emit_event(Paused {
            by: self.env().caller(),
        });
    }

    /// Resume redemptions and service operations (pauser or admin)
    pub fn unpause(&mut self) {
        self.require_pauser_or_admin();
        self.paused.set(false);
        self.env().emit_event(Unpaused {
            by: self.env().caller(),
        });
    }

    // ========== View Functions ==========

    /// Check whether a `(kind, key)` operation has already executed
    pub fn is_operation_executed(&self, kind: OperationKind, key: String) -> bool {
        self.executed_operations
            .get(&(kind.code(), key))
            .unwrap_or(false)
    }

    /// Get the amount limit for an operation kind (0 = unlimited)
    pub fn get_operation_limit(&self, kind: OperationKind) -> U256 {
        self.operation_limits
            .get(&kind.code())
            .unwrap_or(U256::zero())
    }

    /// Get a user's pending redemption for an asset
    pub fn get_pending_redemption(&self, user: Address, asset: Address) -> PendingRedemption {
        self.pending_redemptions
            .get(&(user, asset))
            .unwrap_or_default()
    }

    /// Get the cooldown duration in seconds
    pub fn get_cooldown_duration(&self) -> u64 {
        self.cooldown_duration.get().unwrap_or(0)
    }

    /// Check whether the protocol is paused
    pub fn is_paused(&self) -> bool {
        self.paused.get().unwrap_or(false)
    }

    /// Get the connector address for a venue
    pub fn get_connector(&self, protocol: Protocol) -> Option<Address> {
        self.connectors.get(&protocol.priority())
    }

    /// Get the redemption asset
    pub fn get_redemption_asset(&self) -> Option<Address> {
        self.redemption_asset.get().flatten()
    }

    /// Get the escrow address
    pub fn get_escrow(&self) -> Option<Address> {
        self.escrow.get().flatten()
    }

    /// Get the extension address
    pub fn get_extension(&self) -> Option<Address> {
        self.extension.get().flatten()
    }

    /// Get the stablecoin address
    pub fn get_stablecoin(&self) -> Option<Address> {
        self.stablecoin.get().flatten()
    }

    // ========== Admin Functions ==========

    /// Set the connector for a venue (admin only)
    pub fn set_connector(&mut self, protocol: Protocol, connector: Address) {
        self.require_role(ROLE_ADMIN);
        self.require_contract(connector);
        self.connectors.set(&protocol.priority(), connector);
        self.emit_config_changed("treasury.connector");
    }

    /// Set the stablecoin address (admin only)
    pub fn set_stablecoin(&mut self, stablecoin: Address) {
        self.require_role(ROLE_ADMIN);
        self.require_contract(stablecoin);
        self.stablecoin.set(Some(stablecoin));
        self.emit_config_changed("treasury.stablecoin");
    }

    /// Set the redemption extension address (admin only)
    pub fn set_extension(&mut self, extension: Address) {
        self.require_role(ROLE_ADMIN);
        self.require_contract(extension);
        self.extension.set(Some(extension));
        self.emit_config_changed("treasury.extension");
    }

    /// Set the escrow address (admin only)
    pub fn set_escrow(&mut self, escrow: Address) {
        self.require_role(ROLE_ADMIN);
        self.require_contract(escrow);
        self.escrow.set(Some(escrow));
        self.emit_config_changed("treasury.escrow");
    }

    /// Set the redemption asset (admin only)
    pub fn set_redemption_asset(&mut self, asset: Address) {
        self.require_role(ROLE_ADMIN);
        self.require_contract(asset);
        self.redemption_asset.set(Some(asset));
        self.emit_config_changed("treasury.redemption_asset");
    }

    /// Set the redemption cooldown duration (admin only)
    pub fn set_cooldown_duration(&mut self, seconds: u64) {
        self.require_role(ROLE_ADMIN);
        self.cooldown_duration.set(seconds);
        self.emit_config_changed("treasury.cooldown_duration");
    }

    /// Set the amount limit for an operation kind, 0 for unlimited (admin only)
    pub fn set_operation_limit(&mut self, kind: OperationKind, limit: U256) {
        self.require_role(ROLE_ADMIN);
        self.operation_limits.set(&kind.code(), limit);
        self.emit_config_changed("treasury.operation_limit");
    }

    /// Set the recipient whitelist contract (admin only)
    pub fn set_recipient_whitelist(&mut self, whitelist: Address) {
        self.require_role(ROLE_ADMIN);
        self.require_contract(whitelist);
        self.recipient_whitelist.set(Some(whitelist));
        self.emit_config_changed("treasury.recipient_whitelist");
    }

    /// Remove the recipient whitelist, disabling the check (admin only)
    pub fn clear_recipient_whitelist(&mut self) {
        self.require_role(ROLE_ADMIN);
        self.recipient_whitelist.set(None);
        self.emit_config_changed("treasury.recipient_whitelist");
    }

    /// Set the spender whitelist contract (admin only)
    pub fn set_spender_whitelist(&mut self, whitelist: Address) {
        self.require_role(ROLE_ADMIN);
        self.require_contract(whitelist);
        self.spender_whitelist.set(Some(whitelist));
        self.emit_config_changed("treasury.spender_whitelist");
    }

    /// Remove the spender whitelist, disabling the check (admin only)
    pub fn clear_spender_whitelist(&mut self) {
        self.require_role(ROLE_ADMIN);
        self.spender_whitelist.set(None);
        self.emit_config_changed("treasury.spender_whitelist");
    }

    // ========== Internal: Operation Plumbing ==========

    /// Shared prelude for keyed service operations. All checks run before
    /// any external call: role, pause flag, non-zero amount, idempotency,
    /// amount limit. Marks the key executed.
    fn begin_operation(&mut self, kind: OperationKind, key: &str, amount: U256) {
        self.require_role(ROLE_SERVICE);
        self.require_not_paused();

        if amount.is_zero() {
            self.env().revert(ProtocolError::ZeroAmount);
        }

        let limit = self
            .operation_limits
            .get(&kind.code())
            .unwrap_or(U256::zero());
        if !limit_allows(limit, amount) {
            self.env().revert(ProtocolError::OperationLimitExceeded);
        }

        self.mark_executed(kind, key);
    }

    /// Write-once idempotency flag for `(kind, key)`.
    fn mark_executed(&mut self, kind: OperationKind, key: &str) {
        let registry_key = (kind.code(), String::from(key));
        if self.executed_operations.get(&registry_key).unwrap_or(false) {
            self.env().revert(ProtocolError::OperationAlreadyExecuted);
        }
        self.executed_operations.set(&registry_key, true);
    }

    fn deposit_to_protocol(
        &mut self,
        protocol: Protocol,
        kind: OperationKind,
        key: String,
        asset: Address,
        vault: Address,
        amount: U256,
    ) -> U256 {
        self.begin_operation(kind, &key, amount);

        let connector = self.connector_address(protocol);

        // The connector pulls the funds; grant it exactly this amount
        self.token_approve(asset, connector, amount);

        let args = runtime_args! {
            "asset" => asset,
            "vault" => vault,
            "amount" => amount
        };
        let call_def = CallDef::new("deposit", true, args);
        let shares: U256 = self.env().call_contract(connector, call_def);

        self.env().emit_event(ProtocolDeposited {
            protocol,
            vault,
            amount,
            shares,
            idempotency_key: key,
        });

        shares
    }

    fn withdraw_from_protocol(
        &mut self,
        protocol: Protocol,
        kind: OperationKind,
        key: String,
        asset: Address,
        vault: Address,
        amount: U256,
    ) -> U256 {
        self.begin_operation(kind, &key, amount);

        let connector = self.connector_address(protocol);

        let args = runtime_args! {
            "asset" => asset,
            "vault" => vault,
            "amount" => amount
        };
        let call_def = CallDef::new("withdraw", true, args);
        let withdrawn: U256 = self.env().call_contract(connector, call_def);

        self.env().emit_event(ProtocolWithdrawn {
            protocol,
            vault,
            amount,
            withdrawn,
            idempotency_key: key,
        });

        withdrawn
    }

    /// Pull `shortfall` of `asset` from the connectors per the extension's
    /// plan. Under-coverage is fatal, never a partial redemption.
    fn source_liquidity(&mut self, extension: Address, asset: Address, shortfall: U256) {
        let args = runtime_args! {
            "required" => shortfall
        };
        let call_def = CallDef::new("calculate_withdrawal_plan", false, args);
        let plan: crate::types::WithdrawalPlan = self.env().call_contract(extension, call_def);

        if plan.total_available < shortfall {
            self.env().revert(ProtocolError::InsufficientLiquidity);
        }

        for entry in plan.entries {
            let args = runtime_args! {
                "asset" => asset,
                "vault" => entry.vault,
                "amount" => entry.amount
            };
            let call_def = CallDef::new("withdraw", true, args);
            self.env().call_contract::<U256>(entry.connector, call_def);
        }
    }

    // ========== Internal: Collaborator Calls ==========

    fn extension_record_quote(&self, extension: Address, asset: Address, usdx_amount: U256) -> (U256, U256) {
        let args = runtime_args! {
            "asset" => asset,
            "usdx_amount" => usdx_amount
        };
        let call_def = CallDef::new("record_redemption_quote", true, args);
        self.env().call_contract(extension, call_def)
    }

    fn extension_update_block(&self, extension: Address, block_number: u64, amount: U256) {
        let args = runtime_args! {
            "block_number" => block_number,
            "amount" => amount
        };
        let call_def = CallDef::new("update_block_redemptions", true, args);
        self.env().call_contract::<()>(extension, call_def)
    }

    fn burn_usdx_from(&self, from: Address, amount: U256) {
        let stablecoin = self.stablecoin_address();
        let args = runtime_args! {
            "from" => from,
            "amount" => amount
        };
        let call_def = CallDef::new("burn_from", true, args);
        self.env().call_contract::<()>(stablecoin, call_def)
    }

    fn token_transfer(&self, asset: Address, recipient: Address, amount: U256) {
        let args = runtime_args! {
            "recipient" => recipient,
            "amount" => amount
        };
        let call_def = CallDef::new("transfer", true, args);
        let success: bool = self.env().call_contract(asset, call_def);
        if !success {
            self.env().revert(ProtocolError::TokenTransferFailed);
        }
    }

    fn token_approve(&self, asset: Address, spender: Address, amount: U256) {
        let args = runtime_args! {
            "spender" => spender,
            "amount" => amount
        };
        let call_def = CallDef::new("approve", true, args);
        let success: bool = self.env().call_contract(asset, call_def);
        if !success {
            self.env().revert(ProtocolError::TokenApprovalFailed);
        }
    }

    fn token_balance(&self, asset: Address, account: Address) -> U256 {
        let args = runtime_args! {
            "account" => account
        };
        let call_def = CallDef::new("balance_of", false, args);
        self.env().call_contract(asset, call_def)
    }

    // ========== Internal: Guards ==========

    fn require_not_paused(&self) {
        if self.paused.get().unwrap_or(false) {
            self.env().revert(ProtocolError::ProtocolPaused);
        }
    }

    fn acquire_lock(&mut self) {
        if self.locked.get().unwrap_or(false) {
            self.env().revert(ProtocolError::ReentrantCall);
        }
        self.locked.set(true);
    }

    fn release_lock(&mut self) {
        self.locked.set(false);
    }

    fn require_recipient_whitelisted(&self, recipient: Address) {
        if let Some(whitelist) = self.recipient_whitelist.get().flatten() {
            if !self.is_whitelisted(whitelist, recipient) {
                self.env().revert(ProtocolError::RecipientNotWhitelisted);
            }
        }
    }

    fn require_spender_whitelisted(&self, spender: Address) {
        if let Some(whitelist) = self.spender_whitelist.get().flatten() {
            if !self.is_whitelisted(whitelist, spender) {
                self.env().revert(ProtocolError::SpenderNotWhitelisted);
            }
        }
    }

    fn is_whitelisted(&self, whitelist: Address, account: Address) -> bool {
        let args = runtime_args! {
            "account" => account
        };
        let call_def = CallDef::new("is_whitelisted", false, args);
        self.env().call_contract(whitelist, call_def)
    }

    fn require_contract(&self, address: Address) {
        if !address.is_contract() {
            self.env().revert(ProtocolError::NotAContract);
        }
    }

    fn emit_config_changed(&self, parameter: &str) {
        self.env().emit_event(ConfigurationChanged {
            parameter: String::from(parameter),
        });
    }

    fn connector_address(&self, protocol: Protocol) -> Address {
        match self.connectors.get(&protocol.priority()) {
            Some(addr) => addr,
            None => self.env().revert(ProtocolError::InvalidConfig),
        }
    }

    fn redemption_asset_address(&self) -> Address {
        match self.redemption_asset.get().flatten() {
            Some(addr) => addr,
            None => self.env().revert(ProtocolError::InvalidConfig),
        }
    }

    fn extension_address(&self) -> Address {
        match self.extension.get().flatten() {
            Some(addr) => addr,
            None => self.env().revert(ProtocolError::InvalidConfig),
        }
    }

    fn escrow_address(&self) -> Address {
        match self.escrow.get().flatten() {
            Some(addr) => addr,
            None => self.env().revert(ProtocolError::InvalidConfig),
        }
    }

    fn stablecoin_address(&self) -> Address {
        match self.stablecoin.get().flatten() {
            Some(addr) => addr,
            None => self.env().revert(ProtocolError::InvalidConfig),
        }
    }

    fn require_role(&self, role_id: u8) {
        let caller = self.env().caller();
        if !self.caller_has_role(role_id, caller) {
            self.env().revert(ProtocolError::Unauthorized);
        }
    }

    fn require_pauser_or_admin(&self) {
        let caller = self.env().caller();
        if !self.caller_has_role(ROLE_PAUSER, caller) && !self.caller_has_role(ROLE_ADMIN, caller) {
            self.env().revert(ProtocolError::Unauthorized);
        }
    }

    fn caller_has_role(&self, role_id: u8, account: Address) -> bool {
        let acl = match self.access_control.get() {
            Some(addr) => addr,
            None => self.env().revert(ProtocolError::InvalidConfig),
        };

        let args = runtime_args! {
            "role_id" => role_id,
            "account" => account
        };
        let call_def = CallDef::new("has_role", false, args);
        self.env().call_contract(acl, call_def)
    }
}

// ========== Pure Policy Helpers ==========

/// Whether an amount passes a per-kind limit. Zero means unlimited.
pub fn limit_allows(limit: U256, amount: U256) -> bool {
    limit.is_zero() || amount <= limit
}

/// Whether a redemption cooldown has fully elapsed.
pub fn cooldown_elapsed(cooldown_start: u64, cooldown_duration: u64, now: u64) -> bool {
    now >= cooldown_start.saturating_add(cooldown_duration)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_limit_is_unlimited() {
        assert!(limit_allows(U256::zero(), U256::from(u128::MAX)));
    }

    #[test]
    fn test_limit_is_inclusive() {
        let limit = U256::from(1_000u64);
        assert!(limit_allows(limit, U256::from(999u64)));
        assert!(limit_allows(limit, U256::from(1_000u64)));
        assert!(!limit_allows(limit, U256::from(1_001u64)));
    }

    #[test]
    fn test_cooldown_boundary() {
        // 7-day cooldown started at t=1000
        let start = 1_000;
        let duration = 604_800;

        assert!(!cooldown_elapsed(start, duration, start));
        assert!(!cooldown_elapsed(start, duration, start + duration - 1));
        assert!(cooldown_elapsed(start, duration, start + duration));
        assert!(cooldown_elapsed(start, duration, start + duration + 1));
    }

    #[test]
    fn test_cooldown_restart_pushes_completion_out() {
        let duration = 604_800;
        let first_start = 1_000;
        let restart = 300_000;

        // after a restart the old completion time is no longer sufficient
        assert!(!cooldown_elapsed(restart, duration, first_start + duration));
        assert!(cooldown_elapsed(restart, duration, restart + duration));
    }

    #[test]
    fn test_zero_cooldown_completes_immediately() {
        assert!(cooldown_elapsed(5_000, 0, 5_000));
    }
}

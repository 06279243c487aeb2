//! Aave Connector Contract
//!
//! Isolates the Aave-style lending pool behind the uniform connector shape
//! consumed by the Treasury: deposit, withdraw, previews, and a balance view
//! scoped to the connector's own position. The connector owns allowance
//! management toward the pool and holds the interest-bearing position on the
//! Treasury's behalf; proceeds of every withdrawal go straight back to the
//! Treasury.

use odra::prelude::*;
use odra::casper_types::{U256, RuntimeArgs, runtime_args};
use odra::CallDef;
use crate::access_control::ROLE_ADMIN;
use crate::errors::ProtocolError;
use crate::events::{ConnectorDeposit, ConnectorWithdrawal};

/// Aave Connector Contract
#[odra::module]
pub struct AaveConnector {
    /// Access control contract address
    access_control: Var<Address>,
    /// Treasury contract address (sole caller of fund movement)
    treasury: Var<Address>,
}

#[odra::module]
impl AaveConnector {
    /// Initialize the connector
    pub fn init(&mut self, access_control: Address, treasury: Address) {
        self.access_control.set(access_control);
        self.treasury.set(treasury);
    }

    // ========== Fund Movement (Treasury Only) ==========

    /// Deposit `amount` of `asset` into `vault`, returning shares received.
    pub fn deposit(&mut self, asset: Address, vault: Address, amount: U256) -> U256 {
        self.require_treasury();
        self.require_inputs(asset, vault, amount);
        self.require_vault_asset(asset, vault);

        let treasury = self.treasury_address();
        let this = self.env().self_address();

        // Pull funds from the Treasury, then let the vault pull from us
        self.token_transfer_from(asset, treasury, this, amount);
        self.token_approve(asset, vault, amount);

        let args = runtime_args! {
            "amount" => amount,
            "receiver" => this
        };
        let call_def = CallDef::new("deposit", true, args);
        let shares: U256 = self.env().call_contract(vault, call_def);

        // A zero-share deposit did not revert downstream but is still a failure
        if shares.is_zero() {
            self.env().revert(ProtocolError::DepositFailed);
        }

        self.env().emit_event(ConnectorDeposit {
            asset,
            vault,
            amount,
            shares,
        });

        shares
    }

    /// Withdraw `amount` of `asset` from `vault` to the Treasury.
    pub fn withdraw(&mut self, asset: Address, vault: Address, amount: U256) -> U256 {
        self.require_treasury();
        self.require_inputs(asset, vault, amount);
        self.require_vault_asset(asset, vault);

        let treasury = self.treasury_address();
        let this = self.env().self_address();

        // Informational only: carried in the event, not enforced against the result
        let shares_previewed = self.vault_preview_withdraw_shares(vault, amount);

        let args = runtime_args! {
            "amount" => amount,
            "receiver" => treasury,
            "owner" => this
        };
        let call_def = CallDef::new("withdraw", true, args);
        let shares: U256 = self.env().call_contract(vault, call_def);

        if shares.is_zero() {
            self.env().revert(ProtocolError::WithdrawFailed);
        }

        self.env().emit_event(ConnectorWithdrawal {
            asset,
            vault,
            amount,
            shares_previewed,
            withdrawn: amount,
        });

        amount
    }

    // ========== View Functions ==========

    /// Preview the shares a deposit of `amount` would mint
    pub fn preview_deposit(&self, vault: Address, amount: U256) -> U256 {
        let args = runtime_args! {
            "amount" => amount
        };
        let call_def = CallDef::new("preview_deposit", false, args);
        self.env().call_contract(vault, call_def)
    }

    /// Preview the amount obtainable from a withdrawal of up to `amount`,
    /// capped at the connector's own position.
    pub fn preview_withdraw(&self, vault: Address, amount: U256) -> U256 {
        let position = self.get_vault_balance(vault);
        if position < amount {
            position
        } else {
            amount
        }
    }

    /// Get the connector's position in `vault`, in asset units
    pub fn get_vault_balance(&self, vault: Address) -> U256 {
        let this = self.env().self_address();

        let args = runtime_args! {
            "account" => this
        };
        let call_def = CallDef::new("balance_of", false, args);
        let shares: U256 = self.env().call_contract(vault, call_def);

        if shares.is_zero() {
            return U256::zero();
        }

        let args = runtime_args! {
            "shares" => shares
        };
        let call_def = CallDef::new("convert_to_assets", false, args);
        self.env().call_contract(vault, call_def)
    }

    /// Get the treasury address
    pub fn get_treasury(&self) -> Option<Address> {
        self.treasury.get()
    }

    // ========== Admin Functions ==========

    /// Replace the treasury address (admin only)
    pub fn set_treasury(&mut self, treasury: Address) {
        self.require_admin();
        if !treasury.is_contract() {
            self.env().revert(ProtocolError::NotAContract);
        }
        self.treasury.set(treasury);
    }

    // ========== Internal Functions ==========

    fn treasury_address(&self) -> Address {
        match self.treasury.get() {
            Some(addr) => addr,
            None => self.env().revert(ProtocolError::InvalidConfig),
        }
    }

    fn require_treasury(&self) {
        if self.env().caller() != self.treasury_address() {
            self.env().revert(ProtocolError::Unauthorized);
        }
    }

    fn require_inputs(&self, asset: Address, vault: Address, amount: U256) {
        if amount.is_zero() {
            self.env().revert(ProtocolError::ZeroAmount);
        }
        if !asset.is_contract() || !vault.is_contract() {
            self.env().revert(ProtocolError::NotAContract);
        }
    }

    fn require_vault_asset(&self, asset: Address, vault: Address) {
        let call_def = CallDef::new("asset", false, RuntimeArgs::new());
        let underlying: Address = self.env().call_contract(vault, call_def);
        if underlying != asset {
            self.env().revert(ProtocolError::VaultAssetMismatch);
        }
    }

    fn vault_preview_withdraw_shares(&self, vault: Address, amount: U256) -> U256 {
        let args = runtime_args! {
            "amount" => amount
        };
        let call_def = CallDef::new("preview_withdraw", false, args);
        self.env().call_contract(vault, call_def)
    }

    fn token_transfer_from(&self, asset: Address, owner: Address, recipient: Address, amount: U256) {
        let args = runtime_args! {
            "owner" => owner,
            "recipient" => recipient,
            "amount" => amount
        };
        let call_def = CallDef::new("transfer_from", true, args);
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

//! Escrow Contract
//!
//! Holds redemption-asset funds between `initiate_redemption` and
//! `complete_redemption`. The Treasury is the single privileged withdrawer;
//! no allocation accounting happens here. The contract balance is implicitly
//! the sum of all currently-pending redemptions plus any stray transfers,
//! which `emergency_recover` sweeps back to the Treasury.

use odra::prelude::*;
use odra::casper_types::{U256, runtime_args};
use odra::CallDef;
use crate::errors::ProtocolError;
use crate::events::{EscrowRecovered, EscrowWithdrawal};

/// Escrow Contract
#[odra::module]
pub struct Escrow {
    /// Treasury contract address (sole privileged caller)
    treasury: Var<Address>,
}

#[odra::module]
impl Escrow {
    /// Initialize the escrow
    pub fn init(&mut self, treasury: Address) {
        self.treasury.set(treasury);
    }

    // ========== Treasury Functions ==========

    /// Pay out escrowed assets to a beneficiary (Treasury only)
    pub fn withdraw(&mut self, beneficiary: Address, asset: Address, amount: U256) {
        self.require_treasury();

        if amount.is_zero() {
            self.env().revert(ProtocolError::ZeroAmount);
        }
        if !asset.is_contract() {
            self.env().revert(ProtocolError::NotAContract);
        }

        let balance = self.token_balance(asset);
        if balance < amount {
            self.env().revert(ProtocolError::EscrowInsufficientBalance);
        }

        self.token_transfer(asset, beneficiary, amount);

        self.env().emit_event(EscrowWithdrawal {
            beneficiary,
            asset,
            amount,
        });
    }

    /// Sweep the full balance of an asset back to the Treasury (Treasury only).
    ///
    /// Covers tokens accidentally sent straight to the escrow address.
    pub fn emergency_recover(&mut self, asset: Address) {
        self.require_treasury();

        if !asset.is_contract() {
            self.env().revert(ProtocolError::NotAContract);
        }

        let treasury = self.treasury.get().unwrap_or_else(|| {
            self.env().revert(ProtocolError::InvalidConfig)
        });

        let balance = self.token_balance(asset);
        if balance.is_zero() {
            return;
        }

        self.token_transfer(asset, treasury, balance);

        self.env().emit_event(EscrowRecovered {
            asset,
            amount: balance,
        });
    }

    // ========== View Functions ==========

    /// Get the escrow's balance of an asset
    pub fn get_balance(&self, asset: Address) -> U256 {
        self.token_balance(asset)
    }

    /// Get the treasury address
    pub fn get_treasury(&self) -> Option<Address> {
        self.treasury.get()
    }

    // ========== Internal Functions ==========

    fn require_treasury(&self) {
        let caller = self.env().caller();
        let treasury = self.treasury.get().unwrap_or_else(|| {
            self.env().revert(ProtocolError::InvalidConfig)
        });
        if caller != treasury {
            self.env().revert(ProtocolError::Unauthorized);
        }
    }

    fn token_balance(&self, asset: Address) -> U256 {
        let args = runtime_args! {
            "account" => self.env().self_address()
        };
        let call_def = CallDef::new("balance_of", false, args);
        self.env().call_contract(asset, call_def)
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
}

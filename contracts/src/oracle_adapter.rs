//! Oracle Adapter Contracts
//!
//! Normalize a price source into the round shape consumed by the redemption
//! policy: `(round_id, price, started_at, updated_at, answered_in_round)`.
//!
//! Two adapters:
//! - `PriceFeedAdapter`: rounds submitted by an oracle-role feeder, one
//!   series per asset. Reads never revert; a missing series reports
//!   `OracleStatus::Unavailable` so the policy layer can select its
//!   fallback branch without a failed cross-contract call.
//! - `VaultSharePriceOracle`: derives a price as "assets per one vault
//!   share". Every read reports the current block time as both `started_at`
//!   and `updated_at`, so a heartbeat check against it never trips.

use odra::prelude::*;
use odra::casper_types::{U256, runtime_args};
use odra::CallDef;
use crate::access_control::{ROLE_ADMIN, ROLE_ORACLE};
use crate::errors::ProtocolError;
use crate::events::PriceSubmitted;
use crate::types::{OracleStatus, PriceData};

/// Default price decimals when an asset has not been configured
const DEFAULT_PRICE_DECIMALS: u8 = 18;

/// Upper bound on configurable decimals
const MAX_PRICE_DECIMALS: u8 = 30;

/// Price Feed Adapter Contract
#[odra::module]
pub struct PriceFeedAdapter {
    /// Access control contract address
    access_control: Var<Address>,
    /// Latest round per asset
    rounds: Mapping<Address, PriceData>,
    /// Price decimals per asset
    decimals: Mapping<Address, u8>,
}

#[odra::module]
impl PriceFeedAdapter {
    /// Initialize the adapter
    pub fn init(&mut self, access_control: Address) {
        self.access_control.set(access_control);
    }

    // ========== Price Query Functions ==========

    /// Get the latest round for an asset.
    ///
    /// Never reverts: an asset with no submitted rounds reports a zeroed
    /// round with `OracleStatus::Unavailable`.
    pub fn get_latest_round_data(&self, asset: Address) -> PriceData {
        match self.rounds.get(&asset) {
            Some(round) => round,
            None => PriceData {
                round_id: 0,
                price: U256::zero(),
                price_decimals: self.price_decimals(asset),
                started_at: 0,
                updated_at: 0,
                answered_in_round: 0,
                status: OracleStatus::Unavailable,
            },
        }
    }

    /// Get the price decimals configured for an asset
    pub fn price_decimals(&self, asset: Address) -> u8 {
        self.decimals.get(&asset).unwrap_or(DEFAULT_PRICE_DECIMALS)
    }

    // ========== Feeder Functions ==========

    /// Submit a new price round for an asset (oracle role)
    pub fn submit_price(&mut self, asset: Address, price: U256) {
        self.require_role(ROLE_ORACLE);

        if price.is_zero() {
            self.env().revert(ProtocolError::InvalidConfig);
        }

        let previous = self.rounds.get(&asset);
        let round_id = previous.map(|r| r.round_id + 1).unwrap_or(1);
        let now = self.env().get_block_time();

        self.rounds.set(&asset, PriceData {
            round_id,
            price,
            price_decimals: self.price_decimals(asset),
            started_at: now,
            updated_at: now,
            answered_in_round: round_id,
            status: OracleStatus::Ok,
        });

        self.env().emit_event(PriceSubmitted {
            asset,
            round_id,
            price,
            updated_at: now,
        });
    }

    /// Mark the latest round for an asset as invalid (oracle role).
    ///
    /// Used by the feeder when the upstream source reports garbage; consumers
    /// treat it the same as an unavailable price.
    pub fn invalidate_price(&mut self, asset: Address) {
        self.require_role(ROLE_ORACLE);

        if let Some(mut round) = self.rounds.get(&asset) {
            round.status = OracleStatus::InvalidPrice;
            self.rounds.set(&asset, round);
        }
    }

    // ========== Admin Functions ==========

    /// Configure price decimals for an asset (admin only)
    pub fn set_price_decimals(&mut self, asset: Address, decimals: u8) {
        self.require_role(ROLE_ADMIN);
        if decimals > MAX_PRICE_DECIMALS {
            self.env().revert(ProtocolError::OracleInvalidDecimals);
        }
        self.decimals.set(&asset, decimals);
    }

    /// Get access control address
    pub fn get_access_control(&self) -> Option<Address> {
        self.access_control.get()
    }

    // ========== Internal Functions ==========

    fn require_role(&self, role_id: u8) {
        let caller = self.env().caller();
        let acl = match self.access_control.get() {
            Some(addr) => addr,
            None => self.env().revert(ProtocolError::InvalidConfig),
        };

        let args = runtime_args! {
            "role_id" => role_id,
            "account" => caller
        };
        let call_def = CallDef::new("has_role", false, args);
        let allowed: bool = self.env().call_contract(acl, call_def);

        if !allowed {
            self.env().revert(ProtocolError::Unauthorized);
        }
    }
}

/// Vault Share Price Oracle Contract
///
/// Prices a vault share token from on-chain vault state instead of an
/// external feed.
#[odra::module]
pub struct VaultSharePriceOracle {
    /// Access control contract address
    access_control: Var<Address>,
    /// Vault whose share price is reported
    vault: Var<Option<Address>>,
    /// Decimals of one vault share (exponent of the probe amount)
    share_decimals: Var<u8>,
    /// Decimals the reported price is scaled to
    price_decimals: Var<u8>,
}

#[odra::module]
impl VaultSharePriceOracle {
    /// Initialize the adapter
    pub fn init(&mut self, access_control: Address) {
        self.access_control.set(access_control);
        self.vault.set(None);
        self.share_decimals.set(18);
        self.price_decimals.set(DEFAULT_PRICE_DECIMALS);
    }

    // ========== Price Query Functions ==========

    /// Get the derived share price round.
    ///
    /// The price is the asset amount obtainable for exactly one share. Both
    /// timestamps are the current block time: this adapter has no real
    /// staleness, which matters for callers applying a heartbeat check.
    pub fn get_latest_round_data(&self, asset: Address) -> PriceData {
        let vault = match self.vault.get().flatten() {
            Some(v) => v,
            None => self.env().revert(ProtocolError::OracleNotConfigured),
        };
        if asset != vault {
            self.env().revert(ProtocolError::OracleNotConfigured);
        }

        let share_decimals = self.share_decimals.get().unwrap_or(18);
        let one_share = U256::from(10u64).pow(U256::from(share_decimals));

        let args = runtime_args! {
            "shares" => one_share
        };
        let call_def = CallDef::new("convert_to_assets", false, args);
        let price: U256 = self.env().call_contract(vault, call_def);

        let now = self.env().get_block_time();
        PriceData {
            round_id: 1,
            price,
            price_decimals: self.price_decimals.get().unwrap_or(DEFAULT_PRICE_DECIMALS),
            started_at: now,
            updated_at: now,
            answered_in_round: 1,
            status: OracleStatus::Ok,
        }
    }

    /// Get the price decimals the adapter reports
    pub fn price_decimals(&self, _asset: Address) -> u8 {
        self.price_decimals.get().unwrap_or(DEFAULT_PRICE_DECIMALS)
    }

    // ========== Admin Functions ==========

    /// Configure the priced vault (admin only)
    pub fn set_vault(&mut self, vault: Address, share_decimals: u8, price_decimals: u8) {
        self.require_admin();
        if !vault.is_contract() {
            self.env().revert(ProtocolError::NotAContract);
        }
        if share_decimals > MAX_PRICE_DECIMALS || price_decimals > MAX_PRICE_DECIMALS {
            self.env().revert(ProtocolError::OracleInvalidDecimals);
        }
        self.vault.set(Some(vault));
        self.share_decimals.set(share_decimals);
        self.price_decimals.set(price_decimals);
    }

    /// Get the configured vault
    pub fn get_vault(&self) -> Option<Address> {
        self.vault.get().flatten()
    }

    // ========== Internal Functions ==========

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decimal_bounds() {
        assert_eq!(DEFAULT_PRICE_DECIMALS, 18);
        assert!(DEFAULT_PRICE_DECIMALS <= MAX_PRICE_DECIMALS);
    }

    #[test]
    fn test_one_share_probe_amount() {
        // 18-decimal share probe is 1e18
        let one_share = U256::from(10u64).pow(U256::from(18u8));
        assert_eq!(one_share, U256::from(1_000_000_000_000_000_000u128));
    }

    #[test]
    fn test_unavailable_round_shape() {
        // An unavailable round must report zeroed round ids so consumers
        // cannot mistake it for answered data
        let round = PriceData {
            round_id: 0,
            price: U256::zero(),
            price_decimals: DEFAULT_PRICE_DECIMALS,
            started_at: 0,
            updated_at: 0,
            answered_in_round: 0,
            status: OracleStatus::Unavailable,
        };
        assert_eq!(round.round_id, 0);
        assert!(round.price.is_zero());
    }
}

//! Reward Distributor Contract
//!
//! Turns vault yield into USDX supply. The distributor walks the extension's
//! allocation arena, totals the connectors' positions for the treasury asset,
//! and treats everything above the recorded high-water mark as distributable
//! yield. That yield is converted to 18-decimal USDX using the same oracle
//! discipline as redemptions (24h heartbeat, 1:1 fallback) and minted to the
//! stablecoin contract itself, where staking derivatives can pick it up.
//!
//! The high-water mark only moves forward. A drop in total assets (slashing,
//! withdrawal between distributions) produces zero yield rather than a
//! negative adjustment.

use odra::prelude::*;
use odra::casper_types::{U256, RuntimeArgs, runtime_args};
use odra::CallDef;
use crate::access_control::{ROLE_ADMIN, ROLE_SERVICE};
use crate::errors::ProtocolError;
use crate::events::{ConfigurationChanged, YieldDistributed};
use crate::redemption_extension::{is_fresh, rescale_amount, USDX_DECIMALS};
use crate::types::{PriceData, VaultAllocation};

/// Reward Distributor Contract
#[odra::module]
pub struct RewardDistributor {
    /// Access control contract address
    access_control: Var<Address>,
    /// Redemption extension address (allocation arena source)
    extension: Var<Option<Address>>,
    /// USDX stablecoin address (mint target and recipient)
    stablecoin: Var<Option<Address>>,
    /// Price feed adapter address
    oracle: Var<Option<Address>>,
    /// Treasury asset whose yield is tracked
    asset: Var<Option<Address>>,
    /// Decimals of the treasury asset
    asset_decimals: Var<u8>,
    /// Highest total-assets value seen at a distribution
    high_water_mark: Var<U256>,
}

#[odra::module]
impl RewardDistributor {
    /// Initialize the distributor
    pub fn init(&mut self, access_control: Address) {
        self.access_control.set(access_control);
        self.extension.set(None);
        self.stablecoin.set(None);
        self.oracle.set(None);
        self.asset.set(None);
        self.asset_decimals.set(USDX_DECIMALS);
        self.high_water_mark.set(U256::zero());
    }

    // ========== Distribution (Service Role) ==========

    /// Distribute accrued yield as newly minted USDX.
    ///
    /// Returns the USDX amount minted; zero when total assets sit at or
    /// below the high-water mark.
    pub fn distribute_yield(&mut self) -> U256 {
        self.require_role(ROLE_SERVICE);

        let asset = match self.asset.get().flatten() {
            Some(addr) => addr,
            None => self.env().revert(ProtocolError::InvalidConfig),
        };
        let stablecoin = match self.stablecoin.get().flatten() {
            Some(addr) => addr,
            None => self.env().revert(ProtocolError::InvalidConfig),
        };

        let total_assets = self.total_allocated_assets();
        let mark = self.high_water_mark.get().unwrap_or(U256::zero());

        if total_assets <= mark {
            return U256::zero();
        }
        let yield_assets = total_assets - mark;

        let usdx_amount = self.yield_to_usdx(asset, yield_assets);

        self.high_water_mark.set(total_assets);

        if !usdx_amount.is_zero() {
            let args = runtime_args! {
                "to" => stablecoin,
                "amount" => usdx_amount
            };
            let call_def = CallDef::new("mint", true, args);
            self.env().call_contract::<()>(stablecoin, call_def);
        }

        self.env().emit_event(YieldDistributed {
            total_assets,
            yield_assets,
            usdx_minted: usdx_amount,
        });

        usdx_amount
    }

    // ========== View Functions ==========

    /// Sum the connectors' positions over all active allocation entries
    pub fn total_allocated_assets(&self) -> U256 {
        let extension = match self.extension.get().flatten() {
            Some(addr) => addr,
            None => self.env().revert(ProtocolError::InvalidConfig),
        };

        let count: u32 = {
            let call_def = CallDef::new("get_allocation_count", false, RuntimeArgs::new());
            self.env().call_contract(extension, call_def)
        };

        let mut total = U256::zero();
        for id in 0..count {
            let args = runtime_args! {
                "allocation_id" => id
            };
            let call_def = CallDef::new("get_vault_allocation", false, args);
            let alloc: Option<VaultAllocation> = self.env().call_contract(extension, call_def);

            let alloc = match alloc {
                Some(a) if a.active => a,
                _ => continue,
            };

            let args = runtime_args! {
                "vault" => alloc.vault
            };
            let call_def = CallDef::new("get_vault_balance", false, args);
            let balance: U256 = self.env().call_contract(alloc.connector, call_def);
            total = total + balance;
        }

        total
    }

    /// Get the recorded high-water mark
    pub fn get_high_water_mark(&self) -> U256 {
        self.high_water_mark.get().unwrap_or(U256::zero())
    }

    /// Get the tracked treasury asset
    pub fn get_asset(&self) -> Option<Address> {
        self.asset.get().flatten()
    }

    // ========== Admin Functions ==========

    /// Set the redemption extension address (admin only)
    pub fn set_extension(&mut self, extension: Address) {
        self.require_role(ROLE_ADMIN);
        if !extension.is_contract() {
            self.env().revert(ProtocolError::NotAContract);
        }
        self.extension.set(Some(extension));
        self.env().emit_event(ConfigurationChanged {
            parameter: String::from("distributor.extension"),
        });
    }

    /// Set the stablecoin address (admin only)
    pub fn set_stablecoin(&mut self, stablecoin: Address) {
        self.require_role(ROLE_ADMIN);
        if !stablecoin.is_contract() {
            self.env().revert(ProtocolError::NotAContract);
        }
        self.stablecoin.set(Some(stablecoin));
        self.env().emit_event(ConfigurationChanged {
            parameter: String::from("distributor.stablecoin"),
        });
    }

    /// Set the price feed adapter address (admin only)
    pub fn set_oracle(&mut self, oracle: Address) {
        self.require_role(ROLE_ADMIN);
        if !oracle.is_contract() {
            self.env().revert(ProtocolError::NotAContract);
        }
        self.oracle.set(Some(oracle));
        self.env().emit_event(ConfigurationChanged {
            parameter: String::from("distributor.oracle"),
        });
    }

    /// Set the tracked treasury asset and its decimals (admin only).
    ///
    /// Resets the high-water mark; the next distribution re-baselines
    /// against the current total instead of minting against the old asset's
    /// mark.
    pub fn set_asset(&mut self, asset: Address, decimals: u8) {
        self.require_role(ROLE_ADMIN);
        if !asset.is_contract() {
            self.env().revert(ProtocolError::NotAContract);
        }
        self.asset.set(Some(asset));
        self.asset_decimals.set(decimals);
        self.high_water_mark.set(U256::zero());
        self.env().emit_event(ConfigurationChanged {
            parameter: String::from("distributor.asset"),
        });
    }

    /// Re-baseline the high-water mark to the current total (admin only).
    ///
    /// Used at bootstrap so pre-existing deposits are not distributed as
    /// yield.
    pub fn rebase_high_water_mark(&mut self) {
        self.require_role(ROLE_ADMIN);
        let total = self.total_allocated_assets();
        self.high_water_mark.set(total);
        self.env().emit_event(ConfigurationChanged {
            parameter: String::from("distributor.high_water_mark"),
        });
    }

    // ========== Internal Functions ==========

    /// Convert yield in asset units to USDX units: decimal rescale first,
    /// then the oracle price applied in the asset-to-USDX direction. A stale
    /// or missing round converts 1:1, matching redemption pricing.
    fn yield_to_usdx(&self, asset: Address, yield_assets: U256) -> U256 {
        let decimals = self.asset_decimals.get().unwrap_or(USDX_DECIMALS);
        let rescaled = rescale_amount(yield_assets, decimals, USDX_DECIMALS);

        let now = self.env().get_block_time();
        match self.read_oracle(asset) {
            Some(round) if is_fresh(&round, now) => {
                let peg_scale = U256::from(10u64).pow(U256::from(round.price_decimals));
                if round.price > peg_scale {
                    rescaled * round.price / peg_scale
                } else {
                    rescaled
                }
            }
            _ => rescaled,
        }
    }

    fn read_oracle(&self, asset: Address) -> Option<PriceData> {
        let oracle = self.oracle.get().flatten()?;
        let args = runtime_args! {
            "asset" => asset
        };
        let call_def = CallDef::new("get_latest_round_data", false, args);
        Some(self.env().call_contract(oracle, call_def))
    }

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
        let authorized: bool = self.env().call_contract(acl, call_def);

        if !authorized {
            self.env().revert(ProtocolError::Unauthorized);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redemption_extension::UNITY;

    #[test]
    fn test_yield_conversion_above_peg_scales_up() {
        // 50 USDC of yield at $1.02 mints more than 50 USDX
        let rescaled = rescale_amount(U256::from(50_000_000u64), 6, 18);
        let price = U256::from(1_020_000_000_000_000_000u128);
        let peg = U256::from(UNITY);

        let minted = rescaled * price / peg;
        assert_eq!(minted, U256::from(51_000_000_000_000_000_000u128));
    }

    #[test]
    fn test_yield_conversion_at_peg_is_pure_rescale() {
        let rescaled = rescale_amount(U256::from(50_000_000u64), 6, 18);
        assert_eq!(rescaled, U256::from(50_000_000_000_000_000_000u128));
    }
}

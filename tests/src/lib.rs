//! USDX Protocol Tests
//!
//! Logic-level tests for the treasury and redemption policy.

#[cfg(test)]
mod types_tests {
    use usdx_protocol_contracts::types::*;

    #[test]
    fn test_withdrawal_priority_ordering() {
        // Silo drains first, Aave is the reserve of last resort
        assert!(Protocol::Silo.priority() < Protocol::Euler.priority());
        assert!(Protocol::Euler.priority() < Protocol::Aave.priority());
    }

    #[test]
    fn test_priority_tiers_are_distinct() {
        // Tier ids double as connector storage keys in the Treasury
        let tiers = [
            Protocol::Silo.priority(),
            Protocol::Euler.priority(),
            Protocol::Aave.priority(),
        ];
        assert_ne!(tiers[0], tiers[1]);
        assert_ne!(tiers[1], tiers[2]);
        assert_ne!(tiers[0], tiers[2]);
    }

    #[test]
    fn test_operation_kind_codes_cover_every_service_op() {
        let kinds = [
            OperationKind::TransferAsset,
            OperationKind::ApproveSpender,
            OperationKind::AaveDeposit,
            OperationKind::AaveWithdraw,
            OperationKind::SiloDeposit,
            OperationKind::SiloWithdraw,
            OperationKind::EulerDeposit,
            OperationKind::EulerWithdraw,
            OperationKind::EmergencyTransfer,
        ];
        // Codes are dense and stable: 0..=8 with no gaps
        for (expected, kind) in kinds.iter().enumerate() {
            assert_eq!(kind.code(), expected as u8);
        }
    }
}

#[cfg(test)]
mod pricing_tests {
    use pretty_assertions::assert_eq;
    use usdx_protocol_contracts::redemption_extension::*;
    use usdx_protocol_contracts::types::{OracleStatus, PriceData};
    use odra::casper_types::U256;

    const E18: u128 = 1_000_000_000_000_000_000;

    fn round(price: U256, updated_at: u64, status: OracleStatus) -> PriceData {
        PriceData {
            round_id: 1,
            price,
            price_decimals: 18,
            started_at: updated_at,
            updated_at,
            answered_in_round: 1,
            status,
        }
    }

    #[test]
    fn test_redemption_at_dollar_one_oh_two() {
        // 100 USDX redeemed against USDC priced at $1.02
        let usdx = U256::from(100u64) * U256::from(E18);
        let price = U256::from(1_020_000_000_000_000_000u128);
        let peg = U256::from(E18);

        let (adjusted, factor) = price_adjusted_redemption(usdx, price, peg);
        let usdc = rescale_amount(adjusted, 18, 6);

        assert_eq!(usdc, U256::from(98_039_215u64));
        assert_eq!(factor, U256::from(980_392_156_862_745_098u128));
    }

    #[test]
    fn test_redemption_never_exceeds_nominal() {
        let usdx = U256::from(1_234u64) * U256::from(E18);
        let peg = U256::from(E18);

        for price_milli in [900u64, 999, 1_000, 1_001, 1_020, 1_500] {
            let price = U256::from(price_milli) * U256::from(E18 / 1_000);
            let (adjusted, factor) = price_adjusted_redemption(usdx, price, peg);
            assert!(adjusted <= usdx);
            assert!(factor <= U256::from(UNITY));
        }
    }

    #[test]
    fn test_below_peg_is_exact_one_to_one() {
        // A de-pegged (cheap) asset never pays out more than nominal
        let usdx = U256::from(77u64) * U256::from(E18);
        let price = U256::from(950_000_000_000_000_000u128); // $0.95
        let peg = U256::from(E18);

        let (adjusted, factor) = price_adjusted_redemption(usdx, price, peg);
        assert_eq!(adjusted, usdx);
        assert_eq!(factor, U256::from(UNITY));
    }

    #[test]
    fn test_fallback_selection_is_deterministic() {
        let price = U256::from(1_020_000_000_000_000_000u128);

        // Fresh round participates in pricing
        assert!(is_fresh(&round(price, 1_000, OracleStatus::Ok), 1_000));

        // Same round one second past the heartbeat does not
        let stale_now = 1_000 + ORACLE_HEARTBEAT_SECONDS + 1;
        assert!(!is_fresh(&round(price, 1_000, OracleStatus::Ok), stale_now));

        // Status failures select the fallback regardless of age
        assert!(!is_fresh(&round(price, 1_000, OracleStatus::Unavailable), 1_000));
        assert!(!is_fresh(&round(price, 1_000, OracleStatus::InvalidPrice), 1_000));

        // Zero price is never used even when the feed claims Ok
        assert!(!is_fresh(&round(U256::zero(), 1_000, OracleStatus::Ok), 1_000));
    }

    #[test]
    fn test_heartbeat_is_twenty_four_hours() {
        assert_eq!(ORACLE_HEARTBEAT_SECONDS, 86_400);
    }

    #[test]
    fn test_rescale_truncates_toward_zero() {
        // 18 -> 6 decimals drops sub-micro dust, never rounds up
        let with_dust = U256::from(98_039_215_686_274_509_803u128);
        assert_eq!(rescale_amount(with_dust, 18, 6), U256::from(98_039_215u64));

        // One unit below the next micro stays below it
        let just_under = U256::from(1_999_999_999_999u64);
        assert_eq!(rescale_amount(just_under, 18, 6), U256::from(1u64));
    }

    #[test]
    fn test_rescale_up_and_identity() {
        assert_eq!(
            rescale_amount(U256::from(3u64), 6, 18),
            U256::from(3_000_000_000_000u64)
        );
        assert_eq!(rescale_amount(U256::from(42u64), 18, 18), U256::from(42u64));
    }
}

#[cfg(test)]
mod planning_tests {
    use pretty_assertions::assert_eq;
    use usdx_protocol_contracts::redemption_extension::select_withdrawal_sources;
    use odra::casper_types::U256;

    fn u(v: u64) -> U256 {
        U256::from(v)
    }

    #[test]
    fn test_two_vault_partial_fill() {
        // Silo holds 40, Euler holds 70; a need of 100 takes 40 then 60
        let (fills, total) = select_withdrawal_sources(u(100), &[u(40), u(70)]);

        assert_eq!(fills, vec![(0, u(40)), (1, u(60))]);
        assert_eq!(total, u(100));
    }

    #[test]
    fn test_first_source_covering_everything_stops_traversal() {
        let (fills, total) = select_withdrawal_sources(u(25), &[u(100), u(100)]);

        assert_eq!(fills, vec![(0, u(25))]);
        assert_eq!(total, u(25));
    }

    #[test]
    fn test_empty_sources_are_skipped_without_entries() {
        let (fills, total) =
            select_withdrawal_sources(u(15), &[u(0), u(10), u(0), u(10)]);

        assert_eq!(fills, vec![(1, u(10)), (3, u(5))]);
        assert_eq!(total, u(15));
    }

    #[test]
    fn test_under_coverage_reports_shortfall() {
        let (fills, total) = select_withdrawal_sources(u(500), &[u(100), u(150)]);

        // Both sources drained, requirement still unmet
        assert_eq!(fills, vec![(0, u(100)), (1, u(150))]);
        assert_eq!(total, u(250));
    }

    #[test]
    fn test_plan_total_is_monotone_in_requirement() {
        let capacities = [u(30), u(0), u(45), u(25)];

        let mut previous = U256::zero();
        for required in 0u64..=120 {
            let (_, total) = select_withdrawal_sources(u(required), &capacities);
            assert!(total >= previous);
            assert!(total <= u(required));
            previous = total;
        }
    }
}

#[cfg(test)]
mod redemption_lifecycle_tests {
    use usdx_protocol_contracts::treasury::{cooldown_elapsed, limit_allows};
    use odra::casper_types::U256;

    const SEVEN_DAYS: u64 = 604_800;

    #[test]
    fn test_completion_blocked_during_cooldown() {
        let start = 1_700_000_000;
        assert!(!cooldown_elapsed(start, SEVEN_DAYS, start + SEVEN_DAYS - 1));
        assert!(cooldown_elapsed(start, SEVEN_DAYS, start + SEVEN_DAYS));
    }

    #[test]
    fn test_reinitiation_restarts_the_clock() {
        let first = 1_700_000_000;
        let second = first + 3 * 86_400;

        // Waiting out the first cooldown is not enough once the position
        // accumulated a second initiation
        let old_deadline = first + SEVEN_DAYS;
        assert!(!cooldown_elapsed(second, SEVEN_DAYS, old_deadline));
        assert!(cooldown_elapsed(second, SEVEN_DAYS, second + SEVEN_DAYS));
    }

    #[test]
    fn test_operation_limits() {
        // Zero limit disables the check entirely
        assert!(limit_allows(U256::zero(), U256::from(u128::MAX)));

        // Non-zero limits are inclusive upper bounds
        let limit = U256::from(1_000_000u64);
        assert!(limit_allows(limit, limit));
        assert!(!limit_allows(limit, limit + U256::one()));
    }

    #[test]
    fn test_block_cap_accumulation() {
        // Mirror of the extension's accumulate-then-check: three redemptions
        // in the same block share one counter
        let cap = U256::from(100u64);
        let mut counter = U256::zero();

        for (amount, fits) in [(40u64, true), (60, true), (1, false)] {
            let next = counter + U256::from(amount);
            let allowed = cap.is_zero() || next <= cap;
            assert_eq!(allowed, fits);
            if allowed {
                counter = next;
            }
        }
        assert_eq!(counter, cap);
    }
}

#[cfg(test)]
mod treasury_vm_tests {
    use odra::casper_types::U256;
    use odra::host::{Deployer, HostRef};
    use odra::prelude::Addressable;
    use usdx_protocol_contracts::access_control::{
        AccessControl, AccessControlInitArgs, ROLE_SERVICE,
    };
    use usdx_protocol_contracts::errors::ProtocolError;
    use usdx_protocol_contracts::stablecoin::{Usdx, UsdxInitArgs};
    use usdx_protocol_contracts::treasury::{Treasury, TreasuryInitArgs};
    use usdx_protocol_contracts::types::OperationKind;

    #[test]
    fn test_duplicate_operation_key_rejects_after_success() {
        let env = odra_test::env();
        let admin = env.get_account(0);
        let recipient = env.get_account(1);

        let mut acl = AccessControl::deploy(
            &env,
            AccessControlInitArgs {
                initial_admin: admin,
            },
        );
        let mut token = Usdx::deploy(
            &env,
            UsdxInitArgs {
                access_control: acl.address(),
            },
        );
        let mut treasury = Treasury::deploy(
            &env,
            TreasuryInitArgs {
                access_control: acl.address(),
                cooldown_duration: 604_800,
            },
        );

        acl.grant_role(ROLE_SERVICE, admin);
        token.add_minter(admin);
        token.mint(treasury.address(), U256::from(1_000u64));

        let key = String::from("payout-2026-08-30");
        treasury.transfer_asset(key.clone(), token.address(), recipient, U256::from(250u64));
        assert_eq!(token.balance_of(recipient), U256::from(250u64));
        assert!(treasury.is_operation_executed(OperationKind::TransferAsset, key.clone()));

        // replaying the same key rejects before any transfer
        let result =
            treasury.try_transfer_asset(key, token.address(), recipient, U256::from(250u64));
        assert_eq!(
            result,
            Err(ProtocolError::OperationAlreadyExecuted.into())
        );
        assert_eq!(token.balance_of(recipient), U256::from(250u64));

        // a fresh key is an independent operation
        treasury.transfer_asset(
            String::from("payout-2026-08-31"),
            token.address(),
            recipient,
            U256::from(100u64),
        );
        assert_eq!(token.balance_of(recipient), U256::from(350u64));
    }

    #[test]
    fn test_key_domains_are_separated_by_kind() {
        let env = odra_test::env();
        let admin = env.get_account(0);
        let recipient = env.get_account(1);

        let mut acl = AccessControl::deploy(
            &env,
            AccessControlInitArgs {
                initial_admin: admin,
            },
        );
        let mut token = Usdx::deploy(
            &env,
            UsdxInitArgs {
                access_control: acl.address(),
            },
        );
        let mut treasury = Treasury::deploy(
            &env,
            TreasuryInitArgs {
                access_control: acl.address(),
                cooldown_duration: 604_800,
            },
        );

        acl.grant_role(ROLE_SERVICE, admin);
        token.add_minter(admin);
        token.mint(treasury.address(), U256::from(1_000u64));

        // the same key string under two kinds is two distinct operations
        let key = String::from("op-7");
        treasury.transfer_asset(key.clone(), token.address(), recipient, U256::from(10u64));
        treasury.approve_spender(key.clone(), token.address(), recipient, U256::from(10u64));

        assert!(treasury.is_operation_executed(OperationKind::TransferAsset, key.clone()));
        assert!(treasury.is_operation_executed(OperationKind::ApproveSpender, key));
    }
}

#[cfg(test)]
mod call_shape_tests {
    use odra::casper_types::{runtime_args, U256};
    use odra::CallDef;

    /// Verify cross-contract call definitions are correctly formed for the
    /// entry points the Treasury dispatches to.
    #[test]
    fn test_treasury_call_defs() {
        let args = runtime_args! {
            "asset" => odra::prelude::Address::Account(
                odra::casper_types::account::AccountHash::default()
            ),
            "usdx_amount" => U256::from(1_000u64)
        };
        let call_def = CallDef::new("record_redemption_quote", true, args);
        assert_eq!(call_def.entry_point(), "record_redemption_quote");
        assert!(call_def.is_mut());

        let args = runtime_args! {
            "required" => U256::from(1_000u64)
        };
        let call_def = CallDef::new("calculate_withdrawal_plan", false, args);
        assert_eq!(call_def.entry_point(), "calculate_withdrawal_plan");
        assert!(!call_def.is_mut());

        let args = runtime_args! {
            "block_number" => 42u64,
            "amount" => U256::from(1_000u64)
        };
        let call_def = CallDef::new("update_block_redemptions", true, args);
        assert_eq!(call_def.entry_point(), "update_block_redemptions");
        assert!(call_def.is_mut());
    }
}

//! Protocol error definitions.

use odra::prelude::*;

/// Treasury protocol errors
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum ProtocolError {
    // Input validation errors (1xx)
    ZeroAmount = 100,
    ZeroAddress = 101,
    NotAContract = 102,

    // Authorization errors (2xx)
    Unauthorized = 200,
    MissingServiceRole = 201,
    RecipientNotWhitelisted = 202,
    SpenderNotWhitelisted = 203,

    // Idempotency errors (3xx)
    OperationAlreadyExecuted = 300,

    // Policy limit errors (4xx)
    OperationLimitExceeded = 400,
    BlockRedemptionCapExceeded = 401,

    // Oracle configuration errors (5xx)
    OracleNotConfigured = 500,
    OracleInvalidDecimals = 501,

    // Liquidity errors (6xx)
    InsufficientLiquidity = 600,

    // Connector errors (7xx)
    DepositFailed = 700,
    WithdrawFailed = 701,
    CollateralOperationFailed = 702,
    VaultAssetMismatch = 703,
    TokenTransferFailed = 704,
    TokenApprovalFailed = 705,
    InsufficientTokenBalance = 706,

    // Redemption state errors (8xx)
    AssetNotRedeemable = 800,
    SlippageExceeded = 801,
    CooldownActive = 802,
    NoPendingRedemption = 803,
    ReentrantCall = 804,
    ProtocolPaused = 805,

    // Configuration errors (9xx)
    InvalidConfig = 900,
    AllocationNotFound = 901,

    // Escrow errors (10xx)
    EscrowInsufficientBalance = 1000,
}

impl ProtocolError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Input validation
            ProtocolError::ZeroAmount => "Amount must be non-zero",
            ProtocolError::ZeroAddress => "Address must be non-zero",
            ProtocolError::NotAContract => "Address has no deployed code",

            // Authorization
            ProtocolError::Unauthorized => "Unauthorized: caller is not admin",
            ProtocolError::MissingServiceRole => "Unauthorized: caller lacks service role",
            ProtocolError::RecipientNotWhitelisted => "Recipient is not whitelisted",
            ProtocolError::SpenderNotWhitelisted => "Spender is not whitelisted",

            // Idempotency
            ProtocolError::OperationAlreadyExecuted => "Operation already executed for this key",

            // Policy limits
            ProtocolError::OperationLimitExceeded => "Amount exceeds operation limit",
            ProtocolError::BlockRedemptionCapExceeded => "Per-block redemption cap exceeded",

            // Oracle configuration
            ProtocolError::OracleNotConfigured => "Oracle source not configured",
            ProtocolError::OracleInvalidDecimals => "Oracle decimals out of range",

            // Liquidity
            ProtocolError::InsufficientLiquidity => "Insufficient liquidity across connectors",

            // Connector
            ProtocolError::DepositFailed => "Connector: vault deposit returned zero shares",
            ProtocolError::WithdrawFailed => "Connector: vault withdrawal returned zero",
            ProtocolError::CollateralOperationFailed => "Connector: collateral operation failed",
            ProtocolError::VaultAssetMismatch => "Connector: vault underlying asset mismatch",
            ProtocolError::TokenTransferFailed => "Token transfer failed",
            ProtocolError::TokenApprovalFailed => "Token approval failed",
            ProtocolError::InsufficientTokenBalance => "Insufficient token balance",

            // Redemption state
            ProtocolError::AssetNotRedeemable => "Asset is not flagged redeemable",
            ProtocolError::SlippageExceeded => "Quoted amount below minimum acceptable",
            ProtocolError::CooldownActive => "Redemption still in cooldown",
            ProtocolError::NoPendingRedemption => "No pending redemption",
            ProtocolError::ReentrantCall => "Reentrant call",
            ProtocolError::ProtocolPaused => "Operation blocked: protocol paused",

            // Configuration
            ProtocolError::InvalidConfig => "Invalid configuration parameter",
            ProtocolError::AllocationNotFound => "Vault allocation not found",

            // Escrow
            ProtocolError::EscrowInsufficientBalance => "Escrow: insufficient balance",
        }
    }
}

impl core::fmt::Display for ProtocolError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<ProtocolError> for OdraError {
    fn from(error: ProtocolError) -> Self {
        #[cfg(target_arch = "wasm32")]
        {
            OdraError::user(error as u16)
        }

        #[cfg(not(target_arch = "wasm32"))]
        {
            OdraError::user(error as u16, error.message())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_ranges() {
        assert_eq!(ProtocolError::ZeroAmount as u16, 100);
        assert_eq!(ProtocolError::Unauthorized as u16, 200);
        assert_eq!(ProtocolError::OperationAlreadyExecuted as u16, 300);
        assert_eq!(ProtocolError::OperationLimitExceeded as u16, 400);
        assert_eq!(ProtocolError::InsufficientLiquidity as u16, 600);
        assert_eq!(ProtocolError::DepositFailed as u16, 700);
        assert_eq!(ProtocolError::AssetNotRedeemable as u16, 800);
    }

    #[test]
    fn test_messages_are_non_empty() {
        let errors = [
            ProtocolError::ZeroAmount,
            ProtocolError::OperationAlreadyExecuted,
            ProtocolError::BlockRedemptionCapExceeded,
            ProtocolError::InsufficientLiquidity,
            ProtocolError::CooldownActive,
            ProtocolError::NoPendingRedemption,
        ];
        for e in errors {
            assert!(!e.message().is_empty());
        }
    }
}

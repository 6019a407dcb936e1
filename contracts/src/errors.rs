//! Protocol error definitions.

use odra::prelude::*;

/// Lending ledger errors
#[repr(u16)]
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum LendingError {
    // Lifecycle errors (1xx)
    AlreadyInitialized = 100,
    NotInitialized = 101,
    InvalidParameters = 102,
    Unauthorized = 103,

    // Transfer errors (2xx)
    ZeroAmount = 200,
    InsufficientAllowance = 201,
    TransferFailed = 202,
    RefundFailed = 203,

    // Lender errors (3xx)
    NoDeposit = 300,
    InsufficientBalance = 301,
    InsufficientPoolLiquidity = 302,

    // Borrower errors (4xx)
    PositionAlreadyActive = 400,
    NoCollateral = 401,
    InsufficientCollateral = 402,
    NoActiveLoan = 403,
    ThresholdNotBreached = 404,

    // Dispatch and arithmetic errors (9xx)
    UnknownMethod = 900,
    MathOverflow = 901,
}

impl LendingError {
    pub const fn message(&self) -> &'static str {
        match self {
            // Lifecycle
            LendingError::AlreadyInitialized => "Ledger already initialized",
            LendingError::NotInitialized => "Ledger not initialized",
            LendingError::InvalidParameters => {
                "Collateral ratio must exceed liquidation threshold"
            }
            LendingError::Unauthorized => "Unauthorized: caller is not owner",

            // Transfer
            LendingError::ZeroAmount => "Amount must be greater than zero",
            LendingError::InsufficientAllowance => "Insufficient token allowance",
            LendingError::TransferFailed => "Token transfer failed",
            LendingError::RefundFailed => "Transfer failed and the pulled amount could not be refunded",

            // Lender
            LendingError::NoDeposit => "No liquidity deposited",
            LendingError::InsufficientBalance => "Amount exceeds balance",
            LendingError::InsufficientPoolLiquidity => "Insufficient pool liquidity",

            // Borrower
            LendingError::PositionAlreadyActive => "Borrow position already active",
            LendingError::NoCollateral => "No collateral deposited",
            LendingError::InsufficientCollateral => "Insufficient collateral for loan",
            LendingError::NoActiveLoan => "No active loan",
            LendingError::ThresholdNotBreached => "Liquidation threshold not breached",

            // Dispatch and arithmetic
            LendingError::UnknownMethod => "Unknown method",
            LendingError::MathOverflow => "Arithmetic overflow",
        }
    }
}

impl core::fmt::Display for LendingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.message())
    }
}

impl From<LendingError> for OdraError {
    fn from(error: LendingError) -> Self {
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

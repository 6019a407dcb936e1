//! Events emitted by the lending pool.

use odra::prelude::*;
use odra::casper_types::U256;

/// Liquidity supplied by a lender
#[odra::event]
pub struct LiquidityDeposited {
    pub lender: Address,
    pub amount: U256,
    /// Lender's principal after the deposit
    pub deposited: U256,
}

/// Principal and interest paid out to a lender
#[odra::event]
pub struct LiquidityWithdrawn {
    pub lender: Address,
    pub principal: U256,
    pub interest: U256,
}

#[odra::event]
pub struct CollateralDeposited {
    pub borrower: Address,
    pub amount: U256,
    /// Borrower's collateral after the deposit
    pub collateral: U256,
}

/// Idle collateral released back to its owner
#[odra::event]
pub struct CollateralWithdrawn {
    pub borrower: Address,
    pub amount: U256,
}

#[odra::event]
pub struct Borrowed {
    pub borrower: Address,
    pub loan_amount: U256,
    /// Collateral backing the loan
    pub collateral: U256,
    /// Price the loan was valued at
    pub price: U256,
}

#[odra::event]
pub struct Repaid {
    pub borrower: Address,
    pub principal: U256,
    pub interest: U256,
    pub collateral_returned: U256,
}

#[odra::event]
pub struct Liquidated {
    pub borrower: Address,
    pub liquidator: Address,
    /// Principal plus interest covered by the liquidator
    pub debt: U256,
    /// Collateral plus bonus paid to the liquidator
    pub collateral_seized: U256,
}

/// New risk parameters set by the owner
#[odra::event]
pub struct ParametersUpdated {
    pub annual_interest_bps: u64,
    pub collateral_ratio_pct: u64,
    pub liquidation_threshold_pct: u64,
    pub liquidation_bonus_bps: u64,
}

//! Ledger records, receipts and snapshots.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::LendingError;
use crate::interest;

/// Token ledger selector
#[odra::odra_type]
#[derive(Copy)]
pub enum AssetKind {
    /// Asset lent to borrowers and supplied by lenders
    Loan,
    /// Asset locked as collateral
    Collateral,
}

/// Owner-tunable risk parameters
#[odra::odra_type]
#[derive(Copy)]
pub struct RiskParameters {
    /// Annual borrow rate in basis points
    pub annual_interest_bps: u64,
    /// Minimum collateral/debt ratio to open a loan, in percent
    pub collateral_ratio_pct: u64,
    /// Ratio below which a loan can be liquidated, in percent
    pub liquidation_threshold_pct: u64,
    /// Liquidator bonus in basis points of seized collateral
    pub liquidation_bonus_bps: u64,
}

impl RiskParameters {
    pub fn new(
        annual_interest_bps: u64,
        collateral_ratio_pct: u64,
        liquidation_threshold_pct: u64,
        liquidation_bonus_bps: u64,
    ) -> Self {
        Self {
            annual_interest_bps,
            collateral_ratio_pct,
            liquidation_threshold_pct,
            liquidation_bonus_bps,
        }
    }

    /// The opening ratio must sit strictly above the liquidation threshold.
    pub fn validate(&self) -> Result<(), LendingError> {
        if self.collateral_ratio_pct <= self.liquidation_threshold_pct {
            return Err(LendingError::InvalidParameters);
        }
        Ok(())
    }
}

/// Protocol configuration, set once by `initialize`
#[odra::odra_type]
pub struct ProtocolConfig {
    /// Account allowed to update parameters
    pub owner: Address,
    /// Loan token contract
    pub loan_asset: Address,
    /// Collateral token contract
    pub collateral_asset: Address,
    /// Current risk parameters
    pub params: RiskParameters,
}

impl ProtocolConfig {
    pub fn asset(&self, kind: AssetKind) -> Address {
        match kind {
            AssetKind::Loan => self.loan_asset,
            AssetKind::Collateral => self.collateral_asset,
        }
    }
}

/// Pool-wide totals
#[odra::odra_type]
#[derive(Default)]
pub struct PoolState {
    /// Lender principal held by the pool
    pub total_liquidity: U256,
    /// Borrower principal outstanding
    pub total_borrowed: U256,
    /// Borrower interest received (cumulative)
    pub interest_collected: U256,
    /// Lender interest paid out (cumulative)
    pub interest_paid: U256,
    /// Collateral locked by all borrower positions
    pub total_collateral: U256,
    /// Loan units pulled for a settlement whose refund could not be sent back
    pub stranded_refunds: U256,
}

impl PoolState {
    /// Liquidity free for new loans and withdrawals
    pub fn available_liquidity(&self) -> U256 {
        self.total_liquidity.saturating_sub(self.total_borrowed)
    }

    pub fn utilization_bps(&self) -> Result<U256, LendingError> {
        interest::utilization_bps(self.total_borrowed, self.total_liquidity)
    }

    /// Part of `balance` not backing any position's collateral
    pub fn collateral_reserve(&self, balance: U256) -> U256 {
        balance.saturating_sub(self.total_collateral)
    }
}

/// Lender record
#[odra::odra_type]
#[derive(Default)]
pub struct LenderAccount {
    /// Principal currently deposited
    pub deposited: U256,
    /// Block of the last interest settlement
    pub last_update_block: u64,
    /// Interest settled but not yet paid
    pub accrued_interest: U256,
}

impl LenderAccount {
    /// Interest earned since the last settlement, at current utilization.
    pub fn unsettled_interest(
        &self,
        pool: &PoolState,
        params: &RiskParameters,
        current_block: u64,
    ) -> Result<U256, LendingError> {
        if self.deposited.is_zero() || current_block <= self.last_update_block {
            return Ok(U256::zero());
        }
        interest::lender_interest(
            self.deposited,
            params.annual_interest_bps,
            pool.utilization_bps()?,
            self.last_update_block,
            current_block,
        )
    }

    /// Settled plus unsettled interest.
    pub fn pending_interest(
        &self,
        pool: &PoolState,
        params: &RiskParameters,
        current_block: u64,
    ) -> Result<U256, LendingError> {
        let unsettled = self.unsettled_interest(pool, params, current_block)?;
        self.accrued_interest
            .checked_add(unsettled)
            .ok_or(LendingError::MathOverflow)
    }
}

/// Borrower record
#[odra::odra_type]
#[derive(Default)]
pub struct BorrowerPosition {
    /// Collateral locked by the account
    pub collateral: U256,
    /// Outstanding principal; interest is computed on demand
    pub debt: U256,
    /// Block the current loan was opened, 0 when inactive
    pub borrow_block: u64,
    /// Whether a loan is open
    pub active: bool,
}

impl BorrowerPosition {
    /// Live interest on the open loan; zero when inactive.
    pub fn accrued_interest(
        &self,
        params: &RiskParameters,
        current_block: u64,
    ) -> Result<U256, LendingError> {
        if !self.active {
            return Ok(U256::zero());
        }
        interest::borrower_interest(
            self.debt,
            params.annual_interest_bps,
            self.borrow_block,
            current_block,
        )
    }

    /// Principal plus live interest; zero when inactive.
    pub fn total_debt(
        &self,
        params: &RiskParameters,
        current_block: u64,
    ) -> Result<U256, LendingError> {
        if !self.active {
            return Ok(U256::zero());
        }
        self.debt
            .checked_add(self.accrued_interest(params, current_block)?)
            .ok_or(LendingError::MathOverflow)
    }

    /// Collateral ratio in percent at `price`; `U256::MAX` when inactive.
    pub fn collateral_ratio_pct(
        &self,
        params: &RiskParameters,
        price: U256,
        current_block: u64,
    ) -> Result<U256, LendingError> {
        if !self.active {
            return Ok(U256::MAX);
        }
        let value = interest::collateral_value(self.collateral, price)?;
        interest::collateral_ratio_pct(value, self.total_debt(params, current_block)?)
    }
}

/// Result of `withdraw_liquidity`
#[odra::odra_type]
pub struct LiquidityWithdrawal {
    /// Principal withdrawn
    pub principal: U256,
    /// Interest paid alongside the principal
    pub interest: U256,
}

/// Result of `repay`
#[odra::odra_type]
pub struct Repayment {
    /// Principal repaid
    pub principal: U256,
    /// Interest repaid
    pub interest: U256,
    /// Principal plus interest pulled from the borrower
    pub total_debt: U256,
    /// Collateral returned to the borrower
    pub collateral_returned: U256,
}

/// Result of `liquidate`
#[odra::odra_type]
pub struct Liquidation {
    /// Liquidated account
    pub borrower: Address,
    /// Principal settled
    pub principal: U256,
    /// Interest settled
    pub interest: U256,
    /// Principal plus interest pulled from the liquidator
    pub total_debt: U256,
    /// Collateral plus bonus paid to the liquidator
    pub collateral_payout: U256,
}

/// Lender snapshot
#[odra::odra_type]
pub struct LenderInfo {
    pub deposited: U256,
    pub last_update_block: u64,
    /// Settled plus unsettled interest
    pub pending_interest: U256,
}

/// Borrower snapshot
#[odra::odra_type]
pub struct BorrowerInfo {
    pub collateral: U256,
    /// Principal plus live interest
    pub total_debt: U256,
    pub borrow_block: u64,
    pub active: bool,
}

//! Fixed-point formulas for interest accrual and collateral valuation.
//!
//! All math is integer-only on `U256` and rounds toward zero:
//! - Borrower interest is simple interest on principal over elapsed blocks
//! - Lender interest is the borrow rate scaled by pool utilization
//! - Collateral is valued in loan units through a caller-supplied price
//!
//! Every multiplication is checked; overflow surfaces as `MathOverflow`.

use odra::casper_types::U256;
use crate::errors::LendingError;

/// Blocks per year at a 10-minute cadence
pub const BLOCKS_PER_YEAR: u64 = 52_560;

/// Basis points scale (100% = 10000 bps)
pub const BPS_SCALE: u64 = 10_000;

/// Percent scale used by collateral ratios
pub const PERCENT_SCALE: u64 = 100;

/// Fixed-point scale of the collateral price (1e6 = parity)
pub const PRICE_SCALE: u64 = 1_000_000;

pub type MathResult = Result<U256, LendingError>;

fn mul(a: U256, b: U256) -> MathResult {
    a.checked_mul(b).ok_or(LendingError::MathOverflow)
}

fn div(a: U256, b: U256) -> MathResult {
    a.checked_div(b).ok_or(LendingError::MathOverflow)
}

/// Interest owed on `debt` since `borrow_block`.
///
/// `debt * annual_bps * elapsed / (BLOCKS_PER_YEAR * BPS_SCALE)`
pub fn borrower_interest(
    debt: U256,
    annual_interest_bps: u64,
    borrow_block: u64,
    current_block: u64,
) -> MathResult {
    if current_block <= borrow_block || debt.is_zero() {
        return Ok(U256::zero());
    }

    let elapsed = current_block - borrow_block;
    let numerator = mul(
        mul(debt, U256::from(annual_interest_bps))?,
        U256::from(elapsed),
    )?;
    div(numerator, U256::from(BLOCKS_PER_YEAR * BPS_SCALE))
}

/// Share of borrowed liquidity in basis points; zero for an empty pool.
pub fn utilization_bps(total_borrowed: U256, total_liquidity: U256) -> MathResult {
    if total_liquidity.is_zero() {
        return Ok(U256::zero());
    }
    div(mul(total_borrowed, U256::from(BPS_SCALE))?, total_liquidity)
}

/// Interest earned by `deposited` since `last_update_block`.
///
/// `deposited * annual_bps * utilization_bps * elapsed / (BLOCKS_PER_YEAR * BPS_SCALE^2)`
pub fn lender_interest(
    deposited: U256,
    annual_interest_bps: u64,
    utilization_bps: U256,
    last_update_block: u64,
    current_block: u64,
) -> MathResult {
    if current_block <= last_update_block || deposited.is_zero() {
        return Ok(U256::zero());
    }

    let elapsed = current_block - last_update_block;
    let numerator = mul(
        mul(
            mul(deposited, U256::from(annual_interest_bps))?,
            utilization_bps,
        )?,
        U256::from(elapsed),
    )?;
    div(
        numerator,
        U256::from(BLOCKS_PER_YEAR * BPS_SCALE * BPS_SCALE),
    )
}

/// Collateral value in loan units: `collateral * price / PRICE_SCALE`
pub fn collateral_value(collateral: U256, price: U256) -> MathResult {
    div(mul(collateral, price)?, U256::from(PRICE_SCALE))
}

/// Largest loan a collateral value supports: `value * 100 / ratio_pct`
pub fn max_borrow(collateral_value: U256, collateral_ratio_pct: u64) -> MathResult {
    if collateral_ratio_pct == 0 {
        return Err(LendingError::InvalidParameters);
    }
    div(
        mul(collateral_value, U256::from(PERCENT_SCALE))?,
        U256::from(collateral_ratio_pct),
    )
}

/// Collateral ratio in percent; `U256::MAX` when there is no debt.
pub fn collateral_ratio_pct(collateral_value: U256, total_debt: U256) -> MathResult {
    if total_debt.is_zero() {
        return Ok(U256::MAX);
    }
    div(mul(collateral_value, U256::from(PERCENT_SCALE))?, total_debt)
}

/// Liquidator bonus on seized collateral: `collateral * bonus_bps / BPS_SCALE`
pub fn liquidation_bonus(collateral: U256, liquidation_bonus_bps: u64) -> MathResult {
    div(
        mul(collateral, U256::from(liquidation_bonus_bps))?,
        U256::from(BPS_SCALE),
    )
}

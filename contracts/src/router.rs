//! Method dispatch for hosts that address the ledger by name.
//!
//! A host decodes the method name with [`Method::from_name`], builds the typed
//! [`Call`], and hands it to [`LedgerCore::execute`]. Names are the camelCase
//! wire names; the snake_case forms used by the Odra entry points are accepted
//! as well.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::LendingError;
use crate::interfaces::{Clock, LedgerResult, LedgerStore, TokenTransferPort};
use crate::ledger::LedgerCore;
use crate::types::{
    AssetKind, BorrowerInfo, LenderInfo, Liquidation, LiquidityWithdrawal, PoolState,
    ProtocolConfig, Repayment, RiskParameters,
};

/// Public operations of the ledger
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Method {
    Initialize,
    DepositLiquidity,
    WithdrawLiquidity,
    DepositCollateral,
    WithdrawCollateral,
    Borrow,
    Repay,
    Liquidate,
    UpdateParameters,
    GetCollateralRatio,
    GetTotalDebt,
    GetPendingInterest,
    UtilizationRate,
    GetLenderInfo,
    GetBorrowerPosition,
    CheckAllowance,
    GetConfig,
    GetPoolState,
}

impl Method {
    pub const ALL: [Method; 18] = [
        Method::Initialize,
        Method::DepositLiquidity,
        Method::WithdrawLiquidity,
        Method::DepositCollateral,
        Method::WithdrawCollateral,
        Method::Borrow,
        Method::Repay,
        Method::Liquidate,
        Method::UpdateParameters,
        Method::GetCollateralRatio,
        Method::GetTotalDebt,
        Method::GetPendingInterest,
        Method::UtilizationRate,
        Method::GetLenderInfo,
        Method::GetBorrowerPosition,
        Method::CheckAllowance,
        Method::GetConfig,
        Method::GetPoolState,
    ];

    /// Wire name
    pub const fn name(&self) -> &'static str {
        match self {
            Method::Initialize => "initialize",
            Method::DepositLiquidity => "depositLiquidity",
            Method::WithdrawLiquidity => "withdrawLiquidity",
            Method::DepositCollateral => "depositCollateral",
            Method::WithdrawCollateral => "withdrawCollateral",
            Method::Borrow => "borrow",
            Method::Repay => "repay",
            Method::Liquidate => "liquidate",
            Method::UpdateParameters => "updateParameters",
            Method::GetCollateralRatio => "getCollateralRatio",
            Method::GetTotalDebt => "getTotalDebt",
            Method::GetPendingInterest => "getPendingInterest",
            Method::UtilizationRate => "utilizationRate",
            Method::GetLenderInfo => "getLenderInfo",
            Method::GetBorrowerPosition => "getBorrowerPosition",
            Method::CheckAllowance => "checkAllowance",
            Method::GetConfig => "getConfig",
            Method::GetPoolState => "getPoolState",
        }
    }

    /// Entry point name on the Odra contract
    pub const fn entry_point(&self) -> &'static str {
        match self {
            // `initialize` runs as the constructor
            Method::Initialize => "init",
            Method::DepositLiquidity => "deposit_liquidity",
            Method::WithdrawLiquidity => "withdraw_liquidity",
            Method::DepositCollateral => "deposit_collateral",
            Method::WithdrawCollateral => "withdraw_collateral",
            Method::Borrow => "borrow",
            Method::Repay => "repay",
            Method::Liquidate => "liquidate",
            Method::UpdateParameters => "update_parameters",
            Method::GetCollateralRatio => "get_collateral_ratio",
            Method::GetTotalDebt => "get_total_debt",
            Method::GetPendingInterest => "get_pending_interest",
            Method::UtilizationRate => "utilization_rate",
            Method::GetLenderInfo => "get_lender_info",
            Method::GetBorrowerPosition => "get_borrower_position",
            Method::CheckAllowance => "check_allowance",
            Method::GetConfig => "get_config",
            Method::GetPoolState => "get_pool_state",
        }
    }

    /// Resolve a wire or entry point name.
    pub fn from_name(name: &str) -> LedgerResult<Method> {
        Method::ALL
            .iter()
            .copied()
            .find(|method| method.name() == name || method.entry_point() == name)
            .ok_or(LendingError::UnknownMethod)
    }
}

/// A method together with its arguments
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Call {
    Initialize {
        loan_asset: Address,
        collateral_asset: Address,
        params: RiskParameters,
    },
    DepositLiquidity { amount: U256 },
    /// `amount == 0` withdraws everything
    WithdrawLiquidity { amount: U256 },
    DepositCollateral { amount: U256 },
    /// `amount == 0` releases everything
    WithdrawCollateral { amount: U256 },
    Borrow { loan_amount: U256, price: U256 },
    Repay,
    Liquidate { borrower: Address, price: U256 },
    UpdateParameters { params: RiskParameters },
    GetCollateralRatio { borrower: Address, price: U256 },
    GetTotalDebt { borrower: Address },
    GetPendingInterest { lender: Address },
    UtilizationRate,
    GetLenderInfo { lender: Address },
    GetBorrowerPosition { borrower: Address },
    CheckAllowance { asset: AssetKind, owner: Address },
    GetConfig,
    GetPoolState,
}

impl Call {
    pub fn method(&self) -> Method {
        match self {
            Call::Initialize { .. } => Method::Initialize,
            Call::DepositLiquidity { .. } => Method::DepositLiquidity,
            Call::WithdrawLiquidity { .. } => Method::WithdrawLiquidity,
            Call::DepositCollateral { .. } => Method::DepositCollateral,
            Call::WithdrawCollateral { .. } => Method::WithdrawCollateral,
            Call::Borrow { .. } => Method::Borrow,
            Call::Repay => Method::Repay,
            Call::Liquidate { .. } => Method::Liquidate,
            Call::UpdateParameters { .. } => Method::UpdateParameters,
            Call::GetCollateralRatio { .. } => Method::GetCollateralRatio,
            Call::GetTotalDebt { .. } => Method::GetTotalDebt,
            Call::GetPendingInterest { .. } => Method::GetPendingInterest,
            Call::UtilizationRate => Method::UtilizationRate,
            Call::GetLenderInfo { .. } => Method::GetLenderInfo,
            Call::GetBorrowerPosition { .. } => Method::GetBorrowerPosition,
            Call::CheckAllowance { .. } => Method::CheckAllowance,
            Call::GetConfig => Method::GetConfig,
            Call::GetPoolState => Method::GetPoolState,
        }
    }
}

/// Result of an executed call
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum CallOutput {
    Bool(bool),
    Amount(U256),
    Withdrawal(LiquidityWithdrawal),
    Repayment(Repayment),
    Liquidation(Liquidation),
    LenderInfo(LenderInfo),
    BorrowerInfo(BorrowerInfo),
    Config(ProtocolConfig),
    Pool(PoolState),
}

impl<S, P, C> LedgerCore<S, P, C>
where
    S: LedgerStore,
    P: TokenTransferPort,
    C: Clock,
{
    /// Run `call` on behalf of `caller`.
    pub fn execute(&mut self, caller: Address, call: Call) -> LedgerResult<CallOutput> {
        let output = match call {
            Call::Initialize {
                loan_asset,
                collateral_asset,
                params,
            } => {
                self.initialize(caller, loan_asset, collateral_asset, params)?;
                CallOutput::Bool(true)
            }
            Call::DepositLiquidity { amount } => {
                self.deposit_liquidity(caller, amount)?;
                CallOutput::Bool(true)
            }
            Call::WithdrawLiquidity { amount } => {
                CallOutput::Withdrawal(self.withdraw_liquidity(caller, amount)?)
            }
            Call::DepositCollateral { amount } => {
                self.deposit_collateral(caller, amount)?;
                CallOutput::Bool(true)
            }
            Call::WithdrawCollateral { amount } => {
                CallOutput::Amount(self.withdraw_collateral(caller, amount)?)
            }
            Call::Borrow { loan_amount, price } => {
                CallOutput::Amount(self.borrow(caller, loan_amount, price)?)
            }
            Call::Repay => CallOutput::Repayment(self.repay(caller)?),
            Call::Liquidate { borrower, price } => {
                CallOutput::Liquidation(self.liquidate(caller, borrower, price)?)
            }
            Call::UpdateParameters { params } => {
                self.update_parameters(caller, params)?;
                CallOutput::Bool(true)
            }
            Call::GetCollateralRatio { borrower, price } => {
                CallOutput::Amount(self.collateral_ratio(borrower, price)?)
            }
            Call::GetTotalDebt { borrower } => CallOutput::Amount(self.total_debt(borrower)?),
            Call::GetPendingInterest { lender } => {
                CallOutput::Amount(self.pending_interest(lender)?)
            }
            Call::UtilizationRate => CallOutput::Amount(self.utilization_rate()?),
            Call::GetLenderInfo { lender } => CallOutput::LenderInfo(self.lender_info(lender)?),
            Call::GetBorrowerPosition { borrower } => {
                CallOutput::BorrowerInfo(self.borrower_info(borrower)?)
            }
            Call::CheckAllowance { asset, owner } => {
                CallOutput::Amount(self.check_allowance(asset, owner))
            }
            Call::GetConfig => CallOutput::Config(self.config()?),
            Call::GetPoolState => CallOutput::Pool(self.pool()),
        };
        Ok(output)
    }
}

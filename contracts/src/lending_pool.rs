//! Lending Pool Contract
//!
//! Casper deployment of the lending ledger. Lenders supply the loan asset and
//! earn utilization-scaled interest; borrowers lock the collateral asset and
//! take a single loan against it; anyone can liquidate a loan whose collateral
//! ratio falls below the liquidation threshold.
//!
//! Every state-changing entry point runs the matching `LedgerCore` operation
//! over this contract's storage, reverts with its `LendingError` on failure,
//! and emits an event on success. Block height is derived from block time.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::LendingError;
use crate::events::{
    Borrowed, CollateralDeposited, CollateralWithdrawn, Liquidated, LiquidityDeposited,
    LiquidityWithdrawn, ParametersUpdated, Repaid,
};
use crate::interfaces::{Clock, LedgerResult, LedgerStore, TokenTransferPort};
use crate::ledger::LedgerCore;
use crate::token_adapter::{BlockClock, Cep18Port};
use crate::types::{
    AssetKind, BorrowerInfo, BorrowerPosition, LenderAccount, LenderInfo, Liquidation,
    LiquidityWithdrawal, PoolState, ProtocolConfig, Repayment, RiskParameters,
};

/// Lending Pool Contract
///
/// Field order is the persisted slot layout; append new fields at the end.
#[odra::module]
pub struct LendingPool {
    /// Owner, assets and risk parameters
    config: Var<ProtocolConfig>,
    /// Pool-wide totals
    pool: Var<PoolState>,
    /// Lender records by account
    lenders: Mapping<Address, LenderAccount>,
    /// Borrower records by account
    borrowers: Mapping<Address, BorrowerPosition>,
}

#[odra::module]
impl LendingPool {
    /// Initialize the pool; the deployer becomes owner.
    pub fn init(&mut self, loan_asset: Address, collateral_asset: Address, params: RiskParameters) {
        let caller = self.env().caller();
        let result = self
            .ledger_with(loan_asset, collateral_asset)
            .initialize(caller, loan_asset, collateral_asset, params);
        self.settle(result);
    }

    // ========== Lender Operations ==========

    /// Supply `amount` of the loan asset
    pub fn deposit_liquidity(&mut self, amount: U256) -> bool {
        let lender = self.env().caller();
        let result = self.ledger().deposit_liquidity(lender, amount);
        let account = self.settle(result);

        self.env().emit_event(LiquidityDeposited {
            lender,
            amount,
            deposited: account.deposited,
        });
        true
    }

    /// Withdraw principal plus all earned interest; `amount == 0` withdraws everything
    pub fn withdraw_liquidity(&mut self, amount: U256) -> LiquidityWithdrawal {
        let lender = self.env().caller();
        let result = self.ledger().withdraw_liquidity(lender, amount);
        let receipt = self.settle(result);

        self.env().emit_event(LiquidityWithdrawn {
            lender,
            principal: receipt.principal,
            interest: receipt.interest,
        });
        receipt
    }

    // ========== Borrower Operations ==========

    /// Lock `amount` of the collateral asset
    pub fn deposit_collateral(&mut self, amount: U256) -> bool {
        let borrower = self.env().caller();
        let result = self.ledger().deposit_collateral(borrower, amount);
        let collateral = self.settle(result);

        self.env().emit_event(CollateralDeposited {
            borrower,
            amount,
            collateral,
        });
        true
    }

    /// Release collateral not backing a loan; `amount == 0` releases everything
    pub fn withdraw_collateral(&mut self, amount: U256) -> U256 {
        let borrower = self.env().caller();
        let result = self.ledger().withdraw_collateral(borrower, amount);
        let released = self.settle(result);

        self.env().emit_event(CollateralWithdrawn {
            borrower,
            amount: released,
        });
        released
    }

    /// Open a loan of `loan_amount` with collateral valued at `price`
    pub fn borrow(&mut self, loan_amount: U256, price: U256) -> U256 {
        let borrower = self.env().caller();
        let result = self.ledger().borrow(borrower, loan_amount, price);
        let borrowed = self.settle(result);

        let collateral = self.borrowers.get(&borrower).unwrap_or_default().collateral;
        self.env().emit_event(Borrowed {
            borrower,
            loan_amount: borrowed,
            collateral,
            price,
        });
        borrowed
    }

    /// Repay the caller's loan in full and recover the collateral
    pub fn repay(&mut self) -> Repayment {
        let borrower = self.env().caller();
        let result = self.ledger().repay(borrower);
        let receipt = self.settle(result);

        self.env().emit_event(Repaid {
            borrower,
            principal: receipt.principal,
            interest: receipt.interest,
            collateral_returned: receipt.collateral_returned,
        });
        receipt
    }

    /// Liquidate `borrower` at `price`; the caller covers the debt
    pub fn liquidate(&mut self, borrower: Address, price: U256) -> Liquidation {
        let liquidator = self.env().caller();
        let result = self.ledger().liquidate(liquidator, borrower, price);
        let receipt = self.settle(result);

        self.env().emit_event(Liquidated {
            borrower,
            liquidator,
            debt: receipt.total_debt,
            collateral_seized: receipt.collateral_payout,
        });
        receipt
    }

    // ========== Admin ==========

    /// Replace the risk parameters (owner only)
    pub fn update_parameters(&mut self, params: RiskParameters) -> bool {
        let caller = self.env().caller();
        let result = self.ledger().update_parameters(caller, params);
        self.settle(result);

        self.env().emit_event(ParametersUpdated {
            annual_interest_bps: params.annual_interest_bps,
            collateral_ratio_pct: params.collateral_ratio_pct,
            liquidation_threshold_pct: params.liquidation_threshold_pct,
            liquidation_bonus_bps: params.liquidation_bonus_bps,
        });
        true
    }

    // ========== Queries ==========

    /// Collateral ratio of `borrower` in percent at `price`; `U256::MAX` without a loan
    pub fn get_collateral_ratio(&self, borrower: Address, price: U256) -> U256 {
        let params = self.require_config().params;
        let position = self.borrowers.get(&borrower).unwrap_or_default();
        let result = position.collateral_ratio_pct(&params, price, self.current_block());
        self.settle(result)
    }

    /// Principal plus live interest of `borrower`
    pub fn get_total_debt(&self, borrower: Address) -> U256 {
        let params = self.require_config().params;
        let position = self.borrowers.get(&borrower).unwrap_or_default();
        let result = position.total_debt(&params, self.current_block());
        self.settle(result)
    }

    /// Settled plus unsettled interest of `lender`
    pub fn get_pending_interest(&self, lender: Address) -> U256 {
        let result = self.lender_snapshot(lender).map(|info| info.pending_interest);
        self.settle(result)
    }

    /// Pool utilization in basis points
    pub fn utilization_rate(&self) -> U256 {
        let result = self.pool.get_or_default().utilization_bps();
        self.settle(result)
    }

    pub fn get_lender_info(&self, lender: Address) -> LenderInfo {
        let result = self.lender_snapshot(lender);
        self.settle(result)
    }

    pub fn get_borrower_position(&self, borrower: Address) -> BorrowerInfo {
        let params = self.require_config().params;
        let position = self.borrowers.get(&borrower).unwrap_or_default();
        let total_debt = self.settle(position.total_debt(&params, self.current_block()));
        BorrowerInfo {
            collateral: position.collateral,
            total_debt,
            borrow_block: position.borrow_block,
            active: position.active,
        }
    }

    /// Allowance `owner` granted this pool on `asset`
    pub fn check_allowance(&self, asset: AssetKind, owner: Address) -> U256 {
        let token = self.require_config().asset(asset);
        let env = self.env();
        Cep18Port::new(env.clone(), token).allowance(owner, env.self_address())
    }

    pub fn get_config(&self) -> ProtocolConfig {
        self.require_config()
    }

    pub fn get_pool_state(&self) -> PoolState {
        self.pool.get_or_default()
    }
}

impl LendingPool {
    /// Ledger over this contract's storage and its configured assets.
    fn ledger(&mut self) -> LedgerCore<&mut Self, Cep18Port, BlockClock> {
        let config = self.require_config();
        self.ledger_with(config.loan_asset, config.collateral_asset)
    }

    fn ledger_with(
        &mut self,
        loan_asset: Address,
        collateral_asset: Address,
    ) -> LedgerCore<&mut Self, Cep18Port, BlockClock> {
        let env = self.env();
        let contract = env.self_address();
        LedgerCore::new(
            self,
            Cep18Port::new(env.clone(), loan_asset),
            Cep18Port::new(env.clone(), collateral_asset),
            BlockClock::new(env),
            contract,
        )
    }

    fn require_config(&self) -> ProtocolConfig {
        match self.config.get() {
            Some(config) => config,
            None => self.env().revert(LendingError::NotInitialized),
        }
    }

    fn current_block(&self) -> u64 {
        BlockClock::new(self.env()).current_block()
    }

    fn lender_snapshot(&self, lender: Address) -> LedgerResult<LenderInfo> {
        let params = self.require_config().params;
        let account = self.lenders.get(&lender).unwrap_or_default();
        let pending_interest =
            account.pending_interest(&self.pool.get_or_default(), &params, self.current_block())?;
        Ok(LenderInfo {
            deposited: account.deposited,
            last_update_block: account.last_update_block,
            pending_interest,
        })
    }

    /// Unwrap a ledger result, reverting the call on error.
    fn settle<T>(&self, result: LedgerResult<T>) -> T {
        match result {
            Ok(value) => value,
            Err(error) => self.env().revert(error),
        }
    }
}

impl LedgerStore for LendingPool {
    fn config(&self) -> Option<ProtocolConfig> {
        self.config.get()
    }

    fn set_config(&mut self, config: ProtocolConfig) {
        self.config.set(config);
    }

    fn pool(&self) -> PoolState {
        self.pool.get_or_default()
    }

    fn set_pool(&mut self, pool: PoolState) {
        self.pool.set(pool);
    }

    fn lender(&self, account: &Address) -> Option<LenderAccount> {
        self.lenders.get(account)
    }

    fn set_lender(&mut self, account: &Address, lender: LenderAccount) {
        self.lenders.set(account, lender);
    }

    fn borrower(&self, account: &Address) -> BorrowerPosition {
        self.borrowers.get(account).unwrap_or_default()
    }

    fn set_borrower(&mut self, account: &Address, position: BorrowerPosition) {
        self.borrowers.set(account, position);
    }
}

//! Ledger core: every state transition of the lending protocol.
//!
//! Each operation reads the clock once, computes the complete next state from
//! copies of the affected records, performs its token transfers, and only then
//! writes the records back. A failed check or transfer therefore leaves the
//! store untouched. Operations with two transfer legs (repay, liquidate)
//! dry-run the outbound leg against the collateral reserve before pulling,
//! and refund the pulled amount if the outbound leg still fails. A refund that
//! fails too is recorded in `PoolState::stranded_refunds` and reported as
//! `RefundFailed`.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::LendingError;
use crate::interest;
use crate::interfaces::{Clock, LedgerResult, LedgerStore, TokenTransferPort};
use crate::types::{
    AssetKind, BorrowerInfo, BorrowerPosition, LenderAccount, LenderInfo, Liquidation,
    LiquidityWithdrawal, PoolState, ProtocolConfig, Repayment, RiskParameters,
};

fn add(a: U256, b: U256) -> LedgerResult<U256> {
    a.checked_add(b).ok_or(LendingError::MathOverflow)
}

fn sub(a: U256, b: U256) -> LedgerResult<U256> {
    a.checked_sub(b).ok_or(LendingError::MathOverflow)
}

/// Lending ledger over a store, one token port per asset and a clock.
pub struct LedgerCore<S, P, C> {
    store: S,
    loan: P,
    collateral: P,
    clock: C,
    /// Account of the ledger itself on both token ledgers
    contract: Address,
}

impl<S, P, C> LedgerCore<S, P, C>
where
    S: LedgerStore,
    P: TokenTransferPort,
    C: Clock,
{
    pub fn new(store: S, loan: P, collateral: P, clock: C, contract: Address) -> Self {
        Self {
            store,
            loan,
            collateral,
            clock,
            contract,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn contract(&self) -> Address {
        self.contract
    }

    // ========== Lifecycle ==========

    /// One-time setup; `caller` becomes owner.
    pub fn initialize(
        &mut self,
        caller: Address,
        loan_asset: Address,
        collateral_asset: Address,
        params: RiskParameters,
    ) -> LedgerResult<ProtocolConfig> {
        if self.store.config().is_some() {
            return Err(LendingError::AlreadyInitialized);
        }
        params.validate()?;

        let config = ProtocolConfig {
            owner: caller,
            loan_asset,
            collateral_asset,
            params,
        };
        self.store.set_config(config.clone());
        Ok(config)
    }

    /// Replace the risk parameters (owner only).
    pub fn update_parameters(
        &mut self,
        caller: Address,
        params: RiskParameters,
    ) -> LedgerResult<ProtocolConfig> {
        let mut config = self.require_config()?;
        if caller != config.owner {
            return Err(LendingError::Unauthorized);
        }
        params.validate()?;

        config.params = params;
        self.store.set_config(config.clone());
        Ok(config)
    }

    // ========== Lender Operations ==========

    /// Supply `amount` of the loan asset, settling earlier interest first.
    pub fn deposit_liquidity(&mut self, caller: Address, amount: U256) -> LedgerResult<LenderAccount> {
        let config = self.require_config()?;
        let block = self.clock.current_block();
        if amount.is_zero() {
            return Err(LendingError::ZeroAmount);
        }

        let mut pool = self.store.pool();
        let mut lender = self.store.lender(&caller).unwrap_or_default();

        // Settle against the pool as it was before this deposit
        if !lender.deposited.is_zero() {
            let earned = lender.unsettled_interest(&pool, &config.params, block)?;
            lender.accrued_interest = add(lender.accrued_interest, earned)?;
        }
        lender.deposited = add(lender.deposited, amount)?;
        lender.last_update_block = lender.last_update_block.max(block);
        pool.total_liquidity = add(pool.total_liquidity, amount)?;

        self.pull(AssetKind::Loan, caller, amount)?;

        self.store.set_lender(&caller, lender.clone());
        self.store.set_pool(pool);
        Ok(lender)
    }

    /// Withdraw principal plus all settled interest; `amount == 0` withdraws everything.
    pub fn withdraw_liquidity(
        &mut self,
        caller: Address,
        amount: U256,
    ) -> LedgerResult<LiquidityWithdrawal> {
        let config = self.require_config()?;
        let block = self.clock.current_block();

        let mut lender = self
            .store
            .lender(&caller)
            .filter(|lender| !lender.deposited.is_zero())
            .ok_or(LendingError::NoDeposit)?;
        let mut pool = self.store.pool();

        let interest = lender.pending_interest(&pool, &config.params, block)?;
        lender.last_update_block = lender.last_update_block.max(block);

        let principal = if amount.is_zero() { lender.deposited } else { amount };
        if principal > lender.deposited {
            return Err(LendingError::InsufficientBalance);
        }
        if principal > pool.available_liquidity() {
            return Err(LendingError::InsufficientPoolLiquidity);
        }

        lender.deposited = sub(lender.deposited, principal)?;
        lender.accrued_interest = U256::zero();
        pool.total_liquidity = sub(pool.total_liquidity, principal)?;
        pool.interest_paid = add(pool.interest_paid, interest)?;

        self.push(AssetKind::Loan, caller, add(principal, interest)?)?;

        self.store.set_lender(&caller, lender);
        self.store.set_pool(pool);
        Ok(LiquidityWithdrawal { principal, interest })
    }

    // ========== Borrower Operations ==========

    /// Lock collateral; returns the account's collateral afterwards.
    pub fn deposit_collateral(&mut self, caller: Address, amount: U256) -> LedgerResult<U256> {
        self.require_config()?;
        if amount.is_zero() {
            return Err(LendingError::ZeroAmount);
        }

        let mut position = self.store.borrower(&caller);
        let mut pool = self.store.pool();
        position.collateral = add(position.collateral, amount)?;
        pool.total_collateral = add(pool.total_collateral, amount)?;

        self.pull(AssetKind::Collateral, caller, amount)?;

        let collateral = position.collateral;
        self.store.set_borrower(&caller, position);
        self.store.set_pool(pool);
        Ok(collateral)
    }

    /// Release idle collateral of an account without an open loan;
    /// `amount == 0` releases everything.
    pub fn withdraw_collateral(&mut self, caller: Address, amount: U256) -> LedgerResult<U256> {
        self.require_config()?;

        let mut position = self.store.borrower(&caller);
        if position.active {
            return Err(LendingError::PositionAlreadyActive);
        }
        if position.collateral.is_zero() {
            return Err(LendingError::NoCollateral);
        }

        let released = if amount.is_zero() { position.collateral } else { amount };
        if released > position.collateral {
            return Err(LendingError::InsufficientBalance);
        }
        let mut pool = self.store.pool();
        position.collateral = sub(position.collateral, released)?;
        pool.total_collateral = sub(pool.total_collateral, released)?;

        self.push(AssetKind::Collateral, caller, released)?;

        self.store.set_borrower(&caller, position);
        self.store.set_pool(pool);
        Ok(released)
    }

    /// Open a loan against the caller's collateral valued at `price`.
    pub fn borrow(&mut self, caller: Address, loan_amount: U256, price: U256) -> LedgerResult<U256> {
        let config = self.require_config()?;
        let block = self.clock.current_block();
        if loan_amount.is_zero() {
            return Err(LendingError::ZeroAmount);
        }

        let mut position = self.store.borrower(&caller);
        if position.active {
            return Err(LendingError::PositionAlreadyActive);
        }
        if position.collateral.is_zero() {
            return Err(LendingError::NoCollateral);
        }

        let value = interest::collateral_value(position.collateral, price)?;
        let max_borrow = interest::max_borrow(value, config.params.collateral_ratio_pct)?;
        if loan_amount > max_borrow {
            return Err(LendingError::InsufficientCollateral);
        }

        let mut pool = self.store.pool();
        if loan_amount > pool.available_liquidity() {
            return Err(LendingError::InsufficientPoolLiquidity);
        }

        position.debt = loan_amount;
        position.borrow_block = block;
        position.active = true;
        pool.total_borrowed = add(pool.total_borrowed, loan_amount)?;

        self.push(AssetKind::Loan, caller, loan_amount)?;

        self.store.set_borrower(&caller, position);
        self.store.set_pool(pool);
        Ok(loan_amount)
    }

    /// Close the caller's loan: pull principal plus interest, return collateral.
    pub fn repay(&mut self, caller: Address) -> LedgerResult<Repayment> {
        let config = self.require_config()?;
        let block = self.clock.current_block();

        let position = self.store.borrower(&caller);
        if !position.active {
            return Err(LendingError::NoActiveLoan);
        }

        let interest = position.accrued_interest(&config.params, block)?;
        let total_debt = add(position.debt, interest)?;
        let pool = self.close_loan(&position, interest)?;

        self.settle_two_legs(caller, total_debt, position.collateral, &pool)?;

        self.store.set_borrower(&caller, BorrowerPosition::default());
        self.store.set_pool(pool);
        Ok(Repayment {
            principal: position.debt,
            interest,
            total_debt,
            collateral_returned: position.collateral,
        })
    }

    /// Seize an under-collateralized loan: the caller pays the borrower's
    /// debt and receives the collateral plus the liquidation bonus.
    pub fn liquidate(
        &mut self,
        caller: Address,
        borrower: Address,
        price: U256,
    ) -> LedgerResult<Liquidation> {
        let config = self.require_config()?;
        let block = self.clock.current_block();

        let position = self.store.borrower(&borrower);
        if !position.active {
            return Err(LendingError::NoActiveLoan);
        }

        let interest = position.accrued_interest(&config.params, block)?;
        let total_debt = add(position.debt, interest)?;
        let value = interest::collateral_value(position.collateral, price)?;
        let ratio = interest::collateral_ratio_pct(value, total_debt)?;
        if ratio >= U256::from(config.params.liquidation_threshold_pct) {
            return Err(LendingError::ThresholdNotBreached);
        }

        let bonus = interest::liquidation_bonus(
            position.collateral,
            config.params.liquidation_bonus_bps,
        )?;
        let payout = add(position.collateral, bonus)?;
        let pool = self.close_loan(&position, interest)?;

        self.settle_two_legs(caller, total_debt, payout, &pool)?;

        self.store.set_borrower(&borrower, BorrowerPosition::default());
        self.store.set_pool(pool);
        Ok(Liquidation {
            borrower,
            principal: position.debt,
            interest,
            total_debt,
            collateral_payout: payout,
        })
    }

    // ========== Queries ==========

    pub fn config(&self) -> LedgerResult<ProtocolConfig> {
        self.require_config()
    }

    /// Pool-wide totals
    pub fn pool(&self) -> PoolState {
        self.store.pool()
    }

    /// Collateral ratio in percent at `price`; `U256::MAX` without an open loan.
    pub fn collateral_ratio(&self, borrower: Address, price: U256) -> LedgerResult<U256> {
        let config = self.require_config()?;
        self.store
            .borrower(&borrower)
            .collateral_ratio_pct(&config.params, price, self.clock.current_block())
    }

    /// Principal plus live interest; zero without an open loan.
    pub fn total_debt(&self, borrower: Address) -> LedgerResult<U256> {
        let config = self.require_config()?;
        self.store
            .borrower(&borrower)
            .total_debt(&config.params, self.clock.current_block())
    }

    /// Settled plus unsettled interest of `lender`
    pub fn pending_interest(&self, lender: Address) -> LedgerResult<U256> {
        let config = self.require_config()?;
        self.store
            .lender(&lender)
            .unwrap_or_default()
            .pending_interest(&self.store.pool(), &config.params, self.clock.current_block())
    }

    /// Pool utilization in basis points
    pub fn utilization_rate(&self) -> LedgerResult<U256> {
        self.store.pool().utilization_bps()
    }

    /// Lender snapshot with live pending interest
    pub fn lender_info(&self, lender: Address) -> LedgerResult<LenderInfo> {
        let config = self.require_config()?;
        let account = self.store.lender(&lender).unwrap_or_default();
        let pending_interest =
            account.pending_interest(&self.store.pool(), &config.params, self.clock.current_block())?;
        Ok(LenderInfo {
            deposited: account.deposited,
            last_update_block: account.last_update_block,
            pending_interest,
        })
    }

    /// Borrower snapshot with live total debt
    pub fn borrower_info(&self, borrower: Address) -> LedgerResult<BorrowerInfo> {
        let config = self.require_config()?;
        let position = self.store.borrower(&borrower);
        let total_debt = position.total_debt(&config.params, self.clock.current_block())?;
        Ok(BorrowerInfo {
            collateral: position.collateral,
            total_debt,
            borrow_block: position.borrow_block,
            active: position.active,
        })
    }

    /// Allowance `owner` granted the ledger on `asset`
    pub fn check_allowance(&self, asset: AssetKind, owner: Address) -> U256 {
        match asset {
            AssetKind::Loan => self.loan.allowance(owner, self.contract),
            AssetKind::Collateral => self.collateral.allowance(owner, self.contract),
        }
    }

    // ========== Internal Functions ==========

    fn require_config(&self) -> LedgerResult<ProtocolConfig> {
        self.store.config().ok_or(LendingError::NotInitialized)
    }

    fn port(&mut self, asset: AssetKind) -> &mut P {
        match asset {
            AssetKind::Loan => &mut self.loan,
            AssetKind::Collateral => &mut self.collateral,
        }
    }

    /// Pool totals after closing `position` with `interest` paid.
    fn close_loan(&self, position: &BorrowerPosition, interest: U256) -> LedgerResult<PoolState> {
        let mut pool = self.store.pool();
        pool.total_borrowed = sub(pool.total_borrowed, position.debt)?;
        pool.total_collateral = sub(pool.total_collateral, position.collateral)?;
        pool.interest_collected = add(pool.interest_collected, interest)?;
        Ok(pool)
    }

    fn require_allowance(&self, asset: AssetKind, owner: Address, amount: U256) -> LedgerResult<()> {
        if self.check_allowance(asset, owner) < amount {
            return Err(LendingError::InsufficientAllowance);
        }
        Ok(())
    }

    /// Pull `amount` of `asset` from `owner` into the ledger.
    fn pull(&mut self, asset: AssetKind, owner: Address, amount: U256) -> LedgerResult<()> {
        self.require_allowance(asset, owner, amount)?;
        let contract = self.contract;
        if !self.port(asset).transfer_from(owner, contract, contract, amount) {
            return Err(LendingError::TransferFailed);
        }
        Ok(())
    }

    /// Push `amount` of `asset` from the ledger to `to`.
    fn push(&mut self, asset: AssetKind, to: Address, amount: U256) -> LedgerResult<()> {
        if !self.port(asset).transfer(to, amount) {
            return Err(LendingError::TransferFailed);
        }
        Ok(())
    }

    /// Pull `debt` loan units from `payer`, then push `payout` collateral to them.
    ///
    /// `closed` is the pool after the loan is closed, so its collateral total
    /// covers only the other positions. The payout must fit in the balance
    /// left once those are set aside. A collateral push that still fails
    /// refunds the debt pull; if the refund fails as well the pulled amount is
    /// recorded as stranded and `RefundFailed` is returned.
    fn settle_two_legs(
        &mut self,
        payer: Address,
        debt: U256,
        payout: U256,
        closed: &PoolState,
    ) -> LedgerResult<()> {
        self.require_allowance(AssetKind::Loan, payer, debt)?;
        if closed.collateral_reserve(self.collateral.balance_of(self.contract)) < payout {
            return Err(LendingError::TransferFailed);
        }

        self.pull(AssetKind::Loan, payer, debt)?;
        if let Err(error) = self.push(AssetKind::Collateral, payer, payout) {
            if self.push(AssetKind::Loan, payer, debt).is_err() {
                let mut pool = self.store.pool();
                pool.stranded_refunds = add(pool.stranded_refunds, debt)?;
                self.store.set_pool(pool);
                return Err(LendingError::RefundFailed);
            }
            return Err(error);
        }
        Ok(())
    }
}

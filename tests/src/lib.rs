//! Collateral Lending Integration Tests
//!
//! End-to-end runs of the ledger core against the in-memory store, token
//! ledgers and clock.

#[cfg(test)]
mod harness {
    use collateral_lending_contracts::interest::PRICE_SCALE;
    use collateral_lending_contracts::ledger::LedgerCore;
    use collateral_lending_contracts::store::MemoryStore;
    use collateral_lending_contracts::testing::{account, InMemoryToken, ManualClock};
    use collateral_lending_contracts::types::RiskParameters;
    use odra::casper_types::U256;
    use odra::prelude::*;

    pub const START_BLOCK: u64 = 100;

    pub type Ledger = LedgerCore<MemoryStore, InMemoryToken, ManualClock>;

    pub struct Market {
        pub ledger: Ledger,
        pub loan: InMemoryToken,
        pub collateral: InMemoryToken,
        pub clock: ManualClock,
    }

    pub fn units(amount: u64) -> U256 {
        U256::from(amount)
    }

    pub fn parity() -> U256 {
        U256::from(PRICE_SCALE)
    }

    pub fn owner() -> Address {
        account(1)
    }

    pub fn lender() -> Address {
        account(2)
    }

    pub fn borrower() -> Address {
        account(3)
    }

    pub fn liquidator() -> Address {
        account(4)
    }

    pub fn default_params() -> RiskParameters {
        RiskParameters::new(500, 150, 120, 500)
    }

    impl Market {
        pub fn open() -> Self {
            let contract = account(200);
            let loan = InMemoryToken::new(contract);
            let collateral = InMemoryToken::new(contract);
            let clock = ManualClock::at(START_BLOCK);
            let mut ledger = LedgerCore::new(
                MemoryStore::new(),
                loan.clone(),
                collateral.clone(),
                clock.clone(),
                contract,
            );
            ledger
                .initialize(owner(), account(201), account(202), default_params())
                .unwrap();
            Self {
                ledger,
                loan,
                collateral,
                clock,
            }
        }

        pub fn contract(&self) -> Address {
            self.ledger.contract()
        }

        /// Mint loan tokens to `who` and approve the ledger for the same amount
        pub fn give_loan_tokens(&self, who: Address, amount: u64) {
            self.loan.mint(who, units(amount));
            self.loan.approve(who, self.contract(), units(amount));
        }

        pub fn give_collateral(&self, who: Address, amount: u64) {
            self.collateral.mint(who, units(amount));
            self.collateral.approve(who, self.contract(), units(amount));
        }

        pub fn supply(&mut self, who: Address, amount: u64) {
            self.give_loan_tokens(who, amount);
            self.ledger.deposit_liquidity(who, units(amount)).unwrap();
        }

        pub fn lock(&mut self, who: Address, amount: u64) {
            self.give_collateral(who, amount);
            self.ledger.deposit_collateral(who, units(amount)).unwrap();
        }

        /// `totalBorrowed <= totalLiquidity`, inactive positions carry no debt,
        /// and record sums match the pool totals.
        pub fn assert_invariants(&self) {
            let pool = self.ledger.pool();
            assert!(pool.total_borrowed <= pool.total_liquidity);
            for (_, position) in self.ledger.store().borrowers() {
                if !position.active {
                    assert!(position.debt.is_zero());
                    assert_eq!(position.borrow_block, 0);
                }
            }
            let lent: U256 = self
                .ledger
                .store()
                .borrowers()
                .filter(|(_, position)| position.active)
                .fold(U256::zero(), |total, (_, position)| total + position.debt);
            assert_eq!(lent, pool.total_borrowed);
            let supplied: U256 = self
                .ledger
                .store()
                .lenders()
                .fold(U256::zero(), |total, (_, lender)| total + lender.deposited);
            assert_eq!(supplied, pool.total_liquidity);
            let locked: U256 = self
                .ledger
                .store()
                .borrowers()
                .fold(U256::zero(), |total, (_, position)| total + position.collateral);
            assert_eq!(locked, pool.total_collateral);
            assert!(self.collateral.balance(self.contract()) >= pool.total_collateral);
        }
    }
}

#[cfg(test)]
mod scenario_tests {
    use super::harness::*;
    use collateral_lending_contracts::errors::LendingError;
    use collateral_lending_contracts::interest::{self, BLOCKS_PER_YEAR};
    use collateral_lending_contracts::interfaces::LedgerStore;
    use collateral_lending_contracts::types::{BorrowerInfo, BorrowerPosition};
    use odra::casper_types::U256;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_scenario_a_first_deposit() {
        let mut market = Market::open();
        market.supply(lender(), 10_000_000);

        assert_eq!(market.ledger.pool().total_liquidity, units(10_000_000));
        assert_eq!(market.ledger.pending_interest(lender()).unwrap(), U256::zero());
        market.assert_invariants();
    }

    #[test]
    fn test_scenario_b_borrow_within_ratio() {
        let mut market = Market::open();
        market.supply(lender(), 10_000_000);
        market.lock(borrower(), 5_000_000);

        let value = interest::collateral_value(units(5_000_000), parity()).unwrap();
        assert_eq!(interest::max_borrow(value, 150).unwrap(), units(3_333_333));

        let borrowed = market.ledger.borrow(borrower(), units(3_000_000), parity()).unwrap();
        assert_eq!(borrowed, units(3_000_000));
        assert_eq!(
            market.ledger.borrower_info(borrower()).unwrap(),
            BorrowerInfo {
                collateral: units(5_000_000),
                total_debt: units(3_000_000),
                borrow_block: START_BLOCK,
                active: true,
            }
        );
        market.assert_invariants();
    }

    #[test]
    fn test_scenario_b_borrow_exactly_max() {
        let mut market = Market::open();
        market.supply(lender(), 10_000_000);
        market.lock(borrower(), 5_000_000);

        assert!(market.ledger.borrow(borrower(), units(3_333_333), parity()).is_ok());
    }

    #[test]
    fn test_scenario_c_borrow_over_ratio() {
        let mut market = Market::open();
        market.supply(lender(), 10_000_000);
        market.lock(borrower(), 5_000_000);

        assert_eq!(
            market.ledger.borrow(borrower(), units(3_500_000), parity()),
            Err(LendingError::InsufficientCollateral)
        );
        assert_eq!(
            market.ledger.store().borrower(&borrower()).debt,
            U256::zero()
        );
    }

    #[test]
    fn test_scenario_d_interest_after_one_year() {
        let mut market = Market::open();
        market.supply(lender(), 10_000_000);
        market.lock(borrower(), 5_000_000);
        market.ledger.borrow(borrower(), units(3_000_000), parity()).unwrap();

        market.clock.advance(BLOCKS_PER_YEAR);

        assert_eq!(market.ledger.total_debt(borrower()).unwrap(), units(3_150_000));
        // Lenders earn the borrow rate scaled by 30% utilization
        assert_eq!(market.ledger.pending_interest(lender()).unwrap(), units(150_000));
    }

    #[test]
    fn test_scenario_e_liquidation() {
        let mut market = Market::open();
        market.supply(lender(), 10_000_000);
        market.lock(borrower(), 5_000_000);
        market.ledger.borrow(borrower(), units(3_000_000), parity()).unwrap();
        market.give_loan_tokens(liquidator(), 3_150_000);
        market.collateral.mint(market.contract(), units(250_000));
        market.clock.advance(BLOCKS_PER_YEAR);

        // 5,000,000 * 100 / 3,150,000 = 158% at parity
        assert_eq!(
            market.ledger.liquidate(liquidator(), borrower(), parity()),
            Err(LendingError::ThresholdNotBreached)
        );

        // Price 0.72: 3,600,000 * 100 / 3,150,000 = 114% < 120%
        let price = units(720_000);
        let receipt = market.ledger.liquidate(liquidator(), borrower(), price).unwrap();
        assert_eq!(receipt.total_debt, units(3_150_000));
        assert_eq!(receipt.interest, units(150_000));
        assert_eq!(receipt.collateral_payout, units(5_000_000 + 250_000));

        assert_eq!(market.collateral.balance(liquidator()), units(5_250_000));
        assert_eq!(market.loan.balance(liquidator()), U256::zero());
        assert_eq!(
            market.ledger.store().borrower(&borrower()),
            BorrowerPosition::default()
        );
        market.assert_invariants();
    }

    #[test]
    fn test_scenario_f_full_withdrawal() {
        let mut market = Market::open();
        market.supply(lender(), 10_000_000);
        market.lock(borrower(), 5_000_000);
        market.ledger.borrow(borrower(), units(3_000_000), parity()).unwrap();
        market.clock.advance(BLOCKS_PER_YEAR);

        // A top-up settles the year's interest at 30% utilization
        market.supply(lender(), 1_000);

        market.give_loan_tokens(borrower(), 150_000);
        market.loan.approve(borrower(), market.contract(), units(3_150_000));
        market.ledger.repay(borrower()).unwrap();

        let receipt = market.ledger.withdraw_liquidity(lender(), U256::zero()).unwrap();
        assert_eq!(receipt.principal, units(10_001_000));
        assert_eq!(receipt.interest, units(150_000));
        assert_eq!(market.loan.balance(lender()), units(10_151_000));

        let account = market.ledger.store().lender(&lender()).unwrap();
        assert_eq!(account.deposited, U256::zero());
        assert_eq!(account.accrued_interest, U256::zero());
        assert_eq!(market.loan.balance(market.contract()), U256::zero());
        market.assert_invariants();
    }
}

#[cfg(test)]
mod invariant_tests {
    use super::harness::*;
    use collateral_lending_contracts::errors::LendingError;
    use collateral_lending_contracts::interest::BLOCKS_PER_YEAR;
    use collateral_lending_contracts::testing::account;
    use collateral_lending_contracts::types::{PoolState, RiskParameters};
    use odra::casper_types::U256;
    use pretty_assertions::assert_eq;

    /// Balances of every party on both tokens
    fn balances(market: &Market) -> Vec<(U256, U256)> {
        [lender(), borrower(), liquidator(), market.contract()]
            .iter()
            .map(|who| (market.loan.balance(*who), market.collateral.balance(*who)))
            .collect()
    }

    #[test]
    fn test_invariants_hold_through_lifecycle() {
        let mut market = Market::open();
        let second_lender = account(5);
        let second_borrower = account(6);

        market.supply(lender(), 4_000_000);
        market.assert_invariants();
        market.supply(second_lender, 6_000_000);
        market.assert_invariants();

        market.lock(borrower(), 3_000_000);
        market.lock(second_borrower, 9_000_000);
        market.ledger.borrow(borrower(), units(2_000_000), parity()).unwrap();
        market.assert_invariants();
        market.ledger.borrow(second_borrower, units(6_000_000), parity()).unwrap();
        market.assert_invariants();

        // Only 2,000,000 is idle
        assert_eq!(
            market.ledger.withdraw_liquidity(second_lender, units(2_000_001)),
            Err(LendingError::InsufficientPoolLiquidity)
        );
        market.ledger.withdraw_liquidity(second_lender, units(2_000_000)).unwrap();
        market.assert_invariants();

        market.clock.advance(BLOCKS_PER_YEAR / 2);
        market.give_loan_tokens(borrower(), 2_100_000);
        market.ledger.repay(borrower()).unwrap();
        market.assert_invariants();

        assert_eq!(market.ledger.pool().total_borrowed, units(6_000_000));
        assert_eq!(market.ledger.pool().total_liquidity, units(8_000_000));
    }

    #[test]
    fn test_lender_payouts_covered_by_borrower_payments() {
        let mut market = Market::open();
        market.supply(lender(), 10_000_000);
        market.lock(borrower(), 5_000_000);
        market.ledger.borrow(borrower(), units(3_000_000), parity()).unwrap();
        market.clock.advance(BLOCKS_PER_YEAR);
        market.supply(lender(), 1);

        market.give_loan_tokens(borrower(), 3_150_000);
        market.ledger.repay(borrower()).unwrap();
        market.ledger.withdraw_liquidity(lender(), U256::zero()).unwrap();

        let pool = market.ledger.pool();
        assert!(pool.interest_paid <= pool.interest_collected);
        assert_eq!(pool.total_liquidity, U256::zero());
        // Supplied 10,000,001 and collected 150,000 in interest; all of it paid back
        assert_eq!(market.loan.balance(lender()), units(10_150_001));
    }

    #[test]
    fn test_failed_liquidation_leg_changes_nothing() {
        let mut market = Market::open();
        market.supply(lender(), 10_000_000);
        market.lock(borrower(), 5_000_000);
        market.ledger.borrow(borrower(), units(3_000_000), parity()).unwrap();
        market.give_loan_tokens(liquidator(), 3_000_000);
        market.collateral.mint(market.contract(), units(250_000));

        let before = balances(&market);
        let pool_before = market.ledger.pool();
        market.collateral.fail_transfers(true);

        assert_eq!(
            market.ledger.liquidate(liquidator(), borrower(), units(700_000)),
            Err(LendingError::TransferFailed)
        );
        assert_eq!(balances(&market), before);
        assert_eq!(market.ledger.pool(), pool_before);
        assert!(market.ledger.borrower_info(borrower()).unwrap().active);
    }

    #[test]
    fn test_liquidation_leaves_other_collateral_redeemable() {
        let mut market = Market::open();
        let second_borrower = account(6);
        market.supply(lender(), 10_000_000);
        market.lock(borrower(), 5_000_000);
        market.lock(second_borrower, 1_000_000);
        market.ledger.borrow(borrower(), units(3_000_000), parity()).unwrap();
        market.ledger.borrow(second_borrower, units(500_000), parity()).unwrap();
        market.give_loan_tokens(liquidator(), 3_000_000);

        // No reserve for the bonus yet
        assert_eq!(
            market.ledger.liquidate(liquidator(), borrower(), units(700_000)),
            Err(LendingError::TransferFailed)
        );
        market.assert_invariants();

        market.collateral.mint(market.contract(), units(250_000));
        market.ledger.liquidate(liquidator(), borrower(), units(700_000)).unwrap();
        market.assert_invariants();

        market.give_loan_tokens(second_borrower, 500_000);
        let receipt = market.ledger.repay(second_borrower).unwrap();
        assert_eq!(receipt.collateral_returned, units(1_000_000));
        assert_eq!(market.collateral.balance(second_borrower), units(1_000_000));
        assert_eq!(market.collateral.balance(market.contract()), U256::zero());
        market.assert_invariants();
    }

    #[test]
    fn test_failed_refund_is_recorded() {
        let mut market = Market::open();
        market.supply(lender(), 10_000_000);
        market.lock(borrower(), 5_000_000);
        market.ledger.borrow(borrower(), units(3_000_000), parity()).unwrap();
        market.loan.approve(borrower(), market.contract(), units(3_000_000));
        market.loan.fail_transfers(true);
        market.collateral.fail_transfers(true);

        assert_eq!(market.ledger.repay(borrower()), Err(LendingError::RefundFailed));
        let pool = market.ledger.pool();
        assert_eq!(pool.stranded_refunds, units(3_000_000));
        assert_eq!(
            market.loan.balance(market.contract()),
            pool.total_liquidity - pool.total_borrowed + pool.stranded_refunds
        );
        market.assert_invariants();
    }

    #[test]
    fn test_failed_repay_leg_changes_nothing() {
        let mut market = Market::open();
        market.supply(lender(), 10_000_000);
        market.lock(borrower(), 5_000_000);
        market.ledger.borrow(borrower(), units(3_000_000), parity()).unwrap();
        market.loan.approve(borrower(), market.contract(), units(3_000_000));

        let before = balances(&market);
        market.collateral.fail_transfers(true);

        assert_eq!(market.ledger.repay(borrower()), Err(LendingError::TransferFailed));
        assert_eq!(balances(&market), before);
        assert_eq!(market.ledger.pool().total_borrowed, units(3_000_000));
    }

    #[test]
    fn test_update_parameters_is_idempotent() {
        let mut market = Market::open();
        let params = RiskParameters::new(700, 175, 125, 800);

        let first = market.ledger.update_parameters(owner(), params).unwrap();
        let second = market.ledger.update_parameters(owner(), params).unwrap();
        assert_eq!(first, second);
        assert_eq!(market.ledger.config().unwrap().owner, owner());
        assert_eq!(market.ledger.pool(), PoolState::default());
    }

    #[test]
    fn test_new_parameters_apply_to_open_loans() {
        let mut market = Market::open();
        market.supply(lender(), 10_000_000);
        market.lock(borrower(), 5_000_000);
        market.ledger.borrow(borrower(), units(3_000_000), parity()).unwrap();

        market
            .ledger
            .update_parameters(owner(), RiskParameters::new(1_000, 150, 120, 500))
            .unwrap();
        market.clock.advance(BLOCKS_PER_YEAR);

        assert_eq!(market.ledger.total_debt(borrower()).unwrap(), units(3_300_000));
    }
}

#[cfg(test)]
mod router_tests {
    use super::harness::*;
    use collateral_lending_contracts::errors::LendingError;
    use collateral_lending_contracts::router::{Call, CallOutput, Method};
    use collateral_lending_contracts::types::{AssetKind, LiquidityWithdrawal};
    use odra::casper_types::U256;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_unknown_method_name() {
        assert_eq!(Method::from_name("swap"), Err(LendingError::UnknownMethod));
        assert_eq!(Method::from_name("repay "), Err(LendingError::UnknownMethod));
    }

    #[test]
    fn test_named_calls_drive_the_ledger() {
        let mut market = Market::open();
        market.give_loan_tokens(lender(), 5_000);

        assert_eq!(Method::from_name("depositLiquidity"), Ok(Method::DepositLiquidity));
        let output = market
            .ledger
            .execute(lender(), Call::DepositLiquidity { amount: units(5_000) })
            .unwrap();
        assert_eq!(output, CallOutput::Bool(true));

        let allowance = market
            .ledger
            .execute(
                lender(),
                Call::CheckAllowance {
                    asset: AssetKind::Loan,
                    owner: lender(),
                },
            )
            .unwrap();
        assert_eq!(allowance, CallOutput::Amount(U256::zero()));

        let output = market
            .ledger
            .execute(lender(), Call::WithdrawLiquidity { amount: U256::zero() })
            .unwrap();
        assert_eq!(
            output,
            CallOutput::Withdrawal(LiquidityWithdrawal {
                principal: units(5_000),
                interest: U256::zero(),
            })
        );
    }
}

//! In-memory collaborators for running the ledger core off-chain.
//!
//! `InMemoryToken` is a fake token ledger with switches that make transfers
//! report failure; `ManualClock` is a block counter moved by hand. Both are
//! cheap handles over shared state so a test can keep one copy while the
//! ledger owns another.

use alloc::collections::BTreeMap;
use alloc::rc::Rc;
use core::cell::{Cell, RefCell};
use odra::prelude::*;
use odra::casper_types::account::AccountHash;
use odra::casper_types::U256;
use crate::interfaces::{Clock, TokenTransferPort};

/// Deterministic account address for tests
pub fn account(seed: u8) -> Address {
    Address::Account(AccountHash::new([seed; 32]))
}

#[derive(Debug, Default)]
struct TokenBook {
    balances: BTreeMap<Address, U256>,
    allowances: BTreeMap<(Address, Address), U256>,
    fail_transfers: bool,
    fail_transfer_from: bool,
}

/// Fake token ledger; `holder` is the account `transfer` spends from.
#[derive(Debug, Clone)]
pub struct InMemoryToken {
    holder: Address,
    book: Rc<RefCell<TokenBook>>,
}

impl InMemoryToken {
    pub fn new(holder: Address) -> Self {
        Self {
            holder,
            book: Rc::new(RefCell::new(TokenBook::default())),
        }
    }

    pub fn mint(&self, to: Address, amount: U256) {
        let mut book = self.book.borrow_mut();
        let balance = book.balances.entry(to).or_default();
        *balance = *balance + amount;
    }

    pub fn approve(&self, owner: Address, spender: Address, amount: U256) {
        self.book.borrow_mut().allowances.insert((owner, spender), amount);
    }

    pub fn balance(&self, account: Address) -> U256 {
        self.book.borrow().balances.get(&account).copied().unwrap_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.book
            .borrow()
            .balances
            .values()
            .fold(U256::zero(), |total, balance| total + *balance)
    }

    /// Make `transfer` report failure
    pub fn fail_transfers(&self, failing: bool) {
        self.book.borrow_mut().fail_transfers = failing;
    }

    /// Make `transfer_from` report failure
    pub fn fail_transfer_from(&self, failing: bool) {
        self.book.borrow_mut().fail_transfer_from = failing;
    }

    fn move_balance(book: &mut TokenBook, from: Address, to: Address, amount: U256) -> bool {
        let from_balance = book.balances.get(&from).copied().unwrap_or_default();
        if from_balance < amount {
            return false;
        }
        book.balances.insert(from, from_balance - amount);
        let to_balance = book.balances.entry(to).or_default();
        *to_balance = *to_balance + amount;
        true
    }
}

impl TokenTransferPort for InMemoryToken {
    fn transfer_from(&mut self, owner: Address, spender: Address, to: Address, amount: U256) -> bool {
        let mut book = self.book.borrow_mut();
        if book.fail_transfer_from {
            return false;
        }
        let allowance = book.allowances.get(&(owner, spender)).copied().unwrap_or_default();
        if allowance < amount {
            return false;
        }
        if !Self::move_balance(&mut book, owner, to, amount) {
            return false;
        }
        book.allowances.insert((owner, spender), allowance - amount);
        true
    }

    fn transfer(&mut self, to: Address, amount: U256) -> bool {
        let mut book = self.book.borrow_mut();
        if book.fail_transfers {
            return false;
        }
        let holder = self.holder;
        Self::move_balance(&mut book, holder, to, amount)
    }

    fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.book.borrow().allowances.get(&(owner, spender)).copied().unwrap_or_default()
    }

    fn balance_of(&self, account: Address) -> U256 {
        self.balance(account)
    }
}

/// Block counter under test control
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    block: Rc<Cell<u64>>,
}

impl ManualClock {
    pub fn at(block: u64) -> Self {
        Self {
            block: Rc::new(Cell::new(block)),
        }
    }

    pub fn advance(&self, blocks: u64) {
        self.block.set(self.block.get() + blocks);
    }
}

impl Clock for ManualClock {
    fn current_block(&self) -> u64 {
        self.block.get()
    }
}

//! Minimal CEP-18 token for exercising the pool in the Odra test VM.
//!
//! Transfers report failure with `false` instead of reverting, and
//! `set_failing` forces that outcome, so callers' handling of a failed
//! transfer can be driven from tests.

use odra::prelude::*;
use odra::casper_types::U256;

#[odra::module]
pub struct MockToken {
    balances: Mapping<Address, U256>,
    allowances: Mapping<(Address, Address), U256>,
    total_supply: Var<U256>,
    fail_transfer: Var<bool>,
    fail_transfer_from: Var<bool>,
}

#[odra::module]
impl MockToken {
    pub fn balance_of(&self, address: Address) -> U256 {
        self.balances.get(&address).unwrap_or_default()
    }

    pub fn allowance(&self, owner: Address, spender: Address) -> U256 {
        self.allowances.get(&(owner, spender)).unwrap_or_default()
    }

    pub fn total_supply(&self) -> U256 {
        self.total_supply.get_or_default()
    }

    pub fn mint(&mut self, to: Address, amount: U256) {
        let supply = self.total_supply();
        self.total_supply.set(supply + amount);
        let balance = self.balance_of(to);
        self.balances.set(&to, balance + amount);
    }

    pub fn approve(&mut self, spender: Address, amount: U256) -> bool {
        let owner = self.env().caller();
        self.allowances.set(&(owner, spender), amount);
        true
    }

    pub fn transfer(&mut self, recipient: Address, amount: U256) -> bool {
        if self.fail_transfer.get_or_default() {
            return false;
        }
        let sender = self.env().caller();
        self.move_balance(sender, recipient, amount)
    }

    pub fn transfer_from(&mut self, owner: Address, recipient: Address, amount: U256) -> bool {
        if self.fail_transfer_from.get_or_default() {
            return false;
        }
        let spender = self.env().caller();
        let allowance = self.allowance(owner, spender);
        if allowance < amount {
            return false;
        }
        if !self.move_balance(owner, recipient, amount) {
            return false;
        }
        self.allowances.set(&(owner, spender), allowance - amount);
        true
    }

    /// Force `transfer` and `transfer_from` to report failure
    pub fn set_failing(&mut self, transfer: bool, transfer_from: bool) {
        self.fail_transfer.set(transfer);
        self.fail_transfer_from.set(transfer_from);
    }

    fn move_balance(&mut self, from: Address, to: Address, amount: U256) -> bool {
        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return false;
        }
        self.balances.set(&from, from_balance - amount);
        let to_balance = self.balance_of(to);
        self.balances.set(&to, to_balance + amount);
        true
    }
}

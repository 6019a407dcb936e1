//! Seams between the ledger core and its host.
//!
//! The core never touches storage, tokens or time directly; it goes through
//! these traits so the same transitions run inside the Odra contract and
//! against in-memory fakes.

use odra::prelude::*;
use odra::casper_types::U256;
use crate::errors::LendingError;
use crate::types::{BorrowerPosition, LenderAccount, PoolState, ProtocolConfig};

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LendingError>;

/// External token ledger for one asset.
///
/// Transfer methods report success as a boolean; `false` is a failed transfer.
pub trait TokenTransferPort {
    /// Move `amount` from `owner` to `to` using the allowance granted to `spender`
    fn transfer_from(&mut self, owner: Address, spender: Address, to: Address, amount: U256) -> bool;
    /// Move `amount` from the ledger's own balance to `to`
    fn transfer(&mut self, to: Address, amount: U256) -> bool;
    fn allowance(&self, owner: Address, spender: Address) -> U256;
    fn balance_of(&self, account: Address) -> U256;
}

/// Monotonic block counter
pub trait Clock {
    fn current_block(&self) -> u64;
}

/// Persistent ledger state, addressed by record kind and account key.
pub trait LedgerStore {
    fn config(&self) -> Option<ProtocolConfig>;
    fn set_config(&mut self, config: ProtocolConfig);

    fn pool(&self) -> PoolState;
    fn set_pool(&mut self, pool: PoolState);

    fn lender(&self, account: &Address) -> Option<LenderAccount>;
    fn set_lender(&mut self, account: &Address, lender: LenderAccount);

    /// Missing positions read as the default (inactive, empty) position.
    fn borrower(&self, account: &Address) -> BorrowerPosition;
    fn set_borrower(&mut self, account: &Address, position: BorrowerPosition);
}

impl<S: LedgerStore + ?Sized> LedgerStore for &mut S {
    fn config(&self) -> Option<ProtocolConfig> {
        (**self).config()
    }

    fn set_config(&mut self, config: ProtocolConfig) {
        (**self).set_config(config)
    }

    fn pool(&self) -> PoolState {
        (**self).pool()
    }

    fn set_pool(&mut self, pool: PoolState) {
        (**self).set_pool(pool)
    }

    fn lender(&self, account: &Address) -> Option<LenderAccount> {
        (**self).lender(account)
    }

    fn set_lender(&mut self, account: &Address, lender: LenderAccount) {
        (**self).set_lender(account, lender)
    }

    fn borrower(&self, account: &Address) -> BorrowerPosition {
        (**self).borrower(account)
    }

    fn set_borrower(&mut self, account: &Address, position: BorrowerPosition) {
        (**self).set_borrower(account, position)
    }
}

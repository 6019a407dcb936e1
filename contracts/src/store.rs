//! In-memory ledger store.

use alloc::collections::BTreeMap;
use odra::prelude::*;
use crate::interfaces::LedgerStore;
use crate::types::{BorrowerPosition, LenderAccount, PoolState, ProtocolConfig};

/// `LedgerStore` backed by ordered maps, for off-chain hosts and tests.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    config: Option<ProtocolConfig>,
    pool: PoolState,
    lenders: BTreeMap<Address, LenderAccount>,
    borrowers: BTreeMap<Address, BorrowerPosition>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lenders(&self) -> impl Iterator<Item = (&Address, &LenderAccount)> {
        self.lenders.iter()
    }

    pub fn borrowers(&self) -> impl Iterator<Item = (&Address, &BorrowerPosition)> {
        self.borrowers.iter()
    }
}

impl LedgerStore for MemoryStore {
    fn config(&self) -> Option<ProtocolConfig> {
        self.config.clone()
    }

    fn set_config(&mut self, config: ProtocolConfig) {
        self.config = Some(config);
    }

    fn pool(&self) -> PoolState {
        self.pool.clone()
    }

    fn set_pool(&mut self, pool: PoolState) {
        self.pool = pool;
    }

    fn lender(&self, account: &Address) -> Option<LenderAccount> {
        self.lenders.get(account).cloned()
    }

    fn set_lender(&mut self, account: &Address, lender: LenderAccount) {
        self.lenders.insert(*account, lender);
    }

    fn borrower(&self, account: &Address) -> BorrowerPosition {
        self.borrowers.get(account).cloned().unwrap_or_default()
    }

    fn set_borrower(&mut self, account: &Address, position: BorrowerPosition) {
        self.borrowers.insert(*account, position);
    }
}

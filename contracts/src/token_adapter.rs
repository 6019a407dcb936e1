//! Casper bindings for the ledger's external seams.
//!
//! `Cep18Port` forwards token calls to a CEP-18 contract through
//! `call_contract`; `BlockClock` turns block time into the block counter the
//! interest formulas run on.

use odra::prelude::*;
use odra::casper_types::{U256, runtime_args};
use odra::{CallDef, ContractEnv};
use crate::interest::BLOCKS_PER_YEAR;
use crate::interfaces::{Clock, TokenTransferPort};

/// Block cadence behind `BLOCKS_PER_YEAR`: 10 minutes
pub const BLOCK_INTERVAL_MS: u64 = 600_000;

const _: () = assert!(BLOCK_INTERVAL_MS * BLOCKS_PER_YEAR == 365 * 24 * 60 * 60 * 1000);

/// CEP-18 token contract seen from the calling contract.
///
/// `transfer_from` spends the caller's allowance, so the `spender` argument of
/// the port is implied by the calling contract itself.
pub struct Cep18Port {
    env: Rc<ContractEnv>,
    token: Address,
}

impl Cep18Port {
    pub fn new(env: Rc<ContractEnv>, token: Address) -> Self {
        Self { env, token }
    }
}

impl TokenTransferPort for Cep18Port {
    fn transfer_from(&mut self, owner: Address, _spender: Address, to: Address, amount: U256) -> bool {
        let args = runtime_args! {
            "owner" => owner,
            "recipient" => to,
            "amount" => amount,
        };
        let call_def = CallDef::new("transfer_from", true, args);
        self.env.call_contract(self.token, call_def)
    }

    fn transfer(&mut self, to: Address, amount: U256) -> bool {
        let args = runtime_args! {
            "recipient" => to,
            "amount" => amount,
        };
        let call_def = CallDef::new("transfer", true, args);
        self.env.call_contract(self.token, call_def)
    }

    fn allowance(&self, owner: Address, spender: Address) -> U256 {
        let args = runtime_args! {
            "owner" => owner,
            "spender" => spender,
        };
        let call_def = CallDef::new("allowance", false, args);
        self.env.call_contract(self.token, call_def)
    }

    fn balance_of(&self, account: Address) -> U256 {
        let args = runtime_args! { "address" => account };
        let call_def = CallDef::new("balance_of", false, args);
        self.env.call_contract(self.token, call_def)
    }
}

/// Block counter derived from Casper block time
pub struct BlockClock {
    env: Rc<ContractEnv>,
}

impl BlockClock {
    pub fn new(env: Rc<ContractEnv>) -> Self {
        Self { env }
    }

    pub fn block_at(block_time_ms: u64) -> u64 {
        block_time_ms / BLOCK_INTERVAL_MS
    }
}

impl Clock for BlockClock {
    fn current_block(&self) -> u64 {
        Self::block_at(self.env.get_block_time())
    }
}

#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![cfg_attr(feature = "fail-on-warnings", deny(clippy::all))]

pub mod account;
pub mod clock;
pub mod db_op;
pub mod exchange;
pub mod invoice;
mod ledger;
pub mod lifecycle;
pub mod migrate;
pub mod policy;
pub mod processor;
pub mod request;

pub use ledger::*;

pub mod primitives {
    pub use bank_types::primitives::*;
    pub use bank_types::transaction::{Direction, InvalidTransaction, Transaction};
}

pub use primitives::*;

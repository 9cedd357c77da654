use thiserror::Error;

use bank_ledger::error::LedgerError;

#[derive(Error, Debug)]
pub enum MaintenanceError {
    #[error("MaintenanceError - LedgerError: {0}")]
    LedgerError(#[from] LedgerError),
}

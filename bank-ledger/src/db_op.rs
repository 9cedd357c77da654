use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres, Transaction};
use tracing::instrument;

use crate::clock::ClockHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IsolationLevel {
    #[default]
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

impl IsolationLevel {
    fn set_transaction_sql(&self) -> &'static str {
        match self {
            IsolationLevel::ReadCommitted => "SET TRANSACTION ISOLATION LEVEL READ COMMITTED",
            IsolationLevel::RepeatableRead => "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ",
            IsolationLevel::Serializable => "SET TRANSACTION ISOLATION LEVEL SERIALIZABLE",
        }
    }
}

const SERIALIZATION_FAILURE: &str = "40001";

/// True when Postgres aborted the transaction because a concurrent one won the row.
pub fn is_serialization_failure(e: &sqlx::Error) -> bool {
    match e {
        sqlx::Error::Database(db) => db.code().as_deref() == Some(SERIALIZATION_FAILURE),
        _ => false,
    }
}

/// A database transaction scoped to one ledger operation.
///
/// Store operations take `&mut DbOp` and never commit on their own.
/// Dropping the op without calling [`DbOp::commit`] rolls everything back.
pub struct DbOp<'t> {
    tx: Transaction<'t, Postgres>,
    isolation: IsolationLevel,
    now: DateTime<Utc>,
}

impl DbOp<'static> {
    #[instrument(name = "bank_ledger.db_op.init", skip(pool, clock), err)]
    pub async fn init(
        pool: &PgPool,
        isolation: IsolationLevel,
        clock: &ClockHandle,
    ) -> Result<Self, sqlx::Error> {
        let mut tx = pool.begin().await?;
        // must be the first statement of the transaction
        sqlx::query(isolation.set_transaction_sql())
            .execute(&mut *tx)
            .await?;
        Ok(Self {
            tx,
            isolation,
            now: clock.now(),
        })
    }
}

impl<'t> DbOp<'t> {
    pub fn now(&self) -> DateTime<Utc> {
        self.now
    }

    pub fn isolation(&self) -> IsolationLevel {
        self.isolation
    }

    pub fn as_executor(&mut self) -> &mut PgConnection {
        &mut self.tx
    }

    pub async fn commit(self) -> Result<(), sqlx::Error> {
        self.tx.commit().await?;
        Ok(())
    }

    pub async fn rollback(self) -> Result<(), sqlx::Error> {
        self.tx.rollback().await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn isolation_statements() {
        assert_eq!(IsolationLevel::default(), IsolationLevel::ReadCommitted);
        assert!(IsolationLevel::Serializable
            .set_transaction_sql()
            .ends_with("SERIALIZABLE"));
        assert!(IsolationLevel::RepeatableRead
            .set_transaction_sql()
            .ends_with("REPEATABLE READ"));
    }

    #[test]
    fn pool_errors_are_not_serialization_failures() {
        assert!(!is_serialization_failure(&sqlx::Error::PoolTimedOut));
        assert!(!is_serialization_failure(&sqlx::Error::RowNotFound));
    }
}

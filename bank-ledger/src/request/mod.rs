//! Account opening [Request]s and their one-way `considered` flag.
mod entity;
pub mod error;
mod repo;

use sqlx::PgPool;
use tracing::instrument;

use crate::{clock::ClockHandle, db_op::DbOp, primitives::*};

pub use entity::*;
use error::*;
use repo::*;

#[derive(Clone)]
pub struct Requests {
    repo: RequestRepo,
    pool: PgPool,
    clock: ClockHandle,
}

impl Requests {
    pub(crate) fn new(pool: &PgPool, clock: &ClockHandle) -> Self {
        Self {
            repo: RequestRepo::new(pool),
            pool: pool.clone(),
            clock: clock.clone(),
        }
    }

    #[instrument(name = "bank_ledger.requests.create", skip(self), err)]
    pub async fn create(&self, new_request: NewRequest) -> Result<Request, RequestError> {
        self.repo
            .create(&self.pool, &new_request, self.clock.now())
            .await
    }

    #[instrument(name = "bank_ledger.requests.find_by_id", skip(self), err)]
    pub async fn find_by_id(&self, id: RequestId) -> Result<Request, RequestError> {
        self.repo.find_by_id(id).await
    }

    pub async fn find_for_update_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: RequestId,
    ) -> Result<Request, RequestError> {
        self.repo.find_for_update_in_op(op, id).await
    }

    #[instrument(name = "bank_ledger.requests.mark_considered_in_op", skip(self, op), err)]
    pub async fn mark_considered_in_op(
        &self,
        op: &mut DbOp<'_>,
        id: RequestId,
    ) -> Result<(), RequestError> {
        self.repo.mark_considered_in_op(op, id).await
    }

    #[instrument(name = "bank_ledger.requests.list_pending", skip(self), err)]
    pub async fn list_pending(&self) -> Result<Vec<Request>, RequestError> {
        self.repo.list_pending().await
    }

    #[instrument(name = "bank_ledger.requests.list_for_requester", skip(self), err)]
    pub async fn list_for_requester(
        &self,
        requester_id: UserId,
    ) -> Result<Vec<Request>, RequestError> {
        self.repo.list_for_requester(requester_id).await
    }
}

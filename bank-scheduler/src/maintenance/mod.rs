//! Periodic sweep over the active accounts: blocks the expired ones and
//! compounds interest on deposits.
mod config;
pub mod error;

use chrono::NaiveDate;
use tracing::instrument;

use bank_ledger::{account::AccountValues, clock::ClockController, primitives::*, BankLedger};

pub use config::*;
use error::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MaintenanceAction {
    Block(AccountId),
    Accrue(AccountId),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepSummary {
    pub blocked: usize,
    pub accrued: usize,
    pub failed: usize,
}

/// Decides what to do with each account of a snapshot. Expiry wins over accrual.
pub fn plan<'a>(
    accounts: impl IntoIterator<Item = &'a AccountValues>,
    today: NaiveDate,
    config: &MaintenanceConfig,
) -> Vec<MaintenanceAction> {
    accounts
        .into_iter()
        .filter(|account| account.status == Status::Active)
        .filter_map(|account| {
            if account.is_expired(today) {
                config
                    .block_expired
                    .then_some(MaintenanceAction::Block(account.id))
            } else if account.policy.kind() == AccountKind::Deposit {
                config
                    .accrue_deposits
                    .then_some(MaintenanceAction::Accrue(account.id))
            } else {
                None
            }
        })
        .collect()
}

pub struct MaintenanceJob {
    ledger: BankLedger,
    config: MaintenanceConfig,
    sim_time: Option<ClockController>,
}

impl MaintenanceJob {
    pub fn new(ledger: BankLedger, config: MaintenanceConfig) -> Self {
        Self {
            ledger,
            config,
            sim_time: None,
        }
    }

    /// Moves simulated time forward by one poll interval after every sweep.
    pub fn with_sim_time(mut self, ctrl: ClockController) -> Self {
        self.sim_time = Some(ctrl);
        self
    }

    /// Single pass over the active accounts. A failing account is logged and skipped.
    #[instrument(
        name = "bank_scheduler.maintenance.sweep",
        skip(self),
        fields(n_accounts, n_blocked, n_accrued, n_failed),
        err
    )]
    pub async fn sweep(&self) -> Result<SweepSummary, MaintenanceError> {
        let today = self.ledger.clock().today();
        let accounts = self.ledger.get_active_accounts().await?;
        let span = tracing::Span::current();
        span.record("n_accounts", accounts.len());

        let mut summary = SweepSummary::default();
        for action in plan(accounts.iter().map(|a| a.values()), today, &self.config) {
            match action {
                MaintenanceAction::Block(id) => match self.ledger.block_account(id).await {
                    Ok(()) => summary.blocked += 1,
                    Err(e) => {
                        tracing::warn!(account_id = %id, error = %e, "could not block expired account");
                        summary.failed += 1;
                    }
                },
                MaintenanceAction::Accrue(id) => {
                    match self.ledger.accrue_deposit_interest(id).await {
                        Ok(Some(_)) => summary.accrued += 1,
                        Ok(None) => (),
                        Err(e) => {
                            tracing::warn!(account_id = %id, error = %e, "could not accrue interest");
                            summary.failed += 1;
                        }
                    }
                }
            }
        }
        span.record("n_blocked", summary.blocked);
        span.record("n_accrued", summary.accrued);
        span.record("n_failed", summary.failed);
        Ok(summary)
    }

    pub async fn run(self) {
        loop {
            if let Err(e) = self.sweep().await {
                tracing::error!(error = %e, "maintenance sweep failed");
            }
            tokio::time::sleep(self.config.poll_interval).await;
            if let Some(ctrl) = self.sim_time.as_ref() {
                ctrl.advance(self.config.poll_interval).await;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;
    use rust_decimal_macros::dec;

    use bank_types::account::AccountPolicy;

    use super::*;

    fn account(id: i64, policy: AccountPolicy, expires_end: Option<NaiveDate>) -> AccountValues {
        AccountValues {
            id: AccountId::from(id),
            balance: dec!(100),
            currency: Currency::Usd,
            expires_end,
            status: Status::Active,
            holders: vec![UserId::from(1)],
            policy,
            last_accrued_at: Utc::now(),
            created_at: Utc::now(),
        }
    }

    fn deposit() -> AccountPolicy {
        AccountPolicy::Deposit {
            deposit_rate: dec!(0.01),
            update_period: 30,
        }
    }

    #[test]
    fn blocks_expired_and_accrues_deposits() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let yesterday = NaiveDate::from_ymd_opt(2025, 5, 31).unwrap();
        let accounts = [
            account(1, AccountPolicy::Ordinary, Some(yesterday)),
            account(2, AccountPolicy::Ordinary, Some(today)),
            account(3, deposit(), None),
            account(4, deposit(), Some(yesterday)),
            account(5, AccountPolicy::Ordinary, None),
        ];

        let actions = plan(&accounts, today, &MaintenanceConfig::default());
        assert_eq!(
            actions,
            vec![
                MaintenanceAction::Block(AccountId::from(1)),
                MaintenanceAction::Accrue(AccountId::from(3)),
                MaintenanceAction::Block(AccountId::from(4)),
            ]
        );
    }

    #[test]
    fn respects_disabled_tasks() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let accounts = [
            account(1, AccountPolicy::Ordinary, NaiveDate::from_ymd_opt(2025, 1, 1)),
            account(2, deposit(), None),
        ];
        let config = MaintenanceConfig {
            block_expired: false,
            ..Default::default()
        };
        assert_eq!(
            plan(&accounts, today, &config),
            vec![MaintenanceAction::Accrue(AccountId::from(2))]
        );
    }

    #[test]
    fn skips_non_active_accounts() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let mut blocked = account(1, deposit(), NaiveDate::from_ymd_opt(2025, 1, 1));
        blocked.status = Status::Blocked;
        assert!(plan([&blocked], today, &MaintenanceConfig::default()).is_empty());
    }
}

#![allow(dead_code)]
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use bank_ledger::{account::*, exchange::StaticExchangeRates, *};

pub async fn init_pool() -> anyhow::Result<sqlx::PgPool> {
    let pg_host = std::env::var("PG_HOST").unwrap_or("localhost".to_string());
    let pg_con = format!("postgres://user:password@{pg_host}:5432/pg");
    let pool = sqlx::PgPool::connect(&pg_con).await?;
    Ok(pool)
}

pub async fn init_ledger() -> anyhow::Result<BankLedger> {
    let pool = init_pool().await?;
    let rates = StaticExchangeRates::new()
        .with_rate(Currency::Eur, Currency::Usd, dec!(1.08335))?
        .with_rate(Currency::Uah, Currency::Usd, dec!(0.0243))?;
    let ledger = BankLedger::init(
        BankLedgerConfig::builder()
            .pool(pool)
            .exec_migrations(true)
            .exchange_rates(rates)
            .build()?,
    )
    .await?;
    Ok(ledger)
}

pub fn random_user() -> UserId {
    UserId::from(i64::from(rand::random::<u32>()))
}

pub fn ordinary_account(balance: Decimal) -> NewAccount {
    NewAccount::builder()
        .balance(balance)
        .currency(Currency::Usd)
        .build()
        .unwrap()
}

pub fn credit_account(credit_rate: Decimal, credit_limit: Decimal) -> NewAccount {
    NewAccount::builder()
        .currency(Currency::Usd)
        .policy(AccountPolicy::Credit {
            credit_rate,
            credit_limit,
        })
        .build()
        .unwrap()
}

pub fn gbp_account(balance: Decimal) -> NewAccount {
    NewAccount::builder()
        .balance(balance)
        .currency(Currency::Gbp)
        .build()
        .unwrap()
}

/// A balance unlikely to be shared with any other test's account.
pub fn marker_balance() -> Decimal {
    Decimal::new(i64::from(rand::random::<u32>()), 2) + Decimal::ONE
}

pub fn usd(amount: Decimal) -> Transaction {
    Transaction::new(amount, Currency::Usd, chrono::Utc::now()).unwrap()
}

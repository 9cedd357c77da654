mod helpers;

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use bank_ledger::{account::*, error::ErrorKind, request::NewRequest, *};

#[tokio::test]
async fn opened_account_is_listed_for_user() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger().await?;
    let user = helpers::random_user();

    let id = ledger
        .open_account(user, helpers::ordinary_account(dec!(125.50)))
        .await?;

    let accounts = ledger.get_user_accounts(user).await?;
    let account = accounts
        .iter()
        .find(|a| a.id() == id)
        .expect("account not listed");
    assert_eq!(account.balance(), dec!(125.50));
    assert_eq!(account.currency(), Currency::Usd);
    assert_eq!(account.status(), Status::Active);
    assert_eq!(account.holders(), &[user]);
    Ok(())
}

#[tokio::test]
async fn completing_a_request_twice_fails() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger().await?;
    let requester = helpers::random_user();
    let request = ledger
        .request_opening(
            NewRequest::builder()
                .requester_id(requester)
                .currency(Currency::Usd)
                .build()?,
        )
        .await?;

    let first = ledger
        .complete_opening_request(request.id(), helpers::ordinary_account(Decimal::ZERO))
        .await?;
    let err = ledger
        .complete_opening_request(request.id(), helpers::ordinary_account(Decimal::ZERO))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyConsidered);

    let accounts = ledger.get_user_accounts(requester).await?;
    assert_eq!(accounts.len(), 1);
    assert_eq!(accounts[0].id(), first);
    assert!(ledger.requests().find_by_id(request.id()).await?.is_considered());
    Ok(())
}

#[tokio::test]
async fn rejected_request_opens_nothing() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger().await?;
    let requester = helpers::random_user();
    let request = ledger
        .request_opening(
            NewRequest::builder()
                .requester_id(requester)
                .currency(Currency::Eur)
                .policy(AccountPolicy::Deposit {
                    deposit_rate: dec!(0.02),
                    update_period: 30,
                })
                .build()?,
        )
        .await?;
    assert!(ledger
        .requests()
        .list_pending()
        .await?
        .iter()
        .any(|r| r.id() == request.id()));

    ledger.reject_opening_request(request.id()).await?;
    let err = ledger
        .complete_opening_request(request.id(), helpers::ordinary_account(Decimal::ZERO))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyConsidered);
    assert!(ledger.get_user_accounts(requester).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn close_requires_zero_balance() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger().await?;
    let user = helpers::random_user();
    let id = ledger
        .open_account(user, helpers::ordinary_account(dec!(50)))
        .await?;

    let err = ledger.close_account(id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ActiveAccount);
    assert_eq!(ledger.get_account(id).await?.status(), Status::Active);

    let balance = ledger.withdraw(id, &helpers::usd(dec!(50))).await?;
    assert_eq!(balance, Decimal::ZERO);
    ledger.close_account(id).await?;

    let account = ledger.get_account(id).await?;
    assert_eq!(account.status(), Status::Closed);
    assert!(account.holders().is_empty());
    assert!(ledger.get_user_accounts(user).await?.is_empty());

    let err = ledger.close_account(id).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyClosed);
    Ok(())
}

#[tokio::test]
async fn force_closing_writes_off_balance() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger().await?;
    let user = helpers::random_user();
    let id = ledger
        .open_account(user, helpers::credit_account(dec!(0.05), dec!(100)))
        .await?;
    ledger.add_holder(id, helpers::random_user()).await?;
    ledger.withdraw(id, &helpers::usd(dec!(40))).await?;

    ledger.account_force_closing(id).await?;

    let account = ledger.get_account(id).await?;
    assert_eq!(account.balance(), Decimal::ZERO);
    assert_eq!(account.status(), Status::Closed);
    assert!(account.holders().is_empty());
    Ok(())
}

#[tokio::test]
async fn holders_are_unique() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger().await?;
    let user = helpers::random_user();
    let co_holder = helpers::random_user();
    let id = ledger
        .open_account(user, helpers::ordinary_account(Decimal::ZERO))
        .await?;

    ledger.add_holder(id, co_holder).await?;
    let err = ledger.add_holder(id, co_holder).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::DuplicateHolder);

    let account = ledger.get_account(id).await?;
    assert_eq!(account.holders().len(), 2);
    assert!(ledger
        .get_user_accounts(co_holder)
        .await?
        .iter()
        .any(|a| a.id() == id));
    Ok(())
}

#[tokio::test]
async fn unknown_account_is_not_found() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger().await?;
    let missing = AccountId::from(i64::MAX);

    assert_eq!(
        ledger.get_account(missing).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        ledger.block_account(missing).await.unwrap_err().kind(),
        ErrorKind::NotFound
    );
    assert_eq!(
        ledger
            .withdraw(missing, &helpers::usd(dec!(1)))
            .await
            .unwrap_err()
            .kind(),
        ErrorKind::NotFound
    );
    Ok(())
}

#[tokio::test]
async fn request_snapshot_opens_the_requested_account() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger().await?;
    let requester = helpers::random_user();
    let policy = AccountPolicy::Credit {
        credit_rate: dec!(0.04),
        credit_limit: dec!(500),
    };
    let expires_end = chrono::NaiveDate::from_ymd_opt(2030, 1, 31).unwrap();
    let request = ledger
        .request_opening(
            NewRequest::builder()
                .requester_id(requester)
                .currency(Currency::Gbp)
                .balance(dec!(-25))
                .expires_end(expires_end)
                .policy(policy.clone())
                .build()?,
        )
        .await?;

    let stored = ledger.requests().find_by_id(request.id()).await?;
    assert_eq!(stored.kind(), AccountKind::Credit);
    assert_eq!(stored.values().policy, policy);
    assert_eq!(stored.values().balance, dec!(-25));
    assert_eq!(stored.values().expires_end, Some(expires_end));

    let id = ledger.approve_opening_request(request.id()).await?;
    let account = ledger.get_account(id).await?;
    assert_eq!(account.policy(), &policy);
    assert_eq!(account.balance(), dec!(-25));
    assert_eq!(account.currency(), Currency::Gbp);
    assert_eq!(account.values().expires_end, Some(expires_end));
    assert_eq!(account.holders(), &[requester]);
    assert!(ledger.requests().find_by_id(request.id()).await?.is_considered());
    Ok(())
}

const REFUSED_HOLDER: i64 = -1;

async fn refuse_holder_links(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    sqlx::query(&format!(
        r#"CREATE OR REPLACE FUNCTION bank_test_refuse_holder() RETURNS TRIGGER AS $$
           BEGIN
             IF NEW.user_id = {REFUSED_HOLDER} THEN
               RAISE EXCEPTION 'holder link refused';
             END IF;
             RETURN NEW;
           END;
           $$ LANGUAGE plpgsql"#
    ))
    .execute(pool)
    .await?;
    sqlx::query("DROP TRIGGER IF EXISTS bank_test_refuse_holder ON bank_account_holders")
        .execute(pool)
        .await?;
    sqlx::query(
        r#"CREATE TRIGGER bank_test_refuse_holder BEFORE INSERT ON bank_account_holders
           FOR EACH ROW EXECUTE FUNCTION bank_test_refuse_holder()"#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

#[tokio::test]
async fn failed_completion_rolls_back_everything() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger().await?;
    refuse_holder_links(ledger.pool()).await?;
    let marker = helpers::marker_balance();
    let request = ledger
        .request_opening(
            NewRequest::builder()
                .requester_id(UserId::from(REFUSED_HOLDER))
                .currency(Currency::Gbp)
                .build()?,
        )
        .await?;

    let err = ledger
        .complete_opening_request(request.id(), helpers::gbp_account(marker))
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);

    assert!(!ledger.requests().find_by_id(request.id()).await?.is_considered());
    let orphans: i64 = sqlx::query_scalar(
        "SELECT COUNT(*) FROM bank_accounts WHERE currency = 'GBP' AND balance = $1",
    )
    .bind(marker)
    .fetch_one(ledger.pool())
    .await?;
    assert_eq!(orphans, 0);

    sqlx::query("DROP TRIGGER IF EXISTS bank_test_refuse_holder ON bank_account_holders")
        .execute(ledger.pool())
        .await?;
    Ok(())
}

#[tokio::test]
async fn concurrent_completions_open_one_account() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger().await?;
    for _ in 0..20 {
        let requester = helpers::random_user();
        let request = ledger
            .request_opening(
                NewRequest::builder()
                    .requester_id(requester)
                    .currency(Currency::Usd)
                    .build()?,
            )
            .await?;

        let first = {
            let ledger = ledger.clone();
            let id = request.id();
            tokio::spawn(async move {
                ledger
                    .complete_opening_request(id, helpers::ordinary_account(Decimal::ZERO))
                    .await
            })
        };
        let second = {
            let ledger = ledger.clone();
            let id = request.id();
            tokio::spawn(async move {
                ledger
                    .complete_opening_request(id, helpers::ordinary_account(Decimal::ZERO))
                    .await
            })
        };
        let results = [first.await?, second.await?];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        let loser = results
            .iter()
            .find_map(|r| r.as_ref().err())
            .expect("one completion must lose");
        assert_eq!(loser.kind(), ErrorKind::AlreadyConsidered);
        assert_eq!(ledger.get_user_accounts(requester).await?.len(), 1);
    }
    Ok(())
}

#[tokio::test]
async fn block_never_reopens_a_force_closed_account() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger().await?;
    for _ in 0..30 {
        let id = ledger
            .open_account(
                helpers::random_user(),
                helpers::ordinary_account(Decimal::ZERO),
            )
            .await?;

        let block = {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.block_account(id).await })
        };
        let force_close = {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.account_force_closing(id).await })
        };
        let (blocked, closed) = (block.await?, force_close.await?);

        let account = ledger.get_account(id).await?;
        assert_eq!(closed.is_ok(), account.status() == Status::Closed);
        if account.status() == Status::Closed {
            assert!(account.holders().is_empty());
            assert_eq!(account.balance(), Decimal::ZERO);
        } else {
            assert!(blocked.is_ok());
            assert_eq!(account.status(), Status::Blocked);
        }
    }
    Ok(())
}

#[tokio::test]
async fn closed_accounts_keep_no_holders_under_contention() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger().await?;
    for _ in 0..30 {
        let id = ledger
            .open_account(
                helpers::random_user(),
                helpers::ordinary_account(Decimal::ZERO),
            )
            .await?;
        let co_holder = helpers::random_user();

        let add = {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.add_holder(id, co_holder).await })
        };
        let close = {
            let ledger = ledger.clone();
            tokio::spawn(async move { ledger.close_account(id).await })
        };
        let (added, closed) = (add.await?, close.await?);

        let account = ledger.get_account(id).await?;
        if account.status() == Status::Closed {
            assert!(closed.is_ok());
            assert!(account.holders().is_empty());
        } else {
            assert!(added.is_ok());
            assert!(account.holders().contains(&co_holder));
        }
        if let Err(e) = added {
            assert!(matches!(
                e.kind(),
                ErrorKind::AlreadyClosed | ErrorKind::Persistence
            ));
        }
    }
    Ok(())
}

mod helpers;

use rust_decimal_macros::dec;

use bank_ledger::{error::ErrorKind, invoice::NewInvoice, *};

async fn two_accounts(ledger: &BankLedger) -> anyhow::Result<(AccountId, AccountId)> {
    let requester = ledger
        .open_account(helpers::random_user(), helpers::ordinary_account(dec!(0)))
        .await?;
    let payer = ledger
        .open_account(helpers::random_user(), helpers::ordinary_account(dec!(50)))
        .await?;
    Ok((requester, payer))
}

#[tokio::test]
async fn completed_invoice_pays_the_requester() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger().await?;
    let (requester, payer) = two_accounts(&ledger).await?;

    let invoice = ledger
        .create_invoice(
            NewInvoice::builder()
                .requester_id(requester)
                .payer_id(payer)
                .amount(dec!(12.5))
                .currency(Currency::Usd)
                .build()?,
        )
        .await?;
    assert!(!invoice.is_paid());
    assert!(ledger
        .get_account_invoices(payer)
        .await?
        .iter()
        .any(|i| i.id() == invoice.id()));

    let payment = ledger.complete_invoice(invoice.id()).await?;
    assert_eq!(payment.payer_balance, dec!(37.5));
    assert_eq!(payment.payee_balance, dec!(12.5));
    assert!(ledger.get_invoice(invoice.id()).await?.is_paid());

    let err = ledger.complete_invoice(invoice.id()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::AlreadyPaid);
    assert_eq!(ledger.get_account(payer).await?.balance(), dec!(37.5));
    Ok(())
}

#[tokio::test]
async fn unpayable_invoice_stays_open() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger().await?;
    let (requester, payer) = two_accounts(&ledger).await?;
    let invoice = ledger
        .create_invoice(
            NewInvoice::builder()
                .requester_id(requester)
                .payer_id(payer)
                .amount(dec!(50.01))
                .currency(Currency::Usd)
                .build()?,
        )
        .await?;

    let err = ledger.complete_invoice(invoice.id()).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InsufficientFunds);
    assert!(!ledger.get_invoice(invoice.id()).await?.is_paid());
    assert_eq!(ledger.get_account(requester).await?.balance(), dec!(0));
    assert_eq!(ledger.get_account(payer).await?.balance(), dec!(50));
    Ok(())
}

#[tokio::test]
async fn invoice_needs_existing_accounts() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger().await?;
    let (requester, _) = two_accounts(&ledger).await?;
    let err = ledger
        .create_invoice(
            NewInvoice::builder()
                .requester_id(requester)
                .payer_id(AccountId::from(i64::MAX))
                .amount(dec!(1))
                .currency(Currency::Usd)
                .build()?,
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::NotFound);
    Ok(())
}

#[tokio::test]
async fn concurrent_completions_pay_once() -> anyhow::Result<()> {
    let ledger = helpers::init_ledger().await?;
    for _ in 0..10 {
        let (requester, payer) = two_accounts(&ledger).await?;
        let invoice = ledger
            .create_invoice(
                NewInvoice::builder()
                    .requester_id(requester)
                    .payer_id(payer)
                    .amount(dec!(10))
                    .currency(Currency::Usd)
                    .build()?,
            )
            .await?;

        let handles: Vec<_> = (0..2)
            .map(|_| {
                let ledger = ledger.clone();
                let id = invoice.id();
                tokio::spawn(async move { ledger.complete_invoice(id).await })
            })
            .collect();
        let mut paid = 0;
        for handle in handles {
            match handle.await? {
                Ok(_) => paid += 1,
                Err(e) => assert_eq!(e.kind(), ErrorKind::AlreadyPaid),
            }
        }
        assert_eq!(paid, 1);
        assert_eq!(ledger.get_account(payer).await?.balance(), dec!(40));
        assert_eq!(ledger.get_account(requester).await?.balance(), dec!(10));
    }
    Ok(())
}

mod common;

use anyhow::Result;
use saldo::application::AppError;
use saldo::domain::{BalanceSnapshot, TransactionRequest, ValidationError, DEFAULT_CLIENTS};

use common::{credit, debit, seeded_service, test_service};

#[tokio::test]
async fn test_debits_until_limit_then_rejected() -> Result<()> {
    let (service, _temp) = seeded_service(&[(1, 1000)]).await?;

    let first = service.submit(1, &debit(500, "teste")).await?;
    assert_eq!(
        first,
        BalanceSnapshot {
            limit: 1000,
            balance: -500
        }
    );

    let second = service.submit(1, &debit(500, "teste")).await?;
    assert_eq!(second.balance, -1000);
    assert_eq!(second.limit, 1000);

    let third = service.submit(1, &debit(500, "teste")).await;
    assert!(matches!(
        third,
        Err(AppError::LimitExceeded {
            client_id: 1,
            limit: 1000
        })
    ));

    let client = service.get_client(1).await?;
    assert_eq!(client.balance, -1000);

    let statement = service.statement(1).await?;
    assert_eq!(statement.recent_transactions.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_unknown_client_is_not_found() -> Result<()> {
    let (service, _temp) = seeded_service(&[(1, 1000)]).await?;

    let result = service.submit(999, &credit(10, "x")).await;
    assert!(matches!(result, Err(AppError::ClientNotFound(_))));

    let result = service.statement(999).await;
    assert!(matches!(result, Err(AppError::ClientNotFound(_))));

    // Nothing was written anywhere
    let report = service.check_integrity().await?;
    assert!(report.clients.iter().all(|c| c.transaction_count == 0));

    Ok(())
}

#[tokio::test]
async fn test_unknown_client_checked_before_body() -> Result<()> {
    let (service, _temp) = seeded_service(&[(1, 1000)]).await?;

    let result = service.submit_json(999, b"not json").await;
    assert!(matches!(result, Err(AppError::ClientNotFound(_))));

    let result = service.submit_json(1, b"not json").await;
    assert!(matches!(
        result,
        Err(AppError::Validation(ValidationError::MalformedPayload(_)))
    ));

    Ok(())
}

#[tokio::test]
async fn test_credit_overflowing_balance_is_rejected() -> Result<()> {
    let (service, _temp) = seeded_service(&[(1, 1000)]).await?;
    service.submit(1, &credit(1, "a")).await?;

    let result = service.submit(1, &credit(i64::MAX, "big")).await;
    assert!(matches!(
        result,
        Err(AppError::Validation(ValidationError::InvalidAmount(_)))
    ));

    let statement = service.statement(1).await?;
    assert_eq!(statement.balance, 1);
    assert_eq!(statement.recent_transactions.len(), 1);

    // The largest credit that still fits is accepted
    let snapshot = service.submit(1, &credit(i64::MAX - 1, "fits")).await?;
    assert_eq!(snapshot.balance, i64::MAX);

    Ok(())
}

#[tokio::test]
async fn test_credit_raises_balance_without_limit_check() -> Result<()> {
    let (service, _temp) = seeded_service(&[(1, 0)]).await?;

    let snapshot = service.submit(1, &credit(1_000_000, "salario")).await?;
    assert_eq!(snapshot.balance, 1_000_000);

    // A zero-limit client can spend exactly what it has
    let snapshot = service.submit(1, &debit(1_000_000, "aluguel")).await?;
    assert_eq!(snapshot.balance, 0);

    let result = service.submit(1, &debit(1, "cafe")).await;
    assert!(matches!(result, Err(AppError::LimitExceeded { .. })));

    Ok(())
}

#[tokio::test]
async fn test_debit_landing_exactly_on_limit_is_accepted() -> Result<()> {
    let (service, _temp) = seeded_service(&[(1, 1000)]).await?;

    assert_eq!(service.submit(1, &debit(999, "a")).await?.balance, -999);
    assert_eq!(service.submit(1, &debit(1, "b")).await?.balance, -1000);
    assert!(service.submit(1, &debit(1, "c")).await.is_err());

    Ok(())
}

#[tokio::test]
async fn test_invalid_requests_leave_no_trace() -> Result<()> {
    let (service, _temp) = seeded_service(&[(1, 1000)]).await?;

    let invalid = [
        TransactionRequest::new(0, "d", "zero"),
        TransactionRequest::new(-5, "c", "negative"),
        TransactionRequest::new(10, "x", "bad type"),
        TransactionRequest::new(10, "d", ""),
        TransactionRequest::new(10, "d", "elevenchars"),
    ];
    for request in &invalid {
        let result = service.submit(1, request).await;
        assert!(
            matches!(result, Err(AppError::Validation(_))),
            "expected validation failure for {:?}",
            request
        );
    }

    let result = service
        .submit_json(1, br#"{"valor": 1.5, "tipo": "d", "descricao": "frac"}"#)
        .await;
    assert!(matches!(
        result,
        Err(AppError::Validation(ValidationError::InvalidAmount(_)))
    ));

    let statement = service.statement(1).await?;
    assert_eq!(statement.balance, 0);
    assert!(statement.recent_transactions.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_description_boundaries_in_code_points() -> Result<()> {
    let (service, _temp) = seeded_service(&[(1, 1000)]).await?;

    assert!(service.submit(1, &credit(1, "a")).await.is_ok());
    assert!(service.submit(1, &credit(1, "abcdefghij")).await.is_ok());
    // 10 code points, 30 bytes
    assert!(service.submit(1, &credit(1, "€€€€€€€€€€")).await.is_ok());

    assert!(matches!(
        service.submit(1, &credit(1, "")).await,
        Err(AppError::Validation(_))
    ));
    assert!(matches!(
        service.submit(1, &credit(1, "€€€€€€€€€€€")).await,
        Err(AppError::Validation(_))
    ));

    let statement = service.statement(1).await?;
    assert_eq!(statement.recent_transactions.len(), 3);
    assert_eq!(statement.recent_transactions[0].description, "€€€€€€€€€€");

    Ok(())
}

#[tokio::test]
async fn test_seeding_is_idempotent() -> Result<()> {
    let (mut service, _temp) = test_service().await?;

    let created = service.seed_clients(&DEFAULT_CLIENTS).await?;
    assert_eq!(created.len(), 5);

    service.submit(2, &debit(100, "x")).await?;

    // Re-seeding neither duplicates clients nor resets balances
    let created = service.seed_clients(&DEFAULT_CLIENTS).await?;
    assert!(created.is_empty());

    let clients = service.list_clients().await?;
    assert_eq!(clients.len(), 5);
    assert_eq!(clients[1].id, 2);
    assert_eq!(clients[1].limit, 80_000);
    assert_eq!(clients[1].balance, -100);

    Ok(())
}

#[tokio::test]
async fn test_seeding_rejects_invalid_clients() -> Result<()> {
    let (mut service, _temp) = test_service().await?;

    let result = service.seed_clients(&[(1, 100), (0, 100)]).await;
    assert!(matches!(result, Err(AppError::InvalidClient(_))));

    let result = service.seed_clients(&[(2, -5)]).await;
    assert!(matches!(result, Err(AppError::InvalidClient(_))));

    // Nothing from either batch was written
    assert!(service.list_clients().await?.is_empty());
    assert!(!service.is_provisioned(1));

    Ok(())
}

#[tokio::test]
async fn test_provisioned_clients_survive_reconnect() -> Result<()> {
    use saldo::config::StoreConfig;
    use saldo::application::LedgerService;

    let temp_dir = tempfile::TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let config = StoreConfig::new(db_path.to_string_lossy());

    {
        let mut service = LedgerService::init(&config).await?;
        service.seed_clients(&[(7, 500)]).await?;
        service.submit(7, &debit(200, "x")).await?;
    }

    let service = LedgerService::connect(&config).await?;
    assert!(service.is_provisioned(7));
    assert!(!service.is_provisioned(1));
    assert_eq!(service.submit(7, &debit(300, "y")).await?.balance, -500);

    Ok(())
}

#[tokio::test]
async fn test_integrity_check_after_activity() -> Result<()> {
    let (service, _temp) = seeded_service(&[(1, 1000), (2, 500)]).await?;

    service.submit(1, &credit(300, "in")).await?;
    service.submit(1, &debit(1200, "out")).await?;
    service.submit(2, &debit(500, "out")).await?;
    let _ = service.submit(2, &debit(1, "over")).await;

    let report = service.check_integrity().await?;
    assert!(report.is_healthy());
    assert_eq!(report.clients[0].transaction_total, -900);
    assert_eq!(report.clients[1].transaction_count, 1);

    Ok(())
}

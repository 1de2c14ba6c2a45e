mod common;

use anyhow::Result;
use common::{jimmy, mallory, test_service};
use dispendio::application::AppError;
use dispendio::domain::Principal;

#[tokio::test]
async fn test_owner_is_authorized() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = service.create_account(&jimmy(), "foo", None).await?;

    let path = format!("/accounts/{}/", account.id);
    assert!(service.authorize(&jimmy(), &path).await?);
    Ok(())
}

#[tokio::test]
async fn test_other_user_is_denied() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = service.create_account(&jimmy(), "foo", None).await?;

    let path = format!("/accounts/{}/", account.id);
    assert!(!service.authorize(&mallory(), &path).await?);
    Ok(())
}

#[tokio::test]
async fn test_anonymous_is_denied() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = service.create_account(&jimmy(), "foo", None).await?;

    let path = format!("/accounts/{}/", account.id);
    assert!(!service.authorize(&Principal::Anonymous, &path).await?);
    Ok(())
}

#[tokio::test]
async fn test_missing_account_is_denied_not_an_error() -> Result<()> {
    let (service, _temp) = test_service().await?;
    assert!(!service.authorize(&jimmy(), "/accounts/9999/").await?);
    Ok(())
}

#[tokio::test]
async fn test_nested_paths_reuse_the_account_check() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = service.create_account(&jimmy(), "foo", None).await?;

    // Wallet and expense ids need not exist: ownership is transitive and
    // gated purely at the account level.
    let wallet_path = format!("/accounts/{}/wallets/99/", account.id);
    let expense_path = format!("/accounts/{}/wallets/99/expenses/7/", account.id);
    assert!(service.authorize(&jimmy(), &wallet_path).await?);
    assert!(service.authorize(&jimmy(), &expense_path).await?);
    assert!(!service.authorize(&mallory(), &wallet_path).await?);
    Ok(())
}

#[tokio::test]
async fn test_malformed_path_is_an_error_not_a_deny() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service
        .authorize(&jimmy(), "/accounts/abc/")
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::MalformedResourcePath(_)));

    let err = service.authorize(&jimmy(), "/wallets/7/").await.unwrap_err();
    assert!(matches!(err, AppError::MalformedResourcePath(_)));
    Ok(())
}

#[tokio::test]
async fn test_service_operations_reject_non_owner() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = service.create_account(&jimmy(), "foo", None).await?;

    let err = service
        .create_wallet(&mallory(), account.id, "willy", &[])
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));

    let err = service.get_account(&mallory(), account.id).await.unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    Ok(())
}

#[tokio::test]
async fn test_service_operations_reject_anonymous() -> Result<()> {
    let (service, _temp) = test_service().await?;
    let account = service.create_account(&jimmy(), "foo", None).await?;

    let err = service
        .list_accounts(&Principal::Anonymous)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));

    let err = service
        .get_account(&Principal::Anonymous, account.id)
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthenticated));
    Ok(())
}

#[tokio::test]
async fn test_missing_account_surfaces_as_not_found() -> Result<()> {
    let (service, _temp) = test_service().await?;

    let err = service.get_account(&jimmy(), 9999).await.unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(9999)));
    Ok(())
}

#[tokio::test]
async fn test_accounts_are_scoped_per_owner() -> Result<()> {
    let (service, _temp) = test_service().await?;
    service.create_account(&jimmy(), "foo", None).await?;
    service.create_account(&mallory(), "bar", None).await?;

    let jimmys = service.list_accounts(&jimmy()).await?;
    assert_eq!(jimmys.len(), 1);
    assert_eq!(jimmys[0].name, "foo");

    let mallorys = service.list_accounts(&mallory()).await?;
    assert_eq!(mallorys.len(), 1);
    assert_eq!(mallorys[0].name, "bar");
    Ok(())
}

mod common;

use anyhow::Result;
use common::{jimmy, seed_refdata};
use dispendio::application::{AppError, HierarchyService};
use dispendio::domain::NewExpense;
use dispendio::storage::Repository;
use tempfile::TempDir;

/// Like common::test_service, but keeps a handle on the repository so the
/// storage-level cascade rule can be exercised directly.
async fn test_service_with_repo() -> Result<(HierarchyService, Repository, TempDir)> {
    let temp_dir = TempDir::new()?;
    let db_path = temp_dir.path().join("test.db");
    let db_url = format!("sqlite:{}?mode=rwc", db_path.to_str().unwrap());
    let repo = Repository::init(&db_url).await?;
    let service = HierarchyService::new(repo.clone());
    Ok((service, repo, temp_dir))
}

#[tokio::test]
async fn test_account_delete_cascades_to_wallets_and_expenses() -> Result<()> {
    let (service, repo, _temp) = test_service_with_repo().await?;
    let (category_id, tag_ids) = seed_refdata(&service).await?;

    let account = service.create_account(&jimmy(), "foo", None).await?;
    let wallet = service
        .create_wallet(&jimmy(), account.id, "willy", &tag_ids)
        .await?;
    service
        .create_expense(
            &jimmy(),
            account.id,
            wallet.id,
            NewExpense::new(category_id, "ipad", 100022).with_tags(vec![tag_ids[0]]),
        )
        .await?;

    let deleted = repo.delete_account(account.id).await?;
    assert!(deleted);

    // The whole subtree is gone in one atomic step.
    let err = service.get_account(&jimmy(), account.id).await.unwrap_err();
    assert!(matches!(err, AppError::AccountNotFound(_)));
    assert!(repo.get_wallet(account.id, wallet.id).await?.is_none());
    assert_eq!(repo.list_expenses(wallet.id).await?.len(), 0);
    let (total, count) = repo.wallet_totals(wallet.id).await?;
    assert_eq!((total, count), (0, 0));
    Ok(())
}

#[tokio::test]
async fn test_cascade_leaves_reference_data_intact() -> Result<()> {
    let (service, repo, _temp) = test_service_with_repo().await?;
    let (_category_id, tag_ids) = seed_refdata(&service).await?;

    let account = service.create_account(&jimmy(), "foo", None).await?;
    service
        .create_wallet(&jimmy(), account.id, "willy", &tag_ids)
        .await?;

    repo.delete_account(account.id).await?;

    // Tags and categories are global reference data, not owned by the
    // account, so the cascade must not touch them.
    assert_eq!(service.refdata().list_tags().await?.len(), 2);
    assert_eq!(service.refdata().list_categories().await?.len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_deleting_missing_account_reports_false() -> Result<()> {
    let (_service, repo, _temp) = test_service_with_repo().await?;
    assert!(!repo.delete_account(9999).await?);
    Ok(())
}

#[tokio::test]
async fn test_sibling_accounts_survive_a_cascade() -> Result<()> {
    let (service, repo, _temp) = test_service_with_repo().await?;

    let doomed = service.create_account(&jimmy(), "doomed", None).await?;
    let keeper = service.create_account(&jimmy(), "keeper", None).await?;
    let keeper_wallet = service
        .create_wallet(&jimmy(), keeper.id, "savings", &[])
        .await?;
    service
        .create_wallet(&jimmy(), doomed.id, "spending", &[])
        .await?;

    repo.delete_account(doomed.id).await?;

    let view = service.get_account(&jimmy(), keeper.id).await?;
    assert_eq!(view.wallets.len(), 1);
    assert_eq!(view.wallets[0].id, keeper_wallet.id);
    Ok(())
}

use serde::Serialize;
use tracing::{info, warn};

use crate::auth::{self, OwnershipResolver};
use crate::domain::{
    Account, AccountId, Cents, Expense, ExpenseId, NewExpense, Principal, TagId, UserId, Wallet,
    WalletId,
};
use crate::storage::{RefDataRepository, Repository};

use super::{AppError, Validator, MAX_DESCRIPTION_LEN, MAX_NAME_LEN};

/// An account together with its wallets, newest-created first.
#[derive(Debug, Clone, Serialize)]
pub struct AccountView {
    pub account: Account,
    pub wallets: Vec<Wallet>,
}

/// A wallet together with its expenses (pinned first, then newest first),
/// the exact running total and the expense count.
#[derive(Debug, Clone, Serialize)]
pub struct WalletView {
    pub wallet: Wallet,
    pub expenses: Vec<Expense>,
    pub total_cents: Cents,
    pub expense_count: i64,
}

/// High-level operations over the account -> wallet -> expense hierarchy.
/// Every operation consults ownership before touching the store. This is
/// the primary interface for any transport (CLI, HTTP, ...).
pub struct HierarchyService {
    repo: Repository,
    refdata: RefDataRepository,
    resolver: OwnershipResolver,
}

impl HierarchyService {
    /// Create a service over an already-connected repository.
    pub fn new(repo: Repository) -> Self {
        let refdata = RefDataRepository::new(repo.pool().clone());
        let resolver = OwnershipResolver::new(repo.clone());
        Self {
            repo,
            refdata,
            resolver,
        }
    }

    /// Initialize a new database at the given path.
    pub async fn init(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}?mode=rwc", database_path);
        let repo = Repository::init(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// Connect to an existing database.
    pub async fn connect(database_path: &str) -> Result<Self, AppError> {
        let db_url = format!("sqlite:{}", database_path);
        let repo = Repository::connect(&db_url).await?;
        Ok(Self::new(repo))
    }

    /// The reference data repository. Administrative, not ownership-gated.
    pub fn refdata(&self) -> &RefDataRepository {
        &self.refdata
    }

    /// Path-based authorization for transport layers: `Ok(false)` is a
    /// deny, an error is a malformed path or a storage failure.
    pub async fn authorize(&self, principal: &Principal, path: &str) -> Result<bool, AppError> {
        Ok(self.resolver.authorize(principal, path).await?)
    }

    // ========================
    // Account operations
    // ========================

    /// List all accounts owned by the principal, ordered by (owner, name).
    pub async fn list_accounts(&self, principal: &Principal) -> Result<Vec<Account>, AppError> {
        let user_id = self.require_user(principal)?;
        Ok(self.repo.list_accounts_for(user_id).await?)
    }

    /// Create an account owned by the principal.
    pub async fn create_account(
        &self,
        principal: &Principal,
        name: &str,
        description: Option<&str>,
    ) -> Result<Account, AppError> {
        let user_id = self.require_user(principal)?;

        let mut v = Validator::new();
        v.require_text("name", name, MAX_NAME_LEN)
            .optional_text("description", description, MAX_DESCRIPTION_LEN);
        v.finish()?;

        let account = self.repo.create_account(user_id, name, description).await?;
        info!(account_id = account.id, owner = %account.owner, "created account");
        Ok(account)
    }

    /// Get an account and its wallets. Requires ownership.
    pub async fn get_account(
        &self,
        principal: &Principal,
        account_id: AccountId,
    ) -> Result<AccountView, AppError> {
        let account = self.ensure_owner(principal, account_id).await?;
        let wallets = self.repo.list_wallets(account_id).await?;
        Ok(AccountView { account, wallets })
    }

    // ========================
    // Wallet operations
    // ========================

    /// Create a wallet under an account. Requires ownership of the account.
    pub async fn create_wallet(
        &self,
        principal: &Principal,
        account_id: AccountId,
        name: &str,
        tag_ids: &[TagId],
    ) -> Result<Wallet, AppError> {
        self.ensure_owner(principal, account_id).await?;

        let mut v = Validator::new();
        v.require_text("name", name, MAX_NAME_LEN);
        v.finish()?;

        let tag_ids = self.resolve_tags(tag_ids).await?;

        // The account may have been deleted between the ownership check and
        // the insert; surface that as not-found, never a constraint panic.
        let wallet = self
            .repo
            .create_wallet(account_id, name, &tag_ids)
            .await?
            .ok_or(AppError::AccountNotFound(account_id))?;

        info!(account_id, wallet_id = wallet.id, "created wallet");
        Ok(wallet)
    }

    /// Get a wallet, its expenses, the exact total and the expense count.
    /// Requires ownership of the account.
    pub async fn get_wallet(
        &self,
        principal: &Principal,
        account_id: AccountId,
        wallet_id: WalletId,
    ) -> Result<WalletView, AppError> {
        self.ensure_owner(principal, account_id).await?;

        let wallet = self
            .repo
            .get_wallet(account_id, wallet_id)
            .await?
            .ok_or(AppError::WalletNotFound(wallet_id))?;
        let expenses = self.repo.list_expenses(wallet_id).await?;
        let (total_cents, expense_count) = self.repo.wallet_totals(wallet_id).await?;

        Ok(WalletView {
            wallet,
            expenses,
            total_cents,
            expense_count,
        })
    }

    // ========================
    // Expense operations
    // ========================

    /// Create an expense inside a wallet. Requires ownership of the account;
    /// the wallet must belong to that account and the category must exist.
    pub async fn create_expense(
        &self,
        principal: &Principal,
        account_id: AccountId,
        wallet_id: WalletId,
        mut new: NewExpense,
    ) -> Result<Expense, AppError> {
        self.ensure_owner(principal, account_id).await?;

        let mut v = Validator::new();
        v.require_text("name", &new.name, MAX_NAME_LEN)
            .optional_text("description", new.description.as_deref(), MAX_DESCRIPTION_LEN)
            .amount("amount", new.amount_cents);
        v.finish()?;

        self.repo
            .get_wallet(account_id, wallet_id)
            .await?
            .ok_or(AppError::WalletNotFound(wallet_id))?;

        self.refdata
            .get_category(new.category_id)
            .await?
            .ok_or(AppError::CategoryNotFound(new.category_id))?;
        new.tag_ids = self.resolve_tags(&new.tag_ids).await?;

        let expense = self
            .repo
            .create_expense(wallet_id, &new)
            .await?
            .ok_or(AppError::WalletNotFound(wallet_id))?;

        info!(
            account_id,
            wallet_id,
            expense_id = expense.id,
            amount_cents = expense.amount_cents,
            "created expense"
        );
        Ok(expense)
    }

    /// Delete an expense by id. Requires ownership of the account. Deleting
    /// an id that no longer exists is an error, not a silent success.
    pub async fn delete_expense(
        &self,
        principal: &Principal,
        account_id: AccountId,
        wallet_id: WalletId,
        expense_id: ExpenseId,
    ) -> Result<(), AppError> {
        self.ensure_owner(principal, account_id).await?;

        self.repo
            .get_wallet(account_id, wallet_id)
            .await?
            .ok_or(AppError::WalletNotFound(wallet_id))?;

        let deleted = self.repo.delete_expense(wallet_id, expense_id).await?;
        if !deleted {
            return Err(AppError::ExpenseNotFound(expense_id));
        }

        info!(account_id, wallet_id, expense_id, "deleted expense");
        Ok(())
    }

    // ========================
    // Authorization plumbing
    // ========================

    fn require_user<'a>(&self, principal: &'a Principal) -> Result<&'a UserId, AppError> {
        principal.user_id().ok_or(AppError::Unauthenticated)
    }

    /// Run the ownership checks for an account, mapping each failed stage
    /// onto the error taxonomy: anonymous principals are `Unauthenticated`,
    /// a missing account is `AccountNotFound`, an owner mismatch is
    /// `Forbidden`.
    async fn ensure_owner(
        &self,
        principal: &Principal,
        account_id: AccountId,
    ) -> Result<Account, AppError> {
        if !auth::is_authenticated(principal) {
            warn!(account_id, "rejected anonymous principal");
            return Err(AppError::Unauthenticated);
        }
        let user_id = self.require_user(principal)?;
        let account = self
            .repo
            .get_account(account_id)
            .await?
            .ok_or(AppError::AccountNotFound(account_id))?;
        if !account.is_owned_by(user_id) {
            warn!(%principal, account_id, "rejected non-owner principal");
            return Err(AppError::Forbidden(account_id));
        }
        Ok(account)
    }

    /// Resolve tag ids against reference data, failing on the first id that
    /// does not exist. Duplicates collapse to a set.
    async fn resolve_tags(&self, tag_ids: &[TagId]) -> Result<Vec<TagId>, AppError> {
        let mut unique = tag_ids.to_vec();
        unique.sort_unstable();
        unique.dedup();
        if unique.is_empty() {
            return Ok(unique);
        }
        let found = self.refdata.get_tags(&unique).await?;
        if found.len() != unique.len() {
            let missing = unique
                .iter()
                .find(|id| !found.iter().any(|t| t.id == **id))
                .copied()
                .unwrap_or(unique[0]);
            return Err(AppError::TagNotFound(missing));
        }
        Ok(unique)
    }
}

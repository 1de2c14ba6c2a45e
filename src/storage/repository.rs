use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool};
use sqlx::Row;

use crate::domain::{
    Account, AccountId, Cents, Expense, ExpenseId, NewExpense, Tag, TagId, UserId, Wallet,
    WalletId,
};

use super::MIGRATION_001_INITIAL;

/// Repository for the account -> wallet -> expense hierarchy.
///
/// All multi-row mutations (creates with tag links, cascade deletes) run in
/// a single transaction so a concurrent delete can never leave the
/// hierarchy half-written.
#[derive(Clone)]
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given SQLite connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect to a SQLite database at the given URL. Foreign key
    /// enforcement is switched on for every connection.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .context("Invalid database URL")?
            .foreign_keys(true);
        let pool = SqlitePool::connect_with(options)
            .await
            .context("Failed to connect to database")?;
        Ok(Self::new(pool))
    }

    /// Run database migrations.
    pub async fn migrate(&self) -> Result<()> {
        sqlx::raw_sql(MIGRATION_001_INITIAL)
            .execute(&self.pool)
            .await
            .context("Failed to run migration 001")?;
        Ok(())
    }

    /// Initialize a new database (connect + migrate).
    pub async fn init(database_url: &str) -> Result<Self> {
        let repo = Self::connect(database_url).await?;
        repo.migrate().await?;
        Ok(repo)
    }

    /// The underlying pool, shared with the reference data repository.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    // ========================
    // Account operations
    // ========================

    /// Persist a new account owned by the given user.
    pub async fn create_account(
        &self,
        owner: &UserId,
        name: &str,
        description: Option<&str>,
    ) -> Result<Account> {
        let row = sqlx::query(
            r#"
            INSERT INTO accounts (owner_id, name, description)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(owner)
        .bind(name)
        .bind(description)
        .fetch_one(&self.pool)
        .await
        .context("Failed to save account")?;

        Ok(Account {
            id: row.get("id"),
            owner: owner.clone(),
            name: name.to_string(),
            description: description.map(str::to_string),
        })
    }

    /// Get an account by id.
    pub async fn get_account(&self, id: AccountId) -> Result<Option<Account>> {
        let row = sqlx::query(
            r#"
            SELECT id, owner_id, name, description
            FROM accounts
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch account")?;

        Ok(row.map(|row| Self::row_to_account(&row)))
    }

    /// List all accounts owned by a user, ordered by (owner, name).
    pub async fn list_accounts_for(&self, owner: &UserId) -> Result<Vec<Account>> {
        let rows = sqlx::query(
            r#"
            SELECT id, owner_id, name, description
            FROM accounts
            WHERE owner_id = ?
            ORDER BY owner_id, name
            "#,
        )
        .bind(owner)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list accounts")?;

        Ok(rows.iter().map(Self::row_to_account).collect())
    }

    /// Delete an account and everything beneath it (wallets, expenses, tag
    /// links) as one atomic operation. Returns false if the account did not
    /// exist.
    pub async fn delete_account(&self, id: AccountId) -> Result<bool> {
        let mut tx = self.pool.begin().await.context("Failed to open transaction")?;

        sqlx::query(
            r#"
            DELETE FROM expense_tags
            WHERE expense_id IN (
                SELECT e.id FROM expenses e
                JOIN wallets w ON e.wallet_id = w.id
                WHERE w.account_id = ?
            )
            "#,
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete expense tag links")?;

        sqlx::query(
            "DELETE FROM expenses WHERE wallet_id IN (SELECT id FROM wallets WHERE account_id = ?)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete expenses")?;

        sqlx::query(
            "DELETE FROM wallet_tags WHERE wallet_id IN (SELECT id FROM wallets WHERE account_id = ?)",
        )
        .bind(id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete wallet tag links")?;

        sqlx::query("DELETE FROM wallets WHERE account_id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete wallets")?;

        let result = sqlx::query("DELETE FROM accounts WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete account")?;

        tx.commit().await.context("Failed to commit account delete")?;
        Ok(result.rows_affected() > 0)
    }

    fn row_to_account(row: &sqlx::sqlite::SqliteRow) -> Account {
        Account {
            id: row.get("id"),
            owner: row.get("owner_id"),
            name: row.get("name"),
            description: row.get("description"),
        }
    }

    // ========================
    // Wallet operations
    // ========================

    /// Create a wallet under an account, attaching the given tags.
    /// Returns None if the account no longer exists (e.g. deleted between
    /// the authorization check and this call).
    pub async fn create_wallet(
        &self,
        account_id: AccountId,
        name: &str,
        tag_ids: &[TagId],
    ) -> Result<Option<Wallet>> {
        let created_at = Utc::now();
        let mut tx = self.pool.begin().await.context("Failed to open transaction")?;

        let account_exists = sqlx::query("SELECT 1 FROM accounts WHERE id = ?")
            .bind(account_id)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to check account")?
            .is_some();
        if !account_exists {
            return Ok(None);
        }

        let row = sqlx::query(
            r#"
            INSERT INTO wallets (account_id, name, created_at)
            VALUES (?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(account_id)
        .bind(name)
        .bind(created_at.to_rfc3339())
        .fetch_one(&mut *tx)
        .await
        .context("Failed to save wallet")?;
        let wallet_id: WalletId = row.get("id");

        for tag_id in tag_ids {
            sqlx::query("INSERT INTO wallet_tags (wallet_id, tag_id) VALUES (?, ?)")
                .bind(wallet_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await
                .context("Failed to attach tag to wallet")?;
        }

        tx.commit().await.context("Failed to commit wallet create")?;

        let tags = self.tags_for_wallet(wallet_id).await?;
        Ok(Some(Wallet {
            id: wallet_id,
            account_id,
            name: name.to_string(),
            created_at,
            tags,
        }))
    }

    /// Get a wallet by id, scoped to its owning account.
    pub async fn get_wallet(
        &self,
        account_id: AccountId,
        wallet_id: WalletId,
    ) -> Result<Option<Wallet>> {
        let row = sqlx::query(
            r#"
            SELECT id, account_id, name, created_at
            FROM wallets
            WHERE id = ? AND account_id = ?
            "#,
        )
        .bind(wallet_id)
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await
        .context("Failed to fetch wallet")?;

        match row {
            Some(row) => {
                let mut wallet = Self::row_to_wallet(&row)?;
                wallet.tags = self.tags_for_wallet(wallet.id).await?;
                Ok(Some(wallet))
            }
            None => Ok(None),
        }
    }

    /// List an account's wallets, newest-created first.
    pub async fn list_wallets(&self, account_id: AccountId) -> Result<Vec<Wallet>> {
        let rows = sqlx::query(
            r#"
            SELECT id, account_id, name, created_at
            FROM wallets
            WHERE account_id = ?
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(account_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list wallets")?;

        let mut wallets = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut wallet = Self::row_to_wallet(row)?;
            wallet.tags = self.tags_for_wallet(wallet.id).await?;
            wallets.push(wallet);
        }
        Ok(wallets)
    }

    async fn tags_for_wallet(&self, wallet_id: WalletId) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.name
            FROM tags t
            JOIN wallet_tags wt ON wt.tag_id = t.id
            WHERE wt.wallet_id = ?
            ORDER BY t.name
            "#,
        )
        .bind(wallet_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch wallet tags")?;

        Ok(rows
            .iter()
            .map(|row| Tag {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    fn row_to_wallet(row: &sqlx::sqlite::SqliteRow) -> Result<Wallet> {
        let created_at_str: String = row.get("created_at");
        Ok(Wallet {
            id: row.get("id"),
            account_id: row.get("account_id"),
            name: row.get("name"),
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
            tags: Vec::new(),
        })
    }

    // ========================
    // Expense operations
    // ========================

    /// Create an expense inside a wallet, attaching the given tags.
    /// Returns None if the wallet no longer exists.
    pub async fn create_expense(
        &self,
        wallet_id: WalletId,
        new: &NewExpense,
    ) -> Result<Option<Expense>> {
        let created_at = Utc::now();
        let mut tx = self.pool.begin().await.context("Failed to open transaction")?;

        let wallet_exists = sqlx::query("SELECT 1 FROM wallets WHERE id = ?")
            .bind(wallet_id)
            .fetch_optional(&mut *tx)
            .await
            .context("Failed to check wallet")?
            .is_some();
        if !wallet_exists {
            return Ok(None);
        }

        let row = sqlx::query(
            r#"
            INSERT INTO expenses (wallet_id, category_id, name, amount_cents, description, pinned, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(wallet_id)
        .bind(new.category_id)
        .bind(&new.name)
        .bind(new.amount_cents)
        .bind(&new.description)
        .bind(new.pinned)
        .bind(created_at.to_rfc3339())
        .fetch_one(&mut *tx)
        .await
        .context("Failed to save expense")?;
        let expense_id: ExpenseId = row.get("id");

        for tag_id in &new.tag_ids {
            sqlx::query("INSERT INTO expense_tags (expense_id, tag_id) VALUES (?, ?)")
                .bind(expense_id)
                .bind(tag_id)
                .execute(&mut *tx)
                .await
                .context("Failed to attach tag to expense")?;
        }

        tx.commit().await.context("Failed to commit expense create")?;

        let tags = self.tags_for_expense(expense_id).await?;
        Ok(Some(Expense {
            id: expense_id,
            wallet_id,
            category_id: new.category_id,
            name: new.name.clone(),
            amount_cents: new.amount_cents,
            description: new.description.clone(),
            pinned: new.pinned,
            created_at,
            tags,
        }))
    }

    /// List a wallet's expenses: pinned first, then newest-created first.
    pub async fn list_expenses(&self, wallet_id: WalletId) -> Result<Vec<Expense>> {
        let rows = sqlx::query(
            r#"
            SELECT id, wallet_id, category_id, name, amount_cents, description, pinned, created_at
            FROM expenses
            WHERE wallet_id = ?
            ORDER BY pinned DESC, created_at DESC, id DESC
            "#,
        )
        .bind(wallet_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to list expenses")?;

        let mut expenses = Vec::with_capacity(rows.len());
        for row in &rows {
            let mut expense = Self::row_to_expense(row)?;
            expense.tags = self.tags_for_expense(expense.id).await?;
            expenses.push(expense);
        }
        Ok(expenses)
    }

    /// Compute the exact total and count of a wallet's expenses using SQL
    /// integer aggregation. Amounts are integer cents, so the sum never
    /// drifts the way a binary floating-point sum would.
    pub async fn wallet_totals(&self, wallet_id: WalletId) -> Result<(Cents, i64)> {
        let row = sqlx::query(
            r#"
            SELECT COALESCE(SUM(amount_cents), 0) as total, COUNT(*) as count
            FROM expenses
            WHERE wallet_id = ?
            "#,
        )
        .bind(wallet_id)
        .fetch_one(&self.pool)
        .await
        .context("Failed to compute wallet totals")?;

        Ok((row.get("total"), row.get("count")))
    }

    /// Delete an expense by id, scoped to its wallet. Returns false if no
    /// such expense exists; deleting a stale id is not silently idempotent.
    pub async fn delete_expense(
        &self,
        wallet_id: WalletId,
        expense_id: ExpenseId,
    ) -> Result<bool> {
        let mut tx = self.pool.begin().await.context("Failed to open transaction")?;

        // Scoped through the expenses table so a wallet-mismatched id can
        // never strip another wallet's tag links.
        sqlx::query(
            r#"
            DELETE FROM expense_tags
            WHERE expense_id IN (SELECT id FROM expenses WHERE id = ? AND wallet_id = ?)
            "#,
        )
        .bind(expense_id)
        .bind(wallet_id)
        .execute(&mut *tx)
        .await
        .context("Failed to delete expense tag links")?;

        let result = sqlx::query("DELETE FROM expenses WHERE id = ? AND wallet_id = ?")
            .bind(expense_id)
            .bind(wallet_id)
            .execute(&mut *tx)
            .await
            .context("Failed to delete expense")?;

        tx.commit().await.context("Failed to commit expense delete")?;
        Ok(result.rows_affected() > 0)
    }

    async fn tags_for_expense(&self, expense_id: ExpenseId) -> Result<Vec<Tag>> {
        let rows = sqlx::query(
            r#"
            SELECT t.id, t.name
            FROM tags t
            JOIN expense_tags et ON et.tag_id = t.id
            WHERE et.expense_id = ?
            ORDER BY t.name
            "#,
        )
        .bind(expense_id)
        .fetch_all(&self.pool)
        .await
        .context("Failed to fetch expense tags")?;

        Ok(rows
            .iter()
            .map(|row| Tag {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    fn row_to_expense(row: &sqlx::sqlite::SqliteRow) -> Result<Expense> {
        let created_at_str: String = row.get("created_at");
        Ok(Expense {
            id: row.get("id"),
            wallet_id: row.get("wallet_id"),
            category_id: row.get("category_id"),
            name: row.get("name"),
            amount_cents: row.get("amount_cents"),
            description: row.get("description"),
            pinned: row.get::<i32, _>("pinned") != 0,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .context("Invalid created_at timestamp")?
                .with_timezone(&Utc),
            tags: Vec::new(),
        })
    }
}

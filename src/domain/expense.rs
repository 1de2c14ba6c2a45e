use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CategoryId, Cents, Tag, TagId, WalletId};

pub type ExpenseId = i64;

/// A single expense inside a wallet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Expense {
    pub id: ExpenseId,
    pub wallet_id: WalletId,
    pub category_id: CategoryId,
    pub name: String,
    /// Fixed-point amount in cents, two decimal places.
    pub amount_cents: Cents,
    pub description: Option<String>,
    /// Pinned expenses sort before unpinned ones within a wallet.
    pub pinned: bool,
    pub created_at: DateTime<Utc>,
    pub tags: Vec<Tag>,
}

/// Payload for creating an expense. Field values are validated by the
/// application layer before they reach storage.
#[derive(Debug, Clone, Default)]
pub struct NewExpense {
    pub category_id: CategoryId,
    pub name: String,
    pub amount_cents: Cents,
    pub description: Option<String>,
    pub pinned: bool,
    pub tag_ids: Vec<TagId>,
}

impl NewExpense {
    pub fn new(category_id: CategoryId, name: impl Into<String>, amount_cents: Cents) -> Self {
        Self {
            category_id,
            name: name.into(),
            amount_cents,
            ..Default::default()
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn pinned(mut self, pinned: bool) -> Self {
        self.pinned = pinned;
        self
    }

    pub fn with_tags(mut self, tag_ids: Vec<TagId>) -> Self {
        self.tag_ids = tag_ids;
        self
    }
}

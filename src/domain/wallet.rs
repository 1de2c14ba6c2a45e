use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccountId, Tag};

pub type WalletId = i64;

/// A wallet belongs to exactly one account and accumulates expenses.
/// Deleting the owning account removes the wallet and everything in it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub account_id: AccountId,
    pub name: String,
    pub created_at: DateTime<Utc>,
    /// Shared reference tags attached to this wallet (many-to-many).
    pub tags: Vec<Tag>,
}

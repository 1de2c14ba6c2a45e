use serde::{Deserialize, Serialize};

pub type TagId = i64;
pub type CategoryId = i64;

/// A tag is global reference data: created administratively, shared by all
/// accounts, attachable to wallets and expenses alike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: TagId,
    pub name: String,
}

/// An expense category. Like tags, categories are global reference data and
/// are not owned by any account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseCategory {
    pub id: CategoryId,
    pub name: String,
}

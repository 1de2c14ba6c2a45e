use serde::{Deserialize, Serialize};

use super::UserId;

pub type AccountId = i64;

/// An account groups wallets under a single owning user. Ownership is the
/// unit of authorization: whoever owns the account may act on everything
/// beneath it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub owner: UserId,
    pub name: String,
    pub description: Option<String>,
}

impl Account {
    /// Returns true if the given identity owns this account.
    pub fn is_owned_by(&self, user_id: &UserId) -> bool {
        &self.owner == user_id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ownership_comparison() {
        let account = Account {
            id: 1,
            owner: "jimmy".to_string(),
            name: "foo".to_string(),
            description: None,
        };
        assert!(account.is_owned_by(&"jimmy".to_string()));
        assert!(!account.is_owned_by(&"mallory".to_string()));
    }
}

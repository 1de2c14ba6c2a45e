use crate::domain::{AccountId, ExpenseId, WalletId};

use super::AuthError;

/// A parsed resource path of shape `/accounts/{id}/`,
/// `/accounts/{id}/wallets/{id}/` or
/// `/accounts/{id}/wallets/{id}/expenses/{id}/`.
///
/// Only the account id matters for authorization; the nested ids are kept
/// so a transport layer can address the resource without re-parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResourcePath {
    pub account_id: AccountId,
    pub wallet_id: Option<WalletId>,
    pub expense_id: Option<ExpenseId>,
}

impl ResourcePath {
    /// Extract the numeric ids from a path. A missing or non-numeric id
    /// segment fails loudly: it indicates a routing defect, not a request
    /// that should be denied.
    pub fn parse(path: &str) -> Result<Self, AuthError> {
        let mut segments = path.split('/').filter(|s| !s.is_empty());

        let account_id = match segments.next() {
            Some("accounts") => parse_id(path, segments.next())?,
            _ => return Err(AuthError::MalformedResourcePath(path.to_string())),
        };

        let wallet_id = match segments.next() {
            None => None,
            Some("wallets") => Some(parse_id(path, segments.next())?),
            Some(_) => return Err(AuthError::MalformedResourcePath(path.to_string())),
        };

        let expense_id = match segments.next() {
            None => None,
            Some("expenses") if wallet_id.is_some() => Some(parse_id(path, segments.next())?),
            Some(_) => return Err(AuthError::MalformedResourcePath(path.to_string())),
        };

        Ok(Self {
            account_id,
            wallet_id,
            expense_id,
        })
    }
}

fn parse_id(path: &str, segment: Option<&str>) -> Result<i64, AuthError> {
    segment
        .and_then(|s| s.parse().ok())
        .ok_or_else(|| AuthError::MalformedResourcePath(path.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_account_path() {
        let p = ResourcePath::parse("/accounts/42/").unwrap();
        assert_eq!(p.account_id, 42);
        assert_eq!(p.wallet_id, None);
        assert_eq!(p.expense_id, None);
    }

    #[test]
    fn test_parse_nested_paths() {
        let p = ResourcePath::parse("/accounts/42/wallets/7/").unwrap();
        assert_eq!(p.account_id, 42);
        assert_eq!(p.wallet_id, Some(7));

        let p = ResourcePath::parse("/accounts/42/wallets/7/expenses/9/").unwrap();
        assert_eq!(p.expense_id, Some(9));
    }

    #[test]
    fn test_parse_without_trailing_slash() {
        let p = ResourcePath::parse("/accounts/3/wallets/1").unwrap();
        assert_eq!(p.account_id, 3);
        assert_eq!(p.wallet_id, Some(1));
    }

    #[test]
    fn test_non_numeric_account_id_is_malformed() {
        let err = ResourcePath::parse("/accounts/abc/").unwrap_err();
        assert!(matches!(err, AuthError::MalformedResourcePath(_)));
    }

    #[test]
    fn test_missing_account_segment_is_malformed() {
        assert!(ResourcePath::parse("/wallets/7/").is_err());
        assert!(ResourcePath::parse("/accounts/").is_err());
        assert!(ResourcePath::parse("").is_err());
    }

    #[test]
    fn test_unknown_nested_segment_is_malformed() {
        assert!(ResourcePath::parse("/accounts/1/gadgets/2/").is_err());
        assert!(ResourcePath::parse("/accounts/1/expenses/2/").is_err());
    }
}

//! Ownership resolution: decides whether a principal may act on a resource.
//!
//! Authorization is a conjunction of small predicate checks rather than an
//! inheritance chain. A deny is an ordinary `Ok(false)`; only a malformed
//! resource path (a routing defect) is an error.

mod path;

pub use path::*;

use thiserror::Error;
use tracing::warn;

use crate::domain::{AccountId, Principal};
use crate::storage::Repository;

#[derive(Debug, Error)]
pub enum AuthError {
    /// The resource path carries no parseable numeric account id. This is a
    /// routing/config defect, not a rejected request.
    #[error("malformed resource path: {0}")]
    MalformedResourcePath(String),

    #[error("database error: {0}")]
    Database(#[from] anyhow::Error),
}

/// Check that the principal is a recognized, logged-in identity and not the
/// anonymous placeholder.
pub fn is_authenticated(principal: &Principal) -> bool {
    principal.is_authenticated()
}

/// Check that the principal is authenticated, the account exists, and its
/// owning user equals the principal. A missing account is a deny, not an
/// error: the caller learns nothing about which part failed.
pub async fn is_account_owner(
    repo: &Repository,
    principal: &Principal,
    account_id: AccountId,
) -> Result<bool, AuthError> {
    let Some(user_id) = principal.user_id() else {
        return Ok(false);
    };
    match repo.get_account(account_id).await? {
        Some(account) => Ok(account.is_owned_by(user_id)),
        None => Ok(false),
    }
}

/// The checks that gate access to an account-scoped resource, evaluated in
/// order and combined by conjunction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Check {
    IsAuthenticated,
    IsAccountOwner,
}

const ACCOUNT_POLICY: [Check; 2] = [Check::IsAuthenticated, Check::IsAccountOwner];

/// Resolves whether a principal may act on the resource named by a path.
///
/// Ownership is transitive: paths nested under an account (wallets,
/// expenses) are gated solely by the account-level check. There is no
/// per-wallet or per-expense ACL.
#[derive(Clone)]
pub struct OwnershipResolver {
    repo: Repository,
}

impl OwnershipResolver {
    pub fn new(repo: Repository) -> Self {
        Self { repo }
    }

    /// Authorize a principal against a resource path such as
    /// `/accounts/3/wallets/7/`. Returns `Ok(false)` for any deny and fails
    /// only when the path itself is malformed or storage is unreachable.
    pub async fn authorize(&self, principal: &Principal, path: &str) -> Result<bool, AuthError> {
        let resource = ResourcePath::parse(path)?;
        self.allows(principal, resource.account_id).await
    }

    /// Run the account policy chain for an already-parsed account id.
    pub async fn allows(
        &self,
        principal: &Principal,
        account_id: AccountId,
    ) -> Result<bool, AuthError> {
        for check in ACCOUNT_POLICY {
            let allowed = match check {
                Check::IsAuthenticated => is_authenticated(principal),
                Check::IsAccountOwner => {
                    is_account_owner(&self.repo, principal, account_id).await?
                }
            };
            if !allowed {
                warn!(%principal, account_id, ?check, "authorization denied");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

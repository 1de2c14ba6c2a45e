use serde::{Deserialize, Serialize};

/// Stable external identity of a user. Identity is issued and authenticated
/// by an external collaborator; this crate only compares it for equality
/// against account ownership.
pub type UserId = String;

/// The identity attempting an operation.
///
/// `Anonymous` is the placeholder for requests that carry no authenticated
/// identity. Every permission check starts by rejecting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Principal {
    Anonymous,
    User(UserId),
}

impl Principal {
    pub fn user(id: impl Into<UserId>) -> Self {
        Principal::User(id.into())
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Principal::User(_))
    }

    /// The user identity, if authenticated.
    pub fn user_id(&self) -> Option<&UserId> {
        match self {
            Principal::Anonymous => None,
            Principal::User(id) => Some(id),
        }
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Principal::Anonymous => write!(f, "(anonymous)"),
            Principal::User(id) => write!(f, "{}", id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_is_not_authenticated() {
        assert!(!Principal::Anonymous.is_authenticated());
        assert_eq!(Principal::Anonymous.user_id(), None);
    }

    #[test]
    fn test_user_is_authenticated() {
        let p = Principal::user("jimmy");
        assert!(p.is_authenticated());
        assert_eq!(p.user_id().map(String::as_str), Some("jimmy"));
    }
}

//! Credentials and library scoping.
//!
//! A [`LibraryScope`] identifies the user or group library a command
//! operates on and supplies the corresponding resource path prefix.
//! [`Credentials`] carry the account id and an optional bearer token;
//! commands that run without a token can still read public libraries.

use serde::{Deserialize, Serialize};

/// Authorization tokens for executing requests against the remote API.
///
/// Tokens are typically obtained through an OAuth-based login, although
/// other mechanisms exist. Loading credentials from configuration is the
/// caller's concern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    user_id: String,
    token: Option<String>,
}

impl Credentials {
    /// Credentials for an authenticated account.
    pub fn new(user_id: impl Into<String>, token: impl Into<String>) -> Self {
        Credentials {
            user_id: user_id.into(),
            token: Some(token.into()),
        }
    }

    /// Credentials without an authorization token. Requests will only be
    /// able to read publicly accessible data.
    pub fn anonymous(user_id: impl Into<String>) -> Self {
        Credentials {
            user_id: user_id.into(),
            token: None,
        }
    }

    /// The id of the account.
    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// The `Authorization` header value, when a token is present.
    pub fn bearer(&self) -> Option<String> {
        self.token.as_ref().map(|t| format!("Bearer {t}"))
    }
}

/// Whether a library belongs to an individual user or a shared group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LibraryType {
    /// A personal library.
    User,
    /// A shared group library.
    Group,
}

impl LibraryType {
    /// The resource path segment for this library type.
    pub fn path_segment(&self) -> &'static str {
        match self {
            LibraryType::User => "users",
            LibraryType::Group => "groups",
        }
    }
}

/// The library (user or group) that defines the scope of a command.
///
/// Scoped requests are rooted at `users/{id}` or `groups/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LibraryScope {
    kind: LibraryType,
    id: String,
}

impl LibraryScope {
    /// Scope for a personal library.
    pub fn user(id: impl Into<String>) -> Self {
        LibraryScope {
            kind: LibraryType::User,
            id: id.into(),
        }
    }

    /// Scope for a group library.
    pub fn group(id: impl Into<String>) -> Self {
        LibraryScope {
            kind: LibraryType::Group,
            id: id.into(),
        }
    }

    /// The library type.
    pub fn kind(&self) -> LibraryType {
        self.kind
    }

    /// The user or group id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// The path segments that root every request in this scope.
    pub fn path_segments(&self) -> [String; 2] {
        [self.kind.path_segment().to_string(), self.id.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_formatting() {
        let creds = Credentials::new("12345", "s3cret");
        assert_eq!(creds.bearer().as_deref(), Some("Bearer s3cret"));
        assert!(Credentials::anonymous("12345").bearer().is_none());
    }

    #[test]
    fn test_scope_path_segments() {
        assert_eq!(
            LibraryScope::user("12345").path_segments(),
            ["users".to_string(), "12345".to_string()]
        );
        assert_eq!(
            LibraryScope::group("777").path_segments(),
            ["groups".to_string(), "777".to_string()]
        );
    }
}

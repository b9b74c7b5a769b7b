use async_trait::async_trait;

use super::domain::{LogEntry, NewLogEntry, NewUser, Role, UserId, UserProfile};

/// Read/write access to the `users` collection.
#[async_trait]
pub trait UserDirectory: Send + Sync {
    async fn fetch(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError>;

    /// Any one user holding `role`. Which one is returned when several match is up to
    /// the store.
    async fn first_with_role(&self, role: Role) -> Result<Option<UserProfile>, RepositoryError>;

    /// Writes the user document under `id`, stamping `createdAt`.
    async fn create(&self, id: UserId, user: NewUser) -> Result<UserProfile, RepositoryError>;
}

/// Append-only sink for the `logs` collection.
#[async_trait]
pub trait LogStore: Send + Sync {
    /// Persists the entry with a store-assigned timestamp.
    async fn append(&self, entry: NewLogEntry) -> Result<LogEntry, RepositoryError>;
}

/// Credentials handed to the identity provider.
#[derive(Clone, PartialEq, Eq)]
pub struct IdentityRequest {
    pub email: String,
    pub password: String,
    pub display_name: String,
}

impl std::fmt::Debug for IdentityRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IdentityRequest")
            .field("email", &self.email)
            .field("password", &"[REDACTED]")
            .field("display_name", &self.display_name)
            .finish()
    }
}

/// External account provisioning (sign-in identities).
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn create_identity(&self, request: IdentityRequest) -> Result<UserId, IdentityError>;
}

/// Error enumeration for record-store failures.
#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}

/// Identity provisioning failure.
#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("the email address {0} is already in use by another account")]
    EmailInUse(String),
    #[error("identity provider rejected the request: {0}")]
    Rejected(String),
    #[error("identity provider unavailable: {0}")]
    Unavailable(String),
}

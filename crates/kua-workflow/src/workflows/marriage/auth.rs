use std::sync::Arc;

use tracing::warn;

use super::domain::{Role, UserId};
use super::repository::UserDirectory;

/// Typed failure surfaced to callers of the privileged operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallableError {
    #[error("{0}")]
    Unauthenticated(String),
    #[error("{0}")]
    PermissionDenied(String),
    #[error("{0}")]
    InvalidArgument(String),
    #[error("{0}")]
    Internal(String),
}

impl CallableError {
    /// Wire name of the error kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            CallableError::Unauthenticated(_) => "unauthenticated",
            CallableError::PermissionDenied(_) => "permission-denied",
            CallableError::InvalidArgument(_) => "invalid-argument",
            CallableError::Internal(_) => "internal",
        }
    }

    pub fn internal(cause: impl std::fmt::Display) -> Self {
        CallableError::Internal(cause.to_string())
    }
}

/// Caller identity with the role resolved for this one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub caller: UserId,
    pub role: Role,
}

/// Looks up the caller's user record and checks its role before privileged work runs.
pub struct AuthorizationGuard<U> {
    users: Arc<U>,
}

impl<U> AuthorizationGuard<U>
where
    U: UserDirectory + 'static,
{
    pub fn new(users: Arc<U>) -> Self {
        Self { users }
    }

    /// `denial` is the message returned when the caller's role is not in `allowed`.
    pub async fn require_role(
        &self,
        caller: Option<&UserId>,
        allowed: &[Role],
        denial: &str,
    ) -> Result<AuthContext, CallableError> {
        let Some(caller) = caller else {
            return Err(CallableError::Unauthenticated(
                "User must be authenticated".to_string(),
            ));
        };

        let record = self
            .users
            .fetch(caller)
            .await
            .map_err(CallableError::internal)?;

        match record.and_then(|user| user.role) {
            Some(role) if allowed.contains(&role) => Ok(AuthContext {
                caller: caller.clone(),
                role,
            }),
            resolved => {
                warn!(
                    %caller,
                    role = resolved.map(Role::label).unwrap_or("none"),
                    "privileged call denied"
                );
                Err(CallableError::PermissionDenied(denial.to_string()))
            }
        }
    }
}

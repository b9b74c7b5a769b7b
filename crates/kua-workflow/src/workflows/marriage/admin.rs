use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{error, info};

use super::audit::AuditLogger;
use super::auth::{AuthorizationGuard, CallableError};
use super::domain::{LogAction, LogDetails, NewUser, Role, UserId};
use super::notification::{DispatchResult, NotificationGateway};
use super::repository::{IdentityProvider, IdentityRequest, LogStore, UserDirectory};

/// `createUser` payload. Every field is required; absence is reported, not defaulted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateUserRequest {
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub role: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserResponse {
    pub success: bool,
    pub user_id: UserId,
    pub message: String,
}

/// `sendNotification` payload.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

struct ValidatedUser {
    email: String,
    password: String,
    name: String,
    phone: String,
    role: Role,
}

fn required(value: Option<String>) -> Option<String> {
    value.filter(|value| !value.trim().is_empty())
}

impl CreateUserRequest {
    fn validate(self) -> Result<ValidatedUser, CallableError> {
        let (Some(email), Some(password), Some(name), Some(phone), Some(role)) = (
            required(self.email),
            required(self.password),
            required(self.name),
            required(self.phone),
            required(self.role),
        ) else {
            return Err(CallableError::InvalidArgument(
                "Missing required fields".to_string(),
            ));
        };

        let role = role
            .parse::<Role>()
            .map_err(|_| CallableError::InvalidArgument("Invalid role".to_string()))?;

        Ok(ValidatedUser {
            email,
            password,
            name,
            phone,
            role,
        })
    }
}

/// Role-gated operations invoked directly by signed-in staff.
pub struct AdminOperations<U, L, I, N> {
    guard: AuthorizationGuard<U>,
    users: Arc<U>,
    identities: Arc<I>,
    notifier: Arc<N>,
    audit: AuditLogger<L>,
}

impl<U, L, I, N> AdminOperations<U, L, I, N>
where
    U: UserDirectory + 'static,
    L: LogStore + 'static,
    I: IdentityProvider + 'static,
    N: NotificationGateway + 'static,
{
    pub fn new(users: Arc<U>, logs: Arc<L>, identities: Arc<I>, notifier: Arc<N>) -> Self {
        Self {
            guard: AuthorizationGuard::new(users.clone()),
            users,
            identities,
            notifier,
            audit: AuditLogger::new(logs),
        }
    }

    /// Provisions a sign-in identity plus its `users` document. Superadmin only.
    pub async fn create_user(
        &self,
        caller: Option<&UserId>,
        request: CreateUserRequest,
    ) -> Result<CreateUserResponse, CallableError> {
        let auth = self
            .guard
            .require_role(
                caller,
                &[Role::Superadmin],
                "Only superadmin can create users",
            )
            .await?;

        let user = request.validate()?;

        let user_id = self
            .identities
            .create_identity(IdentityRequest {
                email: user.email.clone(),
                password: user.password,
                display_name: user.name.clone(),
            })
            .await
            .map_err(|err| {
                error!(caller = %auth.caller, error = %err, "identity provisioning failed");
                CallableError::internal(err)
            })?;

        self.users
            .create(
                user_id.clone(),
                NewUser {
                    email: user.email.clone(),
                    name: user.name,
                    phone: user.phone,
                    role: user.role,
                    created_by: auth.caller.clone(),
                },
            )
            .await
            .map_err(|err| {
                error!(%user_id, error = %err, "user document write failed");
                CallableError::internal(err)
            })?;

        let mut details = LogDetails::new();
        details.insert("newUserId".to_string(), json!(user_id.0));
        details.insert("newUserEmail".to_string(), json!(user.email));
        details.insert("newUserRole".to_string(), json!(user.role.label()));
        self.audit
            .log(None, LogAction::UserCreated, &auth.caller, details)
            .await;

        info!(%user_id, role = %user.role, created_by = %auth.caller, "user created");

        Ok(CreateUserResponse {
            success: true,
            user_id,
            message: "User created successfully".to_string(),
        })
    }

    /// Sends an ad-hoc WhatsApp message. Any admin role may call it; no audit entry is
    /// written for this path.
    pub async fn send_notification(
        &self,
        caller: Option<&UserId>,
        request: SendNotificationRequest,
    ) -> Result<DispatchResult, CallableError> {
        self.guard
            .require_role(caller, &Role::ADMINS, "Only admins can send notifications")
            .await?;

        let (Some(phone_number), Some(message)) =
            (required(request.phone_number), required(request.message))
        else {
            return Err(CallableError::InvalidArgument(
                "Phone number and message are required".to_string(),
            ));
        };

        Ok(self.notifier.dispatch(&phone_number, &message).await)
    }
}

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Document key of a `marriageApplications` record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ApplicationId(pub String);

impl fmt::Display for ApplicationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Document key of a `users` record, shared with the identity provider uid.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Access roles assigned at provisioning time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Superadmin,
    AdminKua,
    AdminDukcapil,
    User,
}

impl Role {
    /// Roles allowed to push manual notifications.
    pub const ADMINS: [Role; 3] = [Role::Superadmin, Role::AdminKua, Role::AdminDukcapil];

    pub const fn label(self) -> &'static str {
        match self {
            Role::Superadmin => "superadmin",
            Role::AdminKua => "admin_kua",
            Role::AdminDukcapil => "admin_dukcapil",
            Role::User => "user",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown role '{0}'")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "superadmin" => Ok(Role::Superadmin),
            "admin_kua" => Ok(Role::AdminKua),
            "admin_dukcapil" => Ok(Role::AdminDukcapil),
            "user" => Ok(Role::User),
            other => Err(UnknownRole(other.to_string())),
        }
    }
}

/// Workflow position of an application. Records written without a status, or with a
/// null one, are pending.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum ApplicationStatus {
    #[default]
    Pending,
    Processed,
    Validated,
    Finished,
    Rejected,
    /// Value written by another system that this workflow does not know, kept verbatim.
    Unrecognized(String),
}

impl ApplicationStatus {
    pub fn label(&self) -> &str {
        match self {
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Processed => "processed",
            ApplicationStatus::Validated => "validated",
            ApplicationStatus::Finished => "finished",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Unrecognized(raw) => raw,
        }
    }

    fn from_label(value: &str) -> Self {
        match value {
            "pending" => ApplicationStatus::Pending,
            "processed" => ApplicationStatus::Processed,
            "validated" => ApplicationStatus::Validated,
            "finished" => ApplicationStatus::Finished,
            "rejected" => ApplicationStatus::Rejected,
            other => ApplicationStatus::Unrecognized(other.to_string()),
        }
    }
}

impl Serialize for ApplicationStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.label())
    }
}

impl<'de> Deserialize<'de> for ApplicationStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw
            .as_deref()
            .map(ApplicationStatus::from_label)
            .unwrap_or_default())
    }
}

impl fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Descriptive data for one spouse. Only the name is interpreted here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpouseData {
    pub name: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

impl SpouseData {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            extra: BTreeMap::new(),
        }
    }
}

/// Snapshot of a `marriageApplications` document as delivered by the change feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarriageApplication {
    pub user_id: UserId,
    pub groom_data: SpouseData,
    pub bride_data: SpouseData,
    #[serde(default)]
    pub status: ApplicationStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<String>,
}

impl MarriageApplication {
    /// Rejection reason with blank values treated as absent.
    pub fn rejection_reason(&self) -> Option<&str> {
        self.rejection_reason
            .as_deref()
            .map(str::trim)
            .filter(|reason| !reason.is_empty())
    }
}

/// Projection of a `users` document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub name: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_by: Option<UserId>,
}

/// Fields written when provisioning a user; the store stamps `createdAt`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub email: String,
    pub name: String,
    pub phone: String,
    pub role: Role,
    pub created_by: UserId,
}

/// Action tags recorded in the `logs` collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LogAction {
    ApplicationCreated,
    StatusProcessed,
    StatusValidated,
    StatusFinished,
    StatusRejected,
    UserCreated,
}

impl LogAction {
    pub const fn label(self) -> &'static str {
        match self {
            LogAction::ApplicationCreated => "APPLICATION_CREATED",
            LogAction::StatusProcessed => "STATUS_PROCESSED",
            LogAction::StatusValidated => "STATUS_VALIDATED",
            LogAction::StatusFinished => "STATUS_FINISHED",
            LogAction::StatusRejected => "STATUS_REJECTED",
            LogAction::UserCreated => "USER_CREATED",
        }
    }
}

impl fmt::Display for LogAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Free-form payload attached to an audit entry.
pub type LogDetails = BTreeMap<String, Value>;

/// Audit entry before the store assigns its timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewLogEntry {
    pub application_id: Option<ApplicationId>,
    pub action: LogAction,
    pub user_id: UserId,
    pub details: LogDetails,
}

/// Persisted audit entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub application_id: Option<ApplicationId>,
    pub action: LogAction,
    pub user_id: UserId,
    pub details: LogDetails,
    pub timestamp: DateTime<Utc>,
}

impl LogEntry {
    pub fn stamped(entry: NewLogEntry, timestamp: DateTime<Utc>) -> Self {
        Self {
            application_id: entry.application_id,
            action: entry.action,
            user_id: entry.user_id,
            details: entry.details,
            timestamp,
        }
    }
}

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::response::Response;
use chrono::{TimeZone, Utc};
use serde_json::Value;

use crate::workflows::marriage::domain::{
    ApplicationStatus, LogEntry, MarriageApplication, NewLogEntry, NewUser, Role, SpouseData,
    UserId, UserProfile,
};
use crate::workflows::marriage::notification::{DispatchResult, NotificationGateway};
use crate::workflows::marriage::repository::{
    IdentityError, IdentityProvider, IdentityRequest, LogStore, RepositoryError, UserDirectory,
};
use crate::workflows::marriage::{AdminOperations, ApplicationEventHandlers};

pub(super) const APPLICANT_ID: &str = "user-applicant";
pub(super) const KUA_ADMIN_ID: &str = "user-kua";
pub(super) const SUPERADMIN_ID: &str = "user-root";
pub(super) const DUKCAPIL_ID: &str = "user-dukcapil";

pub(super) fn user(id: &str, name: &str, phone: &str, role: Option<Role>) -> UserProfile {
    UserProfile {
        id: UserId(id.to_string()),
        email: Some(format!("{id}@kua.go.id")),
        name: name.to_string(),
        phone: phone.to_string(),
        role,
        created_at: None,
        created_by: None,
    }
}

pub(super) fn applicant() -> UserProfile {
    user(APPLICANT_ID, "Ahmad Fauzi", "0812-1111-2222", Some(Role::User))
}

pub(super) fn kua_admin() -> UserProfile {
    user(KUA_ADMIN_ID, "Petugas KUA", "+62 813 3333 4444", Some(Role::AdminKua))
}

pub(super) fn superadmin() -> UserProfile {
    user(SUPERADMIN_ID, "Kepala KUA", "0815000000", Some(Role::Superadmin))
}

pub(super) fn dukcapil_admin() -> UserProfile {
    user(DUKCAPIL_ID, "Petugas Dukcapil", "0816000000", Some(Role::AdminDukcapil))
}

pub(super) fn application(status: ApplicationStatus) -> MarriageApplication {
    MarriageApplication {
        user_id: UserId(APPLICANT_ID.to_string()),
        groom_data: SpouseData::named("Ahmad Fauzi"),
        bride_data: SpouseData::named("Siti Aminah"),
        status,
        rejection_reason: None,
    }
}

pub(super) fn caller(id: &str) -> UserId {
    UserId(id.to_string())
}

#[derive(Default, Clone)]
pub(super) struct MemoryUsers {
    records: Arc<Mutex<Vec<UserProfile>>>,
}

impl MemoryUsers {
    pub(super) fn with(users: Vec<UserProfile>) -> Self {
        Self {
            records: Arc::new(Mutex::new(users)),
        }
    }

    pub(super) fn all(&self) -> Vec<UserProfile> {
        self.records.lock().expect("users mutex poisoned").clone()
    }
}

#[async_trait]
impl UserDirectory for MemoryUsers {
    async fn fetch(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let guard = self.records.lock().expect("users mutex poisoned");
        Ok(guard.iter().find(|user| &user.id == id).cloned())
    }

    async fn first_with_role(&self, role: Role) -> Result<Option<UserProfile>, RepositoryError> {
        let guard = self.records.lock().expect("users mutex poisoned");
        Ok(guard.iter().find(|user| user.role == Some(role)).cloned())
    }

    async fn create(&self, id: UserId, user: NewUser) -> Result<UserProfile, RepositoryError> {
        let mut guard = self.records.lock().expect("users mutex poisoned");
        if guard.iter().any(|existing| existing.id == id) {
            return Err(RepositoryError::Conflict);
        }
        let profile = UserProfile {
            id,
            email: Some(user.email),
            name: user.name,
            phone: user.phone,
            role: Some(user.role),
            created_at: Some(Utc.with_ymd_and_hms(2025, 1, 6, 9, 0, 0).unwrap()),
            created_by: Some(user.created_by),
        };
        guard.push(profile.clone());
        Ok(profile)
    }
}

pub(super) struct UnavailableUsers;

#[async_trait]
impl UserDirectory for UnavailableUsers {
    async fn fetch(&self, _id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("firestore offline".to_string()))
    }

    async fn first_with_role(&self, _role: Role) -> Result<Option<UserProfile>, RepositoryError> {
        Err(RepositoryError::Unavailable("firestore offline".to_string()))
    }

    async fn create(&self, _id: UserId, _user: NewUser) -> Result<UserProfile, RepositoryError> {
        Err(RepositoryError::Unavailable("firestore offline".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryLogs {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl MemoryLogs {
    pub(super) fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().expect("logs mutex poisoned").clone()
    }
}

#[async_trait]
impl LogStore for MemoryLogs {
    async fn append(&self, entry: NewLogEntry) -> Result<LogEntry, RepositoryError> {
        let stored = LogEntry::stamped(entry, Utc::now());
        self.entries
            .lock()
            .expect("logs mutex poisoned")
            .push(stored.clone());
        Ok(stored)
    }
}

pub(super) struct BrokenLogs;

#[async_trait]
impl LogStore for BrokenLogs {
    async fn append(&self, _entry: NewLogEntry) -> Result<LogEntry, RepositoryError> {
        Err(RepositoryError::Unavailable("quota exceeded".to_string()))
    }
}

#[derive(Default, Clone)]
pub(super) struct MemoryIdentities {
    created: Arc<Mutex<Vec<IdentityRequest>>>,
}

impl MemoryIdentities {
    pub(super) fn created(&self) -> Vec<IdentityRequest> {
        self.created.lock().expect("identity mutex poisoned").clone()
    }
}

#[async_trait]
impl IdentityProvider for MemoryIdentities {
    async fn create_identity(&self, request: IdentityRequest) -> Result<UserId, IdentityError> {
        let mut guard = self.created.lock().expect("identity mutex poisoned");
        if guard.iter().any(|existing| existing.email == request.email) {
            return Err(IdentityError::EmailInUse(request.email));
        }
        guard.push(request);
        Ok(UserId(format!("uid-{:03}", guard.len())))
    }
}

/// Records every send and answers with a fixed result.
#[derive(Clone)]
pub(super) struct RecordingGateway {
    sent: Arc<Mutex<Vec<(String, String)>>>,
    result: DispatchResult,
}

impl Default for RecordingGateway {
    fn default() -> Self {
        Self::answering(DispatchResult::delivered(Value::Bool(true)))
    }
}

impl RecordingGateway {
    pub(super) fn answering(result: DispatchResult) -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            result,
        }
    }

    pub(super) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("gateway mutex poisoned").clone()
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn dispatch(&self, raw_phone: &str, message: &str) -> DispatchResult {
        self.sent
            .lock()
            .expect("gateway mutex poisoned")
            .push((raw_phone.to_string(), message.to_string()));
        self.result.clone()
    }
}

pub(super) type TestHandlers = ApplicationEventHandlers<MemoryUsers, MemoryLogs, RecordingGateway>;
pub(super) type TestAdmin =
    AdminOperations<MemoryUsers, MemoryLogs, MemoryIdentities, RecordingGateway>;

pub(super) fn build_handlers(
    users: Vec<UserProfile>,
    gateway: RecordingGateway,
) -> (TestHandlers, Arc<MemoryLogs>, Arc<RecordingGateway>) {
    let users = Arc::new(MemoryUsers::with(users));
    let logs = Arc::new(MemoryLogs::default());
    let gateway = Arc::new(gateway);
    let handlers = ApplicationEventHandlers::new(users, logs.clone(), gateway.clone());
    (handlers, logs, gateway)
}

pub(super) struct AdminFixture {
    pub(super) admin: TestAdmin,
    pub(super) users: Arc<MemoryUsers>,
    pub(super) logs: Arc<MemoryLogs>,
    pub(super) identities: Arc<MemoryIdentities>,
    pub(super) gateway: Arc<RecordingGateway>,
}

pub(super) fn build_admin() -> AdminFixture {
    let users = Arc::new(MemoryUsers::with(vec![
        superadmin(),
        kua_admin(),
        dukcapil_admin(),
        applicant(),
        user("user-nobody", "Tanpa Peran", "0817000000", None),
    ]));
    let logs = Arc::new(MemoryLogs::default());
    let identities = Arc::new(MemoryIdentities::default());
    let gateway = Arc::new(RecordingGateway::default());
    let admin = AdminOperations::new(
        users.clone(),
        logs.clone(),
        identities.clone(),
        gateway.clone(),
    );
    AdminFixture {
        admin,
        users,
        logs,
        identities,
        gateway,
    }
}

pub(super) async fn read_json_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), 4096)
        .await
        .expect("read body");
    serde_json::from_slice(&body).expect("json payload")
}

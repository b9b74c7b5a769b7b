use async_trait::async_trait;
use chrono::Utc;
use kua_workflow::config::BootstrapConfig;
use kua_workflow::workflows::marriage::{
    DispatchResult, IdentityError, IdentityProvider, IdentityRequest, LogEntry, LogStore,
    NewLogEntry, NewUser, NotificationGateway, RepositoryError, Role, UserDirectory, UserId,
    UserProfile,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::{BTreeMap, HashSet};
use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

/// User documents keyed by uid. Ordered so role lookups are deterministic.
#[derive(Default, Clone)]
pub(crate) struct InMemoryUserDirectory {
    records: Arc<Mutex<BTreeMap<UserId, UserProfile>>>,
}

impl InMemoryUserDirectory {
    pub(crate) fn insert(&self, profile: UserProfile) {
        let mut guard = self.records.lock().expect("user directory mutex poisoned");
        guard.insert(profile.id.clone(), profile);
    }
}

#[async_trait]
impl UserDirectory for InMemoryUserDirectory {
    async fn fetch(&self, id: &UserId) -> Result<Option<UserProfile>, RepositoryError> {
        let guard = self.records.lock().expect("user directory mutex poisoned");
        Ok(guard.get(id).cloned())
    }

    async fn first_with_role(&self, role: Role) -> Result<Option<UserProfile>, RepositoryError> {
        let guard = self.records.lock().expect("user directory mutex poisoned");
        Ok(guard
            .values()
            .find(|profile| profile.role == Some(role))
            .cloned())
    }

    async fn create(&self, id: UserId, user: NewUser) -> Result<UserProfile, RepositoryError> {
        let mut guard = self.records.lock().expect("user directory mutex poisoned");
        if guard.contains_key(&id) {
            return Err(RepositoryError::Conflict);
        }

        let profile = UserProfile {
            id: id.clone(),
            email: Some(user.email),
            name: user.name,
            phone: user.phone,
            role: Some(user.role),
            created_at: Some(Utc::now()),
            created_by: Some(user.created_by),
        };
        guard.insert(id, profile.clone());
        Ok(profile)
    }
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryLogStore {
    entries: Arc<Mutex<Vec<LogEntry>>>,
}

impl InMemoryLogStore {
    pub(crate) fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().expect("log store mutex poisoned").clone()
    }
}

#[async_trait]
impl LogStore for InMemoryLogStore {
    async fn append(&self, entry: NewLogEntry) -> Result<LogEntry, RepositoryError> {
        let stored = LogEntry::stamped(entry, Utc::now());
        let mut guard = self.entries.lock().expect("log store mutex poisoned");
        guard.push(stored.clone());
        Ok(stored)
    }
}

/// Issues random uids and enforces unique emails. Passwords are never retained.
#[derive(Default, Clone)]
pub(crate) struct InMemoryIdentityProvider {
    emails: Arc<Mutex<HashSet<String>>>,
}

#[async_trait]
impl IdentityProvider for InMemoryIdentityProvider {
    async fn create_identity(&self, request: IdentityRequest) -> Result<UserId, IdentityError> {
        let mut guard = self.emails.lock().expect("identity mutex poisoned");
        let email = request.email.trim().to_ascii_lowercase();
        if !guard.insert(email) {
            return Err(IdentityError::EmailInUse(request.email));
        }
        Ok(UserId(Uuid::new_v4().simple().to_string()))
    }
}

/// Captures outbound messages instead of calling the gateway.
#[derive(Default, Clone)]
pub(crate) struct RecordingGateway {
    sent: Arc<Mutex<Vec<(String, String)>>>,
}

impl RecordingGateway {
    pub(crate) fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().expect("gateway mutex poisoned").clone()
    }
}

#[async_trait]
impl NotificationGateway for RecordingGateway {
    async fn dispatch(&self, raw_phone: &str, message: &str) -> DispatchResult {
        let mut guard = self.sent.lock().expect("gateway mutex poisoned");
        guard.push((raw_phone.to_string(), message.to_string()));
        DispatchResult::not_configured()
    }
}

pub(crate) fn seed_users(directory: &InMemoryUserDirectory, bootstrap: &BootstrapConfig) {
    if let Some(superadmin) = &bootstrap.superadmin {
        directory.insert(UserProfile {
            id: UserId(superadmin.uid.clone()),
            email: None,
            name: superadmin.name.clone(),
            phone: superadmin.phone.clone(),
            role: Some(Role::Superadmin),
            created_at: Some(Utc::now()),
            created_by: None,
        });
    }
}

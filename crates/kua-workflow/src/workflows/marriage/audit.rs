use std::sync::Arc;

use tracing::{error, info};

use super::domain::{ApplicationId, LogAction, LogDetails, NewLogEntry, UserId};
use super::repository::LogStore;

/// Best-effort writer for the audit trail. A failed append is reported and swallowed.
pub struct AuditLogger<L> {
    store: Arc<L>,
}

impl<L> Clone for AuditLogger<L> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<L> AuditLogger<L>
where
    L: LogStore + 'static,
{
    pub fn new(store: Arc<L>) -> Self {
        Self { store }
    }

    pub async fn log(
        &self,
        application_id: Option<&ApplicationId>,
        action: LogAction,
        user_id: &UserId,
        details: LogDetails,
    ) {
        let entry = NewLogEntry {
            application_id: application_id.cloned(),
            action,
            user_id: user_id.clone(),
            details,
        };

        match self.store.append(entry).await {
            Ok(_) => info!(
                %action,
                application_id = application_id.map(|id| id.0.as_str()).unwrap_or("-"),
                "log created"
            ),
            Err(err) => error!(%action, error = %err, "error creating log"),
        }
    }
}

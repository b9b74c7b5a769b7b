use std::sync::Arc;

use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, error, info};

use super::audit::AuditLogger;
use super::domain::{
    ApplicationId, LogAction, LogDetails, MarriageApplication, Role, UserId, UserProfile,
};
use super::notification::NotificationGateway;
use super::policy::{self, TransitionContext};
use super::repository::{LogStore, RepositoryError, UserDirectory};
use super::templates;

/// Result reported back to the change feed for one event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum HandlerOutcome {
    Completed,
    Skipped { reason: SkipReason },
    Failed { error: String },
}

impl HandlerOutcome {
    pub fn is_success(&self) -> bool {
        !matches!(self, HandlerOutcome::Failed { .. })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    StatusUnchanged,
    NoNotificationDue,
}

/// Failure that aborts an event before its audit entry is written.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    #[error(transparent)]
    Repository(#[from] RepositoryError),
    #[error("applicant {0} has no user record")]
    ApplicantMissing(UserId),
}

/// Reactions to `marriageApplications` writes: notify the applicant (and KUA staff on
/// creation), then append the audit entry whether or not delivery worked.
pub struct ApplicationEventHandlers<U, L, N> {
    users: Arc<U>,
    notifier: Arc<N>,
    audit: AuditLogger<L>,
}

impl<U, L, N> ApplicationEventHandlers<U, L, N>
where
    U: UserDirectory + 'static,
    L: LogStore + 'static,
    N: NotificationGateway + 'static,
{
    pub fn new(users: Arc<U>, logs: Arc<L>, notifier: Arc<N>) -> Self {
        Self {
            users,
            notifier,
            audit: AuditLogger::new(logs),
        }
    }

    /// Handles a newly written application document.
    pub async fn on_created(
        &self,
        application_id: &ApplicationId,
        application: &MarriageApplication,
    ) -> HandlerOutcome {
        match self.handle_created(application_id, application).await {
            Ok(()) => HandlerOutcome::Completed,
            Err(err) => {
                error!(%application_id, error = %err, "error in application created handler");
                HandlerOutcome::Failed {
                    error: err.to_string(),
                }
            }
        }
    }

    /// Handles an update; only a change of `status` is acted upon.
    pub async fn on_status_changed(
        &self,
        application_id: &ApplicationId,
        before: &MarriageApplication,
        after: &MarriageApplication,
    ) -> HandlerOutcome {
        if before.status == after.status {
            return HandlerOutcome::Skipped {
                reason: SkipReason::StatusUnchanged,
            };
        }

        match self.handle_status_change(application_id, before, after).await {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(%application_id, error = %err, "error in status changed handler");
                HandlerOutcome::Failed {
                    error: err.to_string(),
                }
            }
        }
    }

    async fn handle_created(
        &self,
        application_id: &ApplicationId,
        application: &MarriageApplication,
    ) -> Result<(), HandlerError> {
        let applicant = self.applicant(&application.user_id).await?;

        let confirmation = templates::applicant_confirmation(&applicant.name, application_id);
        let delivery = self.notifier.dispatch(&applicant.phone, &confirmation).await;
        debug!(%application_id, success = delivery.success, "applicant confirmation attempted");

        match self.users.first_with_role(Role::AdminKua).await? {
            Some(staff) => {
                let notice =
                    templates::staff_new_application(&applicant.name, application_id, application);
                let delivery = self.notifier.dispatch(&staff.phone, &notice).await;
                debug!(%application_id, staff = %staff.id, success = delivery.success, "staff notice attempted");
            }
            None => debug!(%application_id, "no admin_kua user on record, staff notice skipped"),
        }

        let mut details = LogDetails::new();
        details.insert("groomName".to_string(), json!(application.groom_data.name));
        details.insert("brideName".to_string(), json!(application.bride_data.name));
        self.audit
            .log(
                Some(application_id),
                LogAction::ApplicationCreated,
                &application.user_id,
                details,
            )
            .await;

        Ok(())
    }

    async fn handle_status_change(
        &self,
        application_id: &ApplicationId,
        before: &MarriageApplication,
        after: &MarriageApplication,
    ) -> Result<HandlerOutcome, HandlerError> {
        let applicant = self.applicant(&after.user_id).await?;
        let context = TransitionContext {
            application_id,
            applicant_name: &applicant.name,
            rejection_reason: after.rejection_reason(),
        };

        let Some(notice) = policy::resolve(&after.status, &context) else {
            debug!(%application_id, status = %after.status, "no notification due for status");
            return Ok(HandlerOutcome::Skipped {
                reason: SkipReason::NoNotificationDue,
            });
        };

        let delivery = self.notifier.dispatch(&applicant.phone, &notice.message).await;
        info!(
            %application_id,
            from = %before.status,
            to = %after.status,
            delivered = delivery.success,
            "status transition notice attempted"
        );

        let mut details = LogDetails::new();
        details.insert("oldStatus".to_string(), json!(before.status.label()));
        details.insert("newStatus".to_string(), json!(after.status.label()));
        details.insert(
            "rejectionReason".to_string(),
            after
                .rejection_reason()
                .map(|reason| json!(reason))
                .unwrap_or(Value::Null),
        );
        self.audit
            .log(Some(application_id), notice.action, &after.user_id, details)
            .await;

        Ok(HandlerOutcome::Completed)
    }

    async fn applicant(&self, user_id: &UserId) -> Result<UserProfile, HandlerError> {
        self.users
            .fetch(user_id)
            .await?
            .ok_or_else(|| HandlerError::ApplicantMissing(user_id.clone()))
    }
}

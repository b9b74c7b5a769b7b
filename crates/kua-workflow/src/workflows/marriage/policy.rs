use super::domain::{ApplicationId, ApplicationStatus, LogAction};
use super::templates;

/// Values a status template may interpolate.
#[derive(Debug, Clone, Copy)]
pub struct TransitionContext<'a> {
    pub application_id: &'a ApplicationId,
    pub applicant_name: &'a str,
    pub rejection_reason: Option<&'a str>,
}

/// Notification and audit tag owed for reaching a status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransitionNotice {
    pub message: String,
    pub action: LogAction,
}

/// Maps the status an application just moved into onto its applicant notice.
///
/// Only `processed`, `validated`, `finished` and `rejected` produce a notice; `pending`
/// and unrecognized values yield `None` and nothing is sent or logged for them.
pub fn resolve(
    status: &ApplicationStatus,
    context: &TransitionContext<'_>,
) -> Option<TransitionNotice> {
    let TransitionContext {
        application_id,
        applicant_name,
        rejection_reason,
    } = *context;

    let (message, action) = match status {
        ApplicationStatus::Processed => (
            templates::status_processed(applicant_name, application_id),
            LogAction::StatusProcessed,
        ),
        ApplicationStatus::Validated => (
            templates::status_validated(applicant_name, application_id),
            LogAction::StatusValidated,
        ),
        ApplicationStatus::Finished => (
            templates::status_finished(applicant_name, application_id),
            LogAction::StatusFinished,
        ),
        ApplicationStatus::Rejected => (
            templates::status_rejected(applicant_name, application_id, rejection_reason),
            LogAction::StatusRejected,
        ),
        ApplicationStatus::Pending | ApplicationStatus::Unrecognized(_) => return None,
    };

    Some(TransitionNotice { message, action })
}

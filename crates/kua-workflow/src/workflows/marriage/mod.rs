//! Marriage-application notification pipeline for KUA offices.
//!
//! A change feed on `marriageApplications` drives [`ApplicationEventHandlers`]: each
//! creation and each status transition is turned into a WhatsApp notice through the
//! [`NotificationGateway`] and recorded in the audit trail. [`AdminOperations`] exposes
//! the two role-gated callables (user provisioning and manual notification dispatch).

pub mod admin;
pub mod audit;
pub mod auth;
pub mod domain;
pub mod handlers;
pub mod notification;
pub mod phone;
pub mod policy;
pub mod repository;
pub mod router;
pub mod templates;

#[cfg(test)]
mod tests;

pub use admin::{AdminOperations, CreateUserRequest, CreateUserResponse, SendNotificationRequest};
pub use audit::AuditLogger;
pub use auth::{AuthContext, AuthorizationGuard, CallableError};
pub use domain::{
    ApplicationId, ApplicationStatus, LogAction, LogDetails, LogEntry, MarriageApplication,
    NewLogEntry, NewUser, Role, SpouseData, UserId, UserProfile,
};
pub use handlers::{ApplicationEventHandlers, HandlerError, HandlerOutcome, SkipReason};
pub use notification::{
    DispatchError, DispatchResult, NotificationGateway, WhatsAppDispatcher, NOT_CONFIGURED_MESSAGE,
};
pub use phone::normalize_phone;
pub use policy::{resolve, TransitionContext, TransitionNotice};
pub use repository::{
    IdentityError, IdentityProvider, IdentityRequest, LogStore, RepositoryError, UserDirectory,
};
pub use router::{callable_router, marriage_router, trigger_router, ApplicationChange, CALLER_UID_HEADER};

use crate::infra::{
    InMemoryIdentityProvider, InMemoryLogStore, InMemoryUserDirectory, RecordingGateway,
};
use crate::server::http_client;
use chrono::Utc;
use clap::Args;
use kua_workflow::config::AppConfig;
use kua_workflow::error::AppError;
use kua_workflow::telemetry;
use kua_workflow::workflows::marriage::{
    normalize_phone, AdminOperations, ApplicationEventHandlers, ApplicationId,
    ApplicationStatus, CreateUserRequest, MarriageApplication, NotificationGateway, Role,
    SpouseData, UserId, UserProfile, WhatsAppDispatcher,
};
use std::sync::Arc;

#[derive(Args, Debug)]
pub(crate) struct NotifyArgs {
    /// Recipient phone number in any local format
    #[arg(long)]
    pub(crate) phone: String,
    /// Message text to deliver
    #[arg(long)]
    pub(crate) message: String,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Reject the application with this reason instead of finishing it
    #[arg(long)]
    pub(crate) reject_reason: Option<String>,
}

pub(crate) async fn run_notify(args: NotifyArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    let dispatcher = WhatsAppDispatcher::new(http_client()?, &config.notifications);
    println!(
        "Sending to {} (normalized {})",
        args.phone,
        normalize_phone(&args.phone)
    );

    let result = dispatcher.dispatch(&args.phone, &args.message).await;
    match serde_json::to_string_pretty(&result) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("Dispatch result unavailable: {err}"),
    }
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { reject_reason } = args;

    let users = Arc::new(InMemoryUserDirectory::default());
    let logs = Arc::new(InMemoryLogStore::default());
    let gateway = Arc::new(RecordingGateway::default());
    let admin = AdminOperations::new(
        users.clone(),
        logs.clone(),
        Arc::new(InMemoryIdentityProvider::default()),
        gateway.clone(),
    );
    let handlers = ApplicationEventHandlers::new(users.clone(), logs.clone(), gateway.clone());

    let root = UserId("demo-superadmin".to_string());
    users.insert(UserProfile {
        id: root.clone(),
        email: Some("kepala@kua.go.id".to_string()),
        name: "Kepala KUA".to_string(),
        phone: "0811-0000-0001".to_string(),
        role: Some(Role::Superadmin),
        created_at: Some(Utc::now()),
        created_by: None,
    });

    println!("KUA marriage workflow demo (messages captured, not delivered)");

    let mut applicant = None;
    for (email, name, phone, role) in [
        ("petugas@kua.go.id", "Petugas KUA", "0813-2222-0002", "admin_kua"),
        ("rizky@example.com", "Rizky Pratama", "0812-7777-8888", "user"),
    ] {
        let request = CreateUserRequest {
            email: Some(email.to_string()),
            password: Some("demo-password".to_string()),
            name: Some(name.to_string()),
            phone: Some(phone.to_string()),
            role: Some(role.to_string()),
        };
        match admin.create_user(Some(&root), request).await {
            Ok(created) => {
                println!("- Created {role} {name} -> {}", created.user_id);
                if role == "user" {
                    applicant = Some(created.user_id);
                }
            }
            Err(err) => {
                println!("  createUser failed ({}): {}", err.kind(), err);
                return Ok(());
            }
        }
    }
    let Some(applicant) = applicant else {
        return Ok(());
    };

    let id = ApplicationId(format!("MA-{}", Utc::now().format("%Y%m%d%H%M%S")));
    let snapshot = |status: ApplicationStatus, reason: Option<&str>| MarriageApplication {
        user_id: applicant.clone(),
        groom_data: SpouseData::named("Rizky Pratama"),
        bride_data: SpouseData::named("Dewi Lestari"),
        status,
        rejection_reason: reason.map(str::to_string),
    };

    let outcome = handlers
        .on_created(&id, &snapshot(ApplicationStatus::Pending, None))
        .await;
    println!("- Application {id} created -> {}", outcome_label(&outcome));

    let mut transitions = vec![(ApplicationStatus::Pending, ApplicationStatus::Processed)];
    match reject_reason.as_deref() {
        Some(_) => transitions.push((ApplicationStatus::Processed, ApplicationStatus::Rejected)),
        None => {
            transitions.push((ApplicationStatus::Processed, ApplicationStatus::Validated));
            transitions.push((ApplicationStatus::Validated, ApplicationStatus::Finished));
        }
    }

    for (from, to) in transitions {
        let reason = if to == ApplicationStatus::Rejected {
            reject_reason.as_deref()
        } else {
            None
        };
        let outcome = handlers
            .on_status_changed(
                &id,
                &snapshot(from.clone(), None),
                &snapshot(to.clone(), reason),
            )
            .await;
        println!("- {from} -> {to}: {}", outcome_label(&outcome));
    }

    println!("\nCaptured WhatsApp messages:");
    for (phone, message) in gateway.sent() {
        println!("  to {} ({}):", phone, normalize_phone(&phone));
        for line in message.lines() {
            println!("    {line}");
        }
    }

    println!("\nAudit trail:");
    for entry in logs.entries() {
        let details = serde_json::to_string(&entry.details).unwrap_or_default();
        println!(
            "  {} {} by {} {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.action.label(),
            entry.user_id,
            details
        );
    }

    Ok(())
}

fn outcome_label(outcome: &kua_workflow::workflows::marriage::HandlerOutcome) -> String {
    serde_json::to_string(outcome).unwrap_or_else(|_| "unknown".to_string())
}

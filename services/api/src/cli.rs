use crate::demo::{run_demo, run_notify, DemoArgs, NotifyArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use kua_workflow::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "KUA Marriage Workflow",
    about = "Run the KUA marriage-application notification service from the command line",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Send a single WhatsApp message through the configured gateway
    Notify(NotifyArgs),
    /// Walk one application through its lifecycle against in-memory stores
    Demo(DemoArgs),
}

#[derive(Args, Debug, Default)]
pub(crate) struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    pub(crate) host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    pub(crate) port: Option<u16>,
}

pub(crate) async fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => server::run(args).await,
        Command::Notify(args) => run_notify(args).await,
        Command::Demo(args) => run_demo(args).await,
    }
}

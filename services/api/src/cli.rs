use crate::demo::{run_cap_lookup, run_demo, CapsArgs, DemoArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use deposit_guard::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Deposit Guard",
    about = "Decide priority-repayment eligibility for tenant deposits from the command line",
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
    /// Walk through sample tenants and print each verdict
    Demo(DemoArgs),
    /// Print the statutory cap tiers, or the tier for one address and date
    Caps(CapsArgs),
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
        Command::Demo(args) => run_demo(args),
        Command::Caps(args) => run_cap_lookup(args),
    }
}

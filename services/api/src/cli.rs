use crate::report::{run_recommend, run_rules, RecommendArgs, RulesArgs};
use crate::server;
use clap::{Args, Parser, Subcommand};
use skin_advisor::error::AppError;

#[derive(Parser, Debug)]
#[command(
    name = "Skin Advisor",
    about = "Serve or query ingredient recommendations for scored skin concerns",
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
    /// Rank ingredients for concerns given on the command line
    Recommend(RecommendArgs),
    /// Print the active ingredient rule table
    Rules(RulesArgs),
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
        Command::Recommend(args) => run_recommend(args),
        Command::Rules(args) => run_rules(args),
    }
}

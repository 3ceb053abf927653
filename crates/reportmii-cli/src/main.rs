use clap::{CommandFactory, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;

#[derive(Parser)]
#[command(name = "reportmii-cli", version, about = "Reportmii analysis wizard CLI")]
struct Cli {
    /// Act as this user instead of the one from the environment
    #[arg(long, global = true)]
    user: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Inspect the block catalogs
    Catalog {
        #[command(subcommand)]
        action: commands::catalog::CatalogAction,
    },
    /// Create, list and step through analyses
    Analysis {
        #[command(subcommand)]
        action: commands::analysis::AnalysisAction,
    },
    /// Manage the blocks of an analysis
    Block {
        #[command(subcommand)]
        action: commands::block::BlockAction,
    },
    /// Record and read answers
    Answer {
        #[command(subcommand)]
        action: commands::answer::AnswerAction,
    },
    /// Pay for add-on blocks
    Checkout {
        #[command(subcommand)]
        action: commands::checkout::CheckoutAction,
    },
    /// Print the scored report of an analysis
    Report {
        /// Analysis ID
        id: String,
        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    init_tracing();

    let cli = Cli::parse();
    let user = cli.user.as_deref();
    let result = match cli.command {
        Commands::Catalog { action } => commands::catalog::run(action),
        Commands::Analysis { action } => commands::analysis::run(action, user),
        Commands::Block { action } => commands::block::run(action, user),
        Commands::Answer { action } => commands::answer::run(action, user),
        Commands::Checkout { action } => commands::checkout::run(action, user),
        Commands::Report { id, json } => commands::report::run(&id, json, user),
        Commands::Config { action } => commands::config::run(action),
        Commands::Completions { shell } => commands::completions::run(shell, &mut Cli::command()),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

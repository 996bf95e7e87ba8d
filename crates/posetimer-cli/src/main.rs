use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod commands;
mod presenter;

#[derive(Parser)]
#[command(name = "posetimer", version, about = "Sequential pose/interval timer")]
struct Cli {
    /// Log playback transitions (info level)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Play a routine
    Run(commands::run::RunArgs),
    /// Inspect and validate routines
    Routine {
        #[command(subcommand)]
        action: commands::routine::RoutineAction,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: commands::config::ConfigAction,
    },
}

fn init_tracing(verbose: bool, debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else if verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.debug);

    let result = match cli.command {
        Commands::Run(args) => commands::run::run(args),
        Commands::Routine { action } => commands::routine::run(action),
        Commands::Config { action } => commands::config::run(action),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

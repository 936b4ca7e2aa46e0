//! CLI entry point.
//!
//! `servers` and `config` edit the config file directly; every other
//! command is routed through the session built by bootstrap.

use clap::{CommandFactory, Parser};

use mcplay_cli::{Cli, CliConfig, CliContext, CliError, Commands, bootstrap, handlers, init_logging};

fn main() {
    // A missing .env file is fine.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(e) = run(cli) {
        tracing::debug!(error = ?e, "Command failed");
        eprintln!("Error: {e}");
        std::process::exit(e.exit_code());
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let Some(command) = cli.command else {
        Cli::command()
            .print_help()
            .map_err(|e| CliError::Io(e.to_string()))?;
        println!();
        return Ok(());
    };

    let config = CliConfig::with_defaults(cli.config)?;

    match command {
        Commands::Servers { command } => handlers::servers::execute(&config.config_path, command),
        Commands::Config { command } => handlers::config::execute(&config.config_path, command),
        command => {
            let ctx = bootstrap(&config)?;
            let result = dispatch(&ctx, command);
            ctx.session.shutdown();
            result
        }
    }
}

fn dispatch(ctx: &CliContext, command: Commands) -> Result<(), CliError> {
    match command {
        Commands::Tools { long } => handlers::tools::execute(ctx, long),
        Commands::Call { tool, args, json } => {
            handlers::call::execute(ctx, &tool, &args, json.as_deref())
        }
        Commands::Chat => handlers::chat::execute(ctx),
        Commands::Chats => handlers::chats::execute(ctx),
        Commands::Servers { command } => handlers::servers::execute(&ctx.config_path, command),
        Commands::Config { command } => handlers::config::execute(&ctx.config_path, command),
    }
}

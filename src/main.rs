mod cli;

use clap::Parser;
use cli::{Cli, Commands};
use stash::error::JsonError;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const LOG_ENV: &str = "STASH_LOG";

fn init_logging() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging();
    let json = cli.json;

    let result = match cli.command {
        Commands::Init { passphrase } => cli::init::run(passphrase, json),

        Commands::Add {
            service,
            username,
            url,
            notes,
            tags,
        } => cli::add::run(
            cli::add::AddArgs {
                service,
                username,
                url,
                notes,
                tags,
            },
            json,
        ),

        Commands::Get { id, field } => cli::get::run(&id, field.as_deref(), json),

        Commands::List { search } => cli::list::run(search.as_deref(), json),

        Commands::Edit {
            id,
            service,
            username,
            url,
            notes,
            tags,
            clear_tags,
            password_stdin,
        } => cli::edit::run(
            &id,
            cli::edit::EditArgs {
                service,
                username,
                url,
                notes,
                tags,
                clear_tags,
                password_stdin,
            },
            json,
        ),

        Commands::Remove { id } => cli::remove::run(&id, json),

        Commands::Export { output } => cli::export::run(output.as_deref()),

        Commands::Import { file } => cli::import::run(&file, json),

        Commands::Rekey { new_passphrase } => cli::rekey::run(new_passphrase, json),

        Commands::Bookmarks { command } => cli::bookmarks::run(&command, json),

        Commands::Config { command } => cli::config::run(&command, json),
    };

    if let Err(e) = result {
        if json {
            let err = JsonError::from_error(&e);
            match serde_json::to_string(&err) {
                Ok(s) => eprintln!("{}", s),
                Err(_) => eprintln!("Error: {}", e),
            }
        } else {
            eprintln!("Error: {}", e);
        }
        std::process::exit(e.exit_code());
    }
}

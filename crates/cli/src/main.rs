use anyhow::Context;
use clap::{Parser, Subcommand};

use bookshelf_app::{app, modules};
use bookshelf_kernel::settings::Settings;

/// Bookshelf command line
#[derive(Debug, Parser)]
#[command(name = "bookshelf-cli", version, about)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the HTTP server
    Serve,
    /// Apply pending database migrations
    Migrate,
    /// Insert generated sample books
    Seed {
        #[arg(long, default_value_t = 10)]
        count: usize,
    },
    /// Print the HTTP routes
    Routes,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if let Command::Routes = cli.command {
        for (method, path) in modules::route_table() {
            println!("{method:<7} {path}");
        }
        return Ok(());
    }

    let settings = Settings::load().with_context(|| "failed to load bookshelf settings")?;
    bookshelf_telemetry::init(&settings.telemetry)?;

    tracing::info!(env = ?settings.environment, command = ?cli.command, "bookshelf-cli");

    match cli.command {
        Command::Serve => app::serve(settings).await?,
        Command::Migrate => {
            let applied = app::migrate(&settings).await?;
            println!("applied {applied} migration(s)");
        }
        Command::Seed { count } => {
            let created = app::seed(&settings, count).await?;
            println!("seeded {created} book(s)");
        }
        Command::Routes => {}
    }

    Ok(())
}

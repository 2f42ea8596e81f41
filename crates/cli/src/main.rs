//! Kivu Imports CLI - database migrations and content tooling.
//!
//! # Usage
//!
//! ```bash
//! # Create the session table
//! kivu-cli migrate
//!
//! # Parse every bundled page and blog post, failing on the first bad file
//! kivu-cli content check
//! kivu-cli content check --dir crates/storefront/content
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "kivu-cli")]
#[command(author, version, about = "Kivu Imports storefront CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations (session store)
    Migrate,
    /// Work with the bundled markdown content
    Content {
        #[command(subcommand)]
        action: ContentAction,
    },
}

#[derive(Subcommand)]
enum ContentAction {
    /// Load every page and post, reporting the first parse error
    Check {
        /// Content directory holding `pages/` and `blog/`
        #[arg(short, long, default_value = commands::content::DEFAULT_CONTENT_DIR)]
        dir: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::storefront().await?,
        Commands::Content { action } => match action {
            ContentAction::Check { dir } => {
                let report = commands::content::check(&dir)?;
                #[allow(clippy::print_stdout)]
                {
                    println!("{report}");
                }
            }
        },
    }
    Ok(())
}

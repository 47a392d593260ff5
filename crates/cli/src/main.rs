//! Aula CLI - Allowlist and course management tools.
//!
//! # Usage
//!
//! ```bash
//! # List allowlisted users
//! aula-cli users list
//!
//! # Add a user and make them an admin
//! aula-cli users add -e anna@example.com -n "Anna Rossi" -c Acme -r Tecnico --admin
//!
//! # Grant or revoke admin rights
//! aula-cli users promote anna@example.com
//! aula-cli users demote anna@example.com
//!
//! # List completed courses
//! aula-cli courses list --archived
//! ```
//!
//! # Commands
//!
//! - `users` - Manage the allowlist (the only way to create admins)
//! - `courses` - Inspect courses
//!
//! Reads the same `SUPABASE_URL` / `SUPABASE_ANON_KEY` environment as the
//! web server.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "aula-cli")]
#[command(author, version, about = "Aula CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage allowlisted users
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Inspect courses
    Courses {
        #[command(subcommand)]
        action: CourseAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// List allowlisted users
    List,
    /// Add a user to the allowlist
    Add {
        /// Email address
        #[arg(short, long)]
        email: String,

        /// Display name
        #[arg(short, long)]
        name: String,

        /// Company
        #[arg(short, long, default_value = "")]
        company: String,

        /// Job role
        #[arg(short, long, default_value = "")]
        role: String,

        /// Grant admin rights
        #[arg(long)]
        admin: bool,
    },
    /// Grant admin rights
    Promote {
        /// Email address
        email: String,
    },
    /// Revoke admin rights
    Demote {
        /// Email address
        email: String,
    },
    /// Remove a user from the allowlist
    Remove {
        /// Email address
        email: String,
    },
}

#[derive(Subcommand)]
enum CourseAction {
    /// List courses with their enrollment counts
    List {
        /// Show completed courses instead of active ones
        #[arg(long)]
        archived: bool,
    },
}

#[tokio::main]
async fn main() {
    // Load .env before the subscriber so RUST_LOG from the file applies
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let data = commands::connect()?;

    match cli.command {
        Commands::Users { action } => match action {
            UserAction::List => commands::users::list(&data).await,
            UserAction::Add {
                email,
                name,
                company,
                role,
                admin,
            } => {
                let new_user = commands::users::NewUser {
                    email: &email,
                    name: &name,
                    company: &company,
                    role: &role,
                    admin,
                };
                commands::users::add(&data, &new_user).await?;
            }
            UserAction::Promote { email } => {
                commands::users::set_admin(&data, &email, true).await?;
            }
            UserAction::Demote { email } => {
                commands::users::set_admin(&data, &email, false).await?;
            }
            UserAction::Remove { email } => commands::users::remove(&data, &email).await?,
        },
        Commands::Courses { action } => match action {
            CourseAction::List { archived } => commands::courses::list(&data, archived).await,
        },
    }
    Ok(())
}

//! `briefdesk-admin`: offline maintenance for the JSON data file.
//!
//! Run it while the server is stopped; the server keeps its own copy of the
//! data in memory and would overwrite these changes on its next write.

use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};

use briefdesk_api::auth::password::{
    hash_password, validate_password_strength, MIN_PASSWORD_LENGTH,
};
use briefdesk_core::email::{normalize_email, validate_email};
use briefdesk_core::roles::Role;
use briefdesk_db::maintenance;
use briefdesk_db::models::user::CreateUser;
use briefdesk_db::repositories::UserRepo;

#[derive(Parser)]
#[command(name = "briefdesk-admin")]
#[command(about = "Maintenance commands for the briefdesk data file")]
struct Cli {
    /// Path to the data file.
    #[arg(long, env = "DATA_PATH", default_value = "data/db.json")]
    data: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Back up the file, normalize emails and drop empty or duplicate users.
    Cleanup,
    /// Keep staff accounts only; delete every brand user, brand and project.
    Reset {
        /// Required confirmation.
        #[arg(long)]
        yes: bool,
    },
    /// Delete every project.
    ClearProjects {
        /// Required confirmation.
        #[arg(long)]
        yes: bool,
    },
    /// Replace plaintext passwords with argon2id hashes.
    HashPasswords,
    /// Bring the data file up to the current schema.
    Migrate,
    /// Create a staff account.
    CreateStaff {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "briefdesk_db=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let pool = briefdesk_db::open_store(&cli.data)
        .await
        .with_context(|| format!("failed to open {}", cli.data.display()))?;

    match cli.command {
        Command::Cleanup => {
            let report = maintenance::cleanup_users(&pool).await?;
            if let Some(backup) = &report.backup_path {
                println!("Backup written to {}", backup.display());
            }
            println!("{:<24}{:>8}", "emails normalized", report.emails_normalized);
            println!("{:<24}{:>8}", "empty emails removed", report.removed_empty);
            println!("{:<24}{:>8}", "duplicates removed", report.removed_duplicates);
            println!("{:<24}{:>8}", "users remaining", report.users_remaining);
            println!("{:<24}{:>8}", "brands reassigned", report.brands_reassigned);
            println!("{:<24}{:>8}", "brands removed", report.brands_removed);
            println!("{:<24}{:>8}", "projects removed", report.projects_removed);
        }
        Command::Reset { yes } => {
            require_confirmation(yes)?;
            let report = maintenance::reset_keep_staff(&pool).await?;
            println!(
                "Kept {} staff; removed {} users, {} brands, {} projects",
                report.staff_kept,
                report.users_removed,
                report.brands_removed,
                report.projects_removed
            );
        }
        Command::ClearProjects { yes } => {
            require_confirmation(yes)?;
            let removed = maintenance::clear_projects(&pool).await?;
            println!("Removed {removed} projects");
        }
        Command::HashPasswords => {
            let changed = maintenance::hash_plaintext_passwords(&pool, hash_password).await?;
            for email in &changed {
                println!("rehashed {email}");
            }
            println!("{} passwords rehashed", changed.len());
        }
        Command::Migrate => {
            let report = briefdesk_db::run_migrations(&pool).await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::CreateStaff {
            email,
            password,
            first_name,
            last_name,
        } => {
            let email = normalize_email(&email);
            validate_email(&email).map_err(anyhow::Error::msg)?;
            validate_password_strength(&password, MIN_PASSWORD_LENGTH)
                .map_err(anyhow::Error::msg)?;
            let password_hash =
                hash_password(&password).map_err(|e| anyhow::anyhow!("hashing failed: {e}"))?;

            let user = UserRepo::create(
                &pool,
                &CreateUser {
                    first_name,
                    last_name,
                    email,
                    password_hash,
                    role: Role::Staff,
                    trial_ends_at: None,
                },
            )
            .await?;
            println!("Created staff account {} ({})", user.email, user.id);
        }
    }

    Ok(())
}

fn require_confirmation(yes: bool) -> anyhow::Result<()> {
    if !yes {
        bail!("this deletes data; re-run with --yes to confirm");
    }
    Ok(())
}

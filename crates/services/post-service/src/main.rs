//! Post Service - CLI over the cached post and comment repositories.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use domain::FieldValue;
use post_service_lib::config::PostServiceConfig;
use post_service_lib::service::PostService;
use post_service_lib::MigrateAction;

#[derive(Parser)]
#[command(name = "post-service")]
#[command(about = "Posts and comments behind a cached repository")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database migration commands
    Migrate {
        #[command(subcommand)]
        action: MigrateCommands,
    },
    /// Show a post by ID
    Show { id: i32 },
    /// Find the first post whose field equals a value
    FindBy { field: String, value: String },
    /// Create a post
    Post { text: String },
    /// Add a comment to a post
    Comment { post_id: i32, text: String },
    /// Atomically increment a counter column of a post
    Bump {
        id: i32,
        #[arg(default_value = "views")]
        field: String,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        by: i64,
    },
    /// Soft delete a comment
    Trash { id: i32 },
    /// Restore a soft-deleted comment
    Restore { id: i32 },
    /// Drop every cached entry
    FlushCache,
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Commands::Migrate { action } = cli.command {
        let migrate_action = match action {
            MigrateCommands::Up => MigrateAction::Up,
            MigrateCommands::Down => MigrateAction::Down,
            MigrateCommands::Status => MigrateAction::Status,
            MigrateCommands::Fresh => MigrateAction::Fresh,
        };
        return post_service_lib::run_migrations(migrate_action).await;
    }

    let config = PostServiceConfig::from_env();
    let service = post_service_lib::build_service(&config).await?;

    match cli.command {
        Commands::Migrate { .. } => {}
        Commands::Show { id } => print_json(&service.get_post(id).await?)?,
        Commands::FindBy { field, value } => {
            let value = match value.parse::<i64>() {
                Ok(number) => FieldValue::Int(number),
                Err(_) => FieldValue::Text(value),
            };
            print_json(&service.get_post_by(&field, value).await?)?;
        }
        Commands::Post { text } => print_json(&service.create_post(text).await?)?,
        Commands::Comment { post_id, text } => {
            print_json(&service.add_comment(post_id, text).await?)?
        }
        Commands::Bump { id, field, by } => print_json(&service.bump_post(id, &field, by).await?)?,
        Commands::Trash { id } => print_json(&service.trash_comment(id).await?)?,
        Commands::Restore { id } => print_json(&service.restore_comment(id).await?)?,
        Commands::FlushCache => {
            service.flush_cache().await?;
            tracing::info!("Cache flushed");
        }
    }

    Ok(())
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<(), serde_json::Error> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

use clap::{Parser, Subcommand};

use doomscroll::{auth::services::seed_demo_users, build_app, serve, AppState};

/// Doom-scroll interruption log
#[derive(Parser)]
#[command(name = "doomscroll")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply migrations and serve the web app (default)
    Serve,
    /// Apply migrations and create the demo accounts
    InitDb,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "doomscroll=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    let cli = Cli::parse();
    let app_state = AppState::init().await?;

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => {
            let config = app_state.config.clone();
            serve(build_app(app_state), &config).await?;
        }
        Commands::InitDb => {
            let created = seed_demo_users(&app_state.db).await?;
            if created.is_empty() {
                println!("Database initialized; sample users already present.");
            } else {
                println!(
                    "Database initialized with sample users: {}.",
                    created.join(", ")
                );
            }
        }
    }

    Ok(())
}

//! storecheck-ui - Store inspection checklist service
//!
//! Single binary serving the mobile checklist UI, the working-session API,
//! and the admin dashboard API against a local SQLite database.

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing::{error, info};

use storecheck_common::api::auth::load_shared_secret;
use storecheck_common::config::{RootFolderInitializer, RootFolderResolver};
use storecheck_common::db::{init_database, SqliteProvider};
use storecheck_common::session::InspectionSession;
use storecheck_common::store::FileStore;
use storecheck_ui::{build_router, AppState};

#[derive(Parser, Debug)]
#[command(name = "storecheck-ui", about = "Store inspection checklist service")]
struct Args {
    /// Root folder holding the database and session state
    #[arg(long)]
    root_folder: Option<PathBuf>,

    /// Port to listen on
    #[arg(long, default_value_t = 5740)]
    port: u16,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    // Build identification immediately after tracing init, before any
    // database delay
    info!(
        "Starting StoreCheck UI (storecheck-ui) v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let resolver = RootFolderResolver::new("storecheck-ui").with_cli_override(args.root_folder);
    let root_folder = resolver.resolve();

    let initializer = RootFolderInitializer::new(root_folder);
    initializer.ensure_directory_exists()?;

    let db_path = initializer.database_path();
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to initialize database: {}", e);
            return Err(e.into());
        }
    };

    let shared_secret = match load_shared_secret(&pool).await {
        Ok(secret) => {
            if secret == 0 {
                info!("Admin API authentication disabled (shared_secret = 0)");
            } else {
                info!("✓ Loaded shared secret for admin API authentication");
            }
            secret
        }
        Err(e) => {
            error!("Failed to load shared secret: {}", e);
            return Err(anyhow::anyhow!(e.to_string()));
        }
    };

    let provider = SqliteProvider::new(pool.clone());

    // Restore any in-progress inspection, else seed a fresh one. A failed
    // load is surfaced through the API rather than retried here.
    let file_store = FileStore::new(initializer.session_dir())?;
    let mut session = InspectionSession::new(Box::new(file_store));
    match session.initialize(&provider).await {
        Ok(()) => info!("✓ Inspection session ready"),
        Err(e) => error!("Checklist load failed: {}", e),
    }

    let state = AppState::new(pool, provider, session, shared_secret);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(("127.0.0.1", args.port)).await?;
    info!("storecheck-ui listening on http://127.0.0.1:{}", args.port);
    info!("Health check: http://127.0.0.1:{}/health", args.port);

    axum::serve(listener, app).await?;

    Ok(())
}

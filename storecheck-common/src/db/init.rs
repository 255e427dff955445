//! Database initialization
//!
//! Creates the database on first run, applies the schema idempotently, and
//! seeds default settings plus a starter checklist taxonomy when the
//! categories table is empty.

use std::path::Path;

use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use tracing::info;

use crate::Result;

/// Initialize database connection and create tables if needed
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL keeps readers unblocked while a write is in flight
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    // Idempotent - safe to call on every startup
    create_settings_table(&pool).await?;
    create_categories_table(&pool).await?;
    create_items_table(&pool).await?;
    create_inspections_table(&pool).await?;

    init_default_settings(&pool).await?;
    seed_default_taxonomy(&pool).await?;

    Ok(pool)
}

async fn create_settings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS settings (
            key TEXT PRIMARY KEY,
            value TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_categories_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS categories (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            icon TEXT NOT NULL DEFAULT 'clipboard',
            sort_order INTEGER NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_items_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS items (
            id TEXT PRIMARY KEY,
            category_id TEXT NOT NULL REFERENCES categories(id),
            description TEXT NOT NULL,
            sort_order INTEGER NOT NULL,
            created_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            updated_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn create_inspections_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS inspections (
            id TEXT PRIMARY KEY,
            store_number TEXT NOT NULL,
            inspected_by TEXT NOT NULL,
            client_date TEXT NOT NULL,
            inspection_date TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            submitted_at TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            last_updated TIMESTAMP NOT NULL DEFAULT CURRENT_TIMESTAMP,
            version INTEGER NOT NULL DEFAULT 1,
            categories TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    Ok(())
}

async fn init_default_settings(pool: &SqlitePool) -> Result<()> {
    // INSERT OR IGNORE keeps operator-modified values intact
    sqlx::query(
        "INSERT OR IGNORE INTO settings (key, value) VALUES ('recent_inspections_limit', '50')",
    )
    .execute(pool)
    .await?;

    Ok(())
}

/// Starter checklist: (slug, title, icon, items)
const DEFAULT_TAXONOMY: &[(&str, &str, &str, &[&str])] = &[
    (
        "food-prep",
        "Food Prep",
        "utensils",
        &[
            "Prep surfaces cleaned and sanitized",
            "Food stored at correct temperatures",
            "Cutting boards free of deep grooves",
            "Date labels present on all prepped food",
        ],
    ),
    (
        "front-counter",
        "Front Counter",
        "storefront",
        &[
            "Register area clean and organized",
            "Menu boards current and legible",
            "Promotional signage properly displayed",
        ],
    ),
    (
        "dining-area",
        "Dining Area",
        "spray",
        &[
            "Tables and chairs clean",
            "Floors swept and mopped",
            "Trash bins below the fill line",
        ],
    ),
    (
        "restrooms",
        "Restrooms",
        "restroom",
        &[
            "Fixtures clean and functional",
            "Soap and paper products stocked",
            "Cleaning log signed this shift",
        ],
    ),
    (
        "walk-in-cooler",
        "Walk-in Cooler",
        "refrigerator",
        &[
            "Temperature at or below 41F",
            "FIFO rotation followed",
            "Door seals intact and clean",
        ],
    ),
];

/// Seed the starter taxonomy on an empty categories table
async fn seed_default_taxonomy(pool: &SqlitePool) -> Result<()> {
    let category_count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
        .fetch_one(pool)
        .await?;

    if category_count > 0 {
        return Ok(());
    }

    info!("Seeding default checklist taxonomy");

    for (order, (slug, title, icon, items)) in DEFAULT_TAXONOMY.iter().enumerate() {
        sqlx::query("INSERT INTO categories (id, title, icon, sort_order) VALUES (?, ?, ?, ?)")
            .bind(slug)
            .bind(title)
            .bind(icon)
            .bind(order as i64)
            .execute(pool)
            .await?;

        for (item_order, description) in items.iter().enumerate() {
            sqlx::query(
                "INSERT INTO items (id, category_id, description, sort_order) VALUES (?, ?, ?, ?)",
            )
            .bind(uuid::Uuid::new_v4().to_string())
            .bind(slug)
            .bind(description)
            .bind(item_order as i64)
            .execute(pool)
            .await?;
        }
    }

    Ok(())
}

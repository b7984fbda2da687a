use sea_orm::{ConnectOptions, Database, DatabaseConnection, DbErr, SqlErr};
use std::path::Path;

use super::migration_runner;

fn build_sqlite_url(path: &Path) -> String {
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    format!("sqlite://{}{}?mode=rwc", prefix, normalized)
}

/// Открыть базу SQLite по пути из конфигурации и применить миграции
pub async fn initialize_database(db_file: &Path) -> anyhow::Result<DatabaseConnection> {
    if let Some(parent) = db_file.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let absolute_path = if db_file.is_absolute() {
        db_file.to_path_buf()
    } else {
        std::env::current_dir()?.join(db_file)
    };
    let db_url = build_sqlite_url(&absolute_path);

    let mut options = ConnectOptions::new(db_url);
    // SQLite: один писатель, иначе "database is locked" при параллельных импортах
    options.max_connections(1).sqlx_logging(false);
    let conn = Database::connect(options).await?;

    migration_runner::run_migrations(&conn).await?;
    tracing::info!("Database ready at {}", absolute_path.display());
    Ok(conn)
}

/// Нарушение UNIQUE при вставке: для get-or-create это сигнал
/// "запись уже создал параллельный импорт, перечитать и использовать её"
pub fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// In-memory база с применённой схемой для тестов
#[cfg(test)]
pub async fn test_connection() -> DatabaseConnection {
    let mut options = ConnectOptions::new("sqlite::memory:".to_string());
    options
        .max_connections(1)
        .min_connections(1)
        .sqlx_logging(false);
    let conn = Database::connect(options)
        .await
        .expect("in-memory sqlite");
    migration_runner::run_migrations(&conn)
        .await
        .expect("migrations");
    conn
}

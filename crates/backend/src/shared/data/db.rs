use sea_orm::{ConnectionTrait, Database, DatabaseBackend, DatabaseConnection, Statement};
use std::path::Path;

const CREATE_PRODUCTOS_VENDER_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS productos_vender (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        item_number INTEGER NOT NULL,
        codigo TEXT NOT NULL,
        municipio TEXT NOT NULL DEFAULT '',
        categoria TEXT NOT NULL DEFAULT '',
        producto TEXT NOT NULL DEFAULT '',
        presentacion TEXT NOT NULL DEFAULT '',
        costo_pcc REAL NOT NULL DEFAULT 0,
        porcentaje_logistica REAL NOT NULL DEFAULT 0,
        porcentaje_transporte REAL NOT NULL DEFAULT 0,
        precio_sugerido REAL NOT NULL DEFAULT 0,
        precio_venta REAL NOT NULL DEFAULT 0,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );
"#;

fn build_sqlite_url(path: &Path) -> String {
    // Normalize path separators and ensure proper URL form on Windows
    let normalized = path.to_string_lossy().replace('\\', "/");
    let needs_leading_slash = !normalized.starts_with('/') && normalized.contains(':');
    let prefix = if needs_leading_slash { "/" } else { "" };
    format!("sqlite://{}{}?mode=rwc", prefix, normalized)
}

/// Открывает SQLite базу (создаёт файл и директорию при необходимости)
/// и гарантирует наличие таблицы каталога.
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
    let conn = Database::connect(&db_url).await?;

    conn.execute(Statement::from_string(
        DatabaseBackend::Sqlite,
        CREATE_PRODUCTOS_VENDER_SQL.to_string(),
    ))
    .await?;

    tracing::info!("Database ready at {}", absolute_path.display());
    Ok(conn)
}

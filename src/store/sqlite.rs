use std::path::{Path, PathBuf};

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};

use crate::error::AppError;

/// Small key-value store for values that must survive restarts (the API key).
pub struct SqliteStore {
    db_path: PathBuf,
}

impl SqliteStore {
    pub fn new(app_name: &str) -> Result<Self, AppError> {
        let db_path = default_sqlite_path(app_name)?;
        Self::open_at(db_path)
    }

    pub fn open_at(path: impl AsRef<Path>) -> Result<Self, AppError> {
        let db_path = resolve(expand_tilde(path.as_ref().to_path_buf()))?;
        init_db(&db_path)?;
        tracing::debug!(path = %db_path.display(), "opened credential store");
        Ok(Self { db_path })
    }

    pub fn path(&self) -> &Path {
        &self.db_path
    }

    pub fn credential_get(&self, name: &str) -> Result<Option<String>, AppError> {
        let conn = self.open()?;
        let value = conn
            .query_row(
                "SELECT value FROM credentials WHERE name=?1;",
                params![name],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }

    pub fn credential_set(&self, name: &str, value: &str) -> Result<(), AppError> {
        let conn = self.open()?;
        conn.execute(
            r#"
            INSERT INTO credentials(name, value, updated_at)
            VALUES(?1, ?2, ?3)
            ON CONFLICT(name) DO UPDATE SET
                value=excluded.value,
                updated_at=excluded.updated_at;
            "#,
            params![name, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    pub fn credential_delete(&self, name: &str) -> Result<(), AppError> {
        let conn = self.open()?;
        conn.execute("DELETE FROM credentials WHERE name=?1;", params![name])?;
        Ok(())
    }

    fn open(&self) -> Result<Connection, AppError> {
        Ok(Connection::open(&self.db_path)?)
    }
}

fn init_db(db_path: &Path) -> Result<(), AppError> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| AppError::Message(e.to_string()))?;
    }

    let conn = Connection::open(db_path)?;
    conn.execute_batch(
        r#"
        PRAGMA journal_mode=WAL;
        PRAGMA synchronous=NORMAL;

        CREATE TABLE IF NOT EXISTS schema_version (version INTEGER NOT NULL);
        INSERT INTO schema_version(version)
        SELECT 1
        WHERE NOT EXISTS (SELECT 1 FROM schema_version);

        CREATE TABLE IF NOT EXISTS credentials (
            name TEXT PRIMARY KEY,
            value TEXT NOT NULL,
            updated_at TEXT
        );
        "#,
    )?;

    Ok(())
}

fn resolve(path: PathBuf) -> Result<PathBuf, AppError> {
    if path.is_relative() {
        return Ok(std::env::current_dir()
            .map_err(|e| AppError::Message(e.to_string()))?
            .join(path));
    }
    Ok(path)
}

fn default_sqlite_path(app_name: &str) -> Result<PathBuf, AppError> {
    if let Ok(override_path) = std::env::var("STORE_SQLITE_PATH") {
        return resolve(expand_tilde(PathBuf::from(override_path)));
    }

    let home = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()));

    #[cfg(target_os = "macos")]
    {
        return Ok(home
            .join("Library")
            .join("Application Support")
            .join(app_name)
            .join("app.db"));
    }

    #[cfg(target_os = "windows")]
    {
        let base = std::env::var("LOCALAPPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join("AppData").join("Local"));
        return Ok(base.join(app_name).join("app.db"));
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        let base = std::env::var("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home.join(".local").join("share"));
        return Ok(base.join(app_name).join("app.db"));
    }
}

fn expand_tilde(path: PathBuf) -> PathBuf {
    let s = path.to_string_lossy().to_string();
    let home = || PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".to_string()));
    if s == "~" {
        return home();
    }
    if let Some(rest) = s.strip_prefix("~/") {
        return home().join(rest);
    }
    path
}

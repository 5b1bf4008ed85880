use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use super::data::{Account, ADMIN_USERNAME};
use super::records::UserRecord;
use crate::error::{CatalogError, CatalogResult};
use crate::model::{AccountKind, User};

/// The CatalogStore manages the SQLite catalog database.
/// It stores the account registry and one serialized catalog graph per user.
pub struct CatalogStore {
    conn: Connection,
    db_path: PathBuf,
}

impl CatalogStore {
    /// Open (or create) the catalog database at `db_path`.
    ///
    /// The parent directory is created if it does not exist yet.
    pub fn open(db_path: &Path) -> CatalogResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(db_path)?;
        info!("Catalog database opened at {}", db_path.display());

        let store = CatalogStore {
            conn,
            db_path: db_path.to_path_buf(),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// A throwaway catalog living only in memory
    pub fn open_in_memory() -> CatalogResult<Self> {
        let store = CatalogStore {
            conn: Connection::open_in_memory()?,
            db_path: PathBuf::from(":memory:"),
        };
        store.init_schema()?;
        Ok(store)
    }

    /// Initialize the database schema.
    /// Creates all necessary tables if they don't exist.
    fn init_schema(&self) -> CatalogResult<()> {
        // Account registry; position keeps insertion order
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS accounts (
                username        TEXT PRIMARY KEY,
                kind            TEXT NOT NULL,
                position        INTEGER NOT NULL
            )",
            [],
        )?;

        // One JSON document per user holding albums, photos and tags
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS user_catalogs (
                username        TEXT PRIMARY KEY,
                format          INTEGER NOT NULL,
                graph_json      TEXT NOT NULL,
                saved_at        INTEGER NOT NULL
            )",
            [],
        )?;

        debug!("Catalog schema initialized");
        Ok(())
    }

    /// Get the path to the database file
    pub fn path(&self) -> &Path {
        &self.db_path
    }

    // ========================
    // Per-user catalogs
    // ========================

    /// Serialize a user's whole graph, replacing any earlier record atomically
    pub fn save_user_data(&self, user: &User) -> CatalogResult<()> {
        write_catalog(&self.conn, user)
    }

    /// Rebuild a user from its stored record
    pub fn load_user_data(&self, username: &str) -> CatalogResult<User> {
        let json: Option<String> = self
            .conn
            .query_row(
                "SELECT graph_json FROM user_catalogs WHERE username = ?1",
                [username],
                |row| row.get(0),
            )
            .optional()?;

        let json = json.ok_or_else(|| CatalogError::UserNotFound(username.to_string()))?;
        let record = UserRecord::from_json(&json)
            .map_err(|e| CatalogError::corrupt(username, e.to_string()))?;
        let user = record.into_user(username)?;

        debug!(
            "Loaded catalog for {} ({} albums)",
            username,
            user.albums().len()
        );
        Ok(user)
    }

    pub fn has_user_data(&self, username: &str) -> CatalogResult<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM user_catalogs WHERE username = ?1",
            [username],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }

    /// Drop a user's stored catalog. Returns whether one existed.
    pub fn delete_user_data(&self, username: &str) -> CatalogResult<bool> {
        delete_catalog(&self.conn, username)
    }

    // ========================
    // Account registry
    // ========================

    /// Read the registry in insertion order
    pub fn get_users_map(&self) -> CatalogResult<Vec<Account>> {
        let mut stmt = self
            .conn
            .prepare("SELECT username, kind FROM accounts ORDER BY position")?;

        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        rows.into_iter()
            .map(|(username, kind)| match AccountKind::parse(&kind) {
                Some(kind) => Ok(Account { username, kind }),
                None => Err(CatalogError::corrupt(
                    &username,
                    format!("unknown account kind '{}'", kind),
                )),
            })
            .collect()
    }

    /// Replace the whole registry. Last writer wins.
    pub fn save_users_map(&mut self, accounts: &[Account]) -> CatalogResult<()> {
        let tx = self.conn.transaction()?;
        write_registry(&tx, accounts)?;
        tx.commit()?;
        Ok(())
    }

    /// Write the registry and a new account's initial catalog together
    pub fn register_account(&mut self, accounts: &[Account], user: &User) -> CatalogResult<()> {
        let tx = self.conn.transaction()?;
        write_registry(&tx, accounts)?;
        write_catalog(&tx, user)?;
        tx.commit()?;
        Ok(())
    }

    /// Write the registry and drop the removed account's catalog together
    pub fn remove_account(&mut self, accounts: &[Account], username: &str) -> CatalogResult<()> {
        let tx = self.conn.transaction()?;
        write_registry(&tx, accounts)?;
        delete_catalog(&tx, username)?;
        tx.commit()?;
        Ok(())
    }

    /// First run: create the built-in admin account. Later runs: load the
    /// existing registry.
    pub fn initialize_data(&mut self) -> CatalogResult<Vec<Account>> {
        let accounts = self.get_users_map()?;
        if !accounts.is_empty() {
            info!("Loaded {} accounts from the registry", accounts.len());
            return Ok(accounts);
        }

        let accounts = vec![Account::admin(ADMIN_USERNAME)];
        let admin = User::with_kind(ADMIN_USERNAME, AccountKind::Admin);
        self.register_account(&accounts, &admin)?;
        info!("Created built-in '{}' account", ADMIN_USERNAME);
        Ok(accounts)
    }
}

fn write_registry(conn: &Connection, accounts: &[Account]) -> CatalogResult<()> {
    conn.execute("DELETE FROM accounts", [])?;
    let mut stmt =
        conn.prepare("INSERT INTO accounts (username, kind, position) VALUES (?1, ?2, ?3)")?;
    for (position, account) in accounts.iter().enumerate() {
        stmt.execute(params![
            account.username,
            account.kind.as_str(),
            position as i64
        ])?;
    }
    debug!("Registry written with {} accounts", accounts.len());
    Ok(())
}

fn write_catalog(conn: &Connection, user: &User) -> CatalogResult<()> {
    let record = UserRecord::from_user(user);
    let json = record.to_json()?;
    conn.execute(
        "INSERT INTO user_catalogs (username, format, graph_json, saved_at)
         VALUES (?1, ?2, ?3, ?4)
         ON CONFLICT(username) DO UPDATE SET
            format = excluded.format,
            graph_json = excluded.graph_json,
            saved_at = excluded.saved_at",
        params![
            user.username(),
            record.format,
            json,
            Utc::now().timestamp()
        ],
    )?;
    debug!(
        "Saved catalog for {} ({} albums, {} photos)",
        user.username(),
        record.albums.len(),
        record.photos.len()
    );
    Ok(())
}

fn delete_catalog(conn: &Connection, username: &str) -> CatalogResult<bool> {
    let removed = conn.execute(
        "DELETE FROM user_catalogs WHERE username = ?1",
        [username],
    )?;
    Ok(removed > 0)
}

// Implement Debug for better error messages
impl std::fmt::Debug for CatalogStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogStore")
            .field("db_path", &self.db_path)
            .finish()
    }
}

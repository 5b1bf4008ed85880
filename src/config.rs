//! Catalog location settings
//!
//! The database lives in the user's data directory by default:
//! - Linux: ~/.local/share/photo-albums/catalog.db
//! - macOS: ~/Library/Application Support/photo-albums/catalog.db
//! - Windows: %APPDATA%\photo-albums\catalog.db

use std::io;
use std::path::{Path, PathBuf};

use crate::error::{CatalogError, CatalogResult};
use crate::state::library::CatalogStore;

/// Overrides the data directory
pub const DATA_DIR_ENV: &str = "PHOTO_ALBUMS_DATA_DIR";
/// Folder of images used to seed the `stock` account on first run
pub const STOCK_DIR_ENV: &str = "PHOTO_ALBUMS_STOCK_DIR";

const APP_DIR: &str = "photo-albums";
const DATABASE_FILE: &str = "catalog.db";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub data_dir: PathBuf,
    pub stock_dir: Option<PathBuf>,
}

impl StoreConfig {
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            stock_dir: None,
        }
    }

    /// Resolve settings from the process environment
    pub fn from_env() -> CatalogResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Resolve settings from any variable source
    pub fn from_lookup<F>(lookup: F) -> CatalogResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let data_dir = match non_empty(lookup(DATA_DIR_ENV)) {
            Some(dir) => PathBuf::from(dir),
            None => default_data_dir()?,
        };
        Ok(Self {
            data_dir,
            stock_dir: non_empty(lookup(STOCK_DIR_ENV)).map(PathBuf::from),
        })
    }

    pub fn database_path(&self) -> PathBuf {
        self.data_dir.join(DATABASE_FILE)
    }

    pub fn open_store(&self) -> CatalogResult<CatalogStore> {
        CatalogStore::open(&self.database_path())
    }

    pub fn stock_dir(&self) -> Option<&Path> {
        self.stock_dir.as_deref()
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn default_data_dir() -> CatalogResult<PathBuf> {
    let mut path = dirs::data_dir()
        .or_else(dirs::home_dir)
        .ok_or_else(|| {
            CatalogError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                "could not determine user data directory",
            ))
        })?;
    path.push(APP_DIR);
    Ok(path)
}

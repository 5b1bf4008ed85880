//! Photo catalog engine
//!
//! Users own albums of photos; photos carry a caption, a timestamp and typed
//! tags. The catalog of each user is persisted as a unit in a SQLite database,
//! next to a registry of accounts managed by an administrator.

pub mod config;
pub mod error;
pub mod import;
pub mod logging;
pub mod model;
pub mod search;
pub mod state;

pub use config::StoreConfig;
pub use error::{CatalogError, CatalogResult};
pub use import::{import_folder, ImportSummary};
pub use model::{AccountKind, Album, Arity, Photo, SharedPhoto, Tag, TagTypes, User};
pub use search::TagQuery;
pub use state::data::{Account, ADMIN_USERNAME, STOCK_USERNAME};
pub use state::directory::{AdminDirectory, Directory};
pub use state::library::CatalogStore;

//! Account directory
//!
//! [`Directory`] is the process-wide context: it is built once at startup by
//! [`Directory::initialize`], owns the catalog store and the in-memory account
//! registry, and is flushed by [`Directory::close`] on exit. Account
//! management goes through [`AdminDirectory`], which can only be obtained for
//! an admin account.

use std::path::Path;

use tracing::{info, warn};

use super::data::{Account, ADMIN_USERNAME, STOCK_USERNAME};
use super::library::CatalogStore;
use crate::error::{CatalogError, CatalogResult};
use crate::import::import_folder;
use crate::model::{Album, User};

pub struct Directory {
    store: CatalogStore,
    accounts: Vec<Account>,
}

impl Directory {
    /// Bootstrap the registry (creating the admin account on first run)
    pub fn initialize(mut store: CatalogStore) -> CatalogResult<Self> {
        let accounts = store.initialize_data()?;
        Ok(Self { store, accounts })
    }

    /// Like [`initialize`](Self::initialize), also seeding the `stock`
    /// account from `stock_dir` if it does not exist yet
    pub fn initialize_with_stock(store: CatalogStore, stock_dir: &Path) -> CatalogResult<Self> {
        let mut directory = Self::initialize(store)?;
        if directory.account(STOCK_USERNAME).is_none() {
            directory.seed_stock(stock_dir)?;
        }
        Ok(directory)
    }

    fn seed_stock(&mut self, stock_dir: &Path) -> CatalogResult<()> {
        let mut user = User::new(STOCK_USERNAME);
        user.create_album(Album::new(STOCK_USERNAME))?;
        let summary = import_folder(&mut user, STOCK_USERNAME, stock_dir)?;
        self.register(user)?;
        info!(
            "Seeded '{}' account with {} photos from {}",
            STOCK_USERNAME,
            summary.imported,
            stock_dir.display()
        );
        Ok(())
    }

    /// Persist a new account and its catalog, then record it in memory
    fn register(&mut self, user: User) -> CatalogResult<()> {
        let mut next = self.accounts.clone();
        next.push(Account {
            username: user.username().to_string(),
            kind: user.kind(),
        });
        self.store.register_account(&next, &user)?;
        self.accounts = next;
        Ok(())
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    /// All accounts, admin included, in registration order
    pub fn accounts(&self) -> &[Account] {
        &self.accounts
    }

    pub fn account(&self, username: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.username == username)
    }

    fn require_account(&self, username: &str) -> CatalogResult<&Account> {
        self.account(username)
            .ok_or_else(|| CatalogError::UserNotFound(username.to_string()))
    }

    /// Load the catalog of a registered account
    pub fn login(&self, username: &str) -> CatalogResult<User> {
        self.require_account(username)?;
        let user = self.store.load_user_data(username)?;
        info!("{} logged in", username);
        Ok(user)
    }

    /// Persist a registered user's catalog, e.g. on logout
    pub fn save(&self, user: &User) -> CatalogResult<()> {
        self.require_account(user.username())?;
        user.save_user_data(&self.store)
    }

    /// Account management, available to admin accounts only
    pub fn admin(&mut self, acting: &User) -> CatalogResult<AdminDirectory<'_>> {
        let registered_admin = self
            .account(acting.username())
            .is_some_and(|a| a.is_admin());
        if !acting.is_admin() || !registered_admin {
            warn!("{} attempted an admin operation", acting.username());
            return Err(CatalogError::PermissionDenied {
                username: acting.username().to_string(),
            });
        }
        Ok(AdminDirectory { directory: self })
    }

    /// Rewrite the registry from memory
    pub fn flush(&mut self) -> CatalogResult<()> {
        self.store.save_users_map(&self.accounts)
    }

    /// Flush and release the store
    pub fn close(mut self) -> CatalogResult<()> {
        self.flush()?;
        info!("Catalog closed with {} accounts", self.accounts.len());
        Ok(())
    }
}

impl std::fmt::Debug for Directory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Directory")
            .field("store", &self.store)
            .field("accounts", &self.accounts.len())
            .finish()
    }
}

/// Create, delete and list regular accounts
pub struct AdminDirectory<'a> {
    directory: &'a mut Directory,
}

impl std::fmt::Debug for AdminDirectory<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminDirectory")
            .field("accounts", &self.directory.accounts.len())
            .finish()
    }
}

impl AdminDirectory<'_> {
    /// Register a regular account with an empty catalog
    pub fn create_user(&mut self, username: &str) -> CatalogResult<()> {
        if username.trim().is_empty() || username.trim() != username {
            return Err(CatalogError::InvalidUsername(username.to_string()));
        }
        // the builtin admin name is reserved in every letter case
        if username.eq_ignore_ascii_case(ADMIN_USERNAME) || self.directory.account(username).is_some() {
            return Err(CatalogError::DuplicateUser(username.to_string()));
        }

        self.directory.register(User::new(username))?;
        info!("Created account {}", username);
        Ok(())
    }

    /// Remove an account and its stored catalog. Image files are not touched.
    pub fn delete_user(&mut self, username: &str) -> CatalogResult<()> {
        let account = self.directory.require_account(username)?;
        if account.is_admin() || account.username == ADMIN_USERNAME {
            return Err(CatalogError::ProtectedAccount(username.to_string()));
        }

        let next: Vec<Account> = self
            .directory
            .accounts
            .iter()
            .filter(|a| a.username != username)
            .cloned()
            .collect();
        self.directory.store.remove_account(&next, username)?;
        self.directory.accounts = next;
        info!("Deleted account {}", username);
        Ok(())
    }

    /// Regular account names in registration order
    pub fn list_users(&self) -> Vec<&str> {
        self.directory
            .accounts
            .iter()
            .filter(|a| !a.is_admin())
            .map(|a| a.username.as_str())
            .collect()
    }
}

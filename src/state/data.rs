//! Shared data structures for the account registry
//!
//! These structs flow between the database layer and the directory layer.
use crate::model::AccountKind;

/// Username of the built-in administrator account
pub const ADMIN_USERNAME: &str = "admin";

/// Username of the account seeded from the stock photo folder
pub const STOCK_USERNAME: &str = "stock";

/// Minimal registry entry for one account
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Account {
    pub username: String,
    pub kind: AccountKind,
}

impl Account {
    pub fn regular(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            kind: AccountKind::Regular,
        }
    }

    pub fn admin(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            kind: AccountKind::Admin,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.kind == AccountKind::Admin
    }
}

/// State management module
///
/// This module handles all persisted state, including:
/// - Database connection and queries (library.rs)
/// - Account registry structures (data.rs)
/// - Serialized catalog graphs (records.rs)
/// - Process-wide account directory (directory.rs)

pub mod library;
pub mod data;
pub mod records;
pub mod directory;

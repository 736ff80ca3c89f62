/*!
 * Database module for the bilingual dictionary store.
 *
 * This module provides SQLite-based persistence for:
 * - Word tables, one per language side, unique by text
 * - Translations linking one word from each side, unique by pair
 * - Usage examples owned by translations, unique by (translation, text)
 */

pub mod connection;
pub mod models;
pub mod repository;
pub mod schema;

// Re-export main types
pub use connection::{DatabaseConnection, DatabaseStats};
pub use repository::Repository;

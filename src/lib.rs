/*!
 * # wordlink
 *
 * A bilingual dictionary storage engine managing word pairs, their
 * translations, and usage examples on top of SQLite.
 *
 * ## Features
 *
 * - Idempotent get-or-create for words, keyed by text per language side
 * - Idempotent translation linking, keyed by the word pair
 * - Idempotent example attachment, keyed by (translation, text)
 * - Bounded retry under concurrent uniqueness races
 * - Typed error taxonomy derived from store constraint signals
 * - Cascading deletes from words through translations to examples
 * - Explicit hydration of translation relations, no lazy loading
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `database`: SQLite persistence layer:
 *   - `database::connection`: Connection handling and async access
 *   - `database::schema`: Table definitions and version gate
 *   - `database::models`: Entity records and DTOs
 *   - `database::repository`: High-level dictionary operations
 * - `errors`: Custom error types for the storage layer
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod database;
pub mod errors;

// Re-export main types for easier usage
pub use database::models::{
    EntityKind, ExampleRecord, ExampleSpec, TranslationRecord, WordKind, WordRecord,
};
pub use database::{DatabaseConnection, DatabaseStats, Repository};
pub use errors::{DictionaryError, StoreResult};

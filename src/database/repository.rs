/*!
 * Repository layer for database operations.
 *
 * This module provides the high-level API for all dictionary operations,
 * abstracting away the SQL details and providing type-safe access.
 *
 * Creation operations are idempotent on their natural keys: a word upsert
 * keyed by text, a translation upsert keyed by its word pair, and an
 * example upsert keyed by (translation, text). Concurrent callers racing
 * on the same key are resolved optimistically: the insert is attempted,
 * a uniqueness violation means another writer won, and the whole
 * transactional unit is retried up to a fixed bound.
 */

use log::debug;
use rusqlite::{params, Connection, OptionalExtension};

use super::connection::DatabaseConnection;
use super::models::{
    EntityKind, ExampleRecord, ExampleSpec, TranslationRecord, WordKind, WordRecord,
};
use crate::errors::{is_foreign_key_violation, is_unique_violation, DictionaryError, StoreResult};

/// Retry bound for transactional units that lose uniqueness races
const MAX_LINK_ATTEMPTS: u32 = 3;

/// Repository for dictionary operations
#[derive(Clone)]
pub struct Repository {
    /// Database connection
    db: DatabaseConnection,
}

impl Repository {
    /// Create a new repository with the given database connection
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a repository with the default database location
    pub fn new_default() -> anyhow::Result<Self> {
        let db = DatabaseConnection::new_default()?;
        Ok(Self::new(db))
    }

    /// Create a repository with an in-memory database (for testing)
    pub fn new_in_memory() -> anyhow::Result<Self> {
        let db = DatabaseConnection::new_in_memory()?;
        Ok(Self::new(db))
    }

    /// Access the underlying connection (statistics, maintenance)
    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }

    // =========================================================================
    // Word Operations
    // =========================================================================

    /// Look up a word by text, inserting it if absent
    ///
    /// Safe under concurrent callers passing the same text: exactly one row
    /// results and every caller receives it. A lost race is retried with a
    /// fresh transaction up to `MAX_LINK_ATTEMPTS`.
    pub async fn get_or_create_word(&self, kind: WordKind, text: &str) -> StoreResult<WordRecord> {
        let text = text.to_string();

        for attempt in 1..=MAX_LINK_ATTEMPTS {
            let text = text.clone();
            let result = self
                .db
                .transaction_async(move |tx| Self::get_or_create_word_tx(tx, kind, &text))
                .await;

            match result {
                Err(err) if err.is_unique_violation() => {
                    debug!(
                        "get_or_create_word attempt {} lost a uniqueness race, retrying",
                        attempt
                    );
                    continue;
                }
                other => return other,
            }
        }

        Err(DictionaryError::ContentionExceeded)
    }

    /// Word upsert usable inside an enclosing transaction
    fn get_or_create_word_tx(conn: &Connection, kind: WordKind, text: &str) -> StoreResult<WordRecord> {
        let select = format!("SELECT id, text FROM {} WHERE text = ?1", kind.table());
        if let Some(word) = conn.query_row(&select, [text], Self::row_to_word).optional()? {
            return Ok(word);
        }

        let insert = format!("INSERT INTO {} (text) VALUES (?1)", kind.table());
        match conn.execute(&insert, [text]) {
            Ok(_) => Ok(WordRecord {
                id: conn.last_insert_rowid(),
                text: text.to_string(),
            }),
            Err(err) if is_unique_violation(&err) => {
                // Another writer committed this text between the read and the
                // insert. Re-read: if the winning row is visible here, it is
                // the result; otherwise bubble the violation so the caller
                // restarts the whole unit.
                match conn.query_row(&select, [text], Self::row_to_word).optional()? {
                    Some(word) => Ok(word),
                    None => Err(err.into()),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Get a word by id
    pub async fn get_word_by_id(&self, kind: WordKind, id: i64) -> StoreResult<WordRecord> {
        self.db
            .execute_async(move |conn| {
                let select = format!("SELECT id, text FROM {} WHERE id = ?1", kind.table());
                conn.query_row(&select, [id], Self::row_to_word)
                    .optional()?
                    .ok_or(DictionaryError::NotFound(kind.entity()))
            })
            .await
    }

    /// List all words of one variant in insertion order
    pub async fn list_words(&self, kind: WordKind) -> StoreResult<Vec<WordRecord>> {
        self.db
            .execute_async(move |conn| {
                let select = format!("SELECT id, text FROM {} ORDER BY id", kind.table());
                let mut stmt = conn.prepare(&select)?;
                let words = stmt
                    .query_map([], Self::row_to_word)?
                    .filter_map(|r| r.ok())
                    .collect();
                Ok(words)
            })
            .await
    }

    /// Change the text of an existing word
    ///
    /// Fails with `NotFound` if the id is absent and with `AlreadyExists`
    /// if the new text collides with another row. The collision is detected
    /// from the store's uniqueness signal, not a pre-check, so a concurrent
    /// insert of the same text cannot slip between check and update.
    pub async fn change_word_text(
        &self,
        kind: WordKind,
        id: i64,
        new_text: &str,
    ) -> StoreResult<WordRecord> {
        let new_text = new_text.to_string();

        self.db
            .transaction_async(move |tx| {
                let select = format!("SELECT id, text FROM {} WHERE id = ?1", kind.table());
                tx.query_row(&select, [id], Self::row_to_word)
                    .optional()?
                    .ok_or(DictionaryError::NotFound(kind.entity()))?;

                let update = format!("UPDATE {} SET text = ?1 WHERE id = ?2", kind.table());
                let updated = tx.execute(&update, params![new_text, id]);
                match updated {
                    Ok(_) => Ok(WordRecord { id, text: new_text }),
                    Err(err) if is_unique_violation(&err) => {
                        Err(DictionaryError::AlreadyExists(kind.entity()))
                    }
                    Err(err) => Err(err.into()),
                }
            })
            .await
    }

    // =========================================================================
    // Translation Operations
    // =========================================================================

    /// Resolve or create both words and the translation linking them, then
    /// attach the given examples, all in one transaction
    ///
    /// Idempotent on the word pair: if the translation already exists it is
    /// reused and any new example texts are attached to it. A uniqueness race
    /// on either word or on the pair itself rolls the unit back and retries
    /// from the top, up to `MAX_LINK_ATTEMPTS`; exhaustion surfaces as
    /// `ContentionExceeded`. The returned record is unhydrated.
    pub async fn add_translation(
        &self,
        source_text: &str,
        target_text: &str,
        examples: Vec<ExampleSpec>,
    ) -> StoreResult<TranslationRecord> {
        let source_text = source_text.to_string();
        let target_text = target_text.to_string();

        for attempt in 1..=MAX_LINK_ATTEMPTS {
            let source = source_text.clone();
            let target = target_text.clone();
            let specs = examples.clone();

            let result = self
                .db
                .transaction_async(move |tx| {
                    let source_word = Self::get_or_create_word_tx(tx, WordKind::Source, &source)?;
                    let target_word = Self::get_or_create_word_tx(tx, WordKind::Target, &target)?;
                    let translation =
                        Self::get_or_create_translation_tx(tx, source_word.id, target_word.id)?;

                    for spec in &specs {
                        Self::add_example_tx(tx, translation.id, &spec.text, spec.in_source_language)?;
                    }

                    Ok(translation)
                })
                .await;

            match result {
                Err(err) if err.is_unique_violation() => {
                    debug!(
                        "add_translation attempt {} lost a uniqueness race, retrying",
                        attempt
                    );
                    continue;
                }
                other => return other,
            }
        }

        Err(DictionaryError::ContentionExceeded)
    }

    /// Translation upsert keyed by the word pair, usable inside a transaction
    fn get_or_create_translation_tx(
        conn: &Connection,
        source_word_id: i64,
        target_word_id: i64,
    ) -> StoreResult<TranslationRecord> {
        let existing = conn
            .query_row(
                "SELECT id, source_word_id, target_word_id FROM translations
                 WHERE source_word_id = ?1 AND target_word_id = ?2",
                params![source_word_id, target_word_id],
                Self::row_to_translation,
            )
            .optional()?;
        if let Some(translation) = existing {
            return Ok(translation);
        }

        match conn.execute(
            "INSERT INTO translations (source_word_id, target_word_id) VALUES (?1, ?2)",
            params![source_word_id, target_word_id],
        ) {
            Ok(_) => Ok(TranslationRecord::new(
                conn.last_insert_rowid(),
                source_word_id,
                target_word_id,
            )),
            Err(err) if is_unique_violation(&err) => {
                let rerun = conn
                    .query_row(
                        "SELECT id, source_word_id, target_word_id FROM translations
                         WHERE source_word_id = ?1 AND target_word_id = ?2",
                        params![source_word_id, target_word_id],
                        Self::row_to_translation,
                    )
                    .optional()?;
                match rerun {
                    Some(translation) => Ok(translation),
                    None => Err(err.into()),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Get a translation by id, unhydrated
    pub async fn get_translation_by_id(&self, id: i64) -> StoreResult<TranslationRecord> {
        self.db
            .execute_async(move |conn| Self::get_translation_by_id_sync(conn, id))
            .await
    }

    /// Get a translation by id (synchronous version for use within hydration)
    fn get_translation_by_id_sync(conn: &Connection, id: i64) -> StoreResult<TranslationRecord> {
        conn.query_row(
            "SELECT id, source_word_id, target_word_id FROM translations WHERE id = ?1",
            [id],
            Self::row_to_translation,
        )
        .optional()?
        .ok_or(DictionaryError::NotFound(EntityKind::Translation))
    }

    /// List all translations, unhydrated
    pub async fn list_translations(&self) -> StoreResult<Vec<TranslationRecord>> {
        self.db
            .execute_async(|conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, source_word_id, target_word_id FROM translations ORDER BY id",
                )?;
                let translations = stmt
                    .query_map([], Self::row_to_translation)?
                    .filter_map(|r| r.ok())
                    .collect();
                Ok(translations)
            })
            .await
    }

    /// List translations whose source word has the given text, unhydrated
    pub async fn list_translations_by_source_text(
        &self,
        text: &str,
    ) -> StoreResult<Vec<TranslationRecord>> {
        let text = text.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, source_word_id, target_word_id FROM translations
                     WHERE source_word_id IN (SELECT id FROM source_words WHERE text = ?1)
                     ORDER BY id",
                )?;
                let translations = stmt
                    .query_map([&text], Self::row_to_translation)?
                    .filter_map(|r| r.ok())
                    .collect();
                Ok(translations)
            })
            .await
    }

    /// List translations whose target word has the given text, unhydrated
    pub async fn list_translations_by_target_text(
        &self,
        text: &str,
    ) -> StoreResult<Vec<TranslationRecord>> {
        let text = text.to_string();

        self.db
            .execute_async(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, source_word_id, target_word_id FROM translations
                     WHERE target_word_id IN (SELECT id FROM target_words WHERE text = ?1)
                     ORDER BY id",
                )?;
                let translations = stmt
                    .query_map([&text], Self::row_to_translation)?
                    .filter_map(|r| r.ok())
                    .collect();
                Ok(translations)
            })
            .await
    }

    // =========================================================================
    // Hydration
    // =========================================================================

    /// Load both words and the ordered example collection into a translation
    ///
    /// Re-reads the translation row first, so a record deleted by a
    /// concurrent caller surfaces as `NotFound` instead of stale data.
    pub async fn hydrate_translation(&self, translation: &mut TranslationRecord) -> StoreResult<()> {
        let id = translation.id;

        let hydrated = self
            .db
            .execute_async(move |conn| {
                let mut translation = Self::get_translation_by_id_sync(conn, id)?;

                translation.source_word = Some(
                    conn.query_row(
                        "SELECT id, text FROM source_words WHERE id = ?1",
                        [translation.source_word_id],
                        Self::row_to_word,
                    )
                    .optional()?
                    .ok_or(DictionaryError::NotFound(EntityKind::SourceWord))?,
                );
                translation.target_word = Some(
                    conn.query_row(
                        "SELECT id, text FROM target_words WHERE id = ?1",
                        [translation.target_word_id],
                        Self::row_to_word,
                    )
                    .optional()?
                    .ok_or(DictionaryError::NotFound(EntityKind::TargetWord))?,
                );
                translation.examples = Self::list_examples_sync(conn, id)?;

                Ok(translation)
            })
            .await?;

        *translation = hydrated;
        Ok(())
    }

    // =========================================================================
    // Example Operations
    // =========================================================================

    /// Attach an example to a translation
    ///
    /// Idempotent on (translation, text): an existing row is returned
    /// unchanged, ignoring a differing language flag on the duplicate call.
    /// A dangling translation id surfaces as `TranslationNotFound` via the
    /// foreign-key violation, never a pre-check.
    pub async fn add_example(
        &self,
        translation_id: i64,
        text: &str,
        in_source_language: bool,
    ) -> StoreResult<ExampleRecord> {
        let text = text.to_string();

        self.db
            .transaction_async(move |tx| {
                Self::add_example_tx(tx, translation_id, &text, in_source_language)
            })
            .await
    }

    /// Example upsert usable inside an enclosing transaction
    fn add_example_tx(
        conn: &Connection,
        translation_id: i64,
        text: &str,
        in_source_language: bool,
    ) -> StoreResult<ExampleRecord> {
        let existing = conn
            .query_row(
                "SELECT id, translation_id, text, in_source_language FROM examples
                 WHERE translation_id = ?1 AND text = ?2",
                params![translation_id, text],
                Self::row_to_example,
            )
            .optional()?;
        if let Some(example) = existing {
            return Ok(example);
        }

        match conn.execute(
            "INSERT INTO examples (translation_id, text, in_source_language) VALUES (?1, ?2, ?3)",
            params![translation_id, text, in_source_language],
        ) {
            Ok(_) => Ok(ExampleRecord {
                id: conn.last_insert_rowid(),
                translation_id,
                text: text.to_string(),
                in_source_language,
            }),
            Err(err) if is_foreign_key_violation(&err) => Err(DictionaryError::TranslationNotFound),
            Err(err) if is_unique_violation(&err) => {
                let rerun = conn
                    .query_row(
                        "SELECT id, translation_id, text, in_source_language FROM examples
                         WHERE translation_id = ?1 AND text = ?2",
                        params![translation_id, text],
                        Self::row_to_example,
                    )
                    .optional()?;
                match rerun {
                    Some(example) => Ok(example),
                    None => Err(err.into()),
                }
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Get an example by id
    pub async fn get_example_by_id(&self, id: i64) -> StoreResult<ExampleRecord> {
        self.db
            .execute_async(move |conn| {
                conn.query_row(
                    "SELECT id, translation_id, text, in_source_language FROM examples WHERE id = ?1",
                    [id],
                    Self::row_to_example,
                )
                .optional()?
                .ok_or(DictionaryError::NotFound(EntityKind::Example))
            })
            .await
    }

    /// List all examples of a translation in insertion order
    pub async fn list_examples(&self, translation_id: i64) -> StoreResult<Vec<ExampleRecord>> {
        self.db
            .execute_async(move |conn| Self::list_examples_sync(conn, translation_id))
            .await
    }

    /// List examples (synchronous version for use within hydration)
    fn list_examples_sync(conn: &Connection, translation_id: i64) -> StoreResult<Vec<ExampleRecord>> {
        let mut stmt = conn.prepare(
            "SELECT id, translation_id, text, in_source_language FROM examples
             WHERE translation_id = ?1 ORDER BY id",
        )?;
        let examples = stmt
            .query_map([translation_id], Self::row_to_example)?
            .filter_map(|r| r.ok())
            .collect();
        Ok(examples)
    }

    /// Change the text of an existing example
    ///
    /// Fails with `NotFound` if the id is absent and with `AlreadyExists`
    /// if a sibling example of the same translation already has the text.
    pub async fn change_example_text(&self, id: i64, new_text: &str) -> StoreResult<ExampleRecord> {
        let new_text = new_text.to_string();

        self.db
            .transaction_async(move |tx| {
                let mut example = tx
                    .query_row(
                        "SELECT id, translation_id, text, in_source_language FROM examples WHERE id = ?1",
                        [id],
                        Self::row_to_example,
                    )
                    .optional()?
                    .ok_or(DictionaryError::NotFound(EntityKind::Example))?;

                let updated = tx.execute(
                    "UPDATE examples SET text = ?1 WHERE id = ?2",
                    params![new_text, id],
                );
                match updated {
                    Ok(_) => {
                        example.text = new_text;
                        Ok(example)
                    }
                    Err(err) if is_unique_violation(&err) => {
                        Err(DictionaryError::AlreadyExists(EntityKind::Example))
                    }
                    Err(err) => Err(err.into()),
                }
            })
            .await
    }

    // =========================================================================
    // Deletion Gateway
    // =========================================================================

    /// Delete any entity by kind and primary key
    ///
    /// Dependent rows are removed by the schema's cascade rules: a word
    /// delete takes its translations and their examples with it, a
    /// translation delete takes its examples. Deleting an absent id is a
    /// silent success.
    pub async fn delete_entity(&self, kind: EntityKind, id: i64) -> StoreResult<()> {
        self.db
            .execute_async(move |conn| {
                let sql = format!("DELETE FROM {} WHERE id = ?1", kind.table());
                let deleted = conn.execute(&sql, [id])?;
                debug!("Deleted {} row(s) from {} with id {}", deleted, kind.table(), id);
                Ok(())
            })
            .await
    }

    // =========================================================================
    // Row mappers
    // =========================================================================

    fn row_to_word(row: &rusqlite::Row) -> rusqlite::Result<WordRecord> {
        Ok(WordRecord {
            id: row.get(0)?,
            text: row.get(1)?,
        })
    }

    fn row_to_translation(row: &rusqlite::Row) -> rusqlite::Result<TranslationRecord> {
        Ok(TranslationRecord::new(row.get(0)?, row.get(1)?, row.get(2)?))
    }

    fn row_to_example(row: &rusqlite::Row) -> rusqlite::Result<ExampleRecord> {
        Ok(ExampleRecord {
            id: row.get(0)?,
            translation_id: row.get(1)?,
            text: row.get(2)?,
            in_source_language: row.get(3)?,
        })
    }
}

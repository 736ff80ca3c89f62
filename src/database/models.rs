/*!
 * Database entity models and DTOs.
 *
 * These structures map directly to database tables. Translation records
 * carry their related words and examples only after explicit hydration;
 * a bare read returns foreign-key ids with the nested fields empty.
 */

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language side of a word table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WordKind {
    /// Source-language vocabulary entry
    Source,
    /// Target-language vocabulary entry
    Target,
}

impl WordKind {
    /// Table backing this word variant
    pub fn table(&self) -> &'static str {
        match self {
            WordKind::Source => "source_words",
            WordKind::Target => "target_words",
        }
    }

    /// Entity kind for error reporting
    pub fn entity(&self) -> EntityKind {
        match self {
            WordKind::Source => EntityKind::SourceWord,
            WordKind::Target => EntityKind::TargetWord,
        }
    }
}

impl fmt::Display for WordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WordKind::Source => write!(f, "source"),
            WordKind::Target => write!(f, "target"),
        }
    }
}

impl std::str::FromStr for WordKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "source" => Ok(WordKind::Source),
            "target" => Ok(WordKind::Target),
            _ => Err(anyhow::anyhow!("Invalid word kind: {}", s)),
        }
    }
}

/// Entity kinds addressable by the deletion gateway and error taxonomy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    /// Source-language word
    SourceWord,
    /// Target-language word
    TargetWord,
    /// Word-pair link
    Translation,
    /// Usage example attached to a translation
    Example,
}

impl EntityKind {
    /// Table holding rows of this kind
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::SourceWord => "source_words",
            EntityKind::TargetWord => "target_words",
            EntityKind::Translation => "translations",
            EntityKind::Example => "examples",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::SourceWord => write!(f, "source word"),
            EntityKind::TargetWord => write!(f, "target word"),
            EntityKind::Translation => write!(f, "translation"),
            EntityKind::Example => write!(f, "example"),
        }
    }
}

impl std::str::FromStr for EntityKind {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', " ").replace('-', " ").as_str() {
            "source word" => Ok(EntityKind::SourceWord),
            "target word" => Ok(EntityKind::TargetWord),
            "translation" => Ok(EntityKind::Translation),
            "example" => Ok(EntityKind::Example),
            _ => Err(anyhow::anyhow!("Invalid entity kind: {}", s)),
        }
    }
}

/// Single-language vocabulary entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRecord {
    /// Database ID
    pub id: i64,
    /// Word text, unique within its variant table
    pub text: String,
}

/// Word-pair link owning a collection of examples
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRecord {
    /// Database ID
    pub id: i64,
    /// Source-language word ID
    pub source_word_id: i64,
    /// Target-language word ID
    pub target_word_id: i64,
    /// Source word, populated by hydration only
    pub source_word: Option<WordRecord>,
    /// Target word, populated by hydration only
    pub target_word: Option<WordRecord>,
    /// Examples in insertion order, populated by hydration only
    pub examples: Vec<ExampleRecord>,
}

impl TranslationRecord {
    /// Create a bare record from foreign-key ids
    pub fn new(id: i64, source_word_id: i64, target_word_id: i64) -> Self {
        Self {
            id,
            source_word_id,
            target_word_id,
            source_word: None,
            target_word: None,
            examples: Vec::new(),
        }
    }

    /// Whether related words have been loaded
    pub fn is_hydrated(&self) -> bool {
        self.source_word.is_some() && self.target_word.is_some()
    }
}

/// Usage example row scoped to a translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleRecord {
    /// Database ID
    pub id: i64,
    /// Owning translation ID
    pub translation_id: i64,
    /// Example sentence, unique within its translation
    pub text: String,
    /// Whether the sentence is written in the source language
    pub in_source_language: bool,
}

/// Input value for attaching an example to a translation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExampleSpec {
    /// Example sentence
    pub text: String,
    /// Whether the sentence is written in the source language
    pub in_source_language: bool,
}

impl ExampleSpec {
    /// Create a new example spec
    pub fn new(text: impl Into<String>, in_source_language: bool) -> Self {
        Self {
            text: text.into(),
            in_source_language,
        }
    }
}

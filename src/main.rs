// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::Result;
use clap::{Parser, Subcommand, ValueEnum};
use log::{debug, LevelFilter};
use std::path::PathBuf;

use crate::database::models::{EntityKind, ExampleSpec, WordKind};
use crate::database::{DatabaseConnection, Repository};

mod database;
mod errors;

/// CLI Wrapper for WordKind to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliWordKind {
    Source,
    Target,
}

impl From<CliWordKind> for WordKind {
    fn from(cli_kind: CliWordKind) -> Self {
        match cli_kind {
            CliWordKind::Source => WordKind::Source,
            CliWordKind::Target => WordKind::Target,
        }
    }
}

/// CLI Wrapper for EntityKind to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliEntityKind {
    SourceWord,
    TargetWord,
    Translation,
    Example,
}

impl From<CliEntityKind> for EntityKind {
    fn from(cli_kind: CliEntityKind) -> Self {
        match cli_kind {
            CliEntityKind::SourceWord => EntityKind::SourceWord,
            CliEntityKind::TargetWord => EntityKind::TargetWord,
            CliEntityKind::Translation => EntityKind::Translation,
            CliEntityKind::Example => EntityKind::Example,
        }
    }
}

/// CLI Wrapper for log levels to implement ValueEnum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for LevelFilter {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => LevelFilter::Error,
            CliLogLevel::Warn => LevelFilter::Warn,
            CliLogLevel::Info => LevelFilter::Info,
            CliLogLevel::Debug => LevelFilter::Debug,
            CliLogLevel::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Add a word to one side of the dictionary (idempotent)
    AddWord {
        /// Language side of the word
        #[arg(short, long, value_enum)]
        kind: CliWordKind,
        /// Word text
        text: String,
    },

    /// List all words on one side of the dictionary
    ListWords {
        /// Language side to list
        #[arg(short, long, value_enum)]
        kind: CliWordKind,
    },

    /// Change the text of an existing word
    ChangeWord {
        /// Language side of the word
        #[arg(short, long, value_enum)]
        kind: CliWordKind,
        /// Word id
        id: i64,
        /// New text
        text: String,
    },

    /// Create a translation between a source and a target word (idempotent)
    AddTranslation {
        /// Source-language word text
        source: String,
        /// Target-language word text
        target: String,
        /// Example sentence in the source language (repeatable)
        #[arg(long = "source-example", value_name = "TEXT")]
        source_examples: Vec<String>,
        /// Example sentence in the target language (repeatable)
        #[arg(long = "target-example", value_name = "TEXT")]
        target_examples: Vec<String>,
    },

    /// Show a translation with its words and examples
    Show {
        /// Translation id
        id: i64,
    },

    /// List translations, optionally filtered by word text
    List {
        /// Only translations of this source word text
        #[arg(short, long, conflicts_with = "target")]
        source: Option<String>,
        /// Only translations of this target word text
        #[arg(short, long)]
        target: Option<String>,
    },

    /// Attach an example to an existing translation (idempotent)
    AddExample {
        /// Translation id
        translation_id: i64,
        /// Example sentence
        text: String,
        /// The sentence is written in the source language
        #[arg(long)]
        in_source: bool,
    },

    /// Change the text of an existing example
    ChangeExample {
        /// Example id
        id: i64,
        /// New text
        text: String,
    },

    /// Delete an entity by kind and id, cascading to dependents
    Delete {
        /// Entity kind
        #[arg(short, long, value_enum)]
        kind: CliEntityKind,
        /// Entity id
        id: i64,
    },

    /// Show database statistics
    Stats,
}

/// wordlink - bilingual dictionary store
///
/// Manages word pairs, their translations, and usage examples in a local
/// SQLite database. Creation commands are idempotent: repeating them never
/// produces duplicate rows.
#[derive(Parser, Debug)]
#[command(name = "wordlink")]
#[command(version = "1.0.0")]
#[command(about = "Bilingual dictionary store")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Commands,

    /// Database file path (defaults to the user data directory)
    #[arg(short, long, env = "WORDLINK_DB")]
    database: Option<PathBuf>,

    /// Set logging level
    #[arg(short, long, value_enum, default_value = "warn")]
    log_level: CliLogLevel,
}

#[tokio::main]
async fn main() -> Result<()> {
    let options = CommandLineOptions::parse();

    env_logger::Builder::new()
        .filter_level(options.log_level.into())
        .parse_default_env()
        .init();

    let db = match &options.database {
        Some(path) => DatabaseConnection::new(path)?,
        None => DatabaseConnection::new_default()?,
    };
    debug!("Using database at {:?}", db.path());
    let repo = Repository::new(db);

    match options.command {
        Commands::AddWord { kind, text } => {
            let word = repo.get_or_create_word(kind.into(), &text).await?;
            println!("{}", serde_json::to_string_pretty(&word)?);
        }
        Commands::ListWords { kind } => {
            let words = repo.list_words(kind.into()).await?;
            println!("{}", serde_json::to_string_pretty(&words)?);
        }
        Commands::ChangeWord { kind, id, text } => {
            let word = repo.change_word_text(kind.into(), id, &text).await?;
            println!("{}", serde_json::to_string_pretty(&word)?);
        }
        Commands::AddTranslation {
            source,
            target,
            source_examples,
            target_examples,
        } => {
            let examples: Vec<ExampleSpec> = source_examples
                .into_iter()
                .map(|text| ExampleSpec::new(text, true))
                .chain(
                    target_examples
                        .into_iter()
                        .map(|text| ExampleSpec::new(text, false)),
                )
                .collect();

            let mut translation = repo.add_translation(&source, &target, examples).await?;
            repo.hydrate_translation(&mut translation).await?;
            println!("{}", serde_json::to_string_pretty(&translation)?);
        }
        Commands::Show { id } => {
            let mut translation = repo.get_translation_by_id(id).await?;
            repo.hydrate_translation(&mut translation).await?;
            println!("{}", serde_json::to_string_pretty(&translation)?);
        }
        Commands::List { source, target } => {
            let mut translations = match (source, target) {
                (Some(text), _) => repo.list_translations_by_source_text(&text).await?,
                (None, Some(text)) => repo.list_translations_by_target_text(&text).await?,
                (None, None) => repo.list_translations().await?,
            };
            for translation in &mut translations {
                repo.hydrate_translation(translation).await?;
            }
            println!("{}", serde_json::to_string_pretty(&translations)?);
        }
        Commands::AddExample {
            translation_id,
            text,
            in_source,
        } => {
            let example = repo.add_example(translation_id, &text, in_source).await?;
            println!("{}", serde_json::to_string_pretty(&example)?);
        }
        Commands::ChangeExample { id, text } => {
            let example = repo.change_example_text(id, &text).await?;
            println!("{}", serde_json::to_string_pretty(&example)?);
        }
        Commands::Delete { kind, id } => {
            repo.delete_entity(kind.into(), id).await?;
            println!("deleted");
        }
        Commands::Stats => {
            let stats = repo.connection().stats()?;
            println!("{}", stats);
        }
    }

    Ok(())
}

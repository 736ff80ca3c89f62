/*!
 * End-to-end cascade and persistence tests against an on-disk database.
 */

use tempfile::TempDir;

use wordlink::{
    DatabaseConnection, DictionaryError, EntityKind, ExampleSpec, Repository, WordKind,
};

fn create_file_repo(dir: &TempDir) -> Repository {
    let db = DatabaseConnection::new(dir.path().join("dictionary.db"))
        .expect("Failed to create file-backed database");
    Repository::new(db)
}

#[tokio::test]
async fn test_addTranslation_thenHydrate_shouldExposeWordsAndExamples() {
    let dir = TempDir::new().unwrap();
    let repo = create_file_repo(&dir);

    let mut translation = repo
        .add_translation("kot", "cat", vec![ExampleSpec::new("Ala ma kota", true)])
        .await
        .unwrap();
    repo.hydrate_translation(&mut translation).await.unwrap();

    assert_eq!(translation.source_word.as_ref().unwrap().text, "kot");
    assert_eq!(translation.target_word.as_ref().unwrap().text, "cat");
    assert_eq!(translation.examples.len(), 1);
    assert_eq!(translation.examples[0].text, "Ala ma kota");
    assert!(translation.examples[0].in_source_language);
}

#[tokio::test]
async fn test_reopenDatabase_shouldSeePersistedRows() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dictionary.db");

    {
        let repo = Repository::new(DatabaseConnection::new(&path).unwrap());
        repo.add_translation("chleb", "bread", vec![ExampleSpec::new("świeży chleb", true)])
            .await
            .unwrap();
    }

    let repo = Repository::new(DatabaseConnection::new(&path).unwrap());
    let mut translations = repo.list_translations().await.unwrap();
    assert_eq!(translations.len(), 1);

    repo.hydrate_translation(&mut translations[0]).await.unwrap();
    assert_eq!(translations[0].source_word.as_ref().unwrap().text, "chleb");
    assert_eq!(translations[0].examples.len(), 1);
}

#[tokio::test]
async fn test_deleteWord_onDisk_shouldCascadeThroughTranslationsAndExamples() {
    let dir = TempDir::new().unwrap();
    let repo = create_file_repo(&dir);

    let translation = repo
        .add_translation(
            "książka",
            "book",
            vec![
                ExampleSpec::new("Książki mają strony", true),
                ExampleSpec::new("Books are heavy", false),
            ],
        )
        .await
        .unwrap();

    repo.delete_entity(EntityKind::SourceWord, translation.source_word_id)
        .await
        .unwrap();

    assert!(repo.list_translations().await.unwrap().is_empty());
    assert!(repo.list_examples(translation.id).await.unwrap().is_empty());
    assert!(repo.list_words(WordKind::Source).await.unwrap().is_empty());
    assert_eq!(repo.list_words(WordKind::Target).await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_deleteTranslation_shouldLeaveBothWords() {
    let dir = TempDir::new().unwrap();
    let repo = create_file_repo(&dir);

    let translation = repo
        .add_translation(
            "dziecko",
            "child",
            vec![ExampleSpec::new("Dziecko je cukierka", true)],
        )
        .await
        .unwrap();

    repo.delete_entity(EntityKind::Translation, translation.id)
        .await
        .unwrap();

    assert!(repo.list_translations().await.unwrap().is_empty());

    let source_words = repo.list_words(WordKind::Source).await.unwrap();
    let target_words = repo.list_words(WordKind::Target).await.unwrap();
    assert_eq!(source_words.len(), 1);
    assert_eq!(source_words[0].text, "dziecko");
    assert_eq!(target_words.len(), 1);
    assert_eq!(target_words[0].text, "child");
}

#[tokio::test]
async fn test_sharedWord_deleteOnePair_shouldLeaveOtherPairs() {
    let dir = TempDir::new().unwrap();
    let repo = create_file_repo(&dir);

    // "wieża" translates to both "tower" and "rook"
    let tower = repo.add_translation("wieża", "tower", vec![]).await.unwrap();
    let rook = repo.add_translation("wieża", "rook", vec![]).await.unwrap();
    assert_eq!(tower.source_word_id, rook.source_word_id);

    repo.delete_entity(EntityKind::Translation, tower.id).await.unwrap();

    let remaining = repo.list_translations_by_source_text("wieża").await.unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, rook.id);
}

#[tokio::test]
async fn test_hydrateAfterConcurrentDelete_shouldReturnNotFound() {
    let dir = TempDir::new().unwrap();
    let repo = create_file_repo(&dir);

    let mut translation = repo.add_translation("koń", "horse", vec![]).await.unwrap();

    // Another caller removes the row between read and hydration
    repo.delete_entity(EntityKind::Translation, translation.id)
        .await
        .unwrap();

    let err = repo.hydrate_translation(&mut translation).await.unwrap_err();
    assert!(matches!(
        err,
        DictionaryError::NotFound(EntityKind::Translation)
    ));
}

#[tokio::test]
async fn test_stats_shouldCountRowsPerTable() {
    let dir = TempDir::new().unwrap();
    let repo = create_file_repo(&dir);

    repo.add_translation("kot", "cat", vec![ExampleSpec::new("Ala ma kota", true)])
        .await
        .unwrap();
    repo.add_translation("kot", "kitty", vec![]).await.unwrap();

    let stats = repo.connection().stats().unwrap();
    assert_eq!(stats.source_word_count, 1);
    assert_eq!(stats.target_word_count, 2);
    assert_eq!(stats.translation_count, 2);
    assert_eq!(stats.example_count, 1);
}

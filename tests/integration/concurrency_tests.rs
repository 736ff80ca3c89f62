/*!
 * Concurrency tests for the dictionary store.
 *
 * Many parallel callers race on the same natural keys; the store must end
 * up with exactly one row per key and every caller must observe it.
 */

use std::collections::HashSet;

use wordlink::{ExampleSpec, Repository, WordKind};

fn create_test_repo() -> Repository {
    Repository::new_in_memory().expect("Failed to create test repository")
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_getOrCreateWord_concurrentSameText_shouldYieldSingleRow() {
    let repo = create_test_repo();
    let concurrency = 100;

    let mut handles = Vec::with_capacity(concurrency);
    for _ in 0..concurrency {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            repo.get_or_create_word(WordKind::Source, "balon").await
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        let word = handle
            .await
            .expect("task panicked")
            .expect("every caller must observe the winning row");
        assert_eq!(word.text, "balon");
        ids.insert(word.id);
    }

    assert_eq!(ids.len(), 1, "All callers must receive the same word id");

    let words = repo.list_words(WordKind::Source).await.unwrap();
    assert_eq!(words.len(), 1, "Only one 'balon' record should exist");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_addTranslation_concurrentSamePairAndExample_shouldDeduplicate() {
    let repo = create_test_repo();
    let concurrency = 100;

    let mut handles = Vec::with_capacity(concurrency);
    for _ in 0..concurrency {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            repo.add_translation("chleb", "bread", vec![ExampleSpec::new("test", false)])
                .await
        }));
    }

    for handle in handles {
        handle
            .await
            .expect("task panicked")
            .expect("every caller must observe the winning translation");
    }

    assert_eq!(repo.list_words(WordKind::Source).await.unwrap().len(), 1);
    assert_eq!(repo.list_words(WordKind::Target).await.unwrap().len(), 1);

    let mut translations = repo.list_translations().await.unwrap();
    assert_eq!(translations.len(), 1);

    repo.hydrate_translation(&mut translations[0]).await.unwrap();
    assert_eq!(
        translations[0].examples.len(),
        1,
        "Duplicate example texts must collapse into one row"
    );
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_addTranslation_concurrentDistinctExamples_shouldKeepAll() {
    let repo = create_test_repo();
    let concurrency = 100;

    let mut handles = Vec::with_capacity(concurrency);
    for i in 0..concurrency {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            repo.add_translation(
                "chleb",
                "bread",
                vec![ExampleSpec::new(format!("test {}", i), false)],
            )
            .await
        }));
    }

    for handle in handles {
        handle.await.expect("task panicked").expect("call failed");
    }

    assert_eq!(repo.list_words(WordKind::Source).await.unwrap().len(), 1);
    assert_eq!(repo.list_words(WordKind::Target).await.unwrap().len(), 1);

    let mut translations = repo.list_translations().await.unwrap();
    assert_eq!(translations.len(), 1);

    repo.hydrate_translation(&mut translations[0]).await.unwrap();
    assert_eq!(
        translations[0].examples.len(),
        concurrency,
        "Each caller's distinct example must be attached"
    );

    let texts: HashSet<&str> = translations[0]
        .examples
        .iter()
        .map(|e| e.text.as_str())
        .collect();
    assert_eq!(texts.len(), concurrency, "No example text may be lost");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_addExample_concurrentSameText_shouldYieldSingleRow() {
    let repo = create_test_repo();
    let translation = repo.add_translation("kot", "cat", vec![]).await.unwrap();

    let concurrency = 50;
    let mut handles = Vec::with_capacity(concurrency);
    for _ in 0..concurrency {
        let repo = repo.clone();
        let id = translation.id;
        handles.push(tokio::spawn(async move {
            repo.add_example(id, "Ala ma kota", true).await
        }));
    }

    let mut ids = HashSet::new();
    for handle in handles {
        let example = handle.await.expect("task panicked").expect("call failed");
        ids.insert(example.id);
    }

    assert_eq!(ids.len(), 1, "All callers must receive the same example row");
    assert_eq!(repo.list_examples(translation.id).await.unwrap().len(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 8)]
async fn test_getOrCreateWord_concurrentDistinctTexts_shouldCreateAll() {
    let repo = create_test_repo();
    let concurrency = 50;

    let mut handles = Vec::with_capacity(concurrency);
    for i in 0..concurrency {
        let repo = repo.clone();
        handles.push(tokio::spawn(async move {
            repo.get_or_create_word(WordKind::Target, &format!("word {}", i))
                .await
        }));
    }

    for handle in handles {
        handle.await.expect("task panicked").expect("call failed");
    }

    let words = repo.list_words(WordKind::Target).await.unwrap();
    assert_eq!(words.len(), concurrency);
}

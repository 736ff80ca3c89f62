/*!
 * Benchmarks for the idempotent upsert and linking hot path.
 *
 * Measures:
 * - get_or_create_word hitting an existing row
 * - get_or_create_word inserting fresh rows
 * - add_translation re-linking an existing pair
 * - hydration of a translation with examples
 */

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tokio::runtime::Runtime;

use wordlink::{ExampleSpec, Repository, WordKind};

fn bench_get_or_create_existing(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let repo = Repository::new_in_memory().unwrap();
    rt.block_on(repo.get_or_create_word(WordKind::Source, "kot"))
        .unwrap();

    c.bench_function("get_or_create_word_existing", |b| {
        b.iter(|| {
            let word = rt
                .block_on(repo.get_or_create_word(WordKind::Source, black_box("kot")))
                .unwrap();
            black_box(word)
        })
    });
}

fn bench_get_or_create_fresh(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let repo = Repository::new_in_memory().unwrap();
    let mut counter = 0u64;

    c.bench_function("get_or_create_word_fresh", |b| {
        b.iter(|| {
            counter += 1;
            let word = rt
                .block_on(repo.get_or_create_word(WordKind::Source, &format!("word {}", counter)))
                .unwrap();
            black_box(word)
        })
    });
}

fn bench_add_translation_existing_pair(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let repo = Repository::new_in_memory().unwrap();
    rt.block_on(repo.add_translation("chleb", "bread", vec![]))
        .unwrap();

    c.bench_function("add_translation_existing_pair", |b| {
        b.iter(|| {
            let translation = rt
                .block_on(repo.add_translation(black_box("chleb"), black_box("bread"), vec![]))
                .unwrap();
            black_box(translation)
        })
    });
}

fn bench_hydrate_translation(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let repo = Repository::new_in_memory().unwrap();
    let examples = (0..20)
        .map(|i| ExampleSpec::new(format!("example {}", i), i % 2 == 0))
        .collect();
    let translation = rt
        .block_on(repo.add_translation("kot", "cat", examples))
        .unwrap();

    c.bench_function("hydrate_translation_20_examples", |b| {
        b.iter(|| {
            let mut translation = translation.clone();
            rt.block_on(repo.hydrate_translation(&mut translation))
                .unwrap();
            black_box(translation)
        })
    });
}

criterion_group!(
    benches,
    bench_get_or_create_existing,
    bench_get_or_create_fresh,
    bench_add_translation_existing_pair,
    bench_hydrate_translation
);
criterion_main!(benches);

//! Reconciliation and ranking semantics, exercised through the RefStore
//! trait against the in-memory implementation.

use pretty_assertions::assert_eq;
use refindex_core::{DefKey, NormalizedRef};
use refindex_storage::{MockRefStore, RefStore};

fn def() -> DefKey {
    DefKey::new("r1", "GoPackage", "foo", "foo.Bar")
}

fn fact(def: &DefKey, file: &str) -> NormalizedRef {
    NormalizedRef {
        def: def.clone(),
        file: file.to_string(),
    }
}

#[tokio::test]
async fn replace_aggregates_counts_per_file() {
    let store = MockRefStore::new();
    let d = def();

    store
        .replace_file_refs("r1", "c1", &[fact(&d, "x.go"), fact(&d, "x.go"), fact(&d, "y.go")])
        .await
        .expect("replace should succeed");

    assert_eq!(store.count_for(&d, "r1", "c1", "x.go"), Some(2));
    assert_eq!(store.count_for(&d, "r1", "c1", "y.go"), Some(1));
    assert_eq!(store.record_count(), 2);
}

#[tokio::test]
async fn replace_is_idempotent() {
    let store = MockRefStore::new();
    let d = def();
    let batch = [fact(&d, "x.go"), fact(&d, "x.go"), fact(&d, "y.go")];

    store
        .replace_file_refs("r1", "c1", &batch)
        .await
        .expect("first replace");
    store
        .replace_file_refs("r1", "c1", &batch)
        .await
        .expect("second replace");

    assert_eq!(store.count_for(&d, "r1", "c1", "x.go"), Some(2));
    assert_eq!(store.count_for(&d, "r1", "c1", "y.go"), Some(1));
    assert_eq!(store.record_count(), 2);
}

#[tokio::test]
async fn replace_only_clears_staged_files() {
    let store = MockRefStore::new();
    let d = def();

    store
        .replace_file_refs("r1", "c1", &[fact(&d, "a.go"), fact(&d, "b.go"), fact(&d, "b.go")])
        .await
        .expect("initial replace");

    // Re-index only a.go; b.go rows must survive untouched.
    store
        .replace_file_refs("r1", "c1", &[fact(&d, "a.go"), fact(&d, "a.go"), fact(&d, "a.go")])
        .await
        .expect("partial replace");

    assert_eq!(store.count_for(&d, "r1", "c1", "a.go"), Some(3));
    assert_eq!(store.count_for(&d, "r1", "c1", "b.go"), Some(2));
}

#[tokio::test]
async fn replace_scopes_deletes_to_repo_and_commit() {
    let store = MockRefStore::new();
    let d = def();

    store
        .replace_file_refs("r1", "c1", &[fact(&d, "a.go")])
        .await
        .expect("first commit");
    store
        .replace_file_refs("r1", "c2", &[fact(&d, "a.go"), fact(&d, "a.go")])
        .await
        .expect("second commit");

    assert_eq!(store.count_for(&d, "r1", "c1", "a.go"), Some(1));
    assert_eq!(store.count_for(&d, "r1", "c2", "a.go"), Some(2));
}

#[tokio::test]
async fn empty_batch_is_a_noop() {
    let store = MockRefStore::new();
    let d = def();

    store
        .replace_file_refs("r1", "c1", &[fact(&d, "a.go")])
        .await
        .expect("seed");
    store
        .replace_file_refs("r1", "c1", &[])
        .await
        .expect("empty replace");

    assert_eq!(store.count_for(&d, "r1", "c1", "a.go"), Some(1));
}

#[tokio::test]
async fn ref_locations_ranks_by_repo_total_then_file_count() {
    let store = MockRefStore::new();
    let d = def();

    // r2 total 5 across two files, r3 total 4 in one file.
    store
        .replace_file_refs(
            "r2",
            "c1",
            &[
                fact(&d, "f1.go"),
                fact(&d, "f1.go"),
                fact(&d, "f1.go"),
                fact(&d, "f2.go"),
                fact(&d, "f2.go"),
            ],
        )
        .await
        .expect("r2 replace");
    store
        .replace_file_refs(
            "r3",
            "c1",
            &[fact(&d, "g.go"), fact(&d, "g.go"), fact(&d, "g.go"), fact(&d, "g.go")],
        )
        .await
        .expect("r3 replace");

    let rows = store
        .ref_locations(&d, &[], 100, 0)
        .await
        .expect("ref locations");

    let order: Vec<(&str, i64, &str, i64)> = rows
        .iter()
        .map(|r| (r.repo.as_str(), r.repo_count, r.file.as_str(), r.count))
        .collect();
    assert_eq!(
        order,
        vec![
            ("r2", 5, "f1.go", 3),
            ("r2", 5, "f2.go", 2),
            ("r3", 4, "g.go", 4),
        ]
    );
}

#[tokio::test]
async fn ref_locations_window_totals_survive_pagination() {
    let store = MockRefStore::new();
    let d = def();

    store
        .replace_file_refs(
            "r2",
            "c1",
            &[fact(&d, "f1.go"), fact(&d, "f1.go"), fact(&d, "f2.go")],
        )
        .await
        .expect("replace");

    let rows = store
        .ref_locations(&d, &[], 1, 1)
        .await
        .expect("ref locations");

    // The page holds only the second row, but its repo total still covers
    // the whole matching set.
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].file, "f2.go");
    assert_eq!(rows[0].count, 1);
    assert_eq!(rows[0].repo_count, 3);
}

#[tokio::test]
async fn ref_locations_applies_repo_filter() {
    let store = MockRefStore::new();
    let d = def();

    store
        .replace_file_refs("r2", "c1", &[fact(&d, "a.go")])
        .await
        .expect("r2");
    store
        .replace_file_refs("r3", "c1", &[fact(&d, "b.go")])
        .await
        .expect("r3");

    let rows = store
        .ref_locations(&d, &["r3".to_string()], 100, 0)
        .await
        .expect("ref locations");

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].repo, "r3");
}

#[tokio::test]
async fn count_referencing_repos_is_distinct_and_global() {
    let store = MockRefStore::new();
    let d = def();

    store
        .replace_file_refs("r2", "c1", &[fact(&d, "a.go")])
        .await
        .expect("r2 c1");
    store
        .replace_file_refs("r2", "c2", &[fact(&d, "b.go")])
        .await
        .expect("r2 c2");
    store
        .replace_file_refs("r3", "c1", &[fact(&d, "c.go")])
        .await
        .expect("r3");

    assert_eq!(
        store.count_referencing_repos(&d).await.expect("count"),
        2
    );

    let other = DefKey::new("elsewhere", "GoPackage", "foo", "foo.Baz");
    assert_eq!(
        store.count_referencing_repos(&other).await.expect("count"),
        0
    );
}

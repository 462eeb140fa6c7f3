use super::*;

async fn store() -> WordStore {
    WordStore::new("sqlite::memory:").await.expect("db")
}

#[tokio::test]
async fn health_check_succeeds_for_live_pool() {
    let store = store().await;
    store.health_check().await.expect("health check");
}

#[tokio::test]
async fn creates_database_file_when_missing() {
    let temp_root = tempfile::tempdir().expect("temp dir");
    let db_path = temp_root.path().join("nested").join("lists.db");
    let database_url = format!("sqlite://{}", db_path.to_string_lossy().replace('\\', "/"));

    let store = WordStore::new(&database_url).await.expect("db");
    drop(store);

    assert!(
        db_path.exists(),
        "database file should exist: {}",
        db_path.display()
    );
}

#[tokio::test]
async fn lists_words_in_lexicographic_order() {
    let store = store().await;
    let user = UserId(1);
    for word in ["pear", "apple", "mango"] {
        assert!(store.add_word(user, ListName::A, word).await.expect("add"));
    }

    let words = store.list_words(user, ListName::A).await.expect("list");
    assert_eq!(words, vec!["apple", "mango", "pear"]);
}

#[tokio::test]
async fn duplicate_add_is_rejected_after_first_success() {
    let store = store().await;
    let user = UserId(1);

    assert!(store.add_word(user, ListName::A, "foo").await.expect("add"));
    assert!(!store.add_word(user, ListName::A, "foo").await.expect("add"));

    let words = store.list_words(user, ListName::A).await.expect("list");
    assert_eq!(words, vec!["foo"]);
}

#[tokio::test]
async fn add_trims_whitespace_and_collides_with_trimmed_form() {
    let store = store().await;
    let user = UserId(1);

    assert!(store.add_word(user, ListName::A, " foo ").await.expect("add"));
    assert!(!store.add_word(user, ListName::A, "foo").await.expect("add"));

    let words = store.list_words(user, ListName::A).await.expect("list");
    assert_eq!(words, vec!["foo"]);
}

#[tokio::test]
async fn blank_word_is_rejected_without_mutation() {
    let store = store().await;
    let user = UserId(1);

    assert!(!store.add_word(user, ListName::A, "").await.expect("add"));
    assert!(!store.add_word(user, ListName::A, "   ").await.expect("add"));
    assert!(store
        .list_words(user, ListName::A)
        .await
        .expect("list")
        .is_empty());
}

#[tokio::test]
async fn removal_is_idempotent() {
    let store = store().await;
    let user = UserId(1);
    store.add_word(user, ListName::A, "foo").await.expect("add");

    assert!(store
        .remove_word(user, ListName::A, "foo")
        .await
        .expect("remove"));
    assert!(!store
        .remove_word(user, ListName::A, "foo")
        .await
        .expect("remove"));
}

#[tokio::test]
async fn removing_absent_word_leaves_list_unchanged() {
    let store = store().await;
    let user = UserId(1);
    store.add_word(user, ListName::A, "keep").await.expect("add");

    assert!(!store
        .remove_word(user, ListName::A, "gone")
        .await
        .expect("remove"));
    assert_eq!(
        store.list_words(user, ListName::A).await.expect("list"),
        vec!["keep"]
    );
}

#[tokio::test]
async fn clear_empties_the_list_and_only_that_list() {
    let store = store().await;
    let user = UserId(1);
    for word in ["one", "two", "three"] {
        store.add_word(user, ListName::A, word).await.expect("add");
    }
    store.add_word(user, ListName::B, "other").await.expect("add");

    store.clear_list(user, ListName::A).await.expect("clear");

    assert!(store
        .list_words(user, ListName::A)
        .await
        .expect("list")
        .is_empty());
    assert_eq!(
        store.list_words(user, ListName::B).await.expect("list"),
        vec!["other"]
    );

    // Clearing again is a no-op.
    store.clear_list(user, ListName::A).await.expect("clear");
}

#[tokio::test]
async fn words_are_partitioned_by_user() {
    let store = store().await;
    store.add_word(UserId(1), ListName::A, "mine").await.expect("add");

    assert!(store
        .list_words(UserId(2), ListName::A)
        .await
        .expect("list")
        .is_empty());
    assert!(!store
        .remove_word(UserId(2), ListName::A, "mine")
        .await
        .expect("remove"));
    assert_eq!(
        store.list_words(UserId(1), ListName::A).await.expect("list"),
        vec!["mine"]
    );
}

#[tokio::test]
async fn same_word_may_exist_in_both_lists() {
    let store = store().await;
    let user = UserId(1);

    assert!(store.add_word(user, ListName::A, "twin").await.expect("add"));
    assert!(store.add_word(user, ListName::B, "twin").await.expect("add"));
}

#[tokio::test]
async fn pick_pair_requires_both_lists_nonempty() {
    let store = store().await;
    let user = UserId(1);

    assert!(store.pick_pair(user).await.expect("roll").is_none());

    store.add_word(user, ListName::A, "Naruto").await.expect("add");
    assert!(store.pick_pair(user).await.expect("roll").is_none());

    store
        .add_word(user, ListName::B, "Betrayal")
        .await
        .expect("add");
    let pair = store.pick_pair(user).await.expect("roll").expect("pair");
    assert_eq!(pair, ("Naruto".to_string(), "Betrayal".to_string()));
}

#[tokio::test]
async fn pick_pair_draws_from_current_list_contents() {
    let store = store().await;
    let user = UserId(1);
    for word in ["a1", "a2", "a3"] {
        store.add_word(user, ListName::A, word).await.expect("add");
    }
    for word in ["b1", "b2"] {
        store.add_word(user, ListName::B, word).await.expect("add");
    }

    for _ in 0..20 {
        let (from_a, from_b) = store.pick_pair(user).await.expect("roll").expect("pair");
        assert!(["a1", "a2", "a3"].contains(&from_a.as_str()));
        assert!(["b1", "b2"].contains(&from_b.as_str()));
    }
}

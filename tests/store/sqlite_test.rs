//! SQLite backend.

use pogovorim::profile::{HistoryEntry, Plan, Profile, Stage};
use pogovorim::store::{ProfileStore, SqliteStore};

#[tokio::test]
async fn upsert_and_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("data").join("profiles.db");

    {
        let store = SqliteStore::open(&path).await.expect("open");
        assert_eq!(store.load("9").await.expect("load"), None);
        store.save("9", &Profile::default()).await.expect("insert");

        let updated = Profile {
            stage: Stage::Chatting,
            plan: Plan::Paid,
            history: vec![HistoryEntry::user("привет")],
            ..Profile::default()
        };
        store.save("9", &updated).await.expect("update");
        store.save("10", &Profile::default()).await.expect("insert other");
    }

    let store = SqliteStore::open(&path).await.expect("reopen");
    let loaded = store.load("9").await.expect("load").expect("present");
    assert_eq!(loaded.stage, Stage::Chatting);
    assert_eq!(loaded.plan, Plan::Paid);
    assert_eq!(loaded.history.len(), 1);
    assert_eq!(
        store.participants().await.expect("list"),
        vec!["10".to_owned(), "9".to_owned()]
    );
}

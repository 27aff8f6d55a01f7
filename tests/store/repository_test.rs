//! Per-participant leases over a profile store.

use std::sync::Arc;
use std::time::Duration;

use pogovorim::profile::{Profile, Stage};
use pogovorim::store::{MemoryStore, ProfileRepository, ProfileStore};

fn repository() -> (ProfileRepository, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    (ProfileRepository::new(store.clone()), store)
}

#[tokio::test]
async fn first_checkout_persists_a_default_profile() {
    let (repo, store) = repository();
    let lease = repo.checkout("42").await.expect("checkout");
    assert_eq!(lease.participant(), "42");
    assert_eq!(lease.profile(), &Profile::default());
    drop(lease);

    let stored = store.load("42").await.expect("load");
    assert_eq!(stored, Some(Profile::default()));
    assert_eq!(store.participants().await.expect("list"), vec!["42".to_owned()]);
}

#[tokio::test]
async fn commit_writes_the_full_snapshot() {
    let (repo, store) = repository();
    let mut lease = repo.checkout("42").await.expect("checkout");
    lease.profile_mut().stage = Stage::NamingUser;
    lease.profile_mut().user_name = Some("Оля".to_owned());
    lease.commit().await.expect("commit");
    drop(lease);

    let stored = store.load("42").await.expect("load").expect("present");
    assert_eq!(stored.stage, Stage::NamingUser);
    assert_eq!(stored.user_name.as_deref(), Some("Оля"));
}

#[tokio::test]
async fn dropped_lease_discards_uncommitted_edits() {
    let (repo, _store) = repository();
    {
        let mut lease = repo.checkout("42").await.expect("checkout");
        lease.profile_mut().stage = Stage::Chatting;
    }
    let lease = repo.checkout("42").await.expect("checkout again");
    assert_eq!(lease.profile().stage, Stage::Greeting);
}

#[tokio::test(start_paused = true)]
async fn second_lease_waits_for_the_first() {
    let (repo, _store) = repository();
    let repo = Arc::new(repo);

    let first = repo.checkout("42").await.expect("checkout");
    let waiter = {
        let repo = Arc::clone(&repo);
        tokio::spawn(async move { repo.checkout("42").await.map(|lease| lease.profile().stage) })
    };

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert!(!waiter.is_finished());

    drop(first);
    let stage = waiter.await.expect("join").expect("checkout");
    assert_eq!(stage, Stage::Greeting);
}

#[tokio::test]
async fn other_participants_are_not_blocked() {
    let (repo, _store) = repository();
    let _held = repo.checkout("42").await.expect("checkout");
    let other = tokio::time::timeout(Duration::from_secs(1), repo.checkout("43"))
        .await
        .expect("should not block")
        .expect("checkout");
    assert_eq!(other.participant(), "43");
}

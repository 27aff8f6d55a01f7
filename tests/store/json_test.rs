//! JSON file backend.

use pogovorim::profile::{Addressing, AgeCategory, Gender, HistoryEntry, Plan, Profile, Stage};
use pogovorim::store::{JsonFileStore, ProfileStore, StoreError};

#[tokio::test]
async fn missing_file_opens_empty_and_is_created_on_save() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("db.json");
    let store = JsonFileStore::open(&path).await.expect("open");
    assert!(store.participants().await.expect("list").is_empty());
    assert!(!path.exists());

    store.save("7", &Profile::default()).await.expect("save");
    assert!(path.exists());
    assert!(!dir.path().join("db.json.tmp").exists());

    let raw = std::fs::read_to_string(&path).expect("read");
    let value: serde_json::Value = serde_json::from_str(&raw).expect("json");
    assert!(value["users"]["7"].is_object());
}

#[tokio::test]
async fn profiles_survive_reopen() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("db.json");
    let profile = Profile {
        stage: Stage::Chatting,
        bot_name: Some("Ника".to_owned()),
        bot_gender: Some(Gender::Female),
        bot_age_category: Some(AgeCategory::Exact("27".to_owned())),
        history: vec![HistoryEntry::user("привет"), HistoryEntry::assistant("Привет!")],
        trial_until: Some(1_700_000_000),
        ..Profile::default()
    };

    {
        let store = JsonFileStore::open(&path).await.expect("open");
        store.save("7", &profile).await.expect("save");
    }

    let reopened = JsonFileStore::open(&path).await.expect("reopen");
    assert_eq!(reopened.load("7").await.expect("load"), Some(profile));
}

#[tokio::test]
async fn legacy_documents_are_accepted() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("db.json");
    std::fs::write(
        &path,
        r#"{"users": {"5": {
            "stage": "intro_name",
            "addressing": "вы",
            "bot_name": "Макс",
            "bot_gender": "male",
            "bot_age": "middle",
            "trial_until": 0,
            "plan": "pro",
            "history": [{"role": "user", "content": "hi"}]
        }}}"#,
    )
    .expect("write legacy");

    let store = JsonFileStore::open(&path).await.expect("open");
    let profile = store.load("5").await.expect("load").expect("present");
    assert_eq!(profile.stage, Stage::NamingBot);
    assert_eq!(profile.addressing, Addressing::Formal);
    assert_eq!(profile.bot_age_category, Some(AgeCategory::Middle));
    assert_eq!(profile.trial_until, None);
    assert_eq!(profile.plan, Plan::Paid);
    assert_eq!(profile.history, vec![HistoryEntry::user("hi")]);
}

#[tokio::test]
async fn corrupt_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("db.json");
    std::fs::write(&path, "{not json").expect("write");
    let err = JsonFileStore::open(&path).await.expect_err("should fail");
    assert!(matches!(err, StoreError::Json(_)));
}

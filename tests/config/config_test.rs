//! Coverage for config parsing and path resolution.

use std::path::{Path, PathBuf};

use pogovorim::config::{
    config_dir, load_config, Config, RuntimePaths, StorageBackend, StorageConfig,
};

#[test]
fn config_dir_resolves() {
    let dir = config_dir().expect("home directory should resolve");
    assert!(dir.ends_with(".pogovorim"));
}

#[test]
fn partial_config_keeps_other_defaults() {
    let config = Config::from_toml(
        r#"
[provider]
model = "deepseek-reasoner"
temperature = 1.1

[trial]
days = 7

[storage]
backend = "sqlite"
"#,
    )
    .expect("config should parse");

    assert_eq!(config.provider.model, "deepseek-reasoner");
    assert!((config.provider.temperature - 1.1).abs() < f32::EPSILON);
    assert_eq!(config.provider.max_tokens, 600);
    assert_eq!(config.provider.api_key_env, "DEEPSEEK_API_KEY");
    assert_eq!(config.trial.days, 7);
    assert_eq!(config.history.limit, 12);
    assert_eq!(config.storage.backend, StorageBackend::Sqlite);
}

#[test]
fn invalid_values_are_rejected() {
    for toml in [
        "[provider]\nendpoint = \"ftp://example.test\"\n",
        "[provider]\nendpoint = \"not a url\"\n",
        "[provider]\ntemperature = -0.5\n",
        "[provider]\nmax_tokens = 0\n",
        "[history]\nlimit = 0\n",
        "[trial]\ndays = 0\n",
        "[storage]\nbackend = \"postgres\"\n",
    ] {
        assert!(Config::from_toml(toml).is_err(), "should reject: {toml}");
    }
}

#[test]
fn missing_file_means_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let config = load_config(&dir.path().join("config.toml")).expect("load");
    assert_eq!(config, Config::default());
}

#[test]
fn broken_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[provider\n").expect("write");
    assert!(load_config(&path).is_err());
}

#[test]
fn paths_follow_the_config_file() {
    let paths = RuntimePaths::for_config_file(Path::new("/srv/bot/config.toml"));
    assert_eq!(paths.root, PathBuf::from("/srv/bot"));
    assert_eq!(paths.env_file, PathBuf::from("/srv/bot/.env"));
    assert_eq!(paths.logs_dir, PathBuf::from("/srv/bot/logs"));

    let bare = RuntimePaths::for_config_file(Path::new("config.toml"));
    assert_eq!(bare.root, PathBuf::from("."));
}

#[test]
fn storage_paths_resolve_against_the_root() {
    let paths = RuntimePaths::under("/data");
    let json = StorageConfig::default();
    assert_eq!(json.resolve_path(&paths), PathBuf::from("/data/db.json"));

    let sqlite = StorageConfig {
        backend: StorageBackend::Sqlite,
        path: None,
    };
    assert_eq!(sqlite.resolve_path(&paths), PathBuf::from("/data/profiles.db"));

    let absolute = StorageConfig {
        backend: StorageBackend::Json,
        path: Some(PathBuf::from("/var/lib/users.json")),
    };
    assert_eq!(
        absolute.resolve_path(&paths),
        PathBuf::from("/var/lib/users.json")
    );
}

//! Integration tests for create / load / save / delete / unlock.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use configurate::config::Settings;
use configurate::schema::{Kind, Schema};
use configurate::secrets::SecretPath;
use configurate::{
    BaseDirectory, ConfigFile, ConfigRequest, Configurate, ConfigurateError, CredentialStore,
    KeyringOptions, MemoryStore, StorageFormat, UnlockRequest,
};
use serde_json::json;
use tempfile::TempDir;

/// Helper: an orchestrator rooted in a fresh temp dir, backed by a memory store.
fn setup() -> (TempDir, Arc<MemoryStore>, Arc<Configurate>) {
    let dir = TempDir::new().expect("create temp dir");
    let settings = Settings {
        identifier: "com.example.app".into(),
        root_dir: Some(dir.path().to_path_buf()),
        ..Settings::default()
    };
    let store = Arc::new(MemoryStore::new());
    let app = Arc::new(Configurate::new(&settings, store.clone()));
    (dir, store, app)
}

fn db_schema() -> Schema {
    Schema::builder()
        .field("host", Kind::String)
        .secret("password", Kind::String, "db-password")
        .build()
        .expect("valid schema")
}

fn opts() -> KeyringOptions {
    KeyringOptions::new("app", "default")
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    haystack.windows(needle.len()).any(|w| w == needle)
}

// ---------------------------------------------------------------------------
// The host/password scenario
// ---------------------------------------------------------------------------

#[test]
fn host_and_password_scenario() {
    let (dir, store, app) = setup();
    let file = ConfigFile::new(
        app,
        db_schema(),
        "app.json",
        BaseDirectory::AppConfig,
        StorageFormat::Json,
    )
    .unwrap();

    let locked = file
        .create(&json!({"host": "localhost", "password": "s3cr3t"}), Some(&opts()))
        .unwrap();
    assert_eq!(locked.data(), &json!({"host": "localhost", "password": null}));

    let on_disk = fs::read(dir.path().join("app-config/com.example.app/app.json")).unwrap();
    let parsed: serde_json::Value = serde_json::from_slice(&on_disk).unwrap();
    assert_eq!(parsed, json!({"host": "localhost", "password": null}));
    assert_eq!(store.get("app", "default/db-password").unwrap(), "s3cr3t");

    let loaded = file.load().unwrap();
    assert_eq!(loaded.data(), &json!({"host": "localhost", "password": null}));

    let unlocked = file.unlock(&loaded, &opts()).unwrap();
    assert_eq!(
        unlocked.data(),
        &json!({"host": "localhost", "password": "s3cr3t"})
    );
}

// ---------------------------------------------------------------------------
// Disk safety: secrets never reach the file, in any format
// ---------------------------------------------------------------------------

#[test]
fn secret_bytes_never_reach_disk() {
    let cases = [
        ("app.json", StorageFormat::Json, None),
        ("app.yaml", StorageFormat::Yaml, None),
        ("app.bin", StorageFormat::Binary, None),
        ("app.binc", StorageFormat::Binary, Some("key material")),
    ];
    for (name, format, key) in cases {
        let (_dir, _store, app) = setup();
        let mut req = ConfigRequest::new(name, BaseDirectory::AppData, format)
            .data(json!({"host": "db.internal", "nested": {"token": "tok-XYZ-123"}, "pin": 8675309}))
            .keyring(
                &[
                    SecretPath::new("token", "nested.token"),
                    SecretPath::new("pin", "pin").with_kind(Kind::Number),
                ],
                &opts(),
            );
        if let Some(key) = key {
            req = req.encryption_key(key);
        }

        app.create(&req).unwrap();
        let bytes = fs::read(app.resolve(&req).unwrap()).unwrap();
        assert!(!contains(&bytes, b"tok-XYZ-123"), "{name} leaked the token");
        assert!(!contains(&bytes, b"8675309"), "{name} leaked the pin");

        let unlocked = app
            .load(&req.clone().with_unlock(true))
            .unwrap()
            .into_unlocked()
            .unwrap();
        assert_eq!(unlocked.get("nested.token"), Some(&json!("tok-XYZ-123")));
        assert_eq!(unlocked.get("pin"), Some(&json!(8675309)));
        assert_eq!(unlocked.get("host"), Some(&json!("db.internal")));
    }
}

// ---------------------------------------------------------------------------
// Round-trip counts
// ---------------------------------------------------------------------------

#[test]
fn create_uses_one_batched_store_write() {
    let (_dir, store, app) = setup();
    let schema = Schema::builder()
        .secret("a", Kind::String, "a")
        .secret("b", Kind::String, "b")
        .build()
        .unwrap();
    let file = ConfigFile::new(app, schema, "two.json", BaseDirectory::AppConfig, StorageFormat::Json)
        .unwrap();

    file.create(&json!({"a": "1", "b": "2"}), Some(&opts())).unwrap();
    let calls = store.calls();
    assert_eq!(calls.set, 2);
    assert_eq!(calls.get + calls.delete, 0);
}

#[test]
fn load_without_unlock_never_touches_the_store() {
    let (_dir, store, app) = setup();
    let file = ConfigFile::new(app, db_schema(), "app.json", BaseDirectory::AppConfig, StorageFormat::Json)
        .unwrap();
    file.create(&json!({"host": "h", "password": "pw"}), Some(&opts()))
        .unwrap();
    let before = store.calls();

    file.load().unwrap();
    assert_eq!(store.calls(), before);
}

#[test]
fn unlock_after_load_does_not_reread_the_file() {
    let (_dir, store, app) = setup();
    let req = ConfigRequest::new("app.json", BaseDirectory::AppConfig, StorageFormat::Json)
        .data(json!({"host": "h", "password": "pw"}))
        .keyring(&[SecretPath::new("db-password", "password")], &opts());
    app.create(&req).unwrap();

    let locked = app.load(&req).unwrap().into_locked();
    fs::remove_file(app.resolve(&req).unwrap()).unwrap();

    let gets_before = store.calls().get;
    let unlocked = app
        .unlock_document(&locked, &[SecretPath::new("db-password", "password")], &opts())
        .unwrap();
    assert_eq!(unlocked.get("password"), Some(&json!("pw")));
    assert_eq!(store.calls().get - gets_before, 1);
}

#[test]
fn unlock_request_merges_into_caller_data() {
    let (_dir, store, app) = setup();
    store.set("app", "default/db-password", "pw").unwrap();

    let req = UnlockRequest::new(
        json!({"host": "h", "password": null}),
        &[SecretPath::new("db-password", "password")],
        &opts(),
    );
    let unlocked = app.unlock(&req).unwrap();
    assert_eq!(unlocked.data(), &json!({"host": "h", "password": "pw"}));
}

// ---------------------------------------------------------------------------
// Save, delete, failure modes
// ---------------------------------------------------------------------------

#[test]
fn save_overwrites_file_and_secret() {
    let (_dir, store, app) = setup();
    let file = ConfigFile::new(app, db_schema(), "app.yaml", BaseDirectory::AppConfig, StorageFormat::Yaml)
        .unwrap();
    file.create(&json!({"host": "a", "password": "one"}), Some(&opts()))
        .unwrap();
    file.save(&json!({"host": "b", "password": "two"}), Some(&opts()))
        .unwrap();

    assert_eq!(file.load().unwrap().data()["host"], json!("b"));
    assert_eq!(store.get("app", "default/db-password").unwrap(), "two");
}

#[test]
fn delete_is_idempotent_for_file_and_store() {
    let (_dir, store, app) = setup();
    let file = ConfigFile::new(app, db_schema(), "app.json", BaseDirectory::AppConfig, StorageFormat::Json)
        .unwrap();
    file.create(&json!({"host": "h", "password": "pw"}), Some(&opts()))
        .unwrap();

    file.delete(Some(&opts())).unwrap();
    assert!(store.is_empty());
    assert!(matches!(file.load(), Err(ConfigurateError::NotFound(_))));

    file.delete(Some(&opts())).unwrap();
}

#[test]
fn unlock_with_a_missing_secret_fails_whole() {
    let (_dir, store, app) = setup();
    let file = ConfigFile::new(app, db_schema(), "app.json", BaseDirectory::AppConfig, StorageFormat::Json)
        .unwrap();
    let locked = file
        .create(&json!({"host": "h", "password": "pw"}), Some(&opts()))
        .unwrap();
    store.delete("app", "default/db-password").unwrap();

    assert!(matches!(
        file.unlock(&locked, &opts()),
        Err(ConfigurateError::NotFound(_))
    ));
}

#[test]
fn unavailable_store_is_reported() {
    let dir = TempDir::new().unwrap();
    let settings = Settings {
        root_dir: Some(dir.path().to_path_buf()),
        ..Settings::default()
    };
    let app = Configurate::new(&settings, Arc::new(MemoryStore::unavailable()));
    let req = ConfigRequest::new("app.json", BaseDirectory::AppConfig, StorageFormat::Json)
        .data(json!({"password": "pw"}))
        .keyring(&[SecretPath::new("db-password", "password")], &opts());

    assert!(matches!(
        app.create(&req),
        Err(ConfigurateError::StoreUnavailable(_))
    ));
}

#[test]
fn bad_key_discipline_fails_before_any_io() {
    let (dir, store, app) = setup();
    let req = ConfigRequest::new("app.json", BaseDirectory::AppConfig, StorageFormat::Json)
        .encryption_key("k")
        .data(json!({"password": "pw"}))
        .keyring(&[SecretPath::new("db-password", "password")], &opts());

    assert!(matches!(
        app.create(&req),
        Err(ConfigurateError::ConfigError(_))
    ));
    assert!(!Path::new(&dir.path().join("app-config")).exists());
    assert_eq!(store.calls().total(), 0);
}

#[test]
fn wrong_key_on_load_is_a_decryption_error() {
    let (_dir, _store, app) = setup();
    let req = ConfigRequest::new("app.binc", BaseDirectory::AppData, StorageFormat::Binary)
        .encryption_key("right")
        .data(json!({"host": "h"}));
    app.create(&req).unwrap();

    let mut wrong = req.clone();
    wrong.encryption_key = Some("wrong".into());
    assert!(matches!(
        app.load(&wrong),
        Err(ConfigurateError::DecryptionFailed)
    ));

    let mut plain = req.clone();
    plain.encryption_key = None;
    assert!(matches!(
        app.load(&plain),
        Err(ConfigurateError::DecryptionFailed)
    ));
}

#[test]
fn non_string_secret_values_round_trip() {
    let (_dir, _store, app) = setup();
    let schema = Schema::builder()
        .secret("pin", Kind::Number, "pin")
        .secret("enabled", Kind::Boolean, "enabled")
        .secret("code", Kind::String, "code")
        .build()
        .unwrap();
    let file = ConfigFile::new(app, schema, "kinds.json", BaseDirectory::AppConfig, StorageFormat::Json)
        .unwrap();
    let data = json!({"pin": 1234, "enabled": true, "code": "42"});

    file.create(&data, Some(&opts())).unwrap();
    let unlocked = file.load_unlocked(&opts()).unwrap();
    assert_eq!(unlocked.data(), &data);
}

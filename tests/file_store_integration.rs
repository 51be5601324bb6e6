use std::sync::Arc;

use tempfile::TempDir;
use unionsite::auth::store::{CredentialStore, FileBackend, StorageBackend};
use unionsite::auth::types::{LoginSession, TokenPair};

fn file_store(dir: &TempDir) -> CredentialStore {
    let backend = FileBackend::new_with_path(dir.path().join("credentials.json")).unwrap();
    CredentialStore::new(Arc::new(backend) as Arc<dyn StorageBackend>)
}

#[test]
fn test_session_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let session: LoginSession = serde_json::from_value(serde_json::json!({
        "accessToken": "T1",
        "refreshToken": "R1",
        "user": { "id": "u1", "email": "a@b.c", "name": "Ann", "faculty": "Law" }
    }))
    .unwrap();

    file_store(&dir).save_session(&session).unwrap();

    let reopened = file_store(&dir);
    assert_eq!(reopened.access_token().unwrap().as_deref(), Some("T1"));
    assert_eq!(reopened.refresh_token().unwrap().as_deref(), Some("R1"));
    let user = reopened.user().unwrap().unwrap();
    assert_eq!(user.name, "Ann");
    assert_eq!(user.extra["faculty"], "Law");
}

#[test]
fn test_refreshed_tokens_keep_cached_user() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    store
        .save_user(&serde_json::from_value(serde_json::json!({"id": "u1", "email": "a@b.c"})).unwrap())
        .unwrap();
    store.save_tokens(&TokenPair::new("T2", "R2")).unwrap();

    let reopened = file_store(&dir);
    assert_eq!(reopened.access_token().unwrap().as_deref(), Some("T2"));
    assert_eq!(reopened.user().unwrap().unwrap().id, "u1");
}

#[test]
fn test_clear_removes_everything() {
    let dir = TempDir::new().unwrap();
    let store = file_store(&dir);
    store.save_tokens(&TokenPair::new("T1", "R1")).unwrap();

    store.clear().unwrap();

    let reopened = file_store(&dir);
    assert!(!reopened.has_credentials().unwrap());
    assert!(reopened.user().unwrap().is_none());
}

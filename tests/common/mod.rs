use std::fs;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::TempDir;
use unionsite::auth::session::Navigator;
use unionsite::auth::store::CredentialStore;
use unionsite::auth::types::TokenPair;
use unionsite::http::{AuthClient, Dispatcher, ReqwestDispatcher};

/// Navigator recording every redirect, for assertions.
#[allow(dead_code)]
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl RecordingNavigator {
    pub fn routes(&self) -> Vec<String> {
        self.routes.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: &str) {
        self.routes.lock().unwrap().push(route.to_string());
    }
}

/// Client pointed at `<server>/api` with the given tokens stored.
#[allow(dead_code)]
pub fn client_for(
    server_uri: &str,
    tokens: Option<(&str, &str)>,
) -> (AuthClient, CredentialStore, Arc<RecordingNavigator>) {
    let store = CredentialStore::in_memory();
    if let Some((access, refresh)) = tokens {
        store
            .save_tokens(&TokenPair::new(access, refresh))
            .expect("seed tokens");
    }

    let dispatcher = ReqwestDispatcher::new(&format!("{}/api", server_uri), Duration::from_secs(5))
        .expect("dispatcher");
    let navigator = Arc::new(RecordingNavigator::default());
    let client = AuthClient::builder(Arc::new(dispatcher) as Arc<dyn Dispatcher>)
        .store(store.clone())
        .navigator(Arc::clone(&navigator) as Arc<dyn Navigator>)
        .build();

    (client, store, navigator)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

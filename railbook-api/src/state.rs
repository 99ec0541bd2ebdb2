use railbook_store::Datastore;
use std::sync::Arc;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub datastore: Arc<Datastore>,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(datastore: Arc<Datastore>, auth: AuthConfig) -> Self {
        Self { datastore, auth }
    }
}

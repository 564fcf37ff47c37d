//! Wiring of the session, the API client and the router into one console.

use std::sync::Arc;

use tracing::info;

use crate::client::{ApiClient, HttpTransport, Transport};
use crate::config::{ApiConfig, ConfigV1};
use crate::error::StorageError;
use crate::interceptors::Pipeline;
use crate::navigation::{History, Navigator, NavigationGuard, RouteTable, Router};
use crate::session::{Session, SessionStore};
use crate::storage::{Storage, create_storage};

/// Everything the views of the console share.
///
/// The session is hydrated from storage before anything else is built, so
/// the first navigation already sees a restored token.
pub struct Console {
    pub session: Arc<Session>,
    pub client: ApiClient,
    pub store: Arc<SessionStore>,
    pub router: Arc<Router>,
    pub history: Arc<History>,
}

impl Console {
    /// Build a console against the configured storage and the real backend.
    pub fn build(config: &ConfigV1) -> Result<Self, StorageError> {
        let storage = create_storage(&config.storage)?;
        let transport = Arc::new(HttpTransport::new(config.api.base_url.clone()));
        Ok(Self::with_parts(&config.api, storage, transport))
    }

    pub fn with_parts(
        api: &ApiConfig,
        storage: Arc<dyn Storage>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        let durable = storage.is_durable();
        let session = Arc::new(Session::hydrate(storage));
        let history = Arc::new(History::new());

        let navigator: Arc<dyn Navigator> = history.clone();
        let pipeline = Pipeline::standard(session.clone(), navigator, api);
        let client = ApiClient::new(transport, pipeline);

        let store = Arc::new(SessionStore::new(session.clone(), client.clone(), api));
        let router = Arc::new(Router::new(
            RouteTable::admin_console(),
            NavigationGuard::new(store.clone()),
            history.clone(),
        ));

        info!(
            event_name = "console.started",
            event_domain = "console",
            restored_session = session.is_authenticated(),
            durable_storage = durable,
            "console ready"
        );

        Console {
            session,
            client,
            store,
            router,
            history,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FileStorageConfig, StorageBackend, StorageConfig};
    use crate::session::{SessionPhase, TOKEN_KEY};
    use crate::storage::MemoryStorage;
    use mockito::Server;

    #[test]
    fn restores_token_before_first_navigation() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set_item(TOKEN_KEY, "persisted").unwrap();

        let console = Console::with_parts(
            &ApiConfig::default(),
            storage,
            Arc::new(HttpTransport::new("http://127.0.0.1:9")),
        );

        assert_eq!(console.store.token().as_deref(), Some("persisted"));
        assert_eq!(console.store.phase(), SessionPhase::AuthenticatedPendingProfile);
        assert!(console.router.current().is_none());
    }

    #[tokio::test]
    async fn built_console_keeps_session_across_rebuild() {
        let mut server = Server::new_async().await;
        server
            .mock("POST", "/api/v1/auth/login")
            .with_status(200)
            .with_body(r#"{"access_token": "tok-file", "token_type": "bearer", "user": {"username": "root", "is_admin": true}}"#)
            .create_async()
            .await;

        let dir = tempfile::tempdir().expect("tempdir");
        let config = ConfigV1 {
            api: ApiConfig {
                base_url: server.url(),
                ..ApiConfig::default()
            },
            storage: StorageConfig {
                persistent: true,
                backend: Some(StorageBackend::File(FileStorageConfig {
                    path: dir.path().join("session.json").to_string_lossy().into_owned(),
                })),
            },
            ..ConfigV1::default()
        };

        let first = Console::build(&config).expect("file storage opens");
        first.store.login("root", "secret").await.unwrap();
        drop(first);

        let second = Console::build(&config).expect("file storage reopens");
        assert_eq!(second.store.token().as_deref(), Some("tok-file"));
        assert_eq!(second.store.phase(), SessionPhase::AuthenticatedResolved);
        assert!(second.store.is_admin());
    }
}

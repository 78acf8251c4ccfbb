//! Application state wiring all services together.
//!
//! `AppState` is generic over the connector so integration tests can
//! inject a scripted one; production pins it to [`SidecarConnector`].
//! Everything else is concrete: SQLite repository, media cache, session
//! lifecycle, and the contact/chat directory.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chatgate_core::connector::ChatConnector;
use chatgate_core::directory::DirectoryService;
use chatgate_core::event::EventBus;
use chatgate_core::media::MediaCache;
use chatgate_core::session::SessionLifecycle;
use chatgate_infra::connector::SidecarConnector;
use chatgate_infra::sqlite::pool::DatabasePool;
use chatgate_infra::sqlite::SqliteMessageRepository;
use chatgate_types::config::{resolve_data_dir, AppConfig};

/// Shared application state holding all services.
pub struct AppState<C: ChatConnector> {
    pub config: AppConfig,
    pub connector: Arc<C>,
    pub repo: SqliteMessageRepository,
    pub cache: Arc<MediaCache<C, SqliteMessageRepository>>,
    pub lifecycle: Arc<SessionLifecycle<C, SqliteMessageRepository>>,
    pub directory: Arc<DirectoryService<C>>,
    pub media_dir: PathBuf,
}

// Manual Clone: the connector generic is held behind Arcs and need not
// be Clone itself.
impl<C: ChatConnector> Clone for AppState<C> {
    fn clone(&self) -> Self {
        Self {
            config: self.config.clone(),
            connector: Arc::clone(&self.connector),
            repo: self.repo.clone(),
            cache: Arc::clone(&self.cache),
            lifecycle: Arc::clone(&self.lifecycle),
            directory: Arc::clone(&self.directory),
            media_dir: self.media_dir.clone(),
        }
    }
}

impl AppState<SidecarConnector> {
    /// Initialize production state: load config, connect to the DB, and
    /// start the sidecar event pump.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_config(&data_dir).await?;

        let bus = EventBus::default();
        let connector = Arc::new(SidecarConnector::new(config.sidecar_url.clone(), bus)?);
        connector.spawn_event_pump();

        Self::with_connector(connector, data_dir, config).await
    }
}

impl<C: ChatConnector> AppState<C> {
    /// Wire state around an existing connector. Used directly by tests.
    pub async fn with_connector(
        connector: Arc<C>,
        data_dir: PathBuf,
        config: AppConfig,
    ) -> anyhow::Result<Self> {
        let media_dir = data_dir.join("media");
        let session_dir = data_dir.join("session");
        tokio::fs::create_dir_all(&media_dir).await?;
        tokio::fs::create_dir_all(&session_dir).await?;

        let db_url = format!("sqlite://{}?mode=rwc", data_dir.join("chatgate.db").display());
        let pool = DatabasePool::new(&db_url).await?;
        let repo = SqliteMessageRepository::new(pool);

        let cache = Arc::new(MediaCache::new(
            Arc::clone(&connector),
            repo.clone(),
            media_dir.clone(),
        ));

        let lifecycle = Arc::new(SessionLifecycle::new(
            Arc::clone(&connector),
            repo.clone(),
            media_dir.clone(),
            session_dir,
            Duration::from_secs(config.reinit_delay_secs),
        ));

        let directory = Arc::new(DirectoryService::new(
            Arc::clone(&connector),
            config.exclusion.clone(),
        ));

        Ok(Self {
            config,
            connector,
            repo,
            cache,
            lifecycle,
            directory,
            media_dir,
        })
    }
}

/// Load `{data_dir}/config.toml`, falling back to defaults when absent.
async fn load_config(data_dir: &std::path::Path) -> anyhow::Result<AppConfig> {
    let path = data_dir.join("config.toml");
    match tokio::fs::read_to_string(&path).await {
        Ok(raw) => Ok(toml::from_str(&raw)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(e.into()),
    }
}

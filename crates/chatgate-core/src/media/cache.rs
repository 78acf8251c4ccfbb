//! Media cache: download and persist media bytes at most once per message.
//!
//! A message's media lives at `{media_dir}/{message_id}.{ext}`. The
//! presence of the file at the recorded `media_path` is the cache-hit
//! signal; files are never overwritten once present. Concurrent misses
//! for the same message id are collapsed through a per-id single-flight
//! guard so the connector is asked for the bytes only once.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;
use tracing::debug;

use chatgate_types::error::MediaError;
use chatgate_types::message::{InboundMessage, MessageRecord};

use crate::connector::ChatConnector;
use crate::repository::MessageRepository;

/// Downloads media through the connector and persists it to the media
/// directory, updating the message record with the resulting path.
pub struct MediaCache<C, R> {
    connector: Arc<C>,
    repo: R,
    media_dir: PathBuf,
    inflight: DashMap<String, Arc<Mutex<()>>>,
}

impl<C: ChatConnector, R: MessageRepository> MediaCache<C, R> {
    pub fn new(connector: Arc<C>, repo: R, media_dir: PathBuf) -> Self {
        Self {
            connector,
            repo,
            media_dir,
            inflight: DashMap::new(),
        }
    }

    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }

    /// Ensure the media for `record` is on disk, returning its path.
    ///
    /// - Cache hit (`media_path` set and the file exists): returns the
    ///   path unchanged. The connector is not called.
    /// - Miss with `has_media`: fetches bytes + MIME type from the
    ///   connector, writes `{id}.{ext}`, and upserts the record with the
    ///   refreshed media info. Voice notes (`audio`/`ptt`) always get an
    ///   `.ogg` extension; other types derive it from the MIME subtype.
    /// - No media: returns `None` without touching anything.
    pub async fn ensure_downloaded(
        &self,
        record: &MessageRecord,
    ) -> Result<Option<PathBuf>, MediaError> {
        if let Some(path) = self.cached_path(record).await {
            return Ok(Some(path));
        }

        if !record.has_media {
            return Ok(None);
        }

        // Single-flight: concurrent misses for the same id queue on one
        // mutex and re-check the store after acquiring it.
        let guard = self
            .inflight
            .entry(record.id.clone())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone();
        let locked = guard.lock().await;

        let result = self.fetch_and_store(record).await;

        drop(locked);
        self.inflight.remove(&record.id);
        result
    }

    /// Persist an inbound message, reusing or downloading its media.
    ///
    /// Returns the stored record, with media info populated when the
    /// message carries media and the download (or a prior one) succeeded.
    pub async fn ingest(&self, msg: &InboundMessage) -> Result<MessageRecord, MediaError> {
        let mut record = MessageRecord::from(msg);

        // Carry forward media info from an earlier save of the same id.
        if let Some(existing) = self.repo.get_by_id(&msg.id).await?
            && existing.media_path.is_some()
        {
            record.media_path = existing.media_path;
            record.has_media = true;
        }

        self.repo.upsert(&record).await?;

        if let Some(path) = self.ensure_downloaded(&record).await? {
            record.has_media = true;
            record.media_path = Some(path.to_string_lossy().into_owned());
        }

        Ok(record)
    }

    async fn cached_path(&self, record: &MessageRecord) -> Option<PathBuf> {
        let path = PathBuf::from(record.media_path.as_deref()?);
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            Some(path)
        } else {
            None
        }
    }

    async fn fetch_and_store(
        &self,
        record: &MessageRecord,
    ) -> Result<Option<PathBuf>, MediaError> {
        // Another task may have completed the download while we waited.
        if let Some(stored) = self.repo.get_by_id(&record.id).await?
            && let Some(path) = self.cached_path(&stored).await
        {
            return Ok(Some(path));
        }

        let Some(payload) = self.connector.download_media(&record.id).await? else {
            return Ok(None);
        };

        // Voice notes are always opus-in-ogg regardless of the declared
        // MIME subtype.
        let ext = if record.kind.is_voice() {
            "ogg"
        } else {
            payload.subtype()
        };
        let path = self.media_dir.join(format!("{}.{}", record.id, ext));

        tokio::fs::create_dir_all(&self.media_dir).await?;
        if !tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tokio::fs::write(&path, &payload.bytes).await?;
        }
        debug!(message_id = %record.id, path = %path.display(), "media cached");

        let mut updated = record.clone();
        updated.has_media = true;
        updated.media_path = Some(path.to_string_lossy().into_owned());
        self.repo.upsert(&updated).await?;

        Ok(Some(path))
    }
}

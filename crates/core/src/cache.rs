use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::{debug, warn};

use crate::{
    error::{AcquisitionError, Result},
    source::TranscriptSource,
    types::TranscriptSegment,
};

pub fn get_root_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join("parlance")
}

/// Get the cache directory for transcripts under a cache root
pub fn get_transcripts_dir(root: &Path) -> PathBuf {
    root.join("transcripts")
}

/// Get the path for a cached transcript file
pub fn get_transcript_path(root: &Path, video_id: &str) -> PathBuf {
    get_transcripts_dir(root).join(format!("{}.json", video_id))
}

/// Key-value persistence of fetched transcripts, keyed by video id.
#[async_trait]
pub trait TranscriptCache: Send + Sync {
    async fn load(&self, video_id: &str) -> Option<Vec<TranscriptSegment>>;
    async fn store(&self, video_id: &str, segments: &[TranscriptSegment]) -> Result<()>;
}

/// One pretty-printed JSON file per video under `<root>/transcripts`.
pub struct FileTranscriptCache {
    root: PathBuf,
}

impl FileTranscriptCache {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl Default for FileTranscriptCache {
    fn default() -> Self {
        Self::new(get_root_cache_dir())
    }
}

#[async_trait]
impl TranscriptCache for FileTranscriptCache {
    async fn load(&self, video_id: &str) -> Option<Vec<TranscriptSegment>> {
        let path = get_transcript_path(&self.root, video_id);
        let json_content = fs::read_to_string(&path).await.ok()?;
        match serde_json::from_str(&json_content) {
            Ok(segments) => Some(segments),
            Err(e) => {
                warn!(path = %path.display(), "ignoring unreadable cache entry: {}", e);
                None
            }
        }
    }

    async fn store(&self, video_id: &str, segments: &[TranscriptSegment]) -> Result<()> {
        fs::create_dir_all(get_transcripts_dir(&self.root)).await?;
        let pretty_json = serde_json::to_string_pretty(segments)?;
        fs::write(get_transcript_path(&self.root, video_id), &pretty_json).await?;
        Ok(())
    }
}

/// Wraps a source with a cache: hits skip the source, the first successful fetch is stored.
pub struct CachedSource<S, C> {
    inner: S,
    cache: C,
    force: bool,
}

impl<S, C> CachedSource<S, C> {
    pub fn new(inner: S, cache: C) -> Self {
        Self {
            inner,
            cache,
            force: false,
        }
    }

    /// Ignore existing entries and refetch, still storing the fresh result.
    pub fn force_refresh(mut self, force: bool) -> Self {
        self.force = force;
        self
    }
}

#[async_trait]
impl<S, C> TranscriptSource for CachedSource<S, C>
where
    S: TranscriptSource,
    C: TranscriptCache,
{
    async fn fetch(
        &self,
        video_id: &str,
    ) -> std::result::Result<Vec<TranscriptSegment>, AcquisitionError> {
        if !self.force {
            if let Some(segments) = self.cache.load(video_id).await {
                debug!(video_id, "transcript cache hit");
                return Ok(segments);
            }
        }

        let segments = self.inner.fetch(video_id).await?;
        if !segments.is_empty() {
            if let Err(e) = self.cache.store(video_id, &segments).await {
                warn!(video_id, "failed to cache transcript: {}", e);
            }
        }
        Ok(segments)
    }
}

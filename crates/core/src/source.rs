//! Transcript acquisition.
//!
//! `TranscriptSource` is the collaborator that turns a video id into caption segments.
//! `fetch_all` fans a list of inputs out over a bounded number of concurrent fetches and
//! collects every result back into input order. A failed input is recorded, never fatal.

use std::{
    path::{Path, PathBuf},
    sync::{Arc, LazyLock},
};

use async_trait::async_trait;
use regex::Regex;
use serde::Deserialize;
use tokio::{fs, process::Command, sync::Semaphore, task::JoinSet};
use tracing::{debug, info, warn};

use crate::{
    config::FetchConfig,
    error::AcquisitionError,
    types::{InvalidSource, Transcript, TranscriptSegment},
};

static VIDEO_ID_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?:v=|/|vi/)([0-9A-Za-z_-]{11})").expect("video id pattern is valid")
});

static BARE_VIDEO_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z_-]{11}$").expect("bare id pattern is valid"));

/// Extract the 11-character video id from a watch URL, short URL or bare id.
pub fn extract_video_id(input: &str) -> Option<String> {
    let input = input.trim();
    if BARE_VIDEO_ID.is_match(input) {
        return Some(input.to_string());
    }
    VIDEO_ID_PATTERN
        .captures(input)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
}

#[async_trait]
pub trait TranscriptSource: Send + Sync {
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>, AcquisitionError>;
}

#[derive(Debug, Deserialize)]
struct Json3 {
    #[serde(default)]
    events: Vec<Json3Event>,
}

#[derive(Debug, Deserialize)]
struct Json3Event {
    #[serde(rename = "tStartMs", default)]
    start_ms: u64,
    #[serde(rename = "dDurationMs", default)]
    duration_ms: u64,
    #[serde(default)]
    segs: Vec<Json3Seg>,
}

#[derive(Debug, Deserialize)]
struct Json3Seg {
    #[serde(default)]
    utf8: String,
}

/// Parse a YouTube `json3` caption document into segments, skipping blank events.
pub fn parse_json3(raw: &str) -> Result<Vec<TranscriptSegment>, serde_json::Error> {
    let doc: Json3 = serde_json::from_str(raw)?;
    Ok(doc
        .events
        .into_iter()
        .filter_map(|event| {
            let text: String = event.segs.iter().map(|s| s.utf8.as_str()).collect();
            let text = text.replace('\n', " ").trim().to_string();
            if text.is_empty() {
                return None;
            }
            Some(TranscriptSegment {
                start: event.start_ms as f64 / 1000.0,
                duration: event.duration_ms as f64 / 1000.0,
                text,
            })
        })
        .collect())
}

/// Fetches captions with yt-dlp without downloading any media.
pub struct YtDlpSource {
    binary: PathBuf,
    sub_langs: String,
}

impl Default for YtDlpSource {
    fn default() -> Self {
        Self {
            binary: PathBuf::from("yt-dlp"),
            sub_langs: "en.*,en".to_string(),
        }
    }
}

impl YtDlpSource {
    pub fn new(binary: impl Into<PathBuf>, sub_langs: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            sub_langs: sub_langs.into(),
        }
    }

    fn classify_failure(video_id: &str, stderr: &str) -> AcquisitionError {
        let lower = stderr.to_lowercase();
        if lower.contains("video unavailable")
            || lower.contains("private video")
            || lower.contains("does not exist")
            || lower.contains("not a valid url")
            || lower.contains("http error 404")
        {
            AcquisitionError::NotFound {
                video_id: video_id.to_string(),
            }
        } else if lower.contains("subtitles are disabled") || lower.contains("no subtitles") {
            AcquisitionError::TranscriptsDisabled {
                video_id: video_id.to_string(),
            }
        } else {
            AcquisitionError::Unavailable {
                video_id: video_id.to_string(),
                reason: stderr.trim().lines().last().unwrap_or("yt-dlp failed").to_string(),
            }
        }
    }

    async fn find_caption_file(dir: &Path) -> Option<PathBuf> {
        let mut entries = fs::read_dir(dir).await.ok()?;
        let mut found = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if path.extension().is_some_and(|ext| ext == "json3") {
                found.push(path);
            }
        }
        // `<id>.en.json3` sorts before `<id>.en-orig.json3` and the auto variants.
        found.sort();
        found.into_iter().next()
    }
}

#[async_trait]
impl TranscriptSource for YtDlpSource {
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>, AcquisitionError> {
        let unavailable = |reason: String| AcquisitionError::Unavailable {
            video_id: video_id.to_string(),
            reason,
        };

        let workdir = tempfile::tempdir().map_err(|e| unavailable(e.to_string()))?;
        let output_template = workdir.path().join("%(id)s.%(ext)s");
        let url = format!("https://www.youtube.com/watch?v={}", video_id);

        debug!(video_id, "fetching captions with yt-dlp");
        let output = Command::new(&self.binary)
            .arg("--skip-download")
            .arg("--write-subs")
            .arg("--write-auto-subs")
            .arg("--sub-langs")
            .arg(&self.sub_langs)
            .arg("--sub-format")
            .arg("json3")
            .arg("-o")
            .arg(&output_template)
            .arg(&url)
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| unavailable(format!("failed to run {}: {}", self.binary.display(), e)))?;

        if !output.status.success() {
            return Err(Self::classify_failure(
                video_id,
                &String::from_utf8_lossy(&output.stderr),
            ));
        }

        let Some(caption_file) = Self::find_caption_file(workdir.path()).await else {
            return Err(AcquisitionError::TranscriptsDisabled {
                video_id: video_id.to_string(),
            });
        };

        let raw = fs::read_to_string(&caption_file)
            .await
            .map_err(|e| unavailable(e.to_string()))?;
        parse_json3(&raw).map_err(|e| unavailable(format!("unreadable captions: {}", e)))
    }
}

/// Transcripts that were fetched, and the inputs that were not, both in input order.
#[derive(Debug, Clone, Default)]
pub struct FetchBatch {
    pub transcripts: Vec<Transcript>,
    pub invalid: Vec<InvalidSource>,
}

impl FetchBatch {
    pub fn is_empty(&self) -> bool {
        self.transcripts.is_empty()
    }
}

/// Fetch every input with at most `max_concurrent_fetches` in flight. Each task writes only
/// its own slot; the call returns once all of them have finished.
pub async fn fetch_all(
    source: Arc<dyn TranscriptSource>,
    inputs: &[String],
    config: &FetchConfig,
) -> FetchBatch {
    let semaphore = Arc::new(Semaphore::new(config.max_concurrent_fetches.max(1)));
    let timeout = config.fetch_timeout();
    let mut slots: Vec<Option<Result<Transcript, AcquisitionError>>> =
        (0..inputs.len()).map(|_| None).collect();
    let mut tasks = JoinSet::new();

    for (index, input) in inputs.iter().enumerate() {
        let Some(video_id) = extract_video_id(input) else {
            slots[index] = Some(Err(AcquisitionError::InvalidIdentifier {
                input: input.clone(),
            }));
            continue;
        };

        let source = Arc::clone(&source);
        let semaphore = Arc::clone(&semaphore);
        let source_url = input.clone();
        tasks.spawn(async move {
            let _permit = semaphore.acquire_owned().await.ok();
            let result = match tokio::time::timeout(timeout, source.fetch(&video_id)).await {
                Ok(Ok(segments)) if segments.is_empty() => Err(AcquisitionError::Unavailable {
                    video_id: video_id.clone(),
                    reason: "transcript is empty".to_string(),
                }),
                Ok(Ok(segments)) => Ok(Transcript {
                    video_id: video_id.clone(),
                    source_url,
                    segments,
                }),
                Ok(Err(e)) => Err(e),
                Err(_) => Err(AcquisitionError::TimedOut {
                    video_id: video_id.clone(),
                    seconds: timeout.as_secs(),
                }),
            };
            (index, result)
        });
    }

    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok((index, result)) => slots[index] = Some(result),
            Err(e) => warn!("fetch task aborted: {}", e),
        }
    }

    let mut batch = FetchBatch::default();
    for (input, slot) in inputs.iter().zip(slots) {
        match slot {
            Some(Ok(transcript)) => batch.transcripts.push(transcript),
            Some(Err(e)) => {
                warn!(input = %input, "skipping input: {}", e);
                batch.invalid.push(InvalidSource {
                    input: input.clone(),
                    reason: e.to_string(),
                });
            }
            None => batch.invalid.push(InvalidSource {
                input: input.clone(),
                reason: "fetch task aborted".to_string(),
            }),
        }
    }

    info!(
        fetched = batch.transcripts.len(),
        invalid = batch.invalid.len(),
        "transcript fetch complete"
    );
    batch
}

pub mod ads;
pub mod cache;
pub mod config;
pub mod counter;
pub mod enrich;
pub mod error;
pub mod export;
pub mod filler;
pub mod format;
pub mod insights;
pub mod llm;
pub mod nlp;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod rate_limit;
pub mod source;
pub mod types;

pub use ads::{AdLexicon, SentenceSignal, detect_ad_spans, detect_ad_spans_in_segments};
pub use cache::{CachedSource, FileTranscriptCache, TranscriptCache, get_root_cache_dir};
pub use config::{AdDetectorConfig, AnalysisConfig, EnrichmentConfig, FetchConfig, GenerationParams};
pub use enrich::Enricher;
pub use error::{AcquisitionError, ConfigError, EnrichmentError, ParlanceError, Result};
pub use export::{load_report, save_report, write_ad_spans_csv, write_report_csv};
pub use filler::{FillerLexicon, detect_fillers};
pub use format::{format_report_readable, format_timestamp, parse_timestamp};
pub use insights::Analyzer;
pub use llm::{ChatCompletionsClient, TextGenerator};
pub use nlp::{LexiconSentiment, NlpEngine, RuleBasedNlp, SentimentScorer};
pub use normalize::normalize_text;
pub use provider::{Provider, ProviderConfig};
pub use source::{FetchBatch, TranscriptSource, YtDlpSource, extract_video_id};
pub use types::{AdSpan, AnalysisReport, FillerMatch, Transcript, TranscriptSegment, VideoAds};

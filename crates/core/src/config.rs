use std::{path::Path, time::Duration};

use serde::{Deserialize, Serialize};

use crate::{error::ConfigError, filler::FillerLexicon};

pub const DEFAULT_FILLER_WORDS: &[&str] = &[
    "uh", "um", "er", "ah", "like", "well", "right", "okay", "yeah",
];

pub const DEFAULT_COMMON_VERBS: &[&str] = &[
    "have", "do", "be", "get", "make", "go", "say", "know", "think", "see", "take",
];

pub const DEFAULT_AD_KEYWORDS: &[&str] = &[
    "sponsored by",
    "brought to you by",
    "today's sponsor",
    "use code",
    "partnered with",
    "in collaboration with",
    "this video is sponsored",
    "our sponsor",
    "this video is made possible by",
    "exclusive offer",
    "special discount",
    "click the link",
    "limited time offer",
    "visit our partner",
    "get yours now",
    "sponsoring this video",
];

pub const DEFAULT_WEAK_KEYWORDS: &[&str] = &["check out", "special deal", "discount"];

fn strings(words: &[&str]) -> Vec<String> {
    words.iter().map(|w| w.to_string()).collect()
}

/// Everything tunable about an analysis run. Missing fields in a config file fall back to defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub filler_words: Vec<String>,
    pub common_verbs: Vec<String>,
    pub top_n: usize,
    pub topic_top_n: usize,
    pub ads: AdDetectorConfig,
    pub enrichment: EnrichmentConfig,
    pub fetch: FetchConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            filler_words: strings(DEFAULT_FILLER_WORDS),
            common_verbs: strings(DEFAULT_COMMON_VERBS),
            top_n: 10,
            topic_top_n: 5,
            ads: AdDetectorConfig::default(),
            enrichment: EnrichmentConfig::default(),
            fetch: FetchConfig::default(),
        }
    }
}

impl AnalysisConfig {
    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: AnalysisConfig =
            serde_json::from_str(&raw).map_err(|e| ConfigError::InvalidConfig {
                reason: format!("{}: {}", path.display(), e),
            })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: &str| {
            Err(ConfigError::InvalidConfig {
                reason: reason.to_string(),
            })
        };

        if self.top_n == 0 || self.topic_top_n == 0 {
            return invalid("top_n and topic_top_n must be > 0");
        }
        if self.filler_words.iter().all(|w| w.trim().is_empty()) {
            return invalid("filler_words must not be empty");
        }
        if self.ads.lookahead_non_ad == 0 {
            return invalid("ads.lookahead_non_ad must be > 0");
        }
        if self.fetch.max_concurrent_fetches == 0 || self.enrichment.max_concurrent_calls == 0 {
            return invalid("concurrency limits must be > 0");
        }
        if self.enrichment.rate_limit.burst == 0 {
            return invalid("enrichment.rate_limit.burst must be > 0");
        }
        Ok(())
    }

    pub fn filler_lexicon(&self) -> FillerLexicon {
        FillerLexicon::new(self.filler_words.iter().map(String::as_str))
    }
}

/// Keyword lists and window sizes of the ad-span state machine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AdDetectorConfig {
    pub ad_keywords: Vec<String>,
    pub weak_keywords: Vec<String>,
    pub backtrack_sentences: usize,
    pub backtrack_max_words: usize,
    pub lookahead_non_ad: usize,
    /// Close a span still open when the transcript ends. Off keeps such spans unreported.
    pub flush_trailing_span: bool,
}

impl Default for AdDetectorConfig {
    fn default() -> Self {
        Self {
            ad_keywords: strings(DEFAULT_AD_KEYWORDS),
            weak_keywords: strings(DEFAULT_WEAK_KEYWORDS),
            backtrack_sentences: 5,
            backtrack_max_words: 20,
            lookahead_non_ad: 2,
            flush_trailing_span: false,
        }
    }
}

/// Sampling parameters sent with every LLM call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationParams {
    pub temperature: f32,
    pub top_p: f32,
    pub top_k: u32,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            top_p: 0.5,
            top_k: 1,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    pub burst: u32,
    pub interval_ms: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            burst: 1,
            interval_ms: 2_000,
        }
    }
}

impl RateLimitConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EnrichmentConfig {
    pub generation: GenerationParams,
    pub max_prompt_chars: usize,
    pub call_timeout_secs: u64,
    pub max_concurrent_calls: usize,
    pub rate_limit: RateLimitConfig,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            generation: GenerationParams::default(),
            max_prompt_chars: 60_000,
            call_timeout_secs: 120,
            max_concurrent_calls: 1,
            rate_limit: RateLimitConfig::default(),
        }
    }
}

impl EnrichmentConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_secs(self.call_timeout_secs)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    pub max_concurrent_fetches: usize,
    pub fetch_timeout_secs: u64,
    pub use_cache: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            max_concurrent_fetches: 4,
            fetch_timeout_secs: 90,
            use_cache: true,
        }
    }
}

impl FetchConfig {
    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }
}

use serde::{Deserialize, Serialize};

/// One caption record as returned by the transcript source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptSegment {
    pub start: f64,
    pub duration: f64,
    pub text: String,
}

impl TranscriptSegment {
    pub fn new(start: f64, duration: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            duration,
            text: text.into(),
        }
    }

    pub fn end(&self) -> f64 {
        self.start + self.duration
    }
}

/// Transcript of a single video, in chronological order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcript {
    pub video_id: String,
    pub source_url: String,
    pub segments: Vec<TranscriptSegment>,
}

impl Transcript {
    /// Start of the last segment plus its duration, 0 when empty.
    pub fn duration_seconds(&self) -> f64 {
        self.segments.last().map(|s| s.end()).unwrap_or(0.0)
    }

    pub fn text(&self) -> String {
        self.segments
            .iter()
            .map(|s| s.text.trim())
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Normalized words of one segment, timing kept.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedSegment {
    pub start: f64,
    pub duration: f64,
    pub words: Vec<String>,
}

/// A filler word or phrase with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillerMatch {
    pub phrase: Vec<String>,
    pub count: usize,
}

impl FillerMatch {
    pub fn text(&self) -> String {
        self.phrase.join(" ")
    }
}

/// Ranked filler tables for window sizes 1, 2 and 3.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FillerTables {
    pub words: Vec<FillerMatch>,
    pub bigrams: Vec<FillerMatch>,
    pub trigrams: Vec<FillerMatch>,
}

/// A detected advertisement segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdSpan {
    pub start_time: f64,
    pub end_time: f64,
    pub text: String,
    pub product: Option<String>,
}

/// Ad spans found in one video.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VideoAds {
    pub video_id: String,
    pub source_url: String,
    pub spans: Vec<AdSpan>,
}

/// A ranked item with its exact count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankedTerm {
    pub term: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpeechMetrics {
    pub total_words: usize,
    pub unique_words: usize,
    pub filler_count: usize,
    pub filler_percentage: f64,
    pub duration_seconds: f64,
    pub speaking_pace_wpm: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SentimentLabel {
    Positive,
    Neutral,
    Negative,
}

impl SentimentLabel {
    pub fn from_polarity(polarity: f64) -> Self {
        if polarity > 0.0 {
            SentimentLabel::Positive
        } else if polarity < 0.0 {
            SentimentLabel::Negative
        } else {
            SentimentLabel::Neutral
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            SentimentLabel::Positive => "Positive",
            SentimentLabel::Neutral => "Neutral",
            SentimentLabel::Negative => "Negative",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredSentence {
    pub text: String,
    pub polarity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SentimentBreakdown {
    pub positive_pct: f64,
    pub neutral_pct: f64,
    pub negative_pct: f64,
    pub overall_polarity: f64,
    pub label: SentimentLabel,
    pub most_positive: Vec<ScoredSentence>,
    pub most_negative: Vec<ScoredSentence>,
}

impl Default for SentimentBreakdown {
    fn default() -> Self {
        Self {
            positive_pct: 0.0,
            neutral_pct: 0.0,
            negative_pct: 0.0,
            overall_polarity: 0.0,
            label: SentimentLabel::Neutral,
            most_positive: Vec::new(),
            most_negative: Vec::new(),
        }
    }
}

/// LLM-assessed quality of the sponsorship segments of a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SponsorshipQuality {
    pub disclosure_clarity: u8,
    pub relevance: u8,
    pub intrusiveness: u8,
    pub overall: u8,
    pub notes: String,
}

/// An input that could not be turned into a transcript.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InvalidSource {
    pub input: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub sources: Vec<String>,
    pub invalid_sources: Vec<InvalidSource>,
    pub metrics: SpeechMetrics,
    pub most_used_words: Vec<RankedTerm>,
    pub fillers: FillerTables,
    pub sentiment: SentimentBreakdown,
    pub focused_topics: Vec<RankedTerm>,
    #[serde(default)]
    pub ads: Option<Vec<VideoAds>>,
    #[serde(default)]
    pub sponsorship: Option<SponsorshipQuality>,
    #[serde(default)]
    pub suggestions: Option<Vec<String>>,
}

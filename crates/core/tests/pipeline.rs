use std::{collections::HashMap, sync::Arc, time::Duration};

use async_trait::async_trait;
use parlance_core::{
    AcquisitionError, AnalysisConfig, Analyzer, EnrichmentConfig, EnrichmentError, Enricher,
    FetchConfig, GenerationParams, LexiconSentiment, RuleBasedNlp, TextGenerator,
    TranscriptSegment, TranscriptSource,
    config::RateLimitConfig,
    export::{load_report, save_report},
    format_report_readable,
    pipeline::{acquire, analyze_speech, detect_ads, enrich_ads, enrich_report},
};

/// In-memory source with a per-id delay so completion order differs from input order.
struct FakeSource {
    transcripts: HashMap<String, (u64, Result<Vec<TranscriptSegment>, AcquisitionError>)>,
}

impl FakeSource {
    fn new() -> Self {
        Self {
            transcripts: HashMap::new(),
        }
    }

    fn with(
        mut self,
        video_id: &str,
        delay_ms: u64,
        result: Result<Vec<TranscriptSegment>, AcquisitionError>,
    ) -> Self {
        self.transcripts
            .insert(video_id.to_string(), (delay_ms, result));
        self
    }
}

#[async_trait]
impl TranscriptSource for FakeSource {
    async fn fetch(&self, video_id: &str) -> Result<Vec<TranscriptSegment>, AcquisitionError> {
        let Some((delay_ms, result)) = self.transcripts.get(video_id) else {
            return Err(AcquisitionError::NotFound {
                video_id: video_id.to_string(),
            });
        };
        tokio::time::sleep(Duration::from_millis(*delay_ms)).await;
        result.clone()
    }
}

/// Answers by prompt kind.
struct FakeGenerator {
    product: Result<String, EnrichmentError>,
    sponsorship: String,
    suggestions: String,
}

#[async_trait]
impl TextGenerator for FakeGenerator {
    async fn generate(
        &self,
        prompt: &str,
        _params: &GenerationParams,
    ) -> Result<String, EnrichmentError> {
        if prompt.contains("Identify the main product") {
            self.product.clone()
        } else if prompt.contains("Score them") {
            Ok(self.sponsorship.clone())
        } else {
            Ok(self.suggestions.clone())
        }
    }
}

fn segment(start: f64, text: &str) -> TranscriptSegment {
    TranscriptSegment::new(start, 10.0, text)
}

fn sponsored_transcript() -> Vec<TranscriptSegment> {
    vec![
        segment(0.0, "welcome back to the channel everyone"),
        segment(
            10.0,
            "today we are going to look at how async runtimes schedule their tasks and why the \
             work stealing approach ended up being the default choice",
        ),
        segment(20.0, "but first"),
        segment(30.0, "this video is sponsored by NordVPN"),
        segment(40.0, "use code PARLANCE for a special discount"),
        segment(50.0, "now back to the runtimes"),
        segment(60.0, "tokio uses a work stealing scheduler"),
        segment(70.0, "which is pretty great honestly"),
        segment(80.0, "thanks for watching"),
    ]
}

fn quick_enrichment() -> EnrichmentConfig {
    EnrichmentConfig {
        rate_limit: RateLimitConfig {
            burst: 1,
            interval_ms: 0,
        },
        ..EnrichmentConfig::default()
    }
}

fn inputs(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn batch_keeps_input_order_and_records_failures() {
    let source = FakeSource::new()
        .with("aaaaaaaaaaa", 60, Ok(vec![segment(0.0, "first video")]))
        .with(
            "bbbbbbbbbbb",
            0,
            Err(AcquisitionError::TranscriptsDisabled {
                video_id: "bbbbbbbbbbb".to_string(),
            }),
        )
        .with("ccccccccccc", 0, Ok(vec![segment(0.0, "third video")]))
        .with("ddddddddddd", 0, Ok(Vec::new()));

    let batch = acquire(
        Arc::new(source),
        &inputs(&[
            "https://www.youtube.com/watch?v=aaaaaaaaaaa",
            "not a video",
            "https://youtu.be/bbbbbbbbbbb",
            "ccccccccccc",
            "ddddddddddd",
        ]),
        &FetchConfig::default(),
    )
    .await;

    let ids: Vec<&str> = batch.transcripts.iter().map(|t| t.video_id.as_str()).collect();
    assert_eq!(ids, vec!["aaaaaaaaaaa", "ccccccccccc"]);
    assert_eq!(
        batch.transcripts[0].source_url,
        "https://www.youtube.com/watch?v=aaaaaaaaaaa"
    );

    let invalid: Vec<&str> = batch.invalid.iter().map(|i| i.input.as_str()).collect();
    assert_eq!(
        invalid,
        vec!["not a video", "https://youtu.be/bbbbbbbbbbb", "ddddddddddd"]
    );
    assert!(batch.invalid[1].reason.contains("disabled"));
}

#[tokio::test(start_paused = true)]
async fn slow_fetch_times_out_without_blocking_siblings() {
    let source = FakeSource::new()
        .with("aaaaaaaaaaa", 600_000, Ok(vec![segment(0.0, "never arrives")]))
        .with("bbbbbbbbbbb", 10, Ok(vec![segment(0.0, "fast")]));
    let config = FetchConfig {
        fetch_timeout_secs: 5,
        ..FetchConfig::default()
    };

    let batch = acquire(
        Arc::new(source),
        &inputs(&["aaaaaaaaaaa", "bbbbbbbbbbb"]),
        &config,
    )
    .await;

    assert_eq!(batch.transcripts.len(), 1);
    assert_eq!(batch.transcripts[0].video_id, "bbbbbbbbbbb");
    assert!(batch.invalid[0].reason.contains("timed out"));
}

#[tokio::test]
async fn speech_report_counts_words_and_fillers() {
    let source = FakeSource::new().with(
        "aaaaaaaaaaa",
        0,
        Ok(vec![
            TranscriptSegment::new(0.0, 4.0, "Um, so I think like Rust is great."),
            TranscriptSegment::new(4.0, 3.0, "Okay, I don't know."),
        ]),
    );
    let config = AnalysisConfig::default();
    let batch = acquire(Arc::new(source), &inputs(&["aaaaaaaaaaa"]), &config.fetch).await;

    let nlp = RuleBasedNlp::new();
    let sentiment = LexiconSentiment::new();
    let report = analyze_speech(&Analyzer::new(&nlp, &sentiment, &config), &batch);

    assert_eq!(report.metrics.total_words, 13);
    assert_eq!(report.metrics.unique_words, 12);
    assert_eq!(report.metrics.filler_count, 3);
    assert_eq!(report.metrics.filler_percentage, 23.08);
    assert_eq!(report.metrics.duration_seconds, 7.0);
    assert_eq!(report.metrics.speaking_pace_wpm, 111.43);

    let fillers: Vec<String> = report.fillers.words.iter().map(|m| m.text()).collect();
    assert_eq!(fillers, vec!["um", "like", "okay"]);
    assert!(report.fillers.bigrams.iter().all(|m| m.phrase.len() == 2));
    assert!(report.ads.is_none());
    assert!(report.suggestions.is_none());
}

#[tokio::test]
async fn ads_are_detected_and_failed_naming_is_unknown() {
    let source = FakeSource::new().with("aaaaaaaaaaa", 0, Ok(sponsored_transcript()));
    let config = AnalysisConfig::default();
    let batch = acquire(Arc::new(source), &inputs(&["aaaaaaaaaaa"]), &config.fetch).await;

    let videos = detect_ads(&batch, &config.ads);
    assert_eq!(videos.len(), 1);
    let spans = &videos[0].spans;
    assert_eq!(spans.len(), 1);
    assert_eq!(spans[0].start_time, 20.0);
    assert_eq!(spans[0].end_time, 80.0);
    assert!(spans[0].text.starts_with("but first this video is sponsored by NordVPN"));
    assert!(spans[0].text.ends_with("which is pretty great honestly"));
    assert!(spans[0].product.is_none());

    let enricher = Enricher::new(
        Arc::new(FakeGenerator {
            product: Err(EnrichmentError::LlmUnavailable {
                reason: "connection refused".to_string(),
            }),
            sponsorship: String::new(),
            suggestions: String::new(),
        }),
        quick_enrichment(),
    );
    let videos = enrich_ads(&enricher, videos).await;
    assert_eq!(videos[0].spans[0].product.as_deref(), Some("Unknown"));
}

#[tokio::test]
async fn enrichment_returns_a_new_report_and_tolerates_malformed_json() {
    let source = FakeSource::new().with("aaaaaaaaaaa", 0, Ok(sponsored_transcript()));
    let config = AnalysisConfig::default();
    let batch = acquire(Arc::new(source), &inputs(&["aaaaaaaaaaa"]), &config.fetch).await;

    let nlp = RuleBasedNlp::new();
    let sentiment = LexiconSentiment::new();
    let report = analyze_speech(&Analyzer::new(&nlp, &sentiment, &config), &batch);
    let metrics_before = report.metrics.clone();

    let enricher = Enricher::new(
        Arc::new(FakeGenerator {
            product: Ok("NordVPN".to_string()),
            sponsorship: "I would rate this a solid seven.".to_string(),
            suggestions: "Sure:\n1. Slow down.\n2. Pause between points.".to_string(),
        }),
        quick_enrichment(),
    );
    let videos = enrich_ads(&enricher, detect_ads(&batch, &config.ads)).await;
    let text = batch.transcripts[0].text();
    let report = enrich_report(&enricher, report, Some(videos), Some(&text)).await;

    assert_eq!(report.metrics, metrics_before);
    assert!(report.sponsorship.is_none());
    assert_eq!(
        report.suggestions,
        Some(vec![
            "1. Slow down.".to_string(),
            "2. Pause between points.".to_string()
        ])
    );
    let ads = report.ads.as_ref().unwrap();
    assert_eq!(ads[0].spans[0].product.as_deref(), Some("NordVPN"));

    let readable = format_report_readable(&report);
    assert!(readable.contains("## Ad Segments"));
    assert!(readable.contains("[00:20–01:20] NordVPN"));
    assert!(readable.contains("1. Slow down."));
    assert!(!readable.contains("## Sponsorship Quality"));
}

#[tokio::test]
async fn sponsorship_json_is_attached_when_valid() {
    let source = FakeSource::new().with("aaaaaaaaaaa", 0, Ok(sponsored_transcript()));
    let config = AnalysisConfig::default();
    let batch = acquire(Arc::new(source), &inputs(&["aaaaaaaaaaa"]), &config.fetch).await;

    let nlp = RuleBasedNlp::new();
    let sentiment = LexiconSentiment::new();
    let report = analyze_speech(&Analyzer::new(&nlp, &sentiment, &config), &batch);

    let enricher = Enricher::new(
        Arc::new(FakeGenerator {
            product: Ok("NordVPN".to_string()),
            sponsorship: "```json\n{\"disclosure_clarity\": 9, \"relevance\": 4, \
                          \"intrusiveness\": 2, \"overall\": 6, \"notes\": \"clear disclosure\"}\n```"
                .to_string(),
            suggestions: String::new(),
        }),
        quick_enrichment(),
    );
    let videos = detect_ads(&batch, &config.ads);
    let report = enrich_report(&enricher, report, Some(videos), None).await;

    let quality = report.sponsorship.as_ref().unwrap();
    assert_eq!(quality.disclosure_clarity, 9);
    assert_eq!(quality.overall, 6);
    assert!(report.suggestions.is_none());

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("report.json");
    save_report(&report, &path).await.unwrap();
    let loaded = load_report(&path).await.unwrap();
    assert_eq!(loaded.sponsorship, report.sponsorship);
    assert_eq!(loaded.metrics, report.metrics);
}

//! End-to-end orchestration of the speech and ad pipelines.
//!
//! Every stage returns a value for the next one. Collaborator failures are recorded or turned
//! into absent fields here and never escape as errors.

use std::sync::Arc;

use tracing::{info, warn};

use crate::{
    ads::detect_ad_spans_in_segments,
    config::{AdDetectorConfig, FetchConfig},
    enrich::Enricher,
    insights::Analyzer,
    source::{FetchBatch, TranscriptSource, fetch_all},
    types::{AdSpan, AnalysisReport, VideoAds},
};

/// Fetch every input. Bad inputs end up in `FetchBatch::invalid`.
pub async fn acquire(
    source: Arc<dyn TranscriptSource>,
    inputs: &[String],
    config: &FetchConfig,
) -> FetchBatch {
    fetch_all(source, inputs, config).await
}

pub fn analyze_speech(analyzer: &Analyzer<'_>, batch: &FetchBatch) -> AnalysisReport {
    analyzer.analyze(batch)
}

/// Ad spans of every fetched transcript, one entry per video in input order.
pub fn detect_ads(batch: &FetchBatch, config: &AdDetectorConfig) -> Vec<VideoAds> {
    let videos: Vec<VideoAds> = batch
        .transcripts
        .iter()
        .map(|t| VideoAds {
            video_id: t.video_id.clone(),
            source_url: t.source_url.clone(),
            spans: detect_ad_spans_in_segments(&t.segments, config),
        })
        .collect();

    info!(
        videos = videos.len(),
        spans = videos.iter().map(|v| v.spans.len()).sum::<usize>(),
        "ad detection complete"
    );
    videos
}

/// Name the product of every span.
pub async fn enrich_ads(enricher: &Enricher, videos: Vec<VideoAds>) -> Vec<VideoAds> {
    let mut enriched = Vec::with_capacity(videos.len());
    for mut video in videos {
        video.spans = enricher.enrich_spans(video.spans).await;
        enriched.push(video);
    }
    enriched
}

/// Attach ads with their sponsorship quality, and suggestions when `transcript_text` is given,
/// returning a new report. A failed call leaves its field `None`.
pub async fn enrich_report(
    enricher: &Enricher,
    report: AnalysisReport,
    ads: Option<Vec<VideoAds>>,
    transcript_text: Option<&str>,
) -> AnalysisReport {
    let sponsorship = match &ads {
        Some(videos) => {
            let spans: Vec<&AdSpan> = videos.iter().flat_map(|v| v.spans.iter()).collect();
            if spans.is_empty() {
                None
            } else {
                enricher
                    .assess_sponsorship(&spans)
                    .await
                    .inspect_err(|e| warn!("sponsorship assessment skipped: {}", e))
                    .ok()
            }
        }
        None => None,
    };

    let suggestions = match transcript_text {
        Some(text) if !text.trim().is_empty() => enricher
            .suggest_improvements(text)
            .await
            .inspect_err(|e| warn!("suggestions skipped: {}", e))
            .ok(),
        _ => None,
    };

    AnalysisReport {
        ads: ads.or(report.ads),
        sponsorship,
        suggestions,
        ..report
    }
}

/// Attach detected ads to a report without any LLM calls.
pub fn with_ads(report: AnalysisReport, ads: Vec<VideoAds>) -> AnalysisReport {
    AnalysisReport {
        ads: Some(ads),
        ..report
    }
}

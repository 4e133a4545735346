//! Report persistence and tabular export.

use std::{io::Write, path::Path};

use tokio::fs;

use crate::{
    enrich::UNKNOWN_PRODUCT,
    error::Result,
    format::format_timestamp,
    types::{AnalysisReport, VideoAds},
};

/// One row per ad span: `Video URL, Start Time, End Time, Ad Text, Product`.
pub fn write_ad_spans_csv<W: Write>(writer: W, videos: &[VideoAds]) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["Video URL", "Start Time", "End Time", "Ad Text", "Product"])?;
    for video in videos {
        for span in &video.spans {
            csv.write_record([
                video.source_url.as_str(),
                &format_timestamp(span.start_time),
                &format_timestamp(span.end_time),
                span.text.as_str(),
                span.product.as_deref().unwrap_or(UNKNOWN_PRODUCT),
            ])?;
        }
    }
    csv.flush()?;
    Ok(())
}

/// Flatten a report into `(section, item, value)` line items.
pub fn report_rows(report: &AnalysisReport) -> Vec<(String, String, String)> {
    let mut rows = Vec::new();
    let mut row = |section: &str, item: &str, value: String| {
        rows.push((section.to_string(), item.to_string(), value));
    };

    let m = &report.metrics;
    row("Metrics", "Total Words", m.total_words.to_string());
    row("Metrics", "Unique Words", m.unique_words.to_string());
    row("Metrics", "Filler Words", m.filler_count.to_string());
    row("Metrics", "Filler Percentage", format!("{:.2}", m.filler_percentage));
    row("Metrics", "Duration", format_timestamp(m.duration_seconds));
    row("Metrics", "Speaking Pace (wpm)", format!("{:.2}", m.speaking_pace_wpm));

    for term in &report.most_used_words {
        row("Most Used Words", &term.term, term.count.to_string());
    }
    for (section, table) in [
        ("Filler Words", &report.fillers.words),
        ("Filler Bigrams", &report.fillers.bigrams),
        ("Filler Trigrams", &report.fillers.trigrams),
    ] {
        for m in table {
            row(section, &m.text(), m.count.to_string());
        }
    }

    let s = &report.sentiment;
    row("Sentiment", "Overall", s.label.name().to_string());
    row("Sentiment", "Polarity", format!("{:.2}", s.overall_polarity));
    row("Sentiment", "Positive %", format!("{:.2}", s.positive_pct));
    row("Sentiment", "Neutral %", format!("{:.2}", s.neutral_pct));
    row("Sentiment", "Negative %", format!("{:.2}", s.negative_pct));

    for term in &report.focused_topics {
        row("Focused Topics", &term.term, term.count.to_string());
    }

    if let Some(q) = &report.sponsorship {
        row("Sponsorship", "Disclosure Clarity", q.disclosure_clarity.to_string());
        row("Sponsorship", "Relevance", q.relevance.to_string());
        row("Sponsorship", "Intrusiveness", q.intrusiveness.to_string());
        row("Sponsorship", "Overall", q.overall.to_string());
    }
    if let Some(suggestions) = &report.suggestions {
        for (i, suggestion) in suggestions.iter().enumerate() {
            row("Suggestions", &(i + 1).to_string(), suggestion.clone());
        }
    }
    for invalid in &report.invalid_sources {
        row("Invalid Sources", &invalid.input, invalid.reason.clone());
    }

    rows
}

/// One row per report line item: `Section, Item, Value`.
pub fn write_report_csv<W: Write>(writer: W, report: &AnalysisReport) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(["Section", "Item", "Value"])?;
    for (section, item, value) in report_rows(report) {
        csv.write_record([section, item, value])?;
    }
    csv.flush()?;
    Ok(())
}

/// Load a report from a file
pub async fn load_report(path: &Path) -> Result<AnalysisReport> {
    let json_content = fs::read_to_string(path).await?;
    let report: AnalysisReport = serde_json::from_str(&json_content)?;
    Ok(report)
}

/// Save a report to a file
pub async fn save_report(report: &AnalysisReport, path: &Path) -> Result<()> {
    let pretty_json = serde_json::to_string_pretty(report)?;
    fs::write(path, &pretty_json).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AdSpan;

    #[test]
    fn ad_rows_use_timestamps_and_unknown_product() {
        let videos = vec![VideoAds {
            video_id: "abcdefghijk".to_string(),
            source_url: "https://youtu.be/abcdefghijk".to_string(),
            spans: vec![
                AdSpan {
                    start_time: 65.4,
                    end_time: 125.0,
                    text: "use code SAVE, thanks".to_string(),
                    product: Some("NordVPN".to_string()),
                },
                AdSpan {
                    start_time: 300.0,
                    end_time: 310.0,
                    text: "check out this special deal".to_string(),
                    product: None,
                },
            ],
        }];

        let mut buf = Vec::new();
        write_ad_spans_csv(&mut buf, &videos).unwrap();
        let out = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Video URL,Start Time,End Time,Ad Text,Product");
        assert_eq!(
            lines[1],
            "https://youtu.be/abcdefghijk,01:05,02:05,\"use code SAVE, thanks\",NordVPN"
        );
        assert_eq!(
            lines[2],
            "https://youtu.be/abcdefghijk,05:00,05:10,check out this special deal,Unknown"
        );
    }

    #[test]
    fn no_spans_is_header_only() {
        let mut buf = Vec::new();
        write_ad_spans_csv(&mut buf, &[]).unwrap();
        assert_eq!(String::from_utf8(buf).unwrap().lines().count(), 1);
    }
}

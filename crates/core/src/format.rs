use crate::types::{AnalysisReport, FillerMatch, RankedTerm};

/// Format seconds as MM:SS timestamp. Negative input formats as 00:00.
pub fn format_timestamp(seconds: f64) -> String {
    let total = seconds.max(0.0).floor() as u64;
    format!("{:02}:{:02}", total / 60, total % 60)
}

/// Parse an `MM:SS` timestamp back into whole seconds.
pub fn parse_timestamp(timestamp: &str) -> Option<u64> {
    let (mins, secs) = timestamp.trim().split_once(':')?;
    let mins: u64 = mins.parse().ok()?;
    let secs: u64 = secs.parse().ok()?;
    if secs >= 60 {
        return None;
    }
    Some(mins * 60 + secs)
}

fn push_ranked_terms(output: &mut String, terms: &[RankedTerm]) {
    if terms.is_empty() {
        output.push_str("(none)\n");
    }
    for (i, term) in terms.iter().enumerate() {
        output.push_str(&format!("{}. {} ({})\n", i + 1, term.term, term.count));
    }
    output.push('\n');
}

fn push_filler_table(output: &mut String, title: &str, matches: &[FillerMatch]) {
    output.push_str(&format!("### {}\n\n", title));
    if matches.is_empty() {
        output.push_str("(none)\n");
    }
    for m in matches {
        output.push_str(&format!("• \"{}\" × {}\n", m.text(), m.count));
    }
    output.push('\n');
}

/// Format an analysis report as human-readable markdown
pub fn format_report_readable(report: &AnalysisReport) -> String {
    let mut output = String::new();
    let metrics = &report.metrics;

    output.push_str("# Speech Analysis\n\n");

    // Sources
    output.push_str(&format!(
        "**Sources:** {} analyzed | {} skipped\n\n",
        report.sources.len(),
        report.invalid_sources.len()
    ));
    for invalid in &report.invalid_sources {
        output.push_str(&format!("• skipped {}: {}\n", invalid.input, invalid.reason));
    }
    if !report.invalid_sources.is_empty() {
        output.push('\n');
    }

    // Metrics
    output.push_str("## Speech Metrics\n\n");
    output.push_str(&format!(
        "**Words:** {} ({} unique) | **Duration:** {} | **Pace:** {:.2} wpm\n",
        metrics.total_words,
        metrics.unique_words,
        format_timestamp(metrics.duration_seconds),
        metrics.speaking_pace_wpm
    ));
    output.push_str(&format!(
        "**Filler words:** {} ({:.2}%)\n\n",
        metrics.filler_count, metrics.filler_percentage
    ));

    output.push_str("## Most Used Words\n\n");
    push_ranked_terms(&mut output, &report.most_used_words);

    output.push_str("## Fillers\n\n");
    push_filler_table(&mut output, "Words", &report.fillers.words);
    push_filler_table(&mut output, "Two-word phrases", &report.fillers.bigrams);
    push_filler_table(&mut output, "Three-word phrases", &report.fillers.trigrams);

    // Sentiment
    let sentiment = &report.sentiment;
    output.push_str("## Sentiment\n\n");
    output.push_str(&format!(
        "**Overall:** {} ({:.2}) | positive {:.2}% | neutral {:.2}% | negative {:.2}%\n\n",
        sentiment.label.name(),
        sentiment.overall_polarity,
        sentiment.positive_pct,
        sentiment.neutral_pct,
        sentiment.negative_pct
    ));
    for s in &sentiment.most_positive {
        output.push_str(&format!("+ [{:.2}] {}\n", s.polarity, s.text));
    }
    for s in &sentiment.most_negative {
        output.push_str(&format!("- [{:.2}] {}\n", s.polarity, s.text));
    }
    if !sentiment.most_positive.is_empty() || !sentiment.most_negative.is_empty() {
        output.push('\n');
    }

    output.push_str("## Focused Topics\n\n");
    push_ranked_terms(&mut output, &report.focused_topics);

    // Ads
    if let Some(videos) = &report.ads {
        output.push_str("## Ad Segments\n\n");
        for video in videos {
            output.push_str(&format!("### {}\n\n", video.source_url));
            if video.spans.is_empty() {
                output.push_str("No ad segments detected.\n\n");
            }
            for span in &video.spans {
                output.push_str(&format!(
                    "[{}–{}] {}\n",
                    format_timestamp(span.start_time),
                    format_timestamp(span.end_time),
                    span.product.as_deref().unwrap_or("Unknown")
                ));
                output.push_str(&format!("> {}\n\n", span.text));
            }
        }
    }

    if let Some(quality) = &report.sponsorship {
        output.push_str("## Sponsorship Quality\n\n");
        output.push_str(&format!(
            "**Overall:** {}/10 | disclosure {}/10 | relevance {}/10 | intrusiveness {}/10\n\n",
            quality.overall, quality.disclosure_clarity, quality.relevance, quality.intrusiveness
        ));
        if !quality.notes.is_empty() {
            output.push_str(&format!("{}\n\n", quality.notes));
        }
    }

    if let Some(suggestions) = &report.suggestions {
        output.push_str("## Suggestions\n\n");
        for suggestion in suggestions {
            output.push_str(&format!("• {}\n", suggestion));
        }
        output.push('\n');
    }

    output
}

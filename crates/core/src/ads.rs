//! Advertisement segment detection.
//!
//! A single left-to-right pass over timestamped sentences with two states, outside and inside
//! an ad. A sentence triggers when it contains at least one strong keyword, or at least two
//! keywords counting weak ones. Opening a span pulls in a short lead-in of preceding sentences;
//! the first quiet sentence closes it and is left out, then the scan continues past it until
//! enough quiet sentences have been seen.

use tracing::debug;

use crate::{
    config::AdDetectorConfig,
    types::{AdSpan, TranscriptSegment},
};

/// Keyword hits of one sentence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SentenceSignal {
    pub strong: usize,
    pub weak: usize,
}

impl SentenceSignal {
    pub fn is_trigger(&self) -> bool {
        self.strong >= 1 || self.strong + self.weak >= 2
    }
}

/// Lowercased keyword lists. Blank keywords are dropped since they would match every sentence.
#[derive(Debug, Clone)]
pub struct AdLexicon {
    strong: Vec<String>,
    weak: Vec<String>,
}

impl AdLexicon {
    pub fn new<'a>(
        strong: impl IntoIterator<Item = &'a str>,
        weak: impl IntoIterator<Item = &'a str>,
    ) -> Self {
        fn prepare<'a>(words: impl IntoIterator<Item = &'a str>) -> Vec<String> {
            words
                .into_iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect()
        }

        Self {
            strong: prepare(strong),
            weak: prepare(weak),
        }
    }

    pub fn from_config(config: &AdDetectorConfig) -> Self {
        Self::new(
            config.ad_keywords.iter().map(String::as_str),
            config.weak_keywords.iter().map(String::as_str),
        )
    }

    /// Number of distinct keywords of each kind occurring anywhere in the sentence.
    pub fn score(&self, sentence: &str) -> SentenceSignal {
        let lower = sentence.to_lowercase();
        SentenceSignal {
            strong: self.strong.iter().filter(|k| lower.contains(k.as_str())).count(),
            weak: self.weak.iter().filter(|k| lower.contains(k.as_str())).count(),
        }
    }
}

impl Default for AdLexicon {
    fn default() -> Self {
        Self::from_config(&AdDetectorConfig::default())
    }
}

struct OpenSpan<'a> {
    start_time: f64,
    texts: Vec<&'a str>,
}

impl OpenSpan<'_> {
    fn close(self, end_time: f64) -> AdSpan {
        AdSpan {
            start_time: self.start_time,
            end_time: end_time.max(self.start_time),
            text: self
                .texts
                .iter()
                .map(|t| t.trim())
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" "),
            product: None,
        }
    }
}

fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Detect ad spans over `(start_time, text)` sentences in chronological order.
///
/// Spans come out in start order and never overlap in time. When a new span opens inside the
/// lookahead window of the previous one, the shared sentences appear in both texts and the new
/// span's start is clamped to the previous end. A span still open when the input ends is only
/// reported with `flush_trailing_span`.
pub fn detect_ad_spans(sentences: &[(f64, &str)], config: &AdDetectorConfig) -> Vec<AdSpan> {
    let lexicon = AdLexicon::from_config(config);
    let triggers: Vec<bool> = sentences
        .iter()
        .map(|(_, text)| lexicon.score(text).is_trigger())
        .collect();

    let Some(last_index) = sentences.len().checked_sub(1) else {
        return Vec::new();
    };

    let mut spans: Vec<AdSpan> = Vec::new();
    let mut open: Option<OpenSpan<'_>> = None;
    // Lead-in never reaches back past the sentence that closed the previous span.
    let mut backtrack_floor = 0;

    for i in 0..sentences.len() {
        if triggers[i] {
            let span = open.get_or_insert_with(|| {
                let mut first = i;
                let mut examined = 0;
                while examined < config.backtrack_sentences && first > backtrack_floor {
                    let candidate = first - 1;
                    if word_count(sentences[candidate].1) >= config.backtrack_max_words {
                        break;
                    }
                    first = candidate;
                    examined += 1;
                }

                let previous_end = spans.last().map(|s| s.end_time).unwrap_or(f64::MIN);
                debug!(
                    trigger = i,
                    lead_in = i - first,
                    "ad span opened at {:.1}s",
                    sentences[first].0
                );
                OpenSpan {
                    start_time: sentences[first].0.max(previous_end),
                    texts: sentences[first..i].iter().map(|(_, t)| *t).collect(),
                }
            });
            span.texts.push(sentences[i].1);
            continue;
        }

        let Some(mut span) = open.take() else {
            continue;
        };

        // Sentence `i` closes the span and stays out of its text.
        let mut cursor = i + 1;
        let mut quiet = 0;
        while cursor < sentences.len() && quiet < config.lookahead_non_ad {
            span.texts.push(sentences[cursor].1);
            if triggers[cursor] {
                quiet = 0;
            } else {
                quiet += 1;
            }
            cursor += 1;
        }

        let end_time = sentences[cursor.min(last_index)].0;
        debug!(closed_by = i, lookahead_end = cursor, "ad span closed at {:.1}s", end_time);
        spans.push(span.close(end_time));
        backtrack_floor = i + 1;
    }

    if let Some(span) = open {
        if config.flush_trailing_span {
            spans.push(span.close(sentences[last_index].0));
        } else {
            debug!("ad span still open at end of transcript, not reported");
        }
    }

    spans
}

/// Convenience wrapper over caption segments.
pub fn detect_ad_spans_in_segments(
    segments: &[TranscriptSegment],
    config: &AdDetectorConfig,
) -> Vec<AdSpan> {
    let sentences: Vec<(f64, &str)> = segments
        .iter()
        .map(|s| (s.start, s.text.as_str()))
        .collect();
    detect_ad_spans(&sentences, config)
}

//! Aggregation of detector outputs into an `AnalysisReport`.

use std::collections::HashSet;

use tracing::{debug, info};

use crate::{
    config::AnalysisConfig,
    counter::OrderedCounter,
    filler::{FillerLexicon, detect_fillers, total_filler_count},
    nlp::{Document, NlpEngine, PartOfSpeech, SentimentScorer},
    normalize::normalize_transcript,
    source::FetchBatch,
    types::{
        AnalysisReport, RankedTerm, ScoredSentence, SentimentBreakdown, SentimentLabel,
        SpeechMetrics,
    },
};

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn ranked_terms(counter: OrderedCounter<String>, top_n: usize) -> Vec<RankedTerm> {
    counter
        .most_common(top_n)
        .into_iter()
        .map(|(term, count)| RankedTerm { term, count })
        .collect()
}

/// Content words (nouns, verbs, adjectives, adverbs) that are neither stop words nor
/// lemmas of the excluded common verbs.
pub fn most_used_words(
    doc: &Document,
    common_verbs: &HashSet<String>,
    top_n: usize,
) -> Vec<RankedTerm> {
    let counter: OrderedCounter<String> = doc
        .tokens
        .iter()
        .filter(|t| t.is_alpha && !t.is_stop)
        .filter(|t| {
            matches!(
                t.pos,
                PartOfSpeech::Noun
                    | PartOfSpeech::Verb
                    | PartOfSpeech::Adjective
                    | PartOfSpeech::Adverb
            )
        })
        .filter(|t| !common_verbs.contains(&t.lemma))
        .map(|t| t.text.clone())
        .collect();
    ranked_terms(counter, top_n)
}

pub fn filler_percentage(filler_count: usize, total_words: usize) -> f64 {
    if total_words == 0 {
        return 0.0;
    }
    round2(100.0 * filler_count as f64 / total_words as f64)
}

pub fn speaking_pace_wpm(total_words: usize, duration_seconds: f64) -> f64 {
    if duration_seconds <= 0.0 {
        return 0.0;
    }
    round2(total_words as f64 / (duration_seconds / 60.0))
}

/// Word counts, filler share and pace of a normalized word sequence.
pub fn speech_metrics(
    words: &[String],
    lexicon: &FillerLexicon,
    duration_seconds: f64,
) -> SpeechMetrics {
    let total_words = words
        .iter()
        .filter(|w| w.chars().all(char::is_alphabetic))
        .count();
    let unique_words = words.iter().collect::<HashSet<_>>().len();
    let filler_count = total_filler_count(words, lexicon);

    SpeechMetrics {
        total_words,
        unique_words,
        filler_count,
        filler_percentage: filler_percentage(filler_count, total_words),
        duration_seconds,
        speaking_pace_wpm: speaking_pace_wpm(total_words, duration_seconds),
    }
}

pub fn score_sentences(sentences: &[String], scorer: &dyn SentimentScorer) -> Vec<ScoredSentence> {
    sentences
        .iter()
        .map(|s| ScoredSentence {
            text: s.clone(),
            polarity: scorer.polarity(s),
        })
        .collect()
}

/// The `n` most negative and `n` most positive sentences, polarity rounded to 2 decimals.
pub fn sentiment_extremes(
    scores: &[ScoredSentence],
    n: usize,
) -> (Vec<ScoredSentence>, Vec<ScoredSentence>) {
    let mut sorted: Vec<&ScoredSentence> = scores.iter().collect();
    sorted.sort_by(|a, b| a.polarity.total_cmp(&b.polarity));

    let rounded = |s: &&ScoredSentence| ScoredSentence {
        text: s.text.clone(),
        polarity: round2(s.polarity),
    };
    let most_negative = sorted.iter().take(n).map(rounded).collect();
    let most_positive = sorted.iter().rev().take(n).map(rounded).collect();
    (most_positive, most_negative)
}

/// Positive/neutral/negative share of sentences plus the mean-polarity label.
pub fn sentiment_breakdown(scores: &[ScoredSentence]) -> SentimentBreakdown {
    let total = scores.len();
    if total == 0 {
        return SentimentBreakdown::default();
    }

    let share = |pred: fn(f64) -> bool| {
        let n = scores.iter().filter(|s| pred(s.polarity)).count();
        round2(100.0 * n as f64 / total as f64)
    };
    let overall = scores.iter().map(|s| s.polarity).sum::<f64>() / total as f64;
    let (most_positive, most_negative) = sentiment_extremes(scores, 2);

    SentimentBreakdown {
        positive_pct: share(|p| p > 0.0),
        neutral_pct: share(|p| p == 0.0),
        negative_pct: share(|p| p < 0.0),
        overall_polarity: overall,
        label: SentimentLabel::from_polarity(overall),
        most_positive,
        most_negative,
    }
}

/// Named entities of topical kinds plus multi-word noun phrases free of stop words and
/// pronouns, merged and ranked by frequency.
pub fn focused_topics(doc: &Document, top_n: usize) -> Vec<RankedTerm> {
    let entities = doc
        .entities
        .iter()
        .filter(|e| e.label.is_topical())
        .map(|e| e.text.to_lowercase());

    let phrases = doc.noun_chunks.iter().filter_map(|chunk| {
        let tokens = doc.chunk_tokens(*chunk);
        if tokens.len() < 2
            || tokens
                .iter()
                .any(|t| t.is_stop || t.pos == PartOfSpeech::Pronoun)
        {
            return None;
        }
        Some(
            tokens
                .iter()
                .map(|t| t.text.to_lowercase())
                .collect::<Vec<_>>()
                .join(" "),
        )
    });

    ranked_terms(entities.chain(phrases).collect(), top_n)
}

/// Runs every speech-analysis step over a fetched batch. Holds the injected collaborators.
pub struct Analyzer<'a> {
    nlp: &'a dyn NlpEngine,
    sentiment: &'a dyn SentimentScorer,
    config: &'a AnalysisConfig,
}

impl<'a> Analyzer<'a> {
    pub fn new(
        nlp: &'a dyn NlpEngine,
        sentiment: &'a dyn SentimentScorer,
        config: &'a AnalysisConfig,
    ) -> Self {
        Self {
            nlp,
            sentiment,
            config,
        }
    }

    pub fn analyze(&self, batch: &FetchBatch) -> AnalysisReport {
        let lexicon = self.config.filler_lexicon();
        let common_verbs: HashSet<String> = self
            .config
            .common_verbs
            .iter()
            .map(|v| v.to_lowercase())
            .collect();

        let segments: Vec<_> = batch
            .transcripts
            .iter()
            .flat_map(|t| t.segments.iter().cloned())
            .collect();
        let duration_seconds: f64 = batch.transcripts.iter().map(|t| t.duration_seconds()).sum();

        let words = normalize_transcript(&segments);
        let cleaned = words.join(" ");
        debug!(words = words.len(), "normalized batch");

        let metrics = speech_metrics(&words, &lexicon, duration_seconds);
        let fillers = detect_fillers(&words, &lexicon, self.config.top_n);

        let content_doc = self.nlp.analyze(&cleaned);
        let most_used_words = most_used_words(&content_doc, &common_verbs, self.config.top_n);
        let focused_topics = focused_topics(&content_doc, self.config.topic_top_n);

        // Sentence boundaries need the punctuation that normalization strips.
        let raw_text = batch
            .transcripts
            .iter()
            .map(|t| t.text())
            .collect::<Vec<_>>()
            .join("\n");
        let sentence_doc = self.nlp.analyze(&raw_text);
        let scores = score_sentences(&sentence_doc.sentences, self.sentiment);
        let sentiment = sentiment_breakdown(&scores);

        info!(
            transcripts = batch.transcripts.len(),
            total_words = metrics.total_words,
            filler_pct = metrics.filler_percentage,
            "speech analysis complete"
        );

        AnalysisReport {
            sources: batch
                .transcripts
                .iter()
                .map(|t| t.source_url.clone())
                .collect(),
            invalid_sources: batch.invalid.clone(),
            metrics,
            most_used_words,
            fillers,
            sentiment,
            focused_topics,
            ads: None,
            sponsorship: None,
            suggestions: None,
        }
    }
}

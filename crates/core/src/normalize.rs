//! Transcript normalization.
//!
//! Lowercases, expands contractions, strips everything that is not alphanumeric or
//! whitespace, and splits on whitespace. Every step is total: empty input gives empty output.

use std::{collections::HashMap, sync::LazyLock};

use crate::types::{NormalizedSegment, TranscriptSegment};

const CONTRACTION_TABLE: &[(&str, &str)] = &[
    ("ain't", "are not"),
    ("aren't", "are not"),
    ("can't", "cannot"),
    ("could've", "could have"),
    ("couldn't", "could not"),
    ("didn't", "did not"),
    ("doesn't", "does not"),
    ("don't", "do not"),
    ("gonna", "going to"),
    ("gotta", "got to"),
    ("hadn't", "had not"),
    ("hasn't", "has not"),
    ("haven't", "have not"),
    ("he'd", "he would"),
    ("he'll", "he will"),
    ("he's", "he is"),
    ("here's", "here is"),
    ("how's", "how is"),
    ("i'd", "i would"),
    ("i'll", "i will"),
    ("i'm", "i am"),
    ("i've", "i have"),
    ("isn't", "is not"),
    ("it'd", "it would"),
    ("it'll", "it will"),
    ("it's", "it is"),
    ("let's", "let us"),
    ("might've", "might have"),
    ("mustn't", "must not"),
    ("shan't", "shall not"),
    ("she'd", "she would"),
    ("she'll", "she will"),
    ("she's", "she is"),
    ("should've", "should have"),
    ("shouldn't", "should not"),
    ("that'll", "that will"),
    ("that's", "that is"),
    ("there's", "there is"),
    ("they'd", "they would"),
    ("they'll", "they will"),
    ("they're", "they are"),
    ("they've", "they have"),
    ("wanna", "want to"),
    ("wasn't", "was not"),
    ("we'd", "we would"),
    ("we'll", "we will"),
    ("we're", "we are"),
    ("we've", "we have"),
    ("weren't", "were not"),
    ("what's", "what is"),
    ("where's", "where is"),
    ("who's", "who is"),
    ("won't", "will not"),
    ("would've", "would have"),
    ("wouldn't", "would not"),
    ("y'all", "you all"),
    ("you'd", "you would"),
    ("you'll", "you will"),
    ("you're", "you are"),
    ("you've", "you have"),
];

static CONTRACTIONS: LazyLock<HashMap<&'static str, &'static str>> =
    LazyLock::new(|| CONTRACTION_TABLE.iter().copied().collect());

fn fold_apostrophes(text: &str) -> String {
    text.chars()
        .map(|c| match c {
            '\u{2019}' | '\u{2018}' | '\u{02BC}' | '`' => '\'',
            other => other,
        })
        .collect()
}

/// Expand known contractions word by word. Unknown contractions pass through unchanged.
pub fn expand_contractions(text: &str) -> String {
    let folded = fold_apostrophes(text);
    folded
        .split_whitespace()
        .map(|token| {
            let core = token.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'');
            let key = core.to_lowercase();
            match CONTRACTIONS.get(key.as_str()) {
                Some(expansion) if !core.is_empty() => token.replacen(core, expansion, 1),
                _ => token.to_string(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Lowercase, expand contractions and drop punctuation, keeping the text as one string.
pub fn clean_text(text: &str) -> String {
    let lowered = text.to_lowercase();
    let expanded = expand_contractions(&lowered);
    let stripped: String = expanded
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    stripped.trim().to_string()
}

/// Canonical word sequence of a raw text.
pub fn normalize_text(text: &str) -> Vec<String> {
    clean_text(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}

/// Normalize each segment on its own so segment boundaries and timing survive.
pub fn normalize_segments(segments: &[TranscriptSegment]) -> Vec<NormalizedSegment> {
    segments
        .iter()
        .map(|seg| NormalizedSegment {
            start: seg.start,
            duration: seg.duration,
            words: normalize_text(&seg.text),
        })
        .collect()
}

/// Flattened word sequence over a list of segments.
pub fn normalize_transcript(segments: &[TranscriptSegment]) -> Vec<String> {
    segments
        .iter()
        .flat_map(|seg| normalize_text(&seg.text))
        .collect()
}

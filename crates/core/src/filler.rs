//! Filler word and filler phrase detection over a normalized word sequence.

use std::collections::HashSet;

use crate::{
    counter::OrderedCounter,
    types::{FillerMatch, FillerTables},
};

/// Fixed set of words treated as filler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FillerLexicon {
    words: HashSet<String>,
}

impl FillerLexicon {
    pub fn new<'a>(words: impl IntoIterator<Item = &'a str>) -> Self {
        Self {
            words: words
                .into_iter()
                .map(|w| w.trim().to_lowercase())
                .filter(|w| !w.is_empty())
                .collect(),
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.words.contains(word)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

impl Default for FillerLexicon {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_FILLER_WORDS.iter().copied())
    }
}

fn ranked(counter: OrderedCounter<Vec<String>>, top_n: usize) -> Vec<FillerMatch> {
    counter
        .most_common(top_n)
        .into_iter()
        .map(|(phrase, count)| FillerMatch { phrase, count })
        .collect()
}

/// Single filler words: a word counts only when it is itself in the lexicon.
pub fn count_filler_words(
    words: &[String],
    lexicon: &FillerLexicon,
    top_n: usize,
) -> Vec<FillerMatch> {
    let counter: OrderedCounter<Vec<String>> = words
        .iter()
        .filter(|w| lexicon.contains(w))
        .map(|w| vec![w.clone()])
        .collect();
    ranked(counter, top_n)
}

/// Every window of `k` consecutive words that contains at least one filler word.
/// Windows overlap and are counted independently.
pub fn count_filler_phrases(
    words: &[String],
    lexicon: &FillerLexicon,
    k: usize,
    top_n: usize,
) -> Vec<FillerMatch> {
    if k == 0 {
        return Vec::new();
    }
    let counter: OrderedCounter<Vec<String>> = words
        .windows(k)
        .filter(|window| window.iter().any(|w| lexicon.contains(w)))
        .map(<[String]>::to_vec)
        .collect();
    ranked(counter, top_n)
}

/// Ranked single-word, bigram and trigram filler tables.
pub fn detect_fillers(words: &[String], lexicon: &FillerLexicon, top_n: usize) -> FillerTables {
    FillerTables {
        words: count_filler_words(words, lexicon, top_n),
        bigrams: count_filler_phrases(words, lexicon, 2, top_n),
        trigrams: count_filler_phrases(words, lexicon, 3, top_n),
    }
}

/// Uncapped number of filler word occurrences.
pub fn total_filler_count(words: &[String], lexicon: &FillerLexicon) -> usize {
    words.iter().filter(|w| lexicon.contains(w)).count()
}

//! Language-analysis collaborators.
//!
//! `NlpEngine` tokenizes, tags and chunks text; `SentimentScorer` scores one sentence. Both are
//! constructed once by the caller and passed by reference to whatever needs them. The built-in
//! implementations are small rule-based stand-ins that keep the tool usable offline.

use std::{collections::HashSet, sync::LazyLock};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartOfSpeech {
    Noun,
    ProperNoun,
    Verb,
    Adjective,
    Adverb,
    Pronoun,
    Determiner,
    Interjection,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityLabel {
    Person,
    Org,
    Gpe,
    Product,
    Event,
    WorkOfArt,
    Other,
}

impl EntityLabel {
    /// Entity kinds that count as a topic of the talk.
    pub fn is_topical(&self) -> bool {
        !matches!(self, EntityLabel::Other)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub lemma: String,
    pub pos: PartOfSpeech,
    pub is_stop: bool,
    pub is_alpha: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub text: String,
    pub label: EntityLabel,
}

/// Tokens of a noun phrase, as a half-open range into `Document::tokens`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub tokens: Vec<Token>,
    pub sentences: Vec<String>,
    pub entities: Vec<Entity>,
    pub noun_chunks: Vec<Chunk>,
}

impl Document {
    pub fn chunk_tokens(&self, chunk: Chunk) -> &[Token] {
        let end = chunk.end.min(self.tokens.len());
        &self.tokens[chunk.start.min(end)..end]
    }
}

pub trait NlpEngine: Send + Sync {
    fn analyze(&self, text: &str) -> Document;
}

pub trait SentimentScorer: Send + Sync {
    /// Polarity in `[-1.0, 1.0]`; 0 means neutral.
    fn polarity(&self, sentence: &str) -> f64;
}

const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "almost", "also", "am", "an", "and",
    "any", "are", "as", "at", "be", "because", "been", "before", "being", "below", "between",
    "both", "but", "by", "can", "cannot", "could", "did", "do", "does", "doing", "done", "down",
    "during", "each", "either", "else", "even", "ever", "every", "few", "for", "from", "further",
    "get", "go", "had", "has", "have", "having", "he", "her", "here", "hers", "herself", "him",
    "himself", "his", "how", "however", "i", "if", "in", "into", "is", "it", "its", "itself",
    "just", "least", "less", "made", "make", "many", "may", "me", "might", "more", "most", "much",
    "must", "my", "myself", "neither", "never", "no", "nor", "not", "now", "of", "off", "often",
    "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out", "over", "own", "per",
    "please", "put", "quite", "rather", "re", "really", "said", "same", "say", "see", "seem",
    "several", "she", "should", "show", "since", "so", "some", "still", "such", "take", "than",
    "that", "the", "their", "theirs", "them", "themselves", "then", "there", "these", "they",
    "this", "those", "though", "through", "thus", "to", "too", "under", "until", "up", "upon",
    "us", "used", "using", "very", "via", "was", "we", "well", "were", "what", "whatever", "when",
    "where", "whether", "which", "while", "who", "whole", "whom", "whose", "why", "will", "with",
    "within", "without", "would", "yet", "you", "your", "yours", "yourself", "yourselves",
];

const PRONOUNS: &[&str] = &[
    "i", "me", "my", "mine", "myself", "you", "your", "yours", "yourself", "yourselves", "he",
    "him", "his", "himself", "she", "her", "hers", "herself", "it", "its", "itself", "we", "us",
    "our", "ours", "ourselves", "they", "them", "their", "theirs", "themselves", "this", "that",
    "these", "those", "who", "whom", "whose", "what", "which", "something", "anything",
    "everything", "nothing", "someone", "anyone", "everyone", "somebody", "anybody", "everybody",
];

const DETERMINERS: &[&str] = &[
    "a", "an", "the", "each", "every", "some", "any", "no", "all", "both", "either", "neither",
    "another", "such",
];

const KNOWN_VERBS: &[&str] = &[
    "be", "is", "are", "was", "were", "am", "been", "have", "has", "had", "do", "does", "did",
    "get", "got", "gets", "make", "makes", "made", "go", "goes", "went", "gone", "say", "says",
    "said", "know", "knows", "knew", "known", "think", "thinks", "thought", "see", "sees", "saw",
    "seen", "take", "takes", "took", "taken", "come", "came", "give", "gave", "find", "found",
    "tell", "told", "feel", "felt", "try", "tried", "leave", "left", "call", "keep", "kept", "let",
    "begin", "began", "seem", "help", "talk", "turn", "start", "show", "hear", "heard", "play",
    "run", "ran", "move", "like", "live", "believe", "bring", "brought", "happen", "write",
    "wrote", "sit", "sat", "stand", "stood", "lose", "lost", "pay", "paid", "meet", "met",
    "include", "continue", "set", "learn", "change", "lead", "led", "understand", "understood",
    "watch", "follow", "stop", "create", "speak", "spoke", "read", "spend", "spent", "grow",
    "grew", "open", "walk", "win", "won", "offer", "remember", "love", "consider", "appear",
    "buy", "bought", "wait", "serve", "die", "send", "sent", "expect", "build", "built", "stay",
    "fall", "fell", "cut", "reach", "kill", "remain", "want", "need", "use", "work", "look",
    "ask", "mean", "meant", "put", "can", "could", "will", "would", "should", "may", "might",
    "must", "shall",
];

const INTERJECTIONS: &[&str] = &[
    "um", "uh", "er", "ah", "oh", "eh", "hmm", "hm", "mhm", "uhm", "wow", "hey", "okay", "ok",
    "yeah", "yes", "yep", "nope", "oops", "huh",
];

const ADJECTIVE_SUFFIXES: &[&str] = &[
    "ous", "ful", "ive", "able", "ible", "al", "ic", "less", "ish", "ary", "est",
];

static STOP_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());
static PRONOUN_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| PRONOUNS.iter().copied().collect());
static DETERMINER_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| DETERMINERS.iter().copied().collect());
static INTERJECTION_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| INTERJECTIONS.iter().copied().collect());
static VERB_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| KNOWN_VERBS.iter().copied().collect());

/// Suffix-stripping lemmatizer good enough to group inflections of common words.
pub fn lemmatize(word: &str) -> String {
    let irregular = match word {
        "is" | "are" | "was" | "were" | "am" | "been" | "being" => Some("be"),
        "has" | "had" | "having" => Some("have"),
        "does" | "did" | "done" | "doing" => Some("do"),
        "got" | "gets" | "getting" | "gotten" => Some("get"),
        "made" | "makes" | "making" => Some("make"),
        "went" | "goes" | "gone" | "going" => Some("go"),
        "said" | "says" | "saying" => Some("say"),
        "knew" | "knows" | "known" | "knowing" => Some("know"),
        "thought" | "thinks" | "thinking" => Some("think"),
        "saw" | "sees" | "seen" | "seeing" => Some("see"),
        "took" | "takes" | "taken" | "taking" => Some("take"),
        _ => None,
    };
    if let Some(lemma) = irregular {
        return lemma.to_string();
    }

    let len = word.chars().count();
    if len > 4 && word.ends_with("ies") {
        return format!("{}y", &word[..word.len() - 3]);
    }
    if len > 5 && word.ends_with("ing") {
        return word[..word.len() - 3].to_string();
    }
    if len > 4 && word.ends_with("ed") {
        return word[..word.len() - 2].to_string();
    }
    if len > 3 && word.ends_with('s') && !word.ends_with("ss") && !word.ends_with("us") {
        return word[..word.len() - 1].to_string();
    }
    word.to_string()
}

fn guess_pos(word: &str, capitalized: bool, sentence_start: bool) -> PartOfSpeech {
    if INTERJECTION_SET.contains(word) {
        return PartOfSpeech::Interjection;
    }
    if PRONOUN_SET.contains(word) {
        return PartOfSpeech::Pronoun;
    }
    if DETERMINER_SET.contains(word) {
        return PartOfSpeech::Determiner;
    }
    if STOP_SET.contains(word) && !VERB_SET.contains(word) {
        return PartOfSpeech::Other;
    }
    if VERB_SET.contains(word) {
        return PartOfSpeech::Verb;
    }
    if capitalized && !sentence_start {
        return PartOfSpeech::ProperNoun;
    }
    if word.len() > 4 && word.ends_with("ly") {
        return PartOfSpeech::Adverb;
    }
    if word.len() > 5 && (word.ends_with("ing") || word.ends_with("ed") || word.ends_with("ize"))
    {
        return PartOfSpeech::Verb;
    }
    if word.len() > 4 && ADJECTIVE_SUFFIXES.iter().any(|s| word.ends_with(s)) {
        return PartOfSpeech::Adjective;
    }
    if word.chars().all(|c| c.is_alphabetic()) {
        PartOfSpeech::Noun
    } else {
        PartOfSpeech::Other
    }
}

fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    for c in text.chars() {
        current.push(c);
        if matches!(c, '.' | '!' | '?' | '\n') {
            let trimmed = current.trim();
            if trimmed.chars().any(char::is_alphanumeric) {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }
    let trimmed = current.trim();
    if trimmed.chars().any(char::is_alphanumeric) {
        sentences.push(trimmed.to_string());
    }
    sentences
}

/// Heuristic engine: stop-word list, suffix-based tagging and adjective/noun chunking.
/// It does not recognize named entities.
#[derive(Debug, Clone, Default)]
pub struct RuleBasedNlp;

impl RuleBasedNlp {
    pub fn new() -> Self {
        Self
    }
}

impl NlpEngine for RuleBasedNlp {
    fn analyze(&self, text: &str) -> Document {
        let sentences = split_sentences(text);
        let mut tokens = Vec::new();

        for sentence in &sentences {
            for (position, raw) in sentence.split_whitespace().enumerate() {
                let trimmed = raw.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'');
                if trimmed.is_empty() {
                    continue;
                }
                let capitalized = trimmed.chars().next().is_some_and(char::is_uppercase);
                let lower = trimmed.to_lowercase();
                let pos = guess_pos(&lower, capitalized, position == 0);
                tokens.push(Token {
                    lemma: lemmatize(&lower),
                    is_stop: STOP_SET.contains(lower.as_str()),
                    is_alpha: lower.chars().all(char::is_alphabetic),
                    text: lower,
                    pos,
                });
            }
        }

        let noun_chunks = chunk_noun_phrases(&tokens);
        Document {
            tokens,
            sentences,
            entities: Vec::new(),
            noun_chunks,
        }
    }
}

/// Maximal runs of adjectives and nouns that end in a noun.
fn chunk_noun_phrases(tokens: &[Token]) -> Vec<Chunk> {
    let is_nominal = |t: &Token| {
        matches!(
            t.pos,
            PartOfSpeech::Noun | PartOfSpeech::ProperNoun | PartOfSpeech::Adjective
        )
    };
    let is_head = |t: &Token| matches!(t.pos, PartOfSpeech::Noun | PartOfSpeech::ProperNoun);

    let mut chunks = Vec::new();
    let mut i = 0;
    while i < tokens.len() {
        if !is_nominal(&tokens[i]) {
            i += 1;
            continue;
        }
        let start = i;
        while i < tokens.len() && is_nominal(&tokens[i]) {
            i += 1;
        }
        let mut end = i;
        while end > start && !is_head(&tokens[end - 1]) {
            end -= 1;
        }
        if end > start {
            chunks.push(Chunk { start, end });
        }
    }
    chunks
}

const POSITIVE_WORDS: &[(&str, f64)] = &[
    ("good", 0.7), ("great", 0.8), ("excellent", 1.0), ("amazing", 0.6), ("awesome", 1.0),
    ("love", 0.5), ("loved", 0.7), ("best", 1.0), ("better", 0.5), ("nice", 0.6),
    ("happy", 0.8), ("fantastic", 0.4), ("wonderful", 1.0), ("perfect", 1.0), ("cool", 0.35),
    ("fun", 0.3), ("interesting", 0.5), ("beautiful", 0.85), ("easy", 0.43), ("helpful", 0.6),
    ("useful", 0.3), ("incredible", 0.9), ("glad", 0.5), ("enjoy", 0.4), ("fast", 0.2),
    ("powerful", 0.3), ("impressive", 1.0), ("favorite", 0.5), ("recommend", 0.4), ("win", 0.8),
];

const NEGATIVE_WORDS: &[(&str, f64)] = &[
    ("bad", -0.7), ("terrible", -1.0), ("awful", -1.0), ("worst", -1.0), ("worse", -0.4),
    ("hate", -0.8), ("poor", -0.4), ("sad", -0.5), ("wrong", -0.5), ("difficult", -0.5),
    ("hard", -0.29), ("boring", -1.0), ("slow", -0.3), ("broken", -0.4), ("problem", -0.3),
    ("annoying", -0.8), ("horrible", -1.0), ("disappointing", -0.6), ("ugly", -0.7),
    ("expensive", -0.5), ("fail", -0.5), ("failed", -0.5), ("stupid", -0.8), ("angry", -0.5),
    ("painful", -0.7), ("confusing", -0.5), ("weird", -0.5), ("crazy", -0.6), ("scary", -0.5),
    ("lose", -0.4),
];

const NEGATIONS: &[&str] = &["not", "never", "no", "cannot", "nothing", "hardly"];

/// Mean polarity of the sentiment-bearing words of a sentence. A negation flips and damps
/// the next scored word.
#[derive(Debug, Clone, Default)]
pub struct LexiconSentiment;

impl LexiconSentiment {
    pub fn new() -> Self {
        Self
    }

    fn word_polarity(word: &str) -> Option<f64> {
        POSITIVE_WORDS
            .iter()
            .chain(NEGATIVE_WORDS)
            .find(|(w, _)| *w == word)
            .map(|(_, p)| *p)
    }
}

impl SentimentScorer for LexiconSentiment {
    fn polarity(&self, sentence: &str) -> f64 {
        let mut scores = Vec::new();
        let mut negate = false;

        for raw in sentence.split_whitespace() {
            let word: String = raw
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            if NEGATIONS.contains(&word.as_str()) || raw.to_lowercase().ends_with("n't") {
                negate = true;
                continue;
            }
            if let Some(p) = Self::word_polarity(&word) {
                scores.push(if negate { -0.5 * p } else { p });
                negate = false;
            }
        }

        if scores.is_empty() {
            return 0.0;
        }
        let mean = scores.iter().sum::<f64>() / scores.len() as f64;
        mean.clamp(-1.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_sentences_and_tags_tokens() {
        let doc = RuleBasedNlp::new().analyze("The new GPU is really fast. We tested it quickly!");
        assert_eq!(doc.sentences.len(), 2);
        let gpu = doc.tokens.iter().find(|t| t.text == "gpu").unwrap();
        assert_eq!(gpu.pos, PartOfSpeech::ProperNoun);
        let the = doc.tokens.iter().find(|t| t.text == "the").unwrap();
        assert!(the.is_stop);
        let quickly = doc.tokens.iter().find(|t| t.text == "quickly").unwrap();
        assert_eq!(quickly.pos, PartOfSpeech::Adverb);
        assert!(doc.entities.is_empty());
    }

    #[test]
    fn chunks_end_in_a_noun() {
        let doc = RuleBasedNlp::new().analyze("we bought a powerful graphics card yesterday");
        let phrases: Vec<String> = doc
            .noun_chunks
            .iter()
            .map(|c| {
                doc.chunk_tokens(*c)
                    .iter()
                    .map(|t| t.text.as_str())
                    .collect::<Vec<_>>()
                    .join(" ")
            })
            .collect();
        assert!(phrases.contains(&"powerful graphics card yesterday".to_string()));
    }

    #[test]
    fn lemmatizer_folds_common_inflections() {
        assert_eq!(lemmatize("makes"), "make");
        assert_eq!(lemmatize("thinking"), "think");
        assert_eq!(lemmatize("batteries"), "battery");
        assert_eq!(lemmatize("class"), "class");
    }

    #[test]
    fn sentiment_signs() {
        let scorer = LexiconSentiment::new();
        assert!(scorer.polarity("This laptop is great") > 0.0);
        assert!(scorer.polarity("The battery is terrible.") < 0.0);
        assert_eq!(scorer.polarity("The box is on the table"), 0.0);
        assert!(scorer.polarity("This is not good") < 0.0);
        assert!(scorer.polarity("It isn't bad at all") > 0.0);
    }
}

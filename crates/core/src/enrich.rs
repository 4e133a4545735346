//! LLM enrichment of detected results.
//!
//! Each call goes through the rate limiter and a per-call timeout. Structured replies are parsed
//! as a separate fallible step so a malformed reply is told apart from a transport failure.

use std::sync::{Arc, LazyLock};

use futures::{StreamExt, stream};
use regex::Regex;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::{
    config::EnrichmentConfig,
    error::EnrichmentError,
    format::format_timestamp,
    llm::TextGenerator,
    rate_limit::RateLimiter,
    types::{AdSpan, SponsorshipQuality},
};

pub const UNKNOWN_PRODUCT: &str = "Unknown";
const MAX_SUGGESTIONS: usize = 5;
const MAX_SCORE: u8 = 10;

static NUMBERED_LINE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\d+\.\s.*").expect("numbered line pattern is valid"));

/// Strip a surrounding markdown code fence (```` ``` ```` or ```` ```json ````) if present.
pub fn strip_code_fences(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string (`json`, `JSON`, ...) on the opening fence line.
    let body = match rest.find('\n') {
        Some(newline) => &rest[newline + 1..],
        None => rest,
    };
    body.trim_end()
        .strip_suffix("```")
        .unwrap_or(body)
        .trim()
}

pub fn parse_json_response<T: DeserializeOwned>(text: &str) -> Result<T, EnrichmentError> {
    serde_json::from_str(strip_code_fences(text)).map_err(|e| EnrichmentError::MalformedResponse {
        reason: e.to_string(),
    })
}

/// Cut `text` to at most `max_chars` characters on a char boundary.
fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

fn product_prompt(ad_text: &str) -> String {
    format!(
        "Identify the main product, brand, or sponsor being promoted in the following advertisement text:\n\
         \"{ad_text}\"\n\n\
         Return only the name of the product, brand, or sponsor without additional explanations.\n\
         If no clear product or brand is mentioned, return 'Unknown'."
    )
}

fn sponsorship_prompt(segments: &str) -> String {
    format!(
        r#"You are reviewing the sponsored segments of a set of videos.

Score them from 0 to 10 on each criterion:
- disclosure_clarity: how clearly the sponsorship is disclosed
- relevance: how well the sponsor fits the video content
- intrusiveness: how disruptive the segments are (10 = very intrusive)
- overall: overall quality of the sponsorship

You MUST output ONLY valid JSON matching this exact structure (no markdown, no explanation):
{{"disclosure_clarity": <0-10>, "relevance": <0-10>, "intrusiveness": <0-10>, "overall": <0-10>, "notes": "one or two sentences"}}

Sponsored segments:
{segments}"#
    )
}

fn suggestions_prompt(transcript: &str) -> String {
    format!(
        "Analyze the following speech transcript and provide exactly 5 key suggestions for improvement. \
         Base the suggestions purely on the content, structure, and delivery of the speech. \
         Keep each point clear, concise, and actionable. Number them 1. to 5.\n\n\
         Transcript:\n{transcript}"
    )
}

/// Numbered lines of the reply, at most five; the whole reply when it has none.
pub fn extract_suggestions(reply: &str) -> Vec<String> {
    let numbered: Vec<String> = NUMBERED_LINE
        .find_iter(reply)
        .take(MAX_SUGGESTIONS)
        .map(|m| m.as_str().trim().to_string())
        .collect();
    if !numbered.is_empty() {
        return numbered;
    }
    let whole = reply.trim();
    if whole.is_empty() {
        Vec::new()
    } else {
        vec![whole.to_string()]
    }
}

fn validate_quality(quality: SponsorshipQuality) -> Result<SponsorshipQuality, EnrichmentError> {
    let scores = [
        ("disclosure_clarity", quality.disclosure_clarity),
        ("relevance", quality.relevance),
        ("intrusiveness", quality.intrusiveness),
        ("overall", quality.overall),
    ];
    for (name, score) in scores {
        if score > MAX_SCORE {
            return Err(EnrichmentError::MalformedResponse {
                reason: format!("{} score {} is outside 0..={}", name, score, MAX_SCORE),
            });
        }
    }
    Ok(quality)
}

pub struct Enricher {
    generator: Arc<dyn TextGenerator>,
    config: EnrichmentConfig,
    limiter: RateLimiter,
}

impl Enricher {
    pub fn new(generator: Arc<dyn TextGenerator>, config: EnrichmentConfig) -> Self {
        let limiter = RateLimiter::from_config(&config.rate_limit);
        Self {
            generator,
            config,
            limiter,
        }
    }

    pub fn with_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = limiter;
        self
    }

    async fn call(&self, prompt: &str) -> Result<String, EnrichmentError> {
        self.limiter.acquire().await;
        let timeout = self.config.call_timeout();
        match tokio::time::timeout(timeout, self.generator.generate(prompt, &self.config.generation))
            .await
        {
            Ok(result) => result,
            Err(_) => Err(EnrichmentError::TimedOut {
                seconds: timeout.as_secs(),
            }),
        }
    }

    fn payload<'t>(&self, text: &'t str) -> &'t str {
        truncate_chars(text, self.config.max_prompt_chars)
    }

    /// Product or brand promoted by an ad; `Unknown` when none is named or the call fails.
    pub async fn identify_product(&self, ad_text: &str) -> String {
        match self.call(&product_prompt(self.payload(ad_text))).await {
            Ok(reply) => {
                let name = reply
                    .lines()
                    .map(|l| l.trim().trim_matches(|c| c == '"' || c == '\'' || c == '*'))
                    .find(|l| !l.is_empty())
                    .unwrap_or_default();
                if name.is_empty() {
                    UNKNOWN_PRODUCT.to_string()
                } else {
                    name.to_string()
                }
            }
            Err(e) => {
                warn!("product identification failed: {}", e);
                UNKNOWN_PRODUCT.to_string()
            }
        }
    }

    /// Fill in `product` on every span, at most `max_concurrent_calls` calls in flight.
    pub async fn enrich_spans(&self, spans: Vec<AdSpan>) -> Vec<AdSpan> {
        let limit = self.config.max_concurrent_calls.max(1);
        stream::iter(spans)
            .map(|mut span| async move {
                span.product = Some(self.identify_product(&span.text).await);
                span
            })
            .buffered(limit)
            .collect()
            .await
    }

    /// One scoring call over all spans of a run.
    pub async fn assess_sponsorship(
        &self,
        spans: &[&AdSpan],
    ) -> Result<SponsorshipQuality, EnrichmentError> {
        let segments = spans
            .iter()
            .map(|s| {
                format!(
                    "[{}-{}] {}",
                    format_timestamp(s.start_time),
                    format_timestamp(s.end_time),
                    s.text
                )
            })
            .collect::<Vec<_>>()
            .join("\n");
        let reply = self.call(&sponsorship_prompt(self.payload(&segments))).await?;
        let quality = parse_json_response(&reply)?;
        debug!("sponsorship quality parsed");
        validate_quality(quality)
    }

    pub async fn suggest_improvements(
        &self,
        transcript_text: &str,
    ) -> Result<Vec<String>, EnrichmentError> {
        let reply = self
            .call(&suggestions_prompt(self.payload(transcript_text)))
            .await?;
        let suggestions = extract_suggestions(&reply);
        if suggestions.is_empty() {
            return Err(EnrichmentError::MalformedResponse {
                reason: "empty suggestions reply".to_string(),
            });
        }
        Ok(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;

    use super::*;
    use crate::config::GenerationParams;

    /// Replies from a fixed queue and records prompts.
    struct ScriptedGenerator {
        replies: Mutex<Vec<Result<String, EnrichmentError>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedGenerator {
        fn new(replies: Vec<Result<&str, EnrichmentError>>) -> Arc<Self> {
            let mut replies: Vec<_> = replies
                .into_iter()
                .map(|r| r.map(str::to_string))
                .collect();
            replies.reverse();
            Arc::new(Self {
                replies: Mutex::new(replies),
                prompts: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl TextGenerator for ScriptedGenerator {
        async fn generate(
            &self,
            prompt: &str,
            _params: &GenerationParams,
        ) -> Result<String, EnrichmentError> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Ok(String::new()))
        }
    }

    fn enricher(generator: Arc<ScriptedGenerator>) -> Enricher {
        Enricher::new(generator, EnrichmentConfig::default()).with_limiter(RateLimiter::unlimited())
    }

    #[test]
    fn strips_fences() {
        assert_eq!(strip_code_fences("```json\n{\"a\": 1}\n```"), "{\"a\": 1}");
        assert_eq!(strip_code_fences("```\n[1]\n```\n"), "[1]");
        assert_eq!(strip_code_fences("  {\"a\": 1} "), "{\"a\": 1}");
    }

    #[test]
    fn suggestions_keep_numbered_lines_only() {
        let reply = "Here you go:\n1. Slow down.\n2. Fewer fillers.\nsome text\n3. Pause.\n4. a\n5. b\n6. c";
        let got = extract_suggestions(reply);
        assert_eq!(got.len(), 5);
        assert_eq!(got[0], "1. Slow down.");
        assert_eq!(got[2], "3. Pause.");

        assert_eq!(extract_suggestions("  Just speak slower.  "), vec!["Just speak slower."]);
        assert!(extract_suggestions("   ").is_empty());
    }

    #[test]
    fn truncation_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[tokio::test]
    async fn product_falls_back_to_unknown() {
        let generator = ScriptedGenerator::new(vec![
            Ok("  \"NordVPN\"\n"),
            Ok("   "),
            Err(EnrichmentError::LlmUnavailable {
                reason: "503".to_string(),
            }),
        ]);
        let enricher = enricher(generator.clone());

        assert_eq!(enricher.identify_product("use code nord").await, "NordVPN");
        assert_eq!(enricher.identify_product("something").await, "Unknown");
        assert_eq!(enricher.identify_product("something").await, "Unknown");
        assert!(generator.prompts.lock().unwrap()[0].contains("\"use code nord\""));
    }

    #[tokio::test]
    async fn sponsorship_scores_are_validated() {
        let generator = ScriptedGenerator::new(vec![
            Ok("```json\n{\"disclosure_clarity\": 8, \"relevance\": 6, \"intrusiveness\": 3, \"overall\": 7, \"notes\": \"fine\"}\n```"),
            Ok("{\"disclosure_clarity\": 11, \"relevance\": 6, \"intrusiveness\": 3, \"overall\": 7, \"notes\": \"\"}"),
            Ok("Sure! Here is my assessment."),
        ]);
        let enricher = enricher(generator);
        let span = AdSpan {
            start_time: 0.0,
            end_time: 30.0,
            text: "sponsored by acme".to_string(),
            product: None,
        };

        let quality = enricher.assess_sponsorship(&[&span]).await.unwrap();
        assert_eq!(quality.overall, 7);
        assert_eq!(quality.notes, "fine");

        assert!(matches!(
            enricher.assess_sponsorship(&[&span]).await,
            Err(EnrichmentError::MalformedResponse { .. })
        ));
        assert!(matches!(
            enricher.assess_sponsorship(&[&span]).await,
            Err(EnrichmentError::MalformedResponse { .. })
        ));
    }

    #[tokio::test]
    async fn spans_keep_order_when_enriched() {
        let generator = ScriptedGenerator::new(vec![Ok("Acme"), Ok("Globex")]);
        let enricher = enricher(generator);
        let spans = vec![
            AdSpan {
                start_time: 0.0,
                end_time: 10.0,
                text: "acme".to_string(),
                product: None,
            },
            AdSpan {
                start_time: 20.0,
                end_time: 30.0,
                text: "globex".to_string(),
                product: None,
            },
        ];

        let enriched = enricher.enrich_spans(spans).await;
        assert_eq!(enriched[0].product.as_deref(), Some("Acme"));
        assert_eq!(enriched[1].product.as_deref(), Some("Globex"));
        assert_eq!(enriched[1].start_time, 20.0);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_calls_time_out() {
        struct Stalled;

        #[async_trait]
        impl TextGenerator for Stalled {
            async fn generate(
                &self,
                _prompt: &str,
                _params: &GenerationParams,
            ) -> Result<String, EnrichmentError> {
                tokio::time::sleep(std::time::Duration::from_secs(3600)).await;
                Ok("late".to_string())
            }
        }

        let enricher = Enricher::new(Arc::new(Stalled), EnrichmentConfig::default())
            .with_limiter(RateLimiter::unlimited());
        assert!(matches!(
            enricher.suggest_improvements("talk").await,
            Err(EnrichmentError::TimedOut { seconds: 120 })
        ));
        assert_eq!(enricher.identify_product("ad").await, "Unknown");
    }
}

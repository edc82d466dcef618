//! HTTP client for a CoreNLP-style annotation service.
//!
//! The service takes raw text in the request body and a `properties` JSON
//! object in the query string, and answers with a JSON document of
//! annotated sentences. Only the capabilities the evaluation flows need
//! are modeled: part-of-speech tags, constituency parses and basic
//! dependency arcs.

use std::thread;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use sintagma_core::corpus::conll::{ConllSentence, ConllToken};
use sintagma_core::corpus::TaggedWord;
use tracing::{debug, warn};

/// Attempts per request before giving up.
const RETRY_ATTEMPTS: u32 = 3;

/// Backoff before the first retry; doubles on each subsequent one.
const RETRY_BASE: Duration = Duration::from_millis(500);

/// Connection settings for the annotation service.
#[derive(Debug, Clone)]
pub struct AnnotateConfig {
    /// Service base URL, e.g. `http://localhost:9000`.
    pub endpoint: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// Pipeline language passed to the service, if any.
    pub language: Option<String>,
    /// Annotators to run, in pipeline order.
    pub annotators: Vec<String>,
}

impl AnnotateConfig {
    pub fn new(endpoint: impl Into<String>, timeout_secs: u64) -> Self {
        Self {
            endpoint: endpoint.into(),
            timeout: Duration::from_secs(timeout_secs),
            language: None,
            annotators: Vec::new(),
        }
    }

    pub fn with_language(mut self, language: Option<String>) -> Self {
        self.language = language;
        self
    }

    pub fn with_annotators(mut self, annotators: &[&str]) -> Self {
        self.annotators = annotators.iter().map(|a| a.to_string()).collect();
        self
    }
}

/// One token as returned by the service.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceToken {
    /// 1-based position within the sentence.
    pub index: usize,
    /// Surface form.
    pub word: String,
    /// Part-of-speech tag, present when the `pos` annotator ran.
    pub pos: Option<String>,
    /// Lemma, present when the `lemma` annotator ran.
    pub lemma: Option<String>,
}

/// One basic dependency arc.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceDependency {
    /// Relation label.
    pub dep: String,
    /// 1-based head token index, `0` for the root arc.
    pub governor: usize,
    /// 1-based dependent token index.
    pub dependent: usize,
}

/// One annotated sentence.
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSentence {
    #[serde(default)]
    pub tokens: Vec<ServiceToken>,
    /// Bracketed constituency parse, present when `parse` ran.
    pub parse: Option<String>,
    #[serde(default, rename = "basicDependencies")]
    pub basic_dependencies: Vec<ServiceDependency>,
}

/// Top-level service response.
#[derive(Debug, Clone, Deserialize)]
pub struct AnnotateResponse {
    #[serde(default)]
    pub sentences: Vec<ServiceSentence>,
}

impl ServiceSentence {
    /// The sentence as `(form, tag)` pairs in token order. Tokens the
    /// service left untagged keep a `_` placeholder.
    pub fn to_tagged(&self) -> Vec<TaggedWord> {
        self.tokens
            .iter()
            .map(|token| {
                let tag = token.pos.clone().unwrap_or_else(|| "_".to_string());
                TaggedWord::new(token.word.clone(), tag)
            })
            .collect()
    }

    /// Converts the sentence to a CoNLL row set usable by the dependency
    /// scorer. Tokens without an incoming arc keep `_` placeholders.
    pub fn to_conll(&self) -> ConllSentence {
        self.tokens
            .iter()
            .map(|token| {
                let arc = self
                    .basic_dependencies
                    .iter()
                    .find(|a| a.dependent == token.index);
                ConllToken {
                    id: token.index.to_string(),
                    form: token.word.clone(),
                    lemma: token.lemma.clone().unwrap_or_else(|| "_".to_string()),
                    upos: token.pos.clone().unwrap_or_else(|| "_".to_string()),
                    xpos: token.pos.clone().unwrap_or_else(|| "_".to_string()),
                    feats: "_".to_string(),
                    head: arc.map_or_else(|| "_".to_string(), |a| a.governor.to_string()),
                    deprel: arc.map_or_else(|| "_".to_string(), |a| a.dep.clone()),
                    deps: "_".to_string(),
                    misc: "_".to_string(),
                }
            })
            .collect()
    }
}

/// Blocking client for the annotation service.
pub struct AnnotateClient {
    config: AnnotateConfig,
    http: reqwest::blocking::Client,
}

impl AnnotateClient {
    /// Builds a client with connection pooling and the configured timeout.
    ///
    /// # Errors
    ///
    /// Fails when the underlying HTTP client cannot be constructed.
    pub fn new(config: AnnotateConfig) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { config, http })
    }

    /// Annotates one piece of raw text.
    ///
    /// Transient failures (connection errors, non-success statuses) are
    /// retried with doubling backoff; after the retry budget the last
    /// error is returned.
    ///
    /// # Errors
    ///
    /// Fails when all attempts are exhausted or the response body is not
    /// valid annotation JSON.
    pub fn annotate(&self, text: &str) -> Result<AnnotateResponse> {
        let mut properties = serde_json::json!({
            "annotators": self.config.annotators.join(","),
            "outputFormat": "json",
        });
        if let Some(language) = &self.config.language {
            properties["pipelineLanguage"] = serde_json::json!(language);
        }

        let mut backoff = RETRY_BASE;
        let mut last_error = None;
        for attempt in 1..=RETRY_ATTEMPTS {
            match self.request(text, &properties) {
                Ok(response) => return Ok(response),
                Err(err) => {
                    warn!(attempt, %err, "annotation request failed");
                    last_error = Some(err);
                    if attempt < RETRY_ATTEMPTS {
                        thread::sleep(backoff);
                        backoff *= 2;
                    }
                }
            }
        }
        match last_error {
            Some(err) => Err(err.context(format!(
                "annotation service unreachable after {RETRY_ATTEMPTS} attempts"
            ))),
            None => bail!("annotation service unreachable"),
        }
    }

    fn request(&self, text: &str, properties: &serde_json::Value) -> Result<AnnotateResponse> {
        debug!(endpoint = %self.config.endpoint, bytes = text.len(), "posting text");
        let response = self
            .http
            .post(&self.config.endpoint)
            .query(&[("properties", properties.to_string())])
            .body(text.to_string())
            .send()
            .context("request failed")?
            .error_for_status()
            .context("service returned an error status")?;
        response
            .json::<AnnotateResponse>()
            .context("response is not valid annotation JSON")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_sentence() -> ServiceSentence {
        serde_json::from_value(serde_json::json!({
            "tokens": [
                { "index": 1, "word": "the", "pos": "DT" },
                { "index": 2, "word": "dog", "pos": "NN", "lemma": "dog" },
            ],
            "parse": "(ROOT (NP (DT the) (NN dog)))",
            "basicDependencies": [
                { "dep": "root", "governor": 0, "dependent": 2 },
                { "dep": "det", "governor": 2, "dependent": 1 },
            ]
        }))
        .unwrap()
    }

    #[test]
    fn response_deserializes_from_service_json() {
        let response: AnnotateResponse = serde_json::from_value(serde_json::json!({
            "sentences": [
                { "tokens": [{ "index": 1, "word": "hi" }] }
            ]
        }))
        .unwrap();
        assert_eq!(response.sentences.len(), 1);
        assert_eq!(response.sentences[0].tokens[0].word, "hi");
        assert!(response.sentences[0].parse.is_none());
        assert!(response.sentences[0].basic_dependencies.is_empty());
    }

    #[test]
    fn sentence_converts_to_conll_rows() {
        let conll = sample_sentence().to_conll();
        assert_eq!(conll.len(), 2);
        assert_eq!(conll[0].form, "the");
        assert_eq!(conll[0].head, "2");
        assert_eq!(conll[0].deprel, "det");
        assert_eq!(conll[1].head, "0");
        assert_eq!(conll[1].deprel, "root");
        assert_eq!(conll[1].lemma, "dog");
        assert_eq!(conll[0].lemma, "_");
    }

    #[test]
    fn sentence_converts_to_tagged_pairs() {
        let tagged = sample_sentence().to_tagged();
        assert_eq!(tagged.len(), 2);
        assert_eq!(tagged[0], TaggedWord::new("the", "DT"));
        assert_eq!(tagged[1], TaggedWord::new("dog", "NN"));
    }

    #[test]
    fn untagged_tokens_keep_a_placeholder() {
        let sentence: ServiceSentence = serde_json::from_value(serde_json::json!({
            "tokens": [{ "index": 1, "word": "hi" }]
        }))
        .unwrap();
        assert_eq!(sentence.to_tagged(), vec![TaggedWord::new("hi", "_")]);
    }

    #[test]
    fn missing_arcs_keep_placeholders() {
        let sentence: ServiceSentence = serde_json::from_value(serde_json::json!({
            "tokens": [{ "index": 1, "word": "hi", "pos": "UH" }]
        }))
        .unwrap();
        let conll = sentence.to_conll();
        assert_eq!(conll[0].head, "_");
        assert_eq!(conll[0].deprel, "_");
    }
}

//! Google Speech v2 recognizer
//!
//! Sends 16-bit big-endian linear PCM (`audio/l16; rate=<hz>`) to the
//! recognize endpoint. The body of the answer is newline-separated JSON
//! objects; the first one with a non-empty `result` array carries the
//! transcript. No result at all means no intelligible speech.

use async_trait::async_trait;
use serde::Deserialize;

use super::transcription::{RecognitionAudio, RecognitionError, Recognizer, RecognizerConfig};

const USER_AGENT: &str = concat!("echoic/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, Deserialize)]
struct RecognizeResponse {
    #[serde(default)]
    result: Vec<RecognizeResult>,
}

#[derive(Debug, Deserialize)]
struct RecognizeResult {
    #[serde(default)]
    alternative: Vec<Alternative>,
}

#[derive(Debug, Deserialize)]
struct Alternative {
    #[serde(default)]
    transcript: String,
    confidence: Option<f64>,
}

/// Extract the transcript from a recognize response body
///
/// Prefers the alternative carrying a confidence value (the engine's top
/// pick), otherwise the first one. Returns `""` when nothing was recognized.
pub fn parse_recognize_response(body: &str) -> Result<String, RecognitionError> {
    for line in body.lines().map(str::trim).filter(|l| !l.is_empty()) {
        let response: RecognizeResponse =
            serde_json::from_str(line).map_err(|e| RecognitionError::Parse(e.to_string()))?;

        let Some(result) = response.result.into_iter().next() else {
            continue;
        };

        let best = result
            .alternative
            .iter()
            .find(|alt| alt.confidence.is_some())
            .or_else(|| result.alternative.first());

        return Ok(best.map(|alt| alt.transcript.clone()).unwrap_or_default());
    }

    Ok(String::new())
}

/// HTTP client for the Google Speech v2 endpoint
pub struct GoogleSpeechRecognizer {
    http_client: reqwest::Client,
    endpoint: String,
    client: String,
    api_key: Option<String>,
}

impl GoogleSpeechRecognizer {
    pub fn new(config: &RecognizerConfig) -> Result<Self, RecognitionError> {
        let mut builder = reqwest::Client::builder().user_agent(USER_AGENT);
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let http_client = builder
            .build()
            .map_err(|e| RecognitionError::Config(e.to_string()))?;

        let api_key = config
            .has_api_key()
            .then(|| config.api_key.clone())
            .flatten();
        if api_key.is_none() {
            tracing::warn!(
                endpoint = %config.endpoint,
                env = echoic_common::config::RECOGNIZER_API_KEY_ENV,
                "No speech recognition API key configured; recognition requests will likely be rejected"
            );
        }

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            client: config.client.clone(),
            api_key,
        })
    }
}

#[async_trait]
impl Recognizer for GoogleSpeechRecognizer {
    fn name(&self) -> &str {
        "google-speech-v2"
    }

    async fn recognize(
        &self,
        audio: &RecognitionAudio,
        language: &str,
    ) -> Result<String, RecognitionError> {
        let mut params = vec![
            ("client", self.client.as_str()),
            ("lang", language),
            ("output", "json"),
        ];
        if let Some(key) = &self.api_key {
            params.push(("key", key.as_str()));
        }

        tracing::debug!(
            language = language,
            sample_rate = audio.sample_rate,
            samples = audio.samples.len(),
            "Querying speech recognition service"
        );

        let response = self
            .http_client
            .post(&self.endpoint)
            .query(&params)
            .header(
                reqwest::header::CONTENT_TYPE,
                format!("audio/l16; rate={}", audio.sample_rate),
            )
            .body(audio.to_l16_bytes())
            .send()
            .await
            .map_err(|e| RecognitionError::Network(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| RecognitionError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(RecognitionError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let transcript = parse_recognize_response(&body)?;
        tracing::debug!(chars = transcript.chars().count(), "Recognition response parsed");
        Ok(transcript)
    }
}

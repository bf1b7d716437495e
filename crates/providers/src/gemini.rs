//! Gemini analysis client.
//!
//! One multimodal `generateContent` call per analyze action: a system
//! instruction, the assembled prompt text, and the image payloads as
//! `inline_data` parts, in the same order as the prompt's numbered sections.
//! Every failure comes back as an `AnalysisError`; nothing here panics or
//! throws past the `Result`.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use shared::model::ImagePart;
use std::env;
use std::time::Duration;
use thiserror::Error;

/// Model used when `GEMINI_MODEL` is not set.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";

const REQUEST_TIMEOUT_SECS: u64 = 90;
const ERROR_BODY_LIMIT: usize = 800;

/// Failure-with-reason side of an analysis attempt.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("GEMINI_API_KEY environment variable not set")]
    MissingApiKey,
    #[error("could not build HTTP client: {0}")]
    ClientSetup(reqwest::Error),
    #[error("request to Gemini failed: {0}")]
    Network(#[from] reqwest::Error),
    #[error("gemini error: {status}: {body}")]
    Service {
        status: reqwest::StatusCode,
        body: String,
    },
    #[error("gemini returned no analysis text")]
    EmptyResponse,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    system_instruction: Option<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    role: String,
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(untagged)]
enum GeminiPart {
    Text { text: String },
    InlineData { inline_data: GeminiInlineData },
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiInlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiCandidateContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidateContent {
    #[serde(default)]
    parts: Vec<GeminiCandidatePart>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidatePart {
    #[serde(default)]
    text: String,
}

pub struct GeminiClient {
    http: Client,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, AnalysisError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(AnalysisError::ClientSetup)?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
        })
    }

    /// Build a client from the process environment. The credential check
    /// happens here, before any network attempt.
    pub fn from_env() -> Result<Self, AnalysisError> {
        let key = env::var("GEMINI_API_KEY").map_err(|_| AnalysisError::MissingApiKey)?;
        let model = env::var("GEMINI_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string());
        Self::new(key, model)
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Send one analysis request and return the markdown text the model
    /// produced.
    pub async fn analyze(
        &self,
        system_instruction: &str,
        prompt_text: &str,
        image_parts: &[ImagePart],
    ) -> Result<String, AnalysisError> {
        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent?key={}",
            self.model, self.api_key
        );

        let mut parts = vec![GeminiPart::Text {
            text: prompt_text.to_string(),
        }];
        for part in image_parts {
            parts.push(GeminiPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: part.mime_type.clone(),
                    data: part.data.clone(),
                },
            });
        }

        let req = GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts,
            }],
            system_instruction: Some(GeminiContent {
                role: "system".to_string(),
                parts: vec![GeminiPart::Text {
                    text: system_instruction.to_string(),
                }],
            }),
        };

        tracing::info!(model = %self.model, images = image_parts.len(), "sending analysis request");
        let resp = self.http.post(url).json(&req).send().await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            let body = body.trim();
            let body = if body.is_empty() {
                "(no response body)".to_string()
            } else {
                truncate_body(body)
            };
            return Err(AnalysisError::Service { status, body });
        }

        let body: GeminiResponse = resp.json().await?;
        let text = body
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .map(|p| p.text.clone())
            .unwrap_or_default();

        if text.is_empty() {
            return Err(AnalysisError::EmptyResponse);
        }
        tracing::info!(chars = text.len(), "analysis response received");
        Ok(text)
    }
}

fn truncate_body(body: &str) -> String {
    if body.len() > ERROR_BODY_LIMIT {
        let mut end = ERROR_BODY_LIMIT;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_with(parts: Vec<GeminiPart>) -> GeminiRequest {
        GeminiRequest {
            contents: vec![GeminiContent {
                role: "user".to_string(),
                parts,
            }],
            system_instruction: None,
        }
    }

    #[test]
    fn test_request_serializes_text_and_inline_data() {
        let req = request_with(vec![
            GeminiPart::Text {
                text: "hello".to_string(),
            },
            GeminiPart::InlineData {
                inline_data: GeminiInlineData {
                    mime_type: "image/png".to_string(),
                    data: "AAAA".to_string(),
                },
            },
        ]);

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["contents"][0]["role"], "user");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(
            json["contents"][0]["parts"][1]["inline_data"]["mime_type"],
            "image/png"
        );
        assert_eq!(json["contents"][0]["parts"][1]["inline_data"]["data"], "AAAA");
        // Absent system instruction is omitted entirely.
        assert!(json.get("system_instruction").is_none());
    }

    #[test]
    fn test_system_instruction_serialized_when_present() {
        let mut req = request_with(vec![]);
        req.system_instruction = Some(GeminiContent {
            role: "system".to_string(),
            parts: vec![GeminiPart::Text {
                text: "be brief".to_string(),
            }],
        });

        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["system_instruction"]["parts"][0]["text"], "be brief");
    }

    #[test]
    fn test_response_text_extraction() {
        let body: GeminiResponse = serde_json::from_str(
            r###"{"candidates":[{"content":{"parts":[{"text":"## Analysis"}]}}]}"###,
        )
        .unwrap();
        let text = body
            .candidates
            .first()
            .and_then(|c| c.content.as_ref())
            .and_then(|c| c.parts.first())
            .map(|p| p.text.clone())
            .unwrap_or_default();
        assert_eq!(text, "## Analysis");
    }

    #[test]
    fn test_empty_candidates_parse_to_empty_text() {
        let body: GeminiResponse = serde_json::from_str(r#"{"candidates":[]}"#).unwrap();
        assert!(body.candidates.is_empty());
    }

    #[test]
    fn test_truncate_body_limits_length() {
        let long = "x".repeat(2000);
        let truncated = truncate_body(&long);
        assert!(truncated.ends_with("..."));
        assert!(truncated.len() <= ERROR_BODY_LIMIT + 3);

        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn test_missing_key_error_message_names_the_variable() {
        let msg = AnalysisError::MissingApiKey.to_string();
        assert!(msg.contains("GEMINI_API_KEY"));
    }
}

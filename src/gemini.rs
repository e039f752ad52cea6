/// Remote generation call
///
/// `ImageGenerator` is the seam the rest of the app talks to; `GeminiClient`
/// implements it against the Gemini `generateContent` REST endpoint.
/// The only thing we read from a response is "is there an inline image part".
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::GeminiConfig;
use crate::error::TryOnError;
use crate::request::GenerationRequest;
use crate::state::data::EncodedImage;

/// Something that can turn a try-on request into an image
#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: GenerationRequest) -> Result<EncodedImage, TryOnError>;
}

// ========== Wire format ==========

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentBody<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
enum RequestPart<'a> {
    Image {
        #[serde(rename = "inlineData")]
        inline_data: RequestBlob<'a>,
    },
    Text {
        text: &'a str,
    },
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RequestBlob<'a> {
    mime_type: &'a str,
    data: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    response_modalities: [&'static str; 2],
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct GenerateContentResponse {
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct Candidate {
    content: Option<ResponseContent>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResponseContent {
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResponsePart {
    text: Option<String>,
    #[serde(rename = "inlineData", alias = "inline_data")]
    inline_data: Option<ResponseBlob>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ResponseBlob {
    #[serde(rename = "mimeType", alias = "mime_type")]
    mime_type: Option<String>,
    data: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct PromptFeedback {
    block_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: ErrorDetail,
}

#[derive(Debug, Deserialize)]
struct ErrorDetail {
    message: String,
}

fn image_part(image: &EncodedImage) -> RequestPart<'_> {
    RequestPart::Image {
        inline_data: RequestBlob {
            mime_type: image.content_type(),
            data: image.payload(),
        },
    }
}

/// Shape a request as a `generateContent` body:
/// person, garment, then the instruction
fn request_body(request: &GenerationRequest) -> GenerateContentBody<'_> {
    GenerateContentBody {
        contents: vec![Content {
            parts: vec![
                image_part(&request.subject),
                image_part(&request.garment),
                RequestPart::Text {
                    text: request.instruction,
                },
            ],
        }],
        generation_config: GenerationConfig {
            response_modalities: ["TEXT", "IMAGE"],
        },
    }
}

/// Pull the first inline image out of a successful response body
fn extract_image(body: &str) -> Result<EncodedImage, TryOnError> {
    let response: GenerateContentResponse = serde_json::from_str(body)
        .map_err(|e| TryOnError::Transport(format!("unreadable response from model: {}", e)))?;

    let parts = response
        .candidates
        .iter()
        .filter_map(|candidate| candidate.content.as_ref())
        .flat_map(|content| content.parts.iter());

    let mut reply = Vec::new();
    for part in parts {
        if let Some(blob) = part.inline_data.as_ref().filter(|blob| !blob.data.is_empty()) {
            let content_type = blob.mime_type.clone().unwrap_or_default();
            return Ok(EncodedImage::new(blob.data.clone(), content_type));
        }
        if let Some(text) = part.text.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            reply.push(text.to_string());
        }
    }

    let reply = if reply.is_empty() {
        response
            .prompt_feedback
            .and_then(|feedback| feedback.block_reason)
            .map(|reason| format!("request blocked ({})", reason))
    } else {
        Some(reply.join(" "))
    };

    Err(TryOnError::NoImageReturned { reply })
}

/// Human-readable message for a non-success HTTP response
fn status_error(status: reqwest::StatusCode, body: &str) -> TryOnError {
    let detail = serde_json::from_str::<ErrorEnvelope>(body)
        .map(|envelope| envelope.error.message)
        .unwrap_or_else(|_| body.chars().take(200).collect());

    if detail.trim().is_empty() {
        TryOnError::Transport(format!("model service returned {}", status))
    } else {
        TryOnError::Transport(format!("model service returned {}: {}", status, detail.trim()))
    }
}

/// Gemini REST client
pub struct GeminiClient {
    config: GeminiConfig,
    http: reqwest::Client,
}

impl GeminiClient {
    pub fn new(config: GeminiConfig) -> Self {
        Self {
            config,
            http: reqwest::Client::new(),
        }
    }

    pub fn config(&self) -> &GeminiConfig {
        &self.config
    }
}

#[async_trait]
impl ImageGenerator for GeminiClient {
    async fn generate(&self, request: GenerationRequest) -> Result<EncodedImage, TryOnError> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            return Err(TryOnError::Transport("GEMINI_API_KEY is not set".to_string()));
        };

        let endpoint = self.config.endpoint();
        log::info!(
            "🎨 Sending try-on request to {} (person {}, garment {})",
            self.config.model,
            request.subject.content_type(),
            request.garment.content_type()
        );

        let response = self
            .http
            .post(&endpoint)
            .header("x-goog-api-key", api_key)
            .json(&request_body(&request))
            .send()
            .await
            .map_err(|e| TryOnError::Transport(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| TryOnError::Transport(e.to_string()))?;

        if !status.is_success() {
            log::warn!("Model service returned {}", status);
            return Err(status_error(status, &body));
        }

        let image = extract_image(&body)?;
        log::info!(
            "✅ Model returned a {} image (~{} KB)",
            image.content_type(),
            image.decoded_len() / 1024
        );
        Ok(image)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::TRY_ON_INSTRUCTION;
    use crate::state::data::FALLBACK_CONTENT_TYPE;
    use mockito::{Matcher, Server};
    use serde_json::json;

    fn request() -> GenerationRequest {
        GenerationRequest {
            subject: EncodedImage::new("UEVSU09O", "image/jpeg"),
            garment: EncodedImage::new("U0hJUlQ=", "image/png"),
            instruction: TRY_ON_INSTRUCTION,
        }
    }

    fn client_for(server: &Server, api_key: Option<&str>) -> GeminiClient {
        GeminiClient::new(GeminiConfig {
            api_key: api_key.map(str::to_string),
            api_base: server.url(),
            model: "test-model".to_string(),
        })
    }

    #[test]
    fn test_request_body_shape() {
        let body = serde_json::to_value(request_body(&request())).unwrap();
        assert_eq!(
            body,
            json!({
                "contents": [{
                    "parts": [
                        { "inlineData": { "mimeType": "image/jpeg", "data": "UEVSU09O" } },
                        { "inlineData": { "mimeType": "image/png", "data": "U0hJUlQ=" } },
                        { "text": TRY_ON_INSTRUCTION }
                    ]
                }],
                "generationConfig": { "responseModalities": ["TEXT", "IMAGE"] }
            })
        );
    }

    #[test]
    fn test_extract_first_inline_image() {
        let body = json!({
            "candidates": [{
                "content": { "parts": [
                    { "text": "Here you go" },
                    { "inlineData": { "mimeType": "image/png", "data": "UkVTVUxU" } },
                    { "inlineData": { "mimeType": "image/jpeg", "data": "U0VDT05E" } }
                ]}
            }]
        })
        .to_string();

        let image = extract_image(&body).unwrap();
        assert_eq!(image.payload(), "UkVTVUxU");
        assert_eq!(image.content_type(), "image/png");
    }

    #[test]
    fn test_extract_accepts_snake_case_and_missing_mime() {
        let body = json!({
            "candidates": [{ "content": { "parts": [ { "inline_data": { "data": "UkVTVUxU" } } ] } }]
        })
        .to_string();

        let image = extract_image(&body).unwrap();
        assert_eq!(image.content_type(), FALLBACK_CONTENT_TYPE);
    }

    #[test]
    fn test_text_only_reply_is_no_image() {
        let body = json!({
            "candidates": [{ "content": { "parts": [ { "text": "I can't edit this photo." } ] } }]
        })
        .to_string();

        assert_eq!(
            extract_image(&body),
            Err(TryOnError::NoImageReturned {
                reply: Some("I can't edit this photo.".to_string())
            })
        );
    }

    #[test]
    fn test_blocked_prompt_is_no_image() {
        let body = json!({ "promptFeedback": { "blockReason": "SAFETY" } }).to_string();
        assert_eq!(
            extract_image(&body),
            Err(TryOnError::NoImageReturned {
                reply: Some("request blocked (SAFETY)".to_string())
            })
        );
        assert_eq!(
            extract_image("{}"),
            Err(TryOnError::NoImageReturned { reply: None })
        );
    }

    #[test]
    fn test_garbage_body_is_transport_error() {
        assert!(matches!(extract_image("<html>"), Err(TryOnError::Transport(_))));
    }

    #[tokio::test]
    async fn test_generate_success() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/test-model:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .match_body(Matcher::Regex(r#""mimeType":"image/jpeg""#.to_string()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                json!({
                    "candidates": [{ "content": { "parts": [
                        { "inlineData": { "mimeType": "image/png", "data": "UkVTVUxU" } }
                    ]}}]
                })
                .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server, Some("test-key"));
        let image = client.generate(request()).await.unwrap();

        assert_eq!(image.payload(), "UkVTVUxU");
        assert_eq!(image.content_type(), "image/png");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_generate_text_only() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/test-model:generateContent")
            .with_status(200)
            .with_body(json!({ "candidates": [{ "content": { "parts": [ { "text": "No." } ] } }] }).to_string())
            .create_async()
            .await;

        let client = client_for(&server, Some("test-key"));
        let err = client.generate(request()).await.unwrap_err();
        assert!(err.to_string().contains("did not return an image"));
    }

    #[tokio::test]
    async fn test_generate_http_error_uses_service_message() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/models/test-model:generateContent")
            .with_status(400)
            .with_body(
                json!({ "error": { "code": 400, "message": "API key not valid", "status": "INVALID_ARGUMENT" } })
                    .to_string(),
            )
            .create_async()
            .await;

        let client = client_for(&server, Some("bad-key"));
        let err = client.generate(request()).await.unwrap_err();
        match err {
            TryOnError::Transport(message) => {
                assert!(message.contains("400"));
                assert!(message.contains("API key not valid"));
            }
            other => panic!("expected transport error, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_generate_without_key_fails_before_sending() {
        let server = Server::new_async().await;
        let client = client_for(&server, None);

        let err = client.generate(request()).await.unwrap_err();
        assert_eq!(err, TryOnError::Transport("GEMINI_API_KEY is not set".to_string()));
    }

    #[tokio::test]
    async fn test_generate_unreachable_host() {
        let client = GeminiClient::new(GeminiConfig {
            api_key: Some("k".to_string()),
            api_base: "http://127.0.0.1:1".to_string(),
            model: "test-model".to_string(),
        });

        assert!(matches!(
            client.generate(request()).await,
            Err(TryOnError::Transport(_))
        ));
    }
}

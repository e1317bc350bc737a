//! Outbound seam to the generative image service (Gemini `generateContent`).
//!
//! The pipeline only depends on the [`ImageCollaborator`] trait; the HTTP
//! implementation lives here so tests can swap in a fake without any network.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::request::UpscaleRequest;

pub const DEFAULT_COLLABORATOR_BASE_URL: &str =
    "https://generativelanguage.googleapis.com/v1beta/models";
pub const DEFAULT_IMAGE_MODEL: &str = "gemini-2.5-flash-image";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CollaboratorError {
    #[error("The image service could not be reached: {0}")]
    Transport(String),
    #[error("The image service rejected the request ({status}): {message}")]
    Service { status: u16, message: String },
    #[error("The image service reply could not be parsed: {0}")]
    MalformedReply(String),
}

#[async_trait]
pub trait ImageCollaborator: Send + Sync + 'static {
    async fn generate(
        &self,
        request: &UpscaleRequest,
    ) -> Result<GenerateContentReply, CollaboratorError>;
}

pub type SharedImageCollaborator = Arc<dyn ImageCollaborator>;

/// Placeholder wired in when no credential is configured. The orchestrator
/// fails fast before dispatch, so this only fires if that check is bypassed.
#[derive(Debug, Default, Clone)]
pub struct UnconfiguredImageCollaborator;

#[async_trait]
impl ImageCollaborator for UnconfiguredImageCollaborator {
    async fn generate(
        &self,
        _request: &UpscaleRequest,
    ) -> Result<GenerateContentReply, CollaboratorError> {
        Err(CollaboratorError::Transport(String::from(
            "no image service credential is configured",
        )))
    }
}

/// Direct REST client for the Gemini image model. No retry and no local
/// timeout; a dispatched request runs until the transport settles it.
#[derive(Clone)]
pub struct GeminiImageCollaborator {
    client: Client,
    api_key: String,
    model: String,
    base_url: String,
}

impl GeminiImageCollaborator {
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            base_url: String::from(DEFAULT_COLLABORATOR_BASE_URL),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn endpoint(&self) -> String {
        format!(
            "{base}/{model}:generateContent?key={key}",
            base = self.base_url,
            model = self.model,
            key = self.api_key
        )
    }
}

#[async_trait]
impl ImageCollaborator for GeminiImageCollaborator {
    async fn generate(
        &self,
        request: &UpscaleRequest,
    ) -> Result<GenerateContentReply, CollaboratorError> {
        let body = GenerateContentBody::from_upscale(request);
        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|err| CollaboratorError::Transport(err.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body_text = response
                .text()
                .await
                .unwrap_or_else(|_| String::from("failed to read error body"));
            return Err(map_service_error(status, body_text));
        }

        response
            .json::<GenerateContentReply>()
            .await
            .map_err(|err| CollaboratorError::MalformedReply(err.to_string()))
    }
}

fn map_service_error(status: StatusCode, body: String) -> CollaboratorError {
    let message = serde_json::from_str::<ServiceErrorWrapper>(body.as_str())
        .map(|wrapper| {
            let status_text = wrapper.error.status.unwrap_or_default();
            let msg = wrapper.error.message.unwrap_or_else(|| body.clone());
            if status_text.is_empty() {
                msg
            } else {
                format!("{status_text}: {msg}")
            }
        })
        .unwrap_or(body);
    CollaboratorError::Service {
        status: status.as_u16(),
        message,
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerateContentBody {
    pub contents: Vec<RequestContent>,
    #[serde(rename = "generationConfig", skip_serializing_if = "Option::is_none")]
    pub generation_config: Option<GenerationConfig>,
}

impl GenerateContentBody {
    /// Maps the assembled pipeline request onto the wire shape: inline image
    /// first, the instruction text second, and the image-only response
    /// modality when the request asks for it.
    pub fn from_upscale(request: &UpscaleRequest) -> Self {
        Self {
            contents: vec![RequestContent {
                parts: vec![
                    RequestPart::InlineData {
                        inline_data: InlineImageData {
                            mime_type: Some(request.media_type.clone()),
                            data: request.encoded_image.clone(),
                        },
                    },
                    RequestPart::Text {
                        text: request.instruction.clone(),
                    },
                ],
            }],
            generation_config: request.image_only.then(|| GenerationConfig {
                response_modalities: vec![String::from("IMAGE")],
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RequestContent {
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum RequestPart {
    Text {
        text: String,
    },
    InlineData {
        #[serde(rename = "inlineData")]
        inline_data: InlineImageData,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GenerationConfig {
    #[serde(rename = "responseModalities")]
    pub response_modalities: Vec<String>,
}

/// Reply shape: multi-candidate, multi-part, of which the interpreter only
/// ever consults the first candidate's first part.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct GenerateContentReply {
    #[serde(default)]
    pub candidates: Vec<ReplyCandidate>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ReplyCandidate {
    pub content: Option<ReplyContent>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ReplyContent {
    #[serde(default)]
    pub parts: Vec<ReplyPart>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct ReplyPart {
    pub text: Option<String>,
    #[serde(rename = "inlineData")]
    pub inline_data: Option<InlineImageData>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InlineImageData {
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
    pub data: String,
}

#[derive(Deserialize)]
struct ServiceErrorWrapper {
    error: ServiceErrorBody,
}

#[derive(Deserialize)]
struct ServiceErrorBody {
    message: Option<String>,
    status: Option<String>,
}

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::api::error::ErrorKind;
use crate::api::response::{failure, internal_error, success, ApiJson};
use crate::api::server::AppState;
use crate::pipeline::encoding::decode_payload;
use crate::pipeline::orchestrator::UpscaleError;
use crate::pipeline::session::{SessionEventError, UpscaleSession};
use crate::pipeline::validation::SourceRejection;
use crate::pipeline::{EnhancementMode, SourceImage};

#[derive(Debug, Clone, Deserialize)]
pub struct SelectImageInput {
    pub file_name: Option<String>,
    pub media_type: String,
    /// Base64 file content, no data-URL prefix.
    pub data: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SetModeInput {
    pub mode: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSnapshot {
    pub phase: &'static str,
    pub mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<SourceSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<ResultSummary>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SourceSummary {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
    pub media_type: String,
    pub byte_size: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultSummary {
    pub media_type: String,
    pub data_url: String,
    pub download_file_name: String,
}

impl SessionSnapshot {
    pub fn of(session: &UpscaleSession) -> Self {
        let source_name = session.source().and_then(|s| s.file_name.as_deref());
        Self {
            phase: session.phase().as_str(),
            mode: session.mode().as_str(),
            source: session.source().map(|source| SourceSummary {
                file_name: source.file_name.clone(),
                media_type: source.media_type.clone(),
                byte_size: source.byte_size(),
            }),
            result: session.result().map(|result| ResultSummary {
                media_type: result.media_type.clone(),
                data_url: result.data_url(),
                download_file_name: result.download_file_name(source_name),
            }),
            error: session.failure().map(String::from),
        }
    }
}

pub async fn get_session_handler(State(state): State<AppState>) -> ApiJson<Value> {
    let guard = state.session.lock().await;
    success(snapshot_value(&guard))
}

pub async fn select_image_handler(
    State(state): State<AppState>,
    Json(payload): Json<SelectImageInput>,
) -> ApiJson<Value> {
    let bytes = match decode_payload(payload.data.as_str()) {
        Ok(bytes) => bytes,
        Err(_) => {
            return failure(
                StatusCode::BAD_REQUEST,
                ErrorKind::Validation,
                "invalid_payload",
                "Field 'data' is not valid base64",
            );
        }
    };

    let candidate = SourceImage {
        file_name: payload
            .file_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty()),
        media_type: payload.media_type.trim().to_string(),
        bytes,
    };

    let mut guard = state.session.lock().await;
    match guard.select_source(candidate) {
        Ok(()) => success(snapshot_value(&guard)),
        Err(error) => map_session_event_error(error),
    }
}

pub async fn set_mode_handler(
    State(state): State<AppState>,
    Json(payload): Json<SetModeInput>,
) -> ApiJson<Value> {
    let Some(mode) = EnhancementMode::parse(payload.mode.as_str()) else {
        return failure(
            StatusCode::BAD_REQUEST,
            ErrorKind::Validation,
            "invalid_mode",
            "Field 'mode' must be one of: 2k, 4k",
        );
    };

    let mut guard = state.session.lock().await;
    match guard.set_mode(mode) {
        Ok(()) => success(snapshot_value(&guard)),
        Err(error) => map_session_event_error(error),
    }
}

pub async fn trigger_upscale_handler(State(state): State<AppState>) -> ApiJson<Value> {
    let orchestrator = state.orchestrator.clone();
    match orchestrator.request_upscale(&state.session).await {
        Ok(_image) => {
            let guard = state.session.lock().await;
            success(snapshot_value(&guard))
        }
        Err(error) => map_upscale_error(error),
    }
}

pub async fn download_result_handler(State(state): State<AppState>) -> Response {
    let guard = state.session.lock().await;
    let Some(result) = guard.result() else {
        return failure(
            StatusCode::NOT_FOUND,
            ErrorKind::Validation,
            "no_result",
            "No upscaled image is available to download",
        )
        .into_response();
    };

    let bytes = match decode_payload(result.data.as_str()) {
        Ok(bytes) => bytes,
        Err(error) => {
            return internal_error(format!("stored result payload failed to decode: {error}"))
                .into_response();
        }
    };

    let source_name = guard.source().and_then(|s| s.file_name.as_deref());
    let file_name = result.download_file_name(source_name);
    let content_type = result.media_type.clone();
    drop(guard);

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, content_type),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{file_name}\""),
            ),
        ],
        bytes,
    )
        .into_response()
}

fn snapshot_value(session: &UpscaleSession) -> Value {
    json!({"session": SessionSnapshot::of(session)})
}

fn map_session_event_error(error: SessionEventError) -> ApiJson<Value> {
    match error {
        SessionEventError::InFlight => failure(
            StatusCode::CONFLICT,
            ErrorKind::Policy,
            "request_in_flight",
            error.to_string(),
        ),
        SessionEventError::Rejected(ref rejection) => {
            let code = match rejection {
                SourceRejection::InvalidType(_) => "invalid_type",
                SourceRejection::TooLarge { .. } => "too_large",
            };
            failure(
                StatusCode::BAD_REQUEST,
                ErrorKind::Validation,
                code,
                error.to_string(),
            )
        }
    }
}

fn map_upscale_error(error: UpscaleError) -> ApiJson<Value> {
    let message = error.to_string();
    match error {
        UpscaleError::NoImageSelected => failure(
            StatusCode::BAD_REQUEST,
            ErrorKind::Validation,
            "no_image_selected",
            message,
        ),
        UpscaleError::MissingCredential => failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Infra,
            "missing_credential",
            message,
        ),
        UpscaleError::Encoding(_) => failure(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::Infra,
            "encoding_error",
            message,
        ),
        UpscaleError::Collaborator(_) => failure(
            StatusCode::BAD_GATEWAY,
            ErrorKind::Provider,
            "collaborator_error",
            message,
        ),
        UpscaleError::NoUsableImage => failure(
            StatusCode::BAD_GATEWAY,
            ErrorKind::Provider,
            "no_usable_image",
            message,
        ),
        UpscaleError::RequestAlreadyInFlight => failure(
            StatusCode::CONFLICT,
            ErrorKind::Policy,
            "request_in_flight",
            message,
        ),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;
    use crate::pipeline::collaborator::CollaboratorError;
    use crate::pipeline::UpscaledImage;

    #[test]
    fn snapshot_reflects_an_empty_session() {
        let session = UpscaleSession::new();
        let value = serde_json::to_value(SessionSnapshot::of(&session))
            .expect("snapshot should serialize");
        assert_eq!(
            value,
            json!({
                "phase": "idle",
                "mode": "2k",
            })
        );
    }

    #[test]
    fn snapshot_includes_source_result_and_download_name() {
        let mut session = UpscaleSession::new();
        session
            .select_source(SourceImage {
                file_name: Some(String::from("garden.png")),
                media_type: String::from("image/png"),
                bytes: vec![1, 2, 3],
            })
            .expect("png should be accepted");
        session.settle_success(UpscaledImage {
            media_type: String::from("image/png"),
            data: String::from("abc123"),
        });

        let value = serde_json::to_value(SessionSnapshot::of(&session))
            .expect("snapshot should serialize");
        assert_eq!(value["phase"], json!("succeeded"));
        assert_eq!(value["source"]["byte_size"], json!(3));
        assert_eq!(value["result"]["data_url"], json!("data:image/png;base64,abc123"));
        assert_eq!(
            value["result"]["download_file_name"],
            json!("obatech-upscaled-garden.png")
        );
    }

    #[test]
    fn upscale_errors_map_to_stable_statuses_and_codes() {
        let cases = [
            (UpscaleError::NoImageSelected, StatusCode::BAD_REQUEST, "no_image_selected"),
            (
                UpscaleError::MissingCredential,
                StatusCode::INTERNAL_SERVER_ERROR,
                "missing_credential",
            ),
            (
                UpscaleError::Collaborator(CollaboratorError::Transport(String::from("down"))),
                StatusCode::BAD_GATEWAY,
                "collaborator_error",
            ),
            (UpscaleError::NoUsableImage, StatusCode::BAD_GATEWAY, "no_usable_image"),
            (
                UpscaleError::RequestAlreadyInFlight,
                StatusCode::CONFLICT,
                "request_in_flight",
            ),
        ];

        for (error, expected_status, expected_code) in cases {
            let (status, payload) = map_upscale_error(error);
            assert_eq!(status, expected_status);
            let value = serde_json::to_value(&payload.0).expect("envelope should serialize");
            assert_eq!(value["error"]["code"], json!(expected_code));
        }
    }
}

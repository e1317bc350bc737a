use axum::http::StatusCode;
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::error;

use crate::api::error::{ApiError, ErrorKind};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ApiEnvelope<T> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<ApiError>,
}

pub type ApiJson<T> = (StatusCode, Json<ApiEnvelope<T>>);

pub fn success<T>(payload: T) -> ApiJson<T>
where
    T: Serialize,
{
    (
        StatusCode::OK,
        Json(ApiEnvelope {
            ok: true,
            data: Some(payload),
            error: None,
        }),
    )
}

pub fn failure(
    status: StatusCode,
    kind: ErrorKind,
    code: impl Into<String>,
    message: impl Into<String>,
) -> ApiJson<Value> {
    (
        status,
        Json(ApiEnvelope {
            ok: false,
            data: None,
            error: Some(ApiError::new(kind, code, message)),
        }),
    )
}

/// Unexpected internals log the detail and hand the client a sanitized
/// message.
pub fn internal_error(detail: impl Into<String>) -> ApiJson<Value> {
    let detail = detail.into();
    error!(detail = %detail, "internal api error");
    failure(
        StatusCode::INTERNAL_SERVER_ERROR,
        ErrorKind::Infra,
        "internal_error",
        "Internal server error",
    )
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn success_wraps_payload_in_envelope() {
        let (status, payload) = success(json!({"phase": "idle"}));
        assert_eq!(status, StatusCode::OK);
        let value = serde_json::to_value(&payload.0).expect("envelope should serialize");
        assert_eq!(value["ok"], json!(true));
        assert_eq!(value["data"]["phase"], json!("idle"));
        assert!(value.get("error").is_none());
    }

    #[test]
    fn failure_carries_kind_code_and_message() {
        let (status, payload) = failure(
            StatusCode::BAD_REQUEST,
            ErrorKind::Validation,
            "invalid_type",
            "Unsupported file type",
        );
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let value = serde_json::to_value(&payload.0).expect("envelope should serialize");
        assert_eq!(value["ok"], json!(false));
        assert_eq!(value["error"]["kind"], json!("validation"));
        assert_eq!(value["error"]["code"], json!("invalid_type"));
        assert_eq!(value["error"]["message"], json!("Unsupported file type"));
    }

    #[test]
    fn internal_errors_are_sanitized() {
        let (status, payload) = internal_error("sensitive detail");
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let value = serde_json::to_value(&payload.0).expect("envelope should serialize");
        assert_eq!(value["error"]["message"], json!("Internal server error"));
        assert_eq!(value["error"]["kind"], json!("infra"));
    }
}

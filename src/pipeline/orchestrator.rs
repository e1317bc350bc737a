use std::sync::Arc;

use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{info, warn};
use uuid::Uuid;

use crate::pipeline::collaborator::{CollaboratorError, SharedImageCollaborator};
use crate::pipeline::encoding::{encode_source_bytes, EncodingError};
use crate::pipeline::interpret::extract_first_inline_image;
use crate::pipeline::request::build_upscale_request;
use crate::pipeline::session::{SessionPhase, UpscaleSession};
use crate::pipeline::{EnhancementMode, SourceImage, UpscaledImage};

pub type SharedSession = Arc<Mutex<UpscaleSession>>;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpscaleError {
    #[error("No image selected. Choose a JPEG or PNG file first.")]
    NoImageSelected,
    #[error("GEMINI_API_KEY is not set; configure it to reach the image service.")]
    MissingCredential,
    #[error(transparent)]
    Encoding(#[from] EncodingError),
    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
    #[error("The image service did not return an image.")]
    NoUsableImage,
    #[error("An upscale request is already in flight.")]
    RequestAlreadyInFlight,
}

/// Sequences one upscale invocation end to end: admission checks, payload
/// encoding, request assembly, the outbound call, and settlement of the
/// session. At most one request is in flight per session; a second trigger
/// is rejected outright rather than queued. No retries — every failure is
/// terminal for its invocation and the user re-triggers.
#[derive(Clone)]
pub struct UpscaleOrchestrator {
    credential_present: bool,
    collaborator: SharedImageCollaborator,
}

impl UpscaleOrchestrator {
    /// The credential is injected as explicit configuration rather than read
    /// from ambient process state, so tests never mutate the environment.
    pub fn new(credential: Option<&str>, collaborator: SharedImageCollaborator) -> Self {
        Self {
            credential_present: credential.map(str::trim).is_some_and(|key| !key.is_empty()),
            collaborator,
        }
    }

    /// The single externally callable pipeline operation. The session lock is
    /// released while the collaborator call is outstanding, so concurrent
    /// triggers observe the InFlight phase and are rejected without waiting.
    pub async fn request_upscale(
        &self,
        session: &SharedSession,
    ) -> Result<UpscaledImage, UpscaleError> {
        let (source, mode) = {
            let mut guard = session.lock().await;
            if guard.phase() == SessionPhase::InFlight {
                warn!("rejecting upscale trigger while another request is in flight");
                return Err(UpscaleError::RequestAlreadyInFlight);
            }
            let Some(source) = guard.source().cloned() else {
                let error = UpscaleError::NoImageSelected;
                guard.settle_failure(error.to_string());
                return Err(error);
            };
            if !self.credential_present {
                let error = UpscaleError::MissingCredential;
                guard.settle_failure(error.to_string());
                return Err(error);
            }
            let mode = guard.mode();
            guard.begin_flight();
            (source, mode)
        };

        let settled = self.dispatch(source, mode).await;

        let mut guard = session.lock().await;
        match settled {
            Ok(image) => {
                guard.settle_success(image.clone());
                Ok(image)
            }
            Err(error) => {
                guard.settle_failure(error.to_string());
                Err(error)
            }
        }
    }

    async fn dispatch(
        &self,
        source: SourceImage,
        mode: EnhancementMode,
    ) -> Result<UpscaledImage, UpscaleError> {
        let request_id = Uuid::new_v4();
        let encoded = encode_source_bytes(source.bytes.as_slice())?;
        let request = build_upscale_request(encoded, source.media_type.clone(), mode);
        info!(
            request_id = %request_id,
            mode = mode.as_str(),
            resolution = mode.resolution_literal(),
            media_type = %source.media_type,
            byte_size = source.byte_size(),
            "dispatching upscale request"
        );

        let reply = self.collaborator.generate(&request).await?;
        let image = extract_first_inline_image(&reply).ok_or(UpscaleError::NoUsableImage)?;
        info!(
            request_id = %request_id,
            media_type = %image.media_type,
            "upscale settled with an image payload"
        );
        Ok(image)
    }
}

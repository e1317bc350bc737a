use thiserror::Error;

use crate::pipeline::validation::{validate_source_candidate, SourceRejection};
use crate::pipeline::{EnhancementMode, SourceImage, UpscaledImage};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SessionPhase {
    #[default]
    Idle,
    Validating,
    InFlight,
    Succeeded,
    Failed,
}

impl SessionPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::InFlight => "in_flight",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionEventError {
    #[error("An upscale request is already in flight.")]
    InFlight,
    #[error(transparent)]
    Rejected(#[from] SourceRejection),
}

/// The visible state machine of the upscale lifecycle. UI-driven mutations
/// (file selection, mode change) are explicit events here rather than ambient
/// shared variables, so every transition is unit-testable.
///
/// Holds exactly one optional source image, one mode, and at most one result
/// or failure message. Settlement is terminal for an invocation; only a new
/// selection or a new trigger moves the machine again.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct UpscaleSession {
    phase: SessionPhase,
    source: Option<SourceImage>,
    mode: EnhancementMode,
    result: Option<UpscaledImage>,
    failure: Option<String>,
}

impl UpscaleSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn source(&self) -> Option<&SourceImage> {
        self.source.as_ref()
    }

    pub fn mode(&self) -> EnhancementMode {
        self.mode
    }

    pub fn result(&self) -> Option<&UpscaledImage> {
        self.result.as_ref()
    }

    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    /// Validates and installs a new source image. Acceptance replaces the
    /// current image wholesale and invalidates any prior outcome; rejection
    /// leaves the session exactly as it was.
    pub fn select_source(&mut self, candidate: SourceImage) -> Result<(), SessionEventError> {
        if self.phase == SessionPhase::InFlight {
            return Err(SessionEventError::InFlight);
        }
        let prior_phase = self.phase;
        self.phase = SessionPhase::Validating;
        match validate_source_candidate(candidate.media_type.as_str(), candidate.byte_size()) {
            Ok(()) => {
                self.source = Some(candidate);
                self.result = None;
                self.failure = None;
                self.phase = SessionPhase::Idle;
                Ok(())
            }
            Err(rejection) => {
                self.phase = prior_phase;
                Err(SessionEventError::Rejected(rejection))
            }
        }
    }

    /// Mode is user-settable between requests, immutable while one is in
    /// flight.
    pub fn set_mode(&mut self, mode: EnhancementMode) -> Result<(), SessionEventError> {
        if self.phase == SessionPhase::InFlight {
            return Err(SessionEventError::InFlight);
        }
        self.mode = mode;
        Ok(())
    }

    /// Orchestrator transition: a request has been admitted. Clears any
    /// previous outcome so the UI never shows a stale result next to an
    /// in-flight spinner.
    pub fn begin_flight(&mut self) {
        self.result = None;
        self.failure = None;
        self.phase = SessionPhase::InFlight;
    }

    pub fn settle_success(&mut self, image: UpscaledImage) {
        self.result = Some(image);
        self.failure = None;
        self.phase = SessionPhase::Succeeded;
    }

    /// Any failure is terminal for the invocation: the message replaces the
    /// previously displayed image, while the selected source stays put so the
    /// user can simply re-trigger.
    pub fn settle_failure(&mut self, message: impl Into<String>) {
        self.result = None;
        self.failure = Some(message.into());
        self.phase = SessionPhase::Failed;
    }
}

use crate::pipeline::EnhancementMode;

/// A fully assembled collaborator call. Constructed fresh per invocation and
/// never reused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpscaleRequest {
    /// Base64 image payload, no data-URL prefix.
    pub encoded_image: String,
    pub media_type: String,
    pub instruction: String,
    /// Restricts the collaborator's response to image-bearing content.
    pub image_only: bool,
}

/// Fixed instruction wording; the only variable part is the resolution
/// literal, so the same inputs always produce the same request.
pub fn build_instruction(mode: EnhancementMode) -> String {
    format!(
        "Upscale this image to {} resolution. Keep the result photorealistic and \
         faithful to the original; do not invent synthetic textures or painterly \
         artifacts. Increase sharpness and recover fine detail.",
        mode.resolution_literal()
    )
}

pub fn build_upscale_request(
    encoded_image: String,
    media_type: String,
    mode: EnhancementMode,
) -> UpscaleRequest {
    UpscaleRequest {
        encoded_image,
        media_type,
        instruction: build_instruction(mode),
        image_only: true,
    }
}

pub mod collaborator;
pub mod encoding;
pub mod interpret;
pub mod orchestrator;
pub mod request;
pub mod session;
pub mod validation;

/// Hard ceiling on accepted uploads (10 MiB).
pub const MAX_SOURCE_IMAGE_BYTES: u64 = 10 * 1024 * 1024;

/// Target resolution tier the user picks for an enhancement request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnhancementMode {
    #[default]
    TwoK,
    FourK,
}

impl EnhancementMode {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::TwoK => "2k",
            Self::FourK => "4k",
        }
    }

    /// The literal resolution string embedded in the enhancement instruction.
    pub fn resolution_literal(self) -> &'static str {
        match self {
            Self::TwoK => "2560x1440",
            Self::FourK => "3840x2160",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "2k" => Some(Self::TwoK),
            "4k" => Some(Self::FourK),
            _ => None,
        }
    }
}

/// The user-supplied file as held by the current session. Replaced wholesale
/// on each accepted selection; no other component retains a copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImage {
    pub file_name: Option<String>,
    pub media_type: String,
    pub bytes: Vec<u8>,
}

impl SourceImage {
    pub fn byte_size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// A successful enhancement result: base64 payload (no data-URL prefix) plus
/// the media type the image service declared for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UpscaledImage {
    pub media_type: String,
    pub data: String,
}

impl UpscaledImage {
    /// Renderable form for the UI layer.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }

    /// Attachment name for the download surface.
    pub fn download_file_name(&self, source_name: Option<&str>) -> String {
        let base = source_name
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .unwrap_or("image");
        format!("obatech-upscaled-{base}")
    }
}

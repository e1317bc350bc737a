use crate::pipeline::collaborator::GenerateContentReply;
use crate::pipeline::UpscaledImage;

/// Media type assumed when the image service omits one on an inline payload.
pub const FALLBACK_IMAGE_MEDIA_TYPE: &str = "image/png";

/// Extracts the image payload from a reply, or `None` when the reply carries
/// no usable image.
///
/// Only the first part of the first candidate is consulted. The service
/// contract returns at most one usable part in practice, so this is a
/// deliberate policy; do not broaden it into a scan of later parts or
/// candidates without flagging the behavior change.
pub fn extract_first_inline_image(reply: &GenerateContentReply) -> Option<UpscaledImage> {
    let inline = reply
        .candidates
        .first()?
        .content
        .as_ref()?
        .parts
        .first()?
        .inline_data
        .as_ref()?;

    Some(UpscaledImage {
        media_type: inline
            .mime_type
            .clone()
            .unwrap_or_else(|| String::from(FALLBACK_IMAGE_MEDIA_TYPE)),
        data: inline.data.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::collaborator::{
        InlineImageData, ReplyCandidate, ReplyContent, ReplyPart,
    };

    fn inline_part(data: &str, mime_type: Option<&str>) -> ReplyPart {
        ReplyPart {
            text: None,
            inline_data: Some(InlineImageData {
                mime_type: mime_type.map(String::from),
                data: String::from(data),
            }),
        }
    }

    fn text_part(text: &str) -> ReplyPart {
        ReplyPart {
            text: Some(String::from(text)),
            inline_data: None,
        }
    }

    fn reply_with_parts(parts: Vec<ReplyPart>) -> GenerateContentReply {
        GenerateContentReply {
            candidates: vec![ReplyCandidate {
                content: Some(ReplyContent { parts }),
            }],
        }
    }

    #[test]
    fn extracts_inline_image_with_declared_media_type() {
        let reply = reply_with_parts(vec![inline_part("abc123", Some("image/jpeg"))]);
        let image = extract_first_inline_image(&reply).expect("image should be extracted");
        assert_eq!(image.data, "abc123");
        assert_eq!(image.media_type, "image/jpeg");
    }

    #[test]
    fn missing_media_type_defaults_to_png() {
        let reply = reply_with_parts(vec![inline_part("abc123", None)]);
        let image = extract_first_inline_image(&reply).expect("image should be extracted");
        assert_eq!(image.media_type, "image/png");
    }

    #[test]
    fn text_only_first_part_is_not_an_image() {
        let reply = reply_with_parts(vec![text_part("sorry, words only")]);
        assert_eq!(extract_first_inline_image(&reply), None);
    }

    #[test]
    fn empty_reply_shapes_yield_no_image() {
        assert_eq!(
            extract_first_inline_image(&GenerateContentReply::default()),
            None
        );
        assert_eq!(
            extract_first_inline_image(&GenerateContentReply {
                candidates: vec![ReplyCandidate { content: None }],
            }),
            None
        );
        assert_eq!(
            extract_first_inline_image(&reply_with_parts(Vec::new())),
            None
        );
    }

    #[test]
    fn only_the_first_part_of_the_first_candidate_is_consulted() {
        // An image in a later part or candidate is ignored on purpose.
        let reply = GenerateContentReply {
            candidates: vec![
                ReplyCandidate {
                    content: Some(ReplyContent {
                        parts: vec![
                            text_part("preamble"),
                            inline_part("later-part", Some("image/png")),
                        ],
                    }),
                },
                ReplyCandidate {
                    content: Some(ReplyContent {
                        parts: vec![inline_part("second-candidate", Some("image/png"))],
                    }),
                },
            ],
        };
        assert_eq!(extract_first_inline_image(&reply), None);
    }
}

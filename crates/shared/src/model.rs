//! Core data types shared between the UI and the analysis provider.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A user-placed point label on an image.
///
/// Coordinates are integer pixel offsets from the top-left of the image as it
/// was displayed when the user clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub x: i32,
    pub y: i32,
    /// Trimmed, never empty once stored.
    pub name: String,
}

impl Tag {
    pub fn new(x: i32, y: i32, name: impl Into<String>) -> Self {
        Self {
            x,
            y,
            name: name.into(),
        }
    }
}

/// An uploaded photo: raw bytes, the base64 payload sent to the model, and the
/// tags placed on it, in tagging order.
#[derive(Debug, Clone)]
pub struct TaggedImage {
    /// Generated unique id; never reused within a session.
    pub id: String,
    /// Original file name, for display only.
    pub file_name: String,
    /// Mime type guessed from the file extension, e.g. "image/png".
    pub mime_type: String,
    /// Raw file bytes, used for on-screen decoding.
    pub bytes: Vec<u8>,
    /// Base64 encoding of `bytes`.
    pub encoded_data: String,
    pub tags: Vec<Tag>,
}

impl TaggedImage {
    pub fn new(
        file_name: impl Into<String>,
        mime_type: impl Into<String>,
        bytes: Vec<u8>,
        encoded_data: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            file_name: file_name.into(),
            mime_type: mime_type.into(),
            bytes,
            encoded_data,
            tags: Vec::new(),
        }
    }
}

/// One image payload as sent to the analysis service. The list of parts is
/// index-aligned with the "Image N" sections of the prompt text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePart {
    pub mime_type: String,
    pub data: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_image_has_unique_id_and_no_tags() {
        let a = TaggedImage::new("a.png", "image/png", vec![1, 2], "AQI=".to_string());
        let b = TaggedImage::new("a.png", "image/png", vec![1, 2], "AQI=".to_string());
        assert_ne!(a.id, b.id);
        assert!(a.tags.is_empty());
    }
}

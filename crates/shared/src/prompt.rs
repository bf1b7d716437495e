//! Prompt assembly for the body language analysis request.
//!
//! Pure functions: given the user's free-text context and the uploaded images,
//! produce the prompt text plus an index-aligned list of image payloads. The
//! wording is part of the contract with the model and must stay stable.

use crate::model::{ImagePart, TaggedImage};

/// System-level instruction sent with every analysis request.
pub const SYSTEM_INSTRUCTION: &str = "You are an expert in non-verbal communication, psychology, and body language. Your task is to provide an expert-level analysis of the body language displayed in the provided image(s).
- Analyze posture, gestures, facial expressions, eye contact, and proxemics (use of space).
- If people are tagged with names, refer to them by name in your analysis.
- If context is provided, incorporate it into your analysis to understand the relationships and situation.
- Structure your analysis clearly. Start with an overall summary, then provide detailed observations for each person or interaction.
- Conclude with your interpretation of the overall emotional tone and dynamics of the scene.
- Your response must be in Markdown format.";

/// Assembled request content: prompt text plus the image payloads it refers
/// to. `image_parts[i]` corresponds to the "Image i+1" section of `text`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnalysisPrompt {
    pub text: String,
    pub image_parts: Vec<ImagePart>,
}

/// Serialize the user's context and all tagged images into one prompt.
///
/// Deterministic: identical inputs yield byte-identical output. Inputs are
/// never mutated.
pub fn build_analysis_prompt(context: &str, images: &[TaggedImage]) -> AnalysisPrompt {
    let mut text = String::from("Please analyze the following image(s).\n\n");

    if !context.is_empty() {
        text.push_str(&format!("Context from the user: \"{}\"\n\n", context));
    }

    for (index, image) in images.iter().enumerate() {
        text.push_str(&format!("--- Image {} ---\n", index + 1));
        if image.tags.is_empty() {
            text.push_str("No people were tagged in this image.\n");
        } else {
            text.push_str("The following people are tagged in this image:\n");
            for tag in &image.tags {
                text.push_str(&format!(
                    "- '{}' is located at approximate coordinates (x: {}, y: {}).\n",
                    tag.name, tag.x, tag.y
                ));
            }
        }
        text.push('\n');
    }

    let image_parts = images
        .iter()
        .map(|image| ImagePart {
            mime_type: image.mime_type.clone(),
            data: image.encoded_data.clone(),
        })
        .collect();

    AnalysisPrompt { text, image_parts }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Tag, TaggedImage};

    fn image(name: &str, mime: &str, data: &str) -> TaggedImage {
        TaggedImage::new(name, mime, vec![0], data.to_string())
    }

    #[test]
    fn test_context_and_tags_serialized_in_order() {
        let mut first = image("a.jpg", "image/jpeg", "AAAA");
        first.tags.push(Tag::new(10, 20, "Alice"));
        let second = image("b.png", "image/png", "BBBB");

        let prompt = build_analysis_prompt("meeting", &[first, second]);

        assert!(prompt.text.starts_with("Please analyze the following image(s).\n\n"));
        assert!(prompt
            .text
            .contains("Context from the user: \"meeting\"\n\n"));

        let image1 = prompt.text.find("--- Image 1 ---").unwrap();
        let image2 = prompt.text.find("--- Image 2 ---").unwrap();
        assert!(image1 < image2);
        assert!(prompt
            .text
            .contains("- 'Alice' is located at approximate coordinates (x: 10, y: 20).\n"));
        assert!(prompt.text[image2..].contains("No people were tagged in this image.\n"));

        // Parts are index-aligned with the numbered sections.
        assert_eq!(prompt.image_parts.len(), 2);
        assert_eq!(prompt.image_parts[0].mime_type, "image/jpeg");
        assert_eq!(prompt.image_parts[0].data, "AAAA");
        assert_eq!(prompt.image_parts[1].mime_type, "image/png");
        assert_eq!(prompt.image_parts[1].data, "BBBB");
    }

    #[test]
    fn test_empty_context_is_omitted() {
        let prompt = build_analysis_prompt("", &[image("a.png", "image/png", "AAAA")]);
        assert!(!prompt.text.contains("Context from the user"));
    }

    #[test]
    fn test_tag_order_is_preserved() {
        let mut img = image("a.png", "image/png", "AAAA");
        img.tags.push(Tag::new(1, 1, "Bob"));
        img.tags.push(Tag::new(2, 2, "Alice"));

        let prompt = build_analysis_prompt("", &[img]);
        let bob = prompt.text.find("'Bob'").unwrap();
        let alice = prompt.text.find("'Alice'").unwrap();
        assert!(bob < alice);
    }

    #[test]
    fn test_builder_is_deterministic() {
        let mut img = image("a.png", "image/png", "AAAA");
        img.tags.push(Tag::new(7, 9, "Alice"));
        let images = vec![img, image("b.png", "image/png", "BBBB")];

        let first = build_analysis_prompt("dinner party", &images);
        let second = build_analysis_prompt("dinner party", &images);
        assert_eq!(first, second);
    }

    #[test]
    fn test_no_images_yields_preamble_only() {
        let prompt = build_analysis_prompt("", &[]);
        assert_eq!(prompt.text, "Please analyze the following image(s).\n\n");
        assert!(prompt.image_parts.is_empty());
    }
}

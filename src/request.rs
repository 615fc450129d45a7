use serde::Serialize;

use crate::config::InferenceConfig;
use crate::image::EncodedImage;

/// Instruction sent alongside every board photo.
///
/// Models do not reliably follow it; the grid extractor tolerates the usual violations.
pub const OCR_INSTRUCTION: &str = "TASK: OCR. Extract the letters from the N x N Boggle board in the image.\n\
Read the board row by row, each row from left to right.\n\
Reply with valid JSON only: a 2D array (list of lists) with one inner list per row and one string per cell.\n\
Do not add sentences, descriptions or markdown code fences.\n\
A cell showing 'Qu' is a single cell: write it as \"Qu\", never as two cells.\n\
Example: [[\"A\", \"B\", \"C\", \"D\"], [\"S\", \"Qu\", \"V\", \"A\"], [\"E\", \"T\", \"O\", \"N\"], [\"R\", \"I\", \"L\", \"M\"]]\n\
Output ONLY the JSON.";

/// Chat-completions request body for one board photo.
#[derive(Debug, Clone, Serialize)]
pub struct OcrRequest {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub messages: Vec<ChatMessage>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: Vec<ContentPart>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Clone, Serialize)]
pub struct ImageUrl {
    pub url: String,
}

/// Builds deterministic, zero-temperature OCR requests.
#[derive(Debug, Clone)]
pub struct OcrRequestBuilder {
    model: String,
    max_tokens: u32,
}

impl OcrRequestBuilder {
    pub fn new(model: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            model: model.into(),
            max_tokens,
        }
    }

    pub fn from_config(config: &InferenceConfig) -> Self {
        Self::new(config.model.clone(), config.max_tokens)
    }

    pub fn build(&self, image: &EncodedImage) -> OcrRequest {
        OcrRequest {
            model: self.model.clone(),
            temperature: 0.0,
            max_tokens: self.max_tokens,
            messages: vec![ChatMessage {
                role: "user",
                content: vec![
                    ContentPart::Text {
                        text: OCR_INSTRUCTION.to_string(),
                    },
                    ContentPart::ImageUrl {
                        image_url: ImageUrl {
                            url: image.data_uri(),
                        },
                    },
                ],
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::RawImage;
    use serde_json::json;

    #[test]
    fn serializes_to_chat_completions_body() {
        let image = RawImage::new(b"png".to_vec(), None).encode().unwrap();
        let request = OcrRequestBuilder::new("local-model", 256).build(&image);

        let body = serde_json::to_value(&request).unwrap();
        assert_eq!(
            body,
            json!({
                "model": "local-model",
                "temperature": 0.0,
                "max_tokens": 256,
                "messages": [{
                    "role": "user",
                    "content": [
                        { "type": "text", "text": OCR_INSTRUCTION },
                        { "type": "image_url", "image_url": { "url": "data:image/png;base64,cG5n" } },
                    ],
                }],
            })
        );
    }

    #[test]
    fn instruction_covers_reading_order_json_and_digraph() {
        assert!(OCR_INSTRUCTION.contains("row by row"));
        assert!(OCR_INSTRUCTION.contains("left to right"));
        assert!(OCR_INSTRUCTION.contains("valid JSON only"));
        assert!(OCR_INSTRUCTION.contains("\"Qu\""));
        assert!(OCR_INSTRUCTION.contains("Example:"));
    }
}

use std::time::{Duration, Instant};

use crate::board::CanonicalBoard;
use crate::config::InferenceConfig;
use crate::error::ExtractError;
use crate::grid::{LetterGrid, extract_grid};
use crate::image::RawImage;
use crate::model::{HttpOcrModel, OcrModel};
use crate::request::OcrRequestBuilder;

/// Outcome of one board extraction, with the model round-trip telemetry.
#[derive(Debug, Clone)]
pub struct BoardExtraction {
    /// Canonical board string handed back to the caller.
    pub board: CanonicalBoard,
    /// Grid as read by the model, before canonicalization.
    pub grid: LetterGrid,
    /// Timestamp when the inference call started.
    pub start_time: Instant,
    /// Time spent waiting on the model.
    pub duration: Duration,
}

/// Turns board photos into [`CanonicalBoard`]s using an [`OcrModel`].
///
/// The engine holds no per-request state: concurrent extractions share it read-only
/// and each one runs to completion on its own. Failures are never retried.
pub struct BoardEngine<M: OcrModel> {
    model: M,
    requests: OcrRequestBuilder,
}

impl BoardEngine<HttpOcrModel> {
    /// Creates an engine talking to the configured chat-completions endpoint.
    pub fn from_config(config: &InferenceConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::new(
            HttpOcrModel::new(config)?,
            OcrRequestBuilder::from_config(config),
        ))
    }
}

impl<M: OcrModel> BoardEngine<M> {
    pub fn new(model: M, requests: OcrRequestBuilder) -> Self {
        Self { model, requests }
    }

    pub fn model(&self) -> &M {
        &self.model
    }

    /// Runs the full pipeline: encode, prompt the model, decode its reply, canonicalize.
    pub async fn extract(&self, image: &RawImage) -> Result<BoardExtraction, ExtractError> {
        let encoded = image.encode()?;
        let request = self.requests.build(&encoded);

        log::debug!(
            "Scheduling OCR inference for a {} byte {} image",
            image.len(),
            image.media_type()
        );
        let start_time = Instant::now();
        let reply = self.model.run(&request).await?;
        let duration = start_time.elapsed();
        log::debug!("Inference completed in {duration:?}");

        let grid = extract_grid(&reply).inspect_err(|err| match err {
            ExtractError::ModelOutputNotJson { raw, source } => {
                log::warn!("Model reply is not JSON ({source}). Raw reply: {raw}");
            }
            ExtractError::MalformedGrid { reason } => {
                log::warn!("Model reply is not a letter grid ({reason}). Raw reply: {reply}");
            }
            _ => log::warn!("Unusable model reply: {err}"),
        })?;

        let board = CanonicalBoard::from_grid(&grid);
        log::info!(
            "Extracted {}x{} board: {board}",
            grid.row_count(),
            grid.column_count()
        );

        Ok(BoardExtraction {
            board,
            grid,
            start_time,
            duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::request::OcrRequest;
    use std::sync::Mutex;

    /// Replies with a canned result and remembers the last request it saw.
    struct CannedModel {
        reply: Result<String, u16>,
        seen: Mutex<Option<serde_json::Value>>,
    }

    impl CannedModel {
        fn replying(reply: &str) -> Self {
            Self {
                reply: Ok(reply.to_string()),
                seen: Mutex::new(None),
            }
        }

        fn failing(status: u16) -> Self {
            Self {
                reply: Err(status),
                seen: Mutex::new(None),
            }
        }
    }

    impl OcrModel for CannedModel {
        async fn run(&self, request: &OcrRequest) -> Result<String, ExtractError> {
            *self.seen.lock().unwrap() = Some(serde_json::to_value(request).unwrap());
            self.reply
                .clone()
                .map_err(ExtractError::upstream_status_failure)
        }
    }

    fn engine(model: CannedModel) -> BoardEngine<CannedModel> {
        BoardEngine::new(model, OcrRequestBuilder::new("test-model", 128))
    }

    fn photo() -> RawImage {
        RawImage::new(b"fake jpeg bytes".to_vec(), Some("image/jpeg"))
    }

    #[tokio::test]
    async fn extracts_canonical_board_from_reply() {
        let engine = engine(CannedModel::replying(
            r#"[["a","b","c","d"],["e","Qu","g","h"],["i","j","k","l"],["m","n","o","p"]]"#,
        ));

        let extraction = engine.extract(&photo()).await.unwrap();
        assert_eq!(extraction.board.as_str(), "abcd eqgh ijkl mnop");
        assert_eq!(extraction.grid.row_count(), 4);
        assert_eq!(extraction.grid.rows()[1][1], "Qu");
    }

    #[tokio::test]
    async fn records_inference_timing() {
        let engine = engine(CannedModel::replying(r#"[["a","b"],["c","d"]]"#));

        let extraction = engine.extract(&photo()).await.unwrap();
        assert!(extraction.duration <= extraction.start_time.elapsed());
        assert_eq!(extraction.grid.column_count(), 2);
    }

    #[tokio::test]
    async fn sends_zero_temperature_request_with_image() {
        let engine = engine(CannedModel::replying(r#"[["a"]]"#));
        engine.extract(&photo()).await.unwrap();

        let seen = engine.model().seen.lock().unwrap().clone().unwrap();
        assert_eq!(seen["model"], "test-model");
        assert_eq!(seen["temperature"], 0.0);
        assert_eq!(seen["max_tokens"], 128);
        let url = seen["messages"][0]["content"][1]["image_url"]["url"]
            .as_str()
            .unwrap();
        assert!(url.starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn empty_upload_never_reaches_the_model() {
        let engine = engine(CannedModel::replying(r#"[["a"]]"#));
        let err = engine
            .extract(&RawImage::new(Vec::new(), None))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), "invalid_image");
        assert!(engine.model().seen.lock().unwrap().is_none());
    }

    #[tokio::test]
    async fn surfaces_each_failure_kind() {
        let cases = [
            (CannedModel::replying("  "), "empty_model_output"),
            (
                CannedModel::replying("Sure! Here's the board: ..."),
                "model_output_not_json",
            ),
            (CannedModel::replying(r#"[["A","B"],["C"]]"#), "malformed_grid"),
            (CannedModel::failing(500), "inference_request_failed"),
        ];

        for (model, kind) in cases {
            let err = engine(model).extract(&photo()).await.unwrap_err();
            assert_eq!(err.kind(), kind);
        }
    }
}

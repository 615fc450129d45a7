use thiserror::Error;

/// Failures of the image-to-board extraction pipeline.
///
/// Every stage has its own variant so a failed request can be diagnosed from the
/// kind alone.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("invalid image: {reason}")]
    InvalidImage { reason: String },

    #[error("inference service at {endpoint} is unavailable: {message}")]
    InferenceServiceUnavailable { endpoint: String, message: String },

    /// `status` is absent when the request could not be sent at all (bad endpoint URL).
    #[error("inference request failed: {reason}")]
    InferenceRequestFailed { status: Option<u16>, reason: String },

    #[error("inference response malformed: {reason}")]
    InferenceResponseMalformed { reason: String },

    #[error("model returned an empty reply")]
    EmptyModelOutput,

    /// The raw reply is kept for server-side diagnostics and left out of `Display`.
    #[error("model returned invalid JSON: {source}")]
    ModelOutputNotJson {
        raw: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("malformed grid: {reason}")]
    MalformedGrid { reason: String },
}

impl ExtractError {
    pub(crate) fn invalid_image(reason: impl Into<String>) -> Self {
        Self::InvalidImage {
            reason: reason.into(),
        }
    }

    pub(crate) fn malformed_response(reason: impl Into<String>) -> Self {
        Self::InferenceResponseMalformed {
            reason: reason.into(),
        }
    }

    pub(crate) fn upstream_status_failure(status: u16) -> Self {
        Self::InferenceRequestFailed {
            status: Some(status),
            reason: format!("upstream status {status}"),
        }
    }

    pub(crate) fn malformed_grid(reason: impl Into<String>) -> Self {
        Self::MalformedGrid {
            reason: reason.into(),
        }
    }

    /// Stable identifier of the failure, used as the `error` field of HTTP responses.
    pub fn kind(&self) -> &'static str {
        match self {
            ExtractError::InvalidImage { .. } => "invalid_image",
            ExtractError::InferenceServiceUnavailable { .. } => "inference_service_unavailable",
            ExtractError::InferenceRequestFailed { .. } => "inference_request_failed",
            ExtractError::InferenceResponseMalformed { .. } => "inference_response_malformed",
            ExtractError::EmptyModelOutput => "empty_model_output",
            ExtractError::ModelOutputNotJson { .. } => "model_output_not_json",
            ExtractError::MalformedGrid { .. } => "malformed_grid",
        }
    }

    /// The status returned by the inference endpoint, if the failure carries one.
    pub fn upstream_status(&self) -> Option<u16> {
        match self {
            ExtractError::InferenceRequestFailed { status, .. } => *status,
            _ => None,
        }
    }
}

#[derive(Debug, Error)]
pub enum SolveError {
    #[error("invalid board: {reason}")]
    InvalidBoard { reason: String },

    #[error("failed to load dictionary {path}: {source}")]
    Dictionary {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl SolveError {
    pub fn kind(&self) -> &'static str {
        match self {
            SolveError::InvalidBoard { .. } => "invalid_board",
            SolveError::Dictionary { .. } => "dictionary_unavailable",
        }
    }

    pub(crate) fn invalid_board(reason: impl Into<String>) -> Self {
        Self::InvalidBoard {
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_json_display_omits_raw_reply() {
        let source = serde_json::from_str::<serde_json::Value>("Sure!").unwrap_err();
        let err = ExtractError::ModelOutputNotJson {
            raw: "Sure! Here's the board".to_string(),
            source,
        };
        assert_eq!(err.kind(), "model_output_not_json");
        assert!(!err.to_string().contains("Here's the board"));
    }

    #[test]
    fn only_request_failures_carry_upstream_status() {
        assert_eq!(
            ExtractError::upstream_status_failure(500).upstream_status(),
            Some(500)
        );
        let unsent = ExtractError::InferenceRequestFailed {
            status: None,
            reason: "builder error".to_string(),
        };
        assert_eq!(unsent.kind(), "inference_request_failed");
        assert_eq!(unsent.upstream_status(), None);
        assert_eq!(ExtractError::EmptyModelOutput.upstream_status(), None);
    }

    #[test]
    fn solve_errors_have_stable_kinds() {
        assert_eq!(SolveError::invalid_board("ragged").kind(), "invalid_board");
        let missing = SolveError::Dictionary {
            path: "words.txt".to_string(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(missing.kind(), "dictionary_unavailable");
    }
}

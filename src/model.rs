use serde::Deserialize;

use crate::config::InferenceConfig;
use crate::error::ExtractError;
use crate::request::OcrRequest;

/// A vision model able to answer an [`OcrRequest`] with free text.
///
/// Implement this trait to plug a different backend (or a fake, in tests) into
/// the [`BoardEngine`](crate::BoardEngine).
pub trait OcrModel: Send + Sync {
    /// Runs the request and returns the text content of the first generated message.
    fn run(
        &self,
        request: &OcrRequest,
    ) -> impl Future<Output = Result<String, ExtractError>> + Send;
}

/// OCR model served by an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct HttpOcrModel {
    http: reqwest::Client,
    endpoint: String,
}

impl HttpOcrModel {
    /// Creates a client for the configured endpoint; `config.timeout` bounds every call.
    pub fn new(config: &InferenceConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self {
            http,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, err: reqwest::Error) -> ExtractError {
        // timeouts surface wrapped as body/decode errors once headers have arrived
        if err.is_timeout() || err.is_connect() {
            return ExtractError::InferenceServiceUnavailable {
                endpoint: self.endpoint.clone(),
                message: err.to_string(),
            };
        }
        if err.is_builder() || err.is_redirect() {
            log::error!("Cannot send OCR request to {}: {err}", self.endpoint);
            return ExtractError::InferenceRequestFailed {
                status: None,
                reason: err.to_string(),
            };
        }
        if err.is_decode() || err.is_body() {
            return ExtractError::malformed_response(err.to_string());
        }
        ExtractError::InferenceServiceUnavailable {
            endpoint: self.endpoint.clone(),
            message: err.to_string(),
        }
    }
}

impl OcrModel for HttpOcrModel {
    async fn run(&self, request: &OcrRequest) -> Result<String, ExtractError> {
        log::debug!("Sending OCR request to {}", self.endpoint);

        let response = self
            .http
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            log::warn!("Inference endpoint answered with status {status}");
            return Err(ExtractError::upstream_status_failure(status.as_u16()));
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        reply_content(&body)
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: Option<ChoiceMessage>,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

/// Pulls `choices[0].message.content` out of a chat-completions response body.
pub(crate) fn reply_content(body: &str) -> Result<String, ExtractError> {
    let completion: ChatCompletion = serde_json::from_str(body)
        .map_err(|e| ExtractError::malformed_response(format!("response is not JSON: {e}")))?;

    completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ExtractError::malformed_response("response has no choices"))?
        .message
        .and_then(|message| message.content)
        .ok_or_else(|| ExtractError::malformed_response("first choice has no message content"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::RawImage;
    use crate::request::OcrRequestBuilder;

    #[test]
    fn extracts_first_choice_content() {
        let body = r#"{"id":"x","choices":[{"message":{"role":"assistant","content":"[[\"a\"]]"}},{"message":{"content":"ignored"}}]}"#;
        assert_eq!(reply_content(body).unwrap(), r#"[["a"]]"#);
    }

    #[test]
    fn missing_choices_is_malformed() {
        for body in [r#"{}"#, r#"{"choices":[]}"#, r#"{"choices":[{}]}"#] {
            let err = reply_content(body).unwrap_err();
            assert!(
                matches!(err, ExtractError::InferenceResponseMalformed { .. }),
                "{body}"
            );
        }
    }

    #[test]
    fn null_content_is_malformed() {
        let err = reply_content(r#"{"choices":[{"message":{"content":null}}]}"#).unwrap_err();
        assert_eq!(err.kind(), "inference_response_malformed");
    }

    #[tokio::test]
    async fn invalid_endpoint_is_a_failed_request_not_an_outage() {
        let model = HttpOcrModel::new(&InferenceConfig {
            endpoint: "not a url".to_string(),
            ..Default::default()
        })
        .unwrap();
        let request = OcrRequestBuilder::new("m", 8)
            .build(&RawImage::new(vec![1], None).encode().unwrap());

        let err = model.run(&request).await.unwrap_err();
        assert_eq!(err.kind(), "inference_request_failed");
        assert_eq!(err.upstream_status(), None);
    }

    #[test]
    fn non_json_body_is_malformed() {
        let err = reply_content("<html>bad gateway</html>").unwrap_err();
        assert_eq!(err.kind(), "inference_response_malformed");
    }
}

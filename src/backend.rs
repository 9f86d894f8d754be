use std::error::Error as StdError;
use std::future::Future;

use reqwest::Client;
use serde_json::Value;
use tracing::debug;

use crate::config::BackendSettings;
use crate::errors::RequestError;
use crate::models::{BackendErrorBody, PredictResponse, SoilSample};

/// Anything that can turn a [`SoilSample`] into a predicted crop label.
///
/// Implementations report failures as [`RequestError`]; the deadline is
/// enforced by the caller, which drops the returned future when it expires.
pub trait PredictionBackend: Send + Sync {
    fn predict(
        &self,
        sample: &SoilSample,
    ) -> impl Future<Output = Result<String, RequestError>> + Send;
}

// ==============================================================================
// HTTP PREDICTION CLIENT
// ==============================================================================

pub struct HttpPredictionClient {
    client: Client,
    predict_url: String,
}

impl HttpPredictionClient {
    pub fn new(settings: &BackendSettings) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .connect_timeout(settings.connect_timeout())
            .user_agent(concat!("smartcrop-console/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            predict_url: settings.predict_url(),
        })
    }
}

impl PredictionBackend for HttpPredictionClient {
    async fn predict(&self, sample: &SoilSample) -> Result<String, RequestError> {
        let response = self
            .client
            .post(&self.predict_url)
            .json(sample)
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        debug!(status = status.as_u16(), url = %self.predict_url, "Prediction service responded");

        if !status.is_success() {
            // An unreadable error body is tolerated.
            let body = response.json::<BackendErrorBody>().await.unwrap_or_default();
            let message = body
                .error
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| format!("Request failed ({})", status.as_u16()));
            return Err(RequestError::ServerStatus {
                code: status.as_u16(),
                message,
            });
        }

        let body: PredictResponse = response
            .json()
            .await
            .map_err(|e| RequestError::MalformedResponse(e.to_string()))?;

        crop_label(body)
    }
}

/// Extracts the crop label. Scalars other than strings are rendered as text.
fn crop_label(body: PredictResponse) -> Result<String, RequestError> {
    match body.prediction {
        Some(Value::String(label)) if !label.trim().is_empty() => Ok(label),
        Some(Value::String(_)) => Err(RequestError::MalformedResponse(
            "empty prediction".to_string(),
        )),
        Some(value @ (Value::Number(_) | Value::Bool(_))) => Ok(value.to_string()),
        Some(Value::Null) | None => Err(RequestError::MalformedResponse(
            "missing prediction".to_string(),
        )),
        Some(other) => Err(RequestError::MalformedResponse(format!(
            "prediction is not a scalar: {other}"
        ))),
    }
}

fn transport_error(err: reqwest::Error) -> RequestError {
    let mut message = err.to_string();

    let mut source = err.source();
    let mut root = None;
    while let Some(cause) = source {
        root = Some(cause.to_string());
        source = cause.source();
    }
    if let Some(root) = root.filter(|r| !r.is_empty() && !message.contains(r.as_str())) {
        message = if message.is_empty() {
            root
        } else {
            format!("{message}: {root}")
        };
    }

    RequestError::Transport(transport_message(&message))
}

/// Some transport failures carry no text at all.
fn transport_message(message: &str) -> String {
    if message.trim().is_empty() {
        "network error".to_string()
    } else {
        message.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn body(value: Value) -> PredictResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn string_prediction_is_used_verbatim() {
        let label = crop_label(body(json!({"prediction": "Rice", "confidence": 0.9}))).unwrap();
        assert_eq!(label, "Rice");
    }

    #[test]
    fn numeric_prediction_is_rendered_as_text() {
        assert_eq!(crop_label(body(json!({"prediction": 3}))).unwrap(), "3");
    }

    #[test]
    fn missing_or_structured_prediction_is_malformed() {
        for value in [json!({}), json!({"prediction": null}), json!({"prediction": ["rice"]})] {
            assert!(matches!(
                crop_label(body(value)),
                Err(RequestError::MalformedResponse(_))
            ));
        }
    }

    #[test]
    fn blank_transport_message_falls_back_to_network_error() {
        assert_eq!(transport_message(""), "network error");
        assert_eq!(transport_message("   "), "network error");
        assert_eq!(
            transport_message("error sending request: connection refused"),
            "error sending request: connection refused"
        );
    }
}

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use validator::Validate;

use crate::errors::SubmissionError;

// ==============================================================================
// FORM FIELDS
// ==============================================================================

/// Raw form input, keyed by wire field name. Values are exactly what the user typed.
pub type RawFields = BTreeMap<String, String>;

/// The fixed set of soil and climate parameters the prediction service consumes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Feature {
    #[serde(rename = "N")]
    Nitrogen,
    #[serde(rename = "P")]
    Phosphorus,
    #[serde(rename = "K")]
    Potassium,
    #[serde(rename = "temperature")]
    Temperature,
    #[serde(rename = "humidity")]
    Humidity,
    #[serde(rename = "ph")]
    Ph,
    #[serde(rename = "rainfall")]
    Rainfall,
}

impl Feature {
    /// Field order used for validation, the request body and the form.
    pub const ALL: [Feature; 7] = [
        Feature::Nitrogen,
        Feature::Phosphorus,
        Feature::Potassium,
        Feature::Temperature,
        Feature::Humidity,
        Feature::Ph,
        Feature::Rainfall,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            Feature::Nitrogen => "N",
            Feature::Phosphorus => "P",
            Feature::Potassium => "K",
            Feature::Temperature => "temperature",
            Feature::Humidity => "humidity",
            Feature::Ph => "ph",
            Feature::Rainfall => "rainfall",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Feature::Nitrogen => "Nitrogen (N)",
            Feature::Phosphorus => "Phosphorus (P)",
            Feature::Potassium => "Potassium (K)",
            Feature::Temperature => "Temperature (°C)",
            Feature::Humidity => "Humidity (%)",
            Feature::Ph => "Soil pH",
            Feature::Rainfall => "Rainfall (mm)",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

// ==============================================================================
// REQUEST PAYLOAD
// ==============================================================================

/// Validated payload posted to the prediction service.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Validate)]
pub struct SoilSample {
    #[serde(rename = "N")]
    pub nitrogen: f64,
    #[serde(rename = "P")]
    pub phosphorus: f64,
    #[serde(rename = "K")]
    pub potassium: f64,
    pub temperature: f64,
    pub humidity: f64,
    #[validate(range(min = 0.0, max = 14.0, message = "Soil pH must be between 0 and 14"))]
    pub ph: f64,
    pub rainfall: f64,
}

impl SoilSample {
    pub fn value(&self, feature: Feature) -> f64 {
        match feature {
            Feature::Nitrogen => self.nitrogen,
            Feature::Phosphorus => self.phosphorus,
            Feature::Potassium => self.potassium,
            Feature::Temperature => self.temperature,
            Feature::Humidity => self.humidity,
            Feature::Ph => self.ph,
            Feature::Rainfall => self.rainfall,
        }
    }
}

// ==============================================================================
// PREDICTION SERVICE WIRE TYPES
// ==============================================================================

/// Success body of `POST /predict`. Auxiliary keys are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictResponse {
    #[serde(default)]
    pub prediction: Option<serde_json::Value>,
}

/// Optional error body of a non-2xx `POST /predict`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BackendErrorBody {
    #[serde(default)]
    pub error: Option<String>,
}

// ==============================================================================
// CROP METADATA
// ==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CropMetadata {
    pub category: &'static str,
    pub season: &'static str,
    pub water: &'static str,
    pub glyph: &'static str,
}

/// Whether the metadata came from the catalog or is the stand-in for an unlisted crop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MetadataSource {
    Catalog,
    Placeholder,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionResult {
    pub crop: String,
    pub metadata: CropMetadata,
    pub metadata_source: MetadataSource,
}

// ==============================================================================
// SUBMISSION STATE
// ==============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", content = "detail", rename_all = "snake_case")]
pub enum SubmissionState {
    Idle,
    Validating,
    Pending,
    Succeeded(PredictionResult),
    Failed(SubmissionError),
}

/// The controller's state plus the submission it belongs to.
#[derive(Debug, Clone, Serialize)]
pub struct StateSnapshot {
    pub submission_id: u64,
    pub state: SubmissionState,
    /// Raw values of the submission that produced this state; empty after reset.
    pub fields: RawFields,
    pub updated_at: DateTime<Utc>,
}

impl StateSnapshot {
    pub fn idle(submission_id: u64) -> Self {
        Self {
            submission_id,
            state: SubmissionState::Idle,
            fields: RawFields::new(),
            updated_at: Utc::now(),
        }
    }
}

// ==============================================================================
// API RESPONSE WRAPPER
// ==============================================================================

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
        }
    }

    pub fn success_with_message(data: T, message: &str) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: Some(message.to_string()),
        }
    }
}

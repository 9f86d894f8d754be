//! SmartCrop Console: collects soil and climate readings, asks an external
//! prediction service for a crop recommendation and renders the answer.

pub mod backend;
pub mod config;
pub mod crops;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod render;
pub mod services;
pub mod validation;

pub use backend::{HttpPredictionClient, PredictionBackend};
pub use errors::{RequestError, SubmissionError, ValidationError};
pub use models::{Feature, PredictionResult, RawFields, SoilSample, StateSnapshot, SubmissionState};
pub use services::SubmissionController;

use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::backend::PredictionBackend;
use crate::crops;
use crate::errors::{RequestError, SubmissionError};
use crate::models::{PredictionResult, RawFields, StateSnapshot, SubmissionState};
use crate::validation;

/// Default deadline for one prediction request.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(15);

// ==============================================================================
// SUBMISSION CONTROLLER
// ==============================================================================

/// Drives form submissions against a [`PredictionBackend`] and owns the one
/// [`SubmissionState`] of the console.
///
/// Every `submit` and `reset` takes a new submission id. A state change is
/// only applied while its id is still the current one, so a response that
/// arrives after a newer submit or a reset is dropped.
pub struct SubmissionController<B> {
    backend: B,
    deadline: Duration,
    state: watch::Sender<StateSnapshot>,
}

impl<B: PredictionBackend> SubmissionController<B> {
    pub fn new(backend: B, deadline: Duration) -> Self {
        let (state, _) = watch::channel(StateSnapshot::idle(0));
        Self {
            backend,
            deadline,
            state,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn deadline(&self) -> Duration {
        self.deadline
    }

    pub fn snapshot(&self) -> StateSnapshot {
        self.state.borrow().clone()
    }

    /// Observe state transitions as they are applied.
    pub fn subscribe(&self) -> watch::Receiver<StateSnapshot> {
        self.state.subscribe()
    }

    /// Validates `raw`, sends one prediction request bounded by the deadline
    /// and records the outcome.
    ///
    /// The outcome is returned to the caller even when a newer submission has
    /// since taken over the state.
    pub async fn submit(&self, raw: RawFields) -> Result<PredictionResult, SubmissionError> {
        let id = self.begin(raw.clone());

        let sample = match validation::parse_sample(&raw) {
            Ok(sample) => sample,
            Err(e) => {
                let err = SubmissionError::from(e);
                warn!(submission_id = id, error = %err, "Submission rejected by validation");
                self.settle(id, SubmissionState::Failed(err.clone()));
                return Err(err);
            }
        };

        for advisory in validation::advisories(&sample) {
            warn!(
                submission_id = id,
                field = %advisory.feature,
                value = advisory.value,
                min = advisory.min,
                max = advisory.max,
                "Field outside its typical range"
            );
        }

        self.settle(id, SubmissionState::Pending);
        info!(submission_id = id, "Dispatching prediction request");

        // On expiry the request future is dropped, which aborts the transfer.
        let outcome = match tokio::time::timeout(self.deadline, self.backend.predict(&sample)).await {
            Ok(Ok(label)) => Ok(crops::resolve(&label)),
            Ok(Err(e)) => Err(SubmissionError::from(e)),
            Err(_) => Err(SubmissionError::from(RequestError::Timeout(self.deadline))),
        };

        let next = match &outcome {
            Ok(result) => {
                info!(
                    submission_id = id,
                    crop = %result.crop,
                    category = result.metadata.category,
                    "Prediction received"
                );
                SubmissionState::Succeeded(result.clone())
            }
            Err(err) => {
                warn!(submission_id = id, kind = err.kind(), error = %err, "Prediction failed");
                SubmissionState::Failed(err.clone())
            }
        };

        if !self.settle(id, next) {
            debug!(submission_id = id, "Discarding outcome of superseded submission");
        }

        outcome
    }

    /// Returns to `Idle` and forgets the last result and form values.
    /// A request still in flight keeps running but can no longer change state.
    pub fn reset(&self) {
        self.state.send_modify(|snapshot| {
            *snapshot = StateSnapshot::idle(snapshot.submission_id + 1);
        });
        debug!("Submission state reset");
    }

    fn begin(&self, fields: RawFields) -> u64 {
        let mut id = 0;
        self.state.send_modify(|snapshot| {
            id = snapshot.submission_id + 1;
            *snapshot = StateSnapshot {
                submission_id: id,
                state: SubmissionState::Validating,
                fields,
                updated_at: Utc::now(),
            };
        });
        id
    }

    /// Applies `next` if `id` is still the current submission.
    fn settle(&self, id: u64, next: SubmissionState) -> bool {
        self.state.send_if_modified(|snapshot| {
            if snapshot.submission_id != id {
                return false;
            }
            snapshot.state = next;
            snapshot.updated_at = Utc::now();
            true
        })
    }
}

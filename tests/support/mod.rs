#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use smartcrop_console::{PredictionBackend, RawFields, RequestError, SoilSample};

/// What a scripted backend does for one request.
pub struct Step {
    pub delay: Duration,
    pub outcome: Result<String, RequestError>,
}

impl Step {
    pub fn ok(label: &str, delay: Duration) -> Self {
        Self { delay, outcome: Ok(label.to_string()) }
    }

    pub fn err(err: RequestError, delay: Duration) -> Self {
        Self { delay, outcome: Err(err) }
    }
}

type Script = Box<dyn Fn(&SoilSample) -> Step + Send + Sync>;

/// In-process backend whose answers and latency are chosen per sample.
pub struct ScriptedBackend {
    calls: AtomicUsize,
    script: Script,
}

impl ScriptedBackend {
    pub fn new(script: impl Fn(&SoilSample) -> Step + Send + Sync + 'static) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            script: Box::new(script),
        }
    }

    pub fn always(label: &'static str) -> Self {
        Self::new(move |_| Step::ok(label, Duration::ZERO))
    }

    pub fn failing(err: RequestError) -> Self {
        Self::new(move |_| Step::err(err.clone(), Duration::ZERO))
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl PredictionBackend for ScriptedBackend {
    async fn predict(&self, sample: &SoilSample) -> Result<String, RequestError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let step = (self.script)(sample);
        tokio::time::sleep(step.delay).await;
        step.outcome
    }
}

/// `{N:90, P:42, K:43, temperature:20.8, humidity:82, ph:6.5, rainfall:202.9}`
pub fn reference_fields() -> RawFields {
    [
        ("N", "90"),
        ("P", "42"),
        ("K", "43"),
        ("temperature", "20.8"),
        ("humidity", "82"),
        ("ph", "6.5"),
        ("rainfall", "202.9"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub fn with_field(key: &str, value: &str) -> RawFields {
    let mut fields = reference_fields();
    fields.insert(key.to_string(), value.to_string());
    fields
}

// Shared test helpers: scripted metric source and recording notifier

#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use validator_watch::error::{FetchError, NotifyError};
use validator_watch::models::MetricSnapshot;
use validator_watch::notifier::Notifier;
use validator_watch::validator_repo::MetricSource;

pub fn snapshot(value: u64, label: &str) -> MetricSnapshot {
    MetricSnapshot {
        value,
        label: label.into(),
    }
}

/// Returns queued results in order; once drained, repeats `fallback`.
pub struct ScriptedSource {
    script: Mutex<VecDeque<Result<MetricSnapshot, FetchError>>>,
    fallback: Result<MetricSnapshot, FetchError>,
    calls: Arc<Mutex<usize>>,
}

impl ScriptedSource {
    pub fn new(script: Vec<Result<MetricSnapshot, FetchError>>) -> Self {
        Self::with_fallback(script, Err(FetchError::new("script exhausted")))
    }

    pub fn with_fallback(
        script: Vec<Result<MetricSnapshot, FetchError>>,
        fallback: Result<MetricSnapshot, FetchError>,
    ) -> Self {
        Self {
            script: Mutex::new(script.into()),
            fallback,
            calls: Arc::new(Mutex::new(0)),
        }
    }

    pub fn calls(&self) -> Arc<Mutex<usize>> {
        self.calls.clone()
    }
}

impl MetricSource for ScriptedSource {
    async fn fetch(&self) -> Result<MetricSnapshot, FetchError> {
        *self.calls.lock().unwrap() += 1;
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| self.fallback.clone())
    }
}

/// Records every delivered text; optionally fails every delivery after recording the attempt.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<String>>>,
    fail: bool,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            sent: Arc::default(),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.sent.lock().unwrap().clone()
    }
}

impl Notifier for RecordingNotifier {
    async fn deliver(&self, text: &str) -> Result<(), NotifyError> {
        self.sent.lock().unwrap().push(text.to_string());
        if self.fail {
            Err(NotifyError::new("chat not found"))
        } else {
            Ok(())
        }
    }
}

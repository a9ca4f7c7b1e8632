// Domain models: the per-cycle snapshot, the change event, and the LCD wire payload

use serde::Deserialize;
use serde_json::value::RawValue;

/// One successful observation of the validator, already scaled to whole token units.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MetricSnapshot {
    pub value: u64,
    /// Validator moniker.
    pub label: String,
}

/// Result of comparing a fresh snapshot against the retained baseline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeEvent {
    /// No baseline existed yet.
    Initial { value: u64, label: String },
    Unchanged { value: u64, label: String },
    /// `delta == current - previous`, never zero.
    Changed {
        label: String,
        previous: u64,
        current: u64,
        delta: i128,
    },
}

/// Body of `GET /staking/validators/{address}`; only the fields we read.
#[derive(Debug, Clone, Deserialize)]
pub struct ValidatorResponse {
    pub msg: ValidatorMsg,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidatorMsg {
    pub validator: Validator,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Validator {
    /// Raw staked amount with 9 fractional digits, kept as JSON text. LCD nodes send a
    /// decimal string; some proxies re-encode it as a JSON integer wider than u64.
    pub tokens: Box<RawValue>,
    pub description: ValidatorDescription,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ValidatorDescription {
    pub moniker: String,
}

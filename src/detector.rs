// Change detection over the single retained baseline.

use crate::models::{ChangeEvent, MetricSnapshot};

/// Baseline carried between cycles. Empty until the first successful fetch; held in memory only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ObservationState {
    pub last_value: Option<u64>,
}

#[derive(Debug, Default)]
pub struct ChangeDetector {
    state: ObservationState,
}

impl ChangeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ObservationState {
        self.state
    }

    /// Classifies `snapshot` against the baseline, then makes it the new baseline.
    /// Called only for successful fetches, so the baseline moves once per good cycle.
    pub fn evaluate(&mut self, snapshot: MetricSnapshot) -> ChangeEvent {
        let MetricSnapshot { value, label } = snapshot;
        let event = match self.state.last_value {
            None => ChangeEvent::Initial { value, label },
            Some(previous) if previous == value => ChangeEvent::Unchanged { value, label },
            Some(previous) => ChangeEvent::Changed {
                label,
                previous,
                current: value,
                delta: i128::from(value) - i128::from(previous),
            },
        };
        self.state.last_value = Some(value);
        event
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn snap(value: u64) -> MetricSnapshot {
        MetricSnapshot {
            value,
            label: "Val1".into(),
        }
    }

    #[test]
    fn first_evaluation_is_initial() {
        let mut detector = ChangeDetector::new();
        assert_eq!(detector.state().last_value, None);
        let event = detector.evaluate(snap(5000));
        assert_eq!(
            event,
            ChangeEvent::Initial {
                value: 5000,
                label: "Val1".into()
            }
        );
        assert_eq!(detector.state().last_value, Some(5000));
    }

    #[test]
    fn equal_value_is_unchanged_and_keeps_baseline() {
        let mut detector = ChangeDetector::new();
        detector.evaluate(snap(5000));
        let event = detector.evaluate(snap(5000));
        assert!(matches!(event, ChangeEvent::Unchanged { value: 5000, .. }));
        assert_eq!(detector.state().last_value, Some(5000));
    }

    #[test]
    fn decrease_yields_negative_delta() {
        let mut detector = ChangeDetector::new();
        detector.evaluate(snap(5000));
        let event = detector.evaluate(snap(4800));
        assert_eq!(
            event,
            ChangeEvent::Changed {
                label: "Val1".into(),
                previous: 5000,
                current: 4800,
                delta: -200,
            }
        );
        assert_eq!(detector.state().last_value, Some(4800));
    }

    proptest! {
        #[test]
        fn every_evaluation_compares_against_the_preceding_value(
            values in prop::collection::vec(prop_oneof![any::<u64>(), 0u64..4], 1..64)
        ) {
            let mut detector = ChangeDetector::new();
            for (i, &v) in values.iter().enumerate() {
                let event = detector.evaluate(snap(v));
                match event {
                    ChangeEvent::Initial { value, .. } => {
                        prop_assert_eq!(i, 0);
                        prop_assert_eq!(value, v);
                    }
                    ChangeEvent::Unchanged { value, .. } => {
                        prop_assert!(i > 0);
                        prop_assert_eq!(value, values[i - 1]);
                        prop_assert_eq!(v, values[i - 1]);
                    }
                    ChangeEvent::Changed { previous, current, delta, .. } => {
                        prop_assert!(i > 0);
                        prop_assert_eq!(previous, values[i - 1]);
                        prop_assert_eq!(current, v);
                        prop_assert_ne!(delta, 0);
                        prop_assert_eq!(i128::from(previous) + delta, i128::from(current));
                        prop_assert_eq!(delta > 0, current > previous);
                    }
                }
                prop_assert_eq!(detector.state().last_value, Some(v));
            }
        }

        #[test]
        fn repeated_value_leaves_baseline_unchanged(first in any::<u64>(), repeat in any::<u64>()) {
            let mut detector = ChangeDetector::new();
            detector.evaluate(snap(first));
            detector.evaluate(snap(repeat));
            let before = detector.state();
            let event = detector.evaluate(snap(repeat));
            prop_assert!(
                matches!(event, ChangeEvent::Unchanged { value, .. } if value == repeat),
                "{:?}",
                event
            );
            prop_assert_eq!(detector.state(), before);
        }
    }
}

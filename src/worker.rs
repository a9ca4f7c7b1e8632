// Check worker: fetch -> compare -> notify, once per scheduled tick.
// Cycles run inline in the worker loop, so they never overlap; an overdue tick is skipped.

use crate::config::ScheduleConfig;
use crate::detector::ChangeDetector;
use crate::message;
use crate::models::ChangeEvent;
use crate::notifier::Notifier;
use crate::validator_repo::MetricSource;
use chrono::Utc;
use std::str::FromStr;
use tokio::sync::oneshot;
use tokio::time::{Duration, Instant, MissedTickBehavior, interval_at};
use tracing::{Instrument, error, info, warn};

/// Owns the capabilities and the baseline; one instance per process.
pub struct Monitor<S, N> {
    source: S,
    notifier: N,
    detector: ChangeDetector,
}

impl<S: MetricSource, N: Notifier> Monitor<S, N> {
    pub fn new(source: S, notifier: N) -> Self {
        Self {
            source,
            notifier,
            detector: ChangeDetector::new(),
        }
    }

    pub fn detector(&self) -> &ChangeDetector {
        &self.detector
    }

    /// Runs one cycle. Returns the event, or `None` when the fetch failed
    /// (the baseline is then left untouched). Never fails; errors end up in logs
    /// and, for fetch failures, in an error notification.
    pub async fn run_cycle(&mut self) -> Option<ChangeEvent> {
        let snapshot = match self.source.fetch().await {
            Ok(s) => s,
            Err(e) => {
                error!(error = %e, operation = "fetch", "Error fetching validator data");
                self.send_alert(&message::render_fetch_error(&e)).await;
                return None;
            }
        };

        let event = self.detector.evaluate(snapshot);
        match &event {
            ChangeEvent::Initial { value, label } => info!(
                moniker = %label,
                value,
                "First time fetching tokens. Sending initial alert."
            ),
            ChangeEvent::Unchanged { value, label } => {
                info!(moniker = %label, value, "No change in validator tokens.")
            }
            ChangeEvent::Changed {
                label,
                previous,
                current,
                delta,
            } => info!(
                moniker = %label,
                previous,
                current,
                delta = %delta,
                "Validator tokens changed. Sending alert."
            ),
        }
        if let Some(text) = message::render(&event) {
            self.send_alert(&text).await;
        }
        Some(event)
    }

    async fn send_alert(&self, text: &str) {
        match self.notifier.deliver(text).await {
            Ok(()) => info!(operation = "deliver", "Alert sent to Telegram channel."),
            Err(e) => error!(error = %e, operation = "deliver", "Failed to send alert"),
        }
    }
}

/// When cycles fire.
#[derive(Debug, Clone)]
pub enum Schedule {
    /// Fixed period; the first scheduled tick is one period after start.
    Interval(Duration),
    /// Cron expression evaluated against UTC wall time.
    Cron(Box<cron::Schedule>),
}

impl Schedule {
    pub fn from_config(config: &ScheduleConfig) -> anyhow::Result<Self> {
        match &config.cron {
            Some(expr) => {
                let schedule = cron::Schedule::from_str(expr)
                    .map_err(|e| anyhow::anyhow!("schedule.cron is invalid ({}): {}", expr, e))?;
                Ok(Schedule::Cron(Box::new(schedule)))
            }
            None => Ok(Schedule::Interval(Duration::from_secs(config.interval_secs))),
        }
    }
}

pub struct WorkerConfig {
    pub schedule: Schedule,
    /// Run a priming cycle before the first scheduled tick.
    pub run_on_start: bool,
}

/// Spawns the check loop. Exits when `shutdown_rx` fires (or its sender is dropped),
/// or when a cron schedule has no further fire times.
pub fn spawn<S, N>(
    mut monitor: Monitor<S, N>,
    config: WorkerConfig,
    mut shutdown_rx: oneshot::Receiver<()>,
) -> tokio::task::JoinHandle<()>
where
    S: MetricSource + 'static,
    N: Notifier + 'static,
{
    let WorkerConfig {
        schedule,
        run_on_start,
    } = config;

    tokio::spawn(async move {
        if run_on_start {
            tracing::debug!("priming cycle");
            monitor.run_cycle().await;
        }

        match schedule {
            Schedule::Interval(period) => {
                let mut tick = interval_at(Instant::now() + period, period);
                tick.set_missed_tick_behavior(MissedTickBehavior::Skip);
                loop {
                    tokio::select! {
                        _ = tick.tick() => {
                            tracing::debug!("scheduled cycle");
                            monitor.run_cycle().await;
                        }
                        _ = &mut shutdown_rx => break,
                    }
                }
            }
            Schedule::Cron(schedule) => loop {
                let now = Utc::now();
                let Some(next) = schedule.after(&now).next() else {
                    warn!("cron schedule has no upcoming fire time; worker stopping");
                    break;
                };
                let delay = (next - now).to_std().unwrap_or(Duration::ZERO);
                tracing::debug!(next = %next, "next scheduled cycle");
                tokio::select! {
                    _ = tokio::time::sleep(delay) => {
                        monitor.run_cycle().await;
                    }
                    _ = &mut shutdown_rx => break,
                }
            },
        }
        tracing::debug!("Worker shutting down");
    }
    .instrument(tracing::debug_span!("worker")))
}

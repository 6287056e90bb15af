//! One pass of the pipeline
//!
//! resolve all metrics → build snapshot → load prior → evaluate → compose →
//! notify → save. Every step degrades instead of failing: the only thing a
//! caller needs to look at is whether the new snapshot was persisted.

use chrono::{DateTime, Utc};
use tracing::{debug, error, info, instrument, warn};

use crate::MetricReading;
use crate::delta::{DeltaEngine, Evaluation};
use crate::message::{ComposedMessage, compose};
use crate::notify::{Notifier, NotifyOutcome};
use crate::resolver::MetricResolver;
use crate::snapshot::Snapshot;
use crate::storage::SnapshotStore;

#[derive(Debug, Clone)]
pub struct TickOutcome {
    pub readings: Vec<MetricReading>,
    pub snapshot: Snapshot,
    pub evaluation: Evaluation,
    pub message: ComposedMessage,
    pub notification: NotifyOutcome,
    pub persisted: bool,
}

pub struct Tick<'a> {
    resolver: &'a MetricResolver,
    store: &'a dyn SnapshotStore,
    engine: &'a DeltaEngine,
    notifier: &'a dyn Notifier,
    notify_enabled: bool,
}

impl<'a> Tick<'a> {
    pub fn new(
        resolver: &'a MetricResolver,
        store: &'a dyn SnapshotStore,
        engine: &'a DeltaEngine,
        notifier: &'a dyn Notifier,
    ) -> Self {
        Self {
            resolver,
            store,
            engine,
            notifier,
            notify_enabled: true,
        }
    }

    pub fn notify_enabled(mut self, enabled: bool) -> Self {
        self.notify_enabled = enabled;
        self
    }

    pub async fn run(&self) -> TickOutcome {
        self.run_at(Utc::now()).await
    }

    #[instrument(skip(self), fields(store = %self.store.describe(), channel = self.notifier.channel()))]
    pub async fn run_at(&self, now: DateTime<Utc>) -> TickOutcome {
        let readings = self.resolver.resolve_all().await;
        let snapshot = Snapshot::from_readings(&readings, now);
        info!(
            "resolved {}/{} metrics",
            snapshot.summary.successful, snapshot.summary.total_metrics
        );

        let prior = match self.store.load().await {
            Ok(prior) => prior,
            Err(e) => {
                error!("could not read previous snapshot, treating as first run: {e}");
                None
            }
        };

        let evaluation = self.engine.evaluate(&snapshot, prior.as_ref());
        let message = compose(&evaluation, &snapshot);

        let notification = self.notify(&evaluation, &message).await;
        match &notification {
            NotifyOutcome::Sent => info!("notification sent via {}", self.notifier.channel()),
            NotifyOutcome::Skipped(reason) => info!("notification skipped: {reason}"),
            NotifyOutcome::Failed(reason) => error!("notification failed: {reason}"),
        }

        let persisted = match self.store.save(&snapshot).await {
            Ok(()) => {
                debug!("snapshot saved");
                true
            }
            Err(e) => {
                error!("could not save snapshot: {e}");
                false
            }
        };

        TickOutcome {
            readings,
            snapshot,
            evaluation,
            message,
            notification,
            persisted,
        }
    }

    async fn notify(&self, evaluation: &Evaluation, message: &ComposedMessage) -> NotifyOutcome {
        if !evaluation.should_notify {
            return NotifyOutcome::Skipped("no significant changes".to_string());
        }
        if message.is_empty() {
            warn!("threshold breached but composed message has no lines");
            return NotifyOutcome::Skipped("nothing to report".to_string());
        }
        if !self.notify_enabled {
            return NotifyOutcome::Skipped("notifications disabled".to_string());
        }

        self.notifier.send(&message.text).await
    }
}

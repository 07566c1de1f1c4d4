use std::sync::Arc;
use std::time::Duration;

use dashboard_engine::{aggregate, aggregate_filtered, CategoryFilter};
use models::{FailurePolicy, Settings};
use tokio::task::JoinHandle;

use crate::error::Result;
use crate::source::DataSource;
use crate::state::{CycleId, CycleOutcome, CycleResult, DashboardState, SourceFailure};

/// Runs fetch cycles: six concurrent reads against the data source, one
/// aggregation once all of them settle, and a guarded publish into the state.
pub struct Orchestrator {
    source: Arc<dyn DataSource>,
    state: Arc<DashboardState>,
    policy: FailurePolicy,
    category: Option<CategoryFilter>,
}

impl Orchestrator {
    pub fn new(source: Arc<dyn DataSource>, state: Arc<DashboardState>) -> Self {
        Self {
            source,
            state,
            policy: FailurePolicy::default(),
            category: None,
        }
    }

    pub fn from_settings(
        source: Arc<dyn DataSource>,
        state: Arc<DashboardState>,
        settings: &Settings,
    ) -> Self {
        let orchestrator = Self::new(source, state).with_policy(settings.on_fetch_failure);
        if settings.enforce_payment_category {
            orchestrator.with_category_filter(CategoryFilter::new(settings.payment_category.as_str()))
        } else {
            orchestrator
        }
    }

    pub fn with_policy(mut self, policy: FailurePolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Re-filters payments by category inside the engine instead of trusting
    /// the data source's selection.
    pub fn with_category_filter(mut self, category: CategoryFilter) -> Self {
        self.category = Some(category);
        self
    }

    pub fn state(&self) -> &Arc<DashboardState> {
        &self.state
    }

    /// Starts a cycle and waits for it to settle.
    pub async fn run_cycle(&self) -> CycleOutcome {
        let cycle = self.state.begin_cycle().await;
        self.run_started(cycle).await
    }

    /// Starts a cycle and lets it settle in the background. The returned id is
    /// already the latest, so any cycle still in flight becomes stale.
    pub async fn trigger(self: &Arc<Self>) -> (CycleId, JoinHandle<CycleOutcome>) {
        let cycle = self.state.begin_cycle().await;
        let this = Arc::clone(self);
        let handle = tokio::spawn(async move { this.run_started(cycle).await });
        (cycle, handle)
    }

    /// Fetches, aggregates and publishes for a cycle already begun on the state.
    pub async fn run_started(&self, cycle: CycleId) -> CycleOutcome {
        tracing::info!(cycle, "Starting fetch cycle");
        let result = self.fetch_and_aggregate().await;
        let outcome = self.state.complete_cycle(cycle, result).await;
        match outcome {
            CycleOutcome::Published => tracing::info!(cycle, "Fetch cycle published a snapshot"),
            CycleOutcome::Failed => {
                tracing::warn!(cycle, "Fetch cycle aborted; keeping previous snapshot")
            }
            CycleOutcome::Stale => tracing::debug!(cycle, "Fetch cycle superseded"),
        }
        outcome
    }

    async fn fetch_and_aggregate(&self) -> CycleResult {
        let (sales, purchases, expenses, payments, partners, inspections) = tokio::join!(
            self.source.fetch_sales(),
            self.source.fetch_purchases(),
            self.source.fetch_expenses(),
            self.source.fetch_payments(),
            self.source.count_partners(),
            self.source.count_inspections(),
        );

        let mut failures = Vec::new();
        let sales = settle("sales", sales, &mut failures);
        let purchases = settle("purchases", purchases, &mut failures);
        let expenses = settle("expenses", expenses, &mut failures);
        let payments = settle("payments", payments, &mut failures);
        let partners = settle("partners", partners, &mut failures);
        let inspections = settle("inspections", inspections, &mut failures);

        if !failures.is_empty() && self.policy == FailurePolicy::Abort {
            return CycleResult::Failed { failures };
        }

        let snapshot = match &self.category {
            Some(category) => aggregate_filtered(
                &sales,
                &purchases,
                &expenses,
                &payments,
                category,
                partners,
                inspections,
            ),
            None => aggregate(&sales, &purchases, &expenses, &payments, partners, inspections),
        };
        CycleResult::Published { snapshot, failures }
    }
}

/// Unwraps one source's result. A failure is logged, recorded, and replaced by
/// the empty value for that source.
fn settle<T: Default>(
    source_name: &'static str,
    result: Result<T>,
    failures: &mut Vec<SourceFailure>,
) -> T {
    match result {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(source = source_name, error = %e, "Data source fetch failed");
            failures.push(SourceFailure {
                source_name: source_name.to_string(),
                reason: e.to_string(),
            });
            T::default()
        }
    }
}

/// Re-runs a fetch cycle every `period` until the task is aborted.
pub fn spawn_periodic_refresh(orchestrator: Arc<Orchestrator>, period: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
        loop {
            ticker.tick().await;
            orchestrator.run_cycle().await;
        }
    })
}

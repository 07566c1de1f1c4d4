use chrono::Utc;
use dashboard_engine::DerivedCache;
use models::{DashboardSnapshot, DerivedMetrics};
use serde::Serialize;
use tokio::sync::RwLock;

/// Monotonic identifier of a fetch cycle. `0` means no cycle has started.
pub type CycleId = u64;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceFailure {
    pub source_name: String,
    pub reason: String,
}

/// What a fetch cycle produced once all of its sources settled.
#[derive(Debug, Clone, PartialEq)]
pub enum CycleResult {
    /// A snapshot was aggregated. `failures` is non-empty when failed sources
    /// were substituted with empty sets.
    Published {
        snapshot: DashboardSnapshot,
        failures: Vec<SourceFailure>,
    },
    /// The cycle was abandoned; the previous snapshot stays in place.
    Failed { failures: Vec<SourceFailure> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    Published,
    Failed,
    /// A newer cycle started before this one settled; its result was dropped.
    Stale,
}

/// Read model handed to the presentation layer.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub cycle: CycleId,
    pub loading: bool,
    pub snapshot: Option<DashboardSnapshot>,
    pub derived: Option<DerivedMetrics>,
    pub refreshed_at: Option<String>,
    pub last_error: Option<String>,
    pub degraded_sources: Vec<String>,
}

#[derive(Debug, Default)]
struct Inner {
    latest_started: CycleId,
    loading: bool,
    snapshot: Option<DashboardSnapshot>,
    derived: Option<DerivedMetrics>,
    derived_cache: DerivedCache,
    refreshed_at: Option<String>,
    last_error: Option<String>,
    degraded_sources: Vec<String>,
}

/// Owner of the loading flag and the last published snapshot.
///
/// `begin_cycle` moves idle→loading and hands out the next cycle id;
/// `complete_cycle` moves loading→idle. Only the most recently started cycle
/// may publish: a completion carrying an older id is dropped, so a slow cycle
/// can never overwrite the snapshot of a newer one.
#[derive(Debug, Default)]
pub struct DashboardState {
    inner: RwLock<Inner>,
}

impl DashboardState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn begin_cycle(&self) -> CycleId {
        let mut inner = self.inner.write().await;
        inner.latest_started += 1;
        inner.loading = true;
        inner.latest_started
    }

    pub async fn complete_cycle(&self, cycle: CycleId, result: CycleResult) -> CycleOutcome {
        let mut inner = self.inner.write().await;
        if cycle < inner.latest_started {
            tracing::debug!(
                cycle,
                latest = inner.latest_started,
                "Discarding result of superseded fetch cycle"
            );
            return CycleOutcome::Stale;
        }

        inner.loading = false;
        match result {
            CycleResult::Published { snapshot, failures } => {
                let derived = inner.derived_cache.get(&snapshot);
                inner.derived = Some(derived);
                inner.snapshot = Some(snapshot);
                inner.refreshed_at = Some(Utc::now().to_rfc3339());
                inner.last_error = summarize(&failures);
                inner.degraded_sources = failures.into_iter().map(|f| f.source_name).collect();
                CycleOutcome::Published
            }
            CycleResult::Failed { failures } => {
                inner.last_error = summarize(&failures);
                CycleOutcome::Failed
            }
        }
    }

    pub async fn view(&self) -> DashboardView {
        let inner = self.inner.read().await;
        DashboardView {
            cycle: inner.latest_started,
            loading: inner.loading,
            snapshot: inner.snapshot.clone(),
            derived: inner.derived,
            refreshed_at: inner.refreshed_at.clone(),
            last_error: inner.last_error.clone(),
            degraded_sources: inner.degraded_sources.clone(),
        }
    }

    pub async fn snapshot(&self) -> Option<DashboardSnapshot> {
        self.inner.read().await.snapshot.clone()
    }

    pub async fn is_loading(&self) -> bool {
        self.inner.read().await.loading
    }

    /// How many times the derived metrics were actually recomputed.
    pub async fn derived_recomputations(&self) -> u64 {
        self.inner.read().await.derived_cache.recomputations()
    }
}

fn summarize(failures: &[SourceFailure]) -> Option<String> {
    if failures.is_empty() {
        return None;
    }
    Some(
        failures
            .iter()
            .map(|f| format!("{}: {}", f.source_name, f.reason))
            .collect::<Vec<_>>()
            .join("; "),
    )
}

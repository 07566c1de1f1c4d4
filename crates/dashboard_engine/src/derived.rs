use models::{DashboardSnapshot, DerivedMetrics};

/// Net balance and profit margin (percent) for a snapshot. The margin is `0.0`
/// whenever revenue is not positive.
pub fn compute_derived(snapshot: &DashboardSnapshot) -> DerivedMetrics {
    let net_balance = snapshot.profit - snapshot.expenses - snapshot.team_cost;
    let profit_margin = if snapshot.revenue > 0.0 {
        (snapshot.profit / snapshot.revenue) * 100.0
    } else {
        0.0
    };
    DerivedMetrics {
        net_balance,
        profit_margin,
    }
}

/// The four snapshot fields the derived metrics depend on.
#[derive(Debug, Clone, Copy, PartialEq)]
struct DerivedInputs {
    revenue: f64,
    profit: f64,
    expenses: f64,
    team_cost: f64,
}

impl From<&DashboardSnapshot> for DerivedInputs {
    fn from(s: &DashboardSnapshot) -> Self {
        Self {
            revenue: s.revenue,
            profit: s.profit,
            expenses: s.expenses,
            team_cost: s.team_cost,
        }
    }
}

/// Memoizes [`compute_derived`]; recomputes only when one of the four fields it
/// reads changes between calls.
#[derive(Debug, Default)]
pub struct DerivedCache {
    cached: Option<(DerivedInputs, DerivedMetrics)>,
    recomputations: u64,
}

impl DerivedCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&mut self, snapshot: &DashboardSnapshot) -> DerivedMetrics {
        let inputs = DerivedInputs::from(snapshot);
        match self.cached {
            Some((key, metrics)) if key == inputs => metrics,
            _ => {
                let metrics = compute_derived(snapshot);
                self.cached = Some((inputs, metrics));
                self.recomputations += 1;
                metrics
            }
        }
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }
}

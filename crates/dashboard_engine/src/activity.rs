use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use data_normalization::{normalize_amount, normalize_text, parse_timestamp};
use models::{ActivityEntry, ActivityKind, PurchaseRecord, SaleRecord};

const RECENT_SALES: usize = 3;
const RECENT_PURCHASES: usize = 2;

struct Candidate {
    at: Option<DateTime<Utc>>,
    entry: ActivityEntry,
}

/// Builds the recent-activity feed: the newest sales and the newest in-stock
/// purchases, merged newest first. At most five entries.
///
/// The sort is stable and sales are queued ahead of purchases, so on an exact
/// timestamp tie the sale is listed first. Undated records sort last.
pub fn recent_activity(sales: &[SaleRecord], in_stock: &[&PurchaseRecord]) -> Vec<ActivityEntry> {
    let sales = newest(sales.iter().map(sale_candidate).collect(), RECENT_SALES);
    let purchases = newest(
        in_stock.iter().map(|p| purchase_candidate(p)).collect(),
        RECENT_PURCHASES,
    );

    let mut merged: Vec<Candidate> = sales.into_iter().chain(purchases).collect();
    merged.sort_by(|a, b| newest_first(&a.at, &b.at));
    merged.into_iter().map(|c| c.entry).collect()
}

fn newest(mut candidates: Vec<Candidate>, n: usize) -> Vec<Candidate> {
    candidates.sort_by(|a, b| newest_first(&a.at, &b.at));
    candidates.truncate(n);
    candidates
}

fn newest_first(a: &Option<DateTime<Utc>>, b: &Option<DateTime<Utc>>) -> Ordering {
    match (a, b) {
        (Some(left), Some(right)) => right.cmp(left),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn sale_candidate(sale: &SaleRecord) -> Candidate {
    let timestamp = normalize_text(&sale.created_at).unwrap_or_default();
    Candidate {
        at: parse_timestamp(&timestamp),
        entry: ActivityEntry {
            kind: ActivityKind::Sale,
            amount: normalize_amount(&sale.total_price),
            label: join_label(normalize_text(&sale.first_name), normalize_text(&sale.last_name)),
            timestamp,
        },
    }
}

fn purchase_candidate(purchase: &PurchaseRecord) -> Candidate {
    let timestamp = normalize_text(&purchase.created_at).unwrap_or_default();
    Candidate {
        at: parse_timestamp(&timestamp),
        entry: ActivityEntry {
            kind: ActivityKind::Purchase,
            amount: normalize_amount(&purchase.total_cost),
            label: join_label(normalize_text(&purchase.make), normalize_text(&purchase.model)),
            timestamp,
        },
    }
}

fn join_label(first: Option<String>, second: Option<String>) -> String {
    [first, second].into_iter().flatten().collect::<Vec<_>>().join(" ")
}

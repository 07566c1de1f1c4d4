//! Aggregation engine: turns one batch of fetched record sets into a
//! [`DashboardSnapshot`]. Pure and synchronous; no I/O happens here.

pub mod activity;
pub mod derived;
pub mod report;

use std::collections::HashMap;

use data_normalization::{normalize_amount, normalize_flag, normalize_id, normalize_text};
use models::{DashboardSnapshot, ExpenseRecord, PurchaseRecord, SaleRecord, TransactionRecord};

pub use activity::recent_activity;
pub use derived::{compute_derived, DerivedCache};
pub use report::{build_report, load_bundle, write_report_json, DashboardReport, RecordBundle};

/// Selects which transactions count toward team cost when the engine is asked
/// to filter payments itself instead of trusting the data source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryFilter {
    category: String,
}

impl CategoryFilter {
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into().trim().to_string(),
        }
    }

    pub fn matches(&self, txn: &TransactionRecord) -> bool {
        normalize_text(&txn.kind).is_some_and(|k| k.eq_ignore_ascii_case(&self.category))
    }
}

impl Default for CategoryFilter {
    fn default() -> Self {
        Self::new("payment")
    }
}

/// Computes the dashboard snapshot. `payments` must already be restricted to
/// the payment category; see [`aggregate_filtered`] otherwise.
pub fn aggregate(
    sales: &[SaleRecord],
    purchases: &[PurchaseRecord],
    expenses: &[ExpenseRecord],
    payments: &[TransactionRecord],
    partner_count: Option<u64>,
    inspection_count: Option<u64>,
) -> DashboardSnapshot {
    aggregate_payments(
        sales,
        purchases,
        expenses,
        payments.iter(),
        partner_count,
        inspection_count,
    )
}

/// Same as [`aggregate`] but only transactions matching `category` contribute
/// to team cost.
pub fn aggregate_filtered(
    sales: &[SaleRecord],
    purchases: &[PurchaseRecord],
    expenses: &[ExpenseRecord],
    transactions: &[TransactionRecord],
    category: &CategoryFilter,
    partner_count: Option<u64>,
    inspection_count: Option<u64>,
) -> DashboardSnapshot {
    aggregate_payments(
        sales,
        purchases,
        expenses,
        transactions.iter().filter(|t| category.matches(t)),
        partner_count,
        inspection_count,
    )
}

fn aggregate_payments<'a>(
    sales: &[SaleRecord],
    purchases: &[PurchaseRecord],
    expenses: &[ExpenseRecord],
    payments: impl Iterator<Item = &'a TransactionRecord>,
    partner_count: Option<u64>,
    inspection_count: Option<u64>,
) -> DashboardSnapshot {
    // Purchases keyed by normalized id; ids are unique within a batch.
    let purchases_by_id: HashMap<String, &PurchaseRecord> = purchases
        .iter()
        .filter_map(|p| normalize_id(&p.id).map(|id| (id, p)))
        .collect();

    let mut revenue = 0.0;
    let mut debt = 0.0;
    let mut profit = 0.0;
    for sale in sales {
        let price = normalize_amount(&sale.total_price);
        revenue += price;
        debt += normalize_amount(&sale.balance);
        // Orphaned sales have no acquisition cost and stay out of profit.
        if let Some(purchase) = normalize_id(&sale.car_id).and_then(|id| purchases_by_id.get(&id)) {
            profit += price - normalize_amount(&purchase.total_cost);
        }
    }

    let in_stock: Vec<&PurchaseRecord> = purchases
        .iter()
        .filter(|p| !normalize_flag(&p.is_sold))
        .collect();
    let stock_value: f64 = in_stock
        .iter()
        .map(|p| normalize_amount(&p.selling_price))
        .sum();

    let expenses_total: f64 = expenses.iter().map(|e| normalize_amount(&e.cost)).sum();
    let team_cost: f64 = payments.map(|t| normalize_amount(&t.amount)).sum();

    DashboardSnapshot {
        revenue,
        profit,
        stock_value,
        debt,
        expenses: expenses_total,
        team_cost,
        cars_in_stock: in_stock.len() as u64,
        partners: partner_count.unwrap_or(0),
        inspections: inspection_count.unwrap_or(0),
        activity: recent_activity(sales, &in_stock),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::{ActivityEntry, ActivityKind};
    use serde_json::{json, Value};

    fn sale(price: Value, balance: Value, car_id: Value, created_at: &str) -> SaleRecord {
        SaleRecord {
            total_price: price,
            balance,
            car_id,
            created_at: json!(created_at),
            first_name: json!("J"),
            last_name: json!("D"),
        }
    }

    fn purchase(id: &str, cost: f64, selling: f64, sold: bool, created_at: &str) -> PurchaseRecord {
        PurchaseRecord {
            id: json!(id),
            total_cost: json!(cost),
            selling_price: json!(selling),
            is_sold: json!(sold),
            created_at: json!(created_at),
            make: json!("X"),
            model: json!("Y"),
        }
    }

    fn expense(cost: Value) -> ExpenseRecord {
        ExpenseRecord { cost }
    }

    fn payment(amount: Value, kind: &str) -> TransactionRecord {
        TransactionRecord {
            amount,
            kind: json!(kind),
        }
    }

    #[test]
    fn test_reference_scenario() {
        let sales = vec![sale(json!(1000), json!(200), json!("A"), "2024-01-02")];
        let purchases = vec![purchase("A", 600.0, 900.0, false, "2024-01-01")];
        let expenses = vec![expense(json!(50))];
        let payments = vec![payment(json!(100), "payment")];

        let snap = aggregate(&sales, &purchases, &expenses, &payments, Some(2), Some(3));

        assert_eq!(snap.revenue, 1000.0);
        assert_eq!(snap.profit, 400.0);
        assert_eq!(snap.stock_value, 900.0);
        assert_eq!(snap.debt, 200.0);
        assert_eq!(snap.expenses, 50.0);
        assert_eq!(snap.team_cost, 100.0);
        assert_eq!(snap.cars_in_stock, 1);
        assert_eq!(snap.partners, 2);
        assert_eq!(snap.inspections, 3);
        assert_eq!(
            snap.activity,
            vec![
                ActivityEntry {
                    kind: ActivityKind::Sale,
                    amount: 1000.0,
                    timestamp: "2024-01-02".to_string(),
                    label: "J D".to_string(),
                },
                ActivityEntry {
                    kind: ActivityKind::Purchase,
                    amount: 600.0,
                    timestamp: "2024-01-01".to_string(),
                    label: "X Y".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_orphaned_sale_excluded_from_profit_only() {
        let purchases = vec![purchase("A", 600.0, 900.0, true, "2024-01-01")];
        let matched = sale(json!(1000), json!(0), json!("A"), "2024-01-02");
        let orphan = sale(json!(5000), json!(300), json!("missing"), "2024-01-03");

        let base = aggregate(&[matched.clone()], &purchases, &[], &[], None, None);
        let with_orphan = aggregate(&[matched, orphan], &purchases, &[], &[], None, None);

        assert_eq!(base.profit, 400.0);
        assert_eq!(with_orphan.profit, 400.0);
        assert_eq!(with_orphan.revenue, 6000.0);
        assert_eq!(with_orphan.debt, 300.0);
    }

    #[test]
    fn test_empty_inputs_yield_zero_snapshot() {
        let snap = aggregate(&[], &[], &[], &[], Some(0), Some(0));
        assert_eq!(snap, DashboardSnapshot::default());
        assert!(snap.activity.is_empty());
    }

    #[test]
    fn test_missing_counts_default_to_zero() {
        let snap = aggregate(&[], &[], &[], &[], None, None);
        assert_eq!(snap.partners, 0);
        assert_eq!(snap.inspections, 0);
    }

    #[test]
    fn test_cars_in_stock_counts_unsold_only() {
        let purchases = vec![
            purchase("A", 1.0, 10.0, false, "2024-01-01"),
            purchase("B", 1.0, 20.0, true, "2024-01-02"),
            purchase("C", 1.0, 30.0, false, "2024-01-03"),
            PurchaseRecord {
                id: json!("D"),
                selling_price: json!("40"),
                is_sold: Value::Null,
                ..Default::default()
            },
        ];

        let snap = aggregate(&[], &purchases, &[], &[], None, None);

        assert_eq!(snap.cars_in_stock, 3);
        assert_eq!(snap.stock_value, 80.0);
    }

    #[test]
    fn test_profit_is_order_independent() {
        let sales = vec![
            sale(json!(1000), json!(0), json!("A"), "2024-01-01"),
            sale(json!(2500), json!(0), json!("B"), "2024-01-02"),
            sale(json!(800), json!(0), json!("Z"), "2024-01-03"),
            sale(json!(1200), json!(0), json!(3), "2024-01-04"),
        ];
        let purchases = vec![
            purchase("A", 600.0, 0.0, true, "2023-12-01"),
            purchase("B", 2000.0, 0.0, true, "2023-12-02"),
            PurchaseRecord {
                id: json!("3"),
                total_cost: json!(1500),
                is_sold: json!(true),
                ..Default::default()
            },
        ];

        let forward = aggregate(&sales, &purchases, &[], &[], None, None);
        let mut rev_sales = sales.clone();
        rev_sales.reverse();
        let mut rev_purchases = purchases.clone();
        rev_purchases.reverse();
        let backward = aggregate(&rev_sales, &rev_purchases, &[], &[], None, None);

        assert_eq!(forward.profit, 400.0 + 500.0 - 300.0);
        assert_eq!(forward.profit, backward.profit);
    }

    #[test]
    fn test_malformed_amounts_contribute_zero() {
        let sales = vec![
            sale(json!("abc"), Value::Null, json!("A"), "2024-01-01"),
            sale(json!("1500"), json!("-250"), Value::Null, "2024-01-02"),
        ];
        let purchases = vec![PurchaseRecord {
            id: json!("A"),
            total_cost: json!("n/a"),
            is_sold: json!(true),
            ..Default::default()
        }];
        let expenses = vec![expense(Value::Null), expense(json!("75.5"))];
        let payments = vec![payment(json!("oops"), "payment")];

        let snap = aggregate(&sales, &purchases, &expenses, &payments, None, None);

        assert_eq!(snap.revenue, 1500.0);
        assert_eq!(snap.debt, -250.0);
        assert_eq!(snap.profit, 0.0);
        assert_eq!(snap.expenses, 75.5);
        assert_eq!(snap.team_cost, 0.0);
        assert!(!snap.revenue.is_nan());
    }

    #[test]
    fn test_aggregate_is_pure() {
        let sales = vec![sale(json!(1000), json!(200), json!("A"), "2024-01-02")];
        let purchases = vec![purchase("A", 600.0, 900.0, false, "2024-01-01")];
        let payments = vec![payment(json!(100), "payment")];

        let first = aggregate(&sales, &purchases, &[], &payments, Some(1), None);
        let second = aggregate(&sales, &purchases, &[], &payments, Some(1), None);

        assert_eq!(first, second);
    }

    #[test]
    fn test_aggregate_trusts_caller_category_selection() {
        let payments = vec![payment(json!(100), "payment"), payment(json!(40), "refund")];
        let snap = aggregate(&[], &[], &[], &payments, None, None);
        assert_eq!(snap.team_cost, 140.0);
    }

    #[test]
    fn test_aggregate_filtered_applies_category() {
        let transactions = vec![
            payment(json!(100), "payment"),
            payment(json!(40), "refund"),
            payment(json!(60), " Payment "),
            TransactionRecord {
                amount: json!(999),
                kind: Value::Null,
            },
        ];
        let snap = aggregate_filtered(
            &[],
            &[],
            &[],
            &transactions,
            &CategoryFilter::default(),
            None,
            None,
        );
        assert_eq!(snap.team_cost, 160.0);
    }

    #[test]
    fn test_sold_purchases_excluded_from_activity() {
        let purchases = vec![
            purchase("P1", 1.0, 10.0, false, "2024-01-01"),
            purchase("P2", 2.0, 20.0, false, "2024-01-02"),
            purchase("P3", 3.0, 30.0, false, "2024-01-03"),
            purchase("SOLD", 4.0, 40.0, true, "2024-02-01"),
        ];

        let snap = aggregate(&[], &purchases, &[], &[], None, None);

        let amounts: Vec<f64> = snap.activity.iter().map(|e| e.amount).collect();
        assert_eq!(amounts, vec![3.0, 2.0]);
        assert!(snap.activity.iter().all(|e| e.kind == ActivityKind::Purchase));
        assert!(snap.activity.iter().all(|e| e.timestamp != "2024-02-01"));
        assert_eq!(snap.cars_in_stock, 3);
    }

    #[test]
    fn test_integral_float_car_id_joins() {
        let sales = vec![sale(json!(1000), json!(0), json!(7.0), "2024-01-02")];
        let purchases = vec![purchase("7", 600.0, 900.0, true, "2024-01-01")];

        let snap = aggregate(&sales, &purchases, &[], &[], None, None);

        assert_eq!(snap.profit, 400.0);
    }
}

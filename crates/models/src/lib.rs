use serde::{Deserialize, Serialize};
use serde_json::Value;

// Raw input records
//
// Every field stays a `Value` until the normalizer reads it: upstream rows may
// carry numbers where text is expected, strings where numbers are, nulls, or nothing.

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SaleRecord {
	#[serde(default)]
	pub total_price: Value,
	#[serde(default)]
	pub balance: Value,
	#[serde(default)]
	pub car_id: Value,
	#[serde(default)]
	pub created_at: Value,
	#[serde(default, alias = "customerFirstName")]
	pub first_name: Value,
	#[serde(default, alias = "customerLastName")]
	pub last_name: Value,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRecord {
	#[serde(default)]
	pub id: Value,
	#[serde(default)]
	pub total_cost: Value,
	#[serde(default)]
	pub selling_price: Value,
	#[serde(default)]
	pub is_sold: Value,
	#[serde(default)]
	pub created_at: Value,
	#[serde(default)]
	pub make: Value,
	#[serde(default)]
	pub model: Value,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct ExpenseRecord {
	#[serde(default)]
	pub cost: Value,
}

#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct TransactionRecord {
	#[serde(default)]
	pub amount: Value,
	#[serde(rename = "type", default)]
	pub kind: Value,
}

/// Scalar count payload as returned by the count endpoints (`{"count": 3}`).
#[derive(Debug, Deserialize, Serialize, Clone, Default, PartialEq)]
pub struct CountRecord {
	#[serde(default)]
	pub count: Value,
}

// Output models

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ActivityKind {
	Sale,
	Purchase,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ActivityEntry {
	pub kind: ActivityKind,
	pub amount: f64,
	pub timestamp: String,
	pub label: String,
}

#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSnapshot {
	pub revenue: f64,
	pub profit: f64,
	pub stock_value: f64,
	pub debt: f64,
	pub expenses: f64,
	pub team_cost: f64,
	pub cars_in_stock: u64,
	pub partners: u64,
	pub inspections: u64,
	pub activity: Vec<ActivityEntry>,
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DerivedMetrics {
	pub net_balance: f64,
	pub profit_margin: f64,
}

// Settings models

/// What a fetch cycle does when one of its sources fails.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
	/// Keep showing the last good snapshot and report the error.
	#[default]
	Abort,
	/// Aggregate with the failed sources as empty sets and flag them as degraded.
	TreatAsEmpty,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ServerSettings {
	#[serde(default = "default_host")]
	pub host: String,
	#[serde(default = "default_port")]
	pub port: u16,
}

impl Default for ServerSettings {
	fn default() -> Self {
		Self { host: default_host(), port: default_port() }
	}
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Settings {
	#[serde(default = "default_data_dir")]
	pub data_dir: String,
	#[serde(default = "default_limit")]
	pub sales_limit: usize,
	#[serde(default = "default_limit")]
	pub purchases_limit: usize,
	#[serde(default = "default_payment_category")]
	pub payment_category: String,
	#[serde(default)]
	pub enforce_payment_category: bool,
	#[serde(default)]
	pub on_fetch_failure: FailurePolicy,
	#[serde(default)]
	pub refresh_interval_secs: u64,
	#[serde(default)]
	pub server: ServerSettings,
}

impl Default for Settings {
	fn default() -> Self {
		Self {
			data_dir: default_data_dir(),
			sales_limit: default_limit(),
			purchases_limit: default_limit(),
			payment_category: default_payment_category(),
			enforce_payment_category: false,
			on_fetch_failure: FailurePolicy::default(),
			refresh_interval_secs: 0,
			server: ServerSettings::default(),
		}
	}
}

fn default_data_dir() -> String { "data".to_string() }
fn default_limit() -> usize { 100 }
fn default_payment_category() -> String { "payment".to_string() }
fn default_host() -> String { "127.0.0.1".to_string() }
fn default_port() -> u16 { 3000 }

#[cfg(test)]
mod tests {
	use super::*;
	use serde_json::json;

	#[test]
	fn test_sale_record_accepts_malformed_fields() {
		let sale: SaleRecord = serde_json::from_value(json!({
			"totalPrice": "1000",
			"balance": null,
			"carId": 7,
			"customerFirstName": "Jane",
		}))
		.unwrap();

		assert_eq!(sale.total_price, json!("1000"));
		assert_eq!(sale.balance, Value::Null);
		assert_eq!(sale.car_id, json!(7));
		assert_eq!(sale.first_name, json!("Jane"));
		assert_eq!(sale.last_name, Value::Null);
		assert_eq!(sale.created_at, Value::Null);
	}

	#[test]
	fn test_transaction_type_is_renamed() {
		let txn: TransactionRecord =
			serde_json::from_value(json!({"amount": 100, "type": "payment"})).unwrap();
		assert_eq!(txn.kind, json!("payment"));
	}

	#[test]
	fn test_text_fields_accept_numbers() {
		let purchases: Vec<PurchaseRecord> = serde_json::from_value(json!([
			{"id": "P1", "make": "Peugeot", "model": 308, "createdAt": 1704153600000u64},
			{"id": "P2", "make": "Renault", "model": "Clio", "createdAt": "2024-01-01"},
		]))
		.unwrap();

		assert_eq!(purchases.len(), 2);
		assert_eq!(purchases[0].model, json!(308));
		assert_eq!(purchases[0].created_at, json!(1704153600000u64));
		assert_eq!(purchases[1].model, json!("Clio"));
	}

	#[test]
	fn test_activity_kind_serializes_lowercase() {
		assert_eq!(serde_json::to_value(ActivityKind::Sale).unwrap(), json!("sale"));
		assert_eq!(serde_json::to_value(ActivityKind::Purchase).unwrap(), json!("purchase"));
	}

	#[test]
	fn test_settings_defaults_from_empty_object() {
		let settings: Settings = serde_json::from_value(json!({})).unwrap();
		assert_eq!(settings, Settings::default());
		assert_eq!(settings.sales_limit, 100);
		assert_eq!(settings.payment_category, "payment");
		assert_eq!(settings.on_fetch_failure, FailurePolicy::Abort);
		assert_eq!(settings.server.port, 3000);
	}

	#[test]
	fn test_failure_policy_snake_case() {
		let settings: Settings =
			serde_json::from_value(json!({"on_fetch_failure": "treat_as_empty"})).unwrap();
		assert_eq!(settings.on_fetch_failure, FailurePolicy::TreatAsEmpty);
	}
}

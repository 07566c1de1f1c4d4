use std::cmp::Reverse;
use std::fmt::Display;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use dashboard_engine::CategoryFilter;
use data_normalization::{normalize_count, normalize_text, parse_timestamp};
use models::{
    CountRecord, ExpenseRecord, PurchaseRecord, SaleRecord, Settings, TransactionRecord,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::error::{ApiError, Result};

/// The six independent reads a fetch cycle performs. Implementations own
/// retry, pagination and authentication; a call either returns its records or fails.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// Most recent sales, newest first, bounded.
    async fn fetch_sales(&self) -> Result<Vec<SaleRecord>>;
    /// Most recent purchases, newest first, bounded.
    async fn fetch_purchases(&self) -> Result<Vec<PurchaseRecord>>;
    async fn fetch_expenses(&self) -> Result<Vec<ExpenseRecord>>;
    /// Transactions already restricted to the payment category.
    async fn fetch_payments(&self) -> Result<Vec<TransactionRecord>>;
    async fn count_partners(&self) -> Result<Option<u64>>;
    async fn count_inspections(&self) -> Result<Option<u64>>;
}

/// Reads record sets from JSON files in one directory:
/// `sales.json`, `purchases.json`, `expenses.json`, `transactions.json`,
/// `partners.json` and `inspections.json`.
pub struct FileDataSource {
    data_dir: PathBuf,
    sales_limit: usize,
    purchases_limit: usize,
    payments: CategoryFilter,
}

impl FileDataSource {
    pub fn new<P: AsRef<Path>>(data_dir: P) -> Self {
        let defaults = Settings::default();
        Self {
            data_dir: data_dir.as_ref().to_path_buf(),
            sales_limit: defaults.sales_limit,
            purchases_limit: defaults.purchases_limit,
            payments: CategoryFilter::new(defaults.payment_category),
        }
    }

    pub fn from_settings<P: AsRef<Path>>(data_dir: P, settings: &Settings) -> Self {
        Self::new(data_dir)
            .with_limits(settings.sales_limit, settings.purchases_limit)
            .with_payment_category(settings.payment_category.as_str())
    }

    pub fn with_limits(mut self, sales_limit: usize, purchases_limit: usize) -> Self {
        self.sales_limit = sales_limit;
        self.purchases_limit = purchases_limit;
        self
    }

    pub fn with_payment_category(mut self, category: &str) -> Self {
        self.payments = CategoryFilter::new(category);
        self
    }

    async fn read_json<T: DeserializeOwned>(&self, source_name: &'static str, file: &str) -> Result<T> {
        let path = self.data_dir.join(file);
        let content = tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| unavailable(source_name, &path, e))?;
        serde_json::from_str(&content).map_err(|e| unavailable(source_name, &path, e))
    }

    async fn read_count(&self, source_name: &'static str, file: &str) -> Result<Option<u64>> {
        let record: CountRecord = self.read_json(source_name, file).await?;
        Ok(normalize_count(&record.count))
    }
}

#[async_trait]
impl DataSource for FileDataSource {
    async fn fetch_sales(&self) -> Result<Vec<SaleRecord>> {
        let mut sales: Vec<SaleRecord> = self.read_json("sales", "sales.json").await?;
        newest_first_bounded(&mut sales, |s| &s.created_at, self.sales_limit);
        Ok(sales)
    }

    async fn fetch_purchases(&self) -> Result<Vec<PurchaseRecord>> {
        let mut purchases: Vec<PurchaseRecord> =
            self.read_json("purchases", "purchases.json").await?;
        newest_first_bounded(&mut purchases, |p| &p.created_at, self.purchases_limit);
        Ok(purchases)
    }

    async fn fetch_expenses(&self) -> Result<Vec<ExpenseRecord>> {
        self.read_json("expenses", "expenses.json").await
    }

    async fn fetch_payments(&self) -> Result<Vec<TransactionRecord>> {
        let mut txns: Vec<TransactionRecord> =
            self.read_json("payments", "transactions.json").await?;
        txns.retain(|t| self.payments.matches(t));
        Ok(txns)
    }

    async fn count_partners(&self) -> Result<Option<u64>> {
        self.read_count("partners", "partners.json").await
    }

    async fn count_inspections(&self) -> Result<Option<u64>> {
        self.read_count("inspections", "inspections.json").await
    }
}

fn unavailable(source_name: &'static str, path: &Path, e: impl Display) -> ApiError {
    ApiError::source_unavailable(source_name, format!("{}: {}", path.display(), e))
}

/// Stable newest-first sort on `createdAt`, then truncation to `limit`.
/// Undated rows go last, keeping their relative order.
fn newest_first_bounded<T>(records: &mut Vec<T>, created_at: fn(&T) -> &Value, limit: usize) {
    records.sort_by_cached_key(|r| {
        Reverse(normalize_text(created_at(r)).as_deref().and_then(parse_timestamp))
    });
    records.truncate(limit);
}

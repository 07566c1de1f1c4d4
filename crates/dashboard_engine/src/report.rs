use std::{fs, path::Path};

use anyhow::{Context, Result};
use chrono::Utc;
use data_normalization::normalize_count;
use models::{
    DashboardSnapshot, DerivedMetrics, ExpenseRecord, PurchaseRecord, SaleRecord,
    TransactionRecord,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::{aggregate, compute_derived};

/// All record sets of one fetch cycle, as exported into a single JSON file.
#[derive(Debug, Deserialize, Default)]
pub struct RecordBundle {
    #[serde(default)]
    pub sales: Vec<SaleRecord>,
    #[serde(default)]
    pub purchases: Vec<PurchaseRecord>,
    #[serde(default)]
    pub expenses: Vec<ExpenseRecord>,
    #[serde(default)]
    pub payments: Vec<TransactionRecord>,
    #[serde(default)]
    pub partners: Value,
    #[serde(default)]
    pub inspections: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub generated_at: String,
    pub snapshot: DashboardSnapshot,
    pub derived: DerivedMetrics,
}

pub fn load_bundle(path: &Path) -> Result<RecordBundle> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Reading input bundle: {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("Parsing input bundle JSON in {}", path.display()))
}

pub fn build_report(bundle: &RecordBundle) -> DashboardReport {
    let snapshot = aggregate(
        &bundle.sales,
        &bundle.purchases,
        &bundle.expenses,
        &bundle.payments,
        normalize_count(&bundle.partners),
        normalize_count(&bundle.inspections),
    );
    let derived = compute_derived(&snapshot);
    DashboardReport {
        generated_at: Utc::now().to_rfc3339(),
        snapshot,
        derived,
    }
}

pub fn write_report_json(report: &DashboardReport, out_path: &Path) -> Result<()> {
    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() && !parent.exists() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Creating output dir: {}", parent.display()))?;
        }
    }
    let json = serde_json::to_string_pretty(report)?;
    fs::write(out_path, json)
        .with_context(|| format!("Writing output file: {}", out_path.display()))?;
    Ok(())
}

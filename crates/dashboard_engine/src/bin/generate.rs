use anyhow::{Context, Result};
use clap::Parser;
use dashboard_engine::{build_report, load_bundle, write_report_json};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "generate-dashboard",
    about = "Aggregate one exported record bundle into a dashboard snapshot."
)]
struct Args {
    /// Record bundle JSON ({sales, purchases, expenses, payments, partners, inspections})
    #[arg(short, long, default_value = "data/bundle.json")]
    input: PathBuf,

    /// Where to write the snapshot JSON
    #[arg(short, long, default_value = "dashboard/snapshot.json")]
    out: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    println!(
        "Generating dashboard snapshot...\n  input : {}\n  output: {}",
        args.input.display(),
        args.out.display()
    );

    let bundle = load_bundle(&args.input).context("load record bundle")?;
    let report = build_report(&bundle);
    write_report_json(&report, &args.out).context("write snapshot.json")?;

    println!(
        "Done. revenue={:.2} profit={:.2} cars_in_stock={} (generated at {})",
        report.snapshot.revenue,
        report.snapshot.profit,
        report.snapshot.cars_in_stock,
        report.generated_at
    );
    Ok(())
}

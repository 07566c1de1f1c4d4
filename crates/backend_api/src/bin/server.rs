use anyhow::Context;
use backend_api::{
    init_tracing, run_server, spawn_periodic_refresh, DashboardState, FileDataSource, Orchestrator,
};
use std::sync::Arc;
use std::time::Duration;
use std::{env, path::PathBuf};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Settings file first, then environment overrides on top
    let settings_path = env::var("SETTINGS_PATH").ok().map(PathBuf::from);
    let mut settings = settings_loader::load_settings_or_default(settings_path.as_ref())
        .context("load settings")?;
    if let Ok(data_dir) = env::var("DATA_DIR") {
        settings.data_dir = data_dir;
    }
    if let Ok(host) = env::var("HOST") {
        settings.server.host = host;
    }
    if let Some(port) = env::var("PORT").ok().and_then(|p| p.parse::<u16>().ok()) {
        settings.server.port = port;
    }

    let crate_root = env::current_dir().context("resolve current directory")?;
    let workspace_root = find_workspace_root().unwrap_or_else(|| crate_root.clone());
    let data_dir = resolve_with_fallback(&settings.data_dir, &[&workspace_root, &crate_root]);

    println!("Dealer Dashboard API Server");
    println!("===========================");
    println!("Workspace root: {}", workspace_root.display());
    println!("Data dir (resolved): {}", data_dir.display());
    println!("Failure policy: {:?}", settings.on_fetch_failure);
    println!("Listening on: {}:{}", settings.server.host, settings.server.port);
    println!();

    if !data_dir.exists() {
        eprintln!("[WARN] data directory not found at: {}", data_dir.display());
        eprintln!("       Continuing; fetch cycles will fail until the record files exist.");
    }

    let source = Arc::new(FileDataSource::from_settings(&data_dir, &settings));
    let state = Arc::new(DashboardState::new());
    let orchestrator = Arc::new(Orchestrator::from_settings(source, state, &settings));

    // Prime the snapshot before accepting requests
    orchestrator.run_cycle().await;

    if settings.refresh_interval_secs > 0 {
        spawn_periodic_refresh(
            orchestrator.clone(),
            Duration::from_secs(settings.refresh_interval_secs),
        );
    }

    run_server(orchestrator, &settings.server.host, settings.server.port).await?;

    Ok(())
}

/// Find the Cargo workspace root by traversing up until a Cargo.toml that contains a [workspace] section.
fn find_workspace_root() -> Option<PathBuf> {
    let mut dir = env::current_dir().ok()?;
    for _ in 0..10 {
        let candidate = dir.join("Cargo.toml");
        if let Ok(content) = std::fs::read_to_string(&candidate) {
            if content.contains("[workspace]") {
                return Some(dir.clone());
            }
        }
        if !dir.pop() {
            break;
        }
    }
    None
}

/// Resolve a raw path string against a list of base directories, returning the first existing match, or the path under the first base.
fn resolve_with_fallback(raw: &str, bases: &[&PathBuf]) -> PathBuf {
    let input = PathBuf::from(raw);
    if input.is_absolute() {
        return input;
    }
    for base in bases {
        let candidate = base.join(&input);
        if candidate.exists() {
            return candidate;
        }
    }
    match bases.first() {
        Some(base) => base.join(input),
        None => input,
    }
}

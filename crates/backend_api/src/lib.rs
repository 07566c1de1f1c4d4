pub mod error;
pub mod handlers;
pub mod orchestrator;
pub mod router;
pub mod server;
pub mod source;
pub mod state;

pub use error::{ApiError, Result};
pub use orchestrator::{spawn_periodic_refresh, Orchestrator};
pub use router::create_router;
pub use server::{init_tracing, run_server};
pub use source::{DataSource, FileDataSource};
pub use state::{CycleId, CycleOutcome, CycleResult, DashboardState, DashboardView};

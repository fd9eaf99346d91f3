//! Circulation entry-point: wires the lending engine, stores, and HTTP surface.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use actix_web::web;
use clap::Parser;
use tracing::warn;
use tracing_subscriber::{fmt, EnvFilter};

use circulation::domain::{LendingService, QueryService};
use circulation::inbound::http::health::HealthState;
use circulation::inbound::http::state::HttpState;
use circulation::outbound::persistence::{CsvAvailabilityStore, InMemoryRecordStore};
use circulation::seed::seed_students_on_startup;
use circulation::server::{create_server, ServerConfig};

/// Command-line and environment configuration.
#[derive(Debug, Parser)]
#[command(name = "circulation", about = "Library circulation server")]
struct Cli {
    /// Socket address to listen on.
    #[arg(long, env = "CIRCULATION_BIND", default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// CSV file holding per-title availability flags.
    #[arg(long, env = "CIRCULATION_BOOKS_CSV", default_value = "books.csv")]
    books: PathBuf,

    /// Optional CSV roster of students imported on first boot.
    #[arg(long, env = "CIRCULATION_STUDENTS_CSV")]
    students: Option<PathBuf>,

    /// Upper bound, in milliseconds, on any single store call.
    #[arg(long, env = "CIRCULATION_STORE_TIMEOUT_MS", default_value_t = 5000)]
    store_timeout_ms: u64,
}

/// Application bootstrap.
#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();

    let records = Arc::new(InMemoryRecordStore::new());
    let availability = Arc::new(CsvAvailabilityStore::open(&cli.books).map_err(|e| {
        std::io::Error::other(format!(
            "failed to open availability store {}: {e}",
            cli.books.display()
        ))
    })?);

    seed_students_on_startup(records.as_ref(), cli.students.as_deref())
        .await
        .map_err(|e| std::io::Error::other(format!("failed to seed students: {e}")))?;

    let lending = LendingService::with_store_timeout(
        Arc::clone(&records),
        Arc::clone(&availability),
        Duration::from_millis(cli.store_timeout_ms),
    );
    let queries = QueryService::new(records, availability);
    let http_state = web::Data::new(HttpState::new(Arc::new(lending), Arc::new(queries)));
    let health_state = web::Data::new(HealthState::new());

    let server = create_server(health_state, http_state, &ServerConfig::new(cli.bind))?;
    server.await
}

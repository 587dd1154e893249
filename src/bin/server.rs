use std::{fs::OpenOptions, net::SocketAddr, process::ExitCode, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;

#[cfg(debug_assertions)]
use tower_livereload::LiveReloadLayer;

use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use cashflow_rs::{
    AppState, BackendConfig, Error,
    backend::{InMemoryBackend, SupabaseBackend, TransactionBackend},
    build_router, get_local_offset, graceful_shutdown,
    transaction::{TransactionManager, UuidGenerator},
};

/// The web server for cashflow_rs.
///
/// The Supabase connection is read from the environment variables
/// `SUPABASE_URL`, `SUPABASE_ANON_KEY` and optionally `SUPABASE_TABLE`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// The canonical name of the timezone dates are shown in, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,

    /// Keep transactions in memory instead of connecting to Supabase.
    #[arg(long)]
    in_memory: bool,

    /// File path to write the debug log to.
    #[arg(long, default_value = "debug.log")]
    log_path: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(error) = setup_logging(&args.log_path) {
        eprintln!("Could not open the log file {}: {error}", args.log_path);
        return ExitCode::FAILURE;
    }

    if get_local_offset(&args.timezone).is_none() {
        tracing::error!("\"{}\" is not a valid, canonical timezone", args.timezone);
        return ExitCode::FAILURE;
    }

    let result = if args.in_memory {
        tracing::warn!("Using the in-memory backend, changes will be lost on shutdown");
        serve(InMemoryBackend::new(), &args).await
    } else {
        match BackendConfig::from_env().and_then(|config| SupabaseBackend::new(&config)) {
            Ok(backend) => serve(backend, &args).await,
            Err(error) => Err(error),
        }
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("The server stopped: {error}");
            ExitCode::FAILURE
        }
    }
}

/// Load the stored transactions from `backend` and serve the app until shutdown.
async fn serve<B: TransactionBackend>(backend: B, args: &Args) -> Result<(), Error> {
    let transactions = backend.query_transactions().await?;
    tracing::info!("Loaded {} transactions from the backend", transactions.len());

    let manager = TransactionManager::from_snapshot(transactions, UuidGenerator);
    let app_state = AppState::new(backend, manager, &args.timezone);

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = add_tracing_layer(build_router(app_state));

    #[cfg(debug_assertions)]
    let router = router.layer(LiveReloadLayer::new());

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));
    tracing::info!("HTTP server listening on {}", addr);
    axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
        .map_err(|error| Error::Server(error.to_string()))
}

fn setup_logging(log_path: &str) -> std::io::Result<()> {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)?;

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();

    Ok(())
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged by the handlers, so skip the default 5xx logging.
        .on_failure(());

    router.layer(tracing_layer)
}

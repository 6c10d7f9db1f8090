use std::{
    fs::OpenOptions,
    io,
    net::IpAddr,
    path::{Path, PathBuf},
    process::ExitCode,
    sync::Arc,
};

use clap::Parser;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use money_manager::{
    AppState, DEFAULT_PORTS, LocalTimezone, MAX_REQUEST_SIZE, TransactionStore,
    bind_first_available, graceful_shutdown, serve,
};

/// The JSON API server for money_manager.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the transactions data file.
    #[arg(long, default_value = "data.csv")]
    data_path: PathBuf,

    /// The address to listen on.
    #[arg(long, default_value = "0.0.0.0")]
    host: IpAddr,

    /// The ports to try, in order, until one is free.
    #[arg(short, long = "port", value_delimiter = ',', default_values_t = DEFAULT_PORTS)]
    ports: Vec<u16>,

    /// Canonical timezone name used for today's date, e.g. "Asia/Jakarta".
    ///
    /// Defaults to the system's local offset.
    #[arg(long)]
    timezone: Option<String>,

    /// The most bytes read from a request, anything longer is truncated.
    #[arg(long, default_value_t = MAX_REQUEST_SIZE)]
    max_request_size: usize,

    /// File path to the debug log.
    #[arg(long, default_value = "debug.log")]
    log_path: PathBuf,
}

fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(error) = setup_logging(&args.log_path) {
        eprintln!("Could not open log file {}: {error}", args.log_path.display());
        return ExitCode::FAILURE;
    }

    // Reading the local offset is only reliable before other threads start.
    let system_timezone = LocalTimezone::system();

    let local_timezone = match &args.timezone {
        Some(name) => match LocalTimezone::named(name) {
            Ok(timezone) => timezone,
            Err(error) => {
                tracing::error!("{error}");
                return ExitCode::FAILURE;
            }
        },
        None => system_timezone,
    };

    let store = TransactionStore::new(args.data_path.clone(), local_timezone);
    let state = match AppState::new(store) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Failed to initialize data file: {error}");
            return ExitCode::FAILURE;
        }
    };

    let runtime = match tokio::runtime::Runtime::new() {
        Ok(runtime) => runtime,
        Err(error) => {
            tracing::error!("Could not start the async runtime: {error}");
            return ExitCode::FAILURE;
        }
    };

    runtime.block_on(run(args, state))
}

async fn run(args: Args, state: AppState) -> ExitCode {
    let listener = match bind_first_available(args.host, &args.ports).await {
        Ok(listener) => listener,
        Err(error) => {
            tracing::error!("Failed to start server: {error}");
            return ExitCode::FAILURE;
        }
    };

    let port = match listener.local_addr() {
        Ok(addr) => addr.port(),
        Err(error) => {
            tracing::error!("Could not read the bound address: {error}");
            return ExitCode::FAILURE;
        }
    };

    print_banner(port, &args.data_path);

    serve(listener, state, args.max_request_size, graceful_shutdown()).await;

    ExitCode::SUCCESS
}

fn print_banner(port: u16, data_path: &Path) {
    tracing::info!("Money Manager backend listening on port {port}");
    tracing::info!("URL: http://localhost:{port}");
    tracing::info!("Data: {}", data_path.display());
    tracing::info!("Waiting for connections...");
}

fn setup_logging(log_path: &Path) -> io::Result<()> {
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

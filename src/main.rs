use clap::Parser;
use log::info;
use matter_sensor_bridge::bridge::SensorBridge;
use matter_sensor_bridge::config::{self, Config};
use matter_sensor_bridge::error::Result;
use matter_sensor_bridge::input::run_sensor_simulation;
use matter_sensor_bridge::matter::device_types::DEV_TYPE_AGGREGATOR;
use matter_sensor_bridge::matter::spawn_stack_thread;
use parking_lot::RwLock as SyncRwLock;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::signal;
use tokio::time::Duration;
use tokio_util::sync::CancellationToken;

#[derive(Parser)]
#[command(name = "matter-sensor-bridge")]
#[command(about = "Expose sensors as bridged Matter endpoints")]
struct Cli {
    /// Configuration file (JSON). Defaults to <config dir>/matter-sensor-bridge/config.json
    #[arg(long, env = "BRIDGE_CONFIG")]
    config: Option<PathBuf>,

    /// Log filter, overrides RUST_LOG (e.g. "debug" or "matter_sensor_bridge=trace")
    #[arg(long)]
    log_level: Option<String>,

    /// Do not run the sensor simulation
    #[arg(long)]
    no_simulation: bool,
}

fn init_logger(filter: Option<&str>) {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if let Some(filter) = filter {
        builder.parse_filters(filter);
    }
    builder.format_timestamp_millis().init();
}

#[tokio::main]
async fn main() {
    config::load_dotenv();
    let cli = Cli::parse();
    init_logger(cli.log_level.as_deref());

    if let Err(e) = run(cli).await {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    info!("Starting Matter Sensor Bridge");

    let mut config = Config::load(cli.config.as_deref())?;
    if cli.no_simulation {
        config.simulation.enabled = false;
    }
    info!("Configuration loaded:");
    info!(
        "  Aggregator endpoint: {} (device type 0x{:04X})",
        config.bridge.aggregator_endpoint_id, DEV_TYPE_AGGREGATOR.dtype
    );
    info!(
        "  Dynamic endpoints: {} slots from {}",
        config.bridge.dynamic_endpoint_capacity, config.bridge.first_dynamic_endpoint_id
    );
    if let Some(budget) = config.bridge.heap_budget {
        info!("  Endpoint heap budget: {} bytes", budget);
    }

    let mut bridge = SensorBridge::new(&config);
    bridge.begin()?;

    // Stack context runs on its own thread, as a radio/transport stack would
    let worker = Arc::new(bridge.stack_worker());
    let stack_thread = spawn_stack_thread(worker.clone())?;
    info!("Matter stack started on dedicated thread");

    let bridge = Arc::new(SyncRwLock::new(bridge));
    let cancel = CancellationToken::new();
    let simulation = config.simulation.enabled.then(|| {
        run_sensor_simulation(
            bridge.clone(),
            Duration::from_secs(config.simulation.interval_secs),
            cancel.clone(),
        )
    });

    info!("Matter Sensor Bridge is running");
    info!("  - Press Ctrl+C to exit");

    // Wait for shutdown signal
    match signal::ctrl_c().await {
        Ok(()) => info!("Received shutdown signal"),
        Err(e) => log::error!("Failed to listen for shutdown signal: {}", e),
    }

    cancel.cancel();
    if let Some(simulation) = simulation
        && let Err(e) = simulation.await
    {
        log::error!("Sensor simulation task failed: {}", e);
    }

    bridge.write().end();
    worker.stop();
    match tokio::task::spawn_blocking(move || stack_thread.join()).await {
        Ok(Ok(())) => {}
        Ok(Err(_)) => log::error!("Matter stack thread panicked"),
        Err(e) => log::error!("Failed to join Matter stack thread: {}", e),
    }

    info!("Matter Sensor Bridge stopped");
    Ok(())
}

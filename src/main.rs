use anyhow::Result;
use clap::Parser;
use log::{error, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::thread;
use std::time::{Duration, Instant};

use latwatch::config::MonitorConfig;
use latwatch::controller::MonitorController;
use latwatch::csvlog::CsvSink;
use latwatch::probe::HttpProbe;
use latwatch::server::{serve_latest, WsHub};
use latwatch::traits::TimeSource;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Endpoint to probe with HEAD requests
    #[arg(long, default_value = "https://antrean.logammulia.com/antrean")]
    url: String,

    #[arg(long, default_value_t = 3000)]
    ws_port: u16,

    #[arg(long, default_value_t = 3001)]
    http_port: u16,

    #[arg(long, default_value = "monitor_log.csv")]
    csv: String,

    #[arg(long, default_value_t = 1000)]
    interval_ms: u64,
}

// Concrete Implementations for Traits
struct RealTimeSource;

impl TimeSource for RealTimeSource {
    fn now_utc(&self) -> chrono::DateTime<chrono::Utc> {
        chrono::Utc::now()
    }
}

fn main() -> Result<()> {
    env_logger::builder()
        .format_timestamp(None)
        .filter_level(log::LevelFilter::Info)
        .init();

    let args = Args::parse();

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();

    ctrlc::set_handler(move || {
        info!("Ctrl+C received. Shutting down...");
        r.store(false, Ordering::SeqCst);
    })?;

    let mut config = MonitorConfig::default();
    config.sampling.interval_ms = args.interval_ms;

    let probe = HttpProbe::new(&args.url)?;
    let sink = CsvSink::new(&args.csv);
    let latest = Arc::new(RwLock::new(None));

    let hub = WsHub::new();
    if let Err(e) = hub.listen(args.ws_port) {
        error!("{}", e);
        std::process::exit(1);
    }
    if let Err(e) = serve_latest(args.http_port, latest.clone()) {
        error!("{}", e);
        std::process::exit(1);
    }

    let interval = Duration::from_millis(config.sampling.interval_ms);
    let mut controller = MonitorController::new(
        probe,
        sink,
        hub,
        RealTimeSource,
        latest,
        config,
        rand::rng(),
    );

    info!("Watching {} every {:?}", args.url, interval);
    let mut last_status = Instant::now();

    while running.load(Ordering::SeqCst) {
        let tick_start = Instant::now();

        controller.run_tick();

        if last_status.elapsed() >= Duration::from_secs(10) {
            controller.log_status();
            last_status = Instant::now();
        }

        // Fixed-period driver: sleep out the remainder of the interval so
        // ticks stay strictly serial with no overlap.
        let elapsed = tick_start.elapsed();
        if elapsed < interval {
            thread::sleep(interval - elapsed);
        }
    }

    info!("Exiting.");
    Ok(())
}

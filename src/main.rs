use std::time::Instant;

use clap::Parser;
use env_logger::{Builder, Env};
use log::{debug, error, info, LevelFilter};
use sysinfo::{ProcessExt, System, SystemExt};

use real_estate_price::cli::{self, RealEstateArgs};
use real_estate_price::{AppContext, PredictorError};

fn monitor_memory() -> u64 {
    /* Resident memory of this process in bytes, 0 when unavailable */
    let mut sys = System::new();
    match sysinfo::get_current_pid() {
        Ok(pid) => {
            sys.refresh_process(pid);
            sys.process(pid).map(|p| p.memory()).unwrap_or(0)
        }
        Err(_) => 0,
    }
}

async fn real_estate_app(cli: RealEstateArgs) -> Result<(), PredictorError> {
    let config = cli.resolve_config()?;
    debug!("Configuration {:#?}", config);
    let ctx = AppContext::new(config);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    cli::run(&ctx, &cli.command, &mut out).await
}

#[tokio::main]
async fn main() -> Result<(), PredictorError> {
    let cli = RealEstateArgs::parse();

    let log_level = match cli.verbose {
        1 => LevelFilter::Debug,
        2 => LevelFilter::Trace,
        _ => LevelFilter::Info,
    };

    let env = Env::new().filter("REAL_ESTATE_LOG");
    Builder::new()
        .filter(Some("real_estate_price"), log_level)
        .parse_env(env)
        .init();

    debug!("Arguments {:#?}", cli);

    let start_time = Instant::now();
    let start_memory = monitor_memory();

    if let Err(e) = real_estate_app(cli).await {
        error!("{}", e);
        return Err(e);
    }

    info!("Time elapsed: {:?}", start_time.elapsed());
    info!(
        "Memory used: {} bytes",
        monitor_memory().saturating_sub(start_memory)
    );
    Ok(())
}

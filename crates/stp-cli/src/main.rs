use std::{path::PathBuf, str::FromStr};

use anyhow::{bail, Context, Result};
use clap::Parser;
use stp_core::ExecutorSettings;
use stp_executor::TeamController;
use tokio::{sync::broadcast, time::Duration};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

mod scenario;
mod toy_world;

use scenario::Scenario;

#[derive(Debug, Clone, Parser)]
#[command(name = "stp-cli")]
pub(crate) struct Args {
    #[clap(long, short, default_value = "capture")]
    scenario: Scenario,

    /// Executor settings, created with defaults if missing
    #[clap(long, default_value = "stp-settings.json")]
    settings: PathBuf,

    /// Stop after this many cycles
    #[clap(long)]
    cycles: Option<u64>,

    /// Control rate in Hz
    #[clap(long, default_value = "60")]
    rate: f64,

    /// Probability of a flipped breakbeam reading per player and cycle
    #[clap(long, default_value = "0.0")]
    sensor_noise: f64,

    #[clap(long, default_value = "0")]
    seed: u64,

    /// Print every cycle's output as a JSON line
    #[clap(long, default_value = "false")]
    json: bool,

    #[clap(long, default_value = "info")]
    log_level: String,

    /// Log file path, "auto" for the data directory or "none"
    #[clap(long, default_value = "auto")]
    log_file: String,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let args = Args::parse();

    let log_file_path = match args.log_file.as_str() {
        "none" => None,
        "auto" => {
            let time = chrono::Local::now().format("%Y-%m-%d_%H-%M-%S").to_string();
            let filename = format!("stp-{time}.log");
            let path = dirs::data_local_dir()
                .map(|p| p.join("stp").join(&filename))
                .unwrap_or_else(|| PathBuf::from(&filename));
            if let Some(dir) = path.parent() {
                tokio::fs::create_dir_all(dir)
                    .await
                    .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
            }
            Some(path)
        }
        path => {
            let path = PathBuf::from(path);
            if path.exists() {
                bail!("Log file already exists: {}", path.display());
            }
            Some(path)
        }
    };

    let (logfile_layer, _guard) = match &log_file_path {
        Some(path) => {
            let dir = path.parent().unwrap_or_else(|| std::path::Path::new("."));
            let name = path.file_name().context("Log file path has no file name")?;
            let appender = tracing_appender::rolling::never(dir, name);
            let (non_blocking_appender, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::Layer::default()
                .json()
                .with_ansi(false)
                .with_writer(non_blocking_appender);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    let log_level = tracing::Level::from_str(&args.log_level)
        .with_context(|| format!("Invalid log level: {}", args.log_level))?;
    let stdout_layer = fmt::Subscriber::builder()
        .with_max_level(log_level)
        .without_time()
        .finish();
    stdout_layer
        .with(logfile_layer)
        .try_init()
        .context("Unable to set global tracing subscriber")?;

    if let Some(path) = &log_file_path {
        tracing::info!("Saving logs to {}", path.display());
    }

    let period = cycle_period(args.rate)?;
    let settings = ExecutorSettings::load_or_insert(&args.settings)?;

    let (stop_tx, stop_rx) = broadcast::channel(1);
    let mut main_task = tokio::spawn(run(args, period, settings, stop_rx));

    tokio::select! {
        result = &mut main_task => {
            return result.context("Controller task failed")?;
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for ctrl-c")?;
        }
    }

    tracing::info!("Shutting down");
    // The task may already be gone, in which case there is nobody to notify
    let _ = stop_tx.send(());
    main_task.await.context("Controller task failed")?
}

/// Time between control cycles at `rate` Hz.
fn cycle_period(rate: f64) -> Result<Duration> {
    if !(rate.is_finite() && rate > 0.0) {
        bail!("Control rate must be positive and finite, got {rate}");
    }
    match Duration::try_from_secs_f64(1.0 / rate) {
        Ok(period) if !period.is_zero() => Ok(period),
        _ => bail!("Control rate {rate} Hz is too high"),
    }
}

/// Drive the controller against the toy world until every tactic is done, the
/// cycle limit is hit, or a stop is requested.
async fn run(
    args: Args,
    period: Duration,
    settings: ExecutorSettings,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<()> {
    let dt = period.as_secs_f64();
    let mut world = args.scenario.world(&settings, args.sensor_noise, args.seed);
    let mut controller = TeamController::new(settings.clone());
    for tactic in args.scenario.tactics(&settings) {
        controller.add_tactic(tactic);
    }

    let mut interval = tokio::time::interval(period);
    let mut cycle: u64 = 0;
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = interval.tick() => {
                let snapshot = world.snapshot(dt);
                let output = controller.update(&snapshot);
                if args.json {
                    println!("{}", serde_json::to_string(&output)?);
                }

                for id in &output.done {
                    if let Some(tactic) = controller.remove_tactic(*id) {
                        tracing::info!(
                            "{} done after {} cycles ({:.2} s)",
                            tactic.name(),
                            cycle + 1,
                            world.time()
                        );
                    }
                }
                world.step(dt, &output.inputs);
                cycle += 1;

                if controller.tactic_ids().next().is_none() {
                    tracing::info!("All tactics done, ball held by {:?}", world.ball_holder());
                    break;
                }
                if args.cycles.map_or(false, |max| cycle >= max) {
                    tracing::info!("Stopping after {} cycles", cycle);
                    break;
                }
            }
        }
    }

    Ok(())
}

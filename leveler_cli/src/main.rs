mod cli;
mod error_fmt;
mod level;

use std::path::Path;

use clap::Parser;
use eyre::{Result, WrapErr};
use leveler_config::Config;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::{Cli, Commands, FILE_GUARD, JSON_MODE};
use crate::error_fmt::{exit_code_for_error, format_error_json, humanize};

fn main() {
    let _ = color_eyre::install();
    let cli = Cli::parse();
    let _ = JSON_MODE.set(cli.json);

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            tracing::error!(error = %e, "leveler failed");
            if JSON_MODE.get().copied().unwrap_or(false) {
                println!("{}", format_error_json(&e));
            } else {
                eprintln!("{}", humanize(&e));
            }
            exit_code_for_error(&e)
        }
    };
    std::process::exit(code);
}

fn load_config(path: &Path) -> Result<Config> {
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("read config {}", path.display()))?;
    let cfg = leveler_config::load_toml(&text)
        .map_err(|e| eyre::eyre!("invalid configuration in {}: {e}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

/// Console layer on stderr (stdout carries results); optional JSON file layer from `[logging]`.
fn init_tracing(cli: &Cli, cfg: &Config) {
    let console_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let console = if cli.json {
        fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    } else {
        fmt::layer()
            .with_target(false)
            .with_writer(std::io::stderr)
            .with_filter(console_filter)
            .boxed()
    };

    let file = cfg.logging.file.as_deref().map(|path| {
        let path = Path::new(path);
        let dir = path
            .parent()
            .filter(|d| !d.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "leveler.log".into());
        let appender = match cfg.logging.rotation.as_deref() {
            Some("daily") => tracing_appender::rolling::daily(dir, name),
            Some("hourly") => tracing_appender::rolling::hourly(dir, name),
            _ => tracing_appender::rolling::never(dir, name),
        };
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let _ = FILE_GUARD.set(guard);
        let level = cfg.logging.level.as_deref().unwrap_or("info");
        fmt::layer()
            .json()
            .with_ansi(false)
            .with_writer(writer)
            .with_filter(EnvFilter::new(level))
            .boxed()
    });

    let _ = tracing_subscriber::registry()
        .with(console)
        .with(file)
        .try_init();
}

fn run(cli: &Cli) -> Result<i32> {
    let cfg = load_config(&cli.config)?;
    init_tracing(cli, &cfg);

    let script = cli
        .probe_script
        .as_deref()
        .map(leveler_config::load_probe_script_csv)
        .transpose()?;
    if let Some(s) = &script {
        tracing::info!(samples = s.len(), "using scripted probe readings");
    }

    match &cli.cmd {
        Commands::Level { point } => {
            let report = level::run_level(&cfg, *point, script)?;
            if cli.json {
                println!("{}", level::outcome_json(&report));
            } else {
                println!("{}", report.outcome);
            }
            Ok(level::exit_code_for_outcome(&report.outcome))
        }
        Commands::SelfCheck => self_check(&cfg, script.as_deref()),
    }
}

fn self_check(cfg: &Config, script: Option<&[f32]>) -> Result<i32> {
    let sim = level::sim_from_config(cfg);
    let params = leveler_core::runner::RunParams::from_config(cfg, None);

    #[cfg(all(feature = "hardware", target_os = "linux"))]
    let servos = level::pwm_servos(cfg)?;
    #[cfg(not(all(feature = "hardware", target_os = "linux")))]
    let servos = sim.servos();

    // Building runs the same validation as a real run, without moving anything.
    let controller = leveler_core::CalibrationController::builder()
        .with_motion(sim.motion())
        .with_probe(sim.probe())
        .with_servos(servos)
        .with_geometry(params.geometry)
        .with_servo_cfg(params.servo)
        .with_leveling_cfg(params.leveling)
        .build()?;
    tracing::debug!(?controller, "controller ready");

    let homed = leveler_traits::Motion::all_axes_homed(&sim.motion());
    println!(
        "self-check ok: homed={homed} west_servo={} east_servo={} tolerance_mm={}",
        cfg.servos.west_index, cfg.servos.east_index, cfg.leveling.tolerance_mm
    );
    let geometry = controller.geometry();
    for corner in leveler_core::Corner::ALL {
        let servo = controller.servo_cfg().index_of(geometry.actuator_of(corner));
        println!(
            "  {corner}: probe {} servo {servo} lever {} .. {}",
            geometry.position_of(corner),
            geometry.lever_endpoint(corner, false),
            geometry.lever_endpoint(corner, true),
        );
    }
    if let Some(s) = script {
        println!("probe script: {} samples", s.len());
    }
    Ok(0)
}

//! Headless runner.
//!
//! ```text
//! attractors <system> [count] [ticks]
//! attractors --config <file.json> [ticks]
//! ```
//!
//! Set `RUST_LOG=debug` to watch controller adjustments.

use attractors::{ConfigError, Simulation, SimulationConfig, SystemKind, Vec3};
use std::process::ExitCode;

const DEFAULT_TICKS: usize = 600;

fn usage() -> String {
    format!(
        "usage: attractors <system> [count] [ticks]\n       attractors --config <file.json> [ticks]\n\nsystems: {}",
        SystemKind::names().join(", ")
    )
}

fn parse_args(args: &[String]) -> Result<(SimulationConfig, usize), String> {
    let number = |arg: Option<&String>, what: &str| -> Result<Option<usize>, String> {
        arg.map(|s| s.parse().map_err(|_| format!("invalid {}: {}", what, s)))
            .transpose()
    };

    match args.first().map(String::as_str) {
        None | Some("-h") | Some("--help") => Err(usage()),
        Some("--config") => {
            let path = args.get(1).ok_or_else(usage)?;
            let config = SimulationConfig::from_json_file(path).map_err(|e| e.to_string())?;
            let ticks = number(args.get(2), "tick count")?.unwrap_or(DEFAULT_TICKS);
            Ok((config, ticks))
        }
        Some(system) => {
            let mut config = SimulationConfig::new(system);
            if let Some(count) = number(args.get(1), "particle count")? {
                config = config.with_total_count(count);
            }
            let ticks = number(args.get(2), "tick count")?.unwrap_or(DEFAULT_TICKS);
            Ok((config, ticks))
        }
    }
}

fn run(config: &SimulationConfig, ticks: usize) -> Result<(), ConfigError> {
    let mut sim = Simulation::from_config(config)?;
    let mut respawned = 0;
    let mut recovered = 0;

    for _ in 0..ticks {
        let report = sim.tick();
        respawned += report.respawned;
        recovered += report.recovered;
    }

    let (min, max) = sim
        .particles()
        .iter()
        .fold((Vec3::splat(f32::MAX), Vec3::splat(f32::MIN)), |(lo, hi), p| {
            (lo.min(p.position), hi.max(p.position))
        });

    println!("system:      {}", sim.system());
    println!("ticks:       {}", ticks);
    println!("active:      {} / {}", sim.active_count(), sim.total_count());
    println!("mean cost:   {:.3}ms", sim.timer().mean_ms());
    println!("bounds:      {:.3?} .. {:.3?}", min, max);
    println!("respawned:   {}", respawned);
    println!("recovered:   {}", recovered);
    Ok(())
}

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let (config, ticks) = match parse_args(&args) {
        Ok(parsed) => parsed,
        Err(msg) => {
            eprintln!("{}", msg);
            return ExitCode::FAILURE;
        }
    };

    match run(&config, ticks) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

// CLI entry point for the headless voxel sandbox.
//
// Builds a `HeadlessHost` from an optional JSON config, replays an optional
// JSON input script against it, and prints the cubes left in the sandbox as
// a JSON array on stdout. Logging goes to stderr through `env_logger`
// (default level `info`, override with `RUST_LOG`).
//
// Usage:
//   sandbox [OPTIONS]
//     --config <PATH>   Host config JSON (default: built-in defaults)
//     --script <PATH>   Input script JSON to replay (default: none)

use log::info;
use std::path::PathBuf;
use voxel_sandbox_host::script::{Script, run_script};
use voxel_sandbox_host::{HeadlessHost, HostConfig};
use voxel_sandbox_sim::types::Cube;

struct Args {
    config: Option<PathBuf>,
    script: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = parse_args();

    let config = match &args.config {
        Some(path) => HostConfig::load(path).unwrap_or_else(|e| {
            eprintln!("Failed to load config {}: {e}", path.display());
            std::process::exit(1);
        }),
        None => HostConfig::default(),
    };

    let mut host = HeadlessHost::new(config).unwrap_or_else(|e| {
        eprintln!("Invalid config: {e}");
        std::process::exit(1);
    });

    if let Some(path) = &args.script {
        let script = Script::load(path).unwrap_or_else(|e| {
            eprintln!("Failed to load script {}: {e}", path.display());
            std::process::exit(1);
        });
        let report = run_script(&mut host, &script);
        info!(
            "script done: {} steps, {} placed, {} removed, {} rejected",
            report.steps, report.placed, report.removed, report.rejected
        );
    }

    let cubes: Vec<&Cube> = host.state().index().all_placed().collect();
    match serde_json::to_string_pretty(&cubes) {
        Ok(json) => println!("{json}"),
        Err(e) => {
            eprintln!("Failed to serialize cubes: {e}");
            std::process::exit(1);
        }
    }
}

/// Parse command-line arguments. Uses simple `std::env::args()` matching.
fn parse_args() -> Args {
    let mut parsed = Args {
        config: None,
        script: None,
    };
    let args: Vec<String> = std::env::args().collect();
    let mut i = 1;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                parsed.config = Some(args.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--config requires a path");
                    std::process::exit(1);
                }));
            }
            "--script" => {
                i += 1;
                parsed.script = Some(args.get(i).map(PathBuf::from).unwrap_or_else(|| {
                    eprintln!("--script requires a path");
                    std::process::exit(1);
                }));
            }
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => {
                eprintln!("Unknown argument: {other}");
                print_usage();
                std::process::exit(1);
            }
        }
        i += 1;
    }

    parsed
}

fn print_usage() {
    println!("Usage: sandbox [OPTIONS]");
    println!();
    println!("Options:");
    println!("  --config <PATH>   Host config JSON (default: built-in defaults)");
    println!("  --script <PATH>   Input script JSON to replay (default: none)");
    println!("  --help, -h        Show this help");
}

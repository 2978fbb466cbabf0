//! WARDEN-CORE operator CLI entry point.
//!
//! The gateway itself is a library embedded by the serving process; this
//! binary covers operator preflight and configuration inspection:
//!
//! - `warden-core-cli check` - load config and build the TLS context (exit 0/1)
//! - `warden-core-cli config show` - print the effective configuration
//! - `warden-core-cli config defaults` - print the built-in defaults
//! - `warden-core-cli version`

use std::process::ExitCode;

use warden_core::config as warden_config;
use warden_core::telemetry::{init_logging, LogFormat};
use warden_core::tls;

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().collect();
    let command = args.get(1).map(|s| s.as_str()).unwrap_or("help");

    match command {
        "check" => run_check(),
        "config" => {
            let subcommand = args.get(2).map(|s| s.as_str()).unwrap_or("show");
            match subcommand {
                "show" => {
                    print_config(&warden_config::load());
                    ExitCode::SUCCESS
                }
                "defaults" => {
                    for k in warden_config::ENV_KEYS_HELP {
                        println!("{}", k);
                    }
                    ExitCode::SUCCESS
                }
                _ => {
                    eprintln!("Unknown config subcommand: {}", subcommand);
                    print_usage();
                    ExitCode::FAILURE
                }
            }
        }
        "version" | "--version" | "-V" => {
            println!("WARDEN-CORE {}", env!("CARGO_PKG_VERSION"));
            ExitCode::SUCCESS
        }
        "help" | "--help" | "-h" => {
            print_usage();
            ExitCode::SUCCESS
        }
        _ => {
            eprintln!("Unknown command: {}", command);
            print_usage();
            ExitCode::FAILURE
        }
    }
}

/// Preflight: refuse to bless a deployment whose transport material does
/// not load. Mirrors the fatal-at-startup contract of the serving process.
fn run_check() -> ExitCode {
    let cfg = warden_config::load();
    let _ = init_logging(LogFormat::Pretty, &cfg.log_level);

    match tls::build_tls_config(&cfg.tls_cert, &cfg.tls_key) {
        Ok(_) => {
            eprintln!(
                "TLS preflight: PASSED ({} / {})",
                cfg.tls_cert.display(),
                cfg.tls_key.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("TLS preflight: FAILED: {}", e);
            eprintln!("Refusing to start without a valid transport configuration.");
            ExitCode::FAILURE
        }
    }
}

fn print_config(cfg: &warden_config::EnvConfig) {
    match serde_json::to_string_pretty(&cfg.effective_config()) {
        Ok(json) => println!("{}", json),
        Err(e) => eprintln!("Failed to serialize config: {}", e),
    }
}

fn print_usage() {
    eprintln!("WARDEN-CORE operator CLI");
    eprintln!();
    eprintln!("Usage: warden-core-cli <command>");
    eprintln!();
    eprintln!("Commands:");
    eprintln!("  check             Load config and build the TLS context (exit 0/1)");
    eprintln!("  config show       Print the effective configuration as JSON");
    eprintln!("  config defaults   List the WARDEN_* environment variables");
    eprintln!("  version           Print version");
    eprintln!("  help              Show this help");
}

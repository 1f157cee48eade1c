//! `lightmap` – command line entry point for the Lightmap memory graph.
//!
//! 1. Loads `~/.lightmap/config.toml` (falling back to defaults) and applies
//!    `LIGHTMAP_*` environment overrides.
//! 2. Installs the `tracing` subscriber before any runtime exists.
//! 3. Dispatches a subcommand:
//!    - `serve` (default) boots the HTTP API until **Ctrl-C**.
//!    - `demo` ingests a handful of sample memories and prints the tree.
//!    - `config` prints the effective configuration, `--init` writes it.

mod config;

use std::net::IpAddr;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use colored::Colorize;
use tracing::{error, info};

use lightmap_encoder::LightEncoder;
use lightmap_memory::{MindMapService, NewMemory};
use lightmap_server::Server;
use lightmap_types::MindMapError;

#[derive(Debug, Parser)]
#[command(name = "lightmap", version, about = "Photonic memory graph server")]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Serve the HTTP API.
    Serve {
        /// Listening port (overrides the config file).
        #[arg(long)]
        port: Option<u16>,
        /// Listening address (overrides the config file).
        #[arg(long)]
        bind: Option<IpAddr>,
    },
    /// Ingest sample memories into a scratch graph and print it.
    Demo,
    /// Show the effective configuration.
    Config {
        /// Write the default config file if none exists.
        #[arg(long)]
        init: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // ── Configuration ─────────────────────────────────────────────────────
    let (cfg, config_error) = config::effective(config::load());

    // ── Structured logging ────────────────────────────────────────────────
    // Held until exit so pending spans are flushed.
    let _guard = lightmap_server::init_tracing("lightmap", cfg.log_format == config::LogFormat::Json);

    print_banner();

    if let Some(e) = config_error {
        println!("{}: {}", "Config error".red(), e);
        println!("  Using default configuration.");
    }

    match cli.command.unwrap_or(Command::Serve { port: None, bind: None }) {
        Command::Serve { port, bind } => {
            let mut cfg = cfg;
            if let Some(port) = port {
                cfg.port = port;
            }
            if let Some(bind) = bind {
                cfg.bind_address = bind;
            }
            serve(cfg)
        }
        Command::Demo => match run_demo(&cfg) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                println!("{}: {}", "Demo failed".red(), e);
                ExitCode::FAILURE
            }
        },
        Command::Config { init } => show_config(&cfg, init),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// serve
// ─────────────────────────────────────────────────────────────────────────────

fn serve(cfg: config::Config) -> ExitCode {
    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to start tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    let service = Arc::new(
        MindMapService::in_memory(Arc::new(LightEncoder::new()))
            .with_root_label(cfg.root_label.clone()),
    );
    let server = Server::new(service)
        .with_bind_address(cfg.bind_address)
        .with_port(cfg.port);

    println!(
        "  Serving on {}  (Ctrl-C to stop)\n",
        format!("http://{}:{}", cfg.bind_address, cfg.port).bold()
    );

    runtime.block_on(async move {
        tokio::select! {
            result = server.run() => match result {
                Ok(()) => ExitCode::SUCCESS,
                Err(e) => {
                    error!(error = %e, "server stopped");
                    println!("{}: {}", "Server error".red(), e);
                    ExitCode::FAILURE
                }
            },
            _ = tokio::signal::ctrl_c() => {
                println!();
                println!("{}", "⚠  Ctrl-C received – shutting down …".yellow().bold());
                info!("shutdown requested");
                ExitCode::SUCCESS
            }
        }
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// demo
// ─────────────────────────────────────────────────────────────────────────────

const DEMO_MEMORIES: &[(&str, &str, &str, &str)] = &[
    (
        "Quantum Entanglement",
        "science",
        "curious",
        "quantum particles share a state across any distance",
    ),
    (
        "Photon Computing",
        "science",
        "excited",
        "quantum particles carry light through a network of crystals",
    ),
    (
        "Morning Meditation",
        "spirit",
        "calm",
        "divine light and sacred breath bring peace and truth",
    ),
    (
        "Garden Notes",
        "life",
        "neutral",
        "tomatoes need sun and water every morning",
    ),
];

fn run_demo(cfg: &config::Config) -> Result<(), MindMapError> {
    let service = MindMapService::in_memory(Arc::new(LightEncoder::new()))
        .with_root_label(cfg.root_label.clone());

    for (topic, category, resonance, content) in DEMO_MEMORIES {
        let added = service.add_memory(
            NewMemory::new(*content)
                .topic(*topic)
                .category(*category)
                .resonance(*resonance),
        )?;
        println!(
            "  {} {}  {}",
            "✓".green().bold(),
            added.memory.topic.bold(),
            format!("{} connection(s)", added.memory.connections).dimmed()
        );
        println!("{}", added.memory.light_visualization.dimmed());
    }

    let map = service.mind_map()?;
    println!();
    println!("{}", map.visual_tree);

    let graph = service.graph()?;
    println!(
        "  {} node(s), {} edge(s)",
        graph.total_nodes.to_string().bold(),
        graph.total_edges.to_string().bold()
    );
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// config
// ─────────────────────────────────────────────────────────────────────────────

fn show_config(cfg: &config::Config, init: bool) -> ExitCode {
    let path = config::config_path();
    if init {
        if path.exists() {
            println!("  Config already exists at {}", path.display().to_string().bold());
        } else {
            match config::save(&config::Config::default()) {
                Ok(()) => println!(
                    "  {} Config saved to {}",
                    "✓".green().bold(),
                    path.display().to_string().bold()
                ),
                Err(e) => {
                    println!("{}: {}", "Error saving config".red(), e);
                    return ExitCode::FAILURE;
                }
            }
        }
    }

    println!();
    println!("  {:<12} {}", "bind".dimmed(), cfg.bind_address);
    println!("  {:<12} {}", "port".dimmed(), cfg.port);
    println!("  {:<12} {}", "log format".dimmed(), cfg.log_format);
    println!("  {:<12} {}", "root label".dimmed(), cfg.root_label);
    println!();
    ExitCode::SUCCESS
}

// ─────────────────────────────────────────────────────────────────────────────
// Banner
// ─────────────────────────────────────────────────────────────────────────────

fn print_banner() {
    println!();
    println!("{}", r#"   __   _      __   __                 "#.bold().cyan());
    println!("{}", r#"  / /  (_)__ _/ /  / /___ _  ___ ____  "#.bold().cyan());
    println!("{}", r#" / /__/ / _ `/ _ \/ __/  ' \/ _ `/ _ \ "#.bold().cyan());
    println!("{}", r#"/____/_/\_, /_//_/\__/_/_/_/\_,_/ .__/ "#.bold().cyan());
    println!("{}", r#"       /___/                   /_/     "#.bold().cyan());
    println!();
    println!(
        "  {} {}",
        "Lightmap".bold(),
        format!("v{}", env!("CARGO_PKG_VERSION")).dimmed()
    );
    println!("  Photonic memory graph");
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn serve_flags_parse() {
        let cli = Cli::try_parse_from(["lightmap", "serve", "--port", "9000", "--bind", "127.0.0.1"])
            .expect("parse");
        match cli.command {
            Some(Command::Serve { port, bind }) => {
                assert_eq!(port, Some(9000));
                assert_eq!(bind, Some(IpAddr::from([127, 0, 0, 1])));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn no_subcommand_is_allowed() {
        let cli = Cli::try_parse_from(["lightmap"]).expect("parse");
        assert!(cli.command.is_none());
    }

    #[test]
    fn demo_runs_against_default_config() {
        run_demo(&config::Config::default()).expect("demo");
    }
}

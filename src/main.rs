//! Plant Dream Pipeline CLI
//!
//! Turns plant sensor logs into labeled dream records.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use plant_dream_pipeline::{config::Config, export::ExportFormat, pipeline, VERSION};
use std::env;
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "dream-records")]
#[command(version = VERSION)]
#[command(about = "Generate labeled plant dream records from sensor logs", long_about = None)]
struct Cli {
    /// Config file (defaults to the per-user config directory)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the batch and write labeled records
    Run {
        /// User whose profiles and ID are applied
        #[arg(long)]
        user_id: Option<String>,

        /// Moisture event log
        #[arg(long)]
        moisture: Option<PathBuf>,

        /// Light event log
        #[arg(long)]
        light: Option<PathBuf>,

        /// Classifier model artifact
        #[arg(long)]
        model: Option<PathBuf>,

        /// Profile store file
        #[arg(long)]
        profiles: Option<PathBuf>,

        /// Output file
        #[arg(long, short)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(long, value_enum, default_value_t = ExportFormat::Json)]
        format: ExportFormat,

        /// Write the run report to this file
        #[arg(long)]
        diagnostics: Option<PathBuf>,
    },

    /// Show the effective configuration
    Config {
        /// Persist the effective configuration
        #[arg(long)]
        write: bool,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let cli = Cli::parse();
    let mut config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Run {
            user_id,
            moisture,
            light,
            model,
            profiles,
            output,
            format,
            diagnostics,
        } => {
            config.apply_user_id(user_id);
            if let Some(path) = moisture {
                config.moisture_log = path;
            }
            if let Some(path) = light {
                config.light_log = path;
            }
            if let Some(path) = model {
                config.model_path = path;
            }
            if let Some(path) = profiles {
                config.profile_store = Some(path);
            }
            if let Some(path) = output {
                config.output_path = path;
            }
            if let Some(path) = diagnostics {
                config.diagnostics_path = Some(path);
            }
            cmd_run(&config, format)
        }
        Commands::Config { write } => cmd_config(&config, cli.config.as_ref(), write),
    }
}

/// Config file, then environment.
fn load_config(path: Option<&PathBuf>) -> Result<Config> {
    let mut config = match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load().context("Failed to load config")?,
    };
    config.apply_env();
    Ok(config)
}

fn cmd_run(config: &Config, format: ExportFormat) -> Result<()> {
    let output = pipeline::run_batch(config, format).context("Dream record batch failed")?;

    println!("Plant Dream Pipeline v{VERSION}");
    println!();
    println!("{}", output.report.summary());
    println!();
    println!("Output: {}", config.output_path.display());
    if let Some(path) = &config.diagnostics_path {
        println!("Run report: {}", path.display());
    }

    Ok(())
}

fn cmd_config(config: &Config, path: Option<&PathBuf>, write: bool) -> Result<()> {
    let config_path = path.cloned().unwrap_or_else(Config::config_path);

    println!("Configuration");
    println!("=============");
    println!();
    println!("Config file: {}", config_path.display());
    println!();
    println!(
        "{}",
        serde_json::to_string_pretty(config).context("Failed to serialize config")?
    );

    if write {
        config
            .save_to(&config_path)
            .with_context(|| format!("Failed to write config to {}", config_path.display()))?;
        println!();
        println!("Configuration saved.");
    }

    Ok(())
}

fn init_tracing() {
    // Use RUST_LOG if available, otherwise fall back to DREAM_LOG_LEVEL
    let env_filter = if env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        let level = match env::var("DREAM_LOG_LEVEL").ok().as_deref() {
            Some("trace") => "trace",
            Some("debug") => "debug",
            Some("warn") => "warn",
            Some("error") => "error",
            _ => "info",
        };
        EnvFilter::new(level)
    };

    tracing_subscriber::fmt()
        .with_target(true)
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .compact()
        .init();
}

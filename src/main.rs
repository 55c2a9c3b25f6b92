//! Mongeez auto-configuration CLI
//!
//! Entry point for the `mongeez-autoconfig` command-line tool.

use clap::{Args, Parser, Subcommand};
use mongeez_autoconfig::logging::init_logging;
use mongeez_autoconfig::{
    Activation, ConfigError, ConfigSource, LayerStack, MongeezAutoConfiguration, MongoSettings, Resolution,
};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "mongeez-autoconfig")]
#[command(about = "Resolve and check Mongeez migration settings", version)]
struct Cli {
    /// Enable debug logging
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the resolved settings and where each value came from
    Resolve {
        #[command(flatten)]
        layers: LayerArgs,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Build the migration runner without executing it
    Check {
        #[command(flatten)]
        layers: LayerArgs,
    },
}

#[derive(Args)]
struct LayerArgs {
    /// TOML config file (repeatable, later files win)
    #[arg(long, short = 'c')]
    config: Vec<PathBuf>,

    /// Override a key, e.g. mongeez.database=bar (repeatable, highest precedence)
    #[arg(long = "set", short = 's', value_name = "KEY=VALUE")]
    assignments: Vec<String>,

    /// Ignore MONGEEZ_* and MONGODB_* environment variables
    #[arg(long)]
    no_env: bool,

    /// Resolve as if no database connection were available
    #[arg(long)]
    no_connection: bool,

    /// Directory relative script locations resolve against (default: current directory)
    #[arg(long)]
    script_root: Option<PathBuf>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Resolve { layers, json } => {
            run_resolve(&layers, json);
        }
        Commands::Check { layers } => {
            run_check(&layers);
        }
    }
}

fn run_resolve(args: &LayerArgs, json_output: bool) {
    let (autoconfig, connection) = load(args);

    let resolution = match autoconfig.resolve(connection.as_ref()) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            process::exit(1);
        }
    };

    let layers = autoconfig.layers(connection.as_ref());
    let properties = autoconfig.merge(connection.as_ref()).redacted();

    if json_output {
        let output = serde_json::json!({
            "resolution": resolution,
            "connection": connection,
            "layers": layers,
            "properties": properties,
        });

        match serde_json::to_string_pretty(&output) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
        return;
    }

    match &resolution {
        Resolution::Activate(config) => {
            println!("Mongeez: active");
            if config.database_name.is_empty() {
                println!("  Database: (none)");
            } else {
                println!("  Database: {}", config.database_name);
            }
            println!("  Script: {}", autoconfig.script_path(&config.script_location).display());
            if let Some(ref auth) = config.auth {
                println!("  User: {}", auth.username());
            }
        }
        Resolution::Skip(reason) => {
            println!("Mongeez: inactive ({})", reason);
        }
    }

    match connection {
        Some(ref c) => println!("Connection: {}", c.address()),
        None => println!("Connection: none"),
    }

    println!();
    println!("Layers ({} total):", layers.len());
    for (index, layer) in layers.iter().enumerate() {
        match layer.path {
            Some(ref path) => println!("  [{}] {} {}", index, layer.origin, path),
            None => println!("  [{}] {}", index, layer.origin),
        }
    }

    println!();
    println!("Properties:");
    for (key, property) in properties.iter() {
        println!("  {} = {:?}  ({} [{}])", key, property.value, property.origin, property.layer);
    }
}

fn run_check(args: &LayerArgs) {
    let (autoconfig, connection) = load(args);

    match autoconfig.activate(connection.as_ref()) {
        Ok(Activation::Ready(mongeez)) => {
            println!(
                "Mongeez runner ready: database '{}', script {}",
                mongeez.db_name(),
                mongeez.file().display()
            );
        }
        Ok(Activation::Skipped(reason)) => {
            println!("Mongeez inactive: {}", reason);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Assemble layers and the connection from CLI arguments, exiting on error
fn load(args: &LayerArgs) -> (MongeezAutoConfiguration, Option<MongoSettings>) {
    let sources = match build_sources(args) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    };

    let connection = if args.no_connection {
        None
    } else {
        match MongoSettings::from_sources(&sources) {
            Ok(c) => Some(c),
            Err(e) => {
                eprintln!("Configuration error: {}", e);
                process::exit(1);
            }
        }
    };

    let mut autoconfig = MongeezAutoConfiguration::new(sources);
    if let Some(ref root) = args.script_root {
        autoconfig = autoconfig.with_script_root(root);
    }

    (autoconfig, connection)
}

/// Files (in order), then environment, then assignments
fn build_sources(args: &LayerArgs) -> Result<Vec<ConfigSource>, ConfigError> {
    let mut stack = LayerStack::new();

    for path in &args.config {
        stack = stack.file(path)?;
    }

    if !args.no_env {
        stack = stack.env(ConfigSource::from_env()?);
    }

    Ok(stack.assignments(&args.assignments)?.build())
}

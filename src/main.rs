//! ccbridge CLI
//!
//! Entry point for the `ccbridge` command-line tool.

use ccbridge::config::{cli_overrides, EffectiveConfig, REPO_CONFIG_FILE};
use ccbridge::convert::{convert_module, ConversionInput};
use ccbridge::{toolchain_vars_with_header, Expander};
use clap::{ArgAction, Args, Parser, Subcommand};
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ccbridge")]
#[command(about = "Configurable attribute resolution and toolchain variable export", version)]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace); RUST_LOG overrides
    #[arg(long, short = 'v', action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ConfigArgs {
    /// Path to repo config file (default: ccbridge.toml)
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Path to host config file (default: ~/.config/ccbridge/toolchain.toml)
    #[arg(long)]
    host_config: Option<PathBuf>,

    /// Set a string variable (NAME=VALUE)
    #[arg(long = "set", value_name = "NAME=VALUE")]
    sets: Vec<String>,

    /// Set a string list variable (NAME=A,B,C)
    #[arg(long = "set-list", value_name = "NAME=A,B,C")]
    set_lists: Vec<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Export toolchain variables as a Starlark constants file
    Vars {
        #[command(flatten)]
        config: ConfigArgs,

        /// Write output to a file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Also write the effective config with provenance
        #[arg(long)]
        effective_config: Option<PathBuf>,
    },

    /// Expand `${Name}` placeholders in TEXT, one value per line
    Expand {
        #[command(flatten)]
        config: ConfigArgs,

        /// Text to expand
        text: String,
    },

    /// Convert module properties (JSON) into selectable attributes
    Convert {
        /// Path to the module properties file
        input: PathBuf,

        /// Pretty-print instead of canonical JSON
        #[arg(long)]
        pretty: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Vars {
            config,
            output,
            effective_config,
        } => {
            run_vars(&config, output, effective_config);
        }
        Commands::Expand { config, text } => {
            run_expand(&config, &text);
        }
        Commands::Convert { input, pretty } => {
            run_convert(input, pretty);
        }
    }
}

fn init_tracing(verbose: u8) {
    let default_filter = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(args: &ConfigArgs) -> EffectiveConfig {
    let host_path = args
        .host_config
        .clone()
        .or_else(EffectiveConfig::default_host_path);
    let repo_path = args
        .config
        .clone()
        .unwrap_or_else(|| PathBuf::from(REPO_CONFIG_FILE));

    let overrides = match cli_overrides(&args.sets, &args.set_lists) {
        Ok(o) => o,
        Err(e) => {
            eprintln!("Invalid override: {}", e);
            process::exit(1);
        }
    };

    match EffectiveConfig::build(host_path.as_deref(), Some(&repo_path), overrides) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error loading config: {}", e);
            process::exit(1);
        }
    }
}

fn run_vars(args: &ConfigArgs, output: Option<PathBuf>, effective_config: Option<PathBuf>) {
    let config = load_config(args);

    if let Some(path) = effective_config {
        if let Err(e) = config.write_to_file(&path) {
            eprintln!("Error writing effective config: {}", e);
            process::exit(1);
        }
    }

    let registry = match config.to_registry() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error registering variables: {}", e);
            process::exit(1);
        }
    };

    let rendered = match toolchain_vars_with_header(&registry, config.header()) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error exporting variables: {}", e);
            process::exit(1);
        }
    };

    match output {
        Some(path) => {
            if let Err(e) = fs::write(&path, rendered) {
                eprintln!("Error writing {}: {}", path.display(), e);
                process::exit(1);
            }
            tracing::info!(path = %path.display(), variables = registry.len(), "wrote toolchain vars");
        }
        None => println!("{}", rendered),
    }
}

fn run_expand(args: &ConfigArgs, text: &str) {
    let config = load_config(args);
    let registry = match config.to_registry() {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error registering variables: {}", e);
            process::exit(1);
        }
    };

    match Expander::new(&registry).expand(text) {
        Ok(values) => {
            for value in values {
                println!("{}", value);
            }
        }
        Err(e) => {
            eprintln!("Expansion error: {}", e);
            process::exit(1);
        }
    }
}

fn run_convert(input_path: PathBuf, pretty: bool) {
    let contents = match fs::read_to_string(&input_path) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Error reading {}: {}", input_path.display(), e);
            process::exit(1);
        }
    };

    let input: ConversionInput = match serde_json::from_str(&contents) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("Error parsing {}: {}", input_path.display(), e);
            process::exit(1);
        }
    };

    let attrs = match convert_module(&input) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("Conversion error: {}", e);
            process::exit(1);
        }
    };

    let rendered = if pretty {
        serde_json::to_string_pretty(&attrs).map_err(|e| e.to_string())
    } else {
        attrs
            .to_canonical_json()
            .map_err(|e| e.to_string())
            .and_then(|bytes| String::from_utf8(bytes).map_err(|e| e.to_string()))
    };

    match rendered {
        Ok(json) => println!("{}", json),
        Err(e) => {
            eprintln!("Error serializing output: {}", e);
            process::exit(1);
        }
    }
}

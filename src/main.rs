//! modlr-bootstrap CLI.
//!
//! ```text
//! modlr-bootstrap check modlr.toml
//! modlr-bootstrap --root-dir app --bundle AppBundle=src/AppBundle assemble modlr.toml --create-dirs
//! modlr-bootstrap --without mongodb watch modlr.toml
//! ```

use std::path::{Path, PathBuf};

use clap::{ArgAction, Parser, Subcommand};

use modlr_bootstrap::config::watcher::ConfigWatcher;
use modlr_bootstrap::config::ConfigurationTree;
use modlr_bootstrap::observability::logging;
use modlr_bootstrap::{
    assemble, bootstrap, load_config, Backend, Capabilities, HostEnvironment, LoadContext,
    ServiceRegistry,
};

#[derive(Parser)]
#[command(name = "modlr-bootstrap")]
#[command(about = "Validate modlr configuration and assemble its service registry", long_about = None)]
struct Cli {
    /// Host cache directory
    #[arg(long, global = true, default_value = "var/cache")]
    cache_dir: PathBuf,

    /// Project root directory
    #[arg(long, global = true, default_value = "app")]
    root_dir: PathBuf,

    /// Bundle directory for @Bundle/... paths (repeatable)
    #[arg(long = "bundle", global = true, value_name = "NAME=DIR", value_parser = parse_bundle)]
    bundles: Vec<(String, PathBuf)>,

    /// Treat an optional backend as not installed (repeatable)
    #[arg(long = "without", global = true, value_name = "BACKEND")]
    without: Vec<Backend>,

    /// Raise log verbosity (-v debug, -vv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a configuration file
    Check { config: PathBuf },
    /// Validate and assemble, printing the registry as JSON
    Assemble {
        config: PathBuf,
        /// Also create the directories the registry records
        #[arg(long)]
        create_dirs: bool,
    },
    /// Re-validate and re-assemble whenever the file changes
    Watch { config: PathBuf },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let host = cli
        .bundles
        .iter()
        .fold(HostEnvironment::new(&cli.cache_dir, &cli.root_dir), |host, (name, dir)| {
            host.with_bundle(name.clone(), dir.clone())
        });
    let mut capabilities = Capabilities::detect();
    for backend in &cli.without {
        capabilities.unregister(*backend);
    }

    match cli.command {
        Commands::Check { config } => {
            let tree = load_config(&config, &capabilities)?;
            println!(
                "{}: OK ({} driver(s), {} persister(s), {} search client(s), cache {})",
                config.display(),
                tree.metadata.drivers.len(),
                tree.persisters.len(),
                tree.search_clients.len(),
                if tree.metadata.cache.is_enabled() { "enabled" } else { "disabled" },
            );
        }
        Commands::Assemble { config, create_dirs } => {
            let registry = if create_dirs {
                bootstrap(&config, &host, &capabilities)?
            } else {
                let tree = load_config(&config, &capabilities)?;
                build(&tree, &host, &capabilities)?
            };
            println!("{}", serde_json::to_string_pretty(&registry)?);
        }
        Commands::Watch { config } => watch(&config, &host, capabilities)?,
    }

    Ok(())
}

fn build(
    tree: &ConfigurationTree,
    host: &HostEnvironment,
    capabilities: &Capabilities,
) -> Result<ServiceRegistry, Box<dyn std::error::Error>> {
    let registry = host.seed_registry()?;
    Ok(assemble(tree, LoadContext::new(host, capabilities), registry)?)
}

fn watch(
    config: &Path,
    host: &HostEnvironment,
    capabilities: Capabilities,
) -> Result<(), Box<dyn std::error::Error>> {
    match load_config(config, &capabilities) {
        Ok(tree) => report(&tree, host, &capabilities),
        Err(e) => tracing::error!("Configuration rejected: {}", e),
    }

    let (watcher, updates) = ConfigWatcher::new(config, capabilities.clone());
    let _watcher = watcher.run()?;

    for tree in updates {
        report(&tree, host, &capabilities);
    }
    Ok(())
}

fn report(tree: &ConfigurationTree, host: &HostEnvironment, capabilities: &Capabilities) {
    match build(tree, host, capabilities) {
        Ok(registry) => tracing::info!(services = registry.len(), "Configuration assembles cleanly"),
        Err(e) => tracing::error!("Assembly failed: {}", e),
    }
}

fn parse_bundle(raw: &str) -> Result<(String, PathBuf), String> {
    match raw.split_once('=') {
        Some((name, dir)) if !name.is_empty() && !dir.is_empty() => {
            Ok((name.to_string(), PathBuf::from(dir)))
        }
        _ => Err(format!("expected NAME=DIR, got \"{raw}\"")),
    }
}

//! Headless command handling
//!
//! Usage:
//!   sharelink sync                  Mirror the share into the project
//!   sharelink remove                Unlink top-level symlinks
//!   sharelink list                  List top-level symlinks
//!   sharelink inspect               Classify every configured name
//!   sharelink save-config           Write the effective settings to a config file
//!
//! Options:
//!   --project <path>   Project (destination) root, defaults to the current directory
//!   --share <path>     Share (source) root, defaults to /share
//!   --targets <names>  Comma-separated top-level names to mirror
//!   --config <file>    Read settings from a JSON config file
//!   --output <file>    Where save-config writes, defaults to the per-user config path
//!   --json             Output in JSON format
//!   --verbose          Enable debug logging

use std::path::PathBuf;

use sharelink_core::{SyncConfig, SyncOutcome, TreeSynchronizer};

/// CLI command to execute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliCommand {
    Sync,
    Remove,
    List,
    Inspect,
    SaveConfig,
}

/// CLI options
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub project: Option<PathBuf>,
    pub share: Option<PathBuf>,
    pub targets: Option<Vec<String>>,
    pub config: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub json: bool,
    pub verbose: bool,
}

/// Parse CLI arguments and return command + options
pub fn parse_args(args: &[String]) -> Result<(CliCommand, CliOptions), String> {
    let mut options = CliOptions::default();
    let mut command: Option<CliCommand> = None;

    let mut i = 0;
    while i < args.len() {
        let arg = &args[i];
        match arg.as_str() {
            "--json" => options.json = true,
            "--verbose" | "-v" => options.verbose = true,
            "--project" | "--share" | "--targets" | "--config" | "--output" => {
                i += 1;
                let value = args
                    .get(i)
                    .ok_or_else(|| format!("{} requires a value", arg))?;
                match arg.as_str() {
                    "--project" => options.project = Some(PathBuf::from(value)),
                    "--share" => options.share = Some(PathBuf::from(value)),
                    "--config" => options.config = Some(PathBuf::from(value)),
                    "--output" => options.output = Some(PathBuf::from(value)),
                    _ => options.targets = Some(parse_targets(value)?),
                }
            }
            "sync" | "remove" | "list" | "inspect" | "save-config" if command.is_none() => {
                command = Some(match arg.as_str() {
                    "sync" => CliCommand::Sync,
                    "remove" => CliCommand::Remove,
                    "list" => CliCommand::List,
                    "inspect" => CliCommand::Inspect,
                    _ => CliCommand::SaveConfig,
                });
            }
            _ if arg.starts_with('-') => return Err(format!("Unknown option: {}", arg)),
            _ => return Err(format!("Unknown command: {}", arg)),
        }
        i += 1;
    }

    let command = command
        .ok_or_else(|| "No command specified. Use: sync, remove, list, inspect, or save-config".to_string())?;
    Ok((command, options))
}

fn parse_targets(s: &str) -> Result<Vec<String>, String> {
    let targets: Vec<String> = s
        .split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect();
    if targets.is_empty() {
        return Err("--targets requires at least one name".to_string());
    }
    Ok(targets)
}

/// Merge config file, defaults and command-line overrides
pub fn resolve_config(options: &CliOptions) -> anyhow::Result<SyncConfig> {
    let mut config = match options.config {
        Some(ref path) => SyncConfig::load_from(path)?,
        None => SyncConfig::load(),
    };

    if let Some(ref project) = options.project {
        config.project_root = project.clone();
    }
    if let Some(ref share) = options.share {
        config.share_directory = share.clone();
    }
    if let Some(ref targets) = options.targets {
        config = config.with_targets(targets.iter().cloned())?;
    }
    Ok(config)
}

/// Run CLI command
pub fn run(command: CliCommand, options: CliOptions) -> anyhow::Result<()> {
    let config = resolve_config(&options)?;
    let sync = TreeSynchronizer::from_config(&config);
    tracing::debug!(
        "Using project root {} and share {}",
        sync.project_root().display(),
        sync.share_directory().display()
    );

    match command {
        CliCommand::Sync => print_outcome(&sync.create_symlinks(), &options),
        CliCommand::Remove => print_names("Removed symlinks", &sync.remove_symlinks(), &options),
        CliCommand::List => print_names("Symlinks", &sync.list_symlinks(), &options),
        CliCommand::Inspect => {
            let report = sync.inspect();
            if options.json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report);
            }
            Ok(())
        }
        CliCommand::SaveConfig => save_config(&config, &options),
    }
}

fn save_config(config: &SyncConfig, options: &CliOptions) -> anyhow::Result<()> {
    let path = match options.output {
        Some(ref path) => {
            config.save_to(path)?;
            path.clone()
        }
        None => {
            config.save()?;
            SyncConfig::config_path().unwrap_or_default()
        }
    };
    tracing::info!("Saved config to {}", path.display());

    if options.json {
        println!("{}", serde_json::to_string_pretty(config)?);
    } else {
        println!("Saved config to {}", path.display());
    }
    Ok(())
}

fn print_outcome(outcome: &SyncOutcome, options: &CliOptions) -> anyhow::Result<()> {
    if options.json {
        println!("{}", serde_json::to_string_pretty(outcome)?);
        return Ok(());
    }

    println!("sharelink sync results:");
    println!();
    println!("Directories created: {}", outcome.directories.len());
    for dir in &outcome.directories {
        println!("  + {}/", dir.display());
    }
    println!("Symlinks created:    {}", outcome.links.len());
    for link in &outcome.links {
        println!("  + {}", link.display());
    }
    if !outcome.skipped.is_empty() {
        println!("Skipped:             {}", outcome.skipped.join(", "));
    }
    Ok(())
}

fn print_names(label: &str, names: &[String], options: &CliOptions) -> anyhow::Result<()> {
    if options.json {
        println!("{}", serde_json::to_string_pretty(names)?);
    } else if names.is_empty() {
        println!("{}: none", label);
    } else {
        println!("{}: {}", label, names.join(", "));
    }
    Ok(())
}

/// Print CLI help
pub fn print_help() {
    println!("sharelink v{}", env!("CARGO_PKG_VERSION"));
    println!("Mirror shared-storage directories into a project tree with symlinks");
    println!();
    println!("USAGE:");
    println!("    sharelink <COMMAND> [OPTIONS]");
    println!();
    println!("COMMANDS:");
    println!("    sync       Create missing directories and symlinks");
    println!("    remove     Remove top-level symlinks (real directories are kept)");
    println!("    list       List top-level names that are symlinks");
    println!("    inspect    Show the state of every configured name");
    println!("    save-config  Write the effective settings to a config file");
    println!();
    println!("OPTIONS:");
    println!("    --project <path>   Project root (default: current directory)");
    println!("    --share <path>     Share root (default: /share)");
    println!("    --targets <names>  Comma-separated top-level names to mirror");
    println!("    --config <file>    JSON config file");
    println!("    --output <file>    Destination for save-config (default: user config dir)");
    println!("    --json             Output in JSON format");
    println!("    --verbose, -v      Enable debug logging");
    println!("    --help, -h         Show this help message");
    println!();
    println!("Log level can also be set with RUST_LOG.");
}

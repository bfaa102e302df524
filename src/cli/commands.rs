//! Command dispatch: every command loads the tree, runs one library operation
//! and prints the result.

use std::io;
use std::path::{Path, PathBuf};

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, local_config_path, Settings};
use crate::domain::Tree;
use crate::tree_traits::TreeNodeConvert;
use crate::util::path::expand_path;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Show { payload }) => cmd_show(cli, payload.as_deref()),
        Some(Commands::Count) => cmd_count(cli),
        Some(Commands::Get { path }) => cmd_get(cli, path),
        Some(Commands::Ids) => cmd_ids(cli),
        Some(Commands::Leaves) => cmd_leaves(cli),
        Some(Commands::Update { payload }) => cmd_update(cli, payload),
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => cmd_config_show(cli),
            ConfigCommands::Path => cmd_config_path(cli),
        },
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Ok(()),
    }
}

fn local_dir(cli: &Cli) -> Option<PathBuf> {
    match &cli.dir {
        Some(dir) => Some(expand_path(dir)),
        None => std::env::current_dir().ok(),
    }
}

/// Settings with command line overrides applied.
pub fn settings(cli: &Cli) -> CliResult<Settings> {
    let mut settings = Settings::load(local_dir(cli).as_deref())?;
    if let Some(sep) = cli.sep {
        settings.separator = sep;
    }
    Ok(settings)
}

/// `--file` wins over the configured `tree_file`.
pub fn resolve_tree_file(cli: &Cli, settings: &Settings) -> CliResult<PathBuf> {
    cli.file
        .as_deref()
        .map(expand_path)
        .or_else(|| settings.tree_file.clone())
        .ok_or_else(|| {
            CliError::InvalidArgs(
                "no tree file given (use --file or set tree_file in config)".to_string(),
            )
        })
}

fn load_tree(cli: &Cli) -> CliResult<(Tree, Settings)> {
    let settings = settings(cli)?;
    let path = resolve_tree_file(cli, &settings)?;
    debug!("tree file: {}", path.display());
    let tree = application::load(&path)?;
    Ok((tree, settings))
}

#[instrument(level = "debug", skip(cli))]
fn cmd_show(cli: &Cli, payload: Option<&Path>) -> CliResult<()> {
    let (mut tree, settings) = load_tree(cli)?;
    if let Some(payload_path) = payload {
        let payload = application::load_payload(payload_path)?;
        tree.update_from(tree.root(), &payload, settings.separator)?;
    }
    output::info(&tree.to_tree_string());
    Ok(())
}

#[instrument(level = "debug", skip(cli))]
fn cmd_count(cli: &Cli) -> CliResult<()> {
    let (tree, _) = load_tree(cli)?;
    output::info(&tree.len());
    Ok(())
}

#[instrument(level = "debug", skip(cli))]
fn cmd_get(cli: &Cli, path: &str) -> CliResult<()> {
    let (tree, settings) = load_tree(cli)?;
    let idx = tree.get_from(tree.root(), path, settings.separator)?;
    if let Some(line) = tree.describe_with(idx, settings.separator) {
        output::info(&line);
    }
    Ok(())
}

#[instrument(level = "debug", skip(cli))]
fn cmd_ids(cli: &Cli) -> CliResult<()> {
    let (tree, settings) = load_tree(cli)?;
    for (idx, _) in tree.iter() {
        if let Some(line) = tree.describe_with(idx, settings.separator) {
            output::info(&line);
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(cli))]
fn cmd_leaves(cli: &Cli) -> CliResult<()> {
    let (tree, settings) = load_tree(cli)?;
    for idx in tree.leaves() {
        if let Some(id) = tree.id_with(idx, settings.separator) {
            output::info(&id);
        }
    }
    Ok(())
}

#[instrument(level = "debug", skip(cli))]
fn cmd_update(cli: &Cli, payload_path: &Path) -> CliResult<()> {
    let (mut tree, settings) = load_tree(cli)?;
    let payload = application::load_payload(payload_path)?;
    let applied = tree.update_from(tree.root(), &payload, settings.separator)?;

    output::success(&format!("applied {} of {} entries", applied, payload.len()));
    for (idx, node) in tree.iter() {
        if node.value.is_some() {
            if let Some(line) = tree.describe_with(idx, settings.separator) {
                output::detail(&line);
            }
        }
    }
    Ok(())
}

fn cmd_config_show(cli: &Cli) -> CliResult<()> {
    let settings = settings(cli)?;
    output::info(&settings.to_toml()?);
    Ok(())
}

fn cmd_config_path(cli: &Cli) -> CliResult<()> {
    output::header("Config files");
    match global_config_path() {
        Some(path) => output::detail(&format!("global: {}", path.display())),
        None => output::detail("global: <no config directory>"),
    }
    if let Some(dir) = local_dir(cli) {
        output::detail(&format!("local:  {}", local_config_path(&dir).display()));
    }
    Ok(())
}

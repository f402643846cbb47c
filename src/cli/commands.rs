//! Command dispatch: one function per subcommand

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::{ApplicationError, FeedingService, PackageService};
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::config::{global_config_path, Settings};
use crate::domain::Animal;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        Some(command) => {
            let settings = Settings::load(cli.config.as_deref())?;
            run_command(command, settings)
        }
        None => Err(CliError::Usage(
            "no command given, see --help".to_string(),
        )),
    }
}

/// Run a subcommand against already loaded settings.
pub fn run_command(command: &Commands, settings: Settings) -> CliResult<()> {
    match command {
        Commands::Composite { tree } => _composite(settings, *tree),
        Commands::Chain {
            entry,
            show,
            requests,
        } => _chain(settings, *entry, *show, requests),
        Commands::Config { command } => _config(settings, command),
        Commands::Completion { .. } => Err(CliError::Usage(
            "completion does not take settings".to_string(),
        )),
    }
}

#[instrument(skip(settings))]
fn _composite(settings: Settings, tree: bool) -> CliResult<()> {
    let package = PackageService::new(settings.composite).build_demo()?;

    if tree {
        output::info(&package.arena.to_tree_string(package.root));
    }
    let total = package.total_weight().map_err(ApplicationError::from)?;
    output::action("totalPackageWeight", &total);
    Ok(())
}

#[instrument(skip(settings))]
fn _chain(
    settings: Settings,
    entry: Option<Animal>,
    show: bool,
    requests: &[String],
) -> CliResult<()> {
    let entry = entry.unwrap_or(settings.chain.entry);
    let requests = if requests.is_empty() {
        settings.chain.requests.clone()
    } else {
        requests.to_vec()
    };
    debug!("entry: {}, requests: {:?}", entry, requests);

    let service = FeedingService::new(settings.chain);
    let chain = service.build_chain()?;
    if show {
        output::header(&chain);
    }

    for serving in service.serve(&chain, entry, &requests)? {
        if serving.is_handled() {
            output::success(&serving);
        } else {
            output::failure(&serving);
        }
    }
    Ok(())
}

#[instrument(skip(settings))]
fn _config(settings: Settings, command: &ConfigCommands) -> CliResult<()> {
    match command {
        ConfigCommands::Show => {
            output::info(&settings.to_toml()?);
        }
        ConfigCommands::Path => {
            let path = global_config_path().ok_or_else(|| {
                CliError::Usage("cannot determine config directory".to_string())
            })?;
            output::info(&path.display());
        }
    }
    Ok(())
}

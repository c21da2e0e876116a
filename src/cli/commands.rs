//! Command dispatch

use std::io;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::application::demo::{bootstrap, Greeter, TAG_GREETER};
use crate::application::ApplicationError;
use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::output;
use crate::cli::{CliError, CliResult};
use crate::config::{global_config_path, Settings};
use crate::infrastructure::SharedContainer;

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Commands::Greet { name } => greet(cli, name),
        Commands::Tags => tags(cli),
        Commands::Config { command } => match command {
            ConfigCommands::Show => config_show(cli),
            ConfigCommands::Template => {
                output::info(&Settings::template());
                Ok(())
            }
            ConfigCommands::Path => config_path(),
        },
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
    }
}

/// Load custom settings and register the demo packages on top of them.
#[instrument(skip(cli))]
fn build_container(cli: &Cli) -> CliResult<SharedContainer> {
    let settings = Settings::load(cli.config.as_deref())?;
    debug!("custom settings for {} services", settings.services.len());
    Ok(bootstrap(settings.into_container())?)
}

#[instrument(skip(cli))]
fn greet(cli: &Cli, name: &str) -> CliResult<()> {
    if name.trim().is_empty() {
        return Err(CliError::Usage("name must not be empty".into()));
    }
    let container = build_container(cli)?;
    let greeters = container
        .resolve_tagged::<Greeter>(TAG_GREETER)
        .map_err(ApplicationError::from)?;
    for greeter in greeters {
        output::info(&greeter.greet(name));
    }
    Ok(())
}

#[instrument(skip(cli))]
fn tags(cli: &Cli) -> CliResult<()> {
    let container = build_container(cli)?;
    let container = container.borrow();
    let Some(tags) = container.tags() else {
        output::info("no tag support");
        return Ok(());
    };
    for (tag, services) in tags.iter() {
        output::header(tag);
        for service in services {
            output::detail(service);
        }
    }
    Ok(())
}

#[instrument(skip(cli))]
fn config_show(cli: &Cli) -> CliResult<()> {
    let container = build_container(cli)?;
    let services = container
        .borrow()
        .configuration()
        .cloned()
        .unwrap_or_default();
    output::info(&Settings { services }.to_toml()?);
    Ok(())
}

#[instrument]
fn config_path() -> CliResult<()> {
    match global_config_path() {
        Some(path) => output::info(&path.display()),
        None => output::info("no config directory available"),
    }
    Ok(())
}

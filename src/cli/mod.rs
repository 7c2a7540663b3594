//! Command-line front end for the admin wizards.

pub mod interaction;
pub mod output;
pub mod runner;

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::debug;
use wizard_config::{ConfigManager, WizardConfig};

use crate::collaborators::{
    BookingCalendar, CachedIdentity, ConfigIdentitySource, JsonFileSubmitter, StaticOptions,
    SystemClock,
};
use crate::errors::{CliError, CollaboratorError};
use crate::flows::{self, FlowContext, WizardKind};
use crate::scheduling::SlotProperties;

pub use interaction::{
    ConfirmationResponse, DialoguerInteraction, PromptContext, PromptResponse, WizardInteraction,
};
pub use runner::{RunOutcome, WizardRunner};

#[derive(Parser, Debug)]
#[command(name = "admin_wizard_cli")]
#[command(author, version, about = "Guided creation wizards for media platform administration")]
pub struct Cli {
    /// Base directory holding config/wizard.json (default: $ADMIN_WIZARD_HOME or ~/.admin_wizard)
    #[arg(long, global = true)]
    pub config_dir: Option<PathBuf>,

    /// Plain output without colours
    #[arg(long, global = true)]
    pub plain: bool,

    /// Only print warnings, errors and results
    #[arg(long, short = 'q', global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the available wizards
    List,
    /// Run a wizard interactively
    Run(RunArgs),
    /// Show what a wizard has stored so far
    Submissions(SubmissionsArgs),
    /// Inspect and back up the configuration file
    #[command(subcommand)]
    Config(ConfigCommand),
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Print the active configuration
    Show,
    /// Write a timestamped copy of the configuration
    Backup {
        /// Short label added to the backup name
        note: Option<String>,
    },
    /// List backups, newest first
    Backups,
    /// Replace the configuration with a backup
    Restore { name: String },
}

#[derive(clap::Args, Debug)]
pub struct RunArgs {
    /// Wizard to run, see `list`
    pub kind: WizardKind,

    /// Save over an existing entity instead of creating one
    #[arg(long, value_name = "ID")]
    pub edit: Option<String>,

    /// Directory submissions are written to (default: from the configuration)
    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,
}

#[derive(clap::Args, Debug)]
pub struct SubmissionsArgs {
    pub kind: WizardKind,

    #[arg(long, value_name = "DIR")]
    pub out: Option<PathBuf>,
}

/// Parses the process arguments and executes the selected command.
pub async fn run_cli() -> Result<(), CliError> {
    execute(Cli::parse()).await
}

pub async fn execute(cli: Cli) -> Result<(), CliError> {
    output::set_preferences(output::OutputPreferences {
        plain: cli.plain,
        quiet: cli.quiet,
    });

    match cli.command {
        Command::List => {
            list_wizards();
            Ok(())
        }
        Command::Run(args) => {
            let config = config_manager(cli.config_dir)?.load_or_init()?;
            run_wizard(args, config).await
        }
        Command::Submissions(args) => {
            let config = config_manager(cli.config_dir)?.load_or_init()?;
            list_submissions(args, &config)
        }
        Command::Config(command) => manage_config(command, &config_manager(cli.config_dir)?),
    }
}

fn config_manager(base: Option<PathBuf>) -> Result<ConfigManager, CliError> {
    let manager = match base {
        Some(dir) => ConfigManager::with_base_dir(dir)?,
        None => ConfigManager::from_env()?,
    };
    debug!(path = %manager.config_path().display(), "using configuration");
    Ok(manager)
}

fn manage_config(command: ConfigCommand, manager: &ConfigManager) -> Result<(), CliError> {
    match command {
        ConfigCommand::Show => {
            let config = manager.load_or_init()?;
            let json = serde_json::to_string_pretty(&config).map_err(CollaboratorError::from)?;
            println!("{json}");
        }
        ConfigCommand::Backup { note } => {
            let config = manager.load_or_init()?;
            let name = manager.backup(&config, note.as_deref())?;
            output::success(format!("Configuration backed up as {name}"));
        }
        ConfigCommand::Backups => {
            let backups = manager.list_backups()?;
            if backups.is_empty() {
                output::info("No configuration backups yet");
            }
            for name in backups {
                println!("{name}");
            }
        }
        ConfigCommand::Restore { name } => {
            let config = manager.restore(&name)?;
            manager.save(&config)?;
            output::success(format!("Configuration restored from {name}"));
        }
    }
    Ok(())
}

fn list_wizards() {
    for kind in WizardKind::ALL {
        println!("{:<20} {}", kind.as_str(), kind.title());
    }
}

fn submitter_for(out: Option<PathBuf>, config: &WizardConfig) -> JsonFileSubmitter {
    JsonFileSubmitter::new(out.unwrap_or_else(|| config.resolve_submission_dir()))
}

async fn run_wizard(args: RunArgs, config: WizardConfig) -> Result<(), CliError> {
    let identity =
        CachedIdentity::load(&ConfigIdentitySource::new(config.identity.clone())).await;
    let submitter = submitter_for(args.out, &config);
    // the entity being edited keeps its own name
    let existing =
        submitter.names_in_use(args.kind.profile().resource(), args.edit.as_deref())?;

    let ctx = FlowContext::new(Arc::new(identity), Arc::new(SystemClock))
        .with_slot(SlotProperties::from_defaults(&config.scheduling))
        .with_agent_access(config.identity.enforce_agent_access)
        .with_existing_names(existing);
    let mut controller = flows::controller(args.kind, &ctx)?;
    if let Some(id) = args.edit {
        controller.open_for_edit(id);
    }

    let options = StaticOptions::from_config(&config.options);
    let calendar = BookingCalendar::from_config(&config.bookings);
    let runner = WizardRunner::new(&options, &calendar, &submitter);
    let mut interaction = DialoguerInteraction::new();

    output::section(args.kind.title());
    match runner.run(&mut controller, &mut interaction).await? {
        RunOutcome::Submitted(receipt) => {
            output::success(format!(
                "Saved {} {}",
                controller.profile().resource(),
                receipt.id
            ));
            if let Some(location) = receipt.location {
                output::detail(location);
            }
        }
        RunOutcome::Cancelled => output::info("Wizard cancelled, nothing was saved"),
    }
    Ok(())
}

fn list_submissions(args: SubmissionsArgs, config: &WizardConfig) -> Result<(), CliError> {
    let submitter = submitter_for(args.out, config);
    let stored = submitter.list(args.kind.profile().resource())?;
    if stored.is_empty() {
        output::info(format!("No {} submissions yet", args.kind.profile().resource()));
    }
    for submission in stored {
        println!(
            "{}  {}  {}",
            submission.id,
            submission.submitted_at,
            submission.name().unwrap_or("-")
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_parses_kind_and_edit_target() {
        let cli = Cli::try_parse_from([
            "admin_wizard_cli",
            "run",
            "new-series",
            "--edit",
            "abc",
        ])
        .unwrap();
        match cli.command {
            Command::Run(args) => {
                assert_eq!(args.kind, WizardKind::NewSeries);
                assert_eq!(args.edit.as_deref(), Some("abc"));
            }
            other => panic!("unexpected command {other:?}"),
        }
        assert!(Cli::try_parse_from(["admin_wizard_cli", "run", "new-thing"]).is_err());
    }
}

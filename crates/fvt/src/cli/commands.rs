//! # CLI Layer
//!
//! The CLI layer is the **only** place in the codebase that:
//! - Knows about terminal I/O (stdout, stderr)
//! - Installs the tracing subscriber
//! - Handles argument parsing
//! - Formats output for human consumption
//!
//! ## Responsibilities
//!
//! 1. **Argument Parsing**: Convert shell arguments into typed commands via clap
//! 2. **Context Setup**: Load `fvt.toml`, open the layer directory and the settings file
//! 3. **Dispatch**: Route commands to the `FvtApi` facade
//! 4. **Output Formatting**: Hand the `CmdResult` to `render`
//! 5. **Error Handling**: Log failures and hand them to `main` for the exit code

use super::render::print_result;
use super::setup::{Cli, Commands, SettingsCommands};
use anyhow::Context;
use clap::Parser;
use fvtapp::api::FvtApi;
use fvtapp::config::FvtConfig;
use fvtapp::layer::fs::FileLayer;
use fvtapp::project::Project;
use fvtapp::settings::fs::FileSettings;
use std::path::PathBuf;
use tracing::{debug, error};
use tracing_subscriber::EnvFilter;

type App = FvtApi<FileLayer, FileSettings>;

pub fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let mut api = create_api(&cli)?;
    let command = cli.command.unwrap_or(Commands::Layers);

    let result = match dispatch(&mut api, command) {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "command failed");
            return Err(e.into());
        }
    };
    print_result(&result, cli.json);
    Ok(())
}

/// `RUST_LOG` wins; otherwise warnings only, or debug output with `-v`.
fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn create_api(cli: &Cli) -> anyhow::Result<App> {
    let dir = match &cli.dir {
        Some(dir) => dir.clone(),
        None => std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
    };

    let mut config = FvtConfig::load(&dir)
        .with_context(|| format!("Failed to load configuration from {}", dir.display()))?;
    if let Some(path) = &cli.settings {
        config.settings_file = Some(path.clone());
    }
    let settings_path = config.settings_path()?;
    debug!(dir = %dir.display(), settings = %settings_path.display(), "opening project");

    let project = Project::open_dir(&dir)
        .with_context(|| format!("Failed to open layer directory {}", dir.display()))?;
    let store = FileSettings::open(&settings_path)
        .with_context(|| format!("Failed to read settings {}", settings_path.display()))?;

    Ok(FvtApi::new(project, store, config)?)
}

fn dispatch(api: &mut App, command: Commands) -> fvtapp::error::Result<fvtapp::commands::CmdResult> {
    match command {
        Commands::Layers => api.layers(),
        Commands::List { layer } => api.list_features(&layer),
        Commands::Show { layer, ids } => api.show_features(&layer, &ids),
        Commands::Hide { layer, ids } => api.hide_features(&layer, &ids),
        Commands::Settings { action } => match action.unwrap_or(SettingsCommands::Show) {
            SettingsCommands::Show => api.show_settings(),
            SettingsCommands::Limit { limit } => api.set_feature_limit(limit),
            SettingsCommands::Attrs { layer, fields } => api.select_attributes(&layer, &fields),
            SettingsCommands::Filter {
                layer,
                field,
                kind,
                value,
            } => api.set_filter(&layer, &field, kind, &value),
            SettingsCommands::ClearFilter { layer, field } => api.clear_filter(&layer, &field),
        },
        Commands::Cleanup => api.cleanup(),
    }
}

use clap::{Parser, Subcommand};
use fvtapp::filter::FilterKind;
use fvtapp::model::FeatureId;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "fvt", bin_name = "fvt", version, disable_help_subcommand = true)]
#[command(
    about = "Show or hide individual features of vector layers",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the *.layer.json documents
    #[arg(short, long, global = true, help_heading = "Options")]
    pub dir: Option<PathBuf>,

    /// Settings file (overrides fvt.toml and FVT_SETTINGS_FILE)
    #[arg(long, global = true, help_heading = "Options")]
    pub settings: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,

    /// Verbose output
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the vector layers in the directory
    #[command(alias = "ls", display_order = 1)]
    Layers,

    /// List the features of a layer with their visibility
    #[command(alias = "l", display_order = 2)]
    List {
        /// Layer id
        layer: String,
    },

    /// Make features visible again
    #[command(display_order = 3)]
    Show {
        /// Layer id
        layer: String,

        /// Feature ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<FeatureId>,
    },

    /// Hide features from the layer
    #[command(display_order = 4)]
    Hide {
        /// Layer id
        layer: String,

        /// Feature ids
        #[arg(required = true, num_args = 1..)]
        ids: Vec<FeatureId>,
    },

    /// View or change display settings
    #[command(display_order = 5)]
    Settings {
        #[command(subcommand)]
        action: Option<SettingsCommands>,
    },

    /// Remove the visibility field and filter from every layer
    #[command(display_order = 6)]
    Cleanup,
}

#[derive(Subcommand, Debug)]
pub enum SettingsCommands {
    /// Print the current settings
    Show,

    /// Cap the number of listed features (0 = no limit)
    Limit { limit: usize },

    /// Choose the attribute columns shown for a layer (none clears them)
    Attrs {
        /// Layer id
        layer: String,

        /// Field names, in display order
        fields: Vec<String>,
    },

    /// Set a filter rule on one field
    Filter {
        /// Layer id
        layer: String,

        /// Field name
        field: String,

        /// none, contains, equals, starts-with, ends-with, greater-than, less-than
        kind: FilterKind,

        /// Comparison text
        #[arg(default_value = "", allow_hyphen_values = true)]
        value: String,
    },

    /// Remove the filter rule on one field
    ClearFilter {
        /// Layer id
        layer: String,

        /// Field name
        field: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("fvt").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn parses_hide_with_ids() {
        let cli = parse(&["hide", "cities_1", "2", "4"]);
        match cli.command {
            Some(Commands::Hide { layer, ids }) => {
                assert_eq!(layer, "cities_1");
                assert_eq!(ids, vec![2, 4]);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn hide_requires_ids() {
        assert!(Cli::try_parse_from(["fvt", "hide", "cities_1"]).is_err());
    }

    #[test]
    fn parses_filter_kind_by_slug_and_label() {
        let cli = parse(&["settings", "filter", "cities_1", "pop", "greater-than", "100"]);
        match cli.command {
            Some(Commands::Settings {
                action: Some(SettingsCommands::Filter { kind, value, .. }),
            }) => {
                assert_eq!(kind, FilterKind::GreaterThan);
                assert_eq!(value, "100");
            }
            other => panic!("unexpected command: {:?}", other),
        }

        let cli = parse(&["settings", "filter", "cities_1", "name", "Starts with", "Ac"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Settings {
                action: Some(SettingsCommands::Filter {
                    kind: FilterKind::StartsWith,
                    ..
                })
            })
        ));
    }

    #[test]
    fn rejects_unknown_filter_kind() {
        assert!(Cli::try_parse_from(["fvt", "settings", "filter", "l", "f", "between", "1"]).is_err());
    }

    #[test]
    fn global_options_after_subcommand() {
        let cli = parse(&["list", "cities_1", "--dir", "/tmp/layers", "-v"]);
        assert_eq!(cli.dir, Some(PathBuf::from("/tmp/layers")));
        assert!(cli.verbose);
    }
}

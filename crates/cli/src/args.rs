//! Command-line argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Generate random data from templates
#[derive(Parser, Debug)]
#[command(name = "randomness")]
#[command(about = "Generate random data from templates with versioned settings")]
#[command(long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub settings: SettingsArgs,

    #[command(subcommand)]
    pub command: Commands,
}

/// Location of the settings files
#[derive(Args, Clone, Debug)]
pub struct SettingsArgs {
    /// Directory containing the settings file
    #[arg(long, global = true, env = "RANDOMNESS_SETTINGS_DIR", default_value = ".randomness")]
    pub settings_dir: PathBuf,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate strings from a template
    Generate {
        /// Name or identifier of the template
        template: String,

        /// Number of strings to generate
        #[arg(long, short = 'n', default_value = "1")]
        count: usize,

        /// Seed for reproducible output
        #[arg(long)]
        seed: Option<u64>,

        /// Separator printed between strings
        #[arg(long, default_value = "\n")]
        separator: String,

        /// Milliseconds after which generation is abandoned
        #[arg(long, env = "RANDOMNESS_TIMEOUT_MS", default_value = "5000")]
        timeout_ms: u64,
    },

    /// List all templates
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Report every validation failure in the settings
    Validate,

    /// Upgrade a settings file to a newer format
    Upgrade {
        /// Settings file to upgrade
        file: PathBuf,

        /// Version to upgrade to (default: newest)
        #[arg(long)]
        target: Option<String>,

        /// Overwrite the file instead of printing the result
        #[arg(long)]
        write: bool,
    },

    /// Copy the settings file to another location
    Backup {
        /// File to copy the settings to
        target: PathBuf,
    },

    /// Replace the settings with those in another file
    Restore {
        /// File to read the settings from
        source: PathBuf,
    },

    /// Delete the settings file, returning to defaults
    Reset,

    /// Write the default settings
    Init {
        /// Overwrite existing settings
        #[arg(long)]
        force: bool,
    },
}

//! # Randomness CLI
//!
//! Command-line interface for Randomness.
//!
//! ## Commands
//!
//! - `generate` - Generate strings from a template
//! - `list` - List all templates
//! - `validate` - Report invalid templates
//! - `upgrade` - Upgrade a settings file to a newer format
//! - `backup` / `restore` / `reset` - Repair the settings file
//! - `init` - Write the default settings
//!

pub mod args;

pub use args::{Cli, Commands, SettingsArgs};

use anyhow::{Context, bail};
use colored::Colorize;
use randomness_generator::{Generator, GeneratorConfig};
use randomness_model::upgrade::{self, parse_version};
use randomness_model::{
    AppContext, CURRENT_VERSION, Element, LoadStatus, Named, PersistentSettings, SettingsStorage,
    Template, Validatable,
};
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::Duration;
use tracing::warn;
use uuid::Uuid;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Run `cli`, writing results to `out`
pub async fn run(cli: Cli, out: &mut impl Write) -> anyhow::Result<()> {
    let storage = SettingsStorage::new(&cli.settings.settings_dir);

    match cli.command {
        Commands::Generate {
            template,
            count,
            seed,
            separator,
            timeout_ms,
        } => {
            let context = open(storage);
            let mut config = GeneratorConfig::default()
                .with_count(count)
                .with_separator(separator)
                .with_timeout(Duration::from_millis(timeout_ms));
            if let Some(seed) = seed {
                config = config.with_seed(seed);
            }

            let output = Generator::new(context, config)
                .generate_joined(&template)
                .await
                .with_context(|| format!("Could not generate from '{template}'"))?;
            writeln!(out, "{output}")?;
        }

        Commands::List { json } => {
            let context = open(storage);
            let templates = context.read(|settings| {
                settings
                    .templates()
                    .iter()
                    .map(TemplateSummary::of)
                    .collect::<Vec<_>>()
            });

            if json {
                writeln!(out, "{}", serde_json::to_string_pretty(&templates)?)?;
            } else {
                for template in templates {
                    writeln!(
                        out,
                        "{}  {}  ({} schemes)",
                        template.name.bold(),
                        template.uuid.to_string().dimmed(),
                        template.schemes
                    )?;
                }
            }
        }

        Commands::Validate => {
            let context = open(storage);
            let failures = context.read(|settings| {
                settings
                    .templates()
                    .iter()
                    .flat_map(|template| {
                        template
                            .validate_each(settings)
                            .into_iter()
                            .map(|info| (template.name.clone(), info))
                    })
                    .collect::<Vec<_>>()
            });

            if failures.is_empty() {
                writeln!(out, "{} All templates are valid.", "✓".green())?;
            } else {
                for (name, info) in &failures {
                    writeln!(out, "{} {} ({}): {}", "✗".red(), name.bold(), info.property, info.message)?;
                }
                bail!("{} validation failure(s)", failures.len());
            }
        }

        Commands::Upgrade { file, target, write } => {
            let target = parse_version(target.as_deref().unwrap_or(CURRENT_VERSION))?;
            let xml = fs::read_to_string(&file)
                .with_context(|| format!("Could not read '{}'", file.display()))?;
            let mut element = Element::parse(&xml)?;
            upgrade::upgrade(&mut element, &target)?;
            let upgraded = element.to_xml()?;

            if write {
                fs::write(&file, upgraded)
                    .with_context(|| format!("Could not write '{}'", file.display()))?;
                writeln!(out, "{} Upgraded '{}' to {}.", "✓".green(), file.display(), target)?;
            } else {
                writeln!(out, "{upgraded}")?;
            }
        }

        Commands::Backup { target } => {
            storage.back_up_to(&target)?;
            writeln!(out, "{} Backed up settings to '{}'.", "✓".green(), target.display())?;
        }

        Commands::Restore { source } => {
            let context = AppContext::with_storage(PersistentSettings::new(), storage);
            context.restore_from(&source)?;
            if context.status() == LoadStatus::Failed {
                bail!("Settings in '{}' were not restored", source.display());
            }
            context.save()?;
            writeln!(out, "{} Restored settings from '{}'.", "✓".green(), source.display())?;
        }

        Commands::Reset => {
            let context = AppContext::with_storage(PersistentSettings::new(), storage);
            context.delete_settings()?;
            writeln!(out, "{} Settings were reset to defaults.", "✓".green())?;
        }

        Commands::Init { force } => {
            if storage.source_file().is_some() && !force {
                bail!(
                    "Settings already exist in '{}'; use --force to overwrite them",
                    storage.directory().display()
                );
            }

            let context = AppContext::with_storage(PersistentSettings::new(), storage);
            context.save()?;
            writeln!(out, "{} Wrote default settings.", "✓".green())?;
        }
    }

    Ok(())
}

/// One line of `list` output
#[derive(Debug, Serialize)]
struct TemplateSummary {
    name: String,
    uuid: Uuid,
    schemes: usize,
}

impl TemplateSummary {
    fn of(template: &Template) -> Self {
        Self {
            name: template.name().to_string(),
            uuid: template.uuid,
            schemes: template.schemes.len(),
        }
    }
}

/// Context backed by `storage`, with its settings loaded
///
/// A settings file that cannot be loaded is reported, and defaults are used
/// instead.
fn open(storage: SettingsStorage) -> AppContext {
    let context = AppContext::with_storage(PersistentSettings::new(), storage);
    if let Err(error) = context.load() {
        warn!("{}", error);
        eprintln!("{} {}", "warning:".yellow().bold(), error);
    }
    context
}

/// Whether `directory` contains a settings file
pub fn has_settings(directory: &Path) -> bool {
    SettingsStorage::new(directory).source_file().is_some()
}

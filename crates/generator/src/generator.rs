//! # Generator Orchestrator
//!
//! The `Generator` is the top-level entry point for generating data. It
//! looks up a template in the settings of an [`AppContext`], takes a
//! snapshot of those settings, and runs the template on a worker thread
//! under the configured timeout.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use randomness_generator::{Generator, GeneratorConfig};
//! use randomness_model::AppContext;
//!
//! let generator = Generator::new(AppContext::default(), GeneratorConfig::default().with_count(3));
//! let output = generator.generate("Integer").await?;
//! ```

use crate::config::GeneratorConfig;
use crate::timely::generate_timely;
use rand::SeedableRng;
use rand::rngs::StdRng;
use randomness_core::{RandomnessError, RandomnessResult, TemplateId};
use randomness_model::{AppContext, Scheme, Settings, Template};
use tracing::debug;

// ============================================================================
// Generator
// ============================================================================

/// Generates strings from the templates of an [`AppContext`]
#[derive(Debug, Clone)]
pub struct Generator {
    context: AppContext,
    config: GeneratorConfig,
}

impl Generator {
    pub fn new(context: AppContext, config: GeneratorConfig) -> Self {
        Self { context, config }
    }

    pub fn config(&self) -> &GeneratorConfig {
        &self.config
    }

    pub fn context(&self) -> &AppContext {
        &self.context
    }

    /// Generate `config.count` strings from the template identified by `key`
    ///
    /// `key` is matched against template names, ignoring case, and then
    /// against template identifiers.
    pub async fn generate(&self, key: &str) -> RandomnessResult<Vec<String>> {
        let settings = self.context.snapshot();
        let template = find_template(&settings, key)?.clone();
        let count = self.config.count;
        let mut rng = match self.config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        debug!("Generating {} strings from template '{}'.", count, template.name);
        generate_timely(self.config.timeout, move || {
            template.generate_strings(count, &mut rng, &settings)
        })
        .await
    }

    /// Generate as in [`Self::generate`] and join the output with `config.separator`
    pub async fn generate_joined(&self, key: &str) -> RandomnessResult<String> {
        let output = self.generate(key).await?;
        Ok(output.join(self.config.separator.as_str()))
    }
}

/// Find a template by name, ignoring case, or else by identifier
pub fn find_template<'a>(settings: &'a Settings, key: &str) -> RandomnessResult<&'a Template> {
    settings
        .template_list
        .find_by_name(key)
        .or_else(|| {
            key.parse::<TemplateId>()
                .ok()
                .and_then(|uuid| settings.find_template(uuid))
        })
        .ok_or_else(|| RandomnessError::TemplateNotFound(key.to_string()))
}

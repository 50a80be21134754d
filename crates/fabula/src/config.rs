//! Layered configuration for the storyboard pipeline.
//!
//! Sources, later ones overriding earlier ones:
//! 1. Bundled defaults (`fabula.toml` shipped with the crate)
//! 2. `~/.config/fabula/fabula.toml`
//! 3. `./fabula.toml`
//! 4. An explicit file passed by the caller
//! 5. `FABULA_<SECTION>__<KEY>` environment variables
//!
//! Credentials are never stored in the file. Each provider section names
//! the environment variable holding its key.

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, Environment, File, FileFormat};
use derive_getters::Getters;
use fabula_error::{ConfigError, FabulaResult};
use fabula_narrative::{PipelineSettings, StoryParameters};
use fabula_retry::RetrySettings;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, instrument};

/// Bundled default configuration.
pub const DEFAULT_CONFIG: &str = include_str!("../../../fabula.toml");

/// Prefix of environment overrides.
pub const ENV_PREFIX: &str = "FABULA";

/// Conversational completion endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Getters)]
pub struct CompletionConfig {
    /// URL receiving `{prompt, conversationHistory}`
    endpoint: String,
    /// Variable holding an optional bearer token
    api_key_env: String,
    /// Per-request timeout
    timeout_secs: u64,
}

impl CompletionConfig {
    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Story writer.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Getters)]
pub struct StoryConfig {
    /// OpenAI-compatible chat completions URL
    endpoint: String,
    /// Model that writes the story
    model: String,
    /// Variable holding the API key
    api_key_env: String,
    /// Sampling temperature
    temperature: f32,
    /// Story length limit
    max_tokens: u32,
    /// Nucleus sampling
    top_p: f32,
}

impl StoryConfig {
    /// Sampling parameters for the story request.
    pub fn parameters(&self) -> StoryParameters {
        StoryParameters::new(self.temperature, self.max_tokens, self.top_p)
    }
}

/// Image endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Getters)]
pub struct ImageConfig {
    /// Base URL; query parameters are appended per request
    endpoint: String,
    /// Aspect ratio understood by the provider
    size: String,
    /// Provider model name
    model: String,
    /// Per-request timeout
    timeout_secs: u64,
    /// Images per scene
    amount: u32,
}

impl ImageConfig {
    /// Per-request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Pipeline behavior.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Getters)]
pub struct PipelineConfig {
    /// Seconds to wait before each scene
    inter_scene_delay_secs: u64,
    /// Imagine scenes against the consolidated summary
    use_consolidated_context: bool,
    /// Re-asks allowed for a malformed structured reply
    max_extraction_attempts: u32,
    /// Directory receiving images and history
    output_dir: PathBuf,
}

/// Complete configuration.
///
/// # Example
///
/// ```no_run
/// use fabula::FabulaConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = FabulaConfig::load(None)?;
/// println!("Writing to {}", config.pipeline().output_dir().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize, Getters)]
pub struct FabulaConfig {
    /// `[completion]`
    completion: CompletionConfig,
    /// `[story]`
    story: StoryConfig,
    /// `[image]`
    image: ImageConfig,
    /// `[retry]`
    #[serde(default)]
    retry: RetrySettings,
    /// `[pipeline]`
    pipeline: PipelineConfig,
}

impl FabulaConfig {
    /// Load configuration from every source.
    ///
    /// `explicit` is layered above the user files and below the environment.
    /// Missing user files are skipped; a missing explicit file is an error.
    #[instrument]
    pub fn load(explicit: Option<&Path>) -> FabulaResult<Self> {
        debug!("Loading configuration: env > explicit > current dir > home dir > bundled");

        let mut builder = Self::bundled();

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/fabula/fabula.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("fabula").required(false));

        if let Some(path) = explicit {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        Self::finish(builder)
    }

    /// Bundled defaults overridden by a TOML document.
    #[instrument(skip(overrides))]
    pub fn from_toml(overrides: &str) -> FabulaResult<Self> {
        Self::finish(Self::bundled().add_source(File::from_str(overrides, FileFormat::Toml)))
    }

    /// Bundled defaults overridden by one file.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> FabulaResult<Self> {
        Self::finish(Self::bundled().add_source(File::from(path.as_ref())))
    }

    fn bundled() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
    }

    fn finish(builder: ConfigBuilder<DefaultState>) -> FabulaResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values no run could use.
    pub fn validate(&self) -> FabulaResult<()> {
        if self.completion.timeout_secs == 0 {
            Err(ConfigError::new("[completion] timeout_secs must be at least 1"))?
        }
        self.retry
            .validate()
            .map_err(|e| ConfigError::new(format!("[retry] {}", e)))?;
        if self.image.amount == 0 {
            Err(ConfigError::new("[image] amount must be at least 1"))?
        }
        if self.pipeline.max_extraction_attempts == 0 {
            Err(ConfigError::new("[pipeline] max_extraction_attempts must be at least 1"))?
        }
        Ok(())
    }

    /// Orchestrator settings drawn from `[pipeline]`, `[image]` and `[retry]`.
    pub fn pipeline_settings(&self) -> FabulaResult<PipelineSettings> {
        let settings = PipelineSettings::builder()
            .inter_scene_delay(Duration::from_secs(self.pipeline.inter_scene_delay_secs))
            .use_consolidated_context(self.pipeline.use_consolidated_context)
            .max_extraction_attempts(self.pipeline.max_extraction_attempts)
            .images_per_scene(self.image.amount)
            .asset_max_retries(*self.retry.asset_max_retries())
            .asset_retry_delay(self.retry.asset_retry_delay())
            .build()
            .map_err(|e| ConfigError::new(format!("Invalid pipeline settings: {}", e)))?;
        Ok(settings)
    }

    /// Replace the output directory.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.pipeline.output_dir = output_dir.into();
        self
    }

    /// Turn consolidated-context imagination on or off.
    pub fn with_consolidated_context(mut self, enabled: bool) -> Self {
        self.pipeline.use_consolidated_context = enabled;
        self
    }
}

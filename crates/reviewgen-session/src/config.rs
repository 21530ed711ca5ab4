use std::num::NonZeroUsize;
use std::path::PathBuf;

use clap::{Args, Parser};
use reviewgen_core::{Category, Preset, ReviewgenError};
use reviewgen_prompts::{DEFAULT_REVIEW_COUNT, DEFAULT_SUBJECT};
use reviewgen_service::{GeminiService, DEFAULT_BASE_URL, DEFAULT_MODEL};

use crate::state::{SessionConfig, DEFAULT_COPY_ACK};

/// Connection settings for the generative service.
#[derive(Debug, Clone, Args)]
pub struct ServiceArgs {
    /// Gemini API key. Only checked when a generation is attempted.
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Base URL of the Gemini API
    #[arg(long, env = "REVIEWGEN_BASE_URL", default_value = DEFAULT_BASE_URL)]
    pub base_url: String,

    /// Model identifier sent with every request
    #[arg(long, env = "REVIEWGEN_MODEL", default_value = DEFAULT_MODEL)]
    pub model: String,
}

impl ServiceArgs {
    pub fn build_service(&self) -> GeminiService {
        match &self.api_key {
            Some(key) => GeminiService::with_api_key(&self.base_url, key.clone()),
            None => GeminiService::new(&self.base_url),
        }
    }
}

/// Settings that shape the prompt and the session.
#[derive(Debug, Clone, Args)]
pub struct GenerationArgs {
    /// Who the reviews are about
    #[arg(long, env = "REVIEWGEN_SUBJECT", default_value = DEFAULT_SUBJECT)]
    pub subject: String,

    /// Number of reviews to request per batch
    #[arg(long, default_value_t = DEFAULT_REVIEW_COUNT)]
    pub count: usize,

    /// JSON file with named sample texts: [{"name": "...", "text": "..."}]
    #[arg(long, env = "REVIEWGEN_PRESETS")]
    pub presets: Option<PathBuf>,

    /// Start generating as soon as a preset is selected
    #[arg(long)]
    pub auto_generate: bool,
}

impl GenerationArgs {
    pub fn session_config(&self, service: &ServiceArgs) -> SessionConfig {
        let count = self.count.max(1);
        SessionConfig {
            subject: self.subject.clone(),
            review_count: count,
            batch_size: count,
            copy_ack: DEFAULT_COPY_ACK,
            model: service.model.clone(),
            auto_generate_on_preset: self.auto_generate,
        }
    }

    /// Load the presets file, or nothing when none is configured.
    pub fn load_presets(&self) -> Result<Vec<Preset>, ReviewgenError> {
        match &self.presets {
            Some(path) => Preset::load_file(path),
            None => Ok(Vec::new()),
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "reviewgen", about = "Generate reviews from sample text with Gemini")]
pub struct CliConfig {
    #[command(flatten)]
    pub service: ServiceArgs,

    #[command(flatten)]
    pub generation: GenerationArgs,

    /// Review category (key or label, e.g. technical_skills or "Technical Skills")
    #[arg(long, short = 'c', default_value = "general_experience")]
    pub category: Category,

    /// Use the named preset as sample text
    #[arg(long, short = 'p', conflicts_with_all = ["text", "file"])]
    pub preset: Option<String>,

    /// Read sample text from a file
    #[arg(long, short = 'f', conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Print the batch as JSON
    #[arg(long)]
    pub json: bool,

    /// Copy review N (1-based) of the new batch to the clipboard
    #[arg(long, value_name = "N", conflicts_with = "copy_all")]
    pub copy: Option<NonZeroUsize>,

    /// Copy the whole batch to the clipboard, separated by blank lines
    #[arg(long)]
    pub copy_all: bool,

    /// List the available categories and exit
    #[arg(long)]
    pub list_categories: bool,

    /// List the configured presets and exit
    #[arg(long)]
    pub list_presets: bool,

    /// Sample text. Read from stdin when neither this nor --file is given.
    pub text: Option<String>,
}

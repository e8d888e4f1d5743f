//! Environment-backed configuration.
//!
//! Most settings have defaults. Override with `SKILLMATCH_*` environment variables.

pub mod error;


pub use error::ConfigError;

use std::env;
use std::path::{Path, PathBuf};

use crate::constants::{DEFAULT_MAX_SEQ_LEN, DEFAULT_SKILLS, DEFAULT_STUB_DIM, DEFAULT_TOP_K};
use crate::embedding::DevicePreference;

/// Runtime configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `SKILLMATCH_*` overrides on top of defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Vocabulary file (`.vocab` lines or `tokenizer.json`).
    pub vocab_path: Option<PathBuf>,

    /// Encoder model directory. The stub provider is used when unset.
    pub model_path: Option<PathBuf>,

    /// File with one skill label per line.
    pub skills_path: Option<PathBuf>,

    /// Inline skill labels (`;`-separated), used when no skills file is set.
    pub skills: Vec<String>,

    /// Max tokens per sequence. Default: `512`.
    pub max_seq_len: usize,

    /// Results per query. Default: `5`.
    pub top_k: usize,

    /// Hidden size of the stub provider. Default: `384`.
    pub stub_dim: usize,

    /// Compute device preference. Default: `auto`.
    pub device: DevicePreference,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            vocab_path: None,
            model_path: None,
            skills_path: None,
            skills: Vec::new(),
            max_seq_len: DEFAULT_MAX_SEQ_LEN,
            top_k: DEFAULT_TOP_K,
            stub_dim: DEFAULT_STUB_DIM,
            device: DevicePreference::default(),
        }
    }
}

impl Config {
    const ENV_VOCAB_PATH: &'static str = "SKILLMATCH_VOCAB_PATH";
    const ENV_MODEL_PATH: &'static str = "SKILLMATCH_MODEL_PATH";
    const ENV_SKILLS_PATH: &'static str = "SKILLMATCH_SKILLS_PATH";
    const ENV_SKILLS: &'static str = "SKILLMATCH_SKILLS";
    const ENV_MAX_SEQ_LEN: &'static str = "SKILLMATCH_MAX_SEQ_LEN";
    const ENV_TOP_K: &'static str = "SKILLMATCH_TOP_K";
    const ENV_STUB_DIM: &'static str = "SKILLMATCH_STUB_DIM";
    const ENV_DEVICE: &'static str = "SKILLMATCH_DEVICE";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let vocab_path = Self::parse_optional_path_from_env(Self::ENV_VOCAB_PATH);
        let model_path = Self::parse_optional_path_from_env(Self::ENV_MODEL_PATH);
        let skills_path = Self::parse_optional_path_from_env(Self::ENV_SKILLS_PATH);
        let skills = env::var(Self::ENV_SKILLS)
            .map(|v| split_skills(&v))
            .unwrap_or_default();
        let max_seq_len = Self::parse_positive_from_env(Self::ENV_MAX_SEQ_LEN, defaults.max_seq_len)?;
        let top_k = Self::parse_positive_from_env(Self::ENV_TOP_K, defaults.top_k)?;
        let stub_dim = Self::parse_positive_from_env(Self::ENV_STUB_DIM, defaults.stub_dim)?;
        let device = Self::parse_device_from_env(defaults.device)?;

        Ok(Self {
            vocab_path,
            model_path,
            skills_path,
            skills,
            max_seq_len,
            top_k,
            stub_dim,
            device,
        })
    }

    /// Validates paths and basic invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        match &self.vocab_path {
            None => {
                return Err(ConfigError::MissingEnvVar {
                    name: Self::ENV_VOCAB_PATH,
                });
            }
            Some(path) => Self::require_file(path)?,
        }

        if let Some(ref path) = self.model_path {
            if !path.exists() {
                return Err(ConfigError::PathNotFound { path: path.clone() });
            }
            if !path.is_dir() {
                return Err(ConfigError::NotADirectory { path: path.clone() });
            }
        }

        if let Some(ref path) = self.skills_path {
            Self::require_file(path)?;
        }

        for (name, value) in [
            (Self::ENV_MAX_SEQ_LEN, self.max_seq_len),
            (Self::ENV_TOP_K, self.top_k),
            (Self::ENV_STUB_DIM, self.stub_dim),
        ] {
            if value == 0 {
                return Err(ConfigError::NotPositive {
                    name,
                    value: value.to_string(),
                });
            }
        }

        Ok(())
    }

    /// Resolves the skill pool: skills file, then inline list, then the built-in defaults.
    pub fn load_skills(&self) -> Result<Vec<String>, ConfigError> {
        if let Some(ref path) = self.skills_path {
            let content =
                std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFailed {
                    path: path.clone(),
                    source: e,
                })?;
            let skills: Vec<String> = content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty())
                .map(str::to_string)
                .collect();

            if skills.is_empty() {
                return Err(ConfigError::EmptySkillPool { path: path.clone() });
            }
            return Ok(skills);
        }

        if !self.skills.is_empty() {
            return Ok(self.skills.clone());
        }

        Ok(DEFAULT_SKILLS.iter().map(|s| s.to_string()).collect())
    }

    fn require_file(path: &Path) -> Result<(), ConfigError> {
        if !path.exists() {
            return Err(ConfigError::PathNotFound {
                path: path.to_path_buf(),
            });
        }
        if !path.is_file() {
            return Err(ConfigError::NotAFile {
                path: path.to_path_buf(),
            });
        }
        Ok(())
    }

    fn parse_optional_path_from_env(var_name: &str) -> Option<PathBuf> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
    }

    fn parse_positive_from_env(var_name: &'static str, default: usize) -> Result<usize, ConfigError> {
        match env::var(var_name) {
            Ok(value) => {
                let parsed: usize =
                    value
                        .trim()
                        .parse()
                        .map_err(|e| ConfigError::IntParseError {
                            name: var_name,
                            value: value.clone(),
                            source: e,
                        })?;

                if parsed == 0 {
                    return Err(ConfigError::NotPositive {
                        name: var_name,
                        value,
                    });
                }

                Ok(parsed)
            }
            Err(_) => Ok(default),
        }
    }

    fn parse_device_from_env(default: DevicePreference) -> Result<DevicePreference, ConfigError> {
        match env::var(Self::ENV_DEVICE) {
            Ok(value) => value
                .parse()
                .map_err(|_| ConfigError::InvalidDevice { value }),
            Err(_) => Ok(default),
        }
    }
}

fn split_skills(value: &str) -> Vec<String> {
    value
        .split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

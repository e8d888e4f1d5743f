use std::path::PathBuf;

use crate::constants::DEFAULT_STUB_DIM;

use super::device::DevicePreference;
use super::error::EmbeddingError;

#[derive(Debug, Clone)]
/// Configuration for building an embedding provider.
pub struct EmbedderConfig {
    /// Directory holding `config.json` and `model.safetensors`.
    pub model_dir: PathBuf,
    /// Compute device preference.
    pub device: DevicePreference,
    /// Hidden size of the stub provider.
    pub stub_dim: usize,
    /// If true, use the deterministic stub (no model files required).
    pub testing_stub: bool,
}

impl Default for EmbedderConfig {
    fn default() -> Self {
        Self {
            model_dir: PathBuf::new(),
            device: DevicePreference::default(),
            stub_dim: DEFAULT_STUB_DIM,
            testing_stub: false,
        }
    }
}

impl EmbedderConfig {
    /// Creates a config for a model directory.
    pub fn new<P: Into<PathBuf>>(model_dir: P) -> Self {
        Self {
            model_dir: model_dir.into(),
            ..Default::default()
        }
    }

    /// Creates a stub config producing `stub_dim`-wide vectors.
    pub fn stub(stub_dim: usize) -> Self {
        Self {
            stub_dim,
            testing_stub: true,
            ..Default::default()
        }
    }

    pub fn with_device(mut self, device: DevicePreference) -> Self {
        self.device = device;
        self
    }

    pub fn config_path(&self) -> PathBuf {
        self.model_dir.join("config.json")
    }

    pub fn weights_path(&self) -> PathBuf {
        self.model_dir.join("model.safetensors")
    }

    /// Validates required fields for the selected mode.
    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.testing_stub {
            if self.stub_dim == 0 {
                return Err(EmbeddingError::InvalidConfig {
                    reason: "stub_dim must be greater than zero".to_string(),
                });
            }
            return Ok(());
        }

        if self.model_dir.as_os_str().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "model_dir is required (stubbing is disabled)".to_string(),
            });
        }

        if !self.model_dir.is_dir() {
            return Err(EmbeddingError::ModelNotFound {
                path: self.model_dir.clone(),
            });
        }

        for path in [self.config_path(), self.weights_path()] {
            if !path.exists() {
                return Err(EmbeddingError::ModelNotFound { path });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = EmbedderConfig::default();
        assert!(!config.testing_stub);
        assert_eq!(config.stub_dim, DEFAULT_STUB_DIM);
        assert_eq!(config.device, DevicePreference::Auto);
    }

    #[test]
    fn test_paths_derive_from_model_dir() {
        let config = EmbedderConfig::new("/models/bge");
        assert_eq!(config.config_path(), PathBuf::from("/models/bge/config.json"));
        assert_eq!(
            config.weights_path(),
            PathBuf::from("/models/bge/model.safetensors")
        );
    }

    #[test]
    fn test_stub_validation() {
        assert!(EmbedderConfig::stub(8).validate().is_ok());
        assert!(matches!(
            EmbedderConfig::stub(0).validate(),
            Err(EmbeddingError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_empty_model_dir_rejected() {
        let config = EmbedderConfig::default();
        assert!(matches!(
            config.validate(),
            Err(EmbeddingError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn test_missing_weights_rejected() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("config.json"), "{}").unwrap();

        let config = EmbedderConfig::new(dir.path());
        match config.validate() {
            Err(EmbeddingError::ModelNotFound { path }) => {
                assert!(path.ends_with("model.safetensors"));
            }
            other => panic!("expected ModelNotFound, got {:?}", other),
        }
    }
}

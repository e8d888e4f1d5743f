use std::str::FromStr;

use candle_core::Device;
use tracing::{debug, info, warn};

use super::error::EmbeddingError;

/// Which compute device a provider should run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DevicePreference {
    /// First available GPU backend, CPU otherwise.
    #[default]
    Auto,
    /// Always CPU.
    Cpu,
    /// A GPU backend, failing if none is usable.
    Gpu,
}

impl FromStr for DevicePreference {
    type Err = EmbeddingError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "cpu" => Ok(Self::Cpu),
            "gpu" => Ok(Self::Gpu),
            other => Err(EmbeddingError::InvalidConfig {
                reason: format!("unknown device preference '{}'", other),
            }),
        }
    }
}

/// Selects the compute device for `preference` based on enabled features.
pub fn select_device(preference: DevicePreference) -> Result<Device, EmbeddingError> {
    if preference == DevicePreference::Cpu {
        debug!("CPU device requested");
        return Ok(Device::Cpu);
    }

    #[cfg_attr(not(any(feature = "metal", feature = "cuda")), allow(unused_mut))]
    let mut failures: Vec<String> = Vec::new();

    #[cfg(feature = "metal")]
    match Device::new_metal(0) {
        Ok(device) => {
            info!("Using Metal GPU acceleration");
            return Ok(device);
        }
        Err(e) => {
            warn!(error = %e, "Metal device unavailable");
            failures.push(format!("metal failed: {e}"));
        }
    }

    #[cfg(feature = "cuda")]
    match Device::new_cuda(0) {
        Ok(device) => {
            info!("Using CUDA GPU acceleration");
            return Ok(device);
        }
        Err(e) => {
            warn!(error = %e, "CUDA device unavailable");
            failures.push(format!("cuda failed: {e}"));
        }
    }

    let reason = if failures.is_empty() {
        "no GPU backend compiled".to_string()
    } else {
        failures.join("; ")
    };

    if preference == DevicePreference::Gpu {
        return Err(EmbeddingError::DeviceUnavailable {
            device: "gpu".to_string(),
            reason,
        });
    }

    if cfg!(any(feature = "metal", feature = "cuda")) {
        warn!(reason = %reason, "Falling back to CPU device");
    } else {
        info!(reason = %reason, "Using CPU device");
    }
    Ok(Device::Cpu)
}

pub mod logging;

use anyhow::{anyhow, Result};
use candle_core::Device;

/// Converts a device string (`"cpu"`, `"cuda"` or `"cuda:N"`) to a Candle `Device`.
///
/// Returns an error if a CUDA device is requested but not available, or if
/// the string names an unsupported device type or a malformed CUDA index.
pub fn get_device(device_str: &str) -> Result<Device> {
    let device_str = device_str.trim().to_lowercase();
    if let Some(rest) = device_str.strip_prefix("cuda") {
        let cuda_index = match rest {
            "" => 0,
            _ => rest
                .strip_prefix(':')
                .and_then(|s| s.parse::<usize>().ok())
                .ok_or_else(|| anyhow!("Invalid CUDA device: {}", device_str))?,
        };

        let device = Device::cuda_if_available(cuda_index)?;
        if !device.is_cuda() {
            return Err(anyhow!("CUDA device {} is not available", cuda_index));
        }
        Ok(device)
    } else {
        match device_str.as_str() {
            "cpu" => Ok(Device::Cpu),
            other => Err(anyhow!("Unsupported device type: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cpu_is_always_available() {
        assert!(matches!(get_device("cpu").unwrap(), Device::Cpu));
        assert!(matches!(get_device(" CPU ").unwrap(), Device::Cpu));
    }

    #[test]
    fn unknown_device_errors() {
        assert!(get_device("tpu").is_err());
    }

    #[test]
    fn malformed_cuda_index_errors() {
        for bad in ["cuda:abc", "cuda:", "cuda1", "cuda:-1"] {
            let err = get_device(bad).unwrap_err().to_string();
            assert!(err.contains("Invalid CUDA device"), "{}: {}", bad, err);
        }
    }
}

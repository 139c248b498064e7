//! WebGPU runtime implementation

use super::cache::get_or_create_client;
use super::client::WgpuClient;
use super::device::{WgpuDevice, enumerate_devices_blocking};
use crate::error::Result;
use crate::runtime::Runtime;

/// WebGPU Runtime adapter
///
/// Implements the generic Runtime trait for WebGPU backend.
/// Provides cross-platform GPU acceleration.
#[derive(Clone, Debug, Default)]
pub struct WgpuRuntime;

impl Runtime for WgpuRuntime {
    type Device = WgpuDevice;
    type Client = WgpuClient;

    fn name() -> &'static str {
        "wgpu"
    }

    fn enumerate_devices() -> Vec<Self::Device> {
        enumerate_devices_blocking()
    }

    fn default_device() -> Self::Device {
        WgpuDevice::new(0)
    }

    fn default_client(device: &Self::Device) -> Result<Self::Client> {
        get_or_create_client(device)
    }
}

/// Check if WebGPU is available on this system
pub fn is_wgpu_available() -> bool {
    super::device::query_adapter_info_blocking(0).is_ok()
}

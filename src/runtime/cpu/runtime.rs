//! CPU runtime implementation

use super::client::CpuClient;
use super::device::CpuDevice;
use crate::error::Result;
use crate::runtime::Runtime;

/// CPU compute runtime
///
/// This is the default runtime that works on any platform. Work-groups are
/// spread over the rayon pool when the `rayon` feature is enabled.
#[derive(Clone, Debug, Default)]
pub struct CpuRuntime;

impl Runtime for CpuRuntime {
    type Device = CpuDevice;
    type Client = CpuClient;

    fn name() -> &'static str {
        "cpu"
    }

    fn enumerate_devices() -> Vec<Self::Device> {
        vec![CpuDevice::new()]
    }

    fn default_device() -> Self::Device {
        CpuDevice::new()
    }

    fn default_client(device: &Self::Device) -> Result<Self::Client> {
        Ok(CpuClient::new(device.clone()))
    }
}

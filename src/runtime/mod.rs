//! Runtime backends for the reduction and binning passes
//!
//! This module defines the `Runtime` trait and provides implementations
//! for the compute backends (CPU, WebGPU).
//!
//! # Architecture
//!
//! ```text
//! Runtime (backend identity)
//! ├── Device (identifies a specific adapter/CPU)
//! └── Client (dispatches passes, owns queue/thread pool)
//!       └── Kernel (upload, grouped reduction, binning)
//! ```

pub mod kernel;

pub mod cpu;

#[cfg(feature = "wgpu")]
pub mod wgpu;

pub use kernel::Kernel;

use crate::error::Result;

/// Core trait for compute backends
///
/// `Runtime` abstracts over different compute devices (CPU, GPU).
/// It uses static dispatch via generics so the pipeline monomorphizes per
/// backend.
///
/// # Example
///
/// ```ignore
/// use tempstat::runtime::{Runtime, cpu::CpuRuntime};
///
/// let device = CpuRuntime::default_device();
/// let client = CpuRuntime::default_client(&device)?;
/// ```
pub trait Runtime: Clone + Send + Sync + 'static {
    /// Device identifier type
    type Device: Device;

    /// Client for dispatching operations
    type Client: RuntimeClient<Self>;

    /// Human-readable name of this runtime
    fn name() -> &'static str;

    /// Devices this runtime can dispatch to, in selection order
    fn enumerate_devices() -> Vec<Self::Device>;

    /// Get the default device
    fn default_device() -> Self::Device;

    /// Create a client for a device
    fn default_client(device: &Self::Device) -> Result<Self::Client>;
}

/// Trait for device identification
pub trait Device: Clone + Send + Sync + 'static {
    /// Unique identifier for this device
    fn id(&self) -> usize;

    /// Check if two devices are the same
    fn is_same(&self, other: &Self) -> bool {
        self.id() == other.id()
    }

    /// Human-readable name
    fn name(&self) -> String {
        format!("Device({})", self.id())
    }
}

/// Trait for runtime clients that handle operation dispatch
pub trait RuntimeClient<R: Runtime>: Kernel<R> + Clone + Send + Sync {
    /// Get the device this client operates on
    fn device(&self) -> &R::Device;
}

/// A platform and the devices it exposes, for listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlatformInfo {
    /// Selection index (`-p`)
    pub index: usize,
    /// Runtime name
    pub name: &'static str,
    /// Device names, indexed by device selection (`-d`)
    pub devices: Vec<String>,
}

/// Platform index of the CPU runtime.
pub const CPU_PLATFORM: usize = 0;

/// Platform index of the WebGPU runtime.
#[cfg(feature = "wgpu")]
pub const WGPU_PLATFORM: usize = 1;

fn describe<R: Runtime>(index: usize) -> PlatformInfo {
    PlatformInfo {
        index,
        name: R::name(),
        devices: R::enumerate_devices().iter().map(Device::name).collect(),
    }
}

/// Enumerate every platform compiled into this build.
pub fn list_platforms() -> Vec<PlatformInfo> {
    #[allow(unused_mut)]
    let mut platforms = vec![describe::<cpu::CpuRuntime>(CPU_PLATFORM)];

    #[cfg(feature = "wgpu")]
    platforms.push(describe::<self::wgpu::WgpuRuntime>(WGPU_PLATFORM));

    platforms
}

/// Line announcing the platform and device a run dispatches to.
pub fn running_on<R: Runtime>(device: &R::Device) -> String {
    format!("Running on {}, {}", R::name(), device.name())
}

/// Render the platform listing shown by `-l`.
pub fn format_platforms(platforms: &[PlatformInfo]) -> String {
    let mut out = String::new();
    for platform in platforms {
        out.push_str(&format!("Platform {}: {}\n", platform.index, platform.name));
        if platform.devices.is_empty() {
            out.push_str("  (no devices)\n");
        }
        for (i, device) in platform.devices.iter().enumerate() {
            out.push_str(&format!("  Device {i}: {device}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cpu_platform_is_listed_first() {
        let platforms = list_platforms();
        assert_eq!(platforms[0].index, CPU_PLATFORM);
        assert_eq!(platforms[0].name, "cpu");
        assert_eq!(platforms[0].devices.len(), 1);
    }

    #[test]
    fn test_running_on_names_platform_and_device() {
        let device = cpu::CpuDevice::new();
        let line = running_on::<cpu::CpuRuntime>(&device);
        assert_eq!(line, format!("Running on cpu, {}", device.name()));
        assert!(line.starts_with("Running on cpu, cpu ("));
    }

    #[test]
    fn test_format_platforms() {
        let listing = format_platforms(&[
            PlatformInfo {
                index: 0,
                name: "cpu",
                devices: vec!["cpu (8 threads)".to_string()],
            },
            PlatformInfo {
                index: 1,
                name: "wgpu",
                devices: vec![],
            },
        ]);
        assert_eq!(
            listing,
            "Platform 0: cpu\n  Device 0: cpu (8 threads)\nPlatform 1: wgpu\n  (no devices)\n"
        );
    }
}
